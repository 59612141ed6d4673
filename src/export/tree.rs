//! Page tree flattening
//!
//! Turns the nested page tree into the ordered list of page paths that drives
//! content fetching: pre-order, parents before children, siblings left to
//! right. Uses an explicit stack so deep trees cannot exhaust the call stack.

use std::collections::HashSet;

use crate::types::{PageNode, Result, WikiError};

/// Flatten a page tree into its page paths in pre-order.
///
/// The same path appearing in two separate branches is kept twice. A page
/// whose path repeats one of its own ancestors is rejected as malformed.
pub fn flatten(root: &PageNode) -> Result<Vec<String>> {
    let mut paths = Vec::new();
    let mut stack: Vec<(&PageNode, usize)> = vec![(root, 0)];
    // Paths from the root down to the node being visited; `ancestors` holds
    // the same entries for constant-time lookup
    let mut lineage: Vec<&str> = Vec::new();
    let mut ancestors: HashSet<&str> = HashSet::new();

    while let Some((node, depth)) = stack.pop() {
        while lineage.len() > depth {
            if let Some(left) = lineage.pop() {
                ancestors.remove(left);
            }
        }
        if !ancestors.insert(&node.path) {
            return Err(WikiError::malformed(
                "page tree",
                format!("page '{}' appears inside itself", node.path),
            ));
        }
        lineage.push(&node.path);
        paths.push(node.path.clone());

        // Reverse so the first child is popped first
        for child in node.sub_pages.iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    Ok(paths)
}
