pub mod config;
pub mod export;
pub mod list;
pub mod pages;
