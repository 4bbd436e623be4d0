//! Shelf catalog application library
//!
//! Read-only book catalog: search with tag intersection and pagination,
//! book detail, book links and the tag list.

pub mod modules;
pub mod utils;

pub use modules::register_all;
