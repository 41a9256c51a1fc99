//! Utility modules for the static site generator.

pub mod date;
pub mod html;
pub mod minify;
pub mod query;
pub mod slug;
