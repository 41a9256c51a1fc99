//! Derived outputs built from the post store.

pub mod rss;
