//! Small formatting helpers.

pub mod format;

pub use format::slugify;
