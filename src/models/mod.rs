//! Data models for Freebox API payloads.

pub mod disk;

pub use disk::{Disk, Partition};
