//! Disk inventory models for the `storage/disk/` endpoint.
//!
//! Disks are graphed by munin under a stable field name, so each disk gets
//! a `slug` derived from the best human-readable name available. Not every
//! disk reports a model string; the name falls back through partition
//! label, serial and finally the numeric disk id.

use serde::{Deserialize, Serialize};

use crate::utils::slugify;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partition {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub total_bytes: u64,
    #[serde(default)]
    pub used_bytes: u64,
    #[serde(default)]
    pub free_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disk {
    #[serde(default)]
    pub id: i64,
    /// Disk bus, e.g. "internal" or "usb"
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub temp: i64,
    #[serde(default)]
    pub total_bytes: u64,
    #[serde(default)]
    pub partitions: Vec<Partition>,
}

impl Disk {
    /// Human-readable name, suffixed with the disk type.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.base_name(), self.kind)
    }

    /// Munin-safe field name for this disk.
    pub fn slug(&self) -> String {
        slugify(&self.base_name())
    }

    fn base_name(&self) -> String {
        if !self.model.is_empty() {
            return self.model.clone();
        }
        // No model reported; a single partition's label is the next best name.
        if let [partition] = self.partitions.as_slice() {
            if !partition.label.is_empty() {
                return partition.label.clone();
            }
        }
        if !self.serial.is_empty() {
            return self.serial.clone();
        }
        self.id.to_string()
    }
}
