//! Block-device inspection adapter.

use std::path::Path;
use std::process::Command;

use crate::types::{BlockDevice, ProbeError};

pub trait BlockDeviceInspector: Send + Sync {
    /// Return the partition backing the filesystem mounted at `mount_point`.
    ///
    /// # Errors
    ///
    /// Returns a `ProbeError` when the listing cannot be obtained or contains
    /// no matching row.
    fn partition_for(&self, mount_point: &Path) -> Result<BlockDevice, ProbeError>;
}

/// Production inspector. Shells out to `lsblk` for the raw block-device table
/// and filters rows of type `part`.
#[derive(Debug, Copy, Clone, Default)]
pub struct LsblkInspector;

impl LsblkInspector {
    /// Parse raw (`lsblk -r`) output: one `NAME TYPE MOUNTPOINT` row per
    /// line, mount point absent for unmounted devices.
    fn parse_listing(listing: &str, mount_point: &Path) -> Result<BlockDevice, ProbeError> {
        let wanted = mount_point.to_string_lossy();
        for line in listing.lines() {
            let mut parts = line.split_whitespace();
            let (Some(name), Some(kind)) = (parts.next(), parts.next()) else {
                continue;
            };
            if kind != "part" {
                continue;
            }
            if parts.next() == Some(wanted.as_ref()) {
                return Ok(BlockDevice {
                    name: name.to_string(),
                    kind: kind.to_string(),
                });
            }
        }
        Err(ProbeError::NotFound(wanted.into_owned()))
    }
}

impl BlockDeviceInspector for LsblkInspector {
    fn partition_for(&self, mount_point: &Path) -> Result<BlockDevice, ProbeError> {
        let out = Command::new("lsblk")
            .args(["-rno", "NAME,TYPE,MOUNTPOINT"])
            .output()
            .map_err(|e| ProbeError::Unavailable(e.to_string()))?;
        if !out.status.success() {
            return Err(ProbeError::Unavailable(format!(
                "lsblk exited with {}",
                out.status
            )));
        }
        let listing = String::from_utf8_lossy(&out.stdout);
        Self::parse_listing(&listing, mount_point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
mmcblk0 disk \n\
mmcblk0p1 part /\n\
mmcblk0p2 part /home\n\
sda disk \n\
sda1 part /mnt/usb\n";

    #[test]
    fn finds_root_partition() {
        let dev = LsblkInspector::parse_listing(LISTING, Path::new("/")).unwrap();
        assert_eq!(dev.name, "mmcblk0p1");
        assert_eq!(dev.kind, "part");
    }

    #[test]
    fn skips_non_partition_rows() {
        // The whole-disk `mmcblk0` row must never win even if a mount column
        // were present for it.
        let listing = "mmcblk0 disk /\nsda1 part /\n";
        let dev = LsblkInspector::parse_listing(listing, Path::new("/")).unwrap();
        assert_eq!(dev.name, "sda1");
    }

    #[test]
    fn missing_mount_point_is_not_found() {
        let err = LsblkInspector::parse_listing(LISTING, Path::new("/data")).unwrap_err();
        assert!(matches!(err, ProbeError::NotFound(_)));
    }

    #[test]
    fn empty_listing_is_not_found() {
        assert!(LsblkInspector::parse_listing("", Path::new("/")).is_err());
    }
}
