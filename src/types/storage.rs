//! Block-device classification types for the bootstrapper.

use serde::Serialize;
use thiserror::Error;

use crate::constants::FLASH_DEVICE_PREFIX;

/// Result of classifying the root filesystem's backing storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageClass {
    /// Removable card-based storage (MMC/SD); daemons should reduce write
    /// frequency on it.
    Flash,
    /// Anything else. Fixed disks, USB sticks and the like all land here;
    /// only the `mmc` prefix is special-cased.
    Fixed,
}

/// One row of the system block-device table, as returned by an inspector.
/// Transient; lives only for the duration of a bootstrap run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlockDevice {
    /// Short device name, e.g. `mmcblk0p1` or `sda1`.
    pub name: String,
    /// Device-type tag from the listing, e.g. `part`.
    pub kind: String,
}

impl BlockDevice {
    /// Prefix-based, case-sensitive match on the device name.
    #[must_use]
    pub fn is_flash_card(&self) -> bool {
        self.name.starts_with(FLASH_DEVICE_PREFIX)
    }

    #[must_use]
    pub fn storage_class(&self) -> StorageClass {
        if self.is_flash_card() {
            StorageClass::Flash
        } else {
            StorageClass::Fixed
        }
    }
}

/// Why a block-device probe produced no usable row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The listing tool could not be run or returned garbage.
    #[error("block device listing unavailable: {0}")]
    Unavailable(String),
    /// The listing ran but contained no partition mounted at the given point.
    #[error("no partition mounted at {0}")]
    NotFound(String),
}
