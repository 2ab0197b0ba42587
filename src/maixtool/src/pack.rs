//! Flash image packing and inspection.
//!
//! Flash map seen by the bootloader:
//!
//! ```text
//! 0x00000  stage1          64K
//! 0x10000  stage2          64K
//! 0x20000  stage2 backup   64K
//! 0x30000  app            320K
//! 0x80000  app backup     320K
//! ```
//!
//! Gaps are filled with `0xFF` (erased flash). The backup copy of the last
//! record is written unpadded at the end of the image.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::image::{self, CipherMode, ImageError, ImageRecord};

/// Stage1 and stage2 loader slot size
pub const SLOT_SIZE: usize = 64 * 1024;

/// Space taken by a packed loader image (stage1, stage2, stage2 backup)
pub const LOADER_REGION: usize = 3 * SLOT_SIZE;

/// Application slot size
pub const APP_SLOT_SIZE: usize = 320 * 1024;

/// Erased flash
pub const FILL: u8 = 0xff;

/// Errors that can occur while packing an image
#[derive(Error, Debug)]
pub enum PackError {
    #[error("{slot} is {len} bytes, larger than its {capacity} byte slot")]
    SlotOverflow {
        slot: &'static str,
        len: usize,
        capacity: usize,
    },

    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Which packed image a file holds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Stage1 and stage2 loaders
    Loader,
    /// A packed loader image followed by the application
    #[default]
    Firmware,
}

/// A named region of flash holding one boot record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub name: &'static str,
    pub offset: usize,
    pub size: usize,
}

const LOADER_SLOTS: [Slot; 3] = [
    Slot {
        name: "stage1",
        offset: 0,
        size: SLOT_SIZE,
    },
    Slot {
        name: "stage2",
        offset: SLOT_SIZE,
        size: SLOT_SIZE,
    },
    Slot {
        name: "stage2-backup",
        offset: 2 * SLOT_SIZE,
        size: SLOT_SIZE,
    },
];

const FIRMWARE_SLOTS: [Slot; 5] = [
    LOADER_SLOTS[0],
    LOADER_SLOTS[1],
    LOADER_SLOTS[2],
    Slot {
        name: "app",
        offset: LOADER_REGION,
        size: APP_SLOT_SIZE,
    },
    Slot {
        name: "app-backup",
        offset: LOADER_REGION + APP_SLOT_SIZE,
        size: APP_SLOT_SIZE,
    },
];

impl Layout {
    pub fn slots(self) -> &'static [Slot] {
        match self {
            Layout::Loader => &LOADER_SLOTS,
            Layout::Firmware => &FIRMWARE_SLOTS,
        }
    }

    /// Primary/backup slot name pairs the bootloader compares
    pub fn pairs(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Layout::Loader => &[("stage2", "stage2-backup")],
            Layout::Firmware => &[("stage2", "stage2-backup"), ("app", "app-backup")],
        }
    }
}

/// Sequential image builder
#[derive(Debug, Default)]
pub struct Packer {
    image: Vec<u8>,
}

impl Packer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `data` and pad it with [`FILL`] to `size` bytes
    pub fn slot(
        &mut self,
        name: &'static str,
        data: &[u8],
        size: usize,
    ) -> Result<&mut Self, PackError> {
        if data.len() > size {
            return Err(PackError::SlotOverflow {
                slot: name,
                len: data.len(),
                capacity: size,
            });
        }
        tracing::debug!(
            "{} at {:#08x}: {} bytes, {} fill",
            name,
            self.image.len(),
            data.len(),
            size - data.len()
        );
        self.image.extend_from_slice(data);
        self.image.resize(self.image.len() + size - data.len(), FILL);
        Ok(self)
    }

    /// Append `data` with no padding
    pub fn tail(&mut self, data: &[u8]) -> &mut Self {
        self.image.extend_from_slice(data);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.image
    }
}

/// Stamp two loader binaries and pack them as stage1, stage2 and backup
pub fn pack_loader(stage1: &[u8], stage2: &[u8]) -> Result<Vec<u8>, PackError> {
    let stage1 = image::stamp(stage1)?;
    let stage2 = image::stamp(stage2)?;

    let mut packer = Packer::new();
    packer
        .slot("stage1", &stage1, SLOT_SIZE)?
        .slot("stage2", &stage2, SLOT_SIZE)?
        .tail(&stage2);
    Ok(packer.finish())
}

/// Append a stamped application and its backup to a packed loader image
///
/// `loader_image` is taken as-is; it is normally the output of
/// [`pack_loader`].
pub fn pack_firmware(loader_image: &[u8], app: &[u8]) -> Result<Vec<u8>, PackError> {
    let app = image::stamp(app)?;

    let mut packer = Packer::new();
    packer
        .slot("loader image", loader_image, LOADER_REGION)?
        .slot("app", &app, APP_SLOT_SIZE)?
        .tail(&app);
    Ok(packer.finish())
}

/// What was found in one slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SlotStatus {
    Valid {
        cipher: CipherMode,
        length: u32,
        digest: String,
    },
    Invalid {
        reason: String,
        /// Stored digest, when the record could still be parsed
        digest: Option<String>,
    },
    /// The image ends before the slot starts
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotReport {
    pub name: &'static str,
    pub offset: usize,
    #[serde(flatten)]
    pub status: SlotStatus,
}

impl SlotReport {
    fn stored_digest(&self) -> Option<&str> {
        match &self.status {
            SlotStatus::Valid { digest, .. } => Some(digest),
            SlotStatus::Invalid { digest, .. } => digest.as_deref(),
            SlotStatus::Missing => None,
        }
    }
}

/// Whether a primary slot and its backup hold the same record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairCheck {
    pub primary: &'static str,
    pub backup: &'static str,
    /// `None` when either side has no readable digest
    pub identical: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackReport {
    pub layout: Layout,
    pub size: usize,
    pub slots: Vec<SlotReport>,
    pub pairs: Vec<PairCheck>,
}

impl PackReport {
    /// Every slot verifies and every backup matches its primary
    pub fn is_healthy(&self) -> bool {
        self.slots
            .iter()
            .all(|slot| matches!(slot.status, SlotStatus::Valid { .. }))
            && self.pairs.iter().all(|pair| pair.identical == Some(true))
    }

    pub fn slot(&self, name: &str) -> Option<&SlotReport> {
        self.slots.iter().find(|slot| slot.name == name)
    }
}

fn inspect_slot(image: &[u8], slot: &Slot) -> SlotStatus {
    let Some(data) = image.get(slot.offset..) else {
        return SlotStatus::Missing;
    };
    if data.is_empty() {
        return SlotStatus::Missing;
    }

    match ImageRecord::parse_in_slot(data, slot.size) {
        Ok(record) => match record.verify() {
            Ok(()) => SlotStatus::Valid {
                cipher: record.cipher(),
                length: record.length(),
                digest: record.digest_hex(),
            },
            Err(e) => SlotStatus::Invalid {
                reason: e.to_string(),
                digest: Some(record.digest_hex()),
            },
        },
        Err(e) => SlotStatus::Invalid {
            reason: e.to_string(),
            digest: None,
        },
    }
}

/// Read and verify every record of a packed image
///
/// Also compares each primary slot's stored digest with its backup's, the
/// same check the bootloader makes before deciding to restore a slot.
pub fn inspect(image: &[u8], layout: Layout) -> PackReport {
    let slots: Vec<SlotReport> = layout
        .slots()
        .iter()
        .map(|slot| SlotReport {
            name: slot.name,
            offset: slot.offset,
            status: inspect_slot(image, slot),
        })
        .collect();

    let digest_of = |name: &str| {
        slots
            .iter()
            .find(|slot| slot.name == name)
            .and_then(SlotReport::stored_digest)
    };
    let pairs = layout
        .pairs()
        .iter()
        .map(|&(primary, backup)| PairCheck {
            primary,
            backup,
            identical: digest_of(primary).zip(digest_of(backup)).map(|(a, b)| a == b),
        })
        .collect();

    PackReport {
        layout,
        size: image.len(),
        slots,
        pairs,
    }
}
