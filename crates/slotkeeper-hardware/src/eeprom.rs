//! Byte storage backends.
//!
//! - [`MemoryEeprom`]: RAM-backed image for tests and read-only inspection.
//!   Supports write counting and injected write failures.
//! - [`FileEeprom`]: image kept in a file; every byte write is synced to
//!   disk before returning, matching EEPROM durability.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use slotkeeper_core::constants::{ERASED_BYTE, IMAGE_SIZE};
use tracing::debug;

use crate::{HardwareError, Result, traits::ByteStorage};

/// In-memory byte storage.
///
/// Starts erased (every byte `0xFF`) unless built from existing bytes.
/// Moving the storage out of its owner and back in simulates a power cycle:
/// bytes survive, in-memory controller state does not.
///
/// # Examples
///
/// ```
/// use slotkeeper_hardware::{ByteStorage, MemoryEeprom};
///
/// let mut eeprom = MemoryEeprom::new();
/// assert_eq!(eeprom.read_byte(0).unwrap(), 0xFF);
///
/// eeprom.write_u16(4, 4821).unwrap();
/// assert_eq!(eeprom.read_u16(4).unwrap(), 4821);
/// assert_eq!(eeprom.write_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEeprom {
    bytes: Vec<u8>,
    write_count: usize,
    fail_writes: bool,
    write_budget: Option<usize>,
}

impl MemoryEeprom {
    /// Create an erased image of the default size.
    pub fn new() -> Self {
        Self::with_capacity(IMAGE_SIZE)
    }

    /// Create an erased image of the given size.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_bytes(vec![ERASED_BYTE; capacity])
    }

    /// Wrap existing bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            write_count: 0,
            fail_writes: false,
            write_budget: None,
        }
    }

    /// Get the raw image.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of successful byte writes so far.
    pub fn write_count(&self) -> usize {
        self.write_count
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_write_failure(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Let `writes` more writes succeed, then fail every one after.
    ///
    /// Simulates power loss partway through a multi-byte update.
    pub fn fail_after(&mut self, writes: usize) {
        self.write_budget = Some(writes);
    }
}

impl Default for MemoryEeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteStorage for MemoryEeprom {
    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    fn read_byte(&self, address: usize) -> Result<u8> {
        self.bytes
            .get(address)
            .copied()
            .ok_or_else(|| HardwareError::out_of_bounds(address, self.bytes.len()))
    }

    fn write_byte(&mut self, address: usize, value: u8) -> Result<()> {
        let capacity = self.bytes.len();
        let cell = self
            .bytes
            .get_mut(address)
            .ok_or_else(|| HardwareError::out_of_bounds(address, capacity))?;

        if self.fail_writes || self.write_budget == Some(0) {
            return Err(HardwareError::write_failed(address, "write failure injected"));
        }

        *cell = value;
        self.write_count += 1;
        if let Some(budget) = self.write_budget.as_mut() {
            *budget -= 1;
        }
        Ok(())
    }
}

/// File-backed byte storage.
///
/// The file holds the raw image. A missing file is created erased; a short
/// file is padded with erased bytes. Reads are served from a cached copy,
/// writes go to the cache and to disk, and are synced before returning.
#[derive(Debug)]
pub struct FileEeprom {
    path: PathBuf,
    file: File,
    cache: Vec<u8>,
}

impl FileEeprom {
    /// Open (or create) an image file with the given capacity.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::Io` if the file cannot be opened, read or
    /// extended.
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let mut cache = Vec::with_capacity(capacity);
        file.read_to_end(&mut cache)?;

        if cache.len() < capacity {
            let existing = cache.len();
            cache.resize(capacity, ERASED_BYTE);
            file.seek(SeekFrom::Start(existing as u64))?;
            file.write_all(&cache[existing..])?;
            file.sync_data()?;
            debug!(
                "Extended EEPROM image {} from {} to {} bytes",
                path.display(),
                existing,
                capacity
            );
        }
        cache.truncate(capacity);

        Ok(Self { path, file, cache })
    }

    /// Read an image file into memory without creating or modifying it.
    ///
    /// A missing file reads as an erased image.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::Io` if the file exists but cannot be read.
    pub fn snapshot(path: impl AsRef<Path>, capacity: usize) -> Result<MemoryEeprom> {
        let mut bytes = match std::fs::read(path.as_ref()) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        bytes.resize(capacity, ERASED_BYTE);
        Ok(MemoryEeprom::from_bytes(bytes))
    }

    /// Path of the image file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteStorage for FileEeprom {
    fn capacity(&self) -> usize {
        self.cache.len()
    }

    fn read_byte(&self, address: usize) -> Result<u8> {
        self.cache
            .get(address)
            .copied()
            .ok_or_else(|| HardwareError::out_of_bounds(address, self.cache.len()))
    }

    fn write_byte(&mut self, address: usize, value: u8) -> Result<()> {
        if address >= self.cache.len() {
            return Err(HardwareError::out_of_bounds(address, self.cache.len()));
        }

        self.file
            .seek(SeekFrom::Start(address as u64))
            .and_then(|_| self.file.write_all(&[value]))
            .and_then(|_| self.file.sync_data())
            .map_err(|e| HardwareError::write_failed(address, e.to_string()))?;

        self.cache[address] = value;
        Ok(())
    }
}
