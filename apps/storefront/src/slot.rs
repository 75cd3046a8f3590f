//! File-backed cart slot.
//!
//! One JSON file per key in the data directory. Writes go to a sibling temp
//! file first and are renamed into place, so a crash never leaves a
//! half-written cart behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use marquee_core::persistence::CartSlot;
use marquee_core::SlotError;

#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    /// Slot for `key` inside `dir`. Nothing is touched until the first write.
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        FileSlot {
            path: dir.as_ref().join(format!("{key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CartSlot for FileSlot {
    fn read(&self) -> Result<Option<String>, SlotError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, raw: &str) -> Result<(), SlotError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        std::fs::write(&temp, raw)?;
        std::fs::rename(&temp, &self.path)?;
        debug!(path = %self.path.display(), bytes = raw.len(), "Cart slot written");
        Ok(())
    }

    fn remove(&mut self) -> Result<(), SlotError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
