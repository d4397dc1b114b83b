//! Mode 7 screen contents shared with a renderer.

use std::sync::{Arc, PoisonError, RwLock};

pub const COLUMNS: usize = 40;
pub const ROWS: usize = 25;

/// Size of the Mode 7 window at $7C00.
pub const VIDEO_RAM_SIZE: usize = 0x400;

/// A copy of video RAM taken at the last frame boundary.
///
/// Cloning shares the buffer, so a renderer on another thread sees each
/// refresh. Readers may lag a frame behind the machine.
#[derive(Debug, Clone)]
pub struct VideoSnapshot {
    bytes: Arc<RwLock<Vec<u8>>>,
}

impl Default for VideoSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: Arc::new(RwLock::new(vec![0; VIDEO_RAM_SIZE])),
        }
    }

    pub fn refresh(&self, video_ram: &[u8]) {
        let mut bytes = self.bytes.write().unwrap_or_else(PoisonError::into_inner);
        bytes.clear();
        bytes.extend_from_slice(video_ram);
    }

    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// One string per character row. Bytes outside printable ASCII,
    /// including teletext control codes, show as spaces.
    #[must_use]
    pub fn text_lines(&self) -> Vec<String> {
        let bytes = self.bytes.read().unwrap_or_else(PoisonError::into_inner);
        bytes
            .chunks(COLUMNS)
            .take(ROWS)
            .map(|row| row.iter().map(|&byte| printable(byte)).collect())
            .collect()
    }
}

fn printable(byte: u8) -> char {
    let byte = byte & 0x7F;
    if (0x20..0x7F).contains(&byte) { char::from(byte) } else { ' ' }
}
