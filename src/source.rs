//! Where an image's pixel data originates.
//!
//! A [`Source`] is bound to a backend before `init` and read exactly once,
//! when `init` decodes (or allocates) the native resource. It is never
//! consulted again afterwards; transforms operate on the decoded resource.

use std::path::PathBuf;

/// Origin of pixel data for a backend resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Read and decode a file on disk.
    Path(PathBuf),
    /// Decode an in-memory buffer.
    Bytes(Vec<u8>),
    /// Allocate a blank (fully transparent) canvas to draw on.
    Blank { width: u32, height: u32 },
}

impl Source {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Source::Path(path.into())
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Source::Bytes(bytes.into())
    }

    pub fn blank(width: u32, height: u32) -> Self {
        Source::Blank { width, height }
    }
}
