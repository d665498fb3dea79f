//! Lazy generation of derived artifacts.
//!
//! A derived image (a thumbnail, a resized variant) lives at a
//! deterministic path and is produced only when first requested. The
//! load-or-signal operation here returns a tagged [`Artifact`] instead of
//! throwing: callers pattern-match, produce the file on a miss, and retry.
//!
//! ```no_run
//! use rasterly::{generation, Artifact};
//!
//! # fn regenerate(path: &std::path::Path) -> Result<(), rasterly::BackendError> { Ok(()) }
//! # fn main() -> Result<(), rasterly::BackendError> {
//! let thumb = match generation::lookup("cache/thumb_400x400.png")? {
//!     Artifact::Ready(image) => image,
//!     Artifact::Missing(path) => {
//!         regenerate(&path)?;
//!         generation::lookup(&path)?
//!             .into_ready()
//!             .ok_or_else(|| std::io::Error::other("regeneration produced nothing"))?
//!     }
//! };
//! # let _ = thumb;
//! # Ok(())
//! # }
//! ```
//!
//! The miss carries exactly the path to produce — no retry counts, no
//! backoff, no placeholder content. Two concurrent requests for the same
//! missing path both see the miss; callers needing exactly-once
//! regeneration must add their own path-level locking around the produce
//! step.

use crate::backend::{BackendError, DEFAULT_BACKEND};
use crate::handle::Image;
use std::path::{Path, PathBuf};

/// Outcome of requesting a derived artifact.
#[derive(Debug)]
pub enum Artifact {
    /// The artifact exists and is loaded.
    Ready(Image),
    /// The artifact is absent; produce the file at this path, then retry.
    Missing(PathBuf),
}

impl Artifact {
    pub fn is_ready(&self) -> bool {
        matches!(self, Artifact::Ready(_))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Artifact::Missing(_))
    }

    pub fn into_ready(self) -> Option<Image> {
        match self {
            Artifact::Ready(image) => Some(image),
            Artifact::Missing(_) => None,
        }
    }
}

/// Request the artifact at `path` through the default backend.
pub fn lookup(path: impl AsRef<Path>) -> Result<Artifact, BackendError> {
    lookup_with(DEFAULT_BACKEND, path)
}

/// Request the artifact at `path` through the named backend.
///
/// An absent file is a [`Artifact::Missing`] signal, not an error. A file
/// that exists but fails to decode is an error: the cache holds a corrupt
/// artifact and regenerating over it blindly would mask the problem.
pub fn lookup_with(backend: &str, path: impl AsRef<Path>) -> Result<Artifact, BackendError> {
    let path = path.as_ref();
    if !path.exists() {
        log::debug!("artifact {} absent, signalling generation", path.display());
        return Ok(Artifact::Missing(path.to_path_buf()));
    }
    Ok(Artifact::Ready(Image::open_with(backend, path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn absent_artifact_signals_missing_with_exact_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("cache").join("thumb_400x400.png");

        match lookup(&path).unwrap() {
            Artifact::Missing(missing) => assert_eq!(missing, path),
            Artifact::Ready(_) => panic!("artifact should be missing"),
        }
    }

    #[test]
    fn produced_artifact_satisfies_the_retried_request() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("thumb_400x400.png");

        let first = lookup(&path).unwrap();
        assert!(first.is_missing());

        // orchestration layer produces the file, then retries
        let mut source = Image::create(400, 400).unwrap();
        source.fill_background(&Color::WHITE).unwrap();
        source.save(&path, None).unwrap();

        match lookup(&path).unwrap() {
            Artifact::Ready(image) => {
                assert_eq!(image.width().unwrap(), 400);
                assert_eq!(image.height().unwrap(), 400);
            }
            Artifact::Missing(_) => panic!("artifact was produced"),
        }
    }

    #[test]
    fn corrupt_artifact_is_an_error_not_a_miss() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        assert!(matches!(lookup(&path), Err(BackendError::Decode(_))));
    }

    #[test]
    fn lookup_with_unknown_backend_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("x.png");
        std::fs::write(&path, b"irrelevant").unwrap();

        assert!(matches!(
            lookup_with("quartz", &path),
            Err(BackendError::UnsupportedBackend(_))
        ));
    }
}
