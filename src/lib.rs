//! # Rasterly
//!
//! Backend-agnostic raster image manipulation: one contract — load,
//! transform, draw, save — executed by interchangeable imaging backends.
//! Callers hold an [`Image`] handle and never see which backend does the
//! pixel work.
//!
//! # Architecture
//!
//! ```text
//! Image (handle)  →  Backend (trait)  →  geometry (pure math)
//!                        │
//!                        ├── RasterBackend   image/imageproc, fully implemented
//!                        └── MagickBackend   skeleton, everything Unsupported
//! ```
//!
//! The load-bearing property: **dimension behavior is identical across
//! backends**. Every resize mode is computed by the pure functions in
//! [`geometry`] and handed to the backend as a finished
//! [`Geometry`] — canvas size, content size, crop box — so an adapter only
//! blits. Two backends given the same source and the same request produce
//! the same canvas, the same padding bands, and the same crop window.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`handle`] | Caller-facing [`Image`]: fluent delegation, save dispatch by extension |
//! | [`backend`] | The capability contract, default `Unsupported` bodies, lifecycle bookkeeping, selection by name |
//! | [`backend::raster`] | Pure-Rust adapter over `image`/`imageproc` — GIF, PNG, JPEG, WebP |
//! | [`backend::magick`] | ImageMagick-family skeleton, disabled |
//! | [`geometry`] | Resize geometry engine: force / scale / crop / zoom-crop math |
//! | [`generation`] | Lazy artifact production: `Ready` / `Missing` load-or-signal |
//! | [`color`] | Packed-int / named color union |
//! | [`source`] | Pixel-data origin: path, bytes, or blank canvas |
//!
//! # Design Decisions
//!
//! ## Geometry as data
//!
//! Resize modes are not methods an adapter reimplements; they are
//! descriptions an adapter executes. The default trait bodies call the
//! engine and funnel every mode through one `apply_geometry` blit routine,
//! which is what keeps N backends from drifting into N rounding behaviors.
//!
//! ## Misses are values
//!
//! A derived image that does not exist yet is not an exception. The
//! [`generation`] module returns `Artifact::Missing(path)` and the caller
//! produces the file and retries. Nothing is ever fabricated in place of
//! an absent artifact.
//!
//! ## Incremental backends
//!
//! Every capability has a default body reporting `Unsupported`, so a new
//! adapter starts from lifecycle + introspection and grows. A capability a
//! backend lacks fails loudly instead of no-opping.

pub mod backend;
pub mod color;
pub mod generation;
pub mod geometry;
pub mod handle;
pub mod source;

pub use backend::{Align, Backend, BackendError, DEFAULT_BACKEND, create};
pub use color::Color;
pub use generation::Artifact;
pub use geometry::{CropBox, Extent, Geometry};
pub use handle::Image;
pub use source::Source;
