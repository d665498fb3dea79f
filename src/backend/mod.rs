//! Backend capability contract and the shared base every adapter builds on.
//!
//! The [`Backend`] trait defines the full operation set — lifecycle,
//! introspection, persistence, geometric transforms, pixel effects, and
//! drawing primitives. Only the lifecycle and introspection methods are
//! required; every capability method has a default body reporting
//! [`BackendError::Unsupported`], so a new adapter opts into support
//! incrementally instead of silently no-opping or crashing.
//!
//! The resize family is special: the default bodies compute a [`Geometry`]
//! through the engine in [`crate::geometry`] and hand it to
//! [`Backend::apply_geometry`]. An adapter therefore implements a single
//! blit routine and inherits `resize`, `force_resize`, `scale_resize`,
//! `crop_resize`, and `zoom_crop` with identical dimension behavior to
//! every other adapter.
//!
//! [`Binding`] carries the resource-lifecycle bookkeeping shared across
//! backend families: which [`Source`] is bound, whether a native resource
//! is live, and the [`BackendError::NotInitialized`] guard for calls
//! outside the init/deinit window.

use crate::color::Color;
use crate::geometry::{self, Extent, Geometry};
use crate::source::Source;
use image::RgbaImage;
use std::path::Path;
use thiserror::Error;

pub mod magick;
pub mod raster;

pub use magick::MagickBackend;
pub use raster::RasterBackend;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("operation not supported by this backend: {0}")]
    Unsupported(&'static str),

    #[error("backend used before init or after deinit")]
    NotInitialized,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown or disabled backend: {0}")]
    UnsupportedBackend(String),
}

impl BackendError {
    pub(crate) fn unsupported(operation: &'static str) -> Self {
        BackendError::Unsupported(operation)
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        BackendError::InvalidArgument(message.into())
    }
}

/// Horizontal anchoring for [`Backend::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Name of the backend used when the caller does not pick one.
pub const DEFAULT_BACKEND: &str = "raster";

/// Select a backend implementation by name (case-insensitive).
///
/// `"magick"` names the ImageMagick-family adapter, which is present as a
/// skeleton only and therefore refused here; anything unknown is refused
/// the same way.
pub fn create(name: &str) -> Result<Box<dyn Backend>, BackendError> {
    match name.to_ascii_lowercase().as_str() {
        "raster" => Ok(Box::new(RasterBackend::new())),
        "magick" | "imagick" | "imagemagick" => Err(BackendError::UnsupportedBackend(format!(
            "{name} is present but not implemented"
        ))),
        other => Err(BackendError::UnsupportedBackend(other.to_string())),
    }
}

/// Source binding and native-resource bookkeeping shared by all adapters.
///
/// A backend holds at most one live resource. [`Binding::install`] drops
/// any prior resource before storing the new one, [`Binding::clear`] is
/// idempotent, and the accessors fail with [`BackendError::NotInitialized`]
/// outside the init/deinit window.
#[derive(Debug, Default)]
pub struct Binding<R> {
    source: Option<Source>,
    resource: Option<R>,
}

impl<R> Binding<R> {
    pub fn new() -> Self {
        Binding {
            source: None,
            resource: None,
        }
    }

    /// Bind the source `init` will read. Replaces any previous binding.
    pub fn bind(&mut self, source: Source) {
        self.source = Some(source);
    }

    pub fn source(&self) -> Result<&Source, BackendError> {
        self.source.as_ref().ok_or(BackendError::NotInitialized)
    }

    /// Store a freshly created resource, tearing down the previous one.
    pub fn install(&mut self, resource: R) {
        self.resource = Some(resource);
    }

    pub fn resource(&self) -> Result<&R, BackendError> {
        self.resource.as_ref().ok_or(BackendError::NotInitialized)
    }

    pub fn resource_mut(&mut self) -> Result<&mut R, BackendError> {
        self.resource.as_mut().ok_or(BackendError::NotInitialized)
    }

    /// Release the resource. Calling with nothing allocated is a no-op.
    pub fn clear(&mut self) {
        self.resource = None;
    }

    pub fn is_live(&self) -> bool {
        self.resource.is_some()
    }
}

/// The polymorphic executor behind an image handle.
///
/// Implementations must honor the dimension behavior of the geometry engine
/// exactly; the default resize-family bodies guarantee this by funneling
/// every mode through [`Backend::apply_geometry`].
pub trait Backend: Send {
    /// Identifies which backend implementation is active.
    fn name(&self) -> &'static str;

    /// Bind the source to decode. Read exactly once, by [`Backend::init`].
    fn set_source(&mut self, source: Source);

    /// Decode or allocate the native resource from the bound source.
    ///
    /// Calling `init` again tears down the prior resource first.
    fn init(&mut self) -> Result<(), BackendError>;

    /// Release the native resource. Idempotent.
    fn deinit(&mut self);

    fn width(&self) -> Result<u32, BackendError>;

    fn height(&self) -> Result<u32, BackendError>;

    /// Export the current pixels as RGBA. Interchange for cross-backend
    /// operations such as [`Backend::merge`].
    fn snapshot(&self) -> Result<RgbaImage, BackendError> {
        Err(BackendError::unsupported("snapshot"))
    }

    /// Promote a paletted/indexed resource to full color. Adapters call
    /// this before any operation that writes pixels; the default assumes
    /// the resource is already true color.
    fn convert_to_true_color(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    // --- persistence ------------------------------------------------------

    fn save_gif(&self, path: &Path) -> Result<(), BackendError> {
        let _ = path;
        Err(BackendError::unsupported("save_gif"))
    }

    fn save_png(&self, path: &Path) -> Result<(), BackendError> {
        let _ = path;
        Err(BackendError::unsupported("save_png"))
    }

    /// Quality ranges from 0 (worst, smallest file) to 100 (best, biggest).
    fn save_jpeg(&self, path: &Path, quality: u32) -> Result<(), BackendError> {
        let _ = (path, quality);
        Err(BackendError::unsupported("save_jpeg"))
    }

    /// Quality ranges from 0 (worst, smallest file) to 100 (best, biggest).
    fn save_webp(&self, path: &Path, quality: u32) -> Result<(), BackendError> {
        let _ = (path, quality);
        Err(BackendError::unsupported("save_webp"))
    }

    /// Progressive encoding for formats that support it.
    fn enable_progressive(&mut self) -> Result<(), BackendError> {
        Err(BackendError::unsupported("enable_progressive"))
    }

    // --- geometric transforms ---------------------------------------------

    /// Crop to the given box. The box must lie entirely within the current
    /// bounds; out-of-range boxes are an [`BackendError::InvalidArgument`],
    /// never silently clamped.
    fn crop(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<(), BackendError> {
        let _ = (x, y, width, height);
        Err(BackendError::unsupported("crop"))
    }

    /// Blit according to a precomputed geometry: crop the source window,
    /// scale to the content size, center on the canvas, fill any uncovered
    /// area with `background`. The one routine an adapter implements to
    /// gain the whole resize family.
    fn apply_geometry(
        &mut self,
        geometry: &Geometry,
        background: &Color,
    ) -> Result<(), BackendError> {
        let _ = (geometry, background);
        Err(BackendError::unsupported("resize"))
    }

    /// General resize. Never enlarges unless `force`; `rescale` pads and
    /// `crop` crops to the exact requested box. A percentage width is
    /// interpreted against the source's own dimensions.
    fn resize(
        &mut self,
        width: Option<Extent>,
        height: Option<u32>,
        background: &Color,
        force: bool,
        rescale: bool,
        crop: bool,
    ) -> Result<(), BackendError> {
        let source = (self.width()?, self.height()?);
        let g = geometry::resize_geometry(source, width, height, force, rescale, crop)?;
        self.apply_geometry(&g, background)
    }

    /// Stretch to exactly the given dimensions, ignoring aspect ratio.
    fn force_resize(
        &mut self,
        width: Option<u32>,
        height: Option<u32>,
        background: &Color,
    ) -> Result<(), BackendError> {
        let source = (self.width()?, self.height()?);
        self.apply_geometry(&geometry::force_geometry(source, width, height), background)
    }

    /// Aspect-preserving resize, allowed to enlarge; pads up to the box, or
    /// crops the overflow when `crop` is set.
    fn scale_resize(
        &mut self,
        width: Option<u32>,
        height: Option<u32>,
        background: &Color,
        crop: bool,
    ) -> Result<(), BackendError> {
        let source = (self.width()?, self.height()?);
        self.apply_geometry(
            &geometry::scale_geometry(source, width, height, crop),
            background,
        )
    }

    /// As [`Backend::scale_resize`], with the layout cropped to the box.
    fn crop_resize(
        &mut self,
        width: Option<u32>,
        height: Option<u32>,
        background: &Color,
    ) -> Result<(), BackendError> {
        self.scale_resize(width, height, background, true)
    }

    /// Cover the box and center-crop to exactly `width × height`.
    fn zoom_crop(&mut self, width: u32, height: u32, background: &Color) -> Result<(), BackendError> {
        let source = (self.width()?, self.height()?);
        self.apply_geometry(&geometry::zoom_crop_geometry(source, width, height), background)
    }

    /// Rotate counter-clockwise by `angle` degrees; the canvas grows to fit
    /// and exposed corners are filled with `background`.
    fn rotate(&mut self, angle: f64, background: &Color) -> Result<(), BackendError> {
        let _ = (angle, background);
        Err(BackendError::unsupported("rotate"))
    }

    fn flip(&mut self, vertical: bool, horizontal: bool) -> Result<(), BackendError> {
        let _ = (vertical, horizontal);
        Err(BackendError::unsupported("flip"))
    }

    /// Blit `other` at `(x, y)`, scaled to `width × height` first (axes
    /// default to `other`'s own size).
    fn merge(
        &mut self,
        other: &RgbaImage,
        x: i32,
        y: i32,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<(), BackendError> {
        let _ = (other, x, y, width, height);
        Err(BackendError::unsupported("merge"))
    }

    // --- pixel effects ----------------------------------------------------

    fn negate(&mut self) -> Result<(), BackendError> {
        Err(BackendError::unsupported("negate"))
    }

    /// `brightness` in [-255, 255].
    fn brightness(&mut self, brightness: i32) -> Result<(), BackendError> {
        let _ = brightness;
        Err(BackendError::unsupported("brightness"))
    }

    /// `contrast` in [-100, 100].
    fn contrast(&mut self, contrast: i32) -> Result<(), BackendError> {
        let _ = contrast;
        Err(BackendError::unsupported("contrast"))
    }

    fn grayscale(&mut self) -> Result<(), BackendError> {
        Err(BackendError::unsupported("grayscale"))
    }

    fn emboss(&mut self) -> Result<(), BackendError> {
        Err(BackendError::unsupported("emboss"))
    }

    /// `p` in [-10, 10]; higher smooths more.
    fn smooth(&mut self, p: i32) -> Result<(), BackendError> {
        let _ = p;
        Err(BackendError::unsupported("smooth"))
    }

    fn sharp(&mut self) -> Result<(), BackendError> {
        Err(BackendError::unsupported("sharp"))
    }

    fn edge(&mut self) -> Result<(), BackendError> {
        Err(BackendError::unsupported("edge"))
    }

    /// Channel offsets, each in [-255, 255].
    fn colorize(&mut self, red: i32, green: i32, blue: i32) -> Result<(), BackendError> {
        let _ = (red, green, blue);
        Err(BackendError::unsupported("colorize"))
    }

    fn sepia(&mut self) -> Result<(), BackendError> {
        Err(BackendError::unsupported("sepia"))
    }

    /// Fill transparent areas with `background`.
    fn fill_background(&mut self, background: &Color) -> Result<(), BackendError> {
        let _ = background;
        Err(BackendError::unsupported("fill_background"))
    }

    // --- drawing primitives -----------------------------------------------

    /// Flood-fill the region connected to `(x, y)`.
    fn fill(&mut self, color: &Color, x: u32, y: u32) -> Result<(), BackendError> {
        let _ = (color, x, y);
        Err(BackendError::unsupported("fill"))
    }

    /// Draw `text` with the font file at `font`, anchored at `(x, y)`.
    #[allow(clippy::too_many_arguments)]
    fn write(
        &mut self,
        font: &Path,
        text: &str,
        x: i32,
        y: i32,
        size: u32,
        angle: f64,
        color: &Color,
        align: Align,
    ) -> Result<(), BackendError> {
        let _ = (font, text, x, y, size, angle, color, align);
        Err(BackendError::unsupported("write"))
    }

    fn rectangle(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: &Color,
        filled: bool,
    ) -> Result<(), BackendError> {
        let _ = (x1, y1, x2, y2, color, filled);
        Err(BackendError::unsupported("rectangle"))
    }

    #[allow(clippy::too_many_arguments)]
    fn rounded_rectangle(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        radius: u32,
        color: &Color,
        filled: bool,
    ) -> Result<(), BackendError> {
        let _ = (x1, y1, x2, y2, radius, color, filled);
        Err(BackendError::unsupported("rounded_rectangle"))
    }

    fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: &Color) -> Result<(), BackendError> {
        let _ = (x1, y1, x2, y2, color);
        Err(BackendError::unsupported("line"))
    }

    /// `width` and `height` are the full axes of the ellipse, as drawn.
    fn ellipse(
        &mut self,
        cx: i32,
        cy: i32,
        width: u32,
        height: u32,
        color: &Color,
        filled: bool,
    ) -> Result<(), BackendError> {
        let _ = (cx, cy, width, height, color, filled);
        Err(BackendError::unsupported("ellipse"))
    }

    fn circle(
        &mut self,
        cx: i32,
        cy: i32,
        radius: u32,
        color: &Color,
        filled: bool,
    ) -> Result<(), BackendError> {
        let _ = (cx, cy, radius, color, filled);
        Err(BackendError::unsupported("circle"))
    }

    /// `points` is an open ring: at least three vertices, first ≠ last.
    fn polygon(
        &mut self,
        points: &[(i32, i32)],
        color: &Color,
        filled: bool,
    ) -> Result<(), BackendError> {
        let _ = (points, color, filled);
        Err(BackendError::unsupported("polygon"))
    }
}
