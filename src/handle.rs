//! The caller-facing image handle.
//!
//! An [`Image`] owns exactly one backend instance and delegates every
//! contract operation to it. Transform methods return `&mut Self` so
//! pipelines chain with `?`:
//!
//! ```no_run
//! use rasterly::{Color, Image};
//!
//! # fn main() -> Result<(), rasterly::BackendError> {
//! let mut image = Image::open("photo.jpg")?;
//! image
//!     .scale_resize(Some(400), Some(400), &Color::WHITE, false)?
//!     .grayscale()?;
//! image.save("thumbs/photo.png", None)?;
//! # Ok(())
//! # }
//! ```
//!
//! A handle is never shared across concurrent mutation; it is `Send` but
//! deliberately not `Sync`. Process distinct handles on distinct threads
//! instead.

use crate::backend::{self, Align, Backend, BackendError, DEFAULT_BACKEND};
use crate::color::Color;
use crate::geometry::Extent;
use crate::source::Source;
use std::path::{Path, PathBuf};

/// Default quality for JPEG/WebP when the caller does not pass one.
const DEFAULT_QUALITY: u32 = 80;

pub struct Image {
    backend: Box<dyn Backend>,
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl Image {
    /// Open a file through the default backend.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, BackendError> {
        Self::open_with(DEFAULT_BACKEND, path)
    }

    /// Open a file through the named backend.
    pub fn open_with(backend: &str, path: impl Into<PathBuf>) -> Result<Self, BackendError> {
        Self::from_source(backend::create(backend)?, Source::Path(path.into()))
    }

    /// Decode an in-memory buffer through the default backend.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, BackendError> {
        Self::from_bytes_with(DEFAULT_BACKEND, bytes)
    }

    pub fn from_bytes_with(backend: &str, bytes: impl Into<Vec<u8>>) -> Result<Self, BackendError> {
        Self::from_source(backend::create(backend)?, Source::Bytes(bytes.into()))
    }

    /// Allocate a blank canvas to draw on.
    pub fn create(width: u32, height: u32) -> Result<Self, BackendError> {
        Self::create_with(DEFAULT_BACKEND, width, height)
    }

    pub fn create_with(backend: &str, width: u32, height: u32) -> Result<Self, BackendError> {
        Self::from_source(backend::create(backend)?, Source::Blank { width, height })
    }

    /// Bind `source` to a caller-provided backend instance. The entry point
    /// for backends implemented outside this crate.
    pub fn with_backend(backend: Box<dyn Backend>, source: Source) -> Result<Self, BackendError> {
        Self::from_source(backend, source)
    }

    fn from_source(mut backend: Box<dyn Backend>, source: Source) -> Result<Self, BackendError> {
        backend.set_source(source);
        backend.init()?;
        Ok(Image { backend })
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn width(&self) -> Result<u32, BackendError> {
        self.backend.width()
    }

    pub fn height(&self) -> Result<u32, BackendError> {
        self.backend.height()
    }

    // --- persistence ------------------------------------------------------

    /// Save to `path`, inferring the container from the extension
    /// (`gif`, `png`, `jpg`/`jpeg`, `webp`). `quality` applies to JPEG and
    /// WebP and defaults to 80. The parent directory must already exist.
    pub fn save(&self, path: impl AsRef<Path>, quality: Option<u32>) -> Result<(), BackendError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        log::debug!("saving {} ({extension})", path.display());
        match extension.as_str() {
            "gif" => self.backend.save_gif(path),
            "png" => self.backend.save_png(path),
            "jpg" | "jpeg" => self.backend.save_jpeg(path, quality),
            "webp" => self.backend.save_webp(path, quality),
            other => Err(BackendError::invalid(format!(
                "cannot infer image format from extension {other:?}"
            ))),
        }
    }

    pub fn save_gif(&self, path: impl AsRef<Path>) -> Result<(), BackendError> {
        self.backend.save_gif(path.as_ref())
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), BackendError> {
        self.backend.save_png(path.as_ref())
    }

    pub fn save_jpeg(&self, path: impl AsRef<Path>, quality: u32) -> Result<(), BackendError> {
        self.backend.save_jpeg(path.as_ref(), quality)
    }

    pub fn save_webp(&self, path: impl AsRef<Path>, quality: u32) -> Result<(), BackendError> {
        self.backend.save_webp(path.as_ref(), quality)
    }

    pub fn enable_progressive(&mut self) -> Result<&mut Self, BackendError> {
        self.backend.enable_progressive()?;
        Ok(self)
    }

    // --- geometric transforms ---------------------------------------------

    pub fn crop(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<&mut Self, BackendError> {
        self.backend.crop(x, y, width, height)?;
        Ok(self)
    }

    /// General resize; never enlarges unless `force`.
    pub fn resize(
        &mut self,
        width: Option<Extent>,
        height: Option<u32>,
        background: &Color,
    ) -> Result<&mut Self, BackendError> {
        self.backend.resize(width, height, background, false, false, false)?;
        Ok(self)
    }

    pub fn force_resize(
        &mut self,
        width: Option<u32>,
        height: Option<u32>,
        background: &Color,
    ) -> Result<&mut Self, BackendError> {
        self.backend.force_resize(width, height, background)?;
        Ok(self)
    }

    pub fn scale_resize(
        &mut self,
        width: Option<u32>,
        height: Option<u32>,
        background: &Color,
        crop: bool,
    ) -> Result<&mut Self, BackendError> {
        self.backend.scale_resize(width, height, background, crop)?;
        Ok(self)
    }

    pub fn crop_resize(
        &mut self,
        width: Option<u32>,
        height: Option<u32>,
        background: &Color,
    ) -> Result<&mut Self, BackendError> {
        self.backend.crop_resize(width, height, background)?;
        Ok(self)
    }

    pub fn zoom_crop(
        &mut self,
        width: u32,
        height: u32,
        background: &Color,
    ) -> Result<&mut Self, BackendError> {
        self.backend.zoom_crop(width, height, background)?;
        Ok(self)
    }

    pub fn rotate(&mut self, angle: f64, background: &Color) -> Result<&mut Self, BackendError> {
        self.backend.rotate(angle, background)?;
        Ok(self)
    }

    pub fn flip(&mut self, vertical: bool, horizontal: bool) -> Result<&mut Self, BackendError> {
        self.backend.flip(vertical, horizontal)?;
        Ok(self)
    }

    /// Blit `other` at `(x, y)`, scaled to `width × height` first (axes
    /// default to `other`'s own size). Works across backends through an
    /// RGBA snapshot.
    pub fn merge(
        &mut self,
        other: &Image,
        x: i32,
        y: i32,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<&mut Self, BackendError> {
        let pixels = other.backend.snapshot()?;
        self.backend.merge(&pixels, x, y, width, height)?;
        Ok(self)
    }

    // --- pixel effects ----------------------------------------------------

    pub fn negate(&mut self) -> Result<&mut Self, BackendError> {
        self.backend.negate()?;
        Ok(self)
    }

    pub fn brightness(&mut self, brightness: i32) -> Result<&mut Self, BackendError> {
        self.backend.brightness(brightness)?;
        Ok(self)
    }

    pub fn contrast(&mut self, contrast: i32) -> Result<&mut Self, BackendError> {
        self.backend.contrast(contrast)?;
        Ok(self)
    }

    pub fn grayscale(&mut self) -> Result<&mut Self, BackendError> {
        self.backend.grayscale()?;
        Ok(self)
    }

    pub fn emboss(&mut self) -> Result<&mut Self, BackendError> {
        self.backend.emboss()?;
        Ok(self)
    }

    pub fn smooth(&mut self, p: i32) -> Result<&mut Self, BackendError> {
        self.backend.smooth(p)?;
        Ok(self)
    }

    pub fn sharp(&mut self) -> Result<&mut Self, BackendError> {
        self.backend.sharp()?;
        Ok(self)
    }

    pub fn edge(&mut self) -> Result<&mut Self, BackendError> {
        self.backend.edge()?;
        Ok(self)
    }

    pub fn colorize(&mut self, red: i32, green: i32, blue: i32) -> Result<&mut Self, BackendError> {
        self.backend.colorize(red, green, blue)?;
        Ok(self)
    }

    pub fn sepia(&mut self) -> Result<&mut Self, BackendError> {
        self.backend.sepia()?;
        Ok(self)
    }

    pub fn fill_background(&mut self, background: &Color) -> Result<&mut Self, BackendError> {
        self.backend.fill_background(background)?;
        Ok(self)
    }

    // --- drawing primitives -----------------------------------------------

    pub fn fill(&mut self, color: &Color, x: u32, y: u32) -> Result<&mut Self, BackendError> {
        self.backend.fill(color, x, y)?;
        Ok(self)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn write(
        &mut self,
        font: impl AsRef<Path>,
        text: &str,
        x: i32,
        y: i32,
        size: u32,
        angle: f64,
        color: &Color,
        align: Align,
    ) -> Result<&mut Self, BackendError> {
        self.backend
            .write(font.as_ref(), text, x, y, size, angle, color, align)?;
        Ok(self)
    }

    pub fn rectangle(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: &Color,
        filled: bool,
    ) -> Result<&mut Self, BackendError> {
        self.backend.rectangle(x1, y1, x2, y2, color, filled)?;
        Ok(self)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn rounded_rectangle(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        radius: u32,
        color: &Color,
        filled: bool,
    ) -> Result<&mut Self, BackendError> {
        self.backend
            .rounded_rectangle(x1, y1, x2, y2, radius, color, filled)?;
        Ok(self)
    }

    pub fn line(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: &Color,
    ) -> Result<&mut Self, BackendError> {
        self.backend.line(x1, y1, x2, y2, color)?;
        Ok(self)
    }

    pub fn ellipse(
        &mut self,
        cx: i32,
        cy: i32,
        width: u32,
        height: u32,
        color: &Color,
        filled: bool,
    ) -> Result<&mut Self, BackendError> {
        self.backend.ellipse(cx, cy, width, height, color, filled)?;
        Ok(self)
    }

    pub fn circle(
        &mut self,
        cx: i32,
        cy: i32,
        radius: u32,
        color: &Color,
        filled: bool,
    ) -> Result<&mut Self, BackendError> {
        self.backend.circle(cx, cy, radius, color, filled)?;
        Ok(self)
    }

    pub fn polygon(
        &mut self,
        points: &[(i32, i32)],
        color: &Color,
        filled: bool,
    ) -> Result<&mut Self, BackendError> {
        self.backend.polygon(points, color, filled)?;
        Ok(self)
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        self.backend.deinit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tests::StubBackend;

    #[test]
    fn create_allocates_blank_canvas() {
        let image = Image::create(64, 48).unwrap();
        assert_eq!(image.width().unwrap(), 64);
        assert_eq!(image.height().unwrap(), 48);
        assert_eq!(image.backend_name(), "raster");
    }

    #[test]
    fn open_with_unknown_backend_fails() {
        assert!(matches!(
            Image::open_with("quartz", "/tmp/x.png"),
            Err(BackendError::UnsupportedBackend(_))
        ));
    }

    #[test]
    fn from_bytes_decodes() {
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(5, 6, image::Rgba([1, 2, 3, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let image = Image::from_bytes(png).unwrap();
        assert_eq!((image.width().unwrap(), image.height().unwrap()), (5, 6));
    }

    #[test]
    fn transforms_chain_fluently() {
        let mut image = Image::create(100, 100).unwrap();
        image
            .fill_background(&Color::WHITE)
            .unwrap()
            .scale_resize(Some(50), Some(25), &Color::WHITE, false)
            .unwrap()
            .negate()
            .unwrap();
        assert_eq!((image.width().unwrap(), image.height().unwrap()), (50, 25));
    }

    #[test]
    fn save_rejects_unknown_extension() {
        let image = Image::create(4, 4).unwrap();
        assert!(matches!(
            image.save("/tmp/out.bmp", None),
            Err(BackendError::InvalidArgument(_))
        ));
        assert!(matches!(
            image.save("/tmp/out", None),
            Err(BackendError::InvalidArgument(_))
        ));
    }

    #[test]
    fn save_dispatches_by_extension() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut image = Image::create(10, 10).unwrap();
        image.fill_background(&Color::WHITE).unwrap();

        for name in ["a.png", "b.jpg", "c.jpeg", "d.gif", "e.webp", "F.PNG"] {
            let path = tmp.path().join(name);
            image.save(&path, None).unwrap();
            assert!(path.exists(), "{name} was not written");
        }
    }

    #[test]
    fn merge_composites_other_handle() {
        let mut base = Image::create(8, 8).unwrap();
        let mut patch = Image::create(2, 2).unwrap();
        patch.fill_background(&Color::from(0xff_00_00)).unwrap();

        base.merge(&patch, 3, 3, None, None).unwrap();
        base.fill_background(&Color::WHITE).unwrap();
        assert_eq!((base.width().unwrap(), base.height().unwrap()), (8, 8));
    }

    #[test]
    fn custom_backend_goes_through_the_same_lifecycle() {
        let image =
            Image::with_backend(Box::new(StubBackend::new()), Source::blank(320, 240)).unwrap();
        assert_eq!(image.backend_name(), "stub");
        assert_eq!((image.width().unwrap(), image.height().unwrap()), (320, 240));
    }

    #[test]
    fn custom_backend_reports_unsupported_capabilities() {
        let mut image =
            Image::with_backend(Box::new(StubBackend::new()), Source::blank(320, 240)).unwrap();
        assert!(matches!(image.negate(), Err(BackendError::Unsupported(_))));
        // but inherits the geometry-driven resize family
        image.zoom_crop(100, 100, &Color::WHITE).unwrap();
        assert_eq!((image.width().unwrap(), image.height().unwrap()), (100, 100));
    }
}
