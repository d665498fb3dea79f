//! Pure dimension math for the resize family.
//!
//! Everything here is arithmetic over source dimensions — no I/O, no pixels,
//! no backend types. Backends consume the computed [`Geometry`] and only
//! perform the blit, so any two adapters given the same inputs produce the
//! same canvas, the same padding, and the same crop box.
//!
//! Five entry points mirror the public resize operations:
//!
//! | Function | Semantics |
//! |---|---|
//! | [`force_geometry`] | exact stretch, ignores aspect ratio |
//! | [`scale_geometry`] | keep aspect ratio, may enlarge; pad (contain) or crop (cover) |
//! | [`crop_geometry`] | `scale_geometry` with cropping — exact box, never padded |
//! | [`resize_geometry`] | general entry point; never enlarges unless forced |
//! | [`zoom_crop_geometry`] | cover the box with the larger scale factor, center-crop |
//!
//! All intermediate scale results truncate toward the integer below, so a
//! result never exceeds a requested bound through rounding. Dimensions are
//! floored at 1 pixel. Crop boxes are expressed in source coordinates and
//! centered with truncating division; scaling the full source by the cover
//! factor and center-cropping the result selects the same region.

use crate::backend::BackendError;
use std::str::FromStr;

/// A requested width: absolute pixels, or a percentage of the source width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extent {
    Px(u32),
    Percent(f64),
}

impl From<u32> for Extent {
    fn from(px: u32) -> Self {
        Extent::Px(px)
    }
}

impl FromStr for Extent {
    type Err = BackendError;

    /// Accepts `"640"` and `"12.5%"` forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(number) = s.strip_suffix('%') {
            let percent: f64 = number
                .trim()
                .parse()
                .map_err(|_| BackendError::invalid(format!("malformed percentage {s:?}")))?;
            if !(percent > 0.0) {
                return Err(BackendError::invalid(format!(
                    "percentage must be positive, got {s:?}"
                )));
            }
            Ok(Extent::Percent(percent))
        } else {
            s.parse::<u32>()
                .map(Extent::Px)
                .map_err(|_| BackendError::invalid(format!("malformed width {s:?}")))
        }
    }
}

/// A crop window in source coordinates. Always lies within the source
/// bounds when produced by this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Computed blit instructions for a resize operation.
///
/// The pipeline a backend executes is fixed: crop the source to `crop` (if
/// any), scale the remainder to `content_width × content_height`, and place
/// it centered on a `canvas_width × canvas_height` canvas. Whenever the
/// content is smaller than the canvas ([`Geometry::is_padded`]), the
/// uncovered canvas area is filled with the caller's background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub content_width: u32,
    pub content_height: u32,
    pub crop: Option<CropBox>,
}

impl Geometry {
    fn identity(source: (u32, u32)) -> Self {
        let (sw, sh) = source;
        Geometry {
            canvas_width: sw,
            canvas_height: sh,
            content_width: sw,
            content_height: sh,
            crop: None,
        }
    }

    pub fn canvas(&self) -> (u32, u32) {
        (self.canvas_width, self.canvas_height)
    }

    pub fn content(&self) -> (u32, u32) {
        (self.content_width, self.content_height)
    }

    /// True when the content does not cover the whole canvas and the gap
    /// must be filled with a background color.
    pub fn is_padded(&self) -> bool {
        self.content_width < self.canvas_width || self.content_height < self.canvas_height
    }

    /// Top-left placement of the content on the canvas (centered,
    /// truncating division).
    pub fn content_offset(&self) -> (u32, u32) {
        (
            (self.canvas_width - self.content_width) / 2,
            (self.canvas_height - self.content_height) / 2,
        )
    }

    /// True when applying this geometry to a source of the given size would
    /// change nothing.
    pub fn is_noop_for(&self, source: (u32, u32)) -> bool {
        self.crop.is_none() && self.canvas() == source && self.content() == source
    }
}

/// `a * num / den` in u64, truncated, floored at 1 pixel.
fn mul_div(a: u32, num: u32, den: u32) -> u32 {
    let scaled = (a as u64) * (num as u64) / (den as u64);
    (scaled as u32).max(1)
}

/// Centered source window of the given size, `None` when it spans the whole
/// source (no crop needed).
fn centered_window(source: (u32, u32), width: u32, height: u32) -> Option<CropBox> {
    let (sw, sh) = source;
    let width = width.min(sw);
    let height = height.min(sh);
    if width == sw && height == sh {
        return None;
    }
    Some(CropBox {
        x: (sw - width) / 2,
        y: (sh - height) / 2,
        width,
        height,
    })
}

/// Cover semantics: scale by the larger of the two axis factors so the
/// content fills the whole `width × height` box, then center-crop the
/// overflow. With `allow_enlarge == false` the factor is capped at 1.0 and
/// the canvas is clamped to the source per axis instead of upscaling.
fn cover_geometry(source: (u32, u32), width: u32, height: u32, allow_enlarge: bool) -> Geometry {
    let (sw, sh) = source;
    // width factor dominates when width/sw >= height/sh
    let wide = (width as u64) * (sh as u64) >= (height as u64) * (sw as u64);
    let enlarging = if wide { width > sw } else { height > sh };

    if enlarging && !allow_enlarge {
        let canvas_width = width.min(sw);
        let canvas_height = height.min(sh);
        return Geometry {
            canvas_width,
            canvas_height,
            content_width: canvas_width,
            content_height: canvas_height,
            crop: centered_window(source, canvas_width, canvas_height),
        };
    }

    // Source window that maps onto the box: the dominant axis spans its
    // whole source dimension, the other is width·sh/height (or mirrored).
    let (window_w, window_h) = if wide {
        (sw, mul_div(height, sw, width).min(sh))
    } else {
        (mul_div(width, sh, height).min(sw), sh)
    };

    Geometry {
        canvas_width: width,
        canvas_height: height,
        content_width: width,
        content_height: height,
        crop: centered_window(source, window_w, window_h),
    }
}

/// Largest dimensions that fit inside `width × height` while preserving the
/// source aspect ratio. Truncates, never returns 0.
fn contain(source: (u32, u32), width: u32, height: u32) -> (u32, u32) {
    let (sw, sh) = source;
    if (width as u64) * (sh as u64) <= (height as u64) * (sw as u64) {
        (width, mul_div(sh, width, sw))
    } else {
        (mul_div(sw, height, sh), height)
    }
}

/// Contain semantics over optional axes. `pad` grows the canvas to the
/// requested box (specified axes only); unspecified axes follow the source
/// aspect ratio and are never padded.
fn contain_geometry(
    source: (u32, u32),
    width: Option<u32>,
    height: Option<u32>,
    allow_enlarge: bool,
    pad: bool,
) -> Geometry {
    let (sw, sh) = source;
    let (content_width, content_height) = match (width, height) {
        (None, None) => return Geometry::identity(source),
        (Some(w), None) => {
            if !allow_enlarge && w >= sw {
                return Geometry::identity(source);
            }
            (w, mul_div(sh, w, sw))
        }
        (None, Some(h)) => {
            if !allow_enlarge && h >= sh {
                return Geometry::identity(source);
            }
            (mul_div(sw, h, sh), h)
        }
        (Some(w), Some(h)) => {
            if !allow_enlarge && w >= sw && h >= sh {
                (sw, sh)
            } else {
                contain(source, w, h)
            }
        }
    };

    let (canvas_width, canvas_height) = if pad {
        (
            width.unwrap_or(content_width).max(content_width),
            height.unwrap_or(content_height).max(content_height),
        )
    } else {
        (content_width, content_height)
    };

    Geometry {
        canvas_width,
        canvas_height,
        content_width,
        content_height,
        crop: None,
    }
}

fn sanitize(axis: Option<u32>) -> Option<u32> {
    axis.map(|v| v.max(1))
}

/// Exact stretch to `width × height`; `None` axes keep the source
/// dimension. Ignores aspect ratio, never crops, never pads.
pub fn force_geometry(source: (u32, u32), width: Option<u32>, height: Option<u32>) -> Geometry {
    let (sw, sh) = source;
    let w = sanitize(width).unwrap_or(sw);
    let h = sanitize(height).unwrap_or(sh);
    Geometry {
        canvas_width: w,
        canvas_height: h,
        content_width: w,
        content_height: h,
        crop: None,
    }
}

/// Aspect-preserving resize, allowed to enlarge.
///
/// With `crop == false` the content is contain-fitted and the canvas padded
/// up to the requested box; an unspecified axis follows the aspect ratio
/// and gets no padding. With `crop == true` (and both axes given) the
/// content covers the box and the overflow is center-cropped away.
pub fn scale_geometry(
    source: (u32, u32),
    width: Option<u32>,
    height: Option<u32>,
    crop: bool,
) -> Geometry {
    match (sanitize(width), sanitize(height)) {
        (Some(w), Some(h)) if crop => cover_geometry(source, w, h, true),
        (w, h) => contain_geometry(source, w, h, true, true),
    }
}

/// Exact `width × height` by cropping, never padding. Equivalent to
/// [`scale_geometry`] with cropping enabled.
pub fn crop_geometry(source: (u32, u32), width: Option<u32>, height: Option<u32>) -> Geometry {
    scale_geometry(source, width, height, true)
}

/// Cover `width × height` with the larger of the two axis scale factors
/// (may enlarge), then center-crop to exactly that box.
pub fn zoom_crop_geometry(source: (u32, u32), width: u32, height: u32) -> Geometry {
    cover_geometry(source, width.max(1), height.max(1), true)
}

/// General entry point. Never enlarges the source unless `force`.
///
/// A percentage width converts against the source width before anything
/// else; when the height is unspecified it is derived from the same
/// percentage. `force` stretches to exactly the requested box. Otherwise
/// the content is contain-fitted with the scale factor capped at 1.0, then
/// `rescale` pads the canvas to the requested box, or `crop` switches to
/// cover semantics (the cover factor capped at 1.0 as well, clamping the
/// canvas to the source instead of upscaling).
pub fn resize_geometry(
    source: (u32, u32),
    width: Option<Extent>,
    height: Option<u32>,
    force: bool,
    rescale: bool,
    crop: bool,
) -> Result<Geometry, BackendError> {
    let (sw, sh) = source;
    let (width, height) = match width {
        Some(Extent::Percent(percent)) => {
            if !(percent > 0.0) {
                return Err(BackendError::invalid(format!(
                    "percentage must be positive, got {percent}"
                )));
            }
            let scale = |axis: u32| ((axis as f64 * percent / 100.0).floor() as u32).max(1);
            (Some(scale(sw)), height.or(Some(scale(sh))))
        }
        Some(Extent::Px(px)) => (Some(px), height),
        None => (None, height),
    };
    let (width, height) = (sanitize(width), sanitize(height));

    if force {
        return Ok(force_geometry(source, width, height));
    }
    Ok(match (width, height) {
        (Some(w), Some(h)) if crop => cover_geometry(source, w, h, false),
        (w, h) => contain_geometry(source, w, h, false, rescale),
    })
}
