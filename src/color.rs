//! Color arguments for drawing and fill operations.
//!
//! The contract accepts either a packed 24-bit RGB integer (`0xRRGGBB`) or a
//! symbolic color name. Both forms are carried as [`Color`] and resolved to a
//! concrete RGBA pixel by the backend at draw time via [`Color::to_rgba`].

use crate::backend::BackendError;
use image::Rgba;

/// A color argument: packed `0xRRGGBB` integer or a symbolic name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Color {
    Packed(u32),
    Named(String),
}

/// Symbolic names recognized by every bundled backend.
///
/// `transparent` maps to a fully transparent pixel; everything else is
/// opaque. Lookup is case-insensitive.
const NAMED: &[(&str, [u8; 4])] = &[
    ("black", [0x00, 0x00, 0x00, 0xff]),
    ("white", [0xff, 0xff, 0xff, 0xff]),
    ("red", [0xff, 0x00, 0x00, 0xff]),
    ("green", [0x00, 0x80, 0x00, 0xff]),
    ("lime", [0x00, 0xff, 0x00, 0xff]),
    ("blue", [0x00, 0x00, 0xff, 0xff]),
    ("yellow", [0xff, 0xff, 0x00, 0xff]),
    ("cyan", [0x00, 0xff, 0xff, 0xff]),
    ("magenta", [0xff, 0x00, 0xff, 0xff]),
    ("orange", [0xff, 0xa5, 0x00, 0xff]),
    ("gray", [0x80, 0x80, 0x80, 0xff]),
    ("grey", [0x80, 0x80, 0x80, 0xff]),
    ("silver", [0xc0, 0xc0, 0xc0, 0xff]),
    ("maroon", [0x80, 0x00, 0x00, 0xff]),
    ("purple", [0x80, 0x00, 0x80, 0xff]),
    ("navy", [0x00, 0x00, 0x80, 0xff]),
    ("teal", [0x00, 0x80, 0x80, 0xff]),
    ("olive", [0x80, 0x80, 0x00, 0xff]),
    ("transparent", [0x00, 0x00, 0x00, 0x00]),
];

impl Color {
    /// Conventional default background for resize padding and fills.
    pub const WHITE: Color = Color::Packed(0xff_ff_ff);
    /// Conventional default for drawing primitives and text.
    pub const BLACK: Color = Color::Packed(0x00_00_00);

    pub fn named(name: impl Into<String>) -> Self {
        Color::Named(name.into())
    }

    /// Resolve to a concrete RGBA pixel.
    ///
    /// Packed values must fit in 24 bits; unknown names are rejected rather
    /// than falling back to a default.
    pub fn to_rgba(&self) -> Result<Rgba<u8>, BackendError> {
        match self {
            Color::Packed(value) => {
                if *value > 0xff_ff_ff {
                    return Err(BackendError::invalid(format!(
                        "packed color {value:#x} exceeds 24 bits"
                    )));
                }
                let [_, r, g, b] = value.to_be_bytes();
                Ok(Rgba([r, g, b, 0xff]))
            }
            Color::Named(name) => NAMED
                .iter()
                .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
                .map(|(_, rgba)| Rgba(*rgba))
                .ok_or_else(|| BackendError::invalid(format!("unknown color name {name:?}"))),
        }
    }
}

impl From<u32> for Color {
    fn from(packed: u32) -> Self {
        Color::Packed(packed)
    }
}

impl From<&str> for Color {
    fn from(name: &str) -> Self {
        Color::Named(name.to_string())
    }
}
