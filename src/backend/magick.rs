//! ImageMagick-family adapter skeleton.
//!
//! Present as the shape a bindings-backed implementation would fill in:
//! only the required lifecycle methods exist, and every capability is
//! inherited from the contract's `Unsupported` defaults. Until `init` can
//! actually decode, [`super::create`] refuses to select this backend.

use super::{Backend, BackendError, Binding};
use crate::source::Source;

pub struct MagickBackend {
    binding: Binding<()>,
}

impl MagickBackend {
    pub fn new() -> Self {
        MagickBackend {
            binding: Binding::new(),
        }
    }
}

impl Default for MagickBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MagickBackend {
    fn name(&self) -> &'static str {
        "magick"
    }

    fn set_source(&mut self, source: Source) {
        self.binding.bind(source);
    }

    fn init(&mut self) -> Result<(), BackendError> {
        self.binding.source()?;
        Err(BackendError::unsupported("imagemagick decoding"))
    }

    fn deinit(&mut self) {
        self.binding.clear();
    }

    fn width(&self) -> Result<u32, BackendError> {
        self.binding.resource()?;
        Err(BackendError::unsupported("width"))
    }

    fn height(&self) -> Result<u32, BackendError> {
        self.binding.resource()?;
        Err(BackendError::unsupported("height"))
    }
}
