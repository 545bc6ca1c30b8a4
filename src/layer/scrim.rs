//! The legibility scrim drawn over the background.

use crate::error::{Error, Result};
use crate::layer::{Layer, RenderContext};

/// Full-surface translucent black so text stays readable on any image.
#[derive(Debug, Clone, Copy)]
pub struct ScrimLayer {
    pub alpha: f64,
}

impl Layer for ScrimLayer {
    fn render(&self, cr: &cairo::Context, _ctx: &RenderContext) -> Result<()> {
        cr.set_source_rgba(0.0, 0.0, 0.0, self.alpha);
        cr.paint().map_err(Error::cairo)
    }
}
