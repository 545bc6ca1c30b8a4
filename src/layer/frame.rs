//! The accent border frame.

use crate::error::{Error, Result};
use crate::image::Color;
use crate::layer::{Layer, RenderContext};

/// Constant-width rectangle inset from every edge, in the accent color.
#[derive(Debug, Clone, Copy)]
pub struct FrameLayer {
    pub color: Color,
    pub inset: f64,
    pub width: f64,
}

impl Layer for FrameLayer {
    fn render(&self, cr: &cairo::Context, ctx: &RenderContext) -> Result<()> {
        let (cw, ch) = ctx.size;
        let (r, g, b) = self.color.rgb();
        cr.set_source_rgb(r, g, b);
        cr.set_line_width(self.width);
        cr.rectangle(
            self.inset,
            self.inset,
            cw - 2.0 * self.inset,
            ch - 2.0 * self.inset,
        );
        cr.stroke().map_err(Error::cairo)
    }
}
