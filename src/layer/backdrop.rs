//! The cover-fitted, pannable background image layer.

use crate::error::{Error, Result};
use crate::image::FitMode;
use crate::layer::{Layer, RenderContext};
use crate::layout::Pan;

/// Scales the background to fully cover the canvas (cropping overflow) and
/// shifts the visible window by the accumulated pan. The crop scale never
/// changes with pan, only which part of the image shows.
#[derive(Debug, Clone)]
pub struct BackdropLayer {
    pub pan: Pan,
}

impl Layer for BackdropLayer {
    fn render(&self, cr: &cairo::Context, ctx: &RenderContext) -> Result<()> {
        let (cw, ch) = ctx.size;
        let (iw, ih) = (ctx.backdrop.width() as f64, ctx.backdrop.height() as f64);
        let s = FitMode::Cover.scale((iw, ih), (cw, ch));
        let dx = (cw - iw * s) / 2.0 + self.pan.x;
        let dy = (ch - ih * s) / 2.0 + self.pan.y;

        // Opaque base, in case an extreme pan drags the image off-canvas.
        cr.set_source_rgb(0.0, 0.0, 0.0);
        cr.paint().map_err(Error::cairo)?;

        cr.save().map_err(Error::cairo)?;
        cr.translate(dx, dy);
        cr.scale(s, s);
        cr.set_source_surface(ctx.backdrop, 0.0, 0.0)
            .map_err(Error::cairo)?;
        cr.paint().map_err(Error::cairo)?;
        cr.restore().map_err(Error::cairo)
    }
}
