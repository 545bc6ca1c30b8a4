//! Implements the drawable layers that compose an invite frame.

mod backdrop;
mod frame;
mod label;
mod scrim;

pub use backdrop::BackdropLayer;
pub use frame::FrameLayer;
pub use label::{LabelLayer, Shadow};
pub use scrim::ScrimLayer;

use crate::error::{Error, Result};
use crate::image::ImgBackend;
use crate::text::FontMap;

use cairo::ImageSurface;
use core::fmt::Debug;

/// Everything a layer may draw with: the backend, resolved fonts, the loaded
/// background image and the output dimensions.
pub struct RenderContext<'a> {
    pub backend: &'a ImgBackend,
    pub fonts: &'a FontMap,
    pub backdrop: &'a ImageSurface,
    pub size: (f64, f64),
}

pub trait Layer: Debug {
    fn render(&self, cr: &cairo::Context, ctx: &RenderContext) -> Result<()>;
}

/// An ordered stack of layers; rendering runs them bottom to top onto one
/// freshly allocated surface.
#[derive(Debug)]
pub struct LayerStack(pub Vec<Box<dyn Layer>>);

impl LayerStack {
    pub fn render(&self, ctx: &RenderContext) -> Result<ImageSurface> {
        let (w, h) = ctx.size;
        let surface = ctx.backend.new_surface(w as i32, h as i32)?;
        let cr = cairo::Context::new(&surface).map_err(Error::cairo)?;

        let LayerStack(layers) = self;
        for layer in layers.iter() {
            layer.render(&cr, ctx)?;
        }
        drop(cr);
        Ok(surface)
    }
}
