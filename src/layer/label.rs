//! Horizontally centered single-line text.

use crate::error::{Error, Result};
use crate::image::Color;
use crate::layer::{Layer, RenderContext};

/// A drop shadow pass drawn behind the text.
#[derive(Debug, Clone, Copy)]
pub struct Shadow {
    pub dx: f64,
    pub dy: f64,
    pub color: Color,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            dx: 0.0,
            dy: 4.0,
            color: Color::BLACK.with_alpha(0.5),
        }
    }
}

/// One text block, centered on the canvas X axis with its baseline at `y`.
#[derive(Debug, Clone)]
pub struct LabelLayer {
    pub text: String,
    pub y: f64,
    pub size: f64,
    pub font: &'static str,
    pub color: Color,
    pub italic: bool,
    pub letter_spacing: f64,
    pub shadow: Option<Shadow>,
}

impl LabelLayer {
    pub fn new(text: impl Into<String>, y: f64, size: f64, font: &'static str) -> Self {
        Self {
            text: text.into(),
            y,
            size,
            font,
            color: Color::WHITE,
            italic: false,
            letter_spacing: 0.0,
            shadow: None,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn letter_spacing(mut self, px: f64) -> Self {
        self.letter_spacing = px;
        self
    }

    pub fn shadow(mut self, shadow: Shadow) -> Self {
        self.shadow = Some(shadow);
        self
    }

    fn pango_layout(&self, cr: &cairo::Context, ctx: &RenderContext) -> Result<pango::Layout> {
        let mut desc = ctx
            .fonts
            .get_desc(self.font, self.size)
            .ok_or_else(|| Error::FontUndefined(self.font.to_string()))?;
        if self.italic {
            desc.set_style(pango::Style::Italic);
        }
        let layout = pangocairo::functions::create_layout(cr);
        layout.set_font_description(Some(&desc));
        if self.letter_spacing != 0.0 {
            let attrs = pango::AttrList::new();
            attrs.insert(pango::AttrInt::new_letter_spacing(
                (self.letter_spacing * pango::SCALE as f64) as i32,
            ));
            layout.set_attributes(Some(&attrs));
        }
        layout.set_text(&self.text);
        Ok(layout)
    }

    fn show_at(&self, cr: &cairo::Context, layout: &pango::Layout, x: f64, y: f64, color: Color) {
        let (r, g, b, a) = color.rgba();
        cr.set_source_rgba(r, g, b, a);
        cr.move_to(x, y);
        pangocairo::functions::show_layout(cr, layout);
    }
}

impl Layer for LabelLayer {
    fn render(&self, cr: &cairo::Context, ctx: &RenderContext) -> Result<()> {
        if self.text.is_empty() {
            return Ok(());
        }
        let layout = self.pango_layout(cr, ctx)?;
        let (tw, _th) = layout.pixel_size();
        let baseline = layout.baseline() as f64 / pango::SCALE as f64;

        let (cw, _ch) = ctx.size;
        let x = (cw - tw as f64) / 2.0;
        let top = self.y - baseline;

        cr.save().map_err(Error::cairo)?;
        if let Some(shadow) = self.shadow {
            self.show_at(cr, &layout, x + shadow.dx, top + shadow.dy, shadow.color);
        }
        self.show_at(cr, &layout, x, top, self.color);
        cr.restore().map_err(Error::cairo)
    }
}
