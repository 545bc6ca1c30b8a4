//! Decodes a layout snapshot into the invite layer stack.
//!
//! The stack shape is fixed; only content, colors and anchors vary. Offsets
//! are deltas from anchors computed against the current canvas, so the
//! composition stays centered across every format without per-format tables.

use crate::catalog::BackgroundRef;
use crate::image::Color;
use crate::layer::{BackdropLayer, FrameLayer, LabelLayer, LayerStack, ScrimLayer, Shadow};
use crate::layout::Layout;

const WORDMARK_TEXT: &str = "ONE WAY YOUTH";
const INVITE_LINE: &str = "YOU'RE INVITED TO";
const GREETING_FALLBACK: &str = "HEY FRIEND!";
const FOOTER_HANDLE: &str = "@oneway.youth";

/// Uploads get a heavier scrim: arbitrary photos need more help than the
/// curated presets.
pub const SCRIM_UPLOAD_ALPHA: f64 = 0.60;
pub const SCRIM_PRESET_ALPHA: f64 = 0.55;

const WORDMARK_Y: f64 = 140.0;
const GREETING_RISE: f64 = 150.0;
const INVITE_LINE_GAP: f64 = 90.0;
const HEADLINE_DROP: f64 = 100.0;
const DETAILS_RISE: f64 = 300.0;
const FOOTER_RISE: f64 = 100.0;

const FRAME_INSET: f64 = 20.0;
const FRAME_WIDTH: f64 = 6.0;

/// The greeting content: `YO {NAME}!`, or the fallback for an empty name.
pub fn greeting_line(friend_name: &str) -> String {
    if friend_name.is_empty() {
        GREETING_FALLBACK.to_string()
    } else {
        format!("YO {}!", friend_name.to_uppercase())
    }
}

pub fn scrim_alpha(background: &BackgroundRef) -> f64 {
    if background.is_upload() {
        SCRIM_UPLOAD_ALPHA
    } else {
        SCRIM_PRESET_ALPHA
    }
}

/// Builds the layer stack for one frame, in draw order.
pub fn decode(layout: &Layout) -> LayerStack {
    let format = layout.format();
    let (_cx, cy) = format.center();
    let (_w, h) = format.dims();
    let offsets = layout.offsets();
    let accent = layout.background().accent;

    let layers: Vec<Box<dyn crate::layer::Layer>> = vec![
        Box::new(BackdropLayer { pan: layout.pan() }),
        Box::new(ScrimLayer {
            alpha: scrim_alpha(layout.background()),
        }),
        Box::new(
            LabelLayer::new(WORDMARK_TEXT, WORDMARK_Y, 44.0, "display")
                .color(accent)
                .letter_spacing(8.0),
        ),
        Box::new(LabelLayer::new(
            greeting_line(layout.friend_name()),
            cy - GREETING_RISE + offsets.greeting,
            64.0,
            "display",
        )),
        Box::new(
            LabelLayer::new(
                INVITE_LINE,
                cy - GREETING_RISE + offsets.greeting + INVITE_LINE_GAP,
                36.0,
                "accent",
            )
            .italic(),
        ),
        Box::new(
            LabelLayer::new(
                layout.event_name().to_uppercase(),
                cy + HEADLINE_DROP + offsets.headline,
                88.0,
                "display",
            )
            .color(accent)
            .shadow(Shadow::default()),
        ),
        Box::new(LabelLayer::new(
            layout.event_details().to_uppercase(),
            h - DETAILS_RISE + offsets.details,
            42.0,
            "caption",
        )),
        Box::new(
            LabelLayer::new(FOOTER_HANDLE, h - FOOTER_RISE, 30.0, "caption")
                .color(Color::WHITE.with_alpha(0.55)),
        ),
        Box::new(FrameLayer {
            color: accent,
            inset: FRAME_INSET,
            width: FRAME_WIDTH,
        }),
    ];
    LayerStack(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::layout::{TextField, TextBlock};
    use pretty_assertions::assert_eq;

    #[test]
    fn greeting_falls_back_when_name_is_empty() {
        assert_eq!(greeting_line(""), "HEY FRIEND!");
    }

    #[test]
    fn greeting_shouts_the_name() {
        assert_eq!(greeting_line("Mark"), "YO MARK!");
    }

    #[test]
    fn scrim_is_heavier_for_uploads() {
        let preset = catalog::default_background();
        let upload = catalog::BackgroundRef::from_upload_file("x.jpg".into());
        assert_eq!(scrim_alpha(&preset), 0.55);
        assert_eq!(scrim_alpha(&upload), 0.60);
    }

    #[test]
    fn stack_has_the_fixed_draw_order() {
        let mut layout = Layout::new();
        layout.set_text(TextField::EventName, "Summer Camp");
        layout.set_offset(TextBlock::Headline, 25.0);
        let LayerStack(layers) = decode(&layout);
        assert_eq!(layers.len(), 9);
    }
}
