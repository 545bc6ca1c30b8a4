//! The layout model: every user-controlled input to the compositor.

use crate::catalog::{self, BackgroundRef, FormatId, FormatSpec};

/// Editable text fields, with their input-time length limits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextField {
    FriendName,
    EventName,
    EventDetails,
}

impl TextField {
    pub fn max_len(self) -> usize {
        match self {
            Self::FriendName => 15,
            Self::EventName => 20,
            Self::EventDetails => 30,
        }
    }
}

/// Text blocks with a user-adjustable vertical offset.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextBlock {
    Greeting,
    Headline,
    Details,
}

/// Vertical pixel deltas applied to each block's computed anchor.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Offsets {
    pub greeting: f64,
    pub headline: f64,
    pub details: f64,
}

pub const OFFSET_RANGE: (f64, f64) = (-300.0, 300.0);

/// Accumulated background translation, in output pixels.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Pan {
    pub x: f64,
    pub y: f64,
}

/// Single source of truth for a rendered frame.
///
/// Mutated only through setters; every observable change bumps `revision`
/// so the owning compositor can coalesce re-renders.
#[derive(Debug, Clone)]
pub struct Layout {
    friend_name: String,
    event_name: String,
    event_details: String,
    background: BackgroundRef,
    format: FormatId,
    offsets: Offsets,
    pan: Pan,
    revision: u64,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout {
    pub fn new() -> Self {
        Self {
            friend_name: String::new(),
            event_name: String::new(),
            event_details: String::new(),
            background: catalog::default_background(),
            format: FormatId::Story,
            offsets: Offsets::default(),
            pan: Pan::default(),
            revision: 0,
        }
    }

    pub fn friend_name(&self) -> &str {
        &self.friend_name
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn event_details(&self) -> &str {
        &self.event_details
    }

    pub fn background(&self) -> &BackgroundRef {
        &self.background
    }

    pub fn format(&self) -> FormatSpec {
        self.format.spec()
    }

    pub fn offsets(&self) -> Offsets {
        self.offsets
    }

    pub fn pan(&self) -> Pan {
        self.pan
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Stores `value` truncated to the field's limit. Empty strings are
    /// allowed; render-side fallbacks cover them.
    pub fn set_text(&mut self, field: TextField, value: impl AsRef<str>) {
        let value = truncate_chars(value.as_ref(), field.max_len());
        match field {
            TextField::FriendName => self.friend_name = value,
            TextField::EventName => self.event_name = value,
            TextField::EventDetails => self.event_details = value,
        }
        self.touch();
    }

    /// Replaces the active background and zeroes the pan.
    pub fn select_background(&mut self, background: BackgroundRef) {
        self.background = background;
        self.pan = Pan::default();
        self.touch();
    }

    /// Synthesizes a background record from an uploaded file and activates it.
    pub fn set_custom_file(&mut self, path: impl Into<std::path::PathBuf>) {
        self.select_background(BackgroundRef::from_upload_file(path.into()));
    }

    /// Synthesizes a background record from an uploaded `data:` URL.
    pub fn set_custom_data(&mut self, url: impl Into<String>) {
        self.select_background(BackgroundRef::from_upload_data(url.into()));
    }

    /// Changes the output dimensions on the next render. Text, offsets and
    /// pan all survive; anchors are recomputed against the new canvas.
    pub fn set_format(&mut self, format: FormatId) {
        self.format = format;
        self.touch();
    }

    pub fn set_offset(&mut self, block: TextBlock, value: f64) {
        let value = value.clamp(OFFSET_RANGE.0, OFFSET_RANGE.1);
        match block {
            TextBlock::Greeting => self.offsets.greeting = value,
            TextBlock::Headline => self.offsets.headline = value,
            TextBlock::Details => self.offsets.details = value,
        }
        self.touch();
    }

    pub fn reset_offsets(&mut self) {
        self.offsets = Offsets::default();
        self.touch();
    }

    pub fn set_pan(&mut self, pan: Pan) {
        self.pan = pan;
        self.touch();
    }

    pub fn reset_pan(&mut self) {
        self.pan = Pan::default();
        self.touch();
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use pretty_assertions::assert_eq;

    #[test]
    fn text_is_truncated_at_entry() {
        let mut layout = Layout::new();
        layout.set_text(TextField::EventName, "THE LONGEST EVENT NAME EVER HELD");
        assert_eq!(layout.event_name().chars().count(), 20);
        assert_eq!(layout.event_name(), "THE LONGEST EVENT NA");

        layout.set_text(TextField::FriendName, "Maximiliano Jones");
        assert_eq!(layout.friend_name(), "Maximiliano Jon");
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let mut layout = Layout::new();
        layout.set_text(TextField::FriendName, "Ána-María Söder!!");
        assert_eq!(layout.friend_name().chars().count(), 15);
    }

    #[test]
    fn offsets_clamp_to_range() {
        let mut layout = Layout::new();
        layout.set_offset(TextBlock::Greeting, -4000.0);
        layout.set_offset(TextBlock::Headline, 301.0);
        layout.set_offset(TextBlock::Details, 299.5);
        assert_eq!(layout.offsets().greeting, -300.0);
        assert_eq!(layout.offsets().headline, 300.0);
        assert_eq!(layout.offsets().details, 299.5);
    }

    #[test]
    fn background_switch_resets_pan() {
        let mut layout = Layout::new();
        layout.set_pan(Pan { x: 50.0, y: -30.0 });
        layout.select_background(catalog::preset("neon-night").unwrap());
        assert_eq!(layout.pan(), Pan::default());
    }

    #[test]
    fn upload_resets_pan_and_flags_custom() {
        let mut layout = Layout::new();
        layout.set_pan(Pan { x: 12.0, y: 8.0 });
        layout.set_custom_file("flyer.jpg");
        assert_eq!(layout.pan(), Pan::default());
        assert!(layout.background().is_upload());
    }

    #[test]
    fn format_switch_preserves_text_and_offsets() {
        let mut layout = Layout::new();
        layout.set_text(TextField::FriendName, "Mark");
        layout.set_text(TextField::EventName, "Summer Camp");
        layout.set_text(TextField::EventDetails, "Fri 7pm");
        layout.set_offset(TextBlock::Headline, 40.0);
        layout.set_pan(Pan { x: 5.0, y: 5.0 });

        layout.set_format(FormatId::Square);

        assert_eq!(layout.friend_name(), "Mark");
        assert_eq!(layout.event_name(), "Summer Camp");
        assert_eq!(layout.event_details(), "Fri 7pm");
        assert_eq!(layout.offsets().headline, 40.0);
        assert_eq!(layout.pan(), Pan { x: 5.0, y: 5.0 });
        assert_eq!(layout.format().width_px, 1080);
        assert_eq!(layout.format().height_px, 1080);
    }

    #[test]
    fn reset_offsets_leaves_pan_alone() {
        let mut layout = Layout::new();
        layout.set_offset(TextBlock::Greeting, 100.0);
        layout.set_pan(Pan { x: 9.0, y: 9.0 });
        layout.reset_offsets();
        assert_eq!(layout.offsets(), Offsets::default());
        assert_eq!(layout.pan(), Pan { x: 9.0, y: 9.0 });
    }

    #[test]
    fn every_setter_bumps_revision() {
        let mut layout = Layout::new();
        let mut last = layout.revision();
        let mut check = |layout: &Layout| {
            assert!(layout.revision() > last);
            last = layout.revision();
        };
        layout.set_text(TextField::FriendName, "A");
        check(&layout);
        layout.set_format(FormatId::Portrait);
        check(&layout);
        layout.set_pan(Pan { x: 1.0, y: 0.0 });
        check(&layout);
        layout.reset_pan();
        check(&layout);
    }
}
