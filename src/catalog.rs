//! Closed catalogs: output formats and preset backgrounds.

use crate::error::{Error, Result};
use crate::image::Color;

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Output format, one per supported social placement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum FormatId {
    Story,
    Portrait,
    Square,
}

impl Default for FormatId {
    fn default() -> Self {
        Self::Story
    }
}

impl FormatId {
    pub const ALL: [FormatId; 3] = [Self::Story, Self::Portrait, Self::Square];

    pub fn spec(self) -> FormatSpec {
        match self {
            Self::Story => FormatSpec {
                id: self,
                width_px: 1080,
                height_px: 1920,
                aspect_ratio: "9/16",
            },
            Self::Portrait => FormatSpec {
                id: self,
                width_px: 1080,
                height_px: 1350,
                aspect_ratio: "4/5",
            },
            Self::Square => FormatSpec {
                id: self,
                width_px: 1080,
                height_px: 1080,
                aspect_ratio: "1/1",
            },
        }
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Story => write!(f, "story"),
            Self::Portrait => write!(f, "portrait"),
            Self::Square => write!(f, "square"),
        }
    }
}

/// Pixel dimensions and the CSS-style ratio used to frame previews.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    pub id: FormatId,
    pub width_px: i32,
    pub height_px: i32,
    pub aspect_ratio: &'static str,
}

impl FormatSpec {
    pub fn dims(&self) -> (f64, f64) {
        (self.width_px as f64, self.height_px as f64)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width_px as f64 / 2.0, self.height_px as f64 / 2.0)
    }
}

/// Where a background's pixels come from.
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundSource {
    /// Catalog entry; `url` is the published location, rendering resolves
    /// the same image from the theme assets folder by id.
    Preset { url: &'static str },
    /// User-supplied image file.
    UploadFile(PathBuf),
    /// User-supplied `data:` URL.
    UploadData(String),
}

/// The active background: a preset or a synthesized upload record.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundRef {
    pub id: String,
    pub name: String,
    pub source: BackgroundSource,
    pub accent: Color,
}

impl BackgroundRef {
    pub fn is_upload(&self) -> bool {
        !matches!(self.source, BackgroundSource::Preset { .. })
    }

    pub fn from_upload_file(path: PathBuf) -> Self {
        Self {
            id: "custom".into(),
            name: "Custom upload".into(),
            source: BackgroundSource::UploadFile(path),
            accent: UPLOAD_ACCENT,
        }
    }

    pub fn from_upload_data(url: String) -> Self {
        Self {
            id: "custom".into(),
            name: "Custom upload".into(),
            source: BackgroundSource::UploadData(url),
            accent: UPLOAD_ACCENT,
        }
    }
}

/// Uploads have no designated accent, they render brand marks in white.
const UPLOAD_ACCENT: Color = Color::WHITE;

struct PresetDef {
    id: &'static str,
    name: &'static str,
    url: &'static str,
    accent: &'static str,
}

const PRESET_DEFS: [PresetDef; 6] = [
    PresetDef {
        id: "midnight-worship",
        name: "Midnight Worship",
        url: "https://images.unsplash.com/photo-1470225620780-dba8ba36b745?w=1600",
        accent: "#F9A826",
    },
    PresetDef {
        id: "summer-camp",
        name: "Summer Camp",
        url: "https://images.unsplash.com/photo-1478131143081-80f7f84ca84d?w=1600",
        accent: "#FFD166",
    },
    PresetDef {
        id: "neon-night",
        name: "Neon Night",
        url: "https://images.unsplash.com/photo-1492684223066-81342ee5ff30?w=1600",
        accent: "#4ECDC4",
    },
    PresetDef {
        id: "sunset-hills",
        name: "Sunset Hills",
        url: "https://images.unsplash.com/photo-1506744038136-46273834b3fb?w=1600",
        accent: "#FF6B6B",
    },
    PresetDef {
        id: "city-lights",
        name: "City Lights",
        url: "https://images.unsplash.com/photo-1519501025264-65ba15a82390?w=1600",
        accent: "#C084FC",
    },
    PresetDef {
        id: "white-tent",
        name: "White Tent",
        url: "https://images.unsplash.com/photo-1519167758481-83f550bb49b3?w=1600",
        accent: "#FCA5A5",
    },
];

/// Fixed preset list. Not user-editable.
pub fn presets() -> Vec<BackgroundRef> {
    PRESET_DEFS
        .iter()
        .map(|def| BackgroundRef {
            id: def.id.into(),
            name: def.name.into(),
            source: BackgroundSource::Preset { url: def.url },
            accent: def.accent.parse().unwrap(),
        })
        .collect()
}

/// The preset a fresh layout opens with, also the load-failure fallback.
pub fn default_background() -> BackgroundRef {
    presets().into_iter().next().unwrap()
}

pub fn preset(id: impl AsRef<str>) -> Result<BackgroundRef> {
    let id = id.as_ref();
    presets()
        .into_iter()
        .find(|p| p.id == id)
        .ok_or_else(|| Error::UnknownBackground(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn formats_are_closed_and_sized() {
        let dims: Vec<_> = FormatId::ALL
            .iter()
            .map(|f| (f.spec().width_px, f.spec().height_px))
            .collect();
        assert_eq!(dims, vec![(1080, 1920), (1080, 1350), (1080, 1080)]);
    }

    #[test]
    fn preset_lookup_by_id() {
        let p = preset("neon-night").unwrap();
        assert_eq!(p.name, "Neon Night");
        assert!(!p.is_upload());
    }

    #[test]
    fn unknown_preset_is_an_error() {
        assert!(preset("nope").is_err());
    }

    #[test]
    fn every_preset_accent_parses() {
        for p in presets() {
            assert!(!p.accent.has_alpha());
        }
    }

    #[test]
    fn uploads_are_flagged() {
        let b = BackgroundRef::from_upload_file("x.jpg".into());
        assert!(b.is_upload());
        assert_eq!(b.accent, Color::WHITE);
    }
}
