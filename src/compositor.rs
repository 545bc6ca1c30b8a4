//! The compositor: owns the layout, the loaded background and the last
//! rendered surface, and re-renders with one coalesced pass per batch of
//! changes.

use crate::catalog::{self, BackgroundRef, BackgroundSource, FormatId};
use crate::decode;
use crate::error::{Error, Result};
use crate::gesture::{PanTranslator, PointerPos};
use crate::image::ImgBackend;
use crate::layer::RenderContext;
use crate::layout::{Layout, Pan, TextBlock, TextField};
use crate::text::FontMap;

use cairo::ImageSurface;
use std::path::{Path, PathBuf};

const PRESET_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Load state of the active background image.
///
/// Rendering only runs against `Loaded`; a failed or pending load leaves the
/// previous surface in place.
pub enum BackgroundState {
    Pending,
    Loaded(ImageSurface),
    Failed(String),
}

pub struct Compositor<'a> {
    backend: &'a ImgBackend,
    fonts: &'a FontMap,
    layout: Layout,
    translator: PanTranslator,
    background: BackgroundState,
    assets_dir: Option<PathBuf>,
    surface: Option<ImageSurface>,
    rendered_revision: Option<u64>,
}

impl<'a> Compositor<'a> {
    pub fn new(backend: &'a ImgBackend, fonts: &'a FontMap) -> Self {
        Self {
            backend,
            fonts,
            layout: Layout::new(),
            translator: PanTranslator::new(),
            background: BackgroundState::Pending,
            assets_dir: None,
            surface: None,
            rendered_revision: None,
        }
    }

    /// Folder holding the preset images, named `{preset-id}.{ext}`.
    pub fn set_assets_dir(&mut self, dir: Option<PathBuf>) {
        self.assets_dir = dir;
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    // Text, format, offset and pan edits delegate straight to the layout;
    // background edits also invalidate the loaded image.

    pub fn set_text(&mut self, field: TextField, value: impl AsRef<str>) {
        self.layout.set_text(field, value);
    }

    pub fn set_format(&mut self, format: FormatId) {
        self.layout.set_format(format);
    }

    pub fn set_offset(&mut self, block: TextBlock, value: f64) {
        self.layout.set_offset(block, value);
    }

    pub fn reset_offsets(&mut self) {
        self.layout.reset_offsets();
    }

    pub fn set_pan(&mut self, pan: Pan) {
        self.layout.set_pan(pan);
    }

    pub fn reset_pan(&mut self) {
        self.layout.reset_pan();
    }

    pub fn select_background(&mut self, background: BackgroundRef) {
        self.layout.select_background(background);
        self.background = BackgroundState::Pending;
    }

    pub fn select_preset(&mut self, id: impl AsRef<str>) -> Result<()> {
        let preset = catalog::preset(id)?;
        self.select_background(preset);
        Ok(())
    }

    pub fn set_custom_file(&mut self, path: impl Into<PathBuf>) {
        self.layout.set_custom_file(path);
        self.background = BackgroundState::Pending;
    }

    pub fn set_custom_data(&mut self, url: impl Into<String>) {
        self.layout.set_custom_data(url);
        self.background = BackgroundState::Pending;
    }

    /// Falls back to the default preset, e.g. after a failed load.
    pub fn use_fallback_background(&mut self) {
        self.select_background(catalog::default_background());
    }

    // Pointer gestures. Moves update the pan only while a session is active.

    pub fn pointer_down(&mut self, at: PointerPos) {
        self.translator.pointer_down(at, self.layout.pan());
    }

    pub fn pointer_move(&mut self, at: PointerPos) {
        if let Some(pan) = self.translator.pointer_move(at) {
            self.layout.set_pan(pan);
        }
    }

    pub fn pointer_up(&mut self) {
        self.translator.pointer_up();
    }

    pub fn is_dragging(&self) -> bool {
        self.translator.is_dragging()
    }

    /// Decodes the active background into a drawable surface. On failure the
    /// state records the reason, the previous surface stays and the error is
    /// also handed back for reporting.
    pub fn load_background(&mut self) -> Result<()> {
        let result = self.decode_background();
        match result {
            Ok(surface) => {
                self.background = BackgroundState::Loaded(surface);
                // Force the next refresh to regenerate against the new image.
                self.rendered_revision = None;
                Ok(())
            }
            Err(e) => {
                self.background = BackgroundState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    fn decode_background(&self) -> Result<ImageSurface> {
        let background = self.layout.background();
        let img = match &background.source {
            BackgroundSource::Preset { .. } => {
                let path = self.preset_path(&background.id)?;
                self.backend.open(path.to_string_lossy())?
            }
            BackgroundSource::UploadFile(path) => self.backend.open(path.to_string_lossy())?,
            BackgroundSource::UploadData(url) => self.backend.open_data_url(url)?,
        };
        self.backend.to_surface(&img)
    }

    fn preset_path(&self, id: &str) -> Result<PathBuf> {
        let dir = self
            .assets_dir
            .as_ref()
            .ok_or_else(|| Error::image_open(id, "no assets folder configured"))?;
        let mut path = dir.join(id);
        PRESET_EXTENSIONS
            .iter()
            .find_map(|ext| {
                path.set_extension(ext);
                path.exists().then(|| path.clone())
            })
            .ok_or_else(|| Error::image_open(id, "no matching file in assets folder"))
    }

    pub fn is_background_loaded(&self) -> bool {
        matches!(self.background, BackgroundState::Loaded(_))
    }

    pub fn background_error(&self) -> Option<&str> {
        match &self.background {
            BackgroundState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// One render pass reflecting every change since the last one.
    ///
    /// Returns `true` if a new surface was produced, `false` if the pass was
    /// skipped: nothing changed, or the background is not loaded yet.
    pub fn refresh(&mut self) -> Result<bool> {
        let BackgroundState::Loaded(backdrop) = &self.background else {
            return Ok(false);
        };
        if self.rendered_revision == Some(self.layout.revision()) {
            return Ok(false);
        }
        let format = self.layout.format();
        let ctx = RenderContext {
            backend: self.backend,
            fonts: self.fonts,
            backdrop,
            size: format.dims(),
        };
        let stack = decode::decode(&self.layout);
        let surface = stack.render(&ctx)?;
        self.surface = Some(surface);
        self.rendered_revision = Some(self.layout.revision());
        Ok(true)
    }

    pub fn surface(&self) -> Option<&ImageSurface> {
        self.surface.as_ref()
    }

    /// PNG bytes of the last rendered frame, for the live preview.
    pub fn preview_png(&self) -> Result<Vec<u8>> {
        let surface = self.surface.as_ref().ok_or(Error::NoBackgroundImage)?;
        self.backend.png_bytes(surface)
    }

    /// The last rendered frame as a `data:image/png` URL.
    pub fn preview_data_url(&self) -> Result<String> {
        let surface = self.surface.as_ref().ok_or(Error::NoBackgroundImage)?;
        self.backend.data_url(surface)
    }

    /// `Invite-{format}-{name}.png`; an unnamed invite exports as "Friend".
    pub fn export_filename(&self) -> String {
        let name = match self.layout.friend_name() {
            "" => "Friend",
            name => name,
        };
        format!("Invite-{}-{}.png", self.layout.format().id, name)
    }

    /// Writes the last rendered frame into `dir`, returning the full path.
    pub fn export_to(&self, dir: &Path) -> Result<PathBuf> {
        let surface = self.surface.as_ref().ok_or(Error::NoBackgroundImage)?;
        let path = dir.join(self.export_filename());
        self.backend.write_png(surface, &path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Constructing a backend needs a vips runtime, so filename rules are
    // checked through the layout alone.

    #[test]
    fn export_name_uses_friend_fallback() {
        let layout = Layout::new();
        let name = match layout.friend_name() {
            "" => "Friend",
            name => name,
        };
        assert_eq!(
            format!("Invite-{}-{}.png", layout.format().id, name),
            "Invite-story-Friend.png"
        );
    }
}
