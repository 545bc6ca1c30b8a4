//! Image backend implementation.

mod color;

pub use crate::image::color::Color;

use crate::error::{Error, Result};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use cairo::ImageSurface;
use libvips::{ops, VipsApp, VipsImage};
use std::fs::File;
use std::path::Path;

/// How a source image is scaled into a target rectangle.
#[derive(Debug, Copy, PartialEq, Eq, Clone, Default)]
pub enum FitMode {
    /// Fully covers the target, cropping overflow, preserving aspect.
    #[default]
    Cover,
    /// Fully fits inside the target, leaving gaps, preserving aspect.
    Contain,
}

impl FitMode {
    /// Uniform scale factor taking an `(iw, ih)` image into a `(tw, th)` target.
    pub fn scale(&self, (iw, ih): (f64, f64), (tw, th): (f64, f64)) -> f64 {
        let (sx, sy) = (tw / iw, th / ih);
        match self {
            Self::Cover => sx.max(sy),
            Self::Contain => sx.min(sy),
        }
    }
}

pub struct ImgBackend {
    vips_app: VipsApp,
}

impl ImgBackend {
    pub fn new() -> Result<Self> {
        Ok(Self {
            vips_app: VipsApp::default("convite").map_err(|e| Error::VipsError(e.to_string()))?,
        })
    }

    pub fn err(&self, e: libvips::error::Error) -> Error {
        Error::VipsError(format!(
            "{e}\n{}",
            self.vips_app.error_buffer().unwrap_or_default()
        ))
    }

    fn reinterpret(&self, img: &VipsImage) -> Result<VipsImage> {
        let img = ops::cast(img, ops::BandFormat::Uchar).map_err(|e| self.err(e))?;
        let img = ops::copy_with_opts(
            &img,
            &ops::CopyOptions {
                interpretation: ops::Interpretation::Srgb,
                width: img.get_width(),
                height: img.get_height(),
                bands: img.get_bands(),
                format: ops::BandFormat::Uchar,
                ..Default::default()
            },
        )
        .map_err(|e| self.err(e))?;
        if img.get_bands() == 3 {
            ops::bandjoin_const(&img, &mut [255.0]).map_err(|e| self.err(e))
        } else {
            Ok(img)
        }
    }

    pub fn open(&self, fp: impl AsRef<str>) -> Result<VipsImage> {
        let fp = fp.as_ref();
        let img = VipsImage::new_from_file(fp).map_err(|e| Error::image_open(fp, self.err(e)))?;
        self.reinterpret(&img)
    }

    /// Decodes a `data:<mime>;base64,<payload>` URL into an image.
    pub fn open_data_url(&self, url: impl AsRef<str>) -> Result<VipsImage> {
        let url = url.as_ref();
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| Error::DataUrl("missing `data:` prefix".into()))?;
        let (_mime, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| Error::DataUrl("missing `;base64,` separator".into()))?;
        let bytes = BASE64
            .decode(payload)
            .map_err(|e| Error::DataUrl(e.to_string()))?;
        let img = VipsImage::new_from_buffer(&bytes, "")
            .map_err(|e| Error::image_open("data URL", self.err(e)))?;
        self.reinterpret(&img)
    }

    /// Converts a decoded image into a cairo surface usable as a paint source.
    pub fn to_surface(&self, img: &VipsImage) -> Result<ImageSurface> {
        let buffer = ops::pngsave_buffer(img).map_err(|e| self.err(e))?;
        ImageSurface::create_from_png(&mut buffer.as_slice())
            .map_err(|e| Error::CairoError(e.to_string()))
    }

    pub fn new_surface(&self, width: i32, height: i32) -> Result<ImageSurface> {
        ImageSurface::create(cairo::Format::ARgb32, width, height).map_err(Error::cairo)
    }

    /// PNG-encodes a rendered surface.
    pub fn png_bytes(&self, surface: &ImageSurface) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        surface
            .write_to_png(&mut buffer)
            .map_err(|e| Error::CairoError(e.to_string()))?;
        Ok(buffer)
    }

    /// PNG-encodes a rendered surface as a `data:image/png` URL, for previews.
    pub fn data_url(&self, surface: &ImageSurface) -> Result<String> {
        let bytes = self.png_bytes(surface)?;
        Ok(format!("data:image/png;base64,{}", BASE64.encode(bytes)))
    }

    pub fn write_png(&self, surface: &ImageSurface, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path).map_err(|e| Error::export_write(path, e))?;
        surface
            .write_to_png(&mut file)
            .map_err(|e| Error::export_write(path, e))
    }
}
