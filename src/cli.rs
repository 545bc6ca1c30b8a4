//! CLI implementation.
mod theme;

pub use crate::cli::theme::Theme;

use crate::catalog::{self, BackgroundRef, BackgroundSource, FormatId};
use crate::compositor::Compositor;
#[cfg(feature = "csv")]
use crate::data::CsvSource;
#[cfg(feature = "csv")]
use crate::data::Predicate;
use crate::error::{Error, Result};
use crate::image::ImgBackend;
use crate::layout::{Offsets, Pan, TextField};
use crate::pipeline::{InviteSpec, Pipeline};
use crate::text::FontMap;

use clap::Parser;
use regex::Regex;
use std::fs;
use std::num::NonZero;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Compose and export social-media invite images for ministry events
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[cfg(target_os = "linux")]
    /// Theme name, corresponding to a folder in ~/.convite,
    /// or the current folder if omitted.
    pub theme: Option<String>,

    #[cfg(target_os = "windows")]
    /// Theme name, corresponding to a folder in %APPDATA%/convite,
    /// or the current folder if omitted.
    pub theme: Option<String>,

    /// Friend name for the greeting; omitted renders the generic greeting
    #[arg(short = 'n', long)]
    pub friend: Option<String>,

    /// Event name headline
    #[arg(short, long, default_value = "")]
    pub event: String,

    /// Event details line
    #[arg(short, long, default_value = "")]
    pub details: String,

    /// Preset background id
    #[arg(short, long)]
    pub background: Option<String>,

    /// Custom background image file, replaces any preset choice
    #[arg(short, long)]
    pub upload: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = FormatId::Story)]
    pub format: FormatId,

    /// Vertical shift of the greeting block, in pixels
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub offset_greeting: f64,

    /// Vertical shift of the headline block, in pixels
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub offset_headline: f64,

    /// Vertical shift of the details block, in pixels
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub offset_details: f64,

    /// Background pan as `X,Y` pixel deltas
    #[arg(long)]
    pub pan: Option<Shift>,

    /// Output folder
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[cfg(feature = "csv")]
    /// Guest list CSV; renders one invite per record
    #[arg(short, long)]
    pub guests: Option<PathBuf>,

    #[cfg(feature = "csv")]
    /// Optionally filters guest records
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Number of worker threads
    #[arg(short, long, default_value_t = NonZero::new(4).unwrap())]
    pub workers: NonZero<usize>,

    /// Print the preset background catalog and exit
    #[arg(long)]
    pub list_backgrounds: bool,

    /// Print the output format catalog and exit
    #[arg(long)]
    pub list_formats: bool,
}

macro_rules! error {
    ($res:expr) => {
        $res.unwrap_or_else(|e| panic!("{e}"))
    };
}

impl Cli {
    pub fn run() {
        std::panic::set_hook(Box::new(|panic_info| {
            if let Some(s) = panic_info.payload().downcast_ref::<String>() {
                eprintln!("{s}");
            } else {
                eprintln!("{panic_info}");
            }
        }));

        let cli = Self::parse();
        if cli.list_backgrounds {
            Self::print_backgrounds();
            return;
        }
        if cli.list_formats {
            Self::print_formats();
            return;
        }

        let (folder, theme) = error!(Theme::find(cli.theme.as_deref()));
        let fonts = error!(theme.font_map());
        let assets_dir = theme.assets_dir(&folder);
        let out_dir = cli
            .output
            .clone()
            .or_else(|| theme.output_dir(&folder))
            .unwrap_or_else(|| PathBuf::from("."));
        error!(fs::create_dir_all(&out_dir).map_err(|e| Error::export_write(&out_dir, e)));

        #[cfg(feature = "csv")]
        if let Some(guests) = cli.guests.clone() {
            error!(cli.run_batch(&guests, &theme, fonts, assets_dir, out_dir));
            return;
        }
        error!(cli.run_single(fonts, assets_dir, out_dir));
    }

    fn run_single(&self, fonts: FontMap, assets_dir: PathBuf, out_dir: PathBuf) -> Result<()> {
        let backend = ImgBackend::new()?;
        let mut compositor = Compositor::new(&backend, &fonts);
        compositor.set_assets_dir(Some(assets_dir));
        self.spec()?.configure(&mut compositor);
        if let Some(name) = &self.friend {
            compositor.set_text(TextField::FriendName, name);
        }
        if let Err(e) = compositor.load_background() {
            eprintln!("warning: {e}; using the default background");
            compositor.use_fallback_background();
            compositor.load_background()?;
        }
        compositor.refresh()?;
        let path = compositor.export_to(&out_dir)?;
        println!("{}", path.display());
        Ok(())
    }

    #[cfg(feature = "csv")]
    fn run_batch(
        &self,
        guests: &Path,
        theme: &Theme,
        fonts: FontMap,
        assets_dir: PathBuf,
        out_dir: PathBuf,
    ) -> Result<()> {
        let config = theme.source.csv.unwrap_or_default();
        let source = CsvSource::open(config, guests)?;
        let filter = self
            .filter
            .as_ref()
            .map(|f| Predicate::from_string(f))
            .transpose()?;
        let pipeline = Pipeline::new(
            self.workers,
            Box::new(source),
            self.spec()?,
            fonts,
            Some(assets_dir),
            out_dir,
        )?;
        pipeline.run(filter)
    }

    fn spec(&self) -> Result<InviteSpec> {
        let background = match (&self.upload, &self.background) {
            (Some(path), _) => BackgroundRef::from_upload_file(path.clone()),
            (None, Some(id)) => catalog::preset(id)?,
            (None, None) => catalog::default_background(),
        };
        Ok(InviteSpec {
            event_name: self.event.clone(),
            event_details: self.details.clone(),
            background,
            format: self.format,
            offsets: Offsets {
                greeting: self.offset_greeting,
                headline: self.offset_headline,
                details: self.offset_details,
            },
            pan: self.pan.map(|s| s.0).unwrap_or_default(),
        })
    }

    fn print_backgrounds() {
        for preset in catalog::presets() {
            if let BackgroundSource::Preset { url } = preset.source {
                println!("{:<18} {:<16} {}  {url}", preset.id, preset.name, preset.accent);
            }
        }
    }

    fn print_formats() {
        for format in FormatId::ALL {
            let spec = format.spec();
            println!(
                "{:<10} {}x{} ({})",
                format, spec.width_px, spec.height_px, spec.aspect_ratio
            );
        }
    }
}

/// Background pan passed on the command line.
#[derive(Debug, Clone, Copy)]
pub struct Shift(pub Pan);

impl FromStr for Shift {
    type Err = &'static str;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let re = Regex::new(r"^([+-]?\d+(?:\.\d+)?)\s*,\s*([+-]?\d+(?:\.\d+)?)$").unwrap();

        let captures = re
            .captures(s)
            .ok_or("string not in form X,Y where X and Y are numbers")?;
        let x = captures.get(1).unwrap().as_str().parse().unwrap();
        let y = captures.get(2).unwrap().as_str().parse().unwrap();
        Ok(Self(Pan { x, y }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn shift_parses_signed_decimals() {
        let Shift(pan) = "12.5,-30".parse().unwrap();
        assert_eq!(pan, Pan { x: 12.5, y: -30.0 });
        let Shift(pan) = "-4 , 8".parse().unwrap();
        assert_eq!(pan, Pan { x: -4.0, y: 8.0 });
    }

    #[test]
    fn shift_rejects_garbage() {
        assert!("12".parse::<Shift>().is_err());
        assert!("a,b".parse::<Shift>().is_err());
        assert!("1,2,3".parse::<Shift>().is_err());
    }
}
