//! Theme configuration: fonts, asset and output folders, guest-list
//! defaults.

#[cfg(feature = "csv")]
use crate::data::CsvSourceConfig;
use crate::error::{Error, Result};
use crate::text::{FontMap, FontSpec};

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A `theme.toml`, discovered in a named dotfolder theme or the current
/// folder. Every section is optional; a missing file means all defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Theme {
    #[serde(default)]
    pub font: HashMap<String, FontSpec>,
    pub assets: Option<AssetsConfig>,
    pub output: Option<OutputConfig>,
    #[serde(default)]
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SourceConfig {
    #[cfg(feature = "csv")]
    pub csv: Option<CsvSourceConfig>,
}

impl Theme {
    /// Resolves a theme by name from the dotfolder, or `./theme.toml`. A
    /// missing unnamed theme falls back to the defaults; a named theme must
    /// exist.
    pub fn find(name: Option<&str>) -> Result<(PathBuf, Self)> {
        match name {
            Some(name) => {
                let mut path = Self::theme_folder()?;
                path.push(name);
                path.push("theme.toml");
                Self::open(&path)
            }
            None => {
                let path = PathBuf::from("./theme.toml");
                if path.exists() {
                    Self::open(&path)
                } else {
                    Ok((PathBuf::from("."), Self::default()))
                }
            }
        }
    }

    pub fn open(path: &Path) -> Result<(PathBuf, Self)> {
        let content = fs::read_to_string(path).map_err(|e| Error::config_open(path, e))?;
        let raw: Self = toml::from_str(&content).map_err(|e| Error::config_deser(path, e))?;
        let folder = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let Theme {
            font,
            assets,
            output,
            source,
        } = raw;
        let font = font
            .into_iter()
            .map(|(k, v)| (k, Self::prefix_font_path(&folder, v)))
            .collect();
        Ok((
            folder,
            Self {
                font,
                assets,
                output,
                source,
            },
        ))
    }

    #[cfg(target_os = "windows")]
    fn theme_folder() -> Result<PathBuf> {
        let home = std::env::var("APPDATA").map_err(|_| Error::NoEnvVariable("APPDATA"))?;
        let mut home = PathBuf::from(home);
        home.push("convite");
        Ok(home)
    }

    #[cfg(target_os = "linux")]
    fn theme_folder() -> Result<PathBuf> {
        let home = std::env::var("HOME").map_err(|_| Error::NoEnvVariable("HOME"))?;
        let mut home = PathBuf::from(home);
        home.push(".convite");
        Ok(home)
    }

    fn prefix_font_path(folder: &Path, spec: FontSpec) -> FontSpec {
        match spec {
            FontSpec::Desc { .. } => spec,
            FontSpec::Path(path) => FontSpec::Path(folder.join(path)),
        }
    }

    /// Role fonts from the theme over the system-sans defaults.
    pub fn font_map(&self) -> Result<FontMap> {
        let mut fonts = FontMap::with_defaults()?;
        for (role, spec) in &self.font {
            fonts.insert(role, spec)?;
        }
        Ok(fonts)
    }

    /// Folder holding the preset background images, `{preset-id}.{ext}`.
    pub fn assets_dir(&self, folder: &Path) -> PathBuf {
        match self.assets.as_ref().and_then(|a| a.path.as_ref()) {
            Some(path) => folder.join(path),
            None => folder.join("assets"),
        }
    }

    /// Theme-relative output folder, when one is configured.
    pub fn output_dir(&self, folder: &Path) -> Option<PathBuf> {
        self.output
            .as_ref()
            .and_then(|o| o.path.as_ref())
            .map(|path| folder.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_a_full_theme() {
        let theme: Theme = toml::from_str(
            r#"
            [font.display]
            path = "fonts/Display.otf"

            [font.caption]
            name = "Open Sans"
            style = "Regular"

            [assets]
            path = "backgrounds"

            [output]
            path = "out"

            [source.csv]
            delimiter = ";"
            "#,
        )
        .unwrap();
        assert!(matches!(theme.font["display"], FontSpec::Path(_)));
        assert!(matches!(theme.font["caption"], FontSpec::Desc { .. }));
        assert_eq!(
            theme.assets_dir(Path::new("/tmp/t")),
            PathBuf::from("/tmp/t/backgrounds")
        );
        assert_eq!(
            theme.output_dir(Path::new("/tmp/t")),
            Some(PathBuf::from("/tmp/t/out"))
        );
        #[cfg(feature = "csv")]
        assert_eq!(theme.source.csv.unwrap().delimiter, ';');
    }

    #[test]
    fn empty_theme_uses_defaults() {
        let theme: Theme = toml::from_str("").unwrap();
        assert!(theme.font.is_empty());
        assert_eq!(theme.assets_dir(Path::new(".")), PathBuf::from("./assets"));
        assert_eq!(theme.output_dir(Path::new(".")), None);
    }
}
