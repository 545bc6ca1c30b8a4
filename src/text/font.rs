//! Management of font files and configuration.

use crate::error::{Error, Result};

use fontconfig::Fontconfig;
use fontconfig_sys::fontconfig as sys;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::collections::HashMap;
use std::ffi::CString;
use std::fmt;
use std::path::{Path, PathBuf};

/// A font requested by the theme, either as a file or a system family.
#[derive(Debug, Clone)]
pub enum FontSpec {
    Path(PathBuf),
    Desc { name: String, style: Option<String> },
}

/// Resolves role keys (`display`, `accent`, `caption`) to loaded fonts.
///
/// Files are registered with fontconfig so pango can shape them; family
/// requests are matched against the system font set.
pub struct FontMap {
    fc: Fontconfig,
    loaded: HashMap<String, String>,
}

impl FontMap {
    pub fn new() -> Result<Self> {
        let fc = Fontconfig::new().ok_or(Error::LoadFontError("fontconfig".into()))?;
        Ok(Self {
            fc,
            loaded: HashMap::new(),
        })
    }

    /// A map with every role bound to a matched system sans family.
    pub fn with_defaults() -> Result<Self> {
        let mut fm = Self::new()?;
        fm.insert_family("display", "Sans", Some("Bold"));
        fm.insert_family("accent", "Sans", Some("Italic"));
        fm.insert_family("caption", "Sans", None);
        Ok(fm)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.loaded.get(key).map(|s| s.as_str())
    }

    /// Pango description for a role at an absolute pixel size.
    pub fn get_desc(&self, key: &str, size_px: f64) -> Option<pango::FontDescription> {
        self.loaded.get(key).map(|name| {
            let mut desc = pango::FontDescription::from_string(name);
            desc.set_absolute_size(size_px * pango::SCALE as f64);
            desc
        })
    }

    pub fn insert(&mut self, key: impl AsRef<str>, spec: &FontSpec) -> Result<()> {
        match spec {
            FontSpec::Path(path) => self.insert_file(key, path),
            FontSpec::Desc { name, style } => {
                self.insert_family(key.as_ref(), name, style.as_deref());
                Ok(())
            }
        }
    }

    /// Matches a family name against the installed set. A miss keeps the
    /// requested name so pango can still apply its own fallback.
    pub fn insert_family(&mut self, key: impl AsRef<str>, family: &str, style: Option<&str>) {
        let name = self
            .fc
            .find(family, style)
            .map(|font| font.name)
            .unwrap_or_else(|| match style {
                Some(style) => format!("{family} {style}"),
                None => family.to_string(),
            });
        self.loaded.insert(key.as_ref().to_string(), name);
    }

    /// Registers a font file with fontconfig and binds its family to `key`.
    pub fn insert_file(&mut self, key: impl AsRef<str>, fp: impl AsRef<Path>) -> Result<()> {
        let key = key.as_ref();
        let fp = fp.as_ref();
        let c_fp = CString::new(fp.to_string_lossy().to_string())
            .map_err(|_| Error::InvalidCString(fp.to_string_lossy().to_string()))?;

        let name = Self::scan_family(&c_fp).ok_or_else(|| Error::LoadFontError(key.into()))?;
        let status = unsafe {
            sys::FcConfigAppFontAddFile(std::ptr::null_mut(), c_fp.as_ptr() as *const sys::FcChar8)
        };
        if status == 0 {
            return Err(Error::LoadFontError(key.into()));
        }
        self.loaded.insert(key.to_string(), name);
        Ok(())
    }

    fn scan_family(c_fp: &CString) -> Option<String> {
        unsafe {
            let set = sys::FcFontSetCreate();
            let status = sys::FcFileScan(
                set,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                c_fp.as_ptr() as *const sys::FcChar8,
                1,
            );
            let result = if status == 0 || (*set).nfont < 1 {
                None
            } else {
                let pat = *(*set).fonts;
                let mut family: *mut sys::FcChar8 = std::ptr::null_mut();
                let matched = sys::FcPatternGetString(
                    pat,
                    sys::constants::FC_FAMILY.as_cstr().as_ptr(),
                    0,
                    &mut family,
                );
                (matched == sys::FcResultMatch).then(|| {
                    std::ffi::CStr::from_ptr(family as *const std::os::raw::c_char)
                        .to_string_lossy()
                        .into_owned()
                })
            };
            sys::FcFontSetDestroy(set);
            result
        }
    }
}

struct FontSpecVisitor;

impl<'de> Visitor<'de> for FontSpecVisitor {
    type Value = FontSpec;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map with either `path` or `name` set")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        let mut name: Option<String> = None;
        let mut style: Option<String> = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "path" => {
                    let path = map.next_value::<PathBuf>()?;
                    return Ok(FontSpec::Path(path));
                }
                "name" => {
                    name = Some(map.next_value::<String>()?);
                }
                "style" => {
                    style = Some(map.next_value::<String>()?);
                }
                _ => {
                    return Err(de::Error::unknown_field(
                        key.as_str(),
                        &["path", "name", "style"],
                    ))
                }
            }
        }
        match name {
            Some(name) => Ok(FontSpec::Desc { name, style }),
            None => Err(de::Error::missing_field("name")),
        }
    }
}

impl<'de> Deserialize<'de> for FontSpec {
    fn deserialize<D>(deserializer: D) -> std::result::Result<FontSpec, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(FontSpecVisitor)
    }
}
