//! Common error types.

use std::path::Path;

/// A shortcut type equivalent to `Result<T, convite::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error that occurs within the crate.
#[derive(Debug)]
pub enum Error {
    CairoError(String),
    VipsError(String),
    ImageOpen(String, String),
    DataUrl(String),
    FontUndefined(String),
    LoadFontError(String),
    InvalidCString(String),
    ConfigOpen(String, String),
    ConfigDeser(String, String),
    NoEnvVariable(&'static str),
    UnknownBackground(String),
    NoBackgroundImage,
    ExportWrite(String, String),
    SourceOpen(String, String),
    RecordRead(String),
    PredicateParse(String),
    SendError(usize, String),
    JoinError(usize),
    ReadLockError(&'static str, String),
    MutexLockError(&'static str, String),
}

impl Error {
    pub fn cairo(e: cairo::Error) -> Self {
        Self::CairoError(e.to_string())
    }

    pub fn image_open(src: impl AsRef<str>, e: impl ToString) -> Self {
        Self::ImageOpen(src.as_ref().to_string(), e.to_string())
    }

    pub fn config_open(path: &Path, e: impl ToString) -> Self {
        Self::ConfigOpen(path.display().to_string(), e.to_string())
    }

    pub fn config_deser(path: &Path, e: impl ToString) -> Self {
        Self::ConfigDeser(path.display().to_string(), e.to_string())
    }

    pub fn export_write(path: &Path, e: impl ToString) -> Self {
        Self::ExportWrite(path.display().to_string(), e.to_string())
    }

    pub fn source_open(path: &Path, e: impl ToString) -> Self {
        Self::SourceOpen(path.display().to_string(), e.to_string())
    }

    pub fn record_read(e: impl ToString) -> Self {
        Self::RecordRead(e.to_string())
    }

    pub fn send(id: usize, e: impl ToString) -> Self {
        Self::SendError(id, e.to_string())
    }

    pub fn read_lock(target: &'static str, e: impl ToString) -> Self {
        Self::ReadLockError(target, e.to_string())
    }

    pub fn mutex_lock(target: &'static str, e: impl ToString) -> Self {
        Self::MutexLockError(target, e.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::CairoError(e) => write!(f, "cairo error: {e}"),
            Error::VipsError(e) => write!(f, "vips error: {e}"),
            Error::ImageOpen(src, e) => write!(f, "failed to open image `{src}`: {e}"),
            Error::DataUrl(e) => write!(f, "invalid data URL: {e}"),
            Error::FontUndefined(key) => write!(f, "font `{key}` is not configured"),
            Error::LoadFontError(key) => write!(f, "failed to load font `{key}`"),
            Error::InvalidCString(s) => write!(f, "string contains NUL bytes: {s}"),
            Error::ConfigOpen(path, e) => write!(f, "failed to open theme `{path}`: {e}"),
            Error::ConfigDeser(path, e) => write!(f, "failed to parse theme `{path}`: {e}"),
            Error::NoEnvVariable(var) => write!(f, "missing environment variable: {var}"),
            Error::UnknownBackground(id) => write!(f, "no background with id `{id}`"),
            Error::NoBackgroundImage => write!(f, "background image is not loaded"),
            Error::ExportWrite(path, e) => write!(f, "failed to write `{path}`: {e}"),
            Error::SourceOpen(path, e) => write!(f, "failed to open guest list `{path}`: {e}"),
            Error::RecordRead(e) => write!(f, "failed to read guest record: {e}"),
            Error::PredicateParse(e) => write!(f, "invalid filter: {e}"),
            Error::SendError(id, e) => write!(f, "worker {id} failed to report progress: {e}"),
            Error::JoinError(id) => write!(f, "worker {id} panicked"),
            Error::ReadLockError(t, e) => write!(f, "failed to read-lock {t}: {e}"),
            Error::MutexLockError(t, e) => write!(f, "failed to lock {t}: {e}"),
        }
    }
}

impl std::error::Error for Error {}
