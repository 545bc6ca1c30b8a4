//! End-to-end rendering checks against a synthetic background image.

use convite::catalog::FormatId;
use convite::compositor::Compositor;
use convite::gesture::PointerPos;
use convite::image::ImgBackend;
use convite::layout::{Pan, TextBlock, TextField};
use convite::text::FontMap;

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// vips is initialized once per process; every test shares the backend.
fn backend() -> &'static ImgBackend {
    static BACKEND: OnceLock<ImgBackend> = OnceLock::new();
    BACKEND.get_or_init(|| ImgBackend::new().expect("vips runtime"))
}

fn fonts() -> &'static FontMap {
    static FONTS: OnceLock<FontMap> = OnceLock::new();
    FONTS.get_or_init(|| FontMap::with_defaults().expect("fontconfig runtime"))
}

fn workdir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("convite-{}-{name}", std::process::id()));
    fs::create_dir_all(&dir).expect("create test dir");
    dir
}

/// Paints a diagonal gradient so different crops hash differently.
fn fixture_background(dir: &Path) -> PathBuf {
    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 800, 500).unwrap();
    let cr = cairo::Context::new(&surface).unwrap();
    let gradient = cairo::LinearGradient::new(0.0, 0.0, 800.0, 500.0);
    gradient.add_color_stop_rgb(0.0, 0.05, 0.15, 0.75);
    gradient.add_color_stop_rgb(1.0, 0.95, 0.45, 0.10);
    cr.set_source(&gradient).unwrap();
    cr.paint().unwrap();
    drop(cr);
    let path = dir.join("backdrop.png");
    let mut file = fs::File::create(&path).unwrap();
    surface.write_to_png(&mut file).unwrap();
    path
}

fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[test]
fn identical_layouts_render_identical_frames() {
    let dir = workdir("determinism");
    let bg = fixture_background(&dir);

    let mut compositor = Compositor::new(backend(), fonts());
    compositor.set_custom_file(&bg);
    compositor.load_background().unwrap();
    compositor.set_text(TextField::FriendName, "Mark");
    compositor.set_text(TextField::EventName, "Summer Camp");
    compositor.set_text(TextField::EventDetails, "Fri 7pm, Main Hall");
    compositor.set_offset(TextBlock::Headline, 40.0);
    assert!(compositor.refresh().unwrap());
    let first = digest(&compositor.preview_png().unwrap());

    // Nothing changed: the pass coalesces away.
    assert!(!compositor.refresh().unwrap());

    // Re-entering the same text forces a fresh pass over identical inputs.
    compositor.set_text(TextField::FriendName, "Mark");
    assert!(compositor.refresh().unwrap());
    let second = digest(&compositor.preview_png().unwrap());

    assert_eq!(first, second);
}

#[test]
fn format_switch_changes_only_dimensions() {
    let dir = workdir("format");
    let bg = fixture_background(&dir);

    let mut compositor = Compositor::new(backend(), fonts());
    compositor.set_custom_file(&bg);
    compositor.load_background().unwrap();
    compositor.set_text(TextField::FriendName, "Mark");
    compositor.set_offset(TextBlock::Headline, 40.0);
    assert!(compositor.refresh().unwrap());
    let surface = compositor.surface().unwrap();
    assert_eq!((surface.width(), surface.height()), (1080, 1920));

    compositor.set_format(FormatId::Square);
    assert!(compositor.refresh().unwrap());
    let surface = compositor.surface().unwrap();
    assert_eq!((surface.width(), surface.height()), (1080, 1080));
    assert_eq!(compositor.layout().friend_name(), "Mark");
    assert_eq!(compositor.layout().offsets().headline, 40.0);
}

#[test]
fn drag_gesture_shifts_the_visible_crop() {
    let dir = workdir("pan");
    let bg = fixture_background(&dir);

    let mut compositor = Compositor::new(backend(), fonts());
    compositor.set_custom_file(&bg);
    compositor.load_background().unwrap();
    assert!(compositor.refresh().unwrap());
    let centered = digest(&compositor.preview_png().unwrap());

    compositor.pointer_down(PointerPos::new(300.0, 300.0));
    compositor.pointer_move(PointerPos::new(316.0, 310.0));
    compositor.pointer_up();
    assert_eq!(compositor.layout().pan(), Pan { x: 40.0, y: 25.0 });

    assert!(compositor.refresh().unwrap());
    let panned = digest(&compositor.preview_png().unwrap());
    assert_ne!(centered, panned);
}

#[test]
fn export_writes_the_named_png() {
    let dir = workdir("export");
    let bg = fixture_background(&dir);

    let mut compositor = Compositor::new(backend(), fonts());
    compositor.set_custom_file(&bg);
    compositor.load_background().unwrap();
    compositor.set_text(TextField::FriendName, "Ana");
    compositor.set_format(FormatId::Square);
    assert!(compositor.refresh().unwrap());

    let path = compositor.export_to(&dir).unwrap();
    assert_eq!(path.file_name().unwrap(), "Invite-square-Ana.png");
    assert!(fs::metadata(&path).unwrap().len() > 0);
}

#[test]
fn unnamed_export_uses_the_friend_token() {
    let compositor = Compositor::new(backend(), fonts());
    assert_eq!(compositor.export_filename(), "Invite-story-Friend.png");
}

#[test]
fn failed_load_keeps_the_previous_surface() {
    let dir = workdir("failed-load");
    let bg = fixture_background(&dir);

    let mut compositor = Compositor::new(backend(), fonts());
    compositor.set_custom_file(&bg);
    compositor.load_background().unwrap();
    compositor.set_text(TextField::EventName, "Game Night");
    assert!(compositor.refresh().unwrap());
    let before = digest(&compositor.preview_png().unwrap());

    compositor.set_custom_file(dir.join("missing.png"));
    assert!(compositor.load_background().is_err());
    assert!(compositor.background_error().is_some());
    assert!(!compositor.refresh().unwrap());
    let after = digest(&compositor.preview_png().unwrap());
    assert_eq!(before, after);
}

#[test]
fn data_url_upload_renders_like_the_file() {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;

    let dir = workdir("data-url");
    let bg = fixture_background(&dir);
    let url = format!("data:image/png;base64,{}", BASE64.encode(fs::read(&bg).unwrap()));

    let mut from_file = Compositor::new(backend(), fonts());
    from_file.set_custom_file(&bg);
    from_file.load_background().unwrap();
    from_file.set_text(TextField::EventName, "Lock-In");
    assert!(from_file.refresh().unwrap());

    let mut from_url = Compositor::new(backend(), fonts());
    from_url.set_custom_data(url);
    from_url.load_background().unwrap();
    from_url.set_text(TextField::EventName, "Lock-In");
    assert!(from_url.refresh().unwrap());

    assert_eq!(
        digest(&from_file.preview_png().unwrap()),
        digest(&from_url.preview_png().unwrap())
    );
}

#[test]
fn preview_data_url_is_png() {
    let dir = workdir("preview");
    let bg = fixture_background(&dir);

    let mut compositor = Compositor::new(backend(), fonts());
    compositor.set_custom_file(&bg);
    compositor.load_background().unwrap();
    assert!(compositor.refresh().unwrap());
    let url = compositor.preview_data_url().unwrap();
    assert!(url.starts_with("data:image/png;base64,"));
}
