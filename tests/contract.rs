//! End-to-end walkthrough of the public contract: open, transform, save,
//! reload, and the generation retry loop — everything through the crate's
//! front door, with real files in temp directories.

use rasterly::{Artifact, BackendError, Color, Extent, Image, generation};
use std::path::Path;

/// Write a landscape JPEG test card and return its path.
fn create_source_jpeg(dir: &Path, width: u32, height: u32) -> std::path::PathBuf {
    let path = dir.join("source.jpg");
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save(&path).unwrap();
    path
}

#[test]
fn open_resize_save_reload() {
    let tmp = tempfile::TempDir::new().unwrap();
    let source = create_source_jpeg(tmp.path(), 800, 600);

    let mut image = Image::open(&source).unwrap();
    assert_eq!((image.width().unwrap(), image.height().unwrap()), (800, 600));

    image
        .scale_resize(Some(400), Some(400), &Color::WHITE, false)
        .unwrap();
    assert_eq!((image.width().unwrap(), image.height().unwrap()), (400, 400));

    let out = tmp.path().join("resized.png");
    image.save(&out, None).unwrap();

    let reloaded = Image::open(&out).unwrap();
    assert_eq!(
        (reloaded.width().unwrap(), reloaded.height().unwrap()),
        (400, 400)
    );
}

#[test]
fn every_container_round_trips_dimensions() {
    let tmp = tempfile::TempDir::new().unwrap();
    let source = create_source_jpeg(tmp.path(), 120, 90);
    let image = Image::open(&source).unwrap();

    for name in ["rt.gif", "rt.png", "rt.jpg", "rt.webp"] {
        let path = tmp.path().join(name);
        image.save(&path, Some(90)).unwrap();
        let reloaded = Image::open(&path).unwrap();
        assert_eq!(
            (reloaded.width().unwrap(), reloaded.height().unwrap()),
            (120, 90),
            "{name}"
        );
    }
}

#[test]
fn zoom_crop_matches_cover_scenario() {
    let tmp = tempfile::TempDir::new().unwrap();
    let source = create_source_jpeg(tmp.path(), 800, 600);

    let mut image = Image::open(&source).unwrap();
    image.zoom_crop(200, 200, &Color::WHITE).unwrap();
    assert_eq!((image.width().unwrap(), image.height().unwrap()), (200, 200));
}

#[test]
fn resize_respects_the_no_enlarge_rule_end_to_end() {
    let tmp = tempfile::TempDir::new().unwrap();
    let source = create_source_jpeg(tmp.path(), 200, 100);

    let mut image = Image::open(&source).unwrap();
    image.resize(Some(900.into()), Some(900), &Color::WHITE).unwrap();
    assert_eq!((image.width().unwrap(), image.height().unwrap()), (200, 100));

    image
        .force_resize(Some(900), Some(900), &Color::WHITE)
        .unwrap();
    assert_eq!((image.width().unwrap(), image.height().unwrap()), (900, 900));
}

#[test]
fn percentage_resize_through_the_handle() {
    let tmp = tempfile::TempDir::new().unwrap();
    let source = create_source_jpeg(tmp.path(), 800, 600);

    let mut image = Image::open(&source).unwrap();
    let width = "25%".parse::<Extent>().unwrap();
    image.resize(Some(width), None, &Color::WHITE).unwrap();
    assert_eq!((image.width().unwrap(), image.height().unwrap()), (200, 150));
}

#[test]
fn derived_artifact_is_generated_on_first_request() {
    let tmp = tempfile::TempDir::new().unwrap();
    let source = create_source_jpeg(tmp.path(), 800, 600);
    let cache = tmp.path().join("cache");
    std::fs::create_dir_all(&cache).unwrap();
    let artifact_path = cache.join("thumb_400x400.png");

    // first request misses and carries exactly the path to produce
    let missing = match generation::lookup(&artifact_path).unwrap() {
        Artifact::Missing(path) => path,
        Artifact::Ready(_) => panic!("artifact cannot exist yet"),
    };
    assert_eq!(missing, artifact_path);

    // the orchestration layer runs the transform pipeline and saves
    let mut derived = Image::open(&source).unwrap();
    derived
        .scale_resize(Some(400), Some(400), &Color::WHITE, false)
        .unwrap();
    derived.save(&missing, None).unwrap();

    // the identical request now succeeds with a usable handle
    let ready = generation::lookup(&artifact_path)
        .unwrap()
        .into_ready()
        .expect("artifact was produced");
    assert_eq!((ready.width().unwrap(), ready.height().unwrap()), (400, 400));
}

#[test]
fn save_into_absent_directory_surfaces_io_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    let source = create_source_jpeg(tmp.path(), 40, 40);
    let image = Image::open(&source).unwrap();

    let result = image.save(tmp.path().join("nope").join("x.png"), None);
    assert!(matches!(result, Err(BackendError::Io(_))));
}

#[test]
fn unknown_backend_name_is_refused_up_front() {
    assert!(matches!(
        Image::open_with("imagick", "/tmp/whatever.png"),
        Err(BackendError::UnsupportedBackend(_))
    ));
}

#[test]
fn draw_and_save_from_blank_canvas() {
    let tmp = tempfile::TempDir::new().unwrap();

    let mut canvas = Image::create(64, 64).unwrap();
    canvas
        .fill_background(&Color::WHITE)
        .unwrap()
        .rectangle(8, 8, 55, 55, &Color::from(0x33_66_99), true)
        .unwrap()
        .circle(32, 32, 12, &Color::named("yellow"), true)
        .unwrap()
        .line(0, 0, 63, 63, &Color::BLACK)
        .unwrap();

    let out = tmp.path().join("drawn.png");
    canvas.save(&out, None).unwrap();

    let reloaded = Image::open(&out).unwrap();
    assert_eq!((reloaded.width().unwrap(), reloaded.height().unwrap()), (64, 64));
}
