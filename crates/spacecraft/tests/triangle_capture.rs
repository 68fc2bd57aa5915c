use std::process::Command;

use tempfile::TempDir;

const ORANGE: [u8; 3] = [255, 128, 51];

/// Needs a display and an OpenGL 3.3 driver; run with `cargo test -- --ignored`.
#[test]
#[ignore]
fn triangle_capture_is_orange_at_centroid() {
    let root = TempDir::new().unwrap();
    let capture = root.path().join("triangle.png");

    let status = Command::new(env!("CARGO_BIN_EXE_spacecraft"))
        .env("SPACECRAFT_CONFIG_DIR", root.path())
        .env_remove("SPACECRAFT_ASSET_DIR")
        .args(["triangle", "--size", "400x300", "--vsync", "false", "--capture"])
        .arg(&capture)
        .status()
        .expect("failed to run spacecraft");
    assert!(status.success());

    let image = image::open(&capture).expect("capture is a PNG").to_rgba8();
    let (width, height) = image.dimensions();
    // Centroid of the lesson triangle is (0, -1/6) in clip space.
    let x = width / 2;
    let y = (height as f32 * 7.0 / 12.0) as u32;
    let pixel = image.get_pixel(x, y).0;

    for (channel, (&actual, &expected)) in pixel.iter().zip(ORANGE.iter()).enumerate() {
        assert!(
            actual.abs_diff(expected) <= 1,
            "channel {channel}: got {actual}, expected {expected} (pixel {pixel:?})"
        );
    }
}
