use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn spacecraft(config_dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_spacecraft"));
    command
        .env("SPACECRAFT_CONFIG_DIR", config_dir)
        .env_remove("SPACECRAFT_ASSET_DIR")
        .env("RUST_LOG", "error");
    command
}

fn run(command: &mut Command) -> Output {
    command.output().expect("failed to run spacecraft")
}

fn assert_setup_failure(output: &Output) {
    assert!(!output.status.success());
    #[cfg(unix)]
    assert_eq!(output.status.code(), Some(255));
}

#[test]
fn lessons_lists_every_lesson() {
    let root = TempDir::new().unwrap();
    let output = run(spacecraft(root.path()).arg("lessons"));

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for name in [
        "window",
        "triangle",
        "uniform-color",
        "rectangle",
        "two-programs",
        "textured",
        "circle",
    ] {
        assert!(stdout.contains(name), "missing lesson {name} in:\n{stdout}");
    }
}

#[test]
fn config_show_prints_defaults_without_a_file() {
    let root = TempDir::new().unwrap();
    let output = run(spacecraft(root.path()).args(["config", "show"]));

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("title = \"Spacecraft\""), "{stdout}");
    assert!(stdout.contains("width = 1368"), "{stdout}");
    assert!(stdout.contains("segments = 100"), "{stdout}");
}

#[test]
fn config_show_merges_discovered_file_and_flags() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("config.toml"),
        "version = 1\n[window]\ntitle = \"From disk\"\n[circle]\nsegments = 32\n",
    )
    .unwrap();

    let output = run(spacecraft(root.path()).args(["config", "show"]));
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("title = \"From disk\""), "{stdout}");
    assert!(stdout.contains("segments = 32"), "{stdout}");

    let output = run(spacecraft(root.path()).args([
        "--size",
        "640x480",
        "--wireframe",
        "config",
        "show",
    ]));
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("width = 640"), "{stdout}");
    assert!(stdout.contains("wireframe = true"), "{stdout}");
}

#[test]
fn config_where_reports_explicit_file_and_asset_override() {
    let root = TempDir::new().unwrap();
    let config = root.path().join("custom.toml");
    fs::write(&config, "version = 1\n").unwrap();
    let assets = root.path().join("my-assets");

    let output = run(spacecraft(root.path())
        .env("SPACECRAFT_ASSET_DIR", &assets)
        .args(["config", "where", "--config"])
        .arg(&config));

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(&config.display().to_string()), "{stdout}");
    assert!(stdout.contains("(--config)"), "{stdout}");
    assert!(stdout.contains(&assets.display().to_string()), "{stdout}");
}

#[test]
fn invalid_config_exits_with_failure_code() {
    let root = TempDir::new().unwrap();
    let config = root.path().join("bad.toml");
    fs::write(&config, "version = 1\n[window]\nwidth = 0\n").unwrap();

    let output = run(spacecraft(root.path())
        .args(["config", "show", "--config"])
        .arg(&config));
    assert_setup_failure(&output);
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("window size must be non-zero"), "{stderr}");
}

#[test]
fn lesson_with_missing_config_fails_before_opening_a_window() {
    let root = TempDir::new().unwrap();
    let missing = root.path().join("nope.toml");

    let output = run(spacecraft(root.path()).arg("triangle").arg("--config").arg(&missing));
    assert_setup_failure(&output);
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("nope.toml"), "{stderr}");
}

#[test]
fn unknown_lesson_is_a_usage_error() {
    let root = TempDir::new().unwrap();
    let output = run(spacecraft(root.path()).arg("teapot"));

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("teapot"), "{stderr}");
}
