// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use nakama_booth::Config;
use nakama_booth::backends::camera::CameraBackendType;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert!(config.mirror_capture, "Captures should mirror the preview");
    assert_eq!(config.countdown_seconds, 3);
    assert_eq!(config.backend, CameraBackendType::V4l2);
    assert_eq!(config.asset_dir, PathBuf::from("assets"));
    assert_eq!(config.layout.export_size.width, 759);
    assert_eq!(config.layout.export_size.height, 1117);
}

#[test]
fn test_config_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let config = Config {
        backend: CameraBackendType::Still,
        countdown_seconds: 5,
        output_dir: Some(dir.path().to_path_buf()),
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_zero_sized_layout_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"layout":{"authoring_size":{"width":0,"height":735}}}"#).unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("authoring_size"), "{}", err);
}

#[test]
fn test_partial_config_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "countdown_seconds": 5, "layout": { "sticker_scale": 0.25 } }"#)
        .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.countdown_seconds, 5);
    assert!(config.mirror_capture);
    assert_eq!(config.layout.sticker_scale, 0.25);
    assert_eq!(config.layout.authoring_size.width, 500);
}

#[test]
fn test_invalid_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "not json").unwrap();

    assert!(Config::load_from(&path).is_err());
}

#[test]
fn test_output_dir_override() {
    let config = Config {
        output_dir: Some(PathBuf::from("/tmp/posters")),
        ..Config::default()
    };
    assert_eq!(config.output_dir(), PathBuf::from("/tmp/posters"));
}
