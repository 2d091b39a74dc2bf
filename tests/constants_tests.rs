// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use nakama_booth::app::PhotoStore;
use nakama_booth::constants::{capture, messages, name};

#[test]
fn test_booth_holds_one_photo() {
    assert_eq!(capture::PHOTO_CAPACITY, 1);
    assert_eq!(PhotoStore::new().capacity(), capture::PHOTO_CAPACITY);
}

#[test]
fn test_countdown_is_three_one_second_steps() {
    assert_eq!(capture::COUNTDOWN_SECONDS, 3);
    assert_eq!(capture::COUNTDOWN_STEP.as_millis(), 1000);
}

#[test]
fn test_photo_download_names() {
    assert_eq!(PhotoStore::file_name(0), "anime-lens-photo-1.png");
    assert_eq!(PhotoStore::file_name(2), "anime-lens-photo-3.png");
}

#[test]
fn test_name_limits() {
    assert_eq!(name::MAX_CHARS, 30);
    assert_eq!(name::PLACEHOLDER, "YOUR NAME");
}

#[test]
fn test_export_failure_message() {
    let message = messages::export_failed("disk full");
    assert_eq!(message, "Error downloading. Please try again: disk full");
}
