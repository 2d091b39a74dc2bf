// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Application title shown in every view
pub const APP_TITLE: &str = "NAKAMA BOOTH";

/// Version string baked in at build time
pub const APP_VERSION: &str = env!("GIT_VERSION");

/// Directory name used below the config and cache directories
pub const APP_DIR_NAME: &str = "nakama-booth";

/// Capture constants
pub mod capture {
    use super::Duration;

    /// Number of photos the booth holds at once
    pub const PHOTO_CAPACITY: usize = 1;

    /// Countdown start value, in steps
    pub const COUNTDOWN_SECONDS: u32 = 3;

    /// Length of one countdown step
    pub const COUNTDOWN_STEP: Duration = Duration::from_millis(1000);

    /// Per-photo download name, `n` is 1-based
    pub fn photo_file_name(n: usize) -> String {
        format!("anime-lens-photo-{}.png", n)
    }
}

/// Name entry constants
pub mod name {
    /// Longest accepted name, in characters
    pub const MAX_CHARS: usize = 30;

    /// Shown on the poster preview while the name is empty
    pub const PLACEHOLDER: &str = "YOUR NAME";
}

/// User-facing messages
pub mod messages {
    /// Error banner when the camera cannot be opened
    pub const CAMERA_ACCESS_FAILED: &str = "Failed to access camera. Please check permissions.";

    /// Alert when trying to edit without a name
    pub const EMPTY_NAME: &str = "Please enter your name!";

    /// Alert prefix when the poster download fails
    pub const EXPORT_FAILED_PREFIX: &str = "Error downloading. Please try again: ";

    pub fn export_failed(detail: impl std::fmt::Display) -> String {
        format!("{}{}", EXPORT_FAILED_PREFIX, detail)
    }
}

/// Terminal front end constants
pub mod terminal {
    use super::Duration;

    /// Input poll timeout (~60 redraws per second)
    pub const POLL_INTERVAL: Duration = Duration::from_millis(16);

    /// Log file name in the cache directory
    pub const LOG_FILE_NAME: &str = "nakama-booth.log";

    /// Sticker nudge per arrow key press, in authoring units
    pub const NUDGE_STEP: f32 = 10.0;

    /// Resize factor per +/- key press
    pub const SCALE_STEP: f32 = 1.1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_file_name_is_one_based() {
        assert_eq!(capture::photo_file_name(1), "anime-lens-photo-1.png");
    }

    #[test]
    fn test_export_failed_message() {
        assert_eq!(
            messages::export_failed("disk full"),
            "Error downloading. Please try again: disk full"
        );
    }
}
