use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Volume used when no cached state exists, in `0.0..=1.0`.
    pub volume: f64,
    pub tick_interval: Duration,
    /// How long progress-driven updates stay muted after a drag seek.
    pub progress_guard: Duration,
    /// How long lyric tracking stays muted after a lyric click.
    pub lyric_guard: Duration,
    pub random_retry_cap: usize,
    pub bitrate_level: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: 0.5,
            tick_interval: Duration::from_millis(250),
            progress_guard: Duration::from_millis(200),
            lyric_guard: Duration::from_millis(100),
            random_retry_cap: 32,
            bitrate_level: "exhigh".to_string(),
        }
    }
}

/// Settings pushed onto the media element by `Player::init`.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSettings {
    pub volume: f64,
    pub autoplay: bool,
    pub preload: bool,
}

impl MediaSettings {
    pub fn for_volume(volume: f64) -> Self {
        Self {
            volume,
            autoplay: true,
            preload: true,
        }
    }
}
