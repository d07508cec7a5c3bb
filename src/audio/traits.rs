use async_trait::async_trait;

use crate::audio::{config::MediaSettings, error::AudioError, lyrics::Lyrics, state::Song};
use crate::http::{error::ApiError, models::MusicDetail};

/// The single audio output owned by the player.
///
/// Times are in seconds. `duration` is `0.0` until the source reports one.
pub trait MediaElement {
    fn apply_settings(&mut self, settings: &MediaSettings);
    fn set_source(&mut self, url: &str);
    fn source(&self) -> Option<&str>;

    /// Starts or resumes playback. An `Err` means the start was rejected and
    /// the element stays paused.
    fn play(&mut self) -> Result<(), AudioError>;
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    fn is_ended(&self) -> bool;

    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    fn duration(&self) -> f64;

    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);

    /// Stops output and drops the loaded source.
    fn release(&mut self);
}

/// Remote metadata for songs. Every call yields `Ok(None)` when the service
/// answers with a non-success code.
#[async_trait]
pub trait MusicSource: Send + Sync {
    async fn fetch_music_detail(&self, id: u64) -> Result<Option<MusicDetail>, ApiError>;
    async fn fetch_music_description(&self, id: u64) -> Result<Option<Song>, ApiError>;
    async fn fetch_lyric(&self, id: u64) -> Result<Option<Lyrics>, ApiError>;
    async fn fetch_songs(&self, ids: &[u64]) -> Result<Option<Vec<Song>>, ApiError>;
}
