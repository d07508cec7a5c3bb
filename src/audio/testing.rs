use std::{
    collections::HashSet,
    sync::Mutex,
};

use async_trait::async_trait;

use crate::audio::{
    config::MediaSettings,
    error::AudioError,
    lyrics::Lyrics,
    state::{Artist, Song},
    traits::{MediaElement, MusicSource},
};
use crate::http::{error::ApiError, models::MusicDetail};

#[derive(Debug, Default)]
pub struct FakeMedia {
    pub settings: Option<MediaSettings>,
    pub source: Option<String>,
    pub paused: bool,
    pub ended: bool,
    pub current_time: f64,
    pub duration: f64,
    pub volume: f64,
    pub reject_play: bool,
    pub play_calls: usize,
    pub released: bool,
}

impl FakeMedia {
    pub fn new() -> Self {
        Self {
            paused: true,
            volume: 1.0,
            ..Self::default()
        }
    }
}

impl MediaElement for FakeMedia {
    fn apply_settings(&mut self, settings: &MediaSettings) {
        self.volume = settings.volume;
        self.settings = Some(settings.clone());
    }

    fn set_source(&mut self, url: &str) {
        self.source = Some(url.to_string());
        self.ended = false;
        self.current_time = 0.0;
        self.duration = 180.0;
    }

    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn play(&mut self) -> Result<(), AudioError> {
        self.play_calls += 1;
        if self.reject_play {
            self.paused = true;
            return Err(AudioError::PlaybackRejected("autoplay denied".into()));
        }
        if self.source.is_none() {
            return Err(AudioError::NoSource);
        }
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn is_ended(&self) -> bool {
        self.ended
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds;
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    fn release(&mut self) {
        self.paused = true;
        self.source = None;
        self.released = true;
    }
}

#[derive(Default)]
struct FakeCatalog {
    songs: HashSet<u64>,
    no_url: HashSet<u64>,
    failing_detail: HashSet<u64>,
    failing_description: HashSet<u64>,
    failing_lyric: HashSet<u64>,
    requests: Vec<u64>,
}

#[derive(Default)]
pub struct FakeSource {
    catalog: Mutex<FakeCatalog>,
}

pub fn song(id: u64) -> Song {
    Song {
        id,
        name: format!("song {id}"),
        ar: vec![Artist {
            name: format!("artist {id}"),
        }],
        ..Song::default()
    }
}

impl FakeSource {
    pub fn with_songs(ids: &[u64]) -> Self {
        let source = Self::default();
        source.catalog.lock().unwrap().songs.extend(ids.iter().copied());
        source
    }

    pub fn drop_url(&self, id: u64) {
        self.catalog.lock().unwrap().no_url.insert(id);
    }

    pub fn fail_codes_for(&self, id: u64, detail: bool, description: bool, lyric: bool) {
        let mut catalog = self.catalog.lock().unwrap();
        if detail {
            catalog.failing_detail.insert(id);
        }
        if description {
            catalog.failing_description.insert(id);
        }
        if lyric {
            catalog.failing_lyric.insert(id);
        }
    }

    pub fn requests(&self) -> Vec<u64> {
        self.catalog.lock().unwrap().requests.clone()
    }
}

#[async_trait]
impl MusicSource for FakeSource {
    async fn fetch_music_detail(&self, id: u64) -> Result<Option<MusicDetail>, ApiError> {
        let (known, no_url, failing) = {
            let catalog = self.catalog.lock().unwrap();
            (
                catalog.songs.contains(&id),
                catalog.no_url.contains(&id),
                catalog.failing_detail.contains(&id),
            )
        };
        if !known || failing {
            return Ok(None);
        }
        Ok(Some(MusicDetail {
            id,
            url: (!no_url).then(|| format!("http://cdn/{id}.mp3")),
            br: 320_000,
        }))
    }

    async fn fetch_music_description(&self, id: u64) -> Result<Option<Song>, ApiError> {
        let mut catalog = self.catalog.lock().unwrap();
        catalog.requests.push(id);
        if !catalog.songs.contains(&id) || catalog.failing_description.contains(&id) {
            return Ok(None);
        }
        Ok(Some(song(id)))
    }

    async fn fetch_lyric(&self, id: u64) -> Result<Option<Lyrics>, ApiError> {
        if self.catalog.lock().unwrap().failing_lyric.contains(&id) {
            return Ok(None);
        }
        Ok(Some(Lyrics::parse(
            "[00:00.00]first\n[00:10.00]second",
        )))
    }

    async fn fetch_songs(&self, ids: &[u64]) -> Result<Option<Vec<Song>>, ApiError> {
        let catalog = self.catalog.lock().unwrap();
        Ok(Some(
            ids.iter()
                .filter(|id| catalog.songs.contains(*id))
                .map(|&id| song(id))
                .collect(),
        ))
    }
}
