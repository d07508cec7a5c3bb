use std::{
    io::Cursor,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use reqwest::Client;
use rodio::{Decoder, OutputStream, Sink, Source};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::audio::{
    config::MediaSettings,
    error::AudioError,
    progress::TrackProgress,
    traits::MediaElement,
    util::{construct_sink, setup_device_config},
};

/// [`MediaElement`] backed by the default output device.
///
/// A source is downloaded in full, decoded on the blocking pool and appended
/// to a single sink. Each `set_source` bumps the progress generation so a
/// slow download for an older URL never reaches the sink.
pub struct RodioElement {
    _stream: OutputStream,
    sink: Arc<Sink>,
    http_client: Client,
    progress: TrackProgress,
    settings: MediaSettings,
    source: Option<String>,
    wants_play: Arc<AtomicBool>,
    load_error: Arc<Mutex<Option<AudioError>>>,
    load_task: Option<JoinHandle<()>>,
}

impl RodioElement {
    pub fn new(http_client: Client) -> color_eyre::Result<Self> {
        let (device, stream_config, sample_format) = setup_device_config()?;
        let (stream, sink) = construct_sink(device, &stream_config, sample_format)?;
        sink.pause();

        Ok(Self {
            _stream: stream,
            sink: Arc::new(sink),
            http_client,
            progress: TrackProgress::new(),
            settings: MediaSettings::for_volume(1.0),
            source: None,
            wants_play: Arc::new(AtomicBool::new(false)),
            load_error: Arc::new(Mutex::new(None)),
            load_task: None,
        })
    }

    fn is_loading(&self) -> bool {
        self.load_task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn last_load_error(&self) -> Option<AudioError> {
        self.load_error.lock().ok().and_then(|guard| guard.clone())
    }

    fn start_load(&mut self) {
        let Some(url) = self.source.clone() else {
            return;
        };
        if let Some(task) = self.load_task.take() {
            task.abort();
        }

        let generation = self.progress.get_generation();
        let http_client = self.http_client.clone();
        let sink = self.sink.clone();
        let progress = self.progress.clone();
        let wants_play = self.wants_play.clone();
        let load_error = self.load_error.clone();

        self.load_task = Some(tokio::spawn(async move {
            let start = std::time::Instant::now();
            let bytes = match download(&http_client, &url).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(url = url.as_str(), error = %e, "media_download_failed");
                    if let Ok(mut guard) = load_error.lock() {
                        *guard = Some(e);
                    }
                    return;
                }
            };
            let byte_len = bytes.len() as u64;
            let hint = extension_hint(&url);

            let blocking_progress = progress.clone();
            let result = tokio::task::spawn_blocking(move || {
                let mut builder = Decoder::builder()
                    .with_data(Cursor::new(bytes))
                    .with_byte_len(byte_len)
                    .with_coarse_seek(true)
                    .with_gapless(true);
                if let Some(hint) = hint {
                    builder = builder.with_hint(hint);
                }
                let decoder = builder
                    .build()
                    .map_err(|e| AudioError::DecodingError(e.to_string()))?;

                if blocking_progress.get_generation() != generation {
                    return Ok(false);
                }
                if let Some(total) = decoder.total_duration() {
                    blocking_progress.set_total_duration(total);
                }

                if !wants_play.load(Ordering::Relaxed) {
                    sink.pause();
                }
                sink.append(decoder);

                let seek = blocking_progress.take_pending_seek();
                if !seek.is_zero()
                    && let Err(e) = sink.try_seek(seek)
                {
                    warn!(error = %e, "media_seek_failed");
                }
                if wants_play.load(Ordering::Relaxed) {
                    sink.play();
                }
                blocking_progress.mark_ready();
                Ok(true)
            })
            .await
            .unwrap_or_else(|e| Err(AudioError::DecodingError(e.to_string())));

            match result {
                Ok(true) => info!(
                    url = url.as_str(),
                    elapsed_ms = start.elapsed().as_millis(),
                    "media_source_ready"
                ),
                Ok(false) => info!(url = url.as_str(), "media_source_stale"),
                Err(e) => {
                    warn!(url = url.as_str(), error = %e, "media_decode_failed");
                    if progress.get_generation() == generation
                        && let Ok(mut guard) = load_error.lock()
                    {
                        *guard = Some(e);
                    }
                }
            }
        }));
    }
}

async fn download(client: &Client, url: &str) -> Result<Vec<u8>, AudioError> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| AudioError::NetworkError(e.to_string()))?;
    let body = response
        .bytes()
        .await
        .map_err(|e| AudioError::NetworkError(e.to_string()))?;
    Ok(body.to_vec())
}

fn extension_hint(url: &str) -> Option<&'static str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let ext = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())?;
    match ext.as_str() {
        "mp3" => Some("mp3"),
        "flac" => Some("flac"),
        "m4a" | "mp4" => Some("mp4"),
        "aac" => Some("aac"),
        _ => None,
    }
}

impl MediaElement for RodioElement {
    fn apply_settings(&mut self, settings: &MediaSettings) {
        self.settings = settings.clone();
        self.set_volume(settings.volume);
    }

    fn set_source(&mut self, url: &str) {
        if let Some(task) = self.load_task.take() {
            task.abort();
        }
        self.sink.stop();
        self.progress.reset();
        if let Ok(mut guard) = self.load_error.lock() {
            *guard = None;
        }

        self.source = Some(url.to_string());
        self.wants_play
            .store(self.settings.autoplay, Ordering::Relaxed);
        if self.settings.preload {
            self.start_load();
        }
    }

    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn play(&mut self) -> Result<(), AudioError> {
        if self.source.is_none() {
            return Err(AudioError::NoSource);
        }
        if let Some(e) = self.last_load_error() {
            return Err(AudioError::PlaybackRejected(e.to_string()));
        }

        self.wants_play.store(true, Ordering::Relaxed);
        if self.progress.is_ready() {
            self.sink.play();
        } else if !self.is_loading() {
            self.start_load();
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.wants_play.store(false, Ordering::Relaxed);
        self.sink.pause();
    }

    fn is_paused(&self) -> bool {
        !self.wants_play.load(Ordering::Relaxed) || self.is_ended()
    }

    fn is_ended(&self) -> bool {
        self.progress.is_ready() && self.sink.empty()
    }

    fn current_time(&self) -> f64 {
        if self.progress.is_ready() {
            self.sink.get_pos().as_secs_f64()
        } else {
            self.progress.pending_seek().as_secs_f64()
        }
    }

    fn set_current_time(&mut self, seconds: f64) {
        let position = Duration::from_secs_f64(seconds.max(0.0));
        if self.progress.is_ready() {
            if let Err(e) = self.sink.try_seek(position) {
                warn!(error = %e, "media_seek_failed");
            }
        } else {
            self.progress.set_pending_seek(position);
        }
    }

    fn duration(&self) -> f64 {
        self.progress.total_duration().as_secs_f64()
    }

    fn volume(&self) -> f64 {
        self.settings.volume
    }

    fn set_volume(&mut self, volume: f64) {
        let volume = volume.clamp(0.0, 1.0);
        self.settings.volume = volume;
        self.sink.set_volume(volume as f32);
    }

    fn release(&mut self) {
        if let Some(task) = self.load_task.take() {
            task.abort();
        }
        self.wants_play.store(false, Ordering::Relaxed);
        self.sink.stop();
        self.progress.reset();
        self.source = None;
    }
}
