use std::sync::Arc;

use flume::Sender;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::audio::{
    config::{MediaSettings, PlayerConfig},
    loader::{LoadedMusic, load_music},
    sequence::next_index_with,
    state::{LyricType, MusicInfo, PlayModel, PlayType, PlayerState, Song},
    time::{calc_music_current_time, calc_music_schedule},
    traits::{MediaElement, MusicSource},
};
use crate::event::events::{Event, ListTarget};
use crate::storage::{LocalStore, MUSIC_KEY};
use crate::util::task::TaskManager;

const MUSIC_TASK: &str = "music_info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomListAction {
    Add,
    Delete,
}

/// Owns the media element and the player state, and performs every state
/// transition on them.
///
/// Metadata loads run as background tasks and report back through the event
/// channel; feed those events to [`Player::handle_event`]. Only the most
/// recent load is applied.
pub struct Player<M: MediaElement, S: MusicSource + 'static> {
    media: M,
    api: Arc<S>,
    config: PlayerConfig,
    state: PlayerState,
    event_tx: Sender<Event>,
    tasks: TaskManager,
    generation: u64,
    initialized: bool,
    was_ended: bool,
    progress_guard_until: Option<Instant>,
    lyric_guard_until: Option<Instant>,
}

impl<M: MediaElement, S: MusicSource + 'static> Player<M, S> {
    pub fn new(media: M, api: Arc<S>, config: PlayerConfig, event_tx: Sender<Event>) -> Self {
        let state = PlayerState {
            volume: config.volume,
            ..PlayerState::default()
        };

        Self {
            media,
            api,
            config,
            state,
            event_tx,
            tasks: TaskManager::new(),
            generation: 0,
            initialized: false,
            was_ended: false,
            progress_guard_until: None,
            lyric_guard_until: None,
        }
    }

    pub fn with_state(mut self, state: PlayerState) -> Self {
        self.set_state(state);
        self
    }

    /// Seeds the state from the cache. Missing or unreadable data keeps the
    /// defaults.
    pub fn restore(&mut self, store: &LocalStore) {
        if let Some(state) = store.get::<PlayerState>(MUSIC_KEY) {
            info!(id = ?state.music_info.id, "player_state_restored");
            self.set_state(state);
        }
    }

    fn set_state(&mut self, mut state: PlayerState) {
        // guard windows do not survive a restart
        state.is_use_progress = false;
        state.is_click_lyric = false;
        state.volume = state.volume.clamp(0.0, 1.0);
        self.state = state;
    }

    pub fn save_music_info(&self, store: &mut LocalStore) {
        store.set(MUSIC_KEY, &self.state);
        debug!("player_state_saved");
    }

    pub fn init(&mut self) {
        self.media
            .apply_settings(&MediaSettings::for_volume(self.state.volume));
        self.initialized = true;
        self.was_ended = false;
        info!("player_initialized");

        if let Some(id) = self.state.music_info.id {
            self.set_music_info(id, true);
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Pauses and releases the media element. `init` makes the player usable
    /// again.
    pub fn remove_audio(&mut self) {
        self.tasks.abort_all();
        self.media.pause();
        self.media.release();
        self.initialized = false;
    }

    /// Mirrors the media element into the state. Called on every tick.
    pub fn on_time_update(&mut self) {
        if !self.initialized {
            return;
        }
        self.expire_guards(Instant::now());

        let current = self.media.current_time();
        if current.is_finite() && current != 0.0 {
            self.state.current_time = current;
        }

        let paused = self.media.is_paused();
        if self.state.is_paused != paused {
            self.state.is_paused = paused;
        }

        let duration = finite_or_zero(self.media.duration());
        if self.state.duration != duration {
            self.state.duration = duration;
        }

        if !self.state.is_click_lyric {
            self.state.current_lyric_index = self.lyric_index_at(current);
        }

        if !self.state.is_use_progress {
            self.state.current_schedule = schedule_or_zero(current, duration);
        }

        let ended = self.media.is_ended();
        if ended && !self.was_ended {
            info!(id = ?self.state.music_info.id, "player_track_ended");
            self.was_ended = true;
            self.set_next(true);
        } else {
            self.was_ended = ended;
        }
    }

    fn expire_guards(&mut self, now: Instant) {
        if let Some(until) = self.progress_guard_until
            && now >= until
        {
            self.progress_guard_until = None;
            self.state.is_use_progress = false;
        }
        if let Some(until) = self.lyric_guard_until
            && now >= until
        {
            self.lyric_guard_until = None;
            self.state.is_click_lyric = false;
        }
    }

    fn lyric_index_at(&self, seconds: f64) -> usize {
        let ms = (seconds.max(0.0) * 1000.0) as u64;
        self.state.music_info.lyrics.index_at(ms)
    }

    pub fn clear(&mut self) {
        self.state.duration = 0.0;
        self.state.current_lyric_index = 0;
    }

    /// Starts the freshly assigned source. With `is_init` the cached position
    /// is restored and a cached paused state is honoured.
    pub fn set_play(&mut self, is_init: bool) {
        self.clear();

        if is_init {
            self.media.set_current_time(self.state.current_time);
        } else {
            self.media.set_current_time(0.0);
            self.state.current_time = 0.0;
        }

        self.state.is_toggle_img = true;

        if is_init && self.state.is_paused {
            self.media.pause();
        } else if self.start_playback() {
            self.state.is_toggle_img = false;
        }
    }

    /// Returns whether playback started. A rejected start leaves the player
    /// paused.
    fn start_playback(&mut self) -> bool {
        match self.media.play() {
            Ok(()) => {
                self.state.is_paused = false;
                true
            }
            Err(e) => {
                self.state.is_paused = true;
                warn!(error = %e, "player_play_rejected");
                false
            }
        }
    }

    pub fn toggle_play(&mut self) {
        self.state.is_toggle_img = false;
        if self.state.is_paused {
            self.start_playback();
        } else {
            self.media.pause();
            self.state.is_paused = true;
        }
    }

    /// Loads the next (`forward`) or previous track of the active list.
    pub fn set_next(&mut self, forward: bool) {
        let list = self.state.active_list();
        if list.is_empty() {
            warn!(play_type = ?self.state.play_type, "player_next_on_empty_list");
            return;
        }

        let index = self
            .state
            .music_info
            .id
            .and_then(|id| list.iter().position(|song| song.id == id))
            .unwrap_or(0);

        let next = next_index_with(
            &mut rand::rng(),
            list.len(),
            Some(index),
            self.state.play_model,
            forward,
            self.config.random_retry_cap,
        );
        let id = list[next].id;
        debug!(from = index, to = next, id, "player_next_selected");
        self.set_music_info(id, false);
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Starts loading track `id` in the background. A newer call supersedes
    /// this one.
    pub fn set_music_info(&mut self, id: u64, is_init: bool) {
        if id == 0 {
            return;
        }
        let generation = self.next_generation();
        let api = self.api.clone();
        let event_tx = self.event_tx.clone();

        self.tasks.spawn(
            MUSIC_TASK,
            tokio::spawn(async move {
                let event = match load_music(api.as_ref(), id).await {
                    Ok(music) => Event::MusicLoaded {
                        generation,
                        id,
                        is_init,
                        music,
                    },
                    Err(e) => Event::MusicLoadFailed {
                        generation,
                        id,
                        error: e.to_string(),
                    },
                };
                let _ = event_tx.send(event);
            }),
        );
    }

    /// Loads track `id` and waits for it. Any background load in flight is
    /// dropped.
    pub async fn load_music_info(&mut self, id: u64, is_init: bool) -> bool {
        if id == 0 {
            return false;
        }
        let generation = self.next_generation();
        self.tasks.abort(MUSIC_TASK);

        match load_music(self.api.as_ref(), id).await {
            Ok(music) => self.apply_music(generation, music, is_init),
            Err(e) => {
                warn!(id, error = %e, "player_music_load_failed");
                false
            }
        }
    }

    /// Applies a finished load unless a newer one was started since.
    pub fn apply_music(&mut self, generation: u64, music: LoadedMusic, is_init: bool) -> bool {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                id = ?music.info.id,
                "player_stale_music_dropped"
            );
            return false;
        }

        if let Some(description) = music.description {
            self.set_music_description(description);
        }

        self.media.set_source(&music.info.url);
        info!(id = ?music.info.id, lines = music.info.lyrics.len(), "player_music_loaded");
        self.state.music_info = music.info;
        self.was_ended = false;

        self.set_play(is_init);
        true
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::MusicLoaded {
                generation,
                is_init,
                music,
                ..
            } => {
                self.apply_music(generation, music, is_init);
            }
            Event::MusicLoadFailed {
                generation,
                id,
                error,
            } => {
                if generation == self.generation {
                    warn!(id, error = error.as_str(), "player_music_load_failed");
                }
            }
            Event::SongsFetched(ListTarget::Top, songs) => self.set_music_list(songs),
            Event::SongsFetched(ListTarget::Custom, songs) => {
                for song in songs {
                    self.set_customer_music_list(CustomListAction::Add, song);
                }
            }
            Event::FetchError(error) => warn!(error = error.as_str(), "player_fetch_error"),
            Event::Command(_) => {}
        }
    }

    /// Fetches song descriptions for `ids` into one of the track lists.
    pub fn fetch_songs(&mut self, target: ListTarget, ids: Vec<u64>) {
        if ids.is_empty() {
            return;
        }
        let api = self.api.clone();
        let event_tx = self.event_tx.clone();

        let key = match target {
            ListTarget::Top => "top_songs",
            ListTarget::Custom => "custom_songs",
        };

        self.tasks.spawn(
            key,
            tokio::spawn(async move {
                let event = match api.fetch_songs(&ids).await {
                    Ok(Some(songs)) => Event::SongsFetched(target, songs),
                    Ok(None) => Event::FetchError(format!("no songs for {ids:?}")),
                    Err(e) => Event::FetchError(e.to_string()),
                };
                let _ = event_tx.send(event);
            }),
        );
    }

    /// Seek from a progress bar position in `0..=100`.
    pub fn set_current_time(&mut self, progress: f64) {
        if !progress.is_finite() {
            warn!(progress, "player_seek_not_finite");
            return;
        }
        self.state.is_use_progress = true;
        let duration = finite_or_zero(self.media.duration());
        let time = calc_music_current_time(progress, duration);
        self.state.current_time = time;
        self.media.set_current_time(time);
        self.state.current_lyric_index = self.lyric_index_at(time);

        if self.media.is_paused() {
            self.toggle_play();
        }
        self.progress_guard_until = Some(Instant::now() + self.config.progress_guard);
    }

    /// Seek to the start of lyric line `index`.
    pub fn set_current_time_by_click_lyric(&mut self, index: usize) {
        let Some(&time_ms) = self.state.music_info.lyrics.lyric_time_list.get(index) else {
            warn!(index, "player_lyric_index_out_of_range");
            return;
        };

        self.state.is_click_lyric = true;
        let time = time_ms as f64 / 1000.0;
        self.media.set_current_time(time);
        self.state.current_time = time;
        self.state.current_lyric_index = index;

        if self.media.is_paused() {
            self.toggle_play();
        }
        self.lyric_guard_until = Some(Instant::now() + self.config.lyric_guard);
    }

    /// Volume from a slider position in `0..=100`.
    pub fn set_volume(&mut self, progress: f64) {
        if !progress.is_finite() {
            return;
        }
        let volume = (((progress / 100.0) * 100.0).round() / 100.0).clamp(0.0, 1.0);
        self.state.volume = volume;
        self.media.set_volume(volume);
    }

    pub fn set_music_description(&mut self, description: Song) {
        self.state.music_description = description;
    }

    pub fn set_music_list(&mut self, list: Vec<Song>) {
        self.state.music_list = list;
    }

    pub fn set_show_lyric_board(&mut self, show: bool) {
        self.state.show_lyric_board = show;
    }

    /// `true` shows the player, `false` toggles it.
    pub fn set_is_show(&mut self, flag: bool) {
        if flag {
            self.state.is_show_music_player = true;
        } else {
            self.state.is_show_music_player = !self.state.is_show_music_player;
        }
    }

    pub fn set_customer_music_list(&mut self, action: CustomListAction, song: Song) {
        let list = &mut self.state.customer_music_list;
        match action {
            CustomListAction::Add => {
                if list.iter().any(|s| s.id == song.id) {
                    debug!(id = song.id, "player_custom_duplicate");
                    return;
                }
                list.push(song);
            }
            CustomListAction::Delete => {
                if let Some(index) = list.iter().position(|s| s.id == song.id) {
                    list.remove(index);
                }
                if list.is_empty() {
                    self.set_play_type(PlayType::Top);
                }
            }
        }
    }

    pub fn set_is_toggle_img(&mut self, value: bool) {
        self.state.is_toggle_img = value;
    }

    pub fn set_lyric_type(&mut self, lyric_type: LyricType) {
        self.state.lyric_type = lyric_type;
    }

    pub fn set_play_type(&mut self, play_type: PlayType) {
        self.state.play_type = play_type;
    }

    pub fn set_play_model(&mut self, model: PlayModel) {
        self.state.play_model = model;
    }

    pub fn set_is_use_progress(&mut self, value: bool) {
        self.state.is_use_progress = value;
        if !value {
            self.progress_guard_until = None;
        }
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn current_time(&self) -> f64 {
        self.state.current_time
    }

    pub fn duration(&self) -> f64 {
        self.state.duration
    }

    pub fn volume(&self) -> f64 {
        self.state.volume
    }

    pub fn is_paused(&self) -> bool {
        self.state.is_paused
    }

    pub fn current_schedule(&self) -> f64 {
        self.state.current_schedule
    }

    pub fn music_description(&self) -> &Song {
        &self.state.music_description
    }

    pub fn lyric_type(&self) -> LyricType {
        self.state.lyric_type
    }

    pub fn music_info(&self) -> &MusicInfo {
        &self.state.music_info
    }

    pub fn music_list(&self) -> &[Song] {
        &self.state.music_list
    }

    pub fn customer_music_list(&self) -> &[Song] {
        &self.state.customer_music_list
    }

    pub fn show_lyric_board(&self) -> bool {
        self.state.show_lyric_board
    }

    pub fn current_lyric_index(&self) -> usize {
        self.state.current_lyric_index
    }

    pub fn current_lyric(&self) -> Option<&str> {
        self.state
            .music_info
            .lyrics
            .line(self.state.current_lyric_index)
    }

    pub fn is_show_music_player(&self) -> bool {
        self.state.is_show_music_player
    }

    pub fn is_toggle_img(&self) -> bool {
        self.state.is_toggle_img
    }

    pub fn play_type(&self) -> PlayType {
        self.state.play_type
    }

    pub fn play_model(&self) -> PlayModel {
        self.state.play_model
    }

    pub fn is_click_lyric(&self) -> bool {
        self.state.is_click_lyric
    }

    pub fn is_use_progress(&self) -> bool {
        self.state.is_use_progress
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn schedule_or_zero(current: f64, duration: f64) -> f64 {
    if duration > 0.0 {
        calc_music_schedule(current, duration)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use flume::Receiver;

    use super::*;
    use crate::audio::lyrics::Lyrics;
    use crate::audio::testing::{FakeMedia, FakeSource, song};

    type TestPlayer = Player<FakeMedia, FakeSource>;

    fn player(source: FakeSource) -> (TestPlayer, Receiver<Event>) {
        let (tx, rx) = flume::unbounded();
        let player = Player::new(
            FakeMedia::new(),
            Arc::new(source),
            PlayerConfig::default(),
            tx,
        );
        (player, rx)
    }

    /// Feeds events back until the latest load (or fetch) has been handled.
    async fn pump(player: &mut TestPlayer, rx: &Receiver<Event>) {
        loop {
            let event = rx.recv_async().await.expect("channel open");
            let done = match &event {
                Event::MusicLoaded { generation, .. } | Event::MusicLoadFailed { generation, .. } => {
                    *generation == player.generation()
                }
                Event::SongsFetched(..) | Event::FetchError(_) => true,
                Event::Command(_) => false,
            };
            player.handle_event(event);
            if done {
                break;
            }
        }
    }

    fn with_lyrics() -> PlayerState {
        PlayerState {
            music_info: MusicInfo {
                id: Some(1),
                url: "http://cdn/1.mp3".into(),
                lyrics: Lyrics::parse("[00:00.00]first\n[00:10.00]second"),
            },
            ..PlayerState::default()
        }
    }

    #[tokio::test]
    async fn init_reloads_cached_track_and_keeps_it_paused() {
        let (player, rx) = player(FakeSource::with_songs(&[1]));
        let mut player = player.with_state(PlayerState {
            current_time: 42.0,
            music_info: MusicInfo {
                id: Some(1),
                ..MusicInfo::default()
            },
            ..PlayerState::default()
        });

        player.init();
        assert!(player.is_initialized());
        assert_eq!(player.media().settings, Some(MediaSettings::for_volume(0.5)));

        pump(&mut player, &rx).await;

        assert_eq!(player.media().source(), Some("http://cdn/1.mp3"));
        assert_eq!(player.media().current_time, 42.0);
        assert_eq!(player.media().play_calls, 0);
        assert!(player.is_paused());
        assert!(player.is_toggle_img());
        assert_eq!(player.music_description().name, "song 1");
        assert_eq!(player.music_info().lyrics.lyric_list, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn fresh_load_starts_playback_from_zero() {
        let (mut player, rx) = player(FakeSource::with_songs(&[3]));
        player.init();
        player.set_music_info(3, false);
        pump(&mut player, &rx).await;

        assert_eq!(player.media().current_time, 0.0);
        assert_eq!(player.current_time(), 0.0);
        assert!(!player.media().paused);
        assert!(!player.is_paused());
        assert!(!player.is_toggle_img());
    }

    #[tokio::test]
    async fn last_requested_track_wins() {
        let source = FakeSource::with_songs(&[1, 2]);
        let stale = load_music(&source, 1).await.unwrap();
        let (mut player, rx) = player(source);
        player.init();

        player.set_music_info(1, false);
        player.set_music_info(2, false);
        assert_eq!(player.generation(), 2);

        assert!(!player.apply_music(1, stale, false));
        assert_eq!(player.media().source(), None);

        pump(&mut player, &rx).await;
        assert_eq!(player.media().source(), Some("http://cdn/2.mp3"));
        assert_eq!(player.music_info().id, Some(2));
    }

    #[tokio::test]
    async fn zero_id_is_ignored() {
        let (mut player, _rx) = player(FakeSource::with_songs(&[1]));
        player.set_music_info(0, false);
        assert!(!player.load_music_info(0, false).await);
        assert_eq!(player.generation(), 0);
    }

    #[tokio::test]
    async fn missing_url_fails_the_load() {
        let source = FakeSource::with_songs(&[1]);
        source.drop_url(1);
        let (mut player, _rx) = player(source);
        player.init();

        assert!(!player.load_music_info(1, false).await);
        assert_eq!(player.media().source(), None);
        assert_eq!(player.music_info().id, None);
    }

    #[tokio::test]
    async fn missing_description_keeps_the_previous_one() {
        let source = FakeSource::with_songs(&[1]);
        source.fail_codes_for(1, false, true, true);
        let (mut player, _rx) = player(source);
        player.init();
        player.set_music_description(song(9));

        assert!(player.load_music_info(1, false).await);
        assert_eq!(player.music_description().id, 9);
        assert!(player.music_info().lyrics.is_empty());
        assert_eq!(player.media().source(), Some("http://cdn/1.mp3"));
    }

    #[tokio::test]
    async fn time_update_mirrors_the_element() {
        let (player, _rx) = player(FakeSource::default());
        let mut player = player.with_state(with_lyrics());
        player.init();
        player.media_mut().set_source("http://cdn/1.mp3");
        player.media_mut().duration = 120.0;
        player.media_mut().current_time = 30.0;
        player.media_mut().paused = false;

        player.on_time_update();

        assert_eq!(player.current_time(), 30.0);
        assert_eq!(player.duration(), 120.0);
        assert!(!player.is_paused());
        assert_eq!(player.current_schedule(), 25.0);
        assert_eq!(player.current_lyric_index(), 1);
        assert_eq!(player.current_lyric(), Some("second"));
    }

    #[tokio::test]
    async fn zero_element_time_keeps_the_state_time() {
        let (player, _rx) = player(FakeSource::default());
        let mut player = player.with_state(PlayerState {
            current_time: 12.0,
            ..PlayerState::default()
        });
        player.init();

        player.on_time_update();

        assert_eq!(player.current_time(), 12.0);
        assert_eq!(player.duration(), 0.0);
        assert_eq!(player.current_schedule(), 0.0);
    }

    #[tokio::test]
    async fn time_update_is_inert_before_init() {
        let (mut player, _rx) = player(FakeSource::default());
        player.media_mut().current_time = 30.0;
        player.on_time_update();
        assert_eq!(player.current_time(), 0.0);
    }

    #[tokio::test]
    async fn track_end_advances_once() {
        let (player, rx) = player(FakeSource::with_songs(&[1, 2]));
        let mut player = player.with_state(PlayerState {
            music_info: MusicInfo {
                id: Some(1),
                ..MusicInfo::default()
            },
            music_list: vec![song(1), song(2)],
            play_model: PlayModel::ListLoop,
            ..PlayerState::default()
        });
        player.init();
        pump(&mut player, &rx).await;
        let generation = player.generation();

        player.media_mut().ended = true;
        player.on_time_update();
        player.on_time_update();
        assert_eq!(player.generation(), generation + 1);

        pump(&mut player, &rx).await;
        assert_eq!(player.music_info().id, Some(2));
        assert!(!player.is_paused());
    }

    #[tokio::test]
    async fn next_and_previous_walk_the_active_list() {
        let (player, rx) = player(FakeSource::with_songs(&[1, 2, 3, 7]));
        let mut player = player.with_state(PlayerState {
            music_list: vec![song(1), song(2), song(3)],
            customer_music_list: vec![song(7)],
            play_model: PlayModel::ListLoop,
            ..PlayerState::default()
        });
        player.init();

        // no current track: starts from index 0
        player.set_next(true);
        pump(&mut player, &rx).await;
        assert_eq!(player.music_info().id, Some(2));

        player.set_next(false);
        pump(&mut player, &rx).await;
        player.set_next(false);
        pump(&mut player, &rx).await;
        assert_eq!(player.music_info().id, Some(3));

        player.set_play_type(PlayType::Custom);
        player.set_next(true);
        pump(&mut player, &rx).await;
        assert_eq!(player.music_info().id, Some(7));
    }

    #[tokio::test]
    async fn random_next_never_repeats() {
        let (player, rx) = player(FakeSource::with_songs(&[1, 2]));
        let mut player = player.with_state(PlayerState {
            music_list: vec![song(1), song(2)],
            ..PlayerState::default()
        });
        player.init();
        player.load_music_info(1, false).await;

        for _ in 0..5 {
            let before = player.music_info().id;
            player.set_next(true);
            pump(&mut player, &rx).await;
            assert_ne!(player.music_info().id, before);
        }
    }

    #[tokio::test]
    async fn next_on_empty_list_does_nothing() {
        let (mut player, _rx) = player(FakeSource::default());
        player.init();
        player.set_next(true);
        assert_eq!(player.generation(), 0);
    }

    #[tokio::test]
    async fn rejected_play_forces_paused() {
        let (mut player, _rx) = player(FakeSource::default());
        player.init();
        player.media_mut().set_source("http://cdn/1.mp3");
        player.media_mut().reject_play = true;
        player.set_play(false);

        assert!(player.is_paused());
        assert!(player.is_toggle_img());
        assert_eq!(player.media().play_calls, 1);
    }

    #[tokio::test]
    async fn toggle_play_flips_the_element() {
        let (mut player, _rx) = player(FakeSource::default());
        player.init();
        player.media_mut().set_source("http://cdn/1.mp3");
        player.set_is_toggle_img(true);

        player.toggle_play();
        assert!(!player.is_paused());
        assert!(!player.media().paused);
        assert!(!player.is_toggle_img());

        player.toggle_play();
        assert!(player.is_paused());
        assert!(player.media().paused);
    }

    #[tokio::test(start_paused = true)]
    async fn progress_seek_holds_schedule_for_the_guard_window() {
        let (player, _rx) = player(FakeSource::default());
        let mut player = player.with_state(with_lyrics());
        player.init();
        player.media_mut().set_source("http://cdn/1.mp3");

        player.set_current_time(50.0);
        assert_eq!(player.media().current_time, 90.0);
        assert_eq!(player.current_time(), 90.0);
        assert_eq!(player.current_lyric_index(), 1);
        assert!(!player.media().paused);
        assert!(player.is_use_progress());

        player.on_time_update();
        assert!(player.is_use_progress());
        assert_eq!(player.current_schedule(), 0.0);

        tokio::time::advance(Duration::from_millis(150)).await;
        player.on_time_update();
        assert!(player.is_use_progress());

        tokio::time::advance(Duration::from_millis(50)).await;
        player.on_time_update();
        assert!(!player.is_use_progress());
        assert_eq!(player.current_schedule(), 50.0);
    }

    #[tokio::test(start_paused = true)]
    async fn lyric_click_holds_the_index_for_the_guard_window() {
        let (player, _rx) = player(FakeSource::default());
        let mut player = player.with_state(with_lyrics());
        player.init();
        player.media_mut().set_source("http://cdn/1.mp3");

        player.set_current_time_by_click_lyric(1);
        assert!(player.is_click_lyric());
        assert_eq!(player.media().current_time, 10.0);
        assert_eq!(player.current_time(), 10.0);
        assert_eq!(player.current_lyric_index(), 1);
        assert!(!player.media().paused);

        player.media_mut().current_time = 2.0;
        player.on_time_update();
        assert_eq!(player.current_lyric_index(), 1);

        tokio::time::advance(Duration::from_millis(100)).await;
        player.on_time_update();
        assert!(!player.is_click_lyric());
        assert_eq!(player.current_lyric_index(), 0);
    }

    #[tokio::test]
    async fn lyric_click_out_of_range_is_ignored() {
        let (player, _rx) = player(FakeSource::default());
        let mut player = player.with_state(with_lyrics());
        player.init();

        player.set_current_time_by_click_lyric(5);
        assert!(!player.is_click_lyric());
        assert_eq!(player.media().current_time, 0.0);
    }

    #[tokio::test]
    async fn non_finite_seek_keeps_state_saveable() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(dir.path());
        let (player, _rx) = player(FakeSource::default());
        let mut player = player.with_state(PlayerState {
            current_time: 12.0,
            music_list: vec![song(4)],
            ..PlayerState::default()
        });
        player.init();
        player.media_mut().set_source("http://cdn/4.mp3");

        player.set_current_time(f64::NAN);
        player.set_current_time(f64::INFINITY);
        assert_eq!(player.current_time(), 12.0);
        assert!(!player.is_use_progress());
        assert!(player.media().paused);

        player.save_music_info(&mut store);
        let (mut restored, _rx) = self::player(FakeSource::default());
        restored.restore(&LocalStore::open(dir.path()));
        assert_eq!(restored.current_time(), 12.0);
        assert_eq!(restored.music_list(), &[song(4)]);
    }

    #[test]
    fn volume_is_rounded_and_clamped() {
        let (mut player, _rx) = player(FakeSource::default());

        player.set_volume(33.333);
        assert_eq!(player.volume(), 0.33);
        assert_eq!(player.media().volume, 0.33);

        player.set_volume(150.0);
        assert_eq!(player.volume(), 1.0);

        player.set_volume(f64::NAN);
        assert_eq!(player.volume(), 1.0);
    }

    #[test]
    fn show_flag_sets_or_toggles() {
        let (mut player, _rx) = player(FakeSource::default());
        player.set_is_show(false);
        assert!(player.is_show_music_player());
        player.set_is_show(false);
        assert!(!player.is_show_music_player());
        player.set_is_show(true);
        player.set_is_show(true);
        assert!(player.is_show_music_player());
    }

    #[test]
    fn removing_last_custom_song_switches_to_top() {
        let (mut player, _rx) = player(FakeSource::default());
        player.set_customer_music_list(CustomListAction::Add, song(1));
        player.set_customer_music_list(CustomListAction::Add, song(1));
        player.set_customer_music_list(CustomListAction::Add, song(2));
        assert_eq!(player.customer_music_list().len(), 2);

        player.set_play_type(PlayType::Custom);
        player.set_customer_music_list(CustomListAction::Delete, song(1));
        assert_eq!(player.play_type(), PlayType::Custom);

        player.set_customer_music_list(CustomListAction::Delete, song(2));
        assert!(player.customer_music_list().is_empty());
        assert_eq!(player.play_type(), PlayType::Top);
    }

    #[tokio::test]
    async fn fetched_songs_fill_the_lists() {
        let (mut player, rx) = player(FakeSource::with_songs(&[1, 2, 3]));

        player.fetch_songs(ListTarget::Top, vec![1, 2, 9]);
        pump(&mut player, &rx).await;
        assert_eq!(
            player.music_list().iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![1, 2]
        );

        player.fetch_songs(ListTarget::Custom, vec![3]);
        pump(&mut player, &rx).await;
        assert_eq!(player.customer_music_list()[0].id, 3);
    }

    #[test]
    fn restore_drops_in_flight_flags() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(dir.path());

        let (player, _rx) = player(FakeSource::default());
        let player = player.with_state(PlayerState {
            volume: 0.8,
            music_list: vec![song(4)],
            play_model: PlayModel::SingleCycle,
            ..PlayerState::default()
        });
        player.save_music_info(&mut store);

        let mut cached = store.get::<PlayerState>(MUSIC_KEY).unwrap();
        cached.is_use_progress = true;
        cached.is_click_lyric = true;
        store.set(MUSIC_KEY, &cached);

        let (mut restored, _rx) = self::player(FakeSource::default());
        restored.restore(&LocalStore::open(dir.path()));

        assert_eq!(restored.volume(), 0.8);
        assert_eq!(restored.play_model(), PlayModel::SingleCycle);
        assert_eq!(restored.music_list(), &[song(4)]);
        assert!(!restored.is_use_progress());
        assert!(!restored.is_click_lyric());
    }

    #[test]
    fn restore_without_cache_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (mut player, _rx) = player(FakeSource::default());
        player.restore(&LocalStore::open(dir.path()));
        assert_eq!(player.state(), &PlayerState::default());
    }

    #[tokio::test]
    async fn remove_audio_releases_the_element() {
        let (mut player, _rx) = player(FakeSource::default());
        player.init();
        player.media_mut().set_source("http://cdn/1.mp3");
        player.toggle_play();

        player.remove_audio();
        assert!(!player.is_initialized());
        assert!(player.media().released);
        assert!(player.media().paused);
    }
}
