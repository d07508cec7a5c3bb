use std::sync::Arc;

use flume::{Receiver, Sender};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{info, warn};

use crate::{
    audio::{
        commands::PlayerCommand,
        controller::{CustomListAction, Player},
        playback::RodioElement,
        state::{PlayModel, PlayType, PlayerState},
        time::calc_music_time,
    },
    config::AppConfig,
    event::events::{Event, ListTarget},
    http::ApiService,
    storage::LocalStore,
};

pub struct App {
    pub event_rx: Receiver<Event>,
    pub event_tx: Sender<Event>,
    pub config: AppConfig,
    pub store: LocalStore,
    pub player: Player<RodioElement, ApiService>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> color_eyre::Result<Self> {
        let (event_tx, event_rx) = flume::unbounded();
        let http_client = reqwest::Client::builder().build()?;
        let api = Arc::new(ApiService::new(
            http_client.clone(),
            &config.api_url,
            &config.player.bitrate_level,
        ));
        let media = RodioElement::new(http_client)?;

        let store = LocalStore::open(&config.data_dir);
        let mut player = Player::new(media, api, config.player.clone(), event_tx.clone());
        player.restore(&store);

        Ok(Self {
            event_rx,
            event_tx,
            config,
            store,
            player,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let reader = spawn_stdin_reader(self.event_tx.clone());

        self.player.init();
        if !self.config.top_list.is_empty() {
            self.player
                .fetch_songs(ListTarget::Top, self.config.top_list.clone());
        }
        info!(api = self.config.api_url.as_str(), "app_started");
        println!("mplay ready, type `status`, `list` or `quit`");

        let mut tick = tokio::time::interval(self.config.player.tick_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while !self.should_quit {
            tokio::select! {
                _ = tick.tick() => self.player.on_time_update(),
                event = self.event_rx.recv_async() => match event {
                    Ok(Event::Command(command)) => self.handle_command(command),
                    Ok(event) => self.player.handle_event(event),
                    Err(_) => break,
                },
            }
        }

        reader.abort();
        self.player.save_music_info(&mut self.store);
        self.player.remove_audio();
        info!("app_stopped");
        Ok(())
    }

    pub fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::Play(id) => self.player.set_music_info(id, false),
            PlayerCommand::TogglePlay => self.player.toggle_play(),
            PlayerCommand::Next => self.player.set_next(true),
            PlayerCommand::Previous => self.player.set_next(false),
            PlayerCommand::Seek(progress) => self.player.set_current_time(progress),
            PlayerCommand::ClickLyric(index) => self.player.set_current_time_by_click_lyric(index),
            PlayerCommand::Volume(progress) => self.player.set_volume(progress),
            PlayerCommand::Mode(model) => self.player.set_play_model(model),
            PlayerCommand::Source(play_type) => self.player.set_play_type(play_type),
            PlayerCommand::AddCustom(id) => self.player.fetch_songs(ListTarget::Custom, vec![id]),
            PlayerCommand::RemoveCustom(id) => {
                let song = self
                    .player
                    .customer_music_list()
                    .iter()
                    .find(|song| song.id == id)
                    .cloned();
                match song {
                    Some(song) => self
                        .player
                        .set_customer_music_list(CustomListAction::Delete, song),
                    None => println!("{id} is not in the custom list"),
                }
            }
            PlayerCommand::Show(flag) => self.player.set_is_show(flag),
            PlayerCommand::LyricBoard(show) => self.player.set_show_lyric_board(show),
            PlayerCommand::LyricType(lyric_type) => self.player.set_lyric_type(lyric_type),
            PlayerCommand::Status => println!("{}", status_line(self.player.state())),
            PlayerCommand::List => print!("{}", list_lines(self.player.state())),
            PlayerCommand::Save => {
                self.player.save_music_info(&mut self.store);
                println!("saved to {}", self.store.path().display());
            }
            PlayerCommand::Quit => self.should_quit = true,
        }
    }
}

/// Reads one command per stdin line. End of input quits.
fn spawn_stdin_reader(event_tx: Sender<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match line.parse::<PlayerCommand>() {
                    Ok(command) => {
                        if event_tx.send_async(Event::Command(command)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => eprintln!("{e}"),
                },
                Ok(None) => {
                    let _ = event_tx.send_async(Event::Command(PlayerCommand::Quit)).await;
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "app_stdin_failed");
                    let _ = event_tx.send_async(Event::Command(PlayerCommand::Quit)).await;
                    break;
                }
            }
        }
    })
}

fn model_label(model: PlayModel) -> &'static str {
    match model {
        PlayModel::Random => "random",
        PlayModel::ListLoop => "loop",
        PlayModel::SingleCycle => "single",
    }
}

fn source_label(play_type: PlayType) -> &'static str {
    match play_type {
        PlayType::Top => "top",
        PlayType::Custom => "custom",
    }
}

pub fn status_line(state: &PlayerState) -> String {
    let icon = if state.is_paused { "||" } else { ">" };
    let title = match state.music_info.id {
        Some(_) if !state.music_description.name.is_empty() => format!(
            "{} - {}",
            state.music_description.name,
            state.music_description.artists()
        ),
        Some(id) => id.to_string(),
        None => "nothing loaded".to_string(),
    };

    let mut line = format!(
        "{icon} {title}  {} / {} ({:.2}%)  vol {:.0}%  {} {}",
        calc_music_time(Some(state.current_time)),
        calc_music_time(Some(state.duration)),
        state.current_schedule,
        state.volume * 100.0,
        model_label(state.play_model),
        source_label(state.play_type),
    );
    if let Some(lyric) = state.music_info.lyrics.line(state.current_lyric_index) {
        line.push_str("\n  ");
        line.push_str(lyric);
    }
    line
}

pub fn list_lines(state: &PlayerState) -> String {
    let list = state.active_list();
    if list.is_empty() {
        return format!("{} list is empty\n", source_label(state.play_type));
    }

    list.iter()
        .enumerate()
        .map(|(i, song)| {
            let marker = if state.music_info.id == Some(song.id) { "*" } else { " " };
            format!("{marker}{i:>3} {:<10} {} - {}\n", song.id, song.name, song.artists())
        })
        .collect()
}
