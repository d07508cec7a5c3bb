use serde::{Deserialize, Serialize};

use crate::audio::lyrics::Lyrics;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlayModel {
    #[default]
    Random,
    ListLoop,
    SingleCycle,
}

/// Which list `next`/`previous` walk through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlayType {
    /// Songs the user added by hand.
    Custom,
    /// The curated list.
    #[default]
    Top,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LyricType {
    #[default]
    Common,
    Special,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Album {
    pub pic_url: String,
}

/// Title, artists and cover of a song, as served by the description
/// endpoint. The same shape fills both track lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Song {
    pub id: u64,
    pub name: String,
    pub ar: Vec<Artist>,
    pub al: Album,
}

impl Default for Song {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            ar: vec![Artist {
                name: "Unknown artist".to_string(),
            }],
            al: Album::default(),
        }
    }
}

impl Song {
    pub fn artists(&self) -> String {
        self.ar
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// The track currently assigned to the media element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MusicInfo {
    pub id: Option<u64>,
    pub url: String,
    #[serde(flatten)]
    pub lyrics: Lyrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerState {
    pub volume: f64,
    pub is_paused: bool,
    pub current_time: f64,
    pub duration: f64,
    pub music_info: MusicInfo,
    pub music_description: Song,
    pub lyric_type: LyricType,
    pub show_lyric_board: bool,
    pub current_lyric_index: usize,
    pub is_show_music_player: bool,
    pub is_toggle_img: bool,
    pub play_type: PlayType,
    pub play_model: PlayModel,
    pub music_list: Vec<Song>,
    pub customer_music_list: Vec<Song>,
    pub current_schedule: f64,
    pub is_use_progress: bool,
    pub is_click_lyric: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            volume: 0.5,
            is_paused: true,
            current_time: 0.0,
            duration: 0.0,
            music_info: MusicInfo::default(),
            music_description: Song::default(),
            lyric_type: LyricType::Common,
            show_lyric_board: false,
            current_lyric_index: 0,
            is_show_music_player: false,
            is_toggle_img: false,
            play_type: PlayType::Top,
            play_model: PlayModel::Random,
            music_list: Vec::new(),
            customer_music_list: Vec::new(),
            current_schedule: 0.0,
            is_use_progress: false,
            is_click_lyric: false,
        }
    }
}

impl PlayerState {
    pub fn active_list(&self) -> &[Song] {
        match self.play_type {
            PlayType::Top => &self.music_list,
            PlayType::Custom => &self.customer_music_list,
        }
    }
}
