use serde::Deserialize;

use crate::audio::state::Song;

pub const SUCCESS_CODE: i64 = 200;

#[derive(Debug, Clone, Deserialize)]
pub struct MusicDetail {
    pub id: u64,
    pub url: Option<String>,
    #[serde(default)]
    pub br: u64,
}

#[derive(Debug, Deserialize)]
pub struct DetailResponse {
    pub code: i64,
    #[serde(default)]
    pub data: Vec<MusicDetail>,
}

#[derive(Debug, Deserialize)]
pub struct DescriptionResponse {
    pub code: i64,
    #[serde(default)]
    pub songs: Vec<Song>,
}

#[derive(Debug, Deserialize)]
pub struct LyricBody {
    #[serde(default)]
    pub lyric: String,
}

#[derive(Debug, Deserialize)]
pub struct LyricResponse {
    pub code: i64,
    pub lrc: Option<LyricBody>,
}
