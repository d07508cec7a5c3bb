use std::{env, path::PathBuf};

use color_eyre::eyre::{WrapErr, eyre};
use directories::ProjectDirs;
use lazy_static::lazy_static;

use crate::audio::config::PlayerConfig;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref LOG_ENV: String = format!("{}_LOGLEVEL", PROJECT_NAME.clone());
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "mplay", env!("CARGO_PKG_NAME"))
}

/// Where the cache file and the log live. `MPLAY_DATA` overrides the
/// platform default.
pub fn get_data_dir() -> PathBuf {
    if let Some(dir) = DATA_FOLDER.clone() {
        dir
    } else if let Some(dirs) = project_directory() {
        dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    /// Song ids of the curated list.
    pub top_list: Vec<u64>,
    pub data_dir: PathBuf,
    pub player: PlayerConfig,
}

impl AppConfig {
    /// Reads `MPLAY_*` variables. Call after `dotenv` so `.env` is honoured.
    pub fn from_env() -> color_eyre::Result<Self> {
        let var = |name: &str| env::var(format!("{}_{name}", PROJECT_NAME.as_str())).ok();

        let top_list = match var("TOP_LIST") {
            Some(raw) => parse_id_list(&raw).wrap_err("invalid MPLAY_TOP_LIST")?,
            None => Vec::new(),
        };

        let mut player = PlayerConfig::default();
        if let Some(level) = var("LEVEL").filter(|l| !l.trim().is_empty()) {
            player.bitrate_level = level.trim().to_string();
        }

        Ok(Self {
            api_url: var("API_URL")
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            top_list,
            data_dir: get_data_dir(),
            player,
        })
    }
}

/// Parses `"1, 2,3"` into ids. Empty items are skipped.
pub fn parse_id_list(raw: &str) -> color_eyre::Result<Vec<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<u64>()
                .map_err(|e| eyre!("`{item}` is not a song id: {e}"))
        })
        .collect()
}
