pub mod error;
pub mod models;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::audio::{lyrics::Lyrics, state::Song, traits::MusicSource};

use self::{
    error::ApiError,
    models::{DescriptionResponse, DetailResponse, LyricResponse, MusicDetail, SUCCESS_CODE},
};

/// Client for a NetEase-compatible music API.
pub struct ApiService {
    client: Client,
    base_url: String,
    level: String,
}

impl ApiService {
    pub fn new(client: Client, base_url: &str, level: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            level: level.to_string(),
        }
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> String {
        let query = query
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        if query.is_empty() {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}{path}?{query}", self.base_url)
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path, query);
        debug!(url = url.as_str(), "api_request");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

fn succeeded(code: i64, what: &str, id: &str) -> bool {
    if code == SUCCESS_CODE {
        true
    } else {
        warn!(code, id, what, "api_unsuccessful_code");
        false
    }
}

#[async_trait]
impl MusicSource for ApiService {
    async fn fetch_music_detail(&self, id: u64) -> Result<Option<MusicDetail>, ApiError> {
        let res: DetailResponse = self
            .get_json(
                "/song/url/v1",
                &[("id", id.to_string()), ("level", self.level.clone())],
            )
            .await?;
        if !succeeded(res.code, "detail", &id.to_string()) {
            return Ok(None);
        }
        Ok(res.data.into_iter().next())
    }

    async fn fetch_music_description(&self, id: u64) -> Result<Option<Song>, ApiError> {
        Ok(self
            .fetch_songs(&[id])
            .await?
            .and_then(|songs| songs.into_iter().next()))
    }

    async fn fetch_lyric(&self, id: u64) -> Result<Option<Lyrics>, ApiError> {
        let res: LyricResponse = self.get_json("/lyric", &[("id", id.to_string())]).await?;
        if !succeeded(res.code, "lyric", &id.to_string()) {
            return Ok(None);
        }
        Ok(Some(
            res.lrc
                .map(|lrc| Lyrics::parse(&lrc.lyric))
                .unwrap_or_default(),
        ))
    }

    async fn fetch_songs(&self, ids: &[u64]) -> Result<Option<Vec<Song>>, ApiError> {
        let joined = ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let res: DescriptionResponse = self.get_json("/song/detail", &[("ids", joined.clone())]).await?;
        if !succeeded(res.code, "description", &joined) {
            return Ok(None);
        }
        Ok(Some(res.songs))
    }
}
