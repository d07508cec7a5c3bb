use tracing::{info, warn};

use crate::audio::{
    state::{MusicInfo, Song},
    traits::MusicSource,
};
use crate::http::error::ApiError;

/// Everything fetched for one track switch.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedMusic {
    pub info: MusicInfo,
    /// `None` keeps the description already shown.
    pub description: Option<Song>,
}

/// Fetches description, playable url and lyrics for `id`, one after the
/// other. A missing url fails the load; missing lyrics load as empty.
pub async fn load_music<S>(api: &S, id: u64) -> Result<LoadedMusic, ApiError>
where
    S: MusicSource + ?Sized,
{
    let start = std::time::Instant::now();

    let description = api.fetch_music_description(id).await?;

    let url = api
        .fetch_music_detail(id)
        .await?
        .and_then(|detail| detail.url)
        .filter(|url| !url.is_empty())
        .ok_or(ApiError::Unavailable(id))?;

    let lyrics = match api.fetch_lyric(id).await? {
        Some(lyrics) => lyrics,
        None => {
            warn!(id, "loader_lyrics_missing");
            Default::default()
        }
    };

    info!(
        id,
        lines = lyrics.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "loader_music_fetched"
    );

    Ok(LoadedMusic {
        info: MusicInfo {
            id: Some(id),
            url,
            lyrics,
        },
        description,
    })
}
