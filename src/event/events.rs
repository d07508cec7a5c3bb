use crate::audio::{commands::PlayerCommand, loader::LoadedMusic, state::Song};

/// Which track list a fetched batch of songs belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTarget {
    Top,
    Custom,
}

#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum Event {
    // Events
    MusicLoaded {
        generation: u64,
        id: u64,
        is_init: bool,
        music: LoadedMusic,
    },
    MusicLoadFailed {
        generation: u64,
        id: u64,
        error: String,
    },
    SongsFetched(ListTarget, Vec<Song>),
    FetchError(String),

    // Commands
    Command(PlayerCommand),
}
