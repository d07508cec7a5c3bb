pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod loader;
pub mod lyrics;
pub mod playback;
pub mod progress;
pub mod sequence;
pub mod state;
pub mod time;
pub mod traits;
pub mod util;

#[cfg(test)]
pub(crate) mod testing;
