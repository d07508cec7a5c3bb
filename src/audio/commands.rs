use std::str::FromStr;

use thiserror::Error;

use crate::audio::state::{LyricType, PlayModel, PlayType};

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    Play(u64),
    TogglePlay,
    Next,
    Previous,
    /// Progress in percent, `0..=100`.
    Seek(f64),
    /// Jump to a lyric line by index.
    ClickLyric(usize),
    /// Volume in percent, `0..=100`.
    Volume(f64),
    Mode(PlayModel),
    Source(PlayType),
    AddCustom(u64),
    RemoveCustom(u64),
    Show(bool),
    LyricBoard(bool),
    LyricType(LyricType),
    Status,
    List,
    Save,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command `{0}`")]
    Unknown(String),

    #[error("`{command}` expects {expected}")]
    BadArgument {
        command: &'static str,
        expected: &'static str,
    },
}

fn arg<T: FromStr>(
    value: Option<&str>,
    command: &'static str,
    expected: &'static str,
) -> Result<T, CommandError> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or(CommandError::BadArgument { command, expected })
}

/// A finite number clamped to `0..=100`.
fn percent(
    value: Option<&str>,
    command: &'static str,
    expected: &'static str,
) -> Result<f64, CommandError> {
    let value: f64 = arg(value, command, expected)?;
    if !value.is_finite() {
        return Err(CommandError::BadArgument { command, expected });
    }
    Ok(value.clamp(0.0, 100.0))
}

fn switch(value: Option<&str>, command: &'static str) -> Result<bool, CommandError> {
    match value {
        Some("on" | "true" | "1") => Ok(true),
        Some("off" | "false" | "0") => Ok(false),
        _ => Err(CommandError::BadArgument {
            command,
            expected: "on|off",
        }),
    }
}

impl FromStr for PlayerCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return Err(CommandError::Empty);
        };
        let value = parts.next();

        let command = match name.to_ascii_lowercase().as_str() {
            "play" => Self::Play(arg(value, "play", "a song id")?),
            "toggle" | "pause" | "p" => Self::TogglePlay,
            "next" | "n" => Self::Next,
            "prev" | "previous" => Self::Previous,
            "seek" => Self::Seek(percent(value, "seek", "a progress in 0..=100")?),
            "lyric" => Self::ClickLyric(arg(value, "lyric", "a line index")?),
            "volume" | "vol" => Self::Volume(percent(value, "volume", "a volume in 0..=100")?),
            "mode" => Self::Mode(match value {
                Some("random") => PlayModel::Random,
                Some("loop") => PlayModel::ListLoop,
                Some("single") => PlayModel::SingleCycle,
                _ => {
                    return Err(CommandError::BadArgument {
                        command: "mode",
                        expected: "random|loop|single",
                    });
                }
            }),
            "source" => Self::Source(match value {
                Some("top") => PlayType::Top,
                Some("custom") => PlayType::Custom,
                _ => {
                    return Err(CommandError::BadArgument {
                        command: "source",
                        expected: "top|custom",
                    });
                }
            }),
            "add" => Self::AddCustom(arg(value, "add", "a song id")?),
            "remove" | "rm" => Self::RemoveCustom(arg(value, "remove", "a song id")?),
            "show" => Self::Show(value.is_some() && switch(value, "show")?),
            "board" => Self::LyricBoard(switch(value, "board")?),
            "lyrics" => Self::LyricType(match value {
                Some("common") => LyricType::Common,
                Some("special") => LyricType::Special,
                _ => {
                    return Err(CommandError::BadArgument {
                        command: "lyrics",
                        expected: "common|special",
                    });
                }
            }),
            "status" | "s" => Self::Status,
            "list" | "ls" => Self::List,
            "save" => Self::Save,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}
