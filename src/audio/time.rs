//! Conversions between playback seconds, `MM:SS` labels and progress
//! percentages.

pub fn add_zero(value: u64) -> String {
    if value < 10 {
        format!("0{value}")
    } else {
        value.to_string()
    }
}

/// Formats seconds as `MM:SS`. Missing, zero, negative and NaN inputs render
/// as `00:00`.
pub fn calc_music_time(time: Option<f64>) -> String {
    let seconds = match time {
        Some(t) if t.is_finite() && t > 0.0 => t,
        _ => return format!("{}:{}", add_zero(0), add_zero(0)),
    };

    let minutes = (seconds / 60.0).floor() as u64;
    let second = (seconds % 60.0).floor() as u64;
    format!("{}:{}", add_zero(minutes), add_zero(second))
}

/// Played share of the track in percent, with two decimals.
///
/// A zero `duration` yields NaN or infinity; callers check before storing.
pub fn calc_music_schedule(current: f64, duration: f64) -> f64 {
    ((current / duration) * 10000.0).round() / 100.0
}

/// Inverse of [`calc_music_schedule`]: a `0..=100` progress to seconds.
pub fn calc_music_current_time(progress: f64, duration: f64) -> f64 {
    (progress * duration).round() / 100.0
}
