use serde::{Deserialize, Serialize};

/// Parsed LRC lyrics as two parallel sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Lyrics {
    pub lyric_list: Vec<String>,
    /// Milliseconds, ascending.
    pub lyric_time_list: Vec<u64>,
}

impl Lyrics {
    pub fn parse(text: &str) -> Self {
        let mut entries: Vec<(u64, String)> = Vec::new();

        for raw_line in text.lines() {
            let mut rest = raw_line;
            let mut timestamps: Vec<u64> = Vec::new();

            // leading time tags only; anything after the first other token is text
            loop {
                let trimmed = rest.trim_start();
                let Some(tag_body) = trimmed.strip_prefix('[') else {
                    break;
                };
                let Some(close) = tag_body.find(']') else {
                    break;
                };
                let Some(ms) = parse_time_tag(&tag_body[..close]) else {
                    break;
                };
                timestamps.push(ms);
                rest = &tag_body[close + 1..];
            }

            let content = rest.trim();
            if timestamps.is_empty() || content.is_empty() {
                continue;
            }
            for t in timestamps {
                entries.push((t, content.to_string()));
            }
        }

        entries.sort_by_key(|e| e.0);
        let (lyric_time_list, lyric_list) = entries.into_iter().unzip();
        Self {
            lyric_list,
            lyric_time_list,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lyric_list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lyric_list.len()
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lyric_list.get(index).map(String::as_str)
    }

    /// Index of the line playing at `position_ms`: the first timestamp at or
    /// after the position, stepped back one and clamped to 0. Past the last
    /// timestamp this is the last line.
    pub fn index_at(&self, position_ms: u64) -> usize {
        index_for_time(&self.lyric_time_list, position_ms)
    }
}

pub fn index_for_time(time_list: &[u64], position_ms: u64) -> usize {
    match time_list.iter().position(|&t| t >= position_ms) {
        Some(i) => i.saturating_sub(1),
        None => time_list.len().saturating_sub(1),
    }
}

/// `mm:ss`, `mm:ss.f`, `mm:ss.ff` or `mm:ss.fff` to milliseconds.
fn parse_time_tag(tag: &str) -> Option<u64> {
    let (min_s, sec_s) = tag.split_once(':')?;
    let min = min_s.trim().parse::<u64>().ok()?;

    let (sec, frac_ms) = match sec_s.split_once('.') {
        Some((sec_s, frac)) => {
            let sec = sec_s.parse::<u64>().ok()?;
            let digits: String = frac.chars().take(3).collect();
            let f = digits.parse::<u64>().ok()?;
            let frac_ms = match digits.len() {
                1 => f * 100,
                2 => f * 10,
                _ => f,
            };
            (sec, frac_ms)
        }
        None => (sec_s.parse::<u64>().ok()?, 0),
    };

    min.checked_mul(60)?
        .checked_add(sec)?
        .checked_mul(1000)?
        .checked_add(frac_ms)
}
