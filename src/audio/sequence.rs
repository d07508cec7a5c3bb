use rand::{Rng, rng};

use crate::audio::state::PlayModel;

const DEFAULT_RETRY_CAP: usize = 32;

/// Picks the index to play after `index` in a list of `len` tracks.
///
/// `index` is `None` when the current track is not in the list. `len == 0`
/// returns 0 and must be guarded by the caller before indexing.
pub fn next_index(len: usize, index: Option<usize>, model: PlayModel, forward: bool) -> usize {
    next_index_with(&mut rng(), len, index, model, forward, DEFAULT_RETRY_CAP)
}

pub fn next_index_with<R: Rng + ?Sized>(
    rng: &mut R,
    len: usize,
    index: Option<usize>,
    model: PlayModel,
    forward: bool,
    retry_cap: usize,
) -> usize {
    if len == 0 {
        return 0;
    }

    match model {
        PlayModel::SingleCycle => index.unwrap_or(0),
        PlayModel::ListLoop => match index {
            None => 0,
            Some(i) if forward => {
                if i + 1 >= len {
                    0
                } else {
                    i + 1
                }
            }
            Some(0) => len - 1,
            Some(i) => (i - 1).min(len - 1),
        },
        PlayModel::Random => random_no_repeat(rng, len, index, retry_cap),
    }
}

fn random_no_repeat<R: Rng + ?Sized>(
    rng: &mut R,
    len: usize,
    index: Option<usize>,
    retry_cap: usize,
) -> usize {
    let Some(current) = index else {
        return rng.random_range(0..len);
    };
    if len == 1 {
        return current;
    }

    for _ in 0..retry_cap.max(1) {
        let candidate = rng.random_range(0..len);
        if candidate != current {
            return candidate;
        }
    }

    // out of draws; the neighbour still differs from `current`
    (current + 1) % len
}
