//! Queue navigation helpers.
//!
//! The current track is located by identity on every step instead of keeping
//! a cursor, because the queue may be swapped out and the active track may
//! not belong to it at all. Both directions wrap around.

use super::types::{Track, TrackId};

/// Index to play after `current`. Falls back to the first entry when
/// `current` is not a member. `None` only for an empty queue.
pub(crate) fn next_index(queue: &[Track], current: &TrackId) -> Option<usize> {
    if queue.is_empty() {
        return None;
    }
    match queue.iter().position(|t| &t.id == current) {
        Some(pos) => Some((pos + 1) % queue.len()),
        None => Some(0),
    }
}

/// Index to play before `current`. Wraps to the last entry from the first
/// one, and also when `current` is not a member.
pub(crate) fn previous_index(queue: &[Track], current: &TrackId) -> Option<usize> {
    if queue.is_empty() {
        return None;
    }
    match queue.iter().position(|t| &t.id == current) {
        Some(0) | None => Some(queue.len() - 1),
        Some(pos) => Some(pos - 1),
    }
}
