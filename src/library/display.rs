use crate::engine::Track;

/// Ordering key for the library listing: artist, then title, case-insensitive.
pub(super) fn sort_key(track: &Track) -> (String, String) {
    (track.artist.to_lowercase(), track.title.to_lowercase())
}

/// Artist text for display, with a placeholder for untagged files.
pub fn artist_label(track: &Track) -> &str {
    let a = track.artist.trim();
    if a.is_empty() { "Unknown artist" } else { a }
}
