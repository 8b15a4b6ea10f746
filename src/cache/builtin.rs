use base64::{engine::general_purpose::STANDARD, Engine};

/// 20x30 solid-colour PNG placeholders for the demo catalog, keyed like
/// [`Movie::poster_cache_key`](crate::models::Movie::poster_cache_key)
const BUNDLED_THUMBNAILS: [(&str, &str); 6] = [
    ("demo-1", "iVBORw0KGgoAAAANSUhEUgAAABQAAAAeCAIAAACjcKk8AAAAD0lEQVR42mP4GBXFMAAYAKL3MVdZ3X6NAAAAAElFTkSuQmCC"),
    ("demo-2", "iVBORw0KGgoAAAANSUhEUgAAABQAAAAeCAIAAACjcKk8AAAAD0lEQVR42mP4ezqPYQAwAJ3LQlV4V5RpAAAAAElFTkSuQmCC"),
    ("demo-3", "iVBORw0KGgoAAAANSUhEUgAAABQAAAAeCAIAAACjcKk8AAAAD0lEQVR42mPQO1PIMAAYAPF9KospPMGSAAAAAElFTkSuQmCC"),
    ("demo-4", "iVBORw0KGgoAAAANSUhEUgAAABQAAAAeCAIAAACjcKk8AAAAD0lEQVR42mMwmXGbYQAwAIvDMZPLpNuAAAAAAElFTkSuQmCC"),
    ("demo-5", "iVBORw0KGgoAAAANSUhEUgAAABQAAAAeCAIAAACjcKk8AAAAD0lEQVR42mOYHbmNYQAwALFDMe0PynWrAAAAAElFTkSuQmCC"),
    ("demo-6", "iVBORw0KGgoAAAANSUhEUgAAABQAAAAeCAIAAACjcKk8AAAAD0lEQVR42mP4dXkCwwBgAKu8RufprcLeAAAAAElFTkSuQmCC"),
];

/// Decoded `(key, bytes)` pairs to seed the poster cache with.
///
/// Entries that fail to decode are skipped.
pub fn bundled_thumbnails() -> Vec<(String, Vec<u8>)> {
    BUNDLED_THUMBNAILS
        .iter()
        .filter_map(|(key, encoded)| match STANDARD.decode(encoded) {
            Ok(bytes) => Some((key.to_string(), bytes)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Skipping undecodable bundled thumbnail");
                None
            }
        })
        .collect()
}
