//! On-disk poster cache

pub mod builtin;
pub mod disk;
mod index;

pub use builtin::bundled_thumbnails;
pub use disk::{sanitize_key, AssetCache, CacheWriterHandle};
