//! Playlist sources
//!
//! The aggregator only depends on [`PlaylistFetcher`]; the HTTP
//! implementation lives in [`m3u`].

pub mod m3u;
pub mod traits;

pub use m3u::HttpPlaylistFetcher;
pub use traits::PlaylistFetcher;
