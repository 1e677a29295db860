//! Collects wanted channels from several M3U playlists into one playlist.
//!
//! The pipeline is: load [`config::ChannelList`] and [`config::SourceList`],
//! run an [`ingestor::Aggregator`] over the sources, then hand the outcome to
//! [`proxy::PlaylistGenerator`] and [`report::AggregationReport`].

pub mod config;
pub mod errors;
pub mod ingestor;
pub mod matching;
pub mod models;
pub mod proxy;
pub mod report;
pub mod sources;
pub mod utils;
