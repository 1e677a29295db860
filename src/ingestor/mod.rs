//! Playlist ingestion: parsing and cross-source accumulation

pub mod accumulator;
pub mod m3u_parser;

pub use accumulator::{
    AggregationOutcome, AggregationState, Aggregator, SourceContribution, SourceSummary,
};
pub use m3u_parser::try_parse;
