/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Input defaults
pub const DEFAULT_CHANNELS_FILE: &str = "channels.json";
pub const DEFAULT_SOURCES_FILE: &str = "sources.json";

// Fetch defaults
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PACING_DELAY_SECS: u64 = 1;
pub const DEFAULT_USER_AGENT: &str = concat!("m3u-aggregator/", env!("CARGO_PKG_VERSION"));

// Output defaults
pub const DEFAULT_OUTPUT_PATH: &str = "simple.m3u";
