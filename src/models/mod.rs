//! Core data types shared by the parser, aggregator and generator

/// One `#EXTINF` tag line and the stream URL that followed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    /// Raw tag line, verbatim
    pub metadata: String,
    /// Stream URL, never empty
    pub url: String,
}

impl PlaylistEntry {
    pub fn new<M: Into<String>, U: Into<String>>(metadata: M, url: U) -> Self {
        Self {
            metadata: metadata.into(),
            url: url.into(),
        }
    }
}

/// A URL discovered for a requested channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedStream {
    pub url: String,
    /// Tag line of the entry the URL came from
    pub metadata: String,
    /// 0-based position of the source in the source list
    pub source_index: usize,
}

/// Everything found for one requested channel, in discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub name: String,
    streams: Vec<MatchedStream>,
}

impl MatchResult {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            streams: Vec::new(),
        }
    }

    /// Record a discovered URL. Returns false if this URL was already known.
    pub fn record(&mut self, entry: &PlaylistEntry, source_index: usize) -> bool {
        if self.streams.iter().any(|s| s.url == entry.url) {
            return false;
        }
        self.streams.push(MatchedStream {
            url: entry.url.clone(),
            metadata: entry.metadata.clone(),
            source_index,
        });
        true
    }

    /// Metadata of the first entry that matched, used as the rewrite base
    pub fn base_metadata(&self) -> Option<&str> {
        self.streams.first().map(|s| s.metadata.as_str())
    }

    pub fn streams(&self) -> &[MatchedStream] {
        &self.streams
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.streams.iter().map(|s| s.url.as_str())
    }

    pub fn url_count(&self) -> usize {
        self.streams.len()
    }

    pub fn is_missing(&self) -> bool {
        self.streams.is_empty()
    }
}
