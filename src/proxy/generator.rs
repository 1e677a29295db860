use std::path::Path;
use tracing::info;

use super::rewriter::rewrite_result;
use crate::config::ChannelList;
use crate::errors::AppResult;
use crate::ingestor::AggregationOutcome;
use crate::ingestor::m3u_parser::HEADER_MARKER;
use crate::models::PlaylistEntry;

/// Builds the merged playlist from an aggregation outcome
pub struct PlaylistGenerator<'a> {
    channels: &'a ChannelList,
}

impl<'a> PlaylistGenerator<'a> {
    pub fn new(channels: &'a ChannelList) -> Self {
        Self { channels }
    }

    /// Rewritten entries in requested-channel order, then discovery order
    pub fn build_entries(&self, outcome: &AggregationOutcome) -> Vec<PlaylistEntry> {
        outcome
            .found()
            .flat_map(|result| rewrite_result(result, self.channels.group_for(&result.name)))
            .collect()
    }

    pub fn render(entries: &[PlaylistEntry]) -> String {
        let mut m3u = String::from(HEADER_MARKER);
        m3u.push('\n');

        for entry in entries {
            m3u.push_str(&entry.metadata);
            m3u.push('\n');
            m3u.push_str(&entry.url);
            m3u.push('\n');
        }

        m3u
    }

    /// Build, render and write the playlist, returning the number of entries written
    pub async fn write_to<P: AsRef<Path>>(
        &self,
        outcome: &AggregationOutcome,
        path: P,
    ) -> AppResult<usize> {
        let path = path.as_ref();
        let entries = self.build_entries(outcome);
        let content = Self::render(&entries);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await?;

        info!("Wrote {} entries to {}", entries.len(), path.display());
        Ok(entries.len())
    }
}
