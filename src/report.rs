//! End-of-run summary

use serde::Serialize;
use std::fmt;

use crate::ingestor::{AggregationOutcome, SourceSummary};

const RULE: &str = "==================================================";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelCount {
    pub name: String,
    pub urls: usize,
    /// 1-based positions of the sources that contributed a URL
    pub sources: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationReport {
    pub requested: usize,
    pub found: usize,
    pub total_urls: usize,
    pub channels: Vec<ChannelCount>,
    pub missing: Vec<String>,
    pub sources: SourceSummary,
}

impl AggregationReport {
    pub fn from_outcome(outcome: &AggregationOutcome) -> Self {
        let channels: Vec<ChannelCount> = outcome
            .results
            .iter()
            .map(|r| {
                let mut sources: Vec<usize> =
                    r.streams().iter().map(|s| s.source_index + 1).collect();
                sources.dedup();
                ChannelCount {
                    name: r.name.clone(),
                    urls: r.url_count(),
                    sources,
                }
            })
            .collect();

        Self {
            requested: outcome.results.len(),
            found: channels.iter().filter(|c| c.urls > 0).count(),
            total_urls: channels.iter().map(|c| c.urls).sum(),
            channels,
            missing: outcome.missing.clone(),
            sources: outcome.sources.clone(),
        }
    }

    pub fn all_found(&self) -> bool {
        self.missing.is_empty()
    }
}

impl fmt::Display for AggregationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "Channel search results:")?;
        writeln!(f, "  Found channels:   {}/{}", self.found, self.requested)?;
        writeln!(f, "  Missing channels: {}", self.missing.len())?;
        writeln!(f, "  Stream URLs:      {}", self.total_urls)?;
        writeln!(
            f,
            "  Sources:          {} searched, {} unavailable, {} malformed, {} skipped",
            self.sources.processed,
            self.sources.unavailable,
            self.sources.malformed,
            self.sources.skipped
        )?;

        let multi: Vec<_> = self.channels.iter().filter(|c| c.urls > 1).collect();
        if !multi.is_empty() {
            writeln!(f)?;
            writeln!(f, "Channels with several URLs:")?;
            for channel in multi {
                let sources: Vec<String> =
                    channel.sources.iter().map(ToString::to_string).collect();
                writeln!(
                    f,
                    "  {} ({} URLs, sources {})",
                    channel.name,
                    channel.urls,
                    sources.join(", ")
                )?;
            }
        }

        writeln!(f)?;
        if self.missing.is_empty() {
            writeln!(f, "All channels were found")?;
        } else {
            writeln!(f, "Missing channels:")?;
            for (idx, name) in self.missing.iter().enumerate() {
                writeln!(f, "  {}. {}", idx + 1, name)?;
            }
        }
        write!(f, "{RULE}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelList;
    use crate::ingestor::AggregationState;
    use crate::models::PlaylistEntry;

    fn sample_outcome() -> AggregationOutcome {
        let channels = ChannelList::from_names(["A", "B", "X"]);
        let mut state = AggregationState::new(&channels).unwrap();
        state.ingest_source(
            0,
            &[
                PlaylistEntry::new("#EXTINF:-1,A", "http://one/a"),
                PlaylistEntry::new("#EXTINF:-1,B", "http://one/b"),
            ],
        );
        state.ingest_source(1, &[PlaylistEntry::new("#EXTINF:-1,A", "http://two/a")]);
        state.finish(2)
    }

    #[test]
    fn test_counts() {
        let report = AggregationReport::from_outcome(&sample_outcome());
        assert_eq!(report.requested, 3);
        assert_eq!(report.found, 2);
        assert_eq!(report.total_urls, 3);
        assert_eq!(report.missing, ["X"]);
        assert_eq!(
            report.channels,
            vec![
                ChannelCount { name: "A".to_string(), urls: 2, sources: vec![1, 2] },
                ChannelCount { name: "B".to_string(), urls: 1, sources: vec![1] },
                ChannelCount { name: "X".to_string(), urls: 0, sources: vec![] },
            ]
        );
        assert!(!report.all_found());
    }

    #[test]
    fn test_display_lists_missing_channels() {
        let text = AggregationReport::from_outcome(&sample_outcome()).to_string();
        assert!(text.contains("Found channels:   2/3"));
        assert!(text.contains("  A (2 URLs, sources 1, 2)"));
        assert!(text.contains("Missing channels:\n  1. X"));
        assert!(!text.contains("All channels were found"));
    }

    #[test]
    fn test_display_when_everything_found() {
        let report = AggregationReport::from_outcome(&AggregationOutcome::default());
        assert!(report.all_found());
        assert!(report.to_string().contains("All channels were found"));
    }
}
