//! Fetch → parse → match accumulation across playlist sources
//!
//! [`AggregationState`] owns every per-channel [`MatchResult`] and is fed
//! one parsed source at a time; it does no I/O and can be driven directly
//! in tests. [`Aggregator`] wraps it with fetching, pacing and the stop
//! condition.

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::m3u_parser;
use crate::config::{ChannelList, SourceList, StopCondition};
use crate::errors::{AppError, AppResult, SourceError};
use crate::matching::{ChannelMatcher, ExtinfLine};
use crate::models::{MatchResult, PlaylistEntry};
use crate::sources::PlaylistFetcher;
use crate::utils::url::UrlUtils;

/// What one source added to the aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceContribution {
    /// Channels that gained a URL from this source, in requested order
    pub channels: Vec<String>,
    /// Channels whose match in this source was a URL they already had
    pub duplicates: usize,
}

/// Per-run source bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub total: usize,
    pub processed: usize,
    /// Fetch failures, timeouts and empty responses
    pub unavailable: usize,
    pub malformed: usize,
    /// Not visited because the stop condition was met
    pub skipped: usize,
}

/// Final aggregation result, in requested-channel order
#[derive(Debug, Clone, Default)]
pub struct AggregationOutcome {
    pub results: Vec<MatchResult>,
    pub missing: Vec<String>,
    pub sources: SourceSummary,
}

impl AggregationOutcome {
    pub fn found(&self) -> impl Iterator<Item = &MatchResult> {
        self.results.iter().filter(|r| !r.is_missing())
    }
}

pub struct AggregationState {
    matchers: Vec<ChannelMatcher>,
    results: Vec<MatchResult>,
    sources: SourceSummary,
}

impl AggregationState {
    pub fn new(channels: &ChannelList) -> AppResult<Self> {
        let matchers = channels
            .names()
            .iter()
            .map(|name| {
                ChannelMatcher::new(name).map_err(|e| {
                    AppError::configuration(format!("cannot build matcher for '{name}': {e}"))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;
        let results = channels.names().iter().map(MatchResult::new).collect();

        Ok(Self {
            matchers,
            results,
            sources: SourceSummary::default(),
        })
    }

    /// Match every requested channel against one source's entries.
    ///
    /// Channels already found still take part, so later sources add extra
    /// URLs. Within a source only the first matching entry counts.
    pub fn ingest_source(
        &mut self,
        source_index: usize,
        entries: &[PlaylistEntry],
    ) -> SourceContribution {
        let mut contribution = SourceContribution::default();
        let lines: Vec<ExtinfLine> = entries
            .iter()
            .map(|entry| ExtinfLine::parse(&entry.metadata))
            .collect();

        for (matcher, result) in self.matchers.iter().zip(self.results.iter_mut()) {
            let Some((entry, rule)) = entries.iter().zip(&lines).find_map(|(entry, line)| {
                matcher
                    .match_parsed(line, &entry.metadata)
                    .map(|rule| (entry, rule))
            }) else {
                continue;
            };

            if result.record(entry, source_index) {
                debug!(
                    "'{}' matched by {} in source {} -> {}",
                    matcher.name(),
                    rule,
                    source_index + 1,
                    UrlUtils::obfuscate_credentials(&entry.url)
                );
                contribution.channels.push(matcher.name().to_string());
            } else {
                debug!("'{}' matched a URL it already has", matcher.name());
                contribution.duplicates += 1;
            }
        }

        self.sources.processed += 1;
        contribution
    }

    pub fn record_unavailable(&mut self) {
        self.sources.unavailable += 1;
    }

    pub fn record_malformed(&mut self) {
        self.sources.malformed += 1;
    }

    pub fn all_found(&self) -> bool {
        self.results.iter().all(|r| !r.is_missing())
    }

    pub fn finish(mut self, total_sources: usize) -> AggregationOutcome {
        let missing = self
            .results
            .iter()
            .filter(|r| r.is_missing())
            .map(|r| r.name.clone())
            .collect();

        self.sources.total = total_sources;
        self.sources.skipped = total_sources.saturating_sub(
            self.sources.processed + self.sources.unavailable + self.sources.malformed,
        );

        AggregationOutcome {
            results: self.results,
            missing,
            sources: self.sources,
        }
    }
}

/// Sequential, paced aggregation over a list of sources
pub struct Aggregator<F> {
    fetcher: F,
    pacing_delay: Duration,
    stop_condition: StopCondition,
}

impl<F: PlaylistFetcher> Aggregator<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            pacing_delay: Duration::ZERO,
            stop_condition: StopCondition::default(),
        }
    }

    pub fn with_pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = delay;
        self
    }

    pub fn with_stop_condition(mut self, stop_condition: StopCondition) -> Self {
        self.stop_condition = stop_condition;
        self
    }

    pub async fn aggregate(
        &self,
        sources: &SourceList,
        channels: &ChannelList,
    ) -> AppResult<AggregationOutcome> {
        let mut state = AggregationState::new(channels)?;
        info!(
            "Searching {} sources for {} channels",
            sources.len(),
            channels.len()
        );

        for (index, address) in sources.iter().enumerate() {
            if self.stop_condition == StopCondition::AllFound && state.all_found() {
                info!("All channels found, not visiting remaining sources");
                break;
            }

            if index > 0 && !self.pacing_delay.is_zero() {
                tokio::time::sleep(self.pacing_delay).await;
            }

            self.process_source(&mut state, index, address).await;
        }

        let outcome = state.finish(sources.len());
        info!(
            "Aggregation finished: {} of {} channels found",
            outcome.results.len() - outcome.missing.len(),
            outcome.results.len()
        );
        Ok(outcome)
    }

    async fn process_source(&self, state: &mut AggregationState, index: usize, address: &str) {
        let safe_address = UrlUtils::obfuscate_credentials(address);
        info!("Searching source {}: {}", index + 1, safe_address);

        let content = match self.fetcher.fetch(address).await {
            Ok(content) if content.trim().is_empty() => {
                warn!("Source {} returned no content, skipping", safe_address);
                state.record_unavailable();
                return;
            }
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to fetch source {}: {}", safe_address, e);
                state.record_unavailable();
                return;
            }
        };

        let entries = match m3u_parser::try_parse(&content) {
            Ok(entries) => entries,
            Err(e @ SourceError::MalformedPlaylist { .. }) => {
                warn!("Skipping source {}: {}", safe_address, e);
                state.record_malformed();
                return;
            }
            Err(e) => {
                warn!("Skipping source {}: {}", safe_address, e);
                state.record_unavailable();
                return;
            }
        };

        let contribution = state.ingest_source(index, &entries);
        if contribution.channels.is_empty() {
            info!(
                "No new channels in this source ({} entries scanned, {} already known)",
                entries.len(),
                contribution.duplicates
            );
        } else {
            info!("Found channels: {}", contribution.channels.join(", "));
            if contribution.duplicates > 0 {
                debug!(
                    "{} channels matched URLs found in earlier sources",
                    contribution.duplicates
                );
            }
        }
    }
}
