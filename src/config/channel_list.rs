//! Loaders for the requested channel list and the playlist source list
//!
//! Both files are JSON. The channel list groups channel names under the
//! group title they should carry in the generated playlist:
//!
//! ```json
//! { "channel_groups": [ { "group_title": "News", "channels": ["CCTV13", "CGTN"] } ] }
//! ```
//!
//! The source list is a flat list of playlist addresses:
//!
//! ```json
//! { "sources": ["http://example.com/a.m3u", "http://example.com/b.m3u"] }
//! ```
//!
//! Any problem with either file is a configuration error and stops the run.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult};
use crate::utils::url::UrlUtils;

/// A channel listed under more than one group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupConflict {
    pub name: String,
    /// Group from the first listing, which stays authoritative
    pub kept: Option<String>,
    /// Group from the later listing, which is ignored
    pub ignored: Option<String>,
}

/// Ordered, de-duplicated list of requested channel names with their groups
#[derive(Debug, Clone, Default)]
pub struct ChannelList {
    names: Vec<String>,
    groups: HashMap<String, String>,
    conflicts: Vec<GroupConflict>,
}

#[derive(Debug, Deserialize)]
struct ChannelFile {
    channel_groups: Option<Vec<ChannelGroup>>,
}

#[derive(Debug, Deserialize)]
struct ChannelGroup {
    group_title: String,
    channels: Vec<String>,
}

impl ChannelList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an ungrouped list from names in order
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for name in names {
            list.push(name.as_ref(), None);
        }
        list
    }

    /// Add a channel. A name seen before keeps its first position and group.
    pub fn push(&mut self, name: &str, group: Option<&str>) {
        let name = name.trim();
        if name.is_empty() {
            warn!("Ignoring blank channel name");
            return;
        }
        let group = group.map(str::trim).filter(|g| !g.is_empty());

        if self.contains(name) {
            let kept = self.groups.get(name).cloned();
            if kept.as_deref() == group {
                warn!("Channel '{}' is listed more than once, keeping the first entry", name);
            } else {
                warn!(
                    "Channel '{}' is assigned to group {:?} and to group {:?}, keeping {:?}",
                    name, kept, group, kept
                );
                self.conflicts.push(GroupConflict {
                    name: name.to_string(),
                    kept,
                    ignored: group.map(str::to_string),
                });
            }
            return;
        }

        self.names.push(name.to_string());
        if let Some(group) = group {
            self.groups.insert(name.to_string(), group.to_string());
        }
    }

    pub fn from_json_str(contents: &str) -> AppResult<Self> {
        let file: ChannelFile = serde_json::from_str(contents)
            .map_err(|e| AppError::configuration(format!("invalid channel list: {e}")))?;
        let groups = file.channel_groups.ok_or_else(|| {
            AppError::configuration("channel list has no 'channel_groups' section")
        })?;

        let mut list = Self::new();
        for group in &groups {
            debug!(
                "Loading {} channels for group '{}'",
                group.channels.len(),
                group.group_title
            );
            for channel in &group.channels {
                list.push(channel, Some(&group.group_title));
            }
        }

        if list.is_empty() {
            return Err(AppError::configuration("channel list contains no channels"));
        }
        Ok(list)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::configuration(format!("cannot read channel list {}: {e}", path.display()))
        })?;
        let list = Self::from_json_str(&contents)?;
        info!("Loaded {} requested channels from {}", list.len(), path.display());
        Ok(list)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn group_for(&self, name: &str) -> Option<&str> {
        self.groups.get(name).map(String::as_str)
    }

    pub fn conflicts(&self) -> &[GroupConflict] {
        &self.conflicts
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Ordered list of playlist addresses to visit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceList {
    sources: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SourceFile {
    sources: Option<Vec<String>>,
}

impl SourceList {
    /// Build a list, rejecting blank addresses and skipping repeats
    pub fn new<I, S>(addresses: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut sources = Vec::new();

        for (index, address) in addresses.into_iter().enumerate() {
            let address = address.as_ref().trim();
            if address.is_empty() {
                return Err(AppError::configuration(format!(
                    "source #{} is blank",
                    index + 1
                )));
            }
            if !seen.insert(address.to_string()) {
                warn!(
                    "Skipping repeated source: {}",
                    UrlUtils::obfuscate_credentials(address)
                );
                continue;
            }
            sources.push(address.to_string());
        }

        if sources.is_empty() {
            return Err(AppError::configuration("source list is empty"));
        }
        Ok(Self { sources })
    }

    pub fn from_json_str(contents: &str) -> AppResult<Self> {
        let file: SourceFile = serde_json::from_str(contents)
            .map_err(|e| AppError::configuration(format!("invalid source list: {e}")))?;
        let sources = file
            .sources
            .ok_or_else(|| AppError::configuration("source list has no 'sources' section"))?;
        Self::new(sources)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::configuration(format!("cannot read source list {}: {e}", path.display()))
        })?;
        let list = Self::from_json_str(&contents)?;
        info!("Loaded {} sources from {}", list.len(), path.display());
        Ok(list)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_loads_grouped_channels_in_order() {
        let list = ChannelList::from_json_str(
            r#"{
                "channel_groups": [
                    {"group_title": "央视", "channels": ["CCTV1", "CCTV2"]},
                    {"group_title": "News", "channels": ["CGTN"]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(list.names(), ["CCTV1", "CCTV2", "CGTN"]);
        assert_eq!(list.group_for("CCTV2"), Some("央视"));
        assert_eq!(list.group_for("CGTN"), Some("News"));
        assert!(list.conflicts().is_empty());
    }

    #[test]
    fn test_first_group_wins_and_conflict_is_recorded() {
        let list = ChannelList::from_json_str(
            r#"{
                "channel_groups": [
                    {"group_title": "News", "channels": ["A", "B"]},
                    {"group_title": "Sport", "channels": ["A"]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(list.names(), ["A", "B"]);
        assert_eq!(list.group_for("A"), Some("News"));
        assert_eq!(
            list.conflicts(),
            [GroupConflict {
                name: "A".to_string(),
                kept: Some("News".to_string()),
                ignored: Some("Sport".to_string()),
            }]
        );
    }

    #[test]
    #[traced_test]
    fn test_group_conflict_is_logged() {
        let mut list = ChannelList::new();
        list.push("CCTV5", Some("Sport"));
        list.push("CCTV5", Some("News"));
        assert!(logs_contain("assigned to group"));
        assert_eq!(list.group_for("CCTV5"), Some("Sport"));
    }

    #[test]
    fn test_repeat_in_same_group_is_not_a_conflict() {
        let mut list = ChannelList::new();
        list.push("A", Some("News"));
        list.push("A", Some("News"));
        assert_eq!(list.len(), 1);
        assert!(list.conflicts().is_empty());
    }

    #[test]
    fn test_blank_names_are_ignored() {
        let list = ChannelList::from_names(["A", "  ", "B "]);
        assert_eq!(list.names(), ["A", "B"]);
        assert_eq!(list.group_for("A"), None);
    }

    #[test]
    fn test_channel_list_errors() {
        assert!(matches!(
            ChannelList::from_json_str("not json"),
            Err(AppError::Configuration { .. })
        ));
        assert!(matches!(
            ChannelList::from_json_str(r#"{"channels": ["A"]}"#),
            Err(AppError::Configuration { .. })
        ));
        assert!(matches!(
            ChannelList::from_json_str(r#"{"channel_groups": []}"#),
            Err(AppError::Configuration { .. })
        ));
    }

    #[test]
    fn test_source_list_skips_repeats() {
        let list = SourceList::from_json_str(
            r#"{"sources": ["http://a/list.m3u", "http://b/list.m3u", "http://a/list.m3u"]}"#,
        )
        .unwrap();
        assert_eq!(
            list.iter().collect::<Vec<_>>(),
            ["http://a/list.m3u", "http://b/list.m3u"]
        );
    }

    #[test]
    fn test_source_list_errors() {
        assert!(SourceList::from_json_str(r#"{"sources": []}"#).is_err());
        assert!(SourceList::from_json_str(r#"{"urls": ["http://a"]}"#).is_err());
        assert!(SourceList::from_json_str(r#"{"sources": ["http://a", " "]}"#).is_err());
    }

    #[test]
    fn test_missing_files_are_configuration_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ChannelList::load(dir.path().join("channels.json")),
            Err(AppError::Configuration { .. })
        ));
        assert!(matches!(
            SourceList::load(dir.path().join("sources.json")),
            Err(AppError::Configuration { .. })
        ));
    }
}
