//! Tag-line rewriting for the generated playlist
//!
//! Two independent edits are applied to the first-seen tag line of each
//! channel: the group title is replaced with the configured group, and when
//! a channel has several URLs each copy gets a numbered `tvg-name` so
//! players do not fold them into one channel. Group edits only touch
//! `group-title` and name edits only touch `tvg-name`. A line that needs
//! neither edit is emitted exactly as the source published it.

use crate::matching::ExtinfLine;
use crate::matching::matcher::NAME_ATTRIBUTE;
use crate::models::{MatchResult, PlaylistEntry};

pub const GROUP_ATTRIBUTE: &str = "group-title";

/// Inputs for rewriting one emitted entry
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    /// Requested channel name
    pub channel: &'a str,
    pub group: Option<&'a str>,
    /// 1-based position of this URL among the channel's URLs
    pub index: usize,
    /// Number of URLs the channel has
    pub total: usize,
}

/// Produce the final tag line for one URL of a channel
pub fn rewrite(base: Option<&str>, ctx: &RewriteContext<'_>) -> String {
    let mut line = match base {
        Some(base) if ctx.group.is_none() && ctx.total <= 1 => return base.to_string(),
        Some(base) => ExtinfLine::parse(base),
        None => ExtinfLine::synthesize(ctx.channel),
    };

    if let Some(group) = ctx.group {
        set_group_title(&mut line, group);
    }
    if ctx.total > 1 {
        tag_unique_name(&mut line, ctx.channel, ctx.index);
    }

    line.to_string()
}

/// Replace every `group-title` with a single one carrying `group`
pub fn set_group_title(line: &mut ExtinfLine, group: &str) {
    line.remove_attribute(GROUP_ATTRIBUTE);
    line.push_attribute(GROUP_ATTRIBUTE, group);
}

/// Suffix the existing `tvg-name` with `#index`, or add one built from the channel name
pub fn tag_unique_name(line: &mut ExtinfLine, channel: &str, index: usize) {
    if !line.update_attribute(NAME_ATTRIBUTE, |name| unique_name(name, index)) {
        line.push_attribute(NAME_ATTRIBUTE, unique_name(channel, index));
    }
}

fn unique_name(name: &str, index: usize) -> String {
    format!("{name} #{index}")
}

/// All output entries for one channel, in discovery order
pub fn rewrite_result(result: &MatchResult, group: Option<&str>) -> Vec<PlaylistEntry> {
    let base = result.base_metadata();
    let total = result.url_count();

    result
        .urls()
        .enumerate()
        .map(|(i, url)| {
            let ctx = RewriteContext {
                channel: &result.name,
                group,
                index: i + 1,
                total,
            };
            PlaylistEntry::new(rewrite(base, &ctx), url)
        })
        .collect()
}
