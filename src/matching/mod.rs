//! Channel matching: tag-line parsing and the prioritized matcher

pub mod extinf;
pub mod matcher;

pub use extinf::{Attribute, ExtinfLine, Quote};
pub use matcher::{ChannelMatcher, MatchRule, matches};
