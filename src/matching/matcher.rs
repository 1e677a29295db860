//! Prioritized channel-name matching against `#EXTINF` tag lines
//!
//! Structured attributes are trusted over free text, and at every tier an
//! exact (case-insensitive) comparison is tried before whole-token
//! containment. Whole-token containment only accepts an occurrence that is
//! bounded by the string edge or by a character that is not an ASCII letter,
//! digit or underscore, so `CCTV1` never matches inside `CCTV10` while
//! `CCTV1` still matches `CCTV1综合` or `[HD] CCTV1`.

use regex::{Regex, RegexBuilder};
use std::fmt;

use super::extinf::ExtinfLine;

pub const ID_ATTRIBUTE: &str = "tvg-id";
pub const NAME_ATTRIBUTE: &str = "tvg-name";

/// Which rule produced a match, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchRule {
    IdExact,
    IdToken,
    NameExact,
    NameToken,
    DisplayExact,
    DisplayToken,
    Fallback,
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchRule::IdExact => "tvg-id exact",
            MatchRule::IdToken => "tvg-id token",
            MatchRule::NameExact => "tvg-name exact",
            MatchRule::NameToken => "tvg-name token",
            MatchRule::DisplayExact => "display name exact",
            MatchRule::DisplayToken => "display name token",
            MatchRule::Fallback => "tag line token",
        };
        f.write_str(label)
    }
}

/// Matcher for a single requested channel name, compiled once and reused
/// across every entry of every source.
#[derive(Debug, Clone)]
pub struct ChannelMatcher {
    name: String,
    folded: String,
    token: Regex,
}

impl ChannelMatcher {
    pub fn new(name: &str) -> Result<Self, regex::Error> {
        let pattern = format!(
            r"(?:^|[^0-9A-Za-z_]){}(?:$|[^0-9A-Za-z_])",
            regex::escape(name)
        );
        let token = RegexBuilder::new(&pattern).case_insensitive(true).build()?;

        Ok(Self {
            name: name.to_string(),
            folded: name.to_lowercase(),
            token,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, metadata: &str) -> bool {
        self.match_rule(metadata).is_some()
    }

    /// First rule satisfied by this tag line, if any
    pub fn match_rule(&self, metadata: &str) -> Option<MatchRule> {
        self.match_parsed(&ExtinfLine::parse(metadata), metadata)
    }

    /// Like [`match_rule`](Self::match_rule), for a tag line already parsed
    /// into `line`. Lets one parse serve every requested channel.
    pub fn match_parsed(&self, line: &ExtinfLine, metadata: &str) -> Option<MatchRule> {
        let tiers = [
            (line.attribute(ID_ATTRIBUTE), MatchRule::IdExact, MatchRule::IdToken),
            (line.attribute(NAME_ATTRIBUTE), MatchRule::NameExact, MatchRule::NameToken),
            (display_name(metadata), MatchRule::DisplayExact, MatchRule::DisplayToken),
        ];
        for (value, exact, token) in tiers {
            if let Some(rule) = self.check(value, exact, token) {
                return Some(rule);
            }
        }

        self.contains_token(metadata).then_some(MatchRule::Fallback)
    }

    fn check(&self, value: Option<&str>, exact: MatchRule, token: MatchRule) -> Option<MatchRule> {
        let value = value?;
        if self.equals(value) {
            Some(exact)
        } else if self.contains_token(value) {
            Some(token)
        } else {
            None
        }
    }

    fn equals(&self, value: &str) -> bool {
        value.trim().to_lowercase() == self.folded
    }

    fn contains_token(&self, haystack: &str) -> bool {
        self.token.is_match(haystack)
    }
}

/// Text after the last comma of the tag line, trimmed
pub fn display_name(metadata: &str) -> Option<&str> {
    metadata.rsplit_once(',').map(|(_, name)| name.trim())
}

/// One-off check of a requested name against a tag line.
///
/// Prefer [`ChannelMatcher`] when matching the same name repeatedly.
pub fn matches(requested: &str, metadata: &str) -> bool {
    ChannelMatcher::new(requested)
        .map(|matcher| matcher.matches(metadata))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, metadata: &str) -> Option<MatchRule> {
        ChannelMatcher::new(name).unwrap().match_rule(metadata)
    }

    #[test]
    fn test_id_exact_is_case_insensitive() {
        assert_eq!(
            rule("cctv1", r#"#EXTINF:-1 tvg-id="CCTV1" tvg-name="whatever",Something"#),
            Some(MatchRule::IdExact)
        );
    }

    #[test]
    fn test_rules_apply_in_priority_order() {
        assert_eq!(
            rule("CCTV1", r#"#EXTINF:-1 tvg-id="CCTV1.cn",CCTV1"#),
            Some(MatchRule::IdToken)
        );
        assert_eq!(
            rule("CCTV1", r#"#EXTINF:-1 tvg-id="cctv-one" tvg-name="CCTV1",x"#),
            Some(MatchRule::NameExact)
        );
        assert_eq!(
            rule("CCTV1", r#"#EXTINF:-1 tvg-name="CCTV1 HD",x"#),
            Some(MatchRule::NameToken)
        );
        assert_eq!(rule("CCTV1", "#EXTINF:-1,  CCTV1 "), Some(MatchRule::DisplayExact));
        assert_eq!(
            rule("CCTV1", "#EXTINF:-1,CCTV1综合"),
            Some(MatchRule::DisplayToken)
        );
        assert_eq!(
            rule("CCTV1", r#"#EXTINF:-1 tvg-logo="http://logo/CCTV1.png",综合频道"#),
            Some(MatchRule::Fallback)
        );
    }

    #[test]
    fn test_numeric_suffix_family_is_rejected() {
        let matcher = ChannelMatcher::new("CCTV1").unwrap();
        assert!(!matcher.matches(r#"#EXTINF:-1 tvg-id="CCTV10" tvg-name="CCTV10",CCTV10"#));
        assert!(!matcher.matches("#EXTINF:-1,CCTV10 HD"));
        assert!(!matcher.matches("#EXTINF:-1,CCTV11"));
        assert!(!matcher.matches("#EXTINF:-1,XCCTV1"));
        assert!(matcher.matches("#EXTINF:-1,CCTV10 / CCTV1"));
    }

    #[test]
    fn test_display_name_uses_last_comma() {
        assert_eq!(display_name("#EXTINF:-1 a=\"x\",First, Second "), Some("Second"));
        assert_eq!(display_name("#EXTINF:-1"), None);
        assert!(matches("Second", "#EXTINF:-1,First, Second"));
    }

    #[test]
    fn test_names_with_regex_metacharacters() {
        assert!(matches("CCTV-5+", "#EXTINF:-1,CCTV-5+ 体育赛事"));
        assert!(!matches("CCTV-5+", "#EXTINF:-1,CCTV-5 体育"));
        assert!(matches("A.B", "#EXTINF:-1,A.B"));
        assert!(!matches("A.B", "#EXTINF:-1,AxB"));
    }

    #[test]
    fn test_parsed_line_is_reused_across_matchers() {
        let metadata = r#"#EXTINF:-1 tvg-id="CCTV1" tvg-name="CCTV-5+",CCTV-13 新闻"#;
        let line = ExtinfLine::parse(metadata);

        for name in ["CCTV1", "CCTV-5+", "CCTV-13", "CCTV10", "新闻"] {
            let matcher = ChannelMatcher::new(name).unwrap();
            assert_eq!(
                matcher.match_parsed(&line, metadata),
                matcher.match_rule(metadata),
                "{name}"
            );
        }
        assert_eq!(
            ChannelMatcher::new("CCTV-5+").unwrap().match_parsed(&line, metadata),
            Some(MatchRule::NameExact)
        );
    }

    #[test]
    fn test_no_match() {
        assert_eq!(rule("湖南卫视", r#"#EXTINF:-1 tvg-id="ZJTV",浙江卫视"#), None);
    }

    #[test]
    fn test_uppercased_attribute_keys_still_match() {
        assert_eq!(
            rule("cctv1", r#"#EXTINF:-1 TVG-ID="CCTV1",X"#),
            Some(MatchRule::IdExact)
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_matching_ignores_metadata_case(
                name in "[A-Za-z][A-Za-z0-9]{0,6}",
                id in "[A-Za-z0-9 ]{0,12}",
                title in "[A-Za-z0-9 +-]{0,16}",
            ) {
                let metadata = format!(r#"#EXTINF:-1 tvg-id="{id}",{title}"#);
                let matcher = ChannelMatcher::new(&name).unwrap();
                prop_assert_eq!(
                    matcher.matches(&metadata),
                    matcher.matches(&metadata.to_uppercase())
                );
            }

            #[test]
            fn test_digit_suffix_never_matches(
                name in "[A-Za-z]{1,6}[0-9]{1,2}",
                suffix in 0u8..10,
            ) {
                let metadata = format!(r#"#EXTINF:-1 tvg-id="{name}{suffix}",{name}{suffix}"#);
                prop_assert!(!matches(&name, &metadata));
            }
        }
    }
}
