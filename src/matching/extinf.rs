//! Structured view of an `#EXTINF` tag line
//!
//! A tag line looks like
//!
//! ```text
//! #EXTINF:-1 tvg-id="CCTV1" tvg-name="CCTV-1" group-title='央视',CCTV-1 综合
//! ```
//!
//! and is split into the leading words (duration marker and `key=value`
//! attributes, in their original order) and the title that follows the
//! first comma outside of quotes. Both the matcher and the rewriter work on
//! this view so attribute edits never have to touch the raw text.
//!
//! Every token keeps the text it was parsed from together with the
//! whitespace in front of it, so rendering a line that was not edited gives
//! back the input unchanged and an edit only rewrites the attribute it
//! touches.
//!
//! A quote only closes a value when it is followed by whitespace, a comma or
//! the end of the line, which keeps values such as `tvg-name='O'Brien TV'`
//! in one piece.

use std::fmt;

/// Quote style an attribute value was written with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Double,
    Single,
    Bare,
}

impl Quote {
    fn from_char(ch: char) -> Option<Self> {
        match ch {
            '"' => Some(Self::Double),
            '\'' => Some(Self::Single),
            _ => None,
        }
    }
}

/// Quote style for a value written by us. The chosen quote character never
/// occurs inside the value; when both kinds do, double quotes become single.
fn quote_value(value: String) -> (String, Quote) {
    match (value.contains('"'), value.contains('\'')) {
        (false, _) => (value, Quote::Double),
        (true, false) => (value, Quote::Single),
        (true, true) => (value.replace('"', "'"), Quote::Double),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    key: String,
    value: String,
    quote: Quote,
    /// Source text, dropped once the value is edited
    raw: Option<String>,
}

impl Attribute {
    pub fn new<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        let (value, quote) = quote_value(value.into());
        Self {
            key: key.into(),
            value,
            quote,
            raw: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn quote(&self) -> Quote {
        self.quote
    }

    fn is(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }

    /// Replace the value, keeping the quote style unless the value can no
    /// longer be carried by it
    fn set_value(&mut self, value: String) {
        let fits = match self.quote {
            Quote::Double => !value.contains('"'),
            Quote::Single => !value.contains('\''),
            Quote::Bare => !value
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | ',')),
        };
        if fits {
            self.value = value;
        } else {
            (self.value, self.quote) = quote_value(value);
        }
        self.raw = None;
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(raw) = &self.raw {
            return f.write_str(raw);
        }
        match self.quote {
            Quote::Double => write!(f, "{}=\"{}\"", self.key, self.value),
            Quote::Single => write!(f, "{}='{}'", self.key, self.value),
            Quote::Bare => write!(f, "{}={}", self.key, self.value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Attribute(Attribute),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(word) => f.write_str(word),
            Token::Attribute(attr) => write!(f, "{attr}"),
        }
    }
}

/// A token and the whitespace that preceded it
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    lead: String,
    token: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtinfLine {
    segments: Vec<Segment>,
    /// Whitespace between the last token and the separator
    trailing: String,
    /// Everything after the separator, verbatim. `None` when the line has no separator.
    title: Option<String>,
}

impl ExtinfLine {
    pub fn parse(line: &str) -> Self {
        let (head, title) = match find_separator(line) {
            Some(pos) => (&line[..pos], Some(line[pos + 1..].to_string())),
            None => (line, None),
        };
        let (segments, trailing) = tokenize(head);

        Self {
            segments,
            trailing,
            title,
        }
    }

    /// Minimal tag line carrying only a title
    pub fn synthesize(title: &str) -> Self {
        Self {
            segments: vec![Segment {
                lead: String::new(),
                token: Token::Word("#EXTINF:-1".to_string()),
            }],
            trailing: String::new(),
            title: Some(title.to_string()),
        }
    }

    /// Value of the first attribute with this key (ASCII case-insensitive)
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes()
            .find(|attr| attr.is(key))
            .map(Attribute::value)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.segments.iter().filter_map(|segment| match &segment.token {
            Token::Attribute(attr) => Some(attr),
            Token::Word(_) => None,
        })
    }

    /// Raw text after the separator
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Drop every attribute with this key, returning how many were removed
    pub fn remove_attribute(&mut self, key: &str) -> usize {
        let before = self.segments.len();
        self.segments.retain(
            |segment| !matches!(&segment.token, Token::Attribute(attr) if attr.is(key)),
        );
        before - self.segments.len()
    }

    /// Append an attribute at the end of the attribute list, right before the separator
    pub fn push_attribute<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let lead = if self.segments.is_empty() { "" } else { " " };
        self.segments.push(Segment {
            lead: lead.to_string(),
            token: Token::Attribute(Attribute::new(key, value)),
        });
    }

    /// Rewrite the value of the first attribute with this key in place.
    /// Returns false if there is no such attribute.
    pub fn update_attribute<F>(&mut self, key: &str, update: F) -> bool
    where
        F: FnOnce(&str) -> String,
    {
        let Some(attr) = self
            .segments
            .iter_mut()
            .find_map(|segment| match &mut segment.token {
                Token::Attribute(attr) if attr.is(key) => Some(attr),
                _ => None,
            })
        else {
            return false;
        };

        let value = update(&attr.value);
        attr.set_value(value);
        true
    }
}

impl fmt::Display for ExtinfLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{}{}", segment.lead, segment.token)?;
        }
        f.write_str(&self.trailing)?;
        if let Some(title) = &self.title {
            write!(f, ",{title}")?;
        }
        Ok(())
    }
}

/// Byte offset of the first comma outside quotes, falling back to the
/// first comma when quotes never balance.
fn find_separator(line: &str) -> Option<usize> {
    let mut open: Option<char> = None;
    for (pos, ch) in line.char_indices() {
        match (open, ch) {
            (None, ',') => return Some(pos),
            (None, '"' | '\'') if is_value_start(line, pos) => open = Some(ch),
            (Some(q), c) if c == q && closes_quote(line[pos + 1..].chars().next()) => open = None,
            _ => {}
        }
    }
    if open.is_some() { line.find(',') } else { None }
}

/// Quotes only open a value when they directly follow `=`
fn is_value_start(line: &str, pos: usize) -> bool {
    line[..pos].ends_with('=')
}

/// A quote closes its value only before whitespace, a comma or the end of the line
fn closes_quote(next: Option<char>) -> bool {
    next.is_none_or(|c| c == ',' || c.is_whitespace())
}

fn tokenize(head: &str) -> (Vec<Segment>, String) {
    let mut segments = Vec::new();
    let mut chars = head.char_indices().peekable();
    let mut gap_start = 0;

    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        // Key or bare word runs until whitespace or '='
        let mut end = start;
        let mut key_end = None;
        while let Some(&(pos, c)) = chars.peek() {
            if c.is_whitespace() {
                break;
            }
            chars.next();
            end = pos + c.len_utf8();
            if c == '=' && pos > start {
                key_end = Some(pos);
                break;
            }
        }

        let token = match key_end {
            None => Token::Word(head[start..end].to_string()),
            Some(key_end) => {
                let open = chars
                    .peek()
                    .and_then(|&(_, c)| Quote::from_char(c).map(|quote| (c, quote)));
                let mut value = String::new();
                let quote = match open {
                    Some((q, quote)) => {
                        chars.next();
                        // An unterminated value runs to the end of the head
                        end = head.len();
                        while let Some((pos, c)) = chars.next() {
                            if c == q && closes_quote(chars.peek().map(|&(_, n)| n)) {
                                end = pos + c.len_utf8();
                                break;
                            }
                            value.push(c);
                        }
                        quote
                    }
                    None => {
                        while let Some(&(pos, c)) = chars.peek() {
                            if c.is_whitespace() {
                                break;
                            }
                            value.push(c);
                            end = pos + c.len_utf8();
                            chars.next();
                        }
                        Quote::Bare
                    }
                };

                Token::Attribute(Attribute {
                    key: head[start..key_end].to_string(),
                    value,
                    quote,
                    raw: Some(head[start..end].to_string()),
                })
            }
        };

        segments.push(Segment {
            lead: head[gap_start..start].to_string(),
            token,
        });
        gap_start = end;
    }

    (segments, head[gap_start..].to_string())
}
