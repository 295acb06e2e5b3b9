//! Inline token types
//!
//!     An inline unit (one status message) reaches the annotator as a flat sequence of tokens:
//!     text runs, the open/close markers of links around them, and whatever other markup the
//!     host renderer produced (paragraphs, emphasis, code, line breaks). Block and inline
//!     structure share one flat stream; the annotator only ever looks at text and links.
//!
//!     Every token records its nesting `level`. Link markers additionally record their
//!     `origin`: the name of the rule that injected them, or `None` for links that were already
//!     present in the document. Both kinds count as link context when deciding whether text
//!     may be annotated.
//!
//! Well-Nestedness
//!
//!     Walking the stream forward, every open (link or markup) adds one to the depth and every
//!     close removes one. The depth never drops below zero over any prefix and returns to zero
//!     at the end. [TokenStream::check_nesting] verifies this for callers that receive streams
//!     from elsewhere.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::NestingError;

/// Name a pattern rule is registered under; also stamped on the links it injects.
pub type RuleName = String;

/// Markup that wraps other tokens without being a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Markup {
    Paragraph,
    Heading(u8),
    BlockQuote,
    BulletList,
    OrderedList,
    ListItem,
    Preformatted,
    Emphasis,
    Strong,
    Strikethrough,
}

impl Markup {
    /// HTML element name.
    pub fn html_tag(self) -> &'static str {
        match self {
            Markup::Paragraph => "p",
            Markup::Heading(1) => "h1",
            Markup::Heading(2) => "h2",
            Markup::Heading(3) => "h3",
            Markup::Heading(4) => "h4",
            Markup::Heading(5) => "h5",
            Markup::Heading(_) => "h6",
            Markup::BlockQuote => "blockquote",
            Markup::BulletList => "ul",
            Markup::OrderedList => "ol",
            Markup::ListItem => "li",
            Markup::Preformatted => "pre",
            Markup::Emphasis => "em",
            Markup::Strong => "strong",
            Markup::Strikethrough => "del",
        }
    }
}

/// One unit of an inline content stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Token {
    /// Plain, unescaped text. The only token rules match against.
    Text { content: String, level: usize },
    /// Start of a hyperlink.
    LinkOpen {
        href: String,
        level: usize,
        origin: Option<RuleName>,
    },
    /// End of a hyperlink.
    LinkClose {
        level: usize,
        origin: Option<RuleName>,
    },
    /// Start of non-link markup.
    Open { tag: Markup, level: usize },
    /// End of non-link markup.
    Close { tag: Markup, level: usize },
    /// Code span or block body; shown verbatim and never annotated.
    Code { content: String, level: usize },
    Image {
        src: String,
        alt: String,
        level: usize,
    },
    /// Line break.
    Break { level: usize },
}

impl Token {
    pub fn text(content: impl Into<String>, level: usize) -> Self {
        Token::Text {
            content: content.into(),
            level,
        }
    }

    pub fn link_open(href: impl Into<String>, level: usize, origin: Option<RuleName>) -> Self {
        Token::LinkOpen {
            href: href.into(),
            level,
            origin,
        }
    }

    pub fn link_close(level: usize, origin: Option<RuleName>) -> Self {
        Token::LinkClose { level, origin }
    }

    pub fn open(tag: Markup, level: usize) -> Self {
        Token::Open { tag, level }
    }

    pub fn close(tag: Markup, level: usize) -> Self {
        Token::Close { tag, level }
    }

    pub fn code(content: impl Into<String>, level: usize) -> Self {
        Token::Code {
            content: content.into(),
            level,
        }
    }

    pub fn level(&self) -> usize {
        match self {
            Token::Text { level, .. }
            | Token::LinkOpen { level, .. }
            | Token::LinkClose { level, .. }
            | Token::Open { level, .. }
            | Token::Close { level, .. }
            | Token::Code { level, .. }
            | Token::Image { level, .. }
            | Token::Break { level } => *level,
        }
    }

    /// Change in nesting depth contributed by this token, read forward.
    pub fn nesting(&self) -> isize {
        match self {
            Token::LinkOpen { .. } | Token::Open { .. } => 1,
            Token::LinkClose { .. } | Token::Close { .. } => -1,
            _ => 0,
        }
    }

    /// Returns the text content when this is a text token.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Token::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Rule that produced this link marker, if any.
    pub fn origin(&self) -> Option<&str> {
        match self {
            Token::LinkOpen { origin, .. } | Token::LinkClose { origin, .. } => origin.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Text { content, level } => write!(f, "text@{}({:?})", level, content),
            Token::LinkOpen {
                href,
                level,
                origin,
            } => match origin {
                Some(rule) => write!(f, "link_open@{}({} by {})", level, href, rule),
                None => write!(f, "link_open@{}({})", level, href),
            },
            Token::LinkClose { level, .. } => write!(f, "link_close@{}", level),
            Token::Open { tag, level } => write!(f, "open@{}({:?})", level, tag),
            Token::Close { tag, level } => write!(f, "close@{}({:?})", level, tag),
            Token::Code { content, level } => write!(f, "code@{}({:?})", level, content),
            Token::Image { src, level, .. } => write!(f, "image@{}({})", level, src),
            Token::Break { level } => write!(f, "break@{}", level),
        }
    }
}

/// Ordered, well-nested sequence of tokens for one inline unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Concatenated content of every text token, links included.
    pub fn text_content(&self) -> String {
        self.tokens.iter().filter_map(Token::as_text).collect()
    }

    /// Number of link markers injected by the named rule (opens only).
    pub fn links_from(&self, rule: &str) -> usize {
        self.tokens
            .iter()
            .filter(|token| matches!(token, Token::LinkOpen { .. }) && token.origin() == Some(rule))
            .count()
    }

    /// Verify that markers never close more than was opened and that
    /// every open is eventually closed.
    pub fn check_nesting(&self) -> Result<(), NestingError> {
        let mut depth: isize = 0;
        for (index, token) in self.tokens.iter().enumerate() {
            depth += token.nesting();
            if depth < 0 {
                return Err(NestingError::UnbalancedClose { index });
            }
        }
        if depth != 0 {
            return Err(NestingError::Unclosed {
                depth: depth as usize,
            });
        }
        Ok(())
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

impl FromIterator<Token> for TokenStream {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for TokenStream {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
