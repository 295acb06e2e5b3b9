//! Pattern rules
//!
//!     A rule pairs a regular expression with a link builder. The expression finds the spans of
//!     text worth annotating; the builder turns the captured groups into a link target, or
//!     declines with `None` when the text is real but has nowhere to point (a repository
//!     shorthand for a repository nobody knows about, for instance).
//!
//!     Rules are plain values: once built they hold no references into the rewriter and never
//!     change, so a rule set can be shared freely between threads.

use regex::{Regex, RegexBuilder};
use std::fmt;
use std::sync::Arc;

use super::error::RegistryError;
use super::token::RuleName;

/// Turns the captures of one match into a link target.
///
/// Returning `None` means "no link": the matched text is emitted unchanged.
pub trait LinkBuilder: Send + Sync {
    fn build(&self, captures: &[&str]) -> Option<String>;
}

impl<F> LinkBuilder for F
where
    F: Fn(&[&str]) -> Option<String> + Send + Sync,
{
    fn build(&self, captures: &[&str]) -> Option<String> {
        self(captures)
    }
}

/// One non-overlapping match of a rule inside a text token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch<'t> {
    /// Byte offset of the match in the scanned text.
    pub start: usize,
    /// Byte offset one past the end of the match.
    pub end: usize,
    /// The matched substring.
    pub text: &'t str,
    /// Capture groups in order; groups that did not take part are empty.
    pub captures: Vec<&'t str>,
}

impl RuleMatch<'_> {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Immutable annotation rule.
#[derive(Clone)]
pub struct PatternRule {
    name: RuleName,
    pattern: Regex,
    num_captures: usize,
    builder: Arc<dyn LinkBuilder>,
}

impl PatternRule {
    /// Build a rule from a compiled expression.
    ///
    /// Fails when `num_captures` is not the number of capture groups in `pattern`.
    pub fn new(
        name: impl Into<RuleName>,
        pattern: Regex,
        num_captures: usize,
        builder: impl LinkBuilder + 'static,
    ) -> Result<Self, RegistryError> {
        let name = name.into();
        let actual = pattern.captures_len() - 1;
        if actual != num_captures {
            return Err(RegistryError::ArityMismatch {
                rule: name,
                declared: num_captures,
                actual,
            });
        }
        Ok(Self {
            name,
            pattern,
            num_captures,
            builder: Arc::new(builder),
        })
    }

    /// Compile `pattern` and build a rule from it.
    pub fn from_pattern(
        name: impl Into<RuleName>,
        pattern: &str,
        case_insensitive: bool,
        num_captures: usize,
        builder: impl LinkBuilder + 'static,
    ) -> Result<Self, RegistryError> {
        let name = name.into();
        let compiled = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|source| RegistryError::InvalidPattern {
                rule: name.clone(),
                source,
            })?;
        Self::new(name, compiled, num_captures, builder)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn num_captures(&self) -> usize {
        self.num_captures
    }

    /// Leftmost-first, non-overlapping matches of this rule in `text`.
    ///
    /// Empty matches are skipped; there is nothing to wrap in a link.
    pub fn find_matches<'t>(&self, text: &'t str) -> Vec<RuleMatch<'t>> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                if whole.is_empty() {
                    return None;
                }
                let captures = (1..=self.num_captures)
                    .map(|group| caps.get(group).map_or("", |m| m.as_str()))
                    .collect();
                Some(RuleMatch {
                    start: whole.start(),
                    end: whole.end(),
                    text: whole.as_str(),
                    captures,
                })
            })
            .collect()
    }

    /// Link target for a match, or `None` when the builder declines.
    pub fn link_for(&self, found: &RuleMatch<'_>) -> Option<String> {
        self.builder.build(&found.captures)
    }
}

impl fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternRule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .field("num_captures", &self.num_captures)
            .finish_non_exhaustive()
    }
}
