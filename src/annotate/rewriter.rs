//! Rewriter engine
//!
//!     Applies an ordered rule set to a token stream. Each rule gets its own pass over the
//!     output of the previous one, so links injected by an earlier rule are already in place
//!     (and therefore off limits) when a later rule runs.
//!
//! A Single Pass
//!
//!     The pass walks the stream from the last token to the first. Replacing a text token with
//!     several tokens only shifts what comes after it, and everything after the cursor has
//!     already been visited, so positions still to be visited never move.
//!
//!     Walking backward flips the meaning of the link markers: a close is where a link region
//!     begins and an open is where it ends. The depth counter therefore goes up on close and
//!     down on open, which leaves it equal to the number of links enclosing the current token
//!     in reading order.
//!
//!     Text at depth zero is matched against the rule and split around its matches:
//!
//!         "see bug 12 now"  =>  text("see ")
//!                               link_open(.../12) text("bug 12") link_close
//!                               text(" now")
//!
//!     A match whose builder declines becomes a text token of its own with the matched text
//!     unchanged. Text at any depth above zero is never touched, which is what keeps a second
//!     run over the output from changing anything.

use tracing::{debug, trace};

use super::registry::RuleRegistry;
use super::rule::{PatternRule, RuleMatch};
use super::token::{Token, TokenStream};

/// Rule set bound to the engine. Cheap to share: rewriting only reads it.
#[derive(Debug, Clone, Default)]
pub struct Rewriter {
    registry: RuleRegistry,
}

impl Rewriter {
    pub fn new(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Run every configured rule over `stream`, in order.
    pub fn rewrite(&self, stream: TokenStream) -> TokenStream {
        rewrite(stream, &self.registry)
    }
}

/// Apply `rules` to `stream`, one full pass per rule in registry order.
pub fn rewrite(stream: TokenStream, rules: &RuleRegistry) -> TokenStream {
    rules
        .rules()
        .iter()
        .fold(stream, |stream, rule| apply_rule(stream, rule))
}

/// A single rule pass.
pub fn apply_rule(stream: TokenStream, rule: &PatternRule) -> TokenStream {
    let mut tokens = stream.into_tokens();
    let mut link_depth: usize = 0;
    let mut links = 0;

    for index in (0..tokens.len()).rev() {
        let replacement = match &tokens[index] {
            Token::LinkClose { .. } => {
                link_depth += 1;
                None
            }
            Token::LinkOpen { .. } => {
                link_depth = link_depth.saturating_sub(1);
                None
            }
            Token::Text { content, level } if link_depth == 0 => {
                let found = rule.find_matches(content);
                if found.is_empty() {
                    None
                } else {
                    Some(split_text(rule, content, *level, &found, &mut links))
                }
            }
            _ => None,
        };

        if let Some(replacement) = replacement {
            trace!(rule = rule.name(), index, tokens = replacement.len(), "splicing text");
            tokens.splice(index..=index, replacement);
        }
    }

    debug!(rule = rule.name(), links, "rule pass complete");
    TokenStream::new(tokens)
}

/// Split one text token around its matches.
fn split_text(
    rule: &PatternRule,
    content: &str,
    level: usize,
    found: &[RuleMatch<'_>],
    links: &mut usize,
) -> Vec<Token> {
    let origin = Some(rule.name().to_string());
    let mut out = Vec::with_capacity(found.len() * 3 + 2);
    let mut last = 0;

    for hit in found {
        if hit.start > last {
            out.push(Token::text(&content[last..hit.start], level));
        }
        match rule.link_for(hit) {
            Some(href) => {
                out.push(Token::link_open(href, level, origin.clone()));
                out.push(Token::text(hit.text, level + 1));
                out.push(Token::link_close(level, origin.clone()));
                *links += 1;
            }
            None => out.push(Token::text(hit.text, level)),
        }
        last = hit.end;
    }

    if last < content.len() {
        out.push(Token::text(&content[last..], level));
    }
    out
}
