//! Inline link annotation
//!
//!     A status message reaches this module as a flat stream of inline tokens produced by the
//!     host renderer: text runs, the open/close markers of any links the message already
//!     contained, and other markup the annotator passes through untouched. The annotator scans that stream for domain patterns (bug numbers, repository
//!     shorthand) and splices in links around them.
//!
//!     Three things hold for every stream the annotator returns:
//!     - open and close markers stay well nested, so the serializer can emit them without checking
//!     - text already inside a link, whoever put it there, is never linked again
//!     - running the annotator over its own output changes nothing
//!
//!     Rules are configured once, as an ordered [RuleRegistry], and are never mutated
//!     afterwards. The engine keeps no state between streams, so separate messages can be
//!     annotated on separate threads with no coordination.
//!
//!     See [rewriter] for the pass itself and [template] for config-driven link builders.

mod error;
mod registry;
pub mod rewriter;
mod rule;
pub mod template;
mod token;

pub use error::{NestingError, RegistryError, TemplateError};
pub use registry::RuleRegistry;
pub use rewriter::{apply_rule, rewrite, Rewriter};
pub use rule::{LinkBuilder, PatternRule, RuleMatch};
pub use template::{LinkTemplate, Lookup};
pub use token::{Markup, RuleName, Token, TokenStream};
