use thiserror::Error;

/// A token stream whose link markers do not pair up.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NestingError {
    #[error("link close at token {index} has no matching open")]
    UnbalancedClose { index: usize },
    #[error("{depth} link(s) left open at end of stream")]
    Unclosed { depth: usize },
}

/// Malformed rule set. Raised while building a registry, never while rewriting.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("rule `{rule}` declares {declared} capture(s) but its pattern has {actual}")]
    ArityMismatch {
        rule: String,
        declared: usize,
        actual: usize,
    },
    #[error("rule `{0}` is registered more than once")]
    DuplicateRule(String),
    #[error("rule `{rule}` has an invalid pattern: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
    #[error("rule `{rule}` has an invalid link template: {source}")]
    InvalidTemplate {
        rule: String,
        #[source]
        source: TemplateError,
    },
    #[error("rule `{rule}` looks up unknown table `{table}`")]
    UnknownTable { rule: String, table: String },
}

/// Problems found while compiling a link template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unterminated placeholder starting at byte {0}")]
    Unterminated(usize),
    #[error("unknown placeholder `{{{0}}}`")]
    UnknownPlaceholder(String),
    #[error("placeholder `{{{index}}}` exceeds the {captures} capture(s) available")]
    CaptureOutOfRange { index: usize, captures: usize },
    #[error("`{{lookup}}` used without a lookup table")]
    MissingLookup,
    #[error("lookup keyed on capture {index} but only {captures} capture(s) are available")]
    LookupOutOfRange { index: usize, captures: usize },
}
