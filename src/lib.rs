//! # histoire
//!
//! Renders a feed of status updates as hyperlinked prose. The core is the inline annotator in
//! [annotate], which links bug numbers and repository shorthand inside already-tokenized
//! message text without ever nesting links or linking the same text twice.
//!
//! [settings] loads the rule set from the embedded defaults plus user files, and [feed] holds
//! the surrounding host: log parsing, bare-URL detection and HTML output.

pub mod annotate;
pub mod feed;
pub mod settings;
