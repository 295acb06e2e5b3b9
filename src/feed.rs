//! Status feed host
//!
//! The pieces around the annotator: reading update logs, parsing a message into its initial
//! token stream, and serializing annotated streams to HTML feed entries.

pub mod era;
pub mod html;
pub mod markdown;
pub mod store;
pub mod updates;
pub mod urls;
pub mod users;

pub use era::{compute_era, eras_between, feed_window, lookback_start};
pub use html::{escape, format_when, to_html, FeedSubject, RenderContext};
pub use markdown::message_stream;
pub use store::{LogStore, StoreError};
pub use updates::{parse_updates, sort_newest_first, UpdateRecord};
pub use urls::FeedUrls;
pub use users::display_names;
