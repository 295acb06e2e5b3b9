//! HTML output
//!
//!     [to_html] serializes an annotated token stream. Text and attribute values are escaped
//!     here, at the last moment; tokens themselves always hold plain text. Links injected by a
//!     rule are marked with `class="auto"` and the rule name so they can be styled apart from
//!     links the author wrote.
//!
//!     [RenderContext] renders whole feed entries. Everything an entry needs beyond the record
//!     itself (display names, URL builders, the rule set) lives on the context and is passed in
//!     explicitly.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::Write;

use super::markdown::message_stream;
use super::updates::UpdateRecord;
use super::urls::{matrix_to, room_route, user_route, FeedUrls};
use crate::annotate::{Markup, Rewriter, Token, TokenStream};

/// Serialize a token stream to HTML.
pub fn to_html(stream: &TokenStream) -> String {
    let mut out = String::new();
    for token in stream {
        match token {
            Token::Text { content, .. } => out.push_str(&escape(content)),
            Token::LinkOpen { href, origin, .. } => {
                let _ = write!(out, "<a href=\"{}\"", escape(href));
                if let Some(rule) = origin {
                    let _ = write!(out, " class=\"auto\" data-rule=\"{}\"", escape(rule));
                }
                out.push('>');
            }
            Token::LinkClose { .. } => out.push_str("</a>"),
            Token::Open { tag, .. } => {
                let _ = write!(out, "<{}>", tag.html_tag());
            }
            Token::Close { tag, .. } => {
                let _ = write!(out, "</{}>", tag.html_tag());
                if is_block(*tag) {
                    out.push('\n');
                }
            }
            Token::Code { content, .. } => {
                let _ = write!(out, "<code>{}</code>", escape(content));
            }
            Token::Image { src, alt, .. } => {
                let _ = write!(out, "<img src=\"{}\" alt=\"{}\">", escape(src), escape(alt));
            }
            Token::Break { .. } => out.push_str("<br>\n"),
        }
    }
    out
}

fn is_block(tag: Markup) -> bool {
    !matches!(tag, Markup::Emphasis | Markup::Strong | Markup::Strikethrough)
}

/// Escape text for use in element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Human-readable UTC time for an update timestamp.
pub fn format_when(when: i64) -> String {
    match DateTime::<Utc>::from_timestamp(when, 0) {
        Some(time) => time.format("%a %Y-%m-%d %H:%M:%S UTC").to_string(),
        None => when.to_string(),
    }
}

/// Who a feed page is about.
#[derive(Debug, Clone, Copy)]
pub enum FeedSubject<'a> {
    Channel(&'a str),
    AllUsers,
    Users(&'a [String]),
}

/// Everything needed to render feed entries.
#[derive(Debug, Clone)]
pub struct RenderContext {
    rewriter: Rewriter,
    urls: FeedUrls,
    display_names: HashMap<String, String>,
    show_user_links: bool,
    window: Option<(i64, i64)>,
}

impl RenderContext {
    pub fn new(rewriter: Rewriter, urls: FeedUrls) -> Self {
        Self {
            rewriter,
            urls,
            display_names: HashMap::new(),
            show_user_links: false,
            window: None,
        }
    }

    pub fn with_display_names(mut self, names: HashMap<String, String>) -> Self {
        self.display_names = names;
        self
    }

    /// Link each author's name to their own feed (useful on multi-user pages).
    pub fn with_user_links(mut self, show: bool) -> Self {
        self.show_user_links = show;
        self
    }

    /// Keep user and room links pinned to the `(start, end)` window being shown.
    pub fn with_window(mut self, start: i64, end: i64) -> Self {
        self.window = Some((start, end));
        self
    }

    pub fn rewriter(&self) -> &Rewriter {
        &self.rewriter
    }

    pub fn display_name<'a>(&'a self, user: &'a str) -> &'a str {
        self.display_names
            .get(user)
            .map(String::as_str)
            .unwrap_or(user)
    }

    /// Annotated token stream for a message.
    pub fn annotate(&self, message: &str) -> TokenStream {
        self.rewriter.rewrite(message_stream(message))
    }

    /// Message body as HTML.
    pub fn render_message(&self, message: &str) -> String {
        let mut html = to_html(&self.annotate(message));
        html.truncate(html.trim_end().len());
        html
    }

    /// Page heading: `Updates for ...`, with rooms linked to Matrix.
    pub fn render_title(&self, subject: FeedSubject<'_>) -> String {
        let mut out = String::from("<h1 class=\"header-title\">Updates for ");
        match subject {
            FeedSubject::Channel(channel) if channel.starts_with('#') => {
                let _ = write!(
                    out,
                    "<a href=\"{}\">{}</a>",
                    escape(&matrix_to(channel)),
                    escape(channel)
                );
            }
            FeedSubject::Channel(channel) => out.push_str(&escape(channel)),
            FeedSubject::AllUsers => out.push_str("all users"),
            FeedSubject::Users(users) => {
                let names: Vec<&str> = users.iter().map(|u| self.display_name(u)).collect();
                out.push_str(&escape(&names.join(", ")));
            }
        }
        out.push_str("</h1>");
        out
    }

    /// One `<li>` feed entry.
    pub fn render_update(&self, record: &UpdateRecord) -> String {
        let mut out = String::from("<li><div class=\"update-header\"><strong class=\"name\">");

        let name = escape(self.display_name(&record.user));
        if self.show_user_links {
            let _ = write!(
                out,
                "<a href=\"{}\">{}</a>",
                escape(&user_route(&record.user, self.window)),
                name
            );
        } else {
            out.push_str(&name);
        }
        out.push_str("</strong> <small class=\"time\">");

        if record.channel.starts_with('#') {
            let _ = write!(
                out,
                "<a href=\"{}\">{}</a>",
                escape(&room_route(&record.channel, self.window)),
                escape(&record.channel)
            );
        }
        let _ = write!(
            out,
            "<span data-when=\"{}\">{}</span></small> ",
            record.when,
            format_when(record.when)
        );
        let _ = write!(
            out,
            "<a class=\"edit\" href=\"{}\" target=\"_blank\" aria-label=\"edit\">edit</a></div>",
            escape(&self.urls.edit(&record.user, record.era))
        );
        let _ = write!(
            out,
            "<div class=\"message\">{}</div></li>",
            self.render_message(&record.message)
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::{PatternRule, RuleRegistry};

    fn context() -> RenderContext {
        let bug = PatternRule::from_pattern("bug", r"bug (\d+)", true, 1, |caps: &[&str]| {
            Some(format!("https://bugs.example/{}", caps[0]))
        })
        .unwrap();
        let rewriter = Rewriter::new(RuleRegistry::new(vec![bug]).unwrap());
        RenderContext::new(rewriter, FeedUrls::new("robotzilla/histoire"))
    }

    #[test]
    fn test_escapes_text_and_attributes() {
        let stream = TokenStream::new(vec![
            Token::link_open("https://x/?a=1&b=\"2\"", 0, None),
            Token::text("<script>alert('oops')</script>", 1),
            Token::link_close(0, None),
        ]);
        insta::assert_snapshot!(
            to_html(&stream),
            @r#"<a href="https://x/?a=1&amp;b=&quot;2&quot;">&lt;script&gt;alert(&#39;oops&#39;)&lt;/script&gt;</a>"#
        );
    }

    #[test]
    fn test_injected_links_are_marked() {
        insta::assert_snapshot!(
            context().render_message("Bug number test: bug 123"),
            @r#"<p>Bug number test: <a href="https://bugs.example/123" class="auto" data-rule="bug">bug 123</a></p>"#
        );
    }

    #[test]
    fn test_author_links_are_not_annotated_inside() {
        insta::assert_snapshot!(
            context().render_message("fixed [bug 5](https://example.com/x) today"),
            @r#"<p>fixed <a href="https://example.com/x">bug 5</a> today</p>"#
        );
    }

    #[test]
    fn test_markdown_markup_is_rendered() {
        assert_eq!(
            context().render_message("**bug 1** and `bug 2`\nnext"),
            "<p><strong><a href=\"https://bugs.example/1\" class=\"auto\" data-rule=\"bug\">bug 1</a></strong> \
             and <code>bug 2</code><br>\nnext</p>"
        );
    }

    #[test]
    fn test_format_when_is_utc() {
        assert_eq!(format_when(1_540_000_123), "Sat 2018-10-20 01:48:43 UTC");
        assert_eq!(format_when(0), "Thu 1970-01-01 00:00:00 UTC");
    }

    #[test]
    fn test_title_names_channel_or_users() {
        let mut names = HashMap::new();
        names.insert("@bob:x.org".to_string(), "@bob".to_string());
        let ctx = context().with_display_names(names);
        let users = vec!["@bob:x.org".to_string(), "carol".to_string()];

        assert_eq!(
            ctx.render_title(FeedSubject::Users(&users)),
            "<h1 class=\"header-title\">Updates for @bob, carol</h1>"
        );
        assert_eq!(
            ctx.render_title(FeedSubject::Channel("#jsparagus")),
            "<h1 class=\"header-title\">Updates for <a href=\"https://matrix.to/#/#jsparagus\">#jsparagus</a></h1>"
        );
        assert_eq!(
            ctx.render_title(FeedSubject::AllUsers),
            "<h1 class=\"header-title\">Updates for all users</h1>"
        );
    }

    #[test]
    fn test_display_names_fall_back_to_user() {
        let mut names = HashMap::new();
        names.insert("bob".to_string(), "Bob B.".to_string());
        let ctx = context().with_display_names(names);
        assert_eq!(ctx.display_name("bob"), "Bob B.");
        assert_eq!(ctx.display_name("carol"), "carol");
    }

    #[test]
    fn test_render_update_entry() {
        let record = UpdateRecord {
            user: "bob".into(),
            era: 1540000000,
            when: 1540000123,
            channel: "#jsparagus".into(),
            message: "fixed bug 9".into(),
        };
        let html = context().with_user_links(true).render_update(&record);
        assert!(html.starts_with("<li><div class=\"update-header\">"));
        assert!(html.contains("<a href=\"#user=bob\">bob</a>"));
        assert!(html.contains("<a href=\"#room=%23jsparagus\">#jsparagus</a>"));
        assert!(html.contains(
            "<span data-when=\"1540000123\">Sat 2018-10-20 01:48:43 UTC</span>"
        ));
        assert!(html.contains(
            "href=\"https://github.com/robotzilla/histoire/edit/master/users/bob/bob.1540000000.txt\""
        ));
        assert!(html.contains("data-rule=\"bug\">bug 9</a>"));
        assert!(html.ends_with("</div></li>"));
    }

    #[test]
    fn test_links_keep_the_window() {
        let record = UpdateRecord {
            user: "bob".into(),
            era: 0,
            when: 1,
            channel: "#a".into(),
            message: String::new(),
        };
        let html = context()
            .with_user_links(true)
            .with_window(10, 20)
            .render_update(&record);
        assert!(html.contains("href=\"#user=bob&amp;start=10&amp;end=20\""));
        assert!(html.contains("href=\"#room=%23a&amp;start=10&amp;end=20\""));
    }

    #[test]
    fn test_direct_messages_have_no_room_link() {
        let record = UpdateRecord {
            user: "bob".into(),
            era: 0,
            when: 1,
            channel: "@someone".into(),
            message: String::new(),
        };
        let html = context().render_update(&record);
        assert!(!html.contains("#room="));
    }
}
