//! Message text to initial token stream.
//!
//! Messages are Markdown. Bare URLs are linked and every newline is kept as a line break,
//! matching how the feed has always displayed them. The comrak tree is flattened into one
//! token stream; links the author wrote (autolinked URLs included) carry no origin, so rules
//! never reach into them and a `#fragment` inside a URL is never taken for repository
//! shorthand.

use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{parse_document, Arena, Options};

use crate::annotate::{Markup, Token, TokenStream};

fn markdown_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.autolink = true;
    options.extension.strikethrough = true;
    options.render.hardbreaks = true;
    options
}

/// Build the token stream for one message.
pub fn message_stream(message: &str) -> TokenStream {
    let arena = Arena::new();
    let root = parse_document(&arena, message, &markdown_options());

    let mut builder = StreamBuilder::default();
    builder.children(root, 0);
    TokenStream::new(builder.tokens)
}

#[derive(Default)]
struct StreamBuilder {
    tokens: Vec<Token>,
}

impl StreamBuilder {
    fn children<'a>(&mut self, node: &'a AstNode<'a>, level: usize) {
        for child in node.children() {
            self.node(child, level);
        }
    }

    fn wrap<'a>(&mut self, tag: Markup, node: &'a AstNode<'a>, level: usize) {
        self.tokens.push(Token::open(tag, level));
        self.children(node, level + 1);
        self.tokens.push(Token::close(tag, level));
    }

    /// Append text, joining it to a directly preceding text run.
    fn text(&mut self, content: &str, level: usize) {
        // comrak leaves unpaired delimiters as separate text nodes; rules need whole runs.
        if let Some(Token::Text {
            content: last,
            level: last_level,
        }) = self.tokens.last_mut()
        {
            if *last_level == level {
                last.push_str(content);
                return;
            }
        }
        self.tokens.push(Token::text(content, level));
    }

    fn node<'a>(&mut self, node: &'a AstNode<'a>, level: usize) {
        let data = node.data.borrow();

        match &data.value {
            NodeValue::Paragraph => self.wrap(Markup::Paragraph, node, level),
            NodeValue::Heading(heading) => self.wrap(Markup::Heading(heading.level), node, level),
            NodeValue::BlockQuote => self.wrap(Markup::BlockQuote, node, level),
            NodeValue::List(list) => {
                let tag = if matches!(list.list_type, ListType::Ordered) {
                    Markup::OrderedList
                } else {
                    Markup::BulletList
                };
                self.wrap(tag, node, level);
            }
            NodeValue::Item(_) => self.wrap(Markup::ListItem, node, level),
            NodeValue::CodeBlock(block) => {
                self.tokens.push(Token::open(Markup::Preformatted, level));
                self.tokens.push(Token::code(block.literal.clone(), level + 1));
                self.tokens.push(Token::close(Markup::Preformatted, level));
            }
            // Raw HTML is shown as written, never interpreted.
            NodeValue::HtmlBlock(html) => {
                self.tokens.push(Token::open(Markup::Paragraph, level));
                self.text(html.literal.trim_end(), level + 1);
                self.tokens.push(Token::close(Markup::Paragraph, level));
            }
            NodeValue::HtmlInline(html) => self.text(html, level),
            NodeValue::Text(text) => self.text(text, level),
            NodeValue::Code(code) => self.tokens.push(Token::code(code.literal.clone(), level)),
            NodeValue::SoftBreak | NodeValue::LineBreak => {
                self.tokens.push(Token::Break { level })
            }
            NodeValue::Emph => self.wrap(Markup::Emphasis, node, level),
            NodeValue::Strong => self.wrap(Markup::Strong, node, level),
            NodeValue::Strikethrough => self.wrap(Markup::Strikethrough, node, level),
            NodeValue::Link(link) => {
                self.tokens.push(Token::link_open(link.url.clone(), level, None));
                self.children(node, level + 1);
                self.tokens.push(Token::link_close(level, None));
            }
            NodeValue::Image(link) => self.tokens.push(Token::Image {
                src: link.url.clone(),
                alt: plain_text(node),
                level,
            }),
            _ => self.children(node, level),
        }
    }
}

fn plain_text<'a>(node: &'a AstNode<'a>) -> String {
    node.descendants()
        .filter_map(|n| match &n.data.borrow().value {
            NodeValue::Text(text) => Some(text.clone()),
            _ => None,
        })
        .collect()
}
