//! Link templates
//!
//!     Configured rules describe their link target as a string with placeholders:
//!
//!         https://bugzilla.mozilla.org/show_bug.cgi?id={1}
//!         https://github.com/{lookup}/{1}/pull/{2}
//!
//!     `{n}` is replaced with capture `n` (counting from 1, as in the pattern). `{lookup}` is
//!     replaced with the entry of a lookup table keyed by one capture, lowercased. When the key
//!     is absent the template produces no link at all, which is how unknown repositories stay
//!     plain text.
//!
//!     Templates are checked against the rule's capture count when they are compiled, so a
//!     template can never ask for a capture the pattern does not produce.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::error::TemplateError;
use super::rule::LinkBuilder;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Capture(usize),
    Lookup,
}

/// Table keyed by one capture of the match.
#[derive(Debug, Clone)]
pub struct Lookup {
    capture: usize,
    table: Arc<BTreeMap<String, String>>,
}

impl Lookup {
    /// `capture` counts from 1. Keys are compared in lowercase.
    pub fn new(capture: usize, table: Arc<BTreeMap<String, String>>) -> Self {
        Self { capture, table }
    }

    fn resolve(&self, captures: &[&str]) -> Option<&str> {
        let key = captures.get(self.capture - 1)?.to_lowercase();
        self.table.get(&key).map(String::as_str)
    }
}

/// Link builder driven by a placeholder template.
#[derive(Debug, Clone)]
pub struct LinkTemplate {
    segments: Vec<Segment>,
    lookup: Option<Lookup>,
}

impl LinkTemplate {
    /// Compile `template` for a rule producing `captures` capture groups.
    pub fn parse(
        template: &str,
        captures: usize,
        lookup: Option<Lookup>,
    ) -> Result<Self, TemplateError> {
        if let Some(lookup) = &lookup {
            if lookup.capture == 0 || lookup.capture > captures {
                return Err(TemplateError::LookupOutOfRange {
                    index: lookup.capture,
                    captures,
                });
            }
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;
        let mut offset = 0;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or(TemplateError::Unterminated(offset + open))?;
            let name = &after[..close];

            let segment = match name {
                "lookup" if lookup.is_some() => Segment::Lookup,
                "lookup" => return Err(TemplateError::MissingLookup),
                _ => match name.parse::<usize>() {
                    Ok(index) if (1..=captures).contains(&index) => Segment::Capture(index),
                    Ok(index) => return Err(TemplateError::CaptureOutOfRange { index, captures }),
                    Err(_) => return Err(TemplateError::UnknownPlaceholder(name.to_string())),
                },
            };
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(segment);

            let consumed = open + 1 + close + 1;
            offset += consumed;
            rest = &rest[consumed..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments, lookup })
    }
}

impl LinkBuilder for LinkTemplate {
    fn build(&self, captures: &[&str]) -> Option<String> {
        let looked_up = match &self.lookup {
            Some(lookup) => Some(lookup.resolve(captures)?),
            None => None,
        };

        let mut url = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => url.push_str(text),
                Segment::Capture(index) => url.push_str(captures.get(index - 1)?),
                Segment::Lookup => url.push_str(looked_up?),
            }
        }
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owners() -> Arc<BTreeMap<String, String>> {
        let mut table = BTreeMap::new();
        table.insert("binjs-ref".to_string(), "binast".to_string());
        Arc::new(table)
    }

    #[test]
    fn test_substitutes_captures() {
        let template = LinkTemplate::parse("https://b.example/show?id={1}", 1, None).unwrap();
        assert_eq!(
            template.build(&["123"]).as_deref(),
            Some("https://b.example/show?id=123")
        );
    }

    #[test]
    fn test_lookup_hit_and_miss() {
        let template = LinkTemplate::parse(
            "https://github.com/{lookup}/{1}/pull/{2}",
            2,
            Some(Lookup::new(1, owners())),
        )
        .unwrap();
        assert_eq!(
            template.build(&["binjs-ref", "334"]).as_deref(),
            Some("https://github.com/binast/binjs-ref/pull/334")
        );
        assert_eq!(
            template.build(&["BinJS-Ref", "1"]).as_deref(),
            Some("https://github.com/binast/BinJS-Ref/pull/1")
        );
        assert_eq!(template.build(&["unknown", "42"]), None);
    }

    #[test]
    fn test_rejects_out_of_range_capture() {
        assert_eq!(
            LinkTemplate::parse("x/{2}", 1, None).unwrap_err(),
            TemplateError::CaptureOutOfRange {
                index: 2,
                captures: 1
            }
        );
        assert_eq!(
            LinkTemplate::parse("x/{0}", 1, None).unwrap_err(),
            TemplateError::CaptureOutOfRange {
                index: 0,
                captures: 1
            }
        );
    }

    #[test]
    fn test_rejects_malformed_templates() {
        assert_eq!(
            LinkTemplate::parse("x/{1", 1, None).unwrap_err(),
            TemplateError::Unterminated(2)
        );
        assert_eq!(
            LinkTemplate::parse("x/{owner}", 1, None).unwrap_err(),
            TemplateError::UnknownPlaceholder("owner".into())
        );
        assert_eq!(
            LinkTemplate::parse("x/{lookup}", 1, None).unwrap_err(),
            TemplateError::MissingLookup
        );
        assert_eq!(
            LinkTemplate::parse("x", 1, Some(Lookup::new(3, owners()))).unwrap_err(),
            TemplateError::LookupOutOfRange {
                index: 3,
                captures: 1
            }
        );
    }

    #[test]
    fn test_template_without_placeholders() {
        let template = LinkTemplate::parse("https://fixed.example/", 0, None).unwrap();
        assert_eq!(
            template.build(&[]).as_deref(),
            Some("https://fixed.example/")
        );
    }
}
