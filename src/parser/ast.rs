//! Syntax types for template sources

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// A single `@key: value` line from the metadata header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaEntry {
    pub key: String,
    pub value: String,
}

impl MetaEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Split a comma-separated value into trimmed, non-empty items
    pub fn list(&self) -> Vec<String> {
        self.value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// One piece of a template body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied to the output unchanged
    Literal(String),
    /// A `{{NAME}}` marker; `span` covers the whole marker in the source
    Placeholder { name: String, span: Span },
}

/// Ordered literal text and placeholder references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    pub segments: Vec<Segment>,
}

impl Body {
    /// Append literal text, merging with a preceding literal
    pub fn push_literal(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Literal(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Literal(text.to_string()));
        }
    }

    pub fn push_placeholder(&mut self, name: impl Into<String>, span: Span) {
        self.segments.push(Segment::Placeholder {
            name: name.into(),
            span,
        });
    }

    /// Every placeholder reference in order of appearance, repeats included
    pub fn references(&self) -> impl Iterator<Item = (&str, &Span)> {
        self.segments.iter().filter_map(|seg| match seg {
            Segment::Placeholder { name, span } => Some((name.as_str(), span)),
            Segment::Literal(_) => None,
        })
    }

    /// Distinct placeholder names referenced by the body
    pub fn placeholder_names(&self) -> std::collections::BTreeSet<&str> {
        self.references().map(|(name, _)| name).collect()
    }

    /// Total length of the literal text
    pub fn literal_len(&self) -> usize {
        self.segments
            .iter()
            .map(|seg| match seg {
                Segment::Literal(text) => text.len(),
                Segment::Placeholder { .. } => 0,
            })
            .sum()
    }
}

/// A parsed template file: raw header entries plus the body
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSource {
    pub entries: Vec<Spanned<MetaEntry>>,
    pub body: Body,
    /// Byte offset where the body starts in the source text
    pub body_offset: usize,
}
