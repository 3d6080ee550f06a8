//! Template source parser using chumsky for the metadata header

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::SourceError;
use crate::parser::ast::*;
use crate::parser::lexer::{lex_body, lex_header, BodyToken, HeaderToken, META_END_MARKER};

/// Parse template source text into header entries and a body
///
/// The header must open the file (leading whitespace allowed) and is closed
/// by the `// TEMPLATE_META:END` line. One line terminator after that marker
/// belongs to the header; everything after it is body text.
pub fn parse(input: &str) -> Result<TemplateSource, Vec<SourceError>> {
    // A UTF-8 byte order mark is not part of the header; spans stay relative
    // to the full input.
    let header_start = if input.starts_with('\u{feff}') {
        '\u{feff}'.len_utf8()
    } else {
        0
    };
    let text = &input[header_start..];
    if !text.trim_start().starts_with("//") || !text.contains("TEMPLATE_META:START") {
        return Err(vec![SourceError::MissingHeader]);
    }

    let header_end = find_end_marker(input, header_start)
        .ok_or_else(|| vec![SourceError::UnterminatedHeader { span: 0..input.len() }])?;

    let entries = parse_header(input, header_start, header_end)?;

    let rest = &input[header_end..];
    let skipped = if rest.starts_with("\r\n") {
        2
    } else if rest.starts_with('\n') {
        1
    } else {
        0
    };
    let body_offset = header_end + skipped;

    Ok(TemplateSource {
        entries,
        body: parse_body(&input[body_offset..], body_offset),
        body_offset,
    })
}

/// End of the first `// TEMPLATE_META:END` comment line at or after `from`
///
/// The marker only counts when nothing but `//` and spaces or tabs precede it
/// on its line, so entry values may mention the marker text.
fn find_end_marker(input: &str, from: usize) -> Option<usize> {
    input[from..]
        .match_indices(META_END_MARKER)
        .map(|(i, _)| from + i)
        .find(|&i| {
            let line_start = input[..i].rfind('\n').map_or(from, |n| n + 1).max(from);
            input[line_start..i]
                .trim_matches(|c| c == ' ' || c == '\t')
                .strip_prefix("//")
                .is_some_and(|gap| gap.trim_end_matches(|c| c == ' ' || c == '\t').is_empty())
        })
        .map(|i| i + META_END_MARKER.len())
}

/// Split body text into literal segments and placeholder references
///
/// `offset` is added to every placeholder span so spans point into the
/// enclosing source.
pub fn parse_body(input: &str, offset: usize) -> Body {
    let mut body = Body::default();
    for (tok, span) in lex_body(input) {
        match tok {
            BodyToken::Placeholder(name) => {
                body.push_placeholder(name, span.start + offset..span.end + offset)
            }
            BodyToken::Brace | BodyToken::Text => body.push_literal(&input[span]),
        }
    }
    body
}

fn parse_header(
    input: &str,
    start: usize,
    end: usize,
) -> Result<Vec<Spanned<MetaEntry>>, Vec<SourceError>> {
    let header = &input[start..end];
    let shift = |span: std::ops::Range<usize>| span.start + start..span.end + start;

    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    for result in lex_header(header) {
        match result {
            Ok((tok, span)) => tokens.push((tok, SimpleSpan::from(shift(span)))),
            Err(span) => errors.push(SourceError::Syntax {
                message: format!("Unrecognized header text '{}'", header[span.clone()].trim()),
                span: shift(span),
                expected: vec!["metadata entry '@key: value'".to_string()],
            }),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let token_stream = Stream::from_iter(tokens.into_iter())
        // Split (Token, SimpleSpan) into token and span parts
        .map((end..end).into(), |(t, s): (_, _)| (t, s));

    header_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn header_parser<'a, I>(
) -> impl Parser<'a, I, Vec<Spanned<MetaEntry>>, extra::Err<Rich<'a, HeaderToken>>> + Clone
where
    I: ValueInput<'a, Token = HeaderToken, Span = SimpleSpan>,
{
    let entry = select! {
        HeaderToken::Entry(entry) => entry,
    }
    .map_with(|entry, e| Spanned::new(entry, span_range(&e.span())));

    entry
        .repeated()
        .collect::<Vec<_>>()
        .delimited_by(just(HeaderToken::CommentOpen), just(HeaderToken::CommentClose))
        .delimited_by(just(HeaderToken::MetaStart), just(HeaderToken::MetaEnd))
}
