//! Lexers for template sources using logos
//!
//! Two token sets are used: [`HeaderToken`] for the metadata block at the top
//! of a template file, and [`BodyToken`] for the text after it.

use logos::Logos;

use super::ast::{MetaEntry, Span};

/// Marker text closing the metadata header
pub const META_END_MARKER: &str = "TEMPLATE_META:END";

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum HeaderToken {
    #[regex(r"//[ \t]*TEMPLATE_META:START")]
    MetaStart,
    #[regex(r"//[ \t]*TEMPLATE_META:END")]
    MetaEnd,

    #[token("/*")]
    CommentOpen,
    #[token("*/")]
    CommentClose,

    /// `@key: value` up to the end of the line
    #[regex(r"@[A-Za-z][A-Za-z0-9_-]*:[^\n]*", |lex| split_entry(lex.slice()))]
    Entry(MetaEntry),
}

fn split_entry(line: &str) -> MetaEntry {
    let line = line.trim_start_matches('@');
    let (key, value) = line.split_once(':').unwrap_or((line, ""));
    MetaEntry::new(key.trim(), value.trim())
}

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum BodyToken {
    /// `{{NAME}}`, spaces or tabs allowed inside the braces
    #[regex(r"\{\{[ \t]*[A-Za-z_][A-Za-z0-9_]*[ \t]*\}\}", |lex| marker_name(lex.slice()))]
    Placeholder(String),

    #[token("{")]
    Brace,

    #[regex(r"[^{]+")]
    Text,
}

fn marker_name(marker: &str) -> String {
    marker
        .trim_start_matches('{')
        .trim_end_matches('}')
        .trim_matches(|c| c == ' ' || c == '\t')
        .to_string()
}

/// Lex a metadata header; unrecognized input is reported as `Err(span)`
pub fn lex_header(input: &str) -> impl Iterator<Item = Result<(HeaderToken, Span), Span>> + '_ {
    HeaderToken::lexer(input)
        .spanned()
        .map(|(tok, span)| match tok {
            Ok(t) => Ok((t, span)),
            Err(_) => Err(span),
        })
}

/// Lex body text into tokens with spans
///
/// logos does not backtrack, so a run such as `{{{NAME}}}` fails as a
/// whole. When a token starting with `{` fails, that one brace is emitted
/// as [`BodyToken::Brace`] and lexing resumes at the next byte.
pub fn lex_body(input: &str) -> impl Iterator<Item = (BodyToken, Span)> + '_ {
    let mut pos = 0;
    std::iter::from_fn(move || {
        let rest = &input[pos..];
        let mut lexer = BodyToken::lexer(rest);
        let token = lexer.next()?;
        let span = lexer.span();
        let start = pos;
        match token {
            Ok(tok) => {
                pos += span.end;
                Some((tok, start + span.start..start + span.end))
            }
            Err(_) if rest[span.start..].starts_with('{') => {
                pos += span.start + 1;
                Some((BodyToken::Brace, start + span.start..pos))
            }
            Err(_) => {
                pos += span.end.max(span.start + 1);
                Some((BodyToken::Text, start + span.start..pos))
            }
        }
    })
}

/// Check whether a string is a valid placeholder name
pub fn is_placeholder_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_tokens(input: &str) -> Vec<HeaderToken> {
        lex_header(input).filter_map(|r| r.ok()).map(|(t, _)| t).collect()
    }

    fn body_tokens(input: &str) -> Vec<BodyToken> {
        lex_body(input).map(|(t, _)| t).collect()
    }

    #[test]
    fn test_header_markers() {
        let tokens = header_tokens("// TEMPLATE_META:START\n/*\n*/\n// TEMPLATE_META:END");
        assert_eq!(
            tokens,
            vec![
                HeaderToken::MetaStart,
                HeaderToken::CommentOpen,
                HeaderToken::CommentClose,
                HeaderToken::MetaEnd
            ]
        );
    }

    #[test]
    fn test_header_entry() {
        let tokens = header_tokens("@template-id: go-gin-main\n@customization-points: PORT");
        assert_eq!(
            tokens,
            vec![
                HeaderToken::Entry(MetaEntry::new("template-id", "go-gin-main")),
                HeaderToken::Entry(MetaEntry::new("customization-points", "PORT")),
            ]
        );
    }

    #[test]
    fn test_header_entry_value_keeps_colons() {
        let tokens = header_tokens("@description: Gin: server setup\r\n");
        assert_eq!(
            tokens,
            vec![HeaderToken::Entry(MetaEntry::new("description", "Gin: server setup"))]
        );
    }

    #[test]
    fn test_header_unrecognized_text() {
        let results: Vec<_> = lex_header("/* stray */").collect();
        assert!(results.iter().any(|r| r.is_err()));
    }

    #[test]
    fn test_body_placeholder() {
        let tokens = body_tokens(r#"Addr: ":{{PORT}}","#);
        assert_eq!(
            tokens,
            vec![
                BodyToken::Text,
                BodyToken::Placeholder("PORT".to_string()),
                BodyToken::Text
            ]
        );
    }

    #[test]
    fn test_body_placeholder_with_spaces() {
        let tokens = body_tokens("{{ METHOD_NAME }}Service");
        assert_eq!(
            tokens,
            vec![BodyToken::Placeholder("METHOD_NAME".to_string()), BodyToken::Text]
        );
    }

    #[test]
    fn test_body_jsx_object_is_literal() {
        let tokens = body_tokens("animate={{ rotate: 360 }}");
        assert!(!tokens.iter().any(|t| matches!(t, BodyToken::Placeholder(_))));
    }

    #[test]
    fn test_body_single_braces() {
        let tokens = body_tokens(r#"gin.H{"status": "ok"}"#);
        assert_eq!(tokens, vec![BodyToken::Text, BodyToken::Brace, BodyToken::Text]);
    }

    #[test]
    fn test_body_placeholder_after_brace() {
        let tokens: Vec<_> = lex_body("{{{A}}}").collect();
        assert_eq!(
            tokens,
            vec![
                (BodyToken::Brace, 0..1),
                (BodyToken::Placeholder("A".to_string()), 1..6),
                (BodyToken::Text, 6..7),
            ]
        );
    }

    #[test]
    fn test_body_placeholder_after_text_and_brace() {
        assert_eq!(
            body_tokens("x{{{A}}}"),
            vec![
                BodyToken::Text,
                BodyToken::Brace,
                BodyToken::Placeholder("A".to_string()),
                BodyToken::Text
            ]
        );
        assert_eq!(
            body_tokens("`${{{A}}}`"),
            vec![
                BodyToken::Text,
                BodyToken::Brace,
                BodyToken::Placeholder("A".to_string()),
                BodyToken::Text
            ]
        );
    }

    #[test]
    fn test_body_placeholder_at_end() {
        let tokens: Vec<_> = lex_body("port {{PORT}}").collect();
        assert_eq!(
            tokens,
            vec![
                (BodyToken::Text, 0..5),
                (BodyToken::Placeholder("PORT".to_string()), 5..13),
            ]
        );
    }

    #[test]
    fn test_body_empty() {
        assert_eq!(body_tokens(""), vec![]);
    }

    #[test]
    fn test_body_spans_cover_input() {
        let input = "a{{ rotate: 360 }}{{{B}}}{ {{C}}}{";
        let mut next = 0;
        for (_, span) in lex_body(input) {
            assert_eq!(span.start, next);
            next = span.end;
        }
        assert_eq!(next, input.len());
    }

    #[test]
    fn test_placeholder_name_check() {
        assert!(is_placeholder_name("TABLE_PREFIX"));
        assert!(is_placeholder_name("_x1"));
        assert!(!is_placeholder_name("1X"));
        assert!(!is_placeholder_name("APP-TITLE"));
        assert!(!is_placeholder_name(""));
    }
}
