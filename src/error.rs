//! Error types for parsing and validating template sources

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::ast::Span;
use crate::parser::lexer::HeaderToken;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("missing `// TEMPLATE_META:START` header")]
    MissingHeader,

    #[error("metadata header is never closed with `// TEMPLATE_META:END`")]
    UnterminatedHeader { span: Span },

    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },

    #[error("missing required metadata field `@{field}`")]
    MissingField { field: &'static str },

    #[error("duplicate metadata field `@{field}`")]
    DuplicateField { field: String, span: Span },

    #[error("metadata field `@{field}` is empty")]
    EmptyField { field: String, span: Span },

    #[error("invalid version `{version}`, expected MAJOR.MINOR.PATCH")]
    InvalidVersion { version: String, span: Span },

    #[error("invalid placeholder name `{name}`")]
    InvalidPlaceholderName { name: String, span: Span },

    #[error("placeholder `{name}` is used in the body but not declared")]
    UndeclaredPlaceholder { name: String, span: Span },

    #[error("placeholder `{name}` is declared but never used")]
    UnusedPlaceholder { name: String, span: Span },
}

impl SourceError {
    /// Location of the error in the source text
    pub fn span(&self) -> Span {
        match self {
            SourceError::MissingHeader | SourceError::MissingField { .. } => 0..0,
            SourceError::UnterminatedHeader { span }
            | SourceError::Syntax { span, .. }
            | SourceError::DuplicateField { span, .. }
            | SourceError::EmptyField { span, .. }
            | SourceError::InvalidVersion { span, .. }
            | SourceError::InvalidPlaceholderName { span, .. }
            | SourceError::UndeclaredPlaceholder { span, .. }
            | SourceError::UnusedPlaceholder { span, .. } => span.clone(),
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let span = self.span();
        let label = match self {
            SourceError::Syntax {
                message, expected, ..
            } if !expected.is_empty() => {
                format!("{}\nExpected: {}", message, expected.join(", "))
            }
            SourceError::Syntax { message, .. } => message.clone(),
            other => other.to_string(),
        };
        let message = match self {
            SourceError::Syntax { message, .. } => message.clone(),
            other => other.to_string(),
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(message)
            .with_label(
                Label::new((filename, span))
                    .with_message(label)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);
        if written.is_err() {
            return self.to_string();
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl<'a> From<chumsky::error::Rich<'a, HeaderToken>> for SourceError {
    fn from(err: chumsky::error::Rich<'a, HeaderToken>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of input".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of input".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        SourceError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &HeaderToken) -> String {
    match tok {
        HeaderToken::MetaStart => "'// TEMPLATE_META:START'".to_string(),
        HeaderToken::MetaEnd => "'// TEMPLATE_META:END'".to_string(),
        HeaderToken::CommentOpen => "'/*'".to_string(),
        HeaderToken::CommentClose => "'*/'".to_string(),
        HeaderToken::Entry(entry) => format!("metadata entry '@{}'", entry.key),
    }
}
