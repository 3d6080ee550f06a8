//! Typed metadata record built from a template's header entries

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::error::SourceError;
use crate::parser::ast::{MetaEntry, Span, Spanned};
use crate::parser::lexer::is_placeholder_name;

pub const KEY_ID: &str = "template-id";
pub const KEY_VERSION: &str = "version";
pub const KEY_DESCRIPTION: &str = "description";
pub const KEY_DEPENDENCIES: &str = "dependencies";
pub const KEY_PLACEHOLDERS: &str = "customization-points";
pub const KEY_LANGUAGE: &str = "language";
pub const KEY_FRAMEWORK: &str = "framework";

/// Semantic version `MAJOR.MINOR.PATCH[-PRE]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<String>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: None,
        }
    }

    /// Parse a version string, returning None if it is malformed
    pub fn parse(text: &str) -> Option<Self> {
        let (core, pre) = match text.split_once('-') {
            Some((core, pre)) if !pre.is_empty() => (core, Some(pre.to_string())),
            Some(_) => return None,
            None => (text, None),
        };

        let mut numbers = core.split('.').map(parse_number);
        let major = numbers.next()??;
        let minor = numbers.next()??;
        let patch = numbers.next()??;
        if numbers.next().is_some() {
            return None;
        }

        Some(Self {
            major,
            minor,
            patch,
            pre,
        })
    }
}

fn parse_number(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

/// Everything a template declares about itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMetadata {
    /// Unique identifier, e.g. `go-gin-main`
    pub id: String,
    pub version: Version,
    pub description: String,
    /// External packages the rendered code imports
    pub dependencies: Vec<String>,
    /// Declared placeholder names
    pub placeholders: BTreeSet<String>,
    /// Source language tag, e.g. `go`
    pub language: Option<String>,
    /// Framework tag, e.g. `Gin`
    pub framework: Option<String>,
    /// Header keys with no dedicated field, kept verbatim
    pub attributes: BTreeMap<String, String>,
}

impl TemplateMetadata {
    /// Build the record from header entries
    ///
    /// On success also returns the span of the placeholder declaration
    /// (empty at offset 0 when the template declares none).
    pub(crate) fn from_entries(
        entries: &[Spanned<MetaEntry>],
    ) -> Result<(Self, Span), Vec<SourceError>> {
        let mut errors = Vec::new();
        let mut seen: HashMap<&str, Span> = HashMap::new();

        let mut id = None;
        let mut version = None;
        let mut description = None;
        let mut dependencies = Vec::new();
        let mut placeholders = BTreeSet::new();
        let mut placeholder_span = 0..0;
        let mut language = None;
        let mut framework = None;
        let mut attributes = BTreeMap::new();

        for entry in entries {
            let key = entry.node.key.as_str();
            let value = entry.node.value.as_str();
            let span = entry.span.clone();

            if seen.insert(key, span.clone()).is_some() {
                errors.push(SourceError::DuplicateField {
                    field: key.to_string(),
                    span,
                });
                continue;
            }

            let must_have_value = matches!(
                key,
                KEY_ID | KEY_VERSION | KEY_DESCRIPTION | KEY_LANGUAGE | KEY_FRAMEWORK
            );
            if must_have_value && value.is_empty() {
                errors.push(SourceError::EmptyField {
                    field: key.to_string(),
                    span,
                });
                continue;
            }

            match key {
                KEY_ID => id = Some(value.to_string()),
                KEY_VERSION => match Version::parse(value) {
                    Some(v) => version = Some(v),
                    None => errors.push(SourceError::InvalidVersion {
                        version: value.to_string(),
                        span,
                    }),
                },
                KEY_DESCRIPTION => description = Some(value.to_string()),
                KEY_DEPENDENCIES => dependencies = entry.node.list(),
                KEY_PLACEHOLDERS => {
                    placeholder_span = span.clone();
                    for name in entry.node.list() {
                        if is_placeholder_name(&name) {
                            placeholders.insert(name);
                        } else {
                            errors.push(SourceError::InvalidPlaceholderName {
                                name,
                                span: span.clone(),
                            });
                        }
                    }
                }
                KEY_LANGUAGE => language = Some(value.to_string()),
                KEY_FRAMEWORK => framework = Some(value.to_string()),
                _ => {
                    attributes.insert(key.to_string(), value.to_string());
                }
            }
        }

        let field_errors = [
            (id.is_none(), KEY_ID),
            (version.is_none(), KEY_VERSION),
            (description.is_none(), KEY_DESCRIPTION),
        ];
        for (missing, field) in field_errors {
            // An invalid or empty value was already reported against its entry
            if missing && !seen.contains_key(field) {
                errors.push(SourceError::MissingField { field });
            }
        }

        match (id, version, description) {
            (Some(id), Some(version), Some(description)) if errors.is_empty() => Ok((
                Self {
                    id,
                    version,
                    description,
                    dependencies,
                    placeholders,
                    language,
                    framework,
                    attributes,
                },
                placeholder_span,
            )),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entries(pairs: &[(&str, &str)]) -> Vec<Spanned<MetaEntry>> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, (k, v))| Spanned::new(MetaEntry::new(*k, *v), i * 10..i * 10 + 5))
            .collect()
    }

    #[test]
    fn test_version_parse() {
        assert_eq!(Version::parse("1.0.0"), Some(Version::new(1, 0, 0)));
        assert_eq!(
            Version::parse("2.1.3-beta.1").map(|v| v.to_string()),
            Some("2.1.3-beta.1".to_string())
        );
        assert_eq!(Version::parse("1.0"), None);
        assert_eq!(Version::parse("1.0.0.0"), None);
        assert_eq!(Version::parse("1.+0.0"), None);
        assert_eq!(Version::parse("1.0.0-"), None);
        assert_eq!(Version::parse("v1.0.0"), None);
    }

    #[test]
    fn test_from_entries_full_record() {
        let (meta, span) = TemplateMetadata::from_entries(&entries(&[
            ("template-id", "go-gin-main"),
            ("version", "1.0.0"),
            ("description", "Gin Server with Graceful Shutdown and CORS"),
            ("dependencies", "github.com/gin-gonic/gin, github.com/gin-contrib/cors"),
            ("customization-points", "PORT"),
            ("language", "go"),
            ("framework", "Gin"),
            ("design-level", "Enterprise"),
        ]))
        .expect("Should build metadata");

        assert_eq!(meta.id, "go-gin-main");
        assert_eq!(meta.version, Version::new(1, 0, 0));
        assert_eq!(
            meta.dependencies,
            vec!["github.com/gin-gonic/gin", "github.com/gin-contrib/cors"]
        );
        assert_eq!(meta.placeholders.iter().collect::<Vec<_>>(), vec!["PORT"]);
        assert_eq!(meta.language.as_deref(), Some("go"));
        assert_eq!(meta.framework.as_deref(), Some("Gin"));
        assert_eq!(meta.attributes.get("design-level").map(String::as_str), Some("Enterprise"));
        assert_eq!(span, 40..45);
    }

    #[test]
    fn test_optional_fields_absent() {
        let (meta, span) = TemplateMetadata::from_entries(&entries(&[
            ("template-id", "error-boundary"),
            ("version", "1.0.0"),
            ("description", "React Error Boundary"),
        ]))
        .expect("Should build metadata");

        assert!(meta.placeholders.is_empty());
        assert!(meta.dependencies.is_empty());
        assert_eq!(meta.language, None);
        assert_eq!(span, 0..0);
    }

    #[test]
    fn test_missing_required_fields() {
        let errors = TemplateMetadata::from_entries(&entries(&[("framework", "Gin")])).unwrap_err();
        assert_eq!(
            errors,
            vec![
                SourceError::MissingField { field: "template-id" },
                SourceError::MissingField { field: "version" },
                SourceError::MissingField { field: "description" },
            ]
        );
    }

    #[test]
    fn test_duplicate_and_invalid_fields() {
        let errors = TemplateMetadata::from_entries(&entries(&[
            ("template-id", "a"),
            ("template-id", "b"),
            ("version", "one"),
            ("description", ""),
            ("customization-points", "PORT, APP-TITLE"),
        ]))
        .unwrap_err();

        assert_eq!(
            errors,
            vec![
                SourceError::DuplicateField {
                    field: "template-id".to_string(),
                    span: 10..15,
                },
                SourceError::InvalidVersion {
                    version: "one".to_string(),
                    span: 20..25,
                },
                SourceError::EmptyField {
                    field: "description".to_string(),
                    span: 30..35,
                },
                SourceError::InvalidPlaceholderName {
                    name: "APP-TITLE".to_string(),
                    span: 40..45,
                },
            ]
        );
    }
}
