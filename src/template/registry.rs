//! Template store for loading, looking up and rendering templates

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::StoreConfig;
use crate::error::SourceError;
use crate::parser::ast::{Body, TemplateSource};

use super::metadata::TemplateMetadata;
use super::resolver::{render_template, ValuePolicy, Values};

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template with this id in the store
    #[error("unknown template: {id}")]
    UnknownTemplate { id: String },

    /// Two templates share an id
    #[error("duplicate template id: {id}")]
    Duplicate { id: String },

    /// The values omit declared placeholders
    #[error("template {template} is missing values for: {}", .names.join(", "))]
    MissingPlaceholder { template: String, names: Vec<String> },

    /// The values name placeholders the template does not declare
    #[error("template {template} does not declare: {}", .names.join(", "))]
    UnexpectedPlaceholder { template: String, names: Vec<String> },

    /// Error reading a template file or directory
    #[error("error reading template file {}: {message}", .path.display())]
    FileReadError { path: PathBuf, message: String },

    /// The template source failed to parse or validate
    #[error("invalid template {origin}: {}", format_source_errors(.errors))]
    Invalid {
        origin: String,
        text: String,
        errors: Vec<SourceError>,
    },
}

fn format_source_errors(errors: &[SourceError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl TemplateError {
    /// Human-readable report; source errors are shown against their text
    pub fn report(&self) -> String {
        match self {
            TemplateError::Invalid {
                origin,
                text,
                errors,
            } => errors
                .iter()
                .map(|e| e.format(text, origin))
                .collect::<Vec<_>>()
                .join("\n"),
            other => other.to_string(),
        }
    }
}

/// A validated template: typed metadata plus body
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub metadata: TemplateMetadata,
    pub body: Body,
    /// File the template was loaded from, if any
    pub origin: Option<PathBuf>,
}

impl Template {
    /// Parse and validate template source text
    pub fn parse(text: &str) -> Result<Self, Vec<SourceError>> {
        Self::from_source(crate::parser::parse(text)?)
    }

    /// Validate a parsed source
    ///
    /// Every placeholder referenced in the body must be declared and every
    /// declared placeholder must be referenced.
    pub fn from_source(source: TemplateSource) -> Result<Self, Vec<SourceError>> {
        let (metadata, declaration_span) = TemplateMetadata::from_entries(&source.entries)?;

        let mut errors = Vec::new();
        let mut reported = BTreeSet::new();
        for (name, span) in source.body.references() {
            if !metadata.placeholders.contains(name) && reported.insert(name) {
                errors.push(SourceError::UndeclaredPlaceholder {
                    name: name.to_string(),
                    span: span.clone(),
                });
            }
        }

        let referenced = source.body.placeholder_names();
        for name in &metadata.placeholders {
            if !referenced.contains(name.as_str()) {
                errors.push(SourceError::UnusedPlaceholder {
                    name: name.clone(),
                    span: declaration_span.clone(),
                });
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            metadata,
            body: source.body,
            origin: None,
        })
    }

    /// Parse and validate source text, keeping the text for error reports
    pub fn from_text(text: &str, origin: Option<&Path>) -> Result<Self, TemplateError> {
        let template = Self::parse(text).map_err(|errors| TemplateError::Invalid {
            origin: origin
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<inline>".to_string()),
            text: text.to_string(),
            errors,
        })?;
        Ok(match origin {
            Some(path) => template.with_origin(path),
            None => template,
        })
    }

    /// Read and validate one template file without registering it
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let text = std::fs::read_to_string(path).map_err(|e| TemplateError::FileReadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_text(&text, Some(path))
    }

    pub fn with_origin(mut self, origin: impl Into<PathBuf>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    /// Substitute placeholders with `values`
    pub fn render(&self, values: &Values, policy: ValuePolicy) -> Result<String, TemplateError> {
        render_template(self, values, policy)
    }
}

/// Selects templates by language and framework tags
///
/// Tags compare ASCII case-insensitively; an unset criterion matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFilter {
    pub language: Option<String>,
    pub framework: Option<String>,
}

impl TemplateFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = Some(framework.into());
        self
    }

    pub fn matches(&self, template: &Template) -> bool {
        fn tag_matches(wanted: &Option<String>, actual: &Option<String>) -> bool {
            match (wanted, actual) {
                (None, _) => true,
                (Some(w), Some(a)) => w.eq_ignore_ascii_case(a),
                (Some(_), None) => false,
            }
        }
        tag_matches(&self.language, &template.metadata.language)
            && tag_matches(&self.framework, &template.metadata.framework)
    }
}

/// Collection of templates keyed by id
///
/// Populated once at start-up; rendering only needs `&self`.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: BTreeMap<String, Template>,
    policy: ValuePolicy,
}

impl TemplateStore {
    /// Create a new empty store with the strict value policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store as described by a configuration
    pub fn from_config(config: &StoreConfig) -> Result<Self, TemplateError> {
        let mut store = Self::new().with_policy(config.policy);
        if config.builtin {
            super::builtin::register_builtin(&mut store)?;
        }
        for dir in &config.directories {
            store.load_dir(dir, &config.extensions)?;
        }
        tracing::info!(templates = store.len(), "template store ready");
        Ok(store)
    }

    /// Add the templates compiled into the crate
    pub fn with_builtin(mut self) -> Result<Self, TemplateError> {
        super::builtin::register_builtin(&mut self)?;
        Ok(self)
    }

    /// Set the policy used by [`TemplateStore::render`]
    pub fn with_policy(mut self, policy: ValuePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ValuePolicy {
        self.policy
    }

    /// Register a template, rejecting duplicate ids
    pub fn register(&mut self, template: Template) -> Result<(), TemplateError> {
        let id = template.id().to_string();
        if self.templates.contains_key(&id) {
            return Err(TemplateError::Duplicate { id });
        }
        tracing::debug!(
            id = %id,
            version = %template.metadata.version,
            origin = ?template.origin,
            "registered template"
        );
        self.templates.insert(id, template);
        Ok(())
    }

    /// Parse, validate and register template source text; returns its id
    pub fn load_source(&mut self, text: &str, origin: Option<&Path>) -> Result<String, TemplateError> {
        let template = Template::from_text(text, origin)?;
        let id = template.id().to_string();
        self.register(template)?;
        Ok(id)
    }

    /// Load one template file; returns its id
    pub fn load_file(&mut self, path: &Path) -> Result<String, TemplateError> {
        let template = Template::from_file(path)?;
        let id = template.id().to_string();
        self.register(template)?;
        Ok(id)
    }

    /// Load every template file under `dir`, recursively and in path order
    ///
    /// With a non-empty `extensions` list only files with one of those
    /// extensions are read. Returns the number of templates loaded.
    pub fn load_dir(&mut self, dir: &Path, extensions: &[String]) -> Result<usize, TemplateError> {
        let mut files = Vec::new();
        collect_files(dir, &mut files)?;
        files.sort();

        let mut loaded = 0;
        for path in files {
            if !has_extension(&path, extensions) {
                tracing::debug!(path = %path.display(), "skipping file with unlisted extension");
                continue;
            }
            self.load_file(&path)?;
            loaded += 1;
        }
        tracing::debug!(dir = %dir.display(), loaded, "loaded template directory");
        Ok(loaded)
    }

    /// Get a template by id
    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    /// All template ids in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Templates matching a filter, in id order
    pub fn find<'a>(&'a self, filter: &'a TemplateFilter) -> impl Iterator<Item = &'a Template> + 'a {
        self.iter().filter(move |t| filter.matches(t))
    }

    /// Render a template with the store's value policy
    pub fn render(&self, id: &str, values: &Values) -> Result<String, TemplateError> {
        self.render_with(id, values, self.policy)
    }

    /// Render a template with an explicit value policy
    pub fn render_with(
        &self,
        id: &str,
        values: &Values,
        policy: ValuePolicy,
    ) -> Result<String, TemplateError> {
        let template = self.get(id).ok_or_else(|| TemplateError::UnknownTemplate {
            id: id.to_string(),
        })?;
        template.render(values, policy)
    }
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), TemplateError> {
    let read_error = |e: std::io::Error| TemplateError::FileReadError {
        path: dir.to_path_buf(),
        message: e.to_string(),
    };
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            extensions
                .iter()
                .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
}
