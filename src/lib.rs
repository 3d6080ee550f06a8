//! Stencil - boilerplate templates with typed metadata and placeholder substitution
//!
//! This library parses template source files, checks their declared
//! placeholders against the body, and renders them with caller-supplied values.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use stencil::TemplateStore;
//!
//! let store = TemplateStore::new().with_builtin().unwrap();
//! let values = HashMap::from([("PORT".to_string(), "8080".to_string())]);
//! let main_go = store.render("go-gin-main", &values).unwrap();
//! assert!(main_go.contains(r#"Addr:    ":8080","#));
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod parser;
pub mod template;

pub use config::{ConfigError, StoreConfig};
pub use error::SourceError;
pub use parser::{parse, TemplateSource};
pub use template::{
    Template, TemplateError, TemplateFilter, TemplateMetadata, TemplateStore, ValuePolicy, Values,
    Version,
};

/// Parse template source text and render it in strict mode
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use stencil::render_source;
///
/// let source = "// TEMPLATE_META:START
/// /*
/// @template-id: users-table
/// @version: 1.0.0
/// @description: table name
/// @customization-points: TABLE_PREFIX
/// */
/// // TEMPLATE_META:END
/// return \"{{TABLE_PREFIX}}users\"";
///
/// let values = HashMap::from([("TABLE_PREFIX".to_string(), "app_".to_string())]);
/// assert_eq!(render_source(source, &values).unwrap(), "return \"app_users\"");
/// ```
pub fn render_source(text: &str, values: &Values) -> Result<String, TemplateError> {
    let template = Template::parse(text).map_err(|errors| TemplateError::Invalid {
        origin: "<inline>".to_string(),
        text: text.to_string(),
        errors,
    })?;
    template.render(values, ValuePolicy::Strict)
}
