//! Template store and substitution engine
//!
//! Templates are boilerplate source files whose header declares metadata and
//! whose body contains `{{NAME}}` placeholder markers. The store loads them
//! once, checks that declared and referenced placeholders agree, and renders
//! them with caller-supplied values.
//!
//! # Example
//!
//! ```text
//! // TEMPLATE_META:START
//! /*
//! @template-id: go-gin-main
//! @version: 1.0.0
//! @description: Gin Server with Graceful Shutdown and CORS
//! @customization-points: PORT
//! */
//! // TEMPLATE_META:END
//!
//! srv := &http.Server{Addr: ":{{PORT}}"}
//! ```

pub mod builtin;
mod metadata;
mod registry;
mod resolver;

pub use metadata::{TemplateMetadata, Version};
pub use registry::{Template, TemplateError, TemplateFilter, TemplateStore};
pub use resolver::{render_template, ValuePolicy, Values};
