//! Templates compiled into the crate

use std::path::Path;

use super::registry::{TemplateError, TemplateStore};

/// (relative path, source text) of every built-in template
pub const BUILTIN_SOURCES: &[(&str, &str)] = &[
    (
        "templates/go/gin/main.go",
        include_str!("../../templates/go/gin/main.go"),
    ),
    (
        "templates/go/gin/models.go",
        include_str!("../../templates/go/gin/models.go"),
    ),
    (
        "templates/python/fastapi/main.py",
        include_str!("../../templates/python/fastapi/main.py"),
    ),
    (
        "templates/python/fastapi/database.py",
        include_str!("../../templates/python/fastapi/database.py"),
    ),
    (
        "templates/python/fastapi/auth_router.py",
        include_str!("../../templates/python/fastapi/auth_router.py"),
    ),
    (
        "templates/typescript/utils/api-client.ts",
        include_str!("../../templates/typescript/utils/api-client.ts"),
    ),
];

/// Register every built-in template; returns how many were added
pub fn register_builtin(store: &mut TemplateStore) -> Result<usize, TemplateError> {
    for (path, text) in BUILTIN_SOURCES {
        store.load_source(text, Some(Path::new(path)))?;
    }
    Ok(BUILTIN_SOURCES.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{ValuePolicy, Values};

    #[test]
    fn test_builtin_sources_are_valid() {
        let mut store = TemplateStore::new();
        let count = register_builtin(&mut store).expect("Built-in templates should load");
        assert_eq!(count, store.len());
        let ids: Vec<_> = store.ids().collect();
        assert_eq!(
            ids,
            vec![
                "api-client",
                "go-gin-main",
                "go-gorm-models",
                "python-auth-router",
                "python-db-config",
                "python-fastapi-app"
            ]
        );
    }

    #[test]
    fn test_builtin_origin_recorded() {
        let store = TemplateStore::new().with_builtin().unwrap();
        let origin = store.get("go-gorm-models").and_then(|t| t.origin.clone());
        assert_eq!(origin.as_deref(), Some(Path::new("templates/go/gin/models.go")));
    }

    #[test]
    fn test_builtin_auth_router_and_api_client() {
        let store = TemplateStore::new().with_builtin().unwrap();

        let auth = store.get("python-auth-router").unwrap();
        assert_eq!(auth.metadata.framework.as_deref(), Some("FastAPI"));
        let values: Values = [("SECRET_KEY".to_string(), "s3cret".to_string())].into();
        let out = auth.render(&values, ValuePolicy::Strict).unwrap();
        assert!(out.contains("SECRET_KEY = \"s3cret\""));

        let client = store.get("api-client").unwrap();
        assert_eq!(client.metadata.language, None);
        let values: Values = [("BASE_URL".to_string(), "http://localhost:8000".to_string())].into();
        let out = client.render(&values, ValuePolicy::Strict).unwrap();
        assert!(out.contains("|| 'http://localhost:8000',"));
    }
}
