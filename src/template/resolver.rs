//! Placeholder substitution - turns a template body into output text

use std::collections::HashMap;

use serde::Deserialize;

use crate::parser::ast::Segment;

use super::registry::{Template, TemplateError};

/// Placeholder name to replacement text
pub type Values = HashMap<String, String>;

/// How to treat values that name no declared placeholder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValuePolicy {
    /// Fail with `UnexpectedPlaceholder`
    #[default]
    Strict,
    /// Ignore them
    Lenient,
}

/// Substitute every placeholder in `template` with its value
///
/// Literal text is copied byte-for-byte. All missing names are reported
/// together, sorted; missing values are checked before unexpected ones.
pub fn render_template(
    template: &Template,
    values: &Values,
    policy: ValuePolicy,
) -> Result<String, TemplateError> {
    let meta = &template.metadata;

    let missing: Vec<String> = meta
        .placeholders
        .iter()
        .filter(|name| !values.contains_key(name.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(TemplateError::MissingPlaceholder {
            template: meta.id.clone(),
            names: missing,
        });
    }

    if policy == ValuePolicy::Strict {
        let mut unexpected: Vec<String> = values
            .keys()
            .filter(|name| !meta.placeholders.contains(name.as_str()))
            .cloned()
            .collect();
        if !unexpected.is_empty() {
            unexpected.sort();
            return Err(TemplateError::UnexpectedPlaceholder {
                template: meta.id.clone(),
                names: unexpected,
            });
        }
    }

    let capacity = template.body.literal_len()
        + template
            .body
            .references()
            .map(|(name, _)| values.get(name).map_or(0, String::len))
            .sum::<usize>();
    let mut output = String::with_capacity(capacity);

    for segment in &template.body.segments {
        match segment {
            Segment::Literal(text) => output.push_str(text),
            Segment::Placeholder { name, .. } => match values.get(name) {
                Some(value) => output.push_str(value),
                // Only reachable for a hand-built template whose body and
                // declarations disagree
                None => {
                    return Err(TemplateError::MissingPlaceholder {
                        template: meta.id.clone(),
                        names: vec![name.clone()],
                    })
                }
            },
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn template(text: &str) -> Template {
        Template::parse(text).expect("Should parse template")
    }

    fn values(pairs: &[(&str, &str)]) -> Values {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    const TWO_POINTS: &str = "// TEMPLATE_META:START
/*
@template-id: two
@version: 1.0.0
@description: two placeholders
@customization-points: B, A
*/
// TEMPLATE_META:END
{{A}}-{{ B }}-{{A}}";

    #[test]
    fn test_repeated_placeholder() {
        let out = render_template(
            &template(TWO_POINTS),
            &values(&[("A", "x"), ("B", "y")]),
            ValuePolicy::Strict,
        )
        .unwrap();
        assert_eq!(out, "x-y-x");
    }

    #[test]
    fn test_missing_names_sorted() {
        let err = render_template(&template(TWO_POINTS), &Values::new(), ValuePolicy::Strict)
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::MissingPlaceholder { ref names, .. } if names == &["A", "B"]
        ));
    }

    #[test]
    fn test_missing_before_unexpected() {
        let err = render_template(
            &template(TWO_POINTS),
            &values(&[("A", "x"), ("C", "z")]),
            ValuePolicy::Strict,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::MissingPlaceholder { ref names, .. } if names == &["B"]
        ));
    }

    #[test]
    fn test_strict_rejects_extra_values() {
        let err = render_template(
            &template(TWO_POINTS),
            &values(&[("A", "x"), ("B", "y"), ("Z", "1"), ("C", "2")]),
            ValuePolicy::Strict,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::UnexpectedPlaceholder { ref names, ref template }
                if names == &["C", "Z"] && template == "two"
        ));
    }

    #[test]
    fn test_lenient_ignores_extra_values() {
        let out = render_template(
            &template(TWO_POINTS),
            &values(&[("A", "x"), ("B", "y"), ("Z", "1")]),
            ValuePolicy::Lenient,
        )
        .unwrap();
        assert_eq!(out, "x-y-x");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let out = render_template(
            &template(TWO_POINTS),
            &values(&[("A", "{{B}}"), ("B", "")]),
            ValuePolicy::Strict,
        )
        .unwrap();
        assert_eq!(out, "{{B}}--{{B}}");
    }

    #[test]
    fn test_hand_built_inconsistent_template() {
        let mut tpl = template(TWO_POINTS);
        tpl.metadata.placeholders.remove("B");
        let err = render_template(&tpl, &values(&[("A", "x")]), ValuePolicy::Strict).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::MissingPlaceholder { ref names, .. } if names == &["B"]
        ));
    }
}
