//! Strict template substitution
//!
//! A deliberately small engine: `{{name}}` placeholders are replaced from
//! a parameter map, and any placeholder without a parameter is a fatal
//! error naming the variable. There is no defaulting and no partial
//! output: the renderers in this crate are all-or-nothing.

use crate::error::BootConfigError;
use std::collections::BTreeMap;

/// Substitute `{{name}}` placeholders in `template` from `params`.
///
/// Returns `MissingParameter` for the first placeholder that has no
/// corresponding entry, and `Template` if a placeholder is never closed.
pub fn substitute(
    template: &str,
    params: &BTreeMap<&str, String>,
) -> Result<String, BootConfigError> {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let end = after_open
            .find("}}")
            .ok_or_else(|| BootConfigError::Template("unclosed placeholder".to_string()))?;
        let name = after_open[..end].trim();
        let value = params
            .get(name)
            .ok_or_else(|| BootConfigError::MissingParameter {
                name: name.to_string(),
            })?;
        output.push_str(value);
        rest = &after_open[end + 2..];
    }
    output.push_str(rest);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(entries: &[(&'static str, &str)]) -> BTreeMap<&'static str, String> {
        entries
            .iter()
            .map(|(k, v)| (*k, (*v).to_string()))
            .collect()
    }

    #[test]
    fn substitutes_all_placeholders() {
        let rendered = substitute(
            "hello {{name}}, you are {{mood}}",
            &params(&[("name", "world"), ("mood", "fine")]),
        )
        .unwrap();
        assert_eq!(rendered, "hello world, you are fine");
    }

    #[test]
    fn repeated_placeholders_are_all_replaced() {
        let rendered = substitute("{{x}} and {{x}}", &params(&[("x", "y")])).unwrap();
        assert_eq!(rendered, "y and y");
    }

    #[test]
    fn missing_parameter_names_the_variable() {
        let err = substitute("{{present}} {{absent}}", &params(&[("present", "ok")])).unwrap_err();
        match err {
            BootConfigError::MissingParameter { name } => assert_eq!(name, "absent"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unclosed_placeholder_is_rejected() {
        let err = substitute("{{open", &params(&[])).unwrap_err();
        assert!(matches!(err, BootConfigError::Template(_)));
    }

    #[test]
    fn template_without_placeholders_passes_through() {
        let rendered = substitute("plain text", &params(&[])).unwrap();
        assert_eq!(rendered, "plain text");
    }
}
