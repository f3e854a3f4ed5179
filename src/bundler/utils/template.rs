//! Handlebars rendering for generated text files.
//!
//! Generated files are plain text (shell scripts, desktop entries), so HTML
//! escaping is disabled and strict mode turns a missing variable into an error.

use crate::bundler::error::Result;
use handlebars::Handlebars;
use serde::Serialize;

/// Renders `template` with `data`.
pub fn render<T: Serialize>(template: &str, data: &T) -> Result<String> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(handlebars::no_escape);
    Ok(registry.render_template(template, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn does_not_html_escape() {
        let out = render("exec {{cmd}}", &json!({ "cmd": "\"$APPDIR\" <&>" })).unwrap();
        assert_eq!(out, "exec \"$APPDIR\" <&>");
    }

    #[test]
    fn missing_variable_is_an_error() {
        assert!(render("Name={{name}}", &json!({})).is_err());
    }
}
