//! Platform transforms: SVG markup in, component module source out.
//!
//! Each transform compiles an icon once into its canonical ES module and
//! derives the CommonJS flavour from that same text, so the two formats
//! cannot drift apart.

mod react;
mod vue;

pub use react::ReactTransform;
pub use vue::VueTransform;

use crate::{
    config::{ModuleFormat, Platform},
    error::{Error, Result},
    svg::{self, SvgElement},
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Turns one icon into platform-specific source text.
pub trait Transform: Send + Sync {
    /// Platform this transform targets.
    fn platform(&self) -> Platform;

    /// Compiles `svg` into a component module named `component_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup is malformed or the compiled module
    /// cannot be rewritten into `format`.
    fn transform(&self, svg: &str, component_name: &str, format: ModuleFormat) -> Result<String>;

    /// Type declaration accompanying the module, if the platform has one.
    ///
    /// # Errors
    ///
    /// Returns an error if the declaration template fails to render.
    fn type_declaration(&self, component_name: &str) -> Result<Option<String>>;
}

static REACT: ReactTransform = ReactTransform;
static VUE: VueTransform = VueTransform;

/// Dispatch table from platform to its transform.
#[must_use]
pub fn transform_for(platform: Platform) -> &'static dyn Transform {
    match platform {
        Platform::React => &REACT,
        Platform::Vue => &VUE,
    }
}

static IMPORT_STATEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*import[\s{]").expect("valid import regex"));

static NAMED_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(\s*)import\s*\{\s*([^}]*?)\s*\}\s*from\s*(?:"([^"]*)"|'([^']*)')(\s*;?\s*)$"#)
        .expect("valid named import regex")
});

static IMPORT_ALIAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+as\s+").expect("valid alias regex"));

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid identifier regex"));

/// Rewrites every `import { a as b } from "m"` line to
/// `const { a: b } = require("m")`.
///
/// # Errors
///
/// Returns [`Error::ImportRewrite`] for any import statement that is not a
/// plain named import, rather than emitting a broken module.
pub fn rewrite_imports(code: &str) -> Result<String> {
    let lines: Vec<String> = code
        .split('\n')
        .map(|line| {
            if !IMPORT_STATEMENT.is_match(line) {
                return Ok(line.to_owned());
            }

            let caps = NAMED_IMPORT
                .captures(line)
                .ok_or_else(|| Error::import_rewrite(line.trim()))?;

            let indent = caps.get(1).map_or("", |m| m.as_str());
            let module = caps
                .get(3)
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());
            let tail = caps.get(5).map_or("", |m| m.as_str());
            let bindings = caps[2]
                .split(',')
                .map(str::trim)
                .filter(|binding| !binding.is_empty())
                .map(|binding| IMPORT_ALIAS.replace(binding, ": ").into_owned())
                .collect::<Vec<_>>()
                .join(", ");

            Ok(format!(
                "{indent}const {{ {bindings} }} = require({}){tail}",
                js_string(module)
            ))
        })
        .collect::<Result<_>>()?;

    Ok(lines.join("\n"))
}

/// Replaces the first occurrence of `from`, failing if it is absent.
pub(crate) fn replace_once(code: &str, from: &str, to: &str, component: &str) -> Result<String> {
    if !code.contains(from) {
        return Err(Error::transform(
            component,
            format!("compiled module has no `{from}`"),
        ));
    }
    Ok(code.replacen(from, to, 1))
}

/// Parses icon markup, attributing failures to `component`.
pub(crate) fn compile(svg: &str, component: &str) -> Result<SvgElement> {
    svg::parse(svg).map_err(|message| Error::svg(component, message))
}

/// JavaScript string literal for `s`.
pub(crate) fn js_string(s: &str) -> String {
    Value::String(s.to_owned()).to_string()
}

/// Object-literal key: bare when it is an identifier, quoted otherwise.
pub(crate) fn js_key(key: &str) -> String {
    if IDENTIFIER.is_match(key) {
        key.to_owned()
    } else {
        js_string(key)
    }
}

/// Renders `{ key: value, ... }`, or `null` for no entries.
pub(crate) fn js_object<I, K, V>(entries: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let body: Vec<String> = entries
        .into_iter()
        .map(|(key, value)| format!("{}: {}", js_key(key.as_ref()), value.as_ref()))
        .collect();

    if body.is_empty() {
        "null".to_owned()
    } else {
        format!("{{ {} }}", body.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_table() {
        assert_eq!(transform_for(Platform::React).platform(), Platform::React);
        assert_eq!(transform_for(Platform::Vue).platform(), Platform::Vue);
    }

    #[test]
    fn test_rewrite_aliased_import() {
        let out = rewrite_imports(r#"import { ref as r } from "vue""#).unwrap();
        assert_eq!(out, r#"const { ref: r } = require("vue")"#);
    }

    #[test]
    fn test_rewrite_keeps_plain_bindings_and_semicolon() {
        let out = rewrite_imports("import { h, openBlock as _openBlock } from 'vue';\nlet x = 1").unwrap();
        assert_eq!(
            out,
            "const { h, openBlock: _openBlock } = require(\"vue\");\nlet x = 1"
        );
    }

    #[test]
    fn test_rewrite_leaves_other_lines_alone() {
        let code = "export function render() {}\n";
        assert_eq!(rewrite_imports(code).unwrap(), code);
    }

    #[test]
    fn test_rewrite_rejects_default_import() {
        let err = rewrite_imports("import Vue from \"vue\"").unwrap_err();
        assert!(matches!(err, Error::ImportRewrite { .. }));
    }

    #[test]
    fn test_rewrite_rejects_namespace_import() {
        assert!(rewrite_imports("import * as Vue from 'vue'").is_err());
    }

    #[test]
    fn test_replace_once_requires_pattern() {
        assert_eq!(
            replace_once("export default A; export default B", "export default", "module.exports =", "A").unwrap(),
            "module.exports = A; export default B"
        );
        assert!(replace_once("const A = 1", "export default", "module.exports =", "A").is_err());
    }

    #[test]
    fn test_js_key_quotes_non_identifiers() {
        assert_eq!(js_key("viewBox"), "viewBox");
        assert_eq!(js_key("fill-rule"), "\"fill-rule\"");
        assert_eq!(js_key("$ref"), "$ref");
    }

    #[test]
    fn test_js_object() {
        assert_eq!(js_object(Vec::<(&str, &str)>::new()), "null");
        assert_eq!(js_object([("d", "\"M0 0\"")]), "{ d: \"M0 0\" }");
    }

    #[test]
    fn test_js_string_escapes() {
        assert_eq!(js_string("a\"b"), r#""a\"b""#);
    }
}
