use super::{Transform, compile, js_object, js_string, replace_once};
use crate::{
    config::{ModuleFormat, Platform},
    error::Result,
    icon::escape_leading_digit,
    svg::{SvgElement, SvgNode},
    template::{REACT_COMPONENT, REACT_TYPES, TemplateEngine},
};
use heck::ToLowerCamelCase;
use serde::Serialize;

const ESM_IMPORT: &str = r#"import * as React from "react""#;
const CJS_IMPORT: &str = r#"const React = require("react")"#;

/// Emits `React.forwardRef` function components built from `React.createElement`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReactTransform;

#[derive(Serialize)]
struct ComponentContext<'a> {
    name: &'a str,
    element: &'a str,
}

#[derive(Serialize)]
struct TypesContext<'a> {
    name: &'a str,
}

impl Transform for ReactTransform {
    fn platform(&self) -> Platform {
        Platform::React
    }

    fn transform(&self, svg: &str, component_name: &str, format: ModuleFormat) -> Result<String> {
        let name = escape_leading_digit(component_name);
        let root = compile(svg, &name)?;

        let mut element = String::new();
        write_element(&root, 0, true, &mut element);

        let code = TemplateEngine::shared()?.render(
            REACT_COMPONENT,
            &ComponentContext {
                name: &name,
                element: &element,
            },
        )?;

        match format {
            ModuleFormat::Esm => Ok(code),
            ModuleFormat::Cjs => {
                let code = replace_once(&code, ESM_IMPORT, CJS_IMPORT, &name)?;
                replace_once(&code, "export default", "module.exports =", &name)
            }
        }
    }

    fn type_declaration(&self, component_name: &str) -> Result<Option<String>> {
        let name = escape_leading_digit(component_name);
        TemplateEngine::shared()?
            .render(REACT_TYPES, &TypesContext { name: &name })
            .map(Some)
    }
}

/// Writes a `React.createElement(...)` call for `element` and its subtree.
///
/// The root receives the forwarded ref and spreads caller props over its own
/// attributes.
fn write_element(element: &SvgElement, depth: usize, is_root: bool, out: &mut String) {
    let mut props: Vec<(String, String)> = element
        .attributes
        .iter()
        .map(|(name, value)| {
            let key = prop_name(name);
            let value = if key == "style" {
                style_object(value)
            } else {
                js_string(value)
            };
            (key, value)
        })
        .collect();

    out.push_str("React.createElement(");
    out.push_str(&js_string(&element.name));
    out.push_str(", ");

    if is_root {
        props.push(("ref".to_owned(), "svgRef".to_owned()));
        out.push_str("Object.assign(");
        out.push_str(&js_object(props));
        out.push_str(", props)");
    } else {
        out.push_str(&js_object(props));
    }

    let indent = "  ".repeat(depth + 2);
    for child in &element.children {
        out.push_str(",\n");
        out.push_str(&indent);
        match child {
            SvgNode::Element(child) => write_element(child, depth + 1, false, out),
            SvgNode::Text(text) => out.push_str(&js_string(text)),
        }
    }

    out.push(')');
}

/// Maps an SVG attribute to its React prop name.
fn prop_name(attribute: &str) -> String {
    match attribute {
        "class" => "className".to_owned(),
        "for" => "htmlFor".to_owned(),
        _ if attribute.starts_with("data-") || attribute.starts_with("aria-") => {
            attribute.to_owned()
        }
        _ if attribute.contains(['-', ':']) => attribute.to_lower_camel_case(),
        _ => attribute.to_owned(),
    }
}

/// Converts an inline `style` attribute into a style object literal.
fn style_object(style: &str) -> String {
    let entries = style.split(';').filter_map(|declaration| {
        let (property, value) = declaration.split_once(':')?;
        let property = property.trim();
        let value = value.trim();
        if property.is_empty() {
            return None;
        }
        let property = if property.starts_with("--") {
            property.to_owned()
        } else {
            property.to_lower_camel_case()
        };
        Some((property, js_string(value)))
    });

    let object = js_object(entries);
    if object == "null" {
        "{}".to_owned()
    } else {
        object
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMILE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path d="M12 22a10 10 0 1 1 0-20"/></svg>"#;

    #[test]
    fn test_esm_output() {
        let code = ReactTransform
            .transform(SMILE, "SmileIcon", ModuleFormat::Esm)
            .unwrap();

        assert!(code.starts_with("import * as React from \"react\";"));
        assert!(code.contains("function SmileIcon(props, svgRef) {"));
        assert!(code.contains(
            "React.createElement(\"svg\", Object.assign({ xmlns: \"http://www.w3.org/2000/svg\", viewBox: \"0 0 24 24\", ref: svgRef }, props),\n    React.createElement(\"path\", { d: \"M12 22a10 10 0 1 1 0-20\" }))"
        ));
        assert!(code.contains("const ForwardRef = React.forwardRef(SmileIcon);"));
        assert!(code.contains("export default ForwardRef;"));
    }

    #[test]
    fn test_cjs_is_derived_from_esm() {
        let esm = ReactTransform
            .transform(SMILE, "SmileIcon", ModuleFormat::Esm)
            .unwrap();
        let cjs = ReactTransform
            .transform(SMILE, "SmileIcon", ModuleFormat::Cjs)
            .unwrap();

        assert!(cjs.starts_with("const React = require(\"react\");"));
        assert!(cjs.contains("module.exports = ForwardRef;"));
        assert!(!cjs.contains("import "));
        assert!(!cjs.contains("export default"));
        assert_eq!(
            cjs,
            esm.replacen(ESM_IMPORT, CJS_IMPORT, 1)
                .replacen("export default", "module.exports =", 1)
        );
    }

    #[test]
    fn test_leading_digit_is_escaped() {
        let code = ReactTransform
            .transform(SMILE, "24HoursIcon", ModuleFormat::Esm)
            .unwrap();

        assert!(code.contains("function _24HoursIcon(props, svgRef)"));
        assert!(code.contains("React.forwardRef(_24HoursIcon)"));
    }

    #[test]
    fn test_attribute_names_are_camel_cased() {
        let code = ReactTransform
            .transform(
                r##"<svg class="icon"><path fill-rule="evenodd" xlink:href="#a" aria-hidden="true" style="stroke-width: 2; fill: none"/></svg>"##,
                "AIcon",
                ModuleFormat::Esm,
            )
            .unwrap();

        assert!(code.contains("className: \"icon\""));
        assert!(code.contains("fillRule: \"evenodd\""));
        assert!(code.contains("xlinkHref: \"#a\""));
        assert!(code.contains("\"aria-hidden\": \"true\""));
        assert!(code.contains("style: { strokeWidth: \"2\", fill: \"none\" }"));
    }

    #[test]
    fn test_text_children() {
        let code = ReactTransform
            .transform("<svg><title>Smile</title></svg>", "SmileIcon", ModuleFormat::Esm)
            .unwrap();

        assert!(code.contains("React.createElement(\"title\", null,\n      \"Smile\")"));
    }

    #[test]
    fn test_malformed_svg_fails() {
        let err = ReactTransform
            .transform("<div/>", "BadIcon", ModuleFormat::Esm)
            .unwrap_err();
        assert!(matches!(err, crate::Error::Svg { .. }));
    }

    #[test]
    fn test_type_declaration() {
        let types = ReactTransform.type_declaration("SmileIcon").unwrap().unwrap();
        assert!(types.contains("declare function SmileIcon(props: React.ComponentProps<'svg'>): JSX.Element;"));
    }
}
