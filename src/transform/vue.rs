use super::{Transform, compile, js_object, js_string, replace_once, rewrite_imports};
use crate::{
    config::{ModuleFormat, Platform},
    error::Result,
    icon::escape_leading_digit,
    svg::{SvgElement, SvgNode},
    template::{TemplateEngine, VUE_COMPONENT, VUE_TYPES},
};
use serde::Serialize;

const CREATE_ELEMENT_VNODE: &str = "createElementVNode";
const CREATE_TEXT_VNODE: &str = "createTextVNode";
const OPEN_BLOCK: &str = "openBlock";
const CREATE_ELEMENT_BLOCK: &str = "createElementBlock";

/// Emits Vue render functions in the shape of the Vue template compiler's
/// module output.
#[derive(Debug, Clone, Copy, Default)]
pub struct VueTransform;

#[derive(Serialize)]
struct ComponentContext<'a> {
    helpers: &'a [&'static str],
    vnode: &'a str,
}

#[derive(Serialize)]
struct TypesContext<'a> {
    name: &'a str,
}

impl Transform for VueTransform {
    fn platform(&self) -> Platform {
        Platform::Vue
    }

    fn transform(&self, svg: &str, component_name: &str, format: ModuleFormat) -> Result<String> {
        let name = escape_leading_digit(component_name);
        let root = compile(svg, &name)?;

        let mut helpers = Vec::with_capacity(4);
        if has_nested_elements(&root) {
            helpers.push(CREATE_ELEMENT_VNODE);
        }
        if has_mixed_text(&root) {
            helpers.push(CREATE_TEXT_VNODE);
        }
        helpers.extend([OPEN_BLOCK, CREATE_ELEMENT_BLOCK]);

        let mut vnode = String::from("(_openBlock(), _createElementBlock(");
        write_call_args(&root, 1, &mut vnode);
        vnode.push_str("))");

        let code = TemplateEngine::shared()?.render(
            VUE_COMPONENT,
            &ComponentContext {
                helpers: &helpers,
                vnode: &vnode,
            },
        )?;

        match format {
            ModuleFormat::Esm => replace_once(&code, "export function", "export default function", &name),
            ModuleFormat::Cjs => {
                let code = rewrite_imports(&code)?;
                replace_once(
                    &code,
                    "export function render",
                    "module.exports = function render",
                    &name,
                )
            }
        }
    }

    fn type_declaration(&self, component_name: &str) -> Result<Option<String>> {
        let name = escape_leading_digit(component_name);
        TemplateEngine::shared()?
            .render(VUE_TYPES, &TypesContext { name: &name })
            .map(Some)
    }
}

/// Writes `"tag", props[, children]` for a vnode factory call.
fn write_call_args(element: &SvgElement, depth: usize, out: &mut String) {
    out.push_str(&js_string(&element.name));
    out.push_str(", ");
    out.push_str(&js_object(
        element
            .attributes
            .iter()
            .map(|(key, value)| (key.as_str(), js_string(value))),
    ));

    if element.children.is_empty() {
        return;
    }

    // Text-only children collapse into a single string argument.
    if element.elements().next().is_none() {
        let text: String = element
            .children
            .iter()
            .filter_map(|child| match child {
                SvgNode::Text(text) => Some(text.as_str()),
                SvgNode::Element(_) => None,
            })
            .collect();
        out.push_str(", ");
        out.push_str(&js_string(&text));
        return;
    }

    let indent = "  ".repeat(depth + 1);
    out.push_str(", [");
    for (i, child) in element.children.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('\n');
        out.push_str(&indent);
        match child {
            SvgNode::Element(child) => {
                out.push_str("_createElementVNode(");
                write_call_args(child, depth + 1, out);
                out.push(')');
            }
            SvgNode::Text(text) => {
                out.push_str("_createTextVNode(");
                out.push_str(&js_string(text));
                out.push(')');
            }
        }
    }
    out.push('\n');
    out.push_str(&"  ".repeat(depth));
    out.push(']');
}

fn has_nested_elements(root: &SvgElement) -> bool {
    root.elements().next().is_some()
}

/// True when some element mixes text with element children.
fn has_mixed_text(element: &SvgElement) -> bool {
    let has_text = element
        .children
        .iter()
        .any(|child| matches!(child, SvgNode::Text(_)));
    let has_elements = element.elements().next().is_some();

    (has_text && has_elements) || element.elements().any(has_mixed_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMILE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path fill-rule="evenodd" d="M12 22a10 10 0 1 1 0-20"/></svg>"#;

    #[test]
    fn test_esm_output() {
        let code = VueTransform
            .transform(SMILE, "SmileIcon", ModuleFormat::Esm)
            .unwrap();

        assert!(code.starts_with(
            "import { createElementVNode as _createElementVNode, openBlock as _openBlock, createElementBlock as _createElementBlock } from \"vue\""
        ));
        assert!(code.contains("export default function render(_ctx, _cache) {"));
        assert!(code.contains(
            "return (_openBlock(), _createElementBlock(\"svg\", { xmlns: \"http://www.w3.org/2000/svg\", viewBox: \"0 0 24 24\" }, [\n    _createElementVNode(\"path\", { \"fill-rule\": \"evenodd\", d: \"M12 22a10 10 0 1 1 0-20\" })\n  ]))"
        ));
    }

    #[test]
    fn test_cjs_output() {
        let code = VueTransform
            .transform(SMILE, "SmileIcon", ModuleFormat::Cjs)
            .unwrap();

        assert!(code.starts_with(
            "const { createElementVNode: _createElementVNode, openBlock: _openBlock, createElementBlock: _createElementBlock } = require(\"vue\")"
        ));
        assert!(code.contains("module.exports = function render(_ctx, _cache) {"));
        assert!(!code.contains("import "));
        assert!(!code.contains("export "));
    }

    #[test]
    fn test_empty_svg_uses_block_helpers_only() {
        let code = VueTransform
            .transform("<svg viewBox=\"0 0 24 24\"/>", "BlankIcon", ModuleFormat::Esm)
            .unwrap();

        assert!(code.starts_with(
            "import { openBlock as _openBlock, createElementBlock as _createElementBlock } from \"vue\""
        ));
        assert!(code.contains("_createElementBlock(\"svg\", { viewBox: \"0 0 24 24\" }))"));
    }

    #[test]
    fn test_text_only_children_collapse() {
        let code = VueTransform
            .transform("<svg><title>Smile</title></svg>", "SmileIcon", ModuleFormat::Esm)
            .unwrap();

        assert!(code.contains("_createElementVNode(\"title\", null, \"Smile\")"));
        assert!(!code.contains("createTextVNode"));
    }

    #[test]
    fn test_mixed_text_requests_text_helper() {
        let code = VueTransform
            .transform("<svg><text>a<tspan>b</tspan></text></svg>", "TextIcon", ModuleFormat::Esm)
            .unwrap();

        assert!(code.contains("createTextVNode as _createTextVNode"));
        assert!(code.contains("_createTextVNode(\"a\")"));
    }

    #[test]
    fn test_type_declaration_escapes_digit() {
        let types = VueTransform.type_declaration("24HoursIcon").unwrap().unwrap();
        assert!(types.contains("declare const _24HoursIcon: FunctionalComponent<HTMLAttributes & VNodeProps>;"));
    }
}
