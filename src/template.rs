use crate::{
    error::{Error, Result},
    icon::escape_leading_digit,
};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

/// React forward-ref component module.
pub(crate) const REACT_COMPONENT: &str = "react/component.js";
/// React type declaration.
pub(crate) const REACT_TYPES: &str = "react/types.d.ts";
/// Vue render-function module.
pub(crate) const VUE_COMPONENT: &str = "vue/component.js";
/// Vue type declaration.
pub(crate) const VUE_TYPES: &str = "vue/types.d.ts";

static SHARED: Lazy<Result<TemplateEngine>> = Lazy::new(TemplateEngine::new);

/// Tera templates for generated module framing and type declarations.
pub(crate) struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Creates a new template engine with the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns an error if template registration fails.
    pub(crate) fn new() -> Result<Self> {
        let mut tera = Tera::default();

        Self::register_builtin_templates(&mut tera)?;
        Self::register_filters(&mut tera);

        Ok(Self { tera })
    }

    /// Process-wide engine used by the transform dispatch table.
    ///
    /// Templates are compiled into the binary, so they only need parsing once.
    pub(crate) fn shared() -> Result<&'static Self> {
        (*SHARED).as_ref().map_err(Clone::clone)
    }

    fn register_builtin_templates(tera: &mut Tera) -> Result<()> {
        let templates = [
            (REACT_COMPONENT, include_str!("../templates/react/component.js.tera")),
            (REACT_TYPES, include_str!("../templates/react/types.d.ts.tera")),
            (VUE_COMPONENT, include_str!("../templates/vue/component.js.tera")),
            (VUE_TYPES, include_str!("../templates/vue/types.d.ts.tera")),
        ];

        for (name, source) in templates {
            tera.add_raw_template(name, source)
                .map_err(|e| Error::template(name, e))?;
        }

        Ok(())
    }

    fn register_filters(tera: &mut Tera) {
        tera.register_filter("js_ident", Self::js_ident_filter);
    }

    /// Escapes identifiers that would start with a digit.
    fn js_ident_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        value.as_str().map_or_else(
            || Err(tera::Error::msg("js_ident expects a string")),
            |s| Ok(Value::String(escape_leading_digit(s))),
        )
    }

    /// Renders `template` with a serializable context.
    ///
    /// # Errors
    ///
    /// Returns an error if the context cannot be serialized or rendering fails.
    pub(crate) fn render<T: Serialize>(&self, template: &str, context: &T) -> Result<String> {
        let context =
            Context::from_serialize(context).map_err(|e| Error::template(template, e))?;

        self.tera
            .render(template, &context)
            .map_err(|e| Error::template(template, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_templates_register() {
        let engine = TemplateEngine::new().unwrap();
        let names: Vec<_> = engine.tera.get_template_names().collect();
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn test_react_types_render() {
        let engine = TemplateEngine::shared().unwrap();
        let out = engine
            .render(REACT_TYPES, &json!({ "name": "SmileIcon" }))
            .unwrap();

        assert_eq!(
            out.trim_end(),
            "import * as React from 'react';\n\
             declare function SmileIcon(props: React.ComponentProps<'svg'>): JSX.Element;\n\
             export default SmileIcon;"
        );
    }

    #[test]
    fn test_vue_types_escape_identifier() {
        let engine = TemplateEngine::shared().unwrap();
        let out = engine
            .render(VUE_TYPES, &json!({ "name": "24HoursIcon" }))
            .unwrap();

        assert!(out.contains("declare const _24HoursIcon: FunctionalComponent<HTMLAttributes & VNodeProps>;"));
        assert!(out.trim_end().ends_with("export default _24HoursIcon;"));
    }

    #[test]
    fn test_vue_component_lists_helpers() {
        let engine = TemplateEngine::shared().unwrap();
        let out = engine
            .render(
                VUE_COMPONENT,
                &json!({ "helpers": ["openBlock", "createElementBlock"], "vnode": "null" }),
            )
            .unwrap();

        assert!(out.starts_with(
            "import { openBlock as _openBlock, createElementBlock as _createElementBlock } from \"vue\"\n"
        ));
        assert!(out.contains("export function render(_ctx, _cache) {\n  return null\n}"));
    }

    #[test]
    fn test_missing_variable_is_template_error() {
        let engine = TemplateEngine::shared().unwrap();
        let err = engine.render(REACT_TYPES, &json!({})).unwrap_err();
        assert!(matches!(err, Error::Template { .. }));
    }
}
