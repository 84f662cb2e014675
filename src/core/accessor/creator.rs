use std::collections::BTreeMap;

use super::AccessorKind;
use crate::core::{model::Substitution, scan::TagFormat};

/// Everything needed to write a new accessor class.
#[derive(Debug, Clone)]
pub struct AccessorTemplate<'a> {
    pub class_name: &'a str,
    pub bundle_name: &'a str,
    pub kind: AccessorKind,
    /// Lookup method name, e.g. `getString`.
    pub method: &'a str,
    /// Module the runtime helpers are imported from.
    pub runtime_import: Option<&'a str>,
    pub indent: &'a str,
    pub delimiter: &'a str,
    pub tag_format: &'a TagFormat,
}

/// One representative externalized substitution per key, in key order.
///
/// A substitution whose state did not change is preferred, so an existing
/// use wins over a new one.
pub fn accessor_keys<'a>(
    subs: impl IntoIterator<Item = &'a Substitution>,
) -> BTreeMap<&'a str, &'a Substitution> {
    let mut keys: BTreeMap<&str, &Substitution> = BTreeMap::new();
    for sub in subs.into_iter().filter(|s| s.is_externalized()) {
        let Some(key) = sub.key() else {
            continue;
        };
        keys.entry(key)
            .and_modify(|current| {
                if current.has_state_changed() && !sub.has_state_changed() {
                    *current = sub;
                }
            })
            .or_insert(sub);
    }
    keys
}

/// Source text of a new accessor class declaring `keys`.
pub fn create_accessor<'a>(
    template: &AccessorTemplate<'_>,
    keys: impl IntoIterator<Item = &'a str>,
) -> String {
    let AccessorTemplate {
        class_name,
        bundle_name,
        indent,
        delimiter: nl,
        tag_format,
        ..
    } = *template;
    let tag = |n| tag_format.render_insert(n);
    let mut out = String::new();

    if let Some(module) = template.runtime_import {
        let helper = match template.kind {
            AccessorKind::Lookup => "ResourceBundle",
            AccessorKind::Fields => "NLS",
        };
        out.push_str(&format!(
            "import {{ {} }} from \"{}\";{}{}",
            helper, module, nl, nl
        ));
    }

    out.push_str(&format!("export class {} {{{}", class_name, nl));
    out.push_str(&format!(
        "{}static BUNDLE_NAME = \"{}\";{}{}",
        indent,
        bundle_name,
        tag(1),
        nl
    ));
    out.push_str(nl);

    match template.kind {
        AccessorKind::Lookup => {
            let i2 = indent.repeat(2);
            let i3 = indent.repeat(3);
            out.push_str(&format!(
                "{indent}static RESOURCE_BUNDLE = ResourceBundle.getBundle({class_name}.BUNDLE_NAME);{nl}{nl}"
            ));
            out.push_str(&format!("{indent}static {}(key) {{{nl}", template.method));
            out.push_str(&format!("{i2}try {{{nl}"));
            out.push_str(&format!(
                "{i3}return {class_name}.RESOURCE_BUNDLE.getString(key);{nl}"
            ));
            out.push_str(&format!("{i2}}} catch (e) {{{nl}"));
            out.push_str(&format!(
                "{i3}return \"!\" + key + \"!\";{}{}{nl}",
                tag(1),
                tag(2)
            ));
            out.push_str(&format!("{i2}}}{nl}"));
            out.push_str(&format!("{indent}}}{nl}"));
        }
        AccessorKind::Fields => {
            let mut any = false;
            for key in keys {
                out.push_str(&format!("{indent}static {key};{nl}"));
                any = true;
            }
            if any {
                out.push_str(nl);
            }
            let i2 = indent.repeat(2);
            out.push_str(&format!("{indent}static {{{nl}"));
            out.push_str(&format!(
                "{i2}NLS.initializeMessages({class_name}.BUNDLE_NAME, {class_name});{nl}"
            ));
            out.push_str(&format!("{indent}}}{nl}"));
        }
    }

    out.push_str(&format!("}}{nl}"));
    out
}
