use swc_common::{Span, Spanned};
use swc_ecma_ast::{
    Accessibility, CallExpr, Callee, Class, ClassDecl, ClassExpr, ClassMember, Decl, DefaultDecl,
    ExportDecl, ExportDefaultDecl, Expr, Lit, MemberProp, ModuleDecl, ModuleItem, PropName, Stmt,
};
use swc_ecma_visit::{Visit, VisitWith};

use super::AccessorKind;
use crate::core::{
    NlsError,
    edit::Region,
    parsers::source::{ParsedSource, parse_source},
};

/// Static properties that hold the bundle name.
const BUNDLE_NAME_FIELDS: [&str; 3] = ["BUNDLE_NAME", "RESOURCE_BUNDLE", "bundleName"];
/// Runtime helper taking the bundle name and the class to fill in.
const INITIALIZE_MESSAGES: &str = "initializeMessages";
const GET_BUNDLE: &str = "getBundle";

/// A declared key field, e.g. `static title;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorField {
    pub name: String,
    /// The whole property declaration.
    pub region: Region,
}

/// Structure of an accessor class found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorClass {
    pub name: String,
    pub kind: AccessorKind,
    pub bundle_name: Option<String>,
    /// Key fields in declaration order.
    pub fields: Vec<AccessorField>,
    /// Offset just past the `{` opening the class body.
    pub body_open: usize,
    /// Offset of the `}` closing the class body.
    pub body_close: usize,
}

impl AccessorClass {
    pub fn field(&self, name: &str) -> Option<&AccessorField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Find and describe the accessor class `class_name` in `source`.
///
/// Without a name the default-exported class is used, else the first class.
pub fn inspect_accessor(
    source: &str,
    file_path: &str,
    class_name: Option<&str>,
) -> Result<Option<AccessorClass>, NlsError> {
    let parsed = parse_source(source, file_path)?;

    let classes: Vec<(Option<String>, &Class, bool)> =
        parsed.module.body.iter().filter_map(class_of).collect();
    let found = match class_name {
        Some(name) => classes
            .iter()
            .find(|(n, _, _)| n.as_deref() == Some(name)),
        None => classes
            .iter()
            .find(|(_, _, is_default)| *is_default)
            .or(classes.first()),
    };
    let Some((name, class, _)) = found else {
        return Ok(None);
    };

    let mut finder = RuntimeCallFinder::default();
    parsed.module.visit_with(&mut finder);

    let bundle_name = class
        .body
        .iter()
        .find_map(bundle_name_of)
        .or(finder.bundle_name);

    let kind = if finder.initializes {
        AccessorKind::Fields
    } else {
        AccessorKind::Lookup
    };

    let fields = class
        .body
        .iter()
        .filter_map(|member| key_field_of(&parsed, member))
        .collect();

    let body_open = body_open(&parsed, source, class);
    Ok(Some(AccessorClass {
        name: name.clone().unwrap_or_else(|| "default".to_string()),
        kind,
        bundle_name,
        fields,
        body_open,
        body_close: parsed.offset(class.span.hi).saturating_sub(1),
    }))
}

/// Class declared by a module item: its name, body, and whether it is the
/// default export.
fn class_of(item: &ModuleItem) -> Option<(Option<String>, &Class, bool)> {
    match item {
        ModuleItem::Stmt(Stmt::Decl(Decl::Class(ClassDecl { ident, class, .. })))
        | ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(ExportDecl {
            decl: Decl::Class(ClassDecl { ident, class, .. }),
            ..
        })) => Some((Some(ident.sym.to_string()), &**class, false)),
        ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(ExportDefaultDecl {
            decl: DefaultDecl::Class(ClassExpr { ident, class }),
            ..
        })) => Some((ident.as_ref().map(|i| i.sym.to_string()), &**class, true)),
        _ => None,
    }
}

fn key_field_of(parsed: &ParsedSource, member: &ClassMember) -> Option<AccessorField> {
    let ClassMember::ClassProp(prop) = member else {
        return None;
    };
    if !prop.is_static
        || prop.value.is_some()
        || prop.declare
        || !matches!(prop.accessibility, None | Some(Accessibility::Public))
    {
        return None;
    }
    let PropName::Ident(ident) = &prop.key else {
        return None;
    };
    Some(AccessorField {
        name: ident.sym.to_string(),
        region: parsed.region(prop.span),
    })
}

fn bundle_name_of(member: &ClassMember) -> Option<String> {
    let ClassMember::ClassProp(prop) = member else {
        return None;
    };
    let PropName::Ident(ident) = &prop.key else {
        return None;
    };
    if !prop.is_static || !BUNDLE_NAME_FIELDS.contains(&ident.sym.as_str()) {
        return None;
    }
    match prop.value.as_deref() {
        Some(Expr::Lit(Lit::Str(s))) => Some(s.value.to_string_lossy().to_string()),
        _ => None,
    }
}

/// The `{` opening the body follows the class heritage.
fn body_open(parsed: &ParsedSource, source: &str, class: &Class) -> usize {
    let mut heritage: Vec<Span> = Vec::new();
    heritage.extend(class.type_params.as_ref().map(|t| t.span));
    heritage.extend(class.super_class.as_ref().map(|e| e.span()));
    heritage.extend(class.super_type_params.as_ref().map(|t| t.span));
    heritage.extend(class.implements.iter().map(|i| i.span));

    let class_start = parsed.offset(class.span.lo);
    let search_from = heritage
        .iter()
        .map(|span| parsed.offset(span.hi))
        .max()
        .unwrap_or(class_start)
        .max(class_start);
    let from_decorators = class
        .decorators
        .iter()
        .map(|d| parsed.offset(d.span.hi))
        .max()
        .unwrap_or(0);
    let search_from = search_from.max(from_decorators);

    source[search_from..]
        .find('{')
        .map(|i| search_from + i + 1)
        .unwrap_or(search_from)
}

/// Looks for the runtime helper calls that fill in a fields accessor.
#[derive(Default)]
struct RuntimeCallFinder {
    initializes: bool,
    bundle_name: Option<String>,
    done: bool,
}

impl Visit for RuntimeCallFinder {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if self.done {
            return;
        }
        let method = match &node.callee {
            Callee::Expr(expr) => match &**expr {
                Expr::Member(member) => match &member.prop {
                    MemberProp::Ident(ident) => Some(ident.sym.as_str()),
                    _ => None,
                },
                Expr::Ident(ident) => Some(ident.sym.as_str()),
                _ => None,
            },
            _ => None,
        };

        if let Some(method) = method
            && (method == INITIALIZE_MESSAGES || method == GET_BUNDLE)
        {
            self.initializes |= method == INITIALIZE_MESSAGES;
            if self.bundle_name.is_none()
                && let Some(arg) = node.args.first()
                && let Expr::Lit(Lit::Str(s)) = &*arg.expr
            {
                self.bundle_name = Some(s.value.to_string_lossy().to_string());
            }
            self.done = self.initializes && self.bundle_name.is_some();
        }
        node.visit_children_with(self);
    }
}
