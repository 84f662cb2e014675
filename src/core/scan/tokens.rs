//! Token extraction from the swc AST.
//!
//! Only the tokens the scanner cares about are produced: string literals that
//! can be externalized, single-line comments, and references to accessor
//! fields. Accessor calls and imports are recorded on the side.

use std::collections::HashSet;
use std::path::Path;

use swc_common::comments::CommentKind;
use swc_ecma_ast::{
    CallExpr, Callee, ExportAll, Expr, ExprStmt, ImportDecl, ImportSpecifier, JSXAttrValue,
    JSXText, Lit, MemberExpr, MemberProp, ModuleDecl, ModuleExportName, ModuleItem, NamedExport, PropName, Str,
    TsEnumMemberId, TsExternalModuleRef, TsModuleName, TsType,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::{edit::Region, parsers::source::ParsedSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Str {
        region: Region,
        value: String,
        quote: char,
    },
    LineComment {
        region: Region,
    },
    FieldRef(FieldRef),
}

impl Token {
    pub fn offset(&self) -> usize {
        match self {
            Token::Str { region, .. } | Token::LineComment { region } => region.offset,
            Token::FieldRef(field) => field.name_region.offset,
        }
    }
}

/// `Receiver.name` where `Receiver` may be an accessor class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub receiver: String,
    pub receiver_region: Region,
    pub name: String,
    pub name_region: Region,
    /// The whole member expression.
    pub reference: Region,
}

/// `Receiver.method("literal", ...)` where `Receiver` may be an accessor class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorCall {
    pub receiver: String,
    pub receiver_region: Region,
    pub method: String,
    /// The whole call expression.
    pub call: Region,
    /// The string literal passed as first argument.
    pub literal: Region,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub local: String,
    /// Imported name, `default` for default imports and `*` for namespaces.
    pub imported: String,
    pub specifier: String,
}

#[derive(Debug, Default)]
pub struct TokenStream {
    /// Tokens ordered by offset.
    pub tokens: Vec<Token>,
    pub calls: Vec<AccessorCall>,
    pub imports: Vec<ImportBinding>,
    /// End of the last import declaration.
    pub last_import_end: Option<usize>,
    /// Text between JSX tags, where `//` is not a comment.
    pub jsx_text: Vec<Region>,
}

/// Collect tokens from a parsed module. `accessor_name` and its imported
/// aliases are treated as accessor receivers.
pub fn collect_tokens(parsed: &ParsedSource, source: &str, accessor_name: &str) -> TokenStream {
    let mut stream = TokenStream::default();
    collect_imports(parsed, &mut stream);

    let mut receivers: HashSet<String> = HashSet::new();
    receivers.insert(accessor_name.to_string());
    for import in &stream.imports {
        let stem_matches = Path::new(&import.specifier)
            .file_stem()
            .is_some_and(|stem| stem == accessor_name);
        if import.imported == accessor_name || (import.imported == "default" && stem_matches) {
            receivers.insert(import.local.clone());
        }
    }

    let mut collector = TokenCollector {
        parsed,
        source,
        receivers,
        tokens: Vec::new(),
        calls: Vec::new(),
        jsx_text: Vec::new(),
    };
    parsed.module.visit_with(&mut collector);

    for comment in &parsed.comments {
        if comment.kind != CommentKind::Line {
            continue;
        }
        let region = parsed.region(comment.span);
        let start = if source[region.offset..].starts_with("//") {
            region.offset
        } else {
            region.offset.saturating_sub(2)
        };
        collector.tokens.push(Token::LineComment {
            region: Region::between(start, region.end()),
        });
    }

    collector.tokens.sort_by_key(Token::offset);
    stream.tokens = collector.tokens;
    stream.calls = collector.calls;
    stream.jsx_text = collector.jsx_text;
    stream
}

fn collect_imports(parsed: &ParsedSource, stream: &mut TokenStream) {
    for item in &parsed.module.body {
        let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else {
            continue;
        };
        stream.last_import_end = Some(parsed.region(import.span).end());
        if import.type_only {
            continue;
        }
        let specifier = import.src.value.to_string_lossy().to_string();
        for spec in &import.specifiers {
            let (local, imported) = match spec {
                ImportSpecifier::Named(named) => {
                    let local = named.local.sym.to_string();
                    let imported = match &named.imported {
                        Some(ModuleExportName::Ident(ident)) => ident.sym.to_string(),
                        Some(ModuleExportName::Str(s)) => s.value.to_string_lossy().to_string(),
                        None => local.clone(),
                    };
                    (local, imported)
                }
                ImportSpecifier::Default(default) => {
                    (default.local.sym.to_string(), "default".to_string())
                }
                ImportSpecifier::Namespace(ns) => (ns.local.sym.to_string(), "*".to_string()),
            };
            stream.imports.push(ImportBinding {
                local,
                imported,
                specifier: specifier.clone(),
            });
        }
    }
}

struct TokenCollector<'a> {
    parsed: &'a ParsedSource,
    source: &'a str,
    receivers: HashSet<String>,
    tokens: Vec<Token>,
    calls: Vec<AccessorCall>,
    jsx_text: Vec<Region>,
}

impl TokenCollector<'_> {
    fn is_receiver(&self, expr: &Expr) -> Option<(String, Region)> {
        match expr {
            Expr::Ident(ident) if self.receivers.contains(ident.sym.as_str()) => {
                Some((ident.sym.to_string(), self.parsed.region(ident.span)))
            }
            _ => None,
        }
    }

    /// Visit call arguments, skipping a module specifier in first position.
    fn visit_args_without_specifier(&mut self, node: &CallExpr) {
        for (i, arg) in node.args.iter().enumerate() {
            if i == 0 && matches!(&*arg.expr, Expr::Lit(Lit::Str(_))) {
                continue;
            }
            arg.visit_with(self);
        }
    }
}

impl Visit for TokenCollector<'_> {
    // Module specifiers and type-level strings are not user-visible text.
    fn visit_import_decl(&mut self, _: &ImportDecl) {}
    fn visit_export_all(&mut self, _: &ExportAll) {}
    fn visit_named_export(&mut self, _: &NamedExport) {}
    fn visit_ts_type(&mut self, _: &TsType) {}
    fn visit_ts_enum_member_id(&mut self, _: &TsEnumMemberId) {}
    fn visit_ts_module_name(&mut self, _: &TsModuleName) {}
    fn visit_ts_external_module_ref(&mut self, _: &TsExternalModuleRef) {}

    fn visit_prop_name(&mut self, node: &PropName) {
        if let PropName::Computed(computed) = node {
            computed.visit_with(self);
        }
    }

    fn visit_jsx_attr_value(&mut self, node: &JSXAttrValue) {
        if matches!(node, JSXAttrValue::Str(_)) {
            return;
        }
        node.visit_children_with(self);
    }

    fn visit_jsx_text(&mut self, node: &JSXText) {
        self.jsx_text.push(self.parsed.region(node.span));
    }

    fn visit_expr_stmt(&mut self, node: &ExprStmt) {
        // Directives such as "use strict"
        if matches!(&*node.expr, Expr::Lit(Lit::Str(_))) {
            return;
        }
        node.visit_children_with(self);
    }

    fn visit_str(&mut self, node: &Str) {
        let region = self.parsed.region(node.span);
        let quote = match self.source[region.offset..].chars().next() {
            Some(q @ ('"' | '\'')) => q,
            _ => '"',
        };
        self.tokens.push(Token::Str {
            region,
            value: node.value.to_string_lossy().to_string(),
            quote,
        });
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        match &node.callee {
            Callee::Expr(expr) => {
                if let Expr::Member(member) = &**expr
                    && let MemberProp::Ident(method) = &member.prop
                    && let Some((receiver, receiver_region)) = self.is_receiver(&member.obj)
                {
                    if let Some(arg) = node.args.first()
                        && arg.spread.is_none()
                        && let Expr::Lit(Lit::Str(s)) = &*arg.expr
                    {
                        self.calls.push(AccessorCall {
                            receiver,
                            receiver_region,
                            method: method.sym.to_string(),
                            call: self.parsed.region(node.span),
                            literal: self.parsed.region(s.span),
                        });
                    }
                    node.args.visit_with(self);
                    return;
                }
                if let Expr::Ident(ident) = &**expr
                    && ident.sym.as_str() == "require"
                {
                    self.visit_args_without_specifier(node);
                    return;
                }
            }
            Callee::Import(_) => {
                self.visit_args_without_specifier(node);
                return;
            }
            Callee::Super(_) => {}
        }
        node.visit_children_with(self);
    }

    fn visit_member_expr(&mut self, node: &MemberExpr) {
        if let MemberProp::Ident(prop) = &node.prop
            && let Some((receiver, receiver_region)) = self.is_receiver(&node.obj)
        {
            self.tokens.push(Token::FieldRef(FieldRef {
                receiver,
                receiver_region,
                name: prop.sym.to_string(),
                name_region: self.parsed.region(prop.span),
                reference: self.parsed.region(node.span),
            }));
            return;
        }
        node.visit_children_with(self);
    }
}

#[cfg(test)]
mod tests {
    use crate::core::parsers::source::parse_source;
    use crate::core::scan::tokens::*;
    use pretty_assertions::assert_eq;

    fn strings(code: &str) -> Vec<String> {
        let parsed = parse_source(code, "test.tsx").unwrap();
        collect_tokens(&parsed, code, "Messages")
            .tokens
            .into_iter()
            .filter_map(|t| match t {
                Token::Str { value, .. } => Some(value),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_collects_plain_strings() {
        let code = r#"const a = "one"; f('two', `tpl`);"#;
        assert_eq!(strings(code), vec!["one", "two"]);
    }

    #[test]
    fn test_skips_non_text_positions() {
        let code = r#"
"use strict";
import x from "./x";
export * from "./y";
const m = require("fs");
type T = "a" | "b";
const o = { "key": "value" };
const el = <div className="box">{"shown"}</div>;
"#;
        assert_eq!(strings(code), vec!["value", "shown"]);
    }

    #[test]
    fn test_records_accessor_calls_and_fields() {
        let code = r#"import { Messages as M } from "./Messages";
const a = M.getString("greeting");
const b = Messages.title;
const c = other.getString("nope");
"#;
        let parsed = parse_source(code, "test.ts").unwrap();
        let stream = collect_tokens(&parsed, code, "Messages");

        assert_eq!(stream.calls.len(), 1);
        let call = &stream.calls[0];
        assert_eq!(call.receiver, "M");
        assert_eq!(call.method, "getString");
        assert_eq!(call.call.text(code), "M.getString(\"greeting\")");
        assert_eq!(call.literal.text(code), "\"greeting\"");

        let fields: Vec<&FieldRef> = stream
            .tokens
            .iter()
            .filter_map(|t| match t {
                Token::FieldRef(f) => Some(f),
                _ => None,
            })
            .collect();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "title");
        assert_eq!(fields[0].reference.text(code), "Messages.title");

        assert_eq!(stream.imports[0].local, "M");
        assert_eq!(stream.imports[0].imported, "Messages");
        assert_eq!(stream.last_import_end, Some(43));
    }

    #[test]
    fn test_tokens_are_ordered() {
        let code = "f(\"a\"); // one\ng(\"b\");\n";
        let parsed = parse_source(code, "test.js").unwrap();
        let stream = collect_tokens(&parsed, code, "Messages");
        let offsets: Vec<usize> = stream.tokens.iter().map(Token::offset).collect();
        assert_eq!(offsets, vec![2, 8, 17]);
    }
}
