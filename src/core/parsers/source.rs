use std::path::Path;
use std::sync::Arc;

use swc_common::{
    BytePos, FileName, Globals, SourceMap, Span,
    comments::{Comment, SingleThreadedComments},
};
use swc_ecma_ast::Module;
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

use crate::core::{NlsError, edit::Region};

const BOM: &str = "\u{feff}";

/// A parsed JavaScript/TypeScript module together with its comments.
///
/// Positions reported by swc are relative to the file's start position in the
/// source map; [`ParsedSource::region`] maps them back to byte offsets in the
/// text handed to [`parse_source`].
pub struct ParsedSource {
    pub module: Module,
    /// All comments of the file, ordered by position.
    pub comments: Vec<Comment>,
    start_pos: BytePos,
    bom_len: usize,
}

impl ParsedSource {
    pub fn offset(&self, pos: BytePos) -> usize {
        (pos.0 - self.start_pos.0) as usize + self.bom_len
    }

    pub fn region(&self, span: Span) -> Region {
        Region::between(self.offset(span.lo), self.offset(span.hi))
    }
}

/// Parse source code into an AST.
///
/// `.ts` files are parsed without JSX so that angle-bracket casts work; every
/// other extension is parsed as TSX, which accepts plain JavaScript as well.
pub fn parse_source(code: &str, file_path: &str) -> Result<ParsedSource, NlsError> {
    use swc_common::GLOBALS;

    let (bom_len, body) = match code.strip_prefix(BOM) {
        Some(rest) => (BOM.len(), rest),
        None => (0, code),
    };
    let is_ts = Path::new(file_path)
        .extension()
        .is_some_and(|ext| ext == "ts" || ext == "mts" || ext == "cts");

    GLOBALS.set(&Globals::new(), || {
        let source_map = Arc::new(SourceMap::default());
        let source_file = source_map.new_source_file(
            FileName::Real(file_path.into()).into(),
            body.to_string(),
        );

        let syntax = Syntax::Typescript(TsSyntax {
            tsx: !is_ts,
            decorators: true,
            ..Default::default()
        });

        let comments = SingleThreadedComments::default();
        let mut parser = Parser::new(syntax, StringInput::from(&*source_file), Some(&comments));

        let module = parser.parse_module().map_err(|e| NlsError::Parse {
            path: file_path.to_string(),
            message: format!("{:?}", e),
        })?;

        // Extract comments before SingleThreadedComments drops
        let (leading, trailing) = comments.borrow_all();
        let mut all: Vec<Comment> = leading
            .values()
            .chain(trailing.values())
            .flatten()
            .cloned()
            .collect();
        all.sort_by_key(|c| c.span.lo);
        all.dedup_by_key(|c| c.span.lo);

        Ok(ParsedSource {
            module,
            comments: all,
            start_pos: source_file.start_pos,
            bom_len,
        })
    })
}
