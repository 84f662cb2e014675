//! Check command - report string literals that still need attention.
//!
//! A file is clean when every literal containing letters is either
//! externalized or tagged, and every key it references exists.

use std::path::Path;

use anyhow::Result;
use rayon::prelude::*;
use tracing::debug;

use super::helper::is_translatable;
use super::super::{args::CheckCommand, context::CliContext, exit_status::ExitStatus, report};
use crate::{
    core::{
        NlsError,
        session::{RefactoringSession, SessionOptions},
    },
    issues::{Issue, MissingKeyIssue, NonExternalizedIssue, ParseErrorIssue, SourceContext},
};

pub fn check(cmd: CheckCommand, verbose: bool) -> Result<ExitStatus> {
    let ctx = CliContext::new(&cmd.common)?;
    let files = ctx.files(&cmd.files);
    let options = ctx.session_options()?;
    debug!(files = files.len(), "checking source files");

    let results: Vec<Vec<Issue>> = files
        .par_iter()
        .map(|file| check_file(&ctx, file, &options))
        .collect::<Result<_>>()?;
    let mut issues: Vec<Issue> = results.into_iter().flatten().collect();

    let parse_error_count = issues
        .iter()
        .filter(|i| matches!(i, Issue::ParseError(_)))
        .count();
    if !verbose {
        issues.retain(|i| !matches!(i, Issue::ParseError(_)));
    }

    if issues.is_empty() {
        report::print_success(files.len());
        report::print_parse_warning(parse_error_count, verbose);
        return Ok(ExitStatus::Success);
    }

    report::report(&issues);
    report::print_parse_warning(parse_error_count, verbose);
    Ok(ExitStatus::Failure)
}

fn check_file(ctx: &CliContext, file: &Path, options: &SessionOptions) -> Result<Vec<Issue>> {
    let session = match RefactoringSession::open(&ctx.store, file, options.clone()) {
        Ok(session) => session,
        Err(NlsError::Parse { path, message }) => {
            debug!(file = %path, error = %message, "skipping unparsable file");
            return Ok(vec![Issue::ParseError(ParseErrorIssue {
                file_path: path,
                error: message,
            })]);
        }
        Err(e) => return Err(e.into()),
    };

    let file_path = session.source_path().display().to_string();
    let source = session.source();
    let index = session.scan().line_index();
    let mut issues = Vec::new();

    for sub in session.substitutions() {
        if is_translatable(sub) {
            issues.push(Issue::NonExternalized(NonExternalizedIssue {
                context: SourceContext::of(&file_path, source, index, sub),
                text: sub.literal().value.clone(),
            }));
        } else if sub.is_externalized()
            && sub.value().is_none()
            && let (Some(key), Some(reference)) = (sub.key(), sub.accessor())
        {
            issues.push(Issue::MissingKey(MissingKeyIssue {
                context: SourceContext::of(&file_path, source, index, sub),
                key: key.to_string(),
                bundle: reference.binding.bundle_path().display().to_string(),
            }));
        }
    }
    Ok(issues)
}
