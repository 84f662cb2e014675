use anyhow::Result;
use tracing::{info, warn};

use super::super::{context::CliContext, exit_status::ExitStatus, report};
use crate::core::{
    model::{Substitution, SubstitutionState},
    session::{CancellationToken, RefactoringSession},
};
use crate::utils::contains_alphabetic;

/// Plain string literals with text worth translating.
pub fn is_translatable(sub: &Substitution) -> bool {
    sub.state() == SubstitutionState::Internalized
        && sub.literal().is_string()
        && contains_alphabetic(&sub.literal().value)
}

/// Ids of `ids`, or of every translatable substitution if `ids` is empty.
pub fn select_ids(session: &RefactoringSession, ids: &[usize]) -> Result<Vec<usize>> {
    if ids.is_empty() {
        return Ok(session
            .substitutions()
            .iter()
            .filter(|s| is_translatable(s))
            .map(|s| s.id)
            .collect());
    }
    for &id in ids {
        session.substitution(id)?;
    }
    Ok(ids.to_vec())
}

/// Validate the edited session, then preview or write its change.
pub fn finish(ctx: &CliContext, mut session: RefactoringSession, apply: bool) -> Result<ExitStatus> {
    if !session.has_changes() {
        report::print_nothing_to_do(&session);
        return Ok(ExitStatus::Success);
    }

    let status = session.validate()?.clone();
    report::print_status(&status, &session);
    if status.has_error() {
        return Ok(ExitStatus::Failure);
    }

    let change = session.build_change()?.clone();
    if !apply {
        report::print_change(&change);
        report::print_dry_run(&change);
        return Ok(ExitStatus::Success);
    }

    let mut store = ctx.store;
    match session.perform(&mut store) {
        Ok(_) => {
            info!(name = %change.name, files = change.len(), "performed change");
            report::print_applied(&change);
            Ok(ExitStatus::Success)
        }
        Err(failure) => {
            if !failure.undo.is_empty() {
                warn!(files = failure.undo.len(), "rolling back written files");
                if let Err(undo_failure) = failure.undo.perform(&mut store, &CancellationToken::new()) {
                    warn!(error = %undo_failure.error, "rollback failed");
                }
            }
            Err(failure.into())
        }
    }
}
