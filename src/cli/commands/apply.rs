//! Apply command - apply a JSON edit plan to a source file.
//!
//! ```json
//! {
//!   "accessorName": "Strings",
//!   "substitutions": [
//!     { "id": 0, "state": "externalized", "key": "greeting" },
//!     { "id": 2, "state": "ignored" }
//!   ]
//! }
//! ```
//!
//! Entries are applied in order; a state change runs before the key and
//! value of the same entry are set.

use std::fs;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::helper::finish;
use super::super::{args::ApplyCommand, context::CliContext, exit_status::ExitStatus};
use crate::core::{model::SubstitutionState, session::RefactoringSession};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Plan {
    /// New name of the accessor at the file's existing references.
    #[serde(default)]
    accessor_name: Option<String>,
    #[serde(default)]
    substitutions: Vec<PlanEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PlanEntry {
    id: usize,
    #[serde(default)]
    state: Option<SubstitutionState>,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    value: Option<String>,
}

pub fn apply(cmd: ApplyCommand) -> Result<ExitStatus> {
    let content = fs::read_to_string(&cmd.plan)
        .with_context(|| format!("Failed to read plan file: {:?}", cmd.plan))?;
    let plan: Plan = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse plan file: {:?}", cmd.plan))?;

    let ctx = CliContext::new(&cmd.target.common)?;
    let mut session = ctx.open(&cmd.target.file)?;
    apply_plan(&mut session, plan)?;

    finish(&ctx, session, cmd.target.apply)
}

fn apply_plan(session: &mut RefactoringSession, plan: Plan) -> Result<()> {
    if plan.accessor_name.is_some() {
        session.rename_accessor(plan.accessor_name)?;
    }
    for entry in plan.substitutions {
        if let Some(state) = entry.state {
            session.set_state(entry.id, state)?;
        }
        if entry.key.is_some() {
            session.set_key(entry.id, entry.key)?;
        }
        if entry.value.is_some() {
            session.set_value(entry.id, entry.value)?;
        }
    }
    Ok(())
}
