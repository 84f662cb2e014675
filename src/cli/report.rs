//! Report formatting and printing utilities.
//!
//! Issues and validation entries are displayed cargo-style; changes are
//! previewed as line hunks.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use crate::config::CONFIG_FILE_NAME;
use crate::core::{
    change::{Change, CompositeChange, FileChange},
    model::SubstitutionState,
    session::RefactoringSession,
};
use crate::issues::{Issue, Report, ReportLocation, Severity};
use crate::status::{RefactoringStatus, StatusLevel};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Longest value shown in the substitution table.
const MAX_VALUE_DISPLAY: usize = 40;

/// Print issues in cargo-style format to stdout.
pub fn report(issues: &[Issue]) {
    report_to(issues, &mut io::stdout().lock());
}

/// Print issues to a custom writer.
pub fn report_to<W: Write>(issues: &[Issue], writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    let mut sorted = issues.to_vec();
    sorted.sort();

    let max_line_width = sorted
        .iter()
        .filter_map(|i| match i.location() {
            ReportLocation::Source(ctx) => Some(ctx.line),
            ReportLocation::File { .. } => None,
        })
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1);

    for issue in &sorted {
        print_issue(issue, writer, max_line_width);
    }

    print_summary(&sorted, writer);
}

pub fn print_success(source_files: usize) {
    print_success_to(source_files, &mut io::stdout().lock());
}

pub fn print_success_to<W: Write>(source_files: usize, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Checked {} source {} - no issues found",
            source_files,
            if source_files == 1 { "file" } else { "files" }
        )
        .green()
    );
}

/// Print a warning about files that could not be parsed.
pub fn print_parse_warning(count: usize, verbose: bool) {
    print_parse_warning_to(count, verbose, &mut io::stderr().lock());
}

pub fn print_parse_warning_to<W: Write>(count: usize, verbose: bool, writer: &mut W) {
    if count > 0 && !verbose {
        let _ = writeln!(
            writer,
            "{} {} file(s) could not be parsed (use {} for details)",
            "warning:".bold().yellow(),
            count,
            "-v".cyan()
        );
    }
}

fn print_issue<W: Write>(issue: &Issue, writer: &mut W, max_line_width: usize) {
    let severity = issue.severity();
    let severity_str = match severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };

    let _ = writeln!(
        writer,
        "{}: \"{}\"  {}",
        severity_str,
        issue.message(),
        issue.rule().to_string().dimmed().cyan()
    );

    match issue.location() {
        ReportLocation::Source(ctx) => {
            let _ = writeln!(
                writer,
                "  {} {}:{}:{}",
                "-->".blue(),
                ctx.file_path,
                ctx.line,
                ctx.col
            );
            let caret = match severity {
                Severity::Error => "^".red(),
                Severity::Warning => "^".yellow(),
            };
            print_source_line(
                writer,
                ctx.line,
                ctx.col,
                &ctx.source_line,
                caret,
                max_line_width,
            );
        }
        ReportLocation::File { path } => {
            let _ = writeln!(writer, "  {} {}", "-->".blue(), path);
        }
    }

    if let Some(details) = issue.details() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "note:".bold(),
            details,
            width = max_line_width
        );
    }

    if let Some(hint) = issue.hint() {
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "hint:".bold().cyan(),
            hint,
            width = max_line_width
        );
    }

    let _ = writeln!(writer);
}

/// The `|` gutter with the source line and a caret under column `col`.
fn print_source_line<W: Write>(
    writer: &mut W,
    line: usize,
    col: usize,
    source_line: &str,
    caret: colored::ColoredString,
    width: usize,
) {
    let _ = writeln!(writer, "{:>width$} {}", "", "|".blue(), width = width);
    let _ = writeln!(
        writer,
        "{:>width$} {} {}",
        line.to_string().blue(),
        "|".blue(),
        source_line,
        width = width
    );
    let prefix: String = source_line.chars().take(col.saturating_sub(1)).collect();
    let padding = UnicodeWidthStr::width(prefix.as_str());
    let _ = writeln!(
        writer,
        "{:>width$} {} {:>padding$}{}",
        "",
        "|".blue(),
        "",
        caret,
        width = width,
        padding = padding
    );
}

fn print_summary<W: Write>(issues: &[Issue], writer: &mut W) {
    let total_errors = issues
        .iter()
        .filter(|i| i.severity() == Severity::Error)
        .count();
    let total_warnings = issues.len() - total_errors;

    let _ = writeln!(
        writer,
        "\n{} {} problems ({} {}, {} {})",
        FAILURE_MARK.red(),
        issues.len(),
        total_errors,
        if total_errors == 1 { "error" } else { "errors" }.red(),
        total_warnings,
        if total_warnings == 1 {
            "warning"
        } else {
            "warnings"
        }
        .yellow()
    );
}

/// Print the entries of a validation status.
pub fn print_status(status: &RefactoringStatus, session: &RefactoringSession) {
    print_status_to(status, session, &mut io::stdout().lock());
}

pub fn print_status_to<W: Write>(
    status: &RefactoringStatus,
    session: &RefactoringSession,
    writer: &mut W,
) {
    let source = session.source();
    let index = session.scan().line_index();
    let path = session.source_path().display().to_string();

    for entry in status.entries() {
        let level = match entry.level {
            StatusLevel::Info => "info".bold().cyan(),
            StatusLevel::Warning => "warning".bold().yellow(),
            StatusLevel::Error => "error".bold().red(),
            StatusLevel::Fatal => "fatal".bold().red(),
        };
        let id = entry
            .substitution
            .map(|id| format!("  [#{}]", id).dimmed().to_string())
            .unwrap_or_default();
        let _ = writeln!(writer, "{}: {}{}", level, entry.message, id);

        if let Some(region) = entry.region {
            let line = index.line_of(region.offset);
            let col = index.column(source, region.offset);
            let text = index.line_text(source, region.offset).trim_end();
            let _ = writeln!(writer, "  {} {}:{}:{}", "-->".blue(), path, line, col);
            let caret = match entry.level {
                StatusLevel::Warning => "^".yellow(),
                StatusLevel::Info => "^".cyan(),
                _ => "^".red(),
            };
            let width = line.to_string().len();
            print_source_line(writer, line, col, text, caret, width);
        }
    }
}

/// Print the files a change touches and their changed lines.
pub fn print_change(change: &CompositeChange) {
    print_change_to(change, &mut io::stdout().lock());
}

pub fn print_change_to<W: Write>(change: &CompositeChange, writer: &mut W) {
    for file in change.changes() {
        let path = file.path().display().to_string();
        match file {
            FileChange::Edit(edit) => {
                let _ = writeln!(writer, "{} {}", "edit".bold().yellow(), path);
                for hunk in edit.hunks() {
                    let _ = writeln!(writer, "{}", format!("@@ line {} @@", hunk.line).cyan());
                    for line in &hunk.before {
                        let _ = writeln!(writer, "{}", format!("-{}", line).red());
                    }
                    for line in &hunk.after {
                        let _ = writeln!(writer, "{}", format!("+{}", line).green());
                    }
                }
            }
            FileChange::Create(create) => {
                let _ = writeln!(writer, "{} {}", "create".bold().green(), path);
                for line in create.preview().after.unwrap_or_default().lines() {
                    let _ = writeln!(writer, "{}", format!("+{}", line).green());
                }
            }
            FileChange::Delete(delete) => {
                let _ = writeln!(writer, "{} {}", "delete".bold().red(), path);
                for line in delete.preview().before.unwrap_or_default().lines() {
                    let _ = writeln!(writer, "{}", format!("-{}", line).red());
                }
            }
        }
        let _ = writeln!(writer);
    }
}

pub fn print_dry_run(change: &CompositeChange) {
    println!(
        "{} {} file(s).",
        "Would change".yellow().bold(),
        change.len()
    );
    println!("Run with {} to write these changes.", "--apply".cyan());
}

pub fn print_applied(change: &CompositeChange) {
    println!(
        "{} {} {} file(s).",
        SUCCESS_MARK.green(),
        "Changed".green().bold(),
        change.len()
    );
}

pub fn print_nothing_to_do(session: &RefactoringSession) {
    println!(
        "{} {}",
        SUCCESS_MARK.green(),
        format!("Nothing to change in {}", session.source_path().display()).green()
    );
}

/// Print the substitutions of a session as a table.
pub fn print_substitutions(session: &RefactoringSession) {
    print_substitutions_to(session, &mut io::stdout().lock());
}

pub fn print_substitutions_to<W: Write>(session: &RefactoringSession, writer: &mut W) {
    let source = session.source();
    let index = session.scan().line_index();
    let _ = writeln!(
        writer,
        "{}",
        format!(
            "{} ({} -> {})",
            session.source_path().display(),
            session.accessor().handle.name,
            session.accessor().bundle_path().display()
        )
        .bold()
    );

    for sub in session.substitutions() {
        let offset = sub.literal().region.offset;
        let state = match sub.state() {
            SubstitutionState::Externalized => "externalized".green(),
            SubstitutionState::Ignored => "ignored".dimmed(),
            SubstitutionState::Internalized => "internalized".yellow(),
        };
        let location = format!(
            "{}:{}",
            index.line_of(offset),
            index.column(source, offset)
        );
        let key = sub.key().map(|k| format!("{} = ", k)).unwrap_or_default();
        let value = match sub.value() {
            Some(value) => format!("\"{}\"", truncate(value)),
            None => "(missing)".red().to_string(),
        };
        let _ = writeln!(
            writer,
            "{:>4}  {:<12}  {:<8}  {}{}",
            format!("#{}", sub.id),
            state,
            location,
            key,
            value
        );
    }
}

fn truncate(value: &str) -> String {
    let escaped = value.replace('\n', "\\n");
    if escaped.chars().count() <= MAX_VALUE_DISPLAY {
        return escaped;
    }
    let head: String = escaped.chars().take(MAX_VALUE_DISPLAY - 3).collect();
    format!("{}...", head)
}

pub fn print_init() {
    println!(
        "{} {}",
        SUCCESS_MARK.green(),
        format!("Created {}", CONFIG_FILE_NAME).green()
    );
}
