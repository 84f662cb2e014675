//! Diagnostics reported by the `check` command.
//!
//! Each issue carries everything the reporter needs to print it.

use std::fmt;

use enum_dispatch::enum_dispatch;

use crate::core::model::Substitution;
use crate::utils::LineIndex;

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    NonExternalized,
    MissingKey,
    ParseError,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::NonExternalized => write!(f, "non-nls"),
            Rule::MissingKey => write!(f, "missing-key"),
            Rule::ParseError => write!(f, "parse-error"),
        }
    }
}

/// Position of an issue in a source file, with the line for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub file_path: String,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, in characters.
    pub col: usize,
    pub source_line: String,
}

impl SourceContext {
    pub fn new(
        file_path: impl Into<String>,
        line: usize,
        col: usize,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            col,
            source_line: source_line.into(),
        }
    }

    /// Context of the literal of `sub`.
    pub fn of(file_path: &str, source: &str, index: &LineIndex, sub: &Substitution) -> Self {
        let offset = sub.literal().region.offset;
        Self::new(
            file_path,
            index.line_of(offset),
            index.column(source, offset),
            index.line_text(source, offset).trim_end(),
        )
    }
}

/// String literal that is neither externalized nor tagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonExternalizedIssue {
    pub context: SourceContext,
    pub text: String,
}

/// Accessor reference whose key is not in the resource file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKeyIssue {
    pub context: SourceContext,
    pub key: String,
    /// Resource file the key was looked up in.
    pub bundle: String,
}

/// File could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrorIssue {
    pub file_path: String,
    pub error: String,
}

#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    NonExternalized(NonExternalizedIssue),
    MissingKey(MissingKeyIssue),
    ParseError(ParseErrorIssue),
}

/// Location information for report output.
pub enum ReportLocation<'a> {
    Source(&'a SourceContext),
    /// File-level only, without line context.
    File { path: &'a str },
}

/// Trait for types that can be reported to the CLI.
#[enum_dispatch]
pub trait Report {
    fn location(&self) -> ReportLocation<'_>;

    /// Primary message to display.
    fn message(&self) -> String;

    fn severity(&self) -> Severity;

    fn rule(&self) -> Rule;

    /// Optional hint for fixing the issue.
    fn hint(&self) -> Option<String> {
        None
    }

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }
}

impl Report for NonExternalizedIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        self.text.clone()
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn rule(&self) -> Rule {
        Rule::NonExternalized
    }

    fn hint(&self) -> Option<String> {
        Some(format!(
            "run `nlsctl externalize {}` or `nlsctl ignore {}`",
            self.context.file_path, self.context.file_path
        ))
    }
}

impl Report for MissingKeyIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        self.key.clone()
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn rule(&self) -> Rule {
        Rule::MissingKey
    }

    fn details(&self) -> Option<String> {
        Some(format!("not found in {}", self.bundle))
    }
}

impl Report for ParseErrorIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
        }
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn rule(&self) -> Rule {
        Rule::ParseError
    }
}

impl Issue {
    fn sort_key(&self) -> (&str, usize, usize) {
        match self.location() {
            ReportLocation::Source(ctx) => (ctx.file_path.as_str(), ctx.line, ctx.col),
            ReportLocation::File { path } => (path, 0, 0),
        }
    }
}

impl Ord for Issue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.rule().cmp(&other.rule()))
    }
}

impl PartialOrd for Issue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use crate::issues::*;
    use pretty_assertions::assert_eq;

    fn context(path: &str, line: usize, col: usize) -> SourceContext {
        SourceContext::new(path, line, col, "label(\"Hello\");")
    }

    #[test]
    fn test_issue_dispatch() {
        let issue = Issue::MissingKey(MissingKeyIssue {
            context: context("src/app.js", 3, 7),
            key: "greeting".to_string(),
            bundle: "src/messages.properties".to_string(),
        });
        assert_eq!(issue.severity(), Severity::Error);
        assert_eq!(issue.rule().to_string(), "missing-key");
        assert_eq!(issue.message(), "greeting");
        assert_eq!(
            issue.details().as_deref(),
            Some("not found in src/messages.properties")
        );
    }

    #[test]
    fn test_issue_ordering() {
        let mut issues = vec![
            Issue::NonExternalized(NonExternalizedIssue {
                context: context("src/b.js", 1, 1),
                text: "b".to_string(),
            }),
            Issue::NonExternalized(NonExternalizedIssue {
                context: context("src/a.js", 9, 2),
                text: "a2".to_string(),
            }),
            Issue::ParseError(ParseErrorIssue {
                file_path: "src/a.js".to_string(),
                error: "unexpected token".to_string(),
            }),
        ];
        issues.sort();
        let messages: Vec<String> = issues.iter().map(|i| i.message()).collect();
        assert_eq!(messages, vec!["unexpected token", "a2", "b"]);
    }
}
