//! Deletion Workflow
//!
//! One invocation walks `Analyze → Warn → Confirm → Execute | Abort → Report`
//! for a target chosen by the caller:
//!
//! 1. The impact of the deletion is analyzed. A failed lookup ends the run
//!    with an error outcome; nothing is deleted.
//! 2. A warning (or an informational "no impact" note) is shown.
//! 3. The user must confirm explicitly. Every severity asks, including
//!    [`Severity::None`]; the default answer declines.
//! 4. On confirmation the store deletes the target. Zero affected rows means
//!    the target vanished since the analysis and is reported as not found.
//!
//! The sequence is not atomic. Rows added between analysis and execution are
//! not reflected in the warning.

use crate::error::RosterError;
use crate::impact::{analyze, CascadeClass, DependencyEdge, ImpactReport, Severity, DEPENDENCY_TABLE};
use crate::output::{Message, MessageClass};
use crate::prompt::Console;
use crate::store::{EntityKind, Store};

/// Terminal state of one workflow run
#[derive(Debug)]
pub enum DeletionOutcome {
    /// The target was deleted
    Deleted { kind: EntityKind, id: i64, report: ImpactReport },
    /// The user declined; nothing was changed
    Cancelled { kind: EntityKind, id: i64 },
    /// The delete affected no rows
    NotFound { kind: EntityKind, id: i64 },
    /// Analysis, prompting or deletion failed
    Error(RosterError),
}

impl DeletionOutcome {
    /// Message class this outcome is presented with
    #[must_use]
    pub const fn class(&self) -> MessageClass {
        match self {
            Self::Deleted { .. } => MessageClass::Success,
            Self::Cancelled { .. } => MessageClass::Cancelled,
            Self::NotFound { .. } => MessageClass::Warning,
            Self::Error(_) => MessageClass::Error,
        }
    }

    /// User-facing report of the outcome
    #[must_use]
    pub fn message(&self) -> Message {
        let text = match self {
            Self::Deleted { kind, id, report } => {
                let mut text = format!("Deleted {kind} #{id}");
                if report.severity != Severity::None {
                    text.push_str(&format!(
                        " ({} removed, {} orphaned)",
                        report.cascaded(),
                        report.orphaned()
                    ));
                }
                text
            }
            Self::Cancelled { kind, id } => {
                format!("Deletion of {kind} #{id} cancelled; nothing was changed")
            }
            Self::NotFound { kind, id } => {
                RosterError::not_found(format!("{} #{id}", capitalize(kind.label()))).message()
            }
            Self::Error(err) => err.message(),
        };
        Message::new(self.class(), text)
    }
}

/// Deletes entities after showing their impact and asking for confirmation
#[derive(Debug, Clone, Copy)]
pub struct DeletionWorkflow<'a> {
    table: &'a [DependencyEdge],
}

impl Default for DeletionWorkflow<'static> {
    fn default() -> Self {
        Self::new(DEPENDENCY_TABLE)
    }
}

impl<'a> DeletionWorkflow<'a> {
    /// Workflow using the given dependency table
    #[must_use]
    pub const fn new(table: &'a [DependencyEdge]) -> Self {
        Self { table }
    }

    /// Dependency table consulted before each deletion
    #[must_use]
    pub const fn table(&self) -> &'a [DependencyEdge] {
        self.table
    }

    /// Run the workflow for `kind` #`id`.
    ///
    /// `Store::delete_entity` is called only after the console confirmed.
    pub async fn run<S: Store, C: Console>(
        &self,
        store: &S,
        console: &mut C,
        kind: EntityKind,
        id: i64,
    ) -> DeletionOutcome {
        tracing::debug!(%kind, id, "Analyzing deletion impact");
        let report = match analyze(store, kind, id, self.table).await {
            Ok(report) => report,
            Err(err) => return DeletionOutcome::Error(err),
        };

        console.show(&warning(&report));

        let question = format!("Delete {kind} #{id}?");
        match console.confirm(&question) {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(%kind, id, "Deletion declined");
                return DeletionOutcome::Cancelled { kind, id };
            }
            Err(err) => return DeletionOutcome::Error(err),
        }

        tracing::debug!(%kind, id, "Executing deletion");
        match store.delete_entity(kind, id).await {
            Ok(0) => {
                tracing::info!(%kind, id, "Deletion target no longer exists");
                DeletionOutcome::NotFound { kind, id }
            }
            Ok(_) => {
                tracing::info!(%kind, id, severity = %report.severity, "Deleted");
                DeletionOutcome::Deleted { kind, id, report }
            }
            Err(err) => DeletionOutcome::Error(err),
        }
    }
}

/// Describe an impact report for the user before confirmation.
///
/// Severity `none` yields an info message; anything else a warning listing
/// each affected edge, split into removed and orphaned rows.
#[must_use]
pub fn warning(report: &ImpactReport) -> Message {
    let target = format!("{} #{}", report.kind, report.id);

    if report.severity == Severity::None {
        return Message::info(format!("No other records reference {target}."));
    }

    let mut text = format!("Deleting {target} will affect other records:");
    for impact in report.affected() {
        text.push_str("\n  - ");
        text.push_str(&edge_line(&impact.edge, impact.count));
    }
    Message::warning(text)
}

fn edge_line(edge: &DependencyEdge, count: usize) -> String {
    let noun = if count == 1 { edge.dependent.label() } else { edge.dependent.plural() };
    match edge.class {
        CascadeClass::Cascades => format!("{count} {noun} will be deleted ({})", edge.name),
        CascadeClass::Orphans => format!(
            "{count} {noun} will be left referencing a missing {} ({})",
            edge.reference, edge.name
        ),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}
