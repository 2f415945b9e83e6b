//! Impact Analysis for Destructive Operations
//!
//! Before an entity is deleted, every declared dependency edge keyed by the
//! entity's kind is looked up and the affected rows are counted. The counts
//! are classified into a [`Severity`] that shapes the warning shown to the
//! user.
//!
//! # Dependency Table
//! Relationships are data, not code: [`DEPENDENCY_TABLE`] lists every edge.
//! Adding a relationship means adding a row there (and teaching the stores
//! the matching [`Relation`] lookup).
//!
//! # Failure Policy
//! A failing lookup fails the whole analysis; it is never counted as zero.

use serde::Serialize;

use crate::error::{Result, RosterError};
use crate::store::{EntityKind, Relation, Store};

/// What happens to dependent rows when their parent is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CascadeClass {
    /// Dependent rows are deleted alongside the parent
    Cascades,
    /// Dependent rows survive but lose their reference to the parent
    Orphans,
}

/// A declared relationship used to discover rows depending on a parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DependencyEdge {
    /// Short description, e.g. `"department → roles"`
    pub name: &'static str,
    /// Kind of entity being deleted
    pub parent: EntityKind,
    /// Kind of the dependent rows
    pub dependent: EntityKind,
    /// Store lookup returning the dependent rows
    pub relation: Relation,
    /// Effect of the deletion on the dependent rows
    pub class: CascadeClass,
    /// Reference the dependent rows hold, as named in warnings
    pub reference: &'static str,
}

/// Every relationship between the managed entities.
///
/// Deleting a department removes its roles; the employees holding those roles
/// are kept with an empty role. Deleting a role or a manager leaves the
/// referencing employees in place with the reference cleared.
pub const DEPENDENCY_TABLE: &[DependencyEdge] = &[
    DependencyEdge {
        name: "department → roles",
        parent: EntityKind::Department,
        dependent: EntityKind::Role,
        relation: Relation::RolesInDepartment,
        class: CascadeClass::Cascades,
        reference: "department",
    },
    DependencyEdge {
        name: "roles → employees",
        parent: EntityKind::Department,
        dependent: EntityKind::Employee,
        relation: Relation::EmployeesInDepartment,
        class: CascadeClass::Orphans,
        reference: "role",
    },
    DependencyEdge {
        name: "role → employees",
        parent: EntityKind::Role,
        dependent: EntityKind::Employee,
        relation: Relation::EmployeesWithRole,
        class: CascadeClass::Orphans,
        reference: "role",
    },
    DependencyEdge {
        name: "manager → reports",
        parent: EntityKind::Employee,
        dependent: EntityKind::Employee,
        relation: Relation::DirectReports,
        class: CascadeClass::Orphans,
        reference: "manager",
    },
];

/// Blast radius of a pending deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    /// Nothing depends on the target
    None,
    /// Only cascading deletions
    CascadeOnly,
    /// Cascading deletions and orphaned rows
    CascadeAndOrphan,
    /// Only orphaned rows
    OrphanOnly,
}

impl Severity {
    /// Classify from the total cascaded and orphaned row counts
    #[must_use]
    pub const fn classify(cascaded: usize, orphaned: usize) -> Self {
        match (cascaded > 0, orphaned > 0) {
            (false, false) => Self::None,
            (true, false) => Self::CascadeOnly,
            (true, true) => Self::CascadeAndOrphan,
            (false, true) => Self::OrphanOnly,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::CascadeOnly => "cascadeOnly",
            Self::CascadeAndOrphan => "cascadeAndOrphan",
            Self::OrphanOnly => "orphanOnly",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of rows affected through one edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgeImpact {
    pub edge: DependencyEdge,
    pub count: usize,
}

/// Result of analyzing one pending deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactReport {
    pub kind: EntityKind,
    pub id: i64,
    /// One entry per applicable edge, in table order
    pub impacts: Vec<EdgeImpact>,
    pub severity: Severity,
}

impl ImpactReport {
    /// Build a report from per-edge counts, deriving the severity
    #[must_use]
    pub fn new(kind: EntityKind, id: i64, impacts: Vec<EdgeImpact>) -> Self {
        let cascaded = total(&impacts, CascadeClass::Cascades);
        let orphaned = total(&impacts, CascadeClass::Orphans);
        Self { kind, id, impacts, severity: Severity::classify(cascaded, orphaned) }
    }

    /// Entries with at least one affected row
    pub fn affected(&self) -> impl Iterator<Item = &EdgeImpact> {
        self.impacts.iter().filter(|i| i.count > 0)
    }

    /// Rows that would be deleted alongside the target
    #[must_use]
    pub fn cascaded(&self) -> usize {
        total(&self.impacts, CascadeClass::Cascades)
    }

    /// Rows that would be left referencing a missing parent
    #[must_use]
    pub fn orphaned(&self) -> usize {
        total(&self.impacts, CascadeClass::Orphans)
    }
}

fn total(impacts: &[EdgeImpact], class: CascadeClass) -> usize {
    impacts.iter().filter(|i| i.edge.class == class).map(|i| i.count).sum()
}

/// Edges of `table` that apply when deleting an entity of `kind`
pub fn edges_for(
    table: &[DependencyEdge],
    kind: EntityKind,
) -> impl Iterator<Item = &DependencyEdge> {
    table.iter().filter(move |edge| edge.parent == kind)
}

/// Check that every edge looks up rows by the kind it is registered under
pub fn validate_edges(table: &[DependencyEdge]) -> Result<()> {
    for edge in table {
        let keyed_by = edge.relation.parent_kind();
        if keyed_by != edge.parent {
            return Err(RosterError::misconfigured(format!(
                "Dependency edge '{}' is registered for {} but its lookup is keyed by {}",
                edge.name, edge.parent, keyed_by
            )));
        }
    }
    Ok(())
}

/// Count the rows that deleting `kind` #`id` would affect.
///
/// Lookups run one at a time, in table order. The store is only read.
pub async fn analyze<S: Store>(
    store: &S,
    kind: EntityKind,
    id: i64,
    table: &[DependencyEdge],
) -> Result<ImpactReport> {
    validate_edges(table)?;

    let mut impacts = Vec::new();
    for edge in edges_for(table, kind) {
        let rows = store.lookup_dependents(edge.relation, id).await.inspect_err(|e| {
            tracing::warn!(edge = edge.name, id, error = %e, "Dependency lookup failed");
        })?;
        tracing::debug!(edge = edge.name, id, count = rows.len(), "Dependency lookup");
        impacts.push(EdgeImpact { edge: *edge, count: rows.len() });
    }

    let report = ImpactReport::new(kind, id, impacts);
    tracing::info!(%kind, id, severity = %report.severity, "Impact analyzed");
    Ok(report)
}
