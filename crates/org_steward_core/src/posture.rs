//! Security posture scanning.
//!
//! A read-only rule evaluator over the actual organization state. Findings
//! are advisory: they never block or alter reconciliation, and they have no
//! relation to the desired state. Rules are independent heuristics; adding
//! a rule never changes what the existing ones report.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use github_client::{OrgRole, OrgState, RepoVisibility};

#[cfg(test)]
#[path = "posture_tests.rs"]
mod tests;

/// How urgently a finding deserves attention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The area of hygiene a finding belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    AccessControl,
    BranchProtection,
    Housekeeping,
}

impl FindingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCategory::AccessControl => "access_control",
            FindingCategory::BranchProtection => "branch_protection",
            FindingCategory::Housekeeping => "housekeeping",
        }
    }
}

/// A security concern observed in the actual state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub category: FindingCategory,
    /// Name of the affected resource, or `"organization"` for org-wide
    /// findings.
    pub resource: String,
    pub message: String,
}

/// Runs all posture rules against the actual state.
///
/// Current rules:
/// - more admins than `max(2, members / 3)`: medium;
/// - a public repository with no branch protection at all: high;
/// - a team with no members: low;
/// - a repository not referenced by any team's grants: low.
pub fn scan(state: &OrgState) -> Vec<Finding> {
    let mut findings = Vec::new();

    let admin_count = state
        .members
        .iter()
        .filter(|m| m.role == OrgRole::Admin)
        .count();
    if admin_count > usize::max(2, state.members.len() / 3) {
        findings.push(Finding {
            severity: Severity::Medium,
            category: FindingCategory::AccessControl,
            resource: "organization".to_string(),
            message: format!(
                "{admin_count} of {} members have admin role. Consider limiting admin access.",
                state.members.len()
            ),
        });
    }

    for repo in &state.repositories {
        if repo.visibility == RepoVisibility::Public && repo.branch_protection.is_empty() {
            findings.push(Finding {
                severity: Severity::High,
                category: FindingCategory::BranchProtection,
                resource: repo.name.clone(),
                message: format!(
                    "Public repo '{}' has no branch protection on any branch.",
                    repo.name
                ),
            });
        }
    }

    for team in &state.teams {
        if team.members.is_empty() {
            findings.push(Finding {
                severity: Severity::Low,
                category: FindingCategory::Housekeeping,
                resource: team.name.clone(),
                message: format!("Team '{}' has no members (stale team?).", team.name),
            });
        }
    }

    let repos_in_teams: BTreeSet<&str> = state
        .teams
        .iter()
        .flat_map(|t| t.repos.keys().map(|r| r.as_str()))
        .collect();
    for repo in &state.repositories {
        if !repos_in_teams.contains(repo.name.as_str()) {
            findings.push(Finding {
                severity: Severity::Low,
                category: FindingCategory::Housekeeping,
                resource: repo.name.clone(),
                message: format!("Repo '{}' is not managed by any team (orphaned).", repo.name),
            });
        }
    }

    findings
}
