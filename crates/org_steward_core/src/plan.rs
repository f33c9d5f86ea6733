//! Plan and result types for organization reconciliation.
//!
//! A [`SyncPlan`] is the inspectable set of mutations that would move the
//! actual state of an organization toward the desired state. Each
//! [`SyncAction`] pairs a closed [`ActionKind`] (with a kind-specific typed
//! payload) with the execution bookkeeping the plan executor fills in.
//!
//! Derived views over a plan (sorted order, add/change/remove buckets, the
//! summary line, the structural serialization) are pure functions of the
//! action list, computed on demand so they can never go stale.

use chrono::{SecondsFormat, Utc};
use github_client::{
    BranchProtection, OrgRole, RepoPermission, RepositorySettingsUpdate, TeamPrivacy, TeamRole,
};
use serde::Serialize;
use serde_json::{json, Map, Value};

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;

/// A recorded change of one field, carrying both sides of the transition.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldChange<T> {
    pub from: T,
    pub to: T,
}

/// The closed set of mutations the engine knows how to apply.
///
/// Each variant carries exactly the payload its mutation needs, so a
/// missing detail is unrepresentable. `RepoUpdate` and
/// `BranchProtectionDelete` are executable kinds that the diff engine never
/// emits; they exist for externally-constructed plans.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionKind {
    /// Invite a user to the organization with the given role.
    MemberInvite { role: OrgRole },
    /// Remove a user from the organization.
    MemberRemove,
    /// Change an existing member's organization role.
    MemberUpdateRole { from: OrgRole, to: OrgRole },
    /// Create a team.
    TeamCreate {
        description: String,
        privacy: TeamPrivacy,
    },
    /// Update a team's description and/or privacy. Only changed fields are
    /// carried. `slug` is the stored team slug when one was captured at
    /// diff time; when absent the executor recomputes it heuristically
    /// from the resource name.
    TeamUpdate {
        slug: Option<String>,
        description: Option<FieldChange<String>>,
        privacy: Option<FieldChange<TeamPrivacy>>,
    },
    /// Delete a team. Same slug semantics as [`ActionKind::TeamUpdate`].
    TeamDelete { slug: Option<String> },
    /// Add a user to a team with the given role.
    TeamMemberAdd {
        team_slug: String,
        username: String,
        role: TeamRole,
    },
    /// Remove a user from a team.
    TeamMemberRemove {
        team_slug: String,
        username: String,
    },
    /// Change a team member's role.
    TeamMemberUpdateRole {
        team_slug: String,
        username: String,
        from: TeamRole,
        to: TeamRole,
    },
    /// Grant a repository to a team.
    TeamRepoAdd {
        team_slug: String,
        repo: String,
        permission: RepoPermission,
    },
    /// Revoke a team's access to a repository.
    TeamRepoRemove { team_slug: String, repo: String },
    /// Change the permission level of an existing grant.
    TeamRepoUpdate {
        team_slug: String,
        repo: String,
        from: RepoPermission,
        to: RepoPermission,
    },
    /// Update repository settings.
    RepoUpdate { settings: RepositorySettingsUpdate },
    /// Set branch protection rules. Covers both create and update; the
    /// full desired rule set rides in the payload.
    BranchProtectionSet {
        branch: String,
        rules: BranchProtection,
    },
    /// Remove branch protection from a branch.
    BranchProtectionDelete { branch: String },
}

impl ActionKind {
    /// The snake_case wire name of the kind, used in serialized plans and
    /// audit records.
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::MemberInvite { .. } => "member_invite",
            ActionKind::MemberRemove => "member_remove",
            ActionKind::MemberUpdateRole { .. } => "member_update_role",
            ActionKind::TeamCreate { .. } => "team_create",
            ActionKind::TeamUpdate { .. } => "team_update",
            ActionKind::TeamDelete { .. } => "team_delete",
            ActionKind::TeamMemberAdd { .. } => "team_member_add",
            ActionKind::TeamMemberRemove { .. } => "team_member_remove",
            ActionKind::TeamMemberUpdateRole { .. } => "team_member_update_role",
            ActionKind::TeamRepoAdd { .. } => "team_repo_add",
            ActionKind::TeamRepoRemove { .. } => "team_repo_remove",
            ActionKind::TeamRepoUpdate { .. } => "team_repo_update",
            ActionKind::RepoUpdate { .. } => "repo_update",
            ActionKind::BranchProtectionSet { .. } => "branch_protection_set",
            ActionKind::BranchProtectionDelete { .. } => "branch_protection_delete",
        }
    }

    /// The priority band the kind executes in. Lower runs earlier.
    ///
    /// Additive actions come before updates, which come before destructive
    /// actions, so access is never revoked before its replacement exists
    /// and teams exist before their memberships and grants are attempted.
    pub fn priority(&self) -> u8 {
        match self {
            ActionKind::MemberInvite { .. } => 1,
            ActionKind::TeamCreate { .. } | ActionKind::TeamUpdate { .. } => 2,
            ActionKind::TeamMemberAdd { .. }
            | ActionKind::TeamMemberRemove { .. }
            | ActionKind::TeamMemberUpdateRole { .. } => 3,
            ActionKind::TeamRepoAdd { .. }
            | ActionKind::TeamRepoRemove { .. }
            | ActionKind::TeamRepoUpdate { .. } => 4,
            ActionKind::RepoUpdate { .. }
            | ActionKind::BranchProtectionSet { .. }
            | ActionKind::BranchProtectionDelete { .. } => 5,
            ActionKind::MemberUpdateRole { .. } => 6,
            ActionKind::MemberRemove => 7,
            ActionKind::TeamDelete { .. } => 8,
        }
    }

    /// Terraform-style symbol for plan output.
    pub fn symbol(&self) -> char {
        match self {
            ActionKind::MemberInvite { .. }
            | ActionKind::TeamCreate { .. }
            | ActionKind::TeamMemberAdd { .. }
            | ActionKind::TeamRepoAdd { .. }
            | ActionKind::BranchProtectionSet { .. } => '+',
            ActionKind::MemberUpdateRole { .. }
            | ActionKind::TeamUpdate { .. }
            | ActionKind::TeamMemberUpdateRole { .. }
            | ActionKind::TeamRepoUpdate { .. }
            | ActionKind::RepoUpdate { .. } => '~',
            ActionKind::MemberRemove
            | ActionKind::TeamDelete { .. }
            | ActionKind::TeamMemberRemove { .. }
            | ActionKind::TeamRepoRemove { .. }
            | ActionKind::BranchProtectionDelete { .. } => '-',
        }
    }

    /// The structured details map for serialized plans and audit records.
    pub fn details(&self) -> Value {
        match self {
            ActionKind::MemberInvite { role } => json!({ "role": role }),
            ActionKind::MemberRemove => json!({}),
            ActionKind::MemberUpdateRole { from, to } => json!({ "from": from, "to": to }),
            ActionKind::TeamCreate {
                description,
                privacy,
            } => json!({ "description": description, "privacy": privacy }),
            ActionKind::TeamUpdate {
                slug,
                description,
                privacy,
            } => {
                let mut details = Map::new();
                if let Some(slug) = slug {
                    details.insert("slug".to_string(), json!(slug));
                }
                if let Some(change) = description {
                    details.insert("description".to_string(), json!(change));
                }
                if let Some(change) = privacy {
                    details.insert("privacy".to_string(), json!(change));
                }
                Value::Object(details)
            }
            ActionKind::TeamDelete { slug } => match slug {
                Some(slug) => json!({ "slug": slug }),
                None => json!({}),
            },
            ActionKind::TeamMemberAdd {
                team_slug,
                username,
                role,
            } => json!({ "username": username, "role": role, "team_slug": team_slug }),
            ActionKind::TeamMemberRemove {
                team_slug,
                username,
            } => json!({ "username": username, "team_slug": team_slug }),
            ActionKind::TeamMemberUpdateRole {
                team_slug,
                username,
                from,
                to,
            } => json!({
                "username": username,
                "team_slug": team_slug,
                "from": from,
                "to": to,
            }),
            ActionKind::TeamRepoAdd {
                team_slug,
                repo,
                permission,
            } => json!({ "repo": repo, "permission": permission, "team_slug": team_slug }),
            ActionKind::TeamRepoRemove { team_slug, repo } => {
                json!({ "repo": repo, "team_slug": team_slug })
            }
            ActionKind::TeamRepoUpdate {
                team_slug,
                repo,
                from,
                to,
            } => json!({
                "repo": repo,
                "team_slug": team_slug,
                "from": from,
                "to": to,
            }),
            ActionKind::RepoUpdate { settings } => json!({ "settings": settings }),
            ActionKind::BranchProtectionSet { branch, rules } => {
                json!({ "branch": branch, "rules": rules })
            }
            ActionKind::BranchProtectionDelete { branch } => json!({ "branch": branch }),
        }
    }
}

/// Execution status of a single action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Pending,
    Success,
    Failed,
    Skipped,
}

impl ActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Pending => "pending",
            ActionStatus::Success => "success",
            ActionStatus::Failed => "failed",
            ActionStatus::Skipped => "skipped",
        }
    }
}

/// A single action to reconcile desired vs actual state.
#[derive(Clone, Debug, PartialEq)]
pub struct SyncAction {
    pub kind: ActionKind,
    /// Display name of the primary subject (username, team name, or
    /// repository name, depending on the kind).
    pub resource: String,
    /// Execution priority, fixed by the kind at construction.
    pub priority: u8,
    pub status: ActionStatus,
    pub message: String,
    pub error: String,
}

impl SyncAction {
    pub fn new(kind: ActionKind, resource: impl Into<String>) -> Self {
        let priority = kind.priority();
        Self {
            kind,
            resource: resource.into(),
            priority,
            status: ActionStatus::Pending,
            message: String::new(),
            error: String::new(),
        }
    }

    pub fn symbol(&self) -> char {
        self.kind.symbol()
    }

    /// Human-readable description of the action.
    pub fn description(&self) -> String {
        let resource = &self.resource;
        match &self.kind {
            ActionKind::MemberInvite { role } => {
                format!("Invite `{resource}` as `{role}`")
            }
            ActionKind::MemberRemove => format!("Remove `{resource}` from organization"),
            ActionKind::MemberUpdateRole { from, to } => {
                format!("Update `{resource}` role: `{from}` → `{to}`")
            }
            ActionKind::TeamCreate { privacy, .. } => {
                format!("Create team `{resource}` ({privacy})")
            }
            ActionKind::TeamUpdate { .. } => format!("Update team `{resource}`"),
            ActionKind::TeamDelete { .. } => format!("Delete team `{resource}`"),
            ActionKind::TeamMemberAdd { username, role, .. } => {
                format!("Add `{username}` to `{resource}` as `{role}`")
            }
            ActionKind::TeamMemberRemove { username, .. } => {
                format!("Remove `{username}` from `{resource}`")
            }
            ActionKind::TeamMemberUpdateRole {
                username, from, to, ..
            } => format!("Update `{username}` in `{resource}`: `{from}` → `{to}`"),
            ActionKind::TeamRepoAdd {
                repo, permission, ..
            } => format!("Grant `{resource}` → `{repo}` ({permission})"),
            ActionKind::TeamRepoRemove { repo, .. } => {
                format!("Revoke `{resource}` access to `{repo}`")
            }
            ActionKind::TeamRepoUpdate { repo, from, to, .. } => {
                format!("Update `{resource}` → `{repo}`: `{from}` → `{to}`")
            }
            ActionKind::RepoUpdate { .. } => {
                format!("Update repository `{resource}` settings")
            }
            ActionKind::BranchProtectionSet { branch, .. } => {
                format!("Set branch protection on `{resource}` / `{branch}`")
            }
            ActionKind::BranchProtectionDelete { branch } => {
                format!("Remove branch protection from `{resource}` / `{branch}`")
            }
        }
    }

    /// The structural form used by serialized plans and audit records.
    pub fn to_value(&self) -> Value {
        json!({
            "action_type": self.kind.name(),
            "resource": self.resource,
            "details": self.kind.details(),
            "priority": self.priority,
            "status": self.status,
            "message": self.message,
            "error": self.error,
        })
    }
}

/// A complete plan of actions to synchronize an organization.
///
/// A plan generated with non-empty `validation_errors` carries no actions
/// and must not be applied.
#[derive(Clone, Debug, PartialEq)]
pub struct SyncPlan {
    pub actions: Vec<SyncAction>,
    /// Generation time, RFC 3339 UTC.
    pub timestamp: String,
    pub org_name: String,
    /// Blocking problems in the desired state. Non-empty means: do not
    /// apply.
    pub validation_errors: Vec<String>,
    /// Advisory notes that never block generation or application.
    pub warnings: Vec<String>,
}

impl SyncPlan {
    pub fn new(org_name: impl Into<String>) -> Self {
        Self {
            actions: Vec::new(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            org_name: org_name.into(),
            validation_errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Actions in execution order: a stable sort by priority, so actions
    /// within a band keep the order the diff engine emitted them in.
    pub fn sorted_actions(&self) -> Vec<&SyncAction> {
        let mut sorted: Vec<&SyncAction> = self.actions.iter().collect();
        sorted.sort_by_key(|a| a.priority);
        sorted
    }

    /// Actions that create something.
    pub fn adds(&self) -> Vec<&SyncAction> {
        self.actions.iter().filter(|a| a.symbol() == '+').collect()
    }

    /// Actions that change something in place.
    pub fn updates(&self) -> Vec<&SyncAction> {
        self.actions.iter().filter(|a| a.symbol() == '~').collect()
    }

    /// Actions that remove something.
    pub fn removes(&self) -> Vec<&SyncAction> {
        self.actions.iter().filter(|a| a.symbol() == '-').collect()
    }

    pub fn has_changes(&self) -> bool {
        !self.actions.is_empty()
    }

    /// One mutating API call per action.
    pub fn estimated_api_calls(&self) -> usize {
        self.actions.len()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} to add, {} to change, {} to remove",
            self.adds().len(),
            self.updates().len(),
            self.removes().len()
        )
    }

    /// The structural serialization of the plan: the audit-record schema
    /// and the machine-readable plan output every renderer builds on.
    pub fn to_value(&self) -> Value {
        json!({
            "timestamp": self.timestamp,
            "org_name": self.org_name,
            "summary": self.summary(),
            "has_changes": self.has_changes(),
            "estimated_api_calls": self.estimated_api_calls(),
            "validation_errors": self.validation_errors,
            "warnings": self.warnings,
            "actions": self.sorted_actions().iter().map(|a| a.to_value()).collect::<Vec<_>>(),
        })
    }
}

/// Result of executing a sync plan.
///
/// Owns the plan it executed; a plan is exclusively owned by the single
/// apply call operating on it.
#[derive(Clone, Debug, PartialEq)]
pub struct SyncResult {
    pub plan: SyncPlan,
    /// Execution time, RFC 3339 UTC.
    pub executed_at: String,
    pub dry_run: bool,
    pub success_count: usize,
    pub failure_count: usize,
    pub skipped_count: usize,
}

impl SyncResult {
    pub fn new(plan: SyncPlan, dry_run: bool) -> Self {
        Self {
            plan,
            executed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            dry_run,
            success_count: 0,
            failure_count: 0,
            skipped_count: 0,
        }
    }

    /// A run succeeded when no action failed. "Nothing to do" and "applied
    /// cleanly" are both success.
    pub fn success(&self) -> bool {
        self.failure_count == 0
    }

    pub fn to_value(&self) -> Value {
        json!({
            "executed_at": self.executed_at,
            "dry_run": self.dry_run,
            "success": self.success(),
            "success_count": self.success_count,
            "failure_count": self.failure_count,
            "skipped_count": self.skipped_count,
            "plan": self.plan.to_value(),
        })
    }
}
