//! Domain types for GitHub organization resources.
//!
//! These types represent the resource graph of an organization: members,
//! teams, team memberships, team-repository permissions, repositories, and
//! branch protection rules. The same types describe both the *desired* state
//! (built from configuration by `config_manager`) and the *actual* state
//! (built from API queries), so the reconciliation engine can diff them
//! directly.
//!
//! All enumerations are closed sum types with lowercase serde renames, so an
//! out-of-range value in configuration or in an API response fails at parse
//! time instead of flowing through the engine as an unchecked string.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// Derives a team slug from its display name the way GitHub does for simple
/// names: lowercased, spaces replaced with hyphens.
///
/// Slugs stored by GitHub can diverge from this heuristic if a team was
/// renamed after creation; callers that know the stored slug should prefer it.
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Role of a member within the organization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrgRole {
    Admin,
    Member,
}

impl OrgRole {
    /// The lowercase wire form of the role, as used by the GitHub API.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgRole::Admin => "admin",
            OrgRole::Member => "member",
        }
    }
}

impl fmt::Display for OrgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Privacy level of a team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamPrivacy {
    Closed,
    Secret,
}

impl TeamPrivacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamPrivacy::Closed => "closed",
            TeamPrivacy::Secret => "secret",
        }
    }
}

impl fmt::Display for TeamPrivacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a member within a team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    Maintainer,
    Member,
}

impl TeamRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamRole::Maintainer => "maintainer",
            TeamRole::Member => "member",
        }
    }
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission level a team holds on a repository.
///
/// Variants are declared in ascending order of privilege, so the derived
/// `Ord` matches the privilege ordering: pull < triage < push < maintain <
/// admin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoPermission {
    Pull,
    Triage,
    Push,
    Maintain,
    Admin,
}

impl RepoPermission {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoPermission::Pull => "pull",
            RepoPermission::Triage => "triage",
            RepoPermission::Push => "push",
            RepoPermission::Maintain => "maintain",
            RepoPermission::Admin => "admin",
        }
    }
}

impl fmt::Display for RepoPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility of a repository.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoVisibility {
    Public,
    Private,
}

impl RepoVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoVisibility::Public => "public",
            RepoVisibility::Private => "private",
        }
    }
}

impl fmt::Display for RepoVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A member of the organization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// GitHub username. Unique within an organization state.
    pub username: String,
    pub role: OrgRole,
}

impl Member {
    pub fn new(username: impl Into<String>, role: OrgRole) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }
}

/// A member of a team.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub username: String,
    pub role: TeamRole,
}

impl TeamMember {
    pub fn new(username: impl Into<String>, role: TeamRole) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }
}

/// A repository grant held by a team, as reported by the API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRepoGrant {
    /// Repository name (without the organization prefix).
    pub repo: String,
    pub permission: RepoPermission,
}

/// Branch protection rules for a single branch.
///
/// The engine only ever reads or reconciles protection on a repository's
/// default branch, and only for public repositories; see the diff engine for
/// the scoping rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchProtection {
    /// Branch name the rules apply to.
    pub branch: String,
    /// Required number of approving reviews before merging.
    pub required_reviews: u32,
    /// Whether stale reviews are dismissed when new commits are pushed.
    pub dismiss_stale_reviews: bool,
    /// Whether status checks are required before merging.
    pub require_status_checks: bool,
    /// Status check contexts that must pass. Only meaningful when
    /// `require_status_checks` is true.
    pub required_status_contexts: Vec<String>,
    /// Whether the rules also apply to repository administrators.
    pub enforce_admins: bool,
    /// Whether pushes to the branch are restricted.
    pub restrict_pushes: bool,
}

impl BranchProtection {
    /// Creates a protection record for `branch` with the default rule set:
    /// one required review, stale reviews dismissed, everything else off.
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            required_reviews: 1,
            dismiss_stale_reviews: true,
            require_status_checks: false,
            required_status_contexts: Vec::new(),
            enforce_admins: false,
            restrict_pushes: false,
        }
    }

    /// Builds the GitHub branch-protection API request body for these rules.
    ///
    /// The payload is reconstructed from the current field values on every
    /// call; callers must not cache it across plan replays.
    pub fn to_api_payload(&self) -> Value {
        let required_status_checks = if self.require_status_checks {
            json!({
                "strict": true,
                "contexts": self.required_status_contexts,
            })
        } else {
            Value::Null
        };

        json!({
            "required_pull_request_reviews": {
                "required_approving_review_count": self.required_reviews,
                "dismiss_stale_reviews": self.dismiss_stale_reviews,
            },
            "enforce_admins": self.enforce_admins,
            "restrictions": null,
            "required_status_checks": required_status_checks,
        })
    }
}

/// A repository in the organization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name. Unique within an organization state.
    pub name: String,
    pub description: String,
    pub visibility: RepoVisibility,
    pub default_branch: String,
    pub has_issues: bool,
    pub has_wiki: bool,
    pub has_projects: bool,
    /// Protection records, keyed by branch name.
    pub branch_protection: Vec<BranchProtection>,
}

impl Repository {
    /// Creates a public repository record named `name` with default settings:
    /// `main` default branch, issues on, wiki and projects off, no protection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            visibility: RepoVisibility::Public,
            default_branch: "main".to_string(),
            has_issues: true,
            has_wiki: false,
            has_projects: false,
            branch_protection: Vec::new(),
        }
    }
}

/// A team in the organization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Display name.
    pub name: String,
    /// Identity key of the team. Derived from the name via [`slugify`]
    /// unless explicitly supplied.
    pub slug: String,
    pub description: String,
    pub privacy: TeamPrivacy,
    pub members: Vec<TeamMember>,
    /// Repository grants, keyed by repository name. A `BTreeMap` keeps the
    /// iteration order fixed (sorted by name), which the diff engine relies
    /// on for deterministic plan output.
    pub repos: BTreeMap<String, RepoPermission>,
}

impl Team {
    /// Creates a closed team named `name` with a derived slug and no
    /// members or repository grants.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self {
            name,
            slug,
            description: String::new(),
            privacy: TeamPrivacy::Closed,
            members: Vec::new(),
            repos: BTreeMap::new(),
        }
    }
}

/// Complete state of an organization, desired or actual.
///
/// An `OrgState` is an immutable snapshot: built once per reconciliation run
/// (desired from configuration, actual from a live query) and never mutated
/// afterwards.
///
/// # Examples
///
/// ```rust
/// use github_client::{Member, OrgRole, OrgState};
///
/// let state = OrgState {
///     members: vec![Member::new("alice", OrgRole::Admin)],
///     ..OrgState::new("my-org")
/// };
/// assert!(state.get_member("alice").is_some());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgState {
    pub org_name: String,
    pub members: Vec<Member>,
    pub teams: Vec<Team>,
    pub repositories: Vec<Repository>,
}

impl OrgState {
    pub fn new(org_name: impl Into<String>) -> Self {
        Self {
            org_name: org_name.into(),
            members: Vec::new(),
            teams: Vec::new(),
            repositories: Vec::new(),
        }
    }

    pub fn get_member(&self, username: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.username == username)
    }

    pub fn get_team_by_slug(&self, slug: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.slug == slug)
    }

    pub fn get_repository(&self, name: &str) -> Option<&Repository> {
        self.repositories.iter().find(|r| r.name == name)
    }
}

/// Outcome of a single mutating operation against the GitHub API.
///
/// Every mutation reports `(success, message)`: `success` is false when the
/// API rejected the request, and the message carries the human-readable
/// detail either way. Idempotent no-ops (removing something already absent,
/// granting a role already held) report success with an informative message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationOutcome {
    pub success: bool,
    pub message: String,
}

impl MutationOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
