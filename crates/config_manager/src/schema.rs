//! Raw deserialization shapes for the configuration files.
//!
//! The desired state of an organization is authored across four YAML files
//! in a config directory:
//!
//! - `org.yml`: the organization name.
//! - `members.yml`: organization members and their roles.
//! - `teams.yml`: teams keyed by name, each with members and repository
//!   grants.
//! - `repositories.yml`: repositories keyed by name, each with settings
//!   and per-branch protection rules.
//!
//! These types mirror the file layout one-to-one. Enum-valued fields
//! (roles, privacy, permission, visibility) deserialize directly into the
//! closed domain enums, so an out-of-range value is rejected at parse time
//! with a precise serde error rather than surfacing later as a bad string.
//! Mapping-valued sections use `BTreeMap`, which fixes the load order of
//! teams, repositories, grants, and protected branches to name order.

use github_client::{OrgRole, RepoPermission, RepoVisibility, TeamPrivacy, TeamRole};
use serde::Deserialize;
use std::collections::BTreeMap;

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;

fn default_org_role() -> OrgRole {
    OrgRole::Member
}

fn default_team_role() -> TeamRole {
    TeamRole::Member
}

fn default_privacy() -> TeamPrivacy {
    TeamPrivacy::Closed
}

fn default_visibility() -> RepoVisibility {
    RepoVisibility::Public
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_reviews() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// Shape of `org.yml`.
#[derive(Debug, Default, Deserialize)]
pub struct OrgFile {
    #[serde(default)]
    pub organization: OrgSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrgSection {
    #[serde(default)]
    pub name: String,
}

/// Shape of `members.yml`.
#[derive(Debug, Default, Deserialize)]
pub struct MembersFile {
    #[serde(default)]
    pub members: Vec<MemberEntry>,
}

#[derive(Debug, Deserialize)]
pub struct MemberEntry {
    pub username: String,
    #[serde(default = "default_org_role")]
    pub role: OrgRole,
}

/// Shape of `teams.yml`.
#[derive(Debug, Default, Deserialize)]
pub struct TeamsFile {
    #[serde(default)]
    pub teams: BTreeMap<String, TeamEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TeamEntry {
    #[serde(default)]
    pub description: String,
    /// Explicit slug override. Derived from the team name when absent.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default = "default_privacy")]
    pub privacy: TeamPrivacy,
    #[serde(default)]
    pub members: Vec<TeamMemberEntry>,
    #[serde(default)]
    pub repos: BTreeMap<String, RepoPermission>,
}

#[derive(Debug, Deserialize)]
pub struct TeamMemberEntry {
    pub username: String,
    #[serde(default = "default_team_role")]
    pub role: TeamRole,
}

/// Shape of `repositories.yml`.
#[derive(Debug, Default, Deserialize)]
pub struct RepositoriesFile {
    #[serde(default)]
    pub repositories: BTreeMap<String, RepositoryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RepositoryEntry {
    pub description: String,
    pub visibility: RepoVisibility,
    pub default_branch: String,
    pub features: FeaturesEntry,
    /// Protection rules keyed by branch name.
    pub branch_protection: BTreeMap<String, ProtectionEntry>,
}

impl Default for RepositoryEntry {
    fn default() -> Self {
        Self {
            description: String::new(),
            visibility: default_visibility(),
            default_branch: default_branch(),
            features: FeaturesEntry::default(),
            branch_protection: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FeaturesEntry {
    pub has_issues: bool,
    pub has_wiki: bool,
    pub has_projects: bool,
}

impl Default for FeaturesEntry {
    fn default() -> Self {
        Self {
            has_issues: true,
            has_wiki: false,
            has_projects: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProtectionEntry {
    pub required_reviews: u32,
    pub dismiss_stale_reviews: bool,
    pub require_status_checks: bool,
    pub required_status_contexts: Vec<String>,
    pub enforce_admins: bool,
    pub restrict_pushes: bool,
}

impl Default for ProtectionEntry {
    fn default() -> Self {
        Self {
            required_reviews: default_reviews(),
            dismiss_stale_reviews: default_true(),
            require_status_checks: false,
            required_status_contexts: Vec::new(),
            enforce_admins: false,
            restrict_pushes: false,
        }
    }
}
