//! Desired-state loading.
//!
//! Reads the four configuration files from a config directory, runs content
//! validation, and assembles the desired [`OrgState`]. Teams, repositories,
//! team repository grants, and protected branches load in name order (the
//! files key them by name); members load in file order. The diff engine
//! inherits this order, which keeps generated plans deterministic.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{info, instrument};

use github_client::{
    slugify, BranchProtection, Member, OrgState, Repository, Team, TeamMember,
};

use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::schema::{
    MembersFile, OrgFile, ProtectionEntry, RepositoriesFile, RepositoryEntry, TeamEntry,
    TeamsFile,
};
use crate::validator::validate_all;

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

/// The outcome of loading a config directory: the desired state plus the
/// validation messages that apply to it.
///
/// A non-empty `errors` list means the desired state is internally
/// inconsistent; callers must not generate or apply a plan from it.
/// Warnings are advisory and ride along with the plan.
#[derive(Debug)]
pub struct LoadedConfig {
    pub state: OrgState,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Loads and validates the desired state from `config_dir`.
///
/// # Errors
///
/// Returns a [`ConfigurationError`] when a file is missing, unreadable, or
/// not parseable. Content-level problems (duplicates, dangling references)
/// are reported through [`LoadedConfig::errors`] instead, so every problem
/// can be surfaced in one pass.
#[instrument(skip(config_dir), fields(config_dir = %config_dir.as_ref().display()))]
pub fn load_config(config_dir: impl AsRef<Path>) -> ConfigurationResult<LoadedConfig> {
    let config_dir = config_dir.as_ref();
    info!(config_dir = %config_dir.display(), "Loading configuration");

    let org: OrgFile = load_yaml_file(&config_dir.join("org.yml"))?;
    let org_name = org.organization.name;
    if org_name.is_empty() {
        return Ok(LoadedConfig {
            state: OrgState::new(""),
            errors: vec!["Organization name not set in org.yml".to_string()],
            warnings: Vec::new(),
        });
    }

    let members_file: MembersFile = load_yaml_file(&config_dir.join("members.yml"))?;
    let teams_file: TeamsFile = load_yaml_file(&config_dir.join("teams.yml"))?;
    let repositories_file: RepositoriesFile =
        load_yaml_file(&config_dir.join("repositories.yml"))?;

    let (errors, warnings) = validate_all(&members_file, &teams_file, &repositories_file);

    let state = OrgState {
        org_name,
        members: members_file
            .members
            .into_iter()
            .map(|m| Member::new(m.username, m.role))
            .collect(),
        teams: teams_file
            .teams
            .into_iter()
            .map(|(name, entry)| build_team(name, entry))
            .collect(),
        repositories: repositories_file
            .repositories
            .into_iter()
            .map(|(name, entry)| build_repository(name, entry))
            .collect(),
    };

    info!(
        members = state.members.len(),
        teams = state.teams.len(),
        repositories = state.repositories.len(),
        "Config loaded"
    );

    Ok(LoadedConfig {
        state,
        errors,
        warnings,
    })
}

fn build_team(name: String, entry: TeamEntry) -> Team {
    let slug = entry.slug.unwrap_or_else(|| slugify(&name));
    Team {
        name,
        slug,
        description: entry.description,
        privacy: entry.privacy,
        members: entry
            .members
            .into_iter()
            .map(|m| TeamMember::new(m.username, m.role))
            .collect(),
        repos: entry.repos,
    }
}

fn build_repository(name: String, entry: RepositoryEntry) -> Repository {
    Repository {
        name,
        description: entry.description,
        visibility: entry.visibility,
        default_branch: entry.default_branch,
        has_issues: entry.features.has_issues,
        has_wiki: entry.features.has_wiki,
        has_projects: entry.features.has_projects,
        branch_protection: entry
            .branch_protection
            .into_iter()
            .map(|(branch, rules)| build_protection(branch, rules))
            .collect(),
    }
}

fn build_protection(branch: String, entry: ProtectionEntry) -> BranchProtection {
    BranchProtection {
        branch,
        required_reviews: entry.required_reviews,
        dismiss_stale_reviews: entry.dismiss_stale_reviews,
        require_status_checks: entry.require_status_checks,
        required_status_contexts: entry.required_status_contexts,
        enforce_admins: entry.enforce_admins,
        restrict_pushes: entry.restrict_pushes,
    }
}

/// Reads and parses one YAML file. An empty file parses as the type's
/// default (all sections absent).
fn load_yaml_file<T>(path: &Path) -> ConfigurationResult<T>
where
    T: DeserializeOwned + Default,
{
    let display_path = path.display().to_string();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigurationError::FileNotFound { path: display_path.clone() }
        } else {
            ConfigurationError::FileAccessError {
                path: display_path.clone(),
                reason: e.to_string(),
            }
        }
    })?;

    if contents.trim().is_empty() {
        return Ok(T::default());
    }

    serde_yaml::from_str(&contents).map_err(|e| ConfigurationError::ParseError {
        path: display_path,
        reason: e.to_string(),
    })
}
