//! Content validation for the configuration files.
//!
//! Structural problems (bad YAML, unknown enum values) are caught by serde
//! during deserialization; this module checks the content rules that span
//! entries and files. Results split into blocking *errors* (the desired
//! state is internally inconsistent and must not be reconciled) and advisory
//! *warnings* (the configuration is usable but worth a second look).

use std::collections::BTreeSet;

use github_client::RepoVisibility;

use crate::schema::{MembersFile, RepositoriesFile, TeamsFile};

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;

/// Runs all validations. Returns `(errors, warnings)`.
pub fn validate_all(
    members: &MembersFile,
    teams: &TeamsFile,
    repositories: &RepositoriesFile,
) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();

    errors.extend(validate_members(members));
    errors.extend(validate_teams(teams));

    let (xref_errors, warnings) = validate_cross_references(members, teams, repositories);
    errors.extend(xref_errors);

    (errors, warnings)
}

/// Checks `members.yml` content: usernames must be unique.
fn validate_members(members: &MembersFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = BTreeSet::new();
    for member in &members.members {
        if !seen.insert(member.username.as_str()) {
            errors.push(format!(
                "[members] Duplicate username: {}",
                member.username
            ));
        }
    }
    errors
}

/// Checks `teams.yml` content: a username may appear at most once per team.
fn validate_teams(teams: &TeamsFile) -> Vec<String> {
    let mut errors = Vec::new();
    for (team_name, team) in &teams.teams {
        let mut seen = BTreeSet::new();
        for member in &team.members {
            if !seen.insert(member.username.as_str()) {
                errors.push(format!(
                    "[teams] Duplicate member '{}' in team '{}'",
                    member.username, team_name
                ));
            }
        }
    }
    errors
}

/// Checks referential integrity across the config files.
///
/// Returns `(errors, warnings)`:
/// - a team member missing from `members.yml` is an error;
/// - a team repo not managed in `repositories.yml` is a warning (it may be
///   externally managed);
/// - branch protection configured on a private repository is a warning (the
///   engine will skip those rules);
/// - a member assigned to no team is a warning.
fn validate_cross_references(
    members: &MembersFile,
    teams: &TeamsFile,
    repositories: &RepositoriesFile,
) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let member_usernames: BTreeSet<&str> = members
        .members
        .iter()
        .map(|m| m.username.as_str())
        .collect();

    for (team_name, team) in &teams.teams {
        for member in &team.members {
            if !member_usernames.contains(member.username.as_str()) {
                errors.push(format!(
                    "Team '{}' references member '{}' who is not in members.yml",
                    team_name, member.username
                ));
            }
        }

        for repo_name in team.repos.keys() {
            if !repositories.repositories.contains_key(repo_name) {
                warnings.push(format!(
                    "Team '{team_name}' references repo '{repo_name}' which is not managed \
                     in repositories.yml (may be externally managed)"
                ));
            }
        }
    }

    for (repo_name, repo) in &repositories.repositories {
        if repo.visibility == RepoVisibility::Private && !repo.branch_protection.is_empty() {
            warnings.push(format!(
                "Repository '{repo_name}' is private but has branch protection rules. \
                 Branch protection requires a paid plan for private repos; \
                 these rules will be skipped."
            ));
        }
    }

    let mut members_in_teams = BTreeSet::new();
    for team in teams.teams.values() {
        for member in &team.members {
            members_in_teams.insert(member.username.as_str());
        }
    }
    for username in member_usernames.difference(&members_in_teams) {
        warnings.push(format!("Member '{username}' is not assigned to any team"));
    }

    (errors, warnings)
}
