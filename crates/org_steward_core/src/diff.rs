//! The state diff engine.
//!
//! [`diff`] compares a desired and an actual [`OrgState`] and produces the
//! ordered [`SyncPlan`] that would bring the actual state into alignment.
//! The function is pure: no I/O, no mutation of its inputs, and for a given
//! pair of states the emitted action list is always the same. Desired-state
//! collections are iterated in the order the config collaborator supplied
//! them (members, teams, and repositories in load order; a team's
//! repository grants in name order), which makes tie-breaking within a
//! priority band deterministic.
//!
//! Each resource category diffs independently; priorities sequence the
//! result so that creation precedes membership, membership precedes
//! grants, and every destructive action runs after the additive ones.

use std::collections::{BTreeSet, HashMap};

use tracing::info;

use github_client::{BranchProtection, OrgState, RepoVisibility};

use crate::plan::{ActionKind, FieldChange, SyncAction, SyncPlan};

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;

/// Compares desired and actual state and produces an ordered action plan.
pub fn diff(desired: &OrgState, actual: &OrgState) -> SyncPlan {
    let mut plan = SyncPlan::new(desired.org_name.clone());

    diff_members(desired, actual, &mut plan);
    diff_teams(desired, actual, &mut plan);
    diff_team_memberships(desired, actual, &mut plan);
    diff_team_repos(desired, actual, &mut plan);
    diff_branch_protection(desired, actual, &mut plan);

    info!(summary = %plan.summary(), "Plan generated");
    plan
}

/// Diffs org members: invite, remove, or update roles.
fn diff_members(desired: &OrgState, actual: &OrgState, plan: &mut SyncPlan) {
    let actual_roles: HashMap<&str, _> = actual
        .members
        .iter()
        .map(|m| (m.username.as_str(), m.role))
        .collect();
    let desired_usernames: BTreeSet<&str> =
        desired.members.iter().map(|m| m.username.as_str()).collect();

    for member in &desired.members {
        if !actual_roles.contains_key(member.username.as_str()) {
            plan.actions.push(SyncAction::new(
                ActionKind::MemberInvite { role: member.role },
                member.username.clone(),
            ));
        }
    }

    for member in &actual.members {
        if !desired_usernames.contains(member.username.as_str()) {
            plan.actions.push(SyncAction::new(
                ActionKind::MemberRemove,
                member.username.clone(),
            ));
        }
    }

    for member in &desired.members {
        if let Some(&actual_role) = actual_roles.get(member.username.as_str()) {
            if member.role != actual_role {
                plan.actions.push(SyncAction::new(
                    ActionKind::MemberUpdateRole {
                        from: actual_role,
                        to: member.role,
                    },
                    member.username.clone(),
                ));
            }
        }
    }
}

/// Diffs teams: create, delete, or update description/privacy.
fn diff_teams(desired: &OrgState, actual: &OrgState, plan: &mut SyncPlan) {
    let actual_by_slug: HashMap<&str, _> =
        actual.teams.iter().map(|t| (t.slug.as_str(), t)).collect();
    let desired_slugs: BTreeSet<&str> = desired.teams.iter().map(|t| t.slug.as_str()).collect();

    for team in &desired.teams {
        if !actual_by_slug.contains_key(team.slug.as_str()) {
            plan.actions.push(SyncAction::new(
                ActionKind::TeamCreate {
                    description: team.description.clone(),
                    privacy: team.privacy,
                },
                team.name.clone(),
            ));
        }
    }

    for team in &actual.teams {
        if !desired_slugs.contains(team.slug.as_str()) {
            plan.actions.push(SyncAction::new(
                ActionKind::TeamDelete {
                    slug: Some(team.slug.clone()),
                },
                team.name.clone(),
            ));
            plan.warnings.push(format!(
                "Team '{}' will be deleted. This removes all team permissions.",
                team.name
            ));
        }
    }

    for team in &desired.teams {
        if let Some(actual_team) = actual_by_slug.get(team.slug.as_str()) {
            let description = (team.description != actual_team.description).then(|| FieldChange {
                from: actual_team.description.clone(),
                to: team.description.clone(),
            });
            let privacy = (team.privacy != actual_team.privacy).then(|| FieldChange {
                from: actual_team.privacy,
                to: team.privacy,
            });
            if description.is_some() || privacy.is_some() {
                // No slug is captured here; the executor falls back to the
                // heuristic slug derived from the team name.
                plan.actions.push(SyncAction::new(
                    ActionKind::TeamUpdate {
                        slug: None,
                        description,
                        privacy,
                    },
                    team.name.clone(),
                ));
            }
        }
    }
}

/// Diffs team memberships, scoped per desired team.
///
/// A team absent from the actual state diffs against an empty membership
/// set: every desired member becomes an add, nothing becomes a remove.
/// Teams present only in the actual state are not diffed here; their
/// deletion subsumes the memberships.
fn diff_team_memberships(desired: &OrgState, actual: &OrgState, plan: &mut SyncPlan) {
    for team in &desired.teams {
        let actual_members: HashMap<&str, _> = actual
            .get_team_by_slug(&team.slug)
            .map(|t| {
                t.members
                    .iter()
                    .map(|m| (m.username.as_str(), m.role))
                    .collect()
            })
            .unwrap_or_default();
        let desired_usernames: BTreeSet<&str> =
            team.members.iter().map(|m| m.username.as_str()).collect();

        for member in &team.members {
            if !actual_members.contains_key(member.username.as_str()) {
                plan.actions.push(SyncAction::new(
                    ActionKind::TeamMemberAdd {
                        team_slug: team.slug.clone(),
                        username: member.username.clone(),
                        role: member.role,
                    },
                    team.name.clone(),
                ));
            }
        }

        if let Some(actual_team) = actual.get_team_by_slug(&team.slug) {
            for member in &actual_team.members {
                if !desired_usernames.contains(member.username.as_str()) {
                    plan.actions.push(SyncAction::new(
                        ActionKind::TeamMemberRemove {
                            team_slug: team.slug.clone(),
                            username: member.username.clone(),
                        },
                        team.name.clone(),
                    ));
                }
            }
        }

        for member in &team.members {
            if let Some(&actual_role) = actual_members.get(member.username.as_str()) {
                if member.role != actual_role {
                    plan.actions.push(SyncAction::new(
                        ActionKind::TeamMemberUpdateRole {
                            team_slug: team.slug.clone(),
                            username: member.username.clone(),
                            from: actual_role,
                            to: member.role,
                        },
                        team.name.clone(),
                    ));
                }
            }
        }
    }
}

/// Diffs team-repository permissions, with the same per-desired-team
/// scoping as membership diffing.
fn diff_team_repos(desired: &OrgState, actual: &OrgState, plan: &mut SyncPlan) {
    for team in &desired.teams {
        let actual_repos = actual
            .get_team_by_slug(&team.slug)
            .map(|t| t.repos.clone())
            .unwrap_or_default();

        for (repo_name, &permission) in &team.repos {
            match actual_repos.get(repo_name) {
                None => {
                    plan.actions.push(SyncAction::new(
                        ActionKind::TeamRepoAdd {
                            team_slug: team.slug.clone(),
                            repo: repo_name.clone(),
                            permission,
                        },
                        team.name.clone(),
                    ));
                }
                Some(&actual_permission) if actual_permission != permission => {
                    plan.actions.push(SyncAction::new(
                        ActionKind::TeamRepoUpdate {
                            team_slug: team.slug.clone(),
                            repo: repo_name.clone(),
                            from: actual_permission,
                            to: permission,
                        },
                        team.name.clone(),
                    ));
                }
                Some(_) => {}
            }
        }

        for repo_name in actual_repos.keys() {
            if !team.repos.contains_key(repo_name) {
                plan.actions.push(SyncAction::new(
                    ActionKind::TeamRepoRemove {
                        team_slug: team.slug.clone(),
                        repo: repo_name.clone(),
                    },
                    team.name.clone(),
                ));
            }
        }
    }
}

/// Diffs branch protection rules. Public repositories only: protection on a
/// private repository is outside the engine's authority and produces a
/// warning, not an action.
fn diff_branch_protection(desired: &OrgState, actual: &OrgState, plan: &mut SyncPlan) {
    for repo in &desired.repositories {
        if repo.visibility != RepoVisibility::Public {
            if !repo.branch_protection.is_empty() {
                plan.warnings.push(format!(
                    "Skipping branch protection for private repo '{}' (requires paid plan)",
                    repo.name
                ));
            }
            continue;
        }

        let actual_rules: HashMap<&str, &BranchProtection> = actual
            .get_repository(&repo.name)
            .map(|r| {
                r.branch_protection
                    .iter()
                    .map(|bp| (bp.branch.as_str(), bp))
                    .collect()
            })
            .unwrap_or_default();

        for protection in &repo.branch_protection {
            let needs_set = match actual_rules.get(protection.branch.as_str()) {
                None => true,
                Some(actual_protection) => protection_differs(protection, actual_protection),
            };
            if needs_set {
                plan.actions.push(SyncAction::new(
                    ActionKind::BranchProtectionSet {
                        branch: protection.branch.clone(),
                        rules: protection.clone(),
                    },
                    repo.name.clone(),
                ));
            }
        }
    }
}

/// Field-wise comparison of two protection records. The set of required
/// status contexts compares order-insensitively.
fn protection_differs(a: &BranchProtection, b: &BranchProtection) -> bool {
    let a_contexts: BTreeSet<&str> = a.required_status_contexts.iter().map(|s| s.as_str()).collect();
    let b_contexts: BTreeSet<&str> = b.required_status_contexts.iter().map(|s| s.as_str()).collect();

    a.required_reviews != b.required_reviews
        || a.dismiss_stale_reviews != b.dismiss_stale_reviews
        || a.require_status_checks != b.require_status_checks
        || a.enforce_admins != b.enforce_admins
        || a.restrict_pushes != b.restrict_pushes
        || a_contexts != b_contexts
}
