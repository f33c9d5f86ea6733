//! Tests for the diff engine.

use super::*;
use github_client::{
    Member, OrgRole, RepoPermission, Repository, Team, TeamMember, TeamRole,
};
use crate::plan::ActionKind;

fn org(members: Vec<Member>, teams: Vec<Team>, repositories: Vec<Repository>) -> OrgState {
    OrgState {
        members,
        teams,
        repositories,
        ..OrgState::new("test-org")
    }
}

fn empty_org() -> OrgState {
    OrgState::new("test-org")
}

fn kind_count(plan: &SyncPlan, name: &str) -> usize {
    plan.actions
        .iter()
        .filter(|a| a.kind.name() == name)
        .count()
}

// --- Members ---------------------------------------------------------------

#[test]
fn test_new_member_detected() {
    let desired = org(vec![Member::new("alice", OrgRole::Admin)], vec![], vec![]);
    let plan = diff(&desired, &empty_org());

    assert_eq!(plan.actions.len(), 1);
    let action = &plan.actions[0];
    assert_eq!(action.kind, ActionKind::MemberInvite { role: OrgRole::Admin });
    assert_eq!(action.resource, "alice");
    assert_eq!(action.priority, 1);
    assert_eq!(plan.summary(), "1 to add, 0 to change, 0 to remove");
}

#[test]
fn test_removed_member_detected() {
    let actual = org(vec![Member::new("alice", OrgRole::Member)], vec![], vec![]);
    let plan = diff(&empty_org(), &actual);

    assert_eq!(plan.actions.len(), 1);
    assert_eq!(plan.actions[0].kind, ActionKind::MemberRemove);
    assert_eq!(plan.actions[0].priority, 7);
}

#[test]
fn test_role_change_detected() {
    let desired = org(vec![Member::new("alice", OrgRole::Member)], vec![], vec![]);
    let actual = org(vec![Member::new("alice", OrgRole::Admin)], vec![], vec![]);
    let plan = diff(&desired, &actual);

    assert_eq!(plan.actions.len(), 1);
    assert_eq!(
        plan.actions[0].kind,
        ActionKind::MemberUpdateRole {
            from: OrgRole::Admin,
            to: OrgRole::Member,
        }
    );
}

#[test]
fn test_no_member_change_when_in_sync() {
    let members = vec![Member::new("alice", OrgRole::Admin)];
    let desired = org(members.clone(), vec![], vec![]);
    let actual = org(members, vec![], vec![]);
    let plan = diff(&desired, &actual);

    assert!(plan.actions.is_empty());
}

// --- Teams -----------------------------------------------------------------

#[test]
fn test_new_team_detected() {
    let desired = org(
        vec![],
        vec![Team {
            description: "Backend team".to_string(),
            ..Team::new("backend")
        }],
        vec![],
    );
    let plan = diff(&desired, &empty_org());

    assert_eq!(kind_count(&plan, "team_create"), 1);
    assert_eq!(plan.actions[0].resource, "backend");
    assert_eq!(plan.actions[0].priority, 2);
}

#[test]
fn test_deleted_team_detected_with_warning() {
    let actual = org(vec![], vec![Team::new("old-team")], vec![]);
    let plan = diff(&empty_org(), &actual);

    assert_eq!(kind_count(&plan, "team_delete"), 1);
    assert_eq!(plan.actions[0].priority, 8);
    assert_eq!(
        plan.actions[0].kind,
        ActionKind::TeamDelete {
            slug: Some("old-team".to_string()),
        }
    );
    assert!(plan
        .warnings
        .iter()
        .any(|w| w.contains("old-team") && w.contains("deleted")));
}

#[test]
fn test_team_description_update_carries_only_changed_fields() {
    let desired = org(
        vec![],
        vec![Team {
            description: "Updated desc".to_string(),
            ..Team::new("backend")
        }],
        vec![],
    );
    let actual = org(
        vec![],
        vec![Team {
            description: "Old desc".to_string(),
            ..Team::new("backend")
        }],
        vec![],
    );
    let plan = diff(&desired, &actual);

    assert_eq!(plan.actions.len(), 1);
    match &plan.actions[0].kind {
        ActionKind::TeamUpdate {
            slug,
            description,
            privacy,
        } => {
            assert!(slug.is_none());
            let change = description.as_ref().expect("description change");
            assert_eq!(change.from, "Old desc");
            assert_eq!(change.to, "Updated desc");
            assert!(privacy.is_none());
        }
        other => panic!("expected TeamUpdate, got {other:?}"),
    }
}

// --- Team membership -------------------------------------------------------

#[test]
fn test_new_team_member() {
    let desired = org(
        vec![],
        vec![Team {
            members: vec![TeamMember::new("alice", TeamRole::Maintainer)],
            ..Team::new("backend")
        }],
        vec![],
    );
    let actual = org(vec![], vec![Team::new("backend")], vec![]);
    let plan = diff(&desired, &actual);

    assert_eq!(plan.actions.len(), 1);
    assert_eq!(
        plan.actions[0].kind,
        ActionKind::TeamMemberAdd {
            team_slug: "backend".to_string(),
            username: "alice".to_string(),
            role: TeamRole::Maintainer,
        }
    );
}

#[test]
fn test_removed_team_member() {
    let desired = org(vec![], vec![Team::new("backend")], vec![]);
    let actual = org(
        vec![],
        vec![Team {
            members: vec![TeamMember::new("alice", TeamRole::Member)],
            ..Team::new("backend")
        }],
        vec![],
    );
    let plan = diff(&desired, &actual);

    assert_eq!(plan.actions.len(), 1);
    assert_eq!(
        plan.actions[0].kind,
        ActionKind::TeamMemberRemove {
            team_slug: "backend".to_string(),
            username: "alice".to_string(),
        }
    );
    assert_eq!(plan.actions[0].resource, "backend");
}

#[test]
fn test_team_member_role_change() {
    let desired = org(
        vec![],
        vec![Team {
            members: vec![TeamMember::new("alice", TeamRole::Maintainer)],
            ..Team::new("backend")
        }],
        vec![],
    );
    let actual = org(
        vec![],
        vec![Team {
            members: vec![TeamMember::new("alice", TeamRole::Member)],
            ..Team::new("backend")
        }],
        vec![],
    );
    let plan = diff(&desired, &actual);

    assert_eq!(plan.actions.len(), 1);
    assert_eq!(
        plan.actions[0].kind,
        ActionKind::TeamMemberUpdateRole {
            team_slug: "backend".to_string(),
            username: "alice".to_string(),
            from: TeamRole::Member,
            to: TeamRole::Maintainer,
        }
    );
}

#[test]
fn test_team_only_in_actual_is_not_membership_diffed() {
    let actual = org(
        vec![],
        vec![Team {
            members: vec![TeamMember::new("alice", TeamRole::Member)],
            ..Team::new("doomed")
        }],
        vec![],
    );
    let plan = diff(&empty_org(), &actual);

    // Deletion subsumes the membership; no independent removes.
    assert_eq!(kind_count(&plan, "team_delete"), 1);
    assert_eq!(kind_count(&plan, "team_member_remove"), 0);
}

// --- Team repositories -----------------------------------------------------

#[test]
fn test_new_team_repo() {
    let mut team = Team::new("backend");
    team.repos.insert("api".to_string(), RepoPermission::Push);
    let desired = org(vec![], vec![team], vec![]);
    let actual = org(vec![], vec![Team::new("backend")], vec![]);
    let plan = diff(&desired, &actual);

    assert_eq!(plan.actions.len(), 1);
    assert_eq!(
        plan.actions[0].kind,
        ActionKind::TeamRepoAdd {
            team_slug: "backend".to_string(),
            repo: "api".to_string(),
            permission: RepoPermission::Push,
        }
    );
    assert_eq!(plan.actions[0].priority, 4);
}

#[test]
fn test_permission_change() {
    let mut desired_team = Team::new("backend");
    desired_team
        .repos
        .insert("api".to_string(), RepoPermission::Admin);
    let mut actual_team = Team::new("backend");
    actual_team
        .repos
        .insert("api".to_string(), RepoPermission::Push);

    let plan = diff(
        &org(vec![], vec![desired_team], vec![]),
        &org(vec![], vec![actual_team], vec![]),
    );

    assert_eq!(plan.actions.len(), 1);
    assert_eq!(
        plan.actions[0].kind,
        ActionKind::TeamRepoUpdate {
            team_slug: "backend".to_string(),
            repo: "api".to_string(),
            from: RepoPermission::Push,
            to: RepoPermission::Admin,
        }
    );
}

#[test]
fn test_revoked_team_repo() {
    let mut actual_team = Team::new("backend");
    actual_team
        .repos
        .insert("api".to_string(), RepoPermission::Pull);

    let plan = diff(
        &org(vec![], vec![Team::new("backend")], vec![]),
        &org(vec![], vec![actual_team], vec![]),
    );

    assert_eq!(plan.actions.len(), 1);
    assert_eq!(
        plan.actions[0].kind,
        ActionKind::TeamRepoRemove {
            team_slug: "backend".to_string(),
            repo: "api".to_string(),
        }
    );
}

// --- Branch protection -----------------------------------------------------

#[test]
fn test_new_branch_protection() {
    let desired = org(
        vec![],
        vec![],
        vec![Repository {
            branch_protection: vec![BranchProtection::new("main")],
            ..Repository::new("api")
        }],
    );
    let actual = org(vec![], vec![], vec![Repository::new("api")]);
    let plan = diff(&desired, &actual);

    assert_eq!(kind_count(&plan, "branch_protection_set"), 1);
    assert_eq!(plan.actions[0].priority, 5);
}

#[test]
fn test_differing_branch_protection_is_reset() {
    let desired = org(
        vec![],
        vec![],
        vec![Repository {
            branch_protection: vec![BranchProtection {
                required_reviews: 2,
                ..BranchProtection::new("main")
            }],
            ..Repository::new("api")
        }],
    );
    let actual = org(
        vec![],
        vec![],
        vec![Repository {
            branch_protection: vec![BranchProtection::new("main")],
            ..Repository::new("api")
        }],
    );
    let plan = diff(&desired, &actual);

    assert_eq!(kind_count(&plan, "branch_protection_set"), 1);
    match &plan.actions[0].kind {
        ActionKind::BranchProtectionSet { rules, .. } => {
            assert_eq!(rules.required_reviews, 2);
        }
        other => panic!("expected BranchProtectionSet, got {other:?}"),
    }
}

#[test]
fn test_matching_branch_protection_emits_nothing() {
    let repo = Repository {
        branch_protection: vec![BranchProtection {
            require_status_checks: true,
            required_status_contexts: vec!["ci/a".to_string(), "ci/b".to_string()],
            ..BranchProtection::new("main")
        }],
        ..Repository::new("api")
    };
    // Same contexts in a different order still match.
    let mut actual_repo = repo.clone();
    actual_repo.branch_protection[0].required_status_contexts =
        vec!["ci/b".to_string(), "ci/a".to_string()];

    let plan = diff(
        &org(vec![], vec![], vec![repo]),
        &org(vec![], vec![], vec![actual_repo]),
    );
    assert!(plan.actions.is_empty());
}

#[test]
fn test_private_repo_skipped_with_warning() {
    let desired = org(
        vec![],
        vec![],
        vec![Repository {
            visibility: github_client::RepoVisibility::Private,
            branch_protection: vec![BranchProtection::new("main")],
            ..Repository::new("private-repo")
        }],
    );
    let plan = diff(&desired, &empty_org());

    assert_eq!(kind_count(&plan, "branch_protection_set"), 0);
    assert!(plan.warnings.iter().any(|w| w.to_lowercase().contains("private")));
    assert!(plan.warnings.iter().any(|w| w.contains("private-repo")));
}

// --- Plan-level properties -------------------------------------------------

#[test]
fn test_diff_of_identical_states_is_empty() {
    let mut team = Team::new("backend");
    team.members.push(TeamMember::new("alice", TeamRole::Member));
    team.repos.insert("api".to_string(), RepoPermission::Push);
    let state = org(
        vec![Member::new("alice", OrgRole::Admin)],
        vec![team],
        vec![Repository {
            branch_protection: vec![BranchProtection::new("main")],
            ..Repository::new("api")
        }],
    );

    let plan = diff(&state, &state.clone());
    assert!(plan.actions.is_empty());
    assert!(!plan.has_changes());
}

#[test]
fn test_plan_summary_for_mixed_changes() {
    let desired = org(
        vec![
            Member::new("alice", OrgRole::Admin),
            Member::new("new-user", OrgRole::Member),
        ],
        vec![],
        vec![],
    );
    let actual = org(
        vec![
            Member::new("alice", OrgRole::Admin),
            Member::new("leaving", OrgRole::Member),
        ],
        vec![],
        vec![],
    );
    let plan = diff(&desired, &actual);

    assert!(plan.has_changes());
    assert!(plan.summary().contains("1 to add"));
    assert!(plan.summary().contains("1 to remove"));
}

#[test]
fn test_new_team_yields_create_membership_and_grant_but_no_removes() {
    let mut team = Team::new("backend");
    team.members.push(TeamMember::new("new-user", TeamRole::Member));
    team.repos.insert("repo".to_string(), RepoPermission::Push);
    let desired = org(vec![Member::new("new-user", OrgRole::Member)], vec![team], vec![]);

    let plan = diff(&desired, &empty_org());

    assert_eq!(kind_count(&plan, "team_create"), 1);
    assert_eq!(kind_count(&plan, "team_member_add"), 1);
    assert_eq!(kind_count(&plan, "team_repo_add"), 1);
    assert_eq!(kind_count(&plan, "team_member_remove"), 0);
    assert_eq!(kind_count(&plan, "team_repo_remove"), 0);

    let priorities: Vec<u8> = plan.sorted_actions().iter().map(|a| a.priority).collect();
    let mut expected = priorities.clone();
    expected.sort();
    assert_eq!(priorities, expected);
}
