use super::*;
use serde_json::{from_str, to_string};

#[test]
fn test_slugify_lowercases_and_hyphenates() {
    assert_eq!(slugify("Backend Team"), "backend-team");
    assert_eq!(slugify("ops"), "ops");
    assert_eq!(slugify("A B C"), "a-b-c");
}

#[test]
fn test_org_role_serialization_is_lowercase() {
    assert_eq!(to_string(&OrgRole::Admin).unwrap(), "\"admin\"");
    assert_eq!(to_string(&OrgRole::Member).unwrap(), "\"member\"");
}

#[test]
fn test_org_role_rejects_unknown_value() {
    let result: Result<OrgRole, _> = from_str("\"owner\"");
    assert!(result.is_err());
}

#[test]
fn test_repo_permission_ordering_matches_privilege() {
    assert!(RepoPermission::Pull < RepoPermission::Triage);
    assert!(RepoPermission::Triage < RepoPermission::Push);
    assert!(RepoPermission::Push < RepoPermission::Maintain);
    assert!(RepoPermission::Maintain < RepoPermission::Admin);
}

#[test]
fn test_team_new_derives_slug() {
    let team = Team::new("Backend Team");
    assert_eq!(team.slug, "backend-team");
    assert_eq!(team.privacy, TeamPrivacy::Closed);
    assert!(team.members.is_empty());
    assert!(team.repos.is_empty());
}

#[test]
fn test_repository_new_defaults() {
    let repo = Repository::new("api");
    assert_eq!(repo.visibility, RepoVisibility::Public);
    assert_eq!(repo.default_branch, "main");
    assert!(repo.has_issues);
    assert!(!repo.has_wiki);
    assert!(!repo.has_projects);
    assert!(repo.branch_protection.is_empty());
}

#[test]
fn test_branch_protection_new_defaults() {
    let bp = BranchProtection::new("main");
    assert_eq!(bp.required_reviews, 1);
    assert!(bp.dismiss_stale_reviews);
    assert!(!bp.require_status_checks);
    assert!(bp.required_status_contexts.is_empty());
    assert!(!bp.enforce_admins);
    assert!(!bp.restrict_pushes);
}

#[test]
fn test_branch_protection_payload_without_status_checks() {
    let bp = BranchProtection::new("main");
    let payload = bp.to_api_payload();

    assert_eq!(
        payload["required_pull_request_reviews"]["required_approving_review_count"],
        1
    );
    assert_eq!(
        payload["required_pull_request_reviews"]["dismiss_stale_reviews"],
        true
    );
    assert_eq!(payload["enforce_admins"], false);
    assert!(payload["restrictions"].is_null());
    assert!(payload["required_status_checks"].is_null());
}

#[test]
fn test_branch_protection_payload_with_status_checks() {
    let bp = BranchProtection {
        require_status_checks: true,
        required_status_contexts: vec!["ci/build".to_string(), "ci/test".to_string()],
        ..BranchProtection::new("main")
    };
    let payload = bp.to_api_payload();

    assert_eq!(payload["required_status_checks"]["strict"], true);
    assert_eq!(
        payload["required_status_checks"]["contexts"],
        serde_json::json!(["ci/build", "ci/test"])
    );
}

#[test]
fn test_org_state_lookups() {
    let mut team = Team::new("backend");
    team.repos.insert("api".to_string(), RepoPermission::Push);
    let state = OrgState {
        members: vec![Member::new("alice", OrgRole::Admin)],
        teams: vec![team],
        repositories: vec![Repository::new("api")],
        ..OrgState::new("test-org")
    };

    assert_eq!(state.get_member("alice").unwrap().role, OrgRole::Admin);
    assert!(state.get_member("bob").is_none());
    assert_eq!(state.get_team_by_slug("backend").unwrap().name, "backend");
    assert!(state.get_team_by_slug("frontend").is_none());
    assert_eq!(state.get_repository("api").unwrap().name, "api");
    assert!(state.get_repository("infra").is_none());
}

#[test]
fn test_mutation_outcome_constructors() {
    let ok = MutationOutcome::success("done");
    assert!(ok.success);
    assert_eq!(ok.message, "done");

    let failed = MutationOutcome::failure("denied");
    assert!(!failed.success);
    assert_eq!(failed.message, "denied");
}
