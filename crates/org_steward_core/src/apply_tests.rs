//! Tests for the plan executor.

use super::*;
use async_trait::async_trait;
use github_client::{
    BranchProtection, Error as GitHubError, Member, OrgRole, RepoPermission,
    RepositorySettingsUpdate, Repository, Team, TeamMember, TeamPrivacy, TeamRepoGrant, TeamRole,
};
use std::sync::{Arc, Mutex};

use crate::plan::FieldChange;

/// Recording mock client. Each mutation logs `"operation:detail"`; failures
/// and faults can be injected per operation name.
#[derive(Clone, Default)]
struct MockOrgClient {
    calls: Arc<Mutex<Vec<String>>>,
    fail_ops: Arc<Mutex<Vec<String>>>,
    fault_ops: Arc<Mutex<Vec<String>>>,
}

impl MockOrgClient {
    fn new() -> Self {
        Self::default()
    }

    /// Makes `op` report `(success: false, ...)`.
    fn fail_on(&self, op: &str) {
        self.fail_ops.lock().unwrap().push(op.to_string());
    }

    /// Makes `op` raise a transport fault.
    fn fault_on(&self, op: &str) {
        self.fault_ops.lock().unwrap().push(op.to_string());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str, detail: String) -> Result<MutationOutcome, GitHubError> {
        self.calls.lock().unwrap().push(format!("{op}:{detail}"));
        if self.fault_ops.lock().unwrap().iter().any(|o| o == op) {
            return Err(GitHubError::ApiError("injected fault".to_string()));
        }
        if self.fail_ops.lock().unwrap().iter().any(|o| o == op) {
            return Ok(MutationOutcome::failure("injected failure"));
        }
        Ok(MutationOutcome::success(format!("{op} ok")))
    }
}

#[async_trait]
impl OrgClient for MockOrgClient {
    async fn list_members(&self, _org: &str) -> Result<Vec<Member>, GitHubError> {
        Ok(Vec::new())
    }

    async fn list_teams(&self, _org: &str) -> Result<Vec<Team>, GitHubError> {
        Ok(Vec::new())
    }

    async fn list_team_members(
        &self,
        _org: &str,
        _team_slug: &str,
    ) -> Result<Vec<TeamMember>, GitHubError> {
        Ok(Vec::new())
    }

    async fn list_team_repos(
        &self,
        _org: &str,
        _team_slug: &str,
    ) -> Result<Vec<TeamRepoGrant>, GitHubError> {
        Ok(Vec::new())
    }

    async fn list_repositories(&self, _org: &str) -> Result<Vec<Repository>, GitHubError> {
        Ok(Vec::new())
    }

    async fn get_branch_protection(
        &self,
        _org: &str,
        _repo: &str,
        _branch: &str,
    ) -> Result<Option<BranchProtection>, GitHubError> {
        Ok(None)
    }

    async fn invite_member(
        &self,
        _org: &str,
        username: &str,
        role: OrgRole,
    ) -> Result<MutationOutcome, GitHubError> {
        self.record("invite_member", format!("{username}={role}"))
    }

    async fn remove_member(
        &self,
        _org: &str,
        username: &str,
    ) -> Result<MutationOutcome, GitHubError> {
        self.record("remove_member", username.to_string())
    }

    async fn create_team(
        &self,
        _org: &str,
        name: &str,
        _description: &str,
        _privacy: TeamPrivacy,
    ) -> Result<MutationOutcome, GitHubError> {
        self.record("create_team", name.to_string())
    }

    async fn update_team(
        &self,
        _org: &str,
        team_slug: &str,
        _description: Option<&str>,
        _privacy: Option<TeamPrivacy>,
    ) -> Result<MutationOutcome, GitHubError> {
        self.record("update_team", team_slug.to_string())
    }

    async fn delete_team(
        &self,
        _org: &str,
        team_slug: &str,
    ) -> Result<MutationOutcome, GitHubError> {
        self.record("delete_team", team_slug.to_string())
    }

    async fn add_team_member(
        &self,
        _org: &str,
        team_slug: &str,
        username: &str,
        role: TeamRole,
    ) -> Result<MutationOutcome, GitHubError> {
        self.record("add_team_member", format!("{team_slug}/{username}={role}"))
    }

    async fn remove_team_member(
        &self,
        _org: &str,
        team_slug: &str,
        username: &str,
    ) -> Result<MutationOutcome, GitHubError> {
        self.record("remove_team_member", format!("{team_slug}/{username}"))
    }

    async fn add_team_repo(
        &self,
        _org: &str,
        team_slug: &str,
        repo: &str,
        permission: RepoPermission,
    ) -> Result<MutationOutcome, GitHubError> {
        self.record("add_team_repo", format!("{team_slug}/{repo}={permission}"))
    }

    async fn remove_team_repo(
        &self,
        _org: &str,
        team_slug: &str,
        repo: &str,
    ) -> Result<MutationOutcome, GitHubError> {
        self.record("remove_team_repo", format!("{team_slug}/{repo}"))
    }

    async fn update_repository(
        &self,
        _org: &str,
        repo: &str,
        _settings: &RepositorySettingsUpdate,
    ) -> Result<MutationOutcome, GitHubError> {
        self.record("update_repository", repo.to_string())
    }

    async fn set_branch_protection(
        &self,
        _org: &str,
        repo: &str,
        branch: &str,
        rules: &BranchProtection,
    ) -> Result<MutationOutcome, GitHubError> {
        self.record(
            "set_branch_protection",
            format!("{repo}/{branch}@{}", rules.required_reviews),
        )
    }

    async fn delete_branch_protection(
        &self,
        _org: &str,
        repo: &str,
        branch: &str,
    ) -> Result<MutationOutcome, GitHubError> {
        self.record("delete_branch_protection", format!("{repo}/{branch}"))
    }
}

fn three_action_plan() -> SyncPlan {
    let mut plan = SyncPlan::new("test-org");
    plan.actions.push(SyncAction::new(
        ActionKind::MemberInvite {
            role: OrgRole::Admin,
        },
        "alice",
    ));
    plan.actions.push(SyncAction::new(
        ActionKind::TeamCreate {
            description: "Backend".to_string(),
            privacy: TeamPrivacy::Closed,
        },
        "backend",
    ));
    plan.actions.push(SyncAction::new(ActionKind::MemberRemove, "leaving"));
    plan
}

#[tokio::test]
async fn test_empty_plan_returns_immediately() {
    let client = MockOrgClient::new();
    let executor = PlanExecutor::new(&client, "test-org");

    let result = executor.apply(SyncPlan::new("test-org"), false).await;

    assert_eq!(result.success_count, 0);
    assert_eq!(result.failure_count, 0);
    assert_eq!(result.skipped_count, 0);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_dry_run_is_inert() {
    let client = MockOrgClient::new();
    let executor = PlanExecutor::new(&client, "test-org");

    let result = executor.apply(three_action_plan(), true).await;

    assert_eq!(result.skipped_count, 3);
    assert_eq!(result.success_count, 0);
    assert_eq!(result.failure_count, 0);
    // No mutating calls were issued.
    assert!(client.calls().is_empty());
    for action in &result.plan.actions {
        assert_eq!(action.status, ActionStatus::Skipped);
        assert!(action.message.starts_with("[DRY RUN] Would execute:"));
    }
}

#[tokio::test]
async fn test_live_apply_executes_in_priority_order() {
    let client = MockOrgClient::new();
    let executor = PlanExecutor::new(&client, "test-org");

    let result = executor.apply(three_action_plan(), false).await;

    assert_eq!(result.success_count, 3);
    assert_eq!(result.failure_count, 0);
    assert!(result.success());
    assert_eq!(
        client.calls(),
        vec![
            "invite_member:alice=admin".to_string(),
            "create_team:backend".to_string(),
            "remove_member:leaving".to_string(),
        ]
    );
    for action in &result.plan.actions {
        assert_eq!(action.status, ActionStatus::Success);
        assert!(!action.message.is_empty());
    }
}

#[tracing_test::traced_test]
#[tokio::test]
async fn test_rejected_mutation_is_isolated() {
    let client = MockOrgClient::new();
    client.fail_on("create_team");
    let executor = PlanExecutor::new(&client, "test-org");

    let result = executor.apply(three_action_plan(), false).await;

    assert!(logs_contain("FAILED"));

    // Every action was still attempted.
    assert_eq!(client.calls().len(), 3);
    assert_eq!(result.success_count, 2);
    assert_eq!(result.failure_count, 1);
    assert!(!result.success());

    let failed: Vec<&SyncAction> = result
        .plan
        .actions
        .iter()
        .filter(|a| a.status == ActionStatus::Failed)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].resource, "backend");
    assert_eq!(failed[0].error, "injected failure");
}

#[tokio::test]
async fn test_transport_fault_is_captured_as_action_failure() {
    let client = MockOrgClient::new();
    client.fault_on("create_team");
    let executor = PlanExecutor::new(&client, "test-org");

    let result = executor.apply(three_action_plan(), false).await;

    assert_eq!(result.success_count, 2);
    assert_eq!(result.failure_count, 1);
    assert_eq!(result.skipped_count, 0);

    let failed = result
        .plan
        .actions
        .iter()
        .find(|a| a.status == ActionStatus::Failed)
        .expect("one action failed");
    assert!(!failed.error.is_empty());
    assert!(failed.error.contains("injected fault"));
}

#[tokio::test]
async fn test_counters_always_cover_every_action() {
    let client = MockOrgClient::new();
    client.fail_on("invite_member");
    client.fault_on("remove_member");
    let executor = PlanExecutor::new(&client, "test-org");

    let plan = three_action_plan();
    let total = plan.actions.len();
    let result = executor.apply(plan, false).await;

    assert_eq!(
        result.success_count + result.failure_count + result.skipped_count,
        total
    );
}

#[tokio::test]
async fn test_team_update_falls_back_to_heuristic_slug() {
    let client = MockOrgClient::new();
    let executor = PlanExecutor::new(&client, "test-org");

    let mut plan = SyncPlan::new("test-org");
    plan.actions.push(SyncAction::new(
        ActionKind::TeamUpdate {
            slug: None,
            description: Some(FieldChange {
                from: "Old".to_string(),
                to: "New".to_string(),
            }),
            privacy: None,
        },
        "Backend Team",
    ));

    executor.apply(plan, false).await;

    assert_eq!(client.calls(), vec!["update_team:backend-team".to_string()]);
}

#[tokio::test]
async fn test_team_delete_prefers_stored_slug() {
    let client = MockOrgClient::new();
    let executor = PlanExecutor::new(&client, "test-org");

    let mut plan = SyncPlan::new("test-org");
    plan.actions.push(SyncAction::new(
        ActionKind::TeamDelete {
            slug: Some("stored-slug".to_string()),
        },
        "Backend Team",
    ));

    executor.apply(plan, false).await;

    assert_eq!(client.calls(), vec!["delete_team:stored-slug".to_string()]);
}

#[tokio::test]
async fn test_member_role_update_dispatches_to_invite() {
    let client = MockOrgClient::new();
    let executor = PlanExecutor::new(&client, "test-org");

    let mut plan = SyncPlan::new("test-org");
    plan.actions.push(SyncAction::new(
        ActionKind::MemberUpdateRole {
            from: OrgRole::Member,
            to: OrgRole::Admin,
        },
        "alice",
    ));

    executor.apply(plan, false).await;

    // Role updates reuse the invite-or-update membership operation.
    assert_eq!(client.calls(), vec!["invite_member:alice=admin".to_string()]);
}

#[tokio::test]
async fn test_branch_protection_set_passes_recorded_rules() {
    let client = MockOrgClient::new();
    let executor = PlanExecutor::new(&client, "test-org");

    let mut plan = SyncPlan::new("test-org");
    plan.actions.push(SyncAction::new(
        ActionKind::BranchProtectionSet {
            branch: "main".to_string(),
            rules: BranchProtection {
                required_reviews: 2,
                ..BranchProtection::new("main")
            },
        },
        "api",
    ));

    executor.apply(plan, false).await;

    assert_eq!(
        client.calls(),
        vec!["set_branch_protection:api/main@2".to_string()]
    );
}
