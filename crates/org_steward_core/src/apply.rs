//! Plan execution.
//!
//! [`PlanExecutor`] walks a plan's actions in priority order and dispatches
//! each one to exactly one mutating operation on the [`OrgClient`]
//! collaborator. Failures are isolated to the action that raised them: a
//! rejected mutation or a transport fault marks that action failed and the
//! walk continues, so a run always completes and always accounts for every
//! action in its result counters.
//!
//! Execution is strictly sequential: one mutating call at a time, awaited
//! to completion, because the cross-band ordering (teams before
//! memberships before deletions) is the correctness guarantee of the plan.
//! The executor performs no retries of its own; retry and backoff belong
//! entirely to the client.

use tracing::{error, info};

use github_client::{slugify, MutationOutcome, OrgClient};

use crate::plan::{ActionKind, ActionStatus, SyncAction, SyncPlan, SyncResult};

#[cfg(test)]
#[path = "apply_tests.rs"]
mod tests;

/// Executes sync plans against an organization.
pub struct PlanExecutor<'a> {
    client: &'a dyn OrgClient,
    org_name: String,
}

impl<'a> PlanExecutor<'a> {
    pub fn new(client: &'a dyn OrgClient, org_name: impl Into<String>) -> Self {
        Self {
            client,
            org_name: org_name.into(),
        }
    }

    /// Executes all actions in a sync plan, taking ownership of the plan.
    ///
    /// Actions run in ascending priority, ties broken by the stable order
    /// the diff engine emitted them in. With `dry_run` set, every action is
    /// marked skipped with a message describing what would happen and no
    /// mutating call is made.
    ///
    /// On return, `success_count + failure_count + skipped_count` equals
    /// the number of actions in the plan.
    pub async fn apply(&self, mut plan: SyncPlan, dry_run: bool) -> SyncResult {
        if !plan.has_changes() {
            info!("No changes to apply - organization is in sync");
            return SyncResult::new(plan, dry_run);
        }

        let mode = if dry_run { "DRY RUN" } else { "LIVE" };
        info!(mode = mode, summary = %plan.summary(), "Applying plan");

        let mut order: Vec<usize> = (0..plan.actions.len()).collect();
        order.sort_by_key(|&i| plan.actions[i].priority);

        let mut success_count = 0;
        let mut failure_count = 0;
        let mut skipped_count = 0;

        for index in order {
            if dry_run {
                let action = &mut plan.actions[index];
                let description = action.description();
                action.status = ActionStatus::Skipped;
                action.message = format!("[DRY RUN] Would execute: {description}");
                info!(symbol = %action.symbol(), "{}", action.message);
                skipped_count += 1;
                continue;
            }

            // The collaborator call is the whole unit of work for this
            // action; whatever it reports or raises lands on this action
            // alone and the loop moves on.
            let outcome = self.execute(&plan.actions[index]).await;
            let action = &mut plan.actions[index];
            match outcome {
                Ok(MutationOutcome { success: true, message }) => {
                    action.status = ActionStatus::Success;
                    action.message = message;
                    success_count += 1;
                    info!(
                        symbol = %action.symbol(),
                        "{}: {}",
                        action.description(),
                        action.message
                    );
                }
                Ok(MutationOutcome { success: false, message }) => {
                    action.status = ActionStatus::Failed;
                    action.error = message;
                    failure_count += 1;
                    error!("{}: FAILED - {}", action.description(), action.error);
                }
                Err(fault) => {
                    action.status = ActionStatus::Failed;
                    action.error = fault.to_string();
                    failure_count += 1;
                    error!("{}: FAULT - {}", action.description(), action.error);
                }
            }
        }

        info!(
            success = success_count,
            failed = failure_count,
            skipped = skipped_count,
            "Apply complete"
        );

        let mut result = SyncResult::new(plan, dry_run);
        result.success_count = success_count;
        result.failure_count = failure_count;
        result.skipped_count = skipped_count;
        result
    }

    /// Dispatches one action to its mutating operation.
    ///
    /// The mapping is closed: every action kind pairs with exactly one
    /// client operation, enforced by the exhaustive match.
    async fn execute(
        &self,
        action: &SyncAction,
    ) -> Result<MutationOutcome, github_client::Error> {
        let org = &self.org_name;
        match &action.kind {
            ActionKind::MemberInvite { role } => {
                self.client.invite_member(org, &action.resource, *role).await
            }
            ActionKind::MemberRemove => self.client.remove_member(org, &action.resource).await,
            ActionKind::MemberUpdateRole { to, .. } => {
                self.client.invite_member(org, &action.resource, *to).await
            }
            ActionKind::TeamCreate {
                description,
                privacy,
            } => {
                self.client
                    .create_team(org, &action.resource, description, *privacy)
                    .await
            }
            ActionKind::TeamUpdate {
                slug,
                description,
                privacy,
            } => {
                let slug = resolve_slug(slug.as_deref(), &action.resource);
                self.client
                    .update_team(
                        org,
                        &slug,
                        description.as_ref().map(|change| change.to.as_str()),
                        privacy.as_ref().map(|change| change.to),
                    )
                    .await
            }
            ActionKind::TeamDelete { slug } => {
                let slug = resolve_slug(slug.as_deref(), &action.resource);
                self.client.delete_team(org, &slug).await
            }
            ActionKind::TeamMemberAdd {
                team_slug,
                username,
                role,
            } => {
                self.client
                    .add_team_member(org, team_slug, username, *role)
                    .await
            }
            ActionKind::TeamMemberRemove {
                team_slug,
                username,
            } => self.client.remove_team_member(org, team_slug, username).await,
            ActionKind::TeamMemberUpdateRole {
                team_slug,
                username,
                to,
                ..
            } => {
                self.client
                    .add_team_member(org, team_slug, username, *to)
                    .await
            }
            ActionKind::TeamRepoAdd {
                team_slug,
                repo,
                permission,
            } => {
                self.client
                    .add_team_repo(org, team_slug, repo, *permission)
                    .await
            }
            ActionKind::TeamRepoRemove { team_slug, repo } => {
                self.client.remove_team_repo(org, team_slug, repo).await
            }
            ActionKind::TeamRepoUpdate {
                team_slug, repo, to, ..
            } => self.client.add_team_repo(org, team_slug, repo, *to).await,
            ActionKind::RepoUpdate { settings } => {
                self.client
                    .update_repository(org, &action.resource, settings)
                    .await
            }
            ActionKind::BranchProtectionSet { branch, rules } => {
                // The protection payload is rebuilt from the recorded rules
                // inside the client at call time; nothing here is cached.
                self.client
                    .set_branch_protection(org, &action.resource, branch, rules)
                    .await
            }
            ActionKind::BranchProtectionDelete { branch } => {
                self.client
                    .delete_branch_protection(org, &action.resource, branch)
                    .await
            }
        }
    }
}

/// Prefers a slug captured in the action payload, falling back to the
/// heuristic derivation from the team's display name. The heuristic can
/// diverge from the slug GitHub stores when a team was renamed after
/// creation; which side is right in that case is unresolved, so both paths
/// are kept as-is.
fn resolve_slug(stored: Option<&str>, resource: &str) -> String {
    match stored {
        Some(slug) => slug.to_string(),
        None => slugify(resource),
    }
}
