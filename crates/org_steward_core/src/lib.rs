//! Core reconciliation engine for GitHub organizations.
//!
//! The engine turns a *desired* organization state (authored as
//! configuration) and an *actual* state (queried from the GitHub API) into
//! an ordered plan of corrective actions, and optionally executes that plan
//! with per-action failure isolation, idempotency guarantees, and an
//! append-only audit trail.
//!
//! # Architecture
//!
//! - [`plan`]: the plan data model: action kinds with typed payloads,
//!   [`SyncPlan`], [`SyncResult`], and their derived views.
//! - [`diff`]: the pure state diff: `(desired, actual) -> SyncPlan`.
//! - [`apply`]: the [`PlanExecutor`], which dispatches each action to one
//!   client mutation and isolates failures per action.
//! - [`state`]: actual-state snapshot assembly from the client's read
//!   operations.
//! - [`audit`]: the per-run append-only [`AuditRecorder`].
//! - [`posture`]: the read-only security posture [`scan`].
//!
//! The [`Reconciler`] facade bundles these behind one org-scoped surface.
//!
//! # Examples
//!
//! ```rust,no_run
//! use github_client::OrgClient;
//! use org_steward_core::Reconciler;
//!
//! # async fn example(client: &dyn OrgClient, desired: github_client::OrgState)
//! #     -> Result<(), org_steward_core::Error> {
//! let reconciler = Reconciler::new(client, "my-org");
//!
//! let actual = reconciler.fetch_current_state().await?;
//! let plan = reconciler.diff(&desired, &actual);
//! let result = reconciler.apply(plan, true).await;
//! println!("{} actions would run", result.skipped_count);
//! # Ok(())
//! # }
//! ```

use github_client::{OrgClient, OrgState};

pub mod errors;
pub use errors::Error;

pub mod plan;
pub use plan::{
    ActionKind, ActionStatus, FieldChange, SyncAction, SyncPlan, SyncResult,
};

pub mod diff;
pub use diff::diff;

pub mod apply;
pub use apply::PlanExecutor;

pub mod state;
pub use state::fetch_org_state;

pub mod audit;
pub use audit::AuditRecorder;

pub mod posture;
pub use posture::{scan, Finding, FindingCategory, Severity};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Org-scoped facade over the engine: state fetch, diff, apply, and posture
/// scan against one organization through one client.
pub struct Reconciler<'a> {
    client: &'a dyn OrgClient,
    org_name: String,
}

impl<'a> Reconciler<'a> {
    pub fn new(client: &'a dyn OrgClient, org_name: impl Into<String>) -> Self {
        Self {
            client,
            org_name: org_name.into(),
        }
    }

    /// Queries the control plane and builds the actual current state.
    pub async fn fetch_current_state(&self) -> Result<OrgState, Error> {
        state::fetch_org_state(self.client, &self.org_name).await
    }

    /// Compares desired and actual state into an ordered action plan.
    /// Pure; performs no I/O.
    pub fn diff(&self, desired: &OrgState, actual: &OrgState) -> SyncPlan {
        diff::diff(desired, actual)
    }

    /// Executes a plan. See [`PlanExecutor::apply`].
    pub async fn apply(&self, plan: SyncPlan, dry_run: bool) -> SyncResult {
        PlanExecutor::new(self.client, self.org_name.clone())
            .apply(plan, dry_run)
            .await
    }

    /// Runs the posture rules against an actual-state snapshot.
    pub fn security_audit(&self, actual: &OrgState) -> Vec<Finding> {
        posture::scan(actual)
    }
}
