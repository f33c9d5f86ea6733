//! Actual-state snapshot assembly.
//!
//! Composes the [`OrgClient`] read operations into one [`OrgState`]
//! describing how the organization looks right now. The snapshot is built
//! once per reconciliation run and treated as immutable afterwards.

use tracing::{info, instrument};

use github_client::{OrgClient, OrgState, RepoVisibility};

use crate::errors::Error;

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;

/// Queries the control plane and builds the actual current state of the
/// organization.
///
/// Branch protection is read only for the default branch of public
/// repositories; protection anywhere else is outside the engine's scope
/// and is not captured in the snapshot.
#[instrument(skip(client), fields(org = %org_name))]
pub async fn fetch_org_state(client: &dyn OrgClient, org_name: &str) -> Result<OrgState, Error> {
    info!(org = org_name, "Fetching current state");

    let mut state = OrgState::new(org_name);

    state.members = client.list_members(org_name).await?;
    info!(count = state.members.len(), "Found members");

    for mut team in client.list_teams(org_name).await? {
        team.members = client.list_team_members(org_name, &team.slug).await?;
        for grant in client.list_team_repos(org_name, &team.slug).await? {
            team.repos.insert(grant.repo, grant.permission);
        }
        state.teams.push(team);
    }
    info!(count = state.teams.len(), "Found teams");

    for mut repo in client.list_repositories(org_name).await? {
        if repo.visibility == RepoVisibility::Public {
            if let Some(protection) = client
                .get_branch_protection(org_name, &repo.name, &repo.default_branch)
                .await?
            {
                repo.branch_protection.push(protection);
            }
        }
        state.repositories.push(repo);
    }
    info!(count = state.repositories.len(), "Found repositories");

    Ok(state)
}
