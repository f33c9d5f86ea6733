//! Crate for interacting with the GitHub REST API.
//!
//! This crate provides a client for organization management: listing the
//! resources that make up an organization's actual state (members, teams,
//! team repository grants, repositories, branch protection) and applying the
//! mutations a reconciliation plan calls for. The client authenticates with
//! a personal access token.
//!
//! Mutating operations follow a `(success, message)` contract (see
//! [`MutationOutcome`]) and are idempotent: removing a resource that is
//! already absent, or granting a role that is already held, reports success
//! with an informative message rather than an error. Transport-level faults
//! are reported through [`Error`] and are the caller's to isolate.

use async_trait::async_trait;
use http::StatusCode;
use octocrab::{Octocrab, Result as OctocrabResult};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, instrument};

pub mod errors;
pub use errors::Error;

pub mod models;
pub use models::{
    slugify, BranchProtection, Member, MutationOutcome, OrgRole, OrgState, RepoPermission,
    RepoVisibility, Repository, Team, TeamMember, TeamPrivacy, TeamRepoGrant, TeamRole,
};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Page size used for all list endpoints.
const PER_PAGE: usize = 100;

/// Operations the reconciliation engine requires from the control plane.
///
/// The read side reconstructs an organization's actual state; the mutate
/// side is the closed set of operations a sync plan dispatches to. Retry,
/// backoff, pagination, and rate-limit handling are internal to
/// implementations and invisible to callers beyond the
/// [`MutationOutcome`]/[`Error`] contract.
#[async_trait]
pub trait OrgClient: Send + Sync {
    /// Lists all organization members with their role.
    async fn list_members(&self, org: &str) -> Result<Vec<Member>, Error>;

    /// Lists all teams with name, slug, description, and privacy.
    ///
    /// The returned teams carry no members or repository grants; use
    /// [`OrgClient::list_team_members`] and [`OrgClient::list_team_repos`]
    /// to fill those in.
    async fn list_teams(&self, org: &str) -> Result<Vec<Team>, Error>;

    /// Lists the members of a team with their team role.
    async fn list_team_members(&self, org: &str, team_slug: &str)
        -> Result<Vec<TeamMember>, Error>;

    /// Lists the repositories granted to a team with the permission level.
    async fn list_team_repos(&self, org: &str, team_slug: &str)
        -> Result<Vec<TeamRepoGrant>, Error>;

    /// Lists all repositories with their settings.
    ///
    /// The returned repositories carry no branch protection records; use
    /// [`OrgClient::get_branch_protection`] to read protection per branch.
    async fn list_repositories(&self, org: &str) -> Result<Vec<Repository>, Error>;

    /// Reads the branch protection rules for a branch.
    ///
    /// Returns `Ok(None)` when the branch is not protected.
    async fn get_branch_protection(
        &self,
        org: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Option<BranchProtection>, Error>;

    /// Invites a user to the organization, or updates the role of an
    /// existing member. Reports "invitation sent" or "membership set"
    /// depending on the remote-reported membership state.
    async fn invite_member(
        &self,
        org: &str,
        username: &str,
        role: OrgRole,
    ) -> Result<MutationOutcome, Error>;

    /// Removes a user from the organization. Removing a user who is not a
    /// member reports success.
    async fn remove_member(&self, org: &str, username: &str) -> Result<MutationOutcome, Error>;

    /// Creates a team. GitHub reports duplicate team creation as a
    /// validation error; that case is treated as already-present and
    /// reported as success.
    async fn create_team(
        &self,
        org: &str,
        name: &str,
        description: &str,
        privacy: TeamPrivacy,
    ) -> Result<MutationOutcome, Error>;

    /// Updates a team. Partial: only the supplied fields change.
    async fn update_team(
        &self,
        org: &str,
        team_slug: &str,
        description: Option<&str>,
        privacy: Option<TeamPrivacy>,
    ) -> Result<MutationOutcome, Error>;

    /// Deletes a team. Deleting an absent team reports success.
    async fn delete_team(&self, org: &str, team_slug: &str) -> Result<MutationOutcome, Error>;

    /// Adds a user to a team, or updates the role of an existing team
    /// member.
    async fn add_team_member(
        &self,
        org: &str,
        team_slug: &str,
        username: &str,
        role: TeamRole,
    ) -> Result<MutationOutcome, Error>;

    /// Removes a user from a team. Removing an absent membership reports
    /// success.
    async fn remove_team_member(
        &self,
        org: &str,
        team_slug: &str,
        username: &str,
    ) -> Result<MutationOutcome, Error>;

    /// Grants a repository to a team at the given permission level, or
    /// updates the level of an existing grant.
    async fn add_team_repo(
        &self,
        org: &str,
        team_slug: &str,
        repo: &str,
        permission: RepoPermission,
    ) -> Result<MutationOutcome, Error>;

    /// Revokes a team's access to a repository. Revoking an absent grant
    /// reports success.
    async fn remove_team_repo(
        &self,
        org: &str,
        team_slug: &str,
        repo: &str,
    ) -> Result<MutationOutcome, Error>;

    /// Updates repository settings. Partial: only the supplied fields
    /// change.
    async fn update_repository(
        &self,
        org: &str,
        repo: &str,
        settings: &RepositorySettingsUpdate,
    ) -> Result<MutationOutcome, Error>;

    /// Sets branch protection rules as an idempotent full replace. The API
    /// request body is rebuilt from `rules` on every call.
    async fn set_branch_protection(
        &self,
        org: &str,
        repo: &str,
        branch: &str,
        rules: &BranchProtection,
    ) -> Result<MutationOutcome, Error>;

    /// Removes branch protection. Removing protection that is already
    /// absent reports success.
    async fn delete_branch_protection(
        &self,
        org: &str,
        repo: &str,
        branch: &str,
    ) -> Result<MutationOutcome, Error>;
}

/// Represents the repository settings that can be updated.
/// Use `Default::default()` and modify fields as needed.
#[derive(Serialize, Default, Debug, Clone, PartialEq)]
pub struct RepositorySettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_issues: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_wiki: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_projects: Option<bool>,
}

// --- Wire-level response shapes -------------------------------------------
//
// Minimal deserialization targets for the REST responses this crate reads.
// Only the fields the engine consumes are declared; everything else in the
// response is ignored.

#[derive(Debug, Deserialize)]
struct UserPayload {
    login: String,
}

#[derive(Debug, Deserialize)]
struct TeamPayload {
    #[serde(default)]
    name: Option<String>,
    slug: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    privacy: Option<TeamPrivacy>,
}

impl From<TeamPayload> for Team {
    fn from(payload: TeamPayload) -> Self {
        let name = payload.name.unwrap_or_else(|| payload.slug.clone());
        Team {
            name,
            slug: payload.slug,
            description: payload.description.unwrap_or_default(),
            privacy: payload.privacy.unwrap_or(TeamPrivacy::Closed),
            members: Vec::new(),
            repos: Default::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TeamRepoPermissions {
    #[serde(default)]
    admin: bool,
    #[serde(default)]
    maintain: bool,
    #[serde(default)]
    push: bool,
    #[serde(default)]
    triage: bool,
}

impl TeamRepoPermissions {
    /// The highest permission level the flags encode.
    fn highest(&self) -> RepoPermission {
        if self.admin {
            RepoPermission::Admin
        } else if self.maintain {
            RepoPermission::Maintain
        } else if self.push {
            RepoPermission::Push
        } else if self.triage {
            RepoPermission::Triage
        } else {
            RepoPermission::Pull
        }
    }
}

#[derive(Debug, Deserialize)]
struct TeamRepoPayload {
    name: String,
    #[serde(default)]
    permissions: TeamRepoPermissions,
}

#[derive(Debug, Deserialize)]
struct RepositoryPayload {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    has_issues: Option<bool>,
    #[serde(default)]
    has_wiki: Option<bool>,
    #[serde(default)]
    has_projects: Option<bool>,
}

impl From<RepositoryPayload> for Repository {
    fn from(payload: RepositoryPayload) -> Self {
        Repository {
            name: payload.name,
            description: payload.description.unwrap_or_default(),
            visibility: if payload.private {
                RepoVisibility::Private
            } else {
                RepoVisibility::Public
            },
            default_branch: payload.default_branch.unwrap_or_else(|| "main".to_string()),
            has_issues: payload.has_issues.unwrap_or(true),
            has_wiki: payload.has_wiki.unwrap_or(false),
            has_projects: payload.has_projects.unwrap_or(false),
            branch_protection: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReviewRequirementsPayload {
    #[serde(default)]
    required_approving_review_count: Option<u32>,
    #[serde(default)]
    dismiss_stale_reviews: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct StatusChecksPayload {
    #[serde(default)]
    contexts: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EnabledFlagPayload {
    #[serde(default)]
    enabled: bool,
}

#[derive(Debug, Deserialize)]
struct ProtectionPayload {
    #[serde(default)]
    required_pull_request_reviews: Option<ReviewRequirementsPayload>,
    #[serde(default)]
    required_status_checks: Option<StatusChecksPayload>,
    #[serde(default)]
    enforce_admins: Option<EnabledFlagPayload>,
}

impl ProtectionPayload {
    fn into_protection(self, branch: &str) -> BranchProtection {
        let reviews = self.required_pull_request_reviews;
        BranchProtection {
            branch: branch.to_string(),
            required_reviews: reviews
                .as_ref()
                .and_then(|r| r.required_approving_review_count)
                .unwrap_or(1),
            dismiss_stale_reviews: reviews
                .as_ref()
                .and_then(|r| r.dismiss_stale_reviews)
                .unwrap_or(false),
            require_status_checks: self.required_status_checks.is_some(),
            required_status_contexts: self
                .required_status_checks
                .map(|c| c.contexts)
                .unwrap_or_default(),
            enforce_admins: self.enforce_admins.map(|e| e.enabled).unwrap_or(false),
            restrict_pushes: false,
        }
    }
}

#[derive(Serialize)]
struct TeamUpdateBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    privacy: Option<TeamPrivacy>,
}

/// A client for the GitHub REST API, authenticated with a personal access
/// token.
#[derive(Debug)]
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Fetches every page of a list endpoint.
    ///
    /// `route` may already carry query parameters; the pagination parameters
    /// are appended with the right separator. Iteration stops at the first
    /// short page.
    async fn get_paged<T>(&self, route: &str) -> Result<Vec<T>, Error>
    where
        T: DeserializeOwned + Send,
    {
        let mut results: Vec<T> = Vec::new();
        let mut page = 1u32;
        loop {
            let separator = if route.contains('?') { '&' } else { '?' };
            let uri = format!("{route}{separator}per_page={PER_PAGE}&page={page}");
            let batch: Vec<T> = self
                .client
                .get(&uri, None::<&()>)
                .await
                .map_err(|e| classify_octocrab_error("Failed to list resources", e))?;
            let at_end = batch.len() < PER_PAGE;
            results.extend(batch);
            if at_end {
                break;
            }
            page += 1;
        }
        Ok(results)
    }

    /// Issues a DELETE and maps the outcome idempotently: 404 means the
    /// resource was already absent, which is success.
    async fn idempotent_delete(
        &self,
        route: &str,
        context: &'static str,
        removed: String,
        already_absent: String,
    ) -> Result<MutationOutcome, Error> {
        match self.client._delete(route, None::<&()>).await {
            Ok(response) => match response.status() {
                StatusCode::NO_CONTENT | StatusCode::OK => Ok(MutationOutcome::success(removed)),
                StatusCode::NOT_FOUND => Ok(MutationOutcome::success(already_absent)),
                status => Ok(MutationOutcome::failure(format!(
                    "{context}: unexpected status {status}"
                ))),
            },
            Err(e) => match github_error_parts(&e) {
                Some((StatusCode::NOT_FOUND, _)) => Ok(MutationOutcome::success(already_absent)),
                Some((status, message)) => {
                    log_octocrab_error(context, e);
                    Ok(MutationOutcome::failure(format!(
                        "{context}: {message} (status {status})"
                    )))
                }
                None => Err(classify_octocrab_error(context, e)),
            },
        }
    }
}

#[async_trait]
impl OrgClient for GitHubClient {
    #[instrument(skip(self), fields(org = %org))]
    async fn list_members(&self, org: &str) -> Result<Vec<Member>, Error> {
        let mut members = Vec::new();
        // The member listing endpoint does not report roles; one filtered
        // pass per role recovers them.
        for role in [OrgRole::Admin, OrgRole::Member] {
            let route = format!("/orgs/{org}/members?role={role}");
            let users: Vec<UserPayload> = self.get_paged(&route).await?;
            members.extend(users.into_iter().map(|u| Member::new(u.login, role)));
        }
        info!(org = org, count = members.len(), "Listed organization members");
        Ok(members)
    }

    #[instrument(skip(self), fields(org = %org))]
    async fn list_teams(&self, org: &str) -> Result<Vec<Team>, Error> {
        let route = format!("/orgs/{org}/teams");
        let payloads: Vec<TeamPayload> = self.get_paged(&route).await?;
        info!(org = org, count = payloads.len(), "Listed teams");
        Ok(payloads.into_iter().map(Team::from).collect())
    }

    async fn list_team_members(
        &self,
        org: &str,
        team_slug: &str,
    ) -> Result<Vec<TeamMember>, Error> {
        let mut members = Vec::new();
        for role in [TeamRole::Maintainer, TeamRole::Member] {
            let route = format!("/orgs/{org}/teams/{team_slug}/members?role={role}");
            let users: Vec<UserPayload> = self.get_paged(&route).await?;
            members.extend(users.into_iter().map(|u| TeamMember::new(u.login, role)));
        }
        Ok(members)
    }

    async fn list_team_repos(
        &self,
        org: &str,
        team_slug: &str,
    ) -> Result<Vec<TeamRepoGrant>, Error> {
        let route = format!("/orgs/{org}/teams/{team_slug}/repos");
        let payloads: Vec<TeamRepoPayload> = self.get_paged(&route).await?;
        Ok(payloads
            .into_iter()
            .map(|p| TeamRepoGrant {
                permission: p.permissions.highest(),
                repo: p.name,
            })
            .collect())
    }

    #[instrument(skip(self), fields(org = %org))]
    async fn list_repositories(&self, org: &str) -> Result<Vec<Repository>, Error> {
        let route = format!("/orgs/{org}/repos");
        let payloads: Vec<RepositoryPayload> = self.get_paged(&route).await?;
        info!(org = org, count = payloads.len(), "Listed repositories");
        Ok(payloads.into_iter().map(Repository::from).collect())
    }

    async fn get_branch_protection(
        &self,
        org: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Option<BranchProtection>, Error> {
        let route = format!("/repos/{org}/{repo}/branches/{branch}/protection");
        let response: OctocrabResult<ProtectionPayload> =
            self.client.get(&route, None::<&()>).await;
        match response {
            Ok(payload) => Ok(Some(payload.into_protection(branch))),
            Err(e) => match github_error_parts(&e) {
                // GitHub answers 404 for an unprotected branch.
                Some((StatusCode::NOT_FOUND, _)) => Ok(None),
                _ => Err(classify_octocrab_error("Failed to get branch protection", e)),
            },
        }
    }

    #[instrument(skip(self), fields(org = %org, username = %username))]
    async fn invite_member(
        &self,
        org: &str,
        username: &str,
        role: OrgRole,
    ) -> Result<MutationOutcome, Error> {
        let route = format!("/orgs/{org}/memberships/{username}");
        let body = json!({ "role": role });
        let response: OctocrabResult<serde_json::Value> =
            self.client.put(&route, Some(&body)).await;
        match response {
            Ok(membership) => {
                let state = membership
                    .get("state")
                    .and_then(|v| v.as_str())
                    .unwrap_or("active");
                let message = if state == "pending" {
                    format!("invitation sent to '{username}' as '{role}'")
                } else {
                    format!("membership for '{username}' set to '{role}'")
                };
                info!(org = org, username = username, state = state, "Set membership");
                Ok(MutationOutcome::success(message))
            }
            Err(e) => rejection_to_outcome("Failed to set membership", e),
        }
    }

    async fn remove_member(&self, org: &str, username: &str) -> Result<MutationOutcome, Error> {
        let route = format!("/orgs/{org}/members/{username}");
        self.idempotent_delete(
            &route,
            "Failed to remove member",
            format!("removed '{username}' from '{org}'"),
            format!("'{username}' not found in '{org}' (already removed)"),
        )
        .await
    }

    #[instrument(skip(self, description), fields(org = %org, team = %name))]
    async fn create_team(
        &self,
        org: &str,
        name: &str,
        description: &str,
        privacy: TeamPrivacy,
    ) -> Result<MutationOutcome, Error> {
        let route = format!("/orgs/{org}/teams");
        let body = json!({
            "name": name,
            "description": description,
            "privacy": privacy,
        });
        let response: OctocrabResult<serde_json::Value> =
            self.client.post(&route, Some(&body)).await;
        match response {
            Ok(_) => {
                info!(org = org, team = name, "Created team");
                Ok(MutationOutcome::success(format!("created team '{name}'")))
            }
            Err(e) => match github_error_parts(&e) {
                // Duplicate creation surfaces as a validation error.
                Some((StatusCode::UNPROCESSABLE_ENTITY, message)) => {
                    info!(org = org, team = name, detail = %message, "Team already exists");
                    Ok(MutationOutcome::success(format!(
                        "team '{name}' already exists ({message})"
                    )))
                }
                _ => rejection_to_outcome("Failed to create team", e),
            },
        }
    }

    async fn update_team(
        &self,
        org: &str,
        team_slug: &str,
        description: Option<&str>,
        privacy: Option<TeamPrivacy>,
    ) -> Result<MutationOutcome, Error> {
        let route = format!("/orgs/{org}/teams/{team_slug}");
        let body = TeamUpdateBody {
            description,
            privacy,
        };
        let response: OctocrabResult<serde_json::Value> =
            self.client.patch(&route, Some(&body)).await;
        match response {
            Ok(_) => Ok(MutationOutcome::success(format!(
                "updated team '{team_slug}'"
            ))),
            Err(e) => rejection_to_outcome("Failed to update team", e),
        }
    }

    async fn delete_team(&self, org: &str, team_slug: &str) -> Result<MutationOutcome, Error> {
        let route = format!("/orgs/{org}/teams/{team_slug}");
        self.idempotent_delete(
            &route,
            "Failed to delete team",
            format!("deleted team '{team_slug}'"),
            format!("team '{team_slug}' not found (already deleted)"),
        )
        .await
    }

    async fn add_team_member(
        &self,
        org: &str,
        team_slug: &str,
        username: &str,
        role: TeamRole,
    ) -> Result<MutationOutcome, Error> {
        let route = format!("/orgs/{org}/teams/{team_slug}/memberships/{username}");
        let body = json!({ "role": role });
        let response: OctocrabResult<serde_json::Value> =
            self.client.put(&route, Some(&body)).await;
        match response {
            Ok(membership) => {
                let state = membership
                    .get("state")
                    .and_then(|v| v.as_str())
                    .unwrap_or("active");
                let message = if state == "pending" {
                    format!("invitation to '{team_slug}' sent to '{username}'")
                } else {
                    format!("'{username}' added to '{team_slug}' as '{role}'")
                };
                Ok(MutationOutcome::success(message))
            }
            Err(e) => rejection_to_outcome("Failed to add team member", e),
        }
    }

    async fn remove_team_member(
        &self,
        org: &str,
        team_slug: &str,
        username: &str,
    ) -> Result<MutationOutcome, Error> {
        let route = format!("/orgs/{org}/teams/{team_slug}/memberships/{username}");
        self.idempotent_delete(
            &route,
            "Failed to remove team member",
            format!("removed '{username}' from '{team_slug}'"),
            format!("'{username}' not in '{team_slug}' (already removed)"),
        )
        .await
    }

    async fn add_team_repo(
        &self,
        org: &str,
        team_slug: &str,
        repo: &str,
        permission: RepoPermission,
    ) -> Result<MutationOutcome, Error> {
        let route = format!("/orgs/{org}/teams/{team_slug}/repos/{org}/{repo}");
        let body = json!({ "permission": permission });
        match self.client._put(&route, Some(&body)).await {
            Ok(response) if response.status().is_success() => Ok(MutationOutcome::success(
                format!("granted '{permission}' on '{repo}' to '{team_slug}'"),
            )),
            Ok(response) => Ok(MutationOutcome::failure(format!(
                "Failed to grant '{repo}' to '{team_slug}': unexpected status {}",
                response.status()
            ))),
            Err(e) => rejection_to_outcome("Failed to grant team repository", e),
        }
    }

    async fn remove_team_repo(
        &self,
        org: &str,
        team_slug: &str,
        repo: &str,
    ) -> Result<MutationOutcome, Error> {
        let route = format!("/orgs/{org}/teams/{team_slug}/repos/{org}/{repo}");
        self.idempotent_delete(
            &route,
            "Failed to revoke team repository",
            format!("revoked '{team_slug}' access to '{repo}'"),
            format!("'{team_slug}' has no access to '{repo}' (already revoked)"),
        )
        .await
    }

    async fn update_repository(
        &self,
        org: &str,
        repo: &str,
        settings: &RepositorySettingsUpdate,
    ) -> Result<MutationOutcome, Error> {
        let route = format!("/repos/{org}/{repo}");
        let response: OctocrabResult<serde_json::Value> =
            self.client.patch(&route, Some(settings)).await;
        match response {
            Ok(_) => Ok(MutationOutcome::success(format!(
                "updated repository settings for '{repo}'"
            ))),
            Err(e) => rejection_to_outcome("Failed to update repository", e),
        }
    }

    #[instrument(skip(self, rules), fields(org = %org, repo = %repo, branch = %branch))]
    async fn set_branch_protection(
        &self,
        org: &str,
        repo: &str,
        branch: &str,
        rules: &BranchProtection,
    ) -> Result<MutationOutcome, Error> {
        let route = format!("/repos/{org}/{repo}/branches/{branch}/protection");
        // The request body is rebuilt from the rules on every call so a
        // replayed plan always reflects its recorded desired values.
        let body = rules.to_api_payload();
        let response: OctocrabResult<serde_json::Value> =
            self.client.put(&route, Some(&body)).await;
        match response {
            Ok(_) => {
                info!(repo = repo, branch = branch, "Set branch protection");
                Ok(MutationOutcome::success(format!(
                    "branch protection set on '{repo}/{branch}'"
                )))
            }
            Err(e) => rejection_to_outcome("Failed to set branch protection", e),
        }
    }

    async fn delete_branch_protection(
        &self,
        org: &str,
        repo: &str,
        branch: &str,
    ) -> Result<MutationOutcome, Error> {
        let route = format!("/repos/{org}/{repo}/branches/{branch}/protection");
        self.idempotent_delete(
            &route,
            "Failed to delete branch protection",
            format!("branch protection removed from '{repo}/{branch}'"),
            format!("'{repo}/{branch}' was not protected (nothing to remove)"),
        )
        .await
    }
}

/// Creates an `Octocrab` client authenticated with a personal access token.
///
/// # Errors
/// Returns an `Error::AuthError` if the client cannot be built.
#[instrument(skip(token))]
pub fn create_token_client(token: &SecretString) -> Result<Octocrab, Error> {
    Octocrab::builder()
        .personal_token(token.expose_secret().to_string())
        .build()
        .map_err(|e| Error::AuthError(format!("Failed to build GitHub client: {e}")))
}

/// Extracts the status code and message from a GitHub-sourced API error.
fn github_error_parts(e: &octocrab::Error) -> Option<(StatusCode, String)> {
    match e {
        octocrab::Error::GitHub { source, .. } => {
            Some((source.status_code, source.message.clone()))
        }
        _ => None,
    }
}

/// Converts an API rejection into a failed [`MutationOutcome`]; transport
/// faults stay on the error channel for the caller to isolate.
fn rejection_to_outcome(
    context: &'static str,
    e: octocrab::Error,
) -> Result<MutationOutcome, Error> {
    match github_error_parts(&e) {
        Some((status, message)) => {
            log_octocrab_error(context, e);
            Ok(MutationOutcome::failure(format!(
                "{context}: {message} (status {status})"
            )))
        }
        None => Err(classify_octocrab_error(context, e)),
    }
}

/// Maps an octocrab error onto this crate's [`Error`] taxonomy, logging the
/// underlying detail.
fn classify_octocrab_error(context: &str, e: octocrab::Error) -> Error {
    if let octocrab::Error::GitHub { ref source, .. } = e {
        if source.status_code == StatusCode::NOT_FOUND {
            log_octocrab_error(context, e);
            return Error::NotFound;
        }
        if source.status_code == StatusCode::FORBIDDEN
            && source.message.to_lowercase().contains("rate limit")
        {
            log_octocrab_error(context, e);
            return Error::RateLimitExceeded;
        }
        let message = source.message.clone();
        log_octocrab_error(context, e);
        return Error::ApiError(message);
    }
    let message = e.to_string();
    log_octocrab_error(context, e);
    Error::ApiError(message)
}

fn log_octocrab_error(message: &str, e: octocrab::Error) {
    match e {
        octocrab::Error::GitHub { source, backtrace } => {
            let err = source;
            error!(
                error_message = err.message,
                backtrace = backtrace.to_string(),
                "{}. Received an error from GitHub",
                message
            )
        }
        octocrab::Error::UriParse { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}. Failed to parse URI.",
            message
        ),
        octocrab::Error::Uri { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}, Failed to parse URI.",
            message
        ),
        octocrab::Error::InvalidHeaderValue { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}. One of the header values was invalid.",
            message
        ),
        octocrab::Error::InvalidUtf8 { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}. The message wasn't valid UTF-8.",
            message,
        ),
        _ => error!(error_message = e.to_string(), message),
    };
}
