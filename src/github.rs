//! GitHub API Client
//!
//! Module for managing interactions with the GitHub API

use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::debug;

use crate::config::Credentials;
use crate::error::{Error, Result};
use crate::protection::{ProtectionSettings, RepositorySettings};

/// Page size for list endpoints
const PER_PAGE: u8 = 100;

/// Encode a string for use in URL path segments (RFC 3986 with UTF-8 support)
///
/// Only unreserved characters (A-Z, a-z, 0-9, -, ., _, ~) are left unencoded,
/// so branch names such as `feature/x` stay a single segment.
///
/// # Arguments
/// - `input`: The string to encode
///
/// # Returns
/// URL-encoded string safe for use in path segments
fn encode_path_segment(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            // RFC 3986 unreserved characters
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '.' | '_' | '~' => c.to_string(),
            // Everything else gets percent-encoded as UTF-8 bytes
            _ => c
                .to_string()
                .bytes()
                .map(|b| format!("%{:02X}", b))
                .collect::<String>(),
        })
        .collect()
}

/// Map an octocrab error to a classified error
///
/// 404 and 403 responses become [`Error::NotFound`] and
/// [`Error::PermissionDenied`]; anything else is kept as is.
fn classify_error(err: octocrab::Error, subject: &str) -> Error {
    let status = match &err {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
        _ => None,
    };

    match status {
        Some(404) => Error::NotFound(subject.to_string()),
        Some(403) => Error::PermissionDenied(subject.to_string()),
        _ => Error::GitHubApi(err),
    }
}

/// GitHub Label Information
///
/// Represents label information retrieved from the GitHub API
#[derive(Debug, Clone, PartialEq)]
pub struct GitHubLabel {
    /// Label name
    pub name: String,

    /// Label color (6-digit hexadecimal, without #)
    pub color: String,

    /// Label description
    pub description: Option<String>,
}

/// Remote repository operations used by the reconciler
///
/// Every write is a "set to desired state" call, so repeating it is safe.
#[async_trait]
pub trait RepositoryService: Send + Sync {
    /// Names of all branches in the repository
    async fn list_branches(&self) -> Result<Vec<String>>;

    /// Replace the protection rule of a branch
    async fn update_branch_protection(
        &self,
        branch: &str,
        settings: &ProtectionSettings,
    ) -> Result<()>;

    /// Update repository-level settings
    async fn update_repository_settings(&self, settings: &RepositorySettings) -> Result<()>;

    /// All labels in the repository
    async fn list_labels(&self) -> Result<Vec<GitHubLabel>>;

    /// Create a label
    async fn create_label(&self, name: &str, color: &str, description: &str) -> Result<()>;
}

/// GitHub API Client
///
/// Client responsible for interactions with the GitHub API
pub struct GitHubClient {
    octocrab: Octocrab,
    owner: String,
    repo: String,
}

impl GitHubClient {
    /// Create a new GitHub client
    ///
    /// No request is made here; the first call surfaces authentication problems.
    ///
    /// # Errors
    /// Returns an error if client initialization fails
    pub fn new(credentials: &Credentials) -> Result<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(credentials.access_token.clone())
            .build()?;

        Ok(Self {
            octocrab,
            owner: credentials.owner.clone(),
            repo: credentials.repo.clone(),
        })
    }

    fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

#[async_trait]
impl RepositoryService for GitHubClient {
    async fn list_branches(&self) -> Result<Vec<String>> {
        let mut branches = Vec::new();
        let mut page = 1u32;

        loop {
            let response = self
                .octocrab
                .repos(&self.owner, &self.repo)
                .list_branches()
                .page(page)
                .per_page(PER_PAGE)
                .send()
                .await
                .map_err(|e| classify_error(e, &self.full_name()))?;

            if response.items.is_empty() {
                break;
            }

            branches.extend(response.items.into_iter().map(|branch| branch.name));
            page += 1;
        }

        debug!(count = branches.len(), "listed branches");
        Ok(branches)
    }

    async fn update_branch_protection(
        &self,
        branch: &str,
        settings: &ProtectionSettings,
    ) -> Result<()> {
        let route = format!(
            "/repos/{}/{}/branches/{}/protection",
            self.owner,
            self.repo,
            encode_path_segment(branch)
        );
        debug!(%route, "updating branch protection");

        let _: serde_json::Value = self
            .octocrab
            .put(route, Some(settings))
            .await
            .map_err(|e| classify_error(e, branch))?;

        Ok(())
    }

    async fn update_repository_settings(&self, settings: &RepositorySettings) -> Result<()> {
        let route = format!("/repos/{}/{}", self.owner, self.repo);
        debug!(%route, "updating repository settings");

        let _: serde_json::Value = self
            .octocrab
            .patch(route, Some(settings))
            .await
            .map_err(|e| classify_error(e, &self.full_name()))?;

        Ok(())
    }

    async fn list_labels(&self) -> Result<Vec<GitHubLabel>> {
        let mut labels = Vec::new();
        let mut page = 1u32;

        loop {
            let response = self
                .octocrab
                .issues(&self.owner, &self.repo)
                .list_labels_for_repo()
                .page(page)
                .per_page(PER_PAGE)
                .send()
                .await
                .map_err(|e| classify_error(e, &self.full_name()))?;

            if response.items.is_empty() {
                break;
            }

            for label in response.items {
                labels.push(GitHubLabel {
                    name: label.name,
                    color: label.color,
                    description: label.description,
                });
            }

            page += 1;
        }

        debug!(count = labels.len(), "listed labels");
        Ok(labels)
    }

    async fn create_label(&self, name: &str, color: &str, description: &str) -> Result<()> {
        self.octocrab
            .issues(&self.owner, &self.repo)
            .create_label(name, color, description)
            .await
            .map_err(|e| classify_error(e, name))?;

        Ok(())
    }
}
