//! # gh-branch-guard
//!
//! Applies branch protection, merge settings and merge-bot labels to a GitHub
//! repository from a YAML bot configuration
//!
//! ## Features
//! - Exact and `*` wildcard branch patterns
//! - Per-branch and per-label failure isolation
//! - Idempotent writes, safe to re-run
//! - Dry-run mode

pub mod config;
pub mod error;
pub mod github;
pub mod labels;
pub mod pattern;
pub mod protection;
pub mod reconcile;

pub use config::{load_config, BotConfig, Credentials};
pub use error::{Error, Result};
pub use github::{GitHubClient, RepositoryService};
pub use reconcile::{ReconcileReport, Reconciler};

/// Reconcile a repository in one call
///
/// # Examples
///
/// ```rust,no_run
/// use gh_branch_guard::{load_config, Credentials};
///
/// #[tokio::main]
/// async fn main() -> gh_branch_guard::Result<()> {
///     let credentials = Credentials::resolve(
///         Some("your_github_token".to_string()),
///         Some("owner/repo".to_string()),
///     )?;
///     let config = load_config(".github/bot-config.yml")?;
///
///     let report = gh_branch_guard::reconcile_repository(&credentials, config, false).await?;
///     println!("Protected {} branches", report.branches.len());
///     Ok(())
/// }
/// ```
pub async fn reconcile_repository(
    credentials: &Credentials,
    config: BotConfig,
    dry_run: bool,
) -> Result<ReconcileReport> {
    let client = GitHubClient::new(credentials)?;
    Reconciler::new(client, config).dry_run(dry_run).run().await
}
