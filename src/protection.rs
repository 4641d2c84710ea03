//! Branch Protection Payloads
//!
//! Request bodies for the branch protection and repository settings endpoints

use serde::Serialize;

use crate::config::BotConfig;

/// Body of `PUT /repos/{owner}/{repo}/branches/{branch}/protection`
///
/// The endpoint replaces the whole rule, so every nullable field is
/// serialized explicitly.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProtectionSettings {
    pub required_status_checks: Option<RequiredStatusChecks>,

    /// Administrators may bypass the rule
    pub enforce_admins: bool,

    pub required_pull_request_reviews: PullRequestReviews,

    /// Push restrictions; always `None` so the bot can push and merge
    pub restrictions: Option<PushRestrictions>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_linear_history: Option<bool>,

    pub allow_force_pushes: bool,

    pub allow_deletions: bool,
}

/// Required status checks
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RequiredStatusChecks {
    /// Branch must be up to date with the base before merging
    pub strict: bool,
    pub contexts: Vec<String>,
}

/// Pull request review requirements
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PullRequestReviews {
    pub required_approving_review_count: u32,
    pub dismiss_stale_reviews: bool,
    pub restrict_dismissals: bool,
    pub require_code_owner_reviews: bool,
}

/// Push restrictions
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PushRestrictions {
    pub users: Vec<String>,
    pub teams: Vec<String>,
    pub apps: Vec<String>,
}

impl ProtectionSettings {
    /// Build the protection payload from bot configuration
    pub fn from_config(config: &BotConfig) -> Self {
        let protection = &config.branch_protection;

        let required_status_checks =
            config
                .status_check_contexts()
                .map(|contexts| RequiredStatusChecks {
                    strict: protection.require_up_to_date_branches,
                    contexts: contexts.to_vec(),
                });

        Self {
            required_status_checks,
            enforce_admins: false,
            required_pull_request_reviews: PullRequestReviews {
                required_approving_review_count: config.merge.required_approvals,
                dismiss_stale_reviews: protection.dismiss_stale_reviews,
                restrict_dismissals: false,
                require_code_owner_reviews: false,
            },
            restrictions: None,
            required_linear_history: protection.require_linear_history.then_some(true),
            allow_force_pushes: protection.allow_force_pushes,
            allow_deletions: protection.allow_deletions,
        }
    }
}

/// Body of `PATCH /repos/{owner}/{repo}`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RepositorySettings {
    pub allow_squash_merge: bool,
    pub allow_merge_commit: bool,
    pub allow_rebase_merge: bool,
    pub delete_branch_on_merge: bool,
}

impl RepositorySettings {
    /// Enable every merge strategy; branch auto-deletion follows configuration
    pub fn from_config(config: &BotConfig) -> Self {
        Self {
            allow_squash_merge: true,
            allow_merge_commit: true,
            allow_rebase_merge: true,
            delete_branch_on_merge: config.merge.delete_branch_after_merge,
        }
    }
}
