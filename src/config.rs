//! Configuration Management
//!
//! Bot configuration file and credential handling

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default location of the bot configuration file, relative to the repository root
pub const DEFAULT_CONFIG_PATH: &str = ".github/bot-config.yml";

/// Environment variable holding the GitHub access token
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Environment variable holding the target repository (`owner/repo`)
pub const REPOSITORY_ENV: &str = "GITHUB_REPOSITORY";

/// Top-level shape of the configuration file
///
/// Only the `bot_config` section is read; any sibling keys are ignored.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    bot_config: Option<BotConfig>,
}

// Raw sections mirror the file. Every key is optional and a key written
// without a value (YAML null) counts as absent.

#[derive(Debug, Default, Deserialize)]
struct RawBotConfig {
    branch_protection: Option<RawBranchProtection>,
    merge: Option<RawMerge>,
    triggers: Option<RawTriggers>,
}

#[derive(Debug, Default, Deserialize)]
struct RawBranchProtection {
    protected_branches: Option<Vec<String>>,
    dismiss_stale_reviews: Option<bool>,
    require_up_to_date_branches: Option<bool>,
    require_linear_history: Option<bool>,
    allow_force_pushes: Option<bool>,
    allow_deletions: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMerge {
    required_approvals: Option<u32>,
    require_status_checks: Option<bool>,
    required_status_checks: Option<Vec<String>>,
    delete_branch_after_merge: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTriggers {
    auto_merge_labels: Option<Vec<String>>,
    skip_labels: Option<Vec<String>>,
}

/// Bot Configuration
///
/// Desired repository state, read once per run
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(from = "RawBotConfig")]
pub struct BotConfig {
    pub branch_protection: BranchProtectionConfig,
    pub merge: MergeConfig,
    pub triggers: Triggers,
}

impl From<RawBotConfig> for BotConfig {
    fn from(raw: RawBotConfig) -> Self {
        Self {
            branch_protection: raw.branch_protection.unwrap_or_default().into(),
            merge: raw.merge.unwrap_or_default().into(),
            triggers: raw.triggers.unwrap_or_default().into(),
        }
    }
}

/// Branch protection section
#[derive(Debug, Clone, PartialEq)]
pub struct BranchProtectionConfig {
    /// Branch names or `*` wildcard patterns (default: `main`)
    pub protected_branches: Vec<String>,

    /// Dismiss approvals when new commits are pushed (default: true)
    pub dismiss_stale_reviews: bool,

    /// Require branches to be up to date before merging (default: true)
    pub require_up_to_date_branches: bool,

    /// Require a linear history (default: false)
    pub require_linear_history: bool,

    /// Allow force pushes (default: false)
    pub allow_force_pushes: bool,

    /// Allow branch deletion (default: false)
    pub allow_deletions: bool,
}

impl From<RawBranchProtection> for BranchProtectionConfig {
    fn from(raw: RawBranchProtection) -> Self {
        Self {
            protected_branches: raw
                .protected_branches
                .unwrap_or_else(|| vec!["main".to_string()]),
            dismiss_stale_reviews: raw.dismiss_stale_reviews.unwrap_or(true),
            require_up_to_date_branches: raw.require_up_to_date_branches.unwrap_or(true),
            require_linear_history: raw.require_linear_history.unwrap_or(false),
            allow_force_pushes: raw.allow_force_pushes.unwrap_or(false),
            allow_deletions: raw.allow_deletions.unwrap_or(false),
        }
    }
}

impl Default for BranchProtectionConfig {
    fn default() -> Self {
        RawBranchProtection::default().into()
    }
}

/// Merge section
#[derive(Debug, Clone, PartialEq)]
pub struct MergeConfig {
    /// Approving reviews required before merge (default: 1)
    pub required_approvals: u32,

    /// Enable required status checks (default: false)
    pub require_status_checks: bool,

    /// Status check contexts that must pass
    pub required_status_checks: Vec<String>,

    /// Delete head branches once merged (default: true)
    pub delete_branch_after_merge: bool,
}

impl From<RawMerge> for MergeConfig {
    fn from(raw: RawMerge) -> Self {
        Self {
            required_approvals: raw.required_approvals.unwrap_or(1),
            require_status_checks: raw.require_status_checks.unwrap_or(false),
            required_status_checks: raw.required_status_checks.unwrap_or_default(),
            delete_branch_after_merge: raw.delete_branch_after_merge.unwrap_or(true),
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        RawMerge::default().into()
    }
}

/// Trigger labels section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triggers {
    /// Labels that mark a pull request for automatic merge
    pub auto_merge_labels: Vec<String>,

    /// Labels that make the bot skip a pull request
    pub skip_labels: Vec<String>,
}

impl From<RawTriggers> for Triggers {
    fn from(raw: RawTriggers) -> Self {
        Self {
            auto_merge_labels: raw.auto_merge_labels.unwrap_or_default(),
            skip_labels: raw.skip_labels.unwrap_or_default(),
        }
    }
}

impl BotConfig {
    /// Validate configuration
    ///
    /// # Errors
    /// - If a protected branch pattern is blank
    /// - If a label name is blank
    pub fn validate(&self) -> Result<()> {
        if self
            .branch_protection
            .protected_branches
            .iter()
            .any(|p| p.trim().is_empty())
        {
            return Err(Error::configuration(
                "protected_branches must not contain empty patterns",
            ));
        }

        let labels = self
            .triggers
            .auto_merge_labels
            .iter()
            .chain(&self.triggers.skip_labels);
        for label in labels {
            if label.trim().is_empty() {
                return Err(Error::configuration("Label name cannot be empty"));
            }
        }

        Ok(())
    }

    /// Status check contexts to enforce, if status checks are enabled and non-empty
    pub fn status_check_contexts(&self) -> Option<&[String]> {
        if self.merge.require_status_checks && !self.merge.required_status_checks.is_empty() {
            Some(&self.merge.required_status_checks)
        } else {
            None
        }
    }
}

/// Parse bot configuration from YAML content
///
/// # Errors
/// If the YAML is malformed, the `bot_config` section is missing, or validation fails
pub fn parse_config(content: &str) -> Result<BotConfig> {
    let file: ConfigFile = serde_yaml::from_str(content)?;
    let config = file.bot_config.ok_or_else(|| {
        Error::configuration("Invalid configuration: bot_config section not found")
    })?;

    config.validate()?;
    Ok(config)
}

/// Load bot configuration from a YAML file
///
/// # Errors
/// If the file does not exist, cannot be read, or fails to parse
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BotConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Error::configuration(format!(
            "Bot configuration file not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Credentials
///
/// Access token and target repository for a run
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub access_token: String,
    pub owner: String,
    pub repo: String,
}

impl Credentials {
    /// Build credentials from optional inputs
    ///
    /// Blank values count as missing.
    ///
    /// # Errors
    /// If the token or repository is missing, or the repository is not `owner/repo`
    pub fn resolve(access_token: Option<String>, repository: Option<String>) -> Result<Self> {
        let access_token = access_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::configuration(format!("{TOKEN_ENV} environment variable is required"))
            })?;

        let repository = repository
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| {
                Error::configuration(format!("{REPOSITORY_ENV} environment variable is required"))
            })?;

        let (owner, repo) = parse_repository(repository.trim())?;

        Ok(Self {
            access_token,
            owner,
            repo,
        })
    }

    /// Build credentials from CLI arguments, falling back to the environment
    ///
    /// # Errors
    /// See [`Credentials::resolve`]
    pub fn from_args_or_env(
        access_token: Option<String>,
        repository: Option<String>,
    ) -> Result<Self> {
        Self::resolve(
            access_token.or_else(|| std::env::var(TOKEN_ENV).ok()),
            repository.or_else(|| std::env::var(REPOSITORY_ENV).ok()),
        )
    }

    /// Repository in `owner/repo` form
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Parse repository string into owner and name
///
/// # Arguments
/// - `repo`: Repository string in "owner/repo" format
///
/// # Errors
/// Returns an error if the format is invalid
pub fn parse_repository(repo: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = repo.split('/').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(Error::InvalidRepositoryFormat(repo.to_string()));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}
