//! Repository Reconciliation
//!
//! Brings branch protection, merge settings and bot labels in line with configuration

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::BotConfig;
use crate::error::{Error, Result};
use crate::github::RepositoryService;
use crate::labels::{plan_labels, BotLabel, LABEL_DESCRIPTION};
use crate::pattern::resolve_branches;
use crate::protection::{ProtectionSettings, RepositorySettings};

/// Classified failure of a single remote write
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFailure {
    NotFound,
    PermissionDenied,
    Other(String),
}

impl From<&Error> for ApiFailure {
    fn from(error: &Error) -> Self {
        match error {
            Error::NotFound(_) => ApiFailure::NotFound,
            Error::PermissionDenied(_) => ApiFailure::PermissionDenied,
            other => ApiFailure::Other(other.to_string()),
        }
    }
}

/// Result of one remote write
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Write succeeded
    Applied,

    /// Dry-run; the write was not sent
    Planned,

    /// Nothing to do (labels only)
    AlreadyExists,

    /// Write failed; the run continued
    Failed(ApiFailure),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// Protection result for one branch
#[derive(Debug, Clone, PartialEq)]
pub struct BranchOutcome {
    pub branch: String,
    pub settings: ProtectionSettings,
    pub outcome: Outcome,
}

/// Result for one bot label
#[derive(Debug, Clone, PartialEq)]
pub struct LabelOutcome {
    pub label: BotLabel,
    pub outcome: Outcome,
}

/// A step of a run that just finished
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    /// Branches that exist remotely
    BranchesListed(&'a [String]),

    /// Existing branches matched by the configured patterns; not sent when nothing matched
    BranchesResolved(&'a [String]),

    Branch(&'a BranchOutcome),

    RepositorySettings(&'a Outcome),

    Label(&'a LabelOutcome),
}

/// Everything a run did, item by item
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileReport {
    pub dry_run: bool,

    /// Existing branches matched by the configured patterns
    pub resolved_branches: Vec<String>,

    pub branches: Vec<BranchOutcome>,

    /// `None` when the run stopped early with nothing to protect
    pub repository_settings: Option<Outcome>,

    pub labels: Vec<LabelOutcome>,
}

impl ReconcileReport {
    fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            resolved_branches: Vec::new(),
            branches: Vec::new(),
            repository_settings: None,
            labels: Vec::new(),
        }
    }

    /// No configured pattern matched an existing branch
    pub fn nothing_to_protect(&self) -> bool {
        self.resolved_branches.is_empty()
    }

    /// Number of recoverable failures across all steps
    pub fn failure_count(&self) -> usize {
        let branches = self.branches.iter().filter(|b| b.outcome.is_failure()).count();
        let settings = self
            .repository_settings
            .iter()
            .filter(|o| o.is_failure())
            .count();
        let labels = self.labels.iter().filter(|l| l.outcome.is_failure()).count();
        branches + settings + labels
    }

    /// Labels created (or planned) by this run
    pub fn created_labels(&self) -> impl Iterator<Item = &BotLabel> {
        self.labels
            .iter()
            .filter(|l| matches!(l.outcome, Outcome::Applied | Outcome::Planned))
            .map(|l| &l.label)
    }
}

/// Reconciliation Engine
///
/// Applies a [`BotConfig`] to a repository through a [`RepositoryService`]
pub struct Reconciler<S> {
    service: S,
    config: BotConfig,
    dry_run: bool,
}

impl<S: RepositoryService> Reconciler<S> {
    /// Create a new reconciler
    pub fn new(service: S, config: BotConfig) -> Self {
        Self {
            service,
            config,
            dry_run: false,
        }
    }

    /// Read remote state but send no writes
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Access the underlying service
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Run every step
    ///
    /// Per-item write failures are recorded in the report; only failing to
    /// read remote state or an invalid pattern aborts the run.
    ///
    /// # Errors
    /// Returns an error if branches or labels cannot be listed
    pub async fn run(&self) -> Result<ReconcileReport> {
        self.run_with_progress(|_| {}).await
    }

    /// Run every step, reporting each one as soon as it finishes
    ///
    /// # Errors
    /// See [`Reconciler::run`]
    pub async fn run_with_progress<F>(&self, mut progress: F) -> Result<ReconcileReport>
    where
        F: FnMut(Progress<'_>),
    {
        let mut report = ReconcileReport::new(self.dry_run);

        let existing = self.service.list_branches().await?;
        debug!(branches = ?existing, "existing branches");
        progress(Progress::BranchesListed(&existing));

        report.resolved_branches =
            resolve_branches(&self.config.branch_protection.protected_branches, &existing)?;
        if report.nothing_to_protect() {
            warn!("no matching branches found to protect");
            return Ok(report);
        }
        progress(Progress::BranchesResolved(&report.resolved_branches));

        let settings = ProtectionSettings::from_config(&self.config);
        for branch in &report.resolved_branches {
            let outcome = self.protect_branch(branch, &settings).await;
            progress(Progress::Branch(&outcome));
            report.branches.push(outcome);
        }

        let outcome = self.update_repository_settings().await;
        progress(Progress::RepositorySettings(&outcome));
        report.repository_settings = Some(outcome);

        report.labels = self.reconcile_labels(&mut progress).await?;

        Ok(report)
    }

    /// Submit the protection payload for one branch
    async fn protect_branch(&self, branch: &str, settings: &ProtectionSettings) -> BranchOutcome {
        let outcome = if self.dry_run {
            Outcome::Planned
        } else {
            match self.service.update_branch_protection(branch, settings).await {
                Ok(()) => Outcome::Applied,
                Err(e) => {
                    warn!(%branch, error = %e, "failed to protect branch");
                    Outcome::Failed(ApiFailure::from(&e))
                }
            }
        };

        BranchOutcome {
            branch: branch.to_string(),
            settings: settings.clone(),
            outcome,
        }
    }

    /// Update merge strategies and branch auto-deletion
    async fn update_repository_settings(&self) -> Outcome {
        if self.dry_run {
            return Outcome::Planned;
        }

        let settings = RepositorySettings::from_config(&self.config);
        match self.service.update_repository_settings(&settings).await {
            Ok(()) => Outcome::Applied,
            Err(e) => {
                warn!(error = %e, "failed to update repository settings");
                Outcome::Failed(ApiFailure::from(&e))
            }
        }
    }

    /// Create bot labels that do not exist yet
    ///
    /// Existing labels are left untouched. Labels are only listed when the
    /// configuration names at least one.
    async fn reconcile_labels<F>(&self, progress: &mut F) -> Result<Vec<LabelOutcome>>
    where
        F: FnMut(Progress<'_>),
    {
        let planned = plan_labels(&self.config.triggers);
        if planned.is_empty() {
            return Ok(Vec::new());
        }

        let existing = self.service.list_labels().await?;
        let existing: HashSet<&str> = existing.iter().map(|l| l.name.as_str()).collect();

        let mut outcomes = Vec::with_capacity(planned.len());
        for label in planned {
            let outcome = if existing.contains(label.name.as_str()) {
                Outcome::AlreadyExists
            } else if self.dry_run {
                Outcome::Planned
            } else {
                match self
                    .service
                    .create_label(&label.name, label.color(), LABEL_DESCRIPTION)
                    .await
                {
                    Ok(()) => Outcome::Applied,
                    Err(e) => {
                        warn!(label = %label.name, error = %e, "failed to create label");
                        Outcome::Failed(ApiFailure::from(&e))
                    }
                }
            };

            let outcome = LabelOutcome { label, outcome };
            progress(Progress::Label(&outcome));
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}
