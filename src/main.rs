//! gh-branch-guard CLI
//!
//! Command line tool that applies branch protection and merge-bot settings to a repository

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use gh_branch_guard::{
    config::DEFAULT_CONFIG_PATH,
    load_config,
    reconcile::{ApiFailure, BranchOutcome, LabelOutcome, Outcome, Progress, ReconcileReport},
    BotConfig, Credentials, GitHubClient, Reconciler, Result,
};

/// gh-branch-guard CLI
///
/// Configure branch protection, merge settings and bot labels from a YAML file
#[derive(Parser)]
#[command(
    name = "gh-branch-guard",
    version,
    about = "Configure GitHub branch protection, merge settings and bot labels",
    long_about = "Reads the bot configuration and applies branch protection rules, repository \
    merge settings and merge-bot labels. Every change is an idempotent set, so re-running after a \
    partial failure is safe."
)]
struct Cli {
    /// GitHub access token (defaults to GITHUB_TOKEN)
    #[arg(short = 't', long)]
    access_token: Option<String>,

    /// Target repository in owner/repo format (defaults to GITHUB_REPOSITORY)
    #[arg(short = 'r', long)]
    repository: Option<String>,

    /// Bot configuration file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Dry run mode (read remote state, don't make changes)
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "💥 Fatal error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Send diagnostics to stderr; `RUST_LOG` overrides the level
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Execute a reconciliation run
async fn run(cli: Cli) -> Result<()> {
    let credentials = Credentials::from_args_or_env(cli.access_token, cli.repository)?;

    println!(
        "Setting up branch protection for {}...",
        credentials.full_name().cyan()
    );
    if cli.dry_run {
        println!(
            "{} Running in dry-run mode (no changes will be made)",
            "!".yellow()
        );
    }

    println!("Loading bot configuration...");
    let config = load_config(&cli.config)?;
    println!("{} Bot configuration loaded", "✅".green());
    println!(
        "Protected branches: {}",
        config.branch_protection.protected_branches.join(", ")
    );

    let client = GitHubClient::new(&credentials)?;
    let reconciler = Reconciler::new(client, config.clone()).dry_run(cli.dry_run);

    println!("Fetching repository branches...");
    let report = reconciler
        .run_with_progress(|step| display_progress(step, &config))
        .await?;

    if report.nothing_to_protect() {
        println!("{}  No matching branches found to protect", "⚠️".yellow());
        return Ok(());
    }

    display_summary(&report, &cli.config);
    Ok(())
}

/// Display each step as the run reaches it
fn display_progress(step: Progress<'_>, config: &BotConfig) {
    match step {
        Progress::BranchesListed(branches) => {
            println!("Found branches: {}", branches.join(", "));
        }
        Progress::BranchesResolved(branches) => {
            println!("Branches to protect: {}", branches.join(", ").cyan());
        }
        Progress::Branch(branch) => display_branch(branch),
        Progress::RepositorySettings(outcome) => {
            display_repository_settings(outcome, config);
            println!("\n🏷️  Setting up required labels...");
        }
        Progress::Label(label) => display_label(label),
    }
}

fn display_repository_settings(outcome: &Outcome, config: &BotConfig) {
    println!("\n⚙️  Configuring repository settings...");
    match outcome {
        Outcome::Failed(failure) => println!(
            "{}  Could not update repository settings: {}",
            "⚠️".yellow(),
            describe_failure(failure)
        ),
        Outcome::Planned => println!(
            "{} Would update repository settings (delete branch on merge: {})",
            "•".blue(),
            config.merge.delete_branch_after_merge
        ),
        Outcome::Applied | Outcome::AlreadyExists => {
            println!("{} Repository settings updated", "✅".green())
        }
    }
}

/// Display the closing summary and next steps
fn display_summary(report: &ReconcileReport, config_path: &Path) {
    let failures = report.failure_count();
    if failures > 0 {
        println!(
            "\n{} {} step(s) failed; re-run after fixing the cause",
            "⚠️".yellow(),
            failures.to_string().red()
        );
    }

    if report.dry_run {
        println!("\n{} Dry run completed, no changes were made", "📋".blue());
    } else {
        println!("\n{} Branch protection setup completed!", "🎉".green());
    }

    println!("\nNext steps:");
    println!("1. Verify that the GitHub Actions have the necessary permissions");
    println!("2. Test the bot by creating a PR and checking if it gets auto-merged");
    println!("3. Monitor the bot logs in the Actions tab");
    println!(
        "4. Adjust the configuration in {} as needed",
        config_path.display().to_string().cyan()
    );
}

fn display_branch(branch: &BranchOutcome) {
    println!(
        "\n🔒 Setting up protection for branch: {}",
        branch.branch.cyan()
    );

    match &branch.outcome {
        Outcome::Failed(ApiFailure::NotFound) => {
            println!("{} Branch not found: {}", "❌".red(), branch.branch);
            return;
        }
        Outcome::Failed(ApiFailure::PermissionDenied) => {
            println!("{} Permission denied for branch: {}", "❌".red(), branch.branch);
            println!("   Make sure you have admin permissions on this repository");
            return;
        }
        Outcome::Failed(ApiFailure::Other(message)) => {
            println!(
                "{} Failed to protect branch {}: {}",
                "❌".red(),
                branch.branch,
                message
            );
            return;
        }
        Outcome::Planned => println!(
            "{} Would configure protection for: {}",
            "•".blue(),
            branch.branch
        ),
        Outcome::Applied | Outcome::AlreadyExists => {
            println!("{} Branch protection configured for: {}", "✅".green(), branch.branch)
        }
    }

    let settings = &branch.settings;
    let reviews = &settings.required_pull_request_reviews;
    println!(
        "   - Required approvals: {}",
        reviews.required_approving_review_count
    );
    println!("   - Dismiss stale reviews: {}", reviews.dismiss_stale_reviews);
    println!("   - Allow force pushes: {}", settings.allow_force_pushes);
    println!("   - Allow deletions: {}", settings.allow_deletions);

    if let Some(checks) = &settings.required_status_checks {
        println!("   - Required status checks: {}", checks.contexts.join(", "));
        println!("   - Require up-to-date: {}", checks.strict);
    }
}

fn display_label(label: &LabelOutcome) {
    let name = &label.label.name;
    match &label.outcome {
        Outcome::Applied => println!("{} Created label: {}", "✅".green(), name.cyan()),
        Outcome::Planned => println!(
            "{} Would create label: {} (#{})",
            "•".blue(),
            name.cyan(),
            label.label.color()
        ),
        Outcome::AlreadyExists => println!("{} Label already exists: {}", "✅".green(), name),
        Outcome::Failed(failure) => println!(
            "{}  Could not create label {}: {}",
            "⚠️".yellow(),
            name,
            describe_failure(failure)
        ),
    }
}

fn describe_failure(failure: &ApiFailure) -> String {
    match failure {
        ApiFailure::NotFound => "not found".to_string(),
        ApiFailure::PermissionDenied => "permission denied".to_string(),
        ApiFailure::Other(message) => message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gh_branch_guard::labels::{BotLabel, LabelCategory};
    use gh_branch_guard::protection::ProtectionSettings;

    fn sample_report(dry_run: bool) -> ReconcileReport {
        let config = BotConfig::default();
        let settings = ProtectionSettings::from_config(&config);
        ReconcileReport {
            dry_run,
            resolved_branches: vec!["main".to_string(), "release-1".to_string()],
            branches: vec![
                BranchOutcome {
                    branch: "main".to_string(),
                    settings: settings.clone(),
                    outcome: Outcome::Applied,
                },
                BranchOutcome {
                    branch: "release-1".to_string(),
                    settings,
                    outcome: Outcome::Failed(ApiFailure::PermissionDenied),
                },
            ],
            repository_settings: Some(Outcome::Failed(ApiFailure::Other("boom".to_string()))),
            labels: vec![
                LabelOutcome {
                    label: BotLabel {
                        name: "automerge".to_string(),
                        category: LabelCategory::AutoMerge,
                    },
                    outcome: Outcome::Applied,
                },
                LabelOutcome {
                    label: BotLabel {
                        name: "wip".to_string(),
                        category: LabelCategory::Skip,
                    },
                    outcome: Outcome::AlreadyExists,
                },
            ],
        }
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["gh-branch-guard"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(!cli.dry_run);
        assert!(cli.access_token.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "gh-branch-guard",
            "-t",
            "token",
            "-r",
            "owner/repo",
            "--config",
            "bot.yml",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(cli.access_token.as_deref(), Some("token"));
        assert_eq!(cli.repository.as_deref(), Some("owner/repo"));
        assert_eq!(cli.config, PathBuf::from("bot.yml"));
        assert!(cli.dry_run);
    }

    #[test]
    fn test_describe_failure() {
        assert_eq!(describe_failure(&ApiFailure::NotFound), "not found");
        assert_eq!(
            describe_failure(&ApiFailure::PermissionDenied),
            "permission denied"
        );
        assert_eq!(describe_failure(&ApiFailure::Other("x".to_string())), "x");
    }

    #[test]
    fn test_display_progress_and_summary() {
        // Should not panic
        let config = BotConfig::default();
        for dry_run in [false, true] {
            let report = sample_report(dry_run);
            let listed = vec!["main".to_string(), "dev".to_string()];
            display_progress(Progress::BranchesListed(&listed), &config);
            display_progress(Progress::BranchesResolved(&report.resolved_branches), &config);
            for branch in &report.branches {
                display_progress(Progress::Branch(branch), &config);
            }
            if let Some(outcome) = &report.repository_settings {
                display_progress(Progress::RepositorySettings(outcome), &config);
            }
            display_progress(Progress::RepositorySettings(&Outcome::Planned), &config);
            for label in &report.labels {
                display_progress(Progress::Label(label), &config);
            }
            display_summary(&report, Path::new(DEFAULT_CONFIG_PATH));
        }
    }
}
