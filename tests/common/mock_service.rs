//! In-memory repository service for testing
//!
//! Not every helper is used by every test binary.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use gh_branch_guard::error::{Error, Result};
use gh_branch_guard::github::{GitHubLabel, RepositoryService};
use gh_branch_guard::protection::{ProtectionSettings, RepositorySettings};

/// Call record for `create_label`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLabelCall {
    pub name: String,
    pub color: String,
    pub description: String,
}

/// Injected failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    NotFound,
    PermissionDenied,
    Other,
}

impl Failure {
    fn into_error(self, subject: &str) -> Error {
        match self {
            Failure::NotFound => Error::NotFound(subject.to_string()),
            Failure::PermissionDenied => Error::PermissionDenied(subject.to_string()),
            Failure::Other => Error::configuration(format!("server error for {subject}")),
        }
    }
}

/// Mock repository service
///
/// Features:
/// - Branch and label state, updated by successful writes
/// - Call tracking for verification
/// - Per-item error injection
#[derive(Default)]
pub struct MockRepositoryService {
    branches: Vec<String>,
    labels: Mutex<Vec<GitHubLabel>>,
    // Call tracking
    list_branches_calls: Mutex<usize>,
    list_labels_calls: Mutex<usize>,
    protection_calls: Mutex<Vec<(String, ProtectionSettings)>>,
    settings_calls: Mutex<Vec<RepositorySettings>>,
    create_label_calls: Mutex<Vec<CreateLabelCall>>,
    // Error injection
    protection_failures: Mutex<HashMap<String, Failure>>,
    label_failures: Mutex<HashMap<String, Failure>>,
    settings_failure: Mutex<Option<Failure>>,
    list_branches_failure: Mutex<Option<Failure>>,
}

impl MockRepositoryService {
    pub fn with_branches(branches: &[&str]) -> Self {
        Self {
            branches: branches.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_labels(self, labels: &[&str]) -> Self {
        *self.labels.lock().unwrap() = labels
            .iter()
            .map(|name| GitHubLabel {
                name: name.to_string(),
                color: "ededed".to_string(),
                description: None,
            })
            .collect();
        self
    }

    // === Error injection methods ===

    pub fn fail_protection(&self, branch: &str, failure: Failure) {
        self.protection_failures
            .lock()
            .unwrap()
            .insert(branch.to_string(), failure);
    }

    pub fn fail_label(&self, name: &str, failure: Failure) {
        self.label_failures
            .lock()
            .unwrap()
            .insert(name.to_string(), failure);
    }

    pub fn fail_settings(&self, failure: Failure) {
        *self.settings_failure.lock().unwrap() = Some(failure);
    }

    pub fn fail_list_branches(&self, failure: Failure) {
        *self.list_branches_failure.lock().unwrap() = Some(failure);
    }

    // === Call inspection ===

    pub fn list_branches_calls(&self) -> usize {
        *self.list_branches_calls.lock().unwrap()
    }

    pub fn list_labels_calls(&self) -> usize {
        *self.list_labels_calls.lock().unwrap()
    }

    pub fn protection_calls(&self) -> Vec<(String, ProtectionSettings)> {
        self.protection_calls.lock().unwrap().clone()
    }

    pub fn protected_branches(&self) -> Vec<String> {
        self.protection_calls()
            .into_iter()
            .map(|(branch, _)| branch)
            .collect()
    }

    pub fn settings_calls(&self) -> Vec<RepositorySettings> {
        self.settings_calls.lock().unwrap().clone()
    }

    pub fn create_label_calls(&self) -> Vec<CreateLabelCall> {
        self.create_label_calls.lock().unwrap().clone()
    }

    pub fn label_names(&self) -> Vec<String> {
        self.labels
            .lock()
            .unwrap()
            .iter()
            .map(|l| l.name.clone())
            .collect()
    }

    /// Total number of write calls of any kind
    pub fn write_calls(&self) -> usize {
        self.protection_calls.lock().unwrap().len()
            + self.settings_calls.lock().unwrap().len()
            + self.create_label_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RepositoryService for MockRepositoryService {
    async fn list_branches(&self) -> Result<Vec<String>> {
        *self.list_branches_calls.lock().unwrap() += 1;
        if let Some(failure) = *self.list_branches_failure.lock().unwrap() {
            return Err(failure.into_error("owner/repo"));
        }
        Ok(self.branches.clone())
    }

    async fn update_branch_protection(
        &self,
        branch: &str,
        settings: &ProtectionSettings,
    ) -> Result<()> {
        self.protection_calls
            .lock()
            .unwrap()
            .push((branch.to_string(), settings.clone()));

        match self.protection_failures.lock().unwrap().get(branch) {
            Some(failure) => Err(failure.into_error(branch)),
            None => Ok(()),
        }
    }

    async fn update_repository_settings(&self, settings: &RepositorySettings) -> Result<()> {
        self.settings_calls.lock().unwrap().push(settings.clone());

        match *self.settings_failure.lock().unwrap() {
            Some(failure) => Err(failure.into_error("owner/repo")),
            None => Ok(()),
        }
    }

    async fn list_labels(&self) -> Result<Vec<GitHubLabel>> {
        *self.list_labels_calls.lock().unwrap() += 1;
        Ok(self.labels.lock().unwrap().clone())
    }

    async fn create_label(&self, name: &str, color: &str, description: &str) -> Result<()> {
        self.create_label_calls.lock().unwrap().push(CreateLabelCall {
            name: name.to_string(),
            color: color.to_string(),
            description: description.to_string(),
        });

        if let Some(failure) = self.label_failures.lock().unwrap().get(name) {
            return Err(failure.into_error(name));
        }

        self.labels.lock().unwrap().push(GitHubLabel {
            name: name.to_string(),
            color: color.to_string(),
            description: Some(description.to_string()),
        });
        Ok(())
    }
}
