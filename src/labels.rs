//! Bot Label Planning
//!
//! Builds the set of labels the merge bot relies on

use std::collections::HashSet;

use crate::config::Triggers;

/// Description attached to every label this tool creates
pub const LABEL_DESCRIPTION: &str = "Automatically managed label for PR merge bot";

/// Label category, taken from the first list a label appears in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelCategory {
    AutoMerge,
    Skip,
}

impl LabelCategory {
    /// Label color (6-digit hex, without #)
    pub fn color(self) -> &'static str {
        match self {
            LabelCategory::AutoMerge => "0E8A16",
            LabelCategory::Skip => "D93F0B",
        }
    }
}

/// A label the bot needs to exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotLabel {
    pub name: String,
    pub category: LabelCategory,
}

impl BotLabel {
    pub fn color(&self) -> &'static str {
        self.category.color()
    }
}

/// Union of auto-merge and skip labels, first occurrence wins
pub fn plan_labels(triggers: &Triggers) -> Vec<BotLabel> {
    let auto_merge = triggers
        .auto_merge_labels
        .iter()
        .map(|name| (name, LabelCategory::AutoMerge));
    let skip = triggers
        .skip_labels
        .iter()
        .map(|name| (name, LabelCategory::Skip));

    let mut seen = HashSet::new();
    auto_merge
        .chain(skip)
        .filter(|(name, _)| seen.insert(name.as_str()))
        .map(|(name, category)| BotLabel {
            name: name.clone(),
            category,
        })
        .collect()
}
