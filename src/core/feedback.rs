use serde::Serialize;
use std::collections::BTreeMap;

/// Inline feedback next to one input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub valid: bool,
    pub message: String,
}

/// 每個欄位的提示訊息；第一次需要時建立，之後重複使用
#[derive(Debug, Clone, Default)]
pub struct FeedbackBoard {
    entries: BTreeMap<String, Feedback>,
}

impl FeedbackBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, field: &str, valid: bool, message: &str) {
        tracing::debug!(
            "Showing feedback for {}: isValid={}, message=\"{}\"",
            field,
            valid,
            message
        );
        let entry = self.entries.entry(field.to_string()).or_default();
        entry.valid = valid;
        entry.message = message.to_string();
    }

    pub fn get(&self, field: &str) -> Option<&Feedback> {
        self.entries.get(field)
    }

    pub fn is_invalid(&self, field: &str) -> bool {
        self.entries.get(field).map(|f| !f.valid).unwrap_or(false)
    }

    pub fn invalid_fields(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, f)| !f.valid)
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Blanks every message and drops invalid markers; entries stay allocated.
    pub fn clear_all(&mut self) {
        for feedback in self.entries.values_mut() {
            feedback.valid = true;
            feedback.message.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
