//! Pending point label typed into the annotation window.

use crate::config::LabelConfig;
use crate::error::{Error, Result};

/// Label that the next mark will carry.
#[derive(Debug, Clone, Default)]
pub struct LabelInput {
    text: String,
    auto_increment: bool,
}

impl LabelInput {
    /// Empty label with the configured auto-increment behaviour.
    pub fn new(config: LabelConfig) -> Self {
        Self {
            text: String::new(),
            auto_increment: config.auto_increment,
        }
    }

    /// The label as typed so far.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether nothing has been typed.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Append typed characters. Whitespace and control characters are
    /// dropped. Returns whether the label changed.
    pub fn push_str(&mut self, typed: &str) -> bool {
        let before = self.text.len();
        self.text
            .extend(typed.chars().filter(|c| !c.is_whitespace() && !c.is_control()));
        self.text.len() != before
    }

    /// Remove the last character. Returns whether the label changed.
    pub fn backspace(&mut self) -> bool {
        self.text.pop().is_some()
    }

    /// Drop the whole label.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Called after a successful mark.
    pub fn after_mark(&mut self) {
        if !self.auto_increment {
            return;
        }
        if let Some(next) = next_label(&self.text) {
            self.text = next;
        }
    }
}

/// Successor of a purely numeric label, keeping its zero padding.
///
/// `"7"` becomes `"8"`, `"09"` becomes `"10"`. Anything else has no successor.
pub fn next_label(label: &str) -> Option<String> {
    if label.is_empty() || !label.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let next = label.parse::<u64>().ok()?.checked_add(1)?;
    Some(format!("{:0width$}", next, width = label.len()))
}

/// Reject labels that cannot be written to the space-separated points log.
pub fn validate_label(label: &str) -> Result<()> {
    if label.is_empty() {
        return Err(Error::InvalidLabel {
            label: label.to_string(),
            reason: "label is empty",
        });
    }
    if label.chars().any(char::is_whitespace) {
        return Err(Error::InvalidLabel {
            label: label.to_string(),
            reason: "label contains whitespace",
        });
    }
    Ok(())
}
