//! Step model: one normalized recorded user action.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of recorded action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    Click,
    Input,
    Change,
    Keydown,
    Submit,
    Navigation,
}

impl StepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::Click => "click",
            StepType::Input => "input",
            StepType::Change => "change",
            StepType::Keydown => "keydown",
            StepType::Submit => "submit",
            StepType::Navigation => "navigation",
        }
    }
}

impl std::fmt::Display for StepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action payload. Text for input/navigation/keys, a flag for checkboxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepValue {
    Flag(bool),
    Text(String),
}

impl StepValue {
    /// The value as the page would report it (`true`, `false` or the text).
    pub fn as_text(&self) -> String {
        match self {
            StepValue::Flag(flag) => flag.to_string(),
            StepValue::Text(text) => text.clone(),
        }
    }

    /// Empty strings and `false` carry no payload.
    pub fn is_present(&self) -> bool {
        match self {
            StepValue::Flag(flag) => *flag,
            StepValue::Text(text) => !text.is_empty(),
        }
    }
}

impl From<&str> for StepValue {
    fn from(value: &str) -> Self {
        StepValue::Text(value.to_string())
    }
}

impl From<bool> for StepValue {
    fn from(value: bool) -> Self {
        StepValue::Flag(value)
    }
}

/// A step as reported by the capture collaborator, before acceptance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedStep {
    #[serde(rename = "type")]
    pub kind: StepType,

    /// Best-effort CSS locator.
    #[serde(default)]
    pub selector: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<StepValue>,

    /// Accessibility and test-id attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    /// Human readable name from label, aria-label, placeholder or title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Visible text of the target element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,

    #[serde(default)]
    pub url: String,

    /// Capture time in epoch milliseconds, as reported by the page.
    #[serde(default)]
    pub timestamp: i64,

    #[serde(default)]
    pub in_iframe: bool,
}

impl CapturedStep {
    pub fn new(kind: StepType, selector: impl Into<String>) -> Self {
        Self {
            kind,
            selector: selector.into(),
            value: None,
            attributes: BTreeMap::new(),
            label: None,
            text: None,
            tag_name: None,
            url: String::new(),
            timestamp: 0,
            in_iframe: false,
        }
    }

    pub fn with_value(mut self, value: impl Into<StepValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_tag(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = Some(tag_name.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Upper-cased tag name, empty when unknown.
    pub fn tag(&self) -> String {
        self.tag_name.as_deref().unwrap_or_default().to_ascii_uppercase()
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Accept the step into a session. This is the only way to build a [`Step`].
    pub fn accept(self, step_index: usize, arrival_seq: u64, canonical_ts: i64) -> Step {
        Step {
            action: self,
            step_index,
            arrival_seq,
            canonical_ts,
        }
    }
}

/// A step accepted into the authoritative session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(flatten)]
    pub action: CapturedStep,

    /// 0-based position at acceptance time.
    pub step_index: usize,

    /// Strictly increasing within one session.
    pub arrival_seq: u64,

    /// Acceptance time in epoch milliseconds.
    #[serde(default)]
    pub canonical_ts: i64,
}

impl Step {
    pub fn kind(&self) -> StepType {
        self.action.kind
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
