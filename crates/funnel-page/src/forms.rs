//! Submit-button UX for ajax forms.
//!
//! A submitted form's button is disabled and relabelled until the session
//! re-enables it after the configured delay.

use std::collections::HashMap;

use funnel_core::config::FormConfig;
use serde::Serialize;

/// Fallback identifier for forms without an id.
pub const UNKNOWN_FORM: &str = "unknown";

/// Visible state of a form's submit button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitButton {
    pub disabled: bool,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct FormController {
    submitting_label: String,
    idle_label: String,
    buttons: HashMap<String, SubmitButton>,
}

impl FormController {
    pub fn new(config: &FormConfig) -> Self {
        Self {
            submitting_label: config.submitting_label.clone(),
            idle_label: config.idle_label.clone(),
            buttons: HashMap::new(),
        }
    }

    /// Identifier reported for a form: its id, or `"unknown"` when missing or empty.
    pub fn form_key(form_id: Option<&str>) -> &str {
        form_id.filter(|id| !id.is_empty()).unwrap_or(UNKNOWN_FORM)
    }

    /// Disable the form's button for an in-flight submission.
    pub fn begin_submit(&mut self, key: &str) -> SubmitButton {
        let button = SubmitButton {
            disabled: true,
            label: self.submitting_label.clone(),
        };
        self.buttons.insert(key.to_string(), button.clone());
        button
    }

    /// Re-enable the form's button. `None` if the form never submitted.
    pub fn finish_submit(&mut self, key: &str) -> Option<SubmitButton> {
        let button = self.buttons.get_mut(key)?;
        button.disabled = false;
        button.label = self.idle_label.clone();
        Some(button.clone())
    }

    pub fn button(&self, key: &str) -> Option<&SubmitButton> {
        self.buttons.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_key() {
        assert_eq!(FormController::form_key(Some("signup")), "signup");
        assert_eq!(FormController::form_key(Some("")), "unknown");
        assert_eq!(FormController::form_key(None), "unknown");
    }

    #[test]
    fn test_submit_cycle() {
        let mut forms = FormController::new(&FormConfig::default());
        assert!(forms.button("signup").is_none());

        let button = forms.begin_submit("signup");
        assert!(button.disabled);
        assert_eq!(button.label, "Submitting...");
        assert_eq!(forms.button("signup"), Some(&button));

        let button = forms.finish_submit("signup").unwrap();
        assert!(!button.disabled);
        assert_eq!(button.label, "Submit");
    }

    #[test]
    fn test_finish_unknown_form() {
        let mut forms = FormController::new(&FormConfig::default());
        assert!(forms.finish_submit("never-submitted").is_none());
    }

    #[test]
    fn test_custom_labels() {
        let config = FormConfig {
            reenable_delay_ms: 10,
            submitting_label: "Sending".to_string(),
            idle_label: "Send".to_string(),
        };
        let mut forms = FormController::new(&config);
        assert_eq!(forms.begin_submit("a").label, "Sending");
        assert_eq!(forms.finish_submit("a").unwrap().label, "Send");
    }
}
