use crate::error::ApiError;

/// Click on a tab trigger
#[derive(Debug, Clone)]
pub struct TriggerEvent {
    current_target: String,
}

impl TriggerEvent {
    pub fn new(trigger_id: impl Into<String>) -> Self {
        Self {
            current_target: trigger_id.into(),
        }
    }

    /// Id of the trigger that received the click
    pub fn current_target(&self) -> &str {
        &self.current_target
    }
}

/// Native form submission; handlers cancel the default navigation
#[derive(Debug, Clone)]
pub struct SubmitEvent {
    form_id: String,
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new(form_id: impl Into<String>) -> Self {
        Self {
            form_id: form_id.into(),
            default_prevented: false,
        }
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// How a form submission ended when no error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The response was written to the page
    Rendered,
    /// A newer submission of the same form was issued; the response was dropped
    Superseded,
}

/// Result of populating both selectors
#[derive(Debug)]
pub struct LanguageLoad {
    /// Number of options appended, or why the list could not be fetched
    pub source: Result<usize, ApiError>,
    pub target: Result<usize, ApiError>,
}

impl LanguageLoad {
    pub fn is_complete(&self) -> bool {
        self.source.is_ok() && self.target.is_ok()
    }
}

pub fn detected_label(code: &str) -> String {
    format!("Detected Language: {}", code)
}

pub fn translation_label(text: &str) -> String {
    format!("Translation: {}", text)
}

pub fn error_label(err: &ApiError) -> String {
    format!("Error: {}", err)
}
