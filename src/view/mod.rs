pub mod page;

pub use page::Page;

use crate::translate::LanguageOption;

/// Class marker carried by every panel
pub const TAB_CONTENT_CLASS: &str = "tabcontent";
/// Class marker carried by every tab trigger
pub const TAB_LINK_CLASS: &str = "tablink";
/// Marker a trigger carries while its panel is shown
pub const ACTIVE_MARKER: &str = "active";

pub const DETECTION_FORM_ID: &str = "detectionForm";
pub const TRANSLATION_FORM_ID: &str = "translationForm";

/// Free-text inputs read at submit time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputId {
    DetectText,
    TranslateText,
}

impl InputId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DetectText => "detectText",
            Self::TranslateText => "translateText",
        }
    }
}

/// Language selectors populated from the backend lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorId {
    SourceLanguage,
    TargetLanguage,
}

impl SelectorId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SourceLanguage => "sourceLanguage",
            Self::TargetLanguage => "targetLanguage",
        }
    }
}

/// Elements whose text content the controller writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputId {
    DetectedLanguage,
    DetectedLanguageTranslation,
    Translation,
}

impl OutputId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DetectedLanguage => "detectedLanguage",
            Self::DetectedLanguageTranslation => "detectedLanguageTranslation",
            Self::Translation => "translation",
        }
    }
}

/// What the controller needs from the page it drives.
///
/// Panels and triggers are addressed by element id, everything else by the
/// typed ids above. Implementations must keep panel and trigger order stable.
pub trait View: Send {
    /// Ids of every `tabcontent` element, in document order
    fn panel_ids(&self) -> Vec<String>;

    fn has_panel(&self, panel_id: &str) -> bool {
        self.panel_ids().iter().any(|id| id == panel_id)
    }

    fn set_panel_visible(&mut self, panel_id: &str, visible: bool);

    /// Ids of every `tablink` element, in document order
    fn trigger_ids(&self) -> Vec<String>;

    /// Panel a trigger opens when clicked
    fn trigger_target(&self, trigger_id: &str) -> Option<String>;

    fn set_trigger_active(&mut self, trigger_id: &str, active: bool);

    fn input_value(&self, input: InputId) -> String;

    /// Value of the currently selected option
    fn selected_value(&self, selector: SelectorId) -> String;

    /// Append options after whatever the selector already holds
    fn append_options(&mut self, selector: SelectorId, options: &[LanguageOption]);

    fn set_output(&mut self, output: OutputId, text: &str);
}
