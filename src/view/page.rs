use std::collections::HashMap;
use std::fmt::Write as _;

use super::{InputId, OutputId, SelectorId, View, ACTIVE_MARKER, TAB_CONTENT_CLASS};
use crate::translate::LanguageOption;

#[derive(Debug, Clone)]
struct Panel {
    id: String,
    visible: bool,
}

#[derive(Debug, Clone)]
struct Trigger {
    id: String,
    target: String,
    active: bool,
}

#[derive(Debug, Clone, Default)]
struct Select {
    options: Vec<LanguageOption>,
    selected: usize,
}

/// In-memory page holding the elements the controller binds to
#[derive(Debug, Clone, Default)]
pub struct Page {
    panels: Vec<Panel>,
    triggers: Vec<Trigger>,
    selects: HashMap<SelectorId, Select>,
    inputs: HashMap<InputId, String>,
    outputs: HashMap<OutputId, String>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two tabs (detection, translation) and selectors holding a blank placeholder
    pub fn standard() -> Self {
        Self::new()
            .with_tab("detectionTab", "Detection")
            .with_tab("translationTab", "Translation")
            .with_placeholder(SelectorId::SourceLanguage, "Auto-detect")
            .with_placeholder(SelectorId::TargetLanguage, "Select language")
    }

    /// Add a hidden panel and the trigger that opens it
    pub fn with_tab(mut self, trigger_id: &str, panel_id: &str) -> Self {
        self.panels.push(Panel {
            id: panel_id.to_string(),
            visible: false,
        });
        self.triggers.push(Trigger {
            id: trigger_id.to_string(),
            target: panel_id.to_string(),
            active: false,
        });
        self
    }

    /// Placeholder option with an empty value; loaded options land after it
    pub fn with_placeholder(mut self, selector: SelectorId, label: &str) -> Self {
        self.selects
            .entry(selector)
            .or_default()
            .options
            .push(LanguageOption::new("", label));
        self
    }

    pub fn set_input(&mut self, input: InputId, value: impl Into<String>) {
        self.inputs.insert(input, value.into());
    }

    /// Select the first option with `code`; false if none matches
    pub fn select(&mut self, selector: SelectorId, code: &str) -> bool {
        let select = self.selects.entry(selector).or_default();
        match select.options.iter().position(|o| o.code == code) {
            Some(index) => {
                select.selected = index;
                true
            }
            None => false,
        }
    }

    pub fn options(&self, selector: SelectorId) -> &[LanguageOption] {
        self.selects
            .get(&selector)
            .map(|s| s.options.as_slice())
            .unwrap_or(&[])
    }

    pub fn output(&self, output: OutputId) -> &str {
        self.outputs.get(&output).map(String::as_str).unwrap_or("")
    }

    pub fn visible_panels(&self) -> Vec<&str> {
        self.panels
            .iter()
            .filter(|p| p.visible)
            .map(|p| p.id.as_str())
            .collect()
    }

    pub fn active_triggers(&self) -> Vec<&str> {
        self.triggers
            .iter()
            .filter(|t| t.active)
            .map(|t| t.id.as_str())
            .collect()
    }

    /// Plain-text snapshot for terminals and logs
    pub fn render(&self) -> String {
        let mut out = String::new();

        let tabs: Vec<String> = self
            .triggers
            .iter()
            .map(|t| {
                if t.active {
                    format!("[{}]", t.target)
                } else {
                    t.target.clone()
                }
            })
            .collect();
        let _ = writeln!(out, "tabs: {}", tabs.join(" | "));
        let _ = writeln!(
            out,
            "{}: {}",
            TAB_CONTENT_CLASS,
            self.visible_panels().join(", ")
        );

        for selector in [SelectorId::SourceLanguage, SelectorId::TargetLanguage] {
            let codes: Vec<&str> = self
                .options(selector)
                .iter()
                .filter(|o| !o.code.is_empty())
                .map(|o| o.code.as_str())
                .collect();
            let _ = writeln!(
                out,
                "{}: {:?} of [{}]",
                selector.as_str(),
                self.selected_value(selector),
                codes.join(", ")
            );
        }

        for output in [
            OutputId::DetectedLanguage,
            OutputId::DetectedLanguageTranslation,
            OutputId::Translation,
        ] {
            let _ = writeln!(out, "{}: {}", output.as_str(), self.output(output));
        }
        out
    }

    /// First trigger that opens `panel_id`
    pub fn trigger_for(&self, panel_id: &str) -> Option<String> {
        self.triggers
            .iter()
            .find(|t| t.target == panel_id)
            .map(|t| t.id.clone())
    }

    /// Class attribute a trigger would carry in markup
    pub fn trigger_class(&self, trigger_id: &str) -> Option<String> {
        self.triggers.iter().find(|t| t.id == trigger_id).map(|t| {
            if t.active {
                format!("{} {}", super::TAB_LINK_CLASS, ACTIVE_MARKER)
            } else {
                super::TAB_LINK_CLASS.to_string()
            }
        })
    }
}

impl View for Page {
    fn panel_ids(&self) -> Vec<String> {
        self.panels.iter().map(|p| p.id.clone()).collect()
    }

    fn has_panel(&self, panel_id: &str) -> bool {
        self.panels.iter().any(|p| p.id == panel_id)
    }

    fn set_panel_visible(&mut self, panel_id: &str, visible: bool) {
        if let Some(panel) = self.panels.iter_mut().find(|p| p.id == panel_id) {
            panel.visible = visible;
        }
    }

    fn trigger_ids(&self) -> Vec<String> {
        self.triggers.iter().map(|t| t.id.clone()).collect()
    }

    fn trigger_target(&self, trigger_id: &str) -> Option<String> {
        self.triggers
            .iter()
            .find(|t| t.id == trigger_id)
            .map(|t| t.target.clone())
    }

    fn set_trigger_active(&mut self, trigger_id: &str, active: bool) {
        if let Some(trigger) = self.triggers.iter_mut().find(|t| t.id == trigger_id) {
            trigger.active = active;
        }
    }

    fn input_value(&self, input: InputId) -> String {
        self.inputs.get(&input).cloned().unwrap_or_default()
    }

    fn selected_value(&self, selector: SelectorId) -> String {
        self.selects
            .get(&selector)
            .and_then(|s| s.options.get(s.selected))
            .map(|o| o.code.clone())
            .unwrap_or_default()
    }

    fn append_options(&mut self, selector: SelectorId, options: &[LanguageOption]) {
        self.selects
            .entry(selector)
            .or_default()
            .options
            .extend_from_slice(options);
    }

    fn set_output(&mut self, output: OutputId, text: &str) {
        self.outputs.insert(output, text.to_string());
    }
}
