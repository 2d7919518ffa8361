pub mod events;

#[cfg(test)]
mod tests;

pub use events::{LanguageLoad, Submission, SubmitEvent, TriggerEvent};

use dashmap::DashMap;
use futures::future::{abortable, AbortHandle};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::ViewConfig;
use crate::error::{ApiError, ViewError};
use crate::translate::{DetectionRequest, LanguageOption, TranslateApi, TranslationRequest};
use crate::view::{InputId, OutputId, SelectorId, View};
use events::{detected_label, error_label, translation_label};

/// Drives a page against the translation backend.
///
/// All view access goes through one async mutex that is never held across a
/// backend call, so overlapping submissions interleave the way browser event
/// handlers do.
pub struct ViewController<A, V> {
    session_id: Uuid,
    api: Arc<A>,
    view: Arc<Mutex<V>>,
    options: ViewConfig,
    attached: AtomicBool,
    detached: AtomicBool,
    loader: Mutex<Option<tokio::task::AbortHandle>>,
    in_flight: DashMap<Uuid, AbortHandle>,
    detection_seq: AtomicU64,
    translation_seq: AtomicU64,
}

impl<A, V> ViewController<A, V>
where
    A: TranslateApi + 'static,
    V: View + 'static,
{
    pub fn new(api: Arc<A>, view: V, options: ViewConfig) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            api,
            view: Arc::new(Mutex::new(view)),
            options,
            attached: AtomicBool::new(false),
            detached: AtomicBool::new(false),
            loader: Mutex::new(None),
            in_flight: DashMap::new(),
            detection_seq: AtomicU64::new(0),
            translation_seq: AtomicU64::new(0),
        }
    }

    pub fn view(&self) -> Arc<Mutex<V>> {
        Arc::clone(&self.view)
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst) && !self.detached.load(Ordering::SeqCst)
    }

    /// Open the initial tab and start loading both language lists.
    ///
    /// The returned handle resolves once both selectors have been populated
    /// (or failed). Dropping it does not cancel the load; `detach` does.
    pub async fn attach(self: &Arc<Self>) -> Result<JoinHandle<LanguageLoad>, ViewError> {
        self.ensure_live()?;
        if self.attached.swap(true, Ordering::SeqCst) {
            return Err(ViewError::AlreadyAttached);
        }
        info!(session = %self.session_id, "Attaching view controller");

        let initial = self.initial_trigger().await;
        let Some((trigger_id, panel_id)) = initial else {
            self.attached.store(false, Ordering::SeqCst);
            return Err(ViewError::NoTriggers);
        };
        self.open_tab(&TriggerEvent::new(trigger_id), &panel_id).await;

        let this = Arc::clone(self);
        let handle = tokio::spawn(async move { this.load_languages().await });
        *self.loader.lock().await = Some(handle.abort_handle());
        Ok(handle)
    }

    /// Stop the language load and every outstanding submission.
    ///
    /// Aborted submissions leave the page untouched. Idempotent.
    pub async fn detach(&self) {
        if self.detached.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(handle) = self.loader.lock().await.take() {
            handle.abort();
        }

        let keys: Vec<Uuid> = self.in_flight.iter().map(|entry| *entry.key()).collect();
        let mut aborted = 0;
        for key in keys {
            if let Some((_, handle)) = self.in_flight.remove(&key) {
                handle.abort();
                aborted += 1;
            }
        }

        info!(
            session = %self.session_id,
            "Detached view controller ({} in-flight request(s) aborted)",
            aborted
        );
    }

    /// Trigger/panel pair opened on attach: the configured default tab if the
    /// page has it, otherwise the first trigger in document order.
    async fn initial_trigger(&self) -> Option<(String, String)> {
        let view = self.view.lock().await;
        let triggers = view.trigger_ids();

        if let Some(wanted) = self.options.default_tab.as_deref() {
            let configured = triggers
                .iter()
                .find(|id| view.trigger_target(id).as_deref() == Some(wanted));
            match configured {
                Some(id) => return Some((id.clone(), wanted.to_string())),
                None => warn!("Configured default tab '{}' has no trigger", wanted),
            }
        }

        let first = triggers.into_iter().next()?;
        let target = view.trigger_target(&first)?;
        Some((first, target))
    }

    /// Show `panel_id` alone and mark the event's trigger active.
    ///
    /// An unknown panel id or trigger id changes nothing.
    pub async fn open_tab(&self, event: &TriggerEvent, panel_id: &str) {
        let mut view = self.view.lock().await;

        if !view.has_panel(panel_id) {
            warn!("No panel with id '{}', ignoring tab switch", panel_id);
            return;
        }
        if !view
            .trigger_ids()
            .iter()
            .any(|id| id == event.current_target())
        {
            warn!(
                "No trigger with id '{}', ignoring tab switch",
                event.current_target()
            );
            return;
        }

        for id in view.panel_ids() {
            view.set_panel_visible(&id, false);
        }
        for id in view.trigger_ids() {
            view.set_trigger_active(&id, false);
        }

        view.set_panel_visible(panel_id, true);
        view.set_trigger_active(event.current_target(), true);
        debug!("Opened tab '{}' via '{}'", panel_id, event.current_target());
    }

    /// Click a trigger by id. Returns false if the page has no such trigger.
    pub async fn click_trigger(&self, trigger_id: &str) -> bool {
        let target = self.view.lock().await.trigger_target(trigger_id);
        match target {
            Some(panel_id) => {
                self.open_tab(&TriggerEvent::new(trigger_id), &panel_id).await;
                true
            }
            None => {
                warn!("No trigger with id '{}'", trigger_id);
                false
            }
        }
    }

    /// Fetch both language lists concurrently and append them to their selectors.
    pub async fn load_languages(&self) -> LanguageLoad {
        let (source, target) = tokio::join!(
            self.populate(SelectorId::SourceLanguage, self.api.source_languages()),
            self.populate(SelectorId::TargetLanguage, self.api.target_languages()),
        );
        LanguageLoad { source, target }
    }

    async fn populate(
        &self,
        selector: SelectorId,
        fetch: impl Future<Output = Result<Vec<LanguageOption>, ApiError>>,
    ) -> Result<usize, ApiError> {
        match fetch.await {
            Ok(languages) => {
                self.view
                    .lock()
                    .await
                    .append_options(selector, &languages);
                info!("Loaded {} option(s) into {}", languages.len(), selector.as_str());
                Ok(languages.len())
            }
            Err(err) => {
                error!(
                    kind = err.kind(),
                    "Could not load options for {}: {}",
                    selector.as_str(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Handle a submit of the detection form
    pub async fn submit_detection(&self, event: &mut SubmitEvent) -> Result<Submission, ViewError> {
        event.prevent_default();
        self.ensure_live()?;

        let text = self.view.lock().await.input_value(InputId::DetectText);
        let seq = self.detection_seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            seq,
            form = event.form_id(),
            "Submitting detection ({} chars)",
            text.chars().count()
        );

        let request = DetectionRequest { text };
        let outcome = self.guarded(self.api.detect(&request)).await?;

        let mut view = self.view.lock().await;
        self.ensure_live()?;
        if self.is_stale(&self.detection_seq, seq) {
            debug!(seq, "Dropping superseded detection response");
            return Ok(Submission::Superseded);
        }

        match outcome {
            Ok(result) => {
                view.set_output(
                    OutputId::DetectedLanguage,
                    &detected_label(&result.detected_language),
                );
                Ok(Submission::Rendered)
            }
            Err(err) => {
                error!(seq, kind = err.kind(), "Detection failed: {}", err);
                view.set_output(OutputId::DetectedLanguage, &error_label(&err));
                Err(err.into())
            }
        }
    }

    /// Handle a submit of the translation form
    pub async fn submit_translation(
        &self,
        event: &mut SubmitEvent,
    ) -> Result<Submission, ViewError> {
        event.prevent_default();
        self.ensure_live()?;

        let request = {
            let view = self.view.lock().await;
            TranslationRequest {
                text: view.input_value(InputId::TranslateText),
                source_language: view.selected_value(SelectorId::SourceLanguage),
                target_language: view.selected_value(SelectorId::TargetLanguage),
            }
        };
        let seq = self.translation_seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            seq,
            form = event.form_id(),
            source = %request.source_language,
            target = %request.target_language,
            "Submitting translation"
        );

        let outcome = self.guarded(self.api.translate(&request)).await?;

        let mut view = self.view.lock().await;
        self.ensure_live()?;
        if self.is_stale(&self.translation_seq, seq) {
            debug!(seq, "Dropping superseded translation response");
            return Ok(Submission::Superseded);
        }

        match outcome {
            Ok(result) => {
                let detected = result
                    .reported_language()
                    .map(detected_label)
                    .unwrap_or_default();
                view.set_output(OutputId::DetectedLanguageTranslation, &detected);
                view.set_output(OutputId::Translation, &translation_label(&result.translation));
                Ok(Submission::Rendered)
            }
            Err(err) => {
                error!(seq, kind = err.kind(), "Translation failed: {}", err);
                view.set_output(OutputId::DetectedLanguageTranslation, "");
                view.set_output(OutputId::Translation, &error_label(&err));
                Err(err.into())
            }
        }
    }

    fn ensure_live(&self) -> Result<(), ViewError> {
        if self.detached.load(Ordering::SeqCst) {
            Err(ViewError::Detached)
        } else {
            Ok(())
        }
    }

    fn is_stale(&self, counter: &AtomicU64, seq: u64) -> bool {
        self.options.discard_stale_responses && counter.load(Ordering::SeqCst) != seq
    }

    /// Run a backend call that `detach` can abort
    async fn guarded<T>(&self, call: impl Future<Output = T>) -> Result<T, ViewError> {
        let (call, handle) = abortable(call);
        let key = Uuid::new_v4();
        self.in_flight.insert(key, handle);
        // entry goes away even if the caller drops this future early
        let _registration = InFlight {
            registry: &self.in_flight,
            key,
        };
        call.await.map_err(|_| ViewError::Aborted)
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }
}

struct InFlight<'a> {
    registry: &'a DashMap<Uuid, AbortHandle>,
    key: Uuid,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.registry.remove(&self.key);
    }
}
