use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use super::*;
use crate::translate::{DetectionResult, TranslationResult};
use crate::view::{Page, DETECTION_FORM_ID, TRANSLATION_FORM_ID};

type Scripted<T> = StdMutex<VecDeque<(Duration, Result<T, ApiError>)>>;

/// Backend double answering from queues, optionally after a delay
#[derive(Default)]
struct FakeApi {
    source: StdMutex<Option<Result<Vec<LanguageOption>, ApiError>>>,
    target: StdMutex<Option<Result<Vec<LanguageOption>, ApiError>>>,
    detections: Scripted<DetectionResult>,
    translations: Scripted<TranslationResult>,
    detect_requests: StdMutex<Vec<DetectionRequest>>,
    translate_requests: StdMutex<Vec<TranslationRequest>>,
}

impl FakeApi {
    fn with_languages(source: Vec<LanguageOption>, target: Vec<LanguageOption>) -> Self {
        let api = Self::default();
        *api.source.lock().unwrap() = Some(Ok(source));
        *api.target.lock().unwrap() = Some(Ok(target));
        api
    }

    fn detection(self, delay_ms: u64, result: Result<DetectionResult, ApiError>) -> Self {
        self.detections
            .lock()
            .unwrap()
            .push_back((Duration::from_millis(delay_ms), result));
        self
    }

    fn translation(self, delay_ms: u64, result: Result<TranslationResult, ApiError>) -> Self {
        self.translations
            .lock()
            .unwrap()
            .push_back((Duration::from_millis(delay_ms), result));
        self
    }
}

fn server_error(path: &str) -> ApiError {
    ApiError::Status {
        url: format!("http://backend{}", path),
        status: 500,
        body: "Internal Server Error".to_string(),
    }
}

#[async_trait]
impl TranslateApi for FakeApi {
    async fn source_languages(&self) -> Result<Vec<LanguageOption>, ApiError> {
        self.source
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn target_languages(&self) -> Result<Vec<LanguageOption>, ApiError> {
        self.target
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn detect(&self, request: &DetectionRequest) -> Result<DetectionResult, ApiError> {
        self.detect_requests.lock().unwrap().push(request.clone());
        let (delay, result) = self
            .detections
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected detect call");
        tokio::time::sleep(delay).await;
        result
    }

    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, ApiError> {
        self.translate_requests.lock().unwrap().push(request.clone());
        let (delay, result) = self
            .translations
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected translate call");
        tokio::time::sleep(delay).await;
        result
    }
}

fn controller(api: FakeApi) -> Arc<ViewController<FakeApi, Page>> {
    Arc::new(ViewController::new(
        Arc::new(api),
        Page::standard(),
        ViewConfig::default(),
    ))
}

fn english_french() -> Vec<LanguageOption> {
    vec![
        LanguageOption::new("en", "English"),
        LanguageOption::new("fr", "French"),
    ]
}

#[tokio::test]
async fn every_switch_leaves_exactly_one_panel_and_trigger() {
    let ctl = controller(FakeApi::default());

    for (trigger, panel) in [
        ("translationTab", "Translation"),
        ("detectionTab", "Detection"),
        ("detectionTab", "Detection"),
        ("translationTab", "Translation"),
    ] {
        ctl.open_tab(&TriggerEvent::new(trigger), panel).await;
        let view = ctl.view();
        let page = view.lock().await;
        assert_eq!(page.visible_panels(), vec![panel]);
        assert_eq!(page.active_triggers(), vec![trigger]);
    }
}

#[tokio::test]
async fn unknown_panel_id_changes_nothing() {
    let ctl = controller(FakeApi::default());
    ctl.open_tab(&TriggerEvent::new("detectionTab"), "Detection")
        .await;

    ctl.open_tab(&TriggerEvent::new("translationTab"), "Nope")
        .await;

    let view = ctl.view();
    let page = view.lock().await;
    assert_eq!(page.visible_panels(), vec!["Detection"]);
    assert_eq!(page.active_triggers(), vec!["detectionTab"]);
}

#[tokio::test]
async fn unknown_trigger_id_changes_nothing() {
    let ctl = controller(FakeApi::default());
    ctl.open_tab(&TriggerEvent::new("detectionTab"), "Detection")
        .await;

    ctl.open_tab(&TriggerEvent::new("ghostTab"), "Translation")
        .await;

    let view = ctl.view();
    let page = view.lock().await;
    assert_eq!(page.visible_panels(), vec!["Detection"]);
    assert_eq!(page.active_triggers(), vec!["detectionTab"]);
}

#[tokio::test]
async fn attach_opens_first_tab_and_loads_languages_in_order() {
    let ctl = controller(FakeApi::with_languages(
        english_french(),
        vec![LanguageOption::new("de", "German")],
    ));

    let load = ctl.attach().await.unwrap().await.unwrap();
    assert!(load.is_complete());
    assert_eq!(load.source.unwrap(), 2);

    let view = ctl.view();
    let page = view.lock().await;
    assert_eq!(page.visible_panels(), vec!["Detection"]);
    assert_eq!(page.active_triggers(), vec!["detectionTab"]);

    let source: Vec<&str> = page
        .options(SelectorId::SourceLanguage)
        .iter()
        .map(|o| o.code.as_str())
        .collect();
    // placeholder stays ahead of the loaded entries
    assert_eq!(source, vec!["", "en", "fr"]);
    assert_eq!(page.options(SelectorId::TargetLanguage).len(), 2);
}

#[tokio::test]
async fn attach_honours_configured_default_tab() {
    let options = ViewConfig {
        default_tab: Some("Translation".to_string()),
        ..ViewConfig::default()
    };
    let ctl = Arc::new(ViewController::new(
        Arc::new(FakeApi::default()),
        Page::standard(),
        options,
    ));
    ctl.attach().await.unwrap().await.unwrap();

    let view = ctl.view();
    let page = view.lock().await;
    assert_eq!(page.visible_panels(), vec!["Translation"]);
    assert_eq!(page.active_triggers(), vec!["translationTab"]);
}

#[tokio::test]
async fn attach_twice_is_rejected() {
    let ctl = controller(FakeApi::default());
    ctl.attach().await.unwrap();
    assert!(matches!(
        ctl.attach().await,
        Err(ViewError::AlreadyAttached)
    ));
}

#[tokio::test]
async fn attach_without_triggers_fails() {
    let ctl = Arc::new(ViewController::new(
        Arc::new(FakeApi::default()),
        Page::new(),
        ViewConfig::default(),
    ));
    assert!(matches!(ctl.attach().await, Err(ViewError::NoTriggers)));
    assert!(!ctl.is_attached());
}

#[tokio::test]
async fn failed_list_does_not_block_the_other() {
    let api = FakeApi::with_languages(Vec::new(), english_french());
    *api.source.lock().unwrap() = Some(Err(server_error("/translate/source-languages")));
    let ctl = controller(api);

    let load = ctl.load_languages().await;
    assert!(load.source.is_err());
    assert_eq!(load.target.unwrap(), 2);

    let view = ctl.view();
    let page = view.lock().await;
    assert_eq!(page.options(SelectorId::SourceLanguage).len(), 1);
    assert_eq!(page.options(SelectorId::TargetLanguage).len(), 3);
}

#[tokio::test]
async fn detection_renders_label_and_prevents_navigation() {
    let api = FakeApi::default().detection(
        0,
        Ok(DetectionResult {
            detected_language: "fr".to_string(),
        }),
    );
    let ctl = controller(api);
    ctl.view()
        .lock()
        .await
        .set_input(InputId::DetectText, "Bonjour");

    let mut event = SubmitEvent::new(DETECTION_FORM_ID);
    let outcome = ctl.submit_detection(&mut event).await.unwrap();

    assert_eq!(outcome, Submission::Rendered);
    assert!(event.default_prevented());
    let view = ctl.view();
    let page = view.lock().await;
    assert_eq!(page.output(OutputId::DetectedLanguage), "Detected Language: fr");
}

#[tokio::test]
async fn empty_detection_text_is_forwarded() {
    let api = Arc::new(FakeApi::default().detection(
        0,
        Ok(DetectionResult {
            detected_language: "en".to_string(),
        }),
    ));
    let ctl = ViewController::new(Arc::clone(&api), Page::standard(), ViewConfig::default());

    ctl.submit_detection(&mut SubmitEvent::new(DETECTION_FORM_ID))
        .await
        .unwrap();

    let sent = api.detect_requests.lock().unwrap();
    assert_eq!(sent.as_slice(), &[DetectionRequest { text: String::new() }]);
}

#[tokio::test]
async fn detection_failure_is_written_to_output() {
    let api = FakeApi::default().detection(0, Err(server_error("/detect")));
    let ctl = controller(api);

    let mut event = SubmitEvent::new(DETECTION_FORM_ID);
    let err = ctl.submit_detection(&mut event).await.unwrap_err();

    assert!(matches!(err, ViewError::Api(ApiError::Status { status: 500, .. })));
    assert!(event.default_prevented());
    let view = ctl.view();
    let page = view.lock().await;
    assert!(page
        .output(OutputId::DetectedLanguage)
        .starts_with("Error: http://backend/detect returned HTTP 500"));
}

#[tokio::test]
async fn translation_without_detected_language_clears_that_line() {
    let api = FakeApi::default().translation(
        0,
        Ok(TranslationResult {
            detected_language: None,
            translation: "Hello".to_string(),
        }),
    );
    let ctl = controller(api);
    {
        let view = ctl.view();
        let mut page = view.lock().await;
        page.set_output(OutputId::DetectedLanguageTranslation, "stale");
    }

    let mut event = SubmitEvent::new(TRANSLATION_FORM_ID);
    ctl.submit_translation(&mut event).await.unwrap();

    assert!(event.default_prevented());
    let view = ctl.view();
    let page = view.lock().await;
    assert_eq!(page.output(OutputId::DetectedLanguageTranslation), "");
    assert_eq!(page.output(OutputId::Translation), "Translation: Hello");
}

#[tokio::test]
async fn empty_detected_language_is_treated_as_absent() {
    let api = FakeApi::default().translation(
        0,
        Ok(TranslationResult {
            detected_language: Some(String::new()),
            translation: "Hello".to_string(),
        }),
    );
    let ctl = controller(api);
    {
        let view = ctl.view();
        let mut page = view.lock().await;
        page.set_output(OutputId::DetectedLanguageTranslation, "Detected Language: de");
    }

    ctl.submit_translation(&mut SubmitEvent::new(TRANSLATION_FORM_ID))
        .await
        .unwrap();

    let view = ctl.view();
    let page = view.lock().await;
    assert_eq!(page.output(OutputId::DetectedLanguageTranslation), "");
    assert_eq!(page.output(OutputId::Translation), "Translation: Hello");
}

#[tokio::test]
async fn translation_with_detected_language_renders_both_lines() {
    let api = FakeApi::default().translation(
        0,
        Ok(TranslationResult {
            detected_language: Some("fr".to_string()),
            translation: "Hello".to_string(),
        }),
    );
    let ctl = controller(api);

    ctl.submit_translation(&mut SubmitEvent::new(TRANSLATION_FORM_ID))
        .await
        .unwrap();

    let view = ctl.view();
    let page = view.lock().await;
    assert_eq!(
        page.output(OutputId::DetectedLanguageTranslation),
        "Detected Language: fr"
    );
    assert_eq!(page.output(OutputId::Translation), "Translation: Hello");
}

#[tokio::test]
async fn translation_sends_current_selection_verbatim() {
    let api = Arc::new(
        FakeApi::with_languages(english_french(), english_french()).translation(
            0,
            Ok(TranslationResult {
                detected_language: None,
                translation: "Bonjour".to_string(),
            }),
        ),
    );
    let ctl = ViewController::new(Arc::clone(&api), Page::standard(), ViewConfig::default());
    ctl.load_languages().await;
    {
        let view = ctl.view();
        let mut page = view.lock().await;
        page.set_input(InputId::TranslateText, "Hello");
        // source left on the blank placeholder
        assert!(page.select(SelectorId::TargetLanguage, "fr"));
    }

    ctl.submit_translation(&mut SubmitEvent::new(TRANSLATION_FORM_ID))
        .await
        .unwrap();

    let sent = api.translate_requests.lock().unwrap();
    assert_eq!(
        sent.as_slice(),
        &[TranslationRequest {
            text: "Hello".to_string(),
            source_language: String::new(),
            target_language: "fr".to_string(),
        }]
    );
}

#[tokio::test]
async fn translation_failure_replaces_both_lines() {
    let api = FakeApi::default().translation(
        0,
        Err(ApiError::Decode {
            url: "http://backend/translate".to_string(),
            reason: "missing field `translation`".to_string(),
        }),
    );
    let ctl = controller(api);
    {
        let view = ctl.view();
        let mut page = view.lock().await;
        page.set_output(OutputId::DetectedLanguageTranslation, "Detected Language: de");
        page.set_output(OutputId::Translation, "Translation: old");
    }

    assert!(ctl
        .submit_translation(&mut SubmitEvent::new(TRANSLATION_FORM_ID))
        .await
        .is_err());

    let view = ctl.view();
    let page = view.lock().await;
    assert_eq!(page.output(OutputId::DetectedLanguageTranslation), "");
    assert!(page
        .output(OutputId::Translation)
        .contains("missing field `translation`"));
}

fn detected(code: &str) -> Result<DetectionResult, ApiError> {
    Ok(DetectionResult {
        detected_language: code.to_string(),
    })
}

#[tokio::test]
async fn slower_older_response_is_discarded() {
    // first submission answers last
    let api = FakeApi::default()
        .detection(80, detected("fr"))
        .detection(0, detected("de"));
    let ctl = controller(api);

    let mut first = SubmitEvent::new(DETECTION_FORM_ID);
    let mut second = SubmitEvent::new(DETECTION_FORM_ID);
    let first_fut = ctl.submit_detection(&mut first);
    let second_fut = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        ctl.submit_detection(&mut second).await
    };
    let (a, b) = tokio::join!(first_fut, second_fut);

    assert_eq!(a.unwrap(), Submission::Superseded);
    assert_eq!(b.unwrap(), Submission::Rendered);
    let view = ctl.view();
    let page = view.lock().await;
    assert_eq!(page.output(OutputId::DetectedLanguage), "Detected Language: de");
}

fn translated(text: &str, detected: Option<&str>) -> Result<TranslationResult, ApiError> {
    Ok(TranslationResult {
        detected_language: detected.map(str::to_string),
        translation: text.to_string(),
    })
}

#[tokio::test]
async fn slower_older_translation_is_discarded() {
    let api = FakeApi::default()
        .translation(80, translated("Hello", Some("fr")))
        .translation(0, translated("Hallo", None));
    let ctl = controller(api);

    let mut first = SubmitEvent::new(TRANSLATION_FORM_ID);
    let mut second = SubmitEvent::new(TRANSLATION_FORM_ID);
    let first_fut = ctl.submit_translation(&mut first);
    let second_fut = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        ctl.submit_translation(&mut second).await
    };
    let (a, b) = tokio::join!(first_fut, second_fut);

    assert_eq!(a.unwrap(), Submission::Superseded);
    assert_eq!(b.unwrap(), Submission::Rendered);
    let view = ctl.view();
    let page = view.lock().await;
    assert_eq!(page.output(OutputId::DetectedLanguageTranslation), "");
    assert_eq!(page.output(OutputId::Translation), "Translation: Hallo");
}

#[tokio::test]
async fn detection_and_translation_counters_are_independent() {
    let api = FakeApi::default()
        .translation(40, translated("Hello", None))
        .detection(0, detected("de"));
    let ctl = controller(api);

    let mut translate = SubmitEvent::new(TRANSLATION_FORM_ID);
    let mut detect = SubmitEvent::new(DETECTION_FORM_ID);
    let (a, b) = tokio::join!(
        ctl.submit_translation(&mut translate),
        ctl.submit_detection(&mut detect)
    );

    assert_eq!(a.unwrap(), Submission::Rendered);
    assert_eq!(b.unwrap(), Submission::Rendered);
    let view = ctl.view();
    let page = view.lock().await;
    assert_eq!(page.output(OutputId::Translation), "Translation: Hello");
    assert_eq!(page.output(OutputId::DetectedLanguage), "Detected Language: de");
}

#[tokio::test]
async fn last_arrival_wins_when_discard_is_disabled() {
    let api = FakeApi::default()
        .detection(80, detected("fr"))
        .detection(0, detected("de"));
    let options = ViewConfig {
        discard_stale_responses: false,
        ..ViewConfig::default()
    };
    let ctl = ViewController::new(Arc::new(api), Page::standard(), options);

    let mut first = SubmitEvent::new(DETECTION_FORM_ID);
    let mut second = SubmitEvent::new(DETECTION_FORM_ID);
    let first_fut = ctl.submit_detection(&mut first);
    let second_fut = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        ctl.submit_detection(&mut second).await
    };
    let (a, b) = tokio::join!(first_fut, second_fut);

    assert_eq!(a.unwrap(), Submission::Rendered);
    assert_eq!(b.unwrap(), Submission::Rendered);
    let view = ctl.view();
    let page = view.lock().await;
    assert_eq!(page.output(OutputId::DetectedLanguage), "Detected Language: fr");
}

#[tokio::test]
async fn detach_aborts_in_flight_submission() {
    let api = FakeApi::default().detection(5_000, detected("fr"));
    let ctl = controller(api);

    let submit = {
        let ctl = Arc::clone(&ctl);
        tokio::spawn(async move {
            ctl.submit_detection(&mut SubmitEvent::new(DETECTION_FORM_ID))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    ctl.detach().await;

    let outcome = submit.await.unwrap();
    assert!(matches!(outcome, Err(ViewError::Aborted)));
    {
        let view = ctl.view();
        let page = view.lock().await;
        assert_eq!(page.output(OutputId::DetectedLanguage), "");
    }

    let mut event = SubmitEvent::new(DETECTION_FORM_ID);
    assert!(matches!(
        ctl.submit_detection(&mut event).await,
        Err(ViewError::Detached)
    ));
    // navigation is still suppressed after detach
    assert!(event.default_prevented());
    assert!(!ctl.is_attached());
}

#[tokio::test]
async fn dropped_submission_leaves_no_registration_behind() {
    let api = FakeApi::default().detection(5_000, detected("fr"));
    let ctl = controller(api);

    let mut event = SubmitEvent::new(DETECTION_FORM_ID);
    let outcome = tokio::time::timeout(
        Duration::from_millis(20),
        ctl.submit_detection(&mut event),
    )
    .await;

    assert!(outcome.is_err());
    assert_eq!(ctl.in_flight_len(), 0);
    let view = ctl.view();
    let page = view.lock().await;
    assert_eq!(page.output(OutputId::DetectedLanguage), "");
}
