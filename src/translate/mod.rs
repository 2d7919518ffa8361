pub mod client;
pub mod interface;

pub use client::HttpTranslateClient;
pub use interface::{
    DetectionRequest, DetectionResult, LanguageOption, TranslateApi, TranslationRequest,
    TranslationResult,
};
