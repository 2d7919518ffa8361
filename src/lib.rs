pub mod config;
pub mod console;
pub mod controller;
pub mod error;
pub mod translate;
pub mod view;

pub use config::Config;
pub use controller::{LanguageLoad, Submission, SubmitEvent, TriggerEvent, ViewController};
pub use error::{ApiError, ViewError};
pub use translate::{HttpTranslateClient, TranslateApi};
pub use view::{Page, View};
