use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::controller::{SubmitEvent, TriggerEvent, ViewController};
use crate::translate::TranslateApi;
use crate::view::{InputId, Page, SelectorId, DETECTION_FORM_ID, TRANSLATION_FORM_ID};

pub const HELP: &str = "\
commands:
  tab <panel>          open a panel (Detection, Translation)
  detect <text>        submit the detection form
  source <code>        choose the source language (empty for auto-detect)
  target <code>        choose the target language
  translate <text>     submit the translation form
  show                 print the page
  quit                 detach and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Tab(String),
    Detect(String),
    Source(String),
    Target(String),
    Translate(String),
    Show,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim().to_string()),
            None => (line, String::new()),
        };

        let command = match verb.to_lowercase().as_str() {
            "tab" => Self::Tab(rest),
            "detect" => Self::Detect(rest),
            "source" => Self::Source(rest),
            "target" => Self::Target(rest),
            "translate" => Self::Translate(rest),
            "show" => Self::Show,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(verb.to_string()),
        };
        Some(command)
    }
}

/// Read commands until EOF or `quit`, then detach the controller
pub async fn run<A, R>(ctl: Arc<ViewController<A, Page>>, input: R) -> Result<()>
where
    A: TranslateApi + 'static,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = Command::parse(&line) else {
            continue;
        };
        debug!("console command: {:?}", command);
        if command == Command::Quit {
            break;
        }
        dispatch(&ctl, command).await;
    }

    ctl.detach().await;
    Ok(())
}

async fn dispatch<A>(ctl: &Arc<ViewController<A, Page>>, command: Command)
where
    A: TranslateApi + 'static,
{
    let view = ctl.view();
    match command {
        Command::Tab(panel) => {
            let trigger = {
                let page = view.lock().await;
                page.trigger_for(&panel)
            };
            match trigger {
                Some(trigger) => ctl.open_tab(&TriggerEvent::new(trigger), &panel).await,
                None => println!("no tab named '{}'", panel),
            }
            print_page(ctl).await;
        }
        Command::Source(code) => {
            if !view.lock().await.select(SelectorId::SourceLanguage, &code) {
                println!("'{}' is not a source language", code);
            }
        }
        Command::Target(code) => {
            if !view.lock().await.select(SelectorId::TargetLanguage, &code) {
                println!("'{}' is not a target language", code);
            }
        }
        Command::Detect(text) => {
            view.lock().await.set_input(InputId::DetectText, text);
            let ctl = Arc::clone(ctl);
            // handlers run concurrently, like event callbacks awaiting fetch
            tokio::spawn(async move {
                let mut event = SubmitEvent::new(DETECTION_FORM_ID);
                if let Err(e) = ctl.submit_detection(&mut event).await {
                    warn!("Detection submit failed: {}", e);
                }
                print_page(&ctl).await;
            });
        }
        Command::Translate(text) => {
            view.lock().await.set_input(InputId::TranslateText, text);
            let ctl = Arc::clone(ctl);
            tokio::spawn(async move {
                let mut event = SubmitEvent::new(TRANSLATION_FORM_ID);
                if let Err(e) = ctl.submit_translation(&mut event).await {
                    warn!("Translation submit failed: {}", e);
                }
                print_page(&ctl).await;
            });
        }
        Command::Show => print_page(ctl).await,
        Command::Help => println!("{}", HELP),
        Command::Unknown(verb) => println!("unknown command '{}', try 'help'", verb),
        Command::Quit => {}
    }
}

async fn print_page<A>(ctl: &ViewController<A, Page>)
where
    A: TranslateApi + 'static,
{
    let view = ctl.view();
    let page = view.lock().await;
    println!("{}", page.render());
}
