use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use translate_view::{console, Config, HttpTranslateClient, Page, ViewController};

fn load_config() -> Result<Config> {
    let config_paths: Vec<String> = vec![
        std::env::var("CONFIG_PATH").ok(),
        Some("conf.jsonld".to_string()),
        Some("conf.json".to_string()),
        Some("conf.yaml".to_string()),
    ]
    .into_iter()
    .flatten()
    .collect();

    for path in &config_paths {
        if !Path::new(path).exists() {
            continue;
        }
        let config = Config::load(path)?;
        info!("Loaded configuration from: {}", path);
        return Ok(config);
    }

    info!("No config file found (tried {:?}), using defaults", config_paths);
    Ok(Config::default())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("translate_view=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config()?.with_env_overrides();
    let client = Arc::new(HttpTranslateClient::from_config(&config.api)?);
    info!("Using translation backend at {}", client.base_url());

    match client.health_check().await {
        Ok(true) => {}
        Ok(false) => warn!("Backend answered with an error status"),
        Err(e) => warn!("Backend not reachable yet: {}", e),
    }

    let controller = Arc::new(ViewController::new(
        client,
        Page::standard(),
        config.view.clone(),
    ));
    let loading = controller.attach().await?;

    let load = loading.await?;
    if !load.is_complete() {
        warn!("Language lists are incomplete; selectors keep their placeholders");
    }
    println!("{}", controller.view().lock().await.render());
    println!("{}", console::HELP);

    let stdin = BufReader::new(tokio::io::stdin());
    console::run(controller, stdin).await
}
