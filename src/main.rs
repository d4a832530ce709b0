//! One-shot translation front end.
//!
//! Usage:
//!   alert-babel "Database connection failed"            # translate into de,es,fr
//!   alert-babel "Disk usage high" de,uk                 # explicit targets
//!   alert-babel --status                                # probe the model daemon
//!   alert-babel --languages                             # dump the registry
//!
//! The response JSON goes to stdout; logs go to stderr.
//!
//! Environment variables (all optional):
//! - OPUS_SERVER_URL (defaults to http://127.0.0.1:8090)
//! - MODEL_CACHE_CAPACITY (defaults to 5)
//! - PRELOAD_LANGUAGES (defaults to de,es,fr)
//! - MAX_TEXT_LENGTH (defaults to 1000)
//! - REQUEST_DEADLINE_SECS (defaults to 30)
//! - MODEL_LOAD_TIMEOUT_SECS (defaults to 60)

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use alert_babel::cache::ModelCache;
use alert_babel::config::Config;
use alert_babel::lang::LanguageRegistry;
use alert_babel::metrics::ServiceMetrics;
use alert_babel::opus::OpusBackend;
use alert_babel::schema::{ErrorResponse, TranslateRequest};
use alert_babel::service::TranslationService;
use alert_babel::worker::start_worker;

const USAGE: &str = "usage:
  alert-babel \"<message>\" [languages]
  alert-babel --status
  alert-babel --languages

  languages: comma-separated codes (default de,es,fr)";

enum Invocation {
    Translate { text: String, languages: Vec<String> },
    Status,
    Languages,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging on stderr so stdout stays pure JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("alert_babel=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let invocation = parse_args()?;
    let config = Config::from_env()?;

    info!("Starting alert-babel v{}", env!("CARGO_PKG_VERSION"));

    let backend = Arc::new(OpusBackend::new(config.opus_server_url.clone()));
    let cache = Arc::new(ModelCache::new(backend, &config));

    match invocation {
        Invocation::Status => {
            info!("Preloading priority models to probe the daemon");
            cache.preload().await;

            let service = TranslationService::new(cache.clone(), &config);
            let status = service.status();
            println!("{}", serde_json::to_string_pretty(&status)?);

            let healthy = status.status == "OK";
            cache.shutdown().await;
            if !healthy {
                anyhow::bail!("no preload model could be loaded; is the model daemon up?");
            }
        }
        Invocation::Languages => {
            let service = TranslationService::new(cache.clone(), &config);
            println!("{}", serde_json::to_string_pretty(&service.languages())?);
        }
        Invocation::Translate { text, languages } => {
            let service = TranslationService::new(cache.clone(), &config);
            let (handle, worker) = start_worker(service, 8);

            let outcome = handle
                .translate(TranslateRequest { text, languages })
                .await;

            drop(handle);
            worker.await?;
            cache.shutdown().await;

            let report = ServiceMetrics::global().report();
            info!("Session metrics: {}", serde_json::to_string(&report)?);

            match outcome {
                Ok(response) => {
                    info!(
                        "✓ Translated into {} of {} requested languages",
                        response.translations.len() - 1,
                        response.target_languages.len()
                    );
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
                Err(e) => {
                    println!("{}", serde_json::to_string_pretty(&ErrorResponse::from_error(&e))?);
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}

fn parse_args() -> Result<Invocation> {
    let mut args = std::env::args().skip(1);
    let first = match args.next() {
        Some(arg) => arg,
        None => anyhow::bail!("{USAGE}"),
    };

    let invocation = match first.as_str() {
        "--status" => Invocation::Status,
        "--languages" => Invocation::Languages,
        flag if flag.starts_with("--") => anyhow::bail!("unknown flag '{flag}'\n{USAGE}"),
        _ => {
            let languages = match args.next() {
                Some(csv) => csv
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                None => LanguageRegistry::get()
                    .default_priority_codes()
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            };
            Invocation::Translate {
                text: first,
                languages,
            }
        }
    };

    if args.next().is_some() {
        anyhow::bail!("too many arguments\n{USAGE}");
    }

    Ok(invocation)
}
