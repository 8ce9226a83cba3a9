//! Resolve text from the command line through the translation cache and
//! provider chain.
//!
//! Usage:
//!   smart-translate [--lang CODE] [--offline] [--clear-cache] [--metrics] TEXT...
//!
//! Optional environment variables (also read from `.env`):
//! - INITIAL_LANGUAGE (defaults to en; overridden by --lang)
//! - TRANSLATION_CACHE_DIR (defaults to the platform cache directory)
//! - GOOGLE_TRANSLATE_URL, LIBRETRANSLATE_URL, LIBRETRANSLATE_API_KEY
//! - PROVIDER_TIMEOUT_SECS (defaults to 10)
//! - CONNECTIVITY_PROBE_URL (probed before resolving, then in the background)
//! - CONNECTIVITY_PROBE_INTERVAL_SECS (defaults to 30)
//! - START_OFFLINE (defaults to false)

use anyhow::{bail, Context, Result};
use smart_translate::config::Config;
use smart_translate::{Language, TranslationContext};
use tracing::info;

struct Args {
    language: Option<Language>,
    offline: bool,
    clear_cache: bool,
    metrics: bool,
    texts: Vec<String>,
}

fn parse_args(raw: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut args = Args {
        language: None,
        offline: false,
        clear_cache: false,
        metrics: false,
        texts: Vec::new(),
    };

    let mut raw = raw.into_iter();
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--lang" => {
                let code = raw.next().context("--lang requires a language code")?;
                args.language = Some(Language::from_code(&code)?);
            }
            "--offline" => args.offline = true,
            "--clear-cache" => args.clear_cache = true,
            "--metrics" => args.metrics = true,
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            _ => args.texts.push(arg),
        }
    }

    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("smart_translate=info".parse()?),
        )
        .init();

    let args = parse_args(std::env::args().skip(1))?;

    let mut config = Config::from_env()?;
    if let Some(language) = args.language {
        config.initial_language = language;
    }
    if args.offline {
        config.start_offline = true;
    }

    let context = TranslationContext::from_config(&config)?;

    if args.clear_cache {
        context.clear_cache();
    }

    if let (Some(url), false) = (&config.connectivity_probe_url, args.offline) {
        let client = reqwest::Client::builder()
            .timeout(config.provider_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        context.resolver().reachability().probe(&client, url).await;
    }

    info!(
        "Resolving {} text(s) into {}",
        args.texts.len(),
        context.current_language().name()
    );

    for text in &args.texts {
        let resolved = context.resolve(text).await;
        println!("{} => {}", text, resolved);
    }

    if args.metrics {
        println!(
            "{}",
            serde_json::to_string_pretty(&context.resolver().metrics_report())?
        );
    }

    Ok(())
}
