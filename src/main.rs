use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tower_lsp::{LspService, Server};
use tracing::{info, warn};

use baseline_language_server::logging::init_logger;
use baseline_language_server::lsp::backend::BaselineBackend;
use baseline_language_server::lsp::config::ServerConfig;
use baseline_language_server::web_features::{load_dataset, FeatureMap, FeatureResolver};

/// Language server reporting the Baseline status of web-platform features.
#[derive(Debug, Parser)]
#[command(name = "baseline-language-server", version, about)]
struct Cli {
    /// Path to the web-features `data.json` (or a flat id → feature mapping).
    /// Falls back to $BASELINE_FEATURES_PATH.
    #[arg(long, value_name = "PATH")]
    dataset: Option<PathBuf>,

    /// Log filter for stderr, e.g. "debug" or "baseline_language_server=trace".
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,

    /// Disable ANSI colors in stderr output.
    #[arg(long)]
    no_color: bool,

    /// Do not write a session log file to the user cache directory.
    #[arg(long)]
    no_file_logging: bool,

    /// Disable the substring match strategy (fewer false positives).
    #[arg(long)]
    no_substring_fallback: bool,

    /// Language id to annotate; repeat for several. Replaces the default
    /// JavaScript/TypeScript set.
    #[arg(long = "language", value_name = "ID")]
    languages: Vec<String>,
}

impl Cli {
    fn into_config(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(path) = self.dataset {
            config.dataset_path = Some(path);
        }
        if self.no_substring_fallback {
            config.substring_fallback = false;
        }
        if !self.languages.is_empty() {
            config.languages = self.languages;
        }
        config
    }
}

/// Loads the dataset once. Failure is not fatal: the server keeps running
/// and every lookup reports "not found".
fn load_features(config: &ServerConfig) -> Option<Arc<FeatureMap>> {
    let Some(path) = config.dataset_path.as_deref() else {
        warn!("No dataset configured (use --dataset or BASELINE_FEATURES_PATH)");
        return None;
    };
    match load_dataset(path) {
        Ok(map) => Some(Arc::new(map)),
        Err(e) => {
            warn!("web-features dataset not loaded: {}", e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logger(cli.no_color, cli.log_level.as_deref(), !cli.no_file_logging)?;

    let config = Arc::new(cli.into_config(ServerConfig::from_env_or_default()));
    info!("Starting baseline-language-server with {:?}", config);

    let resolver = Arc::new(FeatureResolver::new(
        load_features(&config),
        config.resolver_options(),
    ));

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| {
        BaselineBackend::new(client, resolver.clone(), config.clone())
    });

    Server::new(stdin, stdout, socket).serve(service).await;
    info!("Server stopped");
    Ok(())
}
