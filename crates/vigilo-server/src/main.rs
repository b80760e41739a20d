use anyhow::Result;
use chrono::Utc;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use vigilo_alert::cache::RuleCache;
use vigilo_alert::index::MemoryMetricIndex;
use vigilo_storage::AdminStore;

use vigilo_server::app;
use vigilo_server::config::{self, ServerConfig};
use vigilo_server::error::RuleError;
use vigilo_server::lifecycle::{RuleService, ServiceOptions};
use vigilo_server::state::AppState;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  vigilo-server [config.toml]                           Start the server");
    eprintln!("  vigilo-server init-rules <config.toml> <seed.json>    Import projects and rules from a seed file");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("vigilo=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("init-rules") => {
            let config_path = args.get(2).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("init-rules requires <config.toml> and <seed.json> arguments")
            })?;
            let seed_path = args.get(3).ok_or_else(|| {
                print_usage();
                anyhow::anyhow!("init-rules requires <seed.json> argument")
            })?;
            run_init_rules(config_path, seed_path).await
        }
        Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        _ => {
            let config_path = args
                .get(1)
                .map(|s| s.as_str())
                .unwrap_or("config/server.toml");
            run_server(config_path).await
        }
    }
}

async fn build_service(config: &ServerConfig) -> Result<RuleService> {
    if config.database.url.is_none() {
        std::fs::create_dir_all(Path::new(&config.data_dir))?;
    }
    let store = Arc::new(AdminStore::connect(&config.database_url()).await?);
    let cache = Arc::new(RuleCache::new());
    let index = Arc::new(MemoryMetricIndex::with_names(config.index.metrics.clone()));

    let service = RuleService::new(
        store,
        cache,
        index,
        ServiceOptions {
            index_timeout: config.index.timeout(),
        },
    );
    service.warm_cache().await?;
    Ok(service)
}

/// Import projects and their rules from a JSON seed file.
async fn run_init_rules(config_path: &str, seed_path: &str) -> Result<()> {
    let config = ServerConfig::load(config_path)?;
    let service = build_service(&config).await?;

    let seed_content = std::fs::read_to_string(seed_path)
        .map_err(|e| anyhow::anyhow!("Failed to read seed file '{}': {}", seed_path, e))?;
    let seed: config::RulesSeedFile = serde_json::from_str(&seed_content)
        .map_err(|e| anyhow::anyhow!("Failed to parse seed file '{}': {}", seed_path, e))?;

    let mut created = 0u32;
    let mut skipped = 0u32;

    for p in &seed.projects {
        let project = match service.create_project(&p.name).await {
            Ok(project) => project,
            Err(RuleError::DuplicateProjectName) => {
                tracing::warn!(name = %p.name, "Project already exists, skipping its rules");
                skipped += p.rules.len() as u32;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        for fields in &p.rules {
            match service.create(project.id, fields).await {
                Ok(view) => {
                    tracing::info!(
                        id = view.rule.id,
                        pattern = %view.rule.pattern,
                        num_metrics = view.num_metrics,
                        "Rule created"
                    );
                    created += 1;
                }
                Err(e) => {
                    tracing::warn!(pattern = %fields.pattern, code = e.code(), error = %e, "Rule skipped");
                    skipped += 1;
                }
            }
        }
    }

    tracing::info!(created, skipped, "init-rules completed");
    Ok(())
}

async fn run_server(config_path: &str) -> Result<()> {
    let config = ServerConfig::load(config_path)?;

    tracing::info!(
        http_port = config.http_port,
        data_dir = %config.data_dir,
        index_timeout_ms = config.index.timeout_ms,
        "vigilo-server starting"
    );

    let service = build_service(&config).await?;

    let http_addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let state = AppState {
        rules: Arc::new(service),
        config: Arc::new(config),
        start_time: Utc::now(),
    };

    let http_app = app::build_http_app(state);
    let http_listener = tokio::net::TcpListener::bind(http_addr).await?;

    tracing::info!(http = %http_addr, "Server started");

    if let Err(e) = axum::serve(http_listener, http_app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
        })
        .await
    {
        tracing::error!(error = %e, "HTTP server error");
    }

    tracing::info!("Server stopped");
    Ok(())
}
