use anyhow::Context;
use clap::Parser;
use financely::api::{create_router, AppState};
use financely::firebase::{AppConfig, ServiceClients};
use financely::form::FormSettings;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "financely", about = "Financely sign-up / log-in service")]
struct Args {
    #[clap(long, default_value = "financely.toml")]
    config: String,

    /// Overrides `listen_addr` from the config file
    #[clap(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut cfg = AppConfig::load(&args.config).context("load config")?;

    // override listen_addr if provided
    if let Some(addr) = args.listen {
        cfg = cfg.with_listen_addr(addr);
    }

    let listen_addr: SocketAddr = cfg
        .listen_addr
        .parse()
        .context("parse listen_addr as SocketAddr")?;

    let clients = ServiceClients::initialize(&cfg).context("initialize Firebase clients")?;
    let state = AppState::new(clients, FormSettings::from_config(&cfg))
        .with_limits(cfg.max_forms, cfg.form_idle_timeout());
    state.spawn_idle_sweeper();
    let app = create_router(state);

    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("bind {}", listen_addr))?;
    info!("Listening on http://{}", listen_addr);

    axum::serve(listener, app).await.context("serve")?;
    Ok(())
}
