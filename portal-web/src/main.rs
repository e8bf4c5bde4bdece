//! Portal Web Server
//!
//! Unified portal: a link directory behind a Supabase session gate.

use anyhow::Context;
use clap::Parser;
use portal_web::server::PortalServerBuilder;
use portal_web::{init_logging, WebConfig};
use tracing::{info, warn};

/// Portal Web Server - authenticated link directory with cookie recovery
#[derive(Parser)]
#[command(name = "portal-web")]
#[command(about = "Unified portal behind a Supabase session gate")]
#[command(version)]
struct Args {
    /// Server host to bind to [default: PORTAL_HOST or 127.0.0.1]
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on [default: PORTAL_PORT or 8080]
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable development mode (also PORTAL_DEV_MODE=true)
    #[arg(long)]
    dev: bool,

    /// Static files directory
    #[arg(long)]
    static_dir: Option<String>,

    /// Portal configuration file (TOML)
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// Layer the flags that were actually given over the environment
    fn apply(self, config: &mut WebConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.dev {
            config.dev_mode = true;
        }
        if self.static_dir.is_some() {
            config.static_dir = self.static_dir;
        }
        if self.config.is_some() {
            config.config_path = self.config;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let log_level = args.log_level.clone();

    // Load environment variables
    dotenvy::dotenv().ok();

    let mut config = WebConfig::from_env();
    args.apply(&mut config);

    let portal = config
        .load_portal_config()
        .context("Failed to load portal configuration")?;

    init_logging(&portal.logging.clone().with_level(&log_level))
        .context("Failed to initialize logging")?;

    info!("Server: http://{}", config.address());
    info!("Development mode: {}", config.dev_mode);
    if let Some(path) = &config.config_path {
        info!("Configuration: {}", path);
    } else {
        warn!("No configuration file given, using built-in directory defaults");
    }
    if let Some(static_dir) = &config.static_dir {
        info!("Static files: {}", static_dir);
    }

    let mut builder = PortalServerBuilder::new()
        .host(config.host.clone())
        .port(config.port)
        .dev_mode(config.dev_mode)
        .portal_config(portal);
    if let Some(static_dir) = config.static_dir.clone() {
        builder = builder.static_dir(static_dir);
    }

    let server = builder.build().context("Failed to build server")?;
    server.start().await.context("Server failed")?;

    Ok(())
}
