use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "linehook")]
#[command(about = "LINE Messaging API webhook receiver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: LINEHOOK_CONFIG_PATH or ~/.linehook/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Run the webhook server. Needs a channel secret (line.channelSecret or MSG_CHANNEL_SECRET).
    Serve {
        /// Config file path (default: LINEHOOK_CONFIG_PATH or ~/.linehook/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// HTTP port (default from config or 3000)
        #[arg(long, short)]
        port: Option<u16>,

        /// Bind address (default from config or 127.0.0.1)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Print the x-line-signature value for a body, for replaying webhooks by hand.
    Sign {
        /// Config file path used to resolve the channel secret when --secret is absent.
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Channel secret (overrides env and config)
        #[arg(long)]
        secret: Option<String>,

        /// File containing the exact request body; reads stdin when omitted.
        #[arg(value_name = "FILE")]
        body: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("linehook {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port, bind }) => {
            if let Err(e) = run_serve(config, port, bind).await {
                log::error!("serve failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Sign {
            config,
            secret,
            body,
        }) => {
            if let Err(e) = run_sign(config, secret, body) {
                log::error!("sign failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(linehook::config::default_config_path);
    let dir = linehook::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_serve(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    bind: Option<String>,
) -> anyhow::Result<()> {
    let (mut config, path) = linehook::config::load_config(config_path)?;
    if let Some(p) = port {
        config.server.port = p;
    }
    if let Some(b) = bind {
        config.server.bind = b;
    }
    log::info!(
        "starting server on {}:{} (config {})",
        config.server.bind,
        config.server.port,
        path.display()
    );
    linehook::server::run_server(config).await
}

fn run_sign(
    config_path: Option<PathBuf>,
    secret: Option<String>,
    body_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let secret = match secret {
        Some(s) => s,
        None => {
            let (config, _) = linehook::config::load_config(config_path)?;
            linehook::config::resolve_channel_secret(&config).ok_or_else(|| {
                anyhow::anyhow!(
                    "channel secret not configured (pass --secret, set line.channelSecret or MSG_CHANNEL_SECRET)"
                )
            })?
        }
    };
    let body = match body_path {
        Some(p) => std::fs::read(&p).with_context(|| format!("reading {}", p.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading body from stdin")?;
            buf
        }
    };
    println!("{}", linehook::line::sign_body(&body, secret.as_bytes()));
    Ok(())
}
