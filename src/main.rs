//! portset - A Fixed-Range, Bitmap-Backed Port Membership Set
//!
//! Main entry point for the portset service: parses the configuration,
//! sets up logging and the TCP listener, and hands each accepted
//! connection to its own handler task sharing one command handler.

use portset::commands::CommandHandler;
use portset::connection::{handle_connection, ConnectionStats};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Server configuration, built from command-line arguments.
struct Config {
    /// Host to bind to
    host: String,
    /// Port to listen on
    port: u16,
    /// Byte budget for one listing reply page, if overridden
    page_bytes: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: portset::DEFAULT_HOST.to_string(),
            port: portset::DEFAULT_PORT,
            page_bytes: None,
        }
    }
}

impl Config {
    fn from_args() -> Self {
        let mut config = Config::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => config.host = take_value(&args, &mut i, "--host"),
                "--port" | "-p" => {
                    config.port = take_value(&args, &mut i, "--port")
                        .parse()
                        .unwrap_or_else(|_| {
                            eprintln!("Error: invalid port number");
                            std::process::exit(1);
                        })
                }
                "--page-bytes" => {
                    config.page_bytes = Some(
                        take_value(&args, &mut i, "--page-bytes")
                            .parse()
                            .unwrap_or_else(|_| {
                                eprintln!("Error: invalid page size");
                                std::process::exit(1);
                            }),
                    )
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("portset version {}", portset::VERSION);
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {}", other);
                    print_help();
                    std::process::exit(1);
                }
            }
            i += 1;
        }

        config
    }

    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Consumes the value following an option, exiting with a usage error if
/// the command line ends first.
fn take_value(args: &[String], i: &mut usize, name: &str) -> String {
    *i += 1;
    match args.get(*i) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {} requires a value", name);
            std::process::exit(1);
        }
    }
}

fn print_help() {
    println!(
        r#"
portset - A Fixed-Range, Bitmap-Backed Port Membership Set

USAGE:
    portset [OPTIONS]

OPTIONS:
    -h, --host <HOST>        Host to bind to (default: 127.0.0.1)
    -p, --port <PORT>        Port to listen on (default: 6390)
        --page-bytes <N>     Byte budget per listing reply page
    -v, --version            Print version information
        --help               Print this help message

EXAMPLES:
    portset                        # Start on 127.0.0.1:6390
    portset --port 6391            # Start on port 6391
    portset --page-bytes 1024      # Smaller listing pages

PROTOCOL:
    Clients speak framed binary commands (create/add/del/test/head/list/
    flush/destroy) carrying netlink-style attribute blocks; see the
    protocol module documentation for the exact byte layout.
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_args();

    // Set up logging
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!(
        "portset v{} starting on {}",
        portset::VERSION,
        config.bind_address()
    );

    // One command handler, one active set slot, shared by all connections
    let handler = match config.page_bytes {
        Some(page_bytes) => CommandHandler::with_page_limit(page_bytes),
        None => CommandHandler::new(),
    };
    let stats = Arc::new(ConnectionStats::new());

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("listening on {}", config.bind_address());

    // Serve until ctrl-c
    tokio::select! {
        _ = accept_loop(listener, handler, Arc::clone(&stats)) => {}
        result = signal::ctrl_c() => {
            result.expect("failed to install Ctrl+C handler");
            info!("shutdown signal received, stopping server");
        }
    }

    info!(
        connections = stats.connections_accepted.load(std::sync::atomic::Ordering::Relaxed),
        frames = stats.frames_processed.load(std::sync::atomic::Ordering::Relaxed),
        "server shutdown complete"
    );
    Ok(())
}

/// Accepts connections forever, spawning one handler task per client.
async fn accept_loop(listener: TcpListener, handler: CommandHandler, stats: Arc<ConnectionStats>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let handler = handler.clone();
                let stats = Arc::clone(&stats);
                tokio::spawn(async move {
                    handle_connection(stream, addr, handler, stats).await;
                });
            }
            Err(e) => {
                error!("failed to accept connection: {}", e);
            }
        }
    }
}
