//! status-notify - send a status message to a running status-bridge
//!
//! Usage:
//!   status-notify [--service <name>] [--path <path>] <level> <body>...

use anyhow::Context;

use status_bridge::bus::{StatusProxy, DEFAULT_OBJECT_PATH, DEFAULT_SERVICE_NAME};
use status_bridge::core::types::SeverityLevel;

/// Command line arguments
struct Args {
    service: String,
    path: String,
    level: String,
    body: String,
}

impl Args {
    fn parse() -> Result<Self, String> {
        let mut args = std::env::args().skip(1);
        let mut service = DEFAULT_SERVICE_NAME.to_string();
        let mut path = DEFAULT_OBJECT_PATH.to_string();
        let mut positional = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--service" | "-s" => {
                    service = args.next().ok_or("--service needs a bus name")?;
                }
                "--path" | "-p" => {
                    path = args.next().ok_or("--path needs an object path")?;
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--" => {
                    positional.extend(args.by_ref());
                }
                _ => positional.push(arg),
            }
        }

        if positional.len() < 2 {
            return Err("expected <level> <body>".to_string());
        }
        let level = positional.remove(0);

        Ok(Self {
            service,
            path,
            level,
            body: positional.join(" "),
        })
    }
}

fn print_help() {
    println!(
        r#"status-notify - Send a status message to status-bridge

USAGE:
    status-notify [OPTIONS] <LEVEL> <BODY>...

LEVELS:
    {}

OPTIONS:
    -s, --service <NAME>    Bus name (default: {})
    -p, --path <PATH>       Object path (default: {})
    -h, --help              Print this help message
"#,
        SeverityLevel::WIRE_LEVELS.map(|level| level.as_str()).join(", "),
        DEFAULT_SERVICE_NAME,
        DEFAULT_OBJECT_PATH
    );
}

async fn send(args: Args) -> anyhow::Result<()> {
    let level: SeverityLevel = args.level.parse()?;

    let connection = zbus::Connection::session()
        .await
        .context("Failed to connect to the session bus")?;
    let proxy = StatusProxy::builder(&connection)
        .destination(args.service.as_str())?
        .path(args.path.as_str())?
        .build()
        .await?;

    proxy
        .notify(level.as_str(), &args.body)
        .await
        .with_context(|| format!("{} did not accept the notification", args.service))?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    if let Err(e) = send(args).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
