//! linechat: line-oriented peer-to-peer chat demo
//!
//! Thin wiring between the connection core and a terminal: stdin lines go
//! out over the session, events from the core are printed as they arrive.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use linechat_core::{event_channel, LinkEvent, PeerAddr, SocketVariant};
use linechat_runtime::ConnectionOrchestrator;
use linechat_tcp::TcpTransport;

use crate::config::CliConfig;

#[derive(Debug, Parser)]
#[command(name = "linechat", about = "Peer-to-peer line chat over a duplex transport")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dial this peer (host:port) after starting; otherwise just listen
    #[arg(long)]
    connect: Option<String>,

    /// Use the secure socket variant when dialing
    #[arg(long)]
    secure: bool,

    /// Secure listening address override
    #[arg(long)]
    secure_addr: Option<String>,

    /// Insecure listening address override
    #[arg(long)]
    insecure_addr: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let mut config = CliConfig::load(args.config.as_deref())?;
    if let Some(addr) = args.secure_addr {
        config.tcp.secure_addr = addr;
    }
    if let Some(addr) = args.insecure_addr {
        config.tcp.insecure_addr = addr;
    }
    config.link.validate()?;

    info!(
        secure = %config.tcp.secure_addr,
        insecure = %config.tcp.insecure_addr,
        "starting linechat"
    );
    let provider = Arc::new(TcpTransport::new(config.tcp.clone()));
    let (events_tx, mut events) = event_channel();
    let orch = ConnectionOrchestrator::new(provider, config.link.clone(), events_tx);

    orch.start();
    if let Some(peer) = args.connect {
        let variant = if args.secure {
            SocketVariant::Secure
        } else {
            SocketVariant::Insecure
        };
        orch.connect(PeerAddr::new(peer), variant);
    }

    // stdin lines become outbound messages; dropped silently when there is
    // no session, same as the core's write policy
    let writer = Arc::clone(&orch);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut bytes = line.into_bytes();
            bytes.push(b'\n');
            writer.write(bytes);
        }
    });

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                orch.stop();
                break;
            }
            event = events.recv() => match event {
                Some(event) => print_event(&event),
                None => break,
            }
        }
    }
    Ok(())
}

fn print_event(event: &LinkEvent) {
    match event {
        LinkEvent::StateChanged(state) => println!("* state: {state}"),
        LinkEvent::PeerIdentified { name } => println!("* connected to {name}"),
        LinkEvent::MessageReceived { bytes, .. } => {
            println!("< {}", String::from_utf8_lossy(bytes).trim_end_matches(['\n', '\r']));
        }
        LinkEvent::MessageSent { bytes } => {
            println!("> {}", String::from_utf8_lossy(bytes).trim_end_matches(['\n', '\r']));
        }
        LinkEvent::Notice(text) => println!("* {text}"),
    }
}
