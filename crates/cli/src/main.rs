use crate::{
    commands::{Commands, DecodeCommand, ServeCommand, StdioCommand},
    error::Result,
    handlers::Handler,
};
use clap::Parser;
use std::sync::Arc;
use styx_proto::{DecoderConfig, FrameDecoder, Role};
use styx_service::{serve_stream, Server};
use tokio::net::TcpListener;
use tracing::{error, info};

mod commands;
mod error;
mod handlers;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout may be carrying the protocol
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args = commands::Args::parse();
    match args.command {
        Commands::Serve(cmd) => serve(cmd).await,
        Commands::Stdio(cmd) => stdio(cmd).await,
        Commands::Decode(cmd) => decode(cmd).await,
    }
}

async fn serve(cmd: ServeCommand) -> Result<()> {
    let config = DecoderConfig::new(Role::Server).with_max_message_size(cmd.max_message_size)?;
    let handler = Arc::new(Handler::new(config.max_message_size()));

    let listener = TcpListener::bind(cmd.addr).await?;
    info!(addr = ?cmd.addr, max_message_size = config.max_message_size(), "listening");

    loop {
        let (socket, addr) = listener.accept().await?;
        info!("new connection from: {addr}");

        let handler = handler.clone();
        tokio::spawn(async move {
            let server = Server::with_config(socket, handler, config);
            match server.run().await {
                Ok(()) => info!("connection from {addr} closed"),
                Err(err) => error!("connection error from {addr}: {err}"),
            }
        });
    }
}

async fn stdio(cmd: StdioCommand) -> Result<()> {
    let config = DecoderConfig::new(Role::Server).with_max_message_size(cmd.max_message_size)?;
    let handler = Arc::new(Handler::new(config.max_message_size()));

    tokio::task::spawn_blocking(move || {
        serve_stream(std::io::stdin(), std::io::stdout(), handler, config)
    })
    .await??;

    Ok(())
}

async fn decode(cmd: DecodeCommand) -> Result<()> {
    let config =
        DecoderConfig::new(cmd.role.into()).with_max_message_size(cmd.max_message_size)?;
    let bytes = tokio::fs::read(&cmd.file).await?;

    let mut decoder = FrameDecoder::new(config);
    let mut count = 0usize;
    decoder.feed(&bytes, |message| {
        count += 1;
        println!("{message}");
    })?;
    decoder.finish()?;

    info!(file = ?cmd.file, count, "decoded");
    Ok(())
}
