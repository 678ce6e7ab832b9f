use std::path::PathBuf;
use styx_proto::{consts::DEFAULT_MAX_MESSAGE_SIZE, Role};

#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Args {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum Commands {
    /// accept connections over TCP
    Serve(ServeCommand),
    /// serve a single connection over stdin and stdout
    Stdio(StdioCommand),
    /// print every message in a captured byte stream
    Decode(DecodeCommand),
}

#[derive(clap::Args, Debug)]
pub(crate) struct ServeCommand {
    #[arg(default_value = "0.0.0.0:5640", long, short)]
    pub addr: std::net::SocketAddr,

    #[arg(default_value_t = DEFAULT_MAX_MESSAGE_SIZE, long)]
    pub max_message_size: u32,
}

#[derive(clap::Args, Debug)]
pub(crate) struct StdioCommand {
    #[arg(default_value_t = DEFAULT_MAX_MESSAGE_SIZE, long)]
    pub max_message_size: u32,
}

#[derive(clap::Args, Debug)]
pub(crate) struct DecodeCommand {
    /// the end reading the capture: `server` expects requests, `client` replies
    #[arg(value_enum, default_value_t = Side::Server, long, short)]
    pub role: Side,

    #[arg(default_value_t = DEFAULT_MAX_MESSAGE_SIZE, long)]
    pub max_message_size: u32,

    pub file: PathBuf,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub(crate) enum Side {
    Client,
    Server,
}

impl From<Side> for Role {
    fn from(side: Side) -> Self {
        match side {
            Side::Client => Role::Client,
            Side::Server => Role::Server,
        }
    }
}
