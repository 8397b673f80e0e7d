use clap::Parser;

/// Minimal HTTP/1.0 server with static files, directory listings and CGI
#[derive(Debug, Parser)]
#[command(name = "tinyhttpd", version)]
pub struct Cli {
    /// Port to listen on
    #[arg(value_parser = clap::value_parser!(u16).range(1024..=65535))]
    pub port: u16,
}
