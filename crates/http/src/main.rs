use std::env;
use std::process::ExitCode;

use pull_http::handler::EchoHandler;
use pull_http::server::Server;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

const ADDR_ENV: &str = "PULL_HTTP_ADDR";
const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
        return ExitCode::FAILURE;
    }

    let address = env::var(ADDR_ENV).unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    info!(address, "configure server");

    let server = match Server::builder().address(address.as_str()).handler(EchoHandler::new()).build() {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "invalid server configuration");
            return ExitCode::FAILURE;
        }
    };

    match server.start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
