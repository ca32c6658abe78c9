use tracing::info;

use relaychat::config::Config;
use relaychat::logging::{self, LogLevel};
use relaychat::server::{ChatListener, Relay};

const CONFIG_PATH: &str = "relaychat.toml";

#[tokio::main]
async fn main() {
    let port = match std::env::args().nth(1) {
        Some(arg) => match arg.parse::<u16>() {
            Ok(port) => port,
            Err(_) => {
                eprintln!("ERROR, invalid port: {arg}");
                std::process::exit(1);
            }
        },
        None => {
            eprintln!("ERROR, no port provided");
            eprintln!("usage: relaychat <port>");
            std::process::exit(1);
        }
    };

    // The config file is optional; a parse error in an existing file is a
    // setup failure and fatal.
    let mut config = if std::path::Path::new(CONFIG_PATH).exists() {
        match Config::load(CONFIG_PATH) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {CONFIG_PATH}: {e}");
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };
    config.apply_env_overrides();
    config.server.port = port;

    let level = LogLevel::parse_lenient(&config.logging.level);
    let log = logging::init(level);

    info!("Starting server");

    let listener = match ChatListener::bind(&config.server).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!(
                "ERROR binding to {}:{}: {e}",
                config.server.host, config.server.port
            );
            std::process::exit(1);
        }
    };

    info!("Listening on port {}", config.server.port);
    info!("Log level set to {level}");

    let relay = Relay::new(&config.server, log);
    if let Err(e) = relay.run(listener).await {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}
