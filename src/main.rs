use std::collections::HashMap;
use std::env;

use log::{error, info};

use hue_api_server::error::HueError;
use hue_api_server::Config;

fn main() -> Result<(), HueError> {
    // Initialize logger with environment variable control
    env_logger::init();

    let bridge_ip = require_env("HUE_BRIDGE_IP")?;
    let api_key = require_env("HUE_API_KEY")?;

    let allowed_hosts: Vec<String> = env::var("HUE_ALLOWED_HOSTS")
        .unwrap_or_else(|_| "*".to_string())
        .split(',')
        .map(|host| host.trim().to_string())
        .filter(|host| !host.is_empty())
        .collect();

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(8000);

    // The household layout. Lamp order follows the physical placement so
    // the chase effect travels along the room.
    let mut rooms = HashMap::new();
    rooms.insert(1, vec![22, 29, 27, 28, 17, 20, 18, 19, 16, 30, 15, 21, 24, 23]);
    rooms.insert(2, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14]);

    let mut groups = HashMap::new();
    groups.insert(1, 1);

    let config = Config {
        bridge_ip,
        api_key,
        allowed_hosts,
        port,
        rooms,
        groups,
    };

    info!("Starting Hue API server on port {}", config.port);
    hue_api_server::start(config)
}

fn require_env(name: &str) -> Result<String, HueError> {
    env::var(name).map_err(|_| {
        error!("${} must be set", name);
        HueError::Config(format!("environment variable {} is not set", name))
    })
}
