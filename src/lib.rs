use std::collections::HashMap;

use log::{info, warn};
use rouille::{Request, Response};

pub mod bridge;
pub mod error;
pub mod toggle;

use crate::bridge::BridgeClient;
use crate::toggle::{toggle_group, toggle_room};

/// Server configuration, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address of the Hue Bridge.
    pub bridge_ip: String,
    /// Access token registered with the bridge.
    pub api_key: String,
    /// Source addresses allowed to trigger toggles; `*` admits everyone.
    pub allowed_hosts: Vec<String>,
    pub port: u16,
    /// Route id -> ordered lamp list. Order matters: it is the direction
    /// the chase effect travels when turning on.
    pub rooms: HashMap<u32, Vec<u32>>,
    /// Route id -> bridge group id.
    pub groups: HashMap<u32, u32>,
}

// Source-host check result
enum AccessResult {
    Allowed,
    Denied(Response),
}

fn check_source_host(request: &Request, allowed_hosts: &[String]) -> AccessResult {
    let source = request.remote_addr().ip().to_string();

    if allowed_hosts.iter().any(|host| host == "*" || *host == source) {
        AccessResult::Allowed
    } else {
        warn!("Denied toggle request from {}", source);
        AccessResult::Denied(
            Response::text("Forbidden - Host is not allowed to trigger lights")
                .with_status_code(403),
        )
    }
}

/// Dispatch one request: allow-list first, then `/room/{id}` and
/// `/group/{id}`. Toggle attempts always answer 200 with a JSON body, even
/// when the result carries an error field; only the allow-list (403) and
/// unknown routes (404) short-circuit before the bridge is contacted.
pub fn handle_request(request: &Request, client: &BridgeClient, config: &Config) -> Response {
    match check_source_host(request, &config.allowed_hosts) {
        AccessResult::Denied(response) => return response,
        AccessResult::Allowed => {}
    }

    if request.method() != "GET" {
        return Response::empty_404();
    }

    let url = request.url();
    let segments: Vec<&str> = url.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        ["room", id] => match id.parse().ok().and_then(|id: u32| config.rooms.get(&id)) {
            Some(lamps) => Response::json(&toggle_room(client, lamps)),
            None => Response::empty_404(),
        },
        ["group", id] => match id.parse().ok().and_then(|id: u32| config.groups.get(&id)) {
            Some(&group) => Response::json(&toggle_group(client, group)),
            None => Response::empty_404(),
        },
        _ => Response::empty_404(),
    }
}

/// Run the HTTP server. Blocks forever.
pub fn start(config: Config) -> ! {
    let client = BridgeClient::new(&config.bridge_ip, &config.api_key);

    info!(
        "Serving {} rooms and {} groups on port {}",
        config.rooms.len(),
        config.groups.len(),
        config.port
    );

    let addr = format!("0.0.0.0:{}", config.port);
    rouille::start_server(addr, move |request| {
        handle_request(request, &client, &config)
    })
}
