//! HTTP client for the Hue Bridge local REST API.
//!
//! All resources live under `http://{ip}/api/{token}/`. The bridge and the
//! home network it sits on are unreliable, so every operation returns a
//! `Result` the caller is expected to treat as a normal outcome, never as a
//! reason to abort the process.

use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{HueError, Result};

/// How long a single bridge call may take before it is abandoned.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for one Hue Bridge. Cloning is cheap; the inner HTTP client is
/// reference-counted, so fan-out workers each take their own copy.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

/// State portion of a lamp resource.
#[derive(Debug, Clone, Deserialize)]
pub struct LampState {
    pub on: bool,
    #[serde(default)]
    pub bri: u8,
}

/// GET `lights/{id}` response, reduced to the fields the toggle logic reads.
#[derive(Debug, Clone, Deserialize)]
pub struct LampAttributes {
    pub state: LampState,
}

/// Action portion of a group resource.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupAction {
    pub on: bool,
    #[serde(default)]
    pub bri: u8,
}

/// GET `groups/{id}` response, reduced to the group-wide action state.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupAttributes {
    pub action: GroupAction,
}

/// PUT body for `lights/{id}/state/` and `groups/{id}/action`. Unset fields
/// stay off the wire; the bridge treats absent keys as "no change".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sat: Option<u8>,
}

impl BridgeClient {
    pub fn new(bridge_ip: &str, api_key: &str) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        BridgeClient {
            http,
            base_url: format!("http://{}/api/{}/", bridge_ip, api_key),
        }
    }

    /// Fetch the current attributes of a group.
    pub fn get_group(&self, group: u32) -> Result<GroupAttributes> {
        self.get_resource(&format!("groups/{}", group))
    }

    /// Fetch the current attributes of a single lamp.
    pub fn get_lamp(&self, lamp: u32) -> Result<LampAttributes> {
        self.get_resource(&format!("lights/{}", lamp))
    }

    /// Apply a state command to a resource path. Success means the bridge
    /// answered 2xx with a JSON body; the body itself is discarded.
    pub fn put_state(&self, path: &str, command: &StateCommand) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!("PUT {} {:?}", url, command);

        let response = self.http.put(&url).json(command).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(HueError::UnexpectedStatus(status.as_u16()));
        }
        // The bridge acknowledges with a JSON array of per-field results;
        // parsing it is only a sanity check on the reply.
        response.json::<serde_json::Value>()?;
        Ok(())
    }

    fn get_resource<T>(&self, path: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.http.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(HueError::UnexpectedStatus(status.as_u16()));
        }
        // Unknown resources come back as 200 with an error payload, so a
        // shape mismatch here is the not-found signal.
        let value = response.json::<serde_json::Value>()?;
        Ok(serde_json::from_value(value)?)
    }
}
