//! Toggle protocol for rooms and bridge groups.
//!
//! A room is an ordered list of lamp ids toggled together: the state of the
//! first lamp decides the direction for all of them, and the new state is
//! pushed to every lamp concurrently. A group is a bridge-side collection
//! with its own action endpoint, toggled with a single call.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use log::{info, warn};
use serde::Serialize;

use crate::bridge::{BridgeClient, StateCommand};

/// Brightness applied when a room lamp turns on. A lamp left dimmed near
/// zero would otherwise come back invisibly.
const LAMP_ON_BRIGHTNESS: u8 = 254;

/// Brightness applied when a group turns on.
const GROUP_ON_BRIGHTNESS: u8 = 100;

/// Outcome of one toggle operation.
///
/// `state_new` is the state the operation attempted to set, not a
/// re-verified post-condition: lamp updates that fail after the decision
/// was made are counted and logged but do not change the reported result.
#[derive(Debug, Clone, Serialize)]
pub struct ToggleResult {
    pub state_old: bool,
    pub state_new: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lamps: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToggleResult {
    fn failed(reason: &str) -> ToggleResult {
        ToggleResult {
            state_old: false,
            state_new: false,
            lamps: None,
            group: None,
            error: Some(reason.to_string()),
        }
    }
}

fn lamp_command(on: bool) -> StateCommand {
    if on {
        StateCommand {
            on: Some(true),
            bri: Some(LAMP_ON_BRIGHTNESS),
            ..Default::default()
        }
    } else {
        StateCommand {
            on: Some(false),
            ..Default::default()
        }
    }
}

fn group_command(on: bool) -> StateCommand {
    if on {
        StateCommand {
            on: Some(true),
            bri: Some(GROUP_ON_BRIGHTNESS),
            ..Default::default()
        }
    } else {
        StateCommand {
            on: Some(false),
            ..Default::default()
        }
    }
}

/// Toggle an ordered list of lamps.
///
/// The first lamp's state decides the direction. Turning off runs the list
/// backwards so the chase travels the room in the opposite direction from
/// turning on; the ordering only affects dispatch, every lamp update runs
/// concurrently and all of them are joined before the result is returned.
pub fn toggle_room(client: &BridgeClient, lamps: &[u32]) -> ToggleResult {
    if lamps.is_empty() {
        return ToggleResult::failed("No lamps defined");
    }

    let state_old = match client.get_lamp(lamps[0]) {
        Ok(attributes) => attributes.state.on,
        Err(e) => {
            warn!("Reference lamp {} unavailable: {}", lamps[0], e);
            return ToggleResult::failed("No lamp found");
        }
    };
    let state_new = !state_old;

    let mut ordered = lamps.to_vec();
    if state_old {
        ordered.reverse();
    }

    let command = lamp_command(state_new);
    let mut workers = Vec::with_capacity(ordered.len());
    for &lamp in &ordered {
        let client = client.clone();
        let command = command.clone();
        workers.push(thread::spawn(move || {
            client
                .put_state(&format!("lights/{}/state/", lamp), &command)
                .is_ok()
        }));
    }

    let mut failures = 0;
    for worker in workers {
        if !worker.join().unwrap_or(false) {
            failures += 1;
        }
    }

    TOGGLE_MONITOR.record_fanout(ordered.len(), failures);
    if failures > 0 {
        warn!(
            "{}/{} lamp updates failed, reporting intended state on={}",
            failures,
            ordered.len(),
            state_new
        );
    } else {
        info!("Toggled {} lamps to on={}", ordered.len(), state_new);
    }

    ToggleResult {
        state_old,
        state_new,
        lamps: Some(ordered),
        group: None,
        error: None,
    }
}

/// Toggle a bridge-defined group through its action endpoint.
pub fn toggle_group(client: &BridgeClient, group: u32) -> ToggleResult {
    let state_old = match client.get_group(group) {
        Ok(attributes) => attributes.action.on,
        Err(e) => {
            warn!("Group {} unavailable: {}", group, e);
            return ToggleResult::failed("No group found");
        }
    };
    let state_new = !state_old;

    let path = format!("groups/{}/action", group);
    match client.put_state(&path, &group_command(state_new)) {
        Ok(()) => {
            TOGGLE_MONITOR.record_fanout(1, 0);
            info!("Toggled group {} to on={}", group, state_new);
            ToggleResult {
                state_old,
                state_new,
                lamps: None,
                group: Some(group),
                error: None,
            }
        }
        Err(e) => {
            TOGGLE_MONITOR.record_fanout(1, 1);
            warn!("Group {} update failed: {}", group, e);
            ToggleResult::failed("Could not send put request")
        }
    }
}

/// Monitoring structure for fan-out outcomes across the whole process.
#[derive(Debug, Default)]
pub struct ToggleMonitor {
    toggles: AtomicUsize,
    updates: AtomicUsize,
    failures: AtomicUsize,
}

impl ToggleMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_fanout(&self, updates: usize, failures: usize) {
        self.toggles.fetch_add(1, Ordering::Relaxed);
        self.updates.fetch_add(updates, Ordering::Relaxed);
        self.failures.fetch_add(failures, Ordering::Relaxed);
    }

    pub fn get_toggle_count(&self) -> usize {
        self.toggles.load(Ordering::Relaxed)
    }

    pub fn get_update_count(&self) -> usize {
        self.updates.load(Ordering::Relaxed)
    }

    pub fn get_failure_count(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }
}

// Global monitor for tracking fan-out outcomes
lazy_static::lazy_static! {
    pub static ref TOGGLE_MONITOR: ToggleMonitor = ToggleMonitor::new();
}
