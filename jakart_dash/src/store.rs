/*
 * Copyright © 2025, the JAKART developers. All rights reserved.
 *
 * The “JAKART” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
#![allow(unused)]

use std::sync::Arc;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug,warn};
use jakart_common::{collections::push_bounded, geo::GeoPoint};
use crate::{
    errors::Result,
    events::{InboundEvent, decode_destinations, decode_path, decode_pose, decode_position, decode_vehicle_state},
    state::{DashboardState, Destinations, Diagnostic, Pose, StoreConfig, VehicleState},
};

/// the single source of truth for the dashboard view model.
/// 
/// The store reconciles inbound channel events into [`DashboardState`] snapshots with per-record
/// replace-on-receipt semantics. Snapshots are published through a `tokio::sync::watch` channel of
/// `Arc<DashboardState>`: each update is applied under the watch lock on a (copy-on-write) clone of
/// the current snapshot, i.e. readers either see the old or the new snapshot, never a partial update.
/// Readers hold on to their `Arc` as long as they want without blocking writers.
/// 
/// All updates go through the store, which is shared as `Arc<StateStore>` between the channel
/// handlers (inbound events) and the command emitter (operator intents).
pub struct StateStore {
    tx: watch::Sender<Arc<DashboardState>>,
    max_diagnostics: usize,
}

impl StateStore {
    pub fn new (config: &StoreConfig)->Self {
        let (tx,_) = watch::channel( Arc::new( DashboardState::new( config)));
        StateStore { tx, max_diagnostics: config.max_diagnostics }
    }

    //--- the read API

    /// the current (immutable) snapshot
    pub fn snapshot (&self)->Arc<DashboardState> {
        self.tx.borrow().clone()
    }

    /// get notified about each published snapshot
    pub fn subscribe (&self)->watch::Receiver<Arc<DashboardState>> {
        self.tx.subscribe()
    }

    //--- typed updates

    pub fn apply_destinations_snapshot (&self, destinations: Destinations) {
        self.update( |state| { state.destinations = destinations; true });
    }

    pub fn apply_pose_update (&self, pose: Pose) {
        self.update( |state| { state.pose = pose; true });
    }

    /// replace the vehicle record while keeping the operator selection. Trip ending states also clear
    /// the current destination, which happens within the same update
    pub fn apply_state_snapshot (&self, vehicle: VehicleState) {
        self.update( |state| { set_vehicle( state, vehicle); true });
    }

    pub fn apply_position_update (&self, position: GeoPoint) {
        self.update( |state| { state.position = position; true });
    }

    /// replace (not merge) the path. An empty path clears it
    pub fn apply_path_update (&self, path: Vec<GeoPoint>) {
        self.update( |state| { set_path( state, path); true });
    }

    /// the channel dropped. We only flag the vehicle as inactive - position, destinations, pose and path
    /// keep their last known values
    pub fn on_channel_closed (&self) {
        self.update( deactivate);
    }

    //--- operator side transitions

    /// the operator picked a destination, which also ends a pending pullover
    pub fn select_destination (&self, id: impl ToString) {
        let id = id.to_string();
        self.update( |state| {
            state.vehicle.current_destination_id = Some(id);
            state.vehicle.pullover_requested = false;
            true
        });
    }

    pub fn clear_destination (&self) {
        self.update( |state| {
            state.vehicle.current_destination_id.take().is_some()
        });
    }

    pub fn set_pullover (&self, pullover_requested: bool) {
        self.update( |state| {
            if state.vehicle.pullover_requested != pullover_requested {
                state.vehicle.pullover_requested = pullover_requested;
                true
            } else {
                false
            }
        });
    }

    /// apply an operator transition that can be rejected. `f` has to check its preconditions before it
    /// modifies the state - a rejected transition is not published
    pub fn try_transition<F> (&self, f: F)->Result<()> where F: FnOnce(&mut DashboardState)->Result<()> {
        let mut result = Ok(());
        self.update( |state| {
            result = f(state);
            result.is_ok()
        });
        result
    }

    //--- untyped inbound events

    /// decode a raw channel payload for the given event and reconcile it. This never fails - malformed
    /// parts of the payload are dropped and recorded as diagnostics
    pub fn handle_event (&self, event: InboundEvent, payload: &Value) {
        let max_diagnostics = self.max_diagnostics;

        self.update( |state| {
            let diagnostics = match event {
                InboundEvent::GetDestinations => match decode_destinations( payload) {
                    Some(decoded) => { state.destinations = decoded.value; decoded.diagnostics }
                    None => vec![ ignored_payload( payload)]
                }
                InboundEvent::Pose => match decode_pose( payload, &state.pose) {
                    Some(decoded) => { state.pose = decoded.value; decoded.diagnostics }
                    None => vec![ ignored_payload( payload)]
                }
                InboundEvent::UiInit => match decode_vehicle_state( payload, &state.vehicle) {
                    Some(decoded) => { set_vehicle( state, decoded.value); decoded.diagnostics }
                    None => vec![ ignored_payload( payload)]
                }
                InboundEvent::Gps => match decode_position( payload) {
                    Some(position) => { state.position = position; Vec::new() }
                    None => vec![ format!("ignored position without valid coordinates: {payload}")]
                }
                InboundEvent::Path => match decode_path( payload) {
                    Some(decoded) => { set_path( state, decoded.value); decoded.diagnostics }
                    None => vec![ ignored_payload( payload)]
                }
                InboundEvent::Disconnect => return deactivate( state),
                InboundEvent::Connect => return false, // we wait for the server to send a snapshot
            };

            for message in diagnostics {
                warn!("malformed '{}' payload: {}", event.name(), message);
                push_bounded( &mut state.diagnostics, Diagnostic { event: event.name(), message }, max_diagnostics);
                state.n_diagnostics += 1;
            }
            true
        });
    }

    /// the one place where snapshots get replaced. The closure returns if it changed the state, in
    /// which case we bump the revision and notify subscribers
    fn update<F> (&self, f: F) where F: FnOnce(&mut DashboardState)->bool {
        self.tx.send_if_modified( |snapshot| {
            let state = Arc::make_mut( snapshot);
            if f(state) {
                state.revision += 1;
                debug!("published dashboard state revision {}", state.revision);
                true
            } else {
                false
            }
        });
    }
}

impl Default for StateStore {
    fn default()->Self { StateStore::new( &StoreConfig::default()) }
}

fn set_vehicle (state: &mut DashboardState, mut vehicle: VehicleState) {
    vehicle.current_destination_id = if vehicle.state_tag.clears_destination() {
        None
    } else {
        state.vehicle.current_destination_id.take()
    };
    vehicle.pullover_requested = state.vehicle.pullover_requested;
    state.vehicle = vehicle;
}

fn deactivate (state: &mut DashboardState)->bool {
    if state.vehicle.active {
        state.vehicle.active = false;
        true
    } else {
        false
    }
}

fn set_path (state: &mut DashboardState, path: Vec<GeoPoint>) {
    state.path = path;
    state.path_revision += 1;
}

fn ignored_payload (payload: &Value)->String {
    format!("ignored payload with unexpected shape: {payload}")
}
