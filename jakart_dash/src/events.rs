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

//! the event vocabulary of the cart channel and lenient decoding of inbound payloads.
//! 
//! Payloads come from a trusted vehicle server but we still never fail on shape mismatches. Decoding
//! works per field or entry: whatever is malformed is dropped (or, for single-valued record fields,
//! keeps its previous value) and reported as a diagnostic string, the rest is used.
//!
//! in:   ["get-destinations", {"home": {"latitude": 38.433168, "longitude": -78.86098}, ...}]
//! in:   ["pose", {"passenger": true, "safe": false}]
//! in:   ["ui-init", {"state": "transit-start", "active": true, "destination": "home", "_id": "jakart", 
//!                    "userId": "..", "latitude": 38.4474, "longitude": -78.8701, "pullover": false}]
//! in:   ["gps", {"latitude": 38.4339, "longitude": -78.8621}]
//! in:   ["path", [{"latitude": .., "longitude": ..}, ...]]
//! out:  ["destination", "home"]
//! out:  ["pullover", true]

use std::fmt;
use serde_json::{Map,Value};
use jakart_common::geo::GeoPoint;
use crate::state::{Destination, Destinations, Pose, StateTag, VehicleState};

/* #region InboundEvent *******************************************************************************************/

#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub enum InboundEvent {
    GetDestinations,
    Pose,
    UiInit,
    Gps,
    Path,
    Connect,    // transport level, no payload
    Disconnect, // transport level, no payload
}

impl InboundEvent {
    /// the events that are reconciled into the dashboard state
    pub const STORE_EVENTS: [InboundEvent;6] = [
        InboundEvent::GetDestinations, InboundEvent::Pose, InboundEvent::UiInit,
        InboundEvent::Gps, InboundEvent::Path, InboundEvent::Disconnect
    ];

    pub fn name (&self)->&'static str {
        match self {
            InboundEvent::GetDestinations => "get-destinations",
            InboundEvent::Pose => "pose",
            InboundEvent::UiInit => "ui-init",
            InboundEvent::Gps => "gps",
            InboundEvent::Path => "path",
            InboundEvent::Connect => CONNECT_EVENT,
            InboundEvent::Disconnect => DISCONNECT_EVENT,
        }
    }

    pub fn from_name (name: &str)->Option<InboundEvent> {
        match name {
            "get-destinations" => Some(InboundEvent::GetDestinations),
            "pose" => Some(InboundEvent::Pose),
            "ui-init" => Some(InboundEvent::UiInit),
            "gps" => Some(InboundEvent::Gps),
            "path" => Some(InboundEvent::Path),
            CONNECT_EVENT => Some(InboundEvent::Connect),
            DISCONNECT_EVENT => Some(InboundEvent::Disconnect),
            _ => None
        }
    }
}

impl fmt::Display for InboundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str( self.name())
    }
}

/// pseudo events dispatched by the channel itself
pub const CONNECT_EVENT: &str = "connect";
pub const DISCONNECT_EVENT: &str = "disconnect";

/* #endregion InboundEvent */

/* #region OutboundCommand ****************************************************************************************/

/// operator intents sent to the vehicle
#[derive(Debug,Clone,PartialEq)]
pub enum OutboundCommand {
    Destination(String),
    Pullover(bool),
}

impl OutboundCommand {
    pub fn name (&self)->&'static str {
        match self {
            OutboundCommand::Destination(_) => "destination",
            OutboundCommand::Pullover(_) => "pullover",
        }
    }

    pub fn payload (&self)->Value {
        match self {
            OutboundCommand::Destination(id) => Value::String(id.clone()),
            OutboundCommand::Pullover(b) => Value::Bool(*b),
        }
    }
}

/* #endregion OutboundCommand */

/* #region decoding ***********************************************************************************************/

/// a leniently decoded value plus the problems we found (and skipped) on the way
#[derive(Debug,Clone,PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub diagnostics: Vec<String>,
}

impl<T> Decoded<T> {
    fn new (value: T, diagnostics: Vec<String>)->Self { Decoded { value, diagnostics } }
}

fn json_type (v: &Value)->&'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `get-destinations`: entries without valid coordinates are dropped.
/// Returns `None` if the payload is not a JSON object
pub fn decode_destinations (payload: &Value)->Option<Decoded<Destinations>> {
    let obj = payload.as_object()?;
    let mut diagnostics = Vec::new();
    let mut destinations = Destinations::with_capacity( obj.len());

    for (id,v) in obj {
        match GeoPoint::from_json(v) {
            Some(location) => { destinations.insert( id.clone(), Destination { id: id.clone(), location }); }
            None => diagnostics.push( format!("dropped destination '{id}' without valid coordinates: {v}"))
        }
    }
    Some( Decoded::new( destinations, diagnostics))
}

/// `gps`: the whole update is dropped if coordinates are missing or not numeric
pub fn decode_position (payload: &Value)->Option<GeoPoint> {
    GeoPoint::from_json( payload)
}

/// `path`: points without valid coordinates are dropped, the remaining ones keep their order.
/// Returns `None` if the payload is not a JSON array
pub fn decode_path (payload: &Value)->Option<Decoded<Vec<GeoPoint>>> {
    let array = payload.as_array()?;
    let mut diagnostics = Vec::new();
    let mut points = Vec::with_capacity( array.len());

    for (i,v) in array.iter().enumerate() {
        match GeoPoint::from_json(v) {
            Some(p) => points.push(p),
            None => diagnostics.push( format!("dropped path point {i} without valid coordinates: {v}"))
        }
    }
    Some( Decoded::new( points, diagnostics))
}

/// `pose`: fields with the wrong type keep their previous value
pub fn decode_pose (payload: &Value, prev: &Pose)->Option<Decoded<Pose>> {
    let obj = payload.as_object()?;
    let mut diagnostics = Vec::new();

    let pose = Pose {
        passenger_present: bool_field( obj, "passenger", prev.passenger_present, &mut diagnostics),
        safe: bool_field( obj, "safe", prev.safe, &mut diagnostics),
    };
    Some( Decoded::new( pose, diagnostics))
}

/// `ui-init`: a full vehicle record. Missing or malformed fields keep their previous value, an
/// empty or null `destination` means the server has no destination. The operator selection is
/// carried over from `prev`
pub fn decode_vehicle_state (payload: &Value, prev: &VehicleState)->Option<Decoded<VehicleState>> {
    let obj = payload.as_object()?;
    let mut diagnostics = Vec::new();

    let state_tag = match obj.get("state") {
        Some(Value::String(tag)) => StateTag::from_tag( tag),
        other => { report( &mut diagnostics, "state", "string", other); prev.state_tag.clone() }
    };

    let server_destination_id = match obj.get("destination") {
        Some(Value::String(id)) => if id.is_empty() { None } else { Some(id.clone()) },
        Some(Value::Null) => None,
        other => { report( &mut diagnostics, "destination", "string", other); prev.server_destination_id.clone() }
    };

    let last_known_position = match GeoPoint::from_json( payload) {
        Some(p) => p,
        None => {
            diagnostics.push( "missing or invalid vehicle latitude/longitude".to_string());
            prev.last_known_position
        }
    };

    let vehicle = VehicleState {
        state_tag,
        active: bool_field( obj, "active", prev.active, &mut diagnostics),
        current_destination_id: prev.current_destination_id.clone(),
        last_known_position,
        pullover_requested: prev.pullover_requested,
        session_id: string_field( obj, "_id", &prev.session_id, &mut diagnostics),
        operator_id: string_field( obj, "userId", &prev.operator_id, &mut diagnostics),
        server_destination_id,
        server_pullover: bool_field( obj, "pullover", prev.server_pullover, &mut diagnostics),
    };
    Some( Decoded::new( vehicle, diagnostics))
}

fn report (diagnostics: &mut Vec<String>, key: &str, expected: &str, found: Option<&Value>) {
    match found {
        Some(v) => diagnostics.push( format!("field '{key}' should be {expected}, found {}", json_type(v))),
        None => diagnostics.push( format!("missing field '{key}'"))
    }
}

fn bool_field (obj: &Map<String,Value>, key: &str, prev: bool, diagnostics: &mut Vec<String>)->bool {
    match obj.get(key) {
        Some(Value::Bool(b)) => *b,
        other => { report( diagnostics, key, "bool", other); prev }
    }
}

fn string_field (obj: &Map<String,Value>, key: &str, prev: &str, diagnostics: &mut Vec<String>)->String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        other => { report( diagnostics, key, "string", other); prev.to_string() }
    }
}

/* #endregion decoding */
