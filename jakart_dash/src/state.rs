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

//! the dashboard view model: everything the rendering layer needs to know about the cart, kept as
//! one immutable snapshot that is replaced (cloned-on-write) by the [`crate::store::StateStore`]

use std::{collections::{HashMap,VecDeque}, fmt};
use serde::{Serialize,Deserialize};
use jakart_common::geo::GeoPoint;
use crate::projection::DEFAULT_ANCHOR;

/* #region StateTag ***********************************************************************************************/

/// the vehicle lifecycle state. This is an open set - tags we don't know are kept verbatim
#[derive(Debug,Clone,PartialEq,Eq,Hash,Serialize,Deserialize)]
#[serde(from="String", into="String")]
pub enum StateTag {
    SummonStart,
    TransitStart,
    TransitEnd,
    SummonFinish,
    Other(String)
}

impl StateTag {
    pub fn from_tag (tag: &str)->Self {
        match tag {
            "summon-start" => StateTag::SummonStart,
            "transit-start" => StateTag::TransitStart,
            "transit-end" => StateTag::TransitEnd,
            "summon-finish" => StateTag::SummonFinish,
            other => StateTag::Other(other.to_string())
        }
    }

    pub fn as_str (&self)->&str {
        match self {
            StateTag::SummonStart => "summon-start",
            StateTag::TransitStart => "transit-start",
            StateTag::TransitEnd => "transit-end",
            StateTag::SummonFinish => "summon-finish",
            StateTag::Other(tag) => tag.as_str()
        }
    }

    /// the lifecycle states that end a trip, which also ends the current destination selection
    pub fn clears_destination (&self)->bool {
        matches!( self, StateTag::TransitEnd | StateTag::SummonFinish)
    }
}

impl From<String> for StateTag {
    fn from (s: String)->Self { StateTag::from_tag( s.as_str()) }
}

impl From<StateTag> for String {
    fn from (tag: StateTag)->Self {
        match tag {
            StateTag::Other(s) => s,
            known => known.as_str().to_string()
        }
    }
}

impl fmt::Display for StateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str( self.as_str())
    }
}

/* #endregion StateTag */

/* #region records ************************************************************************************************/

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct Destination {
    pub id: String,
    pub location: GeoPoint,
}

pub type Destinations = HashMap<String,Destination>;

pub fn destinations_from<I,S> (entries: I)->Destinations where I: IntoIterator<Item=(S,GeoPoint)>, S: ToString {
    entries.into_iter()
        .map( |(id,location)| { let id = id.to_string(); (id.clone(), Destination{ id, location }) })
        .collect()
}

/// the vehicle record as sent by the server in `ui-init` snapshots. This is always replaced as a whole,
/// except for the operator selection (`current_destination_id`, `pullover_requested`), which is owned by
/// this client and only changed by operator intents or trip ending state tags. What the server reports
/// for these is kept in `server_destination_id` and `server_pullover`
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct VehicleState {
    pub state_tag: StateTag,
    pub active: bool,
    pub current_destination_id: Option<String>,
    pub last_known_position: GeoPoint,
    pub pullover_requested: bool,
    pub session_id: String,
    pub operator_id: String,
    pub server_destination_id: Option<String>,
    pub server_pullover: bool,
}

impl Default for VehicleState {
    fn default()->Self {
        VehicleState {
            state_tag: StateTag::SummonStart,
            active: false,
            current_destination_id: None,
            last_known_position: GeoPoint::from_lat_lon_degrees( 38.447471618652344, -78.87019348144531),
            pullover_requested: false,
            session_id: "jakart".to_string(),
            operator_id: String::new(),
            server_destination_id: None,
            server_pullover: false,
        }
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Default,Serialize,Deserialize)]
pub struct Pose {
    pub passenger_present: bool,
    pub safe: bool,
}

/// a recorded problem with an inbound payload (the offending part was dropped)
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct Diagnostic {
    pub event: &'static str,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.event, self.message)
    }
}

/* #endregion records */

/* #region config *************************************************************************************************/

/// the initial view model values, which are shown until the server sends its first snapshots
#[derive(Debug,Clone,Serialize,Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub destinations: HashMap<String,GeoPoint>,
    pub position: GeoPoint,
    pub vehicle: VehicleState,
    pub max_diagnostics: usize, // how many recent payload diagnostics we keep in snapshots
}

impl Default for StoreConfig {
    fn default()->Self {
        StoreConfig {
            destinations: HashMap::from([
                ("home".to_string(), GeoPoint::from_lat_lon_degrees( 38.433168, -78.86098))
            ]),
            position: DEFAULT_ANCHOR,
            vehicle: VehicleState::default(),
            max_diagnostics: 32,
        }
    }
}

/* #endregion config */

/* #region DashboardState *****************************************************************************************/

/// the canonical view model. Instances are immutable once published - the store replaces the whole
/// snapshot for each update
#[derive(Debug,Clone,Serialize)]
pub struct DashboardState {
    pub destinations: Destinations,
    pub vehicle: VehicleState,
    pub pose: Pose,
    pub path: Vec<GeoPoint>,
    pub path_revision: u64,     // bumped for each path replacement
    pub position: GeoPoint,     // live cart position (retained across channel drops)
    pub diagnostics: VecDeque<Diagnostic>,
    pub n_diagnostics: u64,     // total number of diagnostics since start
    pub revision: u64,          // bumped for each published update
}

impl DashboardState {
    pub fn new (config: &StoreConfig)->Self {
        DashboardState {
            destinations: destinations_from( config.destinations.iter().map( |(id,p)| (id,*p))),
            vehicle: config.vehicle.clone(),
            pose: Pose::default(),
            path: Vec::new(),
            path_revision: 0,
            position: config.position,
            diagnostics: VecDeque::new(),
            n_diagnostics: 0,
            revision: 0,
        }
    }

    pub fn current_destination (&self)->Option<&Destination> {
        self.vehicle.current_destination_id.as_ref().and_then( |id| self.destinations.get(id))
    }

    pub fn is_active (&self)->bool { self.vehicle.active }
}

impl Default for DashboardState {
    fn default()->Self { DashboardState::new( &StoreConfig::default()) }
}

/* #endregion DashboardState */
