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

//! the core of the JAKART operator dashboard: a live view model of the autonomous cart that is kept in
//! sync with the cart server over a socket.io channel, projected onto a site map for rendering.
//!
//! ```text
//!   cart server ──(socket.io /ui)──▶ EventChannel ──▶ StateStore ──▶ MapView (GeoProjector, PathBuffer) ──▶ renderer
//!        ▲                                                 ▲
//!        └──────────── EventChannel ◀── CommandEmitter ◀───┴──────────────────────────────────────────── operator
//! ```

use std::path::Path;
use serde::{Serialize,Deserialize};
use tracing::info;
use jakart_common::config::{find_config_file, load_config_path};

mod errors;
pub use errors::*;

pub mod projection;
pub mod path_buffer;
pub mod state;
pub mod events;
pub mod store;
pub mod protocol;
pub mod channel;
pub mod commands;
pub mod status;
pub mod view;
pub mod dashboard;

pub const CONFIG_FILE: &str = "dashboard.ron";

/// the dashboard configuration. All parts have site defaults so config files only need to
/// contain what differs
#[derive(Debug,Clone,Default,Serialize,Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub channel: channel::ChannelConfig,
    pub projection: projection::ProjectionConfig,
    pub store: state::StoreConfig,
}

impl DashConfig {
    /// load from an explicit path, from `dashboard.ron` in the config dirs, or fall back to defaults
    pub fn load (path: Option<&Path>)->Result<DashConfig> {
        if let Some(path) = path {
            return Ok( load_config_path( path)?)
        }

        match find_config_file( CONFIG_FILE) {
            Some(path) => Ok( load_config_path( path)?),
            None => {
                info!("no {CONFIG_FILE} found, using defaults");
                Ok( DashConfig::default())
            }
        }
    }
}
