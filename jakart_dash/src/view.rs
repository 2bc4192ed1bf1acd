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

use std::fmt;
use serde::Serialize;
use jakart_common::geo::{GeoPoint,PixelPoint};
use crate::{
    path_buffer::PathBuffer,
    projection::{GeoProjector,Viewport},
    state::DashboardState,
    status::DashboardStatus,
};

#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct DestinationMarker {
    pub id: String,
    pub location: GeoPoint,
    pub pixel: PixelPoint,
    pub selected: bool,
}

/// everything a renderer needs to paint one frame of the map, in viewport pixel coordinates
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct MapScene {
    pub revision: u64,
    pub viewport: Viewport,
    pub cart: PixelPoint,
    pub destinations: Vec<DestinationMarker>, // ordered by id
    pub path: Vec<PixelPoint>, // empty unless the vehicle is in transit
    pub status: DashboardStatus,
}

impl MapScene {
    pub fn selected_destination (&self)->Option<&DestinationMarker> {
        self.destinations.iter().find( |d| d.selected)
    }
}

impl fmt::Display for MapScene {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        write!(f, "#{} {} cart:{} path:{} | {}", self.revision, self.viewport, self.cart, self.path.len(), self.status)?;
        for d in &self.destinations {
            write!(f, " | {}{}:{}", if d.selected {"*"} else {""}, d.id, d.pixel)?;
        }
        Ok(())
    }
}

/// projects dashboard snapshots into map scenes for a (resizable) viewport.
/// The path is only re-projected if it changed in the store or the viewport was resized
pub struct MapView {
    projector: GeoProjector,
    path: PathBuffer,
    path_revision: Option<u64>,
}

impl MapView {
    pub fn new (projector: GeoProjector, viewport: Viewport)->Self {
        MapView { projector, path: PathBuffer::new( projector, viewport), path_revision: None }
    }

    pub fn viewport (&self)->Viewport { self.path.viewport() }

    pub fn projector (&self)->&GeoProjector { &self.projector }

    pub fn resize (&mut self, viewport: Viewport) {
        self.path.set_viewport( viewport);
    }

    pub fn update (&mut self, state: &DashboardState)->MapScene {
        if self.path_revision != Some( state.path_revision) {
            self.path.set_path( state.path.clone());
            self.path_revision = Some( state.path_revision);
        }

        let viewport = self.path.viewport();
        let status = DashboardStatus::from_state( state);
        let selected_id = state.vehicle.current_destination_id.as_deref();

        let mut destinations: Vec<DestinationMarker> = state.destinations.values().map( |d| {
            DestinationMarker {
                id: d.id.clone(),
                location: d.location,
                pixel: self.projector.project( &d.location, &viewport),
                selected: selected_id == Some( d.id.as_str()),
            }
        }).collect();
        destinations.sort_by( |a,b| a.id.cmp( &b.id));

        let path = if status.show_path { self.path.get_projected().to_vec() } else { Vec::new() };

        MapScene {
            revision: state.revision,
            viewport,
            cart: self.projector.project( &state.position, &viewport),
            destinations,
            path,
            status
        }
    }
}
