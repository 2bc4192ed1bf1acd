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

use jakart_common::geo::{GeoPoint,PixelPoint};
use crate::projection::{GeoProjector,Viewport};

/// the most recently received path together with its projection for the current viewport.
/// Paths are always replaced as a whole. Projection is eager: both a new path and a new viewport
/// immediately recompute the pixel sequence so that readers never see stale coordinates
#[derive(Debug,Clone)]
pub struct PathBuffer {
    projector: GeoProjector,
    viewport: Viewport,
    points: Vec<GeoPoint>,
    projected: Vec<PixelPoint>,
}

impl PathBuffer {
    pub fn new (projector: GeoProjector, viewport: Viewport)->Self {
        PathBuffer { projector, viewport, points: Vec::new(), projected: Vec::new() }
    }

    /// replace (not append) the buffered path. An empty sequence clears it
    pub fn set_path (&mut self, points: Vec<GeoPoint>) {
        self.projected = self.projector.project_all( &points, &self.viewport);
        self.points = points;
    }

    /// re-project the current path for a resized rendering surface
    pub fn set_viewport (&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.projected = self.projector.project_all( &self.points, &self.viewport);
        }
    }

    pub fn get_projected (&self)->&[PixelPoint] { &self.projected }

    pub fn points (&self)->&[GeoPoint] { &self.points }

    pub fn viewport (&self)->Viewport { self.viewport }

    pub fn is_empty (&self)->bool { self.points.is_empty() }

    pub fn clear (&mut self) {
        self.points.clear();
        self.projected.clear();
    }
}
