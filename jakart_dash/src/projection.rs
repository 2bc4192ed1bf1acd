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

//! geographic to pixel projection for a single site map.
//! 
//! This is a local linear approximation, not a geodesic projection: the geographic delta between a
//! point and a fixed anchor coordinate (which corresponds to a known pixel offset of the map image) is
//! scaled independently per axis, i.e. we assume the operating area is small enough to ignore earth
//! curvature and meridian convergence. Longitude and latitude need separate scale factors since
//! degrees of longitude shrink with cos(latitude).
//! 
//! The resulting map coordinate is then shifted by a viewport dependent offset so that the map stays
//! centered when the rendering surface is resized:
//! ```text
//!   offset.x = (viewport.width - base.width)/2 + bias.x
//!   offset.y = (viewport.height - base.height)/2 + bias.y
//! ```

use std::{fmt, str::FromStr};
use serde::{Serialize,Deserialize};
use jakart_common::geo::{GeoPoint,PixelPoint};

/// meters per degree of latitude (spherical approximation, good enough for site maps)
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// the reference coordinate of our default site map (top left corner of the map image)
pub const DEFAULT_ANCHOR: GeoPoint = GeoPoint::from_lat_lon_degrees( 38.433905, -78.862169);

/* #region Viewport ***********************************************************************************************/

/// the current dimensions of the rendering surface in pixels
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new (width: f64, height: f64)->Self { Viewport { width, height } }

    /// a viewport we can't project into (zero area or garbage dimensions)
    pub fn is_degenerate (&self)->bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// parse "<width>x<height>", e.g. "1920x1080"
impl FromStr for Viewport {
    type Err = String;

    fn from_str (s: &str)->Result<Self,Self::Err> {
        let (w,h) = s.split_once(['x','X']).ok_or_else(|| format!("expected <width>x<height>, got '{s}'"))?;
        let width = w.trim().parse::<f64>().map_err(|e| format!("invalid viewport width '{w}': {e}"))?;
        let height = h.trim().parse::<f64>().map_err(|e| format!("invalid viewport height '{h}': {e}"))?;
        Ok( Viewport { width, height })
    }
}

/* #endregion Viewport */

/* #region config *************************************************************************************************/

/// pixels per degree of longitude (x) and latitude (y)
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct AxisScale {
    pub x: f64,
    pub y: f64,
}

impl AxisScale {
    /// derive per-axis scales for a map image with a given resolution at a reference latitude
    pub fn from_meters_per_pixel (ref_latitude: f64, meters_per_pixel: f64)->Self {
        let y = METERS_PER_DEGREE / meters_per_pixel;
        let x = y * ref_latitude.to_radians().cos();
        AxisScale { x, y }
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub anchor: GeoPoint,       // geographic position of the map image reference pixel
    pub base_viewport: Viewport, // viewport dimensions for which the map image is laid out
    pub scale: AxisScale,
    pub bias: PixelPoint,       // constant shift applied on top of the centering offset
}

impl Default for ProjectionConfig {
    fn default()->Self {
        let anchor = DEFAULT_ANCHOR;
        ProjectionConfig {
            anchor,
            base_viewport: Viewport::new( 1583.0, 909.0),
            scale: AxisScale::from_meters_per_pixel( anchor.latitude, 1.0),
            bias: PixelPoint::new( -120.0, 70.0),
        }
    }
}

/* #endregion config */

/* #region GeoProjector *******************************************************************************************/

/// the (stateless) projection function object. Cheap to copy and safe to use from any number of readers.
/// Projections are never cached here - callers recompute whenever the viewport changes
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct GeoProjector {
    config: ProjectionConfig
}

impl GeoProjector {
    pub fn new (config: ProjectionConfig)->Self {
        GeoProjector { config }
    }

    pub fn config (&self)->&ProjectionConfig { &self.config }

    pub fn anchor (&self)->GeoPoint { self.config.anchor }

    /// the viewport dependent pixel offset that is added to each map coordinate
    pub fn offset (&self, viewport: &Viewport)->PixelPoint {
        let base = &self.config.base_viewport;
        let bias = &self.config.bias;
        PixelPoint {
            x: (viewport.width - base.width) / 2.0 + bias.x,
            y: (viewport.height - base.height) / 2.0 + bias.y,
        }
    }

    /// the viewport independent map coordinate of a point, relative to the anchor pixel
    pub fn map_coordinate (&self, point: &GeoPoint)->PixelPoint {
        let anchor = &self.config.anchor;
        let scale = &self.config.scale;
        PixelPoint {
            x: (point.longitude - anchor.longitude) * scale.x,
            y: (anchor.latitude - point.latitude) * scale.y, // screen y grows downwards
        }
    }

    /// project a geographic point onto the given viewport. Degenerate viewports map everything to
    /// [`PixelPoint::ORIGIN`]
    pub fn project (&self, point: &GeoPoint, viewport: &Viewport)->PixelPoint {
        if viewport.is_degenerate() {
            PixelPoint::ORIGIN
        } else {
            self.map_coordinate(point) + self.offset(viewport)
        }
    }

    pub fn project_all (&self, points: &[GeoPoint], viewport: &Viewport)->Vec<PixelPoint> {
        if viewport.is_degenerate() {
            vec![PixelPoint::ORIGIN; points.len()]
        } else {
            let offset = self.offset(viewport);
            points.iter().map( |p| self.map_coordinate(p) + offset).collect()
        }
    }
}

impl Default for GeoProjector {
    fn default()->Self { GeoProjector::new( ProjectionConfig::default()) }
}

/* #endregion GeoProjector */
