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

//! geographic and screen coordinate types.
//! Unlike full geodetic points these are plain value types - we do not normalize or bounds check
//! coordinates since positions come from a trusted vehicle, but we do reject non-finite values
//! when decoding untyped (JSON) input.

use std::{fmt, ops::{Add,Sub}};
use serde::{Serialize,Deserialize};
use serde_json::Value;

/* #region GeoPoint ***********************************************************************************************/

/// a WGS84 position in degrees
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct GeoPoint {
    #[serde(alias="lat", alias="y")]
    pub latitude: f64,

    #[serde(alias="lon", alias="x")]
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn from_lat_lon_degrees (latitude: f64, longitude: f64)->Self {
        GeoPoint { latitude, longitude }
    }

    pub fn is_finite (&self)->bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// lenient decoding from untyped JSON. Accepts the same field aliases as the serde impl but returns `None`
    /// if either coordinate is missing, not a JSON number or not finite
    pub fn from_json (v: &Value)->Option<GeoPoint> {
        let obj = v.as_object()?;
        let latitude = ["latitude", "lat", "y"].iter().find_map( |k| obj.get(*k))?.as_f64()?;
        let longitude = ["longitude", "lon", "x"].iter().find_map( |k| obj.get(*k))?.as_f64()?;

        let p = GeoPoint { latitude, longitude };
        if p.is_finite() { Some(p) } else { None }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.6},{:.6}]", self.latitude, self.longitude)
    }
}

/* #endregion GeoPoint */

/* #region PixelPoint *********************************************************************************************/

/// a point on the rendering surface (x to the right, y downwards). These are always derived from
/// GeoPoints and a viewport, i.e. they are recomputed and never stored persistently
#[derive(Debug,Clone,Copy,PartialEq,Default,Serialize,Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const ORIGIN: PixelPoint = PixelPoint { x: 0.0, y: 0.0 };

    pub const fn new (x: f64, y: f64)->Self { PixelPoint { x, y } }
}

impl Add for PixelPoint {
    type Output = PixelPoint;
    fn add (self, rhs: PixelPoint)->PixelPoint { PixelPoint { x: self.x + rhs.x, y: self.y + rhs.y } }
}

impl Sub for PixelPoint {
    type Output = PixelPoint;
    fn sub (self, rhs: PixelPoint)->PixelPoint { PixelPoint { x: self.x - rhs.x, y: self.y - rhs.y } }
}

impl fmt::Display for PixelPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1},{:.1})", self.x, self.y)
    }
}

/* #endregion PixelPoint */
