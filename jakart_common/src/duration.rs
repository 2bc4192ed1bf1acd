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

//! serde support for `Duration` config fields that are written as human readable strings, e.g.
//! `reconnect_delay: "500ms"` or `connect_timeout: "1 min"`

use std::time::Duration;
use serde::{Serializer,Deserialize,Deserializer,de::Error as DeError};

pub fn parse_duration (s: &str)->Result<Duration,String> {
    parse_duration::parse( s.trim()).map_err( |e| format!("invalid duration '{s}': {e}"))
}

pub fn deserialize_duration <'a,D> (deserializer: D)->Result<Duration,D::Error> where D: Deserializer<'a> {
    let s = String::deserialize( deserializer)?;
    parse_duration( &s).map_err( DeError::custom)
}

pub fn deserialize_optional_duration <'a,D> (deserializer: D)->Result<Option<Duration>,D::Error> where D: Deserializer<'a> {
    match Option::<String>::deserialize( deserializer)? {
        Some(s) => parse_duration( &s).map( Some).map_err( DeError::custom),
        None => Ok(None)
    }
}

/// we always write millis so that values round trip without loss
pub fn serialize_duration<S: Serializer> (dur: &Duration, s: S)->Result<S::Ok, S::Error> {
    s.serialize_str( &format!("{}ms", dur.as_millis()))
}
