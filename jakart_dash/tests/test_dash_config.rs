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

use std::{fs, path::Path, time::Duration};
use jakart_common::geo::GeoPoint;
use jakart_dash::{DashConfig, channel::Backoff, projection::{GeoProjector, ProjectionConfig, DEFAULT_ANCHOR}};

// run with "cargo test --test test_dash_config -- --nocapture"

#[test]
fn test_sample_config() {
    let path = Path::new( env!("CARGO_MANIFEST_DIR")).join("config/dashboard.ron");
    let config = DashConfig::load( Some( &path)).unwrap();
    println!("{config:#?}");

    assert_eq!( config.channel.websocket_url().unwrap().as_str(), "ws://localhost:8021/socket.io/?EIO=4&transport=websocket");
    assert_eq!( config.channel.reconnect.backoff, Backoff::Exponential);
    assert_eq!( config.channel.reconnect.max_delay, Duration::from_secs(5));
    assert_eq!( config.projection.anchor, DEFAULT_ANCHOR);
    assert_eq!( config.store.destinations.get("home"), Some( &GeoPoint::from_lat_lon_degrees( 38.433168, -78.86098)));

    // the sample spells out the defaults
    let defaults = ProjectionConfig::default();
    assert_eq!( config.projection.base_viewport, defaults.base_viewport);
    assert!( (config.projection.scale.x - defaults.scale.x).abs() < 1e-6);
}

#[test]
fn test_partial_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dashboard.ron");
    fs::write( &path, r#"(
        channel: ( endpoint: "http://10.0.0.5:8021", reconnect: ( delay: "2s", backoff: Fixed ) ),
        store: ( max_diagnostics: 4 ),
    )"#).unwrap();

    let config = DashConfig::load( Some( &path)).unwrap();
    assert_eq!( config.channel.endpoint, "http://10.0.0.5:8021");
    assert_eq!( config.channel.namespace, "/ui");
    assert_eq!( config.channel.reconnect.delay, Duration::from_secs(2));
    assert_eq!( config.channel.reconnect.max_attempts, None);
    assert_eq!( config.store.max_diagnostics, 4);
    assert!( config.store.destinations.contains_key("home"));
    assert_eq!( GeoProjector::new( config.projection), GeoProjector::default());
}

#[test]
fn test_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dashboard.ron");
    fs::write( &path, r#"( channel: ( reconnect: ( delay: "whenever" ) ) )"#).unwrap();

    let res = DashConfig::load( Some( &path));
    println!("{res:?}");
    assert!( res.is_err());
}
