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

use std::collections::VecDeque;
use serde_json::json;
use jakart_common::geo::*;
use jakart_common::collections::push_bounded;

// run with "cargo test --test test_geo -- --nocapture"

#[test]
fn test_geo_point_aliases() {
    let input = r#"{ "latitude": 38.433905, "longitude": -78.862169 }"#;
    let p: GeoPoint = serde_json::from_str(input).unwrap();
    println!("deserialized GeoPoint: {p:?}");
    assert_eq!( p, GeoPoint::from_lat_lon_degrees( 38.433905, -78.862169));

    let input = r#"{ "lat": 38.433905, "lon": -78.862169 }"#;
    let p1: GeoPoint = serde_json::from_str(input).unwrap();
    println!("alternative input: '{}' -> {}", input, p1);
    assert_eq!( p, p1);

    let s = serde_json::to_string(&p).unwrap();
    println!("serialized GeoPoint: '{s}'");
    assert!( s.contains("\"latitude\""));
}

#[test]
fn test_geo_point_from_json() {
    let p = GeoPoint::from_json( &json!({"latitude": 38.4, "longitude": -78.8})).unwrap();
    assert_eq!( p, GeoPoint::from_lat_lon_degrees( 38.4, -78.8));

    let p = GeoPoint::from_json( &json!({"y": 38.4, "x": -78.8})).unwrap();
    assert_eq!( p, GeoPoint::from_lat_lon_degrees( 38.4, -78.8));

    // strings, missing fields and non-objects are rejected
    assert!( GeoPoint::from_json( &json!({"latitude": "bad", "longitude": -78.8})).is_none());
    assert!( GeoPoint::from_json( &json!({"latitude": 38.4})).is_none());
    assert!( GeoPoint::from_json( &json!([38.4, -78.8])).is_none());
    assert!( GeoPoint::from_json( &json!(null)).is_none());
}

#[test]
fn test_pixel_point_ops() {
    let a = PixelPoint::new( 10.0, 20.0);
    let b = PixelPoint::new( 1.5, -2.5);
    println!("{a} + {b} = {}", a + b);

    assert_eq!( a + b, PixelPoint::new( 11.5, 17.5));
    assert_eq!( (a + b) - b, a);
    assert_eq!( PixelPoint::default(), PixelPoint::ORIGIN);
}

#[test]
fn test_push_bounded() {
    let mut v: VecDeque<usize> = VecDeque::new();
    for i in 0..7 {
        push_bounded( &mut v, i, 3);
    }
    println!("{v:?}");
    assert_eq!( vec![4,5,6], Vec::from(v));
}
