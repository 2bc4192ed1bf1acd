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

use std::{sync::Arc, time::Duration};
use serde_json::json;
use jakart_dash::{
    JakartDashError,
    channel::{ChannelConfig, EventChannel},
    commands::CommandEmitter,
    events::InboundEvent,
    state::{DashboardState, Pose, StateTag},
    status::*,
    store::StateStore,
};

// run with "cargo test --test test_commands -- --nocapture"

fn offline_emitter ()->(EventChannel, CommandEmitter) {
    let config = ChannelConfig { endpoint: "http://127.0.0.1:9".to_string(), command_queue_len: 64, ..ChannelConfig::default() };
    let channel = EventChannel::open( config).unwrap();
    let emitter = CommandEmitter::new( channel.command_sender(), Arc::new( StateStore::default()));
    (channel, emitter)
}

fn is_rejected<T> (res: &Result<T,JakartDashError>)->bool {
    matches!( res, Err(JakartDashError::IntentRejected(_)))
}

#[tokio::test]
async fn test_destination_intents() {
    let (mut channel, cmds) = offline_emitter();
    let store = cmds.store().clone();

    let res = cmds.choose_destination("lab");
    println!("choose unknown: {res:?}");
    assert!( is_rejected( &res));
    assert!( store.snapshot().vehicle.current_destination_id.is_none());

    cmds.choose_destination("home").unwrap();
    assert_eq!( store.snapshot().vehicle.current_destination_id.as_deref(), Some("home"));

    // can't change while driving
    let revision = store.snapshot().revision;
    assert!( is_rejected( &cmds.choose_destination("home")));
    assert_eq!( store.snapshot().revision, revision); // rejections are not published

    channel.shutdown().await;
}

#[tokio::test]
async fn test_pullover_intents() {
    let (mut channel, cmds) = offline_emitter();
    let store = cmds.store().clone();

    assert!( is_rejected( &cmds.request_pullover())); // nothing to pull over from

    cmds.choose_destination("home").unwrap();
    cmds.request_pullover().unwrap();
    assert!( store.snapshot().vehicle.pullover_requested);
    assert!( is_rejected( &cmds.request_pullover()));

    // resume is repeat-safe
    cmds.resume().unwrap();
    cmds.resume().unwrap();
    assert!( !store.snapshot().vehicle.pullover_requested);
    assert_eq!( store.snapshot().vehicle.current_destination_id.as_deref(), Some("home"));

    // a new destination while pulled over ends the pullover
    store.apply_destinations_snapshot( jakart_dash::state::destinations_from([
        ("home", jakart_common::geo::GeoPoint::from_lat_lon_degrees( 38.433168, -78.86098)),
        ("library", jakart_common::geo::GeoPoint::from_lat_lon_degrees( 38.4351, -78.8633)),
    ]));
    cmds.request_pullover().unwrap();
    cmds.choose_destination("library").unwrap();
    let vehicle = store.snapshot().vehicle.clone();
    assert_eq!( vehicle.current_destination_id.as_deref(), Some("library"));
    assert!( !vehicle.pullover_requested);

    channel.shutdown().await;
}

#[test]
fn test_status_prompts() {
    let mut state = DashboardState::default();
    let status = DashboardStatus::from_state( &state);
    println!("initial: {status}");
    assert_eq!( status.prompt, OperatorPrompt::ChooseDestination);
    assert!( status.offline);
    assert!( status.can_choose_destination());
    assert!( !status.can_request_pullover());
    assert_eq!( status.overlay_message(), Some( OFFLINE_MESSAGE));

    state.vehicle.active = true;
    state.vehicle.current_destination_id = Some("home".to_string());
    let status = DashboardStatus::from_state( &state);
    assert_eq!( status.prompt.to_string(), "Driving to home");
    assert!( status.can_request_pullover());
    assert_eq!( status.overlay_message(), None);

    state.vehicle.pullover_requested = true;
    let status = DashboardStatus::from_state( &state);
    assert_eq!( status.prompt, OperatorPrompt::ChangeDestination);
    assert!( status.can_resume());
    assert!( status.can_choose_destination());
}

#[test]
fn test_status_overlays() {
    let mut state = DashboardState::default();
    state.vehicle.active = true;
    state.vehicle.state_tag = StateTag::TransitEnd;
    let status = DashboardStatus::from(&state);
    assert!( status.arrived);
    assert!( !status.show_path);
    assert_eq!( status.overlay_message(), Some( ARRIVED_MESSAGE));

    state.vehicle.state_tag = StateTag::TransitStart;
    state.pose = Pose { passenger_present: true, safe: false };
    let status = DashboardStatus::from(&state);
    assert!( status.show_path);
    assert!( status.unsafe_pose);
    assert_eq!( status.overlay_message(), Some( UNSAFE_POSE_MESSAGE));

    // no passenger, no pose warning
    state.pose = Pose { passenger_present: false, safe: false };
    assert!( !DashboardStatus::from(&state).unsafe_pose);
}
