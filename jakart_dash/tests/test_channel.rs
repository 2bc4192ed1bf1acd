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

//! channel lifecycle tests against a minimal loopback socket.io server

use std::{sync::{Arc, Mutex, atomic::{AtomicUsize, Ordering}}, time::Duration};
use serde_json::{json, Value};
use tokio::{net::{TcpListener, TcpStream}, sync::mpsc, time::{sleep, timeout}};
use tokio_tungstenite::{accept_async, WebSocketStream, tungstenite::protocol::Message};
use futures_util::{SinkExt, StreamExt};

use jakart_dash::{
    DashConfig,
    channel::*,
    dashboard::Dashboard,
    events::{CONNECT_EVENT, DISCONNECT_EVENT},
    state::StateTag,
};

// run with "cargo test --test test_channel -- --nocapture"

type ServerWs = WebSocketStream<TcpStream>;

const MAX_WAIT: Duration = Duration::from_secs(5);

/// accepts websocket connections and hands them to the test, which then plays the server side
async fn start_server ()->(String, mpsc::UnboundedReceiver<ServerWs>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn( async move {
        while let Ok((stream,_)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn( async move {
                if let Ok(ws) = accept_async( stream).await {
                    let _ = tx.send( ws);
                }
            });
        }
    });

    (format!("http://{addr}"), rx)
}

async fn next_connection (rx: &mut mpsc::UnboundedReceiver<ServerWs>)->ServerWs {
    timeout( MAX_WAIT, rx.recv()).await.expect("no client connection").expect("server terminated")
}

async fn send (ws: &mut ServerWs, frame: &str) {
    ws.send( Message::text( frame.to_string())).await.unwrap();
}

async fn recv_text (ws: &mut ServerWs)->String {
    loop {
        let msg = timeout( MAX_WAIT, ws.next()).await.expect("no client frame").expect("client closed").unwrap();
        if let Message::Text(text) = msg {
            println!("server got: {}", text.as_str());
            return text.as_str().to_string()
        }
    }
}

/// engine.io open and namespace connect
async fn handshake (ws: &mut ServerWs, ping_interval: u64, ping_timeout: u64) {
    let open = json!({ "sid": "test-sid", "upgrades": [], "pingInterval": ping_interval, "pingTimeout": ping_timeout, "maxPayload": 1000000 });
    send( ws, &format!("0{open}")).await;
    assert_eq!( recv_text( ws).await, "40/ui,");
    send( ws, r#"40/ui,{"sid":"test-socket"}"#).await;
}

async fn wait_until<F> (cond: F) where F: Fn()->bool {
    timeout( MAX_WAIT, async {
        while !cond() { sleep( Duration::from_millis(10)).await }
    }).await.expect("condition not met in time");
}

fn test_config (endpoint: &str)->ChannelConfig {
    ChannelConfig {
        endpoint: endpoint.to_string(),
        reconnect: ReconnectPolicy { delay: Duration::from_millis(50), max_delay: Duration::from_millis(50), backoff: Backoff::Fixed, max_attempts: None },
        ..ChannelConfig::default()
    }
}

fn count_event (channel: &EventChannel, event: &str)->Arc<AtomicUsize> {
    let counter = Arc::new( AtomicUsize::new(0));
    let c = counter.clone();
    channel.subscribe( event, "test", move |_| { c.fetch_add( 1, Ordering::SeqCst); });
    counter
}

#[tokio::test]
async fn test_events_and_commands() {
    let (endpoint, mut connections) = start_server().await;
    let mut channel = EventChannel::open( test_config( &endpoint)).unwrap();

    let n_connect = count_event( &channel, CONNECT_EVENT);
    let received = Arc::new( Mutex::new( Vec::<Value>::new()));
    {
        let received = received.clone();
        channel.subscribe( "gps", "test", move |v| received.lock().unwrap().push( v.clone()));
    }

    // queued before we are connected, sent once we joined the namespace
    assert!( channel.emit( "destination", &json!("home")));

    let mut ws = next_connection( &mut connections).await;
    handshake( &mut ws, 25000, 20000).await;
    assert_eq!( channel.wait_for_status( ChannelStatus::Connected, MAX_WAIT).await.unwrap(), ChannelStatus::Connected);
    assert_eq!( recv_text( &mut ws).await, r#"42/ui,["destination","home"]"#);

    send( &mut ws, r#"42/ui,["gps",{"latitude":38.44,"longitude":-78.87}]"#).await;
    send( &mut ws, r#"42/other,["gps",{"latitude":0.0,"longitude":0.0}]"#).await; // not our namespace
    send( &mut ws, r#"42/ui,["gps",{"latitude":38.45,"longitude":-78.86}]"#).await;
    send( &mut ws, "2").await;
    assert_eq!( recv_text( &mut ws).await, "3");

    wait_until( || received.lock().unwrap().len() == 2).await;
    let received = received.lock().unwrap().clone();
    assert_eq!( received[0]["latitude"], json!(38.44)); // arrival order
    assert_eq!( received[1]["latitude"], json!(38.45));

    assert!( channel.emit( "pullover", &json!(true)));
    assert_eq!( recv_text( &mut ws).await, r#"42/ui,["pullover",true]"#);
    assert_eq!( n_connect.load( Ordering::SeqCst), 1);

    channel.shutdown().await;
    assert_eq!( channel.status(), ChannelStatus::Closed);
}

#[tokio::test]
async fn test_disconnect_once_and_reconnect() {
    let (endpoint, mut connections) = start_server().await;
    let mut channel = EventChannel::open( test_config( &endpoint)).unwrap();
    let n_connect = count_event( &channel, CONNECT_EVENT);
    let n_disconnect = count_event( &channel, DISCONNECT_EVENT);

    let mut ws = next_connection( &mut connections).await;
    handshake( &mut ws, 25000, 20000).await;
    wait_until( || n_connect.load( Ordering::SeqCst) == 1).await;

    ws.close( None).await.unwrap();
    drop( ws);
    wait_until( || n_disconnect.load( Ordering::SeqCst) == 1).await;

    // this one is stale once we are back
    channel.emit( "destination", &json!("home"));

    let mut ws = next_connection( &mut connections).await;
    handshake( &mut ws, 25000, 20000).await;
    wait_until( || n_connect.load( Ordering::SeqCst) == 2).await;

    channel.emit( "pullover", &json!(false));
    assert_eq!( recv_text( &mut ws).await, r#"42/ui,["pullover",false]"#);

    // namespace disconnect from the server is another drop
    send( &mut ws, "41/ui,").await;
    wait_until( || n_disconnect.load( Ordering::SeqCst) == 2).await;

    let _ws = next_connection( &mut connections).await; // and we try again
    assert_eq!( n_disconnect.load( Ordering::SeqCst), 2);

    channel.shutdown().await;
}

#[tokio::test]
async fn test_panicking_handler() {
    let (endpoint, mut connections) = start_server().await;
    let mut channel = EventChannel::open( test_config( &endpoint)).unwrap();
    let n_disconnect = count_event( &channel, DISCONNECT_EVENT);
    let n_pose = count_event( &channel, "pose");
    channel.subscribe( "pose", "faulty", |v| {
        if v["safe"] == json!(false) { panic!("unexpected pose {v}") }
    });

    let mut ws = next_connection( &mut connections).await;
    handshake( &mut ws, 25000, 20000).await;
    channel.wait_for_status( ChannelStatus::Connected, MAX_WAIT).await.unwrap();

    send( &mut ws, r#"42/ui,["pose",{"passenger":true,"safe":false}]"#).await;
    send( &mut ws, r#"42/ui,["pose",{"passenger":true,"safe":true}]"#).await;

    // both events reach the other handler and the connection is still up
    wait_until( || n_pose.load( Ordering::SeqCst) == 2).await;
    send( &mut ws, "2").await;
    assert_eq!( recv_text( &mut ws).await, "3");
    assert_eq!( channel.status(), ChannelStatus::Connected);
    assert_eq!( n_disconnect.load( Ordering::SeqCst), 0);

    channel.shutdown().await;
    assert_eq!( channel.status(), ChannelStatus::Closed);
}

#[tokio::test]
async fn test_heartbeat_timeout() {
    let (endpoint, mut connections) = start_server().await;
    let mut channel = EventChannel::open( test_config( &endpoint)).unwrap();
    let n_disconnect = count_event( &channel, DISCONNECT_EVENT);

    let mut ws = next_connection( &mut connections).await;
    handshake( &mut ws, 100, 100).await;

    // the server never pings
    wait_until( || n_disconnect.load( Ordering::SeqCst) == 1).await;
    let _ws = next_connection( &mut connections).await;

    channel.shutdown().await;
    assert_eq!( n_disconnect.load( Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_reconnect_exhaustion() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop( listener); // nobody listens here anymore

    let mut config = test_config( &format!("http://{addr}"));
    config.reconnect = ReconnectPolicy { delay: Duration::from_millis(10), max_delay: Duration::from_millis(10), backoff: Backoff::Fixed, max_attempts: Some(2) };

    let mut channel = EventChannel::open( config).unwrap();
    let n_disconnect = count_event( &channel, DISCONNECT_EVENT);

    let status = channel.wait_for_status( ChannelStatus::Exhausted, MAX_WAIT).await.unwrap();
    println!("final status: {status}");
    assert_eq!( status, ChannelStatus::Exhausted);
    assert_eq!( n_disconnect.load( Ordering::SeqCst), 0); // we never were connected

    channel.shutdown().await;
    assert_eq!( channel.status(), ChannelStatus::Exhausted);
}

#[tokio::test]
async fn test_dashboard_session() {
    let (endpoint, mut connections) = start_server().await;
    let config = DashConfig { channel: test_config( &endpoint), ..DashConfig::default() };
    let mut dashboard = Dashboard::start( config).unwrap();

    let mut ws = next_connection( &mut connections).await;
    handshake( &mut ws, 25000, 20000).await;

    send( &mut ws, r#"42/ui,["get-destinations",{"home":{"latitude":38.433168,"longitude":-78.86098},"library":{"latitude":38.4351,"longitude":-78.8633}}]"#).await;
    send( &mut ws, r#"42/ui,["ui-init",{"destination":"","active":true,"state":"summon-start","_id":"jakart","userId":"op","latitude":38.4475,"longitude":-78.8702,"pullover":false}]"#).await;
    send( &mut ws, r#"42/ui,["gps",{"latitude":38.44,"longitude":-78.87}]"#).await;
    send( &mut ws, r#"42/ui,["path",[{"latitude":38.44,"longitude":-78.87},{"latitude":38.4351,"longitude":-78.8633}]]"#).await;

    wait_until( || dashboard.snapshot().path_revision == 1).await;
    let state = dashboard.snapshot();
    println!("{state:#?}");
    assert!( state.is_active());
    assert_eq!( state.destinations.len(), 2);
    assert_eq!( state.position.latitude, 38.44);
    assert_eq!( state.path.len(), 2);
    assert_eq!( state.n_diagnostics, 0);

    dashboard.commands().choose_destination("library").unwrap();
    assert_eq!( recv_text( &mut ws).await, r#"42/ui,["destination","library"]"#);

    // a snapshot sent before the server handled our command keeps the selection
    send( &mut ws, r#"42/ui,["ui-init",{"destination":"","active":true,"state":"transit-start","_id":"jakart","userId":"op","latitude":38.4475,"longitude":-78.8702,"pullover":false}]"#).await;
    wait_until( || dashboard.snapshot().vehicle.state_tag == StateTag::TransitStart).await;
    assert_eq!( dashboard.snapshot().vehicle.current_destination_id.as_deref(), Some("library"));

    ws.close( None).await.unwrap();
    wait_until( || !dashboard.snapshot().is_active()).await;
    assert_eq!( dashboard.snapshot().position.latitude, 38.44); // last known position is kept

    dashboard.shutdown().await;
    assert_eq!( dashboard.channel().n_handlers("gps"), 0);
}
