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

//! a minimal socket.io (v5) over engine.io (v4) text codec - just what we need to talk to the cart
//! server through a plain websocket transport (no long-polling, no binary attachments).
//!
//! engine.io text frames are `<packet-type>[<data>]`:
//!   `0{"sid":"..","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}` open
//!   `2` ping (server), `3` pong (client), `1` close, `6` noop
//!   `4<socket.io packet>` message
//!
//! socket.io packets are `<type>[<namespace>,][<ack-id>][<json>]`:
//!   `0/ui,` connect request, `0/ui,{"sid":".."}` connect ack, `1/ui,` disconnect
//!   `2/ui,["gps",{"latitude":..,"longitude":..}]` event, `4/ui,{"message":".."}` connect error
//!
//! the root namespace `/` is implicit, i.e. it does not show up in packets

use std::time::Duration;
use serde::{Serialize,Deserialize};
use serde_json::{self,Value};
use crate::errors::{protocol_error, Result};

pub const ENGINE_IO_VERSION: u32 = 4;

/// the text frame we answer server pings with
pub const PONG_FRAME: &str = "3";

/* #region engine.io **********************************************************************************************/

#[derive(Debug,Clone,PartialEq)]
pub enum EnginePacket<'a> {
    Open(&'a str),   // handshake JSON
    Close,
    Ping(&'a str),
    Pong(&'a str),
    Message(&'a str), // socket.io packet
    Upgrade,
    Noop,
}

pub fn parse_engine_packet (frame: &str)->Result<EnginePacket<'_>> {
    let (ty, data) = split_packet_type( frame, "engine.io")?;

    match ty {
        b'0' => Ok( EnginePacket::Open(data)),
        b'1' => Ok( EnginePacket::Close),
        b'2' => Ok( EnginePacket::Ping(data)),
        b'3' => Ok( EnginePacket::Pong(data)),
        b'4' => Ok( EnginePacket::Message(data)),
        b'5' => Ok( EnginePacket::Upgrade),
        b'6' => Ok( EnginePacket::Noop),
        _ => Err( protocol_error( format!("unknown engine.io packet type in '{frame}'")))
    }
}

/// split off the leading packet type, which has to be a single ASCII digit
fn split_packet_type<'a> (frame: &'a str, layer: &str)->Result<(u8,&'a str)> {
    match frame.as_bytes().first() {
        Some(ty) if ty.is_ascii_digit() => Ok( (*ty, &frame[1..]) ),
        Some(_) => Err( protocol_error( format!("invalid {layer} packet type in '{frame}'"))),
        None => Err( protocol_error( format!("empty {layer} frame")))
    }
}

/// the data of the engine.io `open` packet
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(rename_all="camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64, // millis
    pub ping_timeout: u64,  // millis
    #[serde(default)]
    pub max_payload: Option<u64>,
}

impl Handshake {
    pub fn parse (data: &str)->Result<Handshake> {
        Ok( serde_json::from_str(data)?)
    }

    /// how long we wait for the next server ping before we consider the connection dead
    pub fn heartbeat_timeout (&self)->Duration {
        Duration::from_millis( self.ping_interval + self.ping_timeout)
    }
}

/* #endregion engine.io */

/* #region socket.io **********************************************************************************************/

pub const ROOT_NAMESPACE: &str = "/";

#[derive(Debug,Clone,PartialEq)]
pub enum SocketPacket {
    Connect { namespace: String, data: Option<Value> },
    Disconnect { namespace: String },
    Event { namespace: String, ack_id: Option<u64>, name: String, args: Vec<Value> },
    Ack { namespace: String, ack_id: u64, args: Vec<Value> },
    ConnectError { namespace: String, data: Option<Value> },
}

impl SocketPacket {
    pub fn namespace (&self)->&str {
        match self {
            SocketPacket::Connect{namespace,..} => namespace,
            SocketPacket::Disconnect{namespace} => namespace,
            SocketPacket::Event{namespace,..} => namespace,
            SocketPacket::Ack{namespace,..} => namespace,
            SocketPacket::ConnectError{namespace,..} => namespace,
        }
    }
}

/// parse the payload of an engine.io `message` packet
pub fn parse_socket_packet (packet: &str)->Result<SocketPacket> {
    let (ty, mut rest) = split_packet_type( packet, "socket.io")?;

    if ty == b'5' || ty == b'6' {
        return Err( protocol_error("binary socket.io packets are not supported"))
    }

    let namespace = if rest.starts_with('/') {
        match rest.find(',') {
            Some(idx) => { let ns = &rest[..idx]; rest = &rest[idx+1..]; ns }
            None => { let ns = rest; rest = ""; ns }
        }
    } else {
        ROOT_NAMESPACE
    }.to_string();

    let n_digits = rest.bytes().take_while( |b| b.is_ascii_digit()).count();
    let ack_id = if n_digits > 0 {
        let id = rest[..n_digits].parse::<u64>().map_err(|e| protocol_error( format!("invalid ack id: {e}")))?;
        rest = &rest[n_digits..];
        Some(id)
    } else { None };

    let data: Option<Value> = if rest.is_empty() { None } else { Some( serde_json::from_str(rest)?) };

    match ty {
        b'0' => Ok( SocketPacket::Connect { namespace, data }),
        b'1' => Ok( SocketPacket::Disconnect { namespace }),
        b'2' => {
            let (name,args) = split_event_data( data)?;
            Ok( SocketPacket::Event { namespace, ack_id, name, args })
        }
        b'3' => {
            let ack_id = ack_id.ok_or_else(|| protocol_error("ack packet without id"))?;
            let args = match data { Some(Value::Array(args)) => args, _ => Vec::new() };
            Ok( SocketPacket::Ack { namespace, ack_id, args })
        }
        b'4' => Ok( SocketPacket::ConnectError { namespace, data }),
        _ => Err( protocol_error( format!("unknown socket.io packet type in '{packet}'")))
    }
}

/// event data is a JSON array with the event name as first element
fn split_event_data (data: Option<Value>)->Result<(String,Vec<Value>)> {
    match data {
        Some(Value::Array(mut elems)) if !elems.is_empty() => {
            match elems.remove(0) {
                Value::String(name) => Ok( (name, elems) ),
                other => Err( protocol_error( format!("event name is not a string: {other}")))
            }
        }
        _ => Err( protocol_error("event packet without name"))
    }
}

fn namespace_prefix (namespace: &str)->String {
    if namespace.is_empty() || namespace == ROOT_NAMESPACE { String::new() } else { format!("{namespace},") }
}

/// engine.io text frame to connect to a namespace
pub fn connect_frame (namespace: &str)->String {
    format!("40{}", namespace_prefix(namespace))
}

/// engine.io text frame to leave a namespace
pub fn disconnect_frame (namespace: &str)->String {
    format!("41{}", namespace_prefix(namespace))
}

/// engine.io text frame for an event with a single argument
pub fn event_frame (namespace: &str, name: &str, payload: &Value)->Result<String> {
    let data = serde_json::to_string( &Value::Array( vec![ Value::String(name.to_string()), payload.clone()]))?;
    Ok( format!("42{}{}", namespace_prefix(namespace), data))
}

/// normalize configured namespaces to the wire format ("ui" -> "/ui")
pub fn normalize_namespace (namespace: &str)->String {
    let ns = namespace.trim();
    if ns.is_empty() {
        ROOT_NAMESPACE.to_string()
    } else if ns.starts_with('/') {
        ns.to_string()
    } else {
        format!("/{ns}")
    }
}

/* #endregion socket.io */
