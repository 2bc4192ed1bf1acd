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

//! the persistent socket.io connection to the cart server.
//!
//! An [`EventChannel`] owns a background task that connects, joins the configured namespace and then
//! dispatches inbound events to registered handlers in arrival order. If the connection drops the
//! task dispatches a single `disconnect` event and reconnects according to its [`ReconnectPolicy`].
//! Outbound events go through a bounded command queue so that `emit` never blocks the caller.

use std::{any::Any, collections::HashMap, fmt, panic::{self, AssertUnwindSafe}, sync::{Arc, Mutex, MutexGuard, Weak}, time::Duration};
use serde::{Serialize,Deserialize};
use serde_json::Value;
use tokio::{select, sync::watch, task::JoinHandle, time::{sleep, sleep_until, timeout, Instant}};
use tokio_util::sync::CancellationToken;
use tokio_tungstenite::tungstenite::protocol::Message;
use futures_util::{SinkExt, StreamExt};
use kanal::{AsyncSender, AsyncReceiver};
use url::Url;
use tracing::{trace, debug, info, warn, error};

use jakart_common::{duration::{deserialize_duration, serialize_duration}, ws::{self, WsStream}};
use crate::errors::{JakartDashError, Result, op_failed, protocol_error};
use crate::events::{CONNECT_EVENT, DISCONNECT_EVENT};
use crate::protocol::{
    EnginePacket, Handshake, SocketPacket, PONG_FRAME, ENGINE_IO_VERSION,
    parse_engine_packet, parse_socket_packet, connect_frame, disconnect_frame, event_frame, normalize_namespace
};

/* #region config *************************************************************************************************/

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum Backoff {
    Fixed,
    Exponential
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub delay: Duration,
    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub max_delay: Duration, // upper bound for exponential backoff
    pub backoff: Backoff,
    pub max_attempts: Option<u32>, // consecutive failed attempts before we give up. None means never give up
}

impl ReconnectPolicy {
    /// the delay before reconnect attempt number `attempt` (starting at 1), or None if we should give up.
    /// A delay is always returned for unbounded policies, i.e. reconnection never busy-loops
    pub fn delay_for (&self, attempt: u32)->Option<Duration> {
        if let Some(max_attempts) = self.max_attempts {
            if attempt > max_attempts { return None }
        }

        let delay = match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential => {
                let shift = attempt.saturating_sub(1).min(16);
                self.delay.saturating_mul( 1u32 << shift)
            }
        };
        Some( delay.min( self.max_delay.max( self.delay)))
    }
}

impl Default for ReconnectPolicy {
    fn default()->Self {
        ReconnectPolicy {
            delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            backoff: Backoff::Exponential,
            max_attempts: None
        }
    }
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub endpoint: String,  // http(s) or ws(s) base URI of the cart server
    pub namespace: String,
    pub path: String,      // engine.io request path
    pub reconnect: ReconnectPolicy,
    pub command_queue_len: usize,
    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub connect_timeout: Duration, // for websocket connect and engine.io handshake
    pub headers: Vec<String>, // extra "name: value" request headers
}

impl ChannelConfig {
    /// the websocket URL for the configured endpoint, e.g. `ws://localhost:8021/socket.io/?EIO=4&transport=websocket`
    pub fn websocket_url (&self)->Result<Url> {
        let mut url = Url::parse( &self.endpoint)?;
        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => return Err( JakartDashError::UrlError( format!("unsupported scheme '{other}' in {}", self.endpoint)))
        };
        url.set_scheme( scheme).map_err(|_| JakartDashError::UrlError( format!("cannot use {scheme} for {}", self.endpoint)))?;
        url.set_path( &self.path);
        url.query_pairs_mut().clear()
            .append_pair( "EIO", &ENGINE_IO_VERSION.to_string())
            .append_pair( "transport", "websocket");
        Ok(url)
    }
}

impl Default for ChannelConfig {
    fn default()->Self {
        ChannelConfig {
            endpoint: "http://localhost:8021".to_string(),
            namespace: "/ui".to_string(),
            path: "/socket.io/".to_string(),
            reconnect: ReconnectPolicy::default(),
            command_queue_len: 16,
            connect_timeout: Duration::from_secs(10),
            headers: Vec::new(),
        }
    }
}

/* #endregion config */

/* #region handler registry ***************************************************************************************/

pub type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

/// the registered handlers per event name, at most one per logical subscriber.
/// Handlers of the same event are invoked in registration order
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Vec<(String,EventHandler)>>
}

impl HandlerRegistry {
    pub fn new ()->Self { HandlerRegistry::default() }

    /// register `handler` for `event`, replacing a previous handler of the same subscriber.
    /// Returns true if a handler was replaced
    pub fn subscribe (&mut self, event: &str, subscriber: &str, handler: EventHandler)->bool {
        let entries = self.handlers.entry( event.to_string()).or_default();
        if let Some(entry) = entries.iter_mut().find( |(s,_)| s == subscriber) {
            entry.1 = handler;
            true
        } else {
            entries.push( (subscriber.to_string(), handler));
            false
        }
    }

    pub fn unsubscribe (&mut self, event: &str, subscriber: &str)->bool {
        let mut removed = false;
        if let Some(entries) = self.handlers.get_mut( event) {
            let len = entries.len();
            entries.retain( |(s,_)| s != subscriber);
            removed = entries.len() < len;
            if entries.is_empty() { self.handlers.remove( event); }
        }
        removed
    }

    /// remove all handlers of `subscriber`, returning how many were removed
    pub fn unsubscribe_all (&mut self, subscriber: &str)->usize {
        let mut n_removed = 0;
        for entries in self.handlers.values_mut() {
            let len = entries.len();
            entries.retain( |(s,_)| s != subscriber);
            n_removed += len - entries.len();
        }
        self.handlers.retain( |_,entries| !entries.is_empty());
        n_removed
    }

    pub fn is_subscribed (&self, event: &str, subscriber: &str)->bool {
        self.handlers.get( event).map( |entries| entries.iter().any( |(s,_)| s == subscriber)).unwrap_or(false)
    }

    pub fn n_handlers (&self, event: &str)->usize {
        self.handlers.get( event).map( |entries| entries.len()).unwrap_or(0)
    }

    /// a snapshot of the current handlers so that we don't hold the registry lock while executing them
    pub fn handlers_for (&self, event: &str)->Vec<EventHandler> {
        self.handlers.get( event)
            .map( |entries| entries.iter().map( |(_,h)| h.clone()).collect())
            .unwrap_or_default()
    }

    /// run all handlers for `event`. A panicking handler is logged and does not keep the others from running
    pub fn dispatch (&self, event: &str, payload: &Value)->usize {
        let handlers = self.handlers_for( event);
        for h in &handlers { call_handler( h, event, payload) }
        handlers.len()
    }
}

type SharedRegistry = Arc<Mutex<HandlerRegistry>>;

// a panicking handler must not disable the whole registry
fn lock_registry (registry: &Mutex<HandlerRegistry>)->MutexGuard<'_,HandlerRegistry> {
    registry.lock().unwrap_or_else( |poisoned| poisoned.into_inner())
}

fn dispatch (registry: &Mutex<HandlerRegistry>, event: &str, payload: &Value) {
    let handlers = lock_registry( registry).handlers_for( event); // lock released before we run handlers
    if handlers.is_empty() {
        trace!("no handler for event '{event}'");
    }
    for h in &handlers { call_handler( h, event, payload) }
}

fn call_handler (handler: &EventHandler, event: &str, payload: &Value) {
    if let Err(e) = panic::catch_unwind( AssertUnwindSafe( || handler(payload))) {
        error!("'{event}' handler panicked: {}", panic_message( e.as_ref()));
    }
}

fn panic_message (e: &(dyn Any + Send))->&str {
    if let Some(msg) = e.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = e.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "<non-string panic payload>"
    }
}

/// a scoped subscription that is removed when this guard is dropped
#[must_use = "dropping a Subscription immediately unsubscribes its handler"]
pub struct Subscription {
    registry: Weak<Mutex<HandlerRegistry>>,
    event: String,
    subscriber: String,
}

impl Subscription {
    pub fn event (&self)->&str { &self.event }
    pub fn subscriber (&self)->&str { &self.subscriber }
}

impl Drop for Subscription {
    fn drop (&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock_registry( &registry).unsubscribe( &self.event, &self.subscriber);
        }
    }
}

/* #endregion handler registry */

/* #region channel ************************************************************************************************/

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum ChannelStatus {
    Connecting,
    Connected,    // namespace joined
    Disconnected, // waiting for the next reconnect attempt
    Exhausted,    // gave up reconnecting
    Closed        // shut down
}

impl ChannelStatus {
    pub fn is_connected (&self)->bool { *self == ChannelStatus::Connected }
    pub fn is_terminal (&self)->bool { matches!( self, ChannelStatus::Exhausted | ChannelStatus::Closed) }
}

impl fmt::Display for ChannelStatus {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        let s = match self {
            ChannelStatus::Connecting => "connecting",
            ChannelStatus::Connected => "connected",
            ChannelStatus::Disconnected => "disconnected",
            ChannelStatus::Exhausted => "exhausted",
            ChannelStatus::Closed => "closed",
        };
        write!(f, "{s}")
    }
}

/// a cloneable handle to queue outbound events without access to the rest of the channel
#[derive(Clone)]
pub struct CommandSender {
    namespace: String,
    cmd_tx: AsyncSender<String>,
}

impl CommandSender {
    /// queue `event` for sending. This never blocks - if the event can't be queued it is logged and dropped.
    /// Delivery is at most once, there is no acknowledgement
    pub fn emit (&self, event: &str, payload: &Value)->bool {
        let frame = match event_frame( &self.namespace, event, payload) {
            Ok(frame) => frame,
            Err(e) => { warn!("failed to encode '{event}': {e}"); return false }
        };

        match self.cmd_tx.try_send( frame) {
            Ok(true) => { debug!("queued '{event}' {payload}"); true }
            Ok(false) => { warn!("command queue full, dropped '{event}'"); false }
            Err(e) => { warn!("command queue closed, dropped '{event}': {e}"); false }
        }
    }

    pub fn namespace (&self)->&str { &self.namespace }
}

pub struct EventChannel {
    registry: SharedRegistry,
    sender: CommandSender,
    status_rx: watch::Receiver<ChannelStatus>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl EventChannel {
    /// create the channel and start connecting. This has to be called from within a tokio runtime
    pub fn open (config: ChannelConfig)->Result<EventChannel> {
        EventChannel::open_with_handlers( config, HandlerRegistry::new())
    }

    /// open with handlers that have to be in place before the first event can arrive
    pub fn open_with_handlers (config: ChannelConfig, handlers: HandlerRegistry)->Result<EventChannel> {
        let url = config.websocket_url()?;
        let namespace = normalize_namespace( &config.namespace);
        let registry: SharedRegistry = Arc::new( Mutex::new( handlers));
        let (cmd_tx, cmd_rx) = kanal::bounded_async::<String>( config.command_queue_len.max(1));
        let (status_tx, status_rx) = watch::channel( ChannelStatus::Connecting);
        let cancel = CancellationToken::new();

        let connection = Connection {
            url: url.to_string(),
            namespace: namespace.clone(),
            config,
            registry: registry.clone(),
            status_tx,
            cmd_rx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn( connection.run());

        Ok( EventChannel { registry, sender: CommandSender { namespace, cmd_tx }, status_rx, cancel, task: Some(task) } )
    }

    /// register `handler` for `event`, replacing a previous handler of the same `subscriber`
    pub fn subscribe<F> (&self, event: &str, subscriber: &str, handler: F) where F: Fn(&Value) + Send + Sync + 'static {
        if lock_registry( &self.registry).subscribe( event, subscriber, Arc::new(handler)) {
            debug!("replaced '{event}' handler of {subscriber}");
        }
    }

    /// like [`subscribe`](Self::subscribe) but the handler is removed once the returned guard is dropped
    pub fn subscribe_scoped<F> (&self, event: &str, subscriber: &str, handler: F)->Subscription where F: Fn(&Value) + Send + Sync + 'static {
        self.subscribe( event, subscriber, handler);
        Subscription { registry: Arc::downgrade( &self.registry), event: event.to_string(), subscriber: subscriber.to_string() }
    }

    pub fn unsubscribe (&self, event: &str, subscriber: &str)->bool {
        lock_registry( &self.registry).unsubscribe( event, subscriber)
    }

    pub fn unsubscribe_all (&self, subscriber: &str)->usize {
        lock_registry( &self.registry).unsubscribe_all( subscriber)
    }

    pub fn n_handlers (&self, event: &str)->usize {
        lock_registry( &self.registry).n_handlers( event)
    }

    pub fn emit (&self, event: &str, payload: &Value)->bool {
        self.sender.emit( event, payload)
    }

    pub fn command_sender (&self)->CommandSender {
        self.sender.clone()
    }

    pub fn status (&self)->ChannelStatus {
        *self.status_rx.borrow()
    }

    pub fn status_receiver (&self)->watch::Receiver<ChannelStatus> {
        self.status_rx.clone()
    }

    /// wait until the channel reaches `status` (or a terminal status), giving up after `max_wait`
    pub async fn wait_for_status (&self, status: ChannelStatus, max_wait: Duration)->Result<ChannelStatus> {
        let mut rx = self.status_rx.clone();
        let res = timeout( max_wait, rx.wait_for( |s| *s == status || s.is_terminal())).await?;
        res.map( |s| *s).map_err( |_| op_failed("channel task terminated"))
    }

    /// close the websocket and wait for the connection task to terminate
    pub async fn shutdown (&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("channel task failed: {e}");
            }
        }
    }
}

impl Drop for EventChannel {
    fn drop (&mut self) {
        self.cancel.cancel();
    }
}

/* #endregion channel */

/* #region connection task ****************************************************************************************/

enum SessionEnd {
    Cancelled,
    Dropped { joined: bool }
}

enum Flow {
    Continue,
    Drop(String)
}

struct Session {
    joined: bool,
    heartbeat: Duration,
    discard_queued: bool, // commands queued before a reconnect are stale
}

struct Connection {
    url: String,
    namespace: String,
    config: ChannelConfig,
    registry: SharedRegistry,
    status_tx: watch::Sender<ChannelStatus>,
    cmd_rx: AsyncReceiver<String>,
    cancel: CancellationToken,
}

impl Connection {
    async fn run (self) {
        let mut attempt: u32 = 0;
        let mut is_reconnect = false;

        loop {
            self.set_status( ChannelStatus::Connecting);
            match self.run_session( is_reconnect).await {
                SessionEnd::Cancelled => break,
                SessionEnd::Dropped { joined } => if joined { attempt = 0 }
            }
            is_reconnect = true;
            attempt += 1;

            let Some(delay) = self.config.reconnect.delay_for( attempt) else {
                warn!("giving up on {} after {} failed reconnect attempts", self.url, attempt-1);
                self.set_status( ChannelStatus::Exhausted);
                return
            };

            self.set_status( ChannelStatus::Disconnected);
            debug!("reconnect attempt {attempt} in {delay:?}");
            select! {
                _ = self.cancel.cancelled() => break,
                _ = sleep( delay) => {}
            }
        }

        self.set_status( ChannelStatus::Closed);
        info!("channel to {} closed", self.url);
    }

    async fn run_session (&self, is_reconnect: bool)->SessionEnd {
        let mut ws = select! {
            _ = self.cancel.cancelled() => return SessionEnd::Cancelled,
            res = timeout( self.config.connect_timeout, ws::connect( &self.url, &self.config.headers)) => match res {
                Ok(Ok((ws,_))) => ws,
                Ok(Err(e)) => { warn!("{e}"); return SessionEnd::Dropped { joined: false } }
                Err(_) => { warn!("connecting to {} timed out", self.url); return SessionEnd::Dropped { joined: false } }
            }
        };
        debug!("websocket connected to {}", self.url);

        // until we get the engine.io handshake the connect timeout doubles as heartbeat
        let mut session = Session { joined: false, heartbeat: self.config.connect_timeout, discard_queued: is_reconnect };
        let mut deadline = Instant::now() + session.heartbeat;

        let end = loop {
            select! { // all awaited futures are cancellation safe
                _ = self.cancel.cancelled() => {
                    if session.joined {
                        let _ = ws.send( Message::text( disconnect_frame( &self.namespace))).await;
                    }
                    let _ = ws.close( None).await;
                    break SessionEnd::Cancelled
                }

                _ = sleep_until( deadline) => {
                    warn!("no heartbeat from {} within {:?}, reconnecting..", self.url, session.heartbeat);
                    break SessionEnd::Dropped { joined: session.joined }
                }

                maybe_msg = ws.next() => { // in: frames from server
                    match maybe_msg {
                        Some(Ok(msg)) => {
                            match self.process_frame( msg, &mut ws, &mut session).await {
                                Ok(Flow::Continue) => {}
                                Ok(Flow::Drop(reason)) => {
                                    info!("{reason}, reconnecting..");
                                    break SessionEnd::Dropped { joined: session.joined }
                                }
                                Err(JakartDashError::WsError(e)) => {
                                    warn!("failed to write to websocket: {e}");
                                    break SessionEnd::Dropped { joined: session.joined }
                                }
                                Err(e) => warn!("malformed frame ignored: {e}")
                            }
                            deadline = Instant::now() + session.heartbeat;
                        }
                        Some(Err(e)) => {
                            warn!("reconnecting after failed websocket read: {e}");
                            break SessionEnd::Dropped { joined: session.joined }
                        }
                        None => {
                            info!("server closed websocket, reconnecting..");
                            break SessionEnd::Dropped { joined: session.joined }
                        }
                    }
                }

                maybe_cmd = self.cmd_rx.recv(), if session.joined => { // out: queued events
                    match maybe_cmd {
                        Ok(frame) => {
                            if let Err(e) = ws.send( Message::text( frame)).await {
                                warn!("failed to write to websocket: {e}");
                                break SessionEnd::Dropped { joined: session.joined }
                            }
                        }
                        Err(_) => break SessionEnd::Cancelled // all senders gone
                    }
                }
            }
        };

        if session.joined {
            dispatch( &self.registry, DISCONNECT_EVENT, &Value::Null);
        }
        end
    }

    async fn process_frame (&self, msg: Message, ws: &mut WsStream, session: &mut Session)->Result<Flow> {
        match msg {
            Message::Text(text) => {
                match parse_engine_packet( text.as_str())? {
                    EnginePacket::Open(data) => {
                        let handshake = Handshake::parse( data)?;
                        debug!("engine.io session {} (ping interval {}ms, timeout {}ms)", handshake.sid, handshake.ping_interval, handshake.ping_timeout);
                        session.heartbeat = handshake.heartbeat_timeout();
                        self.send_frame( ws, connect_frame( &self.namespace)).await?;
                    }
                    EnginePacket::Ping(_) => self.send_frame( ws, PONG_FRAME.to_string()).await?,
                    EnginePacket::Close => return Ok( Flow::Drop("server closed engine.io session".to_string())),
                    EnginePacket::Message(packet) => return self.process_packet( parse_socket_packet( packet)?, session),
                    EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => {}
                }
            }
            Message::Close(_) => return Ok( Flow::Drop("server closed websocket".to_string())),
            Message::Binary(_) => return Err( protocol_error("binary frames are not supported")),
            _ => {} // websocket ping/pong is handled by tungstenite
        }
        Ok( Flow::Continue)
    }

    fn process_packet (&self, packet: SocketPacket, session: &mut Session)->Result<Flow> {
        if packet.namespace() != self.namespace {
            trace!("ignoring packet for namespace {}", packet.namespace());
            return Ok( Flow::Continue)
        }

        match packet {
            SocketPacket::Connect{..} => {
                if !session.joined {
                    session.joined = true;
                    if session.discard_queued {
                        let n = self.discard_queued_commands();
                        if n > 0 { info!("discarded {n} commands queued before reconnect") }
                    }
                    info!("joined {} on {}", self.namespace, self.url);
                    self.set_status( ChannelStatus::Connected);
                    dispatch( &self.registry, CONNECT_EVENT, &Value::Null);
                }
            }
            SocketPacket::Disconnect{..} => {
                return Ok( Flow::Drop( format!("server disconnected {}", self.namespace)))
            }
            SocketPacket::ConnectError{data,..} => {
                let reason = data.map( |d| d.to_string()).unwrap_or_default();
                return Ok( Flow::Drop( format!("server refused {}: {reason}", self.namespace)))
            }
            SocketPacket::Event{name,args,..} => {
                if name == CONNECT_EVENT || name == DISCONNECT_EVENT {
                    return Err( protocol_error( format!("server sent reserved event '{name}'")))
                }
                let payload = args.into_iter().next().unwrap_or( Value::Null);
                dispatch( &self.registry, &name, &payload);
            }
            SocketPacket::Ack{ack_id,..} => trace!("ignoring ack {ack_id}") // we never request acks
        }
        Ok( Flow::Continue)
    }

    async fn send_frame (&self, ws: &mut WsStream, frame: String)->Result<()> {
        ws.send( Message::text( frame)).await?;
        Ok(())
    }

    fn discard_queued_commands (&self)->usize {
        let mut n = 0;
        while let Ok(Some(_)) = self.cmd_rx.try_recv() { n += 1 }
        n
    }

    fn set_status (&self, status: ChannelStatus) {
        let prev = self.status_tx.send_replace( status);
        if prev != status { debug!("channel status {prev} -> {status}") }
    }
}

// covers a connection task that ends without reaching a terminal status
impl Drop for Connection {
    fn drop (&mut self) {
        self.status_tx.send_if_modified( |status| {
            if status.is_terminal() {
                false
            } else {
                error!("connection task to {} terminated abnormally", self.url);
                *status = ChannelStatus::Closed;
                true
            }
        });
    }
}

/* #endregion connection task */
