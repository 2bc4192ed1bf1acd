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

use std::sync::Arc;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug,info};
use crate::{
    DashConfig,
    channel::{ChannelStatus, EventChannel, HandlerRegistry},
    commands::CommandEmitter,
    errors::Result,
    events::InboundEvent,
    projection::{GeoProjector, Viewport},
    state::DashboardState,
    store::StateStore,
    view::MapView,
};

/// the subscriber id under which the store receives channel events
pub const STORE_SUBSCRIBER: &str = "state_store";

/// the assembled dashboard core: one store, one channel and the command emitter that connects operator
/// intents to both. There is exactly one of these per application session - it is created at startup,
/// handed to the rendering layer and explicitly shut down at the end
pub struct Dashboard {
    config: DashConfig,
    projector: GeoProjector,
    store: Arc<StateStore>,
    channel: EventChannel,
    commands: CommandEmitter,
}

impl Dashboard {
    /// create the store, wire all inbound events to it and start connecting.
    /// This has to be called from within a tokio runtime
    pub fn start (config: DashConfig)->Result<Dashboard> {
        let projector = GeoProjector::new( config.projection);
        let store = Arc::new( StateStore::new( &config.store));

        // register before the connection task starts so that we can't miss the first snapshot
        let mut registry = HandlerRegistry::new();
        for event in InboundEvent::STORE_EVENTS {
            let store = store.clone();
            registry.subscribe( event.name(), STORE_SUBSCRIBER, Arc::new( move |payload: &Value| store.handle_event( event, payload)));
        }

        let channel = EventChannel::open_with_handlers( config.channel.clone(), registry)?;
        let commands = CommandEmitter::new( channel.command_sender(), store.clone());
        info!("dashboard started for {}", config.channel.endpoint);

        Ok( Dashboard { config, projector, store, channel, commands } )
    }

    pub fn config (&self)->&DashConfig { &self.config }

    pub fn projector (&self)->&GeoProjector { &self.projector }

    pub fn store (&self)->&Arc<StateStore> { &self.store }

    pub fn snapshot (&self)->Arc<DashboardState> { self.store.snapshot() }

    pub fn subscribe (&self)->watch::Receiver<Arc<DashboardState>> { self.store.subscribe() }

    pub fn channel (&self)->&EventChannel { &self.channel }

    pub fn channel_status (&self)->ChannelStatus { self.channel.status() }

    pub fn commands (&self)->&CommandEmitter { &self.commands }

    pub fn map_view (&self, viewport: Viewport)->MapView {
        MapView::new( self.projector, viewport)
    }

    /// close the channel and detach the store from it. The last snapshot stays available (as inactive)
    pub async fn shutdown (&mut self) {
        self.channel.shutdown().await;
        let n = self.channel.unsubscribe_all( STORE_SUBSCRIBER);
        debug!("removed {n} store subscriptions");
        info!("dashboard shut down");
    }
}
