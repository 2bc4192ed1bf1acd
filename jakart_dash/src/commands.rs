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
use tracing::{info,warn};
use crate::{
    channel::CommandSender,
    errors::{Result, intent_rejected},
    events::OutboundCommand,
    state::DashboardState,
    store::StateStore,
};

/// turns operator intents into outbound commands.
///
/// The raw `emit_..` functions just queue the command. The intent functions check if the intent is
/// valid for the current dashboard state, update the store and then send the command. Commands are
/// fire-and-forget: there is no acknowledgement, and a command that can't be queued is logged and dropped
#[derive(Clone)]
pub struct CommandEmitter {
    sender: CommandSender,
    store: Arc<StateStore>,
}

impl CommandEmitter {
    pub fn new (sender: CommandSender, store: Arc<StateStore>)->Self {
        CommandEmitter { sender, store }
    }

    pub fn emit (&self, cmd: &OutboundCommand)->bool {
        self.sender.emit( cmd.name(), &cmd.payload())
    }

    pub fn emit_destination (&self, id: &str)->bool {
        self.emit( &OutboundCommand::Destination( id.to_string()))
    }

    pub fn emit_pullover (&self, pullover: bool)->bool {
        self.emit( &OutboundCommand::Pullover( pullover))
    }

    /// drive to a known destination. This is only possible if we don't have a destination yet or if
    /// the vehicle is pulled over, in which case the new destination also ends the pullover
    pub fn choose_destination (&self, id: &str)->Result<()> {
        self.store.try_transition( |state| {
            check_destination_choice( state, id)?;
            state.vehicle.current_destination_id = Some( id.to_string());
            state.vehicle.pullover_requested = false;
            Ok(())
        })?;

        info!("operator chose destination {id}");
        self.emit_destination( id);
        Ok(())
    }

    /// ask the vehicle to pull over while it is driving to a destination
    pub fn request_pullover (&self)->Result<()> {
        self.store.try_transition( |state| {
            let vehicle = &mut state.vehicle;
            if vehicle.current_destination_id.is_none() {
                return Err( intent_rejected("no current destination to pull over from"))
            }
            if vehicle.pullover_requested {
                return Err( intent_rejected("pullover already requested"))
            }
            vehicle.pullover_requested = true;
            Ok(())
        })?;

        info!("operator requested pullover");
        self.emit_pullover( true);
        Ok(())
    }

    /// continue to the current destination. Sending this more than once is harmless
    pub fn resume (&self)->Result<()> {
        self.store.set_pullover( false);
        info!("operator resumed");
        self.emit_pullover( false);
        Ok(())
    }

    pub fn store (&self)->&Arc<StateStore> { &self.store }
}

fn check_destination_choice (state: &DashboardState, id: &str)->Result<()> {
    if !state.destinations.contains_key( id) {
        return Err( intent_rejected( format!("unknown destination '{id}'")))
    }

    let vehicle = &state.vehicle;
    if let Some(current) = &vehicle.current_destination_id {
        if !vehicle.pullover_requested {
            return Err( intent_rejected( format!("already driving to '{current}', pull over first")))
        }
    }
    Ok(())
}
