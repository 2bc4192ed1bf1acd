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

use std::fmt;
use serde::Serialize;
use crate::state::{DashboardState, StateTag};

pub const OFFLINE_MESSAGE: &str = "Cart is offline...";
pub const ARRIVED_MESSAGE: &str = "You have arrived at your destination. Exit the cart safely or select a new destination.";
pub const UNSAFE_POSE_MESSAGE: &str = "Please adjust yourself and be seated properly. Unsafe pose detected.";

/// what we ask the operator to do next
#[derive(Debug,Clone,PartialEq,Eq,Serialize)]
pub enum OperatorPrompt {
    DrivingTo(String),
    ChooseDestination,
    ChangeDestination, // while pulled over
}

impl fmt::Display for OperatorPrompt {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        match self {
            OperatorPrompt::DrivingTo(id) => write!(f, "Driving to {id}"),
            OperatorPrompt::ChooseDestination => write!(f, "Choose a destination"),
            OperatorPrompt::ChangeDestination => write!(f, "Change Destination"),
        }
    }
}

/// the indicators and prompts shown on top of the map, derived from a single snapshot
#[derive(Debug,Clone,PartialEq,Eq,Serialize)]
pub struct DashboardStatus {
    pub offline: bool,
    pub arrived: bool,
    pub unsafe_pose: bool,
    pub show_path: bool,
    pub prompt: OperatorPrompt,
}

impl DashboardStatus {
    pub fn from_state (state: &DashboardState)->Self {
        let vehicle = &state.vehicle;

        let prompt = if vehicle.pullover_requested {
            OperatorPrompt::ChangeDestination
        } else if let Some(id) = &vehicle.current_destination_id {
            OperatorPrompt::DrivingTo( id.clone())
        } else {
            OperatorPrompt::ChooseDestination
        };

        DashboardStatus {
            offline: !vehicle.active,
            arrived: vehicle.state_tag == StateTag::TransitEnd,
            unsafe_pose: state.pose.passenger_present && !state.pose.safe,
            show_path: vehicle.state_tag == StateTag::TransitStart,
            prompt
        }
    }

    pub fn can_choose_destination (&self)->bool {
        !matches!( self.prompt, OperatorPrompt::DrivingTo(_))
    }

    pub fn can_request_pullover (&self)->bool {
        matches!( self.prompt, OperatorPrompt::DrivingTo(_))
    }

    pub fn can_resume (&self)->bool {
        self.prompt == OperatorPrompt::ChangeDestination
    }

    /// the full screen message that is on top, if any. Pose warnings take precedence over arrival,
    /// which takes precedence over the offline notice
    pub fn overlay_message (&self)->Option<&'static str> {
        if self.unsafe_pose {
            Some( UNSAFE_POSE_MESSAGE)
        } else if self.arrived {
            Some( ARRIVED_MESSAGE)
        } else if self.offline {
            Some( OFFLINE_MESSAGE)
        } else {
            None
        }
    }
}

impl From<&DashboardState> for DashboardStatus {
    fn from (state: &DashboardState)->Self { DashboardStatus::from_state( state) }
}

impl fmt::Display for DashboardStatus {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        write!(f, "{}", self.prompt)?;
        if self.offline { write!(f, " [offline]")? }
        if self.arrived { write!(f, " [arrived]")? }
        if self.unsafe_pose { write!(f, " [unsafe pose]")? }
        Ok(())
    }
}
