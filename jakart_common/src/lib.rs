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

//! common types and utilities shared by the JAKART crates: geographic and pixel points, RON config
//! lookup, websocket connection helpers and error mapping macros

pub mod macros;
pub mod collections;
pub mod geo;
pub mod config;
pub mod duration;
pub mod ws;

define_error!{ pub JakartCommonError = 
    IOError(#[from] std::io::Error) : "IO error: {0}",
    RonError(#[from] ron::error::SpannedError) : "config RON error: {0}",
    NotFoundError(String) : "not found {0}",
    WsError(String) : "websocket error: {0}",
    OpFailed(String) : "operation failed: {0}"
}

pub type Result<T> = std::result::Result<T, JakartCommonError>;

pub fn op_failed (msg: impl ToString)->JakartCommonError {
    JakartCommonError::OpFailed(msg.to_string())
}
