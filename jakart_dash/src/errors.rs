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

use thiserror::Error;
use jakart_common::map_to_opaque_error;

pub type Result<T> = std::result::Result<T, JakartDashError>;

/// jakart_dash specific error type. None of these are fatal for the dashboard - the connection task
/// logs and recovers, and operator intents that can't be executed are reported back to the caller
#[derive(Error,Debug,Clone)]
pub enum JakartDashError {
    #[error("config error {0}")]
    ConfigError(String),

    #[error("{0}")]
    CommonError(String), // config lookup and connect helpers from jakart_common

    #[error("websocket error {0}")]
    WsError(String),

    #[error("protocol error {0}")]
    ProtocolError(String), // unexpected or malformed socket.io/engine.io packets

    #[error("connection closed {0}")]
    ConnectionClosed(String),

    #[error("JSON error {0}")]
    JsonError(String),

    #[error("invalid endpoint {0}")]
    UrlError(String),

    #[error("command queue error {0}")]
    CommandQueueError(String),

    #[error("intent rejected: {0}")]
    IntentRejected(String),

    #[error("timeout error {0}")]
    TimeoutError(String),

    /// a generic error
    #[error("operation failed {0}")]
    OpFailed(String)
}

map_to_opaque_error!{
    serde_json::Error => JakartDashError::JsonError,
    url::ParseError => JakartDashError::UrlError,
    tokio_tungstenite::tungstenite::Error => JakartDashError::WsError,
    tokio::time::error::Elapsed => JakartDashError::TimeoutError,
    jakart_common::JakartCommonError => JakartDashError::CommonError
}

pub fn op_failed (msg: impl ToString)->JakartDashError {
    JakartDashError::OpFailed(msg.to_string())
}

pub fn protocol_error (msg: impl ToString)->JakartDashError {
    JakartDashError::ProtocolError(msg.to_string())
}

pub fn intent_rejected (msg: impl ToString)->JakartDashError {
    JakartDashError::IntentRejected(msg.to_string())
}
