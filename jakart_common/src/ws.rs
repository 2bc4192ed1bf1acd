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

use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, WebSocketStream, MaybeTlsStream, 
    tungstenite::{
        http::header::{HeaderName,HeaderValue}, 
        handshake::client::Response, 
        client::IntoClientRequest
    }
};
use tracing::warn;
use crate::{JakartCommonError, Result, op_failed};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// open a client websocket with optional extra request headers (given as "name: value" strings)
pub async fn connect (ws_uri: &str, headers: &[String])->Result<(WsStream, Response)> {
    let mut request = ws_uri.into_client_request().map_err(|e| op_failed( format!("invalid websocket URL: {e}")))?;

    let hdrs = request.headers_mut();
    for h in headers {
        if let Some(idx) = h.find(':') {
            let name = HeaderName::from_bytes( h[0..idx].trim().as_bytes()).map_err(|e| op_failed( format!("invalid header name: {e}")))?;
            let value = HeaderValue::from_str( h[idx+1..].trim()).map_err(|e| op_failed( format!("invalid header value: {e}")))?;
            hdrs.append( name, value);
        } else {
            warn!("ignoring malformed request header '{h}'");
        }
    }

    connect_async(request).await.map_err(|e| JakartCommonError::WsError(format!("websocket connect failed: {e}")))
}
