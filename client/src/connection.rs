//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Authenticated RCON connection

use crate::{ClientConfig, ClientError, Result};
use futures::{SinkExt, StreamExt};
use rconwatch_codec::{Frame, PacketType, RconCodec};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

/// One authenticated console session.
///
/// A connection owns its socket and its request id counter. It is single-use: after any
/// transport or protocol failure it refuses further commands with
/// [`ClientError::NotConnected`], and a new connection must be opened instead.
///
/// Each [`execute`](RconConnection::execute) sends one request and waits for exactly one
/// response frame. A response frame split across TCP reads is reassembled, but output the
/// server spreads over several frames is not joined; only the first frame is returned.
pub struct RconConnection<T = TcpStream> {
    framed: Framed<T, RconCodec>,
    address: String,
    next_id: i32,
    authenticated: bool,
    closed: bool,
    read_timeout: Option<Duration>,
    write_timeout: Duration,
}

impl RconConnection<TcpStream> {
    /// Opens a TCP connection to the configured server and logs in.
    ///
    /// # Errors
    /// - [`ClientError::ConnectTimeout`] / [`ClientError::ConnectionRefused`] / [`ClientError::Io`]
    ///   when the socket cannot be opened.
    /// - [`ClientError::AuthFailed`] when the server rejects the password.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let address = config.address();
        debug!(address = %address, "Connecting to RCON server");

        let stream = match timeout(config.connect_timeout, TcpStream::connect(&address)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(ClientError::ConnectTimeout),
        };
        stream.set_nodelay(true)?;

        Self::handshake(stream, address, config).await
    }
}

impl<T> RconConnection<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an already open transport and performs the login exchange.
    pub async fn handshake(
        stream: T,
        address: impl Into<String>,
        config: &ClientConfig,
    ) -> Result<Self> {
        let mut connection = Self {
            framed: Framed::new(stream, RconCodec::with_max_frame_size(config.max_frame_size)),
            address: address.into(),
            next_id: 0,
            authenticated: false,
            closed: false,
            read_timeout: config.read_timeout,
            write_timeout: config.write_timeout,
        };

        match connection.authenticate(&config.password).await {
            Ok(()) => Ok(connection),
            Err(e) => {
                connection.close().await;
                Err(e)
            }
        }
    }

    /// Address this connection was opened against
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Whether the login exchange succeeded and the connection is still usable
    pub fn is_authenticated(&self) -> bool {
        self.authenticated && !self.closed
    }

    /// Runs `command` on the server and returns its output.
    pub async fn execute(&mut self, command: &str) -> Result<String> {
        if self.closed {
            return Err(ClientError::NotConnected);
        }
        if !self.authenticated {
            return Err(ClientError::NotAuthenticated);
        }

        let result = self.request(command).await;
        if result.is_err() {
            self.poison();
        }
        result
    }

    /// Shuts the transport down. Calling this more than once is a no-op.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.poison();
        if let Err(e) = self.framed.get_mut().shutdown().await {
            debug!(address = %self.address, error = %e, "Error while closing RCON transport");
        }
    }

    async fn request(&mut self, command: &str) -> Result<String> {
        let id = self.next_request_id();
        self.send(Frame::exec(id, command)).await?;
        let frame = self.receive().await?;

        if frame.request_id != id {
            return Err(ClientError::UnexpectedResponse(format!(
                "expected response to request {}, got id {}",
                id, frame.request_id
            )));
        }
        if frame.packet_type != PacketType::RESPONSE_VALUE {
            return Err(ClientError::UnexpectedResponse(format!(
                "expected response value, got type {}",
                frame.packet_type
            )));
        }

        Ok(frame.body_text())
    }

    async fn authenticate(&mut self, password: &str) -> Result<()> {
        let id = self.next_request_id();
        self.send(Frame::auth(id, password)).await?;

        let mut response = self.receive().await?;
        // Source servers send an empty value frame ahead of the auth response.
        if response.packet_type == PacketType::RESPONSE_VALUE && response.body.is_empty() {
            response = self.receive().await?;
        }

        if response.packet_type != PacketType::AUTH_RESPONSE || response.request_id != id {
            warn!(
                address = %self.address,
                request_id = id,
                response_id = response.request_id,
                "RCON authentication rejected"
            );
            return Err(ClientError::AuthFailed {
                address: self.address.clone(),
            });
        }

        self.authenticated = true;
        info!(address = %self.address, "RCON authentication succeeded");
        Ok(())
    }

    async fn send(&mut self, frame: Frame) -> Result<()> {
        match timeout(self.write_timeout, self.framed.send(frame)).await {
            Ok(result) => result.map_err(ClientError::from),
            Err(_) => Err(ClientError::WriteTimeout),
        }
    }

    async fn receive(&mut self) -> Result<Frame> {
        let next = match self.read_timeout {
            Some(limit) => timeout(limit, self.framed.next())
                .await
                .map_err(|_| ClientError::ReadTimeout)?,
            None => self.framed.next().await,
        };

        match next {
            Some(Ok(frame)) => Ok(frame),
            Some(Err(e)) => Err(e.into()),
            None => Err(ClientError::ConnectionClosed),
        }
    }

    fn next_request_id(&mut self) -> i32 {
        self.next_id = if self.next_id == i32::MAX {
            1
        } else {
            self.next_id + 1
        };
        self.next_id
    }

    fn poison(&mut self) {
        self.closed = true;
        self.authenticated = false;
    }
}

impl<T> std::fmt::Debug for RconConnection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RconConnection")
            .field("address", &self.address)
            .field("next_id", &self.next_id)
            .field("authenticated", &self.authenticated)
            .field("closed", &self.closed)
            .finish()
    }
}
