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

//! # RCON Console Client
//!
//! Async client for the remote console protocol spoken by Minecraft and other Source-style game
//! servers. A [`RconConnection`] owns one authenticated socket and offers a request/response
//! primitive, [`RconConnection::execute`], on top of [`rconwatch_codec`].
//!
//! ## Features
//!
//! - **Explicit timeouts** - connect, read and write timeouts are always configured
//! - **Auth quirk handling** - a rejected login is detected through the `-1` response id
//! - **Fail-stop** - a connection that saw an I/O or protocol error is never reused
//!
//! ## Quick Start
//!
//! ```no_run
//! use rconwatch_client::{ClientConfig, RconConnection};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("localhost", 25575).with_password("secret");
//!
//!     let mut conn = RconConnection::connect(&config).await?;
//!     println!("{}", conn.execute("list").await?);
//!     conn.close().await;
//!
//!     Ok(())
//! }
//! ```

mod config;
mod connection;
mod error;

pub use config::ClientConfig;
pub use connection::RconConnection;
pub use error::{ClientError, Result};

pub use rconwatch_codec::{CodecError, Frame, PacketType, RconCodec};
