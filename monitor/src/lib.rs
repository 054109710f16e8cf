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

//! # RCON Uptime Monitor
//!
//! Keeps a console session to a game server open, polls the player list and tick rate on a
//! fixed cadence and turns the replies into a [`MonitorSnapshot`] with an [`AlertLevel`].
//! Alert transitions are reported through a [`Notifier`] and housekeeping records go to a
//! [`SampleSink`].
//!
//! ## Architecture
//!
//! - [`Supervisor`] - connect, poll and reconnect loop; sole owner of the connection
//! - [`ResponseParser`] - turns console text into [`PlayerList`] and [`TpsInfo`]
//! - [`StateMachine`] - latest sample plus the three-level alert policy
//! - [`Monitor`] / [`MonitorHandle`] - spawns the tasks and exposes read-only snapshots
//!
//! ## Quick Start
//!
//! ```no_run
//! use rconwatch_monitor::{Monitor, MonitorConfig};
//! use rconwatch_client::ClientConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MonitorConfig::new(
//!         ClientConfig::new("localhost", 25575).with_password("secret"),
//!     );
//!     let handle = Monitor::rcon(config).start().await?;
//!
//!     let snapshot = handle.snapshot();
//!     println!("online={} alert={}", snapshot.sample.online, snapshot.alert);
//!
//!     handle.shutdown().await;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod event;
mod handler;
mod metrics;
mod monitor;
mod parser;
mod state;
mod supervisor;
mod types;

pub use config::{AlertConfig, MonitorConfig, PollCommands};
pub use error::{MonitorError, Result};
pub use event::MonitorEvent;
pub use handler::{CallbackNotifier, Notifier, SampleSink, TracingNotifier, TracingSink};
pub use metrics::{MetricsSnapshot, MonitorMetrics};
pub use monitor::{Monitor, MonitorHandle};
pub use parser::{
    MinecraftParser, ParseError, ParseResult, PlayerList, ResponseParser, TpsInfo,
    parse_player_list, parse_tps,
};
pub use state::StateMachine;
pub use supervisor::{Console, Connector, RconConnector, Supervisor};
pub use types::{
    AlertLevel, MonitorSnapshot, Notification, NotificationCategory, Sample, SampleRecord,
    SupervisorPhase, TIMESTAMP_FORMAT,
};
