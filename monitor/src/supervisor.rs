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

//! Poll loop and reconnect supervisor
//!
//! The [`Supervisor`] is the only owner of the console connection. It runs serially on one task:
//!
//! ```text
//! Disconnected -> Connecting -> Connected --(tick: list, tps)--> Connected
//!      ^              |              |
//!      |           failure        failure
//!      +---backoff----+--------------+
//! ```
//!
//! A failed command or an unparseable reply drops the connection and skips the rest of the tick.
//! There is no retry besides the whole-connection reconnect, which waits a fixed backoff.

use crate::config::PollCommands;
use crate::event::MonitorEvent;
use crate::metrics::MonitorMetrics;
use crate::parser::ResponseParser;
use crate::types::SupervisorPhase;
use crate::{MonitorConfig, MonitorError};
use async_trait::async_trait;
use metrics::gauge;
use rconwatch_client::{ClientConfig, RconConnection};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tokio_util::sync::CancellationToken;

/// An authenticated console session
#[async_trait]
pub trait Console: Send + 'static {
    /// Run one command and return its reply text
    async fn execute(&mut self, command: &str) -> rconwatch_client::Result<String>;

    /// Close the session
    async fn close(&mut self);
}

/// Opens authenticated console sessions
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Session type produced by [`Connector::connect`]
    type Console: Console;

    /// Connect and log in
    async fn connect(&self) -> rconwatch_client::Result<Self::Console>;

    /// Target address, for logging
    fn address(&self) -> String;
}

#[async_trait]
impl Console for RconConnection<TcpStream> {
    async fn execute(&mut self, command: &str) -> rconwatch_client::Result<String> {
        RconConnection::execute(self, command).await
    }

    async fn close(&mut self) {
        RconConnection::close(self).await
    }
}

/// [`Connector`] for a TCP RCON endpoint
#[derive(Debug, Clone)]
pub struct RconConnector {
    config: ClientConfig,
}

impl RconConnector {
    /// Create a connector for the given endpoint
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for RconConnector {
    type Console = RconConnection<TcpStream>;

    async fn connect(&self) -> rconwatch_client::Result<Self::Console> {
        RconConnection::connect(&self.config).await
    }

    fn address(&self) -> String {
        self.config.address()
    }
}

/// How a connected session ended
enum SessionEnd {
    Failed,
    Shutdown,
}

/// Connect, poll and reconnect loop
pub struct Supervisor<C: Connector> {
    connector: C,
    parser: Arc<dyn ResponseParser>,
    commands: PollCommands,
    poll_interval: Duration,
    reconnect_backoff: Duration,
    events: mpsc::Sender<MonitorEvent>,
    phase: Arc<AtomicU8>,
    metrics: Arc<MonitorMetrics>,
    shutdown: CancellationToken,
}

impl<C: Connector> Supervisor<C> {
    /// Create a supervisor publishing to `events`
    pub fn new(
        config: &MonitorConfig,
        connector: C,
        parser: Arc<dyn ResponseParser>,
        events: mpsc::Sender<MonitorEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            connector,
            parser,
            commands: config.commands.clone(),
            poll_interval: config.poll_interval,
            reconnect_backoff: config.reconnect_backoff,
            events,
            phase: Arc::new(AtomicU8::new(SupervisorPhase::Disconnected.as_u8())),
            metrics: Arc::new(MonitorMetrics::new()),
            shutdown,
        }
    }

    /// Share an existing metrics instance
    pub fn with_metrics(mut self, metrics: Arc<MonitorMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Share an existing phase cell
    pub fn with_phase(mut self, phase: Arc<AtomicU8>) -> Self {
        self.phase = phase;
        self
    }

    /// Current phase
    pub fn phase(&self) -> SupervisorPhase {
        SupervisorPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    fn set_phase(&self, phase: SupervisorPhase) {
        self.phase.store(phase.as_u8(), Ordering::Release);
        let connected = if phase == SupervisorPhase::Connected { 1.0 } else { 0.0 };
        gauge!("rconwatch.connected").set(connected);
    }

    /// Run until the shutdown token fires or the event receiver goes away
    pub async fn run(self) {
        let address = self.connector.address();
        tracing::info!(address = %address, "Supervisor started");

        loop {
            self.set_phase(SupervisorPhase::Connecting);
            self.metrics.connect_attempt();
            tracing::debug!(address = %address, "Connecting");

            let connected = select! {
                _ = self.shutdown.cancelled() => break,
                result = self.connector.connect() => result,
            };

            match connected {
                Ok(console) => {
                    tracing::info!(address = %address, "Connected and authenticated");
                    self.set_phase(SupervisorPhase::Connected);
                    if !self.emit(MonitorEvent::ConnectionSuccess).await {
                        break;
                    }
                    if let SessionEnd::Shutdown = self.session(console).await {
                        break;
                    }
                }
                Err(e) => {
                    self.metrics.connect_failure();
                    tracing::warn!(address = %address, stage = "connect", error = %e, "Connection failed");
                    if !self.emit(MonitorEvent::ConnectionError(e.to_string())).await {
                        break;
                    }
                }
            }

            self.set_phase(SupervisorPhase::Disconnected);
            tracing::info!(
                address = %address,
                backoff = ?self.reconnect_backoff,
                "Reconnecting after backoff"
            );
            select! {
                _ = self.shutdown.cancelled() => break,
                _ = sleep(self.reconnect_backoff) => {}
            }
        }

        self.set_phase(SupervisorPhase::Disconnected);
        tracing::info!(address = %address, "Supervisor stopped");
    }

    /// Poll a live session until it fails or shutdown is requested
    async fn session(&self, mut console: C::Console) -> SessionEnd {
        let start = Instant::now() + self.poll_interval;
        let mut ticker = interval_at(start, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let end = loop {
            select! {
                _ = self.shutdown.cancelled() => break SessionEnd::Shutdown,
                _ = ticker.tick() => {}
            }

            let polled = select! {
                _ = self.shutdown.cancelled() => None,
                result = self.poll_once(&mut console) => Some(result),
            };

            match polled {
                None => break SessionEnd::Shutdown,
                Some(Ok(true)) => self.metrics.poll_completed(),
                Some(Ok(false)) => break SessionEnd::Shutdown,
                Some(Err(e)) => {
                    if e.is_parse_error() {
                        self.metrics.parse_error();
                    } else {
                        self.metrics.execution_error();
                    }
                    tracing::warn!(stage = "poll", error = %e, "Poll failed, dropping connection");
                    if !self.emit(MonitorEvent::ExecutionError(e.to_string())).await {
                        break SessionEnd::Shutdown;
                    }
                    break SessionEnd::Failed;
                }
            }
        };

        console.close().await;
        end
    }

    /// One tick: player list, then tps
    ///
    /// `Ok(false)` means the event receiver is gone.
    async fn poll_once(&self, console: &mut C::Console) -> crate::Result<bool> {
        let command = self.commands.players.as_str();
        let reply = self.execute(console, command).await?;
        let players = self
            .parser
            .parse_player_list(&reply)
            .map_err(|source| MonitorError::Parse {
                command: command.to_string(),
                source,
            })?;
        tracing::debug!(online = players.online, max = players.max, "Players polled");
        if !self.emit(MonitorEvent::Players(players)).await {
            return Ok(false);
        }

        let command = self.commands.tps.as_str();
        let reply = self.execute(console, command).await?;
        let tps = self
            .parser
            .parse_tps(&reply)
            .map_err(|source| MonitorError::Parse {
                command: command.to_string(),
                source,
            })?;
        tracing::debug!(l1m = tps.l1m, l5m = tps.l5m, l15m = tps.l15m, "TPS polled");
        Ok(self.emit(MonitorEvent::Tps(tps)).await)
    }

    async fn execute(&self, console: &mut C::Console, command: &str) -> crate::Result<String> {
        console
            .execute(command)
            .await
            .map_err(|source| MonitorError::Command {
                command: command.to_string(),
                source,
            })
    }

    async fn emit(&self, event: MonitorEvent) -> bool {
        if self.events.send(event).await.is_err() {
            tracing::debug!("Event receiver closed");
            return false;
        }
        true
    }
}
