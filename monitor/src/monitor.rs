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

//! Monitor runtime
//!
//! [`Monitor::start`] spawns two tasks. The supervisor task owns the console connection and
//! emits [`MonitorEvent`]s. The runtime task owns the [`StateMachine`], folds events into it as
//! they arrive and runs the housekeeping tick (persistence handoff, then alert evaluation). Every
//! change is published as a whole [`MonitorSnapshot`] through a `watch` channel, so readers never
//! see half an update and never block the writer.

use crate::config::MonitorConfig;
use crate::event::MonitorEvent;
use crate::handler::{Notifier, SampleSink, TracingNotifier, TracingSink};
use crate::metrics::{MetricsSnapshot, MonitorMetrics};
use crate::parser::{MinecraftParser, ResponseParser};
use crate::state::StateMachine;
use crate::supervisor::{Connector, RconConnector, Supervisor};
use crate::types::{MonitorSnapshot, Notification, SupervisorPhase};
use crate::Result;
use chrono::Local;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use tokio::select;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::{CancellationToken, DropGuard};

/// Time allowed for each task to stop on shutdown
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Monitor builder
///
/// # Example
///
/// ```no_run
/// use rconwatch_monitor::{Monitor, MonitorConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = MonitorConfig::load("monitor.yml")?;
///     let handle = Monitor::rcon(config).start().await?;
///
///     tokio::signal::ctrl_c().await?;
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct Monitor<C: Connector> {
    config: MonitorConfig,
    connector: C,
    parser: Arc<dyn ResponseParser>,
    notifier: Arc<dyn Notifier>,
    sink: Arc<dyn SampleSink>,
}

impl Monitor<RconConnector> {
    /// Monitor a TCP RCON endpoint described by `config.client`
    pub fn rcon(config: MonitorConfig) -> Self {
        let connector = RconConnector::new(config.client.clone());
        Monitor::new(config, connector)
    }
}

impl<C: Connector> Monitor<C> {
    /// Create a monitor with the Minecraft parser and tracing collaborators
    pub fn new(config: MonitorConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            parser: Arc::new(MinecraftParser),
            notifier: Arc::new(TracingNotifier),
            sink: Arc::new(TracingSink),
        }
    }

    /// Use a different reply parser
    pub fn with_parser(mut self, parser: Arc<dyn ResponseParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Use a different notifier
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Use a different sample sink
    pub fn with_sink(mut self, sink: Arc<dyn SampleSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Validate the configuration, announce startup and spawn both tasks
    pub async fn start(self) -> Result<MonitorHandle> {
        self.config.validate()?;

        let shutdown = CancellationToken::new();
        let phase = Arc::new(AtomicU8::new(SupervisorPhase::Disconnected.as_u8()));
        let metrics = Arc::new(MonitorMetrics::new());
        let (events_tx, events_rx) = mpsc::channel(self.config.event_buffer);

        let machine = StateMachine::new(self.config.alerts, Local::now());
        let (snapshot_tx, snapshot_rx) = watch::channel(machine.snapshot());

        self.notifier
            .notify(&Notification::success(format!(
                "[OK] Monitoring is online\nTime: {}",
                Local::now().format(crate::types::TIMESTAMP_FORMAT)
            )))
            .await;
        metrics.notification_sent();

        let supervisor = Supervisor::new(
            &self.config,
            self.connector,
            self.parser,
            events_tx,
            shutdown.clone(),
        )
        .with_metrics(metrics.clone())
        .with_phase(phase.clone());

        let runtime = Runtime {
            machine,
            events: events_rx,
            snapshots: snapshot_tx,
            notifier: self.notifier,
            sink: self.sink,
            metrics: metrics.clone(),
            housekeeping_interval: self.config.housekeeping_interval,
        };

        let supervisor = tokio::spawn(supervisor.run());
        let runtime = tokio::spawn(runtime.run());

        Ok(MonitorHandle {
            snapshots: snapshot_rx,
            phase,
            metrics,
            _cancel_on_drop: shutdown.clone().drop_guard(),
            shutdown,
            supervisor,
            runtime,
        })
    }
}

/// State machine owner
struct Runtime {
    machine: StateMachine,
    events: mpsc::Receiver<MonitorEvent>,
    snapshots: watch::Sender<MonitorSnapshot>,
    notifier: Arc<dyn Notifier>,
    sink: Arc<dyn SampleSink>,
    metrics: Arc<MonitorMetrics>,
    housekeeping_interval: Duration,
}

impl Runtime {
    /// Runs until the supervisor drops its event sender
    async fn run(mut self) {
        let start = Instant::now() + self.housekeeping_interval;
        let mut ticker = interval_at(start, self.housekeeping_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            select! {
                event = self.events.recv() => match event {
                    Some(event) => {
                        self.machine.apply(&event, Local::now());
                        self.publish();
                    }
                    None => break,
                },
                _ = ticker.tick() => self.housekeeping().await,
            }
        }
        tracing::debug!("Monitor runtime stopped");
    }

    async fn housekeeping(&mut self) {
        let now = Local::now();
        if let Some(record) = self.machine.record(now) {
            self.sink.append(record).await;
            self.metrics.sample_recorded();
        }
        if let Some(notification) = self.machine.evaluate(now) {
            tracing::info!(category = %notification.category, "Dispatching notification");
            self.notifier.notify(&notification).await;
            self.metrics.notification_sent();
        }
        self.publish();
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.machine.snapshot());
    }
}

/// Read access to a running monitor
///
/// Dropping the handle stops both tasks without waiting for them; use
/// [`shutdown`](MonitorHandle::shutdown) to wait.
pub struct MonitorHandle {
    snapshots: watch::Receiver<MonitorSnapshot>,
    phase: Arc<AtomicU8>,
    metrics: Arc<MonitorMetrics>,
    _cancel_on_drop: DropGuard,
    shutdown: CancellationToken,
    supervisor: JoinHandle<()>,
    runtime: JoinHandle<()>,
}

impl MonitorHandle {
    /// Latest sample and alert level
    pub fn snapshot(&self) -> MonitorSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that wakes on every published change
    pub fn subscribe(&self) -> watch::Receiver<MonitorSnapshot> {
        self.snapshots.clone()
    }

    /// Current supervisor phase
    pub fn phase(&self) -> SupervisorPhase {
        SupervisorPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Counter snapshot
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Token that stops the monitor when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stop both tasks and wait for them
    pub async fn shutdown(self) {
        tracing::info!("Monitor shutting down");
        self.shutdown.cancel();

        for (name, task) in [("supervisor", self.supervisor), ("runtime", self.runtime)] {
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(task = name, error = %e, "Task failed"),
                Err(_) => tracing::warn!(task = name, "Task did not stop in time"),
            }
        }
        tracing::info!("Monitor shutdown complete");
    }
}
