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

//! RCON monitor daemon
//!
//! Loads a YAML configuration, starts the monitor and logs a status line whenever the snapshot
//! changes. Stops on Ctrl+C.
//!
//! Usage: cargo run --example monitor_daemon -- [path/to/monitor.yml]

use rconwatch_monitor::{Monitor, MonitorConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/monitor.yml".to_string());

    let config = match MonitorConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            error!(path = %path, error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    info!(path = %path, address = %config.client.address(), "Configuration loaded");

    let handle = Monitor::rcon(config).start().await?;
    let mut updates = handle.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                info!(
                    phase = %handle.phase(),
                    online = snapshot.sample.online,
                    tps = snapshot.sample.tps.l1m,
                    players = snapshot.sample.players.online,
                    alert = %snapshot.alert,
                    "Status"
                );
            }
        }
    }

    let metrics = handle.metrics();
    info!(
        polls = metrics.polls_completed,
        errors = metrics.total_errors(),
        "Stopping"
    );
    handle.shutdown().await;
    Ok(())
}
