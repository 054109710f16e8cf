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

//! Monitor configuration
//!
//! Configuration is read once at startup. It can be assembled with the `with_*` builders or
//! loaded from a YAML document:
//!
//! ```
//! use rconwatch_monitor::MonitorConfig;
//! use std::time::Duration;
//!
//! let config = MonitorConfig::from_yaml_str(r#"
//! rcon:
//!   host: mc.example.com
//!   port: 25575
//!   password: secret
//! warn:
//!   enabledType:
//!     offline: true
//!     lowTps:
//!       enabled: true
//!       threshold: 15.0
//! "#).unwrap();
//!
//! assert_eq!(config.client.address(), "mc.example.com:25575");
//! assert!(config.alerts.low_tps);
//! assert_eq!(config.poll_interval, Duration::from_secs(5));
//! ```

use crate::{MonitorError, Result};
use rconwatch_client::ClientConfig;
use serde::Deserialize;
use serde::de::IgnoredAny;
use std::path::Path;
use std::time::Duration;

/// Which alerts are raised and at what threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertConfig {
    /// Alert when the server goes offline
    pub offline: bool,
    /// Alert when the one minute tps drops below `tps_threshold`
    pub low_tps: bool,
    /// Low tps threshold
    pub tps_threshold: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            offline: true,
            low_tps: false,
            tps_threshold: 15.0,
        }
    }
}

/// Console commands issued on every poll tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollCommands {
    /// Player listing command
    pub players: String,
    /// Tick-rate command
    pub tps: String,
}

impl Default for PollCommands {
    fn default() -> Self {
        Self {
            players: "list".to_string(),
            tps: "tps".to_string(),
        }
    }
}

/// Monitor configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Console connection settings
    pub client: ClientConfig,
    /// Alerting policy
    pub alerts: AlertConfig,
    /// Commands issued each poll tick
    pub commands: PollCommands,
    /// Time between poll ticks
    pub poll_interval: Duration,
    /// Delay before reconnecting after any failure
    pub reconnect_backoff: Duration,
    /// Time between alert evaluations and record handoffs
    pub housekeeping_interval: Duration,
    /// Capacity of the supervisor to state machine event channel
    pub event_buffer: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            alerts: AlertConfig::default(),
            commands: PollCommands::default(),
            poll_interval: Duration::from_secs(5),
            reconnect_backoff: Duration::from_secs(3),
            housekeeping_interval: Duration::from_secs(10),
            event_buffer: 64,
        }
    }
}

impl MonitorConfig {
    /// Create a configuration for the given console
    pub fn new(client: ClientConfig) -> Self {
        Self {
            client,
            ..Default::default()
        }
    }

    /// Set the alerting policy
    pub fn with_alerts(mut self, alerts: AlertConfig) -> Self {
        self.alerts = alerts;
        self
    }

    /// Set the poll commands
    pub fn with_commands(mut self, commands: PollCommands) -> Self {
        self.commands = commands;
        self
    }

    /// Set the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the reconnect backoff
    pub fn with_reconnect_backoff(mut self, backoff: Duration) -> Self {
        self.reconnect_backoff = backoff;
        self
    }

    /// Set the housekeeping interval
    pub fn with_housekeeping_interval(mut self, interval: Duration) -> Self {
        self.housekeeping_interval = interval;
        self
    }

    /// Reject values the runtime cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(MonitorError::Config("poll interval must be non-zero".into()));
        }
        if self.housekeeping_interval.is_zero() {
            return Err(MonitorError::Config(
                "housekeeping interval must be non-zero".into(),
            ));
        }
        if self.client.connect_timeout.is_zero() {
            return Err(MonitorError::Config(
                "connect timeout must be non-zero".into(),
            ));
        }
        if self.event_buffer == 0 {
            return Err(MonitorError::Config("event buffer must be non-zero".into()));
        }
        if !self.alerts.tps_threshold.is_finite() {
            return Err(MonitorError::Config("tps threshold must be finite".into()));
        }
        Ok(())
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: FileConfig = serde_yaml_ng::from_str(yaml)?;
        let config = MonitorConfig::from(file);
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            MonitorError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&yaml)
    }
}

// On-disk layout. Every section and field is optional.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    rcon: RconSection,
    warn: WarnSection,
    commands: CommandSection,
    intervals: IntervalSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RconSection {
    host: String,
    port: u16,
    password: String,
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
}

impl Default for RconSection {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            host: client.host,
            port: client.port,
            password: client.password,
            connect_timeout_secs: client.connect_timeout.as_secs(),
            read_timeout_secs: client.read_timeout.map(|d| d.as_secs()).unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct WarnSection {
    /// Master switch; `false` turns every alert off
    enabled: bool,
    #[serde(rename = "enabledType", alias = "enabled_type")]
    enabled_type: EnabledTypeSection,
    /// Delivery channel settings belong to the notifier, not the monitor
    #[serde(rename = "dingtalkBot")]
    _dingtalk_bot: Option<IgnoredAny>,
}

impl Default for WarnSection {
    fn default() -> Self {
        Self {
            enabled: true,
            enabled_type: EnabledTypeSection::default(),
            _dingtalk_bot: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct EnabledTypeSection {
    offline: bool,
    #[serde(rename = "lowTps", alias = "low_tps")]
    low_tps: LowTpsSection,
}

impl Default for EnabledTypeSection {
    fn default() -> Self {
        Self {
            offline: AlertConfig::default().offline,
            low_tps: LowTpsSection::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LowTpsSection {
    enabled: bool,
    threshold: f64,
}

impl Default for LowTpsSection {
    fn default() -> Self {
        let alerts = AlertConfig::default();
        Self {
            enabled: alerts.low_tps,
            threshold: alerts.tps_threshold,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CommandSection {
    players: String,
    tps: String,
}

impl Default for CommandSection {
    fn default() -> Self {
        let commands = PollCommands::default();
        Self {
            players: commands.players,
            tps: commands.tps,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct IntervalSection {
    poll_secs: u64,
    reconnect_secs: u64,
    housekeeping_secs: u64,
}

impl Default for IntervalSection {
    fn default() -> Self {
        let config = MonitorConfig::default();
        Self {
            poll_secs: config.poll_interval.as_secs(),
            reconnect_secs: config.reconnect_backoff.as_secs(),
            housekeeping_secs: config.housekeeping_interval.as_secs(),
        }
    }
}

impl From<FileConfig> for MonitorConfig {
    fn from(file: FileConfig) -> Self {
        let read_timeout = match file.rcon.read_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        let client = ClientConfig::new(file.rcon.host, file.rcon.port)
            .with_password(file.rcon.password)
            .with_connect_timeout(Duration::from_secs(file.rcon.connect_timeout_secs))
            .with_read_timeout(read_timeout);

        MonitorConfig::new(client)
            .with_alerts(AlertConfig {
                offline: file.warn.enabled && file.warn.enabled_type.offline,
                low_tps: file.warn.enabled && file.warn.enabled_type.low_tps.enabled,
                tps_threshold: file.warn.enabled_type.low_tps.threshold,
            })
            .with_commands(PollCommands {
                players: file.commands.players,
                tps: file.commands.tps,
            })
            .with_poll_interval(Duration::from_secs(file.intervals.poll_secs))
            .with_reconnect_backoff(Duration::from_secs(file.intervals.reconnect_secs))
            .with_housekeeping_interval(Duration::from_secs(file.intervals.housekeeping_secs))
    }
}
