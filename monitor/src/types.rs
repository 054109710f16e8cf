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

//! Core types for the monitor

use crate::parser::{PlayerList, TpsInfo};
use chrono::{DateTime, Local};
use std::fmt;

/// Timestamp format used for records and notification texts
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Supervisor lifecycle phase (stored as atomic u8 for lock-free reads)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SupervisorPhase {
    /// No connection; waiting out the backoff or about to connect
    Disconnected = 0,
    /// Connect and login in progress
    Connecting = 1,
    /// Authenticated and polling
    Connected = 2,
}

impl SupervisorPhase {
    /// Convert from u8 (for atomic operations)
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connecting,
            2 => Self::Connected,
            _ => Self::Disconnected,
        }
    }

    /// Convert to u8 (for atomic operations)
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SupervisorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// Alert severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertLevel {
    /// Nothing to report
    #[default]
    Normal,
    /// Tick rate below threshold
    Warning,
    /// Server offline
    Critical,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Point-in-time view of server liveness and performance
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// When the sample was last changed
    pub timestamp: DateTime<Local>,
    /// Whether the console is reachable
    pub online: bool,
    /// Tick-rate averages; all zero when not yet measured
    pub tps: TpsInfo,
    /// Player counts and names
    pub players: PlayerList,
}

impl Sample {
    /// An offline sample with every value zeroed
    pub fn offline(timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp,
            online: false,
            tps: TpsInfo::default(),
            players: PlayerList::default(),
        }
    }
}

/// What the serving layer sees: the latest sample and the alert level, swapped as one value
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSnapshot {
    /// Latest sample
    pub sample: Sample,
    /// Current alert level
    pub alert: AlertLevel,
}

/// Notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationCategory {
    /// Recovery or informational message
    Success,
    /// Something needs attention
    Alert,
}

impl NotificationCategory {
    /// Wire name of the category
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Alert => "alert",
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message for the notifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Human readable text
    pub message: String,
    /// Category
    pub category: NotificationCategory,
}

impl Notification {
    /// Create an alert notification
    pub fn alert(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            category: NotificationCategory::Alert,
        }
    }

    /// Create a success notification
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            category: NotificationCategory::Success,
        }
    }
}

/// Append-only record handed to the persistence collaborator, keyed by timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    /// Record key
    pub timestamp: DateTime<Local>,
    /// Whether the server was online
    pub online: bool,
    /// One minute tick-rate average
    pub tps: f64,
    /// Players online
    pub online_players: u32,
    /// Player cap
    pub max_players: u32,
    /// Player names joined with ","
    pub player_names: String,
}

impl SampleRecord {
    /// Record key formatted with [`TIMESTAMP_FORMAT`]
    pub fn key(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}
