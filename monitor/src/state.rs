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

//! Monitoring state machine
//!
//! [`StateMachine`] owns the latest [`Sample`] and the current [`AlertLevel`]. Supervisor events
//! update the sample as they arrive; alert transitions and persistence records are only derived
//! on the housekeeping tick through [`StateMachine::evaluate`] and [`StateMachine::record`].
//!
//! Transition table (offline is checked first and, when it fires, tps is not looked at):
//!
//! | level    | condition                                   | next     | category  |
//! |----------|---------------------------------------------|----------|-----------|
//! | Normal   | offline, offline alerting on                | Critical | alert     |
//! | Normal   | 0 < tps < threshold, low-tps alerting on    | Warning  | alert     |
//! | Warning  | offline, offline alerting on                | Critical | alert     |
//! | Warning  | tps >= threshold, low-tps alerting on       | Normal   | success   |
//! | Critical | online, offline alerting on                 | Normal   | success   |
//!
//! A tps of exactly zero means "not measured yet" and never moves the level.

use crate::config::AlertConfig;
use crate::event::MonitorEvent;
use crate::types::{
    AlertLevel, MonitorSnapshot, Notification, Sample, SampleRecord, TIMESTAMP_FORMAT,
};
use chrono::{DateTime, Local};

/// Single owner of the current sample and alert level
#[derive(Debug, Clone)]
pub struct StateMachine {
    alerts: AlertConfig,
    sample: Sample,
    level: AlertLevel,
}

impl StateMachine {
    /// Start offline at [`AlertLevel::Normal`]
    pub fn new(alerts: AlertConfig, now: DateTime<Local>) -> Self {
        Self {
            alerts,
            sample: Sample::offline(now),
            level: AlertLevel::Normal,
        }
    }

    /// Latest sample
    pub fn sample(&self) -> &Sample {
        &self.sample
    }

    /// Current alert level
    pub fn level(&self) -> AlertLevel {
        self.level
    }

    /// Copy of the sample and level taken together
    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            sample: self.sample.clone(),
            alert: self.level,
        }
    }

    /// Fold one supervisor event into the sample
    ///
    /// Failures zero every field so nothing stale is served while disconnected.
    pub fn apply(&mut self, event: &MonitorEvent, now: DateTime<Local>) {
        match event {
            MonitorEvent::ConnectionSuccess => {
                self.sample.online = true;
            }
            MonitorEvent::ConnectionError(_) | MonitorEvent::ExecutionError(_) => {
                self.sample = Sample::offline(now);
                return;
            }
            MonitorEvent::Players(players) => {
                self.sample.players = players.clone();
            }
            MonitorEvent::Tps(tps) => {
                self.sample.tps = *tps;
            }
        }
        self.sample.timestamp = now;
    }

    /// Run the alert policy once
    ///
    /// Returns the notification to send when the level changed.
    pub fn evaluate(&mut self, now: DateTime<Local>) -> Option<Notification> {
        let online = self.sample.online;
        let tps = self.sample.tps.l1m;
        let measured = tps != 0.0;
        let time = now.format(TIMESTAMP_FORMAT);

        let (next, notification) = match self.level {
            AlertLevel::Normal | AlertLevel::Warning if !online && self.alerts.offline => (
                AlertLevel::Critical,
                Notification::alert(format!(
                    "[CRITICAL] Server offline\nThe server is unreachable, please check it\nTime: {time}"
                )),
            ),
            AlertLevel::Normal
                if self.alerts.low_tps && measured && tps < self.alerts.tps_threshold =>
            {
                (
                    AlertLevel::Warning,
                    Notification::alert(format!(
                        "[WARNING] Low TPS\nServer TPS is below the threshold ({:.2})\nCurrent TPS: {:.2}\nTime: {time}",
                        self.alerts.tps_threshold, tps
                    )),
                )
            }
            AlertLevel::Warning
                if self.alerts.low_tps && measured && tps >= self.alerts.tps_threshold =>
            {
                (
                    AlertLevel::Normal,
                    Notification::success(format!(
                        "[RECOVERED] Server TPS back to normal\nTime: {time}"
                    )),
                )
            }
            AlertLevel::Critical if online && self.alerts.offline => (
                AlertLevel::Normal,
                Notification::success(format!("[RECOVERED] Server back online\nTime: {time}")),
            ),
            _ => return None,
        };

        tracing::info!(from = %self.level, to = %next, "Alert level changed");
        self.level = next;
        Some(notification)
    }

    /// Persistence record for this housekeeping tick
    ///
    /// Offline yields a zeroed record. Online with unmeasured tps yields nothing.
    pub fn record(&self, now: DateTime<Local>) -> Option<SampleRecord> {
        if !self.sample.online {
            return Some(SampleRecord {
                timestamp: now,
                online: false,
                tps: 0.0,
                online_players: 0,
                max_players: 0,
                player_names: String::new(),
            });
        }
        if self.sample.tps.l1m == 0.0 {
            return None;
        }
        Some(SampleRecord {
            timestamp: now,
            online: true,
            tps: self.sample.tps.l1m,
            online_players: self.sample.players.online,
            max_players: self.sample.players.max,
            player_names: self.sample.players.names.join(","),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{PlayerList, TpsInfo};
    use crate::types::NotificationCategory;

    fn alerts() -> AlertConfig {
        AlertConfig {
            offline: true,
            low_tps: true,
            tps_threshold: 15.0,
        }
    }

    fn tps(value: f64) -> MonitorEvent {
        MonitorEvent::Tps(TpsInfo {
            l1m: value,
            l5m: value,
            l15m: value,
        })
    }

    fn online(machine: &mut StateMachine, value: f64) {
        machine.apply(&MonitorEvent::ConnectionSuccess, Local::now());
        machine.apply(&tps(value), Local::now());
    }

    #[test]
    fn test_offline_alerts_once() {
        let mut machine = StateMachine::new(alerts(), Local::now());
        online(&mut machine, 20.0);
        assert!(machine.evaluate(Local::now()).is_none());

        machine.apply(
            &MonitorEvent::ConnectionError("refused".into()),
            Local::now(),
        );
        let notification = machine.evaluate(Local::now()).unwrap();
        assert_eq!(notification.category, NotificationCategory::Alert);
        assert!(notification.message.contains("offline"));
        assert_eq!(machine.level(), AlertLevel::Critical);

        machine.apply(
            &MonitorEvent::ConnectionError("refused".into()),
            Local::now(),
        );
        assert!(machine.evaluate(Local::now()).is_none());
        assert_eq!(machine.level(), AlertLevel::Critical);
    }

    #[test]
    fn test_back_online_recovers() {
        let mut machine = StateMachine::new(alerts(), Local::now());
        machine.evaluate(Local::now());
        assert_eq!(machine.level(), AlertLevel::Critical);

        machine.apply(&MonitorEvent::ConnectionSuccess, Local::now());
        let notification = machine.evaluate(Local::now()).unwrap();
        assert_eq!(notification.category, NotificationCategory::Success);
        assert!(notification.message.contains("back online"));
        assert_eq!(machine.level(), AlertLevel::Normal);
    }

    #[test]
    fn test_low_tps_warning_not_cleared_by_unmeasured_tps() {
        let mut machine = StateMachine::new(alerts(), Local::now());
        online(&mut machine, 10.0);

        let notification = machine.evaluate(Local::now()).unwrap();
        assert_eq!(machine.level(), AlertLevel::Warning);
        assert!(notification.message.contains("(15.00)"));
        assert!(notification.message.contains("Current TPS: 10.00"));

        machine.apply(&tps(0.0), Local::now());
        assert!(machine.evaluate(Local::now()).is_none());
        assert_eq!(machine.level(), AlertLevel::Warning);

        machine.apply(&tps(19.5), Local::now());
        let notification = machine.evaluate(Local::now()).unwrap();
        assert_eq!(notification.category, NotificationCategory::Success);
        assert_eq!(machine.level(), AlertLevel::Normal);
    }

    #[test]
    fn test_unmeasured_tps_never_warns() {
        let mut machine = StateMachine::new(alerts(), Local::now());
        online(&mut machine, 0.0);
        assert!(machine.evaluate(Local::now()).is_none());
        assert_eq!(machine.level(), AlertLevel::Normal);
    }

    #[test]
    fn test_offline_takes_priority_over_low_tps() {
        let mut machine = StateMachine::new(alerts(), Local::now());
        online(&mut machine, 10.0);
        machine.evaluate(Local::now());
        assert_eq!(machine.level(), AlertLevel::Warning);

        machine.apply(&MonitorEvent::ExecutionError("timeout".into()), Local::now());
        machine.evaluate(Local::now());
        assert_eq!(machine.level(), AlertLevel::Critical);
    }

    #[test]
    fn test_disabled_alerts_stay_normal() {
        let mut machine = StateMachine::new(
            AlertConfig {
                offline: false,
                low_tps: false,
                tps_threshold: 15.0,
            },
            Local::now(),
        );
        assert!(machine.evaluate(Local::now()).is_none());
        online(&mut machine, 3.0);
        assert!(machine.evaluate(Local::now()).is_none());
        assert_eq!(machine.level(), AlertLevel::Normal);
    }

    #[test]
    fn test_failure_zeroes_sample() {
        let mut machine = StateMachine::new(alerts(), Local::now());
        online(&mut machine, 20.0);
        machine.apply(
            &MonitorEvent::Players(PlayerList {
                online: 2,
                max: 20,
                names: vec!["Alex".into(), "Steve".into()],
            }),
            Local::now(),
        );
        machine.apply(&MonitorEvent::ExecutionError("eof".into()), Local::now());

        let sample = machine.sample();
        assert!(!sample.online);
        assert_eq!(sample.tps, TpsInfo::default());
        assert_eq!(sample.players, PlayerList::default());
    }

    #[test]
    fn test_tps_and_players_update_only_their_fields() {
        let mut machine = StateMachine::new(alerts(), Local::now());
        online(&mut machine, 19.0);
        machine.apply(
            &MonitorEvent::Players(PlayerList {
                online: 1,
                max: 10,
                names: vec!["Alex".into()],
            }),
            Local::now(),
        );
        assert_eq!(machine.sample().tps.l1m, 19.0);

        machine.apply(&tps(18.0), Local::now());
        assert_eq!(machine.sample().players.names, vec!["Alex".to_string()]);
    }

    #[test]
    fn test_records() {
        let mut machine = StateMachine::new(alerts(), Local::now());
        let record = machine.record(Local::now()).unwrap();
        assert!(!record.online);
        assert_eq!(record.tps, 0.0);

        machine.apply(&MonitorEvent::ConnectionSuccess, Local::now());
        assert!(machine.record(Local::now()).is_none());

        machine.apply(&tps(19.9), Local::now());
        machine.apply(
            &MonitorEvent::Players(PlayerList {
                online: 2,
                max: 20,
                names: vec!["Alex".into(), "Steve".into()],
            }),
            Local::now(),
        );
        let record = machine.record(Local::now()).unwrap();
        assert!(record.online);
        assert_eq!(record.tps, 19.9);
        assert_eq!(record.online_players, 2);
        assert_eq!(record.max_players, 20);
        assert_eq!(record.player_names, "Alex,Steve");
    }

    #[test]
    fn test_replay_is_deterministic() {
        let now = Local::now();
        let events = vec![
            MonitorEvent::ConnectionSuccess,
            MonitorEvent::Players(PlayerList {
                online: 1,
                max: 20,
                names: vec!["Alex".into()],
            }),
            tps(12.0),
            MonitorEvent::ExecutionError("reset".into()),
            MonitorEvent::ConnectionSuccess,
            tps(18.0),
        ];

        let run = || {
            let mut machine = StateMachine::new(alerts(), now);
            for event in &events {
                machine.apply(event, now);
                machine.evaluate(now);
            }
            machine.snapshot()
        };

        assert_eq!(run(), run());
    }
}
