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

//! Lock-free metrics for the monitor
//!
//! Every counter is kept locally for [`MetricsSnapshot`] and also emitted through the `metrics`
//! facade, so an installed recorder sees the same values.

use metrics::counter;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Lock-free monitor counters
///
/// Written by the supervisor and the runtime task, read through
/// [`MonitorHandle::metrics`](crate::MonitorHandle::metrics).
#[derive(Debug)]
pub struct MonitorMetrics {
    connect_attempts: AtomicU64,
    connect_failures: AtomicU64,
    polls_completed: AtomicU64,
    execution_errors: AtomicU64,
    parse_errors: AtomicU64,
    notifications_sent: AtomicU64,
    samples_recorded: AtomicU64,
    started_at: Instant,
}

impl Default for MonitorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorMetrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            connect_attempts: AtomicU64::new(0),
            connect_failures: AtomicU64::new(0),
            polls_completed: AtomicU64::new(0),
            execution_errors: AtomicU64::new(0),
            parse_errors: AtomicU64::new(0),
            notifications_sent: AtomicU64::new(0),
            samples_recorded: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    // Connection tracking

    /// Record a connect attempt
    pub fn connect_attempt(&self) {
        self.connect_attempts.fetch_add(1, Ordering::Relaxed);
        counter!("rconwatch.connect.attempts").increment(1);
    }

    /// Record a failed connect or login
    pub fn connect_failure(&self) {
        self.connect_failures.fetch_add(1, Ordering::Relaxed);
        counter!("rconwatch.connect.failures").increment(1);
    }

    // Polling

    /// Record a tick where every command succeeded
    pub fn poll_completed(&self) {
        self.polls_completed.fetch_add(1, Ordering::Relaxed);
        counter!("rconwatch.polls.completed").increment(1);
    }

    /// Record a failed command
    pub fn execution_error(&self) {
        self.execution_errors.fetch_add(1, Ordering::Relaxed);
        counter!("rconwatch.errors.execution").increment(1);
    }

    /// Record a reply that could not be parsed
    pub fn parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
        counter!("rconwatch.errors.parse").increment(1);
    }

    // Housekeeping

    /// Record a dispatched notification
    pub fn notification_sent(&self) {
        self.notifications_sent.fetch_add(1, Ordering::Relaxed);
        counter!("rconwatch.notifications.sent").increment(1);
    }

    /// Record a persisted sample
    pub fn sample_recorded(&self) {
        self.samples_recorded.fetch_add(1, Ordering::Relaxed);
        counter!("rconwatch.samples.recorded").increment(1);
    }

    /// Point-in-time view of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connect_attempts: self.connect_attempts.load(Ordering::Relaxed),
            connect_failures: self.connect_failures.load(Ordering::Relaxed),
            polls_completed: self.polls_completed.load(Ordering::Relaxed),
            execution_errors: self.execution_errors.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            notifications_sent: self.notifications_sent.load(Ordering::Relaxed),
            samples_recorded: self.samples_recorded.load(Ordering::Relaxed),
            uptime: self.started_at.elapsed(),
        }
    }
}

/// A snapshot of monitor metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    /// Connect attempts since start
    pub connect_attempts: u64,
    /// Failed connects or logins
    pub connect_failures: u64,
    /// Poll ticks where every command succeeded
    pub polls_completed: u64,
    /// Failed commands
    pub execution_errors: u64,
    /// Unparseable replies
    pub parse_errors: u64,
    /// Notifications dispatched
    pub notifications_sent: u64,
    /// Records handed to the sink
    pub samples_recorded: u64,
    /// Monitor uptime
    pub uptime: Duration,
}

impl MetricsSnapshot {
    /// Fraction of connect attempts that succeeded
    pub fn connect_success_ratio(&self) -> f64 {
        if self.connect_attempts == 0 {
            return 0.0;
        }
        let succeeded = self.connect_attempts.saturating_sub(self.connect_failures);
        succeeded as f64 / self.connect_attempts as f64
    }

    /// Total failures of any kind
    pub fn total_errors(&self) -> u64 {
        self.connect_failures + self.execution_errors + self.parse_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, SharedString, Unit};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[test]
    fn test_counters() {
        let metrics = MonitorMetrics::new();
        metrics.connect_attempt();
        metrics.connect_attempt();
        metrics.connect_failure();
        metrics.poll_completed();
        metrics.execution_error();
        metrics.parse_error();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.connect_attempts, 2);
        assert_eq!(snapshot.connect_failures, 1);
        assert_eq!(snapshot.polls_completed, 1);
        assert_eq!(snapshot.total_errors(), 3);
        assert_eq!(snapshot.connect_success_ratio(), 0.5);
    }

    /// Recorder that sums every counter by name
    #[derive(Default)]
    struct SummingRecorder {
        counters: Mutex<HashMap<String, Arc<Summed>>>,
    }

    #[derive(Default)]
    struct Summed(AtomicU64);

    impl metrics::CounterFn for Summed {
        fn increment(&self, value: u64) {
            self.0.fetch_add(value, Ordering::Relaxed);
        }

        fn absolute(&self, value: u64) {
            self.0.store(value, Ordering::Relaxed);
        }
    }

    impl SummingRecorder {
        fn value(&self, name: &str) -> u64 {
            self.counters
                .lock()
                .unwrap()
                .get(name)
                .map(|c| c.0.load(Ordering::Relaxed))
                .unwrap_or(0)
        }
    }

    impl metrics::Recorder for SummingRecorder {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            let summed = self
                .counters
                .lock()
                .unwrap()
                .entry(key.name().to_string())
                .or_default()
                .clone();
            Counter::from_arc(summed)
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    #[test]
    fn test_counters_reach_installed_recorder() {
        let recorder = SummingRecorder::default();
        metrics::with_local_recorder(&recorder, || {
            let local = MonitorMetrics::new();
            local.connect_attempt();
            local.connect_attempt();
            local.parse_error();
            local.notification_sent();
        });

        assert_eq!(recorder.value("rconwatch.connect.attempts"), 2);
        assert_eq!(recorder.value("rconwatch.errors.parse"), 1);
        assert_eq!(recorder.value("rconwatch.notifications.sent"), 1);
        assert_eq!(recorder.value("rconwatch.samples.recorded"), 0);
    }

    #[test]
    fn test_empty_ratio() {
        assert_eq!(MonitorMetrics::new().snapshot().connect_success_ratio(), 0.0);
    }

    #[test]
    fn test_concurrent_updates() {
        let metrics = Arc::new(MonitorMetrics::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = metrics.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        metrics.sample_recorded();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(metrics.snapshot().samples_recorded, 800);
    }
}
