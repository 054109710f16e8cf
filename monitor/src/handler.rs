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

//! Collaborator traits for notification delivery and sample persistence
//!
//! Both collaborators are fire-and-forget: they report their own failures and never hand an
//! error back to the monitor.

use crate::types::{Notification, SampleRecord};
use async_trait::async_trait;

/// Delivers notifications to operators
///
/// # Example
///
/// ```no_run
/// use rconwatch_monitor::{Notification, Notifier};
/// use async_trait::async_trait;
///
/// struct StdoutNotifier;
///
/// #[async_trait]
/// impl Notifier for StdoutNotifier {
///     async fn notify(&self, notification: &Notification) {
///         println!("[{}] {}", notification.category, notification.message);
///     }
/// }
/// ```
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Deliver one notification
    async fn notify(&self, notification: &Notification);
}

/// Append-only store for housekeeping records
#[async_trait]
pub trait SampleSink: Send + Sync + 'static {
    /// Append one record
    async fn append(&self, record: SampleRecord);
}

/// Notifier that writes to the tracing subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notification: &Notification) {
        tracing::warn!(
            category = %notification.category,
            message = %notification.message,
            "Notification"
        );
    }
}

/// Sink that writes records to the tracing subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl SampleSink for TracingSink {
    async fn append(&self, record: SampleRecord) {
        tracing::info!(
            time = %record.key(),
            online = record.online,
            tps = record.tps,
            players = record.online_players,
            max_players = record.max_players,
            names = %record.player_names,
            "Sample recorded"
        );
    }
}

/// Callback-based notifier
///
/// ```
/// use rconwatch_monitor::CallbackNotifier;
///
/// let notifier = CallbackNotifier::new(|n| eprintln!("{}", n.message));
/// ```
pub struct CallbackNotifier {
    callback: Box<dyn Fn(&Notification) + Send + Sync + 'static>,
}

impl CallbackNotifier {
    /// Wrap a closure
    pub fn new(callback: impl Fn(&Notification) + Send + Sync + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }
}

#[async_trait]
impl Notifier for CallbackNotifier {
    async fn notify(&self, notification: &Notification) {
        (self.callback)(notification);
    }
}
