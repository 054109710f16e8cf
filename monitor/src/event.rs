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

//! Events emitted by the supervisor

use crate::parser::{PlayerList, TpsInfo};

/// Lifecycle and data events flowing from the supervisor to the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    /// Connected and authenticated
    ConnectionSuccess,
    /// A connect or login attempt failed
    ConnectionError(String),
    /// A command or its reply failed; the connection was dropped
    ExecutionError(String),
    /// Fresh player listing
    Players(PlayerList),
    /// Fresh tick-rate averages
    Tps(TpsInfo),
}

impl MonitorEvent {
    /// Whether this event means the server is no longer reachable
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            MonitorEvent::ConnectionError(_) | MonitorEvent::ExecutionError(_)
        )
    }
}
