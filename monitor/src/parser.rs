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

//! Extraction of typed values from console replies
//!
//! Console output is free text whose shape depends on the server software and version. All
//! knowledge of that shape lives behind [`ResponseParser`], so a different server flavour only
//! needs a new implementation and nothing in the supervisor or state machine changes.

use regex::Regex;
use std::sync::LazyLock;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Reasons a reply could not be turned into typed values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The "N of a max of M players online" phrase is absent
    #[error("player count not found in reply {0:?}")]
    MissingPlayerCount(String),

    /// The tps reply did not contain exactly three values
    #[error("expected 3 tps values, found {found}")]
    TpsTokenCount {
        /// Number of values that were recognised
        found: usize,
    },

    /// A recognised token is not a valid number
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
}

/// Player counts and names from a player listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerList {
    /// Players currently online
    pub online: u32,
    /// Server player cap
    pub max: u32,
    /// Names in the order the server listed them
    pub names: Vec<String>,
}

/// Tick-rate averages over the last 1, 5 and 15 minutes
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TpsInfo {
    /// Last minute
    pub l1m: f64,
    /// Last five minutes
    pub l5m: f64,
    /// Last fifteen minutes
    pub l15m: f64,
}

/// Turns command replies into typed values. Implementations must be pure.
pub trait ResponseParser: Send + Sync + 'static {
    /// Parse the reply to the player listing command
    fn parse_player_list(&self, text: &str) -> ParseResult<PlayerList>;

    /// Parse the reply to the tick-rate command
    fn parse_tps(&self, text: &str) -> ParseResult<TpsInfo>;
}

/// Parser for vanilla `list` and Spigot/Paper `tps` replies.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinecraftParser;

impl ResponseParser for MinecraftParser {
    fn parse_player_list(&self, text: &str) -> ParseResult<PlayerList> {
        parse_player_list(text)
    }

    fn parse_tps(&self, text: &str) -> ParseResult<TpsInfo> {
        parse_tps(text)
    }
}

static PLAYER_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+) of a max of (\d+) players online").expect("player count pattern")
});

static PLAYER_NAMES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"online: ([^:]+)").expect("player names pattern"));

// A colour code (section sign + letter) followed by an integer or decimal.
static TPS_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"§[a-zA-Z](\d+\.\d+|\d+)").expect("tps value pattern"));

/// Parses "`N of a max of M players online: a, b, c`".
///
/// The names segment is optional; without it the name list is empty.
///
/// # Errors
/// [`ParseError::MissingPlayerCount`] when the count phrase is absent.
pub fn parse_player_list(text: &str) -> ParseResult<PlayerList> {
    let counts = PLAYER_COUNT
        .captures(text)
        .ok_or_else(|| ParseError::MissingPlayerCount(text.to_string()))?;

    let online = parse_number::<u32>(&counts[1])?;
    let max = parse_number::<u32>(&counts[2])?;

    let names = PLAYER_NAMES
        .captures(text)
        .map(|caps| {
            caps[1]
                .split(", ")
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(PlayerList { online, max, names })
}

/// Parses a reply holding exactly three colour-prefixed numbers, e.g.
/// "`§6TPS from last 1m, 5m, 15m: §a20.0, §a19.8, §a19.5`".
///
/// # Errors
/// [`ParseError::TpsTokenCount`] unless exactly three values are present. A reply with more or
/// fewer values is rejected rather than guessed at.
pub fn parse_tps(text: &str) -> ParseResult<TpsInfo> {
    let tokens: Vec<&str> = TPS_VALUE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();

    let [l1m, l5m, l15m] = tokens[..] else {
        return Err(ParseError::TpsTokenCount {
            found: tokens.len(),
        });
    };

    Ok(TpsInfo {
        l1m: parse_number(l1m)?,
        l5m: parse_number(l5m)?,
        l15m: parse_number(l15m)?,
    })
}

fn parse_number<T: std::str::FromStr>(token: &str) -> ParseResult<T> {
    token
        .parse()
        .map_err(|_| ParseError::InvalidNumber(token.to_string()))
}
