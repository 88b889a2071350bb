//! The leaderboard boundary.
//!
//! Broadside does not speak HTTP itself. Applications fetch the body of
//! `GET {api_url}/leaderboard?limit=N` (see
//! [`ClientConfig::leaderboard_url`](crate::ClientConfig::leaderboard_url))
//! with whatever client they already use, and hand it to
//! [`parse_leaderboard`]. [`StatsService`] is the seam for that fetch.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Deserializer, Serialize};

/// Errors from the stats boundary.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// The response body is not a leaderboard.
    #[error("failed to parse leaderboard: {0}")]
    Decode(#[from] serde_json::Error),

    /// The service answered with something other than success.
    #[error("failed to fetch leaderboard: {0}")]
    Unavailable(String),
}

/// One row of the leaderboard.
///
/// Missing numeric fields read as zero; only `username` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub total_games: u32,
    /// Share of games won, 0.0 to 100.0. Some servers send it as a
    /// string (`"66.67"`), straight from a SQL `ROUND`.
    #[serde(default, deserialize_with = "number_or_numeric_string")]
    pub win_percentage: f64,
}

fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl LeaderboardEntry {
    /// The win percentage with one decimal, e.g. `"66.7%"`.
    pub fn win_rate(&self) -> WinRate {
        WinRate(self.win_percentage)
    }
}

/// Display adapter for a win percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WinRate(f64);

impl fmt::Display for WinRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

#[derive(Deserialize)]
struct LeaderboardBody {
    leaderboard: Vec<LeaderboardEntry>,
}

/// Parses a `{"leaderboard": [...]}` response body.
///
/// # Errors
/// Returns [`StatsError::Decode`] if the body is not JSON, lacks the
/// `leaderboard` array, or an entry has no `username`.
pub fn parse_leaderboard(body: &str) -> Result<Vec<LeaderboardEntry>, StatsError> {
    let body: LeaderboardBody = serde_json::from_str(body)?;
    Ok(body.leaderboard)
}

/// Read-only access to player statistics.
pub trait StatsService: Send + Sync {
    /// The best `limit` players, best first.
    fn fetch_top_entries(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<LeaderboardEntry>, StatsError>> + Send;
}
