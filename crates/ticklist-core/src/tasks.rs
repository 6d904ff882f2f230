use std::{convert::Infallible, fmt, str::FromStr};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Task identifier. New tasks get the creation time in milliseconds; ids
/// written as strings by other tools are kept as they are.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(untagged)]
pub enum TaskId {
    Num(i64),
    Text(String),
}

impl TaskId {
    /// Issue a numeric id strictly greater than `last`, preferring the current wall clock.
    /// Returns `None` once `last` is `i64::MAX` and nothing larger exists.
    pub fn next_after(last: Option<i64>) -> Option<Self> {
        let now = Utc::now().timestamp_millis();
        match last {
            Some(prev) if prev >= now => prev.checked_add(1).map(TaskId::Num),
            _ => Some(TaskId::Num(now)),
        }
    }

    pub fn as_num(&self) -> Option<i64> {
        match self {
            TaskId::Num(n) => Some(*n),
            TaskId::Text(_) => None,
        }
    }
}

impl From<i64> for TaskId {
    fn from(n: i64) -> Self {
        TaskId::Num(n)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Num(n) => write!(f, "{n}"),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for TaskId {
    type Err = Infallible;

    /// Integers become numeric ids, anything else a text id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(s.parse::<i64>()
            .map(TaskId::Num)
            .unwrap_or_else(|_| TaskId::Text(s.to_string())))
    }
}

/// Task entity as stored and rendered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
}

impl Task {
    /// Build an open task. Callers are expected to pass already-trimmed text.
    pub fn new(id: TaskId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }
}

/// Trim user input, returning `None` when nothing is left.
pub fn normalize_text(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// View selector applied to the collection for display.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Completed,
}

impl FilterMode {
    pub const ALL: [FilterMode; 3] = [FilterMode::All, FilterMode::Active, FilterMode::Completed];

    /// Whether a task is visible under this filter.
    pub fn matches(self, task: &Task) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Active => !task.completed,
            FilterMode::Completed => task.completed,
        }
    }

    /// Next filter in display order, wrapping around.
    pub fn cycle(self) -> Self {
        match self {
            FilterMode::All => FilterMode::Active,
            FilterMode::Active => FilterMode::Completed,
            FilterMode::Completed => FilterMode::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Active => "active",
            FilterMode::Completed => "completed",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown filter `{0}` (expected all, active or completed)")]
pub struct ParseFilterError(String);

impl FromStr for FilterMode {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(FilterMode::All),
            "active" => Ok(FilterMode::Active),
            "completed" => Ok(FilterMode::Completed),
            other => Err(ParseFilterError(other.to_string())),
        }
    }
}
