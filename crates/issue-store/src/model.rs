//! Core data types for issue-store.
//!
//! The serde format doubles as the JSONL snapshot format, so field names
//! stay snake_case and optional fields are omitted when empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Workflow status. Doubles as the board grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Backlog,
    #[default]
    Todo,
    InProgress,
    Done,
    Canceled,
    #[serde(untagged)]
    Custom(String),
}

impl Status {
    /// Built-in statuses in board column order.
    pub const WORKFLOW: [Self; 5] = [
        Self::Backlog,
        Self::Todo,
        Self::InProgress,
        Self::Done,
        Self::Canceled,
    ];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Backlog => "backlog",
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Canceled => "canceled",
            Self::Custom(value) => value,
        }
    }

    /// Column position on the board. Custom statuses come after the built-ins.
    #[must_use]
    pub const fn workflow_position(&self) -> u8 {
        match self {
            Self::Backlog => 0,
            Self::Todo => 1,
            Self::InProgress => 2,
            Self::Done => 3,
            Self::Canceled => 4,
            Self::Custom(_) => 5,
        }
    }
}

impl Ord for Status {
    fn cmp(&self, other: &Self) -> Ordering {
        self.workflow_position()
            .cmp(&other.workflow_position())
            .then_with(|| self.as_str().cmp(other.as_str()))
    }
}

impl PartialOrd for Status {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = crate::error::StoreError;

    /// Parses built-in names (with a few aliases). Custom workflow states
    /// use the `custom:` prefix, e.g. `custom:in_review`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if let Some(custom) = lower.strip_prefix("custom:") {
            if !custom.is_empty() {
                return Ok(Self::Custom(custom.to_string()));
            }
        }
        match lower.as_str() {
            "backlog" => Ok(Self::Backlog),
            "todo" | "unstarted" => Ok(Self::Todo),
            "in_progress" | "inprogress" | "in-progress" | "started" => Ok(Self::InProgress),
            "done" | "completed" => Ok(Self::Done),
            "canceled" | "cancelled" => Ok(Self::Canceled),
            other => Err(crate::error::StoreError::InvalidStatus {
                status: other.to_string(),
            }),
        }
    }
}

/// Issue priority (0=No priority, 1=Urgent .. 4=Low).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(transparent)]
pub struct Priority(pub i32);

impl Priority {
    pub const NONE: Self = Self(0);
    pub const URGENT: Self = Self(1);
    pub const HIGH: Self = Self(2);
    pub const MEDIUM: Self = Self(3);
    pub const LOW: Self = Self(4);

    /// Sort position for priority grouping: urgent first, "no priority" last.
    #[must_use]
    pub const fn urgency_rank(self) -> i32 {
        if self.0 == 0 { i32::MAX } else { self.0 }
    }

    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 >= Self::NONE.0 && self.0 <= Self::LOW.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl FromStr for Priority {
    type Err = crate::error::StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "none" => return Ok(Self::NONE),
            "urgent" => return Ok(Self::URGENT),
            "high" => return Ok(Self::HIGH),
            "medium" => return Ok(Self::MEDIUM),
            "low" => return Ok(Self::LOW),
            _ => {}
        }
        let val = s.strip_prefix('p').unwrap_or(&s);

        match val.parse::<i32>() {
            Ok(p) if Self(p).is_valid() => Ok(Self(p)),
            Ok(p) => Err(crate::error::StoreError::InvalidPriority { priority: p }),
            Err(_) => Err(crate::error::StoreError::InvalidPriority { priority: -1 }),
        }
    }
}

/// The cached issue entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    /// Unique, immutable identifier (e.g., "ENG-4k2").
    pub id: String,

    /// Owning team key.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub team_id: String,

    /// Title.
    pub title: String,

    /// Detailed description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Workflow status (board grouping key).
    #[serde(default)]
    pub status: Status,

    /// Priority (0=No priority, 1=Urgent .. 4=Low).
    #[serde(default)]
    pub priority: Priority,

    /// Assigned user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    /// Project the issue belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Cycle (sprint) the issue is scheduled in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<String>,

    /// Sort key within the status group.
    #[serde(default)]
    pub rank: f64,

    /// Labels.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub labels: Vec<String>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Default for Issue {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            team_id: String::new(),
            title: String::new(),
            description: None,
            status: Status::default(),
            priority: Priority::default(),
            assignee: None,
            project: None,
            cycle: None,
            rank: 0.0,
            labels: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Issue {
    /// Total order used inside a status group: rank, then identifier.
    #[must_use]
    pub fn cmp_rank(&self, other: &Self) -> Ordering {
        self.rank
            .total_cmp(&other.rank)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Payload for creating an issue. The backend assigns id and timestamps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewIssue {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<String>,
    /// Explicit rank; when absent the backend ranks the issue last in its group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub labels: Vec<String>,
}
