use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub i64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CommentId {
    fn from(id: i64) -> Self {
        CommentId(id)
    }
}

impl std::str::FromStr for CommentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(CommentId)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author: String,
    pub text: String,
    pub date: DateTime<Utc>,
    pub image: Option<String>,
    pub likes: i64,
}

impl Comment {
    /// Format the time since creation for display
    pub fn time_since_created(&self) -> String {
        let now = Utc::now();
        let duration = now.signed_duration_since(self.date);

        if duration.num_days() > 0 {
            format!("{} days ago", duration.num_days())
        } else if duration.num_hours() > 0 {
            format!("{} hours ago", duration.num_hours())
        } else if duration.num_minutes() > 0 {
            format!("{} minutes ago", duration.num_minutes())
        } else {
            "Just now".to_string()
        }
    }

    /// Exact creation time, e.g. `Mar 4, 2024 9:05 AM`.
    pub fn date_display(&self) -> String {
        self.date.format("%b %-d, %Y %-I:%M %p").to_string()
    }

    /// True when saving `edited` would not change this comment.
    ///
    /// Callers use this to skip the round trip for no-op edits; the comparison
    /// trims the edited text only, so the stored text is taken as-is.
    pub fn is_unchanged_by(&self, edited: &str) -> bool {
        edited.trim() == self.text
    }
}

/// Returns the text unchanged if it has visible content.
pub fn validate_text(text: &str) -> super::DomainResult<&str> {
    if text.trim().is_empty() {
        Err(super::DomainError::EmptyText)
    } else {
        Ok(text)
    }
}
