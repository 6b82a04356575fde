use std::fmt;

use crate::domain::CommentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationAction {
    Add,
    Update,
    Delete,
}

impl MutationAction {
    pub fn verb(&self) -> &'static str {
        match self {
            MutationAction::Add => "add",
            MutationAction::Update => "update",
            MutationAction::Delete => "delete",
        }
    }
}

/// A failed user action that must be brought to the user's attention.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub action: MutationAction,
    pub comment_id: Option<CommentId>,
    pub detail: String,
}

impl Notification {
    /// Short headline, e.g. `Failed to delete comment`.
    pub fn headline(&self) -> String {
        format!("Failed to {} comment", self.action.verb())
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.headline(), self.detail)
    }
}

/// Blocking user-facing notification channel.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this comment?";

/// Yes/no gate the presentation layer asks before destructive actions.
pub trait Confirmer {
    fn confirm(&self, prompt: &str) -> bool;
}
