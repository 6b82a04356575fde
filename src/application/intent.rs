use crate::domain::CommentId;

/// What a renderer asks the store to do on the user's behalf.
///
/// `Delete` is only sent once the user has confirmed it.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Add(String),
    Update(CommentId, String),
    Delete(CommentId),
    ToggleSortField,
    ToggleSortOrder,
    Reload,
}
