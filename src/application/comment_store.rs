use dashmap::DashSet;
use std::collections::HashSet;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{AppError, AppResult, Intent};
use crate::domain::*;
use crate::ports::{CommentGateway, MutationAction, Notification, Notifier, PreferenceStore};

/// Where a newly created comment lands in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreatePlacement {
    /// Put it at the front regardless of the active sort.
    #[default]
    Prepend,
    /// Re-fetch the list so the server places it according to the active sort.
    Refetch,
}

/// Read-only view handed to renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentsSnapshot {
    pub comments: Vec<Comment>,
    pub loading: bool,
    pub sort: SortPreference,
    pub initialized: bool,
}

#[derive(Debug, Default)]
struct StoreState {
    comments: Vec<Comment>,
    sort: SortPreference,
    initialized: bool,
    pending_loads: usize,
    // Bumped by every reload.
    load_generation: u64,
    // Generation of the list currently shown; older results never replace it.
    applied_generation: u64,
}

/// Releases a comment id from the in-flight set when the mutation finishes.
struct InFlightGuard<'a> {
    in_flight: &'a DashSet<CommentId>,
    id: CommentId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.id);
    }
}

/// Owns the local comment list and keeps it in step with the gateway.
///
/// Mutations are applied to the list only after the gateway confirms them, so a
/// failed call leaves the list exactly as it was. Load failures are logged and
/// otherwise silent; mutation failures also go to the [`Notifier`].
pub struct CommentStore {
    gateway: Arc<dyn CommentGateway>,
    preferences: Arc<dyn PreferenceStore>,
    notifier: Arc<dyn Notifier>,
    create_placement: CreatePlacement,
    state: RwLock<StoreState>,
    in_flight: DashSet<CommentId>,
}

impl CommentStore {
    pub fn new(
        gateway: Arc<dyn CommentGateway>,
        preferences: Arc<dyn PreferenceStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            gateway,
            preferences,
            notifier,
            create_placement: CreatePlacement::default(),
            state: RwLock::new(StoreState::default()),
            in_flight: DashSet::new(),
        }
    }

    pub fn with_create_placement(mut self, placement: CreatePlacement) -> Self {
        self.create_placement = placement;
        self
    }

    pub async fn snapshot(&self) -> CommentsSnapshot {
        let state = self.state.read().await;
        CommentsSnapshot {
            comments: state.comments.clone(),
            loading: state.pending_loads > 0,
            sort: state.sort,
            initialized: state.initialized,
        }
    }

    pub async fn sort_preference(&self) -> SortPreference {
        self.state.read().await.sort
    }

    /// Restores the persisted sort preference and performs the first load.
    pub async fn initialize(&self) -> AppResult<()> {
        let sort = self.restore_sort_preference().await;
        self.state.write().await.initialized = true;
        tracing::info!("Initialized comment store, sort: {}", sort);

        self.reload().await
    }

    /// Loads the stored sort preference without touching the list.
    ///
    /// Absent or unreadable values fall back to the default.
    pub async fn restore_sort_preference(&self) -> SortPreference {
        let sort = SortPreference::new(
            self.read_preference(SORT_FIELD_KEY).unwrap_or_default(),
            self.read_preference(SORT_ORDER_KEY).unwrap_or_default(),
        );
        self.state.write().await.sort = sort;
        sort
    }

    /// Replaces the list with the server's current contents.
    ///
    /// On failure the previous list stays in place. The error is logged and
    /// returned, but the user is not notified. A result fetched for a sort that
    /// is no longer active, or older than the list already shown, is dropped.
    pub async fn reload(&self) -> AppResult<()> {
        let (sort, generation) = {
            let mut state = self.state.write().await;
            state.pending_loads += 1;
            state.load_generation += 1;
            (state.sort, state.load_generation)
        };

        let result = self.gateway.list(sort).await;

        let mut state = self.state.write().await;
        state.pending_loads = state.pending_loads.saturating_sub(1);

        match result {
            Ok(comments) if generation > state.applied_generation && sort == state.sort => {
                tracing::debug!("Loaded {} comments ({})", comments.len(), sort);
                state.comments = dedup_by_id(comments);
                state.applied_generation = generation;
                Ok(())
            }
            Ok(_) => {
                tracing::debug!("Discarding superseded load ({})", sort);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to load comments: {}", e);
                Err(e.into())
            }
        }
    }

    pub async fn set_sort_field(&self, field: SortField) -> AppResult<()> {
        self.change_sort(|sort| sort.field = field).await
    }

    pub async fn set_sort_order(&self, order: SortOrder) -> AppResult<()> {
        self.change_sort(|sort| sort.order = order).await
    }

    pub async fn toggle_sort_field(&self) -> AppResult<()> {
        self.change_sort(|sort| sort.field = sort.field.toggled()).await
    }

    pub async fn toggle_sort_order(&self) -> AppResult<()> {
        self.change_sort(|sort| sort.order = sort.order.toggled()).await
    }

    async fn change_sort(&self, change: impl FnOnce(&mut SortPreference)) -> AppResult<()> {
        {
            let mut state = self.state.write().await;
            change(&mut state.sort);
            tracing::info!("Sort changed to {}", state.sort);

            // Written under the lock so the stored pair always matches memory.
            self.write_preference(SORT_FIELD_KEY, state.sort.field.as_str());
            self.write_preference(SORT_ORDER_KEY, state.sort.order.as_str());
        }

        self.reload().await
    }

    /// Creates a comment and adds the server's record to the list.
    pub async fn add_comment(&self, text: &str) -> AppResult<Comment> {
        let text = validate_text(text)?;

        let comment = match self.gateway.create(text).await {
            Ok(comment) => comment,
            Err(e) => return Err(self.mutation_failed(MutationAction::Add, None, e.into())),
        };
        tracing::info!("Created comment {}", comment.id);

        let placed_by_server = self.create_placement == CreatePlacement::Refetch
            && self.reload().await.is_ok()
            && self.contains(comment.id).await;

        if !placed_by_server {
            let mut state = self.state.write().await;
            state.comments.retain(|c| c.id != comment.id);
            state.comments.insert(0, comment.clone());
        }

        Ok(comment)
    }

    /// Sends new text for a comment and swaps in the server's record in place.
    ///
    /// Callers decide whether an edit is worth sending at all (see
    /// [`Comment::is_unchanged_by`]).
    pub async fn update_comment(&self, id: CommentId, text: &str) -> AppResult<Comment> {
        let text = validate_text(text)?;
        let Some(_guard) = self.claim(id) else {
            return Err(self.mutation_failed(
                MutationAction::Update,
                Some(id),
                AppError::MutationInFlight(id),
            ));
        };

        let updated = match self.gateway.update(id, text).await {
            Ok(updated) => updated,
            Err(e) => {
                return Err(self.mutation_failed(MutationAction::Update, Some(id), e.into()))
            }
        };
        tracing::info!("Updated comment {}", id);

        let mut state = self.state.write().await;
        match state.comments.iter_mut().find(|c| c.id == id) {
            Some(slot) => *slot = updated.clone(),
            None => tracing::debug!("Updated comment {} is no longer listed", id),
        }

        Ok(updated)
    }

    /// Deletes a comment. The caller is responsible for confirming with the user first.
    pub async fn delete_comment(&self, id: CommentId) -> AppResult<()> {
        let Some(_guard) = self.claim(id) else {
            return Err(self.mutation_failed(
                MutationAction::Delete,
                Some(id),
                AppError::MutationInFlight(id),
            ));
        };

        if let Err(e) = self.gateway.delete(id).await {
            return Err(self.mutation_failed(MutationAction::Delete, Some(id), e.into()));
        }
        tracing::info!("Deleted comment {}", id);

        self.state.write().await.comments.retain(|c| c.id != id);
        Ok(())
    }

    pub async fn dispatch(&self, intent: Intent) -> AppResult<()> {
        match intent {
            Intent::Add(text) => self.add_comment(&text).await.map(|_| ()),
            Intent::Update(id, text) => self.update_comment(id, &text).await.map(|_| ()),
            Intent::Delete(id) => self.delete_comment(id).await,
            Intent::ToggleSortField => self.toggle_sort_field().await,
            Intent::ToggleSortOrder => self.toggle_sort_order().await,
            Intent::Reload => self.reload().await,
        }
    }

    async fn contains(&self, id: CommentId) -> bool {
        self.state.read().await.comments.iter().any(|c| c.id == id)
    }

    fn claim(&self, id: CommentId) -> Option<InFlightGuard<'_>> {
        self.in_flight.insert(id).then(|| InFlightGuard {
            in_flight: &self.in_flight,
            id,
        })
    }

    fn mutation_failed(
        &self,
        action: MutationAction,
        comment_id: Option<CommentId>,
        error: AppError,
    ) -> AppError {
        match comment_id {
            Some(id) => tracing::error!("Failed to {} comment {}: {}", action.verb(), id, error),
            None => tracing::error!("Failed to {} comment: {}", action.verb(), error),
        }

        self.notifier.notify(Notification {
            action,
            comment_id,
            detail: error.to_string(),
        });
        error
    }

    fn read_preference<T>(&self, key: &str) -> Option<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.preferences.get(key) {
            Ok(Some(value)) => match value.parse() {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    tracing::warn!("Ignoring stored {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read preference {}: {}", key, e);
                None
            }
        }
    }

    fn write_preference(&self, key: &str, value: &str) {
        if let Err(e) = self.preferences.set(key, value) {
            tracing::warn!("Failed to save preference {}: {}", key, e);
        }
    }
}

fn dedup_by_id(comments: Vec<Comment>) -> Vec<Comment> {
    let mut seen = HashSet::with_capacity(comments.len());
    let total = comments.len();
    let unique: Vec<Comment> = comments.into_iter().filter(|c| seen.insert(c.id)).collect();
    if unique.len() != total {
        tracing::warn!(
            "Server returned {} duplicate comment ids",
            total - unique.len()
        );
    }
    unique
}
