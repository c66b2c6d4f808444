//! Post sync controller: initial load and per-operation reconciliation.
//!
//! Create and update deliberately reconcile by refetching the whole list
//! instead of merging the server echo locally. The refetch guarantees the
//! local cache carries the server-assigned id, timestamp, and ordering;
//! delete is the one operation that mutates the cache in place, since a
//! delete has no payload to reconcile against.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures_util::future;
use thiserror::Error;

use postboard_shared::{ApiError, Post, User};

use crate::api_client::ApiClient;
use crate::session::SessionStore;
use crate::{log_debug, log_warn};

const LOAD_FALLBACK: &str = "Could not load your data.";
const POSTS_FALLBACK: &str = "Could not load your posts.";
const CREATE_FALLBACK: &str = "Could not create the post.";
const UPDATE_FALLBACK: &str = "Could not update the post.";
const DELETE_FALLBACK: &str = "Could not delete the post.";
const EMPTY_POST: &str = "Title and content are required.";
const CONNECTION_FAILED: &str = "Could not reach the server. Please try again.";

/// Input buffer for a post that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}

/// Edit-in-progress buffer mirroring one existing post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostEdit {
    pub id: i64,
    pub title: String,
    pub content: String,
}

/// User-facing synchronization failure. Every failure leaves the controller
/// in a well-defined, retryable state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// A local precondition failed; no request was issued.
    #[error("{0}")]
    Validation(String),
    /// The stored token was rejected. The session has already been cleared;
    /// the caller must redirect to the login view.
    #[error("Your session has expired. Please sign in again.")]
    SessionInvalidated,
    /// The server rejected the operation; local state is unchanged.
    #[error("{0}")]
    Operation(String),
    /// No response was received from the server.
    #[error("{0}")]
    Connection(String),
}

/// Outcome of a combined profile + posts load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Both fetches succeeded.
    Loaded,
    /// The profile loaded but the post list could not be fetched. Partial
    /// success: the profile is published, the message is posts-only.
    PostsFailed(String),
}

/// Keeps the local profile and post cache consistent with server state.
pub struct PostSyncController {
    api: ApiClient,
    session: Rc<SessionStore>,
    user: RefCell<Option<User>>,
    posts: RefCell<Vec<Post>>,
    draft: RefCell<PostDraft>,
    edit: RefCell<Option<PostEdit>>,
    loading: Cell<bool>,
    mutating: Cell<bool>,
}

impl PostSyncController {
    pub fn new(api: ApiClient, session: Rc<SessionStore>) -> Self {
        Self {
            api,
            session,
            user: RefCell::new(None),
            posts: RefCell::new(Vec::new()),
            draft: RefCell::new(PostDraft::default()),
            edit: RefCell::new(None),
            loading: Cell::new(false),
            mutating: Cell::new(false),
        }
    }

    // --- State exposed to the view layer ---

    pub fn user(&self) -> Option<User> {
        self.user.borrow().clone()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.posts.borrow().clone()
    }

    pub fn draft(&self) -> PostDraft {
        self.draft.borrow().clone()
    }

    pub fn editing(&self) -> Option<PostEdit> {
        self.edit.borrow().clone()
    }

    /// Whether a combined load is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    /// Whether a create/update/delete is outstanding. The view must disable
    /// re-submission while this is set.
    pub fn is_mutating(&self) -> bool {
        self.mutating.get()
    }

    // --- Input buffers ---

    pub fn update_draft(&self, title: impl Into<String>, content: impl Into<String>) {
        *self.draft.borrow_mut() = PostDraft {
            title: title.into(),
            content: content.into(),
        };
    }

    /// Start editing the given post, copying its current fields into the
    /// edit buffer. Returns `false` if the post is not in the local cache.
    pub fn begin_edit(&self, id: i64) -> bool {
        let posts = self.posts.borrow();
        let Some(post) = posts.iter().find(|p| p.id == id) else {
            return false;
        };
        *self.edit.borrow_mut() = Some(PostEdit {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
        });
        true
    }

    pub fn update_edit(&self, title: impl Into<String>, content: impl Into<String>) {
        if let Some(edit) = self.edit.borrow_mut().as_mut() {
            edit.title = title.into();
            edit.content = content.into();
        }
    }

    /// Discard the edit buffer without submitting.
    pub fn cancel_edit(&self) {
        self.edit.borrow_mut().take();
    }

    /// Drop all local mirrors and buffers. Called on session teardown.
    pub fn reset(&self) {
        self.user.borrow_mut().take();
        self.posts.borrow_mut().clear();
        *self.draft.borrow_mut() = PostDraft::default();
        self.edit.borrow_mut().take();
    }

    // --- Synchronization ---

    /// Fetch profile and posts concurrently and publish both.
    ///
    /// A 401 on the profile fetch is fatal: the session is cleared, local
    /// state dropped, and the posts outcome ignored, whatever it was. A posts
    /// failure alone still publishes the profile and reports
    /// [`LoadOutcome::PostsFailed`].
    pub async fn load_all(&self) -> Result<LoadOutcome, SyncError> {
        let Some(token) = self.session.get() else {
            return Err(SyncError::SessionInvalidated);
        };

        self.loading.set(true);
        let (profile, posts) = future::join(
            self.api.fetch_profile(&token),
            self.api.fetch_my_posts(&token),
        )
        .await;
        self.loading.set(false);

        let user = match profile {
            Ok(user) => user,
            Err(err) if err.is_unauthorized() => {
                self.session.clear();
                self.reset();
                return Err(SyncError::SessionInvalidated);
            }
            Err(ApiError::Network(msg)) => {
                log_warn!("profile fetch did not reach the server: {msg}");
                return Err(SyncError::Connection(CONNECTION_FAILED.to_string()));
            }
            Err(err) => {
                return Err(SyncError::Operation(
                    err.server_message()
                        .unwrap_or_else(|| LOAD_FALLBACK.to_string()),
                ));
            }
        };
        *self.user.borrow_mut() = Some(user);

        match posts {
            Ok(list) => {
                *self.posts.borrow_mut() = list;
                Ok(LoadOutcome::Loaded)
            }
            Err(err) => {
                // Failed reconciliation must not leave stale entries behind
                self.posts.borrow_mut().clear();
                log_warn!("post list fetch failed: {err}");
                Ok(LoadOutcome::PostsFailed(
                    err.server_message()
                        .unwrap_or_else(|| POSTS_FALLBACK.to_string()),
                ))
            }
        }
    }

    /// Submit the current draft.
    ///
    /// On success the draft is discarded and the list reconciled by refetch;
    /// on failure the draft is preserved so the user can retry.
    pub async fn create_post(&self) -> Result<(), SyncError> {
        let draft = self.draft.borrow().clone();
        if draft.title.trim().is_empty() || draft.content.trim().is_empty() {
            return Err(SyncError::Validation(EMPTY_POST.to_string()));
        }
        let Some(token) = self.session.get() else {
            return Err(SyncError::SessionInvalidated);
        };
        if !self.begin_mutation() {
            return Ok(());
        }

        // The slot stays claimed through the reconciling refetch, so nothing
        // can race against the reload
        let outcome = match self.api.create_post(&token, &draft.title, &draft.content).await {
            Ok(()) => {
                *self.draft.borrow_mut() = PostDraft::default();
                self.reconcile().await
            }
            Err(err) => Err(Self::mutation_error(err, CREATE_FALLBACK)),
        };
        self.mutating.set(false);
        outcome
    }

    /// Submit the current edit buffer.
    ///
    /// On success the buffer is closed and the list reconciled by refetch; on
    /// failure the buffer is preserved.
    pub async fn update_post(&self) -> Result<(), SyncError> {
        let Some(edit) = self.edit.borrow().clone() else {
            return Err(SyncError::Validation(EMPTY_POST.to_string()));
        };
        if edit.title.trim().is_empty() || edit.content.trim().is_empty() {
            return Err(SyncError::Validation(EMPTY_POST.to_string()));
        }
        let Some(token) = self.session.get() else {
            return Err(SyncError::SessionInvalidated);
        };
        if !self.begin_mutation() {
            return Ok(());
        }

        let outcome = match self
            .api
            .update_post(&token, edit.id, &edit.title, &edit.content)
            .await
        {
            Ok(()) => {
                self.edit.borrow_mut().take();
                self.reconcile().await
            }
            Err(err) => Err(Self::mutation_error(err, UPDATE_FALLBACK)),
        };
        self.mutating.set(false);
        outcome
    }

    /// Delete a post.
    ///
    /// On a 2xx the entry is removed from the local cache directly, without a
    /// refetch; on failure the cache is left untouched.
    pub async fn delete_post(&self, id: i64) -> Result<(), SyncError> {
        let Some(token) = self.session.get() else {
            return Err(SyncError::SessionInvalidated);
        };
        if !self.begin_mutation() {
            return Ok(());
        }

        let outcome = match self.api.delete_post(&token, id).await {
            Ok(()) => {
                self.posts.borrow_mut().retain(|p| p.id != id);
                // An edit buffer pointing at the deleted post is now orphaned
                let orphaned = self.edit.borrow().as_ref().is_some_and(|e| e.id == id);
                if orphaned {
                    self.edit.borrow_mut().take();
                }
                Ok(())
            }
            Err(err) => Err(Self::mutation_error(err, DELETE_FALLBACK)),
        };
        self.mutating.set(false);
        outcome
    }

    /// Claim the mutation slot. Mutations are serialized per view: a second
    /// one started while the first is outstanding is ignored, not queued.
    fn begin_mutation(&self) -> bool {
        if self.mutating.replace(true) {
            log_debug!("mutation ignored: another one is in flight");
            return false;
        }
        true
    }

    async fn reconcile(&self) -> Result<(), SyncError> {
        match self.load_all().await? {
            LoadOutcome::Loaded => Ok(()),
            LoadOutcome::PostsFailed(msg) => Err(SyncError::Operation(msg)),
        }
    }

    fn mutation_error(err: ApiError, fallback: &str) -> SyncError {
        match err {
            ApiError::Network(msg) => {
                log_warn!("mutation did not reach the server: {msg}");
                SyncError::Connection(CONNECTION_FAILED.to_string())
            }
            err => SyncError::Operation(
                err.server_message().unwrap_or_else(|| fallback.to_string()),
            ),
        }
    }
}
