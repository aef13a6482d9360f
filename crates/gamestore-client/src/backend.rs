use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::future::LocalBoxFuture;
use gamestore_core::game::{GameDoc, GameFields, GameId, ValidationError};
use gamestore_core::session::User;
use gamestore_core::snapshot::Snapshot;

/// Errors surfaced by backend calls.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("game not found")]
    NotFound,
    #[error("{0}")]
    Unauthorized(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

pub type SnapshotResult = Result<Snapshot, ClientError>;

/// Remote document collection the views render from.
///
/// Futures are `'static` so they can be handed to `spawn_local`;
/// implementations clone their shared state into them.
pub trait CollectionClient {
    /// Deliver the current snapshot and every later change until the
    /// returned handle is dropped.
    fn subscribe(&self, on_change: Box<dyn Fn(SnapshotResult)>) -> Subscription;
    fn get(&self, id: &str) -> LocalBoxFuture<'static, Result<Option<GameDoc>, ClientError>>;
    fn insert(&self, fields: GameFields) -> LocalBoxFuture<'static, Result<GameId, ClientError>>;
    fn update(&self, id: &str, fields: GameFields)
    -> LocalBoxFuture<'static, Result<(), ClientError>>;
    fn delete(&self, id: &str) -> LocalBoxFuture<'static, Result<(), ClientError>>;
}

/// Email/password identity provider.
pub trait AuthClient {
    fn sign_in(&self, email: &str, password: &str)
    -> LocalBoxFuture<'static, Result<User, ClientError>>;
    fn sign_out(&self) -> LocalBoxFuture<'static, Result<(), ClientError>>;
    /// Report the current auth state, then every change.
    fn observe(&self, on_change: Box<dyn Fn(Option<User>)>) -> Subscription;
}

/// Cancels a live subscription when dropped.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle with nothing to tear down.
    pub fn detached() -> Self {
        Self { cancel: None }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("live", &self.cancel.is_some())
            .finish()
    }
}

/// Callback registry shared by backend implementations.
///
/// `notify` snapshots the callback list before calling out, so callbacks may
/// add or remove listeners without a `RefCell` double borrow.
pub struct Listeners<T> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Rc<dyn Fn(T)>)>>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(0),
            entries: RefCell::new(Vec::new()),
        }
    }
}

impl<T: Clone + 'static> Listeners<T> {
    /// Register `callback` and return a handle that removes it on drop.
    pub fn add(self: &Rc<Self>, callback: Box<dyn Fn(T)>) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push((id, Rc::from(callback)));

        let weak: Weak<Self> = Rc::downgrade(self);
        Subscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                listeners.entries.borrow_mut().retain(|(i, _)| *i != id);
            }
        })
    }

    pub fn notify(&self, value: T) {
        let callbacks: Vec<Rc<dyn Fn(T)>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
