//! In-process backend used to drive the components in native tests.

use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use gamestore_core::game::{GameDoc, GameFields, GameId};
use gamestore_core::session::User;
use gamestore_core::snapshot::Snapshot;

use crate::backend::{
    AuthClient, ClientError, CollectionClient, Listeners, SnapshotResult, Subscription,
};

#[derive(Default)]
struct Store {
    games: Vec<GameDoc>,
    version: u64,
    next_id: u64,
    accounts: Vec<(String, String)>,
    user: Option<User>,
    fail_next: Option<ClientError>,
    hold: Option<oneshot::Receiver<()>>,
    calls: Vec<String>,
}

/// Collection and identity provider backed by a `Vec`.
///
/// Mutations apply immediately and notify subscribers before the returned
/// future resolves, like a local-first client SDK. An injected
/// `Unauthorized` failure ends the session, as a rejected token would.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    store: Rc<RefCell<Store>>,
    snapshots: Rc<Listeners<SnapshotResult>>,
    auth: Rc<Listeners<Option<User>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, email: &str, password: &str) -> Self {
        self.store
            .borrow_mut()
            .accounts
            .push((email.to_string(), password.to_string()));
        self
    }

    /// Insert without going through the client API.
    pub fn seed(&self, fields: GameFields) -> GameId {
        let id = self.store.borrow_mut().push(fields);
        self.publish();
        id
    }

    /// Replace a stored record verbatim, bypassing validation.
    pub fn overwrite(&self, doc: GameDoc) {
        {
            let mut store = self.store.borrow_mut();
            match store.games.iter_mut().find(|g| g.id == doc.id) {
                Some(existing) => *existing = doc,
                None => store.games.push(doc),
            }
        }
        self.publish();
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: ClientError) {
        self.store.borrow_mut().fail_next = Some(error);
    }

    /// Keep the next call's future pending until the returned sender fires
    /// or is dropped.
    pub fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.store.borrow_mut().hold = Some(rx);
        tx
    }

    /// Push an error to every snapshot subscriber.
    pub fn break_stream(&self, error: ClientError) {
        self.snapshots.notify(Err(error));
    }

    /// Simulate the provider ending the session on its own.
    pub fn expire_session(&self) {
        self.store.borrow_mut().user = None;
        self.auth.notify(None);
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.borrow().snapshot()
    }

    pub fn snapshot_subscribers(&self) -> usize {
        self.snapshots.len()
    }

    /// Names of the backend operations invoked so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.store.borrow().calls.clone()
    }

    fn publish(&self) {
        let snapshot = {
            let mut store = self.store.borrow_mut();
            store.version += 1;
            store.snapshot()
        };
        self.snapshots.notify(Ok(snapshot));
    }

    /// Record the call and take any injected failure.
    fn begin(&self, call: &str) -> Result<(), ClientError> {
        let (error, ended) = {
            let mut store = self.store.borrow_mut();
            store.calls.push(call.to_string());
            let error = store.fail_next.take();
            let ended = matches!(error, Some(ClientError::Unauthorized(_)))
                && store.user.take().is_some();
            (error, ended)
        };
        if ended {
            self.auth.notify(None);
        }
        match error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Hand back `result`, after any hold placed by `hold_next` is released.
    fn finish<T: 'static>(
        &self,
        result: Result<T, ClientError>,
    ) -> LocalBoxFuture<'static, Result<T, ClientError>> {
        let hold = self.store.borrow_mut().hold.take();
        async move {
            if let Some(rx) = hold {
                let _ = rx.await;
            }
            result
        }
        .boxed_local()
    }
}

impl Store {
    fn push(&mut self, fields: GameFields) -> GameId {
        self.next_id += 1;
        let id = format!("doc{}", self.next_id);
        self.games.push(GameDoc {
            id: id.clone(),
            fields,
        });
        id
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: self.version,
            games: self.games.clone(),
        }
    }
}

impl CollectionClient for MemoryBackend {
    fn subscribe(&self, on_change: Box<dyn Fn(SnapshotResult)>) -> Subscription {
        on_change(Ok(self.snapshot()));
        self.snapshots.add(on_change)
    }

    fn get(&self, id: &str) -> LocalBoxFuture<'static, Result<Option<GameDoc>, ClientError>> {
        let result = self
            .begin("get")
            .map(|()| self.store.borrow().games.iter().find(|g| g.id == id).cloned());
        self.finish(result)
    }

    fn insert(&self, fields: GameFields) -> LocalBoxFuture<'static, Result<GameId, ClientError>> {
        let result = self.begin("insert").and_then(|()| {
            fields.validate()?;
            let id = self.store.borrow_mut().push(fields);
            self.publish();
            Ok(id)
        });
        self.finish(result)
    }

    fn update(
        &self,
        id: &str,
        fields: GameFields,
    ) -> LocalBoxFuture<'static, Result<(), ClientError>> {
        let result = self.begin("update").and_then(|()| {
            fields.validate()?;
            {
                let mut store = self.store.borrow_mut();
                let doc = store
                    .games
                    .iter_mut()
                    .find(|g| g.id == id)
                    .ok_or(ClientError::NotFound)?;
                doc.fields = fields;
            }
            self.publish();
            Ok(())
        });
        self.finish(result)
    }

    fn delete(&self, id: &str) -> LocalBoxFuture<'static, Result<(), ClientError>> {
        let result = self.begin("delete").and_then(|()| {
            {
                let mut store = self.store.borrow_mut();
                let before = store.games.len();
                store.games.retain(|g| g.id != id);
                if store.games.len() == before {
                    return Err(ClientError::NotFound);
                }
            }
            self.publish();
            Ok(())
        });
        self.finish(result)
    }
}

impl AuthClient for MemoryBackend {
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> LocalBoxFuture<'static, Result<User, ClientError>> {
        let result = self.begin("sign_in").and_then(|()| {
            let known = self
                .store
                .borrow()
                .accounts
                .iter()
                .any(|(e, p)| e.eq_ignore_ascii_case(email) && p == password);
            if !known {
                return Err(ClientError::Unauthorized(
                    "invalid email or password".to_string(),
                ));
            }
            let user = User {
                email: email.to_lowercase(),
            };
            self.store.borrow_mut().user = Some(user.clone());
            self.auth.notify(Some(user.clone()));
            Ok(user)
        });
        self.finish(result)
    }

    fn sign_out(&self) -> LocalBoxFuture<'static, Result<(), ClientError>> {
        let result = self.begin("sign_out").map(|()| {
            self.store.borrow_mut().user = None;
            self.auth.notify(None);
        });
        self.finish(result)
    }

    fn observe(&self, on_change: Box<dyn Fn(Option<User>)>) -> Subscription {
        let current = self.store.borrow().user.clone();
        on_change(current);
        self.auth.add(on_change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use gamestore_core::test_helpers::make_fields;

    #[test]
    fn subscribe_delivers_current_then_changes() {
        let backend = MemoryBackend::new();
        backend.seed(make_fields("Chess", 1.0));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_cb = Rc::clone(&seen);
        let sub = backend.subscribe(Box::new(move |s: SnapshotResult| {
            seen_cb.borrow_mut().push(s.map(|s| s.len()));
        }));

        block_on(backend.insert(make_fields("Go", 2.0))).unwrap();
        drop(sub);
        block_on(backend.insert(make_fields("Shogi", 3.0))).unwrap();

        assert_eq!(*seen.borrow(), vec![Ok(1), Ok(2)]);
        assert_eq!(backend.snapshot_subscribers(), 0);
    }

    #[test]
    fn version_increases_on_every_change() {
        let backend = MemoryBackend::new();
        let id = backend.seed(make_fields("Chess", 1.0));
        let v1 = backend.snapshot().version;
        block_on(backend.update(&id, make_fields("Chess", 2.0))).unwrap();
        let v2 = backend.snapshot().version;
        block_on(backend.delete(&id)).unwrap();
        assert!(v1 < v2 && v2 < backend.snapshot().version);
    }

    #[test]
    fn injected_failure_applies_once() {
        let backend = MemoryBackend::new();
        backend.fail_next(ClientError::Network("offline".into()));
        assert!(block_on(backend.insert(make_fields("Chess", 1.0))).is_err());
        assert!(backend.snapshot().is_empty());
        assert!(block_on(backend.insert(make_fields("Chess", 1.0))).is_ok());
    }

    #[test]
    fn injected_unauthorized_ends_session() {
        let backend = MemoryBackend::new().with_account("a@b.c", "pw");
        block_on(backend.sign_in("a@b.c", "pw")).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_cb = Rc::clone(&seen);
        let _sub = backend.observe(Box::new(move |u: Option<User>| {
            seen_cb.borrow_mut().push(u.is_some());
        }));

        backend.fail_next(ClientError::Unauthorized("session expired".into()));
        assert!(block_on(backend.delete("doc1")).is_err());
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn held_call_resolves_after_release() {
        let backend = MemoryBackend::new();
        let release = backend.hold_next();
        let mut pending = backend.insert(make_fields("Chess", 1.0));
        assert!(pending.as_mut().now_or_never().is_none());
        assert_eq!(backend.snapshot().len(), 1);

        release.send(()).unwrap();
        assert!(block_on(pending).is_ok());
        assert!(block_on(backend.insert(make_fields("Go", 1.0))).is_ok());
    }

    #[test]
    fn sign_in_checks_password() {
        let backend = MemoryBackend::new().with_account("a@b.c", "pw");
        assert!(matches!(
            block_on(backend.sign_in("a@b.c", "wrong")),
            Err(ClientError::Unauthorized(_))
        ));
        assert_eq!(block_on(backend.sign_in("A@b.c", "pw")).unwrap().email, "a@b.c");
    }
}
