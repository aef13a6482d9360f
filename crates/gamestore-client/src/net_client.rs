use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use gamestore_core::game::{GameDoc, GameFields, GameId};
use gamestore_core::net::messages::{
    ErrorBody, InsertResponse, SessionResponse, SignInRequest, SignInResponse,
};
use gamestore_core::net::protocol::{
    API_PREFIX, SNAPSHOT_STREAM_PATH, decode_json, encode_json,
};
use gamestore_core::session::User;
use serde::Deserialize;

use crate::backend::{
    AuthClient, ClientError, CollectionClient, Listeners, SnapshotResult, Subscription,
};
use crate::diag;
use crate::storage;

/// REST + SSE client for the gamestore server.
/// Uses Rc<RefCell> because WASM is single-threaded.
#[derive(Clone)]
pub struct HttpBackend {
    inner: Rc<Inner>,
}

struct Inner {
    api_base: String,
    token: RefCell<Option<String>>,
    auth: Rc<Listeners<Option<User>>>,
}

impl HttpBackend {
    /// `origin` is the page origin, e.g. `https://shop.example.com`.
    pub fn new(origin: &str) -> Self {
        Self {
            inner: Rc::new(Inner {
                api_base: format!("{}{API_PREFIX}", origin.trim_end_matches('/')),
                token: RefCell::new(storage::load_session_token()),
                auth: Rc::new(Listeners::default()),
            }),
        }
    }
}

impl Inner {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    fn set_token(&self, token: Option<String>) {
        storage::store_session_token(token.as_deref());
        *self.token.borrow_mut() = token;
    }

    /// Forget the stored token and tell observers, if there was one.
    fn end_session(&self) {
        let had_token = self.token.borrow().is_some();
        if had_token {
            self.set_token(None);
            self.auth.notify(None);
        }
    }

    async fn call(
        &self,
        method: &'static str,
        path: &str,
        body: Option<String>,
    ) -> Result<String, ClientError> {
        let token = self.token.borrow().clone();
        let (status, text) = fetch(method, &self.url(path), token.as_deref(), body.as_deref()).await?;
        self.settle(status, text)
    }

    /// Turn a response into the body text or an error. A 401 means the
    /// session is gone server-side, so observers are told right away.
    fn settle(&self, status: u16, text: String) -> Result<String, ClientError> {
        if (200..300).contains(&status) {
            return Ok(text);
        }
        let error = error_for_status(status, &text);
        if matches!(error, ClientError::Unauthorized(_)) {
            self.end_session();
        }
        Err(error)
    }
}

fn encode<T: serde::Serialize>(payload: &T) -> Result<String, ClientError> {
    encode_json(payload).map_err(|e| ClientError::Decode(e.to_string()))
}

fn decode<T: for<'de> Deserialize<'de>>(text: &str) -> Result<T, ClientError> {
    decode_json(text).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Map a non-2xx response to a client error, using the server's message
/// when the body carries one.
pub fn error_for_status(status: u16, body: &str) -> ClientError {
    let message = decode_json::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string());
    match status {
        401 => ClientError::Unauthorized(message),
        404 => ClientError::NotFound,
        _ => ClientError::Server { status, message },
    }
}

/// Path of one game, with the id percent-encoded as a single segment.
pub fn game_path(id: &str) -> String {
    format!("/games/{}", urlencoding::encode(id))
}

impl CollectionClient for HttpBackend {
    fn subscribe(&self, on_change: Box<dyn Fn(SnapshotResult)>) -> Subscription {
        open_stream(&self.inner.url(SNAPSHOT_STREAM_PATH), Rc::from(on_change))
    }

    fn get(&self, id: &str) -> LocalBoxFuture<'static, Result<Option<GameDoc>, ClientError>> {
        let inner = Rc::clone(&self.inner);
        let path = game_path(id);
        async move {
            match inner.call("GET", &path, None).await {
                Ok(text) => decode(&text).map(Some),
                Err(ClientError::NotFound) => Ok(None),
                Err(e) => Err(e),
            }
        }
        .boxed_local()
    }

    fn insert(&self, fields: GameFields) -> LocalBoxFuture<'static, Result<GameId, ClientError>> {
        let inner = Rc::clone(&self.inner);
        async move {
            let body = encode(&fields)?;
            let text = inner.call("POST", "/games", Some(body)).await?;
            let created: InsertResponse = decode(&text)?;
            Ok(created.id)
        }
        .boxed_local()
    }

    fn update(
        &self,
        id: &str,
        fields: GameFields,
    ) -> LocalBoxFuture<'static, Result<(), ClientError>> {
        let inner = Rc::clone(&self.inner);
        let path = game_path(id);
        async move {
            let body = encode(&fields)?;
            inner.call("PUT", &path, Some(body)).await.map(|_| ())
        }
        .boxed_local()
    }

    fn delete(&self, id: &str) -> LocalBoxFuture<'static, Result<(), ClientError>> {
        let inner = Rc::clone(&self.inner);
        let path = game_path(id);
        async move { inner.call("DELETE", &path, None).await.map(|_| ()) }.boxed_local()
    }
}

impl AuthClient for HttpBackend {
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> LocalBoxFuture<'static, Result<User, ClientError>> {
        let inner = Rc::clone(&self.inner);
        let request = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        async move {
            let body = encode(&request)?;
            let text = inner.call("POST", "/auth/sign-in", Some(body)).await?;
            let response: SignInResponse = decode(&text)?;
            inner.set_token(Some(response.token));
            inner.auth.notify(Some(response.user.clone()));
            Ok(response.user)
        }
        .boxed_local()
    }

    fn sign_out(&self) -> LocalBoxFuture<'static, Result<(), ClientError>> {
        let inner = Rc::clone(&self.inner);
        async move {
            let result = inner.call("POST", "/auth/sign-out", None).await.map(|_| ());
            inner.end_session();
            result
        }
        .boxed_local()
    }

    fn observe(&self, on_change: Box<dyn Fn(Option<User>)>) -> Subscription {
        let has_token = self.inner.token.borrow().is_some();
        if !has_token {
            on_change(None);
            return self.inner.auth.add(on_change);
        }

        let subscription = self.inner.auth.add(on_change);
        let inner = Rc::clone(&self.inner);
        spawn(async move {
            match inner.call("GET", "/auth/session", None).await {
                Ok(text) => match decode::<SessionResponse>(&text) {
                    Ok(SessionResponse { user: Some(user) }) => inner.auth.notify(Some(user)),
                    Ok(SessionResponse { user: None }) => inner.end_session(),
                    Err(e) => diag::console_warn!("bad session response: {e}"),
                },
                Err(e) => diag::console_warn!("session check failed: {e}"),
            }
        });
        subscription
    }
}

#[cfg(target_family = "wasm")]
fn spawn(task: impl Future<Output = ()> + 'static) {
    wasm_bindgen_futures::spawn_local(task);
}

/// Stub for non-WASM targets (native check only).
#[cfg(not(target_family = "wasm"))]
fn spawn(task: impl Future<Output = ()> + 'static) {
    drop(task);
}

#[cfg(target_family = "wasm")]
fn js_error(e: wasm_bindgen::JsValue) -> ClientError {
    ClientError::Network(format!("{e:?}"))
}

/// Perform one request and return the status and body text.
#[cfg(target_family = "wasm")]
async fn fetch(
    method: &str,
    url: &str,
    token: Option<&str>,
    body: Option<&str>,
) -> Result<(u16, String), ClientError> {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    let init = web_sys::RequestInit::new();
    init.set_method(method);
    if let Some(body) = body {
        init.set_body(&JsValue::from_str(body));
    }
    let request = web_sys::Request::new_with_str_and_init(url, &init).map_err(js_error)?;
    let headers = request.headers();
    headers.set("Accept", "application/json").map_err(js_error)?;
    if body.is_some() {
        headers
            .set("Content-Type", "application/json")
            .map_err(js_error)?;
    }
    if let Some(token) = token {
        headers
            .set("Authorization", &format!("Bearer {token}"))
            .map_err(js_error)?;
    }

    let window = web_sys::window().ok_or_else(|| ClientError::Network("no window".into()))?;
    let response: web_sys::Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_error)?
        .dyn_into()
        .map_err(js_error)?;
    let text = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?;
    Ok((response.status(), text.as_string().unwrap_or_default()))
}

/// Stub for non-WASM targets (native check only).
#[cfg(not(target_family = "wasm"))]
async fn fetch(
    _method: &str,
    _url: &str,
    _token: Option<&str>,
    _body: Option<&str>,
) -> Result<(u16, String), ClientError> {
    Err(ClientError::Network("HTTP backend needs a browser".into()))
}

/// Open an EventSource on the snapshot stream. The browser reconnects on
/// its own; the server resends the full snapshot on every connect.
#[cfg(target_family = "wasm")]
fn open_stream(url: &str, on_change: Rc<dyn Fn(SnapshotResult)>) -> Subscription {
    use gamestore_core::net::protocol::{SNAPSHOT_EVENT, decode_snapshot};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;

    let source = match web_sys::EventSource::new(url) {
        Ok(source) => source,
        Err(e) => {
            on_change(Err(js_error(e)));
            return Subscription::detached();
        },
    };

    let on_data = Rc::clone(&on_change);
    let on_snapshot =
        Closure::<dyn FnMut(web_sys::MessageEvent)>::new(move |evt: web_sys::MessageEvent| {
            let result = match evt.data().as_string() {
                Some(data) => decode_snapshot(&data).map_err(|e| ClientError::Decode(e.to_string())),
                None => Err(ClientError::Decode("snapshot event without text".into())),
            };
            on_data(result);
        });
    if let Err(e) = source
        .add_event_listener_with_callback(SNAPSHOT_EVENT, on_snapshot.as_ref().unchecked_ref())
    {
        on_change(Err(js_error(e)));
    }

    let on_failure = Rc::clone(&on_change);
    let watched = source.clone();
    let on_error = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
        let closed = watched.ready_state() == web_sys::EventSource::CLOSED;
        on_failure(Err(stream_error(closed)));
    });
    source.set_onerror(Some(on_error.as_ref().unchecked_ref()));

    Subscription::new(move || {
        source.close();
        source.set_onerror(None);
        let _ = source.remove_event_listener_with_callback(
            SNAPSHOT_EVENT,
            on_snapshot.as_ref().unchecked_ref(),
        );
        drop(on_snapshot);
        drop(on_error);
    })
}

/// Error reported when the snapshot stream fails. The browser retries on
/// its own unless it has already closed the connection for good.
#[cfg(any(target_family = "wasm", test))]
fn stream_error(closed: bool) -> ClientError {
    if closed {
        ClientError::Network("live updates stopped; reload the page to retry".into())
    } else {
        ClientError::Network("live updates interrupted, reconnecting".into())
    }
}

/// Stub for non-WASM targets (native check only).
#[cfg(not(target_family = "wasm"))]
fn open_stream(_url: &str, on_change: Rc<dyn Fn(SnapshotResult)>) -> Subscription {
    on_change(Err(ClientError::Network(
        "snapshot stream needs a browser".into(),
    )));
    Subscription::detached()
}
