/// localStorage key holding the admin session token between page loads.
pub const SESSION_TOKEN_KEY: &str = "gamestore_session";

/// Calls the closure with browser localStorage, if available. No-op on non-WASM.
#[allow(unused_variables)]
fn with_local_storage<T>(f: impl FnOnce(&web_sys::Storage) -> Option<T>) -> Option<T> {
    #[cfg(target_family = "wasm")]
    {
        if let Some(window) = web_sys::window()
            && let Ok(Some(storage)) = window.local_storage()
        {
            return f(&storage);
        }
    }
    None
}

pub fn load_session_token() -> Option<String> {
    with_local_storage(|s| s.get_item(SESSION_TOKEN_KEY).ok().flatten())
}

pub fn store_session_token(token: Option<&str>) {
    with_local_storage(|s| {
        let result = match token {
            Some(token) => s.set_item(SESSION_TOKEN_KEY, token),
            None => s.remove_item(SESSION_TOKEN_KEY),
        };
        if result.is_err() {
            crate::diag::console_warn!("could not persist session token");
        }
        Some(())
    });
}
