pub mod admin;
pub mod app;
pub mod backend;
pub mod catalog;
pub mod contact;
mod diag;
pub mod editor;
pub mod net_client;
pub mod session;
mod storage;
pub mod surface;

#[cfg(target_family = "wasm")]
mod bridge;
#[cfg(target_family = "wasm")]
mod dom;

#[cfg(test)]
mod memory;
#[cfg(test)]
mod testing;

use wasm_bindgen::prelude::*;

/// WASM entry point. Boots once the document has parsed.
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        boot::when_ready();
    }
}

#[cfg(target_family = "wasm")]
mod boot {
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;

    use crate::app::{App, Context, PageFeatures};
    use crate::backend::{AuthClient, CollectionClient};
    use crate::catalog::AcknowledgePurchase;
    use crate::dom::{CONTACT_FORM, DomSurface, LOGIN_FORM};
    use crate::net_client::HttpBackend;
    use crate::surface::Surface;
    use crate::{bridge, diag};

    pub fn when_ready() {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if document.ready_state() != "loading" {
            run(document);
            return;
        }
        let ready = Closure::once(move || {
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                run(document);
            }
        });
        if document
            .add_event_listener_with_callback("DOMContentLoaded", ready.as_ref().unchecked_ref())
            .is_err()
        {
            diag::console_warn!("could not wait for DOMContentLoaded");
        }
        ready.forget();
    }

    fn run(document: web_sys::Document) {
        let origin = document
            .location()
            .and_then(|l| l.origin().ok())
            .unwrap_or_default();
        let dom = Rc::new(DomSurface::new(document));
        let features = PageFeatures {
            storefront: dom.games_container().is_some(),
            contact: dom.by_id(CONTACT_FORM).is_some(),
            admin: dom.by_id(LOGIN_FORM).is_some(),
        };

        let http = HttpBackend::new(&origin);
        let surface: Rc<dyn Surface> = Rc::clone(&dom) as Rc<dyn Surface>;
        let games: Rc<dyn CollectionClient> = Rc::new(http.clone());
        let auth: Rc<dyn AuthClient> = Rc::new(http);
        let ctx = Context {
            games,
            auth,
            purchases: Rc::new(AcknowledgePurchase::new(Rc::clone(&surface))),
            surface,
        };

        let app = Rc::new(App::new(ctx, features));
        bridge::attach(&app, &dom);
        app.start();
        diag::console_log!("gamestore client ready ({features:?})");
    }
}
