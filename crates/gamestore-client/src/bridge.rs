//! DOM event wiring. Every listener is attached exactly once at boot; the
//! card grid and the admin table use delegated click handlers on their
//! containers, so re-rendering never stacks listeners.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Element, Event, EventTarget};

use crate::app::App;
use crate::diag;
use crate::dom::{
    CONTACT_FORM, DomSurface, EMAIL_INPUT, GAME_FORM, LOGIN_FORM, LOGOUT_BUTTON, PASSWORD_INPUT,
    TABLE_BODY,
};

/// Attach `handler` for `event` on `target`. The page owns these listeners
/// for its whole lifetime, so the closure is leaked.
fn listen(target: &EventTarget, event: &str, handler: impl FnMut(Event) + 'static) {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
    {
        diag::console_warn!("could not attach {event} listener: {e:?}");
    }
    closure.forget();
}

/// The `data-id` of the closest ancestor of the event target matching
/// `selector`.
fn delegated_id(event: &Event, selector: &str) -> Option<String> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let control = target.closest(selector).ok()??;
    control.get_attribute("data-id")
}

pub fn attach(app: &Rc<App>, dom: &Rc<DomSurface>) {
    if app.features.storefront {
        attach_storefront(app, dom);
    }
    if app.features.contact {
        attach_contact(app, dom);
    }
    if app.features.admin {
        attach_admin(app, dom);
    }
}

fn attach_storefront(app: &Rc<App>, dom: &Rc<DomSurface>) {
    let Some(container) = dom.games_container() else {
        return;
    };
    let catalog = Rc::clone(&app.catalog);
    listen(&container, "click", move |event| {
        if let Some(id) = delegated_id(&event, ".buy-btn") {
            catalog.buy(&id);
        }
    });
}

fn attach_contact(app: &Rc<App>, dom: &Rc<DomSurface>) {
    let Some(form) = dom.by_id(CONTACT_FORM) else {
        return;
    };
    let app = Rc::clone(app);
    listen(&form, "submit", move |event| {
        event.prevent_default();
        app.contact.submit();
    });
}

fn attach_admin(app: &Rc<App>, dom: &Rc<DomSurface>) {
    if let Some(form) = dom.by_id(LOGIN_FORM) {
        let gate = Rc::clone(&app.gate);
        let dom = Rc::clone(dom);
        listen(&form, "submit", move |event| {
            event.prevent_default();
            let gate = Rc::clone(&gate);
            let email = dom.field_value(EMAIL_INPUT);
            let password = dom.field_value(PASSWORD_INPUT);
            wasm_bindgen_futures::spawn_local(async move {
                gate.sign_in(email, password).await;
            });
        });
    }

    if let Some(button) = dom.by_id(LOGOUT_BUTTON) {
        let gate = Rc::clone(&app.gate);
        listen(&button, "click", move |_| {
            let gate = Rc::clone(&gate);
            wasm_bindgen_futures::spawn_local(async move {
                gate.sign_out().await;
            });
        });
    }

    if let Some(form) = dom.by_id(GAME_FORM) {
        let editor = Rc::clone(&app.editor);
        let dom = Rc::clone(dom);
        listen(&form, "submit", move |event| {
            event.prevent_default();
            let editor = Rc::clone(&editor);
            let form = dom.read_editor();
            wasm_bindgen_futures::spawn_local(async move {
                editor.submit(form).await;
            });
        });
    }

    if let Some(body) = dom.by_id(TABLE_BODY) {
        let admin = Rc::clone(&app.admin);
        listen(&body, "click", move |event| {
            let admin = Rc::clone(&admin);
            if let Some(id) = delegated_id(&event, ".edit-btn") {
                wasm_bindgen_futures::spawn_local(async move {
                    admin.edit(&id).await;
                });
            } else if let Some(id) = delegated_id(&event, ".delete-btn") {
                wasm_bindgen_futures::spawn_local(async move {
                    admin.delete(&id).await;
                });
            }
        });
    }
}
