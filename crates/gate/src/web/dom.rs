use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, Event, HtmlElement};

use crate::{LogoutHandler, NavbarState, PageSurface, UserSlot};

const LOGIN_BUTTON_ID: &str = "loginBtn";
const SIGNUP_BUTTON_ID: &str = "signupBtn";
const LOGOUT_BUTTON_ID: &str = "logoutBtn";
const ADMIN_LINK_ID: &str = "adminDashboardLink";
const GREETING_ID: &str = "userGreeting";
const NAV_ACTIONS_SELECTOR: &str = ".navbar-nav";

/// The live page. Missing elements are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomSurface;

fn document() -> Option<Document> {
    web_sys::window().and_then(|w| w.document())
}

fn set_visible(document: &Document, id: &str, visible: bool) {
    let Some(element) = document
        .get_element_by_id(id)
        .and_then(|e| e.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };
    let display = if visible { "" } else { "none" };
    let _ = element.style().set_property("display", display);
}

fn ensure_logout_control(document: &Document) {
    if document.get_element_by_id(LOGOUT_BUTTON_ID).is_some() {
        return;
    }
    let Ok(Some(nav)) = document.query_selector(NAV_ACTIONS_SELECTOR) else {
        return;
    };
    let Ok(link) = document.create_element("a") else {
        return;
    };
    let _ = link.set_attribute("id", LOGOUT_BUTTON_ID);
    let _ = link.set_attribute("href", "#");
    let _ = link.set_attribute("class", "nav-link");
    link.set_text_content(Some("Logout"));
    let _ = nav.append_child(&link);
}

fn elements(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(nodes) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn selector_for(slot: &UserSlot) -> String {
    match slot {
        UserSlot::Name => "[data-user-name]".to_owned(),
        UserSlot::Email => "[data-user-email]".to_owned(),
        UserSlot::Field(field) => format!("[data-user=\"{field}\"]"),
    }
}

impl PageSurface for DomSurface {
    fn render_navbar(&self, state: &NavbarState) {
        let Some(document) = document() else {
            return;
        };
        set_visible(&document, LOGIN_BUTTON_ID, state.show_login);
        set_visible(&document, SIGNUP_BUTTON_ID, state.show_signup);
        set_visible(&document, ADMIN_LINK_ID, state.show_admin_link);

        if state.show_logout {
            ensure_logout_control(&document);
        } else if let Some(logout) = document.get_element_by_id(LOGOUT_BUTTON_ID) {
            logout.remove();
        }

        if let Some(greeting) = document.get_element_by_id(GREETING_ID) {
            greeting.set_text_content(state.greeting.as_deref());
        }
        set_visible(&document, GREETING_ID, state.greeting.is_some());
    }

    fn bind_logout(&self, handler: LogoutHandler) -> bool {
        let Some(control) = document().and_then(|d| d.get_element_by_id(LOGOUT_BUTTON_ID)) else {
            return false;
        };
        let listener = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            event.prevent_default();
            handler();
        });
        let bound = control
            .add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())
            .is_ok();
        // Lives as long as the page.
        listener.forget();
        bound
    }

    fn user_slots(&self) -> Vec<UserSlot> {
        let Some(document) = document() else {
            return Vec::new();
        };
        let mut slots = Vec::new();
        if !elements(&document, "[data-user-name]").is_empty() {
            slots.push(UserSlot::Name);
        }
        if !elements(&document, "[data-user-email]").is_empty() {
            slots.push(UserSlot::Email);
        }
        let mut fields: Vec<String> = elements(&document, "[data-user]")
            .iter()
            .filter_map(|e| e.get_attribute("data-user"))
            .collect();
        fields.sort();
        fields.dedup();
        slots.extend(fields.into_iter().map(UserSlot::Field));
        slots
    }

    fn fill_user_slot(&self, slot: &UserSlot, value: &str) {
        let Some(document) = document() else {
            return;
        };
        for element in elements(&document, &selector_for(slot)) {
            element.set_text_content(Some(value));
        }
    }
}
