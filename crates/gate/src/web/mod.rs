//! Browser capabilities (`wasm32` + `web` feature).
//!
//! Every page of the site calls [`boot`] once on load:
//!
//! ```ignore
//! #[wasm_bindgen(start)]
//! pub fn start() {
//!     if let Err(e) = mizigo_gate::web::boot() {
//!         web_sys::console::warn_1(&format!("Session gate unavailable: {e}").into());
//!     }
//! }
//! ```

mod dom;
mod navigator;
mod notifier;
mod storage;

pub use dom::DomSurface;
pub use navigator::WindowNavigator;
pub use notifier::AlertNotifier;
pub use storage::BrowserStorage;

use crate::{GateConfig, SessionGate, StorageError, SystemClock};

/// Build a gate over `localStorage`/`sessionStorage` and the current page,
/// then run [`SessionGate::init`].
///
/// # Errors
///
/// Returns [`StorageError::Unavailable`] when the browser exposes no storage
/// (private mode with storage disabled, sandboxed iframe).
pub fn boot() -> Result<SessionGate, StorageError> {
    let gate = SessionGate::builder(BrowserStorage::local()?)
        .config(GateConfig::default())
        .tab_store(BrowserStorage::session()?)
        .clock(SystemClock)
        .navigator(WindowNavigator)
        .notifier(AlertNotifier)
        .surface(DomSurface)
        .build();
    gate.init();
    Ok(gate)
}

/// Turn a JavaScript exception into a readable message.
fn js_error(value: &wasm_bindgen::JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}
