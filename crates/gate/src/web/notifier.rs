use web_sys::Document;

use crate::{Notification, Notifier};

const ALERT_CONTAINER_ID: &str = "alertContainer";

/// Appends a dismissable alert to `#alertContainer`, or logs to the console
/// on pages without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertNotifier;

impl Notifier for AlertNotifier {
    fn notify(&self, notification: Notification) {
        let document = web_sys::window().and_then(|w| w.document());
        let shown = document
            .as_ref()
            .is_some_and(|doc| show_alert(doc, &notification).is_some());
        if !shown {
            web_sys::console::log_1(&notification.message.as_str().into());
        }
    }
}

fn show_alert(document: &Document, notification: &Notification) -> Option<()> {
    let container = document.get_element_by_id(ALERT_CONTAINER_ID)?;
    let alert = document.create_element("div").ok()?;
    alert
        .set_attribute(
            "class",
            &format!("alert alert-{}", notification.level.css_class()),
        )
        .ok()?;
    alert.set_attribute("role", "alert").ok()?;
    alert.set_text_content(Some(notification.message.as_str()));
    container.append_child(&alert).ok()?;
    Some(())
}
