//! A single page view: every landing-page behaviour wired to one tracker.
//!
//! All per-page state (reached milestones, the exit-intent flag, the scroll
//! debounce timer, submit buttons) is owned by the session, so independent
//! sessions never interfere with each other.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use funnel_core::config::FunnelConfig;
use funnel_core::events::{
    Payload, AFFILIATE_CLICK, EXIT_INTENT_TRIGGERED, FORM_SUBMIT, PAGE_TIME, PAGE_VIEW,
};
use funnel_tracking::{debounce, Debounced, EventTracker, ScrollMetrics, ScrollMilestoneTracker};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::runtime::Handle;
use uuid::Uuid;

use crate::context::PageContext;
use crate::exit_intent::ExitIntentDetector;
use crate::forms::{FormController, SubmitButton};
use crate::links::{anchor_target, AffiliateLinkMatcher, Link};
use crate::menu::MobileMenu;
use crate::reveal::{ElementBounds, RevealTracker};
use crate::timer::PageTimer;

fn default_true() -> bool {
    true
}

/// A UI event reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// A link was clicked.
    Click {
        #[serde(default)]
        text: String,
        href: String,
        #[serde(default)]
        classes: Vec<String>,
    },
    /// The window scrolled.
    Scroll {
        scroll_offset: f64,
        document_height: f64,
        viewport_height: f64,
    },
    /// The pointer left the document.
    MouseOut { client_y: f64 },
    /// A form was submitted. Only ajax forms are handled.
    Submit {
        #[serde(default)]
        form_id: Option<String>,
        #[serde(default = "default_true")]
        ajax: bool,
        #[serde(default = "default_true")]
        has_submit_button: bool,
    },
    /// The mobile menu button was pressed.
    MenuToggle,
    /// An animated element's position changed.
    ElementVisibility {
        element_id: String,
        top: f64,
        bottom: f64,
        viewport_height: f64,
    },
    /// The page is being left.
    Unload,
}

/// A UI change the host should apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    /// Smooth-scroll the element with this id to the top of the viewport.
    ScrollIntoView { target_id: String },
    /// Add the `visible` class to the element.
    Reveal { element_id: String },
    /// Set the menu classes to match `open`.
    MenuToggled { open: bool },
    /// Update a form's submit button.
    SubmitButton { form_id: String, button: SubmitButton },
}

/// One page view.
///
/// Scroll sampling and submit-button re-enabling run on tokio timers; outside
/// a runtime they happen immediately.
pub struct PageSession {
    id: Uuid,
    context: PageContext,
    tracker: EventTracker,
    links: AffiliateLinkMatcher,
    scroll: Arc<Mutex<ScrollMilestoneTracker>>,
    scroll_sampler: Debounced<ScrollMetrics>,
    exit_intent: ExitIntentDetector,
    reveal: RevealTracker,
    menu: Option<MobileMenu>,
    forms: Arc<Mutex<FormController>>,
    form_reenable_delay: Duration,
    timer: PageTimer,
    started: bool,
    unloaded: bool,
}

impl PageSession {
    pub fn new(context: PageContext, config: &FunnelConfig, tracker: EventTracker) -> Self {
        let scroll = Arc::new(Mutex::new(ScrollMilestoneTracker::new(
            config.scroll.milestones.clone(),
            context.page_url(),
            tracker.clone(),
        )));
        let sampled = Arc::clone(&scroll);
        let scroll_sampler = debounce(
            move |metrics: ScrollMetrics| {
                if let Ok(mut scroll) = sampled.lock() {
                    scroll.on_scroll(metrics);
                }
            },
            Duration::from_millis(config.scroll.debounce_ms),
        );

        Self {
            id: Uuid::new_v4(),
            links: AffiliateLinkMatcher::new(&config.links),
            scroll,
            scroll_sampler,
            exit_intent: ExitIntentDetector::new(config.exit_intent.threshold_px),
            reveal: RevealTracker::new(&config.reveal),
            menu: None,
            forms: Arc::new(Mutex::new(FormController::new(&config.forms))),
            form_reenable_delay: Duration::from_millis(config.forms.reenable_delay_ms),
            timer: PageTimer::start(),
            started: false,
            unloaded: false,
            context,
            tracker,
        }
    }

    /// Enable the mobile menu. Pages without one ignore `MenuToggle`.
    pub fn with_mobile_menu(mut self) -> Self {
        self.menu = Some(MobileMenu::new());
        self
    }

    /// Track the page view. Only the first call has an effect.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        let url_params: Map<String, Value> = self
            .context
            .url_params()
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        self.tracker.track_with(
            PAGE_VIEW,
            Payload::new()
                .with("page_url", self.context.page_url())
                .with("page_title", self.context.title())
                .with("referrer", self.context.referrer())
                .with("url_params", Value::Object(url_params)),
        );
        tracing::info!(
            session = %self.id,
            page_url = %self.context.page_url(),
            "Page session started"
        );
    }

    /// Dispatch a host event and return the UI changes to apply.
    pub fn handle(&mut self, event: HostEvent) -> Vec<Effect> {
        if self.unloaded {
            tracing::debug!(session = %self.id, ?event, "Event after unload ignored");
            return Vec::new();
        }

        match event {
            HostEvent::Click {
                text,
                href,
                classes,
            } => self.on_click(Link {
                text,
                href,
                classes,
            }),
            HostEvent::Scroll {
                scroll_offset,
                document_height,
                viewport_height,
            } => {
                self.scroll_sampler.call(ScrollMetrics {
                    scroll_offset,
                    document_height,
                    viewport_height,
                });
                Vec::new()
            }
            HostEvent::MouseOut { client_y } => {
                if self.exit_intent.on_mouse_out(client_y) {
                    self.tracker.track_with(
                        EXIT_INTENT_TRIGGERED,
                        Payload::new().with("page_url", self.context.page_url()),
                    );
                }
                Vec::new()
            }
            HostEvent::Submit {
                form_id,
                ajax,
                has_submit_button,
            } => {
                if !ajax {
                    return Vec::new();
                }
                self.on_submit(form_id.as_deref(), has_submit_button)
            }
            HostEvent::MenuToggle => match self.menu.as_mut() {
                Some(menu) => vec![Effect::MenuToggled {
                    open: menu.toggle(),
                }],
                None => Vec::new(),
            },
            HostEvent::ElementVisibility {
                element_id,
                top,
                bottom,
                viewport_height,
            } => {
                let bounds = ElementBounds { top, bottom };
                if self.reveal.observe(&element_id, bounds, viewport_height) {
                    vec![Effect::Reveal { element_id }]
                } else {
                    Vec::new()
                }
            }
            HostEvent::Unload => {
                self.unload();
                Vec::new()
            }
        }
    }

    /// Track time on page and stop handling events. Only the first call has an effect.
    pub fn unload(&mut self) {
        if self.unloaded {
            return;
        }
        self.unloaded = true;
        self.scroll_sampler.cancel();

        let seconds = self.timer.elapsed_seconds();
        self.tracker.track_with(
            PAGE_TIME,
            Payload::new()
                .with("seconds", seconds)
                .with("page_url", self.context.page_url()),
        );
        tracing::info!(session = %self.id, seconds, "Page session unloaded");
    }

    fn on_click(&mut self, link: Link) -> Vec<Effect> {
        if self.links.is_affiliate(&link) {
            let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            self.tracker.track_with(
                AFFILIATE_CLICK,
                Payload::new()
                    .with("link_text", link.text.trim())
                    .with("link_url", self.context.resolve(&link.href))
                    .with("page_url", self.context.page_url())
                    .with("timestamp", timestamp),
            );
        }

        match anchor_target(&link.href) {
            Some(target) => vec![Effect::ScrollIntoView {
                target_id: target.to_string(),
            }],
            None => Vec::new(),
        }
    }

    fn on_submit(&mut self, form_id: Option<&str>, has_submit_button: bool) -> Vec<Effect> {
        let key = FormController::form_key(form_id).to_string();
        let mut effects = Vec::new();

        if has_submit_button {
            if let Ok(mut forms) = self.forms.lock() {
                effects.push(Effect::SubmitButton {
                    form_id: key.clone(),
                    button: forms.begin_submit(&key),
                });
            }
            self.schedule_reenable(key.clone());
        }

        self.tracker.track_with(
            FORM_SUBMIT,
            Payload::new()
                .with("form_id", key.as_str())
                .with("page_url", self.context.page_url()),
        );
        effects
    }

    fn schedule_reenable(&self, key: String) {
        let forms = Arc::clone(&self.forms);
        let session = self.id;
        let reenable = move || {
            if let Ok(mut forms) = forms.lock() {
                if forms.finish_submit(&key).is_some() {
                    tracing::debug!(session = %session, form_id = %key, "Submit button re-enabled");
                }
            }
        };

        match Handle::try_current() {
            Ok(handle) => {
                let delay = self.form_reenable_delay;
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    reenable();
                });
            }
            Err(_) => reenable(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_unloaded(&self) -> bool {
        self.unloaded
    }

    /// Scroll milestones reached so far, ascending.
    pub fn reached_milestones(&self) -> Vec<u8> {
        self.scroll
            .lock()
            .map(|s| s.reached().collect())
            .unwrap_or_default()
    }

    pub fn submit_button(&self, form_id: &str) -> Option<SubmitButton> {
        self.forms
            .lock()
            .ok()
            .and_then(|f| f.button(form_id).cloned())
    }

    /// `None` when the page has no mobile menu.
    pub fn menu_open(&self) -> Option<bool> {
        self.menu.map(|m| m.is_open())
    }

    pub fn exit_intent_triggered(&self) -> bool {
        self.exit_intent.is_triggered()
    }

    pub fn is_revealed(&self, element_id: &str) -> bool {
        self.reveal.is_revealed(element_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_tracking::MemorySink;
    use serde_json::json;

    fn make_session() -> (PageSession, MemorySink) {
        let sink = MemorySink::new();
        let context = PageContext::new(
            "https://funnel.test/offer?utm_source=ads",
            "Offer",
            "https://search.test/",
        )
        .unwrap();
        let session = PageSession::new(
            context,
            &FunnelConfig::default(),
            EventTracker::new(Arc::new(sink.clone())),
        );
        (session, sink)
    }

    #[test]
    fn test_host_event_deserialization() {
        let event: HostEvent =
            serde_json::from_str(r#"{"type": "mouse_out", "client_y": 3}"#).unwrap();
        assert_eq!(event, HostEvent::MouseOut { client_y: 3.0 });

        let event: HostEvent = serde_json::from_str(r#"{"type": "menu_toggle"}"#).unwrap();
        assert_eq!(event, HostEvent::MenuToggle);

        let event: HostEvent =
            serde_json::from_str(r#"{"type": "submit", "form_id": "signup"}"#).unwrap();
        assert_eq!(
            event,
            HostEvent::Submit {
                form_id: Some("signup".to_string()),
                ajax: true,
                has_submit_button: true,
            }
        );
    }

    #[test]
    fn test_effect_serialization() {
        let effect = Effect::ScrollIntoView {
            target_id: "pricing".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&effect).unwrap(),
            json!({"effect": "scroll_into_view", "target_id": "pricing"})
        );
    }

    #[test]
    fn test_start_tracks_page_view_once() {
        let (mut session, sink) = make_session();
        session.start();
        session.start();

        let views = sink.events_named("page_view");
        assert_eq!(views.len(), 1);
        let payload = views[0].payload();
        assert_eq!(payload.get("page_title"), Some(&json!("Offer")));
        assert_eq!(payload.get("referrer"), Some(&json!("https://search.test/")));
        assert_eq!(payload.get("url_params"), Some(&json!({"utm_source": "ads"})));
        assert!(session.is_started());
    }

    #[test]
    fn test_anchor_click_scrolls_without_tracking() {
        let (mut session, sink) = make_session();
        let effects = session.handle(HostEvent::Click {
            text: "Pricing".to_string(),
            href: "#pricing".to_string(),
            classes: vec![],
        });
        assert_eq!(
            effects,
            vec![Effect::ScrollIntoView {
                target_id: "pricing".to_string()
            }]
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn test_bare_hash_click_is_ignored() {
        let (mut session, sink) = make_session();
        let effects = session.handle(HostEvent::Click {
            text: "Top".to_string(),
            href: "#".to_string(),
            classes: vec![],
        });
        assert!(effects.is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_menu_toggle_requires_menu() {
        let (mut session, _sink) = make_session();
        assert!(session.handle(HostEvent::MenuToggle).is_empty());
        assert_eq!(session.menu_open(), None);

        let mut session = session.with_mobile_menu();
        assert_eq!(
            session.handle(HostEvent::MenuToggle),
            vec![Effect::MenuToggled { open: true }]
        );
        assert_eq!(
            session.handle(HostEvent::MenuToggle),
            vec![Effect::MenuToggled { open: false }]
        );
        assert_eq!(session.menu_open(), Some(false));
    }

    #[test]
    fn test_non_ajax_submit_is_ignored() {
        let (mut session, sink) = make_session();
        let effects = session.handle(HostEvent::Submit {
            form_id: Some("newsletter".to_string()),
            ajax: false,
            has_submit_button: true,
        });
        assert!(effects.is_empty());
        assert!(sink.is_empty());
        assert!(session.submit_button("newsletter").is_none());
    }

    #[test]
    fn test_submit_without_runtime_reenables_immediately() {
        let (mut session, sink) = make_session();
        let effects = session.handle(HostEvent::Submit {
            form_id: None,
            ajax: true,
            has_submit_button: true,
        });

        assert_eq!(
            effects,
            vec![Effect::SubmitButton {
                form_id: "unknown".to_string(),
                button: SubmitButton {
                    disabled: true,
                    label: "Submitting...".to_string(),
                },
            }]
        );
        let button = session.submit_button("unknown").unwrap();
        assert!(!button.disabled);

        let submits = sink.events_named("form_submit");
        assert_eq!(submits[0].payload().get("form_id"), Some(&json!("unknown")));
    }

    #[test]
    fn test_events_after_unload_are_ignored() {
        let (mut session, sink) = make_session();
        session.handle(HostEvent::Unload);
        assert!(session.is_unloaded());
        assert_eq!(sink.names(), vec!["page_time"]);

        session.handle(HostEvent::MouseOut { client_y: 0.0 });
        session.handle(HostEvent::Unload);
        assert_eq!(sink.len(), 1);
    }
}
