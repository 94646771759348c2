//! Funnel page crate - landing-page behaviour behind a host-agnostic API.
//!
//! The host translates its native UI events into `HostEvent`s and feeds them
//! to a `PageSession`, which tracks analytics events and answers with the
//! `Effect`s the host should apply (scroll to a section, reveal an element,
//! toggle the menu, update a submit button).

pub mod context;
pub mod exit_intent;
pub mod forms;
pub mod links;
pub mod menu;
pub mod reveal;
pub mod session;
pub mod timer;

pub use context::PageContext;
pub use exit_intent::ExitIntentDetector;
pub use forms::{FormController, SubmitButton};
pub use links::{anchor_target, AffiliateLinkMatcher, Link};
pub use menu::MobileMenu;
pub use reveal::{ElementBounds, RevealTracker};
pub use session::{Effect, HostEvent, PageSession};
pub use timer::PageTimer;
