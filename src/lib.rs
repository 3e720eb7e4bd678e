//! Interaction layer for a static portfolio page.
//!
//! A [`Page`] owns a deterministic host document (DOM tree, viewport and
//! virtual clock). Once booted it also owns the interaction controller, which
//! wires the mobile menu, scroll presentation, entrance animations, testimonial
//! carousel and image viewer onto that document.

use std::error::Error as StdError;
use std::fmt;

mod config;
mod controller;
mod dom;
mod events;
mod forms;
mod html;
mod observer;
mod page;
mod selector;
mod throttle;
mod timers;

pub use config::{InteractionConfig, PageIds};
pub use controller::{MenuState, SwipeDirection, ViewerState};
pub use dom::Layout;
pub use events::{Action, Binding, EventKind, ListenerTarget, TouchPoint};
pub use forms::validate_email;
pub use page::{Page, ScrollBehavior};
pub use timers::PendingTimer;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    MissingElement(String),
    InvalidAction(String),
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::MissingElement(selector) => {
                write!(f, "required element missing at boot: {selector}")
            }
            Self::InvalidAction(msg) => write!(f, "invalid action: {msg}"),
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}
