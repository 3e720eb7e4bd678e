use std::fmt;

use crate::dom::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DomContentLoaded,
    Load,
    Error,
    Click,
    KeyDown,
    Scroll,
    TouchStart,
    TouchMove,
    TouchEnd,
    MouseEnter,
    MouseLeave,
    Focus,
    Blur,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DomContentLoaded => "DOMContentLoaded",
            Self::Load => "load",
            Self::Error => "error",
            Self::Click => "click",
            Self::KeyDown => "keydown",
            Self::Scroll => "scroll",
            Self::TouchStart => "touchstart",
            Self::TouchMove => "touchmove",
            Self::TouchEnd => "touchend",
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
            Self::Focus => "focus",
            Self::Blur => "blur",
        }
    }

    /// Element scroll, resource load/error, pointer enter/leave and focus
    /// changes stay on their target.
    pub fn bubbles(self) -> bool {
        matches!(
            self,
            Self::DomContentLoaded
                | Self::Click
                | Self::KeyDown
                | Self::TouchStart
                | Self::TouchMove
                | Self::TouchEnd
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a listener is attached. The document is the root node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    Window,
    Node(NodeId),
}

/// Coordinates of the first touch point of a touch event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TouchPoint {
    pub page_x: f64,
    pub page_y: f64,
    pub screen_x: f64,
    pub screen_y: f64,
}

impl TouchPoint {
    /// A touch where page and screen coordinates coincide (no scroll, no
    /// window offset).
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            page_x: x,
            page_y: y,
            screen_x: x,
            screen_y: y,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Event {
    pub(crate) kind: EventKind,
    pub(crate) target: ListenerTarget,
    pub(crate) current_target: ListenerTarget,
    pub(crate) key: Option<String>,
    pub(crate) touch: Option<TouchPoint>,
    pub(crate) default_prevented: bool,
}

impl Event {
    pub(crate) fn new(kind: EventKind, target: ListenerTarget) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            key: None,
            touch: None,
            default_prevented: false,
        }
    }

    pub(crate) fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub(crate) fn with_touch(mut self, touch: TouchPoint) -> Self {
        self.touch = Some(touch);
        self
    }

    pub(crate) fn target_node(&self) -> Option<NodeId> {
        match self.target {
            ListenerTarget::Node(node) => Some(node),
            ListenerTarget::Window => None,
        }
    }

    pub(crate) fn current_node(&self) -> Option<NodeId> {
        match self.current_target {
            ListenerTarget::Node(node) => Some(node),
            ListenerTarget::Window => None,
        }
    }

    pub(crate) fn key_is(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }

    pub(crate) fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

/// A controller reaction bound to a (target, event kind) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ToggleMenu,
    FocusMenuOnOpen,
    CloseMenuFromLink,
    ScrollToSection,
    CloseMenuOnOutsideClick,
    CloseMenuOnEscape,
    UpdateActiveNav,
    StyleHeader,
    Parallax,
    MarkLoaded,
    LiftCard,
    RestCard,
    ImageLoaded,
    ImageFailed,
    RecordSwipeStart,
    DetectSwipe,
    UpdateScrollIndicator,
    StepCarousel,
    BeginCarouselDrag,
    DragCarousel,
    EndCarouselDrag,
    OpenViewer,
    CloseViewerFromButton,
    CloseViewerFromBackdrop,
    CloseViewerOnEscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub target: ListenerTarget,
    pub kind: EventKind,
    pub action: Action,
}

/// Every listener the controller attached, in registration order.
#[derive(Debug, Default, Clone)]
pub(crate) struct ListenerTable {
    bindings: Vec<Binding>,
}

impl ListenerTable {
    pub(crate) fn add(&mut self, target: ListenerTarget, kind: EventKind, action: Action) {
        self.bindings.push(Binding {
            target,
            kind,
            action,
        });
    }

    pub(crate) fn get(&self, target: ListenerTarget, kind: EventKind) -> Vec<Action> {
        self.bindings
            .iter()
            .filter(|binding| binding.target == target && binding.kind == kind)
            .map(|binding| binding.action)
            .collect()
    }

    pub(crate) fn bindings(&self) -> &[Binding] {
        &self.bindings
    }
}
