use crate::config::InteractionConfig;
use crate::events::{Action, Event, EventKind, ListenerTable, ListenerTarget};
use crate::page::Host;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Up,
    Down,
}

impl SwipeDirection {
    fn message(self) -> &'static str {
        match self {
            Self::Up => "Swipe up detected",
            Self::Down => "Swipe down detected",
        }
    }
}

/// Page-level vertical swipe detection on screen coordinates. Detected
/// swipes are only reported.
pub(crate) struct SwipeTracker {
    start_y: f64,
    threshold: f64,
    last: Option<SwipeDirection>,
}

impl SwipeTracker {
    pub(crate) fn attach(host: &Host, listeners: &mut ListenerTable, config: &InteractionConfig) -> Self {
        let document = ListenerTarget::Node(host.dom.root);
        listeners.add(document, EventKind::TouchStart, Action::RecordSwipeStart);
        listeners.add(document, EventKind::TouchEnd, Action::DetectSwipe);
        Self {
            start_y: 0.0,
            threshold: config.swipe_threshold,
            last: None,
        }
    }

    pub(crate) fn last(&self) -> Option<SwipeDirection> {
        self.last
    }

    pub(crate) fn record_start(&mut self, event: &Event) {
        if let Some(touch) = event.touch {
            self.start_y = touch.screen_y;
        }
    }

    pub(crate) fn detect(&mut self, host: &mut Host, event: &Event) {
        let Some(touch) = event.touch else {
            return;
        };
        if let Some(direction) = classify(self.start_y, touch.screen_y, self.threshold) {
            log::debug!("{}", direction.message());
            host.trace_line(format!("[page] {}", direction.message()));
            self.last = Some(direction);
        }
    }
}

/// Upward travel is a positive `start_y - end_y`; travel must strictly
/// exceed `threshold`.
pub(crate) fn classify(start_y: f64, end_y: f64, threshold: f64) -> Option<SwipeDirection> {
    let diff = start_y - end_y;
    if diff.abs() <= threshold {
        return None;
    }
    Some(if diff > 0.0 {
        SwipeDirection::Up
    } else {
        SwipeDirection::Down
    })
}
