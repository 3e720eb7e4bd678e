//! Page behaviors. [`Controller::attach`] queries the document once, applies
//! initial styles and registers every listener; [`Controller::handle`] runs
//! the action a listener names.

mod carousel;
mod navigation;
mod presentation;
mod reveal;
mod startup;
mod swipe;
mod viewer;

use crate::config::{InteractionConfig, PageIds};
use crate::events::{Action, Event, ListenerTable};
use crate::page::Host;
use crate::Result;

use carousel::Carousel;
use navigation::Navigation;
use presentation::ScrollPresentation;
use reveal::Reveal;
use startup::Startup;
use swipe::SwipeTracker;
use viewer::Viewer;

pub use navigation::MenuState;
pub use swipe::SwipeDirection;
pub use viewer::ViewerState;

pub(crate) const READY_MESSAGE: &str = "Portfolio website loaded successfully!";

pub(crate) struct Controller {
    navigation: Navigation,
    presentation: ScrollPresentation,
    reveal: Reveal,
    startup: Startup,
    swipe: SwipeTracker,
    carousel: Option<Carousel>,
    viewer: Option<Viewer>,
}

impl Controller {
    /// Fails with [`crate::Error::MissingElement`] when the menu toggle or the
    /// navigation menu is absent; every other feature is skipped when its
    /// elements are missing.
    pub(crate) fn attach(
        host: &mut Host,
        listeners: &mut ListenerTable,
        config: &InteractionConfig,
        ids: &PageIds,
    ) -> Result<Self> {
        let navigation = Navigation::attach(host, listeners, config, ids)?;
        let presentation = ScrollPresentation::attach(host, listeners, config, ids)?;
        let reveal = Reveal::attach(host, config, ids)?;
        let startup = Startup::attach(host, listeners, ids)?;
        let swipe = SwipeTracker::attach(host, listeners, config);
        let carousel = Carousel::attach(host, listeners, config, ids)?;
        let viewer = Viewer::attach(host, listeners, ids)?;

        log::info!("{READY_MESSAGE}");
        host.trace_line(format!("[page] {READY_MESSAGE}"));

        Ok(Self {
            navigation,
            presentation,
            reveal,
            startup,
            swipe,
            carousel,
            viewer,
        })
    }

    pub(crate) fn handle(&mut self, action: Action, host: &mut Host, event: &mut Event) -> Result<()> {
        match action {
            Action::ToggleMenu => self.navigation.toggle(host),
            Action::FocusMenuOnOpen => self.navigation.focus_first_link(host),
            Action::CloseMenuFromLink => self.navigation.close(host),
            Action::ScrollToSection => self.navigation.scroll_to_section(host, event),
            Action::CloseMenuOnOutsideClick => self.navigation.close_on_outside_click(host, event),
            Action::CloseMenuOnEscape => self.navigation.close_on_escape(host, event),
            Action::UpdateActiveNav => self.presentation.update_active_nav(host),
            Action::StyleHeader => self.presentation.style_header(host),
            Action::Parallax => self.presentation.parallax(host),
            Action::MarkLoaded => self.startup.mark_loaded(host),
            Action::LiftCard => self.startup.lift_card(host, event),
            Action::RestCard => self.startup.rest_card(host, event),
            Action::ImageLoaded => self.startup.image_loaded(host, event),
            Action::ImageFailed => self.startup.image_failed(host, event),
            Action::RecordSwipeStart => {
                self.swipe.record_start(event);
                Ok(())
            }
            Action::DetectSwipe => {
                self.swipe.detect(host, event);
                Ok(())
            }
            Action::UpdateScrollIndicator
            | Action::StepCarousel
            | Action::BeginCarouselDrag
            | Action::DragCarousel
            | Action::EndCarouselDrag => match self.carousel.as_mut() {
                Some(carousel) => carousel.handle(action, host, event),
                None => Ok(()),
            },
            Action::OpenViewer
            | Action::CloseViewerFromButton
            | Action::CloseViewerFromBackdrop
            | Action::CloseViewerOnEscape => match self.viewer.as_mut() {
                Some(viewer) => viewer.handle(action, host, event),
                None => Ok(()),
            },
        }
    }

    /// Re-evaluates entrance-animation observation against the current
    /// viewport.
    pub(crate) fn refresh_visibility(&mut self, host: &mut Host) -> Result<()> {
        self.reveal.refresh(host)
    }

    pub(crate) fn release_scroll_throttle(&mut self) {
        self.presentation.release_throttle();
    }

    pub(crate) fn is_scroll_throttled(&self) -> bool {
        self.presentation.is_throttled()
    }

    pub(crate) fn menu_state(&self) -> MenuState {
        self.navigation.state()
    }

    pub(crate) fn viewer_state(&self) -> Option<&ViewerState> {
        self.viewer.as_ref().map(Viewer::state)
    }

    pub(crate) fn last_swipe(&self) -> Option<SwipeDirection> {
        self.swipe.last()
    }
}
