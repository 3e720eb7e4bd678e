use crate::config::PageIds;
use crate::dom::NodeId;
use crate::events::{Action, Event, EventKind, ListenerTable, ListenerTarget};
use crate::page::Host;
use crate::Result;

const OPEN_CLASS: &str = "active";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerState {
    Closed,
    /// Showing a copy of the clicked image.
    Open { src: String, alt: String },
}

/// Full-screen overlay showing an enlarged copy of a clicked image. While it
/// is open the page body does not scroll.
pub(crate) struct Viewer {
    overlay: NodeId,
    image: NodeId,
    state: ViewerState,
}

impl Viewer {
    pub(crate) fn attach(
        host: &mut Host,
        listeners: &mut ListenerTable,
        ids: &PageIds,
    ) -> Result<Option<Self>> {
        let (Some(overlay), Some(image), Some(close)) = (
            host.dom.by_id(&ids.viewer),
            host.dom.by_id(&ids.viewer_image),
            host.dom.by_id(&ids.viewer_close),
        ) else {
            log::debug!("image viewer disabled: overlay, image or close control missing");
            return Ok(None);
        };

        for source in host.dom.query_selector_all(&ids.expandable_images)? {
            listeners.add(ListenerTarget::Node(source), EventKind::Click, Action::OpenViewer);
        }
        listeners.add(
            ListenerTarget::Node(close),
            EventKind::Click,
            Action::CloseViewerFromButton,
        );
        listeners.add(
            ListenerTarget::Node(overlay),
            EventKind::Click,
            Action::CloseViewerFromBackdrop,
        );
        listeners.add(
            ListenerTarget::Node(host.dom.root),
            EventKind::KeyDown,
            Action::CloseViewerOnEscape,
        );

        let state = if host.dom.class_contains(overlay, OPEN_CLASS) {
            ViewerState::Open {
                src: host.dom.attr(image, "src").unwrap_or_default(),
                alt: host.dom.attr(image, "alt").unwrap_or_default(),
            }
        } else {
            ViewerState::Closed
        };

        Ok(Some(Self {
            overlay,
            image,
            state,
        }))
    }

    pub(crate) fn state(&self) -> &ViewerState {
        &self.state
    }

    pub(crate) fn handle(&mut self, action: Action, host: &mut Host, event: &Event) -> Result<()> {
        match action {
            Action::OpenViewer => self.open(host, event),
            Action::CloseViewerFromButton => self.close(host),
            Action::CloseViewerFromBackdrop if event.target_node() == Some(self.overlay) => {
                self.close(host)
            }
            Action::CloseViewerOnEscape
                if event.key_is("Escape") && self.state != ViewerState::Closed =>
            {
                self.close(host)
            }
            _ => Ok(()),
        }
    }

    fn open(&mut self, host: &mut Host, event: &Event) -> Result<()> {
        let Some(source) = event.current_node() else {
            return Ok(());
        };
        let src = host.dom.attr(source, "src").unwrap_or_default();
        let alt = host.dom.attr(source, "alt").unwrap_or_default();
        host.dom.set_attr(self.image, "src", &src)?;
        host.dom.set_attr(self.image, "alt", &alt)?;
        host.dom.class_add(self.overlay, OPEN_CLASS)?;
        host.set_body_style("overflow", "hidden")?;
        self.state = ViewerState::Open { src, alt };
        Ok(())
    }

    fn close(&mut self, host: &mut Host) -> Result<()> {
        host.dom.class_remove(self.overlay, OPEN_CLASS)?;
        host.set_body_style("overflow", "")?;
        self.state = ViewerState::Closed;
        Ok(())
    }
}
