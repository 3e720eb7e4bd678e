use crate::config::{InteractionConfig, PageIds};
use crate::dom::NodeId;
use crate::events::{Action, Event, EventKind, ListenerTable, ListenerTarget};
use crate::page::{Host, ScrollBehavior};
use crate::timers::Task;
use crate::{Error, Result};

const OPEN_CLASS: &str = "active";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Open,
    Closed,
}

impl MenuState {
    /// Label shown on the toggle control.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Open => "✕",
            Self::Closed => "☰",
        }
    }
}

pub(crate) struct Navigation {
    toggle: NodeId,
    menu: NodeId,
    header: Option<NodeId>,
    nav_container: String,
    focus_delay_ms: i64,
    state: MenuState,
}

impl Navigation {
    pub(crate) fn attach(
        host: &mut Host,
        listeners: &mut ListenerTable,
        config: &InteractionConfig,
        ids: &PageIds,
    ) -> Result<Self> {
        let toggle = host
            .dom
            .by_id(&ids.menu_toggle)
            .ok_or_else(|| Error::MissingElement(format!("#{}", ids.menu_toggle)))?;
        let menu = host
            .dom
            .by_id(&ids.nav_menu)
            .ok_or_else(|| Error::MissingElement(format!("#{}", ids.nav_menu)))?;
        let header = host.dom.query_selector(&ids.header)?;
        let links = host.dom.query_selector_all_from(menu, "a")?;

        let state = if host.dom.class_contains(menu, OPEN_CLASS) {
            MenuState::Open
        } else {
            MenuState::Closed
        };

        let toggle_target = ListenerTarget::Node(toggle);
        listeners.add(toggle_target, EventKind::Click, Action::ToggleMenu);
        listeners.add(toggle_target, EventKind::Click, Action::FocusMenuOnOpen);
        for link in links {
            let target = ListenerTarget::Node(link);
            listeners.add(target, EventKind::Click, Action::CloseMenuFromLink);
            listeners.add(target, EventKind::Click, Action::ScrollToSection);
        }
        let document = ListenerTarget::Node(host.dom.root);
        listeners.add(document, EventKind::Click, Action::CloseMenuOnOutsideClick);
        listeners.add(document, EventKind::KeyDown, Action::CloseMenuOnEscape);

        Ok(Self {
            toggle,
            menu,
            header,
            nav_container: ids.nav_container.clone(),
            focus_delay_ms: config.menu_focus_delay_ms,
            state,
        })
    }

    pub(crate) fn state(&self) -> MenuState {
        self.state
    }

    pub(crate) fn toggle(&mut self, host: &mut Host) -> Result<()> {
        let next = match self.state {
            MenuState::Open => MenuState::Closed,
            MenuState::Closed => MenuState::Open,
        };
        self.apply(host, next)
    }

    pub(crate) fn close(&mut self, host: &mut Host) -> Result<()> {
        self.apply(host, MenuState::Closed)
    }

    fn apply(&mut self, host: &mut Host, state: MenuState) -> Result<()> {
        match state {
            MenuState::Open => host.dom.class_add(self.menu, OPEN_CLASS)?,
            MenuState::Closed => host.dom.class_remove(self.menu, OPEN_CLASS)?,
        }
        host.dom.set_text_content(self.toggle, state.glyph())?;
        self.state = state;
        Ok(())
    }

    /// Moves focus into a freshly opened menu once its transition has had a
    /// moment to start.
    pub(crate) fn focus_first_link(&mut self, host: &mut Host) -> Result<()> {
        if self.state != MenuState::Open {
            return Ok(());
        }
        if let Some(first) = host.dom.query_selector_from(self.menu, "a")? {
            host.schedule(self.focus_delay_ms, Task::Focus(first));
        }
        Ok(())
    }

    pub(crate) fn close_on_outside_click(&mut self, host: &mut Host, event: &Event) -> Result<()> {
        if self.state != MenuState::Open {
            return Ok(());
        }
        let inside = match event.target_node() {
            Some(target) => host.dom.closest(target, &self.nav_container)?.is_some(),
            None => false,
        };
        if inside {
            return Ok(());
        }
        self.close(host)
    }

    pub(crate) fn close_on_escape(&mut self, host: &mut Host, event: &Event) -> Result<()> {
        if event.key_is("Escape") {
            self.close(host)?;
        }
        Ok(())
    }

    /// Suppresses the default jump and scrolls smoothly so the section's top
    /// edge sits just under the header.
    pub(crate) fn scroll_to_section(&mut self, host: &mut Host, event: &mut Event) -> Result<()> {
        event.prevent_default();
        let Some(link) = event.current_node() else {
            return Ok(());
        };
        let Some(target) = host
            .dom
            .attr(link, "href")
            .and_then(|href| fragment_target(host, &href))
        else {
            return Ok(());
        };
        let header_height = self
            .header
            .map(|header| host.dom.layout(header).offset_height)
            .unwrap_or(0);
        let top = host.dom.layout(target).offset_top - header_height;
        host.scroll_window_to(top, ScrollBehavior::Smooth);
        Ok(())
    }
}

/// Resolves an in-page `#id` reference. Anything else resolves to nothing.
fn fragment_target(host: &Host, href: &str) -> Option<NodeId> {
    let id = href.strip_prefix('#')?;
    if id.is_empty() {
        return None;
    }
    host.dom.by_id(id)
}
