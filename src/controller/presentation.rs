use crate::config::{InteractionConfig, PageIds};
use crate::dom::{Dom, NodeId};
use crate::events::{Action, EventKind, ListenerTable, ListenerTarget};
use crate::page::Host;
use crate::throttle::Throttle;
use crate::timers::Task;
use crate::Result;

const ACTIVE_CLASS: &str = "active";

const HEADER_SOLID_BACKGROUND: &str = "rgba(255, 255, 255, 0.98)";
const HEADER_SOLID_SHADOW: &str = "0 4px 20px rgba(0,0,0,0.15)";
const HEADER_RESTING_BACKGROUND: &str = "rgba(255, 255, 255, 0.95)";
const HEADER_RESTING_SHADOW: &str = "0 4px 20px rgba(0,0,0,0.1)";

/// Window-scroll driven presentation: active navigation link, header
/// styling and hero parallax.
pub(crate) struct ScrollPresentation {
    header: Option<NodeId>,
    hero: Option<NodeId>,
    sections: String,
    nav_links: String,
    activation_offset: i64,
    header_solid_after: i64,
    parallax_factor: f64,
    throttle: Throttle,
}

impl ScrollPresentation {
    pub(crate) fn attach(
        host: &mut Host,
        listeners: &mut ListenerTable,
        config: &InteractionConfig,
        ids: &PageIds,
    ) -> Result<Self> {
        let header = host.dom.query_selector(&ids.header)?;
        let hero = host.dom.query_selector(&ids.hero)?;

        if header.is_some() {
            listeners.add(ListenerTarget::Window, EventKind::Scroll, Action::StyleHeader);
        }
        if hero.is_some() {
            listeners.add(ListenerTarget::Window, EventKind::Scroll, Action::Parallax);
        }
        listeners.add(ListenerTarget::Window, EventKind::Scroll, Action::UpdateActiveNav);

        Ok(Self {
            header,
            hero,
            sections: ids.sections.clone(),
            nav_links: format!("#{} a", ids.nav_menu),
            activation_offset: config.section_activation_offset,
            header_solid_after: config.header_solid_after,
            parallax_factor: config.parallax_factor,
            throttle: Throttle::new(config.scroll_throttle_ms),
        })
    }

    /// Throttled: at most one recomputation per cooldown window.
    pub(crate) fn update_active_nav(&mut self, host: &mut Host) -> Result<()> {
        if !self.throttle.try_acquire() {
            return Ok(());
        }
        host.schedule(self.throttle.limit_ms(), Task::ReleaseScrollThrottle);

        let current = active_section(
            &host.dom,
            &self.sections,
            host.viewport.scroll_y,
            self.activation_offset,
        )?;
        let fragment = current.map(|id| format!("#{id}"));
        for link in host.dom.query_selector_all(&self.nav_links)? {
            host.dom.class_remove(link, ACTIVE_CLASS)?;
            if fragment.is_some() && host.dom.attr(link, "href") == fragment {
                host.dom.class_add(link, ACTIVE_CLASS)?;
            }
        }
        Ok(())
    }

    pub(crate) fn release_throttle(&mut self) {
        self.throttle.release();
    }

    pub(crate) fn is_throttled(&self) -> bool {
        self.throttle.is_engaged()
    }

    pub(crate) fn style_header(&mut self, host: &mut Host) -> Result<()> {
        let Some(header) = self.header else {
            return Ok(());
        };
        let (background, shadow) = if host.viewport.scroll_y > self.header_solid_after {
            (HEADER_SOLID_BACKGROUND, HEADER_SOLID_SHADOW)
        } else {
            (HEADER_RESTING_BACKGROUND, HEADER_RESTING_SHADOW)
        };
        host.dom.style_set(header, "background", background)?;
        host.dom.style_set(header, "boxShadow", shadow)
    }

    pub(crate) fn parallax(&mut self, host: &mut Host) -> Result<()> {
        let Some(hero) = self.hero else {
            return Ok(());
        };
        let transform = parallax_transform(host.viewport.scroll_y, self.parallax_factor);
        host.dom.style_set(hero, "transform", &transform)
    }
}

/// Id of the last section whose activation band
/// `[offset_top - activation_offset, offset_top - activation_offset + client_height)`
/// contains `scroll_y`.
pub(crate) fn active_section(
    dom: &Dom,
    sections: &str,
    scroll_y: i64,
    activation_offset: i64,
) -> Result<Option<String>> {
    let mut current = None;
    for section in dom.query_selector_all(sections)? {
        let layout = dom.layout(section);
        let top = layout.offset_top - activation_offset;
        if scroll_y >= top && scroll_y < top + layout.client_height {
            current = dom.attr(section, "id").filter(|id| !id.is_empty());
        }
    }
    Ok(current)
}

pub(crate) fn parallax_transform(scroll_y: i64, factor: f64) -> String {
    let offset = scroll_y as f64 * factor;
    // Avoid rendering "-0px" at the top of the page.
    let offset = if offset == 0.0 { 0.0 } else { offset };
    format!("translateY({offset}px)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Layout;
    use crate::html::parse_html;

    fn sections() -> Result<Dom> {
        let mut dom = parse_html(
            "<section id='about'></section><section id='work'></section><section></section>",
        )?;
        let about = dom.by_id("about").expect("about");
        let work = dom.by_id("work").expect("work");
        dom.set_layout(about, Layout::block(600, 500))?;
        dom.set_layout(work, Layout::block(1100, 700))?;
        Ok(dom)
    }

    #[test]
    fn activation_band_starts_before_the_section_top() -> Result<()> {
        let dom = sections()?;
        assert_eq!(active_section(&dom, "section[id]", 499, 100)?, None);
        assert_eq!(active_section(&dom, "section[id]", 500, 100)?.as_deref(), Some("about"));
        assert_eq!(active_section(&dom, "section[id]", 999, 100)?.as_deref(), Some("about"));
        assert_eq!(active_section(&dom, "section[id]", 1000, 100)?.as_deref(), Some("work"));
        assert_eq!(active_section(&dom, "section[id]", 1700, 100)?, None);
        Ok(())
    }

    #[test]
    fn later_section_wins_when_bands_overlap() -> Result<()> {
        let mut dom = sections()?;
        let about = dom.by_id("about").expect("about");
        dom.set_layout(about, Layout::block(600, 900))?;
        assert_eq!(active_section(&dom, "section[id]", 1200, 100)?.as_deref(), Some("work"));
        Ok(())
    }

    #[test]
    fn parallax_moves_at_half_speed_upwards() {
        assert_eq!(parallax_transform(0, -0.5), "translateY(0px)");
        assert_eq!(parallax_transform(100, -0.5), "translateY(-50px)");
        assert_eq!(parallax_transform(25, -0.5), "translateY(-12.5px)");
    }
}
