use crate::config::{InteractionConfig, PageIds};
use crate::observer::VisibilityObserver;
use crate::page::Host;
use crate::Result;

const HIDDEN_OPACITY: &str = "0";
const HIDDEN_TRANSFORM: &str = "translateY(30px)";
const REVEAL_TRANSITION: &str = "opacity 0.6s ease, transform 0.6s ease";

/// Entrance animation of content cards: hidden and offset at boot, revealed
/// once enough of them scrolls into view.
pub(crate) struct Reveal {
    observer: VisibilityObserver,
}

impl Reveal {
    pub(crate) fn attach(host: &mut Host, config: &InteractionConfig, ids: &PageIds) -> Result<Self> {
        let mut observer =
            VisibilityObserver::new(config.reveal_threshold, config.reveal_root_margin_bottom);
        for card in host.dom.query_selector_all(&ids.content_cards)? {
            host.dom.style_set(card, "opacity", HIDDEN_OPACITY)?;
            host.dom.style_set(card, "transform", HIDDEN_TRANSFORM)?;
            host.dom.style_set(card, "transition", REVEAL_TRANSITION)?;
            observer.observe(card);
        }
        Ok(Self { observer })
    }

    pub(crate) fn refresh(&mut self, host: &mut Host) -> Result<()> {
        let entries = self.observer.evaluate(
            &host.dom,
            host.viewport.scroll_y,
            host.viewport.height,
        );
        for entry in entries {
            if host.trace_enabled() {
                let label = host.node_label(entry.target);
                host.trace_line(format!(
                    "[observer] target={label} intersecting={} ratio={:.2}",
                    entry.is_intersecting, entry.ratio
                ));
            }
            // Leaving the viewport never hides a card again.
            if entry.is_intersecting {
                host.dom.style_set(entry.target, "opacity", "1")?;
                host.dom.style_set(entry.target, "transform", "translateY(0)")?;
            }
        }
        Ok(())
    }
}
