use crate::config::{InteractionConfig, PageIds};
use crate::dom::{Layout, NodeId};
use crate::events::{Action, Event, EventKind, ListenerTable, ListenerTarget};
use crate::page::{Host, ScrollBehavior};
use crate::Result;

/// Horizontally scrolling testimonial strip with an end indicator, arrow-key
/// stepping and touch drag.
pub(crate) struct Carousel {
    container: NodeId,
    indicator: NodeId,
    card_selector: String,
    end_tolerance: i64,
    card_gap: i64,
    drag_factor: i64,
    // A gesture that starts at x == 0 is indistinguishable from no gesture.
    drag_start_x: Option<f64>,
    drag_start_scroll: i64,
}

impl Carousel {
    /// Returns `None`, attaching nothing, unless both the container and its
    /// indicator exist.
    pub(crate) fn attach(
        host: &mut Host,
        listeners: &mut ListenerTable,
        config: &InteractionConfig,
        ids: &PageIds,
    ) -> Result<Option<Self>> {
        let (Some(container), Some(indicator)) = (
            host.dom.by_id(&ids.testimonials),
            host.dom.by_id(&ids.scroll_indicator),
        ) else {
            log::debug!("testimonial carousel disabled: container or indicator missing");
            return Ok(None);
        };

        let carousel = Self {
            container,
            indicator,
            card_selector: ids.testimonial_card.clone(),
            end_tolerance: config.carousel_end_tolerance,
            card_gap: config.carousel_card_gap,
            drag_factor: config.carousel_drag_factor,
            drag_start_x: None,
            drag_start_scroll: 0,
        };

        let target = ListenerTarget::Node(container);
        listeners.add(target, EventKind::Scroll, Action::UpdateScrollIndicator);
        carousel.update_indicator(host)?;

        host.dom.style_set(container, "scrollSnapType", "x mandatory")?;
        for card in host.dom.query_selector_all_from(container, &carousel.card_selector)? {
            host.dom.style_set(card, "scrollSnapAlign", "start")?;
        }

        listeners.add(target, EventKind::KeyDown, Action::StepCarousel);
        listeners.add(target, EventKind::TouchStart, Action::BeginCarouselDrag);
        listeners.add(target, EventKind::TouchMove, Action::DragCarousel);
        listeners.add(target, EventKind::TouchEnd, Action::EndCarouselDrag);

        Ok(Some(carousel))
    }

    pub(crate) fn handle(&mut self, action: Action, host: &mut Host, event: &Event) -> Result<()> {
        match action {
            Action::UpdateScrollIndicator => self.update_indicator(host),
            Action::StepCarousel => self.step(host, event),
            Action::BeginCarouselDrag => {
                self.begin_drag(host, event);
                Ok(())
            }
            Action::DragCarousel => self.drag(host, event),
            Action::EndCarouselDrag => {
                self.drag_start_x = None;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn update_indicator(&self, host: &mut Host) -> Result<()> {
        let display = if is_at_end(&host.dom.layout(self.container), self.end_tolerance) {
            "none"
        } else {
            "flex"
        };
        host.dom.style_set(self.indicator, "display", display)
    }

    /// Arrow keys move by one card plus the gap between cards.
    fn step(&mut self, host: &mut Host, event: &Event) -> Result<()> {
        let direction = if event.key_is("ArrowLeft") {
            -1
        } else if event.key_is("ArrowRight") {
            1
        } else {
            return Ok(());
        };
        let Some(card) = host
            .dom
            .query_selector_from(self.container, &self.card_selector)?
        else {
            return Ok(());
        };
        let card_width = host.dom.layout(card).offset_width + self.card_gap;
        host.scroll_element_by(self.container, direction * card_width, ScrollBehavior::Smooth)
    }

    fn begin_drag(&mut self, host: &Host, event: &Event) {
        let Some(touch) = event.touch else {
            return;
        };
        let layout = host.dom.layout(self.container);
        let x = touch.page_x - layout.offset_left as f64;
        self.drag_start_x = Some(x).filter(|x| *x != 0.0);
        self.drag_start_scroll = layout.scroll_left;
    }

    fn drag(&mut self, host: &mut Host, event: &Event) -> Result<()> {
        let (Some(start_x), Some(touch)) = (self.drag_start_x, event.touch) else {
            return Ok(());
        };
        let x = touch.page_x - host.dom.layout(self.container).offset_left as f64;
        let walk = (x - start_x) * self.drag_factor as f64;
        let target = (self.drag_start_scroll as f64 - walk).round() as i64;
        host.set_scroll_left(self.container, target)
    }
}

pub(crate) fn is_at_end(layout: &Layout, tolerance: i64) -> bool {
    layout.scroll_left + layout.client_width >= layout.scroll_width - tolerance
}
