use unicode_normalization::UnicodeNormalization;

use crate::config::PageIds;
use crate::events::{Action, Event, EventKind, ListenerTable, ListenerTarget};
use crate::page::Host;
use crate::Result;

const LOADED_CLASS: &str = "loaded";
const CARD_LIFTED: &str = "translateY(-8px) scale(1.02)";
const CARD_RESTING: &str = "translateY(0) scale(1)";

/// Load marker, card hover lift, image load states and accessible labels.
pub(crate) struct Startup;

impl Startup {
    pub(crate) fn attach(host: &mut Host, listeners: &mut ListenerTable, ids: &PageIds) -> Result<Self> {
        listeners.add(ListenerTarget::Window, EventKind::Load, Action::MarkLoaded);

        for card in host.dom.query_selector_all(&ids.content_cards)? {
            let target = ListenerTarget::Node(card);
            listeners.add(target, EventKind::MouseEnter, Action::LiftCard);
            listeners.add(target, EventKind::MouseLeave, Action::RestCard);
        }

        for control in host.dom.query_selector_all(&ids.labelled_controls)? {
            if host.dom.has_attr(control, "aria-label") {
                continue;
            }
            let label = accessible_label(&host.dom.text_content(control));
            if !label.is_empty() {
                host.dom.set_attr(control, "aria-label", &label)?;
            }
        }

        for image in host.dom.query_selector_all("img")? {
            let target = ListenerTarget::Node(image);
            listeners.add(target, EventKind::Load, Action::ImageLoaded);
            listeners.add(target, EventKind::Error, Action::ImageFailed);
        }

        Ok(Self)
    }

    pub(crate) fn mark_loaded(&mut self, host: &mut Host) -> Result<()> {
        match host.dom.body() {
            Some(body) => host.dom.class_add(body, LOADED_CLASS),
            None => Ok(()),
        }
    }

    pub(crate) fn lift_card(&mut self, host: &mut Host, event: &Event) -> Result<()> {
        self.set_card_transform(host, event, CARD_LIFTED)
    }

    pub(crate) fn rest_card(&mut self, host: &mut Host, event: &Event) -> Result<()> {
        self.set_card_transform(host, event, CARD_RESTING)
    }

    fn set_card_transform(&self, host: &mut Host, event: &Event, transform: &str) -> Result<()> {
        match event.current_node() {
            Some(card) => host.dom.style_set(card, "transform", transform),
            None => Ok(()),
        }
    }

    pub(crate) fn image_loaded(&mut self, host: &mut Host, event: &Event) -> Result<()> {
        let Some(image) = event.current_node() else {
            return Ok(());
        };
        host.dom.style_set(image, "opacity", "1")
    }

    /// A broken image stays in place, dimmed and desaturated.
    pub(crate) fn image_failed(&mut self, host: &mut Host, event: &Event) -> Result<()> {
        let Some(image) = event.current_node() else {
            return Ok(());
        };
        host.dom.style_set(image, "opacity", "0.5")?;
        host.dom.style_set(image, "filter", "grayscale(100%)")
    }
}

/// Visible text reduced to a label: trimmed, inner whitespace runs collapsed
/// to one space, NFC-normalized.
pub(crate) fn accessible_label(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .nfc()
        .collect()
}
