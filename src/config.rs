/// Thresholds and timings of every interaction.
///
/// `Default` yields the values the page is designed around; tests and
/// embedders may tune individual fields.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionConfig {
    /// Cooldown of the active-section recomputation.
    pub scroll_throttle_ms: i64,
    /// Delay before the first menu link receives focus after opening.
    pub menu_focus_delay_ms: i64,
    /// Sections become active this many pixels before their top edge.
    pub section_activation_offset: i64,
    /// Window scroll offset past which the header switches to its solid preset.
    pub header_solid_after: i64,
    pub parallax_factor: f64,
    pub reveal_threshold: f64,
    /// Bottom root margin of the entrance-animation observer (negative shrinks).
    pub reveal_root_margin_bottom: i64,
    /// Distance from the end under which the carousel counts as fully scrolled.
    pub carousel_end_tolerance: i64,
    /// Gap between testimonial cards added to every keyboard step.
    pub carousel_card_gap: i64,
    pub carousel_drag_factor: i64,
    /// Minimum vertical travel of a page-level swipe.
    pub swipe_threshold: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            scroll_throttle_ms: 100,
            menu_focus_delay_ms: 100,
            section_activation_offset: 100,
            header_solid_after: 50,
            parallax_factor: -0.5,
            reveal_threshold: 0.1,
            reveal_root_margin_bottom: -50,
            carousel_end_tolerance: 10,
            carousel_card_gap: 32,
            carousel_drag_factor: 2,
            swipe_threshold: 50.0,
        }
    }
}

/// Element ids and selectors the controller attaches to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageIds {
    pub menu_toggle: String,
    pub nav_menu: String,
    pub nav_container: String,
    pub header: String,
    pub hero: String,
    pub sections: String,
    pub content_cards: String,
    pub testimonials: String,
    pub testimonial_card: String,
    pub scroll_indicator: String,
    pub viewer: String,
    pub viewer_image: String,
    pub viewer_close: String,
    pub expandable_images: String,
    pub labelled_controls: String,
}

impl Default for PageIds {
    fn default() -> Self {
        Self {
            menu_toggle: "mobileMenuBtn".into(),
            nav_menu: "navMenu".into(),
            nav_container: "nav".into(),
            header: "header".into(),
            hero: "#hero".into(),
            sections: "section[id]".into(),
            content_cards: ".card, .case-study-card, .work-step, .desc-item, .testimonial".into(),
            testimonials: "testimonialsContainer".into(),
            testimonial_card: ".testimonial".into(),
            scroll_indicator: "scrollIndicator".into(),
            viewer: "imageViewer".into(),
            viewer_image: "fullScreenImage".into(),
            viewer_close: "closeImageViewer".into(),
            expandable_images: ".expandable-image".into(),
            labelled_controls: "a, button".into(),
        }
    }
}
