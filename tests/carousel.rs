use page_interactions::{Action, EventKind, Layout, Page, Result, ScrollBehavior, TouchPoint};

const PAGE_HTML: &str = r#"
<body>
  <nav>
    <button id='mobileMenuBtn'>☰</button>
    <ul id='navMenu'><li><a href='#testimonials'>Testimonials</a></li></ul>
  </nav>
  <section id='testimonials'>
    <div id='testimonialsContainer' tabindex='0'>
      <div class='testimonial' id='t1'>One</div>
      <div class='testimonial' id='t2'>Two</div>
      <div class='testimonial' id='t3'>Three</div>
    </div>
    <div id='scrollIndicator'>Scroll</div>
  </section>
</body>
"#;

fn booted_page() -> Result<Page> {
    let mut page = Page::from_html(PAGE_HTML)?;
    page.set_layout("#testimonialsContainer", Layout::scroller(400, 1200).at(3000, 20))?;
    page.set_layout(".testimonial", Layout::sized(368, 300))?;
    page.boot()?;
    Ok(page)
}

#[test]
fn indicator_hides_near_the_end() -> Result<()> {
    let mut page = booted_page()?;
    page.assert_style("#scrollIndicator", "display", "flex")?;

    page.scroll_element_to("#testimonialsContainer", 789)?;
    page.assert_style("#scrollIndicator", "display", "flex")?;

    page.scroll_element_to("#testimonialsContainer", 790)?;
    page.assert_style("#scrollIndicator", "display", "none")?;

    page.scroll_element_to("#testimonialsContainer", 100)?;
    page.assert_style("#scrollIndicator", "display", "flex")?;
    Ok(())
}

#[test]
fn shrinking_content_clamps_the_offset_and_hides_the_indicator() -> Result<()> {
    let mut page = booted_page()?;
    page.scroll_element_to("#testimonialsContainer", 500)?;
    page.assert_style("#scrollIndicator", "display", "flex")?;

    page.set_layout("#testimonialsContainer", Layout::scroller(400, 400).at(3000, 20))?;
    assert_eq!(page.scroll_left("#testimonialsContainer")?, 0);
    page.assert_style("#scrollIndicator", "display", "none")?;
    Ok(())
}

#[test]
fn boot_applies_scroll_snapping() -> Result<()> {
    let page = booted_page()?;
    page.assert_style("#testimonialsContainer", "scroll-snap-type", "x mandatory")?;
    for card in ["#t1", "#t2", "#t3"] {
        page.assert_style(card, "scroll-snap-align", "start")?;
    }
    Ok(())
}

#[test]
fn arrow_keys_step_by_one_card_and_gap() -> Result<()> {
    let mut page = booted_page()?;
    page.focus("#testimonialsContainer")?;

    page.press_key("ArrowRight")?;
    assert_eq!(page.scroll_left("#testimonialsContainer")?, 400);
    assert_eq!(page.last_scroll_behavior(), Some(ScrollBehavior::Smooth));

    page.press_key("ArrowRight")?;
    assert_eq!(page.scroll_left("#testimonialsContainer")?, 800);
    page.assert_style("#scrollIndicator", "display", "none")?;

    // Clamped at the end of the strip.
    page.press_key("ArrowRight")?;
    assert_eq!(page.scroll_left("#testimonialsContainer")?, 800);

    page.press_key("ArrowLeft")?;
    assert_eq!(page.scroll_left("#testimonialsContainer")?, 400);
    page.assert_style("#scrollIndicator", "display", "flex")?;

    page.press_key("Enter")?;
    assert_eq!(page.scroll_left("#testimonialsContainer")?, 400);
    Ok(())
}

#[test]
fn arrow_keys_need_focus_inside_the_strip() -> Result<()> {
    let mut page = booted_page()?;
    page.press_key("ArrowRight")?;
    assert_eq!(page.scroll_left("#testimonialsContainer")?, 0);

    page.focus("#t2")?;
    page.press_key("ArrowRight")?;
    assert_eq!(page.scroll_left("#testimonialsContainer")?, 400);

    page.blur("#t2")?;
    page.press_key("ArrowRight")?;
    assert_eq!(page.scroll_left("#testimonialsContainer")?, 400);
    Ok(())
}

#[test]
fn touch_drag_scrolls_at_twice_the_finger_distance() -> Result<()> {
    let mut page = booted_page()?;
    page.scroll_element_to("#testimonialsContainer", 300)?;

    page.touch_start("#t1", TouchPoint::at(220.0, 3100.0))?;
    page.touch_move("#t1", TouchPoint::at(170.0, 3100.0))?;
    assert_eq!(page.scroll_left("#testimonialsContainer")?, 400);

    page.touch_move("#t1", TouchPoint::at(300.0, 3100.0))?;
    assert_eq!(page.scroll_left("#testimonialsContainer")?, 140);

    page.touch_end("#t1", TouchPoint::at(300.0, 3100.0))?;
    page.touch_move("#t1", TouchPoint::at(100.0, 3100.0))?;
    assert_eq!(page.scroll_left("#testimonialsContainer")?, 140);
    Ok(())
}

#[test]
fn drag_starting_at_the_left_edge_is_ignored() -> Result<()> {
    let mut page = booted_page()?;
    page.scroll_element_to("#testimonialsContainer", 300)?;

    // pageX 20 minus the container's 20px offset is a start of 0.
    page.touch_start("#t1", TouchPoint::at(20.0, 3100.0))?;
    page.touch_move("#t1", TouchPoint::at(120.0, 3100.0))?;
    assert_eq!(page.scroll_left("#testimonialsContainer")?, 300);
    Ok(())
}

#[test]
fn strip_without_cards_ignores_arrow_keys() -> Result<()> {
    let mut page = Page::from_html(
        r#"<body>
          <nav><button id='mobileMenuBtn'>☰</button><ul id='navMenu'></ul></nav>
          <div id='testimonialsContainer'><p id='empty'>No testimonials yet</p></div>
          <div id='scrollIndicator'></div>
        </body>"#,
    )?;
    page.set_layout("#testimonialsContainer", Layout::scroller(400, 1200))?;
    page.boot()?;
    page.focus("#testimonialsContainer")?;
    page.press_key("ArrowRight")?;
    assert_eq!(page.scroll_left("#testimonialsContainer")?, 0);
    Ok(())
}

#[test]
fn missing_indicator_disables_the_carousel() -> Result<()> {
    let mut page = Page::from_html(
        r#"<body>
          <nav><button id='mobileMenuBtn'>☰</button><ul id='navMenu'></ul></nav>
          <div id='testimonialsContainer'><div class='testimonial' id='t1'>One</div></div>
        </body>"#,
    )?;
    page.set_layout("#testimonialsContainer", Layout::scroller(400, 1200))?;
    page.set_layout("#t1", Layout::sized(368, 300))?;
    page.boot()?;

    let bindings = page.bindings_on("#testimonialsContainer")?;
    assert!(bindings.is_empty(), "unexpected bindings: {bindings:?}");
    page.assert_style("#testimonialsContainer", "scroll-snap-type", "")?;

    page.focus("#testimonialsContainer")?;
    page.press_key("ArrowRight")?;
    assert_eq!(page.scroll_left("#testimonialsContainer")?, 0);
    Ok(())
}

#[test]
fn container_listeners_cover_scroll_keys_and_touch() -> Result<()> {
    let page = booted_page()?;
    assert_eq!(
        page.bindings_on("#testimonialsContainer")?,
        vec![
            (EventKind::Scroll, Action::UpdateScrollIndicator),
            (EventKind::KeyDown, Action::StepCarousel),
            (EventKind::TouchStart, Action::BeginCarouselDrag),
            (EventKind::TouchMove, Action::DragCarousel),
            (EventKind::TouchEnd, Action::EndCarouselDrag),
        ]
    );
    Ok(())
}
