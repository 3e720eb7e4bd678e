use page_interactions::{
    Action, Error, EventKind, Layout, MenuState, Page, Result, ScrollBehavior,
};

const PAGE_HTML: &str = r#"
<body>
  <header>
    <nav>
      <a class='logo' href='#hero'>JD</a>
      <button id='mobileMenuBtn'>☰</button>
      <ul id='navMenu'>
        <li><a id='link-about' href='#about'>About</a></li>
        <li><a id='link-work' href='#work'>Work</a></li>
        <li><a id='link-missing' href='#missing'>Missing</a></li>
        <li><a id='link-cv' href='https://example.com/cv.pdf'>CV</a></li>
      </ul>
    </nav>
  </header>
  <section id='hero'><h1>Hello</h1></section>
  <section id='about'><p id='about-copy'>About me</p></section>
  <section id='work'><p>Work</p></section>
</body>
"#;

fn booted_page() -> Result<Page> {
    let mut page = Page::from_html(PAGE_HTML)?;
    page.set_layout("header", Layout::block(0, 80))?;
    page.set_layout("#hero", Layout::block(0, 600))?;
    page.set_layout("#about", Layout::block(600, 500))?;
    page.set_layout("#work", Layout::block(1100, 700))?;
    page.boot()?;
    Ok(page)
}

#[test]
fn toggle_opens_and_closes_the_menu() -> Result<()> {
    let mut page = booted_page()?;
    assert_eq!(page.menu_state(), Some(MenuState::Closed));

    page.click("#mobileMenuBtn")?;
    page.assert_class("#navMenu", "active", true)?;
    page.assert_text("#mobileMenuBtn", "✕")?;
    assert_eq!(page.menu_state(), Some(MenuState::Open));

    page.click("#mobileMenuBtn")?;
    page.assert_class("#navMenu", "active", false)?;
    page.assert_text("#mobileMenuBtn", "☰")?;
    assert_eq!(page.menu_state(), Some(MenuState::Closed));
    Ok(())
}

#[test]
fn nav_link_closes_menu_and_scrolls_section_under_header() -> Result<()> {
    let mut page = booted_page()?;
    page.click("#mobileMenuBtn")?;

    page.click("#link-about")?;
    page.assert_class("#navMenu", "active", false)?;
    page.assert_text("#mobileMenuBtn", "☰")?;
    assert_eq!(page.scroll_y(), 520);
    assert_eq!(page.last_scroll_behavior(), Some(ScrollBehavior::Smooth));

    // The programmatic scroll reaches the scroll listeners too.
    page.assert_class("#link-about", "active", true)?;
    page.assert_class("#link-work", "active", false)?;
    Ok(())
}

#[test]
fn missing_fragment_and_external_links_do_not_scroll() -> Result<()> {
    let mut page = booted_page()?;
    page.scroll_window_to(300)?;

    page.click("#mobileMenuBtn")?;
    page.click("#link-missing")?;
    assert_eq!(page.scroll_y(), 300);
    assert_eq!(page.menu_state(), Some(MenuState::Closed));

    page.click("#link-cv")?;
    assert_eq!(page.scroll_y(), 300);
    Ok(())
}

#[test]
fn links_outside_the_menu_keep_their_default_jump() -> Result<()> {
    let mut page = booted_page()?;
    page.click("a.logo")?;
    assert_eq!(page.scroll_y(), 0);
    assert_eq!(page.last_scroll_behavior(), None);
    Ok(())
}

#[test]
fn clicking_outside_the_nav_closes_the_menu() -> Result<()> {
    let mut page = booted_page()?;
    page.click("#mobileMenuBtn")?;

    page.click("#navMenu")?;
    assert_eq!(page.menu_state(), Some(MenuState::Open));

    page.click("#about-copy")?;
    assert_eq!(page.menu_state(), Some(MenuState::Closed));
    page.assert_text("#mobileMenuBtn", "☰")?;
    Ok(())
}

#[test]
fn escape_closes_the_menu_from_anywhere() -> Result<()> {
    let mut page = booted_page()?;
    page.click("#mobileMenuBtn")?;

    page.press_key("Enter")?;
    assert_eq!(page.menu_state(), Some(MenuState::Open));

    page.press_key("Escape")?;
    assert_eq!(page.menu_state(), Some(MenuState::Closed));
    page.assert_class("#navMenu", "active", false)?;
    Ok(())
}

#[test]
fn opening_the_menu_focuses_its_first_link_after_a_delay() -> Result<()> {
    let mut page = booted_page()?;
    page.click("#mobileMenuBtn")?;

    let pending = page.pending_timers();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].due_at, 100);
    assert_eq!(pending[0].task, "focus");

    page.advance_time(99)?;
    assert!(!page.is_focused("#link-about")?);
    page.advance_time(1)?;
    assert!(page.is_focused("#link-about")?);
    Ok(())
}

#[test]
fn closing_the_menu_schedules_no_focus_change() -> Result<()> {
    let mut page = booted_page()?;
    page.click("#mobileMenuBtn")?;
    page.flush()?;
    page.click("#mobileMenuBtn")?;
    assert!(page.pending_timers().is_empty());
    Ok(())
}

#[test]
fn boot_fails_fast_without_the_menu_toggle() -> Result<()> {
    let mut page = Page::from_html("<body><ul id='navMenu'><li><a href='#a'>A</a></li></ul></body>")?;
    match page.boot() {
        Err(Error::MissingElement(selector)) => assert_eq!(selector, "#mobileMenuBtn"),
        other => panic!("expected missing toggle, got: {other:?}"),
    }
    assert!(!page.is_booted());
    Ok(())
}

#[test]
fn boot_fails_fast_without_the_nav_menu() -> Result<()> {
    let mut page = Page::from_html("<body><button id='mobileMenuBtn'>☰</button></body>")?;
    assert_eq!(
        page.boot(),
        Err(Error::MissingElement("#navMenu".into()))
    );
    Ok(())
}

#[test]
fn booting_twice_is_rejected() -> Result<()> {
    let mut page = booted_page()?;
    assert!(matches!(page.boot(), Err(Error::InvalidAction(_))));
    Ok(())
}

#[test]
fn listeners_are_attached_in_order() -> Result<()> {
    let page = booted_page()?;
    assert_eq!(
        page.bindings_on("#mobileMenuBtn")?,
        vec![
            (EventKind::Click, Action::ToggleMenu),
            (EventKind::Click, Action::FocusMenuOnOpen),
        ]
    );
    assert_eq!(
        page.bindings_on("#link-work")?,
        vec![
            (EventKind::Click, Action::CloseMenuFromLink),
            (EventKind::Click, Action::ScrollToSection),
        ]
    );
    assert_eq!(
        page.bindings_on("window")?,
        vec![
            (EventKind::Scroll, Action::StyleHeader),
            (EventKind::Scroll, Action::Parallax),
            (EventKind::Scroll, Action::UpdateActiveNav),
            (EventKind::Load, Action::MarkLoaded),
        ]
    );
    Ok(())
}

#[test]
fn nothing_reacts_before_boot() -> Result<()> {
    let mut page = Page::from_html(PAGE_HTML)?;
    page.click("#mobileMenuBtn")?;
    page.assert_class("#navMenu", "active", false)?;
    assert_eq!(page.menu_state(), None);
    assert!(page.bindings().is_empty());
    Ok(())
}

#[test]
fn toggle_glyph_replaces_icon_markup() -> Result<()> {
    let mut page = Page::from_html(
        "<body><nav><button id='mobileMenuBtn'><span id='icon'>☰</span></button>\
         <ul id='navMenu'><li><a href='#about'>About</a></li></ul></nav></body>",
    )?;
    page.boot()?;
    page.assert_exists("#icon")?;

    page.click("#mobileMenuBtn")?;
    page.assert_text("#mobileMenuBtn", "✕")?;
    assert!(matches!(
        page.assert_exists("#icon"),
        Err(Error::SelectorNotFound(_))
    ));
    Ok(())
}
