use crate::config::{InteractionConfig, PageIds};
use crate::controller::{Controller, MenuState, SwipeDirection, ViewerState};
use crate::dom::{Dom, Layout, NodeId, truncate_chars};
use crate::events::{Action, Binding, Event, EventKind, ListenerTable, ListenerTarget, TouchPoint};
use crate::html::parse_html;
use crate::timers::{PendingTimer, Task, TimerQueue};
use crate::{Error, Result};

/// How a programmatic scroll asked to move. There is no animation engine:
/// both behaviors land on the final offset immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Viewport {
    pub(crate) scroll_y: i64,
    pub(crate) width: i64,
    pub(crate) height: i64,
}

/// Everything a handler may touch while it runs.
pub(crate) struct Host {
    pub(crate) dom: Dom,
    pub(crate) viewport: Viewport,
    pub(crate) timers: TimerQueue,
    pub(crate) active_element: Option<NodeId>,
    pending_scrolls: Vec<ListenerTarget>,
    last_scroll_behavior: Option<ScrollBehavior>,
    trace: bool,
    trace_events: bool,
    trace_timers: bool,
    trace_logs: Vec<String>,
    trace_log_limit: usize,
    trace_to_stderr: bool,
}

impl Host {
    fn new(dom: Dom) -> Self {
        Self {
            dom,
            viewport: Viewport {
                scroll_y: 0,
                width: 1280,
                height: 800,
            },
            timers: TimerQueue::new(),
            active_element: None,
            pending_scrolls: Vec::new(),
            last_scroll_behavior: None,
            trace: false,
            trace_events: true,
            trace_timers: true,
            trace_logs: Vec::new(),
            trace_log_limit: 10_000,
            trace_to_stderr: true,
        }
    }

    pub(crate) fn scroll_window_to(&mut self, top: i64, behavior: ScrollBehavior) {
        let top = top.max(0);
        self.last_scroll_behavior = Some(behavior);
        if self.viewport.scroll_y != top {
            self.viewport.scroll_y = top;
            self.queue_scroll(ListenerTarget::Window);
        }
    }

    pub(crate) fn scroll_element_by(
        &mut self,
        node: NodeId,
        delta: i64,
        behavior: ScrollBehavior,
    ) -> Result<()> {
        self.last_scroll_behavior = Some(behavior);
        let current = self.dom.layout(node).scroll_left;
        self.set_scroll_left(node, current.saturating_add(delta))
    }

    pub(crate) fn set_scroll_left(&mut self, node: NodeId, value: i64) -> Result<()> {
        if self.dom.set_scroll_left(node, value)? {
            self.queue_scroll(ListenerTarget::Node(node));
        }
        Ok(())
    }

    fn queue_scroll(&mut self, target: ListenerTarget) {
        if !self.pending_scrolls.contains(&target) {
            self.pending_scrolls.push(target);
        }
    }

    pub(crate) fn schedule(&mut self, delay_ms: i64, task: Task) -> i64 {
        let (id, due_at) = self.timers.schedule(delay_ms, task);
        self.trace_timer_line(format!(
            "[timer] schedule timeout id={id} due_at={due_at} delay_ms={delay_ms} task={}",
            task.label()
        ));
        id
    }

    pub(crate) fn set_body_style(&mut self, key: &str, value: &str) -> Result<()> {
        match self.dom.body() {
            Some(body) => self.dom.style_set(body, key, value),
            None => Ok(()),
        }
    }

    pub(crate) fn node_label(&self, node: NodeId) -> String {
        if let Some(id) = self.dom.attr(node, "id") {
            if !id.is_empty() {
                return format!("#{id}");
            }
        }
        if node == self.dom.root {
            return "document".into();
        }
        self.dom
            .tag_name(node)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| format!("node-{}", node.0))
    }

    fn target_label(&self, target: ListenerTarget) -> String {
        match target {
            ListenerTarget::Window => "window".into(),
            ListenerTarget::Node(node) => self.node_label(node),
        }
    }

    pub(crate) fn trace_enabled(&self) -> bool {
        self.trace
    }

    fn trace_event_line(&mut self, line: String) {
        if self.trace && self.trace_events {
            self.trace_line(line);
        }
    }

    fn trace_timer_line(&mut self, line: String) {
        if self.trace && self.trace_timers {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_line(&mut self, line: String) {
        if self.trace {
            if self.trace_to_stderr {
                eprintln!("{line}");
            }
            if self.trace_logs.len() >= self.trace_log_limit {
                self.trace_logs.remove(0);
            }
            self.trace_logs.push(line);
        }
    }
}

/// A loaded page: host document plus, once booted, its interaction
/// controller.
///
/// ```
/// use page_interactions::{Page, Result};
///
/// fn main() -> Result<()> {
///     let mut page = Page::from_html(
///         "<body><nav><button id='mobileMenuBtn'>☰</button>\
///          <ul id='navMenu'><li><a href='#about'>About</a></li></ul></nav></body>",
///     )?;
///     page.boot()?;
///     page.click("#mobileMenuBtn")?;
///     page.assert_class("#navMenu", "active", true)?;
///     page.assert_text("#mobileMenuBtn", "✕")?;
///     Ok(())
/// }
/// ```
pub struct Page {
    host: Host,
    listeners: ListenerTable,
    controller: Option<Controller>,
    config: InteractionConfig,
    ids: PageIds,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::with_config(html, InteractionConfig::default(), PageIds::default())
    }

    pub fn with_config(html: &str, config: InteractionConfig, ids: PageIds) -> Result<Self> {
        let dom = parse_html(html)?;
        Ok(Self {
            host: Host::new(dom),
            listeners: ListenerTable::default(),
            controller: None,
            config,
            ids,
        })
    }

    /// Runs the document-ready initialization: queries the page, applies
    /// initial styles and attaches every listener.
    pub fn boot(&mut self) -> Result<()> {
        if self.controller.is_some() {
            return Err(Error::InvalidAction("page is already booted".into()));
        }
        let controller = Controller::attach(
            &mut self.host,
            &mut self.listeners,
            &self.config,
            &self.ids,
        )?;
        self.controller = Some(controller);
        let root = self.host.dom.root;
        self.dispatch(Event::new(
            EventKind::DomContentLoaded,
            ListenerTarget::Node(root),
        ))
    }

    pub fn is_booted(&self) -> bool {
        self.controller.is_some()
    }

    /// Fires the window `load` event.
    pub fn finish_loading(&mut self) -> Result<()> {
        self.dispatch(Event::new(EventKind::Load, ListenerTarget::Window))
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch(Event::new(EventKind::Click, ListenerTarget::Node(target)))
    }

    /// Presses a key on the focused element, or on the body when nothing has
    /// focus.
    pub fn press_key(&mut self, key: &str) -> Result<()> {
        let target = self
            .host
            .active_element
            .or_else(|| self.host.dom.body())
            .unwrap_or(self.host.dom.root);
        self.dispatch(Event::new(EventKind::KeyDown, ListenerTarget::Node(target)).with_key(key))
    }

    pub fn focus(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.focus_node(target)
    }

    pub fn blur(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.blur_node(target)
    }

    pub fn is_focused(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.host.active_element == Some(target))
    }

    pub fn scroll_window_to(&mut self, top: i64) -> Result<()> {
        self.host.scroll_window_to(top, ScrollBehavior::Auto);
        self.settle()
    }

    pub fn scroll_element_to(&mut self, selector: &str, left: i64) -> Result<()> {
        let target = self.select_one(selector)?;
        self.host.set_scroll_left(target, left)?;
        self.settle()
    }

    pub fn touch_start(&mut self, selector: &str, touch: TouchPoint) -> Result<()> {
        self.touch(selector, EventKind::TouchStart, touch)
    }

    pub fn touch_move(&mut self, selector: &str, touch: TouchPoint) -> Result<()> {
        self.touch(selector, EventKind::TouchMove, touch)
    }

    pub fn touch_end(&mut self, selector: &str, touch: TouchPoint) -> Result<()> {
        self.touch(selector, EventKind::TouchEnd, touch)
    }

    fn touch(&mut self, selector: &str, kind: EventKind, touch: TouchPoint) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch(Event::new(kind, ListenerTarget::Node(target)).with_touch(touch))
    }

    pub fn hover(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch(Event::new(EventKind::MouseEnter, ListenerTarget::Node(target)))
    }

    pub fn unhover(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch(Event::new(EventKind::MouseLeave, ListenerTarget::Node(target)))
    }

    pub fn image_loaded(&mut self, selector: &str) -> Result<()> {
        let target = self.select_image(selector)?;
        self.dispatch(Event::new(EventKind::Load, ListenerTarget::Node(target)))
    }

    pub fn image_failed(&mut self, selector: &str) -> Result<()> {
        let target = self.select_image(selector)?;
        self.dispatch(Event::new(EventKind::Error, ListenerTarget::Node(target)))
    }

    /// Reports new box metrics for every element matching `selector`. An
    /// element whose horizontal offset gets clamped receives a `scroll`.
    pub fn set_layout(&mut self, selector: &str, layout: Layout) -> Result<()> {
        let targets = self.host.dom.query_selector_all(selector)?;
        if targets.is_empty() {
            return Err(Error::SelectorNotFound(selector.into()));
        }
        for target in targets {
            if self.host.dom.set_layout(target, layout)? {
                self.host.queue_scroll(ListenerTarget::Node(target));
            }
        }
        self.settle()
    }

    pub fn set_viewport_size(&mut self, width: i64, height: i64) -> Result<()> {
        if width < 0 || height < 0 {
            return Err(Error::InvalidAction(format!(
                "viewport size must be non-negative (width={width}, height={height})"
            )));
        }
        self.host.viewport.width = width;
        self.host.viewport.height = height;
        self.settle()
    }

    pub fn scroll_y(&self) -> i64 {
        self.host.viewport.scroll_y
    }

    pub fn viewport_size(&self) -> (i64, i64) {
        (self.host.viewport.width, self.host.viewport.height)
    }

    pub fn last_scroll_behavior(&self) -> Option<ScrollBehavior> {
        self.host.last_scroll_behavior
    }

    pub fn scroll_left(&self, selector: &str) -> Result<i64> {
        let target = self.select_one(selector)?;
        Ok(self.host.dom.layout(target).scroll_left)
    }

    pub fn style(&self, selector: &str, property: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.host.dom.style_get(target, property))
    }

    pub fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        Ok(self.host.dom.attr(target, name))
    }

    pub fn has_class(&self, selector: &str, class_name: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.host.dom.class_contains(target, class_name))
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.host.dom.text_content(target))
    }

    pub fn menu_state(&self) -> Option<MenuState> {
        self.controller.as_ref().map(Controller::menu_state)
    }

    pub fn viewer_state(&self) -> Option<ViewerState> {
        self.controller
            .as_ref()
            .and_then(|controller| controller.viewer_state().cloned())
    }

    pub fn last_swipe(&self) -> Option<SwipeDirection> {
        self.controller.as_ref().and_then(Controller::last_swipe)
    }

    pub fn is_scroll_throttled(&self) -> bool {
        self.controller
            .as_ref()
            .is_some_and(Controller::is_scroll_throttled)
    }

    /// Every attached listener in registration order.
    pub fn bindings(&self) -> Vec<Binding> {
        self.listeners.bindings().to_vec()
    }

    /// Listeners attached to the first element matching `selector`; `document`
    /// and `window` name the document and the window.
    pub fn bindings_on(&self, selector: &str) -> Result<Vec<(EventKind, Action)>> {
        let target = match selector {
            "window" => ListenerTarget::Window,
            "document" => ListenerTarget::Node(self.host.dom.root),
            _ => ListenerTarget::Node(self.select_one(selector)?),
        };
        Ok(self
            .listeners
            .bindings()
            .iter()
            .filter(|binding| binding.target == target)
            .map(|binding| (binding.kind, binding.action))
            .collect())
    }

    pub fn now_ms(&self) -> i64 {
        self.host.timers.now_ms()
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        self.host.timers.pending()
    }

    pub fn clear_timer(&mut self, timer_id: i64) -> bool {
        let existed = self.host.timers.clear(timer_id);
        self.host
            .trace_timer_line(format!("[timer] clear id={timer_id} removed={existed}"));
        existed
    }

    pub fn clear_all_timers(&mut self) -> usize {
        let cleared = self.host.timers.clear_all();
        self.host
            .trace_timer_line(format!("[timer] clear_all cleared={cleared}"));
        cleared
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        self.host.timers.set_step_limit(max_steps)
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        let from = self.host.timers.advance(delta_ms)?;
        let ran = self.run_timer_queue(Some(self.now_ms()), false)?;
        self.host.trace_timer_line(format!(
            "[timer] advance delta_ms={delta_ms} from={from} to={} ran_due={ran}",
            self.now_ms()
        ));
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        let from = self.host.timers.advance_to(target_ms)?;
        let ran = self.run_timer_queue(Some(self.now_ms()), false)?;
        self.host.trace_timer_line(format!(
            "[timer] advance_to from={from} to={} ran_due={ran}",
            self.now_ms()
        ));
        Ok(())
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        let ran = self.run_timer_queue(Some(self.now_ms()), false)?;
        self.host.trace_timer_line(format!(
            "[timer] run_due now_ms={} ran={ran}",
            self.now_ms()
        ));
        Ok(ran)
    }

    /// Runs every queued timer, moving the clock to each one's due time.
    pub fn flush(&mut self) -> Result<()> {
        let from = self.now_ms();
        let ran = self.run_timer_queue(None, true)?;
        self.host.trace_timer_line(format!(
            "[timer] flush from={from} to={} ran={ran}",
            self.now_ms()
        ));
        Ok(())
    }

    fn run_timer_queue(&mut self, due_limit: Option<i64>, advance_clock: bool) -> Result<usize> {
        let mut steps = 0usize;
        while let Some((id, due_at, task)) = self.host.timers.take_next(due_limit, advance_clock) {
            steps += 1;
            if steps > self.host.timers.step_limit() {
                return Err(Error::InvalidAction(format!(
                    "flush exceeded max task steps: limit={}, now_ms={}, pending_tasks={}",
                    self.host.timers.step_limit(),
                    self.now_ms(),
                    self.host.timers.len()
                )));
            }
            self.host.trace_timer_line(format!(
                "[timer] run id={id} due_at={due_at} now_ms={} task={}",
                self.now_ms(),
                task.label()
            ));
            self.execute_task(task)?;
        }
        Ok(steps)
    }

    fn execute_task(&mut self, task: Task) -> Result<()> {
        match task {
            Task::ReleaseScrollThrottle => {
                if let Some(controller) = self.controller.as_mut() {
                    controller.release_scroll_throttle();
                }
                Ok(())
            }
            Task::Focus(node) => self.focus_node(node),
        }
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.host.dom.text_content(target);
        self.check(selector, target, expected, actual)
    }

    pub fn assert_attr(&self, selector: &str, name: &str, expected: Option<&str>) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.host.dom.attr(target, name);
        self.check(
            selector,
            target,
            &format!("{name}={expected:?}"),
            format!("{name}={:?}", actual.as_deref()),
        )
    }

    pub fn assert_class(&self, selector: &str, class_name: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.host.dom.class_contains(target, class_name);
        self.check(
            selector,
            target,
            &format!("class {class_name}={expected}"),
            format!("class {class_name}={actual}"),
        )
    }

    pub fn assert_style(&self, selector: &str, property: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.host.dom.style_get(target, property);
        self.check(
            selector,
            target,
            &format!("{property}: {expected}"),
            format!("{property}: {actual}"),
        )
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        self.select_one(selector).map(|_| ())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.host.dom.dump_node(target))
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.host.trace = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.host.trace_logs)
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.host.trace_to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.host.trace_events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.host.trace_timers = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::InvalidAction(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.host.trace_log_limit = max_entries;
        let overflow = self.host.trace_logs.len().saturating_sub(max_entries);
        self.host.trace_logs.drain(..overflow);
        Ok(())
    }

    fn check(&self, selector: &str, target: NodeId, expected: &str, actual: String) -> Result<()> {
        if actual == expected {
            return Ok(());
        }
        Err(Error::AssertionFailed {
            selector: selector.into(),
            expected: expected.into(),
            actual,
            dom_snippet: truncate_chars(&self.host.dom.dump_node(target), 200),
        })
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.host
            .dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.into()))
    }

    fn select_image(&self, selector: &str) -> Result<NodeId> {
        let target = self.select_one(selector)?;
        let tag = self.host.dom.tag_name(target).unwrap_or_default();
        if tag != "img" {
            return Err(Error::TypeMismatch {
                selector: selector.into(),
                expected: "img".into(),
                actual: tag.into(),
            });
        }
        Ok(target)
    }

    fn focus_node(&mut self, node: NodeId) -> Result<()> {
        if self.host.active_element == Some(node) {
            return Ok(());
        }
        if let Some(current) = self.host.active_element {
            self.blur_node(current)?;
        }
        self.host.active_element = Some(node);
        self.dispatch(Event::new(EventKind::Focus, ListenerTarget::Node(node)))
    }

    fn blur_node(&mut self, node: NodeId) -> Result<()> {
        if self.host.active_element != Some(node) {
            return Ok(());
        }
        self.host.active_element = None;
        self.dispatch(Event::new(EventKind::Blur, ListenerTarget::Node(node)))
    }

    /// Dispatches one event, then delivers the scroll events and visibility
    /// changes it caused.
    fn dispatch(&mut self, event: Event) -> Result<()> {
        self.dispatch_one(event)?;
        self.settle()
    }

    fn dispatch_one(&mut self, mut event: Event) -> Result<Event> {
        for current in self.propagation_path(event.target, event.kind.bubbles()) {
            event.current_target = current;
            for action in self.listeners.get(current, event.kind) {
                if self.host.trace {
                    let target_label = self.host.target_label(event.target);
                    let current_label = self.host.target_label(current);
                    self.host.trace_event_line(format!(
                        "[event] {} target={target_label} current={current_label} action={action:?}",
                        event.kind
                    ));
                }
                if let Some(controller) = self.controller.as_mut() {
                    controller.handle(action, &mut self.host, &mut event)?;
                }
            }
        }
        self.trace_event_done(&event);
        Ok(event)
    }

    fn trace_event_done(&mut self, event: &Event) {
        if !self.host.trace {
            return;
        }
        let target_label = self.host.target_label(event.target);
        self.host.trace_event_line(format!(
            "[event] done {} target={target_label} default_prevented={}",
            event.kind, event.default_prevented
        ));
    }

    fn propagation_path(&self, target: ListenerTarget, bubbles: bool) -> Vec<ListenerTarget> {
        let ListenerTarget::Node(node) = target else {
            return vec![ListenerTarget::Window];
        };
        if !bubbles {
            return vec![target];
        }
        let mut path = vec![target];
        let mut cursor = self.host.dom.parent(node);
        while let Some(parent) = cursor {
            path.push(ListenerTarget::Node(parent));
            cursor = self.host.dom.parent(parent);
        }
        path.push(ListenerTarget::Window);
        path
    }

    /// Delivers queued scroll events (which may queue more) and re-evaluates
    /// visibility observation.
    fn settle(&mut self) -> Result<()> {
        let mut rounds = 0usize;
        while !self.host.pending_scrolls.is_empty() {
            rounds += 1;
            if rounds > self.host.timers.step_limit() {
                return Err(Error::InvalidAction(format!(
                    "scroll delivery did not settle after {} rounds",
                    self.host.timers.step_limit()
                )));
            }
            for target in std::mem::take(&mut self.host.pending_scrolls) {
                self.dispatch_one(Event::new(EventKind::Scroll, target))?;
            }
        }
        if let Some(controller) = self.controller.as_mut() {
            controller.refresh_visibility(&mut self.host)?;
        }
        Ok(())
    }
}
