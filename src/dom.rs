use std::collections::{HashMap, HashSet};

use crate::selector::{
    SelectorAttrCondition, SelectorCombinator, SelectorPart, SelectorStep, parse_selector_groups,
};
use crate::{Error, Result};

// Recursive traversals grow the stack on demand so deeply nested markup
// cannot overflow it.
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

/// Opaque handle to a node in a page's document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Box metrics of an element.
///
/// There is no layout engine behind the document: metrics are whatever the
/// embedder reports through [`crate::Page::set_layout`]. `offset_top` and
/// `offset_left` are document coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Layout {
    pub offset_top: i64,
    pub offset_left: i64,
    pub offset_width: i64,
    pub offset_height: i64,
    pub client_width: i64,
    pub client_height: i64,
    pub scroll_width: i64,
    pub scroll_left: i64,
}

impl Layout {
    /// A vertically stacked block, such as a page section.
    pub fn block(top: i64, height: i64) -> Self {
        Self {
            offset_top: top,
            offset_height: height,
            client_height: height,
            ..Self::default()
        }
    }

    /// A fixed-size box without position, such as a card.
    pub fn sized(width: i64, height: i64) -> Self {
        Self {
            offset_width: width,
            offset_height: height,
            client_width: width,
            client_height: height,
            ..Self::default()
        }
    }

    /// A horizontal scroller showing `client_width` of `scroll_width` pixels.
    pub fn scroller(client_width: i64, scroll_width: i64) -> Self {
        Self {
            offset_width: client_width,
            client_width,
            scroll_width,
            ..Self::default()
        }
    }

    pub fn at(mut self, top: i64, left: i64) -> Self {
        self.offset_top = top;
        self.offset_left = left;
        self
    }

    pub fn max_scroll_left(&self) -> i64 {
        (self.scroll_width - self.client_width).max(0)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) layout: Layout,
}

#[derive(Debug, Clone)]
pub(crate) struct Dom {
    nodes: Vec<Node>,
    pub(crate) root: NodeId,
    id_index: HashMap<String, NodeId>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let element = Element {
            tag_name,
            attrs,
            layout: Layout::default(),
        };
        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = self
            .element(id)
            .and_then(|element| element.attrs.get("id").cloned())
        {
            if !id_attr.is_empty() {
                self.id_index.entry(id_attr).or_insert(id);
            }
        }
        id
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes.get(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn require_element_mut(&mut self, node_id: NodeId, what: &str) -> Result<&mut Element> {
        self.element_mut(node_id)
            .ok_or_else(|| Error::InvalidAction(format!("{what} target is not an element")))
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(node_id.0).and_then(|node| node.parent)
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub(crate) fn body(&self) -> Option<NodeId> {
        self.all_element_nodes()
            .into_iter()
            .find(|node| self.tag_name(*node) == Some("body"))
    }

    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        let mut out = String::new();
        self.append_text(node_id, &mut out);
        out
    }

    fn append_text(&self, node_id: NodeId, out: &mut String) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            match &self.nodes[node_id.0].node_type {
                NodeType::Text(text) => out.push_str(text),
                NodeType::Document | NodeType::Element(_) => {
                    for child in &self.nodes[node_id.0].children {
                        self.append_text(*child, out);
                    }
                }
            }
        })
    }

    pub(crate) fn set_text_content(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        self.require_element_mut(node_id, "textContent")?;
        let old_children = std::mem::take(&mut self.nodes[node_id.0].children);
        let detached_any = !old_children.is_empty();
        for child in old_children {
            self.nodes[child.0].parent = None;
        }
        if detached_any {
            self.rebuild_id_index();
        }
        if !value.is_empty() {
            self.create_text(node_id, value.to_string());
        }
        Ok(())
    }

    pub(crate) fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|e| e.attrs.get(&name.to_ascii_lowercase()).cloned())
    }

    pub(crate) fn has_attr(&self, node_id: NodeId, name: &str) -> bool {
        self.element(node_id)
            .is_some_and(|e| e.attrs.contains_key(&name.to_ascii_lowercase()))
    }

    pub(crate) fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let lowered = name.to_ascii_lowercase();
        let element = self.require_element_mut(node_id, "setAttribute")?;
        let old = element.attrs.insert(lowered.clone(), value.to_string());
        if lowered == "id" && old.as_deref() != Some(value) {
            self.rebuild_id_index();
        }
        Ok(())
    }

    /// Re-indexes ids over connected elements. The first element in tree
    /// order owns a duplicated id.
    fn rebuild_id_index(&mut self) {
        let mut index = HashMap::new();
        for node in self.all_element_nodes() {
            if let Some(id) = self.element(node).and_then(|e| e.attrs.get("id")) {
                if !id.is_empty() {
                    index.entry(id.clone()).or_insert(node);
                }
            }
        }
        self.id_index = index;
    }

    pub(crate) fn style_get(&self, node_id: NodeId, key: &str) -> String {
        let Some(element) = self.element(node_id) else {
            return String::new();
        };
        let name = js_prop_to_css_name(key);
        parse_style_declarations(element.attrs.get("style").map(String::as_str))
            .into_iter()
            .find(|(prop, _)| prop == &name)
            .map(|(_, value)| value)
            .unwrap_or_default()
    }

    /// Sets one inline style property; an empty value removes it.
    pub(crate) fn style_set(&mut self, node_id: NodeId, key: &str, value: &str) -> Result<()> {
        let name = js_prop_to_css_name(key);
        let element = self.require_element_mut(node_id, "style")?;

        let mut decls = parse_style_declarations(element.attrs.get("style").map(String::as_str));
        if let Some(pos) = decls.iter().position(|(prop, _)| prop == &name) {
            if value.is_empty() {
                decls.remove(pos);
            } else {
                decls[pos].1 = value.to_string();
            }
        } else if !value.is_empty() {
            decls.push((name, value.to_string()));
        }

        if decls.is_empty() {
            element.attrs.remove("style");
        } else {
            element
                .attrs
                .insert("style".to_string(), serialize_style_declarations(&decls));
        }
        Ok(())
    }

    pub(crate) fn class_contains(&self, node_id: NodeId, class_name: &str) -> bool {
        self.element(node_id)
            .is_some_and(|element| has_class(element, class_name))
    }

    pub(crate) fn class_add(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self.require_element_mut(node_id, "classList")?;
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        if !classes.iter().any(|name| name == class_name) {
            classes.push(class_name.to_string());
        }
        set_class_attr(element, &classes);
        Ok(())
    }

    pub(crate) fn class_remove(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self.require_element_mut(node_id, "classList")?;
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        classes.retain(|name| name != class_name);
        set_class_attr(element, &classes);
        Ok(())
    }

    pub(crate) fn layout(&self, node_id: NodeId) -> Layout {
        self.element(node_id)
            .map(|element| element.layout)
            .unwrap_or_default()
    }

    /// Replaces the box metrics. Returns whether `scroll_left` moved, which
    /// happens when the new range clamps it.
    pub(crate) fn set_layout(&mut self, node_id: NodeId, layout: Layout) -> Result<bool> {
        let element = self.require_element_mut(node_id, "layout")?;
        let previous = element.layout.scroll_left;
        element.layout = layout;
        element.layout.scroll_left = layout.scroll_left.clamp(0, layout.max_scroll_left());
        Ok(element.layout.scroll_left != previous)
    }

    /// Assigns `scrollLeft`, clamped to the scrollable range. Returns whether
    /// the position changed.
    pub(crate) fn set_scroll_left(&mut self, node_id: NodeId, value: i64) -> Result<bool> {
        let element = self.require_element_mut(node_id, "scrollLeft")?;
        let clamped = value.clamp(0, element.layout.max_scroll_left());
        let changed = element.layout.scroll_left != clamped;
        element.layout.scroll_left = clamped;
        Ok(changed)
    }

    pub(crate) fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let all = self.query_selector_all(selector)?;
        Ok(all.into_iter().next())
    }

    pub(crate) fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;

        if groups.len() == 1 && groups[0].len() == 1 {
            if let Some(id) = groups[0][0].step.id_only() {
                return Ok(self.by_id(id).into_iter().collect());
            }
        }

        let mut ids = Vec::new();
        self.collect_elements_dfs(self.root, &mut ids);
        Ok(self.filter_matching(ids, &groups))
    }

    pub(crate) fn query_selector_from(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let all = self.query_selector_all_from(root, selector)?;
        Ok(all.into_iter().next())
    }

    pub(crate) fn query_selector_all_from(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;
        let mut ids = Vec::new();
        for child in &self.nodes[root.0].children {
            self.collect_elements_dfs(*child, &mut ids);
        }
        Ok(self.filter_matching(ids, &groups))
    }

    fn filter_matching(&self, candidates: Vec<NodeId>, groups: &[Vec<SelectorPart>]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|candidate| {
                groups
                    .iter()
                    .any(|steps| self.matches_selector_chain(*candidate, steps))
                    && seen.insert(*candidate)
            })
            .collect()
    }

    pub(crate) fn closest(&self, node_id: NodeId, selector: &str) -> Result<Option<NodeId>> {
        if self.element(node_id).is_none() {
            return Ok(None);
        }

        let groups = parse_selector_groups(selector)?;
        let mut cursor = Some(node_id);
        while let Some(current) = cursor {
            if groups
                .iter()
                .any(|steps| self.matches_selector_chain(current, steps))
            {
                return Ok(Some(current));
            }
            cursor = self.parent(current);
        }
        Ok(None)
    }

    fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            if matches!(self.nodes[node_id.0].node_type, NodeType::Element(_)) {
                out.push(node_id);
            }
            for child in &self.nodes[node_id.0].children {
                self.collect_elements_dfs(*child, out);
            }
        })
    }

    pub(crate) fn all_element_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements_dfs(self.root, &mut out);
        out
    }

    fn matches_selector_chain(&self, node_id: NodeId, steps: &[SelectorPart]) -> bool {
        let Some(last) = steps.last() else {
            return false;
        };
        if !self.matches_step(node_id, &last.step) {
            return false;
        }

        let mut current = node_id;
        for idx in (1..steps.len()).rev() {
            let prev_step = &steps[idx - 1].step;
            let combinator = steps[idx]
                .combinator
                .unwrap_or(SelectorCombinator::Descendant);

            let matched = match combinator {
                SelectorCombinator::Child => self
                    .parent(current)
                    .filter(|parent| self.matches_step(*parent, prev_step)),
                SelectorCombinator::Descendant => {
                    let mut cursor = self.parent(current);
                    let mut found = None;
                    while let Some(parent) = cursor {
                        if self.matches_step(parent, prev_step) {
                            found = Some(parent);
                            break;
                        }
                        cursor = self.parent(parent);
                    }
                    found
                }
            };

            let Some(matched) = matched else {
                return false;
            };
            current = matched;
        }

        true
    }

    fn matches_step(&self, node_id: NodeId, step: &SelectorStep) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };

        if let Some(tag) = &step.tag {
            if !element.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &step.id {
            if element.attrs.get("id") != Some(id) {
                return false;
            }
        }

        if step
            .classes
            .iter()
            .any(|class_name| !has_class(element, class_name))
        {
            return false;
        }

        step.attrs.iter().all(|cond| match cond {
            SelectorAttrCondition::Exists { key } => element.attrs.contains_key(key),
            SelectorAttrCondition::Eq { key, value } => element.attrs.get(key) == Some(value),
        })
    }

    pub(crate) fn dump_node(&self, node_id: NodeId) -> String {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            match &self.nodes[node_id.0].node_type {
                NodeType::Document => self.nodes[node_id.0]
                    .children
                    .iter()
                    .map(|child| self.dump_node(*child))
                    .collect(),
                NodeType::Text(text) => text.clone(),
                NodeType::Element(element) => {
                    let mut attrs = element.attrs.iter().collect::<Vec<_>>();
                    attrs.sort_by(|a, b| a.0.cmp(b.0));

                    let mut out = format!("<{}", element.tag_name);
                    for (name, value) in attrs {
                        out.push_str(&format!(" {name}=\"{value}\""));
                    }
                    out.push('>');
                    for child in &self.nodes[node_id.0].children {
                        out.push_str(&self.dump_node(*child));
                    }
                    out.push_str(&format!("</{}>", element.tag_name));
                    out
                }
            }
        })
    }
}

fn has_class(element: &Element, class_name: &str) -> bool {
    element
        .attrs
        .get("class")
        .map(|classes| classes.split_whitespace().any(|c| c == class_name))
        .unwrap_or(false)
}

fn class_tokens(class_attr: Option<&str>) -> Vec<String> {
    class_attr
        .map(|value| value.split_whitespace().map(ToOwned::to_owned).collect())
        .unwrap_or_default()
}

fn set_class_attr(element: &mut Element, classes: &[String]) {
    if classes.is_empty() {
        element.attrs.remove("class");
    } else {
        element.attrs.insert("class".to_string(), classes.join(" "));
    }
}

fn js_prop_to_css_name(prop: &str) -> String {
    let mut out = String::new();
    for ch in prop.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn parse_style_declarations(style_attr: Option<&str>) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    let Some(style_attr) = style_attr else {
        return out;
    };

    for decl in style_attr.split(';') {
        let Some((name, value)) = decl.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            continue;
        }
        let value = value.trim().to_string();
        if let Some(pos) = out.iter().position(|(existing, _)| existing == &name) {
            out[pos].1 = value;
        } else {
            out.push((name, value));
        }
    }

    out
}

fn serialize_style_declarations(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(name, value)| format!("{name}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut it = value.chars();
    let mut out: String = it.by_ref().take(max_chars).collect();
    if it.next().is_some() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_html;

    fn sample() -> Result<Dom> {
        parse_html(
            r#"
            <body>
              <nav><ul id='navMenu'><li><a href='#about' class='link'>About</a></li></ul></nav>
              <section id='about'><p class='card lead'>Hello <b>there</b></p></section>
            </body>
            "#,
        )
    }

    #[test]
    fn style_set_round_trips_camel_case_properties() -> Result<()> {
        let mut dom = sample()?;
        let card = dom.query_selector(".card")?.expect("card");
        dom.style_set(card, "scrollSnapAlign", "start")?;
        dom.style_set(card, "opacity", "0")?;
        assert_eq!(dom.style_get(card, "scroll-snap-align"), "start");
        assert_eq!(
            dom.attr(card, "style").as_deref(),
            Some("scroll-snap-align: start; opacity: 0;")
        );

        dom.style_set(card, "opacity", "")?;
        dom.style_set(card, "scrollSnapAlign", "")?;
        assert!(!dom.has_attr(card, "style"));
        Ok(())
    }

    #[test]
    fn closest_walks_up_to_matching_ancestor() -> Result<()> {
        let dom = sample()?;
        let link = dom.query_selector("#navMenu a")?.expect("link");
        let nav = dom.closest(link, "nav")?;
        assert_eq!(nav.and_then(|n| dom.tag_name(n)), Some("nav"));

        let card = dom.query_selector(".card")?.expect("card");
        assert_eq!(dom.closest(card, "nav")?, None);
        Ok(())
    }

    #[test]
    fn text_content_concatenates_descendants() -> Result<()> {
        let dom = sample()?;
        let card = dom.query_selector(".card.lead")?.expect("card");
        assert_eq!(dom.text_content(card), "Hello there");
        Ok(())
    }

    #[test]
    fn set_text_content_replaces_children() -> Result<()> {
        let mut dom = sample()?;
        let card = dom.query_selector(".card")?.expect("card");
        dom.set_text_content(card, "✕")?;
        assert_eq!(dom.text_content(card), "✕");
        assert_eq!(dom.query_selector(".card b")?, None);
        Ok(())
    }

    #[test]
    fn scroll_left_is_clamped_to_scrollable_range() -> Result<()> {
        let mut dom = sample()?;
        let section = dom.by_id("about").expect("section");
        dom.set_layout(section, Layout::scroller(300, 1000))?;
        assert!(dom.set_scroll_left(section, 5000)?);
        assert_eq!(dom.layout(section).scroll_left, 700);
        assert!(dom.set_scroll_left(section, -20)?);
        assert_eq!(dom.layout(section).scroll_left, 0);
        assert!(!dom.set_scroll_left(section, 0)?);
        Ok(())
    }

    #[test]
    fn id_index_follows_attribute_changes() -> Result<()> {
        let mut dom = sample()?;
        let card = dom.query_selector(".card")?.expect("card");
        dom.set_attr(card, "id", "intro")?;
        assert_eq!(dom.by_id("intro"), Some(card));
        dom.set_attr(card, "id", "welcome")?;
        assert_eq!(dom.by_id("intro"), None);
        assert_eq!(dom.by_id("welcome"), Some(card));
        Ok(())
    }

    #[test]
    fn replaced_children_leave_the_id_index() -> Result<()> {
        let mut dom = parse_html("<button id='toggle'><span id='icon'>☰</span></button>")?;
        let toggle = dom.by_id("toggle").expect("toggle");
        assert!(dom.by_id("icon").is_some());
        dom.set_text_content(toggle, "✕")?;
        assert_eq!(dom.by_id("icon"), None);
        assert_eq!(dom.by_id("toggle"), Some(toggle));
        Ok(())
    }

    #[test]
    fn duplicate_ids_resolve_to_the_first_in_tree_order() -> Result<()> {
        let mut dom = parse_html("<p id='dup'>one</p><p id='other'>two</p>")?;
        let first = dom.by_id("dup").expect("first");
        let second = dom.by_id("other").expect("second");
        dom.set_attr(second, "id", "dup")?;
        assert_eq!(dom.by_id("dup"), Some(first));
        assert_eq!(dom.by_id("other"), None);

        dom.set_attr(first, "id", "moved")?;
        assert_eq!(dom.by_id("dup"), Some(second));
        assert_eq!(dom.by_id("moved"), Some(first));
        Ok(())
    }

    #[test]
    fn shrinking_layout_reports_a_clamped_scroll() -> Result<()> {
        let mut dom = sample()?;
        let section = dom.by_id("about").expect("section");
        assert!(!dom.set_layout(section, Layout::scroller(400, 1200))?);
        dom.set_scroll_left(section, 500)?;
        assert!(!dom.set_layout(section, Layout { scroll_left: 500, ..Layout::scroller(400, 1200) })?);
        assert!(dom.set_layout(section, Layout::scroller(400, 400))?);
        assert_eq!(dom.layout(section).scroll_left, 0);
        Ok(())
    }

    #[test]
    fn deep_nesting_does_not_overflow_traversal() -> Result<()> {
        let depth = 20_000;
        let markup = format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let dom = parse_html(&markup)?;
        assert_eq!(dom.all_element_nodes().len(), depth);
        assert_eq!(dom.text_content(dom.root), "x");
        Ok(())
    }

    #[test]
    fn truncate_chars_marks_elided_text() {
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("abc", 3), "abc");
    }
}
