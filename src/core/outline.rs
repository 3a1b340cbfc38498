//! Document outline: heading extraction, hierarchy building and navigation
//!
//! Headings are pulled out of the rendered HTML markup of a document. Their
//! `sequence_index` counts every heading element in the markup, including
//! empty ones that are dropped from the outline, so that it can be used to
//! find the same element again in the live rendered view.

use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

use regex_lite::{Captures, Regex};

use super::document::render_markup;
use super::tabs::Tab;

/// How long a heading stays highlighted after navigating to it
pub const HIGHLIGHT_DURATION: Duration = Duration::from_secs(1);

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<h([1-6])(?:\s[^>]*)?>(.*?)</h[1-6]\s*>").expect("heading pattern is valid")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("entity pattern is valid")
});

/// A heading found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub id: String,
    pub level: u8,
    pub text: String,
    /// Position among all heading elements of the markup
    pub sequence_index: usize,
}

/// A heading with the headings nested below it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingNode {
    pub heading: Heading,
    pub children: Vec<HeadingNode>,
}

impl HeadingNode {
    fn new(heading: Heading) -> Self {
        Self {
            heading,
            children: Vec::new(),
        }
    }
}

/// Find all non-empty `<h1>`..`<h6>` elements in document order
pub fn extract_headings(markup: &str) -> Vec<Heading> {
    HEADING_RE
        .captures_iter(markup)
        .enumerate()
        .filter_map(|(index, caps)| {
            let level = caps.get(1)?.as_str().parse::<u8>().ok()?;
            let text = text_content(caps.get(2).map_or("", |m| m.as_str()));
            if text.is_empty() {
                return None;
            }
            Some(Heading {
                id: format!("heading-{}-{}", level, index),
                level,
                text,
                sequence_index: index,
            })
        })
        .collect()
}

/// Text of an element body: tags stripped, entities decoded, trimmed
fn text_content(inner: &str) -> String {
    let stripped = TAG_RE.replace_all(inner, "");
    let decoded = ENTITY_RE.replace_all(&stripped, |caps: &Captures| decode_entity(&caps[0], &caps[1]));
    decoded.trim().to_string()
}

fn decode_entity(raw: &str, name: &str) -> String {
    let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = name.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };
    if let Some(code) = code {
        return char::from_u32(code).map_or_else(|| raw.to_string(), String::from);
    }
    match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        _ => raw,
    }
    .to_string()
}

/// Nest a flat heading list.
///
/// Each heading becomes a child of the nearest open heading with a lower
/// level. Only level 1 and 2 headings stay open as parents; deeper ones are
/// always leaves for later headings.
pub fn build_hierarchy(headings: &[Heading]) -> Vec<HeadingNode> {
    let mut roots: Vec<HeadingNode> = Vec::new();
    // (level, index path into `roots`) of every open parent candidate
    let mut stack: Vec<(u8, Vec<usize>)> = Vec::new();

    for heading in headings {
        while stack.last().is_some_and(|(level, _)| *level >= heading.level) {
            stack.pop();
        }

        let level = heading.level;
        let node = HeadingNode::new(heading.clone());
        let parent_path = stack.last().map(|(_, path)| path.clone());
        let parent = parent_path
            .as_deref()
            .and_then(|p| node_at_mut(&mut roots, p).map(|parent| (p, parent)));
        let path = match parent {
            Some((parent_path, parent)) => {
                parent.children.push(node);
                let mut path = parent_path.to_vec();
                path.push(parent.children.len() - 1);
                path
            }
            None => {
                roots.push(node);
                vec![roots.len() - 1]
            }
        };

        if level <= 2 {
            stack.push((level, path));
        }
    }

    roots
}

fn node_at_mut<'a>(roots: &'a mut [HeadingNode], path: &[usize]) -> Option<&'a mut HeadingNode> {
    let (first, rest) = path.split_first()?;
    let mut node = roots.get_mut(*first)?;
    for &i in rest {
        node = node.children.get_mut(i)?;
    }
    Some(node)
}

/// Case-insensitive substring filter over heading text.
///
/// Applied before [`build_hierarchy`], so a match whose ancestors do not
/// match surfaces without them.
pub fn filter_headings(headings: &[Heading], query: &str) -> Vec<Heading> {
    let query = query.to_lowercase();
    if query.is_empty() {
        return headings.to_vec();
    }
    headings
        .iter()
        .filter(|h| h.text.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

/// Opaque reference to a heading element of a rendered document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeadingHandle(pub usize);

/// A live rendering of the active document
pub trait DocumentView {
    /// All heading elements currently rendered, in document order
    fn query_heading_elements(&self) -> Vec<HeadingHandle>;

    fn scroll_into_view(&mut self, handle: HeadingHandle);

    fn highlight(&mut self, handle: HeadingHandle, duration: Duration);
}

/// Scroll the view to the heading at `sequence_index` and flash it.
///
/// Only valid while the view still shows the markup the index came from.
pub fn scroll_to_heading(view: &mut dyn DocumentView, sequence_index: usize) -> bool {
    let Some(handle) = view.query_heading_elements().get(sequence_index).copied() else {
        tracing::debug!("No rendered heading at index {}", sequence_index);
        return false;
    };
    view.scroll_into_view(handle);
    view.highlight(handle, HIGHLIGHT_DURATION);
    true
}

/// Outline panel state for the active tab
#[derive(Debug, Clone, Default)]
pub struct OutlineState {
    source: Option<(String, String)>,
    headings: Vec<Heading>,
    expanded: HashSet<String>,
    selected: Option<String>,
    query: String,
    search_open: bool,
    collapsed: bool,
}

impl OutlineState {
    /// Re-extract headings when the active tab or its content changed.
    ///
    /// Placeholder tabs have no outline.
    pub fn sync(&mut self, active: Option<&Tab>) {
        let source = active
            .filter(|tab| !tab.is_placeholder())
            .and_then(|tab| Some((tab.id.clone(), tab.content.clone()?)));
        if source == self.source {
            return;
        }

        self.headings = source
            .as_ref()
            .map(|(_, content)| extract_headings(&render_markup(content)))
            .unwrap_or_default();
        self.expanded = self
            .headings
            .iter()
            .filter(|h| h.level == 1)
            .map(|h| h.id.clone())
            .collect();
        self.selected = None;
        self.query.clear();
        self.source = source;
    }

    pub fn headings(&self) -> &[Heading] {
        &self.headings
    }

    /// Hierarchy of the headings matching the current query
    pub fn visible_hierarchy(&self) -> Vec<HeadingNode> {
        build_hierarchy(&filter_headings(&self.headings, &self.query))
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn toggle_node(&mut self, id: &str) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
    }

    pub fn select(&mut self, id: &str) {
        self.selected = Some(id.to_string());
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut String {
        &mut self.query
    }

    pub fn is_search_open(&self) -> bool {
        self.search_open
    }

    /// Search button: clears an active query, otherwise opens or closes the field
    pub fn press_search(&mut self) {
        if self.query.is_empty() {
            self.search_open = !self.search_open;
        } else {
            self.query.clear();
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn toggle_collapsed(&mut self) {
        self.collapsed = !self.collapsed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tabs::{TabKind, TabSet};
    use pretty_assertions::assert_eq;

    fn shape(nodes: &[HeadingNode]) -> String {
        nodes
            .iter()
            .map(|n| {
                if n.children.is_empty() {
                    n.heading.text.clone()
                } else {
                    format!("{} {{ {} }}", n.heading.text, shape(&n.children))
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[test]
    fn test_extract_headings_in_order() {
        let headings = extract_headings("<h2>Two</h2><p>x</p><H1 class=\"big\">One</H1>");
        assert_eq!(
            headings,
            vec![
                Heading {
                    id: "heading-2-0".to_string(),
                    level: 2,
                    text: "Two".to_string(),
                    sequence_index: 0,
                },
                Heading {
                    id: "heading-1-1".to_string(),
                    level: 1,
                    text: "One".to_string(),
                    sequence_index: 1,
                },
            ]
        );
    }

    #[test]
    fn test_empty_heading_still_consumes_index() {
        let headings = extract_headings("<h1></h1><h1>Real</h1>");
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].text, "Real");
        assert_eq!(headings[0].sequence_index, 1);
        assert_eq!(headings[0].id, "heading-1-1");
    }

    #[test]
    fn test_text_content_strips_tags_and_entities() {
        let headings = extract_headings("<h3>  <em>Fish</em> &amp; Chips&#33; </h3><h4> <br> </h4>");
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].text, "Fish & Chips!");
    }

    #[test]
    fn test_build_hierarchy_example() {
        let headings = extract_headings("<h1>A</h1><h2>B</h2><h3>C</h3><h2>D</h2>");
        let forest = build_hierarchy(&headings);
        assert_eq!(shape(&forest), "A { B { C }, D }");
    }

    #[test]
    fn test_deep_headings_do_not_nest() {
        let headings = extract_headings("<h1>A</h1><h3>B</h3><h4>C</h4><h5>D</h5>");
        let forest = build_hierarchy(&headings);
        assert_eq!(shape(&forest), "A { B, C, D }");
    }

    #[test]
    fn test_multiple_roots() {
        let headings = extract_headings("<h2>A</h2><h3>B</h3><h1>C</h1><h1>D</h1><h2>E</h2>");
        let forest = build_hierarchy(&headings);
        assert_eq!(shape(&forest), "A { B }, C, D { E }");
    }

    #[test]
    fn test_hierarchy_is_deterministic() {
        let markup = "<h1>A</h1><h2>B</h2><h6>C</h6><h2>D</h2><h1>E</h1>";
        assert_eq!(
            build_hierarchy(&extract_headings(markup)),
            build_hierarchy(&extract_headings(markup))
        );
    }

    #[test]
    fn test_filter_loses_ancestors() {
        let headings = extract_headings("<h1>Intro</h1><h2>Setup</h2><h3>Install steps</h3>");
        let filtered = filter_headings(&headings, "INSTALL");
        assert_eq!(shape(&build_hierarchy(&filtered)), "Install steps");
        assert_eq!(filter_headings(&headings, "").len(), 3);
    }

    #[derive(Default)]
    struct FakeView {
        count: usize,
        scrolled: Vec<HeadingHandle>,
        highlighted: Vec<(HeadingHandle, Duration)>,
    }

    impl DocumentView for FakeView {
        fn query_heading_elements(&self) -> Vec<HeadingHandle> {
            (0..self.count).map(HeadingHandle).collect()
        }

        fn scroll_into_view(&mut self, handle: HeadingHandle) {
            self.scrolled.push(handle);
        }

        fn highlight(&mut self, handle: HeadingHandle, duration: Duration) {
            self.highlighted.push((handle, duration));
        }
    }

    #[test]
    fn test_scroll_to_heading() {
        let mut view = FakeView {
            count: 2,
            ..Default::default()
        };
        assert!(scroll_to_heading(&mut view, 1));
        assert_eq!(view.scrolled, vec![HeadingHandle(1)]);
        assert_eq!(view.highlighted, vec![(HeadingHandle(1), HIGHLIGHT_DURATION)]);

        assert!(!scroll_to_heading(&mut view, 2));
        assert_eq!(view.scrolled.len(), 1);
    }

    #[test]
    fn test_outline_state_follows_active_tab() {
        let mut tabs = TabSet::new();
        let mut outline = OutlineState::default();
        outline.sync(tabs.active());
        assert!(outline.headings().is_empty());

        let id = tabs.open(
            "Doc",
            TabKind::File {
                file_id: "doc".to_string(),
            },
            Some("# Top\n\n## Sub\n".to_string()),
        );
        outline.sync(tabs.active());
        assert_eq!(outline.headings().len(), 2);
        assert!(outline.is_expanded("heading-1-0"));
        assert!(!outline.is_expanded("heading-2-1"));

        outline.select("heading-2-1");
        outline.query_mut().push_str("sub");
        outline.sync(tabs.active());
        assert_eq!(outline.selected(), Some("heading-2-1"));

        tabs.update_content(&id, "# Other\n".to_string());
        outline.sync(tabs.active());
        assert_eq!(outline.headings().len(), 1);
        assert_eq!(outline.selected(), None);
        assert_eq!(outline.query(), "");
    }

    #[test]
    fn test_press_search() {
        let mut outline = OutlineState::default();
        outline.press_search();
        assert!(outline.is_search_open());
        outline.query_mut().push_str("x");
        outline.press_search();
        assert_eq!(outline.query(), "");
        assert!(outline.is_search_open());
    }
}
