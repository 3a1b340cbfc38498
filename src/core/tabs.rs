//! Editor tab list
//!
//! The list is never empty: closing the last tab synthesizes a placeholder.

/// Label of placeholder tabs
pub const NEW_TAB_LABEL: &str = "New Tab";

const INITIAL_TAB_ID: &str = "new-tab";

/// What a tab is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabKind {
    /// Start page, not bound to a document
    Placeholder,
    /// A document from the file tree
    File { file_id: String },
}

/// An open editor tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: String,
    pub label: String,
    pub kind: TabKind,
    /// Document markup, only meaningful for file-backed tabs
    pub content: Option<String>,
}

impl Tab {
    pub fn file_id(&self) -> Option<&str> {
        match &self.kind {
            TabKind::File { file_id } => Some(file_id),
            TabKind::Placeholder => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == TabKind::Placeholder
    }
}

/// Ordered tabs plus the active one
#[derive(Debug, Clone)]
pub struct TabSet {
    tabs: Vec<Tab>,
    active_id: String,
    next_id: u64,
}

impl Default for TabSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TabSet {
    /// A tab set holding one placeholder
    pub fn new() -> Self {
        Self {
            tabs: vec![Tab {
                id: INITIAL_TAB_ID.to_string(),
                label: NEW_TAB_LABEL.to_string(),
                kind: TabKind::Placeholder,
                content: None,
            }],
            active_id: INITIAL_TAB_ID.to_string(),
            next_id: 1000,
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// The active tab, `None` if the active id no longer resolves
    pub fn active(&self) -> Option<&Tab> {
        self.get(&self.active_id)
    }

    pub fn get(&self, id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    /// Open a tab and return the id of the tab that ends up active.
    ///
    /// Placeholders are always appended. A file already open in some tab
    /// re-activates that tab; otherwise the file replaces the active tab.
    pub fn open(&mut self, label: &str, kind: TabKind, content: Option<String>) -> String {
        match kind {
            TabKind::Placeholder => self.push(label, TabKind::Placeholder, None),
            TabKind::File { file_id } => {
                if let Some(existing) = self.tabs.iter().find(|t| t.file_id() == Some(file_id.as_str())) {
                    self.active_id = existing.id.clone();
                    return self.active_id.clone();
                }

                let active_id = self.active_id.clone();
                if let Some(active) = self.tabs.iter_mut().find(|t| t.id == active_id) {
                    active.label = label.to_string();
                    active.kind = TabKind::File { file_id };
                    active.content = Some(content.unwrap_or_default());
                    return active_id;
                }

                self.push(label, TabKind::File { file_id }, Some(content.unwrap_or_default()))
            }
        }
    }

    /// Append a fresh placeholder tab and activate it
    pub fn open_placeholder(&mut self) -> String {
        self.open(NEW_TAB_LABEL, TabKind::Placeholder, None)
    }

    fn push(&mut self, label: &str, kind: TabKind, content: Option<String>) -> String {
        let id = match kind {
            TabKind::Placeholder => format!("new-tab-{}", self.next_id),
            TabKind::File { .. } => format!("file-{}", self.next_id),
        };
        self.next_id += 1;
        self.tabs.push(Tab {
            id: id.clone(),
            label: label.to_string(),
            kind,
            content,
        });
        self.active_id = id.clone();
        id
    }

    /// Close a tab. Unknown ids are ignored.
    pub fn close(&mut self, id: &str) {
        let Some(index) = self.tabs.iter().position(|t| t.id == id) else {
            return;
        };
        self.tabs.remove(index);

        if self.tabs.is_empty() {
            self.open_placeholder();
            return;
        }

        if self.active_id == id {
            let fallback = index.saturating_sub(1);
            self.active_id = self.tabs[fallback].id.clone();
        }
    }

    /// Activate a tab; unknown ids are ignored
    pub fn set_active(&mut self, id: &str) {
        if self.get(id).is_some() {
            self.active_id = id.to_string();
        } else {
            tracing::debug!("Ignoring activation of unknown tab {}", id);
        }
    }

    /// Replace the stored markup of a file-backed tab
    pub fn update_content(&mut self, id: &str, content: String) {
        if let Some(tab) = self.tabs.iter_mut().find(|t| t.id == id) {
            if !tab.is_placeholder() {
                tab.content = Some(content);
            }
        }
    }

    /// Follow a file rename in the tree
    pub fn relabel_file(&mut self, file_id: &str, label: &str) {
        for tab in self.tabs.iter_mut().filter(|t| t.file_id() == Some(file_id)) {
            tab.label = label.to_string();
        }
    }

    /// Close every tab showing one of the given files
    pub fn close_files(&mut self, file_ids: &[String]) {
        let doomed: Vec<String> = self
            .tabs
            .iter()
            .filter(|t| t.file_id().is_some_and(|f| file_ids.iter().any(|id| id == f)))
            .map(|t| t.id.clone())
            .collect();
        for id in doomed {
            self.close(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn file(id: &str) -> TabKind {
        TabKind::File {
            file_id: id.to_string(),
        }
    }

    fn ids(set: &TabSet) -> Vec<&str> {
        set.tabs().iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_starts_with_placeholder() {
        let set = TabSet::new();
        assert_eq!(ids(&set), vec!["new-tab"]);
        assert!(set.active().unwrap().is_placeholder());
    }

    #[test]
    fn test_open_file_replaces_active_tab() {
        let mut set = TabSet::new();
        let id = set.open("Notes", file("notes"), Some("# Notes".to_string()));
        assert_eq!(id, "new-tab");
        assert_eq!(set.len(), 1);
        let tab = set.active().unwrap();
        assert_eq!(tab.file_id(), Some("notes"));
        assert_eq!(tab.content.as_deref(), Some("# Notes"));

        set.open("Other", file("other"), None);
        assert_eq!(set.len(), 1);
        assert_eq!(set.active().unwrap().file_id(), Some("other"));
        assert_eq!(set.active().unwrap().content.as_deref(), Some(""));
    }

    #[test]
    fn test_open_existing_file_activates_it() {
        let mut set = TabSet::new();
        set.open("A", file("a"), None);
        let placeholder = set.open_placeholder();
        assert_eq!(placeholder, "new-tab-1000");

        let id = set.open("A again", file("a"), None);
        assert_eq!(id, "new-tab");
        assert_eq!(set.len(), 2);
        assert_eq!(set.active().unwrap().label, "A");
    }

    #[test]
    fn test_close_active_falls_back_to_previous() {
        let mut set = TabSet::new();
        set.open_placeholder();
        let third = set.open_placeholder();
        set.set_active("new-tab-1000");
        set.close("new-tab-1000");
        assert_eq!(set.active_id(), "new-tab");
        assert_eq!(ids(&set), vec!["new-tab", third.as_str()]);
    }

    #[test]
    fn test_close_first_active_falls_back_to_next() {
        let mut set = TabSet::new();
        set.open_placeholder();
        set.set_active("new-tab");
        set.close("new-tab");
        assert_eq!(set.active_id(), "new-tab-1000");
    }

    #[test]
    fn test_close_inactive_keeps_active() {
        let mut set = TabSet::new();
        let second = set.open_placeholder();
        set.close("new-tab");
        assert_eq!(set.active_id(), second);
        set.close("missing");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_close_last_synthesizes_placeholder() {
        let mut set = TabSet::new();
        set.close("new-tab");
        assert_eq!(set.len(), 1);
        assert_eq!(set.active_id(), "new-tab-1000");
        assert!(set.active().unwrap().is_placeholder());
    }

    #[test]
    fn test_set_active_ignores_unknown() {
        let mut set = TabSet::new();
        set.set_active("nope");
        assert_eq!(set.active_id(), "new-tab");
    }

    #[test]
    fn test_update_content_skips_placeholders() {
        let mut set = TabSet::new();
        set.update_content("new-tab", "ignored".to_string());
        assert_eq!(set.active().unwrap().content, None);

        let id = set.open("A", file("a"), None);
        set.update_content(&id, "<h1>A</h1>".to_string());
        assert_eq!(set.active().unwrap().content.as_deref(), Some("<h1>A</h1>"));
    }

    #[test]
    fn test_relabel_and_close_files() {
        let mut set = TabSet::new();
        set.open("A", file("a"), None);
        set.open_placeholder();
        set.relabel_file("a", "Renamed");
        assert_eq!(set.get("new-tab").unwrap().label, "Renamed");

        set.close_files(&["a".to_string()]);
        assert_eq!(ids(&set), vec!["new-tab-1000"]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        OpenFile(u8),
        OpenPlaceholder,
        Close(usize),
        Activate(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..5).prop_map(Op::OpenFile),
            Just(Op::OpenPlaceholder),
            any::<usize>().prop_map(Op::Close),
            any::<usize>().prop_map(Op::Activate),
        ]
    }

    proptest! {
        #[test]
        fn tab_list_is_never_empty_and_files_are_unique(ops in prop::collection::vec(op_strategy(), 0..80)) {
            let mut set = TabSet::new();
            for op in ops {
                match op {
                    Op::OpenFile(n) => {
                        let file_id = format!("f{}", n);
                        let before = set.tabs().iter().find(|t| t.file_id() == Some(file_id.as_str())).map(|t| t.id.clone());
                        let active = set.open(&file_id, file(&file_id), None);
                        if let Some(existing) = before {
                            prop_assert_eq!(active, existing);
                        }
                        prop_assert_eq!(set.active().and_then(|t| t.file_id()), Some(file_id.as_str()));
                    }
                    Op::OpenPlaceholder => {
                        set.open_placeholder();
                    }
                    Op::Close(i) => {
                        let id = set.tabs()[i % set.len()].id.clone();
                        set.close(&id);
                    }
                    Op::Activate(i) => {
                        let id = set.tabs()[i % set.len()].id.clone();
                        set.set_active(&id);
                    }
                }

                prop_assert!(set.len() > 0);
                prop_assert!(set.active().is_some());
                let mut file_ids: Vec<&str> = set.tabs().iter().filter_map(|t| t.file_id()).collect();
                let total = file_ids.len();
                file_ids.sort_unstable();
                file_ids.dedup();
                prop_assert_eq!(file_ids.len(), total);
            }
        }
    }
}
