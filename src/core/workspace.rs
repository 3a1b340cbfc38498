//! The state owner behind every view
//!
//! Views read through the accessors and mutate only through the methods here,
//! so cross-model effects (tab relabels, outline refresh, view-state cleanup)
//! happen in one place.

use std::collections::HashMap;

use tokio::runtime::Handle;

use super::chat::ChatSession;
use super::config::AppConfig;
use super::document::{word_count, Document};
use super::outline::OutlineState;
use super::seed;
use super::tabs::{TabKind, TabSet};
use super::tree::{FileTree, TreeViewState, UNTITLED};

pub struct Workspace {
    tree: FileTree,
    view: TreeViewState,
    tabs: TabSet,
    outline: OutlineState,
    chat: ChatSession,
    documents: HashMap<String, Document>,
}

impl Workspace {
    /// Workspace populated with the sample library
    pub fn new(runtime: Handle, config: &AppConfig) -> Self {
        let tree = FileTree::new(seed::library());
        let view = TreeViewState::new(seed::expanded_folders(tree.roots()));
        let documents = seed::documents()
            .into_iter()
            .map(|(id, content)| (id, Document::new(content)))
            .collect();

        let mut chat = ChatSession::new(runtime, &config.chat);
        chat.new_conversation();
        chat.push_history(seed::past_conversation());

        Self {
            tree,
            view,
            tabs: TabSet::new(),
            outline: OutlineState::default(),
            chat,
            documents,
        }
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn view(&self) -> &TreeViewState {
        &self.view
    }

    /// Expansion and edit-buffer changes that need no model update
    pub fn view_mut(&mut self) -> &mut TreeViewState {
        &mut self.view
    }

    pub fn tabs(&self) -> &TabSet {
        &self.tabs
    }

    pub fn outline(&self) -> &OutlineState {
        &self.outline
    }

    pub fn outline_mut(&mut self) -> &mut OutlineState {
        &mut self.outline
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn chat_mut(&mut self) -> &mut ChatSession {
        &mut self.chat
    }

    /// Create an untitled node and start renaming it
    pub fn create_node(&mut self, parent_id: Option<&str>, is_folder: bool) -> Option<String> {
        let id = match self.tree.create(parent_id, is_folder) {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!("Create rejected: {}", e);
                return None;
            }
        };

        if let Some(parent) = parent_id {
            self.view.expand(parent);
        }
        if is_folder {
            self.view.expand(&id);
        } else {
            self.documents.insert(id.clone(), Document::default());
        }
        self.view.begin_edit(&id, UNTITLED);
        tracing::debug!("Created {}", id);
        Some(id)
    }

    /// Open the rename field on an existing node
    pub fn begin_rename(&mut self, id: &str) {
        if let Some(node) = self.tree.find_by_id(id) {
            let name = node.name.clone();
            self.view.cancel_drag();
            self.view.begin_edit(id, &name);
        }
    }

    /// Apply the rename buffer, relabelling any open tab of the file
    pub fn commit_rename(&mut self) {
        let Some(edit) = self.view.take_edit() else {
            return;
        };
        if let Err(e) = self.tree.rename(&edit.id, &edit.buffer) {
            tracing::debug!("Rename rejected: {}", e);
            return;
        }
        if let Some(node) = self.tree.find_by_id(&edit.id) {
            if !node.is_folder {
                let name = node.name.clone();
                self.tabs.relabel_file(&edit.id, &name);
            }
        }
    }

    pub fn cancel_rename(&mut self) {
        self.view.cancel_edit();
    }

    /// Delete a node with its subtree, closing tabs of removed files
    pub fn delete_node(&mut self, id: &str) {
        let removed = match self.tree.delete(id) {
            Ok(node) => node,
            Err(e) => {
                tracing::debug!("Delete rejected: {}", e);
                return;
            }
        };

        let mut ids = vec![removed.id.clone()];
        ids.extend(removed.descendant_ids());
        self.tabs.close_files(&ids);
        self.view.forget(&ids);
        for id in &ids {
            self.documents.remove(id);
        }
        self.sync_outline();
        tracing::debug!("Deleted {} ({} nodes)", id, ids.len());
    }

    /// Collapse or expand every node
    pub fn toggle_all(&mut self) {
        let ids = self.tree.collect_all_ids();
        self.view.toggle_all(&ids);
    }

    pub fn begin_drag(&mut self, id: &str) -> bool {
        self.view.begin_drag(id)
    }

    pub fn drag_over(&mut self, target_id: Option<&str>) {
        self.view.drag_over(target_id, &self.tree);
    }

    /// End the current drag, moving the node when it was over a valid folder
    pub fn finish_drag(&mut self) -> bool {
        let Some((dragged, target)) = self.view.finish_drag() else {
            return false;
        };
        match self.tree.move_node(&dragged, &target) {
            Ok(()) => {
                self.view.expand(&target);
                tracing::debug!("Moved {} into {}", dragged, target);
                true
            }
            Err(e) => {
                tracing::debug!("Move rejected: {}", e);
                false
            }
        }
    }

    /// Show a file in the editor
    pub fn open_file(&mut self, id: &str) {
        let Some(node) = self.tree.find_by_id(id) else {
            return;
        };
        if node.is_folder {
            return;
        }
        let label = node.name.clone();
        let content = self
            .documents
            .get(id)
            .map(|doc| doc.content.clone())
            .unwrap_or_default();
        self.tabs.open(
            &label,
            TabKind::File {
                file_id: id.to_string(),
            },
            Some(content),
        );
        self.sync_outline();
    }

    pub fn new_tab(&mut self) {
        self.tabs.open_placeholder();
        self.sync_outline();
    }

    pub fn close_tab(&mut self, id: &str) {
        self.tabs.close(id);
        self.sync_outline();
    }

    pub fn activate_tab(&mut self, id: &str) {
        self.tabs.set_active(id);
        self.sync_outline();
    }

    /// Store edited markdown of the active tab and its document
    pub fn update_active_content(&mut self, content: String) {
        let Some(tab) = self.tabs.active() else {
            return;
        };
        let tab_id = tab.id.clone();
        if let Some(file_id) = tab.file_id() {
            self.documents
                .entry(file_id.to_string())
                .or_default()
                .set_content(content.clone());
        }
        self.tabs.update_content(&tab_id, content);
        self.sync_outline();
    }

    /// Word count of the active document
    pub fn active_word_count(&self) -> usize {
        self.tabs
            .active()
            .and_then(|tab| tab.content.as_deref())
            .map(word_count)
            .unwrap_or(0)
    }

    /// Whether the document behind a file id was edited this session
    pub fn is_modified(&self, file_id: &str) -> bool {
        self.documents.get(file_id).is_some_and(|doc| doc.modified)
    }

    fn sync_outline(&mut self) {
        self.outline.sync(self.tabs.active());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn workspace() -> Workspace {
        Workspace::new(Handle::current(), &AppConfig::default())
    }

    #[tokio::test]
    async fn test_seeded_state() {
        let ws = workspace();
        assert!(ws.view().is_expanded("01"));
        assert_eq!(ws.chat().conversations().len(), 2);
        assert_eq!(ws.chat().active_id(), Some(ws.chat().conversations()[0].id.as_str()));
        assert!(ws.tabs().active().unwrap().is_placeholder());
    }

    #[tokio::test]
    async fn test_open_file_refreshes_outline() {
        let mut ws = workspace();
        ws.open_file("concept-a");
        assert_eq!(ws.tabs().len(), 1);
        assert_eq!(ws.tabs().active().unwrap().label, "Concepts");
        let texts: Vec<&str> = ws.outline().headings().iter().map(|h| h.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Concepts", "Embeddings", "Attention", "Self-attention", "Cross-attention"]
        );

        ws.open_file("01");
        assert_eq!(ws.tabs().active().unwrap().file_id(), Some("concept-a"));
    }

    #[tokio::test]
    async fn test_create_starts_rename_and_commit_relabels_tab() {
        let mut ws = workspace();
        let id = ws.create_node(Some("04"), false).unwrap();
        assert!(ws.view().is_editing(&id));
        assert!(ws.view().is_expanded("04"));

        ws.open_file(&id);
        ws.view_mut().editing_mut().unwrap().buffer = "  Fresh ".to_string();
        ws.commit_rename();
        assert_eq!(ws.tree().find_by_id(&id).unwrap().name, "Fresh");
        assert_eq!(ws.tabs().active().unwrap().label, "Fresh");
        assert!(ws.view().editing().is_none());
    }

    #[tokio::test]
    async fn test_create_under_file_is_ignored() {
        let mut ws = workspace();
        assert_eq!(ws.create_node(Some("hi"), true), None);
        assert!(ws.view().editing().is_none());
    }

    #[tokio::test]
    async fn test_delete_folder_closes_its_tabs() {
        let mut ws = workspace();
        ws.open_file("20250917");
        ws.new_tab();
        ws.open_file("mulerun");
        assert_eq!(ws.tabs().len(), 2);

        ws.delete_node("01");
        assert!(ws.tree().find_by_id("20250917").is_none());
        assert_eq!(ws.tabs().len(), 1);
        assert_eq!(ws.tabs().active().unwrap().file_id(), Some("mulerun"));
        assert!(!ws.view().is_expanded("01"));
    }

    #[tokio::test]
    async fn test_drag_into_descendant_leaves_tree_unchanged() {
        let mut ws = workspace();
        let before = ws.tree().roots().to_vec();
        assert!(ws.begin_drag("03"));
        ws.drag_over(Some("product-insights"));
        assert_eq!(ws.view().drag().unwrap().over_id, None);
        assert!(!ws.finish_drag());
        assert_eq!(ws.tree().roots(), before.as_slice());
        assert!(ws.view().drag().is_none());
    }

    #[tokio::test]
    async fn test_drag_into_folder_moves_and_expands() {
        let mut ws = workspace();
        assert!(ws.begin_drag("hi"));
        ws.drag_over(Some("02"));
        assert!(ws.finish_drag());
        assert_eq!(ws.tree().parent_id_of("hi"), Some("02"));
        assert!(ws.view().is_expanded("02"));
    }

    #[tokio::test]
    async fn test_edit_updates_document_and_word_count() {
        let mut ws = workspace();
        ws.open_file("hi");
        assert_eq!(ws.active_word_count(), 1);
        ws.update_active_content("# Hi there\n\nthree more words".to_string());
        assert_eq!(ws.active_word_count(), 5);
        assert!(ws.is_modified("hi"));
        assert_eq!(ws.outline().headings()[0].text, "Hi there");

        ws.new_tab();
        ws.open_file("hi");
        assert_eq!(ws.tabs().active().unwrap().content.as_deref(), Some("# Hi there\n\nthree more words"));
    }
}
