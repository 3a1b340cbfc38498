//! In-memory file tree for the library sidebar
//!
//! Nodes own their children. Sibling lists are kept sorted after every
//! mutation: containers first, then a natural (numeric-aware,
//! case-insensitive) name order.

use std::cmp::Ordering;
use std::collections::HashSet;

use thiserror::Error;

/// Name given to new nodes and to nodes renamed to an empty string
pub const UNTITLED: &str = "Untitled";

/// Errors raised by tree mutations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node not found: {0}")]
    NotFound(String),
    #[error("node {0} is not a folder")]
    NotAFolder(String),
    #[error("cannot drop node {0} onto itself")]
    DropOntoSelf(String),
    #[error("cannot move {dragged} into its own descendant {target}")]
    Cycle { dragged: String, target: String },
}

/// A file or folder in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub id: String,
    pub name: String,
    pub is_folder: bool,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a leaf file node
    pub fn file(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_folder: false,
            children: Vec::new(),
        }
    }

    /// Create an empty folder node
    pub fn folder(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_folder: true,
            children: Vec::new(),
        }
    }

    /// Builder helper for seeding folders
    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    /// Folders, and anything that already has children, sort before files
    pub fn is_container(&self) -> bool {
        self.is_folder || !self.children.is_empty()
    }

    /// Ids of every node below this one, depth-first, excluding itself
    pub fn descendant_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        collect_ids(&self.children, &mut ids);
        ids
    }
}

/// The library tree
#[derive(Debug, Clone)]
pub struct FileTree {
    roots: Vec<TreeNode>,
    next_id: u64,
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FileTree {
    /// Build a tree from seed nodes, sorting every level
    pub fn new(mut roots: Vec<TreeNode>) -> Self {
        sort_recursive(&mut roots);
        Self {
            roots,
            next_id: 1000,
        }
    }

    /// Top-level nodes
    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    /// Create an untitled file or folder and insert it.
    ///
    /// Returns the new node's id.
    pub fn create(&mut self, parent_id: Option<&str>, is_folder: bool) -> Result<String, TreeError> {
        let id = if is_folder {
            format!("folder-{}", self.next_id)
        } else {
            format!("file-{}", self.next_id)
        };
        let node = if is_folder {
            TreeNode::folder(id.clone(), UNTITLED)
        } else {
            TreeNode::file(id.clone(), UNTITLED)
        };
        self.insert(parent_id, node)?;
        self.next_id += 1;
        Ok(id)
    }

    /// Insert a node at the root or as the last child of a folder, then
    /// re-sort the affected sibling list.
    pub fn insert(&mut self, parent_id: Option<&str>, node: TreeNode) -> Result<(), TreeError> {
        match parent_id {
            None => {
                self.roots.push(node);
                sort_siblings(&mut self.roots);
            }
            Some(parent_id) => {
                let parent = find_mut(&mut self.roots, parent_id)
                    .ok_or_else(|| TreeError::NotFound(parent_id.to_string()))?;
                if !parent.is_folder {
                    return Err(TreeError::NotAFolder(parent_id.to_string()));
                }
                parent.children.push(node);
                sort_siblings(&mut parent.children);
            }
        }
        Ok(())
    }

    /// Rename a node in place. Blank names fall back to [`UNTITLED`].
    pub fn rename(&mut self, id: &str, new_name: &str) -> Result<(), TreeError> {
        let name = match new_name.trim() {
            "" => UNTITLED.to_string(),
            trimmed => trimmed.to_string(),
        };
        let siblings = siblings_containing(&mut self.roots, id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        if let Some(node) = siblings.iter_mut().find(|n| n.id == id) {
            node.name = name;
        }
        sort_siblings(siblings);
        Ok(())
    }

    /// Check whether `dragged_id` may be dropped into `target_id`
    pub fn check_drop(&self, dragged_id: &str, target_id: &str) -> Result<(), TreeError> {
        if dragged_id == target_id {
            return Err(TreeError::DropOntoSelf(dragged_id.to_string()));
        }
        let dragged = self
            .find_by_id(dragged_id)
            .ok_or_else(|| TreeError::NotFound(dragged_id.to_string()))?;
        let target = self
            .find_by_id(target_id)
            .ok_or_else(|| TreeError::NotFound(target_id.to_string()))?;
        if !target.is_folder {
            return Err(TreeError::NotAFolder(target_id.to_string()));
        }
        if dragged.descendant_ids().iter().any(|id| id == target_id) {
            return Err(TreeError::Cycle {
                dragged: dragged_id.to_string(),
                target: target_id.to_string(),
            });
        }
        Ok(())
    }

    /// Move a node with its subtree into a folder
    pub fn move_node(&mut self, dragged_id: &str, target_id: &str) -> Result<(), TreeError> {
        self.check_drop(dragged_id, target_id)?;

        let node = detach(&mut self.roots, dragged_id)
            .ok_or_else(|| TreeError::NotFound(dragged_id.to_string()))?;

        let Some(target) = find_mut(&mut self.roots, target_id) else {
            // check_drop rules this out; keep the node rather than lose it
            tracing::warn!("Drop target {} vanished during move", target_id);
            self.roots.push(node);
            sort_siblings(&mut self.roots);
            return Err(TreeError::NotFound(target_id.to_string()));
        };
        target.children.push(node);
        sort_siblings(&mut target.children);
        Ok(())
    }

    /// Remove a node and its whole subtree
    pub fn delete(&mut self, id: &str) -> Result<TreeNode, TreeError> {
        detach(&mut self.roots, id).ok_or_else(|| TreeError::NotFound(id.to_string()))
    }

    /// Depth-first lookup
    pub fn find_by_id(&self, id: &str) -> Option<&TreeNode> {
        find(&self.roots, id)
    }

    /// Every id in the tree, depth-first pre-order
    pub fn collect_all_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        collect_ids(&self.roots, &mut ids);
        ids
    }

    /// Id of the folder holding `id`, or `None` for root nodes and unknown ids
    pub fn parent_id_of(&self, id: &str) -> Option<&str> {
        fn walk<'a>(nodes: &'a [TreeNode], id: &str) -> Option<&'a str> {
            for node in nodes {
                if node.children.iter().any(|c| c.id == id) {
                    return Some(&node.id);
                }
                if let Some(found) = walk(&node.children, id) {
                    return Some(found);
                }
            }
            None
        }
        walk(&self.roots, id)
    }
}

fn find<'a>(nodes: &'a [TreeNode], id: &str) -> Option<&'a TreeNode> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find(&node.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_mut<'a>(nodes: &'a mut [TreeNode], id: &str) -> Option<&'a mut TreeNode> {
    for node in nodes.iter_mut() {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn siblings_containing<'a>(nodes: &'a mut Vec<TreeNode>, id: &str) -> Option<&'a mut Vec<TreeNode>> {
    if nodes.iter().any(|n| n.id == id) {
        return Some(nodes);
    }
    for node in nodes.iter_mut() {
        if let Some(found) = siblings_containing(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn detach(nodes: &mut Vec<TreeNode>, id: &str) -> Option<TreeNode> {
    if let Some(pos) = nodes.iter().position(|n| n.id == id) {
        return Some(nodes.remove(pos));
    }
    nodes.iter_mut().find_map(|n| detach(&mut n.children, id))
}

fn collect_ids(nodes: &[TreeNode], out: &mut Vec<String>) {
    for node in nodes {
        out.push(node.id.clone());
        collect_ids(&node.children, out);
    }
}

fn sort_recursive(nodes: &mut [TreeNode]) {
    sort_siblings(nodes);
    for node in nodes.iter_mut() {
        sort_recursive(&mut node.children);
    }
}

fn sort_siblings(nodes: &mut [TreeNode]) {
    nodes.sort_by(compare_nodes);
}

/// Sibling order: containers before files, then [`compare_names`]
pub fn compare_nodes(a: &TreeNode, b: &TreeNode) -> Ordering {
    match (a.is_container(), b.is_container()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => compare_names(&a.name, &b.name),
    }
}

/// Natural name order: digit runs compare by numeric value, text runs
/// compare case-insensitively, and digits sort before text.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let left = split_runs(a);
    let right = split_runs(b);
    for (l, r) in left.iter().zip(right.iter()) {
        let ord = compare_run(l, r);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}

fn split_runs(s: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut prev_digit = None;
    for (i, c) in s.char_indices() {
        let digit = c.is_ascii_digit();
        if prev_digit.is_some_and(|p| p != digit) {
            runs.push(&s[start..i]);
            start = i;
        }
        prev_digit = Some(digit);
    }
    if start < s.len() {
        runs.push(&s[start..]);
    }
    runs
}

fn compare_run(a: &str, b: &str) -> Ordering {
    let a_digit = a.starts_with(|c: char| c.is_ascii_digit());
    let b_digit = b.starts_with(|c: char| c.is_ascii_digit());
    match (a_digit, b_digit) {
        (true, true) => {
            let a_trim = a.trim_start_matches('0');
            let b_trim = b.trim_start_matches('0');
            a_trim
                .len()
                .cmp(&b_trim.len())
                .then_with(|| a_trim.cmp(b_trim))
                .then_with(|| a.len().cmp(&b.len()))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

/// An in-progress rename in the tree view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEdit {
    pub id: String,
    pub buffer: String,
}

/// An in-progress drag. Pointer tracking only exists while one is alive.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub dragged_id: String,
    /// Folder currently hovered, set only when it is a valid drop target
    pub over_id: Option<String>,
    pub pointer: Option<(f32, f32)>,
}

/// View state of the tree panel: expansion, renaming and dragging
#[derive(Debug, Clone, Default)]
pub struct TreeViewState {
    expanded: HashSet<String>,
    editing: Option<RenameEdit>,
    drag: Option<DragSession>,
}

impl TreeViewState {
    /// View state with the given ids expanded
    pub fn new<I, S>(expanded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expanded: expanded.into_iter().map(Into::into).collect(),
            editing: None,
            drag: None,
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn toggle(&mut self, id: &str) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
    }

    pub fn expand(&mut self, id: &str) {
        self.expanded.insert(id.to_string());
    }

    /// Collapse everything if everything is open, otherwise open everything
    pub fn toggle_all(&mut self, all_ids: &[String]) {
        if all_ids.iter().all(|id| self.expanded.contains(id)) {
            self.expanded.clear();
        } else {
            self.expanded.extend(all_ids.iter().cloned());
        }
    }

    /// Drop view state that refers to removed nodes
    pub fn forget(&mut self, removed: &[String]) {
        for id in removed {
            self.expanded.remove(id);
        }
        if self
            .editing
            .as_ref()
            .is_some_and(|edit| removed.contains(&edit.id))
        {
            self.editing = None;
        }
        if self.drag.as_ref().is_some_and(|drag| {
            removed.contains(&drag.dragged_id)
                || drag.over_id.as_ref().is_some_and(|over| removed.contains(over))
        }) {
            self.drag = None;
        }
    }

    pub fn begin_edit(&mut self, id: &str, current_name: &str) {
        self.editing = Some(RenameEdit {
            id: id.to_string(),
            buffer: current_name.to_string(),
        });
    }

    pub fn editing(&self) -> Option<&RenameEdit> {
        self.editing.as_ref()
    }

    pub fn editing_mut(&mut self) -> Option<&mut RenameEdit> {
        self.editing.as_mut()
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.editing.as_ref().is_some_and(|edit| edit.id == id)
    }

    /// End the rename and hand back what was typed
    pub fn take_edit(&mut self) -> Option<RenameEdit> {
        self.editing.take()
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Start dragging a node. Refused while a rename is open.
    pub fn begin_drag(&mut self, id: &str) -> bool {
        if self.editing.is_some() {
            return false;
        }
        self.drag = Some(DragSession {
            dragged_id: id.to_string(),
            over_id: None,
            pointer: None,
        });
        true
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self, id: &str) -> bool {
        self.drag.as_ref().is_some_and(|drag| drag.dragged_id == id)
    }

    /// Record the hovered folder if the dragged node may be dropped into it
    pub fn drag_over(&mut self, target_id: Option<&str>, tree: &FileTree) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.over_id = target_id
            .filter(|target| tree.check_drop(&drag.dragged_id, target).is_ok())
            .map(str::to_string);
    }

    pub fn track_pointer(&mut self, pos: (f32, f32)) {
        if let Some(drag) = self.drag.as_mut() {
            drag.pointer = Some(pos);
        }
    }

    /// End the drag, returning `(dragged, target)` when there is a drop to commit
    pub fn finish_drag(&mut self) -> Option<(String, String)> {
        let drag = self.drag.take()?;
        drag.over_id.map(|target| (drag.dragged_id, target))
    }

    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }
}
