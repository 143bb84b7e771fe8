//! Lazily loaded directory tree.
//!
//! Nodes live in an arena (`Vec<TreeNode>`) and point at their parent by
//! [`NodeId`]. A directory's children are read from disk the first time it is
//! expanded; afterwards it is "materialized" and expanding it again only
//! reopens it.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{AppError, Result};

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The root node is always the first node inserted.
    pub const ROOT: NodeId = NodeId(0);
}

/// Type of filesystem node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    File,
    Directory,
}

/// File metadata for sorting and display.
#[derive(Debug, Clone, Default)]
pub struct FileMeta {
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub is_hidden: bool,
}

/// A node in the directory tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Path component for this node. The root's label is the full root path.
    pub label: OsString,
    pub parent: Option<NodeId>,
    pub node_type: NodeType,
    pub children: Vec<NodeId>,
    pub is_open: bool,
    /// Stands in for the not-yet-read children of a non-empty directory.
    pub has_placeholder: bool,
    pub meta: FileMeta,
}

impl TreeNode {
    /// Display name (lossy for non-UTF-8 labels).
    pub fn name(&self) -> String {
        self.label.to_string_lossy().into_owned()
    }
}

/// Sort criteria for the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Alphabetical (case-insensitive), default.
    #[default]
    Name,
    /// By file size (largest first).
    Size,
    /// By modification time (newest first).
    Modified,
}

impl SortBy {
    /// Parse sort_by from config string.
    pub fn from_config(s: &str) -> Self {
        match s {
            "size" => SortBy::Size,
            "modified" => SortBy::Modified,
            _ => SortBy::Name,
        }
    }

    /// Get the display label for the current sort.
    pub fn label(&self) -> &'static str {
        match self {
            SortBy::Name => "Name",
            SortBy::Size => "Size",
            SortBy::Modified => "Modified",
        }
    }

    /// Cycle to the next sort option.
    pub fn next(&self) -> Self {
        match self {
            SortBy::Name => SortBy::Size,
            SortBy::Size => SortBy::Modified,
            SortBy::Modified => SortBy::Name,
        }
    }
}

/// One directory entry as read from disk.
struct Entry {
    name: OsString,
    node_type: NodeType,
    meta: FileMeta,
    has_entries: bool,
}

/// Read the immediate children of `path`.
///
/// Entries whose metadata cannot be read (broken symlinks) are listed as
/// plain files.
fn read_entries(path: &Path) -> std::io::Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let name = entry.file_name();
        let is_hidden = name.to_string_lossy().starts_with('.');
        let entry_path = entry.path();

        let (node_type, meta) = match fs::metadata(&entry_path) {
            Ok(md) => {
                let node_type = if md.is_dir() {
                    NodeType::Directory
                } else {
                    NodeType::File
                };
                let meta = FileMeta {
                    size: md.len(),
                    modified: md.modified().ok(),
                    is_hidden,
                };
                (node_type, meta)
            }
            Err(_) => (
                NodeType::File,
                FileMeta {
                    is_hidden,
                    ..FileMeta::default()
                },
            ),
        };

        // Unreadable directories keep their placeholder so that expanding
        // them reports the failure.
        let has_entries = node_type == NodeType::Directory
            && fs::read_dir(&entry_path)
                .map(|mut it| it.next().is_some())
                .unwrap_or(true);

        entries.push(Entry {
            name,
            node_type,
            meta,
            has_entries,
        });
    }
    Ok(entries)
}

/// Arena-backed directory tree with lazy, once-only child population.
#[derive(Debug)]
pub struct DirTree {
    nodes: Vec<TreeNode>,
    materialized: HashSet<NodeId>,
    pub sort_by: SortBy,
    pub dirs_first: bool,
}

impl DirTree {
    /// Build a tree rooted at `root`, reading its immediate children.
    ///
    /// `root` should already be absolute; its full path becomes the root label.
    pub fn new(root: &Path, sort_by: SortBy, dirs_first: bool) -> Result<Self> {
        let metadata = fs::metadata(root)?;
        if !metadata.is_dir() {
            return Err(AppError::InvalidPath(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let root_node = TreeNode {
            label: root.as_os_str().to_os_string(),
            parent: None,
            node_type: NodeType::Directory,
            children: Vec::new(),
            is_open: false,
            has_placeholder: true,
            meta: FileMeta {
                size: metadata.len(),
                modified: metadata.modified().ok(),
                is_hidden: false,
            },
        };

        let mut tree = Self {
            nodes: vec![root_node],
            materialized: HashSet::new(),
            sort_by,
            dirs_first,
        };
        tree.expand(NodeId::ROOT)?;
        Ok(tree)
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether a directory's real children have replaced its placeholder.
    pub fn is_materialized(&self, id: NodeId) -> bool {
        self.materialized.contains(&id)
    }

    /// Whether the node would show children when opened.
    pub fn is_expandable(&self, id: NodeId) -> bool {
        match self.node(id) {
            Some(node) if node.node_type == NodeType::Directory => {
                if self.is_materialized(id) {
                    !node.children.is_empty()
                } else {
                    node.has_placeholder
                }
            }
            _ => false,
        }
    }

    /// Reconstruct the filesystem path of a node by walking parent links and
    /// joining labels from the root down.
    ///
    /// Returns `None` for an id the tree never issued.
    pub fn resolve(&self, id: NodeId) -> Option<PathBuf> {
        let mut labels = vec![&self.node(id)?.label];
        let mut current = self.nodes[id.0].parent;
        while let Some(parent_id) = current {
            let parent = &self.nodes[parent_id.0];
            labels.push(&parent.label);
            current = parent.parent;
        }

        let mut path = PathBuf::new();
        for label in labels.iter().rev() {
            path.push(label);
        }
        Some(path)
    }

    /// Open a directory node, reading its children from disk the first time.
    ///
    /// Returns `Ok(true)` when the directory was read. Reopening a
    /// materialized node, or "expanding" a file, returns `Ok(false)` without
    /// touching the filesystem. On a listing failure the node is left as it
    /// was, so the expansion can be retried.
    pub fn expand(&mut self, id: NodeId) -> Result<bool> {
        let Some(node) = self.node(id) else {
            return Ok(false);
        };
        if node.node_type != NodeType::Directory {
            return Ok(false);
        }
        if self.is_materialized(id) {
            self.nodes[id.0].is_open = true;
            return Ok(false);
        }

        let path = self.resolve(id).unwrap_or_default();
        let entries = read_entries(&path).map_err(|source| AppError::Listing {
            path: path.clone(),
            source,
        })?;

        let mut children = Vec::with_capacity(entries.len());
        for entry in entries {
            let child_id = NodeId(self.nodes.len());
            self.nodes.push(TreeNode {
                label: entry.name,
                parent: Some(id),
                node_type: entry.node_type,
                children: Vec::new(),
                is_open: false,
                has_placeholder: entry.has_entries,
                meta: entry.meta,
            });
            children.push(child_id);
        }
        tracing::debug!(
            path = %path.display(),
            children = children.len(),
            nodes = self.node_count(),
            "materialized directory"
        );

        let node = &mut self.nodes[id.0];
        node.children = children;
        node.has_placeholder = false;
        node.is_open = true;
        self.materialized.insert(id);
        self.sort_children_of(id);
        Ok(true)
    }

    /// Close a directory node. Its children are kept.
    pub fn collapse(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.is_open = false;
        }
    }

    /// Sort a node's immediate children in place.
    fn sort_children_of(&mut self, id: NodeId) {
        let mut children = std::mem::take(&mut self.nodes[id.0].children);
        let nodes = &self.nodes;
        let sort_by = self.sort_by;
        let dirs_first = self.dirs_first;
        children.sort_by(|a, b| {
            let a = &nodes[a.0];
            let b = &nodes[b.0];
            let mut cmp = std::cmp::Ordering::Equal;

            if dirs_first {
                cmp = (b.node_type == NodeType::Directory).cmp(&(a.node_type == NodeType::Directory));
            }

            cmp.then_with(|| match sort_by {
                SortBy::Name => a.name().to_lowercase().cmp(&b.name().to_lowercase()),
                SortBy::Size => b.meta.size.cmp(&a.meta.size),
                SortBy::Modified => b.meta.modified.cmp(&a.meta.modified),
            })
        });
        self.nodes[id.0].children = children;
    }

    /// Re-sort every materialized directory with the current settings.
    pub fn sort_all(&mut self) {
        let ids: Vec<NodeId> = self.materialized.iter().copied().collect();
        for id in ids {
            self.sort_children_of(id);
        }
    }

    /// Flatten the open part of the tree into display rows, depth first.
    ///
    /// The root is always included; hidden entries are skipped unless
    /// `show_hidden` is set.
    pub fn flatten(&self, show_hidden: bool) -> Vec<FlatItem> {
        let mut items = Vec::new();
        self.flatten_node(NodeId::ROOT, 0, true, show_hidden, &mut items);
        items
    }

    fn flatten_node(
        &self,
        id: NodeId,
        depth: usize,
        is_last: bool,
        show_hidden: bool,
        items: &mut Vec<FlatItem>,
    ) {
        let node = &self.nodes[id.0];
        items.push(FlatItem {
            id,
            name: node.name(),
            node_type: node.node_type,
            depth,
            is_expanded: node.is_open,
            is_expandable: self.is_expandable(id),
            is_last_sibling: is_last,
            is_hidden: node.meta.is_hidden,
        });

        if !node.is_open {
            return;
        }
        let visible: Vec<NodeId> = node
            .children
            .iter()
            .copied()
            .filter(|c| show_hidden || !self.nodes[c.0].meta.is_hidden)
            .collect();
        for (i, child) in visible.iter().enumerate() {
            let is_last_child = i == visible.len() - 1;
            self.flatten_node(*child, depth + 1, is_last_child, show_hidden, items);
        }
    }
}

/// A flattened representation of a tree node for rendering.
#[derive(Debug, Clone)]
pub struct FlatItem {
    pub id: NodeId,
    pub name: String,
    pub node_type: NodeType,
    pub depth: usize,
    pub is_expanded: bool,
    pub is_expandable: bool,
    pub is_last_sibling: bool,
    pub is_hidden: bool,
}

/// Construction options for [`TreeState`].
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    pub sort_by: SortBy,
    pub dirs_first: bool,
    pub show_hidden: bool,
}

/// State for the tree view: the tree, its visible rows and the selection.
pub struct TreeState {
    pub tree: DirTree,
    pub flat_items: Vec<FlatItem>,
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub show_hidden: bool,
}

impl TreeState {
    /// Create a new TreeState from a root path, expanding the root directory.
    pub fn new(path: &Path, options: TreeOptions) -> Result<Self> {
        let tree = DirTree::new(path, options.sort_by, options.dirs_first)?;
        let mut state = Self {
            tree,
            flat_items: Vec::new(),
            selected_index: 0,
            scroll_offset: 0,
            show_hidden: options.show_hidden,
        };
        state.flatten();
        Ok(state)
    }

    /// Rebuild the visible rows, keeping the selection on the same node if it
    /// is still visible.
    pub fn flatten(&mut self) {
        let selected = self.selected_id();
        self.flat_items = self.tree.flatten(self.show_hidden);
        if let Some(index) = selected.and_then(|id| self.find_index(id)) {
            self.selected_index = index;
        } else if !self.flat_items.is_empty() && self.selected_index >= self.flat_items.len() {
            self.selected_index = self.flat_items.len() - 1;
        }
    }

    /// Node id of the selected row.
    pub fn selected_id(&self) -> Option<NodeId> {
        self.flat_items.get(self.selected_index).map(|item| item.id)
    }

    /// Path of the selected row, resolved on demand.
    pub fn selected_path(&self) -> Option<PathBuf> {
        self.selected_id().and_then(|id| self.tree.resolve(id))
    }

    /// Find the row index of a node.
    pub fn find_index(&self, id: NodeId) -> Option<usize> {
        self.flat_items.iter().position(|item| item.id == id)
    }

    /// Expand the currently selected directory node.
    pub fn expand_selected(&mut self) -> Result<()> {
        let Some(id) = self.selected_id() else {
            return Ok(());
        };
        let was_open = self.tree.node(id).is_some_and(|n| n.is_open);
        self.tree.expand(id)?;
        if !was_open {
            self.flatten();
        }
        Ok(())
    }

    /// Collapse the currently selected directory, or jump to its parent.
    pub fn collapse_selected(&mut self) {
        let Some(item) = self.flat_items.get(self.selected_index) else {
            return;
        };
        let id = item.id;

        if item.node_type == NodeType::Directory && item.is_expanded {
            self.tree.collapse(id);
            self.flatten();
            return;
        }

        if let Some(index) = self
            .tree
            .node(id)
            .and_then(|n| n.parent)
            .and_then(|parent| self.find_index(parent))
        {
            self.selected_index = index;
        }
    }

    /// Toggle visibility of hidden files and re-flatten.
    pub fn toggle_hidden(&mut self) {
        self.show_hidden = !self.show_hidden;
        self.flatten();
    }

    /// Cycle to the next sort mode and re-sort.
    pub fn cycle_sort(&mut self) {
        self.tree.sort_by = self.tree.sort_by.next();
        self.tree.sort_all();
        self.flatten();
    }

    /// Update the scroll offset to ensure the selected item is visible.
    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected_index - visible_height + 1;
        }
    }
}
