use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::walk::{self, Traverse};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier assigned to each node in the explorer tree.
/// 檔案總管樹中每個節點的唯一識別碼。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Draws a fresh id from the process-wide counter.
    /// 從行程層級的計數器取得新的識別碼。
    pub fn new() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Reconstructs an id from its raw value, e.g. one read from JSON.
    /// 由原始數值（例如 JSON 中的值）還原識別碼。
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Moves the generator past `id` so later ids cannot collide with it.
    /// 將計數器推進到 `id` 之後，避免之後產生的識別碼與其衝突。
    pub fn advance_past(id: NodeId) {
        NEXT_NODE_ID.fetch_max(id.0.saturating_add(1), Ordering::Relaxed);
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of explorer node. Only folders carry an open flag and children.
/// 節點的類型；僅資料夾具備展開狀態與子節點。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder {
        #[serde(default)]
        open: bool,
        #[serde(default)]
        children: Vec<Node>,
    },
}

/// A single file or folder entry in the tree.
/// 樹中的單一檔案或資料夾項目。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub editing: bool,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    /// Constructs a committed file node with a fresh id.
    /// 建立已命名完成的檔案節點並配發新識別碼。
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            editing: false,
            kind: NodeKind::File,
        }
    }

    /// Constructs a committed folder node with a fresh id.
    /// 建立已命名完成的資料夾節點並配發新識別碼。
    pub fn folder(name: impl Into<String>, open: bool, children: Vec<Node>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            editing: false,
            kind: NodeKind::Folder { open, children },
        }
    }

    /// Builds the placeholder node inserted by [`ExplorerTree::add_child`].
    fn fresh(kind: ChildKind) -> Self {
        let node_kind = match kind {
            ChildKind::File => NodeKind::File,
            ChildKind::Folder => NodeKind::Folder {
                open: false,
                children: Vec::new(),
            },
        };
        Self {
            id: NodeId::new(),
            name: kind.placeholder_name().to_string(),
            editing: true,
            kind: node_kind,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }

    pub fn is_open(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { open: true, .. })
    }

    /// Children of a folder; files expose an empty slice.
    /// 資料夾的子節點；檔案則回傳空切片。
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Folder { children, .. } => children,
            NodeKind::File => &[],
        }
    }
}

/// Which kind of child [`ExplorerTree::add_child`] should insert.
/// 指定 [`ExplorerTree::add_child`] 應插入的子節點類型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    File,
    Folder,
}

impl ChildKind {
    /// Name given to a node that has not been committed yet.
    /// 尚未完成命名的節點所使用的預設名稱。
    pub fn placeholder_name(self) -> &'static str {
        match self {
            ChildKind::File => "New file",
            ChildKind::Folder => "New folder",
        }
    }
}

/// Captures differences after a tree mutation.
/// 紀錄樹狀結構變動後的差異。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDiff {
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
    pub updated: Vec<NodeId>,
}

impl TreeDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

/// Immutable explorer forest. Every mutation returns a fresh snapshot
/// together with a [`TreeDiff`]; an id that matches nothing yields the
/// input tree unchanged and an empty diff.
/// 不可變的檔案總管樹。每次變更都會回傳新的快照與 [`TreeDiff`]；
/// 找不到識別碼時回傳原樹與空白差異。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExplorerTree {
    pub revision: u64,
    #[serde(default)]
    pub roots: Vec<Node>,
}

impl ExplorerTree {
    /// Constructs an empty forest.
    /// 建立空的節點樹。
    pub fn new() -> Self {
        Self {
            revision: 0,
            roots: Vec::new(),
        }
    }

    /// Wraps pre-built root nodes into a tree.
    /// 以既有的根節點建立樹。
    pub fn from_roots(roots: Vec<Node>) -> Self {
        Self { revision: 0, roots }
    }

    /// The built-in demonstration forest: an open "src" folder holding the
    /// file "App.js" and the closed, empty folder "components".
    /// 內建示範樹：展開的 "src" 資料夾內含 "App.js" 檔案與
    /// 收合且為空的 "components" 資料夾。
    pub fn sample() -> Self {
        let app = Node::file("App.js");
        let components = Node::folder("components", false, Vec::new());
        let src = Node::folder("src", true, vec![app, components]);
        Self::from_roots(vec![src])
    }

    /// Flips the open flag of the folder with the given id. Files and
    /// unknown ids are left untouched.
    /// 切換指定資料夾的展開狀態；檔案與未知識別碼不受影響。
    pub fn toggle_open(&self, id: NodeId) -> (Self, TreeDiff) {
        let (roots, changed) = walk::update_by_id(&self.roots, id, &|node| match &node.kind {
            NodeKind::Folder { open, children } => {
                let mut next = node.clone();
                next.kind = NodeKind::Folder {
                    open: !open,
                    children: children.clone(),
                };
                Some(next)
            }
            NodeKind::File => None,
        });
        let mut diff = TreeDiff::default();
        if changed {
            diff.updated.push(id);
        }
        self.replaced(roots, diff)
    }

    /// Appends a placeholder child to the folder with `parent_id` and opens
    /// the folder so the child is visible. The new node starts in editing
    /// state with the placeholder name for its kind.
    /// 在指定資料夾內加入尚未命名的子節點，並同時展開該資料夾。
    pub fn add_child(&self, parent_id: NodeId, kind: ChildKind) -> (Self, TreeDiff) {
        let child = Node::fresh(kind);
        let child_id = child.id;
        let (roots, changed) = walk::update_by_id(&self.roots, parent_id, &|node| {
            match &node.kind {
                NodeKind::Folder { children, .. } => {
                    let mut next_children = children.clone();
                    next_children.push(child.clone());
                    let mut next = node.clone();
                    next.kind = NodeKind::Folder {
                        open: true,
                        children: next_children,
                    };
                    Some(next)
                }
                NodeKind::File => None,
            }
        });
        let mut diff = TreeDiff::default();
        if changed {
            diff.added.push(child_id);
            diff.updated.push(parent_id);
        }
        self.replaced(roots, diff)
    }

    /// Removes the node with the given id, wherever it occurs, along with
    /// its entire subtree.
    /// 移除符合識別碼的節點與其整棵子樹。
    pub fn delete(&self, id: NodeId) -> (Self, TreeDiff) {
        let mut removed = Vec::new();
        let roots = walk::remove_by_id(&self.roots, id, &mut removed);
        let diff = TreeDiff {
            removed,
            ..TreeDiff::default()
        };
        self.replaced(roots, diff)
    }

    /// Puts the node with the given id into editing state.
    /// 將指定節點切換為重新命名中的狀態。
    pub fn rename_begin(&self, id: NodeId) -> (Self, TreeDiff) {
        let (roots, changed) = walk::update_by_id(&self.roots, id, &|node| {
            let mut next = node.clone();
            next.editing = true;
            Some(next)
        });
        let mut diff = TreeDiff::default();
        if changed {
            diff.updated.push(id);
        }
        self.replaced(roots, diff)
    }

    /// Commits a rename. The name is trimmed first; committing an empty
    /// name discards the node entirely, exactly like [`ExplorerTree::delete`].
    /// This also covers a freshly added node abandoned without a name.
    /// 完成重新命名。名稱會先去除前後空白；空名稱會直接刪除節點，
    /// 包含剛新增但未輸入名稱的節點。
    pub fn rename_commit(&self, id: NodeId, new_name: &str) -> (Self, TreeDiff) {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return self.delete(id);
        }
        let (roots, changed) = walk::update_by_id(&self.roots, id, &|node| {
            let mut next = node.clone();
            next.name = trimmed.to_string();
            next.editing = false;
            Some(next)
        });
        let mut diff = TreeDiff::default();
        if changed {
            diff.updated.push(id);
        }
        self.replaced(roots, diff)
    }

    /// Walks the visible forest depth-first, yielding `(node, depth)`.
    /// 深度優先走訪可見節點，產出節點與深度。
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse::new(&self.roots)
    }

    /// Finds a node by identifier, regardless of folder open state.
    /// 依識別碼尋找節點，不受資料夾展開狀態影響。
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        find_in(&self.roots, id)
    }

    /// Advances the id generator past every id in the forest, so nodes
    /// added after deserializing stay unique.
    /// 將識別碼計數器推進到樹中所有識別碼之後，
    /// 確保反序列化後新增的節點仍保有唯一識別碼。
    pub fn claim_ids(&self) {
        walk::each_node(&self.roots, &mut |node| NodeId::advance_past(node.id));
    }

    fn replaced(&self, roots: Vec<Node>, diff: TreeDiff) -> (Self, TreeDiff) {
        if diff.is_empty() {
            (self.clone(), diff)
        } else {
            (
                Self {
                    revision: self.revision.wrapping_add(1),
                    roots,
                },
                diff,
            )
        }
    }
}

impl Default for ExplorerTree {
    fn default() -> Self {
        Self::new()
    }
}

fn find_in(nodes: &[Node], id: NodeId) -> Option<&Node> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let NodeKind::Folder { children, .. } = &node.kind {
            if let Some(found) = find_in(children, id) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_named<'a>(tree: &'a ExplorerTree, name: &str) -> &'a Node {
        let mut found = None;
        crate::walk::each_node(&tree.roots, &mut |node| {
            if node.name == name {
                found = Some(node);
            }
        });
        found.expect("node should exist")
    }

    #[test]
    fn toggle_twice_is_identity() {
        let tree = ExplorerTree::sample();
        let src_id = node_named(&tree, "src").id;
        let (once, diff) = tree.toggle_open(src_id);
        assert_eq!(diff.updated, vec![src_id]);
        assert!(!node_named(&once, "src").is_open());
        let (twice, _) = once.toggle_open(src_id);
        assert_eq!(twice.roots, tree.roots);
    }

    #[test]
    fn toggle_ignores_files_and_unknown_ids() {
        let tree = ExplorerTree::sample();
        let file_id = node_named(&tree, "App.js").id;
        let (after_file, diff) = tree.toggle_open(file_id);
        assert!(diff.is_empty());
        assert_eq!(after_file.roots, tree.roots);
        assert_eq!(after_file.revision, tree.revision);

        let (after_ghost, diff) = tree.toggle_open(NodeId::from_raw(u64::MAX));
        assert!(diff.is_empty());
        assert_eq!(after_ghost.roots, tree.roots);
    }

    #[test]
    fn add_child_opens_parent_and_reports_diff() {
        let tree = ExplorerTree::sample();
        let components_id = node_named(&tree, "components").id;
        let (next, diff) = tree.add_child(components_id, ChildKind::File);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.updated, vec![components_id]);
        assert_eq!(next.revision, tree.revision + 1);

        let components = next.find(components_id).expect("parent survives");
        assert!(components.is_open());
        let child = &components.children()[0];
        assert_eq!(child.id, diff.added[0]);
        assert_eq!(child.name, "New file");
        assert!(child.editing);
        assert!(!child.is_folder());
    }

    #[test]
    fn add_child_folder_starts_closed_and_empty() {
        let tree = ExplorerTree::sample();
        let src_id = node_named(&tree, "src").id;
        let (next, diff) = tree.add_child(src_id, ChildKind::Folder);
        let child = next.find(diff.added[0]).expect("child exists");
        assert_eq!(child.name, "New folder");
        assert!(child.editing);
        assert!(child.is_folder());
        assert!(!child.is_open());
        assert!(child.children().is_empty());
    }

    #[test]
    fn add_child_ignores_file_parents() {
        let tree = ExplorerTree::sample();
        let file_id = node_named(&tree, "App.js").id;
        let (next, diff) = tree.add_child(file_id, ChildKind::File);
        assert!(diff.is_empty());
        assert_eq!(next.roots, tree.roots);
    }

    #[test]
    fn add_then_delete_round_trips() {
        let tree = ExplorerTree::sample();
        let src_id = node_named(&tree, "src").id;
        let (grown, diff) = tree.add_child(src_id, ChildKind::File);
        let (restored, _) = grown.delete(diff.added[0]);
        // src was already open, so removing the child restores the forest
        assert_eq!(restored.roots, tree.roots);
    }

    #[test]
    fn delete_removes_whole_subtree() {
        let tree = ExplorerTree::sample();
        let src_id = node_named(&tree, "src").id;
        let app_id = node_named(&tree, "App.js").id;
        let components_id = node_named(&tree, "components").id;
        let (next, diff) = tree.delete(src_id);
        assert!(next.roots.is_empty());
        assert_eq!(diff.removed, vec![src_id, app_id, components_id]);
    }

    #[test]
    fn rename_commit_trims_whitespace() {
        let tree = ExplorerTree::sample();
        let app_id = node_named(&tree, "App.js").id;
        let (began, _) = tree.rename_begin(app_id);
        assert!(began.find(app_id).expect("node exists").editing);
        let (next, diff) = began.rename_commit(app_id, "  report.txt  ");
        assert_eq!(diff.updated, vec![app_id]);
        let node = next.find(app_id).expect("node exists");
        assert_eq!(node.name, "report.txt");
        assert!(!node.editing);
    }

    #[test]
    fn rename_commit_empty_deletes_like_delete() {
        let tree = ExplorerTree::sample();
        let src_id = node_named(&tree, "src").id;
        let (via_rename, rename_diff) = tree.rename_commit(src_id, "   ");
        let (via_delete, delete_diff) = tree.delete(src_id);
        assert_eq!(via_rename.roots, via_delete.roots);
        assert_eq!(rename_diff, delete_diff);
        assert!(via_rename.roots.is_empty());
    }

    #[test]
    fn operations_with_unknown_id_return_equal_tree() {
        let tree = ExplorerTree::sample();
        let ghost = NodeId::from_raw(u64::MAX - 1);
        assert_eq!(tree.toggle_open(ghost).0.roots, tree.roots);
        assert_eq!(tree.add_child(ghost, ChildKind::File).0.roots, tree.roots);
        assert_eq!(tree.delete(ghost).0.roots, tree.roots);
        assert_eq!(tree.rename_begin(ghost).0.roots, tree.roots);
        assert_eq!(tree.rename_commit(ghost, "name").0.roots, tree.roots);
    }

    #[test]
    fn serialized_nodes_carry_a_type_tag() {
        let tree = ExplorerTree::sample();
        let value = serde_json::to_value(&tree).expect("tree serializes");
        let src = &value["roots"][0];
        assert_eq!(src["type"], "folder");
        assert_eq!(src["open"], true);
        assert_eq!(src["children"][0]["type"], "file");
        assert_eq!(src["children"][0]["name"], "App.js");
    }

    #[test]
    fn claim_ids_prevents_collisions_after_deserializing() {
        let raw = r#"{
            "revision": 0,
            "roots": [
                {
                    "id": 9000,
                    "name": "root",
                    "type": "folder",
                    "open": true,
                    "children": [{ "id": 9001, "name": "a.txt", "type": "file" }]
                }
            ]
        }"#;
        let tree: ExplorerTree = serde_json::from_str(raw).expect("tree parses");
        tree.claim_ids();
        let root_id = tree.roots[0].id;
        let (next, diff) = tree.add_child(root_id, ChildKind::File);
        assert!(diff.added[0].as_u64() > 9001);
        assert!(next.find(diff.added[0]).is_some());
    }
}
