//! In-memory tree model backing the file-explorer widget.
//! 檔案總管元件所使用的記憶體內樹狀模型。
//!
//! The tree follows an immutable-snapshot-replace discipline: every
//! mutating operation takes the current value and returns a fresh
//! [`ExplorerTree`] plus a [`TreeDiff`] describing what changed. All
//! operations are total; an id that matches nothing returns the input
//! tree untouched.

pub mod tree;
pub mod walk;

pub use tree::{ChildKind, ExplorerTree, Node, NodeId, NodeKind, TreeDiff};
pub use walk::Traverse;
