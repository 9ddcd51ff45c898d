use crate::tree::{Node, NodeId, NodeKind};

/// Rebuilds a forest, applying `apply` to the node with the matching id.
/// 重建節點樹，並對符合識別碼的節點套用 `apply` 轉換。
///
/// `apply` may return `None` to leave the match untouched, which callers
/// treat as a no-op. The second tuple element reports whether any node was
/// replaced. Sibling order is preserved; once a match has been handled the
/// remaining subtrees are cloned verbatim, since identifiers are unique.
pub fn update_by_id<F>(nodes: &[Node], id: NodeId, apply: &F) -> (Vec<Node>, bool)
where
    F: Fn(&Node) -> Option<Node>,
{
    let mut changed = false;
    let mut rebuilt = Vec::with_capacity(nodes.len());
    for node in nodes {
        if changed {
            rebuilt.push(node.clone());
            continue;
        }
        if node.id == id {
            match apply(node) {
                Some(updated) => {
                    changed = true;
                    rebuilt.push(updated);
                }
                None => rebuilt.push(node.clone()),
            }
            continue;
        }
        match &node.kind {
            NodeKind::Folder { open, children } => {
                let (new_children, child_changed) = update_by_id(children, id, apply);
                if child_changed {
                    changed = true;
                    rebuilt.push(Node {
                        id: node.id,
                        name: node.name.clone(),
                        editing: node.editing,
                        kind: NodeKind::Folder {
                            open: *open,
                            children: new_children,
                        },
                    });
                } else {
                    rebuilt.push(node.clone());
                }
            }
            NodeKind::File => rebuilt.push(node.clone()),
        }
    }
    (rebuilt, changed)
}

/// Drops every node carrying `id` at any depth, together with its subtree.
/// 移除任意深度上符合識別碼的節點及其整棵子樹。
///
/// The ids of the dropped node and all of its descendants are appended to
/// `removed` in pre-order.
pub fn remove_by_id(nodes: &[Node], id: NodeId, removed: &mut Vec<NodeId>) -> Vec<Node> {
    let mut rebuilt = Vec::with_capacity(nodes.len());
    for node in nodes {
        if node.id == id {
            collect_ids(node, removed);
            continue;
        }
        match &node.kind {
            NodeKind::Folder { open, children } => {
                let new_children = remove_by_id(children, id, removed);
                rebuilt.push(Node {
                    id: node.id,
                    name: node.name.clone(),
                    editing: node.editing,
                    kind: NodeKind::Folder {
                        open: *open,
                        children: new_children,
                    },
                });
            }
            NodeKind::File => rebuilt.push(node.clone()),
        }
    }
    rebuilt
}

/// Appends the id of `node` and of every descendant, pre-order.
/// 以前序方式收集節點與其所有子孫的識別碼。
pub fn collect_ids(node: &Node, out: &mut Vec<NodeId>) {
    out.push(node.id);
    if let NodeKind::Folder { children, .. } = &node.kind {
        for child in children {
            collect_ids(child, out);
        }
    }
}

/// Visits every node in the forest depth-first, ignoring `open` state.
/// 深度優先走訪所有節點，不理會資料夾的展開狀態。
pub fn each_node<'a, F>(nodes: &'a [Node], visit: &mut F)
where
    F: FnMut(&'a Node),
{
    for node in nodes {
        visit(node);
        if let NodeKind::Folder { children, .. } = &node.kind {
            each_node(children, visit);
        }
    }
}

/// Lazy depth-first pre-order walk over the visible part of a forest.
/// 以深度優先前序走訪可見節點的延遲迭代器。
///
/// Children of a folder are yielded only while the folder is `open`. Each
/// item pairs the node with its depth, root nodes being depth zero. The
/// iterator borrows the forest, so a fresh walk always reflects the
/// current snapshot.
pub struct Traverse<'a> {
    stack: Vec<(&'a Node, usize)>,
}

impl<'a> Traverse<'a> {
    pub(crate) fn new(roots: &'a [Node]) -> Self {
        let stack = roots.iter().rev().map(|node| (node, 0)).collect();
        Self { stack }
    }
}

impl<'a> Iterator for Traverse<'a> {
    type Item = (&'a Node, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.stack.pop()?;
        if let NodeKind::Folder {
            open: true,
            children,
        } = &node.kind
        {
            for child in children.iter().rev() {
                self.stack.push((child, depth + 1));
            }
        }
        Some((node, depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;

    fn demo_forest() -> Vec<Node> {
        let readme = Node::file("README.md");
        let lib = Node::file("lib.rs");
        let src = Node::folder("src", true, vec![lib]);
        let hidden = Node::file("secret.txt");
        let vault = Node::folder("vault", false, vec![hidden]);
        vec![readme, src, vault]
    }

    #[test]
    fn update_replaces_only_the_match() {
        let forest = demo_forest();
        let target = forest[1].children()[0].id;
        let (rebuilt, changed) = update_by_id(&forest, target, &|node| {
            let mut next = node.clone();
            next.name = "main.rs".into();
            Some(next)
        });
        assert!(changed);
        assert_eq!(rebuilt[1].children()[0].name, "main.rs");
        assert_eq!(rebuilt[0], forest[0]);
        assert_eq!(rebuilt[2], forest[2]);
    }

    #[test]
    fn update_with_none_leaves_forest_intact() {
        let forest = demo_forest();
        let target = forest[0].id;
        let (rebuilt, changed) = update_by_id(&forest, target, &|_| None);
        assert!(!changed);
        assert_eq!(rebuilt, forest);
    }

    #[test]
    fn remove_collects_descendant_ids() {
        let forest = demo_forest();
        let vault_id = forest[2].id;
        let secret_id = forest[2].children()[0].id;
        let mut removed = Vec::new();
        let rebuilt = remove_by_id(&forest, vault_id, &mut removed);
        assert_eq!(rebuilt.len(), 2);
        assert_eq!(removed, vec![vault_id, secret_id]);
    }

    #[test]
    fn traverse_skips_closed_folders() {
        let forest = demo_forest();
        let names: Vec<&str> = Traverse::new(&forest)
            .map(|(node, _)| node.name.as_str())
            .collect();
        assert_eq!(names, vec!["README.md", "src", "lib.rs", "vault"]);
    }

    #[test]
    fn traverse_reports_depths() {
        let forest = demo_forest();
        let depths: Vec<usize> = Traverse::new(&forest).map(|(_, depth)| depth).collect();
        assert_eq!(depths, vec![0, 0, 1, 0]);
    }
}
