use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Identity of a node within one scan. Assigned in pre-order, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Serialize)]
pub struct Node {
    #[serde(skip)]
    pub id: NodeId,
    pub name: String,
    #[serde(serialize_with = "serialize_path")]
    pub path: PathBuf,
    #[serde(flatten)]
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    Directory {
        items: Vec<Node>,
    },
    File {
        #[serde(skip_serializing_if = "Option::is_none")]
        contents: Option<String>,
    },
}

fn serialize_path<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

impl Node {
    pub fn new_directory(id: NodeId, path: &Path) -> Self {
        Node {
            id,
            name: base_name(path),
            path: path.to_path_buf(),
            kind: NodeKind::Directory { items: Vec::new() },
        }
    }

    pub fn new_file(id: NodeId, path: &Path) -> Self {
        Node {
            id,
            name: base_name(path),
            path: path.to_path_buf(),
            kind: NodeKind::File { contents: None },
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Directory { items } => items,
            NodeKind::File { .. } => &[],
        }
    }

    /// Appends `child` if this is a directory. Files silently ignore it.
    pub fn push_child(&mut self, child: Node) {
        if let NodeKind::Directory { items } = &mut self.kind {
            items.push(child);
        }
    }

    pub fn contents(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { contents } => contents.as_deref(),
            NodeKind::Directory { .. } => None,
        }
    }

    pub fn file_count(&self) -> usize {
        match &self.kind {
            NodeKind::File { .. } => 1,
            NodeKind::Directory { items } => items.iter().map(Node::file_count).sum(),
        }
    }
}

/// Last path component, falling back to the whole path for roots like `/`.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Files chosen during a session, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<NodeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    /// Adds `id` if absent, removes it otherwise. Returns whether it is now selected.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        if let Some(pos) = self.ids.iter().position(|&i| i == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Stdout,
}

#[derive(Debug, Clone)]
pub struct SelectorConfig {
    pub root_path: PathBuf,
    pub excluded_names: Vec<String>,
    pub output: OutputTarget,
}

pub const DEFAULT_EXCLUDED: &[&str] = &["node_modules", ".git"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores_selection() {
        let mut selection = Selection::new();
        selection.toggle(NodeId(3));
        let before = selection.clone();

        assert!(selection.toggle(NodeId(7)));
        assert!(!selection.toggle(NodeId(7)));

        assert_eq!(selection, before);
    }

    #[test]
    fn test_selection_keeps_pick_order() {
        let mut selection = Selection::new();
        selection.toggle(NodeId(5));
        selection.toggle(NodeId(1));
        selection.toggle(NodeId(9));
        selection.toggle(NodeId(1));

        assert_eq!(selection.ids(), &[NodeId(5), NodeId(9)]);
        assert!(!selection.contains(NodeId(1)));
    }

    #[test]
    fn test_identity_not_path_equality() {
        let a = Node::new_file(NodeId(1), Path::new("dup/x.txt"));
        let b = Node::new_file(NodeId(2), Path::new("dup/x.txt"));
        let mut selection = Selection::new();
        selection.toggle(a.id);

        assert!(selection.contains(a.id));
        assert!(!selection.contains(b.id));
    }

    #[test]
    fn test_node_serialization_shape() {
        let mut dir = Node::new_directory(NodeId(0), Path::new("/work/project"));
        let mut file = Node::new_file(NodeId(1), Path::new("/work/project/a.txt"));
        file.kind = NodeKind::File {
            contents: Some("hello".to_string()),
        };
        dir.push_child(file);
        dir.push_child(Node::new_file(NodeId(2), Path::new("/work/project/b.txt")));

        let value = serde_json::to_value(&dir).unwrap();

        assert_eq!(value["name"], "project");
        assert_eq!(value["path"], "/work/project");
        assert_eq!(value["type"], "directory");
        assert_eq!(value["items"][0]["type"], "file");
        assert_eq!(value["items"][0]["contents"], "hello");
        assert!(value["items"][1].get("contents").is_none());
        assert!(value["items"][1].get("items").is_none());
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_file_count() {
        let mut root = Node::new_directory(NodeId(0), Path::new("root"));
        let mut sub = Node::new_directory(NodeId(1), Path::new("root/sub"));
        sub.push_child(Node::new_file(NodeId(2), Path::new("root/sub/a")));
        root.push_child(sub);
        root.push_child(Node::new_file(NodeId(3), Path::new("root/b")));

        assert_eq!(root.file_count(), 2);
        assert_eq!(root.children().len(), 2);
    }
}
