use crate::result::node::{GroupNode, NodeId, NodeKind, ResultNode, TestNode};

/// Reference to a node produced by the last `test`/`group` call, used to
/// attach trailing metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    pub kind: NodeKind,
    pub id: NodeId,
}

/// Arena holding every node of one run. The root group is always at
/// [`ResultTree::root_id`].
#[derive(Debug, Clone)]
pub struct ResultTree {
    nodes: Vec<ResultNode>,
}

impl ResultTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![ResultNode::Group(GroupNode::root(root_name))],
        }
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root(&self) -> &GroupNode {
        match &self.nodes[0] {
            ResultNode::Group(g) => g,
            ResultNode::Test(_) => unreachable!("root node is always a group"),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&ResultNode> {
        self.nodes.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut ResultNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn group(&self, id: NodeId) -> Option<&GroupNode> {
        self.get(id).and_then(ResultNode::as_group)
    }

    pub(crate) fn group_mut(&mut self, id: NodeId) -> Option<&mut GroupNode> {
        match self.get_mut(id) {
            Some(ResultNode::Group(g)) => Some(g),
            _ => None,
        }
    }

    pub fn test(&self, id: NodeId) -> Option<&TestNode> {
        self.get(id).and_then(ResultNode::as_test)
    }

    pub fn handle(&self, id: NodeId) -> Option<Handle> {
        self.get(id).map(|node| Handle {
            kind: node.kind(),
            id,
        })
    }

    /// Direct children of a group, in insertion order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &ResultNode)> + '_ {
        self.group(id)
            .map(|g| g.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(move |&child| self.get(child).map(|node| (child, node)))
    }

    /// A direct child group of `parent` with the given name.
    pub fn find_group(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .find(|(_, node)| matches!(node, ResultNode::Group(g) if g.name == name))
            .map(|(id, _)| id)
    }

    pub(crate) fn push(&mut self, parent: NodeId, node: ResultNode) -> Option<NodeId> {
        let id = NodeId(self.nodes.len());
        self.group_mut(parent)?.children.push(id);
        self.nodes.push(node);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Status;
    use std::time::Duration;

    fn test_node(status: Status) -> ResultNode {
        ResultNode::Test(TestNode {
            status,
            comment: None,
            description: None,
            error: None,
            elapsed: Duration::ZERO,
            arguments: vec![],
        })
    }

    #[test]
    fn test_new_tree_has_root() {
        let tree = ResultTree::new("root");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root().name, "root");
        assert_eq!(tree.root().status, Status::Unset);
    }

    #[test]
    fn test_push_and_children_order() {
        let mut tree = ResultTree::new("root");
        let root = tree.root_id();
        let a = tree.push(root, test_node(Status::Pass)).unwrap();
        let g = tree
            .push(root, ResultNode::Group(GroupNode::new("g")))
            .unwrap();
        let b = tree.push(root, test_node(Status::Fail)).unwrap();

        let ids: Vec<_> = tree.children(root).map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, g, b]);
        assert_eq!(tree.find_group(root, "g"), Some(g));
        assert_eq!(tree.find_group(root, "missing"), None);
    }

    #[test]
    fn test_push_into_test_is_rejected() {
        let mut tree = ResultTree::new("root");
        let root = tree.root_id();
        let t = tree.push(root, test_node(Status::Pass)).unwrap();
        assert!(tree.push(t, test_node(Status::Pass)).is_none());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_handle_kind() {
        let mut tree = ResultTree::new("root");
        let root = tree.root_id();
        let t = tree.push(root, test_node(Status::Pass)).unwrap();
        assert_eq!(tree.handle(t).map(|h| h.kind), Some(NodeKind::Test));
        assert_eq!(tree.handle(root).map(|h| h.kind), Some(NodeKind::Group));
        assert!(tree.children(t).next().is_none());
    }
}
