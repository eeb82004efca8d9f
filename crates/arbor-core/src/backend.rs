use std::any::Any;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::UiError;

pub type NodeId = usize;

/// Callback bound to a node event. Handlers return a `Result` so state writes
/// made inside them can propagate render failures with `?`.
pub type EventCallback = Rc<dyn Fn() -> Result<(), UiError>>;

/// Host rendering backend: the external system that materialises and mutates
/// the visual tree. The runtime drives it strictly in call order and assumes
/// every operation is synchronous.
pub trait Backend: Any {
    fn create_node(&mut self, tag: &str) -> Result<NodeId, UiError>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), UiError>;
    /// Appends `child` to `parent`, detaching it from its current parent first.
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), UiError>;
    /// Swaps `old` for `new` in `parent` and discards the detached `old`
    /// subtree together with anything still bound to it.
    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId)
        -> Result<(), UiError>;
    /// Replaces the node's rendered content wholesale with `text`.
    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), UiError>;
    /// Binds `callback` for `event`, replacing any previous binding for the
    /// same event name on this node.
    fn add_listener(
        &mut self,
        node: NodeId,
        event: &str,
        callback: EventCallback,
    ) -> Result<(), UiError>;
    /// Current binding for `event` on `node`, if any. `Err` means the node
    /// itself is gone.
    fn listener(&self, node: NodeId, event: &str) -> Result<Option<EventCallback>, UiError>;
    fn request_focus(&mut self, node: NodeId) -> Result<(), UiError>;
    /// The single well-known node the root application attaches into.
    fn mount_point(&mut self) -> NodeId;
}

impl dyn Backend {
    pub fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct MemoryNode {
    tag: String,
    attributes: IndexMap<String, String>,
    text: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    listeners: IndexMap<String, EventCallback>,
}

impl MemoryNode {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
            parent: None,
            listeners: IndexMap::new(),
        }
    }
}

/// In-memory backend: a slab of nodes with the inspection surface tests and
/// the demo need (queries, focus log, markup serialisation).
pub struct MemoryBackend {
    nodes: Vec<Option<MemoryNode>>,
    root: NodeId,
    supported_tags: Option<Vec<String>>,
    focused: Option<NodeId>,
    focus_log: Vec<NodeId>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        let mut backend = Self {
            nodes: Vec::new(),
            root: 0,
            supported_tags: None,
            focused: None,
            focus_log: Vec::new(),
        };
        backend.root = backend.insert(MemoryNode::new("app"));
        backend
    }

    /// Restricts `create_node` to an allowlist, so the unsupported-tag path
    /// is reachable in tests. The mount point is always realised.
    pub fn with_supported_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut backend = Self::new();
        backend.supported_tags = Some(tags.into_iter().map(Into::into).collect());
        backend
    }

    fn insert(&mut self, node: MemoryNode) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Some(node));
        id
    }

    fn node(&self, id: NodeId) -> Result<&MemoryNode, UiError> {
        self.nodes
            .get(id)
            .and_then(|slot| slot.as_ref())
            .ok_or(UiError::MissingNode { id })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut MemoryNode, UiError> {
        self.nodes
            .get_mut(id)
            .and_then(|slot| slot.as_mut())
            .ok_or(UiError::MissingNode { id })
    }

    fn detach(&mut self, child: NodeId) -> Result<(), UiError> {
        if let Some(parent) = self.node(child)?.parent {
            if let Ok(parent_node) = self.node_mut(parent) {
                parent_node.children.retain(|c| *c != child);
            }
            self.node_mut(child)?.parent = None;
        }
        Ok(())
    }

    fn drop_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id).and_then(|slot| slot.take()) {
            for child in node.children {
                self.drop_subtree(child);
            }
            if self.focused == Some(id) {
                self.focused = None;
            }
        }
    }

    pub fn tag(&self, id: NodeId) -> Result<String, UiError> {
        Ok(self.node(id)?.tag.clone())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Result<Option<String>, UiError> {
        Ok(self.node(id)?.attributes.get(name).cloned())
    }

    /// Rendered text of the node: its own text followed by its children's, in
    /// tree order.
    pub fn text_content(&self, id: NodeId) -> Result<String, UiError> {
        let node = self.node(id)?;
        let mut out = node.text.clone().unwrap_or_default();
        for child in &node.children {
            out.push_str(&self.text_content(*child)?);
        }
        Ok(out)
    }

    pub fn children(&self, id: NodeId) -> Result<Vec<NodeId>, UiError> {
        Ok(self.node(id)?.children.clone())
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, UiError> {
        Ok(self.node(id)?.parent)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.get(id).map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Whether the node is still reachable from the mount point.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cursor = id;
        loop {
            if cursor == self.root {
                return true;
            }
            match self.node(cursor).ok().and_then(|node| node.parent) {
                Some(parent) => cursor = parent,
                None => return false,
            }
        }
    }

    /// First node with `tag` in tree order from the mount point.
    pub fn find(&self, tag: &str) -> Option<NodeId> {
        self.find_all(tag).into_iter().next()
    }

    pub fn find_all(&self, tag: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_tag(self.root, tag, &mut out);
        out
    }

    fn collect_tag(&self, id: NodeId, tag: &str, out: &mut Vec<NodeId>) {
        if let Ok(node) = self.node(id) {
            if node.tag == tag {
                out.push(id);
            }
            for child in &node.children {
                self.collect_tag(*child, tag, out);
            }
        }
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Every focus request made so far, in order.
    pub fn focus_log(&self) -> Vec<NodeId> {
        self.focus_log.clone()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// Markup serialisation of the subtree rooted at `id`.
    pub fn to_html(&self, id: NodeId) -> Result<String, UiError> {
        let node = self.node(id)?;
        let mut attrs = String::new();
        for (name, value) in &node.attributes {
            attrs.push_str(&format!(" {name}=\"{value}\""));
        }
        let mut inner = node.text.clone().unwrap_or_default();
        for child in &node.children {
            inner.push_str(&self.to_html(*child)?);
        }
        Ok(format!("<{tag}{attrs}>{inner}</{tag}>", tag = node.tag))
    }

    /// Markup of the whole document, mount point included.
    pub fn html(&self) -> String {
        self.to_html(self.root).unwrap_or_default()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MemoryBackend {
    fn create_node(&mut self, tag: &str) -> Result<NodeId, UiError> {
        if tag.is_empty() {
            return Err(UiError::UnsupportedTag { tag: tag.to_string() });
        }
        if let Some(supported) = &self.supported_tags {
            if !supported.iter().any(|t| t == tag) {
                return Err(UiError::UnsupportedTag { tag: tag.to_string() });
            }
        }
        Ok(self.insert(MemoryNode::new(tag)))
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), UiError> {
        self.node_mut(node)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), UiError> {
        self.node(parent)?;
        self.detach(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> Result<(), UiError> {
        self.detach(new)?;
        let parent_node = self.node_mut(parent)?;
        let index = parent_node
            .children
            .iter()
            .position(|c| *c == old)
            .ok_or(UiError::MissingNode { id: old })?;
        parent_node.children[index] = new;
        self.node_mut(new)?.parent = Some(parent);
        if let Ok(old_node) = self.node_mut(old) {
            old_node.parent = None;
        }
        self.drop_subtree(old);
        Ok(())
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), UiError> {
        let children = std::mem::take(&mut self.node_mut(node)?.children);
        for child in children {
            self.drop_subtree(child);
        }
        self.node_mut(node)?.text = Some(text.to_string());
        Ok(())
    }

    fn add_listener(
        &mut self,
        node: NodeId,
        event: &str,
        callback: EventCallback,
    ) -> Result<(), UiError> {
        self.node_mut(node)?
            .listeners
            .insert(event.to_string(), callback);
        Ok(())
    }

    fn listener(&self, node: NodeId, event: &str) -> Result<Option<EventCallback>, UiError> {
        Ok(self.node(node)?.listeners.get(event).cloned())
    }

    fn request_focus(&mut self, node: NodeId) -> Result<(), UiError> {
        self.node(node)?;
        self.focused = Some(node);
        self.focus_log.push(node);
        Ok(())
    }

    fn mount_point(&mut self) -> NodeId {
        self.root
    }
}
