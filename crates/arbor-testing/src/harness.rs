use arbor_core::{App, BuildCx, Component, MemoryBackend, NodeId, Scope, UiError};

/// Test harness: an [`App`] over the in-memory backend plus the queries and
/// event drivers tests keep reaching for. Query helpers panic on a missing
/// node so assertions stay on one line; the fallible surface stays available
/// through [`TestApp::app`].
pub struct TestApp {
    app: App,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            app: App::new(MemoryBackend::new()),
        }
    }

    /// Harness over a backend restricted to `tags`, for exercising the
    /// unsupported-tag path.
    pub fn with_supported_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            app: App::new(MemoryBackend::with_supported_tags(tags)),
        }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn component<T, F>(&self, state: T, entry: F) -> Component
    where
        T: 'static,
        F: Fn(&mut BuildCx<'_>, &Scope<T>) -> Result<NodeId, UiError> + 'static,
    {
        self.app.component(state, entry)
    }

    pub fn mount(&self, component: &Component) -> NodeId {
        self.app.mount(component).expect("mount")
    }

    pub fn fire(&self, node: NodeId, event: &str) -> Result<(), UiError> {
        self.app.fire(node, event)
    }

    pub fn click(&self, node: NodeId) {
        self.app.fire(node, "click").expect("click")
    }

    fn backend<R>(&self, read: impl FnOnce(&mut MemoryBackend) -> R) -> R {
        self.app.with_backend(read).expect("memory backend")
    }

    pub fn find(&self, tag: &str) -> Option<NodeId> {
        self.backend(|backend| backend.find(tag))
    }

    pub fn expect_find(&self, tag: &str) -> NodeId {
        self.find(tag)
            .unwrap_or_else(|| panic!("no {tag:?} node in the tree"))
    }

    pub fn find_all(&self, tag: &str) -> Vec<NodeId> {
        self.backend(|backend| backend.find_all(tag))
    }

    pub fn text_of(&self, node: NodeId) -> String {
        self.backend(|backend| backend.text_content(node).expect("text content"))
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.backend(|backend| backend.attribute(node, name).expect("attribute"))
    }

    pub fn tag_of(&self, node: NodeId) -> String {
        self.backend(|backend| backend.tag(node).expect("tag"))
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        self.backend(|backend| backend.is_attached(node))
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.backend(|backend| backend.focused())
    }

    pub fn focus_log(&self) -> Vec<NodeId> {
        self.backend(|backend| backend.focus_log())
    }

    pub fn node_count(&self) -> usize {
        self.backend(|backend| backend.node_count())
    }

    pub fn html(&self) -> String {
        self.backend(|backend| backend.html())
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
