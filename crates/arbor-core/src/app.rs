use std::any::type_name;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::backend::{Backend, EventCallback, NodeId};
use crate::error::UiError;
use crate::focus::FocusRegistry;
use crate::ingredient::{
    style_string, AttributeMap, EventMap, Ingredient, Listeners, MountSpec, PropValue, Props,
    StyleMap,
};
use crate::state::StateCell;

pub type InstanceId = usize;

/// Bound on synchronous nested-render recursion. A component that mounts
/// itself, or a render that keeps scheduling renders, surfaces
/// `UiError::RenderCycle` here instead of exhausting the stack.
const MAX_RENDER_DEPTH: usize = 64;

pub(crate) type RuntimeRef = Rc<RefCell<RuntimeInner>>;
pub(crate) type WeakRuntime = Weak<RefCell<RuntimeInner>>;

type RenderFn =
    Rc<dyn Fn(&mut RuntimeInner, &WeakRuntime, InstanceId) -> Result<NodeId, UiError>>;

pub(crate) struct InstanceEntry {
    render: RenderFn,
    parent: Option<NodeId>,
    last_node: Option<NodeId>,
    children: Vec<InstanceId>,
    props: Props,
    listeners: Listeners,
    disposers: Vec<Box<dyn FnOnce()>>,
}

pub(crate) struct RuntimeInner {
    backend: Box<dyn Backend>,
    instances: Vec<Option<InstanceEntry>>,
    focus: FocusRegistry,
    depth: usize,
}

impl RuntimeInner {
    fn instance(&self, id: InstanceId) -> Result<&InstanceEntry, UiError> {
        self.instances
            .get(id)
            .and_then(|slot| slot.as_ref())
            .ok_or(UiError::UnknownInstance { instance: id })
    }

    fn instance_mut(&mut self, id: InstanceId) -> Result<&mut InstanceEntry, UiError> {
        self.instances
            .get_mut(id)
            .and_then(|slot| slot.as_mut())
            .ok_or(UiError::UnknownInstance { instance: id })
    }
}

/// The root of a running application: owns the host backend and every
/// component instance. State writes re-enter through weak handles to this
/// runtime, so dropping the `App` invalidates all of them.
pub struct App {
    inner: RuntimeRef,
}

impl App {
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(RuntimeInner {
                backend: Box::new(backend),
                instances: Vec::new(),
                focus: FocusRegistry::default(),
                depth: 0,
            })),
        }
    }

    /// Registers a stateful component: an entry point from state to tree plus
    /// its own reactive state cell. The returned handle is what parents mount.
    pub fn component<T, F>(&self, state: T, entry: F) -> Component
    where
        T: 'static,
        F: Fn(&mut BuildCx<'_>, &Scope<T>) -> Result<NodeId, UiError> + 'static,
    {
        let cell = StateCell::new(state);
        let render_cell = cell.clone();
        let render: RenderFn = Rc::new(move |rt, runtime, id| {
            let (props, listeners) = {
                let inst = rt.instance(id)?;
                (inst.props.clone(), inst.listeners.clone())
            };
            let scope = Scope {
                state: render_cell.clone(),
                props,
                listeners,
            };
            let mut cx = BuildCx {
                rt,
                runtime: runtime.clone(),
                instance: id,
            };
            entry(&mut cx, &scope)
        });
        let id = {
            let mut rt = self.inner.borrow_mut();
            let id = rt.instances.len();
            rt.instances.push(Some(InstanceEntry {
                render,
                parent: None,
                last_node: None,
                children: Vec::new(),
                props: Props::new(),
                listeners: Listeners::new(),
                disposers: Vec::new(),
            }));
            id
        };
        cell.bind(id, Rc::downgrade(&self.inner));
        Component {
            id,
            runtime: Rc::downgrade(&self.inner),
        }
    }

    /// Renders `component` as the root, attached at the backend's mount point.
    pub fn mount(&self, component: &Component) -> Result<NodeId, UiError> {
        let runtime = Rc::downgrade(&self.inner);
        let mut rt = self
            .inner
            .try_borrow_mut()
            .map_err(|_| UiError::RenderCycle {
                instance: component.id,
            })?;
        let mount_point = rt.backend.mount_point();
        rt.instance_mut(component.id)?.parent = Some(mount_point);
        render_instance(&mut rt, &runtime, component.id)
    }

    /// Delivers an event the way a host would: a node without a binding for
    /// `event` is a silent no-op, a dead node is an error.
    pub fn fire(&self, node: NodeId, event: &str) -> Result<(), UiError> {
        let callback = {
            let rt = self.inner.borrow();
            rt.backend.listener(node, event)?
        };
        match callback {
            Some(callback) => callback(),
            None => Ok(()),
        }
    }

    /// Typed access to the backend, for tests and demo drivers.
    pub fn with_backend<B, R>(&self, read: impl FnOnce(&mut B) -> R) -> Result<R, UiError>
    where
        B: Backend,
    {
        let mut rt = self.inner.borrow_mut();
        let backend = rt
            .backend
            .as_any_mut()
            .downcast_mut::<B>()
            .ok_or(UiError::BackendMismatch {
                expected: type_name::<B>(),
            })?;
        Ok(read(backend))
    }
}

/// Cloneable handle to a registered component instance.
#[derive(Clone)]
pub struct Component {
    pub(crate) id: InstanceId,
    pub(crate) runtime: WeakRuntime,
}

impl Component {
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Registers a hook that runs when a parent rebuild abandons this
    /// instance, so owned resources can be released deterministically.
    pub fn on_dispose(&self, hook: impl FnOnce() + 'static) -> Result<(), UiError> {
        let runtime = self.runtime.upgrade().ok_or(UiError::RuntimeDropped)?;
        let mut rt = runtime.borrow_mut();
        rt.instance_mut(self.id)?.disposers.push(Box::new(hook));
        Ok(())
    }
}

/// What an entry point sees of its instance: the state cell plus the
/// properties and listeners supplied by the most recent mount.
pub struct Scope<T> {
    state: StateCell<T>,
    props: Props,
    listeners: Listeners,
}

impl<T> Scope<T> {
    pub fn state(&self) -> &StateCell<T> {
        &self.state
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn prop(&self, name: &str) -> Option<&PropValue> {
        self.props.get(name)
    }

    pub fn listener(&self, event: &str) -> Option<EventCallback> {
        self.listeners.get(event).cloned()
    }

    /// Invokes the parent-supplied listener for `event`, if one was passed.
    pub fn emit(&self, event: &str) -> Result<(), UiError> {
        match self.listener(event) {
            Some(callback) => callback(),
            None => Ok(()),
        }
    }
}

enum Content {
    Node(NodeId),
    Text(String),
    Mount(MountSpec),
}

/// Build context threaded through one render pass of one instance. The
/// element builder and nested mounts go through here, which is what scopes
/// keyed-identity lookups to the rendering component.
pub struct BuildCx<'a> {
    rt: &'a mut RuntimeInner,
    runtime: WeakRuntime,
    instance: InstanceId,
}

impl BuildCx<'_> {
    /// Builds one native node from `tag` and its ingredients: merged
    /// attributes, one serialised style string, wrapped event listeners, then
    /// the content pass in supply order. If the element's key matches the
    /// node cached for this instance, that cached node is spliced in as the
    /// output instead of the freshly configured one.
    pub fn element(
        &mut self,
        tag: &str,
        ingredients: impl IntoIterator<Item = Ingredient>,
    ) -> Result<NodeId, UiError> {
        let mut attributes = AttributeMap::new();
        let mut styles = StyleMap::new();
        let mut events = EventMap::new();
        let mut element_key = None;
        let mut content = Vec::new();
        collect(
            ingredients,
            &mut attributes,
            &mut styles,
            &mut events,
            &mut element_key,
            &mut content,
        );

        let node = self.rt.backend.create_node(tag)?;
        for (name, value) in &attributes {
            self.rt.backend.set_attribute(node, name, value)?;
        }
        if !styles.is_empty() {
            self.rt
                .backend
                .set_attribute(node, "style", &style_string(&styles))?;
        }
        for (event, callback) in &events {
            let wrapped = wrap_listener(
                self.runtime.clone(),
                self.instance,
                element_key.clone(),
                node,
                callback.clone(),
            );
            self.rt.backend.add_listener(node, event, wrapped)?;
        }

        let mut output = node;
        if let Some(element_key) = &element_key {
            if let Some(cached) = self.rt.focus.try_reuse(self.instance, element_key) {
                log::debug!("splicing cached node {cached} for key {element_key:?}");
                output = cached;
            }
        }

        for item in content {
            match item {
                Content::Node(node) => self.rt.backend.append_child(output, node)?,
                Content::Text(value) => self.rt.backend.set_text(output, &value)?,
                Content::Mount(spec) => {
                    self.mount_component(spec, output)?;
                }
            }
        }
        Ok(output)
    }

    fn mount_component(&mut self, spec: MountSpec, parent: NodeId) -> Result<NodeId, UiError> {
        let child = spec.component.id;
        if self.rt.instance(self.instance)?.children.contains(&child) {
            return Err(UiError::AlreadyMounted { instance: child });
        }
        {
            let inst = self.rt.instance_mut(child)?;
            inst.props = spec.props;
            inst.listeners = spec.listeners;
            inst.parent = Some(parent);
            inst.last_node = None;
        }
        self.rt.instance_mut(self.instance)?.children.push(child);
        render_instance(self.rt, &self.runtime, child)
    }
}

fn collect(
    ingredients: impl IntoIterator<Item = Ingredient>,
    attributes: &mut AttributeMap,
    styles: &mut StyleMap,
    events: &mut EventMap,
    element_key: &mut Option<String>,
    content: &mut Vec<Content>,
) {
    for ingredient in ingredients {
        match ingredient {
            Ingredient::Attributes(map) => attributes.extend(map),
            Ingredient::Style(map) => styles.extend(map),
            Ingredient::Events(map) => events.extend(map),
            Ingredient::Key(value) => *element_key = Some(value),
            Ingredient::Text(value) => content.push(Content::Text(value)),
            Ingredient::Child(node) => content.push(Content::Node(node)),
            Ingredient::Component(spec) => content.push(Content::Mount(spec)),
            Ingredient::List(items) => {
                collect(items, attributes, styles, events, element_key, content)
            }
        }
    }
}

/// Wraps a user callback so that firing it first records (or clears) the
/// keyed identity of the node it is bound to, then runs the user's handler.
fn wrap_listener(
    runtime: WeakRuntime,
    instance: InstanceId,
    element_key: Option<String>,
    node: NodeId,
    callback: EventCallback,
) -> EventCallback {
    Rc::new(move || {
        if let Some(rt) = runtime.upgrade() {
            let mut rt = rt
                .try_borrow_mut()
                .map_err(|_| UiError::RenderCycle { instance })?;
            match &element_key {
                Some(key) => rt.focus.record(instance, key.clone(), node),
                None => rt.focus.clear(instance),
            }
        }
        callback()
    })
}

pub(crate) fn render_instance(
    rt: &mut RuntimeInner,
    runtime: &WeakRuntime,
    id: InstanceId,
) -> Result<NodeId, UiError> {
    if rt.depth >= MAX_RENDER_DEPTH {
        return Err(UiError::RenderCycle { instance: id });
    }
    rt.depth += 1;
    let result = render_pass(rt, runtime, id);
    rt.depth -= 1;
    result
}

fn render_pass(
    rt: &mut RuntimeInner,
    runtime: &WeakRuntime,
    id: InstanceId,
) -> Result<NodeId, UiError> {
    let (entry, previous_children) = {
        let inst = rt.instance_mut(id)?;
        if inst.parent.is_none() {
            return Err(UiError::NotMounted { instance: id });
        }
        (inst.render.clone(), std::mem::take(&mut inst.children))
    };
    log::debug!("render pass for instance {id}");
    rt.focus.begin_pass(id);
    let new_node = entry(rt, runtime, id)?;

    let inst = rt.instance(id)?;
    let parent = inst.parent.ok_or(UiError::NotMounted { instance: id })?;
    match inst.last_node {
        Some(old) if old != new_node => rt.backend.replace_child(parent, old, new_node)?,
        Some(_) => {}
        None => rt.backend.append_child(parent, new_node)?,
    }
    rt.instance_mut(id)?.last_node = Some(new_node);

    let current_children = rt.instance(id)?.children.clone();
    for child in previous_children {
        if !current_children.contains(&child) {
            dispose_instance(rt, child);
        }
    }

    if let Some(node) = rt.focus.finish_pass(id) {
        rt.backend.request_focus(node)?;
    }
    Ok(new_node)
}

fn dispose_instance(rt: &mut RuntimeInner, id: InstanceId) {
    let Some(entry) = rt.instances.get_mut(id).and_then(|slot| slot.take()) else {
        return;
    };
    log::debug!("disposing instance {id}");
    rt.focus.clear(id);
    for child in entry.children {
        dispose_instance(rt, child);
    }
    for hook in entry.disposers {
        hook();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::ingredient::{mount, on, text};
    use std::cell::Cell;

    fn memory_app() -> App {
        App::new(MemoryBackend::new())
    }

    #[test]
    fn render_before_mount_fails_loudly() {
        let app = memory_app();
        let component = app.component(0i32, |cx, _| cx.element("p", [text("never")]));
        let runtime = component.runtime.upgrade().expect("runtime");
        let mut rt = runtime.borrow_mut();
        let weak = component.runtime.clone();
        let err = render_instance(&mut rt, &weak, component.id).expect_err("unmounted render");
        assert_eq!(
            err,
            UiError::NotMounted {
                instance: component.id
            }
        );
    }

    #[test]
    fn reentrant_write_during_render_is_a_cycle() {
        let app = memory_app();
        let component = app.component(0i32, |cx, scope| {
            scope.state().set(1)?;
            cx.element("p", [text("unreachable")])
        });
        let err = app.mount(&component).expect_err("cycle");
        assert_eq!(
            err,
            UiError::RenderCycle {
                instance: component.id()
            }
        );
    }

    #[test]
    fn self_mounting_component_hits_the_depth_guard() {
        let app = memory_app();
        let handle: Rc<RefCell<Option<Component>>> = Rc::new(RefCell::new(None));
        let inner = handle.clone();
        let component = app.component((), move |cx, _| {
            let me = inner.borrow().clone().expect("own handle");
            cx.element("div", [mount(&me).into()])
        });
        *handle.borrow_mut() = Some(component.clone());
        let err = app.mount(&component).expect_err("runaway recursion");
        assert!(matches!(err, UiError::RenderCycle { .. }));
    }

    #[test]
    fn double_mount_in_one_pass_is_rejected() {
        let app = memory_app();
        let child = app.component((), |cx, _| cx.element("p", [text("leaf")]));
        let child_for_entry = child.clone();
        let parent = app.component((), move |cx, _| {
            cx.element(
                "div",
                [
                    mount(&child_for_entry).into(),
                    mount(&child_for_entry).into(),
                ],
            )
        });
        let err = app.mount(&parent).expect_err("double mount");
        assert_eq!(err, UiError::AlreadyMounted { instance: child.id() });
    }

    #[test]
    fn abandoned_child_is_disposed_and_forgotten() {
        let app = memory_app();
        let disposed = Rc::new(Cell::new(false));
        let child = app.component(0i32, |cx, _| cx.element("p", [text("child")]));
        let flag = disposed.clone();
        child.on_dispose(move || flag.set(true)).expect("hook");

        let parent_state: Rc<RefCell<Option<StateCell<bool>>>> = Rc::new(RefCell::new(None));
        let capture = parent_state.clone();
        let child_for_entry = child.clone();
        let parent = app.component(true, move |cx, scope| {
            *capture.borrow_mut() = Some(scope.state().clone());
            if scope.state().get() {
                cx.element("div", [mount(&child_for_entry).into()])
            } else {
                cx.element("div", [text("empty")])
            }
        });
        app.mount(&parent).expect("mount");
        assert!(!disposed.get());

        let cell = parent_state.borrow().clone().expect("state");
        cell.set(false).expect("toggle");
        assert!(disposed.get());

        let runtime = child.runtime.upgrade().expect("runtime");
        let err = {
            let rt = runtime.borrow();
            rt.instance(child.id()).err().expect("disposed")
        };
        assert_eq!(err, UiError::UnknownInstance { instance: child.id() });
    }

    #[test]
    fn mount_refreshes_props_each_pass() {
        let app = memory_app();
        let child = app.component((), |cx, scope| {
            let label = scope
                .prop("label")
                .map(|value| value.to_string())
                .unwrap_or_default();
            cx.element("p", [text(label)])
        });

        let captured: Rc<RefCell<Option<StateCell<i32>>>> = Rc::new(RefCell::new(None));
        let capture = captured.clone();
        let child_for_entry = child.clone();
        let parent = app.component(0i32, move |cx, scope| {
            *capture.borrow_mut() = Some(scope.state().clone());
            let label = format!("round {}", scope.state().get());
            cx.element("div", [mount(&child_for_entry).prop("label", label).into()])
        });
        app.mount(&parent).expect("mount");

        let paragraph_text = app
            .with_backend(|backend: &mut MemoryBackend| {
                let node = backend.find("p").expect("paragraph");
                backend.text_content(node).expect("text")
            })
            .expect("backend");
        assert_eq!(paragraph_text, "round 0");

        let cell = captured.borrow().clone().expect("state");
        cell.set(3).expect("write");
        let paragraph_text = app
            .with_backend(|backend: &mut MemoryBackend| {
                let node = backend.find("p").expect("paragraph");
                backend.text_content(node).expect("text")
            })
            .expect("backend");
        assert_eq!(paragraph_text, "round 3");
    }

    #[test]
    fn fire_without_binding_is_a_no_op_and_dead_nodes_error() {
        let app = memory_app();
        let component = app.component((), |cx, _| {
            cx.element("button", [on("click", || Ok(())), text("ok")])
        });
        app.mount(&component).expect("mount");
        let button = app
            .with_backend(|backend: &mut MemoryBackend| backend.find("button").expect("button"))
            .expect("backend");
        app.fire(button, "keydown").expect("unbound event no-ops");
        let err = app.fire(9999, "click").expect_err("dead node");
        assert_eq!(err, UiError::MissingNode { id: 9999 });
    }
}
