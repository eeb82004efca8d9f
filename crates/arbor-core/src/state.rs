use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::app::{render_instance, InstanceId, WeakRuntime};
use crate::error::UiError;

struct CellInner<T> {
    value: RefCell<T>,
    owner: RefCell<Option<Owner>>,
}

#[derive(Clone)]
struct Owner {
    instance: InstanceId,
    runtime: WeakRuntime,
}

/// Reactive state container for one component instance. Reads always see the
/// current value; any write replaces the whole value and synchronously
/// re-renders the owning component's subtree. The value type fixes the shape
/// of the state up front; there is no dynamic key set.
pub struct StateCell<T> {
    inner: Rc<CellInner<T>>,
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> StateCell<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            inner: Rc::new(CellInner {
                value: RefCell::new(value),
                owner: RefCell::new(None),
            }),
        }
    }

    pub(crate) fn bind(&self, instance: InstanceId, runtime: WeakRuntime) {
        *self.inner.owner.borrow_mut() = Some(Owner { instance, runtime });
    }

    /// Replaces the whole value and re-renders the owner.
    pub fn set(&self, value: T) -> Result<(), UiError> {
        *self.inner.value.borrow_mut() = value;
        self.render_owner()
    }

    /// Merge-on-write: applies `mutate` to the current value and counts as a
    /// single whole-value write with exactly one render pass.
    pub fn update(&self, mutate: impl FnOnce(&mut T)) -> Result<(), UiError> {
        {
            let mut value = self.inner.value.borrow_mut();
            mutate(&mut value);
        }
        self.render_owner()
    }

    /// Reads the current value without cloning it.
    pub fn with<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        read(&self.inner.value.borrow())
    }

    fn render_owner(&self) -> Result<(), UiError> {
        let owner = self
            .inner
            .owner
            .borrow()
            .clone()
            .ok_or(UiError::RuntimeDropped)?;
        let runtime = owner.runtime.upgrade().ok_or(UiError::RuntimeDropped)?;
        let mut rt = runtime
            .try_borrow_mut()
            .map_err(|_| UiError::RenderCycle {
                instance: owner.instance,
            })?;
        render_instance(&mut rt, &owner.runtime, owner.instance)?;
        Ok(())
    }
}

impl<T: Clone + 'static> StateCell<T> {
    /// Current value, never the one captured at render time.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }
}

impl<T: fmt::Debug> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}
