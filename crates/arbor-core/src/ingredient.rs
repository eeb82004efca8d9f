use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::app::Component;
use crate::backend::{EventCallback, NodeId};
use crate::error::UiError;

pub type AttributeMap = IndexMap<String, String>;
pub type StyleMap = IndexMap<String, String>;
pub type EventMap = IndexMap<String, EventCallback>;
pub type Listeners = IndexMap<String, EventCallback>;
pub type Props = IndexMap<String, PropValue>;

/// Untyped pass-through data handed to nested components.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl PropValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            PropValue::Flag(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Text(value) => write!(f, "{value}"),
            PropValue::Number(value) => write!(f, "{value}"),
            PropValue::Flag(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Text(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Number(value as f64)
    }
}

impl From<usize> for PropValue {
    fn from(value: usize) -> Self {
        PropValue::Number(value as f64)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Flag(value)
    }
}

/// One variadic argument to the element builder. The closed set of variants
/// replaces shape-probing classification: anything that is not one of these
/// cannot be expressed, so no silent-drop path exists.
pub enum Ingredient {
    /// Attribute name/value pairs, merged last-write-wins per name.
    Attributes(AttributeMap),
    /// Style property/value pairs, merged last-write-wins and serialised to a
    /// single style string.
    Style(StyleMap),
    /// Event name to callback, merged last-write-wins per event name.
    Events(EventMap),
    /// Logical identity used to reconnect the element to a previously-live
    /// node across a rebuild.
    Key(String),
    /// Replaces the element's rendered content wholesale; the last text
    /// ingredient wins.
    Text(String),
    /// An already-built native node, appended as a child.
    Child(NodeId),
    /// A nested component instance, mounted and rendered in place.
    Component(MountSpec),
    /// A sequence flattened recursively into its surroundings.
    List(Vec<Ingredient>),
}

/// Mount request for a nested component: the instance plus the properties and
/// listeners it receives for this mount. Both are re-evaluated on every mount
/// and are not reactive on their own.
pub struct MountSpec {
    pub(crate) component: Component,
    pub(crate) props: Props,
    pub(crate) listeners: Listeners,
}

impl MountSpec {
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    pub fn listener(
        mut self,
        event: impl Into<String>,
        callback: impl Fn() -> Result<(), UiError> + 'static,
    ) -> Self {
        self.listeners.insert(event.into(), Rc::new(callback));
        self
    }
}

impl From<MountSpec> for Ingredient {
    fn from(spec: MountSpec) -> Self {
        Ingredient::Component(spec)
    }
}

pub fn attrs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Ingredient
where
    K: Into<String>,
    V: Into<String>,
{
    Ingredient::Attributes(
        pairs
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect(),
    )
}

pub fn attr(name: impl Into<String>, value: impl Into<String>) -> Ingredient {
    attrs([(name.into(), value.into())])
}

pub fn style<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Ingredient
where
    K: Into<String>,
    V: Into<String>,
{
    Ingredient::Style(
        pairs
            .into_iter()
            .map(|(prop, value)| (prop.into(), value.into()))
            .collect(),
    )
}

pub fn on(
    event: impl Into<String>,
    callback: impl Fn() -> Result<(), UiError> + 'static,
) -> Ingredient {
    let mut map = EventMap::new();
    map.insert(event.into(), Rc::new(callback) as EventCallback);
    Ingredient::Events(map)
}

pub fn key(value: impl Into<String>) -> Ingredient {
    Ingredient::Key(value.into())
}

pub fn text(value: impl Into<String>) -> Ingredient {
    Ingredient::Text(value.into())
}

pub fn child(node: NodeId) -> Ingredient {
    Ingredient::Child(node)
}

pub fn list(items: impl IntoIterator<Item = Ingredient>) -> Ingredient {
    Ingredient::List(items.into_iter().collect())
}

/// Starts a mount request for `component`; chain `prop`/`listener` calls and
/// pass the result to the builder via `into()`.
pub fn mount(component: &Component) -> MountSpec {
    MountSpec {
        component: component.clone(),
        props: Props::new(),
        listeners: Listeners::new(),
    }
}

/// Serialises a merged style map to the single string the style attribute
/// carries.
pub(crate) fn style_string(styles: &StyleMap) -> String {
    styles
        .iter()
        .map(|(prop, value)| format!("{prop}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_merge_is_last_write_wins() {
        let mut merged = StyleMap::new();
        for ingredient in [
            style([("color", "red"), ("margin", "4px")]),
            style([("color", "blue")]),
        ] {
            match ingredient {
                Ingredient::Style(map) => merged.extend(map),
                _ => unreachable!(),
            }
        }
        assert_eq!(style_string(&merged), "color: blue; margin: 4px;");
    }

    #[test]
    fn prop_values_convert_and_display() {
        assert_eq!(PropValue::from("url"), PropValue::Text("url".to_string()));
        assert_eq!(PropValue::from(3usize), PropValue::Number(3.0));
        assert_eq!(PropValue::from(true), PropValue::Flag(true));
        assert_eq!(PropValue::from(3usize).to_string(), "3");
        assert_eq!(PropValue::from("a").to_string(), "a");
    }
}
