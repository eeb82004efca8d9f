use arbor_core::{attr, on, BuildCx, Ingredient, NodeId, UiError};

pub fn button(
    cx: &mut BuildCx<'_>,
    on_click: impl Fn() -> Result<(), UiError> + 'static,
    ingredients: impl IntoIterator<Item = Ingredient>,
) -> Result<NodeId, UiError> {
    let mut items = vec![on("click", on_click)];
    items.extend(ingredients);
    cx.element("button", items)
}

/// Single-line text field. Callers that want identity preserved across
/// rebuilds add a `key` ingredient.
pub fn text_input(
    cx: &mut BuildCx<'_>,
    value: impl Into<String>,
    ingredients: impl IntoIterator<Item = Ingredient>,
) -> Result<NodeId, UiError> {
    let mut items = vec![attr("type", "text"), attr("value", value)];
    items.extend(ingredients);
    cx.element("input", items)
}
