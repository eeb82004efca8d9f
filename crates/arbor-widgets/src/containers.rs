use arbor_core::{style, BuildCx, Ingredient, NodeId, UiError};

/// Flex row container. Caller ingredients come after the defaults, so caller
/// styles win the merge.
pub fn row(
    cx: &mut BuildCx<'_>,
    ingredients: impl IntoIterator<Item = Ingredient>,
) -> Result<NodeId, UiError> {
    let mut items = vec![style([("display", "flex"), ("flex-direction", "row")])];
    items.extend(ingredients);
    cx.element("div", items)
}

/// Flex column container.
pub fn column(
    cx: &mut BuildCx<'_>,
    ingredients: impl IntoIterator<Item = Ingredient>,
) -> Result<NodeId, UiError> {
    let mut items = vec![style([("display", "flex"), ("flex-direction", "column")])];
    items.extend(ingredients);
    cx.element("div", items)
}

#[cfg(test)]
mod tests {
    use arbor_core::style;
    use arbor_testing::TestApp;

    #[test]
    fn containers_carry_flex_styles() {
        let app = TestApp::new();
        let component = app.component((), |cx, _| {
            let inner = super::row(cx, [])?;
            super::column(cx, [arbor_core::child(inner)])
        });
        app.mount(&component);
        let boxes = app.find_all("div");
        assert_eq!(
            app.attribute(boxes[0], "style"),
            Some("display: flex; flex-direction: column;".to_string())
        );
        assert_eq!(
            app.attribute(boxes[1], "style"),
            Some("display: flex; flex-direction: row;".to_string())
        );
    }

    #[test]
    fn caller_styles_override_container_defaults() {
        let app = TestApp::new();
        let component = app.component((), |cx, _| {
            super::row(cx, [style([("flex-direction", "row-reverse")])])
        });
        app.mount(&component);
        let node = app.expect_find("div");
        assert_eq!(
            app.attribute(node, "style"),
            Some("display: flex; flex-direction: row-reverse;".to_string())
        );
    }
}
