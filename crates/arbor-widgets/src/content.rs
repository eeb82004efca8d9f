use arbor_core::{attr, BuildCx, Ingredient, NodeId, UiError};

pub fn heading(
    cx: &mut BuildCx<'_>,
    ingredients: impl IntoIterator<Item = Ingredient>,
) -> Result<NodeId, UiError> {
    cx.element("h1", ingredients)
}

pub fn paragraph(
    cx: &mut BuildCx<'_>,
    ingredients: impl IntoIterator<Item = Ingredient>,
) -> Result<NodeId, UiError> {
    cx.element("p", ingredients)
}

pub fn label(
    cx: &mut BuildCx<'_>,
    ingredients: impl IntoIterator<Item = Ingredient>,
) -> Result<NodeId, UiError> {
    cx.element("span", ingredients)
}

pub fn image(
    cx: &mut BuildCx<'_>,
    src: impl Into<String>,
    ingredients: impl IntoIterator<Item = Ingredient>,
) -> Result<NodeId, UiError> {
    let mut items = vec![attr("src", src)];
    items.extend(ingredients);
    cx.element("img", items)
}

#[cfg(test)]
mod tests {
    use arbor_core::text;
    use arbor_testing::TestApp;

    #[test]
    fn content_helpers_use_their_tags() {
        let app = TestApp::new();
        let component = app.component((), |cx, _| {
            let title = super::heading(cx, [text("Gallery")])?;
            let line = super::paragraph(cx, [text("welcome")])?;
            let picture = super::image(cx, "cat.png", [])?;
            cx.element(
                "div",
                [
                    arbor_core::child(title),
                    arbor_core::child(line),
                    arbor_core::child(picture),
                ],
            )
        });
        app.mount(&component);
        assert_eq!(app.text_of(app.expect_find("h1")), "Gallery");
        assert_eq!(app.text_of(app.expect_find("p")), "welcome");
        assert_eq!(
            app.attribute(app.expect_find("img"), "src"),
            Some("cat.png".to_string())
        );
    }
}
