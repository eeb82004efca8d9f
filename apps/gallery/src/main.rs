//! Image-gallery demo over the in-memory backend: navigation, a keyed caption
//! field whose node identity survives rebuilds, and a nested stateful rating
//! component. Interactions are simulated and the resulting markup printed.

use arbor_core::{attr, child, key, mount, on, style, text, App, Component, MemoryBackend, NodeId};
use arbor_widgets::{button, column, heading, image, label, paragraph, row, text_input};

const PICTURES: &[(&str, &str)] = &[
    ("img/lighthouse.jpg", "Lighthouse at dusk"),
    ("img/orchard.jpg", "Orchard in spring"),
    ("img/harbor.jpg", "Harbor before the storm"),
];

#[derive(Clone)]
struct GalleryState {
    index: usize,
    caption: String,
    accent: &'static str,
    status: String,
}

#[derive(Clone)]
struct RatingState {
    stars: usize,
}

fn build_rating(app: &App) -> Component {
    app.component(RatingState { stars: 0 }, |cx, scope| {
        let votes = scope.state().clone();
        let rated = scope.listener("rated");
        let rate = button(
            cx,
            move || {
                votes.update(|state| state.stars += 1)?;
                match &rated {
                    Some(notify) => notify(),
                    None => Ok(()),
                }
            },
            [text("rate +1")],
        )?;
        let picture = scope
            .prop("picture")
            .map(|value| value.to_string())
            .unwrap_or_else(|| "this picture".to_string());
        let tally = label(
            cx,
            [text(format!(
                "stars for {picture}: {}",
                scope.state().get().stars
            ))],
        )?;
        row(cx, [child(rate), child(tally)])
    })
}

fn build_gallery(app: &App, rating: Component) -> Component {
    app.component(
        GalleryState {
            index: 0,
            caption: String::new(),
            accent: "red",
            status: "Pick a picture you like".to_string(),
        },
        move |cx, scope| {
            let state = scope.state().get();
            let (src, title) = PICTURES[state.index];

            let title_node = heading(cx, [text("Arbor Gallery")])?;
            let picture = image(cx, src, [attr("alt", title)])?;

            let back = scope.state().clone();
            let previous = button(
                cx,
                move || {
                    back.update(|state| {
                        state.index = (state.index + PICTURES.len() - 1) % PICTURES.len();
                    })
                },
                [text("< previous")],
            )?;
            let forward = scope.state().clone();
            let next = button(
                cx,
                move || {
                    forward.update(|state| state.index = (state.index + 1) % PICTURES.len())
                },
                [text("next >")],
            )?;
            let recolor = scope.state().clone();
            let accent = button(
                cx,
                move || {
                    recolor.update(|state| {
                        state.accent = if state.accent == "red" { "blue" } else { "red" };
                    })
                },
                [text("swap accent")],
            )?;
            let controls = row(cx, [child(previous), child(next), child(accent)])?;

            let typing = scope.state().clone();
            let caption = text_input(
                cx,
                state.caption.clone(),
                [
                    key("caption"),
                    on("input", move || {
                        typing.update(|state| state.caption.push('!'))
                    }),
                ],
            )?;
            let caption_line = paragraph(cx, [text(format!("caption: {}", state.caption))])?;

            let status = paragraph(
                cx,
                [
                    style([("color", state.accent)]),
                    text(format!("{} — now showing {title}", state.status)),
                ],
            )?;

            let voted = scope.state().clone();
            let stars = mount(&rating)
                .prop("picture", title)
                .listener("rated", move || {
                    voted.update(|state| state.status = "Thanks for the vote".to_string())
                })
                .into();

            column(
                cx,
                [
                    child(title_node),
                    child(picture),
                    child(controls),
                    child(caption),
                    child(caption_line),
                    child(status),
                    stars,
                ],
            )
        },
    )
}

fn button_labeled(app: &App, wanted: &str) -> NodeId {
    app.with_backend(|backend: &mut MemoryBackend| {
        backend.find_all("button").into_iter().find(|node| {
            backend
                .text_content(*node)
                .map(|content| content == wanted)
                .unwrap_or(false)
        })
    })
    .expect("memory backend")
    .unwrap_or_else(|| panic!("no button labeled {wanted:?}"))
}

fn show(app: &App, moment: &str) {
    let (markup, focused) = app
        .with_backend(|backend: &mut MemoryBackend| (backend.html(), backend.focused()))
        .expect("memory backend");
    println!("--- {moment}");
    println!("{markup}");
    println!("    focused node: {focused:?}");
    println!();
}

fn main() {
    env_logger::init();

    println!("=== Arbor Gallery Example ===");
    println!("Simulates clicks and keystrokes against the in-memory backend,");
    println!("printing the rendered markup after each interaction.");
    println!();

    let app = App::new(MemoryBackend::new());
    let rating = build_rating(&app);
    let gallery = build_gallery(&app, rating);
    app.mount(&gallery).expect("mount gallery");
    show(&app, "initial render");

    app.fire(button_labeled(&app, "next >"), "click")
        .expect("advance");
    show(&app, "after next >");

    let caption = app
        .with_backend(|backend: &mut MemoryBackend| backend.find("input").expect("caption field"))
        .expect("memory backend");
    app.fire(caption, "input").expect("keystroke");
    app.fire(caption, "input").expect("keystroke");
    let caption_after = app
        .with_backend(|backend: &mut MemoryBackend| backend.find("input").expect("caption field"))
        .expect("memory backend");
    log::info!("caption field {caption} survived two rebuilds as {caption_after}");
    println!(
        "caption field node {caption} is still node {caption_after} after two keystrokes"
    );
    show(&app, "after typing into the keyed caption field");

    app.fire(button_labeled(&app, "rate +1"), "click")
        .expect("vote");
    app.fire(button_labeled(&app, "swap accent"), "click")
        .expect("recolor");
    show(&app, "after voting and swapping the accent");
}
