#![cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures as _; // ensure the crate is linked for wasm_bindgen async
use web_sys::HtmlCanvasElement;

const CANVAS_ID: &str = "the_canvas_id";

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    wasm_bindgen_futures::spawn_local(async {
        if let Err(err) = run().await {
            web_sys::console::error_1(&err);
        }
    });
    Ok(())
}

/// Runs the demo on the hosting page, so the overlay sees its real URL and
/// document title. Pages outside arXiv fall back to the sample paper.
#[wasm_bindgen]
pub async fn run() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| JsValue::from_str("canvas with id 'the_canvas_id' not found"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str("failed to cast to HtmlCanvasElement"))?;

    let href = window.location().href()?;
    let page = href
        .contains("arxiv.org")
        .then(|| (href.clone(), document.title()));

    let web_options = eframe::WebOptions::default();
    eframe::WebRunner::new()
        .start(
            canvas,
            web_options,
            Box::new(move |cc| {
                let mut app = demo_core::DemoApp::new(cc);
                if let Some((url, title)) = page {
                    app = app.with_page(url, title);
                }
                Ok::<Box<dyn eframe::App>, _>(Box::new(app))
            }),
        )
        .await?;
    Ok(())
}
