#[cfg(not(target_arch = "wasm32"))]
use tracing::error;
#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::EnvFilter;

#[cfg(not(target_arch = "wasm32"))]
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("research_copilot=info,demo_core=info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    init_tracing();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Research Copilot demo"),
        ..Default::default()
    };

    if let Err(err) = eframe::run_native(
        "research_copilot_demo",
        options,
        Box::new(|cc| Ok(Box::new(demo_core::DemoApp::new(cc)))),
    ) {
        error!("demo error: {}", err);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
