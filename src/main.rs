//! Halo Field entry point
//!
//! On the web this mounts the engine on `#halo-canvas`. Natively it runs a
//! headless session against the software canvas and logs a summary.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }

    log::info!("Halo Field starting...");
    if !halo_field::platform::web::mount("halo-canvas").await {
        log::info!("Halo Field idle");
    }
}

/// Stop the animation and release the canvas
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn unmount() {
    halo_field::platform::web::unmount();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::time::Duration;

    use halo_field::platform::{ManualHost, pump};
    use halo_field::renderer::PixelCanvas;
    use halo_field::sim::SurfaceInfo;
    use halo_field::{Engine, QualityPreset, Settings};

    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (width, height) = args
        .first()
        .and_then(|s| parse_size(s))
        .unwrap_or((1200.0, 240.0));
    let frames: u32 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(600);
    let mut settings = Settings::load();
    if let Some(preset) = args.get(2).and_then(|s| QualityPreset::from_str(s)) {
        settings.apply_preset(preset);
    }

    log::info!(
        "Halo Field (headless) {}x{}, {} frames, quality {}",
        width,
        height,
        frames,
        settings.quality.as_str()
    );

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let mut engine = Engine::new(ManualHost::new(), Some(PixelCanvas::new()), settings, seed);
    if !engine.initialize(SurfaceInfo::new(width, height, 1.0)) {
        log::error!("Could not initialize a {}x{} surface", width, height);
        std::process::exit(1);
    }
    engine.start();

    let frame = Duration::from_millis(16);
    for i in 0..frames {
        // Halfway through, the container shrinks in a short burst
        if i == frames / 2 {
            for step in 1..=4 {
                let k = 1.0 - 0.1 * step as f32;
                engine.on_resize(SurfaceInfo::new(width * k, height * k, 1.0));
            }
        }
        pump(&mut engine, frame);
    }

    let painted = engine.canvas().map_or(0, |c| c.painted_pixels());
    log::info!(
        "Done: {} frames, {} resizes, {} circles, {} painted pixels",
        engine.frame_count(),
        engine.resize_count(),
        engine.circles().len(),
        painted
    );
    for (i, c) in engine.circles().iter().enumerate() {
        log::debug!(
            "circle {}: pos=({:.1}, {:.1}) r={:.1} speed={:.2}",
            i,
            c.pos.x,
            c.pos.y,
            c.radius,
            c.speed()
        );
    }
    engine.dispose();
}

/// Parse `WIDTHxHEIGHT`
#[cfg(not(target_arch = "wasm32"))]
fn parse_size(s: &str) -> Option<(f32, f32)> {
    let (w, h) = s.split_once(['x', 'X'])?;
    let w: f32 = w.trim().parse().ok()?;
    let h: f32 = h.trim().parse().ok()?;
    (w > 0.0 && h > 0.0).then_some((w, h))
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
