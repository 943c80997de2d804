//! Browser host: requestAnimationFrame, setTimeout and ResizeObserver
//!
//! The engine lives in an `Rc<RefCell<_>>`; every browser callback holds only
//! a `Weak` to it, so callbacks that outlive an unmounted engine do nothing.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use glam::{UVec2, Vec2};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlCanvasElement, ResizeObserver, ResizeObserverEntry, Window};

use crate::engine::{Engine, FrameToken, Host, TimerToken};
use crate::renderer::{Canvas, Paint, SdfCanvas, SurfaceError};
use crate::settings::Settings;
use crate::sim::{Surface, SurfaceInfo};

pub type WebEngine = Engine<WebHost, WebCanvas>;

thread_local! {
    static MOUNTED: RefCell<Option<Rc<RefCell<WebEngine>>>> = const { RefCell::new(None) };
}

/// A `<canvas>` element and the GPU canvas drawing into it
pub struct WebCanvas {
    element: HtmlCanvasElement,
    gpu: SdfCanvas,
}

impl Canvas for WebCanvas {
    fn max_dimension(&self) -> u32 {
        self.gpu.max_dimension()
    }

    fn configure(&mut self, backing: UVec2, device_scale: f32) -> Result<(), SurfaceError> {
        self.gpu.configure(backing, device_scale)?;
        self.element.set_width(backing.x);
        self.element.set_height(backing.y);
        Ok(())
    }

    fn clear(&mut self, size: Vec2) {
        self.gpu.clear(size);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        self.gpu.fill_circle(center, radius, paint);
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        self.gpu.present()
    }
}

pub struct WebHost {
    window: Window,
    container: Element,
    engine: Weak<RefCell<WebEngine>>,
    next_id: u64,
    frames: Vec<(FrameToken, i32)>,
    timers: Vec<(TimerToken, i32)>,
    observer: Option<(ResizeObserver, Closure<dyn FnMut(js_sys::Array)>)>,
}

impl WebHost {
    fn new(window: Window, container: Element, engine: Weak<RefCell<WebEngine>>) -> Self {
        Self {
            window,
            container,
            engine,
            next_id: 0,
            frames: Vec::new(),
            timers: Vec::new(),
            observer: None,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Run `f` against the engine if it is still mounted and not mid-callback
fn with_engine(engine: &Weak<RefCell<WebEngine>>, f: impl FnOnce(&mut WebEngine)) {
    let Some(engine) = engine.upgrade() else {
        return;
    };
    match engine.try_borrow_mut() {
        Ok(mut e) => f(&mut e),
        Err(_) => log::warn!("Engine busy; callback dropped"),
    }
}

impl Host for WebHost {
    fn request_frame(&mut self) -> Option<FrameToken> {
        let token = FrameToken(self.next_id());
        let engine = self.engine.clone();
        let callback = Closure::once_into_js(move |_time: f64| {
            with_engine(&engine, |e| {
                e.host_mut().frames.retain(|&(t, _)| t != token);
                e.on_frame(token);
            });
        });
        match self.window.request_animation_frame(callback.unchecked_ref()) {
            Ok(id) => {
                self.frames.push((token, id));
                Some(token)
            }
            Err(e) => {
                log::warn!("requestAnimationFrame failed: {:?}", e);
                None
            }
        }
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if let Some(i) = self.frames.iter().position(|&(t, _)| t == token) {
            let (_, id) = self.frames.swap_remove(i);
            let _ = self.window.cancel_animation_frame(id);
        }
    }

    fn set_timeout(&mut self, delay: Duration) -> Option<TimerToken> {
        let token = TimerToken(self.next_id());
        let engine = self.engine.clone();
        let callback = Closure::once_into_js(move || {
            with_engine(&engine, |e| {
                e.host_mut().timers.retain(|&(t, _)| t != token);
                e.on_timer(token);
            });
        });
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay.as_millis() as i32)
        {
            Ok(id) => {
                self.timers.push((token, id));
                Some(token)
            }
            Err(e) => {
                log::warn!("setTimeout failed: {:?}", e);
                None
            }
        }
    }

    fn clear_timeout(&mut self, token: TimerToken) {
        if let Some(i) = self.timers.iter().position(|&(t, _)| t == token) {
            let (_, id) = self.timers.swap_remove(i);
            self.window.clear_timeout_with_handle(id);
        }
    }

    fn observe_resize(&mut self) -> bool {
        if self.observer.is_some() {
            return true;
        }
        let engine = self.engine.clone();
        let window = self.window.clone();
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            // Only the latest geometry in a batch matters
            let Some(last) = entries.length().checked_sub(1) else {
                return;
            };
            let Ok(entry) = entries.get(last).dyn_into::<ResizeObserverEntry>() else {
                return;
            };
            let rect = entry.content_rect();
            let info = SurfaceInfo::new(
                rect.width() as f32,
                rect.height() as f32,
                window.device_pixel_ratio() as f32,
            );
            with_engine(&engine, |e| e.on_resize(info));
        });
        match ResizeObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => {
                observer.observe(&self.container);
                self.observer = Some((observer, callback));
                true
            }
            Err(e) => {
                log::warn!("ResizeObserver unavailable: {:?}", e);
                false
            }
        }
    }

    fn unobserve_resize(&mut self) {
        if let Some((observer, _callback)) = self.observer.take() {
            observer.disconnect();
        }
    }
}

/// Set up WebGPU on the canvas element. `None` means the engine stays idle.
async fn create_canvas(element: &HtmlCanvasElement, info: &SurfaceInfo) -> Option<WebCanvas> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU,
        ..Default::default()
    });

    let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(element.clone())) {
        Ok(surface) => surface,
        Err(e) => {
            log::info!("No drawing surface ({}); halo disabled", e);
            return None;
        }
    };

    let adapter = match instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
    {
        Ok(adapter) => adapter,
        Err(e) => {
            log::info!("No GPU adapter ({}); halo disabled", e);
            return None;
        }
    };
    log::info!("Using adapter: {:?}", adapter.get_info().name);

    let backing = Surface::from_info(info)
        .map(|s| s.backing_size())
        .unwrap_or(UVec2::ONE);
    match SdfCanvas::new(surface, &adapter, backing.x, backing.y).await {
        Ok(gpu) => Some(WebCanvas {
            element: element.clone(),
            gpu,
        }),
        Err(e) => {
            log::info!("GPU canvas unavailable ({}); halo disabled", e);
            None
        }
    }
}

/// Mount on the canvas with `canvas_id`, observing its parent as the
/// container. Replaces (and disposes) any previously mounted engine.
pub async fn mount(canvas_id: &str) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let Some(element) = window
        .document()
        .and_then(|d| d.get_element_by_id(canvas_id))
    else {
        log::debug!("#{} not found; nothing to mount", canvas_id);
        return false;
    };
    let Ok(canvas) = element.dyn_into::<HtmlCanvasElement>() else {
        log::debug!("#{} is not a canvas", canvas_id);
        return false;
    };
    let container: Element = canvas
        .parent_element()
        .unwrap_or_else(|| canvas.clone().into());

    let settings = Settings::load();
    let info = SurfaceInfo::new(
        container.client_width() as f32,
        container.client_height() as f32,
        window.device_pixel_ratio() as f32,
    )
    .with_max_device_scale(settings.max_device_scale());

    let gpu = create_canvas(&canvas, &info).await;
    let seed = js_sys::Date::now() as u64;

    let engine = Rc::new_cyclic(|weak| {
        let host = WebHost::new(window.clone(), container.clone(), weak.clone());
        RefCell::new(Engine::new(host, gpu, settings, seed))
    });
    let running = {
        let mut e = engine.borrow_mut();
        e.initialize(info);
        e.start()
    };

    let previous = MOUNTED.with(|m| m.borrow_mut().replace(engine));
    if let Some(previous) = previous {
        if let Ok(mut e) = previous.try_borrow_mut() {
            e.dispose();
        }
    }
    running
}

/// Dispose the mounted engine, if any
pub fn unmount() {
    let mounted = MOUNTED.with(|m| m.borrow_mut().take());
    if let Some(engine) = mounted {
        if let Ok(mut e) = engine.try_borrow_mut() {
            e.dispose();
        }
    }
}
