//! wrapspin web: drives the chocolate-bar demo inside a browser page.
//!
//! The page provides a root element containing parts tagged with
//! `data-wrapspin`: `container`, `scene`, `wrapper-left`, `wrapper-right`,
//! `sheen` and `overlay`. The controller's frames are formatted by
//! [`CssSurface`] and written to those nodes' inline styles.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, PointerEvent, ResizeObserver, ResizeObserverEntry};
use wrapspin_core::{
    Controller, ControllerConfig, CssSurface, FrameDriver, FrameParams, RenderSurface,
};

type SharedDriver = Rc<RefCell<FrameDriver<DomSurface>>>;
type FrameCallback = Closure<dyn FnMut(f64)>;
type PointerCallback = Closure<dyn FnMut(PointerEvent)>;

fn part(root: &HtmlElement, name: &str) -> Option<HtmlElement> {
    root.query_selector(&format!("[data-wrapspin=\"{name}\"]"))
        .ok()
        .flatten()?
        .dyn_into::<HtmlElement>()
        .ok()
}

fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(err) = element.style().set_property(property, value) {
        log::warn!("failed to set {property}: {err:?}");
    }
}

fn now_secs() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now() / 1000.0)
        .unwrap_or(0.0)
}

struct DemoElements {
    container: HtmlElement,
    scene: HtmlElement,
    left_wrapper: HtmlElement,
    right_wrapper: HtmlElement,
    sheen: HtmlElement,
    overlay: HtmlElement,
}

impl DemoElements {
    fn find(root: &HtmlElement) -> Option<Self> {
        Some(Self {
            container: part(root, "container")?,
            scene: part(root, "scene")?,
            left_wrapper: part(root, "wrapper-left")?,
            right_wrapper: part(root, "wrapper-right")?,
            sheen: part(root, "sheen")?,
            overlay: part(root, "overlay")?,
        })
    }
}

/// Writes CSS frames onto the DOM nodes.
struct DomSurface {
    css: CssSurface,
    scene: HtmlElement,
    left_wrapper: HtmlElement,
    right_wrapper: HtmlElement,
    sheen: HtmlElement,
}

impl RenderSurface for DomSurface {
    fn apply_frame(&mut self, params: &FrameParams) {
        self.css.apply_frame(params);
        let frame = self.css.frame();
        set_style(&self.scene, "transform", &frame.scene_transform);
        set_style(&self.left_wrapper, "transform", &frame.left_wrapper_transform);
        set_style(&self.right_wrapper, "transform", &frame.right_wrapper_transform);
        set_style(&self.sheen, "opacity", &frame.sheen_opacity);
    }
}

/// Tracks pointer handlers on the stack so teardown started from inside
/// `on_interaction` can finish once the handler unwinds.
#[derive(Debug, Default)]
struct Dispatch {
    depth: Cell<u32>,
    stop_pending: Cell<bool>,
}

impl Dispatch {
    fn enter(&self) {
        self.depth.set(self.depth.get() + 1);
    }

    /// Leave a handler. Returns `true` when a deferred stop is now due.
    fn leave(&self) -> bool {
        let depth = self.depth.get().saturating_sub(1);
        self.depth.set(depth);
        depth == 0 && self.stop_pending.replace(false)
    }

    fn is_dispatching(&self) -> bool {
        self.depth.get() > 0
    }

    fn defer_stop(&self) {
        self.stop_pending.set(true);
    }
}

/// Self-rescheduling `requestAnimationFrame` loop.
struct FrameLoop {
    callback: Rc<RefCell<Option<FrameCallback>>>,
    handle: Rc<Cell<Option<i32>>>,
}

fn request_frame(callback: &FrameCallback) -> Option<i32> {
    web_sys::window()?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .ok()
}

impl FrameLoop {
    fn start(driver: SharedDriver) -> Self {
        let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
        let handle = Rc::new(Cell::new(None));

        let next = Rc::clone(&callback);
        let pending = Rc::clone(&handle);
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |ts_ms: f64| {
            pending.set(None);
            let running = match driver.try_borrow_mut() {
                Ok(mut driver) => driver.tick(ts_ms / 1000.0).is_some(),
                // Busy in an event handler; try again next frame
                Err(_) => true,
            };
            if !running {
                return;
            }
            if let Some(callback) = next.borrow().as_ref() {
                pending.set(request_frame(callback));
            }
        }) as Box<dyn FnMut(f64)>));

        if let Some(callback) = callback.borrow().as_ref() {
            handle.set(request_frame(callback));
        }

        Self { callback, handle }
    }

    fn cancel(self) {
        if let (Some(id), Some(window)) = (self.handle.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        // Breaks the closure's reference to itself
        drop(self.callback.borrow_mut().take());
    }
}

/// A mounted demo widget. Dropping it (or calling `destroy`) tears it down.
#[wasm_bindgen]
pub struct ChocolateDemo {
    driver: Option<SharedDriver>,
    overlay: Option<HtmlElement>,
    frame_loop: Option<FrameLoop>,
    resize_observer: Option<(ResizeObserver, Closure<dyn FnMut(js_sys::Array)>)>,
    listeners: Vec<(&'static str, PointerCallback)>,
    // Removed from the DOM but possibly still running
    retired: Vec<PointerCallback>,
    dispatch: Rc<Dispatch>,
    torn_down: bool,
}

#[wasm_bindgen]
impl ChocolateDemo {
    /// Mount the demo under `root`.
    ///
    /// `on_interaction` is called with `true` when a drag starts and `false`
    /// when it ends. `config_toml` optionally overrides controller tuning.
    /// When a required part is missing the demo stays inert instead of failing.
    #[wasm_bindgen(constructor)]
    pub fn new(
        root: HtmlElement,
        unwrapped: bool,
        on_interaction: Option<js_sys::Function>,
        config_toml: Option<String>,
    ) -> Result<ChocolateDemo, JsValue> {
        let config = match config_toml {
            Some(text) => ControllerConfig::from_toml_str(&text)
                .map_err(|err| JsValue::from_str(&err.to_string()))?,
            None => ControllerConfig::default(),
        };

        let mut demo = ChocolateDemo {
            driver: None,
            overlay: None,
            frame_loop: None,
            resize_observer: None,
            listeners: Vec::new(),
            retired: Vec::new(),
            dispatch: Rc::new(Dispatch::default()),
            torn_down: false,
        };

        let Some(elements) = DemoElements::find(&root) else {
            log::warn!("wrapspin: demo parts missing, animation disabled");
            return Ok(demo);
        };

        let mut controller = Controller::new(config, unwrapped, now_secs());
        let rect = elements.container.get_bounding_client_rect();
        controller.set_viewport(rect.width(), rect.height());
        if let Some(callback) = on_interaction {
            controller.set_interaction_listener(move |active| {
                if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_bool(active)) {
                    log::warn!("interaction callback failed: {err:?}");
                }
            });
        }

        let surface = DomSurface {
            css: CssSurface::new(),
            scene: elements.scene,
            left_wrapper: elements.left_wrapper,
            right_wrapper: elements.right_wrapper,
            sheen: elements.sheen,
        };
        let driver: SharedDriver = Rc::new(RefCell::new(FrameDriver::new(controller, surface)));

        set_style(&elements.overlay, "cursor", "grab");
        demo.overlay = Some(elements.overlay.clone());
        demo.attach_pointer_listeners(&elements.overlay, &driver)?;
        demo.resize_observer = Some(observe_resize(&elements.container, &driver)?);
        demo.frame_loop = Some(FrameLoop::start(Rc::clone(&driver)));
        demo.driver = Some(driver);
        log::info!("wrapspin: demo mounted");
        Ok(demo)
    }

    /// Redirect the unwrap animation.
    pub fn set_unwrapped(&self, unwrapped: bool) {
        if let Some(mut driver) = self.driver.as_ref().and_then(|d| d.try_borrow_mut().ok()) {
            driver.controller_mut().set_unwrapped(unwrapped);
        }
    }

    /// Whether the frame loop is running.
    pub fn is_active(&self) -> bool {
        self.driver
            .as_ref()
            .and_then(|d| d.try_borrow().ok().map(|d| d.is_running()))
            .unwrap_or(false)
    }

    /// Stop the frame loop and release listeners, observer and timer.
    /// Safe to call repeatedly. Called from inside `on_interaction`, the
    /// controller stops as soon as the current pointer event finishes.
    pub fn destroy(&mut self) {
        self.teardown();
    }
}

impl ChocolateDemo {
    fn attach_pointer_listeners(
        &mut self,
        overlay: &HtmlElement,
        driver: &SharedDriver,
    ) -> Result<(), JsValue> {
        let handlers: [(&'static str, fn(&mut Controller, &PointerEvent) -> Option<&'static str>); 5] = [
            ("pointerdown", |c, e| {
                c.pointer_down(e.client_x() as f64);
                Some("grabbing")
            }),
            ("pointermove", |c, e| {
                c.pointer_move(e.client_x() as f64);
                None
            }),
            ("pointerup", |c, _| {
                c.pointer_up();
                Some("grab")
            }),
            ("pointerleave", |c, _| {
                c.pointer_leave();
                Some("grab")
            }),
            ("pointercancel", |c, _| {
                c.pointer_cancel();
                Some("grab")
            }),
        ];

        for (event, handler) in handlers {
            let driver = Rc::clone(driver);
            let dispatch = Rc::clone(&self.dispatch);
            let target = overlay.clone();
            let callback: PointerCallback = Closure::wrap(Box::new(move |e: PointerEvent| {
                dispatch.enter();
                let cursor = driver
                    .try_borrow_mut()
                    .ok()
                    .map(|mut driver| handler(driver.controller_mut(), &e));
                if dispatch.leave() {
                    if let Ok(mut driver) = driver.try_borrow_mut() {
                        driver.stop();
                    }
                    return;
                }
                let Some(cursor) = cursor else {
                    return;
                };
                if let Some(cursor) = cursor {
                    set_style(&target, "cursor", cursor);
                }
                match event {
                    "pointerdown" => {
                        let _ = target.set_pointer_capture(e.pointer_id());
                    }
                    // Capture may not have been taken; failures are cosmetic
                    "pointerup" => {
                        let _ = target.release_pointer_capture(e.pointer_id());
                    }
                    _ => {}
                }
            }) as Box<dyn FnMut(PointerEvent)>);
            overlay.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
            self.listeners.push((event, callback));
        }
        Ok(())
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        if let Some(frame_loop) = self.frame_loop.take() {
            frame_loop.cancel();
        }
        if let Some((observer, _callback)) = self.resize_observer.take() {
            observer.disconnect();
        }
        if let Some(overlay) = self.overlay.take() {
            for (event, callback) in self.listeners.drain(..) {
                let _ = overlay
                    .remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
                self.retired.push(callback);
            }
        }
        if let Some(driver) = self.driver.as_ref() {
            match driver.try_borrow_mut() {
                Ok(mut driver) => {
                    driver.stop();
                }
                Err(_) => self.dispatch.defer_stop(),
            }
        }
        if !self.dispatch.is_dispatching() {
            self.retired.clear();
        }
        log::info!("wrapspin: demo destroyed");
    }
}

impl Drop for ChocolateDemo {
    fn drop(&mut self) {
        self.teardown();
        if self.dispatch.is_dispatching() {
            // Freed from inside a handler; its closure must outlive this call
            for callback in self.retired.drain(..) {
                callback.forget();
            }
        }
    }
}

/// Keep the scale fitted to the container. Only the scale is touched.
fn observe_resize(
    container: &HtmlElement,
    driver: &SharedDriver,
) -> Result<(ResizeObserver, Closure<dyn FnMut(js_sys::Array)>), JsValue> {
    let driver = Rc::clone(driver);
    let callback = Closure::wrap(Box::new(move |entries: js_sys::Array| {
        let Ok(entry) = entries.get(0).dyn_into::<ResizeObserverEntry>() else {
            return;
        };
        let rect = entry.content_rect();
        if let Ok(mut driver) = driver.try_borrow_mut() {
            driver.controller_mut().set_viewport(rect.width(), rect.height());
        }
    }) as Box<dyn FnMut(js_sys::Array)>);
    let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
    observer.observe(container);
    Ok((observer, callback))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    Ok(())
}
