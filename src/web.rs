#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use anyhow::{anyhow, Result};
use js_sys::{Function, Object, Reflect};
use log::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{window, HtmlAudioElement, Window};

use crate::category::TOTAL_CATEGORY_COUNT;
use crate::config::SessionConfig;
use crate::presentation::{CursorStyle, PresentationState, THANK_YOU_TEXT};
use crate::scene::{NodeId, Scene};
use crate::session::{Host, Session};
use crate::timer::{ScheduledTimer, TimerHandles};

type SharedSession = Rc<RefCell<Session<BrowserHost>>>;

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Discovery session bound to the page. The scene renderer forwards pointer
/// events here; overlay updates come back through `on_change`, which is
/// called while the session is borrowed and must not call back into it.
#[wasm_bindgen]
pub struct WasmScene {
    inner: SharedSession,
}

#[wasm_bindgen]
impl WasmScene {
    #[wasm_bindgen(constructor)]
    pub fn new(
        scene_xml: String,
        on_change: Function,
        audio_id: Option<String>,
        link_url: Option<String>,
    ) -> Result<WasmScene, JsValue> {
        let scene = Scene::from_xml(&scene_xml)
            .map_err(|err| JsValue::from_str(&format!("failed to parse scene XML: {err}")))?;
        let window = window().ok_or_else(|| JsValue::from_str("window not available"))?;
        let audio = audio_id
            .map(|id| find_audio(&window, &id))
            .transpose()
            .map_err(|err| JsValue::from_str(&err.to_string()))?;

        let mut config = SessionConfig::default();
        if let Some(url) = link_url {
            config.external_link_url = url;
        }

        let inner = Rc::new_cyclic(|weak: &Weak<RefCell<Session<BrowserHost>>>| {
            let host = BrowserHost {
                window,
                audio,
                on_change,
                timeouts: TimerHandles::new(),
                session: weak.clone(),
            };
            RefCell::new(Session::new(&scene, config, host))
        });
        Ok(Self { inner })
    }

    pub fn pointer_over(&self, id: &str, name: &str) {
        self.inner
            .borrow_mut()
            .on_pointer_over(&NodeId::from(id), name);
    }

    pub fn pointer_out(&self, id: &str) {
        self.inner.borrow_mut().on_pointer_out(&NodeId::from(id));
    }

    pub fn click(&self, name: &str) -> bool {
        self.inner.borrow_mut().on_click(name)
    }

    pub fn close_modal(&self) -> bool {
        self.inner.borrow_mut().close_modal()
    }

    pub fn restart(&self) -> bool {
        self.inner.borrow_mut().restart()
    }

    pub fn toggle_mute(&self) -> bool {
        self.inner.borrow_mut().toggle_mute()
    }

    pub fn show_menu(&self) {
        self.inner.borrow_mut().show_menu();
    }

    pub fn start(&self) {
        self.inner.borrow_mut().start();
    }

    pub fn found(&self) -> usize {
        self.inner.borrow().tracker().found()
    }

    pub fn total(&self) -> usize {
        TOTAL_CATEGORY_COUNT
    }

    pub fn state(&self) -> String {
        self.inner.borrow().state().to_string()
    }

    /// Uniform scale the renderer should draw the proxy of `id` at.
    pub fn proxy_scale(&self, id: &str) -> f32 {
        self.inner
            .borrow()
            .registry()
            .proxy(&NodeId::from(id))
            .map_or(1.0, |proxy| proxy.scale.x)
    }

    /// Ids of the nodes replaced by proxies; the renderer hides these.
    pub fn target_ids(&self) -> js_sys::Array {
        self.inner
            .borrow()
            .registry()
            .targets()
            .map(|target| JsValue::from_str(target.id.as_str()))
            .collect()
    }

    /// Ids of the baked nodes still drawn by the renderer.
    pub fn visible_ids(&self) -> js_sys::Array {
        self.inner
            .borrow()
            .graph()
            .all_nodes()
            .into_iter()
            .filter(|node| node.visible)
            .map(|node| JsValue::from_str(node.id.as_str()))
            .collect()
    }
}

struct PendingTimeout {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

struct BrowserHost {
    window: Window,
    audio: Option<HtmlAudioElement>,
    on_change: Function,
    timeouts: TimerHandles<PendingTimeout>,
    session: Weak<RefCell<Session<BrowserHost>>>,
}

impl BrowserHost {
    fn try_schedule(&mut self, timer: ScheduledTimer, delay_ms: u64) -> Result<()> {
        let session = self.session.clone();
        let callback = Closure::wrap(Box::new(move || {
            let Some(session) = session.upgrade() else {
                return;
            };
            let fired = {
                let mut session = session.borrow_mut();
                let fired = session.host_mut().timeouts.take(timer);
                session.timer_fired(timer);
                fired
            };
            // The entry owns the closure running right now; free it on a later task.
            if let Some(fired) = fired {
                spawn_local(async move {
                    drop(fired);
                });
            }
        }) as Box<dyn FnMut()>);
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        let handle = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                delay,
            )
            .map_err(|err| anyhow!("setTimeout failed: {err:?}"))?;
        if let Some(previous) = self.timeouts.insert(
            timer,
            PendingTimeout {
                handle,
                _callback: callback,
            },
        ) {
            self.window.clear_timeout_with_handle(previous.handle);
        }
        Ok(())
    }

    fn try_render(&self, state: &PresentationState) -> Result<()> {
        let snapshot = Object::new();
        let set = |key: &str, value: JsValue| {
            Reflect::set(&snapshot, &JsValue::from_str(key), &value)
                .map_err(|err| anyhow!("failed to set {key}: {err:?}"))
        };
        set(
            "modal",
            state
                .modal
                .map_or(JsValue::NULL, |category| JsValue::from_str(category.as_str())),
        )?;
        set(
            "modalTitle",
            state
                .modal_content()
                .map_or(JsValue::NULL, |content| JsValue::from_str(content.title)),
        )?;
        set("progress", JsValue::from_str(&state.progress_text()))?;
        set("complete", JsValue::from_bool(state.is_complete()))?;
        set(
            "toast",
            state
                .toast
                .as_deref()
                .map_or(JsValue::NULL, JsValue::from_str),
        )?;
        set(
            "completionCue",
            state
                .completion_cue_text()
                .map_or(JsValue::NULL, |text| JsValue::from_str(&text)),
        )?;
        set(
            "thankYou",
            if state.celebration {
                JsValue::from_str(THANK_YOU_TEXT)
            } else {
                JsValue::NULL
            },
        )?;
        set("muted", JsValue::from_bool(state.controls.muted))?;
        set("introVisible", JsValue::from_bool(state.controls.intro_visible))?;
        self.on_change
            .call1(&JsValue::NULL, &snapshot)
            .map_err(|err| anyhow!("on_change callback failed: {err:?}"))?;
        Ok(())
    }

    fn try_set_cursor(&self, cursor: CursorStyle) -> Result<()> {
        let body = self
            .window
            .document()
            .and_then(|document| document.body())
            .ok_or_else(|| anyhow!("document body not available"))?;
        body.style()
            .set_property("cursor", cursor.as_css())
            .map_err(|err| anyhow!("failed to set cursor: {err:?}"))
    }
}

impl Host for BrowserHost {
    fn open_external(&mut self, url: &str) {
        if let Err(err) = self.window.open_with_url_and_target(url, "_blank") {
            warn!("failed to open {url}: {err:?}");
        }
    }

    fn schedule(&mut self, timer: ScheduledTimer, delay_ms: u64) {
        if let Err(err) = self.try_schedule(timer, delay_ms) {
            warn!("{err}");
        }
    }

    fn cancel(&mut self, timer: ScheduledTimer) {
        if let Some(pending) = self.timeouts.take(timer) {
            self.window.clear_timeout_with_handle(pending.handle);
        }
    }

    fn set_cursor(&mut self, cursor: CursorStyle) {
        if let Err(err) = self.try_set_cursor(cursor) {
            warn!("{err}");
        }
    }

    fn set_audio_playing(&mut self, playing: bool) {
        let Some(audio) = &self.audio else {
            return;
        };
        if playing {
            match audio.play() {
                // Autoplay rejections are expected until the page gets a gesture.
                Ok(promise) => spawn_local(async move {
                    let _ = JsFuture::from(promise).await;
                }),
                Err(err) => warn!("audio play failed: {err:?}"),
            }
        } else if let Err(err) = audio.pause() {
            warn!("audio pause failed: {err:?}");
        }
    }

    fn render(&mut self, state: &PresentationState) {
        if let Err(err) = self.try_render(state) {
            warn!("{err}");
        }
    }
}

fn find_audio(window: &Window, id: &str) -> Result<HtmlAudioElement> {
    window
        .document()
        .ok_or_else(|| anyhow!("document not available"))?
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("audio element {id} not found"))?
        .dyn_into::<HtmlAudioElement>()
        .map_err(|_| anyhow!("element {id} is not an audio element"))
}
