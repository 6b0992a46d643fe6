use log::{debug, info};

use crate::category::category_for_node;
use crate::config::SessionConfig;
use crate::graph::SceneGraph;
use crate::presentation::{Controls, CursorStyle, PresentationState};
use crate::registry::{classify, TargetRegistry};
use crate::scene::{NodeId, Scene};
use crate::timer::ScheduledTimer;
use crate::tracker::{DiscoveryTracker, Effect, Event, SessionState};

/// Environment a session runs in: timers, navigation, cursor, audio and the
/// overlay renderer.
pub trait Host {
    fn open_external(&mut self, url: &str);
    fn schedule(&mut self, timer: ScheduledTimer, delay_ms: u64);
    fn cancel(&mut self, timer: ScheduledTimer);
    fn set_cursor(&mut self, cursor: CursorStyle);
    fn set_audio_playing(&mut self, playing: bool);
    /// Called with the latest snapshot after every handled input.
    fn render(&mut self, state: &PresentationState);
}

/// Wires the scene graph, target registry and discovery tracker to a host.
pub struct Session<H: Host> {
    config: SessionConfig,
    graph: SceneGraph,
    registry: TargetRegistry,
    tracker: DiscoveryTracker,
    presentation: PresentationState,
    host: H,
}

impl<H: Host> Session<H> {
    pub fn new(scene: &Scene, config: SessionConfig, host: H) -> Self {
        let graph = SceneGraph::from_nodes(scene.nodes.clone());
        let registry = TargetRegistry::new(config.hover_scale);
        let tracker = DiscoveryTracker::new(&config);
        let presentation =
            PresentationState::new(Controls::new(config.start_muted, config.show_intro));
        let mut session = Self {
            config,
            graph,
            registry,
            tracker,
            presentation,
            host,
        };
        session.register_scene(scene);
        session.host.render(&session.presentation);
        session
    }

    /// Classifies `scene` and registers any targets not seen before.
    pub fn register_scene(&mut self, scene: &Scene) -> usize {
        let classification = classify(scene, &self.config.marker);
        let added = self.registry.apply(&classification, &self.graph);
        info!(
            "registered {added} new target(s), {} total",
            self.registry.len()
        );
        added
    }

    pub fn on_pointer_over(&mut self, id: &NodeId, name: &str) {
        if let Some(cursor) = self.registry.pointer_over(id, name) {
            self.set_cursor(cursor);
        }
    }

    pub fn on_pointer_out(&mut self, id: &NodeId) {
        if let Some(cursor) = self.registry.pointer_out(id) {
            self.set_cursor(cursor);
        }
    }

    /// Routes a click on a scene object through the click table. Unknown
    /// names are ignored.
    pub fn on_click(&mut self, name: &str) -> bool {
        match category_for_node(name) {
            Some(category) => self.dispatch(Event::TargetClicked(category)),
            None => {
                debug!("click on {name:?} is not a target");
                false
            }
        }
    }

    pub fn close_modal(&mut self) -> bool {
        self.dispatch(Event::ModalClosed)
    }

    pub fn timer_fired(&mut self, timer: ScheduledTimer) -> bool {
        self.dispatch(Event::TimerFired(timer))
    }

    /// Clears discoveries and brings the intro overlay back.
    pub fn restart(&mut self) -> bool {
        let restarted = self.dispatch(Event::Restart);
        if restarted {
            self.presentation.controls.show_intro();
            self.host.render(&self.presentation);
        }
        restarted
    }

    /// Returns whether audio is now playing.
    pub fn toggle_mute(&mut self) -> bool {
        let playing = self.presentation.controls.toggle_mute();
        self.host.set_audio_playing(playing);
        self.host.render(&self.presentation);
        playing
    }

    pub fn show_menu(&mut self) {
        self.presentation.controls.show_intro();
        self.host.render(&self.presentation);
    }

    pub fn start(&mut self) {
        self.presentation.controls.dismiss_intro();
        self.host.render(&self.presentation);
    }

    /// Feeds an event to the tracker and carries out its effects. Returns
    /// `false` if the event did not apply to the current state.
    pub fn dispatch(&mut self, event: Event) -> bool {
        match self.tracker.handle(event) {
            Ok(effects) => {
                self.run_effects(effects);
                self.host.render(&self.presentation);
                true
            }
            Err(err) => {
                debug!("ignored {event:?}: {err}");
                false
            }
        }
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Present(signal) => self.presentation.apply(&signal),
                Effect::OpenExternal(url) => self.host.open_external(&url),
                Effect::Schedule { timer, delay_ms } => self.host.schedule(timer, delay_ms),
                Effect::Cancel(timer) => self.host.cancel(timer),
            }
        }
    }

    fn set_cursor(&mut self, cursor: CursorStyle) {
        self.presentation.controls.cursor = cursor;
        self.host.set_cursor(cursor);
    }

    pub fn state(&self) -> SessionState {
        self.tracker.state()
    }

    pub fn tracker(&self) -> &DiscoveryTracker {
        &self.tracker
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn presentation(&self) -> &PresentationState {
        &self.presentation
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
