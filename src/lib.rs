//! Discovery core for an interactive 3D portfolio scene.
//!
//! Visitors orbit a baked model and click hidden "target" objects. This
//! crate classifies those targets in the loaded scene graph, tracks which
//! ones have been found, and drives the progress toasts and the completion
//! celebration. Rendering, camera control and overlay styling belong to the
//! host; the crate only talks to it through the [`Host`] trait so the whole
//! flow runs headless in tests and in the CLI.

pub mod app;
pub mod category;
pub mod config;
pub mod error;
pub mod graph;
pub mod presentation;
pub mod registry;
pub mod scene;
pub mod script;
pub mod session;
pub mod timer;
pub mod tracker;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::HeadlessHost;
pub use category::{TargetCategory, TOTAL_CATEGORY_COUNT};
pub use config::SessionConfig;
pub use error::{ScriptError, TransitionError};
pub use graph::SceneGraph;
pub use presentation::{Controls, CursorStyle, PresentationState, Signal};
pub use registry::{classify, Classification, ProxyEntry, TargetNode, TargetRegistry};
pub use scene::{NodeId, Scene, SceneNode};
pub use script::{parse_script, Command};
pub use session::{Host, Session};
pub use timer::{ManualClock, ScheduledTimer, TimerHandles, TimerKind};
pub use tracker::{DiscoverySet, DiscoveryTracker, Effect, Event, SessionState};
