pub mod controller;
pub mod debounce;
pub mod geolocation;
pub mod orchestrator;
pub mod overlay;
pub mod runtime;
pub mod viewport;

pub use controller::{HomeController, HomeSettings, HomeSnapshot, DEFAULT_CENTER};
pub use debounce::Debouncer;
pub use geolocation::{GeolocationAdapter, GeolocationError, StaticLocation};
pub use orchestrator::{ApplyOutcome, FetchOrchestrator, FetchTicket};
pub use overlay::OverlayState;
pub use runtime::{HomeCommand, HomeHandle, HomeRuntime, Notice, RuntimeOptions};
pub use viewport::{ViewportSnapshot, ViewportState};
