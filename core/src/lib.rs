//! Client core for the 아주한끼 restaurant map.
//!
//! The map page is a small state machine: raw viewport events are debounced,
//! settled viewports become sequence-tagged fetches, and only the newest
//! response may replace the visible list. Everything is sans-IO except the
//! [`api`] client and the optional [`map::runtime`] driver.

pub mod api;
pub mod map;
pub mod model;
pub mod prelude;
pub mod present;
pub mod session;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_support;

pub use map::{HomeController, HomeSettings, HomeSnapshot};
pub use prelude::{LocationProvider, RestaurantSource};
