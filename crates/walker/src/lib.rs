//! Route-following GPS spoofing for MuMu Android emulators.
//!
//! A route is loaded from `config.json` (inline, GPX, JSON or a `WALK_PATH`
//! list), then walked in a loop by [`simulator::PositionSimulator`], which
//! pushes one jittered position per tick to the emulator through a
//! [`simulator::LocationSink`].

pub mod clock;
pub mod config;
pub mod emulator;
pub mod errors;
pub mod geodesy;
pub mod models;
pub mod route_loader;
pub mod simulator;

pub use config::{ConfigStore, WalkerConfig};
pub use errors::WalkerError;
pub use models::{Offset, Route, Waypoint};
pub use route_loader::{LoadedRoute, RouteLoader, RouteSource};
pub use simulator::{LocationSink, PositionSimulator, SimulationConfig};
