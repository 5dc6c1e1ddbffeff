use thiserror::Error;

use crate::config::ConfigError;
use crate::emulator::EmulatorError;
use crate::route_loader::RouteError;
use crate::simulator::SimulationError;

/// Top-level error for a walker run.
#[derive(Error, Debug)]
pub enum WalkerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Route error: {0}")]
    Route(#[from] RouteError),

    #[error("Emulator error: {0}")]
    Emulator(#[from] EmulatorError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    #[error("Interrupted by user")]
    Interrupted,
}

impl WalkerError {
    /// Input problems are rejected before any device interaction starts.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            WalkerError::Config(_) | WalkerError::Route(_) | WalkerError::Simulation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let route: WalkerError = RouteError::Empty.into();
        assert!(route.is_input_error());
        assert_eq!(route.to_string(), "Route error: Route has no points");

        assert!(!WalkerError::Interrupted.is_input_error());
        let emulator: WalkerError = EmulatorError::MissingAdbInfo.into();
        assert!(!emulator.is_input_error());
    }
}
