/*!
# Argus Simulator

Synthetic traffic and deterministic replay for the burst monitor.

## Key Components:
- **Demo Generator:** Seeded synthetic `ChainEvent`s (random wallets, `Transfer` topic, hex payloads).
- **Burst Demo:** Plans enough closely spaced events to walk the monitor into `Triggered`.
- **Scenarios:** YAML files with a monitoring config and timed steps.
- **Replay Engine:** Runs a scenario on a manual clock and hashes every transition,
  alert and incident with BLAKE3 so runs can be compared.
*/

pub mod burst;
pub mod error;
pub mod generator;
pub mod runner;
pub mod scenario;

pub use burst::BurstDemo;
pub use error::SimulationError;
pub use generator::{DemoGenerator, TRANSFER_TOPIC};
pub use runner::{validate_hash, ScenarioReport, ScenarioRunner};
pub use scenario::{Scenario, ScenarioStep, StepAction};
