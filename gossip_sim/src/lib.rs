//! Gossip Deterministic Simulation Harness
//!
//! This crate runs the `gossip_core` engine inside a controlled environment
//! where every run is reproducible from a single 64-bit seed.
//!
//! # Core Principle
//!
//! All sources of non-determinism are intercepted and controlled:
//! - **Randomness**: peer selection draws from a ChaCha8 RNG seeded per run
//! - **Time**: message timestamps come from a virtual clock advanced per round
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                     SimWorld                      │
//! │  ┌──────────────┐        ┌─────────────────────┐  │
//! │  │  SimContext  │───────►│   GossipProtocol    │  │
//! │  │ (RNG + clock)│        │ node-0 ... node-n-1 │  │
//! │  └──────────────┘        └─────────────────────┘  │
//! └──────────────────────────────────────────────────┘
//!            ▲                          │
//!     ScenarioRunner ◄──── frames ──────┘──► SimExport (JSON)
//! ```
//!
//! # Usage
//!
//! ```
//! use gossip_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let runner = ScenarioRunner::new(42, 10);
//! let result = runner.run(ScenarioId::Convergence);
//! assert!(result.passed);
//! ```

mod context;
mod error;
mod exporter;
mod runner;
mod world;
pub mod scenarios;

pub use context::SimContext;
pub use error::SimError;
pub use exporter::{NodeFrame, SimExport, SimFrame};
pub use runner::{Rating, ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use world::{SimConfig, SimWorld};
