//! Headless duel runner for AI balance testing and CI verification.
//!
//! Loads fighter, arena and duel configuration from RON (or built-in
//! presets), runs seeded duels without any rendering, and reports JSON
//! metrics. This enables:
//!
//! - **Balance testing**: win rates over thousands of seeds per matchup
//! - **CI verification**: duels finish and replay identically from a seed
//!
//! # Output
//!
//! - **stdout**: JSON (one metrics object, or one event per line)
//! - **stderr**: logs (human-readable)
//!
//! # Example
//!
//! ```bash
//! # One duel between two presets
//! cargo run -p duel_headless -- run --red warrior --blue mage --seed 7
//!
//! # A custom fighter from a RON file, with every event
//! cargo run -p duel_headless -- run --red fighters/ayla.ron --blue paladin --events
//!
//! # 1000 seeds on 8 threads
//! cargo run -p duel_headless -- batch --red assassin --blue colossus --count 1000 --parallel 8
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod error;
pub mod metrics;
pub mod presets;
pub mod runner;

pub use batch::{run_batch, BatchConfig, BatchResults};
pub use error::{HeadlessError, Result};
pub use metrics::{BatchSummary, DuelMetrics, EndReason, FighterMetrics, Side};
pub use runner::{load_fighter, run_duel, RunConfig};
