//! # Courier
//!
//! Courier is an episodic task engine for training reinforcement learning
//! policies on find-and-deliver problems. A single agent perceives the floor
//! around it through a fan of distance rays, moves with discrete actions, and
//! is rewarded for collecting a demanded item and carrying it into a goal
//! zone.
//!
//! ## Project Architecture
//!
//! -   **`courier`:** The crate you are currently viewing. It is the entry
//!     point for the documentation and hosts the `courier` command-line
//!     runner.
//! -   **[`sim`]:** The engine itself. World state, perception, motion,
//!     rewards and the episode state machine. It performs no geometry; ray
//!     casts and collision response go through collaborator traits.
//! -   **[`arena`]:** A kinematic reference collaborator: a disc-shaped agent
//!     in a walled square with disc-shaped items and goal.
//!
//! ## Task Variants
//!
//! Every variant is one [`sim::EngineConfig`]. The named presets cover the
//! warehouse task with pre-held starts, the find-only task, strict
//! find-and-deliver, and explicit pickup/drop manipulation. Configs are plain
//! JSON, so new variants need no code.
//!
//! ## Getting Started
//!
//! ```text
//! courier print-config --preset deliver > deliver.json
//! courier run --config deliver.json --episodes 20 --seed 7
//! ```

pub mod app;

pub use arena;
pub use sim;
