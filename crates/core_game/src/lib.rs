//! Core of a small 2D narrative game: an opening cutscene, a scrolling
//! exploration map with random encounters, branching dialogue and a
//! tick-driven turn-based combat engine.
//!
//! Every screen is plain Rust driven through `handle_input`, `update` and
//! `draw`; the Bevy plugins below only feed it keyboard input, tick it on the
//! fixed timestep and present what it draws.

pub mod camera;
pub mod combat;
pub mod combatant;
pub mod cutscene;
pub mod diagnostics;
pub mod dialogue;
pub mod encounter;
pub mod exploration;
pub mod flow;
pub mod fx;
pub mod gameplay;
pub mod input;
pub mod movement;
pub mod render;
pub mod rng;
pub mod settings;
pub mod ui;

use bevy::prelude::*;

pub use combat::{CombatEngine, CombatSignal, CombatState};
pub use flow::{FlowSignal, GameFlow, Screen};
pub use gameplay::{ActiveGame, GameplayPlugin};
pub use rng::{RandomSource, ScriptedRng, SimulationRng};
pub use settings::{SimulationParams, WorldSettings};

/// Simulation only. Add `ui::UiPlugin` on top of it to get a picture.
pub struct CoreGamePlugin;

impl Plugin for CoreGamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(GameplayPlugin);
    }
}
