//! Combatant stats shared by the player and the enemies they meet.

use tracing::debug;

pub const CHARGE_MAX: f32 = 100.0;

const PLAYER_MAX_HP: u32 = 100;
const WOLF_MAX_HP: u32 = 60;
const DEFAULT_ENEMY_MAX_HP: u32 = 80;
const DEFAULT_ENEMY_SPEED: f32 = 1.0;

/// Hit points that never leave `0..=max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health {
    current: u32,
    max: u32,
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn with_current(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    pub fn damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
        debug!(target: "core_game.health", current = self.current, max = self.max, "health damaged");
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
        debug!(target: "core_game.health", current = self.current, max = self.max, "health restored");
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Combatant {
    pub health: Health,
    pub charge: f32,
}

impl Combatant {
    pub fn new(max_hp: u32) -> Self {
        Self {
            health: Health::new(max_hp),
            charge: 0.0,
        }
    }

    pub fn player() -> Self {
        Self::new(PLAYER_MAX_HP)
    }

    /// Adds to the charge meter, saturating at [`CHARGE_MAX`].
    pub fn add_charge(&mut self, amount: f32) {
        self.charge = (self.charge + amount).min(CHARGE_MAX);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub name: String,
    pub stats: Combatant,
    pub speed: f32,
}

impl Enemy {
    /// Stats are looked up by name; anything unknown gets the sturdier default.
    pub fn spawn(name: &str) -> Self {
        let max_hp = match name {
            "Corrupted Wolf" => WOLF_MAX_HP,
            _ => DEFAULT_ENEMY_MAX_HP,
        };
        Self {
            name: name.to_owned(),
            stats: Combatant::new(max_hp),
            speed: DEFAULT_ENEMY_SPEED,
        }
    }
}
