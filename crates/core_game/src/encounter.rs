//! Random encounters while walking through the danger zone.

use tracing::info;

use crate::rng::RandomSource;

pub const DANGER_ZONE_X: f32 = 600.0;
pub const ENCOUNTER_CHANCE: f32 = 0.005;
pub const ENCOUNTER_COOLDOWN_TICKS: u32 = 300;
pub const WILD_ENEMY: &str = "Corrupted Wolf";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncounterState {
    pub cooldown: u32,
    pub pending: bool,
    pub enemy_type: Option<String>,
}

impl EncounterState {
    /// One tick of the trigger. Inside the danger zone an active cooldown
    /// counts down (moving or not) and skips the roll; otherwise a moving
    /// player rolls against [`ENCOUNTER_CHANCE`]. Returns true on the tick an
    /// encounter becomes pending.
    pub fn tick(&mut self, player_x: f32, moving: bool, rng: &mut impl RandomSource) -> bool {
        if player_x <= DANGER_ZONE_X {
            return false;
        }
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return false;
        }
        if !moving || rng.chance() >= ENCOUNTER_CHANCE {
            return false;
        }

        self.pending = true;
        self.enemy_type = Some(WILD_ENEMY.to_owned());
        self.cooldown = ENCOUNTER_COOLDOWN_TICKS;
        info!(target: "core_game.encounter", player_x, enemy = WILD_ENEMY, "encounter triggered");
        true
    }

    /// Hands the pending encounter to the caller and clears it.
    pub fn take_pending(&mut self) -> Option<String> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        Some(
            self.enemy_type
                .take()
                .unwrap_or_else(|| WILD_ENEMY.to_owned()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;

    #[test]
    fn forced_roll_triggers_then_cools_down() {
        let mut rng = ScriptedRng::new().always(0.0);
        let mut state = EncounterState::default();

        assert!(state.tick(601.0, true, &mut rng));
        assert!(state.pending);
        assert_eq!(state.cooldown, ENCOUNTER_COOLDOWN_TICKS);
        assert_eq!(state.enemy_type.as_deref(), Some(WILD_ENEMY));

        assert_eq!(state.take_pending().as_deref(), Some(WILD_ENEMY));
        assert!(!state.tick(601.0, true, &mut rng));
        assert_eq!(state.cooldown, 299);
        assert!(!state.pending);
    }

    #[test]
    fn safe_zone_never_rolls() {
        let mut rng = ScriptedRng::new().always(0.0);
        let mut state = EncounterState::default();
        assert!(!state.tick(600.0, true, &mut rng));
        assert!(!state.pending);
    }

    #[test]
    fn standing_still_only_counts_down() {
        let mut rng = ScriptedRng::new().always(0.0);
        let mut state = EncounterState {
            cooldown: 2,
            ..Default::default()
        };
        assert!(!state.tick(900.0, false, &mut rng));
        assert!(!state.tick(900.0, false, &mut rng));
        assert_eq!(state.cooldown, 0);
        assert!(!state.tick(900.0, false, &mut rng));
        assert!(state.tick(900.0, true, &mut rng));
    }

    #[test]
    fn unlucky_roll_stays_quiet() {
        let mut rng = ScriptedRng::new().with_chances([0.005, 0.5]);
        let mut state = EncounterState::default();
        assert!(!state.tick(700.0, true, &mut rng));
        assert!(!state.tick(700.0, true, &mut rng));
        assert_eq!(state.take_pending(), None);
    }
}
