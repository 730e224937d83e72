//! Random sources threaded through combat rolls, encounter checks and map
//! generation. Nothing in the simulation reaches for a global generator.

use bevy::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::VecDeque;
use std::ops::RangeInclusive;

use crate::settings::SimulationParams;

pub trait RandomSource {
    /// Uniform integer in the inclusive range.
    fn roll(&mut self, range: RangeInclusive<u32>) -> u32;

    /// Uniform value in `[0, 1)`.
    fn chance(&mut self) -> f32;

    /// Uniform float in the inclusive range.
    fn uniform(&mut self, range: RangeInclusive<f32>) -> f32 {
        let (low, high) = range.into_inner();
        low + (high - low) * self.chance()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn roll(&mut self, range: RangeInclusive<u32>) -> u32 {
        (**self).roll(range)
    }

    fn chance(&mut self) -> f32 {
        (**self).chance()
    }

    fn uniform(&mut self, range: RangeInclusive<f32>) -> f32 {
        (**self).uniform(range)
    }
}

#[derive(Resource, Debug)]
pub struct SimulationRng {
    seed: u64,
    rng: StdRng,
}

impl SimulationRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn gen_range(&mut self, range: RangeInclusive<u32>) -> u32 {
        self.rng.gen_range(range)
    }

    pub fn gen_f32(&mut self, range: RangeInclusive<f32>) -> f32 {
        self.rng.gen_range(range)
    }
}

impl RandomSource for SimulationRng {
    fn roll(&mut self, range: RangeInclusive<u32>) -> u32 {
        self.gen_range(range)
    }

    fn chance(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    fn uniform(&mut self, range: RangeInclusive<f32>) -> f32 {
        self.gen_f32(range)
    }
}

impl FromWorld for SimulationRng {
    fn from_world(world: &mut World) -> Self {
        let seed = world
            .get_resource::<SimulationParams>()
            .cloned()
            .unwrap_or_default()
            .seed;
        Self::new(seed)
    }
}

/// Replays queued values in order. Once a queue runs dry, rolls fall back to
/// the low end of the requested range and chances to `fallback_chance`.
///
/// Queued rolls are clamped into the requested range so a script can never
/// produce an out-of-balance value.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    rolls: VecDeque<u32>,
    chances: VecDeque<f32>,
    fallback_chance: f32,
}

impl ScriptedRng {
    pub fn new() -> Self {
        Self {
            rolls: VecDeque::new(),
            chances: VecDeque::new(),
            fallback_chance: 0.999,
        }
    }

    pub fn with_rolls(mut self, rolls: impl IntoIterator<Item = u32>) -> Self {
        self.rolls.extend(rolls);
        self
    }

    pub fn with_chances(mut self, chances: impl IntoIterator<Item = f32>) -> Self {
        self.chances.extend(chances);
        self
    }

    /// Every unscripted chance returns `value`.
    pub fn always(mut self, value: f32) -> Self {
        self.fallback_chance = value;
        self
    }

    pub fn remaining_rolls(&self) -> usize {
        self.rolls.len()
    }
}

impl Default for ScriptedRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for ScriptedRng {
    fn roll(&mut self, range: RangeInclusive<u32>) -> u32 {
        let (low, high) = range.into_inner();
        self.rolls
            .pop_front()
            .map(|value| value.clamp(low, high))
            .unwrap_or(low)
    }

    fn chance(&mut self) -> f32 {
        self.chances.pop_front().unwrap_or(self.fallback_chance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_rolls_repeat() {
        let mut a = SimulationRng::new(9);
        let mut b = SimulationRng::new(9);
        let first: Vec<u32> = (0..8).map(|_| a.roll(15..=20)).collect();
        let second: Vec<u32> = (0..8).map(|_| b.roll(15..=20)).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|v| (15..=20).contains(v)));
    }

    #[test]
    fn chance_stays_below_one() {
        let mut rng = SimulationRng::new(3);
        for _ in 0..1000 {
            let value = rng.chance();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn scripted_rolls_clamp_and_fall_back() {
        let mut rng = ScriptedRng::new().with_rolls([30, 2]);
        assert_eq!(rng.roll(15..=20), 20);
        assert_eq!(rng.roll(5..=10), 5);
        assert_eq!(rng.roll(5..=12), 5);
        assert_eq!(rng.remaining_rolls(), 0);
    }

    #[test]
    fn scripted_chances_then_fallback() {
        let mut rng = ScriptedRng::new().with_chances([0.25]).always(0.0);
        assert_eq!(rng.chance(), 0.25);
        assert_eq!(rng.chance(), 0.0);
    }
}
