use bevy::math::Vec2;
use bevy::prelude::Resource;

const DEFAULT_SEED: u64 = 42;
const DEFAULT_FIXED_DELTA: f64 = 1.0 / 60.0;
const DEFAULT_SCREEN_SIZE: Vec2 = Vec2::new(1280.0, 720.0);
const DEFAULT_MAP_SIZE: Vec2 = Vec2::new(1600.0, 1200.0);

#[derive(Resource, Clone, Debug)]
pub struct SimulationParams {
    pub seed: u64,
    pub fixed_delta: f64,
}

impl SimulationParams {
    pub fn from_env() -> Self {
        let seed = std::env::var("SIMULATION_SEED")
            .ok()
            .and_then(|val| val.parse().ok())
            .unwrap_or(DEFAULT_SEED);
        let fixed_delta = std::env::var("SIMULATION_FIXED_DT")
            .ok()
            .and_then(|val| val.parse().ok())
            .unwrap_or(DEFAULT_FIXED_DELTA);
        Self { seed, fixed_delta }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            fixed_delta: DEFAULT_FIXED_DELTA,
        }
    }
}

/// Screen and map dimensions, in pixels. The map is the world the camera
/// scrolls over during exploration.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct WorldSettings {
    pub screen_size: Vec2,
    pub map_size: Vec2,
}

impl WorldSettings {
    pub fn from_env() -> Self {
        let read = |key: &str, fallback: f32| -> f32 {
            std::env::var(key)
                .ok()
                .and_then(|val| val.parse::<f32>().ok())
                .filter(|val| *val > 0.0)
                .unwrap_or(fallback)
        };
        Self {
            screen_size: Vec2::new(
                read("SCREEN_WIDTH", DEFAULT_SCREEN_SIZE.x),
                read("SCREEN_HEIGHT", DEFAULT_SCREEN_SIZE.y),
            ),
            map_size: Vec2::new(
                read("MAP_WIDTH", DEFAULT_MAP_SIZE.x),
                read("MAP_HEIGHT", DEFAULT_MAP_SIZE.y),
            ),
        }
    }
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            screen_size: DEFAULT_SCREEN_SIZE,
            map_size: DEFAULT_MAP_SIZE,
        }
    }
}
