//! Free-roaming exploration: the player walks a scrolling forest map, bumps
//! into trees and rocks, and may stumble into random encounters.

use bevy::input::keyboard::KeyCode;
use bevy::math::{Rect, Vec2};
use bevy::utils::HashSet;
use tracing::{debug, info};

use crate::camera::WorldCamera;
use crate::encounter::EncounterState;
use crate::input::InputEvent;
use crate::movement::{inflate, overlaps, resolve_movement, translate, with_center};
use crate::render::{blit_or_placeholder, palette, with_alpha, Blit, DrawSurface, SpriteKey};
use crate::rng::RandomSource;
use crate::settings::WorldSettings;

pub const PLAYER_SPEED: f32 = 4.0;
pub const PLAYER_START: Vec2 = Vec2::new(400.0, 300.0);

const PLAYER_SPRITE_SIZE: Vec2 = Vec2::new(64.0, 64.0);
const PLAYER_HITBOX_INSET: Vec2 = Vec2::new(-20.0, -30.0);
const TREE_COUNT: usize = 30;
const ROCK_COUNT: usize = 15;
const SCATTER_MARGIN: f32 = 100.0;
const SPAWN_CLEARING: Rect = Rect {
    min: Vec2::new(300.0, 200.0),
    max: Vec2::new(500.0, 400.0),
};
const GROUND_TILE: f32 = 128.0;
const GROUND_FALLBACK: bevy::color::Color = bevy::color::Color::srgb(0.118, 0.078, 0.157);
const INTERACT_DISTANCE_SQ: f32 = 5000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Left,
    Right,
    Up,
    Down,
}

fn direction_for(key: KeyCode) -> Option<Direction> {
    match key {
        KeyCode::ArrowLeft | KeyCode::KeyA => Some(Direction::Left),
        KeyCode::ArrowRight | KeyCode::KeyD => Some(Direction::Right),
        KeyCode::ArrowUp | KeyCode::KeyW => Some(Direction::Up),
        KeyCode::ArrowDown | KeyCode::KeyS => Some(Direction::Down),
        _ => None,
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub hitbox: Rect,
    pub velocity: Vec2,
    pub steps_taken: u64,
    held: HashSet<KeyCode>,
}

impl Player {
    pub fn spawn(top_left: Vec2) -> Self {
        let sprite = Rect::from_corners(top_left, top_left + PLAYER_SPRITE_SIZE);
        Self {
            hitbox: inflate(sprite, PLAYER_HITBOX_INSET),
            velocity: Vec2::ZERO,
            steps_taken: 0,
            held: HashSet::default(),
        }
    }

    /// Drawn bounds, kept centred on the hitbox.
    pub fn sprite_bounds(&self) -> Rect {
        with_center(
            Rect::from_corners(Vec2::ZERO, PLAYER_SPRITE_SIZE),
            self.hitbox.center(),
        )
    }

    pub fn is_moving(&self) -> bool {
        self.velocity != Vec2::ZERO
    }

    fn holding(&self, direction: Direction) -> bool {
        self.held
            .iter()
            .any(|key| direction_for(*key) == Some(direction))
    }

    /// Rebuilds the velocity from the held keys. Right wins over left and
    /// down over up; diagonals keep the same speed as straight lines.
    fn steer(&mut self) {
        let mut velocity = Vec2::ZERO;
        if self.holding(Direction::Left) {
            velocity.x = -PLAYER_SPEED;
        }
        if self.holding(Direction::Right) {
            velocity.x = PLAYER_SPEED;
        }
        if self.holding(Direction::Up) {
            velocity.y = -PLAYER_SPEED;
        }
        if self.holding(Direction::Down) {
            velocity.y = PLAYER_SPEED;
        }
        if velocity != Vec2::ZERO {
            velocity = velocity.normalize() * PLAYER_SPEED;
            self.steps_taken += 1;
        }
        self.velocity = velocity;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObstacleKind {
    Tree,
    Rock,
}

impl ObstacleKind {
    fn sprite_key(self) -> SpriteKey {
        match self {
            ObstacleKind::Tree => SpriteKey::Tree,
            ObstacleKind::Rock => SpriteKey::Rock,
        }
    }
}

/// Static scenery. The hitbox is only the trunk or base of the sprite so the
/// player can walk behind the canopy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub sprite: Rect,
    pub hitbox: Rect,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, top_left: Vec2) -> Self {
        match kind {
            ObstacleKind::Tree => {
                let sprite = Rect::from_corners(top_left, top_left + Vec2::new(96.0, 128.0));
                let trunk = top_left + Vec2::new(30.0, 80.0);
                Self {
                    kind,
                    sprite,
                    hitbox: Rect::from_corners(trunk, trunk + Vec2::new(36.0, 40.0)),
                }
            }
            ObstacleKind::Rock => {
                let sprite = Rect::from_corners(top_left, top_left + Vec2::new(64.0, 64.0));
                Self {
                    kind,
                    sprite,
                    hitbox: inflate(sprite, Vec2::new(-10.0, -20.0)),
                }
            }
        }
    }
}

/// Scatters trees then rocks over the map, leaving the spawn clearing empty.
pub fn generate_obstacles(map_size: Vec2, rng: &mut impl RandomSource) -> Vec<Obstacle> {
    let max_x = (map_size.x - SCATTER_MARGIN).max(0.0) as u32;
    let max_y = (map_size.y - SCATTER_MARGIN).max(0.0) as u32;
    let mut scatter = |kind: ObstacleKind, count: usize, out: &mut Vec<Obstacle>| {
        for _ in 0..count {
            let x = rng.roll(0..=max_x) as f32;
            let y = rng.roll(0..=max_y) as f32;
            out.push(Obstacle::new(kind, Vec2::new(x, y)));
        }
    };

    let mut obstacles = Vec::with_capacity(TREE_COUNT + ROCK_COUNT);
    scatter(ObstacleKind::Tree, TREE_COUNT, &mut obstacles);
    scatter(ObstacleKind::Rock, ROCK_COUNT, &mut obstacles);
    obstacles.retain(|obstacle| !overlaps(&obstacle.sprite, &SPAWN_CLEARING));
    debug!(target: "core_game.exploration", count = obstacles.len(), "map generated");
    obstacles
}

#[derive(Clone, Debug)]
pub struct Exploration {
    map_size: Vec2,
    player: Player,
    obstacles: Vec<Obstacle>,
    camera: WorldCamera,
    encounter: EncounterState,
}

impl Exploration {
    pub fn new(settings: &WorldSettings, rng: &mut impl RandomSource) -> Self {
        let obstacles = generate_obstacles(settings.map_size, rng);
        Self::with_obstacles(settings, obstacles)
    }

    pub fn with_obstacles(settings: &WorldSettings, obstacles: Vec<Obstacle>) -> Self {
        let player = Player::spawn(PLAYER_START);
        let mut camera = WorldCamera::new(settings.map_size, settings.screen_size);
        camera.follow(player.sprite_bounds().center());
        Self {
            map_size: settings.map_size,
            player,
            obstacles,
            camera,
            encounter: EncounterState::default(),
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn camera(&self) -> &WorldCamera {
        &self.camera
    }

    pub fn encounter(&self) -> &EncounterState {
        &self.encounter
    }

    pub fn map_bounds(&self) -> Rect {
        Rect::from_corners(Vec2::ZERO, self.map_size)
    }

    /// Tracks held movement keys. Releases are honoured even while another
    /// screen is active so no key stays stuck down.
    pub fn handle_input(&mut self, event: InputEvent) {
        if direction_for(event.key()).is_none() {
            return;
        }
        match event {
            InputEvent::Pressed(key) => {
                self.player.held.insert(key);
            }
            InputEvent::Released(key) => {
                self.player.held.remove(&key);
            }
        }
    }

    pub fn place_player(&mut self, center: Vec2) {
        let offset = center - self.player.hitbox.center();
        translate(&mut self.player.hitbox, offset);
        self.camera.follow(self.player.sprite_bounds().center());
        info!(target: "core_game.exploration", x = center.x, y = center.y, "player placed");
    }

    /// Moves the player one tick and runs the encounter check. Returns true
    /// on the tick an encounter becomes pending.
    pub fn update(&mut self, rng: &mut impl RandomSource) -> bool {
        self.player.steer();
        let bounds = self.map_bounds();
        resolve_movement(
            &mut self.player.hitbox,
            self.player.velocity,
            self.obstacles.iter().map(|obstacle| &obstacle.hitbox),
            &bounds,
        );
        let sprite = self.player.sprite_bounds();
        self.camera.follow(sprite.center());
        self.encounter
            .tick(sprite.min.x, self.player.is_moving(), rng)
    }

    pub fn take_encounter(&mut self) -> Option<String> {
        self.encounter.take_pending()
    }

    pub fn near_interactable(&self) -> bool {
        let center = self.player.sprite_bounds().center();
        self.obstacles
            .iter()
            .any(|obstacle| obstacle.sprite.center().distance_squared(center) < INTERACT_DISTANCE_SQ)
    }

    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        let screen = surface.size();
        surface.fill_screen(palette::BLACK);

        let offset = self.camera.offset();
        let start = Vec2::new(
            -offset.x.rem_euclid(GROUND_TILE),
            -offset.y.rem_euclid(GROUND_TILE),
        );
        let cols = (screen.x / GROUND_TILE) as u32 + 2;
        let rows = (screen.y / GROUND_TILE) as u32 + 2;
        for row in 0..rows {
            for col in 0..cols {
                let position = start + Vec2::new(col as f32, row as f32) * GROUND_TILE;
                let tile = Blit::new(SpriteKey::ForestTile, position, Vec2::splat(GROUND_TILE));
                if surface.blit(tile).is_err() {
                    surface.fill_rect(tile.bounds(), GROUND_FALLBACK);
                }
            }
        }

        enum Layer<'a> {
            Player,
            Scenery(&'a Obstacle),
        }
        let mut layers: Vec<(f32, Layer<'_>)> = self
            .obstacles
            .iter()
            .map(|obstacle| (obstacle.sprite.max.y, Layer::Scenery(obstacle)))
            .collect();
        layers.push((self.player.sprite_bounds().max.y, Layer::Player));
        layers.sort_by(|a, b| a.0.total_cmp(&b.0));

        for (_, layer) in layers {
            match layer {
                Layer::Player => self.draw_player(surface),
                Layer::Scenery(obstacle) => {
                    let bounds = self.camera.apply_rect(obstacle.sprite);
                    blit_or_placeholder(
                        surface,
                        Blit::new(obstacle.kind.sprite_key(), bounds.min, bounds.size()),
                    );
                }
            }
        }
    }

    fn draw_player(&self, surface: &mut dyn DrawSurface) {
        let sprite = self.player.sprite_bounds();
        let shadow = Rect::from_center_size(
            Vec2::new(sprite.center().x, sprite.max.y),
            Vec2::new(40.0, 10.0),
        );
        surface.fill_rect(self.camera.apply_rect(shadow), with_alpha(palette::BLACK, 100));
        let bounds = self.camera.apply_rect(sprite);
        blit_or_placeholder(
            surface,
            Blit::new(SpriteKey::Hatchling, bounds.min, bounds.size()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, DrawList};
    use crate::rng::{ScriptedRng, SimulationRng};

    fn empty_world() -> Exploration {
        Exploration::with_obstacles(&WorldSettings::default(), Vec::new())
    }

    #[test]
    fn spawn_hitbox_is_inset_sprite() {
        let player = Player::spawn(PLAYER_START);
        assert_eq!(player.hitbox, Rect::new(410.0, 315.0, 454.0, 349.0));
        assert_eq!(player.sprite_bounds(), Rect::new(400.0, 300.0, 464.0, 364.0));
    }

    #[test]
    fn tree_hitbox_is_the_trunk() {
        let tree = Obstacle::new(ObstacleKind::Tree, Vec2::new(100.0, 100.0));
        assert_eq!(tree.hitbox, Rect::new(130.0, 180.0, 166.0, 220.0));
        let rock = Obstacle::new(ObstacleKind::Rock, Vec2::new(0.0, 0.0));
        assert_eq!(rock.hitbox, Rect::new(5.0, 10.0, 59.0, 54.0));
    }

    #[test]
    fn held_keys_drive_normalised_velocity() {
        let mut world = empty_world();
        world.handle_input(InputEvent::Pressed(KeyCode::ArrowRight));
        world.handle_input(InputEvent::Pressed(KeyCode::KeyS));
        world.update(&mut ScriptedRng::new());
        let velocity = world.player().velocity;
        assert!((velocity.length() - PLAYER_SPEED).abs() < 1e-4);
        assert!(velocity.x > 0.0 && velocity.y > 0.0);
        assert_eq!(world.player().steps_taken, 1);

        world.handle_input(InputEvent::Released(KeyCode::ArrowRight));
        world.handle_input(InputEvent::Released(KeyCode::KeyS));
        world.update(&mut ScriptedRng::new());
        assert!(!world.player().is_moving());
        assert_eq!(world.player().steps_taken, 1);
    }

    #[test]
    fn releasing_one_alias_keeps_the_other() {
        let mut world = empty_world();
        world.handle_input(InputEvent::Pressed(KeyCode::ArrowLeft));
        world.handle_input(InputEvent::Pressed(KeyCode::KeyA));
        world.handle_input(InputEvent::Released(KeyCode::KeyA));
        world.update(&mut ScriptedRng::new());
        assert_eq!(world.player().velocity, Vec2::new(-PLAYER_SPEED, 0.0));
    }

    #[test]
    fn walking_into_a_rock_stops_at_its_edge() {
        let rock = Obstacle::new(ObstacleKind::Rock, Vec2::new(460.0, 300.0));
        let mut world = Exploration::with_obstacles(&WorldSettings::default(), vec![rock]);
        world.handle_input(InputEvent::Pressed(KeyCode::KeyD));
        for _ in 0..10 {
            world.update(&mut ScriptedRng::new());
        }
        assert_eq!(world.player().hitbox.max.x, rock.hitbox.min.x);
        assert_eq!(world.player().hitbox.min.y, 315.0);
    }

    #[test]
    fn danger_zone_walk_triggers_encounter() {
        let mut world = empty_world();
        world.place_player(Vec2::new(700.0, 600.0));
        world.handle_input(InputEvent::Pressed(KeyCode::ArrowRight));
        let mut rng = ScriptedRng::new().always(0.0);
        assert!(world.update(&mut rng));
        assert_eq!(world.take_encounter().as_deref(), Some("Corrupted Wolf"));
        assert!(!world.update(&mut rng));
        assert_eq!(world.encounter().cooldown, 299);
    }

    #[test]
    fn generated_map_keeps_clearing_empty() {
        let mut rng = SimulationRng::new(5);
        let obstacles = generate_obstacles(Vec2::new(1600.0, 1200.0), &mut rng);
        assert!(obstacles.len() <= TREE_COUNT + ROCK_COUNT);
        assert!(obstacles
            .iter()
            .all(|o| !overlaps(&o.sprite, &SPAWN_CLEARING)));
        assert!(obstacles
            .iter()
            .all(|o| o.sprite.min.x <= 1500.0 && o.sprite.min.y <= 1100.0));
    }

    #[test]
    fn interaction_range_uses_sprite_centres() {
        let near = Obstacle::new(ObstacleKind::Rock, Vec2::new(450.0, 300.0));
        let world = Exploration::with_obstacles(&WorldSettings::default(), vec![near]);
        assert!(world.near_interactable());
        let far = Obstacle::new(ObstacleKind::Rock, Vec2::new(1200.0, 900.0));
        let world = Exploration::with_obstacles(&WorldSettings::default(), vec![far]);
        assert!(!world.near_interactable());
    }

    #[test]
    fn draw_sorts_by_sprite_bottom() {
        let behind = Obstacle::new(ObstacleKind::Tree, Vec2::new(380.0, 150.0));
        let front = Obstacle::new(ObstacleKind::Rock, Vec2::new(420.0, 340.0));
        let world = Exploration::with_obstacles(&WorldSettings::default(), vec![front, behind]);
        let mut frame = DrawList::new(Vec2::new(1280.0, 720.0));
        world.draw(&mut frame);
        let order: Vec<SpriteKey> = frame
            .sprites()
            .map(|b| b.sprite)
            .filter(|k| *k != SpriteKey::ForestTile)
            .collect();
        assert_eq!(order, vec![SpriteKey::Tree, SpriteKey::Hatchling, SpriteKey::Rock]);
    }

    #[test]
    fn missing_ground_tile_uses_flat_colour() {
        let world = empty_world();
        let mut frame =
            DrawList::new(Vec2::new(1280.0, 720.0)).with_unavailable([SpriteKey::ForestTile]);
        world.draw(&mut frame);
        assert!(frame
            .commands()
            .iter()
            .any(|cmd| matches!(cmd, DrawCommand::Rect { color, .. } if *color == GROUND_FALLBACK)));
    }
}
