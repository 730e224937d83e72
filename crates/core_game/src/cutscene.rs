//! Opening hatching cutscene, played on a fixed tick timeline.

use bevy::color::Color;
use bevy::math::{Rect, Vec2};
use tracing::debug;

use crate::render::{blit_or_placeholder, palette, with_alpha, Blit, DrawSurface, SpriteKey, TextStyle};
use crate::rng::RandomSource;

const TICKS_PER_SECOND: u32 = 60;
const SILENCE_END: u32 = 120;
const WOBBLE_END: u32 = 300;
const CRACK_END: u32 = 420;
const HATCH_END: u32 = 540;

const GRAVITY: f32 = 0.2;
const CHIP_CHANCE: f32 = 0.1;
const CHIP_COLOR: Color = Color::srgb(0.392, 0.196, 0.392);
const EGG_SIZE: Vec2 = Vec2::new(128.0, 128.0);
const HATCHLING_SIZE: Vec2 = Vec2::new(64.0, 64.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum CutsceneStage {
    Silence,
    Wobble,
    Crack,
    Hatch,
    Done,
}

impl CutsceneStage {
    pub fn at(tick: u32) -> Self {
        match tick {
            t if t < SILENCE_END => CutsceneStage::Silence,
            t if t < WOBBLE_END => CutsceneStage::Wobble,
            t if t < CRACK_END => CutsceneStage::Crack,
            t if t < HATCH_END => CutsceneStage::Hatch,
            _ => CutsceneStage::Done,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub life: u32,
    pub color: Color,
}

#[derive(Debug)]
pub struct Cutscene {
    tick: u32,
    stage: CutsceneStage,
    shake: Vec2,
    particles: Vec<Particle>,
    center: Vec2,
}

impl Cutscene {
    pub fn new(screen_size: Vec2) -> Self {
        Self {
            tick: 0,
            stage: CutsceneStage::Silence,
            shake: Vec2::ZERO,
            particles: Vec::new(),
            center: (screen_size / 2.0).floor(),
        }
    }

    pub fn stage(&self) -> CutsceneStage {
        self.stage
    }

    pub fn is_finished(&self) -> bool {
        self.stage == CutsceneStage::Done
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Lets the player skip straight to the end.
    pub fn skip(&mut self) {
        self.tick = HATCH_END;
        self.stage = CutsceneStage::Done;
        self.particles.clear();
    }

    fn burst(&mut self, count: usize, color: Color, rng: &mut impl RandomSource) {
        for _ in 0..count {
            self.particles.push(Particle {
                position: self.center,
                velocity: Vec2::new(rng.uniform(-3.0..=3.0), rng.uniform(-5.0..=-1.0)),
                life: rng.roll(20..=50),
                color,
            });
        }
    }

    pub fn update(&mut self, rng: &mut impl RandomSource) {
        if self.is_finished() {
            return;
        }

        for particle in &mut self.particles {
            particle.position += particle.velocity;
            particle.velocity.y += GRAVITY;
            particle.life = particle.life.saturating_sub(1);
        }
        self.particles.retain(|particle| particle.life > 0);

        let tick = self.tick;
        let next = CutsceneStage::at(tick);
        match next {
            CutsceneStage::Silence | CutsceneStage::Hatch | CutsceneStage::Done => {
                self.shake = Vec2::ZERO;
            }
            CutsceneStage::Wobble => {
                // Alternate every 100 ms.
                let phase = tick * 10 / TICKS_PER_SECOND;
                self.shake = Vec2::new(if phase % 2 == 0 { 2.0 } else { -2.0 }, 0.0);
            }
            CutsceneStage::Crack => {
                let phase = tick * 20 / TICKS_PER_SECOND;
                self.shake = if phase % 2 == 0 {
                    Vec2::new(rng.roll(0..=10) as f32 - 5.0, rng.roll(0..=10) as f32 - 5.0)
                } else {
                    Vec2::ZERO
                };
                if rng.chance() < CHIP_CHANCE {
                    self.burst(2, CHIP_COLOR, rng);
                }
            }
        }
        if next == CutsceneStage::Hatch && self.stage != CutsceneStage::Hatch {
            self.burst(30, palette::WHITE, rng);
        }
        if next != self.stage {
            debug!(target: "core_game.cutscene", tick, stage = ?next, "cutscene stage");
        }
        self.stage = next;
        self.tick += 1;
    }

    /// White flash over the hatch, fading by one alpha step per 2 ms.
    fn hatch_flash(&self) -> u8 {
        let elapsed_ms = self.tick.saturating_sub(CRACK_END) * 1000 / TICKS_PER_SECOND;
        255u32.saturating_sub(elapsed_ms / 2) as u8
    }

    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        let screen = surface.size();
        surface.fill_screen(palette::BLACK);
        blit_or_placeholder(
            surface,
            Blit::new(SpriteKey::ForestTile, Vec2::ZERO, screen),
        );
        surface.fill_screen(with_alpha(palette::BLACK, 150));

        match self.stage {
            CutsceneStage::Silence => surface.text(
                "A new cycle begins...",
                Vec2::new(screen.x / 2.0, screen.y / 2.0),
                TextStyle::new(40.0, palette::TEXT).centered(),
            ),
            CutsceneStage::Wobble | CutsceneStage::Crack => blit_or_placeholder(
                surface,
                Blit::new(SpriteKey::Egg, self.center - EGG_SIZE / 2.0 + self.shake, EGG_SIZE),
            ),
            CutsceneStage::Hatch => {
                blit_or_placeholder(
                    surface,
                    Blit::new(SpriteKey::Hatchling, self.center - HATCHLING_SIZE / 2.0, HATCHLING_SIZE),
                );
                let alpha = self.hatch_flash();
                if alpha > 0 {
                    surface.fill_screen(with_alpha(palette::WHITE, alpha));
                }
            }
            CutsceneStage::Done => {}
        }

        for particle in &self.particles {
            surface.fill_rect(
                Rect::from_center_size(particle.position, Vec2::splat(4.0)),
                particle.color,
            );
        }
    }
}
