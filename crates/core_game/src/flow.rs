//! Top-level screen router. Owns every screen and moves between them when a
//! screen reports that it is done.

use bevy::input::keyboard::KeyCode;
use bevy::math::Vec2;
use tracing::info;

use crate::combat::{CombatEngine, CombatSignal, DEFAULT_ENEMY};
use crate::cutscene::Cutscene;
use crate::dialogue::{DialogueBox, DialogueEffect, DialogueSignal};
use crate::exploration::Exploration;
use crate::input::InputEvent;
use crate::render::{palette, DrawSurface, TextStyle};
use crate::rng::RandomSource;
use crate::settings::WorldSettings;

/// Player sprite x past which the scripted first fight begins.
pub const SCRIPTED_ENCOUNTER_X: f32 = 1000.0;
const ARRIVAL_POINT: Vec2 = Vec2::new(400.0, 300.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Screen {
    Cutscene,
    Explore,
    Dialogue,
    Combat,
    GameOver,
}

impl Screen {
    pub fn name(self) -> &'static str {
        match self {
            Screen::Cutscene => "cutscene",
            Screen::Explore => "explore",
            Screen::Dialogue => "dialogue",
            Screen::Combat => "combat",
            Screen::GameOver => "game_over",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "cutscene" => Some(Screen::Cutscene),
            "explore" | "exploration" => Some(Screen::Explore),
            "dialogue" => Some(Screen::Dialogue),
            "combat" => Some(Screen::Combat),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoryFlags {
    pub intro_cutscene_done: bool,
    pub learned_speak: bool,
    pub essence_consumed: bool,
    pub first_combat_done: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowSignal {
    GameOver,
}

#[derive(Debug)]
pub struct GameFlow {
    screen: Screen,
    flags: StoryFlags,
    next_enemy: Option<String>,
    cutscene: Cutscene,
    exploration: Exploration,
    dialogue: DialogueBox,
    combat: CombatEngine,
}

impl GameFlow {
    pub fn new(settings: &WorldSettings, rng: &mut impl RandomSource) -> Self {
        Self::with_exploration(settings, Exploration::new(settings, rng))
    }

    pub fn with_exploration(settings: &WorldSettings, exploration: Exploration) -> Self {
        Self {
            screen: Screen::Cutscene,
            flags: StoryFlags::default(),
            next_enemy: None,
            cutscene: Cutscene::new(settings.screen_size),
            exploration,
            dialogue: DialogueBox::new(),
            combat: CombatEngine::new(),
        }
    }

    /// Jumps straight to `screen`, setting up whatever that screen needs as
    /// if the story had reached it.
    pub fn start_at(&mut self, screen: Screen) {
        if screen != Screen::Cutscene {
            self.cutscene.skip();
            self.flags.intro_cutscene_done = true;
            self.exploration.place_player(ARRIVAL_POINT);
        }
        match screen {
            Screen::Dialogue => {
                self.dialogue.start("intro");
            }
            Screen::Combat => self.combat.start_combat(DEFAULT_ENEMY),
            Screen::Cutscene | Screen::Explore | Screen::GameOver => {}
        }
        self.switch(screen);
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn flags(&self) -> StoryFlags {
        self.flags
    }

    pub fn exploration(&self) -> &Exploration {
        &self.exploration
    }

    pub fn exploration_mut(&mut self) -> &mut Exploration {
        &mut self.exploration
    }

    pub fn dialogue(&self) -> &DialogueBox {
        &self.dialogue
    }

    pub fn combat(&self) -> &CombatEngine {
        &self.combat
    }

    pub fn combat_mut(&mut self) -> &mut CombatEngine {
        &mut self.combat
    }

    fn switch(&mut self, screen: Screen) {
        if screen != self.screen {
            info!(
                target: "core_game.flow",
                from = self.screen.name(),
                to = screen.name(),
                "screen changed"
            );
        }
        self.screen = screen;
    }

    fn open_dialogue(&mut self, node_id: &str) {
        if self.dialogue.start(node_id) {
            self.switch(Screen::Dialogue);
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        // Movement keys are tracked as held state whatever screen is up.
        self.exploration.handle_input(event);

        match self.screen {
            Screen::Cutscene => {
                if event.pressed() == Some(KeyCode::Escape) {
                    self.cutscene.skip();
                }
            }
            Screen::Dialogue => {
                if self.dialogue.handle_input(event) == Some(DialogueSignal::End) {
                    self.finish_dialogue();
                }
            }
            Screen::Combat => self.combat.handle_input(event),
            Screen::Explore | Screen::GameOver => {}
        }
    }

    fn finish_dialogue(&mut self) {
        let mut fight = false;
        for effect in self.dialogue.take_effects() {
            match effect {
                DialogueEffect::LearnedSpeak => self.flags.learned_speak = true,
                DialogueEffect::Healed => self.flags.essence_consumed = true,
                DialogueEffect::TriggerCombat => fight = true,
            }
        }

        if fight {
            let enemy = self
                .next_enemy
                .take()
                .unwrap_or_else(|| DEFAULT_ENEMY.to_string());
            self.combat.start_combat(&enemy);
            self.switch(Screen::Combat);
        } else {
            self.switch(Screen::Explore);
        }
    }

    pub fn update(&mut self, rng: &mut impl RandomSource) -> Option<FlowSignal> {
        match self.screen {
            Screen::Cutscene => {
                self.cutscene.update(rng);
                if self.cutscene.is_finished() {
                    self.flags.intro_cutscene_done = true;
                    self.exploration.place_player(ARRIVAL_POINT);
                    self.open_dialogue("intro");
                }
            }
            Screen::Explore => {
                self.exploration.update(rng);
                let random = self.exploration.take_encounter();
                let scripted = !self.flags.first_combat_done
                    && self.exploration.player().sprite_bounds().min.x > SCRIPTED_ENCOUNTER_X;
                if scripted {
                    // Consumed even when a random encounter fires on the same tick.
                    self.flags.first_combat_done = true;
                }
                if random.is_some() || scripted {
                    self.next_enemy =
                        Some(random.unwrap_or_else(|| DEFAULT_ENEMY.to_string()));
                    self.open_dialogue("combat_tutorial");
                }
            }
            Screen::Combat => match self.combat.update(rng) {
                Some(CombatSignal::Win) => self.open_dialogue("hunger"),
                Some(CombatSignal::Lose) => {
                    self.switch(Screen::GameOver);
                    return Some(FlowSignal::GameOver);
                }
                None => {}
            },
            Screen::GameOver => return Some(FlowSignal::GameOver),
            Screen::Dialogue => {}
        }
        None
    }

    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        match self.screen {
            Screen::Cutscene => self.cutscene.draw(surface),
            Screen::Explore => {
                self.exploration.draw(surface);
                if self.exploration.near_interactable() {
                    let screen = surface.size();
                    surface.text(
                        "Press 'E' to Interact",
                        Vec2::new(screen.x / 2.0, screen.y - 50.0),
                        TextStyle::new(20.0, palette::WHITE).centered(),
                    );
                }
            }
            Screen::Dialogue => {
                self.exploration.draw(surface);
                self.dialogue.draw(surface);
            }
            Screen::Combat => self.combat.draw(surface),
            Screen::GameOver => {
                let screen = surface.size();
                surface.fill_screen(palette::BLACK);
                surface.text(
                    "Game Over",
                    screen / 2.0,
                    TextStyle::new(48.0, palette::RED).centered(),
                );
            }
        }
    }
}
