//! Turn-based combat: a tick-driven state machine with timed animation
//! phases. Damage and heals land on a fixed "impact" tick inside each
//! animation rather than when the action is chosen.

use bevy::input::keyboard::KeyCode;
use bevy::math::{IVec2, Rect, Vec2};
use std::collections::VecDeque;
use std::ops::RangeInclusive;
use tracing::{debug, info};

use crate::combatant::{Combatant, Enemy, CHARGE_MAX};
use crate::fx::VisualFx;
use crate::input::{is_menu_down, is_menu_up, InputEvent};
use crate::render::{
    blit_or_placeholder, draw_bar, palette, with_alpha, Blit, DrawSurface, SpriteKey, TextStyle,
};
use crate::rng::RandomSource;

pub const LOG_CAPACITY: usize = 4;
pub const DEFAULT_ENEMY: &str = "Corrupted Wolf";

const INTRO_TICKS: u32 = 60;
const PLAYER_CHARGE_PER_TICK: f32 = 1.0;
const PLAYER_ACTION_TICKS: u32 = 30;
const PLAYER_IMPACT_TICK: u32 = 15;
const ENEMY_CHARGE_FACTOR: f32 = 1.5;
const ENEMY_ACTION_TICKS: u32 = 40;
const ENEMY_STRIKE_TICK: u32 = 20;
const ATTACK_DAMAGE: RangeInclusive<u32> = 15..=20;
const ABSORB_HEAL: RangeInclusive<u32> = 5..=10;
const ENEMY_DAMAGE: RangeInclusive<u32> = 5..=12;
const ESSENCE_HEAL: u32 = 30;
const HIT_FLASH: u8 = 150;
const ENEMY_HIT_SHAKE: IVec2 = IVec2::new(10, 5);
const PLAYER_HIT_SHAKE: IVec2 = IVec2::new(-10, 5);

const UI_TOP: f32 = 550.0;
const PLAYER_ANCHOR: Vec2 = Vec2::new(100.0, 300.0);
const ENEMY_ANCHOR: Vec2 = Vec2::new(850.0, 250.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombatAction {
    Attack,
    Absorb,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VictoryChoice {
    Consume,
    Skip,
}

impl VictoryChoice {
    pub fn index(self) -> usize {
        match self {
            VictoryChoice::Consume => 0,
            VictoryChoice::Skip => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombatState {
    Intro { elapsed: u32 },
    PlayerTurn,
    PlayerAction { action: CombatAction, timer: u32 },
    EnemyTurn,
    EnemyAction { timer: u32 },
    VictoryMenu { selection: VictoryChoice },
    Win,
    Lose,
}

impl CombatState {
    pub fn name(&self) -> &'static str {
        match self {
            CombatState::Intro { .. } => "INTRO",
            CombatState::PlayerTurn => "PLAYER_TURN",
            CombatState::PlayerAction { .. } => "PLAYER_ACTION",
            CombatState::EnemyTurn => "ENEMY_TURN",
            CombatState::EnemyAction { .. } => "ENEMY_ACTION",
            CombatState::VictoryMenu { .. } => "VICTORY_MENU",
            CombatState::Win => "WIN",
            CombatState::Lose => "LOSE",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CombatState::Win | CombatState::Lose)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombatSignal {
    Win,
    Lose,
}

impl CombatSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            CombatSignal::Win => "WIN",
            CombatSignal::Lose => "LOSE",
        }
    }
}

/// The most recent combat messages, newest first.
#[derive(Clone, Debug, Default)]
pub struct CombatLog {
    entries: VecDeque<String>,
    written: u64,
}

impl CombatLog {
    pub fn push(&mut self, message: impl Into<String>) {
        self.entries.push_front(message.into());
        self.entries.truncate(LOG_CAPACITY);
        self.written += 1;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Messages pushed since the log was created, including evicted ones.
    pub fn written(&self) -> u64 {
        self.written
    }
}

#[derive(Debug)]
pub struct CombatEngine {
    active: bool,
    state: CombatState,
    player: Combatant,
    enemy: Option<Enemy>,
    log: CombatLog,
    fx: VisualFx,
}

impl Default for CombatEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatEngine {
    pub fn new() -> Self {
        Self {
            active: false,
            state: CombatState::Intro { elapsed: 0 },
            player: Combatant::player(),
            enemy: None,
            log: CombatLog::default(),
            fx: VisualFx::default(),
        }
    }

    /// Resets the fight against a freshly spawned enemy. The player keeps
    /// their hit points between fights; only their charge is reset.
    pub fn start_combat(&mut self, enemy_type: &str) {
        let enemy = Enemy::spawn(enemy_type);
        info!(
            target: "core_game.combat",
            enemy = %enemy.name,
            enemy_hp = enemy.stats.health.current(),
            player_hp = self.player.health.current(),
            "combat started"
        );
        self.active = true;
        self.state = CombatState::Intro { elapsed: 0 };
        self.log.clear();
        self.log.push(format!("{enemy_type} emerges!"));
        self.player.charge = 0.0;
        self.enemy = Some(enemy);
    }

    pub fn state(&self) -> CombatState {
        self.state
    }

    pub fn player(&self) -> &Combatant {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Combatant {
        &mut self.player
    }

    pub fn enemy(&self) -> Option<&Enemy> {
        self.enemy.as_ref()
    }

    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    pub fn fx(&self) -> &VisualFx {
        &self.fx
    }

    #[cfg(test)]
    pub(crate) fn force_state(&mut self, state: CombatState) {
        self.state = state;
    }

    #[cfg(test)]
    pub(crate) fn enemy_mut(&mut self) -> Option<&mut Enemy> {
        self.enemy.as_mut()
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        if !self.active {
            return;
        }
        let Some(key) = event.pressed() else {
            return;
        };

        match self.state {
            CombatState::PlayerTurn => {
                let action = match key {
                    KeyCode::KeyA => CombatAction::Attack,
                    KeyCode::KeyD => CombatAction::Absorb,
                    _ => return,
                };
                self.enter(CombatState::PlayerAction {
                    action,
                    timer: PLAYER_ACTION_TICKS,
                });
            }
            CombatState::VictoryMenu { selection } => {
                if is_menu_up(key) {
                    self.state = CombatState::VictoryMenu {
                        selection: VictoryChoice::Consume,
                    };
                } else if is_menu_down(key) {
                    self.state = CombatState::VictoryMenu {
                        selection: VictoryChoice::Skip,
                    };
                } else if matches!(key, KeyCode::Enter | KeyCode::Space | KeyCode::KeyE) {
                    self.commit_victory(selection);
                }
            }
            _ => {}
        }
    }

    fn commit_victory(&mut self, choice: VictoryChoice) {
        match choice {
            VictoryChoice::Consume => {
                self.player.health.heal(ESSENCE_HEAL);
                self.log
                    .push(format!("Consumed essence. Healed {ESSENCE_HEAL} HP."));
            }
            VictoryChoice::Skip => self.log.push("Left the essence behind."),
        }
        self.enter(CombatState::Win);
    }

    /// Advances one tick. Returns the terminal signal on every tick spent in
    /// `Win` or `Lose`.
    pub fn update(&mut self, rng: &mut impl RandomSource) -> Option<CombatSignal> {
        if !self.active {
            return None;
        }
        // Decay first so effects triggered this tick survive until drawn.
        self.fx.decay();

        let (next, signal) = self.transition(rng);
        self.enter(next);
        signal
    }

    fn enter(&mut self, next: CombatState) {
        if std::mem::discriminant(&next) != std::mem::discriminant(&self.state) {
            debug!(
                target: "core_game.combat",
                from = self.state.name(),
                to = next.name(),
                "combat state changed"
            );
            if next.is_terminal() {
                info!(
                    target: "core_game.combat",
                    outcome = next.name(),
                    player_hp = self.player.health.current(),
                    "combat resolved"
                );
            }
        }
        self.state = next;
    }

    /// Evaluates the current state once and returns the state to enter.
    /// Impact ticks that end the fight return immediately and skip the rest
    /// of the tick.
    fn transition(&mut self, rng: &mut impl RandomSource) -> (CombatState, Option<CombatSignal>) {
        let Some(enemy) = self.enemy.as_mut() else {
            return (self.state, None);
        };

        match self.state {
            CombatState::Intro { elapsed } => {
                let elapsed = elapsed + 1;
                if elapsed > INTRO_TICKS {
                    (CombatState::PlayerTurn, None)
                } else {
                    (CombatState::Intro { elapsed }, None)
                }
            }
            CombatState::PlayerTurn => {
                self.player.add_charge(PLAYER_CHARGE_PER_TICK);
                (CombatState::PlayerTurn, None)
            }
            CombatState::PlayerAction { action, timer } => {
                let timer = timer.saturating_sub(1);
                if timer == PLAYER_IMPACT_TICK {
                    match action {
                        CombatAction::Attack => {
                            let damage = rng.roll(ATTACK_DAMAGE);
                            enemy.stats.health.damage(damage);
                            self.log
                                .push(format!("You hit {} for {damage}!", enemy.name));
                            self.fx.trigger(ENEMY_HIT_SHAKE, HIT_FLASH);
                            if enemy.stats.health.is_depleted() {
                                return (
                                    CombatState::VictoryMenu {
                                        selection: VictoryChoice::Consume,
                                    },
                                    None,
                                );
                            }
                        }
                        CombatAction::Absorb => {
                            let heal = rng.roll(ABSORB_HEAL);
                            self.player.health.heal(heal);
                            self.log.push(format!("Absorbed {heal} HP!"));
                            self.player.charge = 0.0;
                        }
                    }
                }
                if timer == 0 {
                    (CombatState::EnemyTurn, None)
                } else {
                    (CombatState::PlayerAction { action, timer }, None)
                }
            }
            CombatState::EnemyTurn => {
                enemy.stats.charge += enemy.speed * ENEMY_CHARGE_FACTOR;
                if enemy.stats.charge >= CHARGE_MAX {
                    enemy.stats.charge = 0.0;
                    (
                        CombatState::EnemyAction {
                            timer: ENEMY_ACTION_TICKS,
                        },
                        None,
                    )
                } else {
                    (CombatState::EnemyTurn, None)
                }
            }
            CombatState::EnemyAction { timer } => {
                let timer = timer.saturating_sub(1);
                if timer == ENEMY_STRIKE_TICK {
                    let damage = rng.roll(ENEMY_DAMAGE);
                    self.player.health.damage(damage);
                    self.log
                        .push(format!("{} bites you for {damage}!", enemy.name));
                    self.fx.trigger(PLAYER_HIT_SHAKE, HIT_FLASH);
                    if self.player.health.is_depleted() {
                        return (CombatState::Lose, None);
                    }
                }
                if timer == 0 {
                    (CombatState::PlayerTurn, None)
                } else {
                    (CombatState::EnemyAction { timer }, None)
                }
            }
            CombatState::VictoryMenu { selection } => {
                (CombatState::VictoryMenu { selection }, None)
            }
            CombatState::Win => (CombatState::Win, Some(CombatSignal::Win)),
            CombatState::Lose => (CombatState::Lose, Some(CombatSignal::Lose)),
        }
    }

    pub fn draw(&self, surface: &mut dyn DrawSurface) {
        let Some(enemy) = self.enemy.as_ref() else {
            return;
        };
        let screen = surface.size();
        let shake = self.fx.offset();

        blit_or_placeholder(
            surface,
            Blit::new(SpriteKey::CombatBackground, shake, screen),
        );

        if self.state != CombatState::Win && !enemy.stats.health.is_depleted() {
            blit_or_placeholder(surface, self.enemy_blit(shake));
        }
        blit_or_placeholder(surface, self.player_blit(shake));

        draw_bar(
            surface,
            Rect::new(50.0, UI_TOP, 300.0, UI_TOP + 20.0),
            self.player.health.current() as f32,
            self.player.health.max() as f32,
            palette::GREEN,
            Some("HP"),
        );
        draw_bar(
            surface,
            Rect::new(50.0, UI_TOP + 30.0, 300.0, UI_TOP + 40.0),
            self.player.charge,
            CHARGE_MAX,
            palette::GOLD,
            None,
        );
        if self.state != CombatState::Win {
            draw_bar(
                surface,
                Rect::new(800.0, 100.0, 1050.0, 120.0),
                enemy.stats.health.current() as f32,
                enemy.stats.health.max() as f32,
                palette::RED,
                Some(enemy.name.as_str()),
            );
            draw_bar(
                surface,
                Rect::new(800.0, 130.0, 1050.0, 140.0),
                enemy.stats.charge,
                CHARGE_MAX,
                palette::GOLD,
                None,
            );
        }

        match self.state {
            CombatState::VictoryMenu { selection } => draw_victory_menu(surface, selection),
            CombatState::PlayerTurn => surface.text(
                "[A] ATTACK    [D] ABSORB",
                Vec2::new(50.0, UI_TOP + 60.0),
                TextStyle::new(40.0, palette::GOLD),
            ),
            _ => {}
        }

        for (idx, line) in self.log.iter().enumerate() {
            surface.text(
                line,
                Vec2::new(screen.x / 2.0, 20.0 + idx as f32 * 25.0),
                TextStyle::new(24.0, palette::TEXT).centered(),
            );
        }

        if self.fx.flash_alpha > 0 {
            surface.fill_screen(with_alpha(palette::WHITE, self.fx.flash_alpha));
        }
    }

    fn enemy_blit(&self, shake: Vec2) -> Blit {
        let mut position = ENEMY_ANCHOR;
        let mut blit = Blit::new(SpriteKey::Wolf, position, Vec2::new(350.0, 350.0)).flipped(true);

        if let CombatState::EnemyAction { timer } = self.state {
            // Lunge left until the strike tick, then slide back.
            let travel = if timer > ENEMY_STRIKE_TICK {
                ENEMY_ACTION_TICKS - timer
            } else {
                timer
            };
            position.x -= travel as f32 * 20.0;
            blit = Blit::new(SpriteKey::WolfAttack, position, Vec2::new(400.0, 350.0));
        }
        if let CombatState::PlayerAction {
            action: CombatAction::Attack,
            timer,
        } = self.state
        {
            if timer < PLAYER_IMPACT_TICK {
                position.x += 30.0;
                blit = Blit::new(SpriteKey::WolfHit, position, Vec2::new(350.0, 350.0));
            }
        }
        blit.position = position + shake;
        blit
    }

    fn player_blit(&self, shake: Vec2) -> Blit {
        let mut position = PLAYER_ANCHOR;
        let mut sprite = SpriteKey::Hatchling;
        let mut size = Vec2::new(300.0, 300.0);

        match self.state {
            CombatState::PlayerAction {
                action: CombatAction::Attack,
                timer,
            } => {
                sprite = SpriteKey::HatchlingAttack;
                size = Vec2::new(350.0, 300.0);
                let travel = if timer > PLAYER_IMPACT_TICK {
                    PLAYER_ACTION_TICKS - timer
                } else {
                    timer
                };
                position.x += travel as f32 * 15.0;
            }
            CombatState::EnemyAction { timer } if timer < ENEMY_STRIKE_TICK => {
                sprite = SpriteKey::HatchlingHit;
                position.x -= 20.0;
            }
            _ => {}
        }
        Blit::new(sprite, position + shake, size)
    }
}

fn draw_victory_menu(surface: &mut dyn DrawSurface, selection: VictoryChoice) {
    let screen = surface.size();
    let size = Vec2::new(400.0, 200.0);
    let top_left = (screen - size) / 2.0;
    let panel = Rect::from_corners(top_left, top_left + size);
    surface.fill_rect(panel, with_alpha(palette::BLACK, 200));

    let center_x = panel.center().x;
    surface.text(
        "VICTORY",
        Vec2::new(center_x, panel.min.y + 20.0),
        TextStyle::new(40.0, palette::GOLD).centered(),
    );

    let options = [
        (VictoryChoice::Consume, "Consume (+30 HP)"),
        (VictoryChoice::Skip, "Skip"),
    ];
    for (choice, label) in options {
        let selected = choice == selection;
        let (prefix, color) = if selected {
            ("> ", palette::TEXT_CORRUPTED)
        } else {
            ("  ", palette::WHITE)
        };
        surface.text(
            &format!("{prefix}{label}"),
            Vec2::new(
                center_x - 100.0,
                panel.min.y + 80.0 + choice.index() as f32 * 40.0,
            ),
            TextStyle::new(24.0, color),
        );
    }
}
