use bevy::input::ButtonInput;
use bevy::prelude::*;
use bevy::time::{Fixed, Time};

use crate::flow::{FlowSignal, GameFlow, Screen};
use crate::input::InputEvent;
use crate::rng::SimulationRng;
use crate::settings::{SimulationParams, WorldSettings};

/// Drives the game on the fixed timestep. Every frame's keyboard edges are
/// forwarded to the flow before the next simulation tick.
pub struct GameplayPlugin;

impl Plugin for GameplayPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<SimulationParams>() {
            app.insert_resource(SimulationParams::from_env());
        }
        if !app.world().contains_resource::<WorldSettings>() {
            app.insert_resource(WorldSettings::from_env());
        }
        if app
            .world()
            .get_resource::<ButtonInput<KeyCode>>()
            .is_none()
        {
            app.world_mut()
                .insert_resource(ButtonInput::<KeyCode>::default());
        }

        app.init_resource::<SimulationRng>()
            .init_resource::<ActiveGame>()
            .add_systems(Startup, configure_fixed_time)
            .add_systems(Update, forward_keyboard_input)
            .add_systems(FixedUpdate, tick_game);
    }
}

#[derive(Resource, Debug)]
pub struct ActiveGame(GameFlow);

impl ActiveGame {
    pub fn new(flow: GameFlow) -> Self {
        Self(flow)
    }

    pub fn flow(&self) -> &GameFlow {
        &self.0
    }

    pub fn flow_mut(&mut self) -> &mut GameFlow {
        &mut self.0
    }

    pub fn screen(&self) -> Screen {
        self.0.screen()
    }
}

impl FromWorld for ActiveGame {
    fn from_world(world: &mut World) -> Self {
        let settings = world
            .get_resource::<WorldSettings>()
            .copied()
            .unwrap_or_default();
        if !world.contains_resource::<SimulationRng>() {
            world.init_resource::<SimulationRng>();
        }
        let mut rng = world.resource_mut::<SimulationRng>();
        Self(GameFlow::new(&settings, rng.as_mut()))
    }
}

fn configure_fixed_time(mut fixed_time: ResMut<Time<Fixed>>, params: Res<SimulationParams>) {
    fixed_time.set_timestep_seconds(params.fixed_delta);
}

fn forward_keyboard_input(keys: Res<ButtonInput<KeyCode>>, mut game: ResMut<ActiveGame>) {
    for key in keys.get_just_pressed() {
        game.0.handle_input(InputEvent::Pressed(*key));
    }
    for key in keys.get_just_released() {
        game.0.handle_input(InputEvent::Released(*key));
    }
}

fn tick_game(
    mut game: ResMut<ActiveGame>,
    mut rng: ResMut<SimulationRng>,
    mut exit: EventWriter<AppExit>,
    mut reported: Local<bool>,
) {
    if let Some(FlowSignal::GameOver) = game.0.update(rng.as_mut()) {
        if !*reported {
            info!(target: "core_game.gameplay", "game over");
            *reported = true;
        }
        exit.send(AppExit::Success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::CombatState;

    fn headless_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(SimulationParams::from_seed(7))
            .insert_resource(WorldSettings::default())
            .add_plugins(GameplayPlugin);
        app.update();
        app
    }

    #[test]
    fn game_opens_on_the_cutscene() {
        let app = headless_app();
        assert_eq!(app.world().resource::<ActiveGame>().screen(), Screen::Cutscene);
        assert_eq!(app.world().resource::<SimulationRng>().seed(), 7);
    }

    #[test]
    fn keyboard_escape_skips_to_dialogue() {
        let mut app = headless_app();
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Escape);
        app.world_mut().run_schedule(Update);
        app.world_mut().run_schedule(FixedUpdate);
        assert_eq!(app.world().resource::<ActiveGame>().screen(), Screen::Dialogue);
    }

    #[test]
    fn losing_combat_requests_exit() {
        let mut app = headless_app();
        {
            let mut game = app.world_mut().resource_mut::<ActiveGame>();
            game.flow_mut().start_at(Screen::Combat);
            game.flow_mut().combat_mut().force_state(CombatState::Lose);
        }
        app.world_mut().run_schedule(FixedUpdate);
        assert_eq!(app.world().resource::<ActiveGame>().screen(), Screen::GameOver);
        assert!(app.should_exit().is_some());
    }
}
