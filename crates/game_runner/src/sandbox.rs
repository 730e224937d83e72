use bevy::prelude::*;
use core_game::{ActiveGame, Screen};

/// Starts the game on a chosen screen instead of the opening cutscene, for
/// working on one screen without replaying the story up to it.
pub struct SandboxPlugin {
    start: Option<String>,
}

impl SandboxPlugin {
    pub fn from_env() -> Self {
        Self {
            start: std::env::var("SANDBOX_SCENE").ok(),
        }
    }
}

impl Plugin for SandboxPlugin {
    fn build(&self, app: &mut App) {
        let scene = SandboxScene::resolve(self.start.as_deref());
        app.insert_resource(scene)
            .add_systems(Startup, apply_sandbox_scene);
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct SandboxScene {
    pub requested: Option<String>,
    pub screen: Screen,
}

impl SandboxScene {
    fn resolve(requested: Option<&str>) -> Self {
        let screen = requested
            .and_then(Screen::parse)
            .unwrap_or(Screen::Cutscene);
        Self {
            requested: requested.map(str::to_owned),
            screen,
        }
    }
}

fn apply_sandbox_scene(scene: Res<SandboxScene>, mut game: ResMut<ActiveGame>) {
    match scene.requested.as_deref() {
        Some(name) if Screen::parse(name).is_none() => warn!(
            target: "sandbox",
            "Unknown SANDBOX_SCENE {name:?}; expected cutscene, explore, dialogue or combat"
        ),
        _ => info!(target: "sandbox", "Starting on the {} screen", scene.screen.name()),
    }
    if scene.screen != Screen::Cutscene {
        game.flow_mut().start_at(scene.screen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_scene_falls_back_to_cutscene() {
        assert_eq!(SandboxScene::resolve(Some("credits")).screen, Screen::Cutscene);
        assert_eq!(SandboxScene::resolve(None).screen, Screen::Cutscene);
        assert_eq!(SandboxScene::resolve(Some("combat")).screen, Screen::Combat);
    }
}
