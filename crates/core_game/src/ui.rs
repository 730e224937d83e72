use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::sprite::Anchor;
use bevy::utils::{HashMap, HashSet};

use crate::gameplay::ActiveGame;
use crate::render::{DrawCommand, DrawList, SpriteKey, TextAlign};
use crate::settings::{SimulationParams, WorldSettings};

const SPRITE_DIR: &str = "sprites";
const LAYER_STEP: f32 = 0.01;

/// Presents the active screen. Each frame the flow draws into a fresh
/// `DrawList`, which is then spawned as top-left anchored sprites and text.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::BLACK))
            .init_resource::<SpriteLibrary>()
            .add_systems(Startup, (spawn_camera, load_sprites, spawn_debug_hud))
            .add_systems(
                Update,
                (
                    track_sprite_loads,
                    present_frame.after(track_sprite_loads),
                    update_debug_hud,
                ),
            );
    }
}

#[derive(Resource, Debug, Default)]
pub struct SpriteLibrary {
    handles: HashMap<SpriteKey, Handle<Image>>,
    unavailable: HashSet<SpriteKey>,
}

impl SpriteLibrary {
    pub fn handle(&self, key: SpriteKey) -> Handle<Image> {
        self.handles.get(&key).cloned().unwrap_or_default()
    }

    pub fn is_unavailable(&self, key: SpriteKey) -> bool {
        self.unavailable.contains(&key)
    }

    fn mark_unavailable(&mut self, key: SpriteKey) -> bool {
        self.unavailable.insert(key)
    }
}

/// Tag for entities that only live for one presented frame.
#[derive(Component)]
struct FrameElement;

#[derive(Component)]
struct DebugHud;

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn load_sprites(mut library: ResMut<SpriteLibrary>, asset_server: Res<AssetServer>) {
    for key in SpriteKey::ALL {
        let handle = asset_server.load(format!("{SPRITE_DIR}/{}", key.file_name()));
        library.handles.insert(key, handle);
    }
}

fn track_sprite_loads(mut library: ResMut<SpriteLibrary>, asset_server: Res<AssetServer>) {
    let failed: Vec<SpriteKey> = library
        .handles
        .iter()
        .filter(|(key, handle)| {
            !library.is_unavailable(**key)
                && matches!(
                    asset_server.get_load_state(handle.id()),
                    Some(LoadState::Failed(_))
                )
        })
        .map(|(key, _)| *key)
        .collect();

    for key in failed {
        if library.mark_unavailable(key) {
            debug!(
                target: "core_game.ui",
                sprite = key.file_name(),
                "sprite failed to load; drawing placeholder"
            );
        }
    }
}

/// Maps a screen-space point (origin top-left, y down) onto the 2D camera's
/// world space (origin centre, y up).
fn to_world(position: Vec2, screen: Vec2, layer: f32) -> Vec3 {
    Vec3::new(position.x - screen.x / 2.0, screen.y / 2.0 - position.y, layer)
}

/// Text positions name the top edge of the line.
fn text_anchor(align: TextAlign) -> Anchor {
    match align {
        TextAlign::Left => Anchor::TopLeft,
        TextAlign::Center => Anchor::TopCenter,
    }
}

fn present_frame(
    mut commands: Commands,
    game: Res<ActiveGame>,
    settings: Res<WorldSettings>,
    library: Res<SpriteLibrary>,
    previous: Query<Entity, With<FrameElement>>,
) {
    for entity in previous.iter() {
        commands.entity(entity).despawn_recursive();
    }

    let screen = settings.screen_size;
    let mut frame = DrawList::new(screen).with_unavailable(library.unavailable.iter().copied());
    game.flow().draw(&mut frame);

    for (index, command) in frame.into_commands().into_iter().enumerate() {
        let layer = index as f32 * LAYER_STEP;
        match command {
            DrawCommand::Sprite(blit) => {
                commands.spawn((
                    Sprite {
                        image: library.handle(blit.sprite),
                        custom_size: Some(blit.size),
                        flip_x: blit.flip_x,
                        anchor: Anchor::TopLeft,
                        ..default()
                    },
                    Transform::from_translation(to_world(blit.position, screen, layer)),
                    FrameElement,
                ));
            }
            DrawCommand::Rect { rect, color } => {
                commands.spawn((
                    Sprite {
                        color,
                        custom_size: Some(rect.size()),
                        anchor: Anchor::TopLeft,
                        ..default()
                    },
                    Transform::from_translation(to_world(rect.min, screen, layer)),
                    FrameElement,
                ));
            }
            DrawCommand::Text {
                content,
                position,
                style,
            } => {
                let anchor = text_anchor(style.align);
                commands.spawn((
                    Text2d::new(content),
                    TextFont {
                        font_size: style.font_size,
                        ..default()
                    },
                    TextColor(style.color),
                    anchor,
                    Transform::from_translation(to_world(position, screen, layer)),
                    FrameElement,
                ));
            }
        }
    }
}

fn spawn_debug_hud(mut commands: Commands) {
    commands.spawn((
        Text::new("Booting…"),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgb(0.86, 0.93, 1.0)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(8.0),
            right: Val::Px(8.0),
            ..default()
        },
        GlobalZIndex(10),
        DebugHud,
    ));
}

fn update_debug_hud(
    mut text: Query<&mut Text, With<DebugHud>>,
    params: Option<Res<SimulationParams>>,
    game: Res<ActiveGame>,
    time: Res<Time>,
) {
    if let Ok(mut text) = text.get_single_mut() {
        let seed = params.map(|p| p.seed).unwrap_or_default();
        let content = format!(
            "screen: {}\nseed: {seed}\nframe Δt: {:.2}ms",
            game.screen().name(),
            time.delta_secs() * 1000.0
        );
        content.clone_into(&mut **text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_origin_maps_to_top_left_of_view() {
        let screen = Vec2::new(1280.0, 720.0);
        assert_eq!(to_world(Vec2::ZERO, screen, 0.0), Vec3::new(-640.0, 360.0, 0.0));
        assert_eq!(
            to_world(Vec2::new(1280.0, 720.0), screen, 1.0),
            Vec3::new(640.0, -360.0, 1.0)
        );
    }

    #[test]
    fn text_hangs_below_its_position() {
        assert_eq!(text_anchor(TextAlign::Left), Anchor::TopLeft);
        assert_eq!(text_anchor(TextAlign::Center), Anchor::TopCenter);
    }

    #[test]
    fn unavailable_sprites_are_reported_once() {
        let mut library = SpriteLibrary::default();
        assert!(library.mark_unavailable(SpriteKey::Wolf));
        assert!(!library.mark_unavailable(SpriteKey::Wolf));
        assert!(library.is_unavailable(SpriteKey::Wolf));
        assert_eq!(library.handle(SpriteKey::Wolf), Handle::default());
    }
}
