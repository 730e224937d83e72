mod sandbox;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin, WindowResolution};
use core_game::diagnostics::DiagnosticsPlugin;
use core_game::ui::UiPlugin;
use core_game::{CoreGamePlugin, WorldSettings};
use sandbox::SandboxPlugin;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(start))]
pub fn main() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let settings = WorldSettings::from_env();
    let mut app = App::new();
    configure_default_plugins(&mut app, &settings);
    app.insert_resource(settings).add_plugins((
        CoreGamePlugin,
        UiPlugin,
        DiagnosticsPlugin,
        SandboxPlugin::from_env(),
    ));
    app.run();
}

fn configure_default_plugins(app: &mut App, settings: &WorldSettings) {
    #[cfg(target_arch = "wasm32")]
    let window_plugin = {
        let _ = settings;
        WindowPlugin {
            primary_window: Some(Window {
                canvas: Some("#bevy-canvas".into()),
                fit_canvas_to_parent: true,
                present_mode: PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }
    };

    #[cfg(not(target_arch = "wasm32"))]
    let window_plugin = WindowPlugin {
        primary_window: Some(Window {
            title: "Corruption: The Journey".into(),
            present_mode: PresentMode::Fifo,
            resolution: WindowResolution::new(settings.screen_size.x, settings.screen_size.y),
            resizable: false,
            ..default()
        }),
        ..default()
    };

    let mut plugins = DefaultPlugins.set(window_plugin);

    #[cfg(target_arch = "wasm32")]
    {
        plugins = plugins.set(AssetPlugin {
            file_path: "assets".into(),
            ..default()
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        plugins = plugins.set(AssetPlugin {
            watch_for_changes_override: Some(true),
            ..default()
        });
    }

    app.add_plugins(plugins);
}
