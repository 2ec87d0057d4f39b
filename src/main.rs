use bevy::prelude::*;

mod camera;
mod graph;
mod host;
mod input;
mod visual;

use bevy::window::WindowResolution;
use camera::CameraPlugin;
use host::HostPlugin;
use input::InputPlugin;

use crate::visual::plugin::GraphPlugin;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Concept Graph".into(),
            resolution: WindowResolution::new(1600, 900),
            resizable: true,
            ..default()
        }),
        ..default()
    }))
    .add_plugins(CameraPlugin)
    .add_plugins(InputPlugin)
    .add_plugins(GraphPlugin)
    .add_plugins(HostPlugin);

    app.run();
}
