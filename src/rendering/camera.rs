use bevy::prelude::*;

use crate::rendering::palette::BACKGROUND;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(BACKGROUND))
            .add_systems(Startup, setup_camera);
    }
}

fn setup_camera(mut commands: Commands) {
    // Camera space is window pixels with the origin at the center; see `Viewport::world_to_camera`.
    commands.spawn(Camera2d);
}
