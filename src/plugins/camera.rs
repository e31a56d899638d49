//! Camera plugin - Self-contained plugin pattern
//!
//! Spawns the orthographic 2D camera the canvas is drawn through. World origin
//! sits at the center of the window, so the surface layout only needs to flip
//! and offset coordinates.

use crate::prelude::*;

/// Plugin that handles camera setup
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera);
    }
}

/// Spawns the main camera with the configured antialiasing
fn spawn_camera(mut commands: Commands, config: Res<SimulationConfig>) {
    commands.spawn((Name::new("Main Camera"), Camera2d, config.window.msaa()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawns_single_camera_with_configured_msaa() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);

        let mut config = SimulationConfig::default();
        config.window.msaa_samples = 4;
        app.insert_resource(config);
        app.add_plugins(CameraPlugin);
        app.update();

        let mut query = app.world_mut().query_filtered::<&Msaa, With<Camera2d>>();
        let samples: Vec<Msaa> = query.iter(app.world()).copied().collect();
        assert_eq!(samples, vec![Msaa::Sample4]);
    }
}
