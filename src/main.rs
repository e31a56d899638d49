use bevy::log::{Level, LogPlugin};
use bevy::window::{MonitorSelection, WindowMode, WindowResolution};
use clap::Parser;
use gravitoy::cli::{Args, load_and_apply_config, validate_scenario};
use gravitoy::plugins::camera::CameraPlugin;
use gravitoy::plugins::canvas::CanvasPlugin;
use gravitoy::plugins::frame_limit::FrameLimitPlugin;
use gravitoy::plugins::simulation::SimulationPlugin;
use gravitoy::prelude::*;

fn main() -> AppExit {
    let args = Args::parse();

    let config = match load_and_apply_config(&args).and_then(|config| {
        validate_scenario(&config)?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return AppExit::from_code(1);
        }
    };

    if args.print_config {
        match config.to_toml() {
            Ok(toml_string) => {
                print!("{toml_string}");
                return AppExit::Success;
            }
            Err(e) => {
                eprintln!("Error: {e}");
                return AppExit::from_code(1);
            }
        }
    }

    let [width, height] = config.window.resolution;
    let mode = if config.window.fullscreen {
        WindowMode::BorderlessFullscreen(MonitorSelection::Primary)
    } else {
        WindowMode::Windowed
    };

    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: config.window.title.clone(),
                    resolution: WindowResolution::new(width as f32, height as f32),
                    mode,
                    ..default()
                }),
                // Closing goes through the simulation's own exit path
                close_when_requested: false,
                ..default()
            })
            .set(LogPlugin {
                level: if args.verbose { Level::DEBUG } else { Level::INFO },
                filter: if args.verbose {
                    String::from("wgpu=error,naga=warn,gravitoy=debug")
                } else {
                    String::from("wgpu=error,naga=warn")
                },
                ..default()
            }),
    );

    app.insert_resource(ClearColor(config.window.background.into()));
    app.add_plugins((
        SimulationPlugin::with_config(config),
        CameraPlugin,
        CanvasPlugin,
        FrameLimitPlugin,
    ));

    info!(
        "gravitoy {} (built {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_DATE")
    );

    app.run()
}
