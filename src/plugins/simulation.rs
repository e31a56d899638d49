//! Simulation plugin - Self-contained plugin pattern
//!
//! Runs one iteration of the frame loop per Bevy update: window input is
//! translated into surface events and dispatched to the bodies, physics
//! advances one step, and the scene is rendered into the canvas. There is no
//! fixed timestep; simulation speed follows the frame rate.

use crate::plugins::canvas::SurfaceLayout;
use crate::prelude::*;
use bevy::input::ButtonState;
use bevy::window::{PrimaryWindow, WindowEvent};

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Input,
    Physics,
    Render,
    Present,
}

pub struct SimulationPlugin {
    config: Option<SimulationConfig>,
}

impl SimulationPlugin {
    pub fn new() -> Self {
        Self { config: None }
    }

    pub fn with_config(config: SimulationConfig) -> Self {
        Self {
            config: Some(config),
        }
    }
}

impl Default for SimulationPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = self
            .config
            .clone()
            .unwrap_or_else(SimulationConfig::load_from_user_config);

        match config.to_toml() {
            Ok(toml_string) => {
                debug!("=== Current Configuration (TOML) ===\n{}", toml_string);
                debug!("=== End Configuration ===");
            }
            Err(e) => {
                error!("Failed to serialize configuration to TOML: {}", e);
            }
        }

        let layout = SurfaceLayout::new(config.window.size());
        let simulation = match Simulation::from_config(&config, layout.size) {
            Ok(simulation) => simulation,
            Err(e) => {
                error!("Invalid scenario: {e}. Starting with an empty simulation.");
                Simulation::new(config.window.background.into())
            }
        };

        app.insert_resource(config);
        app.insert_resource(layout);
        app.insert_resource(simulation);
        app.init_resource::<Canvas>();

        app.configure_sets(
            Update,
            (
                SimulationSet::Input,
                SimulationSet::Physics,
                SimulationSet::Render,
                SimulationSet::Present,
            )
                .chain(),
        );

        app.add_systems(
            Update,
            (
                dispatch_surface_events.in_set(SimulationSet::Input),
                step_simulation.in_set(SimulationSet::Physics),
                render_simulation.in_set(SimulationSet::Render),
            ),
        );
    }
}

/// Translates this frame's window input into surface events and hands them to the bodies.
///
/// Window events arrive as one ordered stream, so a press followed by a move
/// within the same frame grabs at the press position and then drags.
pub fn dispatch_surface_events(
    mut window_events: EventReader<WindowEvent>,
    windows: Query<&Window, With<PrimaryWindow>>,
    layout: Res<SurfaceLayout>,
    mut canvas: ResMut<Canvas>,
    mut simulation: ResMut<Simulation>,
    mut exit: EventWriter<AppExit>,
) {
    let window_size = windows
        .single()
        .map(|window| window.size())
        .unwrap_or(layout.size);
    let mut control = LoopControl::Continue;

    for window_event in window_events.read() {
        let event = match window_event {
            WindowEvent::CursorMoved(moved) => {
                let position = layout.from_window(moved.position, window_size);
                canvas.set_cursor(position);
                SurfaceEvent::CursorMoved { position }
            }
            WindowEvent::MouseButtonInput(input) => match input.state {
                ButtonState::Pressed => SurfaceEvent::MouseButtonPressed {
                    button: input.button,
                    position: canvas.cursor_position(),
                },
                ButtonState::Released => SurfaceEvent::MouseButtonReleased {
                    button: input.button,
                },
            },
            WindowEvent::KeyboardInput(input) if input.state == ButtonState::Pressed => {
                SurfaceEvent::KeyPressed {
                    code: input.key_code,
                }
            }
            WindowEvent::WindowCloseRequested(_) => SurfaceEvent::Closed,
            _ => continue,
        };

        if simulation.handle_event(&event, &*canvas) == LoopControl::Exit {
            control = LoopControl::Exit;
        }
    }

    if control == LoopControl::Exit {
        info!("Exit requested after {} frames", simulation.frame_count());
        exit.write(AppExit::Success);
    }
}

pub fn step_simulation(mut simulation: ResMut<Simulation>) {
    simulation.step();
}

pub fn render_simulation(simulation: Res<Simulation>, mut canvas: ResMut<Canvas>) {
    simulation.render(&mut *canvas);
}
