//! Test utilities for plugin testing

use bevy::input::ButtonState;
use bevy::input::keyboard::{Key, KeyboardInput, NativeKey};
use bevy::input::mouse::MouseButtonInput;
use bevy::window::{CursorMoved, WindowCloseRequested, WindowEvent};

use crate::plugins::simulation::SimulationPlugin;
use crate::prelude::*;

/// Creates a headless app running the simulation with `config`
///
/// There is no window, so cursor positions sent with [`move_cursor`] are
/// already in surface coordinates.
pub fn create_test_app(config: SimulationConfig) -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);

    // Ordered window event stream normally registered by the window plugin
    app.add_event::<WindowEvent>();

    app.add_plugins(SimulationPlugin::with_config(config));

    app
}

/// Helper to simulate the cursor moving to `position`
pub fn move_cursor(app: &mut App, position: Vec2) {
    app.world_mut()
        .send_event(WindowEvent::CursorMoved(CursorMoved {
            window: Entity::PLACEHOLDER,
            position,
            delta: None,
        }));
}

/// Helper to simulate a mouse button press
pub fn press_mouse(app: &mut App, button: MouseButton) {
    send_mouse(app, button, ButtonState::Pressed);
}

/// Helper to simulate a mouse button release
pub fn release_mouse(app: &mut App, button: MouseButton) {
    send_mouse(app, button, ButtonState::Released);
}

fn send_mouse(app: &mut App, button: MouseButton, state: ButtonState) {
    app.world_mut()
        .send_event(WindowEvent::MouseButtonInput(MouseButtonInput {
            button,
            state,
            window: Entity::PLACEHOLDER,
        }));
}

/// Helper to simulate a key press
pub fn press_key(app: &mut App, key: KeyCode) {
    app.world_mut()
        .send_event(WindowEvent::KeyboardInput(KeyboardInput {
            key_code: key,
            logical_key: Key::Unidentified(NativeKey::Unidentified),
            state: ButtonState::Pressed,
            text: None,
            repeat: false,
            window: Entity::PLACEHOLDER,
        }));
}

/// Helper to simulate the window's close button
pub fn request_close(app: &mut App) {
    app.world_mut()
        .send_event(WindowEvent::WindowCloseRequested(WindowCloseRequested {
            window: Entity::PLACEHOLDER,
        }));
}
