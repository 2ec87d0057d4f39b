use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::input::touch::{TouchInput, TouchPhase};
use bevy::prelude::*;
use bevy::window::{CursorLeft, CursorMoved};

/// Pixels per scroll line, so line and pixel wheels zoom at similar speeds
const LINE_HEIGHT_PX: f32 = 100.0;

pub struct InputPlugin;
impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CursorPos>()
            .add_message::<PointerEvent>()
            .add_message::<ZoomEvent>()
            .add_systems(
                Update,
                (
                    (track_cursor_pos, collect_pointer_events).chain(),
                    collect_zoom_events,
                )
                    .in_set(InputSet),
            );
    }
}

/// Systems that turn raw window input into [`PointerEvent`]s and [`ZoomEvent`]s
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputSet;

#[derive(Message, Debug, Clone)]
pub struct PointerEvent {
    /// Window (logical) coordinates: pixels from top-left
    pub position: Vec2,
    pub event_type: PointerEventType,
    /// 0 = mouse, >0 = touch id
    pub id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventType {
    Down,
    Move,
    Up,
    /// Pointer left the window; `position` is the last known one
    Leave,
}

/// Wheel input in pixel-equivalent units, positive = away from the graph
#[derive(Message, Debug, Clone, Copy)]
pub struct ZoomEvent {
    pub delta: f32,
}

#[derive(Resource, Default, Debug, Clone, Copy)]
struct CursorPos(pub Option<Vec2>);

fn track_cursor_pos(
    mut ev_cursor: MessageReader<CursorMoved>,
    mut ev_left: MessageReader<CursorLeft>,
    mut pos: ResMut<CursorPos>,
    mut out: MessageWriter<PointerEvent>,
) {
    for e in ev_cursor.read() {
        // Hover needs every move, not only drags
        pos.0 = Some(e.position);
        out.write(PointerEvent {
            position: e.position,
            event_type: PointerEventType::Move,
            id: 0,
        });
    }

    if ev_left.read().last().is_some() {
        out.write(PointerEvent {
            position: pos.0.unwrap_or_default(),
            event_type: PointerEventType::Leave,
            id: 0,
        });
        pos.0 = None;
    }
}

fn collect_pointer_events(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    cursor: Res<CursorPos>,
    mut touch_events: MessageReader<TouchInput>,
    mut out: MessageWriter<PointerEvent>,
) {
    if let Some(p) = cursor.0 {
        if mouse_buttons.just_pressed(MouseButton::Left) {
            out.write(PointerEvent {
                position: p,
                event_type: PointerEventType::Down,
                id: 0,
            });
        }
        if mouse_buttons.just_released(MouseButton::Left) {
            out.write(PointerEvent {
                position: p,
                event_type: PointerEventType::Up,
                id: 0,
            });
        }
    }

    for ev in touch_events.read() {
        let event_type = match ev.phase {
            TouchPhase::Started => PointerEventType::Down,
            TouchPhase::Moved => PointerEventType::Move,
            TouchPhase::Ended => PointerEventType::Up,
            TouchPhase::Canceled => PointerEventType::Leave,
        };
        out.write(PointerEvent {
            position: ev.position,
            event_type,
            id: ev.id,
        });
    }
}

fn collect_zoom_events(mut wheel: MessageReader<MouseWheel>, mut out: MessageWriter<ZoomEvent>) {
    for ev in wheel.read() {
        let scale = match ev.unit {
            MouseScrollUnit::Line => LINE_HEIGHT_PX,
            MouseScrollUnit::Pixel => 1.0,
        };
        // Scrolling down (negative y) pulls the camera back
        out.write(ZoomEvent {
            delta: -ev.y * scale,
        });
    }
}
