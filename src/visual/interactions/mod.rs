pub mod picking;
pub mod pointer;

use bevy::prelude::*;

use crate::input::{PointerEvent, PointerEventType, ZoomEvent};
use crate::visual::view::GraphView;

pub use picking::{Activation, SelectionController};
pub use pointer::{CLICK_SLOP_PX, PointerState, Viewport};

/// Whether `event` comes from the pointer that currently owns the view.
///
/// The first pointer to press owns it until it is released or leaves; other
/// touches are ignored meanwhile. With nothing pressed every pointer may hover.
pub fn claim_pointer(owner: &mut Option<u64>, event: &PointerEvent) -> bool {
    if owner.is_some_and(|id| id != event.id) {
        return false;
    }
    match event.event_type {
        PointerEventType::Down => *owner = Some(event.id),
        PointerEventType::Up | PointerEventType::Leave => *owner = None,
        PointerEventType::Move => {}
    }
    true
}

/// System: hand window input to the mounted view as latest values
pub fn forward_pointer_input(
    mut pointer_events: MessageReader<PointerEvent>,
    mut zoom_events: MessageReader<ZoomEvent>,
    mut view: ResMut<GraphView>,
    mut owner: Local<Option<u64>>,
) {
    for event in pointer_events.read() {
        if !claim_pointer(&mut owner, event) {
            continue;
        }
        match event.event_type {
            PointerEventType::Down => view.pointer_pressed(event.position),
            PointerEventType::Move => view.pointer_moved(event.position),
            PointerEventType::Up => view.pointer_released(event.position),
            PointerEventType::Leave => view.pointer_left(),
        }
    }

    for zoom in zoom_events.read() {
        view.wheel(zoom.delta);
    }
}
