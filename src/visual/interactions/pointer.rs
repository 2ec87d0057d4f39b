use bevy::math::Vec2;

/// Movement (device pixels, per axis) below which a press+release is a click
pub const CLICK_SLOP_PX: f32 = 5.0;

/// Size of the surface the graph is drawn into, in device pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Viewport { width, height }
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Device coordinates (origin top-left, y down) to normalized
    /// coordinates in `[-1, 1]` with y up. `None` for a collapsed viewport.
    pub fn to_ndc(&self, device: Vec2) -> Option<Vec2> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some(Vec2::new(
            (device.x / self.width) * 2.0 - 1.0,
            -(device.y / self.height) * 2.0 + 1.0,
        ))
    }
}

/// Latest-value buffer for pointer input.
///
/// Input handlers write here at any time; the tick drains it. Nothing is
/// queued: a newer position replaces an older one, drag and wheel deltas
/// accumulate into a single value, and at most one click is pending.
#[derive(Debug, Default)]
pub struct PointerState {
    /// Normalized pointer position, `None` until the pointer first moves
    ndc: Option<Vec2>,
    pressed_at: Option<Vec2>,
    /// Furthest the pointer got from the press position, per axis
    max_excursion: Vec2,
    last_device: Vec2,
    drag: Vec2,
    wheel: f32,
    click: Option<Vec2>,
}

impl PointerState {
    pub fn press(&mut self, device: Vec2, viewport: &Viewport) {
        self.ndc = viewport.to_ndc(device);
        self.pressed_at = Some(device);
        self.max_excursion = Vec2::ZERO;
        self.last_device = device;
    }

    pub fn move_to(&mut self, device: Vec2, viewport: &Viewport) {
        self.ndc = viewport.to_ndc(device);
        if let Some(start) = self.pressed_at {
            self.max_excursion = self.max_excursion.max((device - start).abs());
            self.drag += device - self.last_device;
            self.last_device = device;
        }
    }

    /// Ends a press. Registers a click when the pointer never left
    /// [`CLICK_SLOP_PX`] of the press position on either axis.
    pub fn release(&mut self, device: Vec2, viewport: &Viewport) {
        self.ndc = viewport.to_ndc(device);
        let Some(start) = self.pressed_at.take() else {
            return;
        };

        let moved = self.max_excursion.max((device - start).abs());
        if moved.x < CLICK_SLOP_PX && moved.y < CLICK_SLOP_PX {
            self.click = self.ndc;
        }
    }

    /// Pointer left the surface: any drag in progress ends without a click
    /// and nothing stays hovered
    pub fn leave(&mut self) {
        self.ndc = None;
        self.pressed_at = None;
        self.max_excursion = Vec2::ZERO;
    }

    pub fn wheel(&mut self, delta: f32) {
        self.wheel += delta;
    }

    pub fn ndc(&self) -> Option<Vec2> {
        self.ndc
    }

    pub fn take_drag(&mut self) -> Vec2 {
        std::mem::take(&mut self.drag)
    }

    pub fn take_wheel(&mut self) -> f32 {
        std::mem::take(&mut self.wheel)
    }

    pub fn take_click(&mut self) -> Option<Vec2> {
        self.click.take()
    }
}
