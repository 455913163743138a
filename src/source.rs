/// Strength of the smoke source while the pointer is held down
pub const ACTIVE_STRENGTH: f32 = 0.1;

/// Point of density injection in render target pixels, origin at the bottom left
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SmokeSource {
    pub x: f32,
    pub y: f32,
    pub strength: f32,
}

impl SmokeSource {
    pub fn is_active(&self) -> bool {
        self.strength > 0.0
    }

    pub fn as_array(&self) -> [f32; 3] {
        [self.x, self.y, self.strength]
    }
}

/// Where the input layer puts `y = 0`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    TopLeft,
    BottomLeft,
}

/// A pointer event in the coordinates of the input layer
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Move { x: f32, y: f32 },
    Down,
    Up,
}

/// Translates pointer events into the [smoke source](SmokeSource) read by the kernel
///
/// Events are applied as they come; when several moves land between two frames
/// only the last one is seen by the kernel.
#[derive(Clone, Debug)]
pub struct PointerInput {
    origin: Origin,
    viewport_height: f32,
    pixel_ratio: f32,
    active_strength: f32,
    source: SmokeSource,
}

impl PointerInput {
    /// # Arguments
    /// * `origin` - Origin convention of the incoming events
    /// * `viewport_height` - Height of the render targets in pixels
    /// * `pixel_ratio` - Render target pixels per event pixel
    pub fn new(origin: Origin, viewport_height: u32, pixel_ratio: f32) -> PointerInput {
        PointerInput {
            origin,
            viewport_height: viewport_height as f32,
            pixel_ratio: PointerInput::sanitize_ratio(pixel_ratio),
            active_strength: ACTIVE_STRENGTH,
            source: SmokeSource::default(),
        }
    }

    pub fn with_active_strength(mut self, strength: f32) -> PointerInput {
        self.active_strength = strength.max(0.0);
        self
    }

    pub fn apply(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Move { x, y } => self.pointer_move(x, y),
            PointerEvent::Down => self.pointer_down(),
            PointerEvent::Up => self.pointer_up(),
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let x = x * self.pixel_ratio;
        let y = y * self.pixel_ratio;
        self.source.x = x;
        self.source.y = match self.origin {
            Origin::TopLeft => self.viewport_height - y,
            Origin::BottomLeft => y,
        };
    }

    pub fn pointer_down(&mut self) {
        self.source.strength = self.active_strength;
    }

    pub fn pointer_up(&mut self) {
        self.source.strength = 0.0;
    }

    /// Keep the flip and scaling in step with the render targets
    ///
    /// The last position is kept as is; the next move event lands in the new space.
    pub fn resize(&mut self, viewport_height: u32, pixel_ratio: f32) {
        self.viewport_height = viewport_height as f32;
        self.pixel_ratio = PointerInput::sanitize_ratio(pixel_ratio);
    }

    pub fn source(&self) -> &SmokeSource {
        &self.source
    }

    fn sanitize_ratio(pixel_ratio: f32) -> f32 {
        if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        }
    }
}
