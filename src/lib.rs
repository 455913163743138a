//! A ping-pong smoke diffusion effect that is compiled using `wasm-pack` and runs in the browser

pub mod driver;
pub mod error;
pub mod kernel;
pub mod listeners;
pub mod params;
pub mod presenter;
pub mod renderer;
pub mod source;
pub mod stability;
pub mod textures;
mod shaders;
mod shader_program;

use wasm_bindgen::prelude::*;
use web_sys::{ HtmlCanvasElement, WebGl2RenderingContext };
use crate::driver::FeedbackLoop;
use crate::listeners::{ PointerListeners, PointerQueue };
use crate::renderer::GlBackend;
use crate::source::{ Origin, PointerInput };

pub use crate::error::SmokeError;
pub use crate::params::{ parameter_ranges, DiffusionParameters };
pub use crate::presenter::{ Layout, Mode };
pub use crate::textures::RenderTargetPair;

#[wasm_bindgen]
/// Renderer for the smoke effect
pub struct SmokeRenderer {
    listeners: Option<PointerListeners>,
    canvas: HtmlCanvasElement,
    field: FeedbackLoop<GlBackend>,
    input: PointerInput,
    queue: PointerQueue,
    layout: Layout,
}

#[wasm_bindgen]
impl SmokeRenderer {
    /// Create a new renderer
    ///
    /// The render targets match the drawing buffer of the canvas.
    ///
    /// # Arguments
    /// * `canvas_id` - id of the canvas element
    /// * `parameters` - Initial [diffusion parameters](DiffusionParameters)
    ///
    /// # Returns
    /// The renderer object, or an error if WebGL2 or float render targets are unavailable,
    /// the canvas has no area, or the parameters are invalid.
    pub fn create(
        canvas_id: &str,
        parameters: DiffusionParameters,
    ) -> Result<SmokeRenderer, JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            log::debug!("logger already initialised");
        }

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| SmokeError::Context("no document".into()))?;
        let canvas = document.get_element_by_id(canvas_id)
            .ok_or_else(|| SmokeError::Context(format!("no element with id `{canvas_id}`")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| SmokeError::Context(format!("`{canvas_id}` is not a canvas")))?;

        let context_options = js_sys::Object::new();
        js_sys::Reflect::set(&context_options, &"antialias".into(), &JsValue::FALSE)?;
        js_sys::Reflect::set(&context_options, &"alpha".into(), &JsValue::FALSE)?;
        js_sys::Reflect::set(&context_options, &"depth".into(), &JsValue::FALSE)?;
        js_sys::Reflect::set(&context_options, &"stencil".into(), &JsValue::FALSE)?;

        let gl = match canvas.get_context_with_context_options("webgl2", &context_options) {
            Ok(Some(gl)) => gl.dyn_into::<WebGl2RenderingContext>()?,
            _ => return Err(JsValue::from_str("WebGL 2 seems to not be enabled in the browser")),
        };

        let (width, height) = (canvas.width(), canvas.height());
        let backend = GlBackend::new(gl)?;
        let field = FeedbackLoop::new(backend, width, height, parameters)?;
        let input = PointerInput::new(Origin::TopLeft, height, SmokeRenderer::pixel_ratio(&canvas));

        log::info!("smoke renderer created on #{canvas_id}");

        Ok(SmokeRenderer {
            listeners: None,
            canvas,
            field,
            input,
            queue: PointerQueue::default(),
            layout: Layout::FULL,
        })
    }

    /// Update the renderer
    ///
    /// Runs one diffusion pass and draws the result. Call once per animation frame.
    ///
    /// # Arguments
    /// * `pause` - Should the smoke be frozen?
    /// * `_time` - Current time in seconds, unused since every pass advances one fixed time step
    /// * `layout` - Panel [layout](Layout) of the canvas
    /// * `mode` - Color [mode](Mode) of the draw pass
    ///
    /// # Returns
    /// May return an error if drawing to the canvas fails. A failed diffusion pass is
    /// logged and the previous frame is drawn again.
    pub fn update(
        &mut self,
        pause: bool,
        _time: f32,
        layout: Layout,
        mode: Mode,
    ) -> Result<(), JsValue> {
        self.layout = layout;
        self.sync_size();

        // INPUT
        self.queue.apply_to(&mut self.input);

        // SIMULATION
        if !pause {
            let source = presenter::to_field(
                layout,
                (self.canvas.width(), self.canvas.height()),
                self.field.size(),
                self.input.source(),
            );
            if let Err(error) = self.field.tick(&source) {
                log::error!("diffusion pass failed, keeping the previous frame: {error}");
            }
        }

        // RENDER
        self.field.backend().present(self.field.front(), layout, mode)?;

        Ok(())
    }

    /// Resize the render targets to the current drawing buffer of the canvas
    ///
    /// Called by [update](SmokeRenderer::update) whenever the canvas size changes.
    ///
    /// # Returns
    /// An error if the canvas has no area; the old targets are kept in that case.
    pub fn resize(&mut self) -> Result<(), JsValue> {
        let (width, height) = (self.canvas.width(), self.canvas.height());
        self.field.resize(width, height)?;
        self.input.resize(height, SmokeRenderer::pixel_ratio(&self.canvas));

        Ok(())
    }

    /// Replace the diffusion parameters
    ///
    /// # Returns
    /// An error, leaving the current parameters in place, if any value is negative or not finite.
    pub fn set_parameters(&mut self, parameters: DiffusionParameters) -> Result<(), JsValue> {
        self.field.set_parameters(parameters)?;
        Ok(())
    }

    pub fn parameters(&self) -> DiffusionParameters {
        *self.field.parameters()
    }

    /// Move the smoke source
    ///
    /// # Arguments
    /// * `x` - Horizontal offset in CSS pixels from the left edge of the canvas
    /// * `y` - Vertical offset in CSS pixels from the top edge of the canvas
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.input.pointer_move(x, y);
    }

    /// Start emitting smoke
    pub fn pointer_down(&mut self) {
        self.input.pointer_down();
    }

    /// Stop emitting smoke
    pub fn pointer_up(&mut self) {
        self.input.pointer_up();
    }

    /// Listen to the pointer events of the canvas directly
    ///
    /// Replaces any listeners attached before.
    pub fn attach_listeners(&mut self) -> Result<(), JsValue> {
        self.listeners = None;
        self.listeners = Some(PointerListeners::attach(&self.canvas, &self.queue)?);
        Ok(())
    }

    /// Remove the listeners added by [attach_listeners](SmokeRenderer::attach_listeners)
    ///
    /// Pending events are still applied, then the source is released since no
    /// further release event can arrive.
    pub fn detach_listeners(&mut self) {
        self.listeners = None;
        self.queue.apply_to(&mut self.input);
        self.input.pointer_up();
    }

    /// Current smoke source as `[x, y, strength]` in render target pixels
    pub fn smoke_source(&self) -> Vec<f32> {
        self.input.source().as_array().to_vec()
    }

    /// Remove all smoke
    pub fn clear(&mut self) -> Result<(), JsValue> {
        self.field.clear()?;
        Ok(())
    }

    /// Number of diffusion passes completed so far
    pub fn frame(&self) -> f64 {
        self.field.frame() as f64
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }
}

impl SmokeRenderer {
    /// Drawing buffer pixels per CSS pixel
    fn pixel_ratio(canvas: &HtmlCanvasElement) -> f32 {
        match canvas.client_width() {
            0 => 1.0,
            client_width => canvas.width() as f32 / client_width as f32,
        }
    }

    /// Follow the drawing buffer and the CSS size of the canvas
    ///
    /// The CSS size can change on its own, so the pixel ratio is refreshed every frame.
    fn sync_size(&mut self) {
        if self.field.size() != (self.canvas.width(), self.canvas.height()) {
            if let Err(error) = self.field.resize(self.canvas.width(), self.canvas.height()) {
                log::warn!("keeping {:?} targets: {error:?}", self.field.size());
            }
        }

        let (_, height) = self.field.size();
        self.input.resize(height, SmokeRenderer::pixel_ratio(&self.canvas));
    }
}
