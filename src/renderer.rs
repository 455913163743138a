use web_sys::{
    WebGl2RenderingContext,
    WebGlBuffer,
};
use crate::driver::{ DiffusionBackend, KernelUniforms };
use crate::error::{ Result, SmokeError };
use crate::presenter::{ self, Layout, Mode };
use crate::shader_program::ShaderProgram;
use crate::shaders;
use crate::textures::TextureFramebuffer;

/// WebGL 2 implementation of the render targets, the kernel and the display pass
pub struct GlBackend {
    gl: WebGl2RenderingContext,
    smoke_program: ShaderProgram,
    display_program: ShaderProgram,
    copy_program: ShaderProgram,
    quad: WebGlBuffer,
}

impl GlBackend {
    pub fn new(gl: WebGl2RenderingContext) -> Result<GlBackend> {
        // Rendering into and filtering float textures
        gl.get_extension("EXT_color_buffer_float")?
            .ok_or_else(|| SmokeError::Context("EXT_color_buffer_float is not supported".into()))?;
        gl.get_extension("OES_texture_float_linear")?
            .ok_or_else(|| SmokeError::Context("OES_texture_float_linear is not supported".into()))?;
        gl.disable(WebGl2RenderingContext::BLEND);

        let smoke_program = ShaderProgram::new(
            &gl,
            shaders::SMOKE_SHADER_SOURCE,
        )?;
        let display_program = ShaderProgram::new(
            &gl,
            shaders::DISPLAY_SHADER_SOURCE,
        )?;
        let copy_program = ShaderProgram::new(
            &gl,
            shaders::COPY_SHADER_SOURCE,
        )?;

        let quad = GlBackend::init_quad_buffers(&gl)?;

        Ok(GlBackend {
            gl,
            smoke_program,
            display_program,
            copy_program,
            quad,
        })
    }

    fn init_quad_buffers(gl: &WebGl2RenderingContext) -> Result<WebGlBuffer> {
        let vertex_buffer = gl.create_buffer()
            .ok_or_else(|| SmokeError::Context("Failed to create buffer".into()))?;
        gl.bind_buffer(WebGl2RenderingContext::ARRAY_BUFFER, Some(&vertex_buffer));

        let vertices: [f32; 16] = [
            -1.0, -1.0, 0.0, 0.0,
             1.0, -1.0, 1.0, 0.0,
            -1.0,  1.0, 0.0, 1.0,
             1.0,  1.0, 1.0, 1.0,
        ];
        let vertices = js_sys::Float32Array::from(&vertices[..]);
        gl.buffer_data_with_array_buffer_view(
            WebGl2RenderingContext::ARRAY_BUFFER,
            &vertices,
            WebGl2RenderingContext::STATIC_DRAW,
        );

        gl.vertex_attrib_pointer_with_i32(
            0,
            2,
            WebGl2RenderingContext::FLOAT,
            false,
            16,
            0,
        );
        gl.vertex_attrib_pointer_with_i32(
            1,
            2,
            WebGl2RenderingContext::FLOAT,
            false,
            16,
            8,
        );

        gl.enable_vertex_attrib_array(0);
        gl.enable_vertex_attrib_array(1);

        Ok(vertex_buffer)
    }

    /// Draw the quad over the whole of `target`
    pub fn blit(
        gl: &WebGl2RenderingContext,
        target: &TextureFramebuffer,
    ) {
        gl.viewport(
            0,
            0,
            target.width() as i32,
            target.height() as i32,
        );
        gl.bind_framebuffer(WebGl2RenderingContext::FRAMEBUFFER, Some(target.buffer()));

        gl.draw_arrays(
            WebGl2RenderingContext::TRIANGLE_STRIP,
            0,
            4,
        );
    }

    /// Draw the latest frame onto the canvas
    ///
    /// The display clamps colors to [0, 1]; the stored density is never clamped.
    pub fn present(
        &self,
        front: &TextureFramebuffer,
        layout: Layout,
        mode: Mode,
    ) -> Result<()> {
        let gl = &self.gl;
        self.display_program.bind(gl);

        gl.uniform1f(
            self.display_program.uniform(shaders::U_DENSITY),
            match mode {
                Mode::DENSITY => 1.0,
                Mode::RAW => 0.0,
            },
        );
        gl.uniform1i(
            self.display_program.uniform(shaders::U_TEXTURE),
            front.bind(gl, 0)?,
        );

        gl.bind_framebuffer(WebGl2RenderingContext::FRAMEBUFFER, None);
        gl.clear_color(0.0, 0.0, 0.0, 1.0);
        gl.clear(WebGl2RenderingContext::COLOR_BUFFER_BIT);

        let (width, height) = (gl.drawing_buffer_width().max(0) as u32, gl.drawing_buffer_height().max(0) as u32);
        for panel in presenter::panels(layout, width, height) {
            gl.uniform1f(
                self.display_program.uniform(shaders::U_FLIP_X),
                if panel.flip_x { 1.0 } else { 0.0 },
            );
            gl.viewport(panel.x, panel.y, panel.width, panel.height);
            gl.draw_arrays(
                WebGl2RenderingContext::TRIANGLE_STRIP,
                0,
                4,
            );
        }

        Ok(())
    }

    pub fn context(&self) -> &WebGl2RenderingContext {
        &self.gl
    }
}

impl DiffusionBackend for GlBackend {
    type Target = TextureFramebuffer;

    fn allocate(&mut self, width: u32, height: u32) -> Result<TextureFramebuffer> {
        TextureFramebuffer::new(&self.gl, width, height)
    }

    fn release(&mut self, target: &TextureFramebuffer) {
        target.delete(&self.gl);
    }

    fn clear(&mut self, target: &mut TextureFramebuffer) -> Result<()> {
        let gl = &self.gl;
        gl.bind_framebuffer(WebGl2RenderingContext::FRAMEBUFFER, Some(target.buffer()));
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(WebGl2RenderingContext::COLOR_BUFFER_BIT);
        gl.bind_framebuffer(WebGl2RenderingContext::FRAMEBUFFER, None);

        Ok(())
    }

    fn copy(&mut self, from: &TextureFramebuffer, to: &mut TextureFramebuffer) -> Result<()> {
        let gl = &self.gl;
        self.copy_program.bind(gl);

        gl.uniform1i(
            self.copy_program.uniform(shaders::U_TEXTURE),
            from.bind(gl, 0)?,
        );

        GlBackend::blit(gl, to);
        gl.bind_framebuffer(WebGl2RenderingContext::FRAMEBUFFER, None);

        Ok(())
    }

    fn diffuse(
        &mut self,
        front: &TextureFramebuffer,
        back: &mut TextureFramebuffer,
        uniforms: &KernelUniforms,
    ) -> Result<()> {
        uniforms.validate()?;

        let gl = &self.gl;
        let params = &uniforms.params;
        self.smoke_program.bind(gl);

        gl.uniform1f(
            self.smoke_program.uniform(shaders::U_INJECT_RADIUS),
            params.inject_radius,
        );
        gl.uniform1f(
            self.smoke_program.uniform(shaders::U_DIFFUSE_RATE),
            params.diffuse_rate,
        );
        gl.uniform1f(
            self.smoke_program.uniform(shaders::U_TIME_STEP),
            params.time_step,
        );
        gl.uniform1f(
            self.smoke_program.uniform(shaders::U_DOWN_MULT),
            params.down_mult,
        );
        gl.uniform1f(
            self.smoke_program.uniform(shaders::U_UP_MULT),
            params.up_mult,
        );
        gl.uniform2fv_with_f32_array(
            self.smoke_program.uniform(shaders::U_RESOLUTION),
            &uniforms.resolution,
        );
        gl.uniform3fv_with_f32_array(
            self.smoke_program.uniform(shaders::U_SMOKE_SOURCE),
            &uniforms.source.as_array(),
        );
        gl.uniform1i(
            self.smoke_program.uniform(shaders::U_TEXTURE),
            front.bind(gl, 0)?,
        );

        GlBackend::blit(gl, back);
        gl.bind_framebuffer(WebGl2RenderingContext::FRAMEBUFFER, None);

        Ok(())
    }
}

impl Drop for GlBackend {
    fn drop(&mut self) {
        self.smoke_program.delete(&self.gl);
        self.display_program.delete(&self.gl);
        self.copy_program.delete(&self.gl);
        self.gl.delete_buffer(Some(&self.quad));
    }
}
