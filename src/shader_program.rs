use web_sys::{
    WebGl2RenderingContext,
    WebGlProgram,
    WebGlShader,
    WebGlUniformLocation,
};
use std::collections::HashMap;
use crate::error::{ Result, SmokeError };
use crate::shaders;

pub struct ShaderProgram {
    program: WebGlProgram,
    uniforms: HashMap<String, WebGlUniformLocation>,
}

impl ShaderProgram {
    pub fn create_shader(
        gl: &WebGl2RenderingContext,
        shader_type: u32,
        source: &str,
    ) -> Result<WebGlShader> {
        let shader = gl.create_shader(shader_type)
            .ok_or_else(|| SmokeError::Shader("Unable to create shader object".into()))?;

        gl.shader_source(&shader, source);
        gl.compile_shader(&shader);

        if gl.get_shader_parameter(&shader, WebGl2RenderingContext::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
        {
            return Ok(shader);
        }

        let log = gl.get_shader_info_log(&shader)
            .unwrap_or_else(|| "Unknown error creating shader".into());
        gl.delete_shader(Some(&shader));
        Err(SmokeError::Shader(log))
    }

    /// Compile and link a program drawing through the shared quad vertex shader
    ///
    /// The quad attributes are pinned to locations 0 (coordinates) and 1 (uv).
    pub fn new(
        gl: &WebGl2RenderingContext,
        fragment_shader: &str,
    ) -> Result<ShaderProgram> {
        let vertex_shader = ShaderProgram::create_shader(
            gl,
            WebGl2RenderingContext::VERTEX_SHADER,
            shaders::VERTEX_SHADER_SOURCE,
        )?;

        let fragment_shader = ShaderProgram::create_shader(
            gl,
            WebGl2RenderingContext::FRAGMENT_SHADER,
            fragment_shader,
        )?;

        let shader_program = gl.create_program()
            .ok_or_else(|| SmokeError::Shader("Unable to create program".into()))?;
        gl.attach_shader(&shader_program, &vertex_shader);
        gl.attach_shader(&shader_program, &fragment_shader);
        gl.bind_attrib_location(&shader_program, 0, shaders::A_COORDINATES);
        gl.bind_attrib_location(&shader_program, 1, shaders::A_UV);
        gl.link_program(&shader_program);

        // Linked programs keep working after their shaders are flagged for deletion
        gl.delete_shader(Some(&vertex_shader));
        gl.delete_shader(Some(&fragment_shader));

        if !gl.get_program_parameter(&shader_program, WebGl2RenderingContext::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
        {
            let log = gl.get_program_info_log(&shader_program)
                .unwrap_or_else(|| "Unknown error linking program".into());
            gl.delete_program(Some(&shader_program));
            return Err(SmokeError::Shader(log));
        }

        let count = gl.get_program_parameter(&shader_program, WebGl2RenderingContext::ACTIVE_UNIFORMS)
            .as_f64()
            .ok_or_else(|| SmokeError::Shader("Unable to get program parameters".into()))? as u32;
        let mut uniforms = HashMap::with_capacity(count as usize);
        for i in 0..count {
            let Some(info) = gl.get_active_uniform(&shader_program, i) else {
                continue;
            };
            let name = info.name();
            if let Some(location) = gl.get_uniform_location(&shader_program, &name) {
                uniforms.insert(name, location);
            }
        }

        Ok(ShaderProgram {
            program: shader_program,
            uniforms,
        })
    }

    /// Location of an active uniform, `None` if the compiler dropped it
    pub fn uniform(&self, name: &str) -> Option<&WebGlUniformLocation> {
        self.uniforms.get(name)
    }

    pub fn bind(&self, gl: &WebGl2RenderingContext) {
        gl.use_program(Some(&self.program));
    }

    pub fn delete(&self, gl: &WebGl2RenderingContext) {
        gl.delete_program(Some(&self.program));
    }
}
