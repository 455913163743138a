//! CPU rendition of the smoke diffusion kernel
//!
//! Mirrors `SMOKE_SHADER_SOURCE` texel for texel: fragment coordinates are pixel
//! centres, row 0 is the bottom row, and sampling is nearest with clamped edges.
//! Used for headless runs and to pin down the behaviour of the shader in tests.

use crate::driver::{ DiffusionBackend, KernelUniforms };
use crate::error::{ Result, SmokeError };
use crate::source::SmokeSource;

pub type Texel = [f32; 4];

/// An RGBA float image, the CPU counterpart of a render target
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    width: u32,
    height: u32,
    texels: Vec<Texel>,
}

impl Field {
    pub fn new(width: u32, height: u32) -> Result<Field> {
        SmokeError::check_viewport(width, height)?;
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| SmokeError::Allocation(format!("{width}x{height} field")))?;

        Ok(Field {
            width,
            height,
            texels: vec![[0.0; 4]; len],
        })
    }

    /// A field where every texel holds `texel`
    pub fn filled(width: u32, height: u32, texel: Texel) -> Result<Field> {
        let mut field = Field::new(width, height)?;
        field.fill(texel);
        Ok(field)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// # Panics
    /// If `(x, y)` lies outside the field.
    pub fn get(&self, x: u32, y: u32) -> Texel {
        self.texels[self.index(x, y)]
    }

    /// # Panics
    /// If `(x, y)` lies outside the field.
    pub fn set(&mut self, x: u32, y: u32, texel: Texel) {
        let index = self.index(x, y);
        self.texels[index] = texel;
    }

    pub fn fill(&mut self, texel: Texel) {
        self.texels.iter_mut().for_each(|t| *t = texel);
    }

    /// Nearest sample at normalized coordinates, clamped to the edges
    pub fn sample(&self, u: f32, v: f32) -> Texel {
        let x = Field::texel_coordinate(u, self.width);
        let y = Field::texel_coordinate(v, self.height);
        self.get(x, y)
    }

    pub fn texels(&self) -> &[Texel] {
        &self.texels
    }

    /// Largest value in the red (density) channel
    pub fn max_density(&self) -> f32 {
        self.texels.iter().map(|t| t[0]).fold(f32::NEG_INFINITY, f32::max)
    }

    /// Sum of the red (density) channel
    pub fn total_density(&self) -> f32 {
        self.texels.iter().map(|t| t[0]).sum()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(x < self.width && y < self.height, "texel ({x}, {y}) outside {}x{}", self.width, self.height);
        y as usize * self.width as usize + x as usize
    }

    fn texel_coordinate(uv: f32, size: u32) -> u32 {
        let texel = (uv * size as f32).floor();
        if texel.is_nan() || texel < 0.0 {
            0
        } else {
            (texel as u32).min(size - 1)
        }
    }
}

/// Density added at `fragment` by the smoke source
///
/// A linear falloff disk: `strength * max(radius - distance, 0)`.
pub fn injection(source: &SmokeSource, fragment: [f32; 2], radius: f32) -> f32 {
    let dx = source.x - fragment[0];
    let dy = source.y - fragment[1];
    let distance = (dx * dx + dy * dy).sqrt();

    source.strength * (radius - distance).max(0.0)
}

/// Change of the red channel from the four neighbours of a texel
///
/// `base` is the already injected value of the texel itself.
pub fn diffusion_delta(
    uniforms: &KernelUniforms,
    base: f32,
    left: f32,
    right: f32,
    up: f32,
    down: f32,
) -> f32 {
    let params = &uniforms.params;
    params.diffuse_rate * params.time_step
        * (left + right + down * params.down_mult + up - params.up_mult * base)
}

/// Evaluate the kernel for the texel at `(x, y)` of the destination
pub fn diffuse_texel(
    front: &Field,
    x: u32,
    y: u32,
    uniforms: &KernelUniforms,
) -> Texel {
    let [width, height] = uniforms.resolution;
    let fragment = [x as f32 + 0.5, y as f32 + 0.5];
    let u = fragment[0] / width;
    let v = fragment[1] / height;

    let mut color = front.sample(u, v);
    color[0] += injection(&uniforms.source, fragment, uniforms.params.inject_radius);

    let x_pixel = 1.0 / width;
    let y_pixel = 1.0 / height;
    let right = front.sample(u + x_pixel, v)[0];
    let left = front.sample(u - x_pixel, v)[0];
    let up = front.sample(u, v + y_pixel)[0];
    // Absorbing floor
    let down = if v <= y_pixel {
        0.0
    } else {
        front.sample(u, v - y_pixel)[0]
    };

    color[0] += diffusion_delta(uniforms, color[0], left, right, up, down);
    color
}

/// Runs the kernel on [fields](Field) in memory
#[derive(Debug, Default)]
pub struct CpuBackend {
    passes: u64,
    #[cfg(test)]
    fail_next: bool,
}

impl CpuBackend {
    /// Number of diffusion passes executed so far
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Make the next diffusion pass fail without touching its target
    #[cfg(test)]
    pub fn fail_next_pass(&mut self) {
        self.fail_next = true;
    }
}

impl DiffusionBackend for CpuBackend {
    type Target = Field;

    fn allocate(&mut self, width: u32, height: u32) -> Result<Field> {
        Field::new(width, height)
    }

    fn release(&mut self, _target: &Field) {}

    fn clear(&mut self, target: &mut Field) -> Result<()> {
        target.fill([0.0; 4]);
        Ok(())
    }

    fn copy(&mut self, from: &Field, to: &mut Field) -> Result<()> {
        let width = to.width() as f32;
        let height = to.height() as f32;
        for y in 0..to.height() {
            for x in 0..to.width() {
                let texel = from.sample((x as f32 + 0.5) / width, (y as f32 + 0.5) / height);
                to.set(x, y, texel);
            }
        }

        Ok(())
    }

    fn diffuse(
        &mut self,
        front: &Field,
        back: &mut Field,
        uniforms: &KernelUniforms,
    ) -> Result<()> {
        #[cfg(test)]
        if std::mem::take(&mut self.fail_next) {
            return Err(SmokeError::Context("diffusion pass failed".into()));
        }

        uniforms.validate()?;
        for y in 0..back.height() {
            for x in 0..back.width() {
                back.set(x, y, diffuse_texel(front, x, y, uniforms));
            }
        }
        self.passes += 1;

        Ok(())
    }
}
