use web_sys::{
    WebGl2RenderingContext,
    WebGlTexture,
    WebGlFramebuffer,
};
use crate::driver::DiffusionBackend;
use crate::error::{ Result, SmokeError };

/// A float texture together with the framebuffer that renders into it
pub struct TextureFramebuffer {
    texture: WebGlTexture,
    framebuffer: WebGlFramebuffer,
    width: u32,
    height: u32,
}

impl TextureFramebuffer {
    /// Allocate a cleared RGBA32F target
    ///
    /// Sampling is linear when minified and nearest when magnified, and clamps at the edges.
    pub fn new(
        gl: &WebGl2RenderingContext,
        width: u32,
        height: u32,
    ) -> Result<TextureFramebuffer> {
        SmokeError::check_viewport(width, height)?;

        gl.active_texture(WebGl2RenderingContext::TEXTURE0);
        let texture = gl.create_texture()
            .ok_or_else(|| SmokeError::Allocation("unable to create texture".into()))?;
        gl.bind_texture(WebGl2RenderingContext::TEXTURE_2D, Some(&texture));

        gl.tex_parameteri(
            WebGl2RenderingContext::TEXTURE_2D,
            WebGl2RenderingContext::TEXTURE_MIN_FILTER,
            WebGl2RenderingContext::LINEAR as i32,
        );
        gl.tex_parameteri(
            WebGl2RenderingContext::TEXTURE_2D,
            WebGl2RenderingContext::TEXTURE_MAG_FILTER,
            WebGl2RenderingContext::NEAREST as i32,
        );
        gl.tex_parameteri(
            WebGl2RenderingContext::TEXTURE_2D,
            WebGl2RenderingContext::TEXTURE_WRAP_S,
            WebGl2RenderingContext::CLAMP_TO_EDGE as i32,
        );
        gl.tex_parameteri(
            WebGl2RenderingContext::TEXTURE_2D,
            WebGl2RenderingContext::TEXTURE_WRAP_T,
            WebGl2RenderingContext::CLAMP_TO_EDGE as i32,
        );

        // WebGL zero-fills storage allocated without data
        gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_array_buffer_view(
            WebGl2RenderingContext::TEXTURE_2D,
            0,
            WebGl2RenderingContext::RGBA32F as i32,
            width as i32,
            height as i32,
            0,
            WebGl2RenderingContext::RGBA,
            WebGl2RenderingContext::FLOAT,
            None,
        )?;

        let framebuffer = match gl.create_framebuffer() {
            Some(framebuffer) => framebuffer,
            None => {
                gl.delete_texture(Some(&texture));
                return Err(SmokeError::Allocation("unable to create framebuffer".into()));
            }
        };
        gl.bind_framebuffer(WebGl2RenderingContext::FRAMEBUFFER, Some(&framebuffer));
        gl.framebuffer_texture_2d(
            WebGl2RenderingContext::FRAMEBUFFER,
            WebGl2RenderingContext::COLOR_ATTACHMENT0,
            WebGl2RenderingContext::TEXTURE_2D,
            Some(&texture),
            0,
        );

        let status = gl.check_framebuffer_status(WebGl2RenderingContext::FRAMEBUFFER);
        gl.bind_framebuffer(WebGl2RenderingContext::FRAMEBUFFER, None);

        let target = TextureFramebuffer {
            texture,
            framebuffer,
            width,
            height,
        };

        if status != WebGl2RenderingContext::FRAMEBUFFER_COMPLETE {
            target.delete(gl);
            return Err(SmokeError::Allocation(
                format!("framebuffer incomplete (status {status:#x})")
            ));
        }

        Ok(target)
    }

    /// Bind the texture to texture unit `id` and return the value for its sampler uniform
    pub fn bind(
        &self,
        gl: &WebGl2RenderingContext,
        id: u32,
    ) -> Result<i32> {
        if id >= 32 {
            return Err(SmokeError::TextureUnit(id));
        }

        gl.active_texture(WebGl2RenderingContext::TEXTURE0 + id);
        gl.bind_texture(WebGl2RenderingContext::TEXTURE_2D, Some(&self.texture));

        Ok(id as i32)
    }

    pub fn delete(&self, gl: &WebGl2RenderingContext) {
        gl.delete_texture(Some(&self.texture));
        gl.delete_framebuffer(Some(&self.framebuffer));
    }

    pub fn buffer(&self) -> &WebGlFramebuffer {
        &self.framebuffer
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Two equally sized render targets, one being read (front) while the other is written (back)
///
/// Swapping only flips an index, the targets themselves never move.
pub struct RenderTargetPair<T> {
    targets: [T; 2],
    front: usize,
    width: u32,
    height: u32,
}

impl<T> RenderTargetPair<T> {
    pub fn allocate<B>(
        backend: &mut B,
        width: u32,
        height: u32,
    ) -> Result<RenderTargetPair<T>>
    where
        B: DiffusionBackend<Target = T>,
    {
        SmokeError::check_viewport(width, height)?;

        let first = backend.allocate(width, height)?;
        let second = match backend.allocate(width, height) {
            Ok(target) => target,
            Err(error) => {
                backend.release(&first);
                return Err(error);
            }
        };

        Ok(RenderTargetPair {
            targets: [first, second],
            front: 0,
            width,
            height,
        })
    }

    /// Reallocate both targets, carrying the current front over stretched to the new size
    ///
    /// Does nothing when the size is unchanged.
    pub fn resize<B>(
        &mut self,
        backend: &mut B,
        width: u32,
        height: u32,
    ) -> Result<()>
    where
        B: DiffusionBackend<Target = T>,
    {
        if width == self.width && height == self.height {
            return Ok(());
        }

        let mut resized = RenderTargetPair::allocate(&mut *backend, width, height)?;

        // COPY
        let (_, back) = resized.split();
        if let Err(error) = backend.copy(self.front(), back) {
            resized.release(&mut *backend);
            return Err(error);
        }
        resized.swap();

        // DELETE AND SET
        self.release(backend);
        *self = resized;

        Ok(())
    }

    /// Exchange the roles of front and back
    ///
    /// # Returns
    /// The new front and back targets.
    pub fn swap(&mut self) -> (&T, &T) {
        self.front ^= 1;
        (self.front(), self.back())
    }

    /// Target holding the most recent completed frame
    pub fn front(&self) -> &T {
        &self.targets[self.front]
    }

    /// Target about to be overwritten
    pub fn back(&self) -> &T {
        &self.targets[self.front ^ 1]
    }

    /// Front to read from and back to write into, borrowed at the same time
    pub fn split(&mut self) -> (&T, &mut T) {
        let (first, second) = self.targets.split_at_mut(1);
        if self.front == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        }
    }

    pub fn targets_mut(&mut self) -> &mut [T; 2] {
        &mut self.targets
    }

    pub fn release<B>(&self, backend: &mut B)
    where
        B: DiffusionBackend<Target = T>,
    {
        for target in self.targets.iter() {
            backend.release(target);
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{ CpuBackend, Field };

    fn tagged(pair: &mut RenderTargetPair<Field>) {
        let targets = pair.targets_mut();
        targets[0].set(0, 0, [1.0, 0.0, 0.0, 0.0]);
        targets[1].set(0, 0, [2.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn allocation_rejects_empty_targets() {
        let mut backend = CpuBackend::default();
        assert!(matches!(
            RenderTargetPair::<Field>::allocate(&mut backend, 0, 4),
            Err(SmokeError::InvalidViewport { .. }),
        ));
    }

    #[test]
    fn swap_exchanges_roles() {
        let mut backend = CpuBackend::default();
        let mut pair = RenderTargetPair::allocate(&mut backend, 2, 2).unwrap();
        tagged(&mut pair);

        assert_eq!(pair.front().get(0, 0)[0], 1.0);
        assert_eq!(pair.back().get(0, 0)[0], 2.0);

        let (front, back) = pair.swap();
        assert_eq!(front.get(0, 0)[0], 2.0);
        assert_eq!(back.get(0, 0)[0], 1.0);
    }

    #[test]
    fn swapping_twice_restores_the_assignment() {
        let mut backend = CpuBackend::default();
        let mut pair = RenderTargetPair::allocate(&mut backend, 3, 3).unwrap();
        tagged(&mut pair);

        for _ in 0..5 {
            pair.swap();
            pair.swap();
            assert_eq!(pair.front().get(0, 0)[0], 1.0);
            assert_eq!(pair.back().get(0, 0)[0], 2.0);
        }
    }

    #[test]
    fn split_reads_front_and_writes_back() {
        let mut backend = CpuBackend::default();
        let mut pair = RenderTargetPair::allocate(&mut backend, 2, 2).unwrap();
        tagged(&mut pair);
        pair.swap();

        let (front, back) = pair.split();
        assert_eq!(front.get(0, 0)[0], 2.0);
        back.set(0, 0, [7.0, 0.0, 0.0, 0.0]);
        assert_eq!(pair.targets_mut()[0].get(0, 0)[0], 7.0);
    }

    #[test]
    fn resize_keeps_the_front_contents() {
        let mut backend = CpuBackend::default();
        let mut pair = RenderTargetPair::allocate(&mut backend, 2, 2).unwrap();
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            pair.targets_mut()[0].set(x, y, [0.5, 0.0, 0.0, 1.0]);
        }

        pair.resize(&mut backend, 4, 6).unwrap();
        assert_eq!((pair.width(), pair.height()), (4, 6));
        assert_eq!(pair.front().width(), 4);
        assert_eq!(pair.back().height(), 6);
        assert_eq!(pair.front().get(3, 5), [0.5, 0.0, 0.0, 1.0]);
        assert_eq!(pair.back().get(3, 5), [0.0; 4]);
    }

    #[test]
    fn resize_to_zero_keeps_the_old_pair() {
        let mut backend = CpuBackend::default();
        let mut pair = RenderTargetPair::allocate(&mut backend, 2, 2).unwrap();
        assert!(pair.resize(&mut backend, 0, 2).is_err());
        assert_eq!((pair.width(), pair.height()), (2, 2));
    }
}
