use crate::error::{ Result, SmokeError };
use crate::params::DiffusionParameters;
use crate::source::SmokeSource;
use crate::textures::RenderTargetPair;

/// Everything the kernel reads besides the front target
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KernelUniforms {
    pub resolution: [f32; 2],
    pub source: SmokeSource,
    pub params: DiffusionParameters,
}

impl KernelUniforms {
    pub fn validate(&self) -> Result<()> {
        let [width, height] = self.resolution;
        if !(width >= 1.0 && height >= 1.0 && width.is_finite() && height.is_finite()) {
            return Err(SmokeError::InvalidViewport {
                width: width.max(0.0) as u32,
                height: height.max(0.0) as u32,
            });
        }

        self.params.validate()
    }
}

/// Something that can hold render targets and run the diffusion kernel over them
pub trait DiffusionBackend {
    type Target;

    fn allocate(&mut self, width: u32, height: u32) -> Result<Self::Target>;

    fn release(&mut self, target: &Self::Target);

    /// Zero every texel of `target`
    fn clear(&mut self, target: &mut Self::Target) -> Result<()>;

    /// Stretch `from` over the whole of `to`
    fn copy(&mut self, from: &Self::Target, to: &mut Self::Target) -> Result<()>;

    /// Render one pass of the kernel reading `front` into every texel of `back`
    fn diffuse(
        &mut self,
        front: &Self::Target,
        back: &mut Self::Target,
        uniforms: &KernelUniforms,
    ) -> Result<()>;
}

/// Drives the ping-pong loop: one diffusion pass and one swap per tick
///
/// Frame `n` always reads the completed output of frame `n - 1`. A failed pass
/// leaves the front target untouched and skips the swap.
pub struct FeedbackLoop<B: DiffusionBackend> {
    backend: B,
    targets: RenderTargetPair<B::Target>,
    params: DiffusionParameters,
    frame: u64,
}

impl<B: DiffusionBackend> FeedbackLoop<B> {
    /// # Returns
    /// The loop with two cleared targets, or an error if the size or the parameters are invalid.
    pub fn new(
        mut backend: B,
        width: u32,
        height: u32,
        params: DiffusionParameters,
    ) -> Result<FeedbackLoop<B>> {
        params.validate()?;
        let targets = RenderTargetPair::allocate(&mut backend, width, height)?;

        log::info!("feedback loop started at {width}x{height}");

        Ok(FeedbackLoop {
            backend,
            targets,
            params,
            frame: 0,
        })
    }

    /// Advance the field by one frame
    pub fn tick(&mut self, source: &SmokeSource) -> Result<()> {
        let uniforms = self.uniforms(source);

        // RENDER PASS
        let (front, back) = self.targets.split();
        if let Err(error) = self.backend.diffuse(front, back, &uniforms) {
            log::warn!("frame {} skipped: {error}", self.frame);
            return Err(error);
        }

        // PUBLISH
        self.targets.swap();
        self.frame += 1;

        Ok(())
    }

    pub fn uniforms(&self, source: &SmokeSource) -> KernelUniforms {
        KernelUniforms {
            resolution: [self.targets.width() as f32, self.targets.height() as f32],
            source: *source,
            params: self.params,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == self.targets.width() && height == self.targets.height() {
            return Ok(());
        }

        log::debug!(
            "resizing targets {}x{} -> {width}x{height}",
            self.targets.width(),
            self.targets.height(),
        );
        self.targets.resize(&mut self.backend, width, height)
    }

    /// Drop all smoke
    pub fn clear(&mut self) -> Result<()> {
        for target in self.targets.targets_mut().iter_mut() {
            self.backend.clear(target)?;
        }

        Ok(())
    }

    pub fn set_parameters(&mut self, params: DiffusionParameters) -> Result<()> {
        params.validate()?;
        if !params.is_stable() {
            log::warn!("diffusion parameters {params:?} let the density grow without bound");
        }
        self.params = params;

        Ok(())
    }

    pub fn parameters(&self) -> &DiffusionParameters {
        &self.params
    }

    /// Number of completed ticks
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Target holding the latest completed frame
    pub fn front(&self) -> &B::Target {
        self.targets.front()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.targets.width(), self.targets.height())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: DiffusionBackend> Drop for FeedbackLoop<B> {
    fn drop(&mut self) {
        self.targets.release(&mut self.backend);
        log::info!("feedback loop released after {} frames", self.frame);
    }
}
