use wasm_bindgen::prelude::*;
use crate::error::SmokeError;
use crate::stability;

/// Tuning metadata for one diffusion parameter
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParameterRange {
    pub name: &'static str,
    pub default: f32,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ParameterRange {
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }

        value.clamp(self.min, self.max)
    }
}

pub const INJECT_RADIUS: ParameterRange = ParameterRange {
    name: "inject_radius",
    default: 15.0,
    min: 0.0,
    max: 30.0,
    step: 0.1,
};

pub const DIFFUSE_RATE: ParameterRange = ParameterRange {
    name: "diffuse_rate",
    default: 8.0,
    min: 0.0,
    max: 12.0,
    step: 0.1,
};

// 1/60 s
pub const TIME_STEP: ParameterRange = ParameterRange {
    name: "time_step",
    default: 0.016,
    min: 0.0,
    max: 0.1,
    step: 0.001,
};

pub const DOWN_MULT: ParameterRange = ParameterRange {
    name: "down_mult",
    default: 3.0,
    min: 0.0,
    max: 6.0,
    step: 0.1,
};

pub const UP_MULT: ParameterRange = ParameterRange {
    name: "up_mult",
    default: 6.0,
    min: 0.0,
    max: 12.0,
    step: 0.1,
};

pub const RANGES: [ParameterRange; 5] = [
    INJECT_RADIUS,
    DIFFUSE_RATE,
    TIME_STEP,
    DOWN_MULT,
    UP_MULT,
];

#[derive(Clone, Copy, Debug, PartialEq)]
#[wasm_bindgen]
/// Constants of the smoke diffusion kernel
///
/// * `inject_radius` - Radius in pixels of the disk the smoke source injects into
/// * `diffuse_rate` - First diffusion multiplier
/// * `time_step` - Second diffusion multiplier, derived from a 60 Hz frame rate
/// * `down_mult` - Weight of the neighbour below (smoke rises)
/// * `up_mult` - Weight of the pixel itself, i.e. how fast density leaves it
pub struct DiffusionParameters {
    pub inject_radius: f32,
    pub diffuse_rate: f32,
    pub time_step: f32,
    pub down_mult: f32,
    pub up_mult: f32,
}

impl Default for DiffusionParameters {
    fn default() -> Self {
        DiffusionParameters {
            inject_radius: INJECT_RADIUS.default,
            diffuse_rate: DIFFUSE_RATE.default,
            time_step: TIME_STEP.default,
            down_mult: DOWN_MULT.default,
            up_mult: UP_MULT.default,
        }
    }
}

#[wasm_bindgen]
impl DiffusionParameters {
    #[wasm_bindgen(constructor)]
    pub fn new(
        inject_radius: f32,
        diffuse_rate: f32,
        time_step: f32,
        down_mult: f32,
        up_mult: f32,
    ) -> DiffusionParameters {
        DiffusionParameters {
            inject_radius,
            diffuse_rate,
            time_step,
            down_mult,
            up_mult,
        }
    }

    /// The tuned defaults of the effect
    pub fn defaults() -> DiffusionParameters {
        DiffusionParameters::default()
    }

    /// Copy of these parameters snapped into the ranges of the tuning surface
    pub fn clamped(&self) -> DiffusionParameters {
        DiffusionParameters {
            inject_radius: INJECT_RADIUS.clamp(self.inject_radius),
            diffuse_rate: DIFFUSE_RATE.clamp(self.diffuse_rate),
            time_step: TIME_STEP.clamp(self.time_step),
            down_mult: DOWN_MULT.clamp(self.down_mult),
            up_mult: UP_MULT.clamp(self.up_mult),
        }
    }

    /// Product of the two diffusion multipliers
    pub fn rate(&self) -> f32 {
        self.diffuse_rate * self.time_step
    }

    /// Whether repeated diffusion passes keep the density bounded
    ///
    /// See [stability](crate::stability) for the analysis.
    pub fn is_stable(&self) -> bool {
        stability::is_stable(self)
    }
}

impl DiffusionParameters {
    pub fn values(&self) -> [(&'static str, f32); 5] {
        [
            (INJECT_RADIUS.name, self.inject_radius),
            (DIFFUSE_RATE.name, self.diffuse_rate),
            (TIME_STEP.name, self.time_step),
            (DOWN_MULT.name, self.down_mult),
            (UP_MULT.name, self.up_mult),
        ]
    }

    /// Every parameter must be finite and non-negative
    pub fn validate(&self) -> Result<(), SmokeError> {
        for (name, value) in self.values() {
            if !value.is_finite() || value < 0.0 {
                return Err(SmokeError::InvalidParameter { name, value });
            }
        }

        Ok(())
    }
}

#[wasm_bindgen]
/// Describe the tuning surface
///
/// # Returns
/// An array of `{ name, default, min, max, step }` objects, one per [diffusion parameter](DiffusionParameters).
pub fn parameter_ranges() -> Result<js_sys::Array, JsValue> {
    let ranges = js_sys::Array::new();
    for range in RANGES.iter() {
        let entry = js_sys::Object::new();
        js_sys::Reflect::set(&entry, &"name".into(), &range.name.into())?;
        js_sys::Reflect::set(&entry, &"default".into(), &range.default.into())?;
        js_sys::Reflect::set(&entry, &"min".into(), &range.min.into())?;
        js_sys::Reflect::set(&entry, &"max".into(), &range.max.into())?;
        js_sys::Reflect::set(&entry, &"step".into(), &range.step.into())?;
        ranges.push(&entry);
    }

    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_tuning_table() {
        let params = DiffusionParameters::default();
        assert_eq!(params.inject_radius, 15.0);
        assert_eq!(params.diffuse_rate, 8.0);
        assert_eq!(params.time_step, 0.016);
        assert_eq!(params.down_mult, 3.0);
        assert_eq!(params.up_mult, 6.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn defaults_lie_inside_their_ranges() {
        for range in RANGES {
            assert!(range.min <= range.default && range.default <= range.max, "{}", range.name);
            assert!(range.step > 0.0);
        }
    }

    #[test]
    fn negative_and_non_finite_values_are_rejected() {
        let mut params = DiffusionParameters::default();
        params.down_mult = -0.5;
        assert_eq!(
            params.validate(),
            Err(SmokeError::InvalidParameter { name: "down_mult", value: -0.5 }),
        );

        let mut params = DiffusionParameters::default();
        params.time_step = f32::INFINITY;
        assert!(matches!(
            params.validate(),
            Err(SmokeError::InvalidParameter { name: "time_step", .. }),
        ));

        let mut params = DiffusionParameters::default();
        params.inject_radius = f32::NAN;
        assert!(params.validate().is_err());
    }

    #[test]
    fn zero_is_a_valid_value() {
        let params = DiffusionParameters::new(0.0, 0.0, 0.0, 0.0, 0.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn clamped_snaps_into_range() {
        let params = DiffusionParameters::new(100.0, -3.0, 0.05, f32::NAN, 12.0).clamped();
        assert_eq!(params.inject_radius, 30.0);
        assert_eq!(params.diffuse_rate, 0.0);
        assert_eq!(params.time_step, 0.05);
        assert_eq!(params.down_mult, DOWN_MULT.default);
        assert_eq!(params.up_mult, 12.0);
    }

    #[test]
    fn rate_is_the_product_of_both_multipliers() {
        let params = DiffusionParameters::default();
        assert!((params.rate() - 0.128).abs() < 1e-6);
    }
}
