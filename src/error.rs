use thiserror::Error;
use wasm_bindgen::JsValue;

/// Everything that can go wrong while setting up or running the smoke effect
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SmokeError {
    #[error("invalid viewport {width}x{height}, both dimensions must be positive")]
    InvalidViewport { width: u32, height: u32 },
    #[error("invalid parameter `{name}` = {value}, must be finite and non-negative")]
    InvalidParameter { name: &'static str, value: f32 },
    #[error("texture unit {0} is out of range (max 31)")]
    TextureUnit(u32),
    #[error("unable to allocate render target: {0}")]
    Allocation(String),
    #[error("shader error: {0}")]
    Shader(String),
    #[error("rendering context error: {0}")]
    Context(String),
    #[error("javascript error: {0}")]
    Js(String),
}

pub type Result<T> = std::result::Result<T, SmokeError>;

impl SmokeError {
    /// Fails with [`SmokeError::InvalidViewport`] unless both dimensions are non-zero
    pub fn check_viewport(width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(SmokeError::InvalidViewport { width, height });
        }

        Ok(())
    }
}

impl From<JsValue> for SmokeError {
    fn from(value: JsValue) -> Self {
        SmokeError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<SmokeError> for JsValue {
    fn from(error: SmokeError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_viewport_is_rejected() {
        assert_eq!(
            SmokeError::check_viewport(0, 10),
            Err(SmokeError::InvalidViewport { width: 0, height: 10 }),
        );
        assert!(SmokeError::check_viewport(10, 0).is_err());
        assert!(SmokeError::check_viewport(1, 1).is_ok());
    }

    #[test]
    fn messages_name_the_offending_value() {
        let error = SmokeError::InvalidParameter { name: "up_mult", value: -1.0 };
        assert!(error.to_string().contains("up_mult"));
        assert!(error.to_string().contains("-1"));
    }
}
