use thiserror::Error;

/// Errors raised while configuring a world or registering growth entities.
///
/// Degenerate geometry during stepping is not an error: a path that
/// collapses simply becomes extinct.
#[derive(Debug, Error)]
pub enum GrowthError {
    /// A numeric setting is outside its valid range.
    #[error("invalid setting `{name}` = {value}: {reason}")]
    InvalidSetting {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// The bounding rectangle has no area.
    #[error("bounds must have a positive width and height (got {width} x {height})")]
    EmptyBounds { width: f32, height: f32 },

    /// A source contour without any point cannot be resampled.
    #[error("source contour has no points")]
    EmptyContour,

    /// A settings document could not be parsed.
    #[error("failed to parse settings: {0}")]
    Config(#[from] toml::de::Error),
}
