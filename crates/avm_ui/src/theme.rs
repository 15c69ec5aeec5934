//! Theme configuration for Audio Video MergeX.

use iced::Color;

/// Application colors.
pub mod colors {
    use super::Color;

    /// Status line after a fully successful batch.
    pub const SUCCESS: Color = Color::from_rgb(0.30, 0.65, 0.30);

    /// Failure list entries.
    pub const ERROR: Color = Color::from_rgb(0.80, 0.30, 0.30);

    pub const TEXT_SECONDARY: Color = Color::from_rgb(0.53, 0.53, 0.53);
}

/// Spacing constants.
pub mod spacing {
    /// Extra small spacing (4px)
    pub const XS: f32 = 4.0;
    /// Small spacing (8px)
    pub const SM: f32 = 8.0;
    /// Large spacing (16px)
    pub const LG: f32 = 16.0;
    /// Extra large spacing (24px)
    pub const XL: f32 = 24.0;
}

/// Font sizes.
pub mod font {
    /// Small font size
    pub const SM: f32 = 11.0;
    /// Normal font size
    pub const NORMAL: f32 = 13.0;
    /// Large font size
    pub const LG: f32 = 16.0;
}
