//! Context configuration.

use crate::style::FontDesc;

// ---------------------------------------------------------------------------
// ContextConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`Context`](crate::Context).
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// DPI at which `Pixels` values map 1:1 to device pixels.
    pub base_dpi: u32,
    /// DPI assigned to newly created surfaces.
    pub default_dpi: u32,
    /// Width of the resize bands along the edges of resizable elements.
    pub gripper_size: i32,
    /// Upper bound on validation passes. `None` loops until layout settles.
    pub max_validation_passes: Option<u32>,
    /// Font given to newly created elements.
    pub default_font: FontDesc,
    /// Width of the text cursor in device pixels.
    pub text_cursor_width: i32,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            base_dpi: 96,
            default_dpi: 96,
            gripper_size: 4,
            max_validation_passes: None,
            default_font: FontDesc::default(),
            text_cursor_width: 1,
        }
    }
}

impl ContextConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base DPI (builder).
    pub fn with_base_dpi(mut self, dpi: u32) -> Self {
        self.base_dpi = dpi.max(1);
        self
    }

    /// Set the DPI of new surfaces (builder).
    pub fn with_default_dpi(mut self, dpi: u32) -> Self {
        self.default_dpi = dpi.max(1);
        self
    }

    /// Set the resize gripper width (builder).
    pub fn with_gripper_size(mut self, size: i32) -> Self {
        self.gripper_size = size.max(0);
        self
    }

    /// Bound the number of validation passes (builder).
    pub fn with_max_validation_passes(mut self, passes: u32) -> Self {
        self.max_validation_passes = Some(passes);
        self
    }

    /// Set the default font (builder).
    pub fn with_default_font(mut self, font: FontDesc) -> Self {
        self.default_font = font;
        self
    }

    /// Set the text cursor width (builder).
    pub fn with_text_cursor_width(mut self, width: i32) -> Self {
        self.text_cursor_width = width.max(1);
        self
    }
}
