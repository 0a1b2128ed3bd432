//! Baker Settings
//!
//! [`VatSettings`] is the only configurable surface of the baker. The
//! sampling policy is deliberately absent: it is fixed by
//! [`VatSamplingPolicy::POLICY`](crate::texture::VatSamplingPolicy::POLICY).
//!
//! Settings are plain serde data so bake tools can read them from their
//! project files:
//!
//! ```rust,ignore
//! let settings: VatSettings = serde_json::from_str(r#"{ "precision": "full" }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::packer::PixelPrecision;

/// Prefix of every VAT resource name.
pub const DEFAULT_NAME_PREFIX: &str = "VAT_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VatSettings {
    /// Requested pixel precision.
    pub precision: PixelPrecision,
    /// Prepended to the skeleton name to form the resource name.
    pub name_prefix: String,
    /// Switch to the other precision when the sink cannot sample the
    /// requested one, instead of failing.
    pub allow_precision_fallback: bool,
    /// Attach the resource name as the GPU debug label.
    pub label_textures: bool,
}

impl Default for VatSettings {
    fn default() -> Self {
        Self {
            precision: PixelPrecision::Half,
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            allow_precision_fallback: true,
            label_textures: true,
        }
    }
}
