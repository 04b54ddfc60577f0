//! Layer identity and naming.
//!
//! A layer is the logical grouping key for one raw-parts log and one
//! partition set. [`LayerNamingPolicy`] maps a [`LayerId`] to the two
//! physical collection names; the policy is an explicit value handed to the
//! partition store rather than process-wide configuration, so two stores can
//! coexist with different naming schemes.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical layer identifier: the owning product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerId {
    /// Product identifier (e.g., "BLUE_MARBLE").
    pub product_id: String,
    /// Product type (e.g., "Orthophoto").
    pub product_type: String,
}

impl LayerId {
    /// Create a layer identifier, validating the naming pattern.
    ///
    /// Both components must be non-empty, start with a letter, and contain
    /// only ASCII alphanumerics and underscores.
    pub fn new(product_id: impl Into<String>, product_type: impl Into<String>) -> Result<Self> {
        let product_id = product_id.into();
        let product_type = product_type.into();
        validate_component(&product_id)?;
        validate_component(&product_type)?;
        Ok(Self {
            product_id,
            product_type,
        })
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.product_id, self.product_type)
    }
}

fn validate_component(s: &str) -> Result<()> {
    let mut chars = s.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CoreError::invalid_layer_id(format!(
            "'{s}' must start with a letter and contain only [A-Za-z0-9_]"
        )))
    }
}

/// Resolved physical names for a layer's two backing collections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerName {
    /// Raw-parts collection name.
    pub parts: String,
    /// Partitions collection name.
    pub partitions: String,
}

impl LayerName {
    /// Store key shared by both collections of the layer.
    ///
    /// The partitions name is the unique half of the pair (the parts name is
    /// derived from the same stem), so it doubles as the key.
    pub fn key(&self) -> &str {
        &self.partitions
    }
}

/// Naming policy mapping layer identifiers to physical collection names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerNamingPolicy {
    /// Prefix applied to both collection names.
    pub prefix: String,
    /// Suffix of the raw-parts collection name.
    pub parts_suffix: String,
    /// Suffix of the partitions collection name.
    pub partitions_suffix: String,
}

impl Default for LayerNamingPolicy {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            parts_suffix: "_parts".to_string(),
            partitions_suffix: "_partitions".to_string(),
        }
    }
}

impl LayerNamingPolicy {
    /// Set the common prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Resolve a layer identifier to its physical collection names.
    ///
    /// Names are lowercased; physical naming is case-insensitive while layer
    /// identifiers are not.
    pub fn resolve(&self, layer: &LayerId) -> LayerName {
        let stem = format!(
            "{}{}_{}",
            self.prefix, layer.product_id, layer.product_type
        )
        .to_lowercase();
        LayerName {
            parts: format!("{stem}{}", self.parts_suffix),
            partitions: format!("{stem}{}", self.partitions_suffix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_id_accepts_valid_components() {
        let id = LayerId::new("BLUE_MARBLE", "Orthophoto").unwrap();
        assert_eq!(id.to_string(), "BLUE_MARBLE_Orthophoto");
    }

    #[test]
    fn layer_id_rejects_bad_components() {
        assert!(LayerId::new("", "Orthophoto").is_err());
        assert!(LayerId::new("1abc", "Orthophoto").is_err());
        assert!(LayerId::new("abc", "ortho-photo").is_err());
        assert!(LayerId::new("abc def", "Orthophoto").is_err());
    }

    #[test]
    fn naming_policy_resolves_lowercased_names() {
        let id = LayerId::new("BLUE_MARBLE", "Orthophoto").unwrap();
        let name = LayerNamingPolicy::default().resolve(&id);
        assert_eq!(name.parts, "blue_marble_orthophoto_parts");
        assert_eq!(name.partitions, "blue_marble_orthophoto_partitions");
        assert_eq!(name.key(), "blue_marble_orthophoto_partitions");
    }

    #[test]
    fn naming_policy_prefix() {
        let id = LayerId::new("World", "Raster").unwrap();
        let name = LayerNamingPolicy::default()
            .with_prefix("pp_")
            .resolve(&id);
        assert_eq!(name.parts, "pp_world_raster_parts");
        assert_eq!(name.partitions, "pp_world_raster_partitions");
    }
}
