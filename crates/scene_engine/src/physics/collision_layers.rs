//! Layer masks for filtering scene queries
//!
//! Every entity carries an integer layer in `0..32`; a [`LayerMask`] selects a
//! set of layers with one bit per layer.

use serde::{Deserialize, Serialize};

/// Bit set of entity layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(u32);

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl LayerMask {
    /// Matches nothing
    pub const NONE: Self = Self(0);

    /// Matches every layer
    pub const ALL: Self = Self(u32::MAX);

    /// Mask from raw bits
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Mask selecting one layer; layers outside `0..32` select nothing
    pub fn layer(layer: i32) -> Self {
        match u32::try_from(layer) {
            Ok(shift) if shift < 32 => Self(1 << shift),
            _ => Self::NONE,
        }
    }

    /// Mask selecting several layers
    pub fn layers(layers: &[i32]) -> Self {
        layers.iter().fold(Self::NONE, |acc, &layer| acc.with(layer))
    }

    /// Add a layer
    #[must_use]
    pub fn with(self, layer: i32) -> Self {
        Self(self.0 | Self::layer(layer).0)
    }

    /// Remove a layer
    #[must_use]
    pub fn without(self, layer: i32) -> Self {
        Self(self.0 & !Self::layer(layer).0)
    }

    /// Whether an entity on `layer` passes the filter
    pub fn contains_layer(self, layer: i32) -> bool {
        self.0 & Self::layer(layer).0 != 0
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_bits() {
        assert_eq!(LayerMask::layer(0).bits(), 1);
        assert_eq!(LayerMask::layer(5).bits(), 1 << 5);
        assert_eq!(LayerMask::layer(-1), LayerMask::NONE);
        assert_eq!(LayerMask::layer(32), LayerMask::NONE);
    }

    #[test]
    fn test_combination() {
        let mask = LayerMask::layers(&[0, 3]);
        assert!(mask.contains_layer(0));
        assert!(mask.contains_layer(3));
        assert!(!mask.contains_layer(1));

        let mask = mask.without(0) | LayerMask::layer(1);
        assert!(!mask.contains_layer(0));
        assert!(mask.contains_layer(1));
    }

    #[test]
    fn test_default_matches_all() {
        assert!(LayerMask::default().contains_layer(31));
        assert!(!LayerMask::NONE.contains_layer(0));
    }
}
