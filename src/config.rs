//! Construction parameters for `BlockList`.

use crate::error::{ConfigError, Result};

/// Block capacity used when none is given.
pub const DEFAULT_BLOCK_CAPACITY: usize = 100;

/// Smallest block capacity the shift and split routines accept.
pub const MIN_BLOCK_CAPACITY: usize = 4;

/// Validated configuration for a `BlockList`.
///
/// A value of this type always carries a block capacity of at least
/// [`MIN_BLOCK_CAPACITY`], so building a list from it cannot fail.
///
/// # Example
///
/// ```
/// use block_list::{BlockListConfig, DEFAULT_BLOCK_CAPACITY};
///
/// assert_eq!(BlockListConfig::default().block_capacity(), DEFAULT_BLOCK_CAPACITY);
/// assert!(BlockListConfig::with_block_capacity(3).is_err());
/// assert!(BlockListConfig::with_block_capacity(-1).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawConfig"))]
pub struct BlockListConfig {
    block_capacity: usize,
}

impl BlockListConfig {
    /// Creates a configuration with the given block capacity.
    ///
    /// Fails with `InvalidConfiguration` when `capacity` is negative or
    /// smaller than [`MIN_BLOCK_CAPACITY`].
    pub fn with_block_capacity(capacity: isize) -> Result<Self> {
        let capacity =
            usize::try_from(capacity).map_err(|_| ConfigError::NegativeBlockCapacity(capacity))?;
        Ok(Self::checked(capacity)?)
    }

    fn checked(capacity: usize) -> std::result::Result<Self, ConfigError> {
        if capacity < MIN_BLOCK_CAPACITY {
            return Err(ConfigError::BlockCapacityTooSmall {
                capacity,
                minimum: MIN_BLOCK_CAPACITY,
            });
        }
        Ok(Self {
            block_capacity: capacity,
        })
    }

    /// Returns the number of slots every block is allocated with.
    #[inline]
    pub const fn block_capacity(&self) -> usize {
        self.block_capacity
    }
}

impl Default for BlockListConfig {
    fn default() -> Self {
        Self {
            block_capacity: DEFAULT_BLOCK_CAPACITY,
        }
    }
}

// Unvalidated mirror used so deserialization goes through `checked`.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawConfig {
    block_capacity: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<RawConfig> for BlockListConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> std::result::Result<Self, Self::Error> {
        Self::checked(raw.block_capacity)
    }
}
