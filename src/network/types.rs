//! Entity types of the assignment graph.

use std::fmt;
use std::str::FromStr;

use super::error::ConfigurationError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index of a site within its [`Network`](super::Network).
///
/// Ids are dense, stable for the lifetime of the network, and only
/// meaningful for the network that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteId(pub(crate) usize);

/// Index of a resource within its [`Network`](super::Network).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub(crate) usize);

impl SiteId {
    /// The raw index value.
    pub fn index(self) -> usize {
        self.0
    }
}

impl ResourceId {
    /// The raw index value.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Fixed consumption tier of a site, in power units.
///
/// The tier (and therefore the site's demand) is immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConsumptionTier {
    /// 10 power units.
    Low,
    /// 20 power units.
    Normal,
    /// 40 power units.
    High,
}

impl ConsumptionTier {
    /// Power drawn by a site of this tier.
    pub fn demand(self) -> u32 {
        match self {
            ConsumptionTier::Low => 10,
            ConsumptionTier::Normal => 20,
            ConsumptionTier::High => 40,
        }
    }

    /// Canonical upper-case name, as used by the textual network format.
    pub fn name(self) -> &'static str {
        match self {
            ConsumptionTier::Low => "LOW",
            ConsumptionTier::Normal => "NORMAL",
            ConsumptionTier::High => "HIGH",
        }
    }
}

impl FromStr for ConsumptionTier {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(ConsumptionTier::Low),
            "NORMAL" => Ok(ConsumptionTier::Normal),
            "HIGH" => Ok(ConsumptionTier::High),
            other => Err(ConfigurationError::UnknownTier(other.to_string())),
        }
    }
}

impl fmt::Display for ConsumptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A demand point with a fixed consumption tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub(crate) name: String,
    pub(crate) tier: ConsumptionTier,
}

impl Site {
    /// The site's identifier (stored upper-case).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The site's consumption tier.
    pub fn tier(&self) -> ConsumptionTier {
        self.tier
    }

    /// Power drawn by this site.
    pub fn demand(&self) -> u32 {
        self.tier.demand()
    }
}

/// A supply point with a capacity limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub(crate) name: String,
    pub(crate) capacity: u32,
}

impl Resource {
    /// The resource's identifier (stored upper-case).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resource's capacity in power units.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_demands() {
        assert_eq!(ConsumptionTier::Low.demand(), 10);
        assert_eq!(ConsumptionTier::Normal.demand(), 20);
        assert_eq!(ConsumptionTier::High.demand(), 40);
    }

    #[test]
    fn test_tier_from_str_case_insensitive() {
        assert_eq!("low".parse::<ConsumptionTier>(), Ok(ConsumptionTier::Low));
        assert_eq!(
            "Normal".parse::<ConsumptionTier>(),
            Ok(ConsumptionTier::Normal)
        );
        assert_eq!(" HIGH ".parse::<ConsumptionTier>(), Ok(ConsumptionTier::High));
    }

    #[test]
    fn test_tier_from_str_rejects_unknown() {
        let err = "MEDIUM".parse::<ConsumptionTier>().unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownTier("MEDIUM".to_string()));
    }

    #[test]
    fn test_tier_round_trips_through_name() {
        for tier in [
            ConsumptionTier::Low,
            ConsumptionTier::Normal,
            ConsumptionTier::High,
        ] {
            assert_eq!(tier.name().parse::<ConsumptionTier>(), Ok(tier));
        }
    }
}
