//! Index assignment for public and private subnet groups.
//!
//! Every subnet carved from one base block needs its own index. The layout
//! decides which index each (group, position) pair receives so that the two
//! groups never collide, either by splitting one index space or by giving
//! each group a block of its own.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The two subnet groups of a VPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubnetGroup {
    /// Routed to the internet gateway, public IPs on launch
    Public,
    /// No direct internet route
    Private,
}

impl SubnetGroup {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SubnetGroup::Public => "public",
            SubnetGroup::Private => "private",
        }
    }

    /// Whether instances launched in this group get a public IP.
    pub fn map_public_ip_on_launch(&self) -> bool {
        matches!(self, SubnetGroup::Public)
    }
}

impl fmt::Display for SubnetGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How public and private subnets are assigned allocation indices.
///
/// With `N` zones:
///
/// | Layout | Public | Private | Index space |
/// |--------|--------|---------|-------------|
/// | `contiguous` (default) | `0..N` | `N..2N` | VPC block |
/// | `interleaved` | `0, 2, 4, ..` | `1, 3, 5, ..` | VPC block |
/// | `grouped` | `0..N` | `0..N` | one block per group |
///
/// The layouts give different address plans for the same input, so a
/// deployed VPC must keep the layout it was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubnetLayout {
    /// Public block first, private block offset by the zone count.
    #[default]
    Contiguous,
    /// Even indices public, odd indices private.
    Interleaved,
    /// Each group is carved from its own block, both starting at index 0.
    Grouped,
}

impl SubnetLayout {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SubnetLayout::Contiguous => "contiguous",
            SubnetLayout::Interleaved => "interleaved",
            SubnetLayout::Grouped => "grouped",
        }
    }

    /// Whether both groups draw indices from the same block.
    pub fn shares_index_space(&self) -> bool {
        !matches!(self, SubnetLayout::Grouped)
    }

    /// Index for the subnet at zero-based `position` within `group`.
    ///
    /// Saturates at `u32::MAX`, which every allocator reports as exhausted.
    pub fn index_for(&self, group: SubnetGroup, position: usize, zone_count: usize) -> u32 {
        let index = match (self, group) {
            (SubnetLayout::Contiguous, SubnetGroup::Public) => Some(position),
            (SubnetLayout::Contiguous, SubnetGroup::Private) => zone_count.checked_add(position),
            (SubnetLayout::Interleaved, SubnetGroup::Public) => position.checked_mul(2),
            (SubnetLayout::Interleaved, SubnetGroup::Private) => position
                .checked_mul(2)
                .and_then(|i| i.checked_add(1)),
            (SubnetLayout::Grouped, _) => Some(position),
        };
        index
            .and_then(|i| u32::try_from(i).ok())
            .unwrap_or(u32::MAX)
    }

    /// All indices of `group` for `zone_count` zones, in position order.
    pub fn indices(&self, group: SubnetGroup, zone_count: usize) -> Vec<u32> {
        (0..zone_count)
            .map(|position| self.index_for(group, position, zone_count))
            .collect()
    }
}

impl fmt::Display for SubnetLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubnetLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contiguous" => Ok(SubnetLayout::Contiguous),
            "interleaved" => Ok(SubnetLayout::Interleaved),
            "grouped" => Ok(SubnetLayout::Grouped),
            _ => Err(format!(
                "Invalid subnet layout '{}'. Valid layouts: contiguous, interleaved, grouped",
                s
            )),
        }
    }
}
