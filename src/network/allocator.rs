//! Deterministic subnet CIDR allocation.
//!
//! A subnet is identified by its zero-based index in allocation order. The
//! same `(base, index, mask)` triple always yields the same block, and two
//! distinct indices inside the allocator's capacity never yield overlapping
//! blocks (for the third-octet strategy this needs `mask >= 24`).
//!
//! ## Strategies
//!
//! | Strategy | Subnet `i` of `A.B.C.D/P` | Capacity |
//! |----------|---------------------------|----------|
//! | `third-octet` (default) | `A.B.(C+i).D/mask` | `256 - C` |
//! | `bitwise` | `network + i * 2^(32-mask)` | `2^(mask-P)` |
//!
//! The third-octet strategy reproduces the address plans already deployed by
//! the existing scripts and is kept as the default for that reason. It assumes
//! a base of at least /16 and a mask within the fourth octet. The bitwise
//! strategy is the general partitioning of the base block.
//!
//! ## Example
//!
//! ```
//! use vpcplan::network::allocate;
//!
//! assert_eq!(allocate("10.0.0.0/16", 3, 28).unwrap(), "10.0.3.0/28");
//! assert!(allocate("10.0.0.0/16", 256, 28).is_err());
//! ```

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

use super::NetworkBlock;
use crate::error::{Error, Result};

/// How subnet indices map onto the base block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllocationStrategy {
    /// Add the index to the third octet, keep every other octet.
    #[default]
    ThirdOctet,
    /// Split the base block into equal `2^(32-mask)` sized blocks.
    Bitwise,
}

impl AllocationStrategy {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationStrategy::ThirdOctet => "third-octet",
            AllocationStrategy::Bitwise => "bitwise",
        }
    }
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AllocationStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "third-octet" | "octet" => Ok(AllocationStrategy::ThirdOctet),
            "bitwise" => Ok(AllocationStrategy::Bitwise),
            _ => Err(format!(
                "Invalid allocation strategy '{}'. Valid strategies: third-octet, bitwise",
                s
            )),
        }
    }
}

/// An allocation session: one base block, one subnet mask, one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocator {
    base: NetworkBlock,
    mask: u8,
    strategy: AllocationStrategy,
}

impl Allocator {
    /// Create an allocator using the third-octet strategy.
    ///
    /// Fails if `mask` is above 32 or wider than the base block.
    pub fn new(base: NetworkBlock, mask: u8) -> Result<Self> {
        if mask > 32 {
            return Err(Error::InvalidPrefix(mask));
        }
        if mask < base.prefix_len() {
            return Err(Error::MaskWiderThanBlock { base, mask });
        }
        Ok(Self {
            base,
            mask,
            strategy: AllocationStrategy::default(),
        })
    }

    /// Use a different allocation strategy.
    pub fn with_strategy(mut self, strategy: AllocationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The parent block.
    pub fn base(&self) -> NetworkBlock {
        self.base
    }

    /// The prefix length of every allocated subnet.
    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// The active strategy.
    pub fn strategy(&self) -> AllocationStrategy {
        self.strategy
    }

    /// Number of indices that allocate successfully, i.e. indices `0..capacity`.
    pub fn capacity(&self) -> u64 {
        match self.strategy {
            AllocationStrategy::ThirdOctet => 256 - u64::from(self.base.octets()[2]),
            AllocationStrategy::Bitwise => {
                1u64 << (u32::from(self.mask) - u32::from(self.base.prefix_len()))
            }
        }
    }

    /// Allocate the subnet block for `index`.
    pub fn allocate(&self, index: u32) -> Result<NetworkBlock> {
        match self.strategy {
            AllocationStrategy::ThirdOctet => self.third_octet(index),
            AllocationStrategy::Bitwise => self.bitwise(index),
        }
    }

    fn exhausted(&self, index: u32) -> Error {
        Error::AddressSpaceExhausted {
            base: self.base,
            index,
        }
    }

    fn third_octet(&self, index: u32) -> Result<NetworkBlock> {
        let [a, b, c, d] = self.base.octets();
        let third = u32::from(c)
            .checked_add(index)
            .and_then(|v| u8::try_from(v).ok())
            .ok_or_else(|| self.exhausted(index))?;

        NetworkBlock::from_octets([a, b, third, d], self.mask)
    }

    fn bitwise(&self, index: u32) -> Result<NetworkBlock> {
        let block_size = 1u64 << (32 - u32::from(self.mask));
        let offset = u64::from(index) * block_size;

        offset
            .checked_add(block_size)
            .filter(|end| *end <= self.base.size())
            .ok_or_else(|| self.exhausted(index))?;

        let start = u64::from(u32::from(self.base.network())) + offset;
        let address = u32::try_from(start).map_err(|_| self.exhausted(index))?;

        let net = Ipv4Net::new(Ipv4Addr::from(address), self.mask)
            .map_err(|_| Error::InvalidPrefix(self.mask))?;
        Ok(NetworkBlock::from(net))
    }
}

/// Allocate subnet `index` of `base_block` with the third-octet strategy.
pub fn allocate_block(base_block: &NetworkBlock, index: u32, mask: u8) -> Result<NetworkBlock> {
    Allocator::new(*base_block, mask)?.allocate(index)
}

/// Allocate subnet `index` of the CIDR string `base_cidr`, returning `A.B.(C+index).D/mask`.
pub fn allocate(base_cidr: &str, index: u32, mask: u8) -> Result<String> {
    let base: NetworkBlock = base_cidr.parse()?;
    allocate_block(&base, index, mask).map(|block| block.to_string())
}
