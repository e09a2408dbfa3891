//! IPv4 network block value type.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An IPv4 network written as `A.B.C.D/P`.
///
/// The base address is stored exactly as given. Host bits are not cleared,
/// because the third-octet allocation strategy carries the caller's fourth
/// octet through unchanged. Use [`NetworkBlock::network`] for the masked
/// address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NetworkBlock {
    address: Ipv4Addr,
    prefix_len: u8,
}

impl NetworkBlock {
    /// Create a block, rejecting prefix lengths above 32.
    pub fn new(address: Ipv4Addr, prefix_len: u8) -> Result<Self> {
        if prefix_len > 32 {
            return Err(Error::InvalidPrefix(prefix_len));
        }
        Ok(Self {
            address,
            prefix_len,
        })
    }

    /// Create a block from four octets and a prefix length.
    pub fn from_octets(octets: [u8; 4], prefix_len: u8) -> Result<Self> {
        Self::new(Ipv4Addr::from(octets), prefix_len)
    }

    /// The base address as written.
    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// The four octets of the base address.
    pub fn octets(&self) -> [u8; 4] {
        self.address.octets()
    }

    /// The prefix length.
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// The base address with host bits cleared.
    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.first())
    }

    /// The last address of the block.
    pub fn broadcast(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.last())
    }

    /// Number of addresses covered by the block.
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_len))
    }

    /// Whether the base address has any host bits set.
    pub fn has_host_bits(&self) -> bool {
        u32::from(self.address) != self.first()
    }

    /// Whether `other` lies entirely inside this block.
    pub fn contains(&self, other: &NetworkBlock) -> bool {
        other.first() >= self.first() && other.last() <= self.last()
    }

    /// Whether the two blocks share at least one address.
    pub fn overlaps(&self, other: &NetworkBlock) -> bool {
        self.first() <= other.last() && other.first() <= self.last()
    }

    fn mask(&self) -> u32 {
        // checked_shl keeps /0 from shifting by the full width
        u32::MAX.checked_shl(32 - u32::from(self.prefix_len)).unwrap_or(0)
    }

    fn first(&self) -> u32 {
        u32::from(self.address) & self.mask()
    }

    fn last(&self) -> u32 {
        self.first() | !self.mask()
    }
}

impl fmt::Display for NetworkBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for NetworkBlock {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim();
        let (_, prefix) = input
            .split_once('/')
            .ok_or_else(|| Error::invalid_cidr(s, "expected the form A.B.C.D/P"))?;

        if let Ok(prefix_len) = prefix.parse::<u8>() {
            if prefix_len > 32 {
                return Err(Error::InvalidPrefix(prefix_len));
            }
        }

        let net: Ipv4Net = input
            .parse()
            .map_err(|e| Error::invalid_cidr(s, format!("{}", e)))?;

        Ok(Self::from(net))
    }
}

impl TryFrom<String> for NetworkBlock {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<NetworkBlock> for String {
    fn from(block: NetworkBlock) -> Self {
        block.to_string()
    }
}

impl From<Ipv4Net> for NetworkBlock {
    fn from(net: Ipv4Net) -> Self {
        Self {
            address: net.addr(),
            prefix_len: net.prefix_len(),
        }
    }
}

impl TryFrom<NetworkBlock> for Ipv4Net {
    type Error = Error;

    fn try_from(block: NetworkBlock) -> Result<Self> {
        Ipv4Net::new(block.address, block.prefix_len)
            .map_err(|_| Error::InvalidPrefix(block.prefix_len))
    }
}
