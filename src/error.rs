//! Error types for vpcplan.
//!
//! This module defines the error type shared by the allocator, the network
//! planner and the apply driver.

use crate::network::{NetworkBlock, SubnetGroup};
use thiserror::Error;

/// Result type alias for vpcplan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for vpcplan.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Address Errors
    // ========================================================================
    /// A CIDR string could not be parsed.
    #[error("Invalid CIDR block '{input}': {message}")]
    InvalidCidr {
        /// The rejected input
        input: String,
        /// Error message
        message: String,
    },

    /// Prefix length outside of 0..=32.
    #[error("Invalid prefix length /{0}: must be between 0 and 32")]
    InvalidPrefix(u8),

    /// Requested subnet mask is larger than its parent block.
    #[error("Subnet mask /{mask} is wider than its parent block {base}")]
    MaskWiderThanBlock {
        /// Parent block
        base: NetworkBlock,
        /// Requested mask
        mask: u8,
    },

    /// The subnet index does not fit in the parent block.
    #[error("Address space exhausted: subnet index {index} does not fit in {base}")]
    AddressSpaceExhausted {
        /// Parent block
        base: NetworkBlock,
        /// Rejected index
        index: u32,
    },

    // ========================================================================
    // Planning Errors
    // ========================================================================
    /// Allocation failed while planning a subnet group.
    #[error("Subnet allocation failed for {group} subnet {position} in zone '{zone}' (index {index})")]
    SubnetAllocation {
        /// Subnet group
        group: SubnetGroup,
        /// One-based position inside the group
        position: usize,
        /// Availability zone
        zone: String,
        /// Allocation index
        index: u32,
        /// Underlying allocator error
        #[source]
        source: Box<Error>,
    },

    /// Two planned subnets share addresses.
    #[error("Subnets '{first}' ({first_block}) and '{second}' ({second_block}) overlap")]
    OverlappingSubnets {
        /// First subnet name
        first: String,
        /// First subnet block
        first_block: NetworkBlock,
        /// Second subnet name
        second: String,
        /// Second subnet block
        second_block: NetworkBlock,
    },

    /// A planned subnet escapes the VPC block.
    #[error("Subnet '{subnet}' ({block}) lies outside VPC block {vpc}")]
    SubnetOutsideVpc {
        /// Subnet name
        subnet: String,
        /// Subnet block
        block: NetworkBlock,
        /// VPC block
        vpc: NetworkBlock,
    },

    /// VPC settings failed validation.
    #[error("Invalid VPC settings: {0}")]
    InvalidSettings(String),

    // ========================================================================
    // Resource Graph Errors
    // ========================================================================
    /// A resource was declared twice.
    #[error("Resource '{0}' is already declared")]
    DuplicateResource(String),

    /// A reference points at an undeclared resource.
    #[error("Resource '{referenced_by}' references unknown resource '{resource}'")]
    UnknownResource {
        /// Missing resource
        resource: String,
        /// Resource holding the reference
        referenced_by: String,
    },

    /// The resource graph contains a cycle.
    #[error("Dependency cycle detected: {0}")]
    DependencyCycle(String),

    // ========================================================================
    // Apply Errors
    // ========================================================================
    /// A reference could not be resolved during apply.
    #[error("Resource '{resource}' needs '{target}.{attribute}', which was not resolved")]
    UnresolvedReference {
        /// Resource being provisioned
        resource: String,
        /// Referenced resource
        target: String,
        /// Referenced attribute
        attribute: String,
    },

    /// The provisioning engine rejected a resource.
    #[error("Provisioning '{resource}' failed: {message}")]
    Provisioning {
        /// Resource name
        resource: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Creates a new invalid CIDR error.
    pub fn invalid_cidr(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidCidr {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Creates a new provisioning error.
    pub fn provisioning(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provisioning {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error, or the error it wraps, is address space exhaustion.
    pub fn is_exhausted(&self) -> bool {
        match self {
            Error::AddressSpaceExhausted { .. } => true,
            Error::SubnetAllocation { source, .. } => source.is_exhausted(),
            _ => false,
        }
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        if self.is_exhausted() {
            return 2;
        }
        match self {
            Error::InvalidCidr { .. }
            | Error::InvalidPrefix(_)
            | Error::MaskWiderThanBlock { .. }
            | Error::InvalidSettings(_) => 3,
            Error::OverlappingSubnets { .. } | Error::SubnetOutsideVpc { .. } => 4,
            Error::Provisioning { .. } | Error::UnresolvedReference { .. } => 5,
            _ => 1,
        }
    }
}
