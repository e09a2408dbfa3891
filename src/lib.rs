//! # vpcplan - Deterministic VPC Subnet Planning
//!
//! vpcplan carves subnets out of a VPC address block and declares the
//! networking resources around them (internet gateway, route tables,
//! associations) as a dependency graph for an external provisioning engine.
//!
//! ## Core Concepts
//!
//! - **Allocator**: maps `(base block, subnet index, mask)` to a subnet block,
//!   deterministically, failing with
//!   [`Error::AddressSpaceExhausted`](error::Error::AddressSpaceExhausted)
//!   instead of wrapping
//! - **Layout**: assigns indices to public and private subnets so the two
//!   groups never collide
//! - **Plan**: the declared resources and their attribute dependencies
//! - **Apply**: resolves a plan in dependency order through a
//!   [`Provisioner`](apply::Provisioner)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Config / CLI flags                      │
//! │                   (VpcSettings)                          │
//! └──────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                   NetworkPlanner                         │
//! │        SubnetLayout ──▶ Allocator ──▶ NetworkBlock       │
//! └──────────────────────────────────────────────────────────┘
//!                            │  NetworkPlan (ResourceGraph)
//!                            ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                      apply()                             │
//! │   topological order, reference resolution, Provisioner   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use vpcplan::prelude::*;
//!
//! # async fn run() -> Result<()> {
//! let settings = VpcSettings {
//!     availability_zones: vec!["us-east-1a".into(), "us-east-1b".into(), "us-east-1c".into()],
//!     ..VpcSettings::default()
//! };
//!
//! let plan = NetworkPlanner::new(settings).plan()?;
//! let outcome = apply(&plan, &DryRunProvisioner::new()).await?;
//! println!("{} -> {:?}", outcome.vpc_id, outcome.private_subnet_ids);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::apply::{apply, ApplyOutcome, DryRunProvisioner, Provisioner};
    pub use crate::error::{Error, Result};
    pub use crate::network::{
        allocate, allocate_block, AllocationStrategy, Allocator, NetworkBlock, SubnetGroup,
        SubnetLayout,
    };
    pub use crate::plan::{NetworkPlan, NetworkPlanner, PlannedSubnet, VpcSettings};
}

pub mod apply;
pub mod config;
pub mod error;
pub mod network;
pub mod plan;

pub use error::{Error, Result};

/// Version of the vpcplan library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
