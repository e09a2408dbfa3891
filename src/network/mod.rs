//! IPv4 network arithmetic for subnet planning.
//!
//! - [`NetworkBlock`]: an `A.B.C.D/P` value type
//! - [`Allocator`] and [`allocate`]: deterministic subnet carving
//! - [`SubnetLayout`]: how public and private subnets share one index space

pub mod allocator;
pub mod block;
pub mod layout;

pub use allocator::{allocate, allocate_block, AllocationStrategy, Allocator};
pub use block::NetworkBlock;
pub use layout::{SubnetGroup, SubnetLayout};
