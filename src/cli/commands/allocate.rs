//! Allocate command - carve a single subnet block

use super::CommandContext;
use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use vpcplan::network::{AllocationStrategy, Allocator, NetworkBlock};

/// Arguments for the allocate command
#[derive(Parser, Debug, Clone)]
pub struct AllocateArgs {
    /// Base CIDR block, e.g. 10.0.0.0/16
    pub base: String,

    /// Zero-based subnet index
    pub index: u32,

    /// Subnet prefix length
    #[arg(long, short = 'm', default_value = "28")]
    pub mask: u8,

    /// Allocation strategy (third-octet, bitwise)
    #[arg(long, default_value = "third-octet")]
    pub strategy: AllocationStrategy,
}

#[derive(Serialize)]
struct Allocation<'a> {
    base: &'a str,
    index: u32,
    mask: u8,
    strategy: AllocationStrategy,
    cidr_block: String,
}

impl AllocateArgs {
    /// Execute the allocate command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let result = self
            .base
            .parse::<NetworkBlock>()
            .and_then(|base| Allocator::new(base, self.mask))
            .and_then(|allocator| allocator.with_strategy(self.strategy).allocate(self.index));

        let block = match result {
            Ok(block) => block,
            Err(e) => return Ok(ctx.report(&e)),
        };

        tracing::debug!(
            "Allocated index {} of {} with {}: {}",
            self.index,
            self.base,
            self.strategy,
            block
        );

        if ctx.output.is_structured() {
            ctx.output.document(&Allocation {
                base: &self.base,
                index: self.index,
                mask: self.mask,
                strategy: self.strategy,
                cidr_block: block.to_string(),
            })?;
        } else {
            ctx.output.line(&block.to_string());
        }

        Ok(0)
    }
}
