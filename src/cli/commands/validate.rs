//! Validate command - check configuration and address capacity

use super::CommandContext;
use crate::cli::VpcArgs;
use anyhow::Result;
use clap::Parser;
use vpcplan::network::SubnetGroup;
use vpcplan::plan::NetworkPlanner;

/// Arguments for the validate command
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub vpc: VpcArgs,
}

impl ValidateArgs {
    /// Execute the validate command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let settings = self.vpc.apply_to(ctx.config.vpc.clone());

        let checked = NetworkPlanner::new(settings.clone())
            .plan()
            .and_then(|plan| {
                settings
                    .allocator_for(SubnetGroup::Public)
                    .map(|allocator| (allocator, plan))
            });

        let (allocator, plan) = match checked {
            Ok(checked) => checked,
            Err(e) => return Ok(ctx.report(&e)),
        };

        let subnets = plan.subnets().count();
        let scope = if settings.layout.shares_index_space() {
            ""
        } else {
            " per group"
        };

        if ctx.output.is_structured() {
            ctx.output.document(&serde_json::json!({
                "valid": true,
                "name": plan.name,
                "cidr_block": plan.vpc_block,
                "zones": settings.zones(),
                "subnets": subnets,
                "layout": settings.layout,
                "capacity": allocator.capacity(),
                "capacity_per_group": !settings.layout.shares_index_space(),
            }))?;
        } else {
            ctx.output.success(&format!(
                "VPC '{}' {}: {} zones, {} subnets, room for {} subnet indices{}",
                plan.name,
                plan.vpc_block,
                settings.zones().len(),
                subnets,
                allocator.capacity(),
                scope
            ));
        }

        Ok(0)
    }
}
