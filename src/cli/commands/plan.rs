//! Plan command - declare the VPC network and show what would be created

use super::CommandContext;
use crate::cli::VpcArgs;
use anyhow::Result;
use clap::Parser;
use vpcplan::plan::{NetworkPlan, NetworkPlanner};

/// Arguments for the plan command
#[derive(Parser, Debug, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub vpc: VpcArgs,
}

impl PlanArgs {
    /// Execute the plan command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let settings = self.vpc.apply_to(ctx.config.vpc.clone());

        let plan = match NetworkPlanner::new(settings.clone()).plan() {
            Ok(plan) => plan,
            Err(e) => return Ok(ctx.report(&e)),
        };

        if ctx.output.is_structured() {
            ctx.output.document(&plan)?;
            return Ok(0);
        }

        ctx.output.banner("VPC PLAN");
        ctx.output.line(&format!(
            "VPC '{}' {} ({} layout, {} allocation)",
            plan.name, plan.vpc_block, settings.layout, settings.strategy
        ));
        print_subnets(ctx, &plan);

        ctx.output.section("Apply order");
        let order = match plan.resources.execution_order() {
            Ok(order) => order,
            Err(e) => return Ok(ctx.report(&e)),
        };
        for (i, resource) in order.iter().enumerate() {
            let deps = plan.resources.dependencies_of(&resource.name);
            let line = if deps.is_empty() {
                format!("{:>3}. {} ({})", i + 1, resource.name, resource.kind)
            } else {
                format!(
                    "{:>3}. {} ({}) after {}",
                    i + 1,
                    resource.name,
                    resource.kind,
                    deps.join(", ")
                )
            };
            ctx.output.line(&line);
        }

        ctx.output.info(&format!("{} resources planned", plan.resources.len()));
        ctx.output.flush();
        Ok(0)
    }
}

/// Print the subnet table of a plan
pub fn print_subnets(ctx: &CommandContext, plan: &NetworkPlan) {
    if plan.public_subnets.is_empty() {
        ctx.output
            .hint("no availability zones configured; pass --zones or set vpc.availability_zones");
        return;
    }

    ctx.output.section("Subnets");
    let rows: Vec<Vec<String>> = plan
        .subnets()
        .map(|s| {
            vec![
                s.name.clone(),
                s.group.to_string(),
                s.zone.clone(),
                s.index.to_string(),
                s.cidr_block.to_string(),
            ]
        })
        .collect();
    ctx.output
        .table(&["Name", "Group", "Zone", "Index", "CIDR"], &rows);
}
