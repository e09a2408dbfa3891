//! Preview command - run plan and apply against a simulated engine

use super::CommandContext;
use crate::cli::VpcArgs;
use anyhow::Result;
use clap::Parser;
use vpcplan::apply::{apply, DryRunProvisioner};
use vpcplan::plan::NetworkPlanner;

/// Arguments for the preview command
#[derive(Parser, Debug, Clone)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub vpc: VpcArgs,
}

impl PreviewArgs {
    /// Execute the preview command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let settings = self.vpc.apply_to(ctx.config.vpc.clone());

        let plan = match NetworkPlanner::new(settings).plan() {
            Ok(plan) => plan,
            Err(e) => return Ok(ctx.report(&e)),
        };

        let provisioner = DryRunProvisioner::new();
        let outcome = match apply(&plan, &provisioner).await {
            Ok(outcome) => outcome,
            Err(e) => return Ok(ctx.report(&e)),
        };

        if ctx.output.is_structured() {
            ctx.output.document(&outcome)?;
            return Ok(0);
        }

        ctx.output.banner("VPC PREVIEW");
        super::plan::print_subnets(ctx, &plan);

        ctx.output.section("Resources");
        let rows: Vec<Vec<String>> = provisioner
            .provisioned()
            .iter()
            .map(|r| {
                vec![
                    r.name.clone(),
                    r.kind.type_name().to_string(),
                    outcome.resources.get(&r.name).cloned().unwrap_or_default(),
                ]
            })
            .collect();
        ctx.output.table(&["Name", "Type", "Id"], &rows);

        ctx.output.section("Outputs");
        ctx.output.line(&format!("vpcId            = {}", outcome.vpc_id));
        ctx.output.line(&format!(
            "publicSubnetIds  = [{}]",
            outcome.public_subnet_ids.join(", ")
        ));
        ctx.output.line(&format!(
            "privateSubnetIds = [{}]",
            outcome.private_subnet_ids.join(", ")
        ));

        ctx.output.flush();
        Ok(0)
    }
}
