//! CLI module for vpcplan
//!
//! This module provides the command-line interface: argument parsing,
//! VPC setting overrides and subcommand dispatch.

pub mod commands;
pub mod output;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use vpcplan::network::{AllocationStrategy, SubnetLayout};
use vpcplan::plan::VpcSettings;

/// vpcplan - deterministic VPC subnet planning
#[derive(Parser, Debug, Clone)]
#[command(name = "vpcplan")]
#[command(author = "Vpcplan Contributors")]
#[command(version)]
#[command(about = "Deterministic subnet CIDR allocation and VPC network planning", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "VPCPLAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output for scripting
    Json,
    /// YAML output
    Yaml,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Allocate a single subnet block
    Allocate(commands::allocate::AllocateArgs),

    /// Plan the VPC network and print subnets and apply order
    Plan(commands::plan::PlanArgs),

    /// Plan and resolve against a simulated engine, printing exported ids
    Preview(commands::preview::PreviewArgs),

    /// Validate configuration
    Validate(commands::validate::ValidateArgs),
}

/// VPC settings that can be overridden from the command line
#[derive(Args, Debug, Clone, Default)]
pub struct VpcArgs {
    /// VPC name
    #[arg(long)]
    pub name: Option<String>,

    /// Base CIDR block of the VPC
    #[arg(long)]
    pub cidr_block: Option<String>,

    /// Availability zones (comma separated)
    #[arg(long = "zones", value_delimiter = ',')]
    pub zones: Vec<String>,

    /// Subnet prefix length
    #[arg(long)]
    pub mask: Option<u8>,

    /// Maximum number of zones to use
    #[arg(long)]
    pub max_zones: Option<usize>,

    /// Subnet index layout (contiguous, interleaved, grouped)
    #[arg(long)]
    pub layout: Option<SubnetLayout>,

    /// Public subnet block for the grouped layout
    #[arg(long)]
    pub public_cidr_block: Option<String>,

    /// Private subnet block for the grouped layout
    #[arg(long)]
    pub private_cidr_block: Option<String>,

    /// Allocation strategy (third-octet, bitwise)
    #[arg(long)]
    pub strategy: Option<AllocationStrategy>,
}

impl VpcArgs {
    /// Apply the given flags on top of configured settings
    pub fn apply_to(&self, mut settings: VpcSettings) -> VpcSettings {
        if let Some(name) = &self.name {
            settings.name = name.clone();
        }
        if let Some(cidr) = &self.cidr_block {
            settings.cidr_block = cidr.clone();
        }
        if !self.zones.is_empty() {
            settings.availability_zones = self
                .zones
                .iter()
                .map(|z| z.trim().to_string())
                .filter(|z| !z.is_empty())
                .collect();
        }
        if let Some(mask) = self.mask {
            settings.subnet_mask = mask;
        }
        if let Some(max_zones) = self.max_zones {
            settings.max_zones = max_zones;
        }
        if let Some(layout) = self.layout {
            settings.layout = layout;
        }
        if let Some(cidr) = &self.public_cidr_block {
            settings.public_cidr_block = cidr.clone();
        }
        if let Some(cidr) = &self.private_cidr_block {
            settings.private_cidr_block = cidr.clone();
        }
        if let Some(strategy) = self.strategy {
            settings.strategy = strategy;
        }
        settings
    }
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }
}
