//! Subcommands module for vpcplan CLI
//!
//! This module contains all the subcommand implementations.

pub mod allocate;
pub mod plan;
pub mod preview;
pub mod validate;

use crate::cli::output::OutputFormatter;
use std::error::Error as _;
use vpcplan::config::Config;
use vpcplan::Error;

/// Common context shared between commands
pub struct CommandContext {
    /// Configuration
    pub config: Config,
    /// Output formatter
    pub output: OutputFormatter,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &crate::cli::Cli, config: Config) -> Self {
        let use_color = !cli.no_color && config.output.color;
        let output = OutputFormatter::new(use_color, cli.output, cli.verbosity());

        Self { config, output }
    }

    /// Print a library error with its causes and return the exit code
    pub fn report(&self, err: &Error) -> i32 {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(&format!(": {}", cause));
            source = cause.source();
        }
        self.output.error(&message);

        match err {
            e if e.is_exhausted() => self.output.hint(
                "use fewer availability zones, a larger base block, or the bitwise strategy with a smaller mask",
            ),
            Error::OverlappingSubnets { .. } | Error::SubnetOutsideVpc { .. } => self.output.hint(
                "the third-octet strategy needs a /16 or larger VPC and a mask of /24 or longer",
            ),
            _ => {}
        }

        err.exit_code()
    }
}
