use colored::Colorize;
use ferret_common::utils::hex::ToLowerHex;
use ferret_exec::is_reversion;
use ferret_vm::{ExecutionResult, VmError};

use crate::exec::ExecReport;

/// Renders an outcome as a single line, e.g. `success 0x2a` or `revert 0x`.
pub fn describe_outcome(outcome: &ExecutionResult) -> String {
    match outcome {
        ExecutionResult::Success(output) => {
            format!("{} {}", "success".green(), output.to_lower_hex())
        }
        ExecutionResult::Failure(VmError::Revert(data)) => {
            format!("{} {}", "revert".yellow(), data.to_lower_hex())
        }
        ExecutionResult::Failure(error) if is_reversion(outcome) => {
            format!("{} ({})", "revert".yellow(), error)
        }
        // illegal and unknown failures reach `exec` as errors, never as outcomes
        ExecutionResult::Failure(error) => format!("{} ({})", "failure".red(), error),
    }
}

/// Prints a report of `ferret exec` to stdout.
pub fn print_report(report: &ExecReport) {
    if let Some(deployment) = &report.deployment {
        println!("{}: {}", "deployment".bold(), describe_outcome(deployment));
    }
    if let Some(call) = &report.call {
        println!("{}: {}", "call".bold(), describe_outcome(call));
    }

    for log in &report.logs {
        let topics: Vec<String> = log.topics.iter().map(ToLowerHex::to_lower_hex).collect();
        println!(
            "{}: {} [{}] {}",
            "log".bold(),
            log.address.to_lower_hex(),
            topics.join(", "),
            log.data.to_lower_hex()
        );
    }

    if let Some(coverage) = &report.coverage {
        println!(
            "{}: {} points across {} contracts",
            "coverage".bold(),
            coverage.points(),
            coverage.len()
        );
    }
}
