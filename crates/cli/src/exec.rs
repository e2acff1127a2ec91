use std::str::FromStr;

use alloy::primitives::{Address, Bytes};
use ferret_common::utils::strings::decode_hex;
use ferret_config::Configuration;
use ferret_exec::{execute_tx, execute_tx_with_coverage, CoverageMap, Transaction};
use ferret_vm::{Contract, ExecutionResult, Log, VM};
use tracing::{debug, info};

use crate::{args::ExecArgs, error::Error};

/// What `ferret exec` observed.
#[derive(Debug)]
pub struct ExecReport {
    /// The outcome of deploying the init code, with `--create`.
    pub deployment: Option<ExecutionResult>,

    /// The outcome of the call. Absent if the deployment failed.
    pub call: Option<ExecutionResult>,

    /// Logs emitted by the call.
    pub logs: Vec<Log>,

    /// The coverage recorded across both transactions, with `--coverage`.
    pub coverage: Option<CoverageMap>,
}

/// The harness a command line invocation drives: a machine, its gas limit and the optional
/// coverage map.
struct Harness {
    vm: VM,
    gas_limit: u64,
    coverage: Option<CoverageMap>,
}

impl Harness {
    fn execute(&mut self, tx: &Transaction) -> Result<ExecutionResult, Error> {
        let outcome = match &mut self.coverage {
            Some(coverage) => {
                execute_tx_with_coverage(&mut self.vm, self.gas_limit, coverage, tx)?
            }
            None => execute_tx(&mut self.vm, self.gas_limit, tx)?,
        };
        Ok(outcome)
    }
}

fn parse_address(value: &str, name: &str) -> Result<Address, Error> {
    Address::from_str(value).map_err(|e| Error::Generic(format!("invalid {name} '{value}': {e}")))
}

/// Runs `ferret exec`: optionally deploys `args.code`, then calls it with `args.calldata`.
pub fn exec(args: &ExecArgs, configuration: &Configuration) -> Result<ExecReport, Error> {
    let code = Bytes::from(decode_hex(&args.code)?);
    let calldata = Bytes::from(decode_hex(&args.calldata)?);
    let target = parse_address(&args.target, "target")?;
    let sender = match &args.sender {
        Some(sender) => parse_address(sender, "sender")?,
        None => configuration.sender_address()?,
    };
    let gas_limit = args.gas.unwrap_or(configuration.gas_limit);

    let mut harness = Harness {
        vm: VM::new(),
        gas_limit,
        coverage: (args.coverage || configuration.coverage).then(CoverageMap::new),
    };
    harness.vm.contracts.entry(sender).or_default().balance = configuration.sender_balance()?;

    debug!(%sender, %target, gas_limit, create = args.create, "executing bytecode");

    let deployment = if args.create {
        let mut tx = Transaction::create(sender, target, code);
        tx.gas = gas_limit;
        Some(harness.execute(&tx)?)
    } else {
        harness.vm.contracts.insert(target, Contract::new(code));
        None
    };

    let call = match &deployment {
        Some(outcome) if !outcome.is_success() => {
            info!("deployment failed, skipping call");
            None
        }
        _ => {
            let mut tx = Transaction::call(sender, target, calldata);
            tx.gas = gas_limit;
            Some(harness.execute(&tx)?)
        }
    };

    Ok(ExecReport { deployment, call, logs: harness.vm.logs, coverage: harness.coverage })
}
