use alloy::primitives::{keccak256, Address, Bytes, U256};
use hashbrown::HashMap;
use tracing::trace;

use crate::core::{
    constants::{CODE_DEPOSIT_COST, MAX_CODE_SIZE},
    contract::Contract,
    error::VmError,
};

use super::{
    core::VM,
    execution::{Frame, FrameKind, FrameState},
};

impl VM {
    /// Suspends the current frame and starts executing `callee`. `reversion` is restored if the
    /// callee fails.
    pub(crate) fn enter_frame(
        &mut self,
        callee: FrameState,
        kind: FrameKind,
        reversion: HashMap<Address, Contract>,
    ) {
        trace!(depth = self.frames.len() + 1, contract = %callee.contract, "entering frame");

        let caller = std::mem::replace(&mut self.state, callee);
        self.frames.push(Frame { state: caller, kind, reversion, log_checkpoint: self.logs.len() });
    }

    /// Ends the current frame with `outcome`. The outermost frame stores it in
    /// [`VM::result`]; nested frames hand it back to their caller.
    pub(crate) fn halt(&mut self, outcome: Result<Bytes, VmError>) {
        let Some(Frame { state, kind, reversion, log_checkpoint }) = self.frames.pop() else {
            self.result = Some(outcome.into());
            return;
        };

        trace!(depth = self.frames.len(), success = outcome.is_ok(), "leaving frame");

        let callee = std::mem::replace(&mut self.state, state);
        if let Err(error) = self.resume(callee, kind, reversion, log_checkpoint, outcome) {
            self.halt(Err(error));
        }
    }

    /// Hands a finished callee's outcome to the (now current) caller frame.
    fn resume(
        &mut self,
        callee: FrameState,
        kind: FrameKind,
        reversion: HashMap<Address, Contract>,
        log_checkpoint: usize,
        outcome: Result<Bytes, VmError>,
    ) -> Result<(), VmError> {
        let mut callee_gas = callee.gas;
        let outcome = match (&kind, outcome) {
            (FrameKind::Create { address }, Ok(code)) => {
                self.deposit_code(*address, code, &mut callee_gas)
            }
            (_, outcome) => outcome,
        };

        match outcome {
            Ok(output) => {
                self.state.gas = self.state.gas.saturating_add(callee_gas);
                match kind {
                    FrameKind::Call { ret_offset, ret_size } => {
                        let copied = ret_size.min(output.len());
                        self.state.memory.store(ret_offset, copied, &output[..copied]);
                        self.state.returndata = output;
                        self.state.stack.push(U256::from(1))
                    }
                    FrameKind::Create { address } => {
                        self.state.returndata = Bytes::new();
                        self.state.stack.push(VM::address_to_u256(&address))
                    }
                }
            }
            Err(error) => {
                self.contracts = reversion;
                self.logs.truncate(log_checkpoint);

                self.state.returndata = match error {
                    VmError::Revert(data) => {
                        self.state.gas = self.state.gas.saturating_add(callee_gas);
                        data
                    }
                    _ => Bytes::new(),
                };

                if let FrameKind::Call { ret_offset, ret_size } = kind {
                    let copied = ret_size.min(self.state.returndata.len());
                    let data = self.state.returndata[..copied].to_vec();
                    self.state.memory.store(ret_offset, copied, &data);
                }

                self.state.stack.push(U256::ZERO)
            }
        }
    }

    /// Installs the output of a successful creation frame as the code at `address`.
    fn deposit_code(
        &mut self,
        address: Address,
        code: Bytes,
        gas: &mut u64,
    ) -> Result<Bytes, VmError> {
        if code.len() > MAX_CODE_SIZE {
            return Err(VmError::MaxCodeSizeExceeded { limit: MAX_CODE_SIZE, size: code.len() });
        }
        if code.first() == Some(&0xef) {
            return Err(VmError::InvalidFormat);
        }

        let cost = CODE_DEPOSIT_COST * code.len() as u64;
        if cost > *gas {
            return Err(VmError::OutOfGas { available: *gas, needed: cost });
        }
        *gas -= cost;

        let contract = self.contracts.entry(address).or_default();
        contract.codehash = keccak256(&code);
        contract.code = code;
        Ok(Bytes::new())
    }
}
