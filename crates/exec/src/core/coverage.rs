use std::{collections::BTreeSet, ops::Deref};

use alloy::primitives::B256;
use ferret_vm::{ExecutionResult, VM};
use hashbrown::HashMap;

/// Codehash under which instructions are recorded when the executing code has no contract record,
/// e.g. after the contract destroyed itself.
pub const UNKNOWN_CODEHASH: B256 = B256::repeat_byte(0xff);

/// The program counters visited so far, keyed by the codehash of the executed code.
///
/// Entries are only ever added, so a map can be shared across a whole fuzzing campaign.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoverageMap(HashMap<B256, BTreeSet<usize>>);

impl CoverageMap {
    /// Creates an empty [`CoverageMap`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `pc` as visited in the code identified by `codehash`. Returns whether the point is
    /// new.
    pub fn insert(&mut self, codehash: B256, pc: usize) -> bool {
        self.0.entry(codehash).or_default().insert(pc)
    }

    /// The total number of distinct points recorded.
    ///
    /// ```
    /// use ferret_exec::CoverageMap;
    /// use alloy::primitives::B256;
    ///
    /// let mut coverage = CoverageMap::new();
    /// assert_eq!(coverage.points(), 0);
    ///
    /// coverage.insert(B256::ZERO, 1);
    /// coverage.insert(B256::ZERO, 1);
    /// coverage.insert(B256::repeat_byte(0x01), 1);
    /// assert_eq!(coverage.points(), 2);
    /// ```
    pub fn points(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    /// Adds every point of `other` to this map.
    pub fn merge(&mut self, other: &CoverageMap) {
        for (codehash, pcs) in &other.0 {
            self.0.entry(*codehash).or_default().extend(pcs.iter().copied());
        }
    }
}

impl Deref for CoverageMap {
    type Target = HashMap<B256, BTreeSet<usize>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Runs `vm` to completion one instruction at a time, calling `record` after every instruction.
/// The result is the same as [`VM::run`]'s.
pub fn run_with_coverage<F>(vm: &mut VM, mut record: F) -> ExecutionResult
where
    F: FnMut(&VM),
{
    loop {
        if let Some(result) = &vm.result {
            return result.clone();
        }

        vm.step();
        record(vm);
    }
}

/// Records the current program counter of `vm` under the codehash of the executing code.
///
/// The key follows `state.code_contract`, not `state.contract`: under DELEGATECALL and CALLCODE
/// the points belong to the code that ran, while the storage context stays with the caller.
pub fn record_coverage_point(vm: &VM, coverage: &mut CoverageMap) {
    let codehash = vm
        .contracts
        .get(&vm.state.code_contract)
        .map(|contract| contract.codehash)
        .unwrap_or(UNKNOWN_CODEHASH);

    coverage.insert(codehash, vm.state.pc);
}

/// The total number of distinct points in `coverage`.
pub fn coverage_points(coverage: &CoverageMap) -> usize {
    coverage.points()
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{keccak256, Address, Bytes};
    use ferret_vm::Contract;

    use super::*;

    fn loaded_vm(code: Vec<u8>) -> VM {
        let mut vm = VM::new();
        vm.contracts.insert(Address::ZERO, Contract::new(Bytes::from(code)));
        vm.load_contract(Address::ZERO).expect("contract exists");
        vm.state.gas = 1_000_000;
        vm
    }

    #[test]
    fn test_one_record_per_instruction() {
        // PUSH1 1 PUSH1 2 ADD POP STOP
        let code = vec![0x60, 0x01, 0x60, 0x02, 0x01, 0x50, 0x00];

        let mut pcs = Vec::new();
        let outcome = run_with_coverage(&mut loaded_vm(code.clone()), |vm| pcs.push(vm.state.pc));

        assert_eq!(pcs, vec![2, 4, 5, 6, 7]);
        assert_eq!(outcome, loaded_vm(code).run());
    }

    #[test]
    fn test_failure_is_returned_unchanged() {
        let code = vec![0x60, 0x01, 0x56];

        let mut calls = 0;
        let outcome = run_with_coverage(&mut loaded_vm(code.clone()), |_| calls += 1);

        assert_eq!(calls, 2);
        assert_eq!(outcome, loaded_vm(code).run());
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_record_coverage_point() {
        let code = vec![0x5b, 0x00];
        let mut vm = loaded_vm(code.clone());
        let mut coverage = CoverageMap::new();

        vm.step();
        record_coverage_point(&vm, &mut coverage);
        record_coverage_point(&vm, &mut coverage);

        assert_eq!(coverage.points(), 1);
        assert!(coverage[&keccak256(&code)].contains(&1));
    }

    #[test]
    fn test_record_without_contract_uses_unknown_codehash() {
        let mut vm = loaded_vm(vec![0x00]);
        vm.contracts.clear();
        let mut coverage = CoverageMap::new();

        record_coverage_point(&vm, &mut coverage);

        assert!(coverage[&UNKNOWN_CODEHASH].contains(&0));
    }

    #[test]
    fn test_merge() {
        let mut left = CoverageMap::new();
        left.insert(B256::ZERO, 1);
        left.insert(B256::ZERO, 2);

        let mut right = CoverageMap::new();
        right.insert(B256::ZERO, 2);
        right.insert(UNKNOWN_CODEHASH, 7);

        left.merge(&right);

        assert_eq!(coverage_points(&left), 3);
        assert_eq!(left.len(), 2);
    }
}
