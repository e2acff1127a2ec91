//! Benchmarks for raw interpreter throughput on small looping programs.

use alloy::primitives::{Address, Bytes};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ferret_common::utils::strings::decode_hex;
use ferret_vm::{Contract, VM};

// counts down from 10_000 to zero
const COUNTDOWN: &str = "0x6127105b600190038060035700";

// hashes a 32-byte word 1_000 times
const HASHES: &str = "0x6103e85b6020600020600052600190038060035700";

fn build_vm(bytecode: &str) -> VM {
    let code = decode_hex(bytecode).expect("invalid bytecode");

    let mut vm = VM::new();
    vm.contracts.insert(Address::ZERO, Contract::new(Bytes::from(code)));
    vm.load_contract(Address::ZERO).expect("contract exists");
    vm.state.gas = u64::MAX;
    vm
}

fn test_interpreter(c: &mut Criterion) {
    let mut group = c.benchmark_group("ferret_vm");

    group.sample_size(100);
    for (name, bytecode) in [("countdown", COUNTDOWN), ("hashes", HASHES)] {
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                let mut vm = build_vm(bytecode);
                let result = vm.run();

                assert!(result.is_success());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, test_interpreter);
criterion_main!(benches);
