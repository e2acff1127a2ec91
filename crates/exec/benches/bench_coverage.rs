//! Compares plain execution against execution with coverage recording.

use alloy::primitives::{Address, Bytes};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ferret_common::utils::strings::decode_hex;
use ferret_exec::{execute_tx, execute_tx_with_coverage, CoverageMap, Transaction, MAX_GAS};
use ferret_vm::{Contract, VM};

// counts down from 10_000 to zero
const COUNTDOWN: &str = "0x6127105b600190038060035700";

fn build_vm() -> (VM, Transaction) {
    let target = Address::repeat_byte(0x01);
    let code = decode_hex(COUNTDOWN).expect("invalid bytecode");

    let mut vm = VM::new();
    vm.contracts.insert(target, Contract::new(Bytes::from(code)));
    (vm, Transaction::call(Address::ZERO, target, Bytes::new()))
}

fn test_coverage(c: &mut Criterion) {
    let mut group = c.benchmark_group("ferret_exec");

    group.sample_size(100);
    group.bench_function(BenchmarkId::from_parameter("run"), |b| {
        b.iter(|| {
            let (mut vm, tx) = build_vm();
            execute_tx(&mut vm, MAX_GAS, &tx).expect("transaction is legal")
        });
    });
    group.bench_function(BenchmarkId::from_parameter("run_with_coverage"), |b| {
        b.iter(|| {
            let (mut vm, tx) = build_vm();
            let mut coverage = CoverageMap::new();
            execute_tx_with_coverage(&mut vm, MAX_GAS, &mut coverage, &tx)
                .expect("transaction is legal")
        });
    });

    group.finish();
}

criterion_group!(benches, test_coverage);
criterion_main!(benches);
