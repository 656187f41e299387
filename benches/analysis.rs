//! Throughput of the pure analysis stages: classification, CPI reconstruction
//! and risk scoring. Run with `cargo bench`.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_instruction;
use std::sync::Arc;

use simlens::cpi::build_cpi_tree;
use simlens::registry::{COMPUTE_BUDGET_PROGRAM_ID, TOKEN_PROGRAM_ID};
use simlens::types::RawInstruction;
use simlens::{InstructionClassifier, ProgramRegistry, RiskScorer};

fn sample_instructions(count: usize) -> Vec<RawInstruction> {
    (0..count)
        .map(|i| match i % 4 {
            0 => RawInstruction::new(COMPUTE_BUDGET_PROGRAM_ID, vec![], vec![2, 0x40, 0x0d, 0x03, 0x00]),
            1 => {
                let from = Pubkey::new_unique();
                let to = Pubkey::new_unique();
                let ix = system_instruction::transfer(&from, &to, 7_000_000_000);
                RawInstruction::new(ix.program_id, vec![from, to], ix.data)
            }
            2 => {
                let mut data = vec![4];
                data.extend_from_slice(&u64::MAX.to_le_bytes());
                let accounts = (0..3).map(|_| Pubkey::new_unique()).collect();
                RawInstruction::new(TOKEN_PROGRAM_ID, accounts, data)
            }
            _ => RawInstruction::new(Pubkey::new_unique(), vec![], vec![1, 2, 3, 4]),
        })
        .collect()
}

fn sample_logs(depth: usize) -> Vec<String> {
    let mut logs = Vec::new();
    for root in 0..4 {
        for level in 1..=depth {
            let program = if (root + level) % 2 == 0 {
                "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4"
            } else {
                "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
            };
            logs.push(format!("Program {} invoke [{}]", program, level));
            logs.push("Program log: Instruction: Transfer".to_string());
        }
    }
    logs
}

fn bench_classifier(c: &mut Criterion) {
    let classifier = InstructionClassifier::new(Arc::new(ProgramRegistry::default()));
    let mut group = c.benchmark_group("classify");

    for count in [4usize, 32, 128] {
        let instructions = sample_instructions(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &instructions, |b, ixs| {
            b.iter(|| classifier.classify_all(black_box(ixs)))
        });
    }

    group.finish();
}

fn bench_cpi_tree(c: &mut Criterion) {
    let registry = ProgramRegistry::default();
    let logs = sample_logs(8);

    c.bench_function("cpi_tree_depth_8", |b| {
        b.iter(|| build_cpi_tree(black_box(&logs), &registry))
    });
}

fn bench_risk(c: &mut Criterion) {
    let registry = Arc::new(ProgramRegistry::default());
    let classifier = InstructionClassifier::new(Arc::clone(&registry));
    let scorer = RiskScorer::new(registry);
    let decoded = classifier.classify_all(&sample_instructions(32));
    let logs = sample_logs(4);

    c.bench_function("risk_32_instructions", |b| {
        b.iter(|| scorer.analyze(black_box(&decoded), black_box(&logs), 650_000))
    });
}

criterion_group!(benches, bench_classifier, bench_cpi_tree, bench_risk);
criterion_main!(benches);
