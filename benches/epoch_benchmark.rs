use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use scroogecoin_lib::{
    Keypair, Transaction, TransactionBuilder, TransactionOutput, TxHandler, UtxoPool,
};

/// A pool of `n` outputs owned by one key, and `n` candidates each spending one of them.
/// Every second candidate also tries to spend its neighbour's output, so half of the batch
/// conflicts with an earlier candidate.
fn create_epoch(n: u32) -> (UtxoPool, Vec<Transaction>) {
    let owner = Keypair::from_seed(&[1; 32]);
    let recipient = Keypair::from_seed(&[2; 32]).address();
    let outputs = (0..n)
        .map(|_| TransactionOutput::new(10.into(), owner.address()))
        .collect();
    let genesis = Transaction::new(vec![], outputs).unwrap();
    let mut pool = UtxoPool::new();
    pool.add_transaction_outputs(&genesis);

    let candidates = (0..n)
        .map(|i| {
            let spent = if i % 2 == 1 { i - 1 } else { i };
            let mut builder = TransactionBuilder::new();
            builder
                .add_input(*genesis.id(), spent)
                .add_output(((i % 10) as i64).into(), recipient);
            builder.sign_input(0, &owner).unwrap();
            builder.build().unwrap()
        })
        .collect();
    (pool, candidates)
}

fn handle_txs_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Epoch");
    for size in [16u32, 256, 1024].iter() {
        let (pool, candidates) = create_epoch(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(
            BenchmarkId::new("handle_txs", size),
            &candidates,
            |b, candidates| {
                b.iter(|| {
                    let mut handler = TxHandler::new(&pool);
                    black_box(handler.handle_txs(black_box(candidates)));
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, handle_txs_benchmark);

criterion_main!(benches);
