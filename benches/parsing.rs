use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dice_tree::{ExprTree, Mode, RollContext};
use rand::{rngs::StdRng, SeedableRng};

pub fn benchmark_parsing(c: &mut Criterion) {
    c.bench_function("tokenize attack", |b| {
        b.iter(|| dice_tree::tokenize(black_box("1d20+5+2d6r1+1d8"), 0))
    });
    c.bench_function("parse nested expression", |b| {
        b.iter(|| ExprTree::parse(black_box("((4d6r1h3)*2-(1d4+1)!)^2/(3d[1,2,3]+4dF)")))
    });
    c.bench_function("render parsed expression", |b| {
        let tree = ExprTree::parse("2*(1d20+3)-4d6h3").unwrap();
        b.iter(|| black_box(&tree).to_string())
    });
}

pub fn benchmark_rolling(c: &mut Criterion) {
    c.bench_function("roll cursed dice", |b| {
        b.iter(|| {
            let mut ctx = RollContext::new_unbounded(StdRng::seed_from_u64(1));
            dice_tree::basic_with(black_box("999d444"), Mode::NORMAL, 0, &mut ctx)
        })
    });
    c.bench_function("roll verbose with rerolls", |b| {
        b.iter(|| {
            let mut ctx = RollContext::new_unbounded(StdRng::seed_from_u64(1));
            dice_tree::verbose_with(black_box("10d6R<3h5+2d20h1"), Mode::NORMAL, 0, &mut ctx)
        })
    });
}

criterion_group!(benches, benchmark_parsing, benchmark_rolling);
criterion_main!(benches);
