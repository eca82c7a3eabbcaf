use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use loopsieve::bytecode::{
    ClassTree, Condition, Location, MethodBuilder, MethodTree, TypeRef, ValueKind,
};
use loopsieve::intercept::{
    ForEachLoopFilter, MutationDetails, MutationIdentifier, MutationInterceptor,
};
use std::sync::Arc;

const ITERATOR: &str = "java/util/Iterator";

/// Iterator loop whose body is `body_len` straight-line instructions
fn iterator_loop(body_len: usize) -> MethodTree {
    let mut b = MethodBuilder::new(Location::new("bench/Loops", "iterate", "(Ljava/util/List;)V"));
    let start = b.new_label();
    let end = b.new_label();

    b.aload(1);
    b.invoke_interface("java/util/List", "iterator", TypeRef::object(ITERATOR));
    b.astore(2);
    b.label(start);
    b.frame();
    b.aload(2);
    b.invoke_interface(ITERATOR, "hasNext", TypeRef::Boolean);
    b.branch(Condition::Eq, end);
    b.aload(2);
    b.invoke_interface(ITERATOR, "next", TypeRef::object("java/lang/Object"));
    b.astore(3);
    for i in 0..body_len {
        if i % 8 == 0 {
            b.line(i as u32);
        }
        b.iload(4);
        b.const_int(i as i64);
        b.arith(ValueKind::Int, loopsieve::bytecode::ArithOp::Add);
        b.istore(4);
    }
    b.goto(start);
    b.label(end);
    b.frame();
    b.return_(None);
    b.build()
}

/// Straight-line method the pre-screen rejects
fn no_loop(len: usize) -> MethodTree {
    let mut b = MethodBuilder::new(Location::new("bench/Loops", "straight", "()V"));
    for i in 0..len {
        b.const_int(i as i64);
        b.istore(1);
    }
    b.return_(None);
    b.build()
}

fn plumbing_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("plumbing");
    for body_len in [4usize, 32, 128] {
        let method = iterator_loop(body_len);
        let class = Arc::new(ClassTree::new("bench/Loops").with_method(method.clone()));
        group.bench_with_input(BenchmarkId::new("iterator loop", body_len), &method, |b, m| {
            b.iter(|| {
                let mut filter = ForEachLoopFilter::new().unwrap();
                filter.begin(Arc::clone(&class));
                let found = filter.plumbing_for(black_box(m.location())).unwrap().len();
                filter.end();
                found
            })
        });
    }

    let method = no_loop(256);
    let location = method.location().clone();
    let class = Arc::new(ClassTree::new("bench/Loops").with_method(method));
    group.bench_function("screened out", |b| {
        b.iter(|| {
            let mut filter = ForEachLoopFilter::new().unwrap();
            filter.begin(Arc::clone(&class));
            let found = filter.plumbing_for(black_box(&location)).unwrap().len();
            filter.end();
            found
        })
    });
    group.finish();
}

fn intercept_benchmark(c: &mut Criterion) {
    let method = iterator_loop(32);
    let location = method.location().clone();
    let len = method.instructions().len();
    let class = Arc::new(ClassTree::new("bench/Loops").with_method(method));
    let mutations: Vec<MutationDetails> = (0..len)
        .map(|i| {
            MutationDetails::new(
                MutationIdentifier::new(location.clone(), i, "BENCH"),
                "Loops.java",
                "",
                0,
            )
        })
        .collect();

    c.bench_function("intercept every offset", |b| {
        b.iter(|| {
            let mut filter = ForEachLoopFilter::new().unwrap();
            filter.begin(Arc::clone(&class));
            let kept = filter.intercept(black_box(mutations.clone())).unwrap();
            filter.end();
            kept.len()
        })
    });
}

criterion_group!(benches, plumbing_benchmark, intercept_benchmark);
criterion_main!(benches);
