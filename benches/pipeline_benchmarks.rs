//! Performance benchmarks for the backend pipeline.
//!
//! Packages are generated with [`SyntaxBuilder`] so only binding, analysis,
//! lowering and emission are measured. Artifacts stay in memory.
//!
//! ```bash
//! cargo bench --bench pipeline_benchmarks
//! ```

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use vectra::syntax::{BinaryOp, ClassDecl};
use vectra::{CancellationToken, Compiler, CompilerOptions, SyntaxBuilder, SyntaxPackage};

/// One class with an initialized field, an arithmetic method and a
/// constructor-calling method.
fn worker(b: &SyntaxBuilder, index: usize) -> ClassDecl {
    let name = format!("Worker{index}");
    b.class(
        &name,
        vec![
            b.field("seed", "number", Some(b.number(index as f64))),
            b.method(
                "Compute",
                "number",
                vec![b.param("x", "number")],
                vec![
                    b.let_(
                        "scaled",
                        b.binary(b.ident("x"), BinaryOp::Mul, b.number(2.0)),
                    ),
                    b.ret(Some(b.binary(b.ident("scaled"), BinaryOp::Add, b.ident("seed")))),
                ],
            ),
            b.method(
                "Spawn",
                "number",
                vec![],
                vec![
                    b.let_("other", b.new_(&name, vec![])),
                    b.ret(Some(b.call_method(b.ident("other"), "Compute", vec![b.number(1.0)]))),
                ],
            ),
        ],
    )
}

fn package(classes: usize) -> SyntaxPackage {
    let b = SyntaxBuilder::new();
    let mut decls: Vec<ClassDecl> = (0..classes).map(|i| worker(&b, i)).collect();
    decls.push(b.class(
        "Program",
        vec![b.method(
            "Main",
            "void",
            vec![],
            vec![b.expr_stmt(b.call(b.ident("PrintLine"), vec![b.string("ready")]))],
        )],
    ));
    b.program(decls)
}

fn size_benchmarks(c: &mut Criterion) {
    let compiler = Compiler::new(CompilerOptions::default().with_write_artifacts(false));
    let cancel = CancellationToken::new();

    let mut group = c.benchmark_group("pipeline/classes");
    for classes in [1usize, 10, 100, 500] {
        let package = package(classes);
        group.throughput(Throughput::Elements(classes as u64));
        group.bench_function(format!("{classes}_classes"), |b| {
            b.iter(|| {
                let output = compiler.compile(black_box(&package), &cancel).unwrap();
                assert!(output.succeeded());
                black_box(output.modules.len())
            });
        });
    }
    group.finish();
}

fn debug_symbol_benchmarks(c: &mut Criterion) {
    let package = package(100);
    let cancel = CancellationToken::new();

    let mut group = c.benchmark_group("pipeline/debug_symbols");
    for enabled in [false, true] {
        let compiler = Compiler::new(
            CompilerOptions::default()
                .with_write_artifacts(false)
                .with_debug_symbols(enabled),
        );
        let label = if enabled { "with_vds" } else { "without_vds" };
        group.bench_function(label, |b| {
            b.iter(|| black_box(compiler.compile(black_box(&package), &cancel).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, size_benchmarks, debug_symbol_benchmarks);
criterion_main!(benches);
