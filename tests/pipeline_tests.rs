//! End-to-end tests for the compilation pipeline.

use std::fs;
use std::path::Path;

use vectra::syntax::{BinaryOp, ModuleSource};
use vectra::{
    BuildConfiguration, CancellationToken, CompileError, Compiler, CompilerOptions, ContainerKind,
    ErrorCode, ModuleKind, ModuleMetadata, Phase, SyntaxBuilder, SyntaxPackage,
};

// =============================================================================
// Helpers
// =============================================================================

fn hello_module(b: &SyntaxBuilder, root: &Path) -> ModuleSource {
    b.module(
        ModuleMetadata::new("App", ModuleKind::Executable, root.join("app")).with_reference("Lib"),
        vec![b.file(
            "app/main.vec",
            b.space(
                "App",
                vec![b.class(
                    "Program",
                    vec![b.method(
                        "Main",
                        "void",
                        vec![],
                        vec![b.expr_stmt(b.call(b.ident("PrintLine"), vec![b.string("hello")]))],
                    )],
                )],
                vec![],
            ),
        )],
    )
}

fn math_module(b: &SyntaxBuilder, root: &Path) -> ModuleSource {
    b.module(
        ModuleMetadata::new("Lib", ModuleKind::Library, root.join("lib")),
        vec![b.file(
            "lib/math.vec",
            b.space(
                "Lib",
                vec![b.class(
                    "Math",
                    vec![b.method(
                        "Twice",
                        "number",
                        vec![b.param("x", "number")],
                        vec![b.ret(Some(b.binary(b.ident("x"), BinaryOp::Mul, b.number(2.0))))],
                    )],
                )],
                vec![],
            ),
        )],
    )
}

fn compile(options: CompilerOptions, package: &SyntaxPackage) -> vectra::CompileOutput {
    Compiler::new(options)
        .compile(package, &CancellationToken::new())
        .unwrap()
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// =============================================================================
// Successful builds
// =============================================================================

#[test]
fn executable_writes_bytecode_and_debug_symbols() {
    let dir = tempfile::tempdir().unwrap();
    let b = SyntaxBuilder::new();
    let package = b.package("Hello", vec![hello_module(&b, dir.path())]);

    let output = compile(CompilerOptions::default(), &package);

    assert!(output.succeeded(), "{:?}", output.diagnostics);
    assert_eq!(output.error_count(), 0);
    let out_dir = dir.path().join("app").join("bin").join("Debug");
    assert_eq!(file_names(&out_dir), vec!["App.vbc", "App.vds"]);

    let vbc = fs::read(out_dir.join("App.vbc")).unwrap();
    assert_eq!(&vbc[..5], b"VBC\x01\x00");
    // imports: one entry, "Lib"
    assert_eq!(&vbc[5..12], b"\x01\x00\x03\x00Lib");
    assert_eq!(vbc, output.modules[0].artifacts[0].bytes);
    assert_eq!(output.modules[0].paths[0], out_dir.join("App.vbc"));
}

#[test]
fn library_and_executable_in_one_package() {
    let dir = tempfile::tempdir().unwrap();
    let b = SyntaxBuilder::new();
    let package = b.package(
        "Demo",
        vec![math_module(&b, dir.path()), hello_module(&b, dir.path())],
    );

    let output = compile(CompilerOptions::default(), &package);

    assert!(output.succeeded(), "{:?}", output.diagnostics);
    let names: Vec<&str> = output.modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Lib", "App"]);
    assert_eq!(output.modules[0].kind, ModuleKind::Library);

    let lib_dir = dir.path().join("lib").join("bin").join("Debug");
    assert_eq!(file_names(&lib_dir), vec!["Lib.vdi", "Lib.vdl", "Lib.vds"]);
    let vdi = fs::read(lib_dir.join("Lib.vdi")).unwrap();
    assert_eq!(&vdi[..5], b"VDI\x01\x00");
}

#[test]
fn executable_uses_library_types() {
    let dir = tempfile::tempdir().unwrap();
    let b = SyntaxBuilder::new();
    let app = b.module(
        ModuleMetadata::new("App", ModuleKind::Executable, dir.path().join("app")).with_reference("Lib"),
        vec![b.file(
            "app/main.vec",
            b.space(
                "App",
                vec![b.class(
                    "Program",
                    vec![b.method(
                        "Main",
                        "number",
                        vec![],
                        vec![
                            b.let_("math", b.new_("Math", vec![])),
                            b.ret(Some(b.call_method(b.ident("math"), "Twice", vec![b.number(21.0)]))),
                        ],
                    )],
                )],
                vec![],
            ),
        )],
    );
    let package = b.package("Demo", vec![math_module(&b, dir.path()), app]);

    let output = compile(CompilerOptions::default().with_write_artifacts(false), &package);

    assert!(output.succeeded(), "{:?}", output.diagnostics);
    let vbc = &output.modules[1].artifacts[0].bytes;
    let contains = |needle: &[u8]| vbc.windows(needle.len()).any(|w| w == needle);
    assert!(contains(b"Lib.Math::.ctor()"));
    assert!(contains(b"Lib.Math::Twice(number)"));
}

#[test]
fn release_configuration_without_debug_symbols() {
    let dir = tempfile::tempdir().unwrap();
    let b = SyntaxBuilder::new();
    let package = b.package("Hello", vec![hello_module(&b, dir.path())]);

    let options = CompilerOptions::default()
        .with_configuration(BuildConfiguration::Release)
        .with_debug_symbols(false)
        .with_atomic_writes(false);
    let output = compile(options, &package);

    assert!(output.succeeded());
    let out_dir = dir.path().join("app").join("bin").join("Release");
    assert_eq!(file_names(&out_dir), vec!["App.vbc"]);
    assert!(!dir.path().join("app").join("bin").join("Debug").exists());
}

#[test]
fn in_memory_build_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let b = SyntaxBuilder::new();
    let package = b.package("Hello", vec![hello_module(&b, dir.path())]);

    let output = compile(CompilerOptions::default().with_write_artifacts(false), &package);

    assert!(output.succeeded());
    assert!(output.modules[0].paths.is_empty());
    let kinds: Vec<ContainerKind> = output.modules[0].artifacts.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![ContainerKind::Executable, ContainerKind::DebugSymbols]);
    assert!(!dir.path().join("app").exists());
}

#[test]
fn warnings_do_not_halt() {
    let b = SyntaxBuilder::new();
    let package = b.program(vec![b.class(
        "Program",
        vec![b.method(
            "Main",
            "void",
            vec![b.param("args", "string")],
            vec![b.let_("unused", b.number(1.0))],
        )],
    )]);

    let output = compile(CompilerOptions::default().with_write_artifacts(false), &package);

    assert!(output.succeeded());
    assert_eq!(output.warning_count(), 2);
    assert!(output.codes().contains(&ErrorCode::UnusedVariable));
    assert!(output.codes().contains(&ErrorCode::UnusedParameter));
    assert!(output.diagnostics.iter().all(|d| d.phase == Phase::Analyze));
    assert_eq!(output.modules.len(), 1);
}

// =============================================================================
// Halting
// =============================================================================

#[test]
fn bind_errors_halt_before_analysis() {
    let b = SyntaxBuilder::new();
    let package = b.program(vec![b.class(
        "Program",
        vec![b.method(
            "Main",
            "void",
            vec![],
            vec![b.expr_stmt(b.call(b.ident("Missing"), vec![]))],
        )],
    )]);

    let output = compile(CompilerOptions::default().with_write_artifacts(false), &package);

    assert_eq!(output.halted_at, Some(Phase::Bind));
    assert_eq!(output.codes(), vec![ErrorCode::IdentifierNotFound]);
    assert!(output.modules.is_empty());
}

#[test]
fn missing_return_halts_at_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let b = SyntaxBuilder::new();
    let module = b.module(
        ModuleMetadata::new("App", ModuleKind::Executable, dir.path().join("app")),
        vec![b.file(
            "app/main.vec",
            b.space(
                "App",
                vec![b.class(
                    "Program",
                    vec![b.method("Answer", "number", vec![], vec![])],
                )],
                vec![],
            ),
        )],
    );
    let package = b.package("App", vec![module]);

    let output = compile(CompilerOptions::default(), &package);

    assert!(!output.succeeded());
    assert_eq!(output.halted_at, Some(Phase::Analyze));
    assert_eq!(output.codes(), vec![ErrorCode::MissingReturnPath]);
    assert!(output.modules.is_empty());
    assert!(!dir.path().join("app").join("bin").exists());
}

#[test]
fn unwritable_output_is_reported_per_module() {
    let dir = tempfile::tempdir().unwrap();
    // `app` is a file, so `app/bin/Debug` cannot be created.
    fs::write(dir.path().join("app"), b"").unwrap();
    let b = SyntaxBuilder::new();
    let package = b.package(
        "Demo",
        vec![math_module(&b, dir.path()), hello_module(&b, dir.path())],
    );

    let output = compile(CompilerOptions::default(), &package);

    assert_eq!(output.halted_at, Some(Phase::Emit));
    assert_eq!(output.codes(), vec![ErrorCode::ArtifactWriteFailed]);
    // The library still made it to disk.
    let names: Vec<&str> = output.modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Lib"]);
    assert!(dir.path().join("lib").join("bin").join("Debug").join("Lib.vdl").exists());
}

#[test]
fn cancellation_aborts_the_build() {
    let dir = tempfile::tempdir().unwrap();
    let b = SyntaxBuilder::new();
    let package = b.package("Hello", vec![hello_module(&b, dir.path())]);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = Compiler::default().compile(&package, &cancel);

    assert!(matches!(result, Err(CompileError::Cancelled(_))));
    assert!(!dir.path().join("app").exists());
}
