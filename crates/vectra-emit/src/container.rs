//! Binary container writers.
//!
//! All four containers share a 5-byte header: a 3-byte magic followed by the
//! format version. Counts are u16, strings are u16-length-prefixed UTF-8,
//! numbers are f64 and spans are four i32, all little-endian.
//!
//! ```text
//! VBC / VDL                VDI                      VDS
//! ┌──────────────┐         ┌──────────────┐         ┌──────────────┐
//! │ magic + ver  │         │ magic + ver  │         │ magic + ver  │
//! │ imports      │         │ types        │         │ callables    │
//! │ constants    │         │  └ methods   │         │  └ params    │
//! │ types        │         │     └ params │         └──────────────┘
//! │ bodies       │         └──────────────┘
//! └──────────────┘
//! ```

use vectra_core::{ModuleKind, SourceSpan};

use crate::body::count;
use crate::{Constant, EmitError, EmittedModule};

pub const FORMAT_VERSION: [u8; 2] = [0x01, 0x00];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// `VBC`: executable module.
    Executable,
    /// `VDL`: library with bodies.
    LibraryBody,
    /// `VDI`: public signatures of a library.
    LibraryInterface,
    /// `VDS`: debug symbols.
    DebugSymbols,
}

impl ContainerKind {
    pub fn magic(self) -> &'static [u8; 3] {
        match self {
            ContainerKind::Executable => b"VBC",
            ContainerKind::LibraryBody => b"VDL",
            ContainerKind::LibraryInterface => b"VDI",
            ContainerKind::DebugSymbols => b"VDS",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ContainerKind::Executable => "vbc",
            ContainerKind::LibraryBody => "vdl",
            ContainerKind::LibraryInterface => "vdi",
            ContainerKind::DebugSymbols => "vds",
        }
    }

    /// Containers produced for a module of the given kind.
    pub fn for_module(kind: ModuleKind, debug_symbols: bool) -> Vec<ContainerKind> {
        let mut kinds = match kind {
            ModuleKind::Executable => vec![ContainerKind::Executable],
            ModuleKind::Library => vec![ContainerKind::LibraryBody, ContainerKind::LibraryInterface],
        };
        if debug_symbols {
            kinds.push(ContainerKind::DebugSymbols);
        }
        kinds
    }
}

/// Serializes one container of `module`.
pub fn write_container(kind: ContainerKind, module: &EmittedModule) -> Result<Vec<u8>, EmitError> {
    let mut w = ByteWriter::default();
    w.bytes(kind.magic());
    w.bytes(&FORMAT_VERSION);

    match kind {
        ContainerKind::Executable | ContainerKind::LibraryBody => {
            write_imports(&mut w, module)?;
            write_constants(&mut w, module)?;
            write_types(&mut w, module)?;
            write_bodies(&mut w, module)?;
        }
        ContainerKind::LibraryInterface => write_interface(&mut w, module)?,
        ContainerKind::DebugSymbols => write_debug(&mut w, module)?,
    }
    Ok(w.finish())
}

fn write_imports(w: &mut ByteWriter, module: &EmittedModule) -> Result<(), EmitError> {
    let imports = &module.metadata.references;
    w.count(imports.len(), "import")?;
    for import in imports {
        w.string(import)?;
    }
    Ok(())
}

fn write_constants(w: &mut ByteWriter, module: &EmittedModule) -> Result<(), EmitError> {
    let constants = module.pool.constants();
    w.count(constants.len(), "constant")?;
    for constant in constants {
        w.u8(constant.kind().into());
        match constant {
            Constant::Number(n) => w.f64(n.0),
            other => w.string(other.text().unwrap_or_default())?,
        }
    }
    Ok(())
}

fn write_types(w: &mut ByteWriter, module: &EmittedModule) -> Result<(), EmitError> {
    w.count(module.types.len(), "type")?;
    for ty in &module.types {
        w.u16(ty.type_index);
        w.count(ty.members.len(), "member")?;
        for &member in &ty.members {
            w.u16(member);
        }
    }
    Ok(())
}

fn write_bodies(w: &mut ByteWriter, module: &EmittedModule) -> Result<(), EmitError> {
    w.count(module.bodies.len(), "body")?;
    for body in &module.bodies {
        w.u16(body.pool_index);
        w.count(body.slot_count as usize, "slot")?;
        let len = u32::try_from(body.code.len())
            .map_err(|_| EmitError::BodyTooLarge { size: body.code.len() })?;
        w.u32(len);
        w.bytes(&body.code);
    }
    Ok(())
}

fn write_interface(w: &mut ByteWriter, module: &EmittedModule) -> Result<(), EmitError> {
    w.count(module.interface.len(), "type")?;
    for ty in &module.interface {
        w.string(&ty.name)?;
        w.count(ty.methods.len(), "method")?;
        for method in &ty.methods {
            w.string(&method.name)?;
            w.string(&method.return_type)?;
            w.count(method.params.len(), "parameter")?;
            for (name, ty) in &method.params {
                w.string(name)?;
                w.string(ty)?;
            }
        }
    }
    Ok(())
}

fn write_debug(w: &mut ByteWriter, module: &EmittedModule) -> Result<(), EmitError> {
    w.count(module.debug.len(), "callable")?;
    for callable in &module.debug {
        w.string(&callable.name)?;
        w.string(&callable.file)?;
        w.span(callable.span);
        w.count(callable.params.len(), "parameter")?;
        for param in &callable.params {
            w.string(&param.name)?;
            w.count(param.slot as usize, "slot")?;
            w.span(param.span);
        }
    }
    Ok(())
}

// ============================================================================
// Byte writer
// ============================================================================

#[derive(Default)]
struct ByteWriter {
    out: Vec<u8>,
}

impl ByteWriter {
    fn u8(&mut self, value: u8) {
        self.out.push(value);
    }

    fn u16(&mut self, value: u16) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    fn i32(&mut self, value: i32) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    fn f64(&mut self, value: f64) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    fn bytes(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    fn count(&mut self, value: usize, what: &'static str) -> Result<(), EmitError> {
        self.u16(count(value, what)?);
        Ok(())
    }

    fn string(&mut self, value: &str) -> Result<(), EmitError> {
        self.count(value.len(), "string byte")?;
        self.bytes(value.as_bytes());
        Ok(())
    }

    /// Four i32; zeros when absent.
    fn span(&mut self, span: Option<SourceSpan>) {
        let parts = span.map(SourceSpan::to_array).unwrap_or_default();
        for part in parts {
            self.i32(i32::try_from(part).unwrap_or(i32::MAX));
        }
    }

    fn finish(self) -> Vec<u8> {
        self.out
    }
}
