//! Vectra Emit
//!
//! Bytecode generation and binary containers for lowered modules.
//!
//! ```text
//! ModuleUnit ──► ModuleEmitter ──► EmittedModule ──► containers ──► files
//!                 │ pool first                        VBC VDL VDI VDS
//!                 └ MethodBodyEmitter per body
//! ```
//!
//! ## Modules
//!
//! - [`opcode`]: Instruction set
//! - [`constant`]: Deduplicating constant pool
//! - [`buffer`]: Instruction buffer with forward-jump patching
//! - [`body`]: Method body code generation
//! - [`module`]: Module emission
//! - [`container`]: Binary container layouts
//! - [`artifact`]: Artifact files and atomic writes

pub mod artifact;
pub mod body;
pub mod buffer;
pub mod constant;
pub mod container;
mod error;
pub mod module;
pub mod opcode;

pub use artifact::{Artifact, ArtifactWriter, build_artifacts};
pub use body::{EmittedBody, MethodBodyEmitter};
pub use buffer::{InstructionBuffer, JumpLabel};
pub use constant::{Constant, ConstantKind, ConstantPool};
pub use container::{ContainerKind, FORMAT_VERSION, write_container};
pub use error::EmitError;
pub use module::{
    DebugCallable, DebugParameter, EmittedModule, InterfaceMethod, InterfaceType, ModuleEmitter,
    TypeEntry,
};
pub use opcode::OpCode;
