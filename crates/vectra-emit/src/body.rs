//! Method body code generation.
//!
//! One rule per bound node kind. Expression rules leave exactly one value on
//! the operand stack, statement rules leave none.
//!
//! ```text
//! x = y + 1;          LOAD_LOCAL y
//!                     LOAD_CONST 1
//!                     ADD
//!                     DUP            ; assignment yields the value
//!                     STORE_LOCAL x
//!                     POP            ; expression statement
//! ```
//!
//! Bodies must be lowered first: `new`, method groups and error nodes are
//! internal errors here.

use tracing::trace;
use vectra_binder::{
    AssignTarget, BoundBody, BoundExpr, BoundExprKind, BoundStmt, BoundStmtKind, ConstantValue,
    SymbolId, SymbolKind, SymbolTable,
};
use vectra_syntax::{BinaryOp, UnaryOp};

use crate::{ConstantPool, EmitError, InstructionBuffer, OpCode};

/// Bytecode of one callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedBody {
    pub callable: SymbolId,
    /// Pool index of the callable's descriptor.
    pub pool_index: u16,
    /// Slots used after lowering, including `this` and temporaries.
    pub slot_count: u32,
    pub code: Vec<u8>,
}

/// Emits the bytecode of a single body into a module's pool.
pub struct MethodBodyEmitter<'a> {
    symbols: &'a SymbolTable,
    pool: &'a mut ConstantPool,
    buffer: InstructionBuffer,
}

impl<'a> MethodBodyEmitter<'a> {
    pub fn new(symbols: &'a SymbolTable, pool: &'a mut ConstantPool) -> Self {
        Self {
            symbols,
            pool,
            buffer: InstructionBuffer::new(),
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn emit_body(self, body: &BoundBody) -> Result<EmittedBody, EmitError> {
        let symbols = self.symbols;
        let pool_index = self.pool.add_symbol(symbols, body.callable)?;
        let code = self.emit(&body.block)?.into_bytes();
        trace!(
            callable = %symbols.display_name(body.callable),
            bytes = code.len(),
            "body emitted"
        );
        Ok(EmittedBody {
            callable: body.callable,
            pool_index,
            slot_count: body.slots.count(),
            code,
        })
    }

    /// Emits a block, terminated with `LOAD_NULL RET` when control can reach
    /// its end.
    pub fn emit(mut self, block: &BoundStmt) -> Result<InstructionBuffer, EmitError> {
        self.emit_stmt(block)?;
        if !block.always_returns() {
            self.buffer.emit(OpCode::LoadNull);
            self.buffer.emit(OpCode::Ret);
        }
        Ok(self.buffer)
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn emit_stmt(&mut self, stmt: &BoundStmt) -> Result<(), EmitError> {
        match &stmt.kind {
            BoundStmtKind::Block(stmts) => {
                for stmt in stmts {
                    self.emit_stmt(stmt)?;
                }
            }
            BoundStmtKind::Expression(expr) => {
                self.emit_expr(expr)?;
                self.buffer.emit(OpCode::Pop);
            }
            BoundStmtKind::VariableDeclaration { local, initializer } => {
                if let Some(init) = initializer {
                    self.emit_expr(init)?;
                    let slot = self.slot(*local)?;
                    self.buffer.emit_u16(OpCode::StoreLocal, slot);
                }
            }
            BoundStmtKind::Return(value) => {
                match value {
                    Some(value) => self.emit_expr(value)?,
                    None => self.buffer.emit(OpCode::LoadNull),
                }
                self.buffer.emit(OpCode::Ret);
            }
            BoundStmtKind::ObjectAllocation { target, class } => {
                let ty = self.pool.add_symbol(self.symbols, *class)?;
                self.buffer.emit_u16(OpCode::NewObj, ty);
                let slot = self.slot(*target)?;
                self.buffer.emit_u16(OpCode::StoreLocal, slot);
            }
            BoundStmtKind::Error => {
                return Err(EmitError::Internal(
                    "error statement reached the emitter".into(),
                ));
            }
        }
        Ok(())
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    fn emit_expr(&mut self, expr: &BoundExpr) -> Result<(), EmitError> {
        match &expr.kind {
            BoundExprKind::Literal(value) => self.emit_literal(value)?,
            BoundExprKind::Variable(id) => {
                let slot = self.slot(*id)?;
                self.buffer.emit_u16(OpCode::LoadLocal, slot);
            }
            BoundExprKind::Field {
                receiver,
                field: member,
            }
            | BoundExprKind::Property {
                receiver,
                property: member,
            } => {
                self.emit_expr(receiver)?;
                let index = self.pool.add_symbol(self.symbols, *member)?;
                self.buffer.emit_u16(OpCode::LoadMember, index);
            }
            BoundExprKind::Unary { op, operand } => {
                self.emit_expr(operand)?;
                self.buffer.emit(match op.op {
                    UnaryOp::Neg => OpCode::Neg,
                    UnaryOp::LogicalNot => OpCode::Not,
                });
            }
            BoundExprKind::Binary { op, left, right } => match op.op {
                BinaryOp::LogicalAnd => self.emit_short_circuit(left, right, OpCode::JmpFalse)?,
                BinaryOp::LogicalOr => self.emit_short_circuit(left, right, OpCode::JmpTrue)?,
                other => {
                    self.emit_expr(left)?;
                    self.emit_expr(right)?;
                    self.buffer.emit(binary_opcode(other));
                }
            },
            BoundExprKind::Assign { target, value } => {
                self.emit_expr(value)?;
                self.buffer.emit(OpCode::Dup);
                match target {
                    AssignTarget::Variable(id) => {
                        let slot = self.slot(*id)?;
                        self.buffer.emit_u16(OpCode::StoreLocal, slot);
                    }
                    AssignTarget::Field {
                        receiver,
                        field: member,
                    }
                    | AssignTarget::Property {
                        receiver,
                        property: member,
                    } => {
                        self.emit_expr(receiver)?;
                        let index = self.pool.add_symbol(self.symbols, *member)?;
                        self.buffer.emit_u16(OpCode::StoreMember, index);
                    }
                }
            }
            BoundExprKind::Call {
                callable,
                receiver,
                args,
            } => {
                self.emit_expr(receiver)?;
                for arg in args {
                    self.emit_expr(arg)?;
                }
                let op = match &self.symbols.get(*callable).kind {
                    SymbolKind::Constructor(_) => OpCode::CallCtor,
                    SymbolKind::Method(_) => OpCode::Call,
                    other => {
                        return Err(EmitError::Internal(format!(
                            "call target is a {}",
                            other.as_str()
                        )));
                    }
                };
                let index = self.pool.add_symbol(self.symbols, *callable)?;
                let argc = count(args.len() + 1, "argument")?;
                self.buffer.emit_u16_u16(op, index, argc);
            }
            BoundExprKind::NativeCall { function, args } => {
                for arg in args {
                    self.emit_expr(arg)?;
                }
                let index = match &self.symbols.get(*function).kind {
                    SymbolKind::NativeFunction(native) => native.index,
                    other => {
                        return Err(EmitError::Internal(format!(
                            "native call target is a {}",
                            other.as_str()
                        )));
                    }
                };
                let argc = count(args.len(), "argument")?;
                self.buffer.emit_u16_u16(OpCode::CallNative, index, argc);
            }
            BoundExprKind::New { .. } => {
                return Err(EmitError::Internal(
                    "object construction was not lowered".into(),
                ));
            }
            BoundExprKind::MethodGroup { name, .. } => {
                return Err(EmitError::Internal(format!(
                    "method group '{}' reached the emitter",
                    name
                )));
            }
            BoundExprKind::Error => {
                return Err(EmitError::Internal(
                    "error expression reached the emitter".into(),
                ));
            }
        }
        Ok(())
    }

    fn emit_literal(&mut self, value: &ConstantValue) -> Result<(), EmitError> {
        match value {
            ConstantValue::Null => self.buffer.emit(OpCode::LoadNull),
            ConstantValue::Bool(true) => self.buffer.emit(OpCode::LoadTrue),
            ConstantValue::Bool(false) => self.buffer.emit(OpCode::LoadFalse),
            ConstantValue::Number(n) => {
                let index = self.pool.add_number(*n)?;
                self.buffer.emit_u16(OpCode::LoadConst, index);
            }
            ConstantValue::String(s) => {
                let index = self.pool.add_string(s)?;
                self.buffer.emit_u16(OpCode::LoadConst, index);
            }
        }
        Ok(())
    }

    /// `left DUP JMP_x end POP right end:`
    ///
    /// The jump consumes the duplicate; when taken, `left` is the result.
    fn emit_short_circuit(
        &mut self,
        left: &BoundExpr,
        right: &BoundExpr,
        jump: OpCode,
    ) -> Result<(), EmitError> {
        self.emit_expr(left)?;
        self.buffer.emit(OpCode::Dup);
        let end = self.buffer.emit_jump(jump);
        self.buffer.emit(OpCode::Pop);
        self.emit_expr(right)?;
        self.buffer.patch_jump(end)
    }

    fn slot(&self, id: SymbolId) -> Result<u16, EmitError> {
        let symbol = self.symbols.get(id);
        let slot = symbol.slot().ok_or_else(|| {
            EmitError::Internal(format!(
                "{} '{}' has no storage slot",
                symbol.kind.as_str(),
                symbol.name
            ))
        })?;
        count(slot as usize, "slot")
    }
}

fn binary_opcode(op: BinaryOp) -> OpCode {
    match op {
        BinaryOp::Add => OpCode::Add,
        BinaryOp::Sub => OpCode::Sub,
        BinaryOp::Mul => OpCode::Mul,
        BinaryOp::Div => OpCode::Div,
        BinaryOp::Mod => OpCode::Mod,
        BinaryOp::Equal => OpCode::Ceq,
        BinaryOp::NotEqual => OpCode::Cne,
        BinaryOp::Less => OpCode::Clt,
        BinaryOp::LessEqual => OpCode::Cle,
        BinaryOp::Greater => OpCode::Cgt,
        BinaryOp::GreaterEqual => OpCode::Cge,
        BinaryOp::LogicalAnd | BinaryOp::LogicalOr => {
            unreachable!("short-circuit operators are emitted with jumps")
        }
    }
}

pub(crate) fn count(value: usize, what: &'static str) -> Result<u16, EmitError> {
    u16::try_from(value).map_err(|_| EmitError::TooMany { what, count: value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vectra_binder::{BindOptions, bind};
    use vectra_core::{CancellationToken, DiagnosticBag, Phase};
    use vectra_lower::lower_bodies;
    use vectra_syntax::{SyntaxBuilder, SyntaxPackage};

    fn emit_named(package: &SyntaxPackage, name: &str) -> InstructionBuffer {
        let cancel = CancellationToken::new();
        let mut diagnostics = DiagnosticBag::new(Phase::Bind);
        let mut bound = bind(package, &BindOptions::default(), &mut diagnostics, &cancel).unwrap();
        assert!(!diagnostics.has_errors(), "{}", diagnostics);

        let bodies = lower_bodies(&mut bound.declarations.symbols, bound.bodies, &cancel).unwrap();
        let symbols = &bound.declarations.symbols;
        let body = bodies
            .iter()
            .find(|b| symbols.get(b.callable).name == name)
            .unwrap();
        let mut pool = ConstantPool::new();
        MethodBodyEmitter::new(symbols, &mut pool)
            .emit(&body.block)
            .unwrap()
    }

    fn program_with(b: &SyntaxBuilder, method: vectra_syntax::MemberDecl) -> SyntaxPackage {
        b.program(vec![b.class("Program", vec![method])])
    }

    #[test]
    fn assignment_duplicates_before_store() {
        let b = SyntaxBuilder::new();
        let package = program_with(
            &b,
            b.method(
                "Main",
                "void",
                vec![b.param("y", "number")],
                vec![
                    b.let_("x", b.number(0.0)),
                    b.expr_stmt(b.assign(
                        b.ident("x"),
                        b.binary(b.ident("y"), BinaryOp::Add, b.number(1.0)),
                    )),
                ],
            ),
        );
        emit_named(&package, "Main").assert_opcodes(&[
            OpCode::LoadConst,
            OpCode::StoreLocal,
            OpCode::LoadLocal,
            OpCode::LoadConst,
            OpCode::Add,
            OpCode::Dup,
            OpCode::StoreLocal,
            OpCode::Pop,
            OpCode::LoadNull,
            OpCode::Ret,
        ]);
    }

    #[test]
    fn explicit_return_is_not_terminated_twice() {
        let b = SyntaxBuilder::new();
        let package = program_with(
            &b,
            b.method("Get", "number", vec![], vec![b.ret(Some(b.number(1.0)))]),
        );
        emit_named(&package, "Get").assert_opcodes(&[OpCode::LoadConst, OpCode::Ret]);
    }

    #[test]
    fn logical_and_short_circuits() {
        let b = SyntaxBuilder::new();
        let package = program_with(
            &b,
            b.method(
                "Both",
                "bool",
                vec![b.param("a", "bool"), b.param("c", "bool")],
                vec![b.ret(Some(b.binary(
                    b.ident("a"),
                    BinaryOp::LogicalAnd,
                    b.ident("c"),
                )))],
            ),
        );
        let buffer = emit_named(&package, "Both");
        buffer.assert_opcodes(&[
            OpCode::LoadLocal,
            OpCode::Dup,
            OpCode::JmpFalse,
            OpCode::Pop,
            OpCode::LoadLocal,
            OpCode::Ret,
        ]);
        // LOAD_LOCAL(3) DUP(1) JMP_FALSE(3) POP(1) LOAD_LOCAL(3): RET at 11
        assert_eq!(buffer.read_u16(5), Some(11));
    }

    #[test]
    fn lowered_construction() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![
            b.class(
                "Foo",
                vec![b.constructor(
                    vec![b.param("a", "number"), b.param("c", "number")],
                    vec![],
                )],
            ),
            b.class(
                "Program",
                vec![b.method(
                    "Main",
                    "void",
                    vec![],
                    vec![b.let_("f", b.new_("Foo", vec![b.number(1.0), b.number(2.0)]))],
                )],
            ),
        ]);
        let buffer = emit_named(&package, "Main");
        buffer.assert_opcodes(&[
            OpCode::NewObj,
            OpCode::StoreLocal,
            OpCode::LoadLocal,
            OpCode::LoadConst,
            OpCode::LoadConst,
            OpCode::CallCtor,
            OpCode::Pop,
            OpCode::LoadLocal,
            OpCode::StoreLocal,
            OpCode::LoadNull,
            OpCode::Ret,
        ]);
        // CALL_CTOR at 15; its argument count includes `this`
        assert_eq!(buffer.read_op(15), Some(OpCode::CallCtor));
        assert_eq!(buffer.read_u16(18), Some(3));
    }

    #[test]
    fn native_call_uses_registry_index() {
        let b = SyntaxBuilder::new();
        let package = program_with(
            &b,
            b.method(
                "Main",
                "void",
                vec![],
                vec![b.expr_stmt(b.call(b.ident("PrintLine"), vec![b.string("hi")]))],
            ),
        );
        let buffer = emit_named(&package, "Main");
        buffer.assert_opcodes(&[
            OpCode::LoadConst,
            OpCode::CallNative,
            OpCode::Pop,
            OpCode::LoadNull,
            OpCode::Ret,
        ]);
        assert_eq!(buffer.read_u16(4), Some(1));
        assert_eq!(buffer.read_u16(6), Some(1));
    }

    #[test]
    fn field_store_through_implicit_this() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Counter",
            vec![
                b.field("count", "number", None),
                b.method(
                    "Set",
                    "void",
                    vec![b.param("v", "number")],
                    vec![b.expr_stmt(b.assign(b.ident("count"), b.ident("v")))],
                ),
            ],
        )]);
        emit_named(&package, "Set").assert_opcodes(&[
            OpCode::LoadLocal,
            OpCode::Dup,
            OpCode::LoadLocal,
            OpCode::StoreMember,
            OpCode::Pop,
            OpCode::LoadNull,
            OpCode::Ret,
        ]);
    }

    #[test]
    fn unlowered_construction_is_internal_error() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![
            b.class("Foo", vec![]),
            b.class(
                "Program",
                vec![b.method(
                    "Main",
                    "void",
                    vec![],
                    vec![b.let_("f", b.new_("Foo", vec![]))],
                )],
            ),
        ]);
        let cancel = CancellationToken::new();
        let mut diagnostics = DiagnosticBag::new(Phase::Bind);
        let bound = bind(&package, &BindOptions::default(), &mut diagnostics, &cancel).unwrap();
        let symbols = &bound.declarations.symbols;
        let main = bound
            .bodies
            .iter()
            .find(|b| symbols.get(b.callable).name == "Main")
            .unwrap();

        let mut pool = ConstantPool::new();
        let result = MethodBodyEmitter::new(symbols, &mut pool).emit_body(main);
        assert!(matches!(result, Err(EmitError::Internal(_))));
    }
}
