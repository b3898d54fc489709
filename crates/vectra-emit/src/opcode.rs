//! Bytecode operation codes.
//!
//! Each opcode is a single byte. Operands follow inline as u16 little-endian
//! values; an instruction has zero, one or two of them.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Bytecode operation codes.
///
/// The VM is a stack machine. Expression code leaves one value on the stack;
/// statement code leaves none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum OpCode {
    // =========================================================================
    // Stack
    // =========================================================================
    Nop = 0x00,
    /// Pop top of stack.
    Pop = 0x01,
    /// Duplicate top of stack.
    Dup = 0x02,

    // =========================================================================
    // Locals
    // =========================================================================
    /// Operand: slot
    LoadLocal = 0x10,
    /// Pops the value. Operand: slot
    StoreLocal = 0x11,

    // =========================================================================
    // Constants
    // =========================================================================
    /// Operand: pool index
    LoadConst = 0x20,
    LoadNull = 0x21,
    LoadTrue = 0x22,
    LoadFalse = 0x23,

    // =========================================================================
    // Objects
    // =========================================================================
    /// Pushes an uninitialized instance. Operand: type pool index
    NewObj = 0x30,
    /// Pops the receiver, pushes the member. Operand: member pool index
    LoadMember = 0x31,
    /// Pops the receiver, then the value. Operand: member pool index
    StoreMember = 0x32,

    // =========================================================================
    // Calls
    // =========================================================================
    /// Operands: method pool index, argument count including `this`
    Call = 0x40,
    /// Operands: constructor pool index, argument count including `this`
    CallCtor = 0x41,
    Ret = 0x42,
    /// Operands: native index, argument count
    CallNative = 0x43,

    // =========================================================================
    // Arithmetic
    // =========================================================================
    Add = 0x50,
    Sub = 0x51,
    Mul = 0x52,
    Div = 0x53,
    Mod = 0x54,
    Neg = 0x55,
    Not = 0x56,

    // =========================================================================
    // Comparison
    // =========================================================================
    Ceq = 0x60,
    Cne = 0x61,
    Clt = 0x62,
    Cle = 0x63,
    Cgt = 0x64,
    Cge = 0x65,

    // =========================================================================
    // Control Flow
    // =========================================================================
    /// Operand: absolute byte offset
    Jmp = 0x70,
    /// Pops the condition. Operand: absolute byte offset
    JmpTrue = 0x71,
    /// Pops the condition. Operand: absolute byte offset
    JmpFalse = 0x72,
}

impl OpCode {
    /// Decode an opcode byte.
    #[inline]
    pub fn from_u8(byte: u8) -> Option<Self> {
        Self::try_from(byte).ok()
    }

    /// Number of u16 operands following the opcode.
    pub fn operand_count(self) -> usize {
        match self {
            OpCode::Call | OpCode::CallCtor | OpCode::CallNative => 2,
            OpCode::LoadLocal
            | OpCode::StoreLocal
            | OpCode::LoadConst
            | OpCode::NewObj
            | OpCode::LoadMember
            | OpCode::StoreMember
            | OpCode::Jmp
            | OpCode::JmpTrue
            | OpCode::JmpFalse => 1,
            _ => 0,
        }
    }

    /// Operand bytes following the opcode.
    #[inline]
    pub fn operand_size(self) -> usize {
        self.operand_count() * 2
    }

    pub fn name(self) -> &'static str {
        match self {
            OpCode::Nop => "NOP",
            OpCode::Pop => "POP",
            OpCode::Dup => "DUP",
            OpCode::LoadLocal => "LOAD_LOCAL",
            OpCode::StoreLocal => "STORE_LOCAL",
            OpCode::LoadConst => "LOAD_CONST",
            OpCode::LoadNull => "LOAD_NULL",
            OpCode::LoadTrue => "LOAD_TRUE",
            OpCode::LoadFalse => "LOAD_FALSE",
            OpCode::NewObj => "NEW_OBJ",
            OpCode::LoadMember => "LOAD_MEMBER",
            OpCode::StoreMember => "STORE_MEMBER",
            OpCode::Call => "CALL",
            OpCode::CallCtor => "CALL_CTOR",
            OpCode::Ret => "RET",
            OpCode::CallNative => "CALL_NATIVE",
            OpCode::Add => "ADD",
            OpCode::Sub => "SUB",
            OpCode::Mul => "MUL",
            OpCode::Div => "DIV",
            OpCode::Mod => "MOD",
            OpCode::Neg => "NEG",
            OpCode::Not => "NOT",
            OpCode::Ceq => "CEQ",
            OpCode::Cne => "CNE",
            OpCode::Clt => "CLT",
            OpCode::Cle => "CLE",
            OpCode::Cgt => "CGT",
            OpCode::Cge => "CGE",
            OpCode::Jmp => "JMP",
            OpCode::JmpTrue => "JMP_TRUE",
            OpCode::JmpFalse => "JMP_FALSE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_repr() {
        assert_eq!(u8::from(OpCode::Nop), 0x00);
        assert_eq!(u8::from(OpCode::CallNative), 0x43);
        assert_eq!(OpCode::JmpFalse as u8, 0x72);
    }

    #[test]
    fn opcode_from_u8() {
        assert_eq!(OpCode::from_u8(0x11), Some(OpCode::StoreLocal));
        assert_eq!(OpCode::from_u8(0x65), Some(OpCode::Cge));
        assert_eq!(OpCode::from_u8(0x03), None);
        assert_eq!(OpCode::from_u8(0xFF), None);
    }

    #[test]
    fn opcode_name() {
        assert_eq!(OpCode::LoadConst.name(), "LOAD_CONST");
        assert_eq!(OpCode::JmpTrue.name(), "JMP_TRUE");
    }

    #[test]
    fn operand_sizes() {
        assert_eq!(OpCode::Pop.operand_size(), 0);
        assert_eq!(OpCode::Ret.operand_size(), 0);
        assert_eq!(OpCode::LoadLocal.operand_size(), 2);
        assert_eq!(OpCode::Jmp.operand_size(), 2);
        assert_eq!(OpCode::Call.operand_size(), 4);
        assert_eq!(OpCode::CallNative.operand_size(), 4);
    }
}
