//! Operator resolution tables.
//!
//! Binary operators resolve against a fixed table of
//! `(operator, left type, right type) -> result type` entries over the
//! built-in types. User-declared types only support `==` and `!=`, and only
//! against the identical type (reference equality).

use vectra_syntax::{BinaryOp, UnaryOp};

use crate::symbols::TypeRef;

/// A binary operator after overload selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinaryOperator {
    pub op: BinaryOp,
    pub left: TypeRef,
    pub right: TypeRef,
    pub result: TypeRef,
}

/// A unary operator after overload selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnaryOperator {
    pub op: UnaryOp,
    pub operand: TypeRef,
    pub result: TypeRef,
}

const N: TypeRef = TypeRef::NUMBER;
const B: TypeRef = TypeRef::BOOL;
const S: TypeRef = TypeRef::STRING;

static BINARY_TABLE: &[(BinaryOp, TypeRef, TypeRef, TypeRef)] = &[
    // number arithmetic
    (BinaryOp::Add, N, N, N),
    (BinaryOp::Sub, N, N, N),
    (BinaryOp::Mul, N, N, N),
    (BinaryOp::Div, N, N, N),
    (BinaryOp::Mod, N, N, N),
    // number comparison
    (BinaryOp::Less, N, N, B),
    (BinaryOp::LessEqual, N, N, B),
    (BinaryOp::Greater, N, N, B),
    (BinaryOp::GreaterEqual, N, N, B),
    (BinaryOp::Equal, N, N, B),
    (BinaryOp::NotEqual, N, N, B),
    // bool
    (BinaryOp::Equal, B, B, B),
    (BinaryOp::NotEqual, B, B, B),
    (BinaryOp::LogicalAnd, B, B, B),
    (BinaryOp::LogicalOr, B, B, B),
    // string
    (BinaryOp::Add, S, S, S),
    (BinaryOp::Equal, S, S, B),
    (BinaryOp::NotEqual, S, S, B),
    (BinaryOp::Less, S, S, B),
    (BinaryOp::LessEqual, S, S, B),
    (BinaryOp::Greater, S, S, B),
    (BinaryOp::GreaterEqual, S, S, B),
    // concatenation with numbers
    (BinaryOp::Add, S, N, S),
    (BinaryOp::Add, N, S, S),
];

static UNARY_TABLE: &[(UnaryOp, TypeRef, TypeRef)] = &[
    (UnaryOp::Neg, N, N),
    (UnaryOp::LogicalNot, B, B),
];

/// Looks up a binary operator for the given operand types.
pub fn resolve_binary(op: BinaryOp, left: TypeRef, right: TypeRef) -> Option<BinaryOperator> {
    if let (TypeRef::Named(l), TypeRef::Named(r)) = (left, right) {
        return (op.is_equality() && l == r).then_some(BinaryOperator {
            op,
            left,
            right,
            result: TypeRef::BOOL,
        });
    }

    BINARY_TABLE
        .iter()
        .find(|(o, l, r, _)| *o == op && *l == left && *r == right)
        .map(|&(op, left, right, result)| BinaryOperator {
            op,
            left,
            right,
            result,
        })
}

pub fn resolve_unary(op: UnaryOp, operand: TypeRef) -> Option<UnaryOperator> {
    UNARY_TABLE
        .iter()
        .find(|(o, t, _)| *o == op && *t == operand)
        .map(|&(op, operand, result)| UnaryOperator {
            op,
            operand,
            result,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolTable;

    #[test]
    fn arithmetic_and_comparison() {
        let add = resolve_binary(BinaryOp::Add, N, N).unwrap();
        assert_eq!(add.result, N);

        let less = resolve_binary(BinaryOp::Less, N, N).unwrap();
        assert_eq!(less.result, B);

        assert!(resolve_binary(BinaryOp::Sub, S, S).is_none());
        assert!(resolve_binary(BinaryOp::LogicalAnd, N, N).is_none());
    }

    #[test]
    fn string_number_concatenation() {
        assert_eq!(resolve_binary(BinaryOp::Add, S, N).unwrap().result, S);
        assert_eq!(resolve_binary(BinaryOp::Add, N, S).unwrap().result, S);
        assert!(resolve_binary(BinaryOp::Mul, S, N).is_none());
    }

    #[test]
    fn named_types_only_compare_for_identity() {
        let table = SymbolTable::new();
        let a = TypeRef::Named(table.builtin_symbols()[0]);
        let b = TypeRef::Named(table.builtin_symbols()[1]);

        assert_eq!(resolve_binary(BinaryOp::Equal, a, a).unwrap().result, B);
        assert!(resolve_binary(BinaryOp::NotEqual, a, a).is_some());
        assert!(resolve_binary(BinaryOp::Equal, a, b).is_none());
        assert!(resolve_binary(BinaryOp::Add, a, a).is_none());
        assert!(resolve_binary(BinaryOp::Equal, a, N).is_none());
    }

    #[test]
    fn unary() {
        assert_eq!(resolve_unary(UnaryOp::Neg, N).unwrap().result, N);
        assert_eq!(resolve_unary(UnaryOp::LogicalNot, B).unwrap().result, B);
        assert!(resolve_unary(UnaryOp::Neg, S).is_none());
    }
}
