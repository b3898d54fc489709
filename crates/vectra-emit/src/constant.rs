//! Constant pool for emitted modules.
//!
//! One pool per module. Every entry is identified by a descriptor; adding a
//! descriptor that is already present returns the existing index, so an
//! index handed out once stays valid for the whole module.
//!
//! | Kind | Tag | Descriptor |
//! |------|-----|------------|
//! | Type | 1 | `Space.Type` |
//! | Constructor | 2 | `Space.Type::.ctor(number,string)` |
//! | Method | 3 | `Space.Type::Name(number)` |
//! | Field | 4 | `Space.Type::name` |
//! | Property | 5 | `Space.Type::Name` |
//! | String | 6 | the literal text |
//! | Number | 7 | the value, by bit pattern |
//!
//! Callable descriptors list parameter type names without `this`.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;
use tracing::trace;
use vectra_binder::{CONSTRUCTOR_NAME, SymbolId, SymbolKind, SymbolTable};

use crate::EmitError;

/// Wire tag of a pool entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ConstantKind {
    Type = 1,
    Constructor = 2,
    Method = 3,
    Field = 4,
    Property = 5,
    String = 6,
    Number = 7,
}

/// Values stored in the constant pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    Type(String),
    Constructor(String),
    Method(String),
    Field(String),
    Property(String),
    String(String),
    Number(OrderedFloat<f64>),
}

impl Constant {
    pub fn kind(&self) -> ConstantKind {
        match self {
            Constant::Type(_) => ConstantKind::Type,
            Constant::Constructor(_) => ConstantKind::Constructor,
            Constant::Method(_) => ConstantKind::Method,
            Constant::Field(_) => ConstantKind::Field,
            Constant::Property(_) => ConstantKind::Property,
            Constant::String(_) => ConstantKind::String,
            Constant::Number(_) => ConstantKind::Number,
        }
    }

    /// Descriptor text; `None` for numbers.
    pub fn text(&self) -> Option<&str> {
        match self {
            Constant::Type(s)
            | Constant::Constructor(s)
            | Constant::Method(s)
            | Constant::Field(s)
            | Constant::Property(s)
            | Constant::String(s) => Some(s),
            Constant::Number(_) => None,
        }
    }

    /// The pool entry describing a declared type or member.
    ///
    /// Returns `None` for symbols that never enter the pool (locals,
    /// parameters, built-ins, native functions).
    pub fn for_symbol(symbols: &SymbolTable, id: SymbolId) -> Option<Constant> {
        let symbol = symbols.get(id);
        let owner_name = |owner: SymbolId| symbols.named_type(owner).full_name.as_str();
        let signature = |params: &[SymbolId]| {
            params
                .iter()
                .skip(1)
                .map(|&p| symbols.type_name(symbols.parameter(p).ty))
                .collect::<Vec<_>>()
                .join(",")
        };

        Some(match &symbol.kind {
            SymbolKind::NamedType(ty) => Constant::Type(ty.full_name.clone()),
            SymbolKind::Constructor(c) => Constant::Constructor(format!(
                "{}::{}({})",
                owner_name(c.containing_type),
                CONSTRUCTOR_NAME,
                signature(&c.params)
            )),
            SymbolKind::Method(c) => Constant::Method(format!(
                "{}::{}({})",
                owner_name(c.containing_type),
                symbol.name,
                signature(&c.params)
            )),
            SymbolKind::Field(f) => {
                Constant::Field(format!("{}::{}", owner_name(f.containing_type), symbol.name))
            }
            SymbolKind::Property(p) => {
                Constant::Property(format!("{}::{}", owner_name(p.containing_type), symbol.name))
            }
            SymbolKind::BuiltInType(_)
            | SymbolKind::Local(_)
            | SymbolKind::Parameter(_)
            | SymbolKind::NativeFunction(_) => return None,
        })
    }
}

/// Deduplication key. Numbers compare by bit pattern, so `0.0` and `-0.0`
/// are distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConstantKey {
    Text(ConstantKind, String),
    Number(u64),
}

impl ConstantKey {
    fn of(constant: &Constant) -> Self {
        match constant {
            Constant::Number(n) => ConstantKey::Number(n.0.to_bits()),
            other => ConstantKey::Text(other.kind(), other.text().unwrap_or_default().to_string()),
        }
    }
}

/// Module-level constant pool with deduplication.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    constants: Vec<Constant>,
    index: FxHashMap<ConstantKey, u16>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or get an existing constant.
    pub fn add(&mut self, constant: Constant) -> Result<u16, EmitError> {
        let key = ConstantKey::of(&constant);
        if let Some(&idx) = self.index.get(&key) {
            return Ok(idx);
        }

        let idx = u16::try_from(self.constants.len()).map_err(|_| EmitError::ConstantPoolFull)?;
        trace!(index = idx, kind = ?constant.kind(), "constant added");
        self.constants.push(constant);
        self.index.insert(key, idx);
        Ok(idx)
    }

    pub fn add_string(&mut self, value: &str) -> Result<u16, EmitError> {
        self.add(Constant::String(value.to_string()))
    }

    pub fn add_number(&mut self, value: f64) -> Result<u16, EmitError> {
        self.add(Constant::Number(OrderedFloat(value)))
    }

    /// Add the descriptor of a type, constructor, method, field or property.
    pub fn add_symbol(&mut self, symbols: &SymbolTable, id: SymbolId) -> Result<u16, EmitError> {
        let constant = Constant::for_symbol(symbols, id).ok_or_else(|| {
            EmitError::Internal(format!(
                "{} '{}' has no constant pool descriptor",
                symbols.get(id).kind.as_str(),
                symbols.get(id).name
            ))
        })?;
        self.add(constant)
    }

    /// Index of an already present constant.
    pub fn index_of(&self, constant: &Constant) -> Option<u16> {
        self.index.get(&ConstantKey::of(constant)).copied()
    }

    pub fn get(&self, index: u16) -> Option<&Constant> {
        self.constants.get(index as usize)
    }

    /// All constants in index order (for serialization).
    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vectra_binder::{BindOptions, bind};
    use vectra_core::{CancellationToken, DiagnosticBag, Phase};
    use vectra_syntax::SyntaxBuilder;

    #[test]
    fn new_pool_is_empty() {
        let pool = ConstantPool::new();
        assert!(pool.is_empty());
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn strings_deduplicate() {
        let mut pool = ConstantPool::new();
        let first = pool.add_string("x").unwrap();
        let second = pool.add_string("x").unwrap();
        assert_eq!(first, second);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(first), Some(&Constant::String("x".into())));
    }

    #[test]
    fn numbers_deduplicate_by_bits() {
        let mut pool = ConstantPool::new();
        let one = pool.add_number(1.0).unwrap();
        assert_eq!(pool.add_number(1.0).unwrap(), one);
        let zero = pool.add_number(0.0).unwrap();
        let negative_zero = pool.add_number(-0.0).unwrap();
        assert_ne!(zero, negative_zero);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn same_text_different_kind_is_distinct() {
        let mut pool = ConstantPool::new();
        let string = pool.add_string("App.Program").unwrap();
        let ty = pool.add(Constant::Type("App.Program".into())).unwrap();
        assert_ne!(string, ty);
        assert_eq!(pool.get(ty).map(Constant::kind), Some(ConstantKind::Type));
    }

    #[test]
    fn full_pool_reports_overflow() {
        let mut pool = ConstantPool::new();
        for i in 0..=u16::MAX as u32 {
            pool.add_number(i as f64).unwrap();
        }
        assert_eq!(pool.len(), 65536);
        assert_eq!(pool.add_number(0.0).unwrap(), 0);
        assert!(matches!(
            pool.add_string("one too many"),
            Err(EmitError::ConstantPoolFull)
        ));
    }

    #[test]
    fn symbol_descriptors() {
        let b = SyntaxBuilder::new();
        let package = b.program(vec![b.class(
            "Program",
            vec![
                b.field("count", "number", None),
                b.property("Name", "string", true, true),
                b.constructor(vec![b.param("n", "number")], vec![]),
                b.method(
                    "Greet",
                    "string",
                    vec![b.param("who", "string"), b.param("times", "number")],
                    vec![b.ret(Some(b.ident("who")))],
                ),
            ],
        )]);
        let mut diagnostics = DiagnosticBag::new(Phase::Bind);
        let bound = bind(
            &package,
            &BindOptions::default(),
            &mut diagnostics,
            &CancellationToken::new(),
        )
        .unwrap();
        let symbols = &bound.declarations.symbols;
        let program = bound.declarations.find_type("App.Program").unwrap();

        let descriptors: Vec<Constant> = std::iter::once(program)
            .chain(symbols.named_type(program).member_order.iter().copied())
            .map(|id| Constant::for_symbol(symbols, id).unwrap())
            .collect();
        assert_eq!(
            descriptors,
            vec![
                Constant::Type("App.Program".into()),
                Constant::Field("App.Program::count".into()),
                Constant::Property("App.Program::Name".into()),
                Constant::Constructor("App.Program::.ctor(number)".into()),
                Constant::Method("App.Program::Greet(string,number)".into()),
            ]
        );

        let mut pool = ConstantPool::new();
        let first = pool.add_symbol(symbols, program).unwrap();
        assert_eq!(pool.add_symbol(symbols, program).unwrap(), first);
    }
}
