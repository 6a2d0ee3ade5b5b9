use crate::document::ProtoTag;
use crate::error::LariatError;
use crate::value::{FunctionRef, ProtoRef, SymbolRef};
use std::rc::Rc;

// Peer-shared positional tables. Both ends must register semantically equal
// entries at matching indices; the document only carries positions.
#[derive(Default)]
pub struct Registry {
    prototypes: Vec<ProtoRef>,
    functions: Vec<FunctionRef>,
    symbols: Vec<SymbolRef>,
}

impl Registry {
    pub fn new(
        prototypes: Vec<ProtoRef>,
        functions: Vec<FunctionRef>,
        symbols: Vec<SymbolRef>,
    ) -> Registry {
        Registry {
            prototypes,
            functions,
            symbols,
        }
    }

    pub fn proto_tag(&self, proto: Option<&ProtoRef>) -> Result<ProtoTag, LariatError> {
        let Some(proto) = proto else {
            return Ok(ProtoTag::Plain);
        };
        self.prototypes
            .iter()
            .position(|p| Rc::ptr_eq(p, proto))
            .map(|index| ProtoTag::Class { index })
            .ok_or_else(|| LariatError::UnknownPrototype(proto.name().to_string()))
    }

    // Identity match first; failing that, bytewise source-text equality, so
    // two independently-built peers can share a registry defined by code.
    pub fn function_index(&self, function: &FunctionRef) -> Result<usize, LariatError> {
        self.functions
            .iter()
            .position(|f| Rc::ptr_eq(f, function) || f.source() == function.source())
            .ok_or_else(|| LariatError::UnknownFunction(function.describe()))
    }

    pub fn symbol_index(&self, symbol: &SymbolRef) -> Result<usize, LariatError> {
        self.symbols
            .iter()
            .position(|s| Rc::ptr_eq(s, symbol))
            .ok_or_else(|| LariatError::UnknownSymbol(symbol.describe()))
    }

    pub fn prototype_at(&self, index: usize) -> Result<&ProtoRef, LariatError> {
        self.prototypes
            .get(index)
            .ok_or(LariatError::RegistryMismatch {
                table: "prototype",
                index,
                len: self.prototypes.len(),
            })
    }

    pub fn function_at(&self, index: usize) -> Result<&FunctionRef, LariatError> {
        self.functions
            .get(index)
            .ok_or(LariatError::RegistryMismatch {
                table: "function",
                index,
                len: self.functions.len(),
            })
    }

    pub fn symbol_at(&self, index: usize) -> Result<&SymbolRef, LariatError> {
        self.symbols
            .get(index)
            .ok_or(LariatError::RegistryMismatch {
                table: "symbol",
                index,
                len: self.symbols.len(),
            })
    }
}
