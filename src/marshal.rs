use crate::decode::Decoder;
use crate::document::Document;
use crate::encode::Encoder;
use crate::error::LariatError;
use crate::registry::Registry;
use crate::value::{FunctionRef, ProtoRef, SymbolRef, Value};

#[derive(Default)]
pub struct Config {
    pub prototypes: Vec<ProtoRef>,
    pub functions: Vec<FunctionRef>,
    pub symbols: Vec<SymbolRef>,
    pub deny_non_finite: bool,
}

/// Encode/decode entry point over a fixed registry.
///
/// Instances are rebuilt against their prototype without running any
/// constructor, so state that must survive a round trip has to live in own
/// properties, not inside closures or native fields.
pub struct Marshaller {
    registry: Registry,
    deny_non_finite: bool,
}

impl Marshaller {
    pub fn new(config: Config) -> Marshaller {
        Marshaller {
            registry: Registry::new(config.prototypes, config.functions, config.symbols),
            deny_non_finite: config.deny_non_finite,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn marshal(&self, value: &Value) -> Result<Document, LariatError> {
        Encoder::new(&self.registry, self.deny_non_finite).encode(value)
    }

    pub fn unmarshal(&self, doc: &Document) -> Result<Value, LariatError> {
        Decoder::new(&self.registry).decode(doc)
    }
}
