use thiserror::Error;

#[derive(Error, Debug)]
pub enum LariatError {
    #[error("unknown prototype: {0}")]
    UnknownPrototype(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("non-finite number: {0}")]
    NonFinite(f64),

    #[error("bad document: {0}")]
    BadDocument(String),

    #[error("registry mismatch: {table} index {index} out of range ({len} registered)")]
    RegistryMismatch {
        table: &'static str,
        index: usize,
        len: usize,
    },

    #[error("invalid bignumber literal: {0}")]
    InvalidBigNum(String),

    #[error("property {0} is not writable")]
    NotWritable(String),

    #[error("property {0} is not callable")]
    NotCallable(String),

    #[error("cannot assign property {0} of a non-object value")]
    NotAnObject(String),
}
