pub mod decode;
pub mod document;
pub mod encode;
pub mod error;
pub mod marshal;
pub mod registry;
pub mod storage;
pub mod value;

pub use document::{Document, Node};
pub use error::LariatError;
pub use marshal::{Config, Marshaller};
pub use value::Value;
