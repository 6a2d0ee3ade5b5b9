use crate::document::{Document, Node, PropNode};
use crate::error::LariatError;
use crate::registry::Registry;
use crate::value::{PropKey, PropPayload, Property, Value};
use std::collections::HashMap;

pub struct Encoder<'r> {
    registry: &'r Registry,
    deny_non_finite: bool,
    nodes: Vec<Node>,
    seen: HashMap<usize, u32>,
}

impl<'r> Encoder<'r> {
    pub fn new(registry: &'r Registry, deny_non_finite: bool) -> Encoder<'r> {
        Encoder {
            registry,
            deny_non_finite,
            nodes: Vec::new(),
            seen: HashMap::new(),
        }
    }

    pub fn encode(mut self, root: &Value) -> Result<Document, LariatError> {
        let root_slot = self.encode_value(root)?;
        if self.nodes.is_empty() {
            // a primitive root owns the whole document
            self.nodes.push(root_slot);
        }
        Ok(Document { nodes: self.nodes })
    }

    fn encode_value(&mut self, value: &Value) -> Result<Node, LariatError> {
        let Some(key) = value.heap_id() else {
            return self.encode_body(value);
        };
        if let Some(&ordinal) = self.seen.get(&key) {
            return Ok(Node::Ref { ordinal });
        }
        let ordinal = self.nodes.len() as u32;
        // bind and reserve the position before descending, so back-edges
        // inside the body resolve to this ordinal instead of recursing
        self.seen.insert(key, ordinal);
        self.nodes.push(Node::Undefined);
        let body = self.encode_body(value)?;
        self.nodes[ordinal as usize] = body;
        Ok(Node::Ref { ordinal })
    }

    fn encode_body(&mut self, value: &Value) -> Result<Node, LariatError> {
        match value {
            Value::Undefined => Ok(Node::Undefined),
            Value::Null => Ok(Node::Null),
            Value::Bool(b) => Ok(Node::Bool { value: *b }),
            Value::Number(n) => {
                if self.deny_non_finite && !n.is_finite() {
                    return Err(LariatError::NonFinite(*n));
                }
                Ok(Node::Number { value: *n })
            }
            Value::Text(s) => Ok(Node::String { value: s.clone() }),
            Value::Symbol(s) => Ok(Node::Symbol {
                index: self.registry.symbol_index(s)?,
            }),
            Value::Function(f) => Ok(Node::Function {
                index: self.registry.function_index(f)?,
            }),
            Value::Date(d) => Ok(Node::Date {
                epoch_ms: d.epoch_ms,
            }),
            Value::BigNum(b) => Ok(Node::BigNumber {
                digits: b.digits().to_string(),
            }),
            Value::Error(e) => {
                let e = e.borrow();
                Ok(Node::Error {
                    message: e.message.clone(),
                    name: e.name.clone(),
                    stack: e.stack.clone(),
                })
            }
            Value::Array(array) => {
                let array = array.borrow();
                let mut items = Vec::with_capacity(array.len());
                for item in array.iter() {
                    items.push(self.encode_value(item)?);
                }
                Ok(Node::Array { items })
            }
            Value::Map(map) => {
                let map = map.borrow();
                let mut entries = Vec::with_capacity(map.len());
                for (key, value) in map.entries() {
                    entries.push((self.encode_value(key)?, self.encode_value(value)?));
                }
                Ok(Node::Map { entries })
            }
            Value::Set(set) => {
                let set = set.borrow();
                let mut items = Vec::with_capacity(set.len());
                for item in set.items() {
                    items.push(self.encode_value(item)?);
                }
                Ok(Node::Set { items })
            }
            Value::Object(obj) => {
                let obj = obj.borrow();
                let proto = self.registry.proto_tag(obj.proto())?;
                let mut props = Vec::with_capacity(obj.props().len());
                for (key, prop) in obj.props() {
                    props.push(self.encode_prop(key, prop)?);
                }
                Ok(Node::Object { proto, props })
            }
        }
    }

    // Captures the descriptor as-is; getters and setters are encoded as
    // function references, never invoked.
    fn encode_prop(&mut self, key: &PropKey, prop: &Property) -> Result<PropNode, LariatError> {
        let key = match key {
            PropKey::Str(s) => Node::String { value: s.clone() },
            PropKey::Sym(s) => self.encode_value(&Value::Symbol(s.clone()))?,
        };
        let (value, get, set) = match &prop.payload {
            PropPayload::Value(v) => (Some(self.encode_value(v)?), None, None),
            PropPayload::Accessor { get, set } => {
                let get = get
                    .as_ref()
                    .map(|f| self.encode_value(&Value::Function(f.clone())))
                    .transpose()?;
                let set = set
                    .as_ref()
                    .map(|f| self.encode_value(&Value::Function(f.clone())))
                    .transpose()?;
                (None, get, set)
            }
        };
        Ok(PropNode {
            key,
            value,
            get,
            set,
            enumerable: prop.enumerable,
            configurable: prop.configurable,
            writable: prop.writable,
        })
    }
}
