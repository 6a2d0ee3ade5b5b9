use crate::document::{Document, Node, ProtoTag};
use crate::error::LariatError;
use crate::registry::Registry;
use crate::value::{
    BigNum, Date, ErrObj, FunctionRef, Obj, OrderedMap, OrderedSet, PropKey, PropPayload,
    Property, Value,
};
use std::cell::RefCell;
use std::rc::Rc;

pub struct Decoder<'r> {
    registry: &'r Registry,
}

impl<'r> Decoder<'r> {
    pub fn new(registry: &'r Registry) -> Decoder<'r> {
        Decoder { registry }
    }

    // Two passes: allocate a shell per node without following refs, then
    // populate against the complete shell table. Cycles resolve because every
    // ordinal is materialized before any ref is dereferenced.
    pub fn decode(&self, doc: &Document) -> Result<Value, LariatError> {
        if doc.nodes.is_empty() {
            return Err(LariatError::BadDocument("empty document".to_string()));
        }
        let mut shells = Vec::with_capacity(doc.nodes.len());
        for (at, node) in doc.nodes.iter().enumerate() {
            shells.push(self.allocate(at, node)?);
        }
        for (at, node) in doc.nodes.iter().enumerate() {
            self.populate(at, node, &shells)?;
        }
        Ok(shells[0].clone())
    }

    fn allocate(&self, at: usize, node: &Node) -> Result<Value, LariatError> {
        match node {
            Node::Undefined => Ok(Value::Undefined),
            Node::Null => Ok(Value::Null),
            Node::Bool { value } => Ok(Value::Bool(*value)),
            Node::Number { value } => Ok(Value::Number(*value)),
            Node::String { value } => Ok(Value::Text(value.clone())),
            Node::Date { epoch_ms } => Ok(Value::Date(Rc::new(Date {
                epoch_ms: *epoch_ms,
            }))),
            Node::BigNumber { digits } => {
                let parsed = BigNum::parse(digits).map_err(|_| {
                    LariatError::BadDocument(format!("node {at}: bad bignumber literal {digits:?}"))
                })?;
                Ok(Value::BigNum(Rc::new(parsed)))
            }
            Node::Symbol { index } => Ok(Value::Symbol(self.registry.symbol_at(*index)?.clone())),
            Node::Function { index } => {
                Ok(Value::Function(self.registry.function_at(*index)?.clone()))
            }
            Node::Array { items } => Ok(Value::Array(Rc::new(RefCell::new(vec![
                Value::Undefined;
                items.len()
            ])))),
            Node::Map { .. } => Ok(Value::Map(Rc::new(RefCell::new(OrderedMap::new())))),
            Node::Set { .. } => Ok(Value::Set(Rc::new(RefCell::new(OrderedSet::new())))),
            Node::Error { message, .. } => Ok(Value::Error(Rc::new(RefCell::new(ErrObj {
                message: message.clone(),
                name: None,
                stack: None,
            })))),
            Node::Object { proto, .. } => match proto {
                ProtoTag::Plain => Ok(Value::Object(Obj::plain())),
                // allocated against the prototype directly; no constructor runs
                ProtoTag::Class { index } => Ok(Value::Object(Obj::with_proto(
                    self.registry.prototype_at(*index)?,
                ))),
            },
            Node::Ref { ordinal } => Err(LariatError::BadDocument(format!(
                "node {at}: ref to {ordinal} at node position"
            ))),
        }
    }

    fn populate(&self, at: usize, node: &Node, shells: &[Value]) -> Result<(), LariatError> {
        match (node, &shells[at]) {
            (Node::Array { items }, Value::Array(array)) => {
                let mut slots = array.borrow_mut();
                for (i, item) in items.iter().enumerate() {
                    slots[i] = resolve(at, item, shells)?;
                }
                Ok(())
            }
            (Node::Map { entries }, Value::Map(map)) => {
                let mut map = map.borrow_mut();
                for (key, value) in entries {
                    let key = resolve(at, key, shells)?;
                    let value = resolve(at, value, shells)?;
                    map.insert(key, value);
                }
                Ok(())
            }
            (Node::Set { items }, Value::Set(set)) => {
                let mut set = set.borrow_mut();
                for item in items {
                    set.add(resolve(at, item, shells)?);
                }
                Ok(())
            }
            (Node::Error { name, stack, .. }, Value::Error(err)) => {
                let mut err = err.borrow_mut();
                err.name = name.clone();
                err.stack = stack.clone();
                Ok(())
            }
            (Node::Object { props, .. }, Value::Object(obj)) => {
                for prop in props {
                    let key = resolve_key(at, &prop.key, shells)?;
                    let payload = if prop.get.is_some() || prop.set.is_some() {
                        if prop.value.is_some() {
                            return Err(LariatError::BadDocument(format!(
                                "node {at}: property carries both a value and an accessor"
                            )));
                        }
                        let get = prop
                            .get
                            .as_ref()
                            .map(|slot| resolve_function(at, slot, shells))
                            .transpose()?;
                        let set = prop
                            .set
                            .as_ref()
                            .map(|slot| resolve_function(at, slot, shells))
                            .transpose()?;
                        PropPayload::Accessor { get, set }
                    } else {
                        let value = match &prop.value {
                            Some(slot) => resolve(at, slot, shells)?,
                            None => {
                                return Err(LariatError::BadDocument(format!(
                                    "node {at}: property carries neither a value nor an accessor"
                                )));
                            }
                        };
                        PropPayload::Value(value)
                    };
                    obj.borrow_mut().define(
                        key,
                        Property {
                            payload,
                            enumerable: prop.enumerable,
                            configurable: prop.configurable,
                            writable: prop.writable,
                        },
                    );
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn resolve(at: usize, slot: &Node, shells: &[Value]) -> Result<Value, LariatError> {
    match slot {
        Node::Undefined => Ok(Value::Undefined),
        Node::Null => Ok(Value::Null),
        Node::Bool { value } => Ok(Value::Bool(*value)),
        Node::Number { value } => Ok(Value::Number(*value)),
        Node::String { value } => Ok(Value::Text(value.clone())),
        Node::Ref { ordinal } => shells.get(*ordinal as usize).cloned().ok_or_else(|| {
            LariatError::BadDocument(format!("node {at}: dangling ref {ordinal}"))
        }),
        other => Err(LariatError::BadDocument(format!(
            "node {at}: {} is not an inline value",
            other.kind()
        ))),
    }
}

fn resolve_function(at: usize, slot: &Node, shells: &[Value]) -> Result<FunctionRef, LariatError> {
    match resolve(at, slot, shells)? {
        Value::Function(f) => Ok(f),
        _ => Err(LariatError::BadDocument(format!(
            "node {at}: accessor slot does not reference a function"
        ))),
    }
}

fn resolve_key(at: usize, slot: &Node, shells: &[Value]) -> Result<PropKey, LariatError> {
    match slot {
        Node::String { value } => Ok(PropKey::Str(value.clone())),
        Node::Ref { .. } => match resolve(at, slot, shells)? {
            Value::Symbol(s) => Ok(PropKey::Sym(s)),
            _ => Err(LariatError::BadDocument(format!(
                "node {at}: property key ref is not a symbol"
            ))),
        },
        other => Err(LariatError::BadDocument(format!(
            "node {at}: property key must be a string or a symbol ref, got {}",
            other.kind()
        ))),
    }
}
