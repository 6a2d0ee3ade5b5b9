use crate::error::LariatError;
use crate::value::BigNum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Undefined,
    Null,
    Bool {
        value: bool,
    },
    Number {
        value: f64,
    },
    String {
        value: String,
    },
    Date {
        epoch_ms: i64,
    },
    #[serde(rename = "bignumber")]
    BigNumber {
        digits: String,
    },
    Symbol {
        index: usize,
    },
    Function {
        index: usize,
    },
    Array {
        items: Vec<Node>,
    },
    Map {
        entries: Vec<(Node, Node)>,
    },
    Set {
        items: Vec<Node>,
    },
    Error {
        message: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        stack: Option<String>,
    },
    Object {
        proto: ProtoTag,
        props: Vec<PropNode>,
    },
    Ref {
        ordinal: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtoTag {
    Plain,
    Class { index: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropNode {
    pub key: Node,
    #[serde(default)]
    pub value: Option<Node>,
    #[serde(default)]
    pub get: Option<Node>,
    #[serde(default)]
    pub set: Option<Node>,
    pub enumerable: bool,
    pub configurable: bool,
    pub writable: bool,
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Undefined => "undefined",
            Node::Null => "null",
            Node::Bool { .. } => "bool",
            Node::Number { .. } => "number",
            Node::String { .. } => "string",
            Node::Date { .. } => "date",
            Node::BigNumber { .. } => "bignumber",
            Node::Symbol { .. } => "symbol",
            Node::Function { .. } => "function",
            Node::Array { .. } => "array",
            Node::Map { .. } => "map",
            Node::Set { .. } => "set",
            Node::Error { .. } => "error",
            Node::Object { .. } => "object",
            Node::Ref { .. } => "ref",
        }
    }
}

impl Document {
    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // Registry-free structural validation; transports can reject a damaged
    // document before attempting a decode.
    pub fn check(&self) -> Result<(), LariatError> {
        if self.nodes.is_empty() {
            return Err(LariatError::BadDocument("empty document".to_string()));
        }
        for (at, node) in self.nodes.iter().enumerate() {
            self.check_node(at, node)?;
        }
        Ok(())
    }

    fn check_node(&self, at: usize, node: &Node) -> Result<(), LariatError> {
        match node {
            Node::Ref { ordinal } => Err(LariatError::BadDocument(format!(
                "node {at}: ref to {ordinal} at node position"
            ))),
            Node::BigNumber { digits } => BigNum::parse(digits).map(|_| ()).map_err(|_| {
                LariatError::BadDocument(format!("node {at}: bad bignumber literal {digits:?}"))
            }),
            Node::Array { items } | Node::Set { items } => {
                for item in items {
                    self.check_slot(at, item)?;
                }
                Ok(())
            }
            Node::Map { entries } => {
                for (key, value) in entries {
                    self.check_slot(at, key)?;
                    self.check_slot(at, value)?;
                }
                Ok(())
            }
            Node::Object { props, .. } => {
                for prop in props {
                    self.check_prop(at, prop)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn check_slot(&self, at: usize, slot: &Node) -> Result<(), LariatError> {
        match slot {
            Node::Undefined
            | Node::Null
            | Node::Bool { .. }
            | Node::Number { .. }
            | Node::String { .. } => Ok(()),
            Node::Ref { ordinal } => {
                if (*ordinal as usize) < self.nodes.len() {
                    Ok(())
                } else {
                    Err(LariatError::BadDocument(format!(
                        "node {at}: dangling ref {ordinal}"
                    )))
                }
            }
            other => Err(LariatError::BadDocument(format!(
                "node {at}: {} is not an inline value",
                other.kind()
            ))),
        }
    }

    fn check_prop(&self, at: usize, prop: &PropNode) -> Result<(), LariatError> {
        match &prop.key {
            Node::String { .. } | Node::Ref { .. } => self.check_slot(at, &prop.key)?,
            other => {
                return Err(LariatError::BadDocument(format!(
                    "node {at}: property key must be a string or a symbol ref, got {}",
                    other.kind()
                )));
            }
        }
        let has_accessor = prop.get.is_some() || prop.set.is_some();
        if has_accessor && prop.value.is_some() {
            return Err(LariatError::BadDocument(format!(
                "node {at}: property carries both a value and an accessor"
            )));
        }
        if !has_accessor && prop.value.is_none() {
            return Err(LariatError::BadDocument(format!(
                "node {at}: property carries neither a value nor an accessor"
            )));
        }
        if let Some(value) = &prop.value {
            self.check_slot(at, value)?;
        }
        for accessor in [&prop.get, &prop.set].into_iter().flatten() {
            match accessor {
                Node::Ref { .. } => self.check_slot(at, accessor)?,
                other => {
                    return Err(LariatError::BadDocument(format!(
                        "node {at}: accessor slot must reference a function node, got {}",
                        other.kind()
                    )));
                }
            }
        }
        Ok(())
    }
}
