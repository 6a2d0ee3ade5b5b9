use crate::error::LariatError;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub type DateRef = Rc<Date>;
pub type BigRef = Rc<BigNum>;
pub type SymbolRef = Rc<SymbolData>;
pub type FunctionRef = Rc<FunctionData>;
pub type ProtoRef = Rc<Prototype>;
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type MapRef = Rc<RefCell<OrderedMap>>;
pub type SetRef = Rc<RefCell<OrderedSet>>;
pub type ErrRef = Rc<RefCell<ErrObj>>;
pub type ObjRef = Rc<RefCell<Obj>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Date {
    pub epoch_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigNum {
    digits: String,
}

impl BigNum {
    pub fn parse(text: &str) -> Result<BigNum, LariatError> {
        if is_decimal_literal(text) {
            Ok(BigNum {
                digits: text.to_string(),
            })
        } else {
            Err(LariatError::InvalidBigNum(text.to_string()))
        }
    }

    pub fn digits(&self) -> &str {
        &self.digits
    }
}

fn is_decimal_literal(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (mantissa, exponent) = match unsigned.split_once(|c: char| c == 'e' || c == 'E') {
        Some((m, e)) => (m, Some(e)),
        None => (unsigned, None),
    };
    let (integer, fraction) = match mantissa.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (mantissa, None),
    };
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(integer) {
        return false;
    }
    if let Some(f) = fraction {
        if !all_digits(f) {
            return false;
        }
    }
    if let Some(e) = exponent {
        let e = e.strip_prefix('+').or_else(|| e.strip_prefix('-')).unwrap_or(e);
        if !all_digits(e) {
            return false;
        }
    }
    true
}

#[derive(Debug)]
pub struct SymbolData {
    description: Option<String>,
}

impl SymbolData {
    pub fn new(description: &str) -> SymbolRef {
        Rc::new(SymbolData {
            description: Some(description.to_string()),
        })
    }

    pub fn anonymous() -> SymbolRef {
        Rc::new(SymbolData { description: None })
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn describe(&self) -> String {
        match &self.description {
            Some(d) => d.clone(),
            None => "<anonymous symbol>".to_string(),
        }
    }
}

type NativeFn = Box<dyn Fn(&Value, &[Value]) -> Value>;

pub struct FunctionData {
    name: Option<String>,
    source: String,
    body: NativeFn,
}

impl FunctionData {
    pub fn native(
        name: &str,
        source: &str,
        body: impl Fn(&Value, &[Value]) -> Value + 'static,
    ) -> FunctionRef {
        Rc::new(FunctionData {
            name: Some(name.to_string()),
            source: source.to_string(),
            body: Box::new(body),
        })
    }

    pub fn anonymous(
        source: &str,
        body: impl Fn(&Value, &[Value]) -> Value + 'static,
    ) -> FunctionRef {
        Rc::new(FunctionData {
            name: None,
            source: source.to_string(),
            body: Box::new(body),
        })
    }

    pub fn call(&self, this: &Value, args: &[Value]) -> Value {
        (self.body)(this, args)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn describe(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("<anonymous: {}>", self.source),
        }
    }
}

impl fmt::Debug for FunctionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionData")
            .field("name", &self.name)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct Prototype {
    name: String,
    methods: Vec<(String, FunctionRef)>,
}

impl Prototype {
    pub fn new(name: &str) -> Prototype {
        Prototype {
            name: name.to_string(),
            methods: Vec::new(),
        }
    }

    pub fn method(mut self, name: &str, function: FunctionRef) -> Prototype {
        self.methods.push((name.to_string(), function));
        self
    }

    pub fn lookup(&self, name: &str) -> Option<&FunctionRef> {
        self.methods.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone)]
pub enum PropKey {
    Str(String),
    Sym(SymbolRef),
}

impl PropKey {
    pub fn matches(&self, other: &PropKey) -> bool {
        match (self, other) {
            (PropKey::Str(a), PropKey::Str(b)) => a == b,
            (PropKey::Sym(a), PropKey::Sym(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for PropKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropKey::Str(s) => write!(f, "{}", s),
            PropKey::Sym(s) => write!(f, "Symbol({})", s.describe()),
        }
    }
}

impl From<&str> for PropKey {
    fn from(name: &str) -> PropKey {
        PropKey::Str(name.to_string())
    }
}

impl From<String> for PropKey {
    fn from(name: String) -> PropKey {
        PropKey::Str(name)
    }
}

impl From<SymbolRef> for PropKey {
    fn from(symbol: SymbolRef) -> PropKey {
        PropKey::Sym(symbol)
    }
}

impl From<&SymbolRef> for PropKey {
    fn from(symbol: &SymbolRef) -> PropKey {
        PropKey::Sym(symbol.clone())
    }
}

#[derive(Debug, Clone)]
pub enum PropPayload {
    Value(Value),
    Accessor {
        get: Option<FunctionRef>,
        set: Option<FunctionRef>,
    },
}

#[derive(Debug, Clone)]
pub struct Property {
    pub payload: PropPayload,
    pub enumerable: bool,
    pub configurable: bool,
    pub writable: bool,
}

impl Property {
    pub fn data(value: Value) -> Property {
        Property {
            payload: PropPayload::Value(value),
            enumerable: true,
            configurable: true,
            writable: true,
        }
    }

    pub fn accessor(get: Option<FunctionRef>, set: Option<FunctionRef>) -> Property {
        Property {
            payload: PropPayload::Accessor { get, set },
            enumerable: true,
            configurable: true,
            writable: false,
        }
    }

    pub fn enumerable(mut self, yes: bool) -> Property {
        self.enumerable = yes;
        self
    }

    pub fn configurable(mut self, yes: bool) -> Property {
        self.configurable = yes;
        self
    }

    pub fn writable(mut self, yes: bool) -> Property {
        self.writable = yes;
        self
    }
}

#[derive(Debug)]
pub struct Obj {
    proto: Option<ProtoRef>,
    props: Vec<(PropKey, Property)>,
}

impl Obj {
    pub fn plain() -> ObjRef {
        Rc::new(RefCell::new(Obj {
            proto: None,
            props: Vec::new(),
        }))
    }

    pub fn with_proto(proto: &ProtoRef) -> ObjRef {
        Rc::new(RefCell::new(Obj {
            proto: Some(proto.clone()),
            props: Vec::new(),
        }))
    }

    pub fn proto(&self) -> Option<&ProtoRef> {
        self.proto.as_ref()
    }

    // Low-level define: installs the descriptor verbatim, never fires accessors.
    pub fn define(&mut self, key: PropKey, prop: Property) {
        if let Some(slot) = self.props.iter_mut().find(|(k, _)| k.matches(&key)) {
            slot.1 = prop;
        } else {
            self.props.push((key, prop));
        }
    }

    pub fn lookup(&self, key: &PropKey) -> Option<&Property> {
        self.props.iter().find(|(k, _)| k.matches(key)).map(|(_, p)| p)
    }

    pub fn props(&self) -> &[(PropKey, Property)] {
        &self.props
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderedMap {
    entries: Vec<(Value, Value)>,
}

impl OrderedMap {
    pub fn new() -> OrderedMap {
        OrderedMap::default()
    }

    pub fn insert(&mut self, key: Value, value: Value) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k.same_value(&key)) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.same_value(key))
            .map(|(_, v)| v)
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderedSet {
    items: Vec<Value>,
}

impl OrderedSet {
    pub fn new() -> OrderedSet {
        OrderedSet::default()
    }

    pub fn add(&mut self, value: Value) {
        if !self.has(&value) {
            self.items.push(value);
        }
    }

    pub fn has(&self, value: &Value) -> bool {
        self.items.iter().any(|v| v.same_value(value))
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ErrObj {
    pub message: String,
    pub name: Option<String>,
    pub stack: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(DateRef),
    BigNum(BigRef),
    Symbol(SymbolRef),
    Function(FunctionRef),
    Array(ArrayRef),
    Map(MapRef),
    Set(SetRef),
    Error(ErrRef),
    Object(ObjRef),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Value {
        Value::Text(s.into())
    }

    pub fn date(epoch_ms: i64) -> Value {
        Value::Date(Rc::new(Date { epoch_ms }))
    }

    pub fn big(digits: &str) -> Result<Value, LariatError> {
        Ok(Value::BigNum(Rc::new(BigNum::parse(digits)?)))
    }

    pub fn error(message: &str) -> Value {
        Value::Error(Rc::new(RefCell::new(ErrObj {
            message: message.to_string(),
            name: None,
            stack: None,
        })))
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn new_map(entries: Vec<(Value, Value)>) -> Value {
        let mut map = OrderedMap::new();
        for (key, value) in entries {
            map.insert(key, value);
        }
        Value::Map(Rc::new(RefCell::new(map)))
    }

    pub fn new_set(items: Vec<Value>) -> Value {
        let mut set = OrderedSet::new();
        for item in items {
            set.add(item);
        }
        Value::Set(Rc::new(RefCell::new(set)))
    }

    pub fn record(fields: Vec<(&str, Value)>) -> Value {
        let obj = Obj::plain();
        for (name, value) in fields {
            obj.borrow_mut()
                .define(PropKey::from(name), Property::data(value));
        }
        Value::Object(obj)
    }

    // SameValueZero: identity for heap values, value equality for primitives,
    // NaN equal to NaN.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => Rc::ptr_eq(a, b),
            (Value::BigNum(a), Value::BigNum(b)) => Rc::ptr_eq(a, b),
            (Value::Symbol(a), Value::Symbol(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            (Value::Set(a), Value::Set(b)) => Rc::ptr_eq(a, b),
            (Value::Error(a), Value::Error(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn heap_id(&self) -> Option<usize> {
        match self {
            Value::Undefined
            | Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::Text(_) => None,
            Value::Date(r) => Some(Rc::as_ptr(r) as usize),
            Value::BigNum(r) => Some(Rc::as_ptr(r) as usize),
            Value::Symbol(r) => Some(Rc::as_ptr(r) as usize),
            Value::Function(r) => Some(Rc::as_ptr(r) as usize),
            Value::Array(r) => Some(Rc::as_ptr(r) as usize),
            Value::Map(r) => Some(Rc::as_ptr(r) as usize),
            Value::Set(r) => Some(Rc::as_ptr(r) as usize),
            Value::Error(r) => Some(Rc::as_ptr(r) as usize),
            Value::Object(r) => Some(Rc::as_ptr(r) as usize),
        }
    }

    pub fn get(&self, key: impl Into<PropKey>) -> Value {
        let key = key.into();
        let Value::Object(obj) = self else {
            return Value::Undefined;
        };
        let own = obj.borrow().lookup(&key).cloned();
        if let Some(prop) = own {
            return match prop.payload {
                PropPayload::Value(v) => v,
                PropPayload::Accessor {
                    get: Some(getter), ..
                } => getter.call(self, &[]),
                PropPayload::Accessor { get: None, .. } => Value::Undefined,
            };
        }
        if let PropKey::Str(name) = &key {
            let proto = obj.borrow().proto().cloned();
            if let Some(proto) = proto {
                if let Some(method) = proto.lookup(name) {
                    return Value::Function(method.clone());
                }
            }
        }
        Value::Undefined
    }

    pub fn set(&self, key: impl Into<PropKey>, value: Value) -> Result<(), LariatError> {
        let key = key.into();
        let Value::Object(obj) = self else {
            return Err(LariatError::NotAnObject(key.to_string()));
        };
        let own = obj.borrow().lookup(&key).cloned();
        match own {
            Some(Property {
                payload:
                    PropPayload::Accessor {
                        set: Some(setter), ..
                    },
                ..
            }) => {
                setter.call(self, std::slice::from_ref(&value));
                Ok(())
            }
            Some(Property {
                payload: PropPayload::Accessor { set: None, .. },
                ..
            }) => Err(LariatError::NotWritable(key.to_string())),
            Some(prop) => {
                if !prop.writable {
                    return Err(LariatError::NotWritable(key.to_string()));
                }
                let updated = Property {
                    payload: PropPayload::Value(value),
                    ..prop
                };
                obj.borrow_mut().define(key, updated);
                Ok(())
            }
            None => {
                obj.borrow_mut().define(key, Property::data(value));
                Ok(())
            }
        }
    }

    pub fn call_method(&self, name: &str, args: &[Value]) -> Result<Value, LariatError> {
        match self.get(name) {
            Value::Function(f) => Ok(f.call(self, args)),
            _ => Err(LariatError::NotCallable(name.to_string())),
        }
    }

    pub fn map_get(&self, key: &Value) -> Value {
        match self {
            Value::Map(map) => map.borrow().get(key).cloned().unwrap_or(Value::Undefined),
            _ => Value::Undefined,
        }
    }

    pub fn set_has(&self, value: &Value) -> bool {
        match self {
            Value::Set(set) => set.borrow().has(value),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&SetRef> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }
}
