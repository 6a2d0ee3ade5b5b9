use lariat::{Config, Marshaller, Node, Value};
use std::rc::Rc;

fn marshaller() -> Marshaller {
    Marshaller::new(Config::default())
}

#[test]
fn primitives_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let m = marshaller();
    let input = Value::array(vec![
        Value::Undefined,
        Value::Null,
        Value::Bool(true),
        Value::Bool(false),
        Value::Number(1.0),
        Value::text("hello"),
        Value::date(100),
    ]);

    let doc = m.marshal(&input)?;
    let out = m.unmarshal(&doc)?;

    let arr = out.as_array().ok_or("expected array")?;
    let items = arr.borrow();
    assert_eq!(items.len(), 7);
    assert!(matches!(items[0], Value::Undefined));
    assert!(matches!(items[1], Value::Null));
    assert!(matches!(items[2], Value::Bool(true)));
    assert!(matches!(items[3], Value::Bool(false)));
    assert_eq!(items[4].as_number(), Some(1.0));
    assert_eq!(items[5].as_str(), Some("hello"));
    match &items[6] {
        Value::Date(d) => assert_eq!(d.epoch_ms, 100),
        other => panic!("expected date, got {:?}", other),
    }
    Ok(())
}

#[test]
fn primitive_root_owns_the_document() -> Result<(), Box<dyn std::error::Error>> {
    let m = marshaller();

    let doc = m.marshal(&Value::text("hello"))?;
    assert_eq!(doc.len(), 1);
    assert!(matches!(&doc.nodes[0], Node::String { value } if value == "hello"));

    let out = m.unmarshal(&doc)?;
    assert_eq!(out.as_str(), Some("hello"));
    Ok(())
}

#[test]
fn equal_strings_stay_inline() -> Result<(), Box<dyn std::error::Error>> {
    let m = marshaller();
    let input = Value::array(vec![Value::text("dup"), Value::text("dup")]);

    let doc = m.marshal(&input)?;

    // strings are never reference-tracked: both occurrences encode inline
    assert_eq!(doc.len(), 1);
    match &doc.nodes[0] {
        Node::Array { items } => {
            assert!(matches!(&items[0], Node::String { value } if value == "dup"));
            assert!(matches!(&items[1], Node::String { value } if value == "dup"));
        }
        other => panic!("expected array node, got {:?}", other),
    }
    Ok(())
}

#[test]
fn shared_inner_object_decodes_once() -> Result<(), Box<dyn std::error::Error>> {
    let m = marshaller();
    let inner = Value::record(vec![("hello", Value::text("world"))]);
    let input = Value::array(vec![
        inner.clone(),
        inner.clone(),
        inner.clone(),
        inner.clone(),
    ]);

    let doc = m.marshal(&input)?;
    assert_eq!(doc.len(), 2);

    let out = m.unmarshal(&doc)?;
    let arr = out.as_array().ok_or("expected array")?;
    let items = arr.borrow();
    assert!(items[0].same_value(&items[1]));
    assert!(items[1].same_value(&items[2]));
    assert!(items[2].same_value(&items[3]));
    assert_eq!(items[0].get("hello").as_str(), Some("world"));
    Ok(())
}

#[test]
fn encounter_order_assigns_ordinals() -> Result<(), Box<dyn std::error::Error>> {
    let m = marshaller();
    let first = Value::record(vec![("n", Value::Number(1.0))]);
    let second = Value::record(vec![("n", Value::Number(2.0))]);
    let input = Value::array(vec![first, second]);

    let doc = m.marshal(&input)?;
    assert_eq!(doc.len(), 3);
    match &doc.nodes[0] {
        Node::Array { items } => {
            assert!(matches!(items[0], Node::Ref { ordinal: 1 }));
            assert!(matches!(items[1], Node::Ref { ordinal: 2 }));
        }
        other => panic!("expected array node, got {:?}", other),
    }
    Ok(())
}

#[test]
fn builtin_containers_preserve_order() -> Result<(), Box<dyn std::error::Error>> {
    let m = marshaller();
    let map = Value::new_map(vec![
        (Value::Number(1.0), Value::Number(2.0)),
        (Value::Number(3.0), Value::text("world")),
        (Value::date(0), Value::text("haha")),
    ]);
    let set = Value::new_set(vec![
        Value::Number(1.0),
        Value::Number(2.0),
        Value::Number(3.0),
    ]);

    let doc = m.marshal(&Value::array(vec![map, set]))?;
    let out = m.unmarshal(&doc)?;

    let arr = out.as_array().ok_or("expected array")?;
    let items = arr.borrow();

    let map = items[0].as_map().ok_or("expected map")?.borrow();
    assert_eq!(map.len(), 3);
    let entries = map.entries();
    assert!(entries[0].0.same_value(&Value::Number(1.0)));
    assert!(entries[0].1.same_value(&Value::Number(2.0)));
    assert!(entries[1].0.same_value(&Value::Number(3.0)));
    assert_eq!(entries[1].1.as_str(), Some("world"));
    match &entries[2].0 {
        Value::Date(d) => assert_eq!(d.epoch_ms, 0),
        other => panic!("expected date key, got {:?}", other),
    }
    assert_eq!(entries[2].1.as_str(), Some("haha"));

    let set = items[1].as_set().ok_or("expected set")?.borrow();
    assert_eq!(set.len(), 3);
    assert!(set.items()[0].same_value(&Value::Number(1.0)));
    assert!(set.items()[1].same_value(&Value::Number(2.0)));
    assert!(set.items()[2].same_value(&Value::Number(3.0)));
    Ok(())
}

#[test]
fn date_decodes_to_distinct_equal_instance() -> Result<(), Box<dyn std::error::Error>> {
    let m = marshaller();
    let input = Value::date(100);

    let out = m.unmarshal(&m.marshal(&input)?)?;

    match (&input, &out) {
        (Value::Date(a), Value::Date(b)) => {
            assert_eq!(a.epoch_ms, b.epoch_ms);
            assert!(!Rc::ptr_eq(a, b));
        }
        other => panic!("expected two dates, got {:?}", other),
    }
    Ok(())
}

#[test]
fn bignumber_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let m = marshaller();
    let literal = "123456789012345678901234567890.5";
    let input = Value::big(literal)?;

    let out = m.unmarshal(&m.marshal(&input)?)?;

    match &out {
        Value::BigNum(b) => assert_eq!(b.digits(), literal),
        other => panic!("expected bignumber, got {:?}", other),
    }
    Ok(())
}

#[test]
fn errors_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let m = marshaller();
    let input = Value::error("boom");
    if let Value::Error(err) = &input {
        err.borrow_mut().name = Some("RangeError".to_string());
        err.borrow_mut().stack = Some("at main".to_string());
    }

    let out = m.unmarshal(&m.marshal(&input)?)?;

    match &out {
        Value::Error(err) => {
            let err = err.borrow();
            assert_eq!(err.message, "boom");
            assert_eq!(err.name.as_deref(), Some("RangeError"));
            assert_eq!(err.stack.as_deref(), Some("at main"));
        }
        other => panic!("expected error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn repeated_calls_use_fresh_reference_tables() -> Result<(), Box<dyn std::error::Error>> {
    let m = marshaller();
    let inner = Value::record(vec![("n", Value::Number(1.0))]);

    let first = m.marshal(&inner)?;
    let second = m.marshal(&inner)?;

    // no state survives between calls: both documents are laid out identically
    assert_eq!(first, second);
    Ok(())
}
