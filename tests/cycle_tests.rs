use lariat::{Config, Marshaller, Node, Value};

fn marshaller() -> Marshaller {
    Marshaller::new(Config::default())
}

#[test]
fn self_referential_array() -> Result<(), Box<dyn std::error::Error>> {
    let m = marshaller();
    let input = Value::array(vec![Value::Undefined]);
    if let Value::Array(a) = &input {
        a.borrow_mut()[0] = input.clone();
    }

    let doc = m.marshal(&input)?;
    assert_eq!(doc.len(), 1);
    match &doc.nodes[0] {
        Node::Array { items } => assert!(matches!(items[0], Node::Ref { ordinal: 0 })),
        other => panic!("expected array node, got {:?}", other),
    }

    let out = m.unmarshal(&doc)?;
    let arr = out.as_array().ok_or("expected array")?;
    let first = arr.borrow()[0].clone();
    assert!(first.same_value(&out));
    Ok(())
}

#[test]
fn mutual_object_cycle() -> Result<(), Box<dyn std::error::Error>> {
    let m = marshaller();
    let a = Value::record(vec![("tag", Value::text("a"))]);
    let b = Value::record(vec![("a", a.clone())]);
    a.set("b", b.clone())?;

    let out = m.unmarshal(&m.marshal(&a)?)?;

    let back = out.get("b").get("a");
    assert!(back.same_value(&out));
    assert_eq!(out.get("tag").as_str(), Some("a"));
    Ok(())
}

#[test]
fn cyclic_map_value() -> Result<(), Box<dyn std::error::Error>> {
    let m = marshaller();
    let input = Value::new_map(vec![]);
    if let Value::Map(map) = &input {
        map.borrow_mut().insert(Value::text("self"), input.clone());
    }

    let out = m.unmarshal(&m.marshal(&input)?)?;

    assert!(out.map_get(&Value::text("self")).same_value(&out));
    Ok(())
}

#[test]
fn map_key_shares_ordinal_with_plain_reference() -> Result<(), Box<dyn std::error::Error>> {
    let m = marshaller();
    let inner = Value::record(vec![("id", Value::Number(7.0))]);
    let map = Value::new_map(vec![(inner.clone(), Value::text("as key"))]);
    let input = Value::array(vec![inner.clone(), map]);

    let doc = m.marshal(&input)?;
    // array, inner, map: the key occurrence reuses the inner's ordinal
    assert_eq!(doc.len(), 3);

    let out = m.unmarshal(&doc)?;
    let arr = out.as_array().ok_or("expected array")?;
    let items = arr.borrow();
    let inner_out = items[0].clone();
    let map_out = items[1].clone();
    assert_eq!(map_out.map_get(&inner_out).as_str(), Some("as key"));
    if let Value::Map(map) = &map_out {
        assert!(map.borrow().entries()[0].0.same_value(&inner_out));
    } else {
        panic!("expected map");
    }
    Ok(())
}

#[test]
fn shared_value_across_depths_decodes_once() -> Result<(), Box<dyn std::error::Error>> {
    let m = marshaller();
    let shared = Value::record(vec![("tag", Value::text("shared"))]);
    let input = Value::record(vec![
        ("direct", shared.clone()),
        ("nested", Value::array(vec![shared.clone()])),
        ("in_set", Value::new_set(vec![shared.clone()])),
    ]);

    let out = m.unmarshal(&m.marshal(&input)?)?;

    let direct = out.get("direct");
    let nested = out.get("nested");
    let from_array = nested.as_array().ok_or("expected array")?.borrow()[0].clone();
    assert!(direct.same_value(&from_array));
    let in_set = out.get("in_set");
    assert!(in_set.set_has(&direct));
    Ok(())
}

#[test]
fn cycle_through_property_descriptor() -> Result<(), Box<dyn std::error::Error>> {
    let m = marshaller();
    let input = Value::record(vec![]);
    input.set("me", input.clone())?;

    let out = m.unmarshal(&m.marshal(&input)?)?;

    assert!(out.get("me").same_value(&out));
    Ok(())
}
