#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use super::*;
use crate::TypeRegistry;

#[derive(Debug, PartialEq)]
struct Point {
    x: i64,
}

fn points() -> (TypeRegistry, TypeId) {
    let mut types = TypeRegistry::new();
    let ty = types
        .register::<Point>("Point")
        .member("x", TypeId::INT, |p| Value::Int(p.x))
        .finish();
    (types, ty)
}

#[test]
fn test_scalar_types() {
    assert_eq!(Value::Int(1).ty(), TypeId::INT);
    assert_eq!(Value::Float(1.0).ty(), TypeId::FLOAT);
    assert_eq!(Value::Bool(false).ty(), TypeId::BOOL);
    assert_eq!(Value::string("a").ty(), TypeId::STR);
    assert_eq!(Value::Null.ty(), TypeId::OBJECT);
}

#[test]
fn test_object_carries_record_type() {
    let (types, ty) = points();
    let value = types.object(Point { x: 3 }).unwrap();
    assert_eq!(value.ty(), ty);
    assert_eq!(value.type_name(), "Point");
    assert_eq!(value.to_string(), "<Point>");
}

#[test]
fn test_conformance() {
    let (types, ty) = points();
    let point = types.object(Point { x: 3 }).unwrap();

    assert!(Value::Int(1).conforms_to(TypeId::INT));
    assert!(!Value::Int(1).conforms_to(TypeId::FLOAT));
    assert!(Value::Int(1).conforms_to(TypeId::OBJECT));
    assert!(point.conforms_to(ty));
    assert!(point.conforms_to(TypeId::OBJECT));
    assert!(!point.conforms_to(TypeId::STR));

    assert!(Value::Null.conforms_to(TypeId::OBJECT));
    assert!(Value::Null.conforms_to(ty));
    assert!(!Value::Null.conforms_to(TypeId::INT));
    assert!(!Value::Null.conforms_to(TypeId::STR));
}

#[test]
fn test_objects_compare_by_identity() {
    let (types, _) = points();
    let a = types.object(Point { x: 1 }).unwrap();
    let b = types.object(Point { x: 1 }).unwrap();
    assert_eq!(a, a.clone());
    assert_ne!(a, b);
}

#[test]
fn test_float_equality_is_ieee() {
    assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    assert_eq!(Value::Float(0.0), Value::Float(-0.0));
    assert_ne!(Value::Int(1), Value::Float(1.0));
}

#[test]
fn test_display() {
    assert_eq!(Value::Int(-4).to_string(), "-4");
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!(Value::from("abc").to_string(), "abc");
    assert_eq!(Value::Null.to_string(), "null");
    assert_eq!(format!("{:?}", Value::from("abc")), "Str(\"abc\")");
}

#[test]
fn test_accessors() {
    assert_eq!(Value::Int(9).as_int(), Some(9));
    assert_eq!(Value::Int(9).as_float(), None);
    assert_eq!(Value::Float(0.5).as_float(), Some(0.5));
    assert_eq!(Value::Bool(true).as_bool(), Some(true));
    assert_eq!(Value::from(String::from("s")).as_str(), Some("s"));
    assert!(Value::Null.is_null());
    assert!(Value::Null.as_object().is_none());
}

#[test]
fn test_record_handle() {
    let (types, ty) = points();
    let record = types.instance(Point { x: 11 }).unwrap();
    assert_eq!(record.x, 11);
    assert_eq!(record.object().ty(), ty);

    let value = record.clone().into_value();
    let object = value.as_object().unwrap().clone();
    assert_eq!(object.downcast_ref::<Point>(), Some(&Point { x: 11 }));
    assert!(object.downcast_ref::<String>().is_none());
    assert!(Record::<Point>::from_object(object.clone()).is_some());
    assert!(Record::<String>::from_object(object).is_none());
}
