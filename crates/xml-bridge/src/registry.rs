//! Declared shapes used to resolve polymorphic members.
//!
//! XML carries no static type information, so any member whose concrete shape
//! is chosen at runtime must be declared up front. In serde terms such a member
//! is a data-carrying enum variant: the enum plays the role of the base type and
//! the variant names the concrete shape that is written as the element name.
//!
//! quick-xml only writes a variant name as an element when the enum sits in
//! element content: the root, or a field renamed to `$value`. In any other
//! named field the variant has nowhere to go, so a declared variant found there
//! is rejected with [`BridgeError::MisplacedShape`]:
//!
//! ```rust
//! # use serde::Serialize;
//! #[derive(Serialize)]
//! enum Figure { Circle { radius: f64 } }
//!
//! #[derive(Serialize)]
//! struct Frame {
//!     name: String,
//!     #[serde(rename = "$value")]
//!     figure: Figure,
//! }
//! ```
//!
//! The check walks the value with `ShapeWalker`, a `serde::Serializer` that
//! writes nothing and only records the names serde hands it.

use std::any::type_name;
use std::collections::BTreeSet;

use serde::Serialize;
use serde::ser;

use crate::error::{BridgeError, Result};

/// A set of declared shape names.
///
/// Unit variants (plain enumerations) and statically typed nested structs are
/// always resolvable and never need declaring. Declared variants must still
/// sit at the root or in a `$value` field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeRegistry {
    shapes: BTreeSet<String>,
}

impl ShapeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a shape by name, returning the registry for chaining.
    pub fn declare(mut self, name: impl Into<String>) -> Self {
        self.shapes.insert(name.into());
        self
    }

    /// Declares a shape by its Rust type, using the type's short name.
    ///
    /// `my_app::figures::Circle` is declared as `Circle`. This matches the
    /// default variant name for `enum Figure { Circle(Circle) }`.
    pub fn declare_type<T: ?Sized>(self) -> Self {
        self.declare(short_type_name::<T>())
    }

    /// Returns true if `name` has been declared.
    pub fn is_declared(&self, name: &str) -> bool {
        self.shapes.contains(name)
    }

    /// Number of declared shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns true if nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Iterates the declared names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().map(String::as_str)
    }

    /// Checks every polymorphic member of `value` against this registry.
    ///
    /// Fails with [`BridgeError::UndeclaredShape`] on the first undeclared one
    /// and with [`BridgeError::MisplacedShape`] on the first declared one held
    /// in a named field.
    pub fn check<T>(&self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let mut walker = ShapeWalker::checking(self);
        value.serialize(&mut walker)
    }
}

impl<S: Into<String>> FromIterator<S> for ShapeRegistry {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            shapes: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for ShapeRegistry {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.shapes.extend(iter.into_iter().map(Into::into));
    }
}

/// Strips the module path and generic arguments from a type name.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Named shapes found while walking a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeReport {
    /// Struct, tuple-struct and newtype-struct names.
    pub structs: BTreeSet<&'static str>,
    /// Data-carrying enum variants, as `(enum, variant)` pairs.
    pub polymorphic: BTreeSet<(&'static str, &'static str)>,
}

/// Walks `value` and reports every named shape it contains.
pub fn shapes_in<T>(value: &T) -> Result<ShapeReport>
where
    T: Serialize + ?Sized,
{
    let mut walker = ShapeWalker::recording();
    value.serialize(&mut walker)?;
    Ok(walker.report)
}

/// Where the value being walked will end up in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Root element or `$value` content, where a variant becomes an element.
    Content,
    /// A named element or attribute.
    Field(&'static str),
    /// A map entry, named by its key at runtime.
    Entry,
}

impl Slot {
    fn of_field(key: &'static str) -> Self {
        if key == "$value" {
            Slot::Content
        } else {
            Slot::Field(key)
        }
    }
}

/// Serializer that records shape names and optionally enforces a registry.
struct ShapeWalker<'r> {
    registry: Option<&'r ShapeRegistry>,
    report: ShapeReport,
    slot: Slot,
}

impl<'r> ShapeWalker<'r> {
    fn recording() -> Self {
        Self {
            registry: None,
            report: ShapeReport::default(),
            slot: Slot::Content,
        }
    }

    fn checking(registry: &'r ShapeRegistry) -> Self {
        Self {
            registry: Some(registry),
            ..Self::recording()
        }
    }

    fn visit_variant(&mut self, name: &'static str, variant: &'static str) -> Result<()> {
        if let Some(registry) = self.registry {
            if !registry.is_declared(variant) {
                return Err(BridgeError::UndeclaredShape {
                    shape: variant.to_string(),
                    container: name.to_string(),
                });
            }
            let field = match self.slot {
                Slot::Content => None,
                Slot::Field(key) => Some(key.to_string()),
                Slot::Entry => Some("map entry".to_string()),
            };
            if let Some(field) = field {
                return Err(BridgeError::MisplacedShape {
                    shape: variant.to_string(),
                    container: name.to_string(),
                    field,
                });
            }
        }
        self.report.polymorphic.insert((name, variant));
        Ok(())
    }

    /// Walks `value` as if it sat in `slot`, then restores the current slot.
    fn descend<T>(&mut self, slot: Slot, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let outer = std::mem::replace(&mut self.slot, slot);
        let result = value.serialize(&mut *self);
        self.slot = outer;
        result
    }
}

impl<'a, 'r> ser::Serializer for &'a mut ShapeWalker<'r> {
    type Ok = ();
    type Error = BridgeError;

    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _v: bool) -> Result<()> {
        Ok(())
    }

    fn serialize_i8(self, _v: i8) -> Result<()> {
        Ok(())
    }

    fn serialize_i16(self, _v: i16) -> Result<()> {
        Ok(())
    }

    fn serialize_i32(self, _v: i32) -> Result<()> {
        Ok(())
    }

    fn serialize_i64(self, _v: i64) -> Result<()> {
        Ok(())
    }

    fn serialize_u8(self, _v: u8) -> Result<()> {
        Ok(())
    }

    fn serialize_u16(self, _v: u16) -> Result<()> {
        Ok(())
    }

    fn serialize_u32(self, _v: u32) -> Result<()> {
        Ok(())
    }

    fn serialize_u64(self, _v: u64) -> Result<()> {
        Ok(())
    }

    fn serialize_f32(self, _v: f32) -> Result<()> {
        Ok(())
    }

    fn serialize_f64(self, _v: f64) -> Result<()> {
        Ok(())
    }

    fn serialize_char(self, _v: char) -> Result<()> {
        Ok(())
    }

    fn serialize_str(self, _v: &str) -> Result<()> {
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<()> {
        Ok(())
    }

    fn serialize_none(self) -> Result<()> {
        Ok(())
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<()> {
        self.report.structs.insert(name);
        Ok(())
    }

    // Plain enumeration value, never polymorphic
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<()> {
        Ok(())
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.report.structs.insert(name);
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.visit_variant(name, variant)?;
        self.descend(Slot::Content, value)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.report.structs.insert(name);
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        self.visit_variant(name, variant)?;
        Ok(self)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(self)
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        self.report.structs.insert(name);
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        self.visit_variant(name, variant)?;
        Ok(self)
    }
}

impl<'a, 'r> ser::SerializeSeq for &'a mut ShapeWalker<'r> {
    type Ok = ();
    type Error = BridgeError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'r> ser::SerializeTuple for &'a mut ShapeWalker<'r> {
    type Ok = ();
    type Error = BridgeError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'r> ser::SerializeTupleStruct for &'a mut ShapeWalker<'r> {
    type Ok = ();
    type Error = BridgeError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'r> ser::SerializeTupleVariant for &'a mut ShapeWalker<'r> {
    type Ok = ();
    type Error = BridgeError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.descend(Slot::Content, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'r> ser::SerializeMap for &'a mut ShapeWalker<'r> {
    type Ok = ();
    type Error = BridgeError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.descend(Slot::Entry, key)
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.descend(Slot::Entry, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'r> ser::SerializeStruct for &'a mut ShapeWalker<'r> {
    type Ok = ();
    type Error = BridgeError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.descend(Slot::of_field(key), value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'r> ser::SerializeStructVariant for &'a mut ShapeWalker<'r> {
    type Ok = ();
    type Error = BridgeError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.descend(Slot::of_field(key), value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Circle {
        radius: f64,
    }

    #[derive(Serialize)]
    struct Square {
        side: f64,
    }

    #[derive(Serialize)]
    enum Figure {
        Circle(Circle),
        Square(Square),
        Segment(f64, f64),
        Polygon { corners: u32 },
    }

    #[derive(Serialize)]
    enum Color {
        Red,
        Blue,
    }

    #[derive(Serialize)]
    struct Drawing {
        title: String,
        color: Color,
        #[serde(rename = "$value")]
        figures: Vec<Figure>,
    }

    #[derive(Serialize)]
    struct Holder {
        name: String,
        figure: Figure,
    }

    #[derive(Serialize)]
    struct Layer {
        #[serde(rename = "$value")]
        holder: Holder,
    }

    fn drawing() -> Drawing {
        Drawing {
            title: "sketch".to_string(),
            color: Color::Red,
            figures: vec![
                Figure::Circle(Circle { radius: 1.0 }),
                Figure::Square(Square { side: 2.0 }),
            ],
        }
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<Circle>(), "Circle");
        assert_eq!(short_type_name::<Vec<Circle>>(), "Vec");
        assert_eq!(short_type_name::<u32>(), "u32");
    }

    #[test]
    fn test_declare_and_lookup() {
        let registry = ShapeRegistry::new()
            .declare("Circle")
            .declare_type::<Square>();
        assert!(registry.is_declared("Circle"));
        assert!(registry.is_declared("Square"));
        assert!(!registry.is_declared("Segment"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.iter().collect::<Vec<_>>(), vec!["Circle", "Square"]);
    }

    #[test]
    fn test_from_iter_and_extend() {
        let mut registry: ShapeRegistry = ["Circle"].into_iter().collect();
        registry.extend(["Square", "Circle"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_check_passes_when_all_variants_declared() {
        let registry = ShapeRegistry::new().declare("Circle").declare("Square");
        assert!(registry.check(&drawing()).is_ok());
    }

    #[test]
    fn test_check_rejects_undeclared_variant() {
        let registry = ShapeRegistry::new().declare("Circle");
        match registry.check(&drawing()) {
            Err(BridgeError::UndeclaredShape { shape, container }) => {
                assert_eq!(shape, "Square");
                assert_eq!(container, "Figure");
            }
            other => panic!("expected UndeclaredShape, got {other:?}"),
        }
    }

    #[test]
    fn test_tuple_and_struct_variants_are_polymorphic() {
        let registry = ShapeRegistry::new();
        assert!(registry.check(&Figure::Segment(0.0, 1.0)).is_err());
        assert!(registry.check(&Figure::Polygon { corners: 5 }).is_err());
    }

    #[test]
    fn test_unit_variants_and_plain_structs_need_no_declaration() {
        let registry = ShapeRegistry::new();
        assert!(registry.check(&Color::Blue).is_ok());
        assert!(registry.check(&Circle { radius: 3.0 }).is_ok());
    }

    #[test]
    fn test_check_rejects_declared_variant_in_named_field() {
        let registry = ShapeRegistry::new().declare("Circle");
        let holder = Holder {
            name: "h".to_string(),
            figure: Figure::Circle(Circle { radius: 1.0 }),
        };
        match registry.check(&holder) {
            Err(BridgeError::MisplacedShape {
                shape,
                container,
                field,
            }) => {
                assert_eq!(shape, "Circle");
                assert_eq!(container, "Figure");
                assert_eq!(field, "figure");
            }
            other => panic!("expected MisplacedShape, got {other:?}"),
        }
    }

    #[test]
    fn test_content_slot_does_not_leak_into_nested_fields() {
        let registry = ShapeRegistry::new().declare("Circle");
        let layer = Layer {
            holder: Holder {
                name: "h".to_string(),
                figure: Figure::Circle(Circle { radius: 1.0 }),
            },
        };
        assert!(matches!(
            registry.check(&layer),
            Err(BridgeError::MisplacedShape { ref field, .. }) if field == "figure"
        ));
    }

    #[test]
    fn test_declared_variant_in_map_entry_is_misplaced() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), Figure::Circle(Circle { radius: 1.0 }));
        let registry = ShapeRegistry::new().declare("Circle");
        assert!(matches!(
            registry.check(&map),
            Err(BridgeError::MisplacedShape { ref field, .. }) if field == "map entry"
        ));
    }

    #[test]
    fn test_recording_ignores_placement() -> Result<()> {
        let holder = Holder {
            name: "h".to_string(),
            figure: Figure::Polygon { corners: 3 },
        };
        let report = shapes_in(&holder)?;
        assert!(report.polymorphic.contains(&("Figure", "Polygon")));
        Ok(())
    }

    #[test]
    fn test_check_descends_into_maps_and_options() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), Some(Figure::Square(Square { side: 1.0 })));
        let registry = ShapeRegistry::new().declare("Circle");
        assert!(registry.check(&map).is_err());
    }

    #[test]
    fn test_shapes_in_reports_structs_and_variants() -> Result<()> {
        let report = shapes_in(&drawing())?;
        assert!(report.structs.contains("Drawing"));
        assert!(report.structs.contains("Circle"));
        assert!(report.structs.contains("Square"));
        assert!(report.polymorphic.contains(&("Figure", "Circle")));
        assert!(report.polymorphic.contains(&("Figure", "Square")));
        assert!(!report.polymorphic.iter().any(|(e, _)| *e == "Color"));
        Ok(())
    }
}
