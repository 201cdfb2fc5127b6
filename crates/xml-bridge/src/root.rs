//! Root element naming for shapes that do not name themselves.
//!
//! quick-xml takes the root element name from a struct's serde name or an
//! enum's variant name. Anything else (numbers, strings, sequences, maps,
//! newtype wrappers) has no name of its own and `quick_xml::se::Serializer::new`
//! refuses it. [`root_name`] walks the value once and picks a name for those
//! shapes, using XML Schema type names for primitives:
//!
//! | Shape | Root element |
//! |---|---|
//! | struct, unit struct, tuple struct, newtype struct | serde name |
//! | enum variant | none, the variant names itself |
//! | `bool` | `boolean` |
//! | `i8` / `i16` / `i32` / `i64` | `byte` / `short` / `int` / `long` |
//! | `u8` / `u16` / `u32` / `u64` | `unsignedByte` / `unsignedShort` / `unsignedInt` / `unsignedLong` |
//! | `f32` / `f64` | `float` / `double` |
//! | `char` | `char` |
//! | `str` | `string` |
//! | bytes | `base64Binary` |
//! | sequence, tuple | the first item's name, else `anyType` |
//! | map | `map` |
//! | unit, `None` | `anyType` |

use serde::Serialize;
use serde::ser;

use crate::error::{BridgeError, Result};

/// Fallback for shapes with nothing better to offer.
const ANY_TYPE: &str = "anyType";

/// Returns the root element name quick-xml should use for `value`.
///
/// `None` means the value names itself (an enum variant) or could not be
/// inspected, and the caller should let quick-xml pick.
pub(crate) fn root_name<T: Serialize + ?Sized>(value: &T) -> Option<&'static str> {
    let mut namer = RootNamer::default();
    value.serialize(&mut namer).ok()?;
    namer.name
}

/// Serializer that writes nothing and only remembers a name.
#[derive(Default)]
struct RootNamer {
    name: Option<&'static str>,
    awaiting_first_item: bool,
}

impl RootNamer {
    fn named(&mut self, name: &'static str) -> Result<()> {
        self.name = Some(name);
        Ok(())
    }

    fn begin_items(&mut self) {
        self.name = Some(ANY_TYPE);
        self.awaiting_first_item = true;
    }

    fn item<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        if self.awaiting_first_item {
            self.awaiting_first_item = false;
            if let Some(name) = root_name(value) {
                self.name = Some(name);
            }
        }
        Ok(())
    }
}

impl<'a> ser::Serializer for &'a mut RootNamer {
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
        self.named("boolean")
    }
    fn serialize_i8(self, _v: i8) -> Result<()> {
        self.named("byte")
    }
    fn serialize_i16(self, _v: i16) -> Result<()> {
        self.named("short")
    }
    fn serialize_i32(self, _v: i32) -> Result<()> {
        self.named("int")
    }
    fn serialize_i64(self, _v: i64) -> Result<()> {
        self.named("long")
    }
    fn serialize_u8(self, _v: u8) -> Result<()> {
        self.named("unsignedByte")
    }
    fn serialize_u16(self, _v: u16) -> Result<()> {
        self.named("unsignedShort")
    }
    fn serialize_u32(self, _v: u32) -> Result<()> {
        self.named("unsignedInt")
    }
    fn serialize_u64(self, _v: u64) -> Result<()> {
        self.named("unsignedLong")
    }
    fn serialize_f32(self, _v: f32) -> Result<()> {
        self.named("float")
    }
    fn serialize_f64(self, _v: f64) -> Result<()> {
        self.named("double")
    }
    fn serialize_char(self, _v: char) -> Result<()> {
        self.named("char")
    }
    fn serialize_str(self, _v: &str) -> Result<()> {
        self.named("string")
    }
    fn serialize_bytes(self, _v: &[u8]) -> Result<()> {
        self.named("base64Binary")
    }
    fn serialize_none(self) -> Result<()> {
        self.named(ANY_TYPE)
    }
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }
    fn serialize_unit(self) -> Result<()> {
        self.named(ANY_TYPE)
    }
    fn serialize_unit_struct(self, name: &'static str) -> Result<()> {
        self.named(name)
    }
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<()> {
        Ok(())
    }
    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        _value: &T,
    ) -> Result<()> {
        self.named(name)
    }
    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<()> {
        Ok(())
    }
    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        self.begin_items();
        Ok(self)
    }
    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        self.begin_items();
        Ok(self)
    }
    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.named(name)?;
        Ok(self)
    }
    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(self)
    }
    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        self.named("map")?;
        Ok(self)
    }
    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        self.named(name)?;
        Ok(self)
    }
    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(self)
    }
}

impl<'a> ser::SerializeSeq for &'a mut RootNamer {
    type Ok = ();
    type Error = BridgeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.item(value)
    }
    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeTuple for &'a mut RootNamer {
    type Ok = ();
    type Error = BridgeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.item(value)
    }
    fn end(self) -> Result<()> {
        Ok(())
    }
}

// Everything below only needs to be accepted, the name is already known.

impl<'a> ser::SerializeTupleStruct for &'a mut RootNamer {
    type Ok = ();
    type Error = BridgeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _value: &T) -> Result<()> {
        Ok(())
    }
    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleVariant for &'a mut RootNamer {
    type Ok = ();
    type Error = BridgeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _value: &T) -> Result<()> {
        Ok(())
    }
    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeMap for &'a mut RootNamer {
    type Ok = ();
    type Error = BridgeError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, _key: &T) -> Result<()> {
        Ok(())
    }
    fn serialize_value<T: ?Sized + Serialize>(&mut self, _value: &T) -> Result<()> {
        Ok(())
    }
    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeStruct for &'a mut RootNamer {
    type Ok = ();
    type Error = BridgeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        _value: &T,
    ) -> Result<()> {
        Ok(())
    }
    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeStructVariant for &'a mut RootNamer {
    type Ok = ();
    type Error = BridgeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        _value: &T,
    ) -> Result<()> {
        Ok(())
    }
    fn end(self) -> Result<()> {
        Ok(())
    }
}
