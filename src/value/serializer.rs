use crate::error::TemplateError;
use crate::value::Value;
use serde::Serialize;
use serde::ser::{
    Impossible, SerializeMap, SerializeSeq, SerializeStruct, SerializeTuple, SerializeTupleStruct,
    Serializer,
};

use std::collections::BTreeMap;

type Error = TemplateError;

/// 把渲染参数转成 [`Value`]。
///
/// 视图只需要标量、列表和键值对；字节串以及元组/结构体形式的枚举变体直接报错。
pub struct ValueSerializer;

macro_rules! scalar {
    ($($method:ident($ty:ty) => $variant:ident as $target:ty;)*) => {
        $(
            fn $method(self, v: $ty) -> Result<Value, Error> {
                Ok(Value::$variant(v as $target))
            }
        )*
    };
}

fn unsupported(what: &str) -> Error {
    Error::Value(format!("{} cannot be used as a view parameter", what))
}

impl Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;
    type SerializeSeq = ListSerializer;
    type SerializeTuple = ListSerializer;
    type SerializeTupleStruct = ListSerializer;
    type SerializeTupleVariant = Impossible<Value, Error>;
    type SerializeMap = MapSerializer;
    type SerializeStruct = MapSerializer;
    type SerializeStructVariant = Impossible<Value, Error>;

    scalar! {
        serialize_i8(i8) => I64 as i64;
        serialize_i16(i16) => I64 as i64;
        serialize_i32(i32) => I64 as i64;
        serialize_i64(i64) => I64 as i64;
        serialize_u8(u8) => U64 as u64;
        serialize_u16(u16) => U64 as u64;
        serialize_u32(u32) => U64 as u64;
        serialize_u64(u64) => U64 as u64;
        serialize_f32(f32) => F64 as f64;
        serialize_f64(f64) => F64 as f64;
    }

    fn serialize_bool(self, v: bool) -> Result<Value, Error> {
        Ok(Value::Bool(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, Error> {
        Ok(Value::Str(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, Error> {
        Ok(Value::Str(v.to_string()))
    }

    fn serialize_bytes(self, _: &[u8]) -> Result<Value, Error> {
        Err(unsupported("byte string"))
    }

    // None、() 与单元结构体都输出为空
    fn serialize_none(self) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_unit(self) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, Error> {
        value.serialize(self)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<Value, Error> {
        value.serialize(self)
    }

    /// 单元变体输出变体名
    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        variant: &'static str,
    ) -> Result<Value, Error> {
        Ok(Value::Str(variant.to_string()))
    }

    /// 新类型变体按 `{变体名: 值}` 输出，视图中可用 `kind.Variant` 访问
    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, Error> {
        let mut map = BTreeMap::new();
        map.insert(variant.to_string(), value.serialize(self)?);
        Ok(Value::Map(map))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<ListSerializer, Error> {
        Ok(ListSerializer {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<ListSerializer, Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _: &'static str, len: usize) -> Result<ListSerializer, Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        variant: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant, Error> {
        Err(unsupported(&format!("tuple variant '{}'", variant)))
    }

    fn serialize_map(self, _: Option<usize>) -> Result<MapSerializer, Error> {
        Ok(MapSerializer::default())
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<MapSerializer, Error> {
        Ok(MapSerializer::default())
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        variant: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant, Error> {
        Err(unsupported(&format!("struct variant '{}'", variant)))
    }
}

pub struct ListSerializer {
    items: Vec<Value>,
}

impl ListSerializer {
    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }
}

impl SerializeSeq for ListSerializer {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        self.push(value)
    }

    fn end(self) -> Result<Value, Error> {
        Ok(Value::List(self.items))
    }
}

impl SerializeTuple for ListSerializer {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        self.push(value)
    }

    fn end(self) -> Result<Value, Error> {
        Ok(Value::List(self.items))
    }
}

impl SerializeTupleStruct for ListSerializer {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        self.push(value)
    }

    fn end(self) -> Result<Value, Error> {
        Ok(Value::List(self.items))
    }
}

#[derive(Default)]
pub struct MapSerializer {
    entries: BTreeMap<String, Value>,
    pending_key: Option<String>,
}

impl SerializeMap for MapSerializer {
    type Ok = Value;
    type Error = Error;

    /// 键只接受字符串与整数，整数键转成字符串，便于 `list.0` 式的路径访问
    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Error> {
        let key = match key.serialize(ValueSerializer)? {
            Value::Str(s) => s,
            Value::I64(n) => n.to_string(),
            Value::U64(n) => n.to_string(),
            _ => return Err(Error::Value("map key must be a string or an integer".into())),
        };
        self.pending_key = Some(key);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| Error::Value("map value without a key".into()))?;
        self.entries.insert(key, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, Error> {
        Ok(Value::Map(self.entries))
    }
}

impl SerializeStruct for MapSerializer {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        self.entries
            .insert(key.to_string(), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, Error> {
        Ok(Value::Map(self.entries))
    }
}

/// 将 T: Serialize 转为 Value
pub fn to_value<T: ?Sized + Serialize>(t: &T) -> Result<Value, TemplateError> {
    t.serialize(ValueSerializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct User {
        name: String,
        age: u8,
        tags: Vec<&'static str>,
        nickname: Option<String>,
    }

    #[derive(Serialize)]
    enum Kind {
        Guest,
        Member(u32),
        Pair(u8, u8),
    }

    #[test]
    fn test_struct_to_map() {
        let user = User {
            name: "alice".to_string(),
            age: 30,
            tags: vec!["admin"],
            nickname: None,
        };
        let value = to_value(&user).unwrap();

        let Value::Map(map) = value else {
            panic!("Expected map");
        };
        assert_eq!(map["name"], Value::Str("alice".to_string()));
        assert_eq!(map["age"], Value::U64(30));
        assert_eq!(map["tags"], Value::List(vec![Value::Str("admin".to_string())]));
        assert_eq!(map["nickname"], Value::Null);
    }

    #[test]
    fn test_unit_is_null() {
        assert_eq!(to_value(&()).unwrap(), Value::Null);
    }

    #[test]
    fn test_enum_variants() {
        assert_eq!(to_value(&Kind::Guest).unwrap(), Value::from("Guest"));

        let Value::Map(map) = to_value(&Kind::Member(7)).unwrap() else {
            panic!("Expected map");
        };
        assert_eq!(map["Member"], Value::U64(7));

        assert!(matches!(to_value(&Kind::Pair(1, 2)), Err(TemplateError::Value(_))));
    }

    #[test]
    fn test_integer_keys_become_strings() {
        let mut map = HashMap::new();
        map.insert(3u32, "three");
        let Value::Map(map) = to_value(&map).unwrap() else {
            panic!("Expected map");
        };
        assert_eq!(map["3"], Value::from("three"));
    }

    #[test]
    fn test_map_with_non_string_key_fails() {
        let mut map = HashMap::new();
        map.insert((1, 2), "x");
        assert!(matches!(to_value(&map), Err(TemplateError::Value(_))));
    }
}
