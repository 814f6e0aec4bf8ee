use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::forward_to_deserialize_any;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::types::SqlValue;

/// Driver-agnostic raw result from a database query.
/// Drivers convert every column into a [`SqlValue`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawQueryResult {
    /// Column names in order
    pub columns: Vec<String>,
    /// Rows, where each row is a vector of values in column order
    pub rows: Vec<Vec<SqlValue>>,
}

impl RawQueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the number of rows in this result.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if this result contains no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Maps every row into `T`, preserving the order the driver returned.
    pub fn into_rows<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|values| map_row(&columns, values))
            .collect()
    }

    /// Maps the first row into `T`, or returns `None` when there are no rows.
    /// Remaining rows are discarded without being mapped.
    pub fn into_first<T: DeserializeOwned>(self) -> Result<Option<T>> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .next()
            .map(|values| map_row(&columns, values))
            .transpose()
    }
}

/// Deserializes one row into `T`.
///
/// Structs are matched to columns by name, ignoring ASCII case when no column
/// has the exact field name. Tuples and sequences take the columns by
/// position, and a single-column row can map to a scalar.
fn map_row<T: DeserializeOwned>(columns: &[String], values: Vec<SqlValue>) -> Result<T> {
    let row = RowDeserializer {
        columns,
        values: values.into_iter().map(SqlValue::into_json).collect(),
    };
    Ok(T::deserialize(row)?)
}

type DeResult<T> = std::result::Result<T, serde_json::Error>;

struct RowDeserializer<'a> {
    columns: &'a [String],
    values: Vec<Value>,
}

impl RowDeserializer<'_> {
    /// The row as an object, with keys renamed to the matching field names.
    fn into_object(self, fields: &[&str]) -> Value {
        let columns = self.columns;
        let object: Map<String, Value> = columns
            .iter()
            .zip(self.values)
            .map(|(column, value)| (field_for(columns, column, fields), value))
            .collect();
        Value::Object(object)
    }

    fn into_array(self) -> Value {
        Value::Array(self.values)
    }

    fn into_scalar(mut self) -> DeResult<Value> {
        match self.values.len() {
            1 => Ok(self.values.remove(0)),
            n => Err(de::Error::invalid_length(n, &"a single column")),
        }
    }
}

fn field_for(columns: &[String], column: &str, fields: &[&str]) -> String {
    if fields.contains(&column) {
        return column.to_string();
    }
    fields
        .iter()
        .find(|field| {
            field.eq_ignore_ascii_case(column) && !columns.iter().any(|c| c.as_str() == **field)
        })
        .map_or_else(|| column.to_string(), |field| field.to_string())
}

impl<'de> Deserializer<'de> for RowDeserializer<'_> {
    type Error = serde_json::Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        if self.values.len() == 1 {
            self.into_scalar()?.deserialize_any(visitor)
        } else {
            self.into_object(&[]).deserialize_any(visitor)
        }
    }

    fn deserialize_option<V: Visitor<'de>>(
        self,
        visitor: V,
    ) -> DeResult<V::Value> {
        if self.values.len() == 1 {
            self.into_scalar()?.deserialize_option(visitor)
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> DeResult<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        self.into_array().deserialize_seq(visitor)
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        len: usize,
        visitor: V,
    ) -> DeResult<V::Value> {
        self.into_array().deserialize_tuple(len, visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> DeResult<V::Value> {
        self.into_array().deserialize_tuple_struct(name, len, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> DeResult<V::Value> {
        self.into_object(&[]).deserialize_map(visitor)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> DeResult<V::Value> {
        self.into_object(fields).deserialize_struct(name, fields, visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> DeResult<V::Value> {
        self.into_scalar()?.deserialize_enum(name, variants, visitor)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct identifier ignored_any
    }
}
