//! URL query parameter rendering.
//!
//! A [`QueryParameter`] pairs a key with the canonical text of its value, fixed at
//! construction. Rendering produces a `key=value` token with no percent-encoding;
//! escaping belongs to whichever layer assembles the final URL (see
//! [`crate::config::ProcuretConfig::endpoint`]).
//!
//! Values are classified into a [`QueryValue`] before rendering:
//!
//! 1. text is used verbatim,
//! 2. booleans render as the lowercase literals `true` and `false`,
//! 3. anything else uses its generic text conversion.

use crate::{Error, Result};
use serde::ser::{self, Impossible};
use serde::Serialize;
use std::fmt::{self, Display};
use tracing::{debug, trace};

/// Classified value of a query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// Textual value, rendered verbatim.
    Text(String),
    /// Boolean value, rendered as `true` or `false`.
    Boolean(bool),
    /// Any other value, holding its generic text conversion.
    Other(String),
}

impl QueryValue {
    /// Convert an arbitrary serializable value to its query representation.
    ///
    /// Strings and chars become [`QueryValue::Text`], booleans
    /// [`QueryValue::Boolean`] and numbers [`QueryValue::Other`] holding their
    /// `Display` text, so the result matches [`QueryParameter::from_value`].
    /// Values without a scalar text form are rejected here rather than at render
    /// time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] for `None`, unit values, bytes,
    /// sequences, maps, structs and data-carrying enum variants, or when the
    /// value's `Serialize` implementation reports an error.
    pub fn try_from_serialize<T>(value: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(QueryValueSerializer)
    }

    /// Text form of the value as it appears in a query token.
    #[must_use]
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Other(text) => text,
            Self::Boolean(true) => "true",
            Self::Boolean(false) => "false",
        }
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

macro_rules! impl_from_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for QueryValue {
                fn from(value: $ty) -> Self {
                    Self::Other(value.to_string())
                }
            }
        )*
    };
}

impl_from_display!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char);

fn no_text_form(kind: &str) -> Error {
    Error::InvalidValue(format!("{kind} has no text representation"))
}

/// Classifies a single serialized scalar into a [`QueryValue`].
struct QueryValueSerializer;

macro_rules! serialize_other {
    ($($method:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method(self, v: $ty) -> Result<QueryValue> {
                Ok(QueryValue::Other(v.to_string()))
            }
        )*
    };
}

impl ser::Serializer for QueryValueSerializer {
    type Ok = QueryValue;
    type Error = Error;
    type SerializeSeq = Impossible<QueryValue, Error>;
    type SerializeTuple = Impossible<QueryValue, Error>;
    type SerializeTupleStruct = Impossible<QueryValue, Error>;
    type SerializeTupleVariant = Impossible<QueryValue, Error>;
    type SerializeMap = Impossible<QueryValue, Error>;
    type SerializeStruct = Impossible<QueryValue, Error>;
    type SerializeStructVariant = Impossible<QueryValue, Error>;

    fn serialize_bool(self, v: bool) -> Result<QueryValue> {
        Ok(QueryValue::Boolean(v))
    }

    serialize_other!(
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_i128: i128,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_u128: u128,
        serialize_f32: f32,
        serialize_f64: f64,
    );

    fn serialize_char(self, v: char) -> Result<QueryValue> {
        Ok(QueryValue::Text(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<QueryValue> {
        Ok(QueryValue::Text(v.to_string()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<QueryValue> {
        Err(no_text_form("byte string"))
    }

    fn serialize_none(self) -> Result<QueryValue> {
        Err(no_text_form("none"))
    }

    fn serialize_some<T>(self, value: &T) -> Result<QueryValue>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<QueryValue> {
        Err(no_text_form("unit"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<QueryValue> {
        Err(no_text_form(name))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<QueryValue> {
        Ok(QueryValue::Text(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<QueryValue>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<QueryValue>
    where
        T: Serialize + ?Sized,
    {
        Err(no_text_form(name))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(no_text_form("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(no_text_form("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(no_text_form(name))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(no_text_form(name))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(no_text_form("map"))
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(no_text_form(name))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(no_text_form(name))
    }
}

/// A single URL parameter, e.g. `beep=boop`.
///
/// Immutable once built: the rendered value is computed by the constructor and
/// never recomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameter {
    key: String,
    value: QueryValue,
    rendered: String,
}

impl QueryParameter {
    /// Create a parameter from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if `key` is empty and
    /// [`Error::InvalidValue`] if the value has no text representation.
    pub fn new<T>(key: impl Into<String>, value: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        let key = key.into();
        let value = match QueryValue::try_from_serialize(value) {
            Ok(value) => value,
            Err(e) => {
                debug!(key = %key, error = %e, "rejected query parameter value");
                return Err(e);
            }
        };
        Self::from_value(key, value)
    }

    /// Create a parameter from an already classified value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if `key` is empty.
    pub fn from_value(key: impl Into<String>, value: impl Into<QueryValue>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            debug!("rejected query parameter with empty key");
            return Err(Error::InvalidKey("key must not be empty".to_string()));
        }

        let value = value.into();
        let rendered = value.as_text().to_string();
        Ok(Self {
            key,
            value,
            rendered,
        })
    }

    /// Create a textual parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if `key` is empty.
    pub fn text(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        Self::from_value(key, QueryValue::Text(value.into()))
    }

    /// Create a boolean parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if `key` is empty.
    pub fn boolean(key: impl Into<String>, value: bool) -> Result<Self> {
        Self::from_value(key, QueryValue::Boolean(value))
    }

    /// Create a parameter from any value with a [`Display`] implementation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if `key` is empty.
    pub fn display<T>(key: impl Into<String>, value: &T) -> Result<Self>
    where
        T: Display + ?Sized,
    {
        Self::from_value(key, QueryValue::Other(value.to_string()))
    }

    /// Parameter key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Classified value.
    #[must_use]
    pub const fn value(&self) -> &QueryValue {
        &self.value
    }

    /// Rendered value without the key.
    #[must_use]
    pub fn rendered_value(&self) -> &str {
        &self.rendered
    }

    /// Render as a `key=value` token.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Return the parameters whose key differs from `key`, in their original order.
    #[must_use]
    pub fn remove_targets_with<I>(key: &str, targets: I) -> Vec<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let mut removed = 0usize;
        let retained: Vec<Self> = targets
            .into_iter()
            .filter(|target| {
                let keep = target.key != key;
                if !keep {
                    removed += 1;
                }
                keep
            })
            .collect();

        trace!(key, removed, retained = retained.len(), "removed query parameters");
        retained
    }
}

impl Display for QueryParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.rendered)
    }
}

/// Builder for assembling an ordered list of query parameters.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct QueryParams {
    parameters: Vec<QueryParameter>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parameters: Vec::new(),
        }
    }

    /// Append an already constructed parameter.
    pub fn push_parameter(&mut self, parameter: QueryParameter) {
        self.parameters.push(parameter);
    }

    /// Append a required key/value pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if `key` is empty.
    pub fn push(&mut self, key: &str, value: impl Into<QueryValue>) -> Result<()> {
        self.parameters.push(QueryParameter::from_value(key, value)?);
        Ok(())
    }

    /// Append a key/value pair when the value is present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if a value is present and `key` is empty.
    pub fn push_opt<T>(&mut self, key: &str, value: Option<T>) -> Result<()>
    where
        T: Into<QueryValue>,
    {
        match value {
            Some(value) => self.push(key, value),
            None => Ok(()),
        }
    }

    /// Append using a mapping function when the value is present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if a value is present and `key` is empty.
    pub fn push_opt_with<T, F>(&mut self, key: &str, value: Option<T>, map: F) -> Result<()>
    where
        F: FnOnce(T) -> String,
    {
        match value {
            Some(value) => self.push(key, QueryValue::Text(map(value))),
            None => Ok(()),
        }
    }

    /// Append a value of any [`Display`] type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if `key` is empty.
    pub fn push_display<T>(&mut self, key: &str, value: &T) -> Result<()>
    where
        T: Display + ?Sized,
    {
        self.parameters.push(QueryParameter::display(key, value)?);
        Ok(())
    }

    /// Append any serializable value, failing if it has no text form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] or [`Error::InvalidValue`] as
    /// [`QueryParameter::new`] does. Nothing is appended on failure.
    pub fn try_push<T>(&mut self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.parameters.push(QueryParameter::new(key, value)?);
        Ok(())
    }

    /// Drop every parameter with the given key.
    pub fn remove(&mut self, key: &str) {
        let parameters = std::mem::take(&mut self.parameters);
        self.parameters = QueryParameter::remove_targets_with(key, parameters);
    }

    /// Collected parameters, in insertion order.
    #[must_use]
    pub fn parameters(&self) -> &[QueryParameter] {
        &self.parameters
    }

    /// Join the rendered tokens with `&`. No escaping is applied.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.parameters
            .iter()
            .map(QueryParameter::render)
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Return the collected key/rendered-value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.parameters
            .into_iter()
            .map(|parameter| (parameter.key, parameter.rendered))
            .collect()
    }

    /// Returns true if no parameters have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl From<QueryParams> for Vec<QueryParameter> {
    fn from(params: QueryParams) -> Self {
        params.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn text_renders_verbatim() {
        for value in ["boop", "", "a b&c=d", "100%", "ünïcode"] {
            let parameter = QueryParameter::new("k", value).unwrap();
            assert_eq!(parameter.render(), format!("k={value}"));
        }
    }

    #[test]
    fn booleans_render_lowercase() {
        assert_eq!(QueryParameter::new("k", &true).unwrap().render(), "k=true");
        assert_eq!(QueryParameter::new("k", &false).unwrap().render(), "k=false");
        assert_eq!(QueryParameter::boolean("k", true).unwrap().render(), "k=true");
    }

    #[test]
    fn numbers_use_generic_text() {
        assert_eq!(QueryParameter::new("k", &42).unwrap().render(), "k=42");
        assert_eq!(QueryParameter::new("k", &-7i64).unwrap().render(), "k=-7");
        assert_eq!(QueryParameter::new("k", &1.5f64).unwrap().render(), "k=1.5");
        assert_eq!(QueryParameter::display("k", &42u8).unwrap().render(), "k=42");
    }

    #[test]
    fn classification_follows_precedence() {
        assert_eq!(
            QueryParameter::new("k", "true").unwrap().value(),
            &QueryValue::Text("true".to_string())
        );
        assert_eq!(
            QueryParameter::new("k", &true).unwrap().value(),
            &QueryValue::Boolean(true)
        );
        assert_eq!(
            QueryParameter::new("k", &3u32).unwrap().value(),
            &QueryValue::Other("3".to_string())
        );
    }

    #[test]
    fn unconvertible_values_fail_at_construction() {
        let err = QueryParameter::new("k", &vec![1, 2]).unwrap_err();
        assert!(matches!(err, Error::InvalidValue(_)));

        let mut map = BTreeMap::new();
        map.insert("a", 1);
        assert!(matches!(
            QueryParameter::new("k", &map),
            Err(Error::InvalidValue(_))
        ));

        assert!(matches!(
            QueryParameter::new("k", &()),
            Err(Error::InvalidValue(_))
        ));
        assert!(matches!(
            QueryParameter::new("k", &Option::<u32>::None),
            Err(Error::InvalidValue(_))
        ));
        assert!(matches!(
            QueryParameter::new("k", b"raw".as_slice()),
            Err(Error::InvalidValue(_))
        ));
    }

    #[test]
    fn serialized_numbers_match_display_text() {
        fn assert_agrees<T>(value: T)
        where
            T: Serialize + Into<QueryValue> + Copy,
        {
            let generic = QueryParameter::new("k", &value).unwrap();
            let typed = QueryParameter::from_value("k", value).unwrap();
            assert_eq!(generic, typed);
        }

        assert_agrees(u128::MAX);
        assert_agrees(i128::MIN);
        assert_agrees(0.1f32);
        assert_agrees(1.0f64);
        assert_agrees(1e20f64);

        assert_eq!(
            QueryParameter::new("k", &u128::MAX).unwrap().render(),
            "k=340282366920938463463374607431768211455"
        );
        assert_eq!(QueryParameter::new("k", &0.1f32).unwrap().render(), "k=0.1");
        assert_eq!(QueryParameter::new("k", &1.0f64).unwrap().render(), "k=1");
        assert_eq!(
            QueryParameter::new("k", &1e20f64).unwrap().render(),
            "k=100000000000000000000"
        );
        assert_eq!(
            QueryParameter::new("k", &f64::NAN).unwrap().render(),
            QueryParameter::display("k", &f64::NAN).unwrap().render()
        );
        assert_eq!(QueryParameter::new("k", &f64::NAN).unwrap().render(), "k=NaN");
    }

    #[test]
    fn wrapped_scalars_keep_their_classification() {
        #[derive(Serialize)]
        struct AgentId(u64);

        #[derive(Serialize)]
        #[serde(rename_all = "lowercase")]
        enum Disposition {
            Active,
        }

        assert_eq!(
            QueryParameter::new("agent_id", &AgentId(9)).unwrap().render(),
            "agent_id=9"
        );
        assert_eq!(
            QueryParameter::new("state", &Disposition::Active)
                .unwrap()
                .value(),
            &QueryValue::Text("active".to_string())
        );
        assert_eq!(
            QueryParameter::new("k", &Some('x')).unwrap().value(),
            &QueryValue::Text("x".to_string())
        );
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(
            QueryParameter::text("", "v"),
            Err(Error::InvalidKey(_))
        ));
        assert!(matches!(
            QueryParameter::new("", &1),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn render_is_idempotent() {
        let parameter = QueryParameter::new("limit", &25).unwrap();
        let first = parameter.render();
        let second = parameter.render();
        assert_eq!(first, second);
        assert_eq!(parameter.to_string(), first);
        assert_eq!(parameter.rendered_value(), "25");
    }

    #[test]
    fn remove_targets_with_drops_matching_keys() {
        let targets = vec![
            QueryParameter::new("a", &1).unwrap(),
            QueryParameter::new("b", &2).unwrap(),
            QueryParameter::new("a", &3).unwrap(),
        ];

        let retained = QueryParameter::remove_targets_with("a", targets);
        assert_eq!(retained.len(), 1);
        assert_eq!(retained[0].render(), "b=2");
    }

    #[test]
    fn remove_targets_with_preserves_order() {
        let targets = vec![
            QueryParameter::text("c", "1").unwrap(),
            QueryParameter::text("x", "2").unwrap(),
            QueryParameter::text("d", "3").unwrap(),
            QueryParameter::text("x", "4").unwrap(),
            QueryParameter::text("e", "5").unwrap(),
        ];

        let rendered: Vec<String> = QueryParameter::remove_targets_with("x", targets)
            .iter()
            .map(QueryParameter::render)
            .collect();
        assert_eq!(rendered, vec!["c=1", "d=3", "e=5"]);
    }

    #[test]
    fn remove_targets_with_absent_key_keeps_everything() {
        let targets = vec![QueryParameter::text("a", "1").unwrap()];
        assert_eq!(
            QueryParameter::remove_targets_with("z", targets.clone()),
            targets
        );
        assert!(QueryParameter::remove_targets_with("a", Vec::new()).is_empty());
    }

    #[test]
    fn push_opt_skips_none() {
        let mut params = QueryParams::new();
        params.push_opt("name", Option::<String>::None).unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn push_opt_with_applies_mapper() {
        let mut params = QueryParams::new();
        params
            .push_opt_with("limit", Some(5u32), |v| format!("{v:02}"))
            .unwrap();
        assert_eq!(
            params.into_pairs(),
            vec![("limit".to_string(), "05".to_string())]
        );
    }

    #[test]
    fn failed_try_push_appends_nothing() {
        let mut params = QueryParams::new();
        params.push("a", 1u32).unwrap();
        assert!(params.try_push("b", &[1, 2, 3]).is_err());
        assert_eq!(params.parameters().len(), 1);
    }

    #[test]
    fn query_string_joins_tokens_without_escaping() {
        let mut params = QueryParams::new();
        params.push("name", "Jane Doe").unwrap();
        params.push("active", true).unwrap();
        params.push_opt("limit", Some(10u32)).unwrap();
        params.push_display("page", &2).unwrap();
        assert_eq!(
            params.to_query_string(),
            "name=Jane Doe&active=true&limit=10&page=2"
        );
    }

    #[test]
    fn remove_filters_builder_in_place() {
        let mut params = QueryParams::new();
        params.push("a", 1u32).unwrap();
        params.push("b", 2u32).unwrap();
        params.push("a", 3u32).unwrap();
        params.remove("a");
        assert_eq!(params.to_query_string(), "b=2");
    }
}
