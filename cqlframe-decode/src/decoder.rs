//! Recursive decoding of container values.
//!
//! Containers arrive flattened: a map is a collection of alternating
//! key/value elements, lists and sets are plain collections, and a tuple is
//! a collection read through a sliding window as wide as its arity. A
//! value that is absent or not a collection decodes to an empty container.

use std::collections::BTreeMap;

use cqlframe_result::{Error, Result};
use cqlframe_types::{DecodedValue, TypeSpec, Value};

use crate::basic::decode_basic;

/// Nesting limit used by [`decode`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Decode `value` against `spec` with the default nesting limit.
pub fn decode(value: &Value, spec: &TypeSpec) -> Result<DecodedValue> {
    Decoder::default().decode(value, spec)
}

/// Recursive decoder with a configurable nesting limit.
///
/// Type descriptors nested deeper than `max_depth` are rejected instead of
/// recursing without bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoder {
    max_depth: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Decoder {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn decode(&self, value: &Value, spec: &TypeSpec) -> Result<DecodedValue> {
        self.decode_at(value, spec, 0)
    }

    fn decode_at(&self, value: &Value, spec: &TypeSpec, depth: usize) -> Result<DecodedValue> {
        if depth > self.max_depth {
            return Err(Error::decode(
                spec.shape_name(),
                format!("nesting depth exceeds limit of {}", self.max_depth),
            ));
        }

        match spec {
            TypeSpec::Basic(kind) => decode_basic(*kind, value),
            TypeSpec::Map { key, value: value_spec } => {
                self.decode_map(elements_of(value), key, value_spec, depth)
            }
            TypeSpec::List { element } | TypeSpec::Set { element } => {
                let items = elements_of(value)
                    .iter()
                    .map(|item| self.decode_at(item, element, depth + 1))
                    .collect::<Result<Vec<_>>>()?;
                Ok(DecodedValue::List(items))
            }
            TypeSpec::Tuple { elements } => self.decode_tuple(elements_of(value), elements, depth),
            TypeSpec::Udt { name, fields } => {
                let mut decoded = BTreeMap::new();
                let Some(present) = value.udt() else {
                    return Ok(DecodedValue::Udt(decoded));
                };
                for (field, raw) in present {
                    let field_spec = fields.get(field).ok_or_else(|| {
                        Error::unsupported_type(format!(
                            "field '{field}' is not declared on udt '{name}'"
                        ))
                    })?;
                    decoded.insert(field.clone(), self.decode_at(raw, field_spec, depth + 1)?);
                }
                Ok(DecodedValue::Udt(decoded))
            }
        }
    }

    /// Pairs up alternating elements. An odd trailing element is ignored and
    /// a repeated key keeps the last value.
    fn decode_map(
        &self,
        elements: &[Value],
        key_spec: &TypeSpec,
        value_spec: &TypeSpec,
        depth: usize,
    ) -> Result<DecodedValue> {
        if elements.len() % 2 == 1 {
            tracing::trace!(
                elements = elements.len(),
                "map collection has a dangling key; dropping it"
            );
        }

        let mut entries = Vec::with_capacity(elements.len() / 2);
        for pair in elements.chunks_exact(2) {
            let key = self.decode_at(&pair[0], key_spec, depth + 1)?;
            let value = self.decode_at(&pair[1], value_spec, depth + 1)?;
            DecodedValue::insert_entry(&mut entries, key, value);
        }
        Ok(DecodedValue::Map(entries))
    }

    /// Every window `items[i..i + arity]` for `i` in `0..=len - arity`,
    /// concatenated. Fewer items than the arity yields an empty list.
    fn decode_tuple(&self, items: &[Value], types: &[TypeSpec], depth: usize) -> Result<DecodedValue> {
        let arity = types.len();
        let mut out = Vec::new();
        if items.len() < arity {
            return Ok(DecodedValue::List(out));
        }

        for start in 0..=(items.len() - arity) {
            for (offset, ty) in types.iter().enumerate() {
                out.push(self.decode_at(&items[start + offset], ty, depth + 1)?);
            }
        }
        Ok(DecodedValue::List(out))
    }
}

#[inline]
fn elements_of(value: &Value) -> &[Value] {
    value.collection().unwrap_or_default()
}
