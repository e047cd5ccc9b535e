//! Named per-element attributes.
//!
//! Every host collection owns an [`AttributeStore`] holding integer
//! attributes (region tags, boundary references) and floating-point
//! attributes with a fixed number of components per element (scalar size
//! fields, level-set values, symmetric metric tensors).
//!
//! The adapter never touches the store directly: it goes through the
//! [`AttributeSource`] / [`AttributeSink`] traits so that the conversion code
//! only depends on "read a sequence by name" and "write a sequence by name".

use std::collections::BTreeMap;

use crate::error::{BridgeError, ElementKind, Result};

/// Number of components of a symmetric 3x3 tensor stored as
/// `[m11, m12, m13, m22, m23, m33]`.
pub const TENSOR_COMPONENTS: usize = 6;

/// A floating-point attribute with `dimension` components per element.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatAttribute {
    dimension: usize,
    values: Vec<f64>,
}

impl FloatAttribute {
    /// Number of components per element.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Whether this attribute holds one scalar per element.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.dimension == 1
    }

    /// All values, element-major.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The components of element `i`.
    #[inline]
    pub fn get(&self, i: usize) -> &[f64] {
        &self.values[i * self.dimension..(i + 1) * self.dimension]
    }

    fn resize(&mut self, len: usize) {
        self.values.resize(len * self.dimension, 0.0);
    }
}

/// Attribute storage for one element collection.
///
/// All attributes are kept at the collection's length: creating elements
/// grows every attribute with zero values, clearing the collection empties
/// them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeStore {
    len: usize,
    ints: BTreeMap<String, Vec<i32>>,
    floats: BTreeMap<String, FloatAttribute>,
}

impl AttributeStore {
    /// Create an empty store for `len` elements.
    pub fn with_len(len: usize) -> Self {
        Self {
            len,
            ..Self::default()
        }
    }

    /// Whether an attribute of any type is defined under `name`.
    pub fn is_defined(&self, name: &str) -> bool {
        self.ints.contains_key(name) || self.floats.contains_key(name)
    }

    /// Names of all defined attributes, integer attributes first.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.ints.keys().chain(self.floats.keys()).map(String::as_str)
    }

    /// Look up an integer attribute.
    pub fn int(&self, name: &str) -> Option<&[i32]> {
        self.ints.get(name).map(Vec::as_slice)
    }

    /// Look up a floating-point attribute.
    pub fn float(&self, name: &str) -> Option<&FloatAttribute> {
        self.floats.get(name)
    }

    /// Create or overwrite an integer attribute.
    ///
    /// A float attribute with the same name is replaced.
    pub fn set_int(&mut self, kind: ElementKind, name: &str, values: Vec<i32>) -> Result<()> {
        if values.len() != self.len {
            return Err(BridgeError::AttributeLength {
                name: name.to_string(),
                collection: kind,
                expected: self.len,
                found: values.len(),
            });
        }
        self.floats.remove(name);
        self.ints.insert(name.to_string(), values);
        Ok(())
    }

    /// Create or overwrite a floating-point attribute with `dimension`
    /// components per element.
    ///
    /// An integer attribute with the same name is replaced.
    pub fn set_float(
        &mut self,
        kind: ElementKind,
        name: &str,
        dimension: usize,
        values: Vec<f64>,
    ) -> Result<()> {
        if dimension == 0 {
            return Err(BridgeError::invalid_param(
                "dimension",
                dimension,
                "attributes need at least one component",
            ));
        }
        if values.len() != self.len * dimension {
            return Err(BridgeError::AttributeLength {
                name: name.to_string(),
                collection: kind,
                expected: self.len * dimension,
                found: values.len(),
            });
        }
        self.ints.remove(name);
        self.floats
            .insert(name.to_string(), FloatAttribute { dimension, values });
        Ok(())
    }

    /// Remove an attribute of either type. Returns whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.ints.remove(name).is_some() | self.floats.remove(name).is_some()
    }

    pub(crate) fn resize(&mut self, len: usize) {
        self.len = len;
        for values in self.ints.values_mut() {
            values.resize(len, 0);
        }
        for attr in self.floats.values_mut() {
            attr.resize(len);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.len = 0;
        self.ints.clear();
        self.floats.clear();
    }
}

/// Read access to named attributes, as seen by the mesh adapter.
pub trait AttributeSource {
    /// Number of elements in a collection.
    fn element_count(&self, kind: ElementKind) -> usize;

    /// Read a per-element integer attribute.
    fn read_int_attribute(&self, kind: ElementKind, name: &str) -> Option<&[i32]>;

    /// Read a per-vertex floating-point field.
    fn read_vertex_field(&self, name: &str) -> Option<&FloatAttribute>;
}

/// Write access to named attributes, as seen by the mesh adapter.
pub trait AttributeSink {
    /// Create or overwrite a per-element integer attribute.
    fn write_int_attribute(&mut self, kind: ElementKind, name: &str, values: Vec<i32>)
        -> Result<()>;

    /// Create or overwrite a per-vertex floating-point field.
    fn write_vertex_field(&mut self, name: &str, dimension: usize, values: Vec<f64>)
        -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut store = AttributeStore::with_len(3);
        store.set_int(ElementKind::Edge, "tag", vec![1, 2, 3]).unwrap();
        store
            .set_float(ElementKind::Vertex, "h", 1, vec![0.1, 0.2, 0.3])
            .unwrap();

        assert_eq!(store.int("tag"), Some(&[1, 2, 3][..]));
        assert!(store.float("h").unwrap().is_scalar());
        assert!(store.is_defined("tag"));
        assert!(store.is_defined("h"));
        assert!(!store.is_defined("missing"));
    }

    #[test]
    fn test_length_mismatch() {
        let mut store = AttributeStore::with_len(2);
        let err = store.set_int(ElementKind::Facet, "tag", vec![1]).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::AttributeLength { expected: 2, found: 1, .. }
        ));
    }

    #[test]
    fn test_tensor_access() {
        let mut store = AttributeStore::with_len(2);
        let values: Vec<f64> = (0..12).map(|v| v as f64).collect();
        store
            .set_float(ElementKind::Vertex, "metric", TENSOR_COMPONENTS, values)
            .unwrap();

        let attr = store.float("metric").unwrap();
        assert_eq!(attr.dimension(), TENSOR_COMPONENTS);
        assert_eq!(attr.get(1), &[6.0, 7.0, 8.0, 9.0, 10.0, 11.0]);
    }

    #[test]
    fn test_resize_grows_with_zeros() {
        let mut store = AttributeStore::with_len(1);
        store.set_int(ElementKind::Cell, "region", vec![7]).unwrap();
        store.resize(3);
        assert_eq!(store.int("region"), Some(&[7, 0, 0][..]));
    }

    #[test]
    fn test_overwrite_changes_type() {
        let mut store = AttributeStore::with_len(1);
        store.set_int(ElementKind::Vertex, "x", vec![1]).unwrap();
        store.set_float(ElementKind::Vertex, "x", 1, vec![0.5]).unwrap();
        assert!(store.int("x").is_none());
        assert!(store.float("x").is_some());
        assert_eq!(store.names().count(), 1);
    }
}
