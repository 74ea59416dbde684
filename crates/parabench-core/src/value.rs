// Dweve Parabench - Parametric Build Matrix and Benchmark Harness
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Value types for macro definitions and parameter vectors.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single macro definition value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Scalar {
    /// Renders the value as it appears in `-D` flags and file names.
    ///
    /// Floats always keep a decimal point or exponent so that `2.0` stays a
    /// floating literal for the preprocessor.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{:?}", x),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// The configured value of a definition: one scalar, or a list to sweep over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefinitionValue {
    Swept(Vec<Scalar>),
    Fixed(Scalar),
}

impl DefinitionValue {
    /// Whether every variant gets its own value from a list.
    pub fn is_swept(&self) -> bool {
        matches!(self, Self::Swept(_))
    }

    /// All values this definition can take, in order.
    pub fn values(&self) -> &[Scalar] {
        match self {
            Self::Swept(values) => values,
            Self::Fixed(value) => std::slice::from_ref(value),
        }
    }
}

/// A named definition borrowed from a [`DefinitionSet`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterDefinition<'a> {
    pub name: &'a str,
    pub value: &'a DefinitionValue,
}

impl ParameterDefinition<'_> {
    pub fn is_swept(&self) -> bool {
        self.value.is_swept()
    }
}

/// Ordered, name-unique collection of definitions.
///
/// Insertion order is preserved; it decides the order of names in every
/// parameter vector expanded from this set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionSet {
    definitions: IndexMap<String, DefinitionValue>,
}

impl DefinitionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a definition. A replaced definition keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<DefinitionValue>) {
        self.definitions.insert(name.into(), value.into());
    }

    /// Remove a definition, keeping the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<DefinitionValue> {
        self.definitions.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&DefinitionValue> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = ParameterDefinition<'_>> {
        self.definitions
            .iter()
            .map(|(name, value)| ParameterDefinition { name, value })
    }

    /// Number of variants this set expands to.
    pub fn variant_count(&self) -> usize {
        self.iter()
            .filter(|d| d.is_swept())
            .map(|d| d.value.values().len())
            .product()
    }
}

impl From<Scalar> for DefinitionValue {
    fn from(value: Scalar) -> Self {
        Self::Fixed(value)
    }
}

impl From<Vec<Scalar>> for DefinitionValue {
    fn from(values: Vec<Scalar>) -> Self {
        Self::Swept(values)
    }
}

impl<N: Into<String>, V: Into<DefinitionValue>> FromIterator<(N, V)> for DefinitionSet {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

/// One `(name, value)` entry of a parameter vector.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Parameter<V> {
    pub name: String,
    pub value: V,
}

/// The ordered parameters identifying one binary variant.
///
/// Build-phase vectors hold typed [`Scalar`] values. Vectors decoded from a
/// file name hold the textual value (`ParameterVector<String>`), which is what
/// the result store is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterVector<V = Scalar> {
    entries: Vec<Parameter<V>>,
}

impl<V> Default for ParameterVector<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> ParameterVector<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: V) {
        self.entries.push(Parameter {
            name: name.into(),
            value,
        });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter<V>> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|p| p.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: fmt::Display> ParameterVector<V> {
    /// Textual form of the vector, as recovered by decoding a file name.
    pub fn render(&self) -> ParameterVector<String> {
        self.entries
            .iter()
            .map(|p| (p.name.clone(), p.value.to_string()))
            .collect()
    }
}

impl<V: fmt::Display> fmt::Display for ParameterVector<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", p.name, p.value)?;
        }
        Ok(())
    }
}

impl<N: Into<String>, V> FromIterator<(N, V)> for ParameterVector<V> {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut vector = Self::new();
        for (name, value) in iter {
            vector.push(name, value);
        }
        vector
    }
}

impl<'a, V> IntoIterator for &'a ParameterVector<V> {
    type Item = &'a Parameter<V>;
    type IntoIter = std::slice::Iter<'a, Parameter<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_rendering() {
        assert_eq!(Scalar::Integer(-4).to_string(), "-4");
        assert_eq!(Scalar::Float(2.0).to_string(), "2.0");
        assert_eq!(Scalar::Float(0.1).to_string(), "0.1");
        assert_eq!(Scalar::Float(1e-7).to_string(), "1e-7");
        assert_eq!(Scalar::Boolean(true).to_string(), "true");
        assert_eq!(Scalar::from("fast").to_string(), "fast");
    }

    #[test]
    fn test_definition_value_from_toml() {
        #[derive(Deserialize)]
        struct Doc {
            defs: DefinitionSet,
        }

        let doc: Doc = toml::from_str(
            r#"
            [defs]
            THREADS = [2, 4]
            RATIO = 0.5
            NAME = "x"
            DEBUG = false
            "#,
        )
        .unwrap();

        let defs: Vec<_> = doc.defs.iter().collect();
        assert_eq!(defs.len(), 4);
        assert_eq!(defs[0].name, "THREADS");
        assert_eq!(
            defs[0].value,
            &DefinitionValue::Swept(vec![Scalar::Integer(2), Scalar::Integer(4)])
        );
        assert_eq!(defs[1].value, &DefinitionValue::Fixed(Scalar::Float(0.5)));
        assert_eq!(defs[2].value, &DefinitionValue::Fixed(Scalar::from("x")));
        assert_eq!(defs[3].value, &DefinitionValue::Fixed(Scalar::Boolean(false)));
    }

    #[test]
    fn test_definition_set_preserves_order_on_replace_and_remove() {
        let mut set: DefinitionSet = [
            ("A", Scalar::Integer(1)),
            ("B", Scalar::Integer(2)),
            ("C", Scalar::Integer(3)),
        ]
        .into_iter()
        .collect();

        set.insert("A", Scalar::Integer(10));
        assert!(set.remove("B").is_some());
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["A", "C"]);
        assert_eq!(set.get("A"), Some(&DefinitionValue::Fixed(Scalar::Integer(10))));
    }

    #[test]
    fn test_variant_count() {
        let mut set = DefinitionSet::new();
        assert_eq!(set.variant_count(), 1);
        set.insert("T", vec![Scalar::Integer(1), Scalar::Integer(2), Scalar::Integer(3)]);
        set.insert("P", vec![Scalar::Integer(1), Scalar::Integer(2)]);
        set.insert("F", Scalar::Integer(7));
        assert_eq!(set.variant_count(), 6);
    }

    #[test]
    fn test_parameter_vector_render_and_display() {
        let vector: ParameterVector = [("T", Scalar::Integer(4)), ("R", Scalar::Float(1.0))]
            .into_iter()
            .collect();
        let rendered = vector.render();
        assert_eq!(rendered.get("T").map(String::as_str), Some("4"));
        assert_eq!(rendered.get("R").map(String::as_str), Some("1.0"));
        assert_eq!(vector.to_string(), "T=4, R=1.0");
        assert_eq!(ParameterVector::<String>::new().to_string(), "");
    }
}
