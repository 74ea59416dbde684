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

//! Expansion of a definition set into concrete parameter vectors.
//!
//! Definitions are split into swept (list-valued) and fixed (scalar) groups,
//! each keeping its original relative order. The Cartesian product of the
//! swept lists is enumerated in lexicographic order, the last swept axis
//! varying fastest. Every vector lists the swept names first, then the fixed
//! names, so all vectors of one program share a single name order.
//!
//! # Examples
//!
//! ```
//! use parabench_core::{expand, DefinitionSet, Scalar};
//!
//! let mut set = DefinitionSet::new();
//! set.insert("T", vec![Scalar::Integer(2), Scalar::Integer(4)]);
//! set.insert("P", vec![Scalar::Integer(1), Scalar::Integer(3)]);
//!
//! let rendered: Vec<String> = expand(&set).iter().map(|v| v.to_string()).collect();
//! assert_eq!(rendered, ["T=2, P=1", "T=2, P=3", "T=4, P=1", "T=4, P=3"]);
//! ```

use crate::value::{DefinitionSet, ParameterDefinition, ParameterVector, Scalar};

/// The variants of one program in enumeration order.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantMatrix {
    names: Vec<String>,
    vectors: Vec<ParameterVector>,
}

impl VariantMatrix {
    /// Definition names in vector order: swept names, then fixed names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn vectors(&self) -> &[ParameterVector] {
        &self.vectors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParameterVector> {
        self.vectors.iter()
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn into_vectors(self) -> Vec<ParameterVector> {
        self.vectors
    }
}

impl IntoIterator for VariantMatrix {
    type Item = ParameterVector;
    type IntoIter = std::vec::IntoIter<ParameterVector>;

    fn into_iter(self) -> Self::IntoIter {
        self.vectors.into_iter()
    }
}

/// Expand a definition set into every parameter vector it describes.
///
/// No swept definitions yields exactly one vector of the fixed values; an
/// empty set yields exactly one empty vector. A swept definition with no
/// values yields no vectors at all (configuration validation rejects it).
pub fn expand(definitions: &DefinitionSet) -> VariantMatrix {
    let (swept, fixed): (Vec<ParameterDefinition<'_>>, Vec<ParameterDefinition<'_>>) =
        definitions.iter().partition(|d| d.is_swept());

    let names = swept
        .iter()
        .chain(fixed.iter())
        .map(|d| d.name.to_string())
        .collect();

    let axes: Vec<&[Scalar]> = swept.iter().map(|d| d.value.values()).collect();
    let vectors = product_indices(&axes)
        .into_iter()
        .map(|indices| {
            let mut vector = ParameterVector::new();
            for ((definition, axis), &i) in swept.iter().zip(&axes).zip(&indices) {
                vector.push(definition.name, axis[i].clone());
            }
            for definition in &fixed {
                vector.push(definition.name, definition.value.values()[0].clone());
            }
            vector
        })
        .collect();

    VariantMatrix { names, vectors }
}

/// Index tuples of the Cartesian product, last axis fastest.
fn product_indices(axes: &[&[Scalar]]) -> Vec<Vec<usize>> {
    if axes.iter().any(|axis| axis.is_empty()) {
        return Vec::new();
    }

    let total: usize = axes.iter().map(|axis| axis.len()).product();
    let mut tuples = Vec::with_capacity(total);
    let mut odometer = vec![0usize; axes.len()];

    for _ in 0..total {
        tuples.push(odometer.clone());
        for position in (0..axes.len()).rev() {
            odometer[position] += 1;
            if odometer[position] < axes[position].len() {
                break;
            }
            odometer[position] = 0;
        }
    }

    tuples
}
