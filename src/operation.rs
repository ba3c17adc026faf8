// Copyright 2018 Osspial
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logical operations and their candidate symbols.
//!
//! Every operation has a stable name and an ordered list of native symbols that can implement it.
//! The first candidate is conventionally the core symbol (`glGenFramebuffers`), and the rest are
//! vendor or extension aliases (`glGenFramebuffersEXT`) in the order they should be tried.
//!
//! Tables are built once, usually through the [`operations!`] macro, and shared between contexts
//! with `Rc`. Resolution state doesn't live here; see [`CapabilityResolver`].
//!
//! [`operations!`]: ../macro.operations.html
//! [`CapabilityResolver`]: ../resolve/struct.CapabilityResolver.html

use crate::feature::Requirement;

use derive_more::Display;
use std::{borrow::Cow, collections::HashMap, error::Error};

/// Vendor and extension suffixes appended to core symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suffix {
    Ext,
    Arb,
    Nv,
    Oes,
    Khr,
    Amd,
    Apple,
    Angle,
    Intel,
}

/// A logical operation and the symbols that can implement it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    name: Cow<'static, str>,
    candidates: Vec<Cow<'static, str>>,
    requirement: Option<Requirement>,
}

/// Index of an operation within the [`OperationTable`] that issued it.
///
/// Using an `OpId` with a table other than the one that issued it is a bug, and will either panic
/// or resolve the wrong operation.
///
/// [`OperationTable`]: ./struct.OperationTable.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(pub(crate) usize);

#[derive(Debug, Clone, Default)]
pub struct OperationTable {
    operations: Vec<Operation>,
    by_name: HashMap<Cow<'static, str>, OpId>,
}

#[derive(Debug, Clone, Default)]
pub struct OperationTableBuilder {
    operations: Vec<Operation>,
}

/// Error produced when building an [`OperationTable`].
///
/// [`OperationTable`]: ./struct.OperationTable.html
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum TableError {
    /// An operation was declared without any candidate symbols.
    #[display(fmt = "Operation `{}` has no candidate symbols", _0)]
    EmptyCandidates(String),
    /// Two operations share a name.
    #[display(fmt = "Operation `{}` declared more than once", _0)]
    DuplicateOperation(String),
}

impl Suffix {
    /// The order aliases get tried in when none is given: `EXT`, `ARB`, `NV`, `OES`.
    pub const DEFAULT_ORDER: [Suffix; 4] = [Suffix::Ext, Suffix::Arb, Suffix::Nv, Suffix::Oes];

    pub fn as_str(self) -> &'static str {
        match self {
            Suffix::Ext => "EXT",
            Suffix::Arb => "ARB",
            Suffix::Nv => "NV",
            Suffix::Oes => "OES",
            Suffix::Khr => "KHR",
            Suffix::Amd => "AMD",
            Suffix::Apple => "APPLE",
            Suffix::Angle => "ANGLE",
            Suffix::Intel => "INTEL",
        }
    }
}

impl Operation {
    /// Create an operation from its name and its candidates, highest priority first.
    pub fn new<N, I, C>(name: N, candidates: I) -> Operation
    where
        N: Into<Cow<'static, str>>,
        I: IntoIterator<Item = C>,
        C: Into<Cow<'static, str>>,
    {
        Operation {
            name: name.into(),
            candidates: candidates.into_iter().map(Into::into).collect(),
            requirement: None,
        }
    }

    /// Create an operation named after `core_symbol`, whose candidates are `core_symbol` followed
    /// by `core_symbol` with each of `suffixes` appended, in the order given.
    ///
    /// ```
    /// use gullery_caps::operation::{Operation, Suffix};
    ///
    /// let op = Operation::with_suffixes("glGenFramebuffers", &Suffix::DEFAULT_ORDER[..2]);
    /// assert_eq!(
    ///     vec!["glGenFramebuffers", "glGenFramebuffersEXT", "glGenFramebuffersARB"],
    ///     op.candidates().iter().map(|c| &**c).collect::<Vec<_>>()
    /// );
    /// ```
    pub fn with_suffixes(core_symbol: &'static str, suffixes: &[Suffix]) -> Operation {
        let aliases = suffixes
            .iter()
            .map(|s| Cow::Owned(format!("{}{}", core_symbol, s.as_str())));
        Operation::new(
            core_symbol,
            Some(Cow::Borrowed(core_symbol)).into_iter().chain(aliases),
        )
    }

    /// Attach the version/extension conditions this operation is available under.
    pub fn requires(mut self, requirement: Requirement) -> Operation {
        self.requirement = Some(requirement);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn candidates(&self) -> &[Cow<'static, str>] {
        &self.candidates
    }

    #[inline]
    pub fn requirement(&self) -> Option<&Requirement> {
        self.requirement.as_ref()
    }
}

impl OperationTable {
    pub fn builder() -> OperationTableBuilder {
        OperationTableBuilder::default()
    }

    /// Look up an operation's id by its name.
    pub fn id(&self, name: &str) -> Option<OpId> {
        self.by_name.get(name).cloned()
    }

    /// # Panics
    /// Panics if `id` wasn't issued by this table.
    #[inline]
    pub fn operation(&self, id: OpId) -> &Operation {
        &self.operations[id.0]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OpId, &Operation)> {
        self.operations
            .iter()
            .enumerate()
            .map(|(i, op)| (OpId(i), op))
    }
}

impl OperationTableBuilder {
    pub fn operation(mut self, operation: Operation) -> OperationTableBuilder {
        self.operations.push(operation);
        self
    }

    /// Finish the table. Ids are handed out in declaration order.
    pub fn build(self) -> Result<OperationTable, TableError> {
        let mut by_name = HashMap::with_capacity(self.operations.len());

        for (i, op) in self.operations.iter().enumerate() {
            if op.candidates.is_empty() {
                return Err(TableError::EmptyCandidates(op.name.to_string()));
            }
            if by_name.insert(op.name.clone(), OpId(i)).is_some() {
                return Err(TableError::DuplicateOperation(op.name.to_string()));
            }
        }

        Ok(OperationTable {
            operations: self.operations,
            by_name,
        })
    }
}

impl Error for TableError {}
