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

/// Declare an [`OperationTableBuilder`] from `name => [candidates...]` pairs.
///
/// Candidates are listed highest priority first. The result still needs `.build()`, so more
/// operations (or operations with [`Requirement`]s) can be chained on.
///
/// ```
/// #[macro_use]
/// extern crate gullery_caps;
///
/// # fn main() {
/// let table = operations![
///     "GenVertexArrays" => ["glGenVertexArrays", "glGenVertexArraysOES", "glGenVertexArraysAPPLE"],
///     "Clear" => ["glClear"],
/// ]
/// .build()
/// .unwrap();
///
/// assert_eq!(2, table.len());
/// # }
/// ```
///
/// [`OperationTableBuilder`]: ./operation/struct.OperationTableBuilder.html
/// [`Requirement`]: ./feature/struct.Requirement.html
#[macro_export]
macro_rules! operations {
    ($($name:expr => [$($candidate:expr),+ $(,)?]),* $(,)?) => {{
        let builder = $crate::operation::OperationTable::builder();
        $(
            let builder = builder.operation(
                $crate::operation::Operation::new($name, vec![$($candidate),+])
            );
        )*
        builder
    }};
}
