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

//! Version construction and comparison errors.

use super::Api;

use derive_more::Display;
use std::{error::Error, io};

/// Error produced while building, parsing or comparing a [`Version`].
///
/// [`Version`]: ../struct.Version.html
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum VersionError {
    /// A component passed to a constructor was out of range, or the API family was empty.
    #[display(fmt = "Invalid version argument: {}", _0)]
    InvalidArgument(String),
    /// The text handed to a parser didn't contain a recognizable version.
    ///
    /// Includes the offending input.
    #[display(fmt = "Unrecognized version format `{}`", _0)]
    InvalidFormat(String),
    /// Two versions from different API families were ordered against each other.
    ///
    /// This is always a bug in the calling code: `gl 3.0` and `gles2 3.0` have no meaningful
    /// order.
    #[display(fmt = "Cannot order a `{}` version against a `{}` version", left, right)]
    IncompatibleFamily { left: Api, right: Api },
}

impl Error for VersionError {}

impl From<VersionError> for io::Error {
    fn from(e: VersionError) -> io::Error {
        let kind = match e {
            VersionError::InvalidArgument(_) => io::ErrorKind::InvalidInput,
            VersionError::InvalidFormat(_) | VersionError::IncompatibleFamily { .. } => {
                io::ErrorKind::InvalidData
            }
        };
        io::Error::new(kind, e)
    }
}
