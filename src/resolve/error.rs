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

//! Invocation errors.

use derive_more::Display;
use std::{
    error::Error,
    fmt::{self, Debug},
    io,
};

/// None of an operation's candidate symbols exist in the current context.
///
/// Permanent for the lifetime of the resolution cache; retrying won't help unless the cache is
/// explicitly invalidated.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display(fmt = "`{}` isn't implemented by this context", operation)]
pub struct CapabilityUnimplemented {
    /// The logical operation's name.
    pub operation: String,
}

/// An error the native layer reported after a call, surfaced through an [`ErrorCheck`] hook.
///
/// The resolver doesn't interpret these; use [`downcast_ref`] to get at the concrete type.
///
/// [`ErrorCheck`]: ../../hooks/trait.ErrorCheck.html
/// [`downcast_ref`]: #method.downcast_ref
pub struct NativeError(Box<dyn Error + Send + Sync + 'static>);

/// Error returned when forwarding a call.
#[derive(Debug)]
pub enum InvokeError {
    /// The operation has no live candidate. Nothing was called.
    Unimplemented(CapabilityUnimplemented),
    /// The call was made, but the error-check hook reported a native error afterwards.
    Native(NativeError),
    /// The operation name isn't in the context's operation table.
    UnknownOperation(String),
}

impl NativeError {
    pub fn new<E: Error + Send + Sync + 'static>(error: E) -> NativeError {
        NativeError(Box::new(error))
    }

    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref()
    }
}

impl Debug for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.debug_tuple("NativeError").field(&self.0).finish()
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use self::InvokeError::*;
        match *self {
            Unimplemented(ref e) => write!(f, "{}", e),
            Native(ref e) => write!(f, "Native error after call: {}", e),
            UnknownOperation(ref name) => write!(f, "Unknown operation `{}`", name),
        }
    }
}

impl Error for CapabilityUnimplemented {}

impl Error for NativeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.0)
    }
}

impl Error for InvokeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            InvokeError::Unimplemented(ref e) => Some(e),
            InvokeError::Native(ref e) => Some(e),
            InvokeError::UnknownOperation(_) => None,
        }
    }
}

impl From<CapabilityUnimplemented> for InvokeError {
    fn from(e: CapabilityUnimplemented) -> InvokeError {
        InvokeError::Unimplemented(e)
    }
}

impl From<NativeError> for InvokeError {
    fn from(e: NativeError) -> InvokeError {
        InvokeError::Native(e)
    }
}

impl From<CapabilityUnimplemented> for io::Error {
    fn from(e: CapabilityUnimplemented) -> io::Error {
        io::Error::new(io::ErrorKind::Other, e)
    }
}

impl From<InvokeError> for io::Error {
    fn from(e: InvokeError) -> io::Error {
        let kind = match e {
            InvokeError::UnknownOperation(_) => io::ErrorKind::InvalidInput,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, e)
    }
}
