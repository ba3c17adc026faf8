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

//! Hooks run after every successful forwarded call.
//!
//! Two injection points exist:
//! * [`ErrorCheck`], which surfaces errors the native layer queued up during the call. It runs
//!   exactly once after every successful forward, and never when the operation was unavailable.
//!   Its error is returned to the caller.
//! * [`CallLog`], which records the symbol that was called along with its arguments and result.
//!   It can't affect the call: if it fails, the failure gets reported through `log::warn!` and
//!   is otherwise dropped.
//!
//! [`ErrorCheck`]: ./trait.ErrorCheck.html
//! [`CallLog`]: ./trait.CallLog.html

use crate::resolve::{
    error::{CapabilityUnimplemented, NativeError},
    SymbolLoader,
};

use log::trace;
use std::{
    error::Error,
    fmt::{self, Debug, Display},
    mem,
};

/// Maximum number of codes drained from `glGetError` after a single call. Lost contexts can
/// return errors forever.
const MAX_QUEUED_ERRORS: usize = 32;

pub trait ErrorCheck {
    fn check_errors(&self) -> Result<(), NativeError>;
}

pub trait CallLog {
    /// Record a call. `result` is `None` for operations that don't return anything.
    fn log_call(
        &self,
        symbol: &str,
        args: &dyn Debug,
        result: Option<&dyn Debug>,
    ) -> Result<(), Box<dyn Error>>;
}

/// Logs every call through the `log` crate, at `trace` level under the `gullery_caps::calls`
/// target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCalls;

/// Checks `glGetError` after each call.
#[derive(Clone, Copy)]
pub struct GetErrorCheck {
    get_error: extern "system" fn() -> u32,
}

/// A `GLenum` error code returned by `glGetError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlErrorCode(pub u32);

/// Every error code `glGetError` returned after a call, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlErrors(pub Vec<GlErrorCode>);

impl<F> ErrorCheck for F
where
    F: Fn() -> Result<(), NativeError>,
{
    #[inline]
    fn check_errors(&self) -> Result<(), NativeError> {
        self()
    }
}

impl CallLog for LogCalls {
    fn log_call(
        &self,
        symbol: &str,
        args: &dyn Debug,
        result: Option<&dyn Debug>,
    ) -> Result<(), Box<dyn Error>> {
        match result {
            Some(result) => trace!(target: "gullery_caps::calls", "{}{:?} -> {:?}", symbol, args, result),
            None => trace!(target: "gullery_caps::calls", "{}{:?}", symbol, args),
        }
        Ok(())
    }
}

impl GetErrorCheck {
    /// Load `glGetError` from `loader`.
    pub fn load<L: SymbolLoader + ?Sized>(loader: &L) -> Result<GetErrorCheck, CapabilityUnimplemented> {
        let proc = loader
            .try_load("glGetError")
            .ok_or_else(|| CapabilityUnimplemented {
                operation: "GetError".to_string(),
            })?;

        Ok(GetErrorCheck {
            get_error: unsafe { mem::transmute(proc.as_ptr()) },
        })
    }
}

impl ErrorCheck for GetErrorCheck {
    fn check_errors(&self) -> Result<(), NativeError> {
        let mut errors = Vec::new();
        while errors.len() < MAX_QUEUED_ERRORS {
            match (self.get_error)() {
                GlErrorCode::NO_ERROR => break,
                code => errors.push(GlErrorCode(code)),
            }
        }

        match errors.is_empty() {
            true => Ok(()),
            false => Err(NativeError::new(GlErrors(errors))),
        }
    }
}

impl Debug for GetErrorCheck {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.debug_struct("GetErrorCheck")
            .field("get_error", &(self.get_error as *const ()))
            .finish()
    }
}

impl GlErrorCode {
    pub const NO_ERROR: u32 = 0;
    pub const INVALID_ENUM: u32 = 0x0500;
    pub const INVALID_VALUE: u32 = 0x0501;
    pub const INVALID_OPERATION: u32 = 0x0502;
    pub const STACK_OVERFLOW: u32 = 0x0503;
    pub const STACK_UNDERFLOW: u32 = 0x0504;
    pub const OUT_OF_MEMORY: u32 = 0x0505;
    pub const INVALID_FRAMEBUFFER_OPERATION: u32 = 0x0506;
    pub const CONTEXT_LOST: u32 = 0x0507;

    pub fn name(self) -> Option<&'static str> {
        Some(match self.0 {
            GlErrorCode::INVALID_ENUM => "GL_INVALID_ENUM",
            GlErrorCode::INVALID_VALUE => "GL_INVALID_VALUE",
            GlErrorCode::INVALID_OPERATION => "GL_INVALID_OPERATION",
            GlErrorCode::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
            GlErrorCode::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
            GlErrorCode::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
            GlErrorCode::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
            GlErrorCode::CONTEXT_LOST => "GL_CONTEXT_LOST",
            _ => return None,
        })
    }
}

impl Display for GlErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{:#06x}", self.0),
        }
    }
}

impl Display for GlErrors {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let mut errs = self.0.iter();
        if let Some(e) = errs.next() {
            write!(f, "{}", e)?;
        }
        for e in errs {
            write!(f, ", {}", e)?;
        }
        Ok(())
    }
}

impl Error for GlErrors {}
