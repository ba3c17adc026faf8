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

//! Resolve logical operations to live native symbols and forward calls to them.
//!
//! A [`CapabilityResolver`] holds one resolution slot per operation in its [`OperationTable`].
//! The first time an operation is used, its candidates are probed through the [`SymbolLoader`] in
//! declaration order and the first one present gets cached. Every call after that goes straight
//! to the cached symbol. If no candidate is present, that's cached too, and every call fails with
//! [`CapabilityUnimplemented`] without touching the native layer.
//!
//! Decisions are never revisited on their own. If the native context changes underneath the
//! resolver, call [`invalidate`] or [`invalidate_all`] to re-probe on next use.
//!
//! Resolvers aren't `Send` or `Sync`: a resolver belongs to one native context, and native
//! contexts belong to one thread.
//!
//! [`CapabilityResolver`]: ./struct.CapabilityResolver.html
//! [`OperationTable`]: ../operation/struct.OperationTable.html
//! [`SymbolLoader`]: ./trait.SymbolLoader.html
//! [`CapabilityUnimplemented`]: ./error/struct.CapabilityUnimplemented.html
//! [`invalidate`]: ./struct.CapabilityResolver.html#method.invalidate
//! [`invalidate_all`]: ./struct.CapabilityResolver.html#method.invalidate_all
pub mod error;
mod raw;

use self::error::{CapabilityUnimplemented, InvokeError};
use crate::{
    hooks::{CallLog, ErrorCheck, LogCalls},
    operation::{OpId, OperationTable},
};

use log::{debug, warn};
use std::{cell::Cell, fmt::Debug, marker::PhantomData, rc::Rc};

pub use self::raw::{Fallbacks, Proc, Resolution, SymbolLoader};

pub struct CapabilityResolver {
    table: Rc<OperationTable>,
    loader: Box<dyn SymbolLoader>,
    fallbacks: Fallbacks,
    cache: Vec<Cell<Resolution>>,
    error_check: Option<Box<dyn ErrorCheck>>,
    call_log: Option<Box<dyn CallLog>>,
    _sendsync_optout: PhantomData<*const ()>,
}

impl CapabilityResolver {
    /// Create a resolver for `table` that loads symbols through `loader`.
    ///
    /// All fallbacks are probed, calls are logged through [`LogCalls`], and no error check runs.
    ///
    /// [`LogCalls`]: ../hooks/struct.LogCalls.html
    pub fn new<L: 'static + SymbolLoader>(table: Rc<OperationTable>, loader: L) -> CapabilityResolver {
        let cache = (0..table.len()).map(|_| Cell::new(Resolution::Unknown)).collect();
        CapabilityResolver {
            table,
            loader: Box::new(loader),
            fallbacks: Fallbacks::All,
            cache,
            error_check: None,
            call_log: Some(Box::new(LogCalls)),
            _sendsync_optout: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn set_fallbacks(&mut self, fallbacks: Fallbacks) {
        self.fallbacks = fallbacks;
    }

    #[inline]
    pub(crate) fn set_error_check(&mut self, error_check: Option<Box<dyn ErrorCheck>>) {
        self.error_check = error_check;
    }

    #[inline]
    pub(crate) fn set_call_log(&mut self, call_log: Option<Box<dyn CallLog>>) {
        self.call_log = call_log;
    }

    #[inline]
    pub fn table(&self) -> &Rc<OperationTable> {
        &self.table
    }

    #[inline]
    pub fn fallbacks(&self) -> Fallbacks {
        self.fallbacks
    }

    /// Resolve `op`, probing its candidates if that hasn't been done yet.
    ///
    /// Never returns `Resolution::Unknown`.
    pub fn resolve(&self, op: OpId) -> Resolution {
        let slot = &self.cache[op.0];
        match slot.get() {
            Resolution::Unknown => {
                let operation = self.table.operation(op);
                let resolution = raw::probe(&*self.loader, operation.candidates(), self.fallbacks);
                match resolution {
                    Resolution::Resolved { index, .. } => debug!(
                        "resolved `{}` to `{}`",
                        operation.name(),
                        operation.candidates()[index]
                    ),
                    _ => debug!("`{}` is unavailable", operation.name()),
                }
                slot.set(resolution);
                resolution
            }
            resolution => resolution,
        }
    }

    /// The cached resolution for `op`, without probing.
    #[inline]
    pub fn cached(&self, op: OpId) -> Resolution {
        self.cache[op.0].get()
    }

    /// Whether any candidate for `op` is live. Resolves `op` if needed.
    #[inline]
    pub fn is_available(&self, op: OpId) -> bool {
        self.resolve(op).is_resolved()
    }

    /// The name of the symbol `op` resolved to. Resolves `op` if needed.
    pub fn resolved_symbol(&self, op: OpId) -> Option<&str> {
        match self.resolve(op) {
            Resolution::Resolved { index, .. } => {
                let symbol: &str = &self.table.operation(op).candidates()[index];
                Some(symbol)
            }
            _ => None,
        }
    }

    /// Forget the decision for `op`. Its candidates get probed again on next use.
    pub fn invalidate(&self, op: OpId) {
        self.cache[op.0].set(Resolution::Unknown);
    }

    /// Forget every decision.
    pub fn invalidate_all(&self) {
        for slot in &self.cache {
            slot.set(Resolution::Unknown);
        }
    }

    /// Call `op`.
    ///
    /// `call` receives the live entry point and `args`, and is responsible for transmuting the
    /// pointer to the right function type and making the native call. It's only run if `op`
    /// resolved; otherwise `InvokeError::Unimplemented` is returned and nothing else happens.
    ///
    /// After `call` returns, the call gets logged and the error check runs.
    ///
    /// ```
    /// # #[macro_use] extern crate gullery_caps;
    /// # use gullery_caps::resolve::CapabilityResolver;
    /// # use std::{ffi::c_void, mem, rc::Rc};
    /// extern "system" fn is_enabled(cap: u32) -> u8 {
    ///     (cap == 0x0B71) as u8
    /// }
    ///
    /// # fn main() {
    /// let table = Rc::new(operations!["IsEnabled" => ["glIsEnabled"]].build().unwrap());
    /// let resolver = CapabilityResolver::new(table.clone(), |_: &str| is_enabled as *const c_void);
    /// let op = table.id("IsEnabled").unwrap();
    ///
    /// let enabled = resolver.invoke(op, (0x0B71,), |proc, (cap,)| unsafe {
    ///     mem::transmute::<_, extern "system" fn(u32) -> u8>(proc.as_ptr())(cap)
    /// });
    /// assert_eq!(1, enabled.unwrap());
    /// # }
    /// ```
    pub fn invoke<A, R, F>(&self, op: OpId, args: A, call: F) -> Result<R, InvokeError>
    where
        A: Copy + Debug,
        R: Debug,
        F: FnOnce(Proc, A) -> R,
    {
        let (symbol, proc) = self.live(op)?;
        let result = call(proc, args);
        self.log_call(symbol, &args, Some(&result as &dyn Debug));
        self.check_errors()?;
        Ok(result)
    }

    /// Call an `op` that doesn't return anything. Same as [`invoke`], but the call log doesn't
    /// get a result.
    ///
    /// [`invoke`]: #method.invoke
    pub fn invoke_void<A, F>(&self, op: OpId, args: A, call: F) -> Result<(), InvokeError>
    where
        A: Copy + Debug,
        F: FnOnce(Proc, A),
    {
        let (symbol, proc) = self.live(op)?;
        call(proc, args);
        self.log_call(symbol, &args, None);
        self.check_errors()?;
        Ok(())
    }

    /// Look `name` up in the operation table and [`invoke`] it.
    ///
    /// [`invoke`]: #method.invoke
    pub fn invoke_by_name<A, R, F>(&self, name: &str, args: A, call: F) -> Result<R, InvokeError>
    where
        A: Copy + Debug,
        R: Debug,
        F: FnOnce(Proc, A) -> R,
    {
        let op = self
            .table
            .id(name)
            .ok_or_else(|| InvokeError::UnknownOperation(name.to_string()))?;
        self.invoke(op, args, call)
    }

    fn live(&self, op: OpId) -> Result<(&str, Proc), CapabilityUnimplemented> {
        let operation = self.table.operation(op);
        match self.resolve(op) {
            Resolution::Resolved { index, proc } => {
                let symbol: &str = &operation.candidates()[index];
                Ok((symbol, proc))
            }
            _ => Err(CapabilityUnimplemented {
                operation: operation.name().to_string(),
            }),
        }
    }

    fn log_call(&self, symbol: &str, args: &dyn Debug, result: Option<&dyn Debug>) {
        if let Some(ref call_log) = self.call_log {
            if let Err(e) = call_log.log_call(symbol, args, result) {
                warn!("failed to log call to `{}`: {}", symbol, e);
            }
        }
    }

    fn check_errors(&self) -> Result<(), InvokeError> {
        match self.error_check {
            Some(ref error_check) => error_check.check_errors().map_err(InvokeError::Native),
            None => Ok(()),
        }
    }
}
