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

use std::{borrow::Cow, ffi::c_void, ptr::NonNull};

use log::trace;

/// A native entry point that the loader reported as present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Proc(NonNull<c_void>);

/// Looks up native symbols by name.
///
/// Implementations must give a stable answer for the same name for as long as the native context
/// they load from is alive, and must not have side effects the resolver could observe.
///
/// Implemented for every `Fn(&str) -> *const c_void`, which is the shape taken by
/// `get_proc_address` on every windowing library; a null pointer means "not found".
pub trait SymbolLoader {
    fn try_load(&self, symbol: &str) -> Option<Proc>;
}

/// Controls whether the aliases after the first candidate get probed.
///
/// Mirrors `gl_generator::Fallbacks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallbacks {
    /// Probe every candidate, in declaration order.
    All,
    /// Only probe the first (core) candidate.
    None,
}

/// The cached outcome of probing an operation's candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Not probed yet.
    Unknown,
    /// The candidate at `index` is live.
    Resolved { index: usize, proc: Proc },
    /// None of the candidates are present. Sticks until explicitly invalidated.
    Unavailable,
}

impl Proc {
    /// Wrap a raw symbol address. Returns `None` if `ptr` is null.
    #[inline]
    pub fn new(ptr: *const c_void) -> Option<Proc> {
        NonNull::new(ptr as *mut c_void).map(Proc)
    }

    /// The raw address. Transmute it to the matching `extern "system" fn` type to call it.
    #[inline]
    pub fn as_ptr(self) -> *const c_void {
        self.0.as_ptr() as *const c_void
    }
}

impl<F> SymbolLoader for F
where
    F: Fn(&str) -> *const c_void,
{
    #[inline]
    fn try_load(&self, symbol: &str) -> Option<Proc> {
        Proc::new(self(symbol))
    }
}

impl Resolution {
    #[inline]
    pub fn is_resolved(&self) -> bool {
        match *self {
            Resolution::Resolved { .. } => true,
            _ => false,
        }
    }
}

/// Probe `candidates` in order and return the first one the loader has. Candidates after the
/// first hit are never touched.
pub(crate) fn probe(
    loader: &dyn SymbolLoader,
    candidates: &[Cow<'static, str>],
    fallbacks: Fallbacks,
) -> Resolution {
    let probed = match fallbacks {
        Fallbacks::All => candidates,
        Fallbacks::None => &candidates[..candidates.len().min(1)],
    };

    for (index, symbol) in probed.iter().enumerate() {
        match loader.try_load(symbol) {
            Some(proc) => {
                trace!("probed `{}`: found", symbol);
                return Resolution::Resolved { index, proc };
            }
            None => trace!("probed `{}`: missing", symbol),
        }
    }

    Resolution::Unavailable
}
