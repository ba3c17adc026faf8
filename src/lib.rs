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

//! Capability resolution and version handling for OpenGL bindings.
//!
//! Bindings generated from the API registry expose thousands of thin wrappers. Most of those
//! wrappers have the same problem: the operation they expose can live under several symbol names
//! (`glGenFramebuffers`, `glGenFramebuffersEXT`, ...), and which of those exist depends on the
//! driver and the context that got created. This crate is the part that decides.
//!
//! * [`version`] models API versions. Versions are tagged with the API family they belong to, so
//!   `gl 3.0` and `gles2 3.0` can't be ordered against each other by accident.
//! * [`operation`] declares logical operations and their candidate symbols, highest priority
//!   first.
//! * [`resolve`] picks the first live candidate for each operation the first time it's used,
//!   caches the decision, and forwards calls to it.
//! * [`feature`] describes which versions and extensions introduce or remove an operation, so
//!   callers can tell whether an operation should be attempted at all.
//! * [`hooks`] runs error checks and call logging after each forwarded call.
//!
//! Everything is tied together by [`ContextState`], which owns the resolution cache for one native
//! context. Create one per context; caches are never shared.
//!
//! [`version`]: ./version/index.html
//! [`operation`]: ./operation/index.html
//! [`resolve`]: ./resolve/index.html
//! [`feature`]: ./feature/index.html
//! [`hooks`]: ./hooks/index.html
//! [`ContextState`]: ./struct.ContextState.html

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

#[macro_use]
mod macros;

pub mod feature;
pub mod hooks;
pub mod operation;
pub mod resolve;
pub mod version;

use crate::{
    feature::ActiveFeatures,
    hooks::{CallLog, ErrorCheck},
    operation::{OpId, OperationTable},
    resolve::{CapabilityResolver, SymbolLoader},
};

use std::{ffi::c_void, rc::Rc};

pub use crate::{
    resolve::Fallbacks,
    version::{Api, Version},
};

/// Everything tied to a single native context: its resolution cache, its hooks, and what it
/// supports.
pub struct ContextState {
    resolver: CapabilityResolver,
    features: Option<ActiveFeatures>,
}

/// Configures a [`ContextState`].
///
/// [`ContextState`]: ./struct.ContextState.html
pub struct ContextBuilder {
    table: Rc<OperationTable>,
    fallbacks: Fallbacks,
    error_check: Option<Box<dyn ErrorCheck>>,
    call_log: Option<Box<dyn CallLog>>,
    features: Option<ActiveFeatures>,
}

impl ContextState {
    /// Create a context state with the default configuration.
    ///
    /// `load_fn` should be the context's `get_proc_address`. It must stay valid for as long as the
    /// returned state is in use.
    pub fn new<F>(table: Rc<OperationTable>, load_fn: F) -> Rc<ContextState>
    where
        F: 'static + Fn(&str) -> *const c_void,
    {
        ContextState::builder(table).build(load_fn)
    }

    pub fn builder(table: Rc<OperationTable>) -> ContextBuilder {
        ContextBuilder {
            table,
            fallbacks: Fallbacks::All,
            error_check: None,
            call_log: Some(Box::new(hooks::LogCalls)),
            features: None,
        }
    }

    #[inline]
    pub fn resolver(&self) -> &CapabilityResolver {
        &self.resolver
    }

    #[inline]
    pub fn features(&self) -> Option<&ActiveFeatures> {
        self.features.as_ref()
    }

    /// Whether `op` can be used in this context.
    ///
    /// If the context was built with [`ActiveFeatures`] and `op` carries a [`Requirement`], the
    /// requirement has to hold first. The operation then has to resolve to a live symbol, which
    /// probes its candidates if that hasn't happened yet.
    ///
    /// [`ActiveFeatures`]: ./feature/struct.ActiveFeatures.html
    /// [`Requirement`]: ./feature/struct.Requirement.html
    pub fn supports(&self, op: OpId) -> bool {
        let required = self.resolver.table().operation(op).requirement();
        let permitted = match (&self.features, required) {
            (&Some(ref features), Some(requirement)) => features.satisfies(requirement),
            _ => true,
        };

        permitted && self.resolver.is_available(op)
    }
}

impl ContextBuilder {
    pub fn fallbacks(mut self, fallbacks: Fallbacks) -> ContextBuilder {
        self.fallbacks = fallbacks;
        self
    }

    /// Run `error_check` after every successful call.
    pub fn error_check<E: 'static + ErrorCheck>(mut self, error_check: E) -> ContextBuilder {
        self.error_check = Some(Box::new(error_check));
        self
    }

    /// Replace the default [`LogCalls`] call log.
    ///
    /// [`LogCalls`]: ./hooks/struct.LogCalls.html
    pub fn call_log<L: 'static + CallLog>(mut self, call_log: L) -> ContextBuilder {
        self.call_log = Some(Box::new(call_log));
        self
    }

    /// Don't log calls at all.
    pub fn no_call_log(mut self) -> ContextBuilder {
        self.call_log = None;
        self
    }

    pub fn active_features(mut self, features: ActiveFeatures) -> ContextBuilder {
        self.features = Some(features);
        self
    }

    pub fn build<F>(self, load_fn: F) -> Rc<ContextState>
    where
        F: 'static + Fn(&str) -> *const c_void,
    {
        self.build_with_loader(load_fn)
    }

    pub fn build_with_loader<L: 'static + SymbolLoader>(self, loader: L) -> Rc<ContextState> {
        let mut resolver = CapabilityResolver::new(self.table, loader);
        resolver.set_fallbacks(self.fallbacks);
        resolver.set_error_check(self.error_check);
        resolver.set_call_log(self.call_log);

        Rc::new(ContextState {
            resolver,
            features: self.features,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        feature::{Extensions, Profile, Requirement},
        operation::Operation,
    };
    use std::ptr;

    fn table() -> Rc<OperationTable> {
        Rc::new(
            OperationTable::builder()
                .operation(
                    Operation::new("GenVertexArrays", vec!["glGenVertexArrays", "glGenVertexArraysOES"])
                        .requires(
                            Requirement::from_tokens(vec![
                                "GL_VERSION_3_0",
                                "GL_ES_VERSION_3_0",
                                "GL_OES_vertex_array_object",
                            ])
                            .unwrap(),
                        ),
                )
                .operation(Operation::new("Clear", vec!["glClear"]))
                .build()
                .unwrap(),
        )
    }

    fn everything(_: &str) -> *const c_void {
        0x10 as *const c_void
    }

    #[test]
    fn supports_checks_requirement_then_symbol() {
        let table = table();
        let vao = table.id("GenVertexArrays").unwrap();
        let clear = table.id("Clear").unwrap();

        let es2 = Version::parse_dotted("OpenGL ES 2.0", None).unwrap();
        let state = ContextState::builder(table.clone())
            .active_features(ActiveFeatures::new(es2.clone(), Profile::CORE, Extensions::default()))
            .build(everything);
        assert!(!state.supports(vao));
        assert!(state.supports(clear));
        // The requirement failing means nothing got probed.
        assert_eq!(resolve::Resolution::Unknown, state.resolver().cached(vao));

        let state = ContextState::builder(table.clone())
            .active_features(ActiveFeatures::new(
                es2,
                Profile::CORE,
                Extensions::parse("GL_OES_vertex_array_object"),
            ))
            .build(everything);
        assert!(state.supports(vao));
        assert_eq!(Some("glGenVertexArrays"), state.resolver().resolved_symbol(vao));
    }

    #[test]
    fn supports_without_features_only_resolves() {
        let table = table();
        let state = ContextState::new(table.clone(), |_: &str| ptr::null());
        assert!(state.features().is_none());
        assert!(!state.supports(table.id("Clear").unwrap()));
    }

    #[test]
    fn builder_applies_fallbacks() {
        let table = table();
        let vao = table.id("GenVertexArrays").unwrap();
        let only_oes = |s: &str| -> *const c_void {
            match s {
                "glGenVertexArraysOES" => 0x10 as *const c_void,
                _ => ptr::null(),
            }
        };

        let state = ContextState::builder(table.clone())
            .fallbacks(Fallbacks::None)
            .build(only_oes);
        assert_eq!(Fallbacks::None, state.resolver().fallbacks());
        assert!(!state.supports(vao));

        let state = ContextState::new(table.clone(), only_oes);
        assert_eq!(Some("glGenVertexArraysOES"), state.resolver().resolved_symbol(vao));
    }
}
