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

//! Version and extension conditions that gate operations.
//!
//! This is the data the layer above the resolver uses to decide whether an operation should be
//! attempted at all for the active context. It never probes symbols itself.

use crate::version::{error::VersionError, Version};

use bitflags::bitflags;
use std::{collections::HashSet, iter::FromIterator};

bitflags! {
    /// Context profiles. Removals only apply to the profiles they name.
    pub struct Profile: u8 {
        const CORE = 0b01;
        const COMPATIBILITY = 0b10;
    }
}

/// Conditions under which an operation exists.
///
/// Satisfied when the active version is at least one of the `introduced` versions *of the same
/// family*, or when any of the listed extensions is present, and the operation hasn't been
/// removed from the active version and profile. A requirement with no versions and no extensions
/// is satisfied by every context that hasn't removed it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Requirement {
    introduced: Vec<Version>,
    extensions: Vec<String>,
    removed: Vec<(Version, Profile)>,
}

/// The set of extension names a context advertises.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extensions(HashSet<String>);

/// The version, profile and extensions of a live context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFeatures {
    version: Version,
    profile: Profile,
    extensions: Extensions,
}

impl Requirement {
    pub fn new() -> Requirement {
        Requirement::default()
    }

    /// Build a requirement out of registry feature names.
    ///
    /// Version features (`GL_VERSION_3_0`, `GL_ES_VERSION_3_0`, ...) become introducing versions;
    /// any other name is taken to be an extension.
    pub fn from_tokens<'a, I>(tokens: I) -> Result<Requirement, VersionError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut requirement = Requirement::new();
        for token in tokens {
            match Version::parse_feature_token(token) {
                Ok(version) => requirement.introduced.push(version),
                Err(VersionError::InvalidFormat(_)) => requirement.extensions.push(token.to_string()),
                Err(e) => return Err(e),
            }
        }
        Ok(requirement)
    }

    pub fn introduced_in(mut self, version: Version) -> Requirement {
        self.introduced.push(version);
        self
    }

    pub fn extension<S: Into<String>>(mut self, name: S) -> Requirement {
        self.extensions.push(name.into());
        self
    }

    /// Mark the operation as removed from `version` onward, in the given profiles.
    ///
    /// Can be called more than once; any matching removal applies.
    pub fn removed_in(mut self, version: Version, profiles: Profile) -> Requirement {
        self.removed.push((version, profiles));
        self
    }

    #[inline]
    pub fn introduced(&self) -> &[Version] {
        &self.introduced
    }

    #[inline]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

impl Extensions {
    /// Parse the space-separated list returned by `glGetString(GL_EXTENSIONS)`.
    pub fn parse(gl_extensions: &str) -> Extensions {
        gl_extensions.split_whitespace().map(String::from).collect()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for Extensions {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Extensions {
        Extensions(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for Extensions {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Extensions {
        Extensions(iter.into_iter().map(String::from).collect())
    }
}

impl ActiveFeatures {
    pub fn new(version: Version, profile: Profile, extensions: Extensions) -> ActiveFeatures {
        ActiveFeatures {
            version,
            profile,
            extensions,
        }
    }

    #[inline]
    pub fn version(&self) -> &Version {
        &self.version
    }

    #[inline]
    pub fn profile(&self) -> Profile {
        self.profile
    }

    #[inline]
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Whether `requirement` holds in this context.
    ///
    /// Versions from other families than the active one are skipped, never compared.
    pub fn satisfies(&self, requirement: &Requirement) -> bool {
        let active = &self.version;
        let same_family = |v: &&Version| v.api() == active.api();

        let removed = requirement
            .removed
            .iter()
            .filter(|&&(ref v, _)| v.api() == active.api())
            .any(|&(ref v, profiles)| self.profile.intersects(profiles) && active >= v);
        if removed {
            return false;
        }

        if requirement.introduced.is_empty() && requirement.extensions.is_empty() {
            return true;
        }

        requirement
            .introduced
            .iter()
            .filter(same_family)
            .any(|v| active >= v)
            || requirement
                .extensions
                .iter()
                .any(|e| self.extensions.contains(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Api;

    fn gl(major: i32, minor: i32) -> Version {
        Version::with_api(major, minor, Api::GL).unwrap()
    }

    fn features(version: Version, profile: Profile, extensions: &str) -> ActiveFeatures {
        ActiveFeatures::new(version, profile, Extensions::parse(extensions))
    }

    #[test]
    fn tokens_split_into_versions_and_extensions() {
        let req = Requirement::from_tokens(vec![
            "GL_VERSION_3_0",
            "GL_ES_VERSION_3_0",
            "GL_ARB_framebuffer_object",
        ])
        .unwrap();

        assert_eq!(
            &[gl(3, 0), Version::with_api(3, 0, Api::GLES2).unwrap()][..],
            req.introduced()
        );
        assert_eq!(&["GL_ARB_framebuffer_object".to_string()][..], req.extensions());

        match Requirement::from_tokens(vec!["GL_VERSION_0_9"]) {
            Err(VersionError::InvalidArgument(_)) => (),
            r => panic!("unexpected {:?}", r),
        }
    }

    #[test]
    fn out_of_range_version_token_is_not_an_extension() {
        match Requirement::from_tokens(vec!["GL_KHR_debug", "GL_VERSION_99999999999_0"]) {
            Err(VersionError::InvalidArgument(_)) => (),
            r => panic!("unexpected {:?}", r),
        }
    }

    #[test]
    fn removals_accumulate() {
        let req = Requirement::new()
            .introduced_in(gl(1, 0))
            .removed_in(gl(3, 1), Profile::CORE)
            .removed_in(gl(4, 0), Profile::COMPATIBILITY);

        assert!(!features(gl(3, 1), Profile::CORE, "").satisfies(&req));
        assert!(features(gl(3, 3), Profile::COMPATIBILITY, "").satisfies(&req));
        assert!(!features(gl(4, 0), Profile::COMPATIBILITY, "").satisfies(&req));
    }

    #[test]
    fn version_or_extension() {
        let req = Requirement::from_tokens(vec![
            "GL_VERSION_3_0",
            "GL_ES_VERSION_3_0",
            "GL_ARB_framebuffer_object",
        ])
        .unwrap();

        assert!(features(gl(3, 3), Profile::CORE, "").satisfies(&req));
        assert!(!features(gl(2, 1), Profile::COMPATIBILITY, "").satisfies(&req));
        assert!(features(gl(2, 1), Profile::COMPATIBILITY, "GL_ARB_framebuffer_object GL_EXT_bgra")
            .satisfies(&req));

        let es2 = Version::parse_dotted("OpenGL ES 2.0", None).unwrap();
        assert!(!features(es2, Profile::CORE, "").satisfies(&req));
        let es3 = Version::parse_dotted("OpenGL ES 3.2", None).unwrap();
        assert!(features(es3, Profile::CORE, "").satisfies(&req));
    }

    #[test]
    fn removal_is_profile_specific() {
        let req = Requirement::new()
            .introduced_in(gl(1, 0))
            .removed_in(gl(3, 2), Profile::CORE);

        assert!(features(gl(3, 1), Profile::CORE, "").satisfies(&req));
        assert!(!features(gl(3, 2), Profile::CORE, "").satisfies(&req));
        assert!(!features(gl(4, 6), Profile::CORE, "").satisfies(&req));
        assert!(features(gl(4, 6), Profile::COMPATIBILITY, "").satisfies(&req));
    }

    #[test]
    fn other_families_are_ignored() {
        let req = Requirement::new().removed_in(gl(3, 2), Profile::all());
        let es = Version::with_api(3, 2, Api::GLES2).unwrap();
        assert!(features(es, Profile::CORE, "").satisfies(&req));
        assert!(!features(gl(3, 2), Profile::COMPATIBILITY, "").satisfies(&req));
    }

    #[test]
    fn extensions_parse() {
        let ext = Extensions::parse("  GL_EXT_bgra\tGL_KHR_debug \n GL_EXT_bgra ");
        assert_eq!(2, ext.len());
        assert!(ext.contains("GL_KHR_debug"));
        assert!(!ext.contains("GL_KHR"));
        assert!(Extensions::parse("").is_empty());
    }
}
