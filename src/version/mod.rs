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

//! API families and versions.
//!
//! A [`Version`] is always tagged with the [`Api`] family it belongs to. Versions of the same
//! family can be ordered; versions of different families can be compared for equality, but
//! *ordering* them is a bug in the calling code and panics (use [`Version::compare_to`] to get
//! the failure as a value instead).
//!
//! Versions usually come from one of two places:
//! * The string returned by `glGetString(GL_VERSION)` or `GL_SHADING_LANGUAGE_VERSION`, which
//!   gets parsed by [`Version::parse_dotted`].
//! * A feature name from the API registry, such as `GL_VERSION_3_3` or `GL_ES_VERSION_3_1`,
//!   which gets parsed by [`Version::parse_feature_token`].
//!
//! [`Version`]: ./struct.Version.html
//! [`Api`]: ./struct.Api.html
//! [`Version::compare_to`]: ./struct.Version.html#method.compare_to
//! [`Version::parse_dotted`]: ./struct.Version.html#method.parse_dotted
//! [`Version::parse_feature_token`]: ./struct.Version.html#method.parse_feature_token
pub mod error;

use self::error::VersionError;

use derive_more::Display;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use std::{
    borrow::Cow,
    cmp::Ordering,
    fmt,
    str::FromStr,
};

/// Registry feature name of OpenGL ES 1.0 (common profile). Doesn't follow the naming scheme of
/// every other feature, so it's matched exactly.
pub const GLES1_FEATURE_TOKEN: &str = "GL_VERSION_ES_CM_1_0";

lazy_static! {
    static ref DOTTED: Regex = Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("bad dotted regex");
    static ref ES_MARKER: Regex =
        Regex::new(r"(?i)\bES(?:[0-9\s-]|$)").expect("bad ES marker regex");
    static ref SC_TOKEN: Regex =
        Regex::new(r"^[A-Za-z0-9]+_SC_VERSION_(\d+)_(\d+)$").expect("bad SC token regex");
    static ref VERSION_TOKEN: Regex =
        Regex::new(r"^[A-Za-z0-9]+?(_ES)?_VERSION_(\d+)_(\d+)$").expect("bad token regex");
}

/// A named group of mutually comparable versions.
///
/// The name is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display(fmt = "{}", _0)]
pub struct Api(Cow<'static, str>);

impl Api {
    /// Desktop OpenGL.
    pub const GL: Api = Api(Cow::Borrowed("gl"));
    /// OpenGL ES 1.x.
    pub const GLES1: Api = Api(Cow::Borrowed("gles1"));
    /// OpenGL ES 2.0 and later.
    pub const GLES2: Api = Api(Cow::Borrowed("gles2"));
    /// OpenGL SC 2.0 (safety critical).
    pub const GLSC2: Api = Api(Cow::Borrowed("glsc2"));
    /// X11 window-system bindings.
    pub const GLX: Api = Api(Cow::Borrowed("glx"));
    /// Windows window-system bindings.
    pub const WGL: Api = Api(Cow::Borrowed("wgl"));
    /// EGL.
    pub const EGL: Api = Api(Cow::Borrowed("egl"));
    /// The shading language, versioned independently of the API that compiles it.
    pub const GLSL: Api = Api(Cow::Borrowed("glsl"));

    /// Create a custom API family. Fails if `name` is empty.
    pub fn new<S: Into<Cow<'static, str>>>(name: S) -> Result<Api, VersionError> {
        let name = name.into();
        if name.is_empty() {
            return Err(VersionError::InvalidArgument(
                "API family name is empty".to_string(),
            ));
        }
        Ok(Api(name))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is one of the OpenGL ES families.
    #[inline]
    pub fn is_embedded(&self) -> bool {
        *self == Api::GLES1 || *self == Api::GLES2
    }
}

impl AsRef<str> for Api {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An API version: `api major.minor.revision`.
///
/// Immutable once built. Equality compares all four fields and never fails; ordering is only
/// defined between versions of the same [`Api`] family, and the comparison operators panic
/// otherwise.
///
/// [`Api`]: ./struct.Api.html
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    api: Api,
    major: u32,
    minor: u32,
    revision: u32,
}

impl Version {
    /// Build a version from its components.
    ///
    /// Components are taken as `GLint`s, since that's what `glGetIntegerv(GL_MAJOR_VERSION)` hands
    /// back. Fails with `InvalidArgument` if `major` isn't positive or if `minor` or `revision`
    /// are negative.
    pub fn new(major: i32, minor: i32, revision: i32, api: Api) -> Result<Version, VersionError> {
        if major <= 0 {
            return Err(VersionError::InvalidArgument(format!(
                "major version must be positive, got {}",
                major
            )));
        }
        if minor < 0 {
            return Err(VersionError::InvalidArgument(format!(
                "minor version must not be negative, got {}",
                minor
            )));
        }
        if revision < 0 {
            return Err(VersionError::InvalidArgument(format!(
                "revision must not be negative, got {}",
                revision
            )));
        }

        Ok(Version {
            api,
            major: major as u32,
            minor: minor as u32,
            revision: revision as u32,
        })
    }

    /// Build a version with a revision of `0`.
    #[inline]
    pub fn with_api(major: i32, minor: i32, api: Api) -> Result<Version, VersionError> {
        Version::new(major, minor, 0, api)
    }

    /// Parse the version out of a dotted version string, such as the one returned by
    /// `glGetString(GL_VERSION)`.
    ///
    /// The first `<major>.<minor>[.<revision>]` group found in `text` is used, so trailing (or
    /// leading) vendor text is fine: `"4.6.0 NVIDIA 535.54"` parses as `4.6.0`.
    ///
    /// If `text` contains a case-insensitive `ES` marker (followed by a digit, whitespace, a hyphen
    /// or the end of the text), the version gets tagged as
    /// `gles1` if its major version is `1` and as `gles2` otherwise. If it doesn't, the version
    /// gets tagged with `family_override` if one was passed, or `gl` if one wasn't.
    pub fn parse_dotted(text: &str, family_override: Option<&Api>) -> Result<Version, VersionError> {
        let caps = DOTTED
            .captures(text)
            .ok_or_else(|| VersionError::InvalidFormat(text.to_string()))?;

        let major = capture_num(&caps, 1, text)?;
        let minor = capture_num(&caps, 2, text)?;
        let revision = match caps.get(3) {
            Some(_) => capture_num(&caps, 3, text)?,
            None => 0,
        };

        let api = if ES_MARKER.is_match(text) {
            match major {
                1 => Api::GLES1,
                _ => Api::GLES2,
            }
        } else {
            family_override.cloned().unwrap_or(Api::GL)
        };

        Version::new(major, minor, revision, api)
    }

    /// Parse a feature name from the API registry.
    ///
    /// Recognized shapes:
    /// * `GL_VERSION_ES_CM_1_0`, matched literally, is `gles1 1.0`.
    /// * `<prefix>_SC_VERSION_<major>_<minor>` is a `glsc2` version.
    /// * `<prefix>_ES_VERSION_<major>_<minor>` is a `gles2` version.
    /// * `<prefix>_VERSION_<major>_<minor>` is a `gl` version.
    ///
    /// Anything else fails with `InvalidFormat`. See [`try_parse_feature_token`] for a version
    /// that treats unknown tokens as a normal outcome.
    ///
    /// [`try_parse_feature_token`]: #method.try_parse_feature_token
    pub fn parse_feature_token(token: &str) -> Result<Version, VersionError> {
        if token == GLES1_FEATURE_TOKEN {
            return Version::with_api(1, 0, Api::GLES1);
        }

        if let Some(caps) = SC_TOKEN.captures(token) {
            let major = capture_num(&caps, 1, token)?;
            let minor = capture_num(&caps, 2, token)?;
            return Version::with_api(major, minor, Api::GLSC2);
        }

        if let Some(caps) = VERSION_TOKEN.captures(token) {
            let api = match caps.get(1) {
                Some(_) => Api::GLES2,
                None => Api::GL,
            };
            let major = capture_num(&caps, 2, token)?;
            let minor = capture_num(&caps, 3, token)?;
            return Version::with_api(major, minor, api);
        }

        Err(VersionError::InvalidFormat(token.to_string()))
    }

    /// Like [`parse_feature_token`], but returns `None` for tokens that aren't version features
    /// (extension names, for instance).
    ///
    /// [`parse_feature_token`]: #method.parse_feature_token
    pub fn try_parse_feature_token(token: &str) -> Option<Version> {
        Version::parse_feature_token(token).ok()
    }

    #[inline]
    pub fn api(&self) -> &Api {
        &self.api
    }
    #[inline]
    pub fn major(&self) -> u32 {
        self.major
    }
    #[inline]
    pub fn minor(&self) -> u32 {
        self.minor
    }
    #[inline]
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Collapse the version into a single integer: `major * 100 + minor * 10 + revision`.
    ///
    /// Only meaningful for coarse comparisons within a family; `4.10` and `5.0` collide.
    #[inline]
    pub fn version_id(&self) -> u64 {
        u64::from(self.major) * 100 + u64::from(self.minor) * 10 + u64::from(self.revision)
    }

    /// Order two versions of the same family.
    ///
    /// Fails with `IncompatibleFamily` if the families differ.
    pub fn compare_to(&self, other: &Version) -> Result<Ordering, VersionError> {
        if self.api != other.api {
            return Err(VersionError::IncompatibleFamily {
                left: self.api.clone(),
                right: other.api.clone(),
            });
        }

        Ok((self.major, self.minor, self.revision).cmp(&(other.major, other.minor, other.revision)))
    }
}

/// Digits that matched the version shape but don't fit a `GLint` are out of range, not a format
/// mismatch.
fn capture_num(caps: &Captures, index: usize, text: &str) -> Result<i32, VersionError> {
    let digits = caps
        .get(index)
        .ok_or_else(|| VersionError::InvalidFormat(text.to_string()))?;
    digits.as_str().parse().map_err(|_| {
        VersionError::InvalidArgument(format!(
            "version component `{}` in `{}` is out of range",
            digits.as_str(),
            text
        ))
    })
}

impl PartialOrd for Version {
    /// # Panics
    /// Panics if the versions belong to different API families.
    fn partial_cmp(&self, other: &Version) -> Option<Ordering> {
        match self.compare_to(other) {
            Ok(ord) => Some(ord),
            Err(e) => panic!("{}", e),
        }
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Version, VersionError> {
        Version::parse_dotted(s, None)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "api={}, version={}.{}", self.api, self.major, self.minor)?;
        if self.revision != 0 {
            write!(f, ".{}", self.revision)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;

    fn v(major: i32, minor: i32, revision: i32, api: Api) -> Version {
        Version::new(major, minor, revision, api).unwrap()
    }

    quickcheck! {
        fn construct_keeps_components(major: u16, minor: u16, revision: u16) -> TestResult {
            if major == 0 {
                return TestResult::discard();
            }
            let version = v(major as i32, minor as i32, revision as i32, Api::GL);
            TestResult::from_bool(
                version.major() == major as u32 &&
                version.minor() == minor as u32 &&
                version.revision() == revision as u32 &&
                *version.api() == Api::GL
            )
        }

        fn construct_rejects_out_of_range(major: i32, minor: i32, revision: i32) -> TestResult {
            if major > 0 && minor >= 0 && revision >= 0 {
                return TestResult::discard();
            }
            match Version::new(major, minor, revision, Api::GL) {
                Err(VersionError::InvalidArgument(_)) => TestResult::passed(),
                _ => TestResult::failed(),
            }
        }

        fn ordering_matches_tuples(a: (u8, u8, u8), b: (u8, u8, u8)) -> bool {
            let va = v(a.0 as i32 + 1, a.1 as i32, a.2 as i32, Api::GLES2);
            let vb = v(b.0 as i32 + 1, b.1 as i32, b.2 as i32, Api::GLES2);
            let (ta, tb) = (a, b);

            (va < vb) == (ta < tb) &&
            (va <= vb) == (ta <= tb) &&
            (va > vb) == (ta > tb) &&
            (va >= vb) == (ta >= tb) &&
            (va == vb) == (ta == tb)
        }

        fn cross_family_compare_fails(a: (u8, u8), b: (u8, u8)) -> bool {
            let va = v(a.0 as i32 + 1, a.1 as i32, 0, Api::GL);
            let vb = v(b.0 as i32 + 1, b.1 as i32, 0, Api::GLES2);

            va != vb && match va.compare_to(&vb) {
                Err(VersionError::IncompatibleFamily { left, right }) => {
                    left == Api::GL && right == Api::GLES2
                }
                _ => false,
            }
        }
    }

    #[test]
    fn empty_api_rejected() {
        match Api::new("") {
            Err(VersionError::InvalidArgument(_)) => (),
            r => panic!("unexpected {:?}", r),
        }
        assert_eq!("vk", Api::new("vk").unwrap().as_str());
    }

    #[test]
    fn parse_dotted() {
        assert_eq!(v(3, 0, 0, Api::GL), Version::parse_dotted("3.0", None).unwrap());
        assert_eq!(v(3, 0, 2, Api::GL), Version::parse_dotted("3.0.2", None).unwrap());
        assert_eq!(
            v(4, 6, 0, Api::GL),
            Version::parse_dotted("4.6.0 NVIDIA 535.54.03", None).unwrap()
        );

        let es = Version::parse_dotted("2.0 ES", None).unwrap();
        assert_eq!(Api::GLES2, *es.api());
        assert_eq!(2, es.major());

        assert_eq!(
            v(3, 2, 0, Api::GLES2),
            Version::parse_dotted("OpenGL ES 3.2 Mesa 23.1.4", None).unwrap()
        );
        assert_eq!(
            v(1, 1, 0, Api::GLES1),
            Version::parse_dotted("OpenGL es-CM 1.1", None).unwrap()
        );
    }

    #[test]
    fn parse_dotted_override() {
        let glsl = Api::GLSL;
        assert_eq!(
            v(4, 60, 0, Api::GLSL),
            Version::parse_dotted("4.60 NVIDIA", Some(&glsl)).unwrap()
        );
        assert_eq!(Api::GLSL, glsl);

        // The ES marker wins over the override.
        assert_eq!(
            v(3, 0, 0, Api::GLES2),
            Version::parse_dotted("OpenGL ES 3.0", Some(&glsl)).unwrap()
        );
    }

    #[test]
    fn parse_dotted_rejects() {
        for text in &["", "ES", "3", "version three", "3."] {
            match Version::parse_dotted(text, None) {
                Err(VersionError::InvalidFormat(ref s)) if s == text => (),
                r => panic!("{:?} parsed as {:?}", text, r),
            }
        }
        match Version::parse_dotted("0.9", None) {
            Err(VersionError::InvalidArgument(_)) => (),
            r => panic!("unexpected {:?}", r),
        }
    }

    #[test]
    fn from_str() {
        let version: Version = "3.3".parse().unwrap();
        assert_eq!(v(3, 3, 0, Api::GL), version);
    }

    #[test]
    fn parse_feature_token() {
        assert_eq!(
            v(1, 0, 0, Api::GLES1),
            Version::parse_feature_token(GLES1_FEATURE_TOKEN).unwrap()
        );
        assert_eq!(
            v(1, 2, 0, Api::GLSC2),
            Version::parse_feature_token("GL_SC_VERSION_1_2").unwrap()
        );
        assert_eq!(
            v(3, 1, 0, Api::GLES2),
            Version::parse_feature_token("GL_ES_VERSION_3_1").unwrap()
        );
        assert_eq!(
            v(4, 5, 0, Api::GL),
            Version::parse_feature_token("GL_VERSION_4_5").unwrap()
        );
        assert_eq!(
            v(1, 4, 0, Api::GL),
            Version::parse_feature_token("GLX_VERSION_1_4").unwrap()
        );
    }

    #[test]
    fn parse_feature_token_rejects() {
        for token in &["GL_ARB_debug_output", "GL_VERSION_3", "VERSION_3_0", "GL_VERSION_ES_CM_1_1", ""] {
            match Version::parse_feature_token(token) {
                Err(VersionError::InvalidFormat(_)) => (),
                r => panic!("{:?} parsed as {:?}", token, r),
            }
            assert_eq!(None, Version::try_parse_feature_token(token));
        }
    }

    #[test]
    fn zero_revision_is_complete() {
        let a: Version = "3.0".parse().unwrap();
        let b: Version = "3.0.0".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(300, a.version_id());
        assert_eq!(Ordering::Equal, a.compare_to(&b).unwrap());
    }

    #[test]
    fn version_id() {
        assert_eq!(332, v(3, 3, 2, Api::GL).version_id());
        assert_eq!(100, v(1, 0, 0, Api::GLES1).version_id());
    }

    #[test]
    fn version_id_large_major() {
        let version = Version::parse_dotted("50000000.0", None).unwrap();
        assert_eq!(5_000_000_000, version.version_id());

        let max = v(i32::max_value(), i32::max_value(), i32::max_value(), Api::GL);
        assert_eq!(
            u64::from(i32::max_value() as u32) * 111,
            max.version_id()
        );
    }

    #[test]
    fn es_marker_forms() {
        for text in &["OpenGL ES3.0", "OpenGL es 3.0", "OpenGL ES-3.0", "3.0 ES"] {
            assert_eq!(Api::GLES2, *Version::parse_dotted(text, None).unwrap().api(), "{}", text);
        }
        for text in &["GLES 3.0", "3.0 Mesa ESSENTIAL", "3.0 TESLA"] {
            assert_eq!(Api::GL, *Version::parse_dotted(text, None).unwrap().api(), "{}", text);
        }
    }

    #[test]
    fn out_of_range_components() {
        match Version::parse_dotted("99999999999.0", None) {
            Err(VersionError::InvalidArgument(_)) => (),
            r => panic!("unexpected {:?}", r),
        }
        match Version::parse_feature_token("GL_VERSION_99999999999_0") {
            Err(VersionError::InvalidArgument(_)) => (),
            r => panic!("unexpected {:?}", r),
        }
        assert_eq!(None, Version::try_parse_feature_token("GL_VERSION_3_99999999999"));
    }

    #[test]
    fn display() {
        assert_eq!("api=gl, version=3.3", v(3, 3, 0, Api::GL).to_string());
        assert_eq!("api=gles2, version=3.1.4", v(3, 1, 4, Api::GLES2).to_string());
    }

    #[test]
    #[should_panic(expected = "Cannot order")]
    fn cross_family_operator_panics() {
        let _ = v(3, 0, 0, Api::GL) < v(3, 0, 0, Api::GLES2);
    }
}
