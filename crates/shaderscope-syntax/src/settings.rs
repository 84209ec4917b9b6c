//! Parse settings: shader stage, language profile, predefined macros and
//! host overrides for preprocessor branches.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use thiserror::Error;

bitflags! {
    /// Shader stages a document may be compiled for. Gates which built-in
    /// symbols resolve.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderType: u8 {
        const VERTEX = 1 << 0;
        const FRAGMENT = 1 << 1;
        const GEOMETRY = 1 << 2;
        const COMPUTE = 1 << 3;
        const TESSELLATION_CONTROL = 1 << 4;
        const TESSELLATION_EVALUATION = 1 << 5;
    }
}

impl ShaderType {
    /// Parses a stage name as used in config files (`"vertex"`, `"frag"`, ...).
    pub fn from_stage_name(name: &str) -> Option<Self> {
        let stage = match name.trim().to_ascii_lowercase().as_str() {
            "vertex" | "vert" => Self::VERTEX,
            "fragment" | "frag" | "pixel" => Self::FRAGMENT,
            "geometry" | "geom" => Self::GEOMETRY,
            "compute" | "comp" => Self::COMPUTE,
            "tessellation_control" | "tess_control" | "tesc" => Self::TESSELLATION_CONTROL,
            "tessellation_evaluation" | "tess_evaluation" | "tese" => {
                Self::TESSELLATION_EVALUATION
            }
            _ => return None,
        };
        Some(stage)
    }

    /// The stage conventionally associated with a file extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.') {
            "vert" | "vs" => Some(Self::VERTEX),
            "frag" | "fs" => Some(Self::FRAGMENT),
            "geom" | "gs" => Some(Self::GEOMETRY),
            "comp" | "cs" => Some(Self::COMPUTE),
            "tesc" => Some(Self::TESSELLATION_CONTROL),
            "tese" => Some(Self::TESSELLATION_EVALUATION),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    Core,
    Compatibility,
    Es,
}

/// A language version plus profile, as written after `#version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Profile {
    pub version: u32,
    pub kind: ProfileKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("'{0}' is not a GLSL version number")]
    Version(String),
    #[error("'{0}' is not a GLSL profile (expected core, compatibility or es)")]
    Kind(String),
}

impl Profile {
    pub fn new(version: u32, kind: ProfileKind) -> Self {
        Self { version, kind }
    }

    /// Builds the profile a `#version` directive selects. ES versions
    /// without an explicit profile word are still ES.
    pub fn from_directive(version: u32, profile: Option<&str>) -> Result<Self, ProfileError> {
        let kind = match profile {
            Some(word) => parse_kind(word)?,
            None if matches!(version, 100 | 300 | 310 | 320) => ProfileKind::Es,
            None => ProfileKind::Core,
        };
        Ok(Self { version, kind })
    }

    pub fn is_es(&self) -> bool {
        self.kind == ProfileKind::Es
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new(450, ProfileKind::Core)
    }
}

fn parse_kind(word: &str) -> Result<ProfileKind, ProfileError> {
    match word {
        "core" => Ok(ProfileKind::Core),
        "compatibility" => Ok(ProfileKind::Compatibility),
        "es" => Ok(ProfileKind::Es),
        other => Err(ProfileError::Kind(other.to_string())),
    }
}

impl FromStr for Profile {
    type Err = ProfileError;

    /// Accepts `"450"`, `"450 core"`, `"300 es"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let version = parts.next().unwrap_or_default();
        let version: u32 = version
            .parse()
            .map_err(|_| ProfileError::Version(version.to_string()))?;
        Profile::from_directive(version, parts.next())
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ProfileKind::Core => "core",
            ProfileKind::Compatibility => "compatibility",
            ProfileKind::Es => "es",
        };
        write!(f, "{} {}", self.version, kind)
    }
}

/// Everything the parser needs besides the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub shader_type: ShaderType,
    /// Used until a `#version` directive says otherwise.
    pub profile: Profile,
    /// `NAME` or `NAME=VALUE`, treated as defined before the first line.
    pub predefined_macros: Vec<String>,
    /// Whether unresolved names fall back to the built-in registry.
    pub resolve_builtins: bool,
    overrides: BTreeMap<usize, usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shader_type: ShaderType::all(),
            profile: Profile::default(),
            predefined_macros: Vec::new(),
            resolve_builtins: true,
            overrides: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn new(shader_type: ShaderType, profile: Profile) -> Self {
        Self {
            shader_type,
            profile,
            ..Self::default()
        }
    }

    pub fn with_macros<I, S>(mut self, macros: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predefined_macros = macros.into_iter().map(Into::into).collect();
        self
    }

    /// Whether names may fall back to the GLSL built-ins.
    pub fn with_builtins(mut self, resolve: bool) -> Self {
        self.resolve_builtins = resolve;
        self
    }

    /// Forces branch `branch` of the `chain`-th `#if` chain (both counted in
    /// document order from zero) to be the active one. Takes effect on the
    /// next parse.
    pub fn set_preprocessors(&mut self, chain: usize, branch: usize) {
        self.overrides.insert(chain, branch);
    }

    pub fn clear_preprocessors(&mut self) {
        self.overrides.clear();
    }

    pub fn preprocessor_override(&self, chain: usize) -> Option<usize> {
        self.overrides.get(&chain).copied()
    }

    /// Splits the predefined macros into `(name, body)` pairs.
    pub fn macro_definitions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.predefined_macros.iter().filter_map(|entry| {
            let (name, body) = entry.split_once('=').unwrap_or((entry.as_str(), "1"));
            let name = name.trim();
            (!name.is_empty()).then_some((name, body.trim()))
        })
    }
}
