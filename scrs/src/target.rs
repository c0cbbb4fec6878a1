//! Output target types (language + version)

use crate::{Error, Result};
use std::borrow::Cow;
use std::ffi::CString;
use std::fmt;

pub use scwrapper::{ShaderModel, ShaderStage, ShadingLanguage};

/// Complete output target specification (language + version)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    /// The output language
    pub language: ShadingLanguage,
    /// Language version such as "450"; the engine picks one when `None`
    pub version: Option<Cow<'static, str>>,
    /// Emit a library module rather than a single entry point
    pub as_module: bool,
}

impl Target {
    pub const DXIL: Target = Target::new(ShadingLanguage::Dxil);
    pub const SPIRV: Target = Target::new(ShadingLanguage::SpirV);
    pub const HLSL: Target = Target::new(ShadingLanguage::Hlsl);
    pub const MSL_MACOS: Target = Target::new(ShadingLanguage::MslMacOs);
    pub const MSL_IOS: Target = Target::new(ShadingLanguage::MslIos);

    // GLSL targets
    pub const GLSL_330: Target = Target::versioned(ShadingLanguage::Glsl, "330");
    pub const GLSL_410: Target = Target::versioned(ShadingLanguage::Glsl, "410");
    pub const GLSL_450: Target = Target::versioned(ShadingLanguage::Glsl, "450");

    // GLSL ES targets
    pub const ESSL_300: Target = Target::versioned(ShadingLanguage::Essl, "300");
    pub const ESSL_310: Target = Target::versioned(ShadingLanguage::Essl, "310");

    /// Creates a target with the engine's default version
    pub const fn new(language: ShadingLanguage) -> Self {
        Target {
            language,
            version: None,
            as_module: false,
        }
    }

    const fn versioned(language: ShadingLanguage, version: &'static str) -> Self {
        Target {
            language,
            version: Some(Cow::Borrowed(version)),
            as_module: false,
        }
    }

    /// Returns true if the target produces source text rather than a binary
    pub fn is_text(&self) -> bool {
        self.language.is_text()
    }

    /// Returns the version as a null-terminated C string, if one is set
    pub(crate) fn version_cstring(&self) -> Result<Option<CString>> {
        self.version
            .as_deref()
            .map(|version| {
                CString::new(version).map_err(|_| {
                    Error::InvalidParameter("target version contains a null byte".to_string())
                })
            })
            .transpose()
    }
}

impl From<ShadingLanguage> for Target {
    fn from(language: ShadingLanguage) -> Self {
        Target::new(language)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.language {
            ShadingLanguage::Dxil => "dxil",
            ShadingLanguage::SpirV => "spirv",
            ShadingLanguage::Hlsl => "hlsl",
            ShadingLanguage::Glsl => "glsl",
            ShadingLanguage::Essl => "essl",
            ShadingLanguage::MslMacOs => "msl_macos",
            ShadingLanguage::MslIos => "msl_ios",
        };
        match &self.version {
            Some(version) => write!(f, "{}_{}", name, version),
            None => f.write_str(name),
        }
    }
}
