use anyhow::{anyhow, Result};
use skillet_types::{CompatibilityLevel, DiscriminantEncoding, Version};
use std::env;


pub const ENV_VAR_COMPAT_LEVEL: &str = "SKILLET_COMPAT_LEVEL";
pub const ENV_VAR_DISCRIMINANT_ENCODING: &str = "SKILLET_DISCRIMINANT_ENCODING";

/// Build-time choices of a serializer. None of these are written to the wire,
/// except the version when `version_header` is set.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct SerializerConfig {
    pub compatibility_level: CompatibilityLevel,
    pub discriminant_encoding: DiscriminantEncoding,
    /// `None` means the highest version of the tree.
    pub encode_version: Option<Version>,
    /// `None` means the highest version of the tree.
    pub decode_version: Option<Version>,
    pub version_header: bool,
}

impl SerializerConfig {
    /// Defaults, overridden by whichever of [`ENV_VAR_COMPAT_LEVEL`] and
    /// [`ENV_VAR_DISCRIMINANT_ENCODING`] are set. Each holds the integer of an enum member.
    pub fn from_env() -> Result<Self> {
        let compatibility_level = env::var(ENV_VAR_COMPAT_LEVEL).map_or_else(
            |_| Ok(CompatibilityLevel::default()),
            |s| parse_member::<CompatibilityLevel>(ENV_VAR_COMPAT_LEVEL, &s),
        )?;
        let discriminant_encoding = env::var(ENV_VAR_DISCRIMINANT_ENCODING).map_or_else(
            |_| Ok(DiscriminantEncoding::default()),
            |s| parse_member::<DiscriminantEncoding>(ENV_VAR_DISCRIMINANT_ENCODING, &s),
        )?;
        Ok(Self {
            compatibility_level,
            discriminant_encoding,
            ..Self::default()
        })
    }
}

fn parse_member<E>(var: &str, s: &str) -> Result<E>
where
    E: TryFrom<u8>,
    E::Error: std::error::Error + Send + Sync + 'static,
{
    let int = s
        .trim()
        .parse::<u8>()
        .map_err(|e| anyhow!("{var}={s:?} is not an integer: {e}"))?;
    Ok(E::try_from(int)?)
}
