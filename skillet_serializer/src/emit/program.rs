use crate::cache::CacheKey;
use crate::emit::{compile_program, Codec};
use skillet_types::wire::{WireReader, WireWriter};
use skillet_types::{DecodeError, EncodeError, Value, Version};
use tracing::debug;

/// The procedures compiled for one tree at one active version.
pub struct Program {
    version: Version,
    records: Vec<Codec>,
    root: Codec,
}

impl Program {
    pub(crate) fn new(version: Version, records: Vec<Codec>, root: Codec) -> Self {
        Self {
            version,
            records,
            root,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub(crate) fn record(&self, idx: usize) -> &Codec {
        &self.records[idx]
    }

    pub fn encode(&self, w: &mut WireWriter, value: &Value) -> Result<(), EncodeError> {
        (self.root.enc)(self, w, value)
    }

    pub fn decode(&self, r: &mut WireReader) -> Result<Value, DecodeError> {
        (self.root.dec)(self, r)
    }
}

/// All programs for one cache key: one per version at which the layout changes.
pub struct CompiledSerializer {
    /// Ascending. Always starts at [`Version::ZERO`].
    versions: Vec<Version>,
    programs: Vec<Program>,
}

impl CompiledSerializer {
    pub(crate) fn compile(key: &CacheKey) -> Self {
        let fmt = key.level.wire_format();

        let mut versions = key.root.versions();
        versions.insert(Version::ZERO);
        let versions = versions.into_iter().collect::<Vec<_>>();

        let programs = versions
            .iter()
            .map(|&version| compile_program(&key.root, version, fmt, key.discriminant))
            .collect::<Vec<_>>();

        debug!(
            root = %key.root.encode_type().describe(),
            level = ?key.level,
            versions = versions.len(),
            "Compiled serializer"
        );

        Self { versions, programs }
    }

    /// Versions at which the layout changes, ascending.
    pub fn versions(&self) -> impl Iterator<Item = Version> + '_ {
        self.versions.iter().copied()
    }

    pub fn max_version(&self) -> Version {
        self.versions.last().copied().unwrap_or(Version::ZERO)
    }

    /// The program that applies at `version`: the one compiled for the greatest
    /// layout-changing version not above it.
    pub fn program_for(&self, version: Version) -> &Program {
        let idx = self.versions.partition_point(|&v| v <= version);
        // versions[0] is ZERO, so idx >= 1.
        &self.programs[idx.saturating_sub(1)]
    }
}
