use crate::config::SerializerConfig;
use crate::def::SerializerDef;
use crate::emit::CompiledSerializer;
use skillet_types::wire::{WireReader, WireWriter};
use skillet_types::{CompatibilityLevel, DecodeError, EncodeError, Value, Version};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;


const INITIAL_SCRATCH_LEN: usize = 64;

/// A compiled encode/decode pair for one root type.
///
/// Cheap to clone. All clones, and all serializers built for a structurally equal tree
/// with the same level and discriminant encoding, share one compiled program.
#[derive(Clone)]
pub struct BinarySerializer {
    def: SerializerDef,
    compiled: Arc<CompiledSerializer>,
    level: CompatibilityLevel,
    encode_version: Version,
    decode_version: Version,
    version_header: bool,
}

impl BinarySerializer {
    pub(crate) fn new(
        def: SerializerDef,
        compiled: Arc<CompiledSerializer>,
        config: &SerializerConfig,
    ) -> Self {
        let max = compiled.max_version();
        let clamp = |requested: Option<Version>, purpose: &str| match requested {
            Some(v) if v > max => {
                warn!(requested = %v, max = %max, purpose, "Clamping to highest known version");
                max
            }
            Some(v) => v,
            None => max,
        };
        let encode_version = clamp(config.encode_version, "encode");
        let decode_version = clamp(config.decode_version, "decode");
        Self {
            def,
            compiled,
            level: config.compatibility_level,
            encode_version,
            decode_version,
            version_header: config.version_header,
        }
    }

    /// Writes `value` starting at `offset`. Returns the offset just past the last byte written.
    ///
    /// If the value does not fit, returns [`EncodeError::BufferOverflow`] and the contents of
    /// `buf` from `offset` on are unspecified.
    pub fn encode(
        &self,
        buf: &mut [u8],
        offset: usize,
        value: &Value,
    ) -> Result<usize, EncodeError> {
        let mut w = WireWriter::new(buf, offset, self.level.wire_format())?;
        if self.version_header {
            w.write_varint(*self.encode_version as u64)?;
        }
        self.compiled
            .program_for(self.encode_version)
            .encode(&mut w, value)?;
        Ok(w.position())
    }

    /// Reads one value starting at `offset`. Returns it with the offset just past its last byte.
    pub fn decode(&self, buf: &[u8], offset: usize) -> Result<(Value, usize), DecodeError> {
        let mut r = WireReader::new(buf, offset, self.level.wire_format())?;
        let version = if self.version_header {
            let version = Version::new(r.read_varint(u32::BITS)? as u32);
            if version > self.compiled.max_version() {
                return Err(DecodeError::UnknownVersion { version });
            }
            version
        } else {
            self.decode_version
        };
        let value = self.compiled.program_for(version).decode(&mut r)?;
        Ok((value, r.position()))
    }

    /// Like [`Self::encode`] at an explicit version. Never writes a version header.
    pub fn encode_at_version(
        &self,
        buf: &mut [u8],
        offset: usize,
        value: &Value,
        version: Version,
    ) -> Result<usize, EncodeError> {
        let mut w = WireWriter::new(buf, offset, self.level.wire_format())?;
        self.compiled.program_for(version).encode(&mut w, value)?;
        Ok(w.position())
    }

    /// Like [`Self::decode`] at an explicit version. Never reads a version header.
    pub fn decode_at_version(
        &self,
        buf: &[u8],
        offset: usize,
        version: Version,
    ) -> Result<(Value, usize), DecodeError> {
        let mut r = WireReader::new(buf, offset, self.level.wire_format())?;
        let value = self.compiled.program_for(version).decode(&mut r)?;
        Ok((value, r.position()))
    }

    /// Encodes into a fresh buffer, growing it until the value fits.
    pub fn encode_to_vec(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        let mut buf = vec![0; INITIAL_SCRATCH_LEN];
        loop {
            match self.encode(&mut buf, 0, value) {
                Ok(len) => {
                    buf.truncate(len);
                    return Ok(buf);
                }
                Err(EncodeError::BufferOverflow { .. }) => {
                    let len = buf.len() * 2;
                    buf.resize(len, 0);
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn compatibility_level(&self) -> CompatibilityLevel {
        self.level
    }

    /// Versions at which some field of the tree is introduced.
    pub fn versions(&self) -> BTreeSet<Version> {
        self.def.versions()
    }

    pub fn encode_version(&self) -> Version {
        self.encode_version
    }

    pub fn decode_version(&self) -> Version {
        self.decode_version
    }

    pub fn definition(&self) -> &SerializerDef {
        &self.def
    }

    pub fn shares_program_with(&self, other: &BinarySerializer) -> bool {
        Arc::ptr_eq(&self.compiled, &other.compiled)
    }
}
