use crate::def::SerializerDef;
use crate::emit::CompiledSerializer;
use parking_lot::Mutex;
use skillet_types::{CompatibilityLevel, DiscriminantEncoding};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::debug;


/// What a compiled serializer is memoized by. Trees compare structurally.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct CacheKey {
    pub root: SerializerDef,
    pub level: CompatibilityLevel,
    pub discriminant: DiscriminantEncoding,
}

type Slot = Arc<OnceLock<Arc<CompiledSerializer>>>;

/// Compiled serializers, generated at most once per distinct key and kept for the life
/// of the cache.
///
/// The map lock is only held to find or insert a key's slot. Generation happens outside it,
/// inside the slot's [`OnceLock`], so concurrent first requests for one key wait for a
/// single generation while requests for other keys proceed.
#[derive(Default)]
pub struct SerializerCache {
    slots: Mutex<HashMap<CacheKey, Slot>>,
    generations: AtomicU64,
}

impl SerializerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache that builders use unless given another one.
    pub fn global() -> Arc<SerializerCache> {
        static GLOBAL: OnceLock<Arc<SerializerCache>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(SerializerCache::new())))
    }

    pub fn get_or_compile(&self, key: CacheKey) -> Arc<CompiledSerializer> {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        let mut generated = false;
        let compiled = slot.get_or_init(|| {
            generated = true;
            self.generations.fetch_add(1, Ordering::SeqCst);
            Arc::new(CompiledSerializer::compile(&key))
        });
        if !generated {
            debug!(root = %key.root.encode_type().describe(), "Serializer cache hit");
        }
        Arc::clone(compiled)
    }

    /// How many times a serializer has been generated.
    pub fn generations(&self) -> u64 {
        self.generations.load(Ordering::SeqCst)
    }

    /// Number of distinct keys requested so far.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
