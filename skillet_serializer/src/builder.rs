use crate::cache::{CacheKey, SerializerCache};
use crate::config::SerializerConfig;
use crate::def::{
    FieldDef, PrimitiveDef, SerializerDef, StructuredDef, SubtypeDef, SubtypesDef, TypeRef,
    Visitor,
};
use crate::error::BuildError;
use crate::registry::{RecordDescriptor, SubtypeGroup, TypeRegistry};
use crate::serializer::BinarySerializer;
use crate::typed::{Serializable, TypedSerializer};
use skillet_types::{CompatibilityLevel, DiscriminantEncoding, GroupName, TypeName, Version};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;


/// Collects descriptors and configuration, then resolves one root type into a serializer.
///
/// `build` consumes the builder, so nothing can be registered once a serializer exists.
pub struct SerializerBuilder {
    registry: TypeRegistry,
    config: SerializerConfig,
    cache: Arc<SerializerCache>,
}

impl Default for SerializerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializerBuilder {
    pub fn new() -> Self {
        Self {
            registry: TypeRegistry::default(),
            config: SerializerConfig::default(),
            cache: SerializerCache::global(),
        }
    }

    pub fn register_record(&mut self, desc: RecordDescriptor) -> Result<(), BuildError> {
        self.registry.register_record(desc)
    }

    pub fn register_subtypes(&mut self, group: SubtypeGroup) -> Result<(), BuildError> {
        self.registry.register_subtypes(group)
    }

    pub fn register<T: Serializable>(&mut self) -> Result<(), BuildError> {
        T::register(self)
    }

    /// For [`Serializable::register`] impls of self-referencing types,
    /// which must stop recursing once their own descriptor is in place.
    pub fn is_registered(&self, type_name: &str) -> bool {
        self.registry.contains_record(&TypeName::from(type_name))
    }

    pub fn is_group_registered(&self, group: &str) -> bool {
        self.registry.contains_group(&GroupName::from(group))
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn with_config(self, config: SerializerConfig) -> Self {
        Self { config, ..self }
    }

    pub fn with_compatibility_level(mut self, level: CompatibilityLevel) -> Self {
        self.config.compatibility_level = level;
        self
    }

    pub fn with_discriminant_encoding(mut self, encoding: DiscriminantEncoding) -> Self {
        self.config.discriminant_encoding = encoding;
        self
    }

    pub fn with_encode_version(mut self, version: Version) -> Self {
        self.config.encode_version = Some(version);
        self
    }

    pub fn with_decode_version(mut self, version: Version) -> Self {
        self.config.decode_version = Some(version);
        self
    }

    /// Prefix every encoded value with its schema version.
    pub fn with_version_header(mut self, enabled: bool) -> Self {
        self.config.version_header = enabled;
        self
    }

    pub fn with_cache(self, cache: Arc<SerializerCache>) -> Self {
        Self { cache, ..self }
    }

    pub fn build(self, root: TypeRef) -> Result<BinarySerializer, BuildError> {
        let mut resolver = Resolver {
            registry: &self.registry,
            discriminant: self.config.discriminant_encoding,
            expanded: HashSet::new(),
        };
        let def = resolver.resolve(&root, false, "root")?;

        let mut refs = RefChecker::default();
        def.walk(&mut refs);
        if let Some(type_name) = refs.dangling.into_iter().next() {
            return Err(BuildError::Unresolvable {
                type_name: type_name.to_string(),
                referenced_from: String::from("a reference preceding its definition"),
            });
        }

        let key = CacheKey {
            root: def.clone(),
            level: self.config.compatibility_level,
            discriminant: self.config.discriminant_encoding,
        };
        let compiled = self.cache.get_or_compile(key);
        Ok(BinarySerializer::new(def, compiled, &self.config))
    }

    pub fn build_typed<T: Serializable>(mut self) -> Result<TypedSerializer<T>, BuildError> {
        self.register::<T>()?;
        let inner = self.build(T::type_ref())?;
        Ok(TypedSerializer::new(inner))
    }
}

struct Resolver<'r> {
    registry: &'r TypeRegistry,
    discriminant: DiscriminantEncoding,
    /// Records that already have a `Structured` node in the tree.
    expanded: HashSet<TypeName>,
}

impl<'r> Resolver<'r> {
    /// Recursion follows the same order as pre-order traversal of the resulting tree,
    /// so the first occurrence of each record is the one that gets expanded.
    fn resolve(
        &mut self,
        ty: &TypeRef,
        var_length: bool,
        from: &str,
    ) -> Result<SerializerDef, BuildError> {
        let def = match ty {
            TypeRef::Scalar(kind) => {
                SerializerDef::Primitive(PrimitiveDef::new(*kind).with_var_length(var_length))
            }
            TypeRef::Wrapped(kind) => SerializerDef::Primitive(
                PrimitiveDef::new(*kind)
                    .with_var_length(var_length)
                    .ensure_wrapped(),
            ),
            TypeRef::Str => SerializerDef::Str,
            TypeRef::Nullable(inner) => match self.resolve(inner, var_length, from)? {
                nullable @ SerializerDef::Nullable(_) => nullable,
                inner => SerializerDef::Nullable(Box::new(inner.ensure_wrapped())),
            },
            TypeRef::List(member) => {
                SerializerDef::List(Box::new(self.resolve(member, var_length, from)?))
            }
            TypeRef::Record(type_name) => self.resolve_record(type_name, from)?,
            TypeRef::Subtypes(group) => self.resolve_subtypes(group, from)?,
        };
        Ok(def)
    }

    fn resolve_record(
        &mut self,
        type_name: &TypeName,
        from: &str,
    ) -> Result<SerializerDef, BuildError> {
        if self.expanded.contains(type_name) {
            trace!(%type_name, from, "Deferring to earlier definition");
            return Ok(SerializerDef::Ref(type_name.clone()));
        }
        let registry = self.registry;
        let desc = registry
            .record(type_name)
            .ok_or_else(|| BuildError::Unresolvable {
                type_name: format!("record {type_name}"),
                referenced_from: String::from(from),
            })?;
        self.expanded.insert(type_name.clone());

        let mut fields = vec![];
        for field in desc.wire_fields() {
            let from = format!("{type_name}.{}", field.name());
            let def = self.resolve(field.type_ref(), field.is_var_length(), &from)?;
            fields.push(FieldDef::new(field.name(), field.added_in(), def));
        }
        let rec = StructuredDef::new(type_name.clone(), fields);
        trace!(%type_name, fields = %rec.describe_fields(), "Resolved record");
        Ok(SerializerDef::Structured(Arc::new(rec)))
    }

    fn resolve_subtypes(
        &mut self,
        group: &GroupName,
        from: &str,
    ) -> Result<SerializerDef, BuildError> {
        let registry = self.registry;
        let sg = registry
            .group(group)
            .ok_or_else(|| BuildError::Unresolvable {
                type_name: format!("subtypes of {group}"),
                referenced_from: String::from(from),
            })?;

        let max_tag = self.discriminant.max_tag();
        let mut subtypes = vec![];
        for (tag, type_name) in sg.tagged_members()? {
            if tag > max_tag {
                return Err(BuildError::DiscriminantOverflow {
                    group: group.clone(),
                    tag,
                    encoding: self.discriminant,
                });
            }
            let from = format!("subtypes of {group}");
            let def = self.resolve_record(type_name, &from)?;
            subtypes.push(SubtypeDef::new(tag, type_name.clone(), def));
        }
        Ok(SerializerDef::Subtypes(SubtypesDef::new(group.clone(), subtypes)))
    }
}

/// Finds `Ref` nodes with no `Structured` node for the same record earlier in pre-order.
#[derive(Default)]
struct RefChecker {
    seen: HashSet<TypeName>,
    dangling: Vec<TypeName>,
}
impl Visitor for RefChecker {
    fn visit(&mut self, def: &SerializerDef) {
        match def {
            SerializerDef::Structured(rec) => {
                self.seen.insert(rec.type_name().clone());
            }
            SerializerDef::Ref(type_name) if !self.seen.contains(type_name) => {
                self.dangling.push(type_name.clone());
            }
            _ => (),
        }
    }
}
