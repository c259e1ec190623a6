//! Descriptor tables from which the builder resolves types.
//!
//! Record types and subtype groups are described explicitly by the caller,
//! typically from [`crate::Serializable::register`].

use crate::def::TypeRef;
use crate::error::BuildError;
use itertools::Itertools;
use skillet_types::{GroupName, TypeName, Version};
use std::collections::hash_map::Entry;
use std::collections::HashMap;


#[derive(PartialEq, Eq, Clone, Debug)]
pub struct FieldDescriptor {
    name: String,
    type_ref: TypeRef,
    added: Version,
    order: Option<u32>,
    var_length: bool,
}

impl FieldDescriptor {
    pub fn new<N: Into<String>>(name: N, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            added: Version::ZERO,
            order: None,
            var_length: false,
        }
    }

    /// The field is on the wire from `version` on.
    pub fn added(self, version: Version) -> Self {
        Self {
            added: version,
            ..self
        }
    }

    /// Explicit position key. Either every field of a record has one or none does.
    pub fn order(self, order: u32) -> Self {
        Self {
            order: Some(order),
            ..self
        }
    }

    /// Write the integer at the leaf of this field as a varint, where the level allows it.
    pub fn var_length(self) -> Self {
        Self {
            var_length: true,
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    pub fn added_in(&self) -> Version {
        self.added
    }

    pub fn order_key(&self) -> Option<u32> {
        self.order
    }

    pub fn is_var_length(&self) -> bool {
        self.var_length
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct RecordDescriptor {
    type_name: TypeName,
    fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    pub fn new<N: Into<TypeName>>(type_name: N) -> Self {
        Self {
            type_name: type_name.into(),
            fields: vec![],
        }
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Fields in wire order: by order key if keys are given, else by declaration.
    pub fn wire_fields(&self) -> Vec<&FieldDescriptor> {
        self.fields.iter().sorted_by_key(|f| f.order).collect()
    }

    fn validate(&self) -> Result<(), BuildError> {
        let inconsistent = |reason: String| BuildError::InconsistentFields {
            record: self.type_name.clone(),
            reason,
        };

        if let Some(name) = self.fields.iter().map(|f| &f.name).duplicates().next() {
            return Err(inconsistent(format!("field {name} is declared twice")));
        }

        let ordered = self.fields.iter().filter(|f| f.order.is_some()).count();
        if ordered != 0 && ordered != self.fields.len() {
            return Err(inconsistent(String::from(
                "order keys must be given for all fields or for none",
            )));
        }
        if let Some(order) = self.fields.iter().filter_map(|f| f.order).duplicates().next() {
            return Err(inconsistent(format!("order key {order} is used twice")));
        }

        // Later versions only append to the layout of earlier ones.
        let wire_fields = self.wire_fields();
        if let Some((prev, next)) = wire_fields
            .iter()
            .tuple_windows()
            .find(|(prev, next)| next.added < prev.added)
        {
            return Err(inconsistent(format!(
                "field {} added in version {} precedes field {} added in version {}",
                prev.name, prev.added, next.name, next.added
            )));
        }

        for field in self.fields.iter().filter(|f| f.var_length) {
            let is_int = field
                .type_ref
                .leaf_scalar()
                .map_or(false, |kind| kind.is_integer());
            if !is_int {
                return Err(inconsistent(format!(
                    "field {} is var_length but is {}",
                    field.name,
                    field.type_ref.describe()
                )));
            }
        }

        Ok(())
    }
}

/// A closed set of record types that may appear where the group is referenced.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct SubtypeGroup {
    group: GroupName,
    members: Vec<(TypeName, Option<u32>)>,
}

impl SubtypeGroup {
    pub fn new<N: Into<GroupName>>(group: N) -> Self {
        Self {
            group: group.into(),
            members: vec![],
        }
    }

    /// Adds a member whose discriminant is its registration position.
    pub fn member<N: Into<TypeName>>(mut self, type_name: N) -> Self {
        self.members.push((type_name.into(), None));
        self
    }

    pub fn member_with_tag<N: Into<TypeName>>(mut self, type_name: N, tag: u32) -> Self {
        self.members.push((type_name.into(), Some(tag)));
        self
    }

    pub fn group(&self) -> &GroupName {
        &self.group
    }

    pub fn members(&self) -> impl Iterator<Item = &TypeName> {
        self.members.iter().map(|(type_name, _)| type_name)
    }

    /// Members with their discriminants, in registration order.
    pub fn tagged_members(&self) -> Result<Vec<(u32, &TypeName)>, BuildError> {
        let tagged = self
            .members
            .iter()
            .enumerate()
            .map(|(pos, (type_name, tag))| (tag.unwrap_or(pos as u32), type_name))
            .collect::<Vec<_>>();
        if let Some(tag) = tagged.iter().map(|(tag, _)| *tag).duplicates().next() {
            return Err(BuildError::DuplicateDiscriminant {
                group: self.group.clone(),
                tag,
            });
        }
        Ok(tagged)
    }

    fn validate(&self) -> Result<(), BuildError> {
        if self.members.is_empty() {
            return Err(BuildError::EmptyGroup(self.group.clone()));
        }
        if let Some(type_name) = self.members().duplicates().next() {
            return Err(BuildError::DuplicateSubtype {
                group: self.group.clone(),
                type_name: type_name.clone(),
            });
        }
        self.tagged_members()?;
        Ok(())
    }
}

#[derive(Default, Debug)]
pub struct TypeRegistry {
    records: HashMap<TypeName, RecordDescriptor>,
    groups: HashMap<GroupName, SubtypeGroup>,
}

impl TypeRegistry {
    /// Registering an identical descriptor twice is a no-op.
    pub fn register_record(&mut self, desc: RecordDescriptor) -> Result<(), BuildError> {
        desc.validate()?;
        match self.records.entry(desc.type_name.clone()) {
            Entry::Occupied(entry) if entry.get() == &desc => Ok(()),
            Entry::Occupied(_) => Err(BuildError::DuplicateRecord(desc.type_name)),
            Entry::Vacant(entry) => {
                entry.insert(desc);
                Ok(())
            }
        }
    }

    /// Registering an identical group twice is a no-op.
    pub fn register_subtypes(&mut self, group: SubtypeGroup) -> Result<(), BuildError> {
        group.validate()?;
        match self.groups.entry(group.group.clone()) {
            Entry::Occupied(entry) if entry.get() == &group => Ok(()),
            Entry::Occupied(_) => Err(BuildError::DuplicateGroup(group.group)),
            Entry::Vacant(entry) => {
                entry.insert(group);
                Ok(())
            }
        }
    }

    pub fn record(&self, type_name: &TypeName) -> Option<&RecordDescriptor> {
        self.records.get(type_name)
    }

    pub fn group(&self, group: &GroupName) -> Option<&SubtypeGroup> {
        self.groups.get(group)
    }

    pub fn contains_record(&self, type_name: &TypeName) -> bool {
        self.records.contains_key(type_name)
    }

    pub fn contains_group(&self, group: &GroupName) -> bool {
        self.groups.contains_key(group)
    }
}
