//! Static type catalog implementing every collaborator trait

use std::sync::Arc;

use ahash::AHashMap;
use tracing::debug;
use whiteshark_format::constants::{COLLECTION_ITEM_NAME, MAP_ENTRY_PREFIX};
use whiteshark_format::{Result, SharkError};

use crate::types::{FieldSchemaProvider, InstanceBuilder, TypeHandle, TypeRef, TypeRegistry, TypeSchema};
use crate::value::Record;

/// Table of record schemas registered up front
///
/// Handles are dense indices in registration order. A type may additionally
/// carry an external name: it is written on encode and resolved on decode,
/// while the local name keeps resolving as well.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    schemas: Vec<Arc<TypeSchema>>,
    by_name: AHashMap<String, TypeHandle>,
    external: AHashMap<TypeHandle, String>,
    by_external: AHashMap<String, TypeHandle>,
}

impl Catalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record schema
    pub fn register(&mut self, schema: TypeSchema) -> Result<TypeHandle> {
        if schema.name.is_empty() {
            return Err(SharkError::Registration("type name is empty".to_string()));
        }
        if TypeRef::is_reserved_name(&schema.name) {
            return Err(SharkError::Registration(format!(
                "'{}' is a builtin type name",
                schema.name
            )));
        }
        if self.by_name.contains_key(&schema.name) || self.by_external.contains_key(&schema.name) {
            return Err(SharkError::Registration(format!(
                "type '{}' is already registered",
                schema.name
            )));
        }

        for (i, field) in schema.fields.iter().enumerate() {
            if field.name == COLLECTION_ITEM_NAME || field.name.starts_with(MAP_ENTRY_PREFIX) {
                return Err(SharkError::Registration(format!(
                    "field '{}' of '{}' uses a reserved name",
                    field.name, schema.name
                )));
            }
            if schema.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SharkError::Registration(format!(
                    "field '{}' is declared twice in '{}'",
                    field.name, schema.name
                )));
            }
        }

        let handle = TypeHandle(u32::try_from(self.schemas.len()).map_err(|_| {
            SharkError::Registration("too many registered types".to_string())
        })?);
        debug!(name = %schema.name, handle = handle.0, "registered type");
        self.by_name.insert(schema.name.clone(), handle);
        self.schemas.push(Arc::new(schema));
        Ok(handle)
    }

    /// Handle registered under the local `name`
    pub fn handle(&self, name: &str) -> Option<TypeHandle> {
        self.by_name.get(name).copied()
    }

    /// Use `name` instead of the local name on the wire
    pub fn map_external(&mut self, handle: TypeHandle, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.schemas.get(handle.0 as usize).is_none() {
            return Err(SharkError::Registration(format!(
                "unknown type handle {}",
                handle.0
            )));
        }
        if name.is_empty() || TypeRef::is_reserved_name(&name) {
            return Err(SharkError::Registration(format!(
                "'{}' cannot be used as an external name",
                name
            )));
        }
        let taken_by_other = self
            .by_external
            .get(&name)
            .or_else(|| self.by_name.get(&name))
            .is_some_and(|owner| *owner != handle);
        if taken_by_other {
            return Err(SharkError::Registration(format!(
                "external name '{}' is already in use",
                name
            )));
        }

        self.unmap_external(handle);
        self.by_external.insert(name.clone(), handle);
        self.external.insert(handle, name);
        Ok(())
    }

    /// Drop the external name of `handle`, returning it
    pub fn unmap_external(&mut self, handle: TypeHandle) -> Option<String> {
        let name = self.external.remove(&handle)?;
        self.by_external.remove(&name);
        Some(name)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl TypeRegistry for Catalog {
    fn resolve(&self, name: &str) -> Option<TypeHandle> {
        self.by_external
            .get(name)
            .or_else(|| self.by_name.get(name))
            .copied()
    }

    fn name_of(&self, handle: TypeHandle) -> Option<&str> {
        match self.external.get(&handle) {
            Some(name) => Some(name),
            None => self
                .schemas
                .get(handle.0 as usize)
                .map(|schema| schema.name.as_str()),
        }
    }
}

impl FieldSchemaProvider for Catalog {
    fn schema(&self, handle: TypeHandle) -> Option<Arc<TypeSchema>> {
        self.schemas.get(handle.0 as usize).cloned()
    }
}

impl InstanceBuilder for Catalog {
    fn instantiate(&self, handle: TypeHandle) -> Option<Record> {
        self.schema(handle).map(|schema| Record::new(handle, schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldDescriptor;

    #[test]
    fn test_register_and_resolve() {
        let mut catalog = Catalog::new();
        let person = catalog
            .register(TypeSchema::new("Person").field("name"))
            .unwrap();
        assert_eq!(catalog.resolve("Person"), Some(person));
        assert_eq!(catalog.name_of(person), Some("Person"));
        assert_eq!(catalog.handle("Person"), Some(person));

        let record = catalog.instantiate(person).unwrap();
        assert_eq!(record.type_name(), "Person");
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut catalog = Catalog::new();
        catalog.register(TypeSchema::new("Person")).unwrap();
        match catalog.register(TypeSchema::new("Person")) {
            Err(SharkError::Registration(msg)) => assert!(msg.contains("already registered")),
            other => panic!("expected Registration, got {other:?}"),
        }
    }

    #[test]
    fn test_register_rejects_builtin_and_reserved_names() {
        let mut catalog = Catalog::new();
        assert!(catalog.register(TypeSchema::new("i32")).is_err());
        assert!(catalog.register(TypeSchema::new("[Person]")).is_err());
        assert!(catalog
            .register(TypeSchema::new("Bag").field(":ci:"))
            .is_err());
        assert!(catalog
            .register(TypeSchema::new("Bag").with_field(FieldDescriptor::map(":m:key")))
            .is_err());
        assert!(catalog
            .register(TypeSchema::new("Bag").field("a").field("a"))
            .is_err());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_external_names() {
        let mut catalog = Catalog::new();
        let person = catalog.register(TypeSchema::new("Person")).unwrap();
        let robot = catalog.register(TypeSchema::new("Robot")).unwrap();

        catalog.map_external(person, "com.acme.Person").unwrap();
        assert_eq!(catalog.name_of(person), Some("com.acme.Person"));
        assert_eq!(catalog.resolve("com.acme.Person"), Some(person));
        assert_eq!(catalog.resolve("Person"), Some(person));

        // Another type cannot take the same external or local name
        assert!(catalog.map_external(robot, "com.acme.Person").is_err());
        assert!(catalog.map_external(robot, "Person").is_err());

        assert_eq!(
            catalog.unmap_external(person).as_deref(),
            Some("com.acme.Person")
        );
        assert_eq!(catalog.name_of(person), Some("Person"));
        assert_eq!(catalog.resolve("com.acme.Person"), None);
    }
}
