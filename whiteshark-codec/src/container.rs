//! In-progress containers and their write capabilities
//!
//! A [`Container`] is an array or object whose header has been read and whose
//! children are still arriving. The progressive decoder keeps a stack of them
//! as its frames; the immediate decoder fills one per recursion level. What a
//! container accepts is fixed when it opens.

use tracing::{debug, trace};
use whiteshark_format::constants::{COLLECTION_ITEM_NAME, MAP_ENTRY_PREFIX};
use whiteshark_format::limits::MAX_PREALLOCATED_ITEMS;
use whiteshark_format::{Result, SharkError};

use crate::element::ObjectKind;
use crate::types::{Collaborators, FieldKind, TypeRef};
use crate::value::{Array, GenericObject, Record, Value};

/// Positional writes into an array
pub trait IndexedWrite {
    /// Store `value` at `index`; writing one past the end appends
    fn write_at(&mut self, index: usize, value: Value) -> Result<()>;
}

/// Keyed writes into a mapping
pub trait KeyedWrite {
    /// Store `value` under `key`
    fn write_key(&mut self, key: String, value: Value) -> Result<()>;
}

/// Appends to an ordered collection
pub trait Append {
    /// Add `value` at the end
    fn append_item(&mut self, value: Value) -> Result<()>;
}

impl IndexedWrite for Array {
    fn write_at(&mut self, index: usize, value: Value) -> Result<()> {
        match index.cmp(&self.items.len()) {
            std::cmp::Ordering::Less => self.items[index] = value,
            std::cmp::Ordering::Equal => self.items.push(value),
            std::cmp::Ordering::Greater => {
                return Err(SharkError::UnexpectedShape(format!(
                    "array slot {} written before slot {}",
                    index,
                    self.items.len()
                )))
            }
        }
        Ok(())
    }
}

impl KeyedWrite for GenericObject {
    fn write_key(&mut self, key: String, value: Value) -> Result<()> {
        self.insert(key, value);
        Ok(())
    }
}

impl Append for Vec<Value> {
    fn append_item(&mut self, value: Value) -> Result<()> {
        self.push(value);
        Ok(())
    }
}

#[derive(Debug)]
enum Target {
    Array(Array),
    Generic(GenericObject),
    Record {
        record: Record,
        map: bool,
        collection: bool,
    },
}

/// Where the value following a property name goes
#[derive(Debug)]
enum Slot {
    Field(usize),
    Entry(String),
    Item,
    Skip,
}

/// How a child value is received by its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// Stored into a slot; the field kind may grant capabilities
    Field(FieldKind),
    /// Decoded for validation, then dropped along with its whole subtree
    Discarded,
}

impl Placement {
    /// Placement of the root value
    pub(crate) const ROOT: Placement = Placement::Field(FieldKind::Plain);
}

/// One container awaiting its children
#[derive(Debug)]
pub(crate) struct Container {
    target: Target,
    expected: usize,
    index: usize,
    pending: Option<Slot>,
    discard: bool,
}

impl Container {
    /// Open an array of `count` elements
    pub(crate) fn array(element_type: TypeRef, count: usize, placement: Placement) -> Self {
        Self::new(
            Target::Array(Array::with_capacity(
                element_type,
                count.min(MAX_PREALLOCATED_ITEMS),
            )),
            count,
            placement,
        )
    }

    /// Open an object of `count` properties
    ///
    /// A map- or collection-valued parent field grants the matching
    /// capability even when the record type does not opt in. A discarded
    /// object accepts every property since its content is never kept.
    pub(crate) fn object<C: Collaborators + ?Sized>(
        kind: ObjectKind,
        count: usize,
        placement: Placement,
        collaborators: &C,
    ) -> Result<Self> {
        let target = match kind {
            ObjectKind::Generic => {
                Target::Generic(GenericObject::with_capacity(count.min(MAX_PREALLOCATED_ITEMS)))
            }
            ObjectKind::Record(handle) => {
                let record = collaborators.instantiate(handle).ok_or_else(|| {
                    SharkError::UnknownType(
                        collaborators
                            .name_of(handle)
                            .map(str::to_owned)
                            .unwrap_or_else(|| format!("type handle {}", handle.0)),
                    )
                })?;
                let discard = placement == Placement::Discarded;
                let map = discard
                    || record.schema().map
                    || placement == Placement::Field(FieldKind::Map);
                let collection = discard
                    || record.schema().collection
                    || placement == Placement::Field(FieldKind::Collection);
                Target::Record {
                    record,
                    map,
                    collection,
                }
            }
        };
        Ok(Self::new(target, count, placement))
    }

    fn new(target: Target, expected: usize, placement: Placement) -> Self {
        let discard = placement == Placement::Discarded;
        trace!(expected, discard, "container opened");
        Self {
            target,
            expected,
            index: 0,
            pending: None,
            discard,
        }
    }

    /// All declared children have been assigned
    pub(crate) fn is_complete(&self) -> bool {
        self.index >= self.expected
    }

    /// Record the property name the next value belongs to
    pub(crate) fn accept_name(&mut self, name: String) -> Result<()> {
        if self.pending.is_some() {
            return Err(SharkError::UnexpectedShape(format!(
                "property '{}' arrived before the previous property's value",
                name
            )));
        }

        let slot = match &self.target {
            Target::Array(_) => {
                return Err(SharkError::UnexpectedShape(format!(
                    "property '{}' inside an array",
                    name
                )))
            }
            Target::Generic(_) => Slot::Entry(name),
            Target::Record {
                record,
                map,
                collection,
            } => {
                if let Some(key) = name.strip_prefix(MAP_ENTRY_PREFIX) {
                    if !map {
                        return Err(SharkError::MissingCapability {
                            type_name: record.type_name().to_owned(),
                            capability: "map",
                        });
                    }
                    Slot::Entry(key.to_owned())
                } else if name == COLLECTION_ITEM_NAME {
                    if !collection {
                        return Err(SharkError::MissingCapability {
                            type_name: record.type_name().to_owned(),
                            capability: "collection",
                        });
                    }
                    Slot::Item
                } else if let Some(i) = record.schema().field_index(&name) {
                    Slot::Field(i)
                } else {
                    debug!(
                        type_name = record.type_name(),
                        field = %name,
                        "skipping unknown field"
                    );
                    Slot::Skip
                }
            }
        };
        self.pending = Some(slot);
        Ok(())
    }

    /// Where the next child value goes
    pub(crate) fn placement(&self) -> Placement {
        if self.discard {
            return Placement::Discarded;
        }
        match (&self.target, &self.pending) {
            (Target::Record { record, .. }, Some(Slot::Field(i))) => {
                Placement::Field(record.schema().fields[*i].kind)
            }
            (_, Some(Slot::Skip)) => Placement::Discarded,
            _ => Placement::ROOT,
        }
    }

    /// Assign the next child value
    pub(crate) fn assign(&mut self, value: Value) -> Result<()> {
        if self.is_complete() {
            return Err(SharkError::UnexpectedShape(format!(
                "container already holds its {} children",
                self.expected
            )));
        }

        match &mut self.target {
            Target::Array(array) => array.write_at(self.index, value)?,
            Target::Generic(object) => match self.pending.take() {
                Some(Slot::Entry(key)) => object.write_key(key, value)?,
                _ => return Err(missing_name()),
            },
            Target::Record { record, .. } => match self.pending.take() {
                Some(Slot::Field(i)) => *record.slot_mut(i) = value,
                Some(Slot::Entry(key)) => record.entries_mut().write_key(key, value)?,
                Some(Slot::Item) => record.items_mut().append_item(value)?,
                Some(Slot::Skip) => {}
                None => return Err(missing_name()),
            },
        }
        self.index += 1;
        Ok(())
    }

    /// Turn the filled container into its value
    pub(crate) fn finish(self) -> Value {
        trace!(children = self.index, "container closed");
        match self.target {
            Target::Array(array) => Value::Array(array),
            Target::Generic(object) => Value::Generic(object),
            Target::Record { record, .. } => Value::Record(record),
        }
    }
}

fn missing_name() -> SharkError {
    SharkError::UnexpectedShape("object child is not a property".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::types::{FieldDescriptor, TypeSchema};

    fn catalog() -> (Catalog, crate::types::TypeHandle, crate::types::TypeHandle) {
        let mut catalog = Catalog::new();
        let bag = catalog
            .register(TypeSchema::new("Bag").field("label"))
            .unwrap();
        let holder = catalog
            .register(
                TypeSchema::new("Holder")
                    .with_field(FieldDescriptor::map("lookup"))
                    .field("plain"),
            )
            .unwrap();
        (catalog, bag, holder)
    }

    #[test]
    fn test_array_assignment() {
        let mut container = Container::array(TypeRef::I32, 2, Placement::ROOT);
        container.assign(Value::Int(1)).unwrap();
        assert!(!container.is_complete());
        container.assign(Value::Int(2)).unwrap();
        assert!(container.is_complete());
        assert_eq!(
            container.finish(),
            Value::Array(Array::from_items(TypeRef::I32, [1, 2]))
        );
    }

    #[test]
    fn test_property_in_array_is_rejected() {
        let mut container = Container::array(TypeRef::Any, 1, Placement::ROOT);
        match container.accept_name("x".to_string()) {
            Err(SharkError::UnexpectedShape(_)) => {}
            other => panic!("expected UnexpectedShape, got {other:?}"),
        }
    }

    #[test]
    fn test_value_without_name_is_rejected() {
        let (catalog, bag, _) = catalog();
        let mut container =
            Container::object(ObjectKind::Record(bag), 1, Placement::ROOT, &catalog).unwrap();
        match container.assign(Value::Null) {
            Err(SharkError::UnexpectedShape(_)) => {}
            other => panic!("expected UnexpectedShape, got {other:?}"),
        }
    }

    #[test]
    fn test_map_entry_requires_capability() {
        let (catalog, bag, _) = catalog();
        let mut container =
            Container::object(ObjectKind::Record(bag), 1, Placement::ROOT, &catalog).unwrap();
        match container.accept_name(":m:a".to_string()) {
            Err(SharkError::MissingCapability {
                type_name,
                capability: "map",
            }) => assert_eq!(type_name, "Bag"),
            other => panic!("expected MissingCapability, got {other:?}"),
        }
    }

    #[test]
    fn test_map_field_grants_capability() {
        let (catalog, bag, holder) = catalog();
        let mut parent =
            Container::object(ObjectKind::Record(holder), 1, Placement::ROOT, &catalog).unwrap();
        parent.accept_name("lookup".to_string()).unwrap();
        assert_eq!(parent.placement(), Placement::Field(FieldKind::Map));

        let mut child =
            Container::object(ObjectKind::Record(bag), 1, parent.placement(), &catalog).unwrap();
        child.accept_name(":m:a".to_string()).unwrap();
        child.assign(Value::Int(1)).unwrap();
        let bag_value = child.finish();
        match &bag_value {
            Value::Record(record) => {
                assert_eq!(record.entries().get("a"), Some(&Value::Int(1)));
            }
            other => panic!("expected record, got {other:?}"),
        }

        parent.assign(bag_value).unwrap();
        assert!(parent.is_complete());
    }

    #[test]
    fn test_unknown_field_is_skipped() {
        let (catalog, bag, _) = catalog();
        let mut container =
            Container::object(ObjectKind::Record(bag), 2, Placement::ROOT, &catalog).unwrap();
        container.accept_name("renamed".to_string()).unwrap();
        container.assign(Value::from("ignored")).unwrap();
        container.accept_name("label".to_string()).unwrap();
        container.assign(Value::from("kept")).unwrap();

        match container.finish() {
            Value::Record(record) => {
                assert_eq!(record.get("label"), Some(&Value::from("kept")));
            }
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn test_skipped_field_accepts_any_content() {
        let (catalog, bag, holder) = catalog();
        let mut parent =
            Container::object(ObjectKind::Record(holder), 1, Placement::ROOT, &catalog).unwrap();
        parent.accept_name("gone".to_string()).unwrap();
        assert_eq!(parent.placement(), Placement::Discarded);

        let mut child =
            Container::object(ObjectKind::Record(bag), 2, parent.placement(), &catalog).unwrap();
        child.accept_name(":m:a".to_string()).unwrap();
        assert_eq!(child.placement(), Placement::Discarded);
        child.assign(Value::Int(1)).unwrap();
        child.accept_name(":ci:".to_string()).unwrap();
        child.assign(Value::Int(2)).unwrap();

        parent.assign(child.finish()).unwrap();
        match parent.finish() {
            Value::Record(record) => assert_eq!(record.get("lookup"), Some(&Value::Null)),
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn test_overfull_container_is_rejected() {
        let mut container = Container::array(TypeRef::Any, 0, Placement::ROOT);
        assert!(container.is_complete());
        assert!(container.assign(Value::Null).is_err());
    }
}
