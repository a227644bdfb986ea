//! Sparse-set component storage keyed by entity identifier.
//!
//! Each component type gets its own table, registered the first time a value
//! of that type is added. The store walks the registry for destruction and
//! enumeration, so introducing a component type never requires touching a
//! hand-maintained list.

use std::{
    any::{Any, TypeId},
    collections::{BTreeSet, HashMap},
    fmt::Debug,
};

use driftlands_core::Entity;

/// Data that can be attached to an entity.
pub trait Component: Debug + 'static {
    /// Whether holding this component makes an entity visible to [`Store::all`].
    const IDENTITY: bool = false;
}

/// Debug readout of a single component attached to an entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentReadout {
    /// Short type name of the component.
    pub component: &'static str,
    /// `Debug` rendering of the component value.
    pub value: String,
}

#[derive(Debug)]
struct Table<T> {
    dense: Vec<(Entity, T)>,
    slots: Vec<Option<usize>>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            dense: Vec::new(),
            slots: Vec::new(),
        }
    }
}

impl<T> Table<T> {
    fn slot(&self, entity: Entity) -> Option<usize> {
        let index = usize::try_from(entity.get()).ok()?;
        self.slots.get(index).copied().flatten()
    }

    fn insert(&mut self, entity: Entity, value: T) {
        if let Some(position) = self.slot(entity) {
            self.dense[position].1 = value;
            return;
        }
        let Ok(index) = usize::try_from(entity.get()) else {
            return;
        };
        if self.slots.len() <= index {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = Some(self.dense.len());
        self.dense.push((entity, value));
    }

    fn get(&self, entity: Entity) -> Option<&T> {
        let position = self.slot(entity)?;
        self.dense.get(position).map(|(_, value)| value)
    }

    fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let position = self.slot(entity)?;
        self.dense.get_mut(position).map(|(_, value)| value)
    }

    fn remove(&mut self, entity: Entity) -> Option<T> {
        let position = self.slot(entity)?;
        let index = usize::try_from(entity.get()).ok()?;
        self.slots[index] = None;
        let (_, value) = self.dense.swap_remove(position);
        if let Some((moved, _)) = self.dense.get(position) {
            if let Some(slot) = usize::try_from(moved.get())
                .ok()
                .and_then(|moved_index| self.slots.get_mut(moved_index))
            {
                *slot = Some(position);
            }
        }
        Some(value)
    }
}

trait AnyTable: Debug {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn erase(&mut self, entity: Entity) -> bool;
    fn contains(&self, entity: Entity) -> bool;
    fn identity(&self) -> bool;
    fn entities(&self) -> Box<dyn Iterator<Item = Entity> + '_>;
    fn describe(&self, entity: Entity) -> Option<ComponentReadout>;
}

impl<T: Component> AnyTable for Table<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn erase(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.slot(entity).is_some()
    }

    fn identity(&self) -> bool {
        T::IDENTITY
    }

    fn entities(&self) -> Box<dyn Iterator<Item = Entity> + '_> {
        Box::new(self.dense.iter().map(|(entity, _)| *entity))
    }

    fn describe(&self, entity: Entity) -> Option<ComponentReadout> {
        let value = self.get(entity)?;
        Some(ComponentReadout {
            component: short_type_name::<T>(),
            value: format!("{value:?}"),
        })
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Owner of every component value, grouped into one table per component type.
#[derive(Debug, Default)]
pub struct Store {
    next_entity: u64,
    tables: HashMap<TypeId, Box<dyn AnyTable>>,
}

impl Store {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh entity identifier. Identifiers are never reused.
    pub fn create(&mut self) -> Entity {
        let entity = Entity::new(self.next_entity);
        self.next_entity += 1;
        entity
    }

    /// Inserts or replaces the `T` component of the entity.
    pub fn add<T: Component>(&mut self, entity: Entity, value: T) {
        if let Some(table) = self.table_mut::<T>() {
            table.insert(entity, value);
            return;
        }
        let mut table = Table::<T>::default();
        table.insert(entity, value);
        let _ = self.tables.insert(TypeId::of::<T>(), Box::new(table));
    }

    /// Looks up the `T` component of the entity.
    #[must_use]
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.table::<T>()?.get(entity)
    }

    /// Looks up the `T` component of the entity for mutation.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.table_mut::<T>()?.get_mut(entity)
    }

    /// Reports whether the entity carries a `T` component.
    #[must_use]
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.get::<T>(entity).is_some()
    }

    /// Detaches and returns the `T` component of the entity.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        self.table_mut::<T>()?.remove(entity)
    }

    /// Entities holding at least one identity-bearing component, in ascending order.
    #[must_use]
    pub fn all(&self) -> Vec<Entity> {
        let live: BTreeSet<Entity> = self
            .tables
            .values()
            .filter(|table| table.identity())
            .flat_map(|table| table.entities())
            .collect();
        live.into_iter().collect()
    }

    /// Removes the entity from every registered table.
    pub fn destroy(&mut self, entity: Entity) {
        let mut removed = 0usize;
        for table in self.tables.values_mut() {
            if table.erase(entity) {
                removed += 1;
            }
        }
        tracing::trace!(entity = entity.get(), components = removed, "destroyed entity");
    }

    /// Iterates every `(entity, component)` pair of type `T`.
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.table::<T>()
            .into_iter()
            .flat_map(|table| table.dense.iter().map(|(entity, value)| (*entity, value)))
    }

    /// Iterates every `(entity, component)` pair of type `T` for mutation.
    pub fn iter_mut<T: Component>(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.table_mut::<T>().into_iter().flat_map(|table| {
            table
                .dense
                .iter_mut()
                .map(|(entity, value)| (*entity, value))
        })
    }

    /// Snapshot of the entities currently holding a `T` component.
    #[must_use]
    pub fn entities_with<T: Component>(&self) -> Vec<Entity> {
        self.iter::<T>().map(|(entity, _)| entity).collect()
    }

    /// Debug readouts of every component attached to the entity, sorted by name.
    #[must_use]
    pub fn describe(&self, entity: Entity) -> Vec<ComponentReadout> {
        let mut readouts: Vec<ComponentReadout> = self
            .tables
            .values()
            .filter(|table| table.contains(entity))
            .filter_map(|table| table.describe(entity))
            .collect();
        readouts.sort_by(|left, right| left.component.cmp(right.component));
        readouts
    }

    fn table<T: Component>(&self) -> Option<&Table<T>> {
        self.tables
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<Table<T>>()
    }

    fn table_mut<T: Component>(&mut self) -> Option<&mut Table<T>> {
        self.tables
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<Table<T>>()
    }
}
