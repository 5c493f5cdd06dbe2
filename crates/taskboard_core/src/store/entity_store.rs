//! Entity store: validated CRUD over locked in-memory tables.
//!
//! # Responsibility
//! - Apply schema validation and relationship constraints on every write.
//! - Assign surrogate ids, maintain secondary indexes, emit change events.
//! - Plan and apply cascade/restrict/set-null delete policies.
//!
//! # Invariants
//! - Registration (`register_entity`/`register_relation`) happens before the
//!   store is shared; operations take `&self` and rely on per-table locks.
//! - Every operation acquires its full lock set up front, tables first in
//!   alphabetical order, then join sets in alphabetical order.
//! - Validate-then-write runs inside one lock scope; every exit path
//!   releases locks before observers run.
//! - A rejected delete (restrict, cycle) mutates nothing: the cascade is
//!   fully planned before the first row is touched.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::record::{Record, RecordId};
use crate::model::schema::{EntitySchema, FieldViolation, SchemaError};
use crate::model::value::{FieldMap, FieldValue};
use crate::relation::registry::{
    OnDelete, Relation, RelationError, RelationKind, RelationRegistry,
};
use crate::store::events::{ChangeEvent, ChangeObserver, ChangeOp, ObserverRegistry};
use crate::store::table::EntityTable;
use chrono::Utc;
use log::info;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

/// Result type used by every store operation.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No schema registered under this entity name.
    UnknownEntity { entity: String },
    /// Entity has no such field.
    UnknownField { entity: String, field: String },
    /// No many-to-many relation registered under this join name.
    UnknownJoin { join: String },
    /// No record with this id.
    NotFound { entity: String, id: RecordId },
    /// Candidate fields failed validation; every violation is listed.
    Validation {
        entity: String,
        violations: Vec<FieldViolation>,
    },
    /// A unique field already holds this value on another record.
    DuplicateValue { entity: String, field: String },
    /// A reference points at a record that does not exist.
    DanglingReference {
        field: String,
        target: String,
        id: RecordId,
    },
    /// Restrict policy blocked a delete while children exist.
    ReferencedByChildren {
        entity: String,
        id: RecordId,
        child_entity: String,
        count: usize,
    },
    /// Cascade traversal re-entered a record already on the active path.
    CascadeCycle { path: Vec<String> },
    /// A table or join lock could not be acquired within the bounded wait.
    LockTimeout { table: String },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownEntity { entity } => write!(f, "unknown entity `{entity}`"),
            Self::UnknownField { entity, field } => {
                write!(f, "entity `{entity}` has no field `{field}`")
            }
            Self::UnknownJoin { join } => write!(f, "unknown join `{join}`"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Validation { entity, violations } => {
                write!(f, "validation failed for `{entity}`:")?;
                for violation in violations {
                    write!(f, " [{violation}]")?;
                }
                Ok(())
            }
            Self::DuplicateValue { entity, field } => {
                write!(f, "duplicate value for unique field `{entity}.{field}`")
            }
            Self::DanglingReference { field, target, id } => {
                write!(f, "reference `{field}` points at missing {target} record {id}")
            }
            Self::ReferencedByChildren {
                entity,
                id,
                child_entity,
                count,
            } => write!(
                f,
                "cannot delete {entity} {id}: referenced by {count} {child_entity} record(s)"
            ),
            Self::CascadeCycle { path } => {
                write!(f, "cascade cycle detected: {}", path.join(" -> "))
            }
            Self::LockTimeout { table } => {
                write!(f, "timed out waiting for lock on `{table}`")
            }
        }
    }
}

impl Error for StoreError {}

/// Store tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    /// Bounded wait for any table/join lock before `LockTimeout`.
    pub lock_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
        }
    }
}

/// Read or write guard over one entity table.
enum TableGuard<'a> {
    Read(RwLockReadGuard<'a, EntityTable>),
    Write(RwLockWriteGuard<'a, EntityTable>),
}

impl TableGuard<'_> {
    fn table(&self) -> &EntityTable {
        match self {
            Self::Read(guard) => &**guard,
            Self::Write(guard) => &**guard,
        }
    }

    fn table_mut(&mut self) -> Option<&mut EntityTable> {
        match self {
            Self::Read(_) => None,
            Self::Write(guard) => Some(&mut **guard),
        }
    }
}

/// One step of a fully planned delete.
enum PlannedOp {
    Delete {
        entity: String,
        id: RecordId,
    },
    ClearReference {
        entity: String,
        id: RecordId,
        field: String,
    },
}

/// In-memory, lock-scoped entity store.
pub struct EntityStore {
    schemas: BTreeMap<String, Arc<EntitySchema>>,
    relations: RelationRegistry,
    tables: BTreeMap<String, RwLock<EntityTable>>,
    joins: BTreeMap<String, RwLock<BTreeSet<(RecordId, RecordId)>>>,
    observers: ObserverRegistry,
    lock_timeout: Duration,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            schemas: BTreeMap::new(),
            relations: RelationRegistry::new(),
            tables: BTreeMap::new(),
            joins: BTreeMap::new(),
            observers: ObserverRegistry::default(),
            lock_timeout: config.lock_timeout,
        }
    }

    /// Registers one entity schema and creates its table.
    pub fn register_entity(&mut self, schema: EntitySchema) -> Result<(), SchemaError> {
        let entity = schema.entity().to_string();
        if self.schemas.contains_key(&entity) {
            return Err(SchemaError::DuplicateEntity { entity });
        }
        self.tables
            .insert(entity.clone(), RwLock::new(EntityTable::new(&schema)));
        self.schemas.insert(entity.clone(), Arc::new(schema));
        info!("event=entity_registered module=store status=ok entity={entity}");
        Ok(())
    }

    /// Registers one relation; many-to-many relations get their join set.
    pub fn register_relation(&mut self, relation: Relation) -> Result<(), RelationError> {
        let join_name = match relation.kind() {
            RelationKind::ManyToMany { join } => Some(join.clone()),
            RelationKind::OneToMany { .. } => None,
        };
        let relation_name = relation.name().to_string();
        self.relations.register(relation, &self.schemas)?;
        if let Some(join) = join_name {
            self.joins.insert(join, RwLock::new(BTreeSet::new()));
        }
        info!("event=relation_registered module=store status=ok relation={relation_name}");
        Ok(())
    }

    /// Registers a change observer. Delivery order follows registration.
    pub fn subscribe(&self, observer: Arc<dyn ChangeObserver>) {
        self.observers.register(observer);
    }

    /// Registered schema for one entity kind.
    pub fn schema(&self, entity: &str) -> StoreResult<&Arc<EntitySchema>> {
        self.schemas.get(entity).ok_or_else(|| StoreError::UnknownEntity {
            entity: entity.to_string(),
        })
    }

    /// Creates a record using the wall clock.
    pub fn create(&self, entity: &str, fields: FieldMap) -> StoreResult<Record> {
        self.create_at(entity, fields, now_ms())
    }

    /// Creates a record with an explicit "now" (validation anchor and
    /// timestamps), for deterministic callers and tests.
    pub fn create_at(&self, entity: &str, fields: FieldMap, now_ms: i64) -> StoreResult<Record> {
        let schema = self.schema(entity)?.clone();
        let foreign_keys = self.relations.foreign_keys_of(entity);

        let mut plan: BTreeMap<String, bool> = BTreeMap::new();
        plan.insert(entity.to_string(), true);
        for relation in &foreign_keys {
            plan.entry(relation.source().to_string()).or_insert(false);
        }
        let mut guards = self.acquire(&plan)?;

        let validated = schema
            .validate_record(&fields, now_ms)
            .map_err(|violations| StoreError::Validation {
                entity: entity.to_string(),
                violations,
            })?;
        check_foreign_keys(&validated, &foreign_keys, &guards)?;
        check_unique(&schema, guards_table(&guards, entity)?, &validated, None)?;

        let record = guards_table_mut(&mut guards, entity)?.insert(entity, validated, now_ms);
        drop(guards);

        self.observers.notify(&ChangeEvent {
            entity: entity.to_string(),
            id: record.id,
            op: ChangeOp::Create,
        });
        Ok(record)
    }

    /// Applies a partial update using the wall clock.
    pub fn update(&self, entity: &str, id: RecordId, patch: FieldMap) -> StoreResult<Record> {
        self.update_at(entity, id, patch, now_ms())
    }

    /// Applies a partial update with an explicit "now".
    ///
    /// The patch is merged over the stored fields and the merged record is
    /// re-validated; date-anchored rules only run for patched fields.
    pub fn update_at(
        &self,
        entity: &str,
        id: RecordId,
        patch: FieldMap,
        now_ms: i64,
    ) -> StoreResult<Record> {
        let schema = self.schema(entity)?.clone();
        let foreign_keys = self.relations.foreign_keys_of(entity);

        let mut plan: BTreeMap<String, bool> = BTreeMap::new();
        plan.insert(entity.to_string(), true);
        for relation in &foreign_keys {
            plan.entry(relation.source().to_string()).or_insert(false);
        }
        let mut guards = self.acquire(&plan)?;

        let existing = guards_table(&guards, entity)?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: entity.to_string(),
                id,
            })?;
        let validated = schema
            .validate_update(&existing.fields, &patch, now_ms)
            .map_err(|violations| StoreError::Validation {
                entity: entity.to_string(),
                violations,
            })?;
        check_foreign_keys(&validated, &foreign_keys, &guards)?;
        check_unique(&schema, guards_table(&guards, entity)?, &validated, Some(id))?;

        let record = guards_table_mut(&mut guards, entity)?
            .replace(id, validated, now_ms)
            .ok_or_else(|| StoreError::NotFound {
                entity: entity.to_string(),
                id,
            })?;
        drop(guards);

        self.observers.notify(&ChangeEvent {
            entity: entity.to_string(),
            id,
            op: ChangeOp::Update,
        });
        Ok(record)
    }

    /// Deletes a record using the wall clock for set-null touch times.
    pub fn delete(&self, entity: &str, id: RecordId) -> StoreResult<()> {
        self.delete_at(entity, id, now_ms())
    }

    /// Deletes a record, applying each relation's delete policy.
    ///
    /// The full cascade is planned first (depth-first, cycle-checked,
    /// restrict-checked); only a fully valid plan mutates anything.
    pub fn delete_at(&self, entity: &str, id: RecordId, now_ms: i64) -> StoreResult<()> {
        let _ = self.schema(entity)?;

        let affected = self.delete_closure(entity);
        let mut plan: BTreeMap<String, bool> = BTreeMap::new();
        for table in &affected {
            plan.insert(table.clone(), true);
        }
        let mut guards = self.acquire(&plan)?;

        let mut join_names: BTreeSet<String> = BTreeSet::new();
        for table in &affected {
            for relation in self.relations.joins_of(table) {
                if let RelationKind::ManyToMany { join } = relation.kind() {
                    join_names.insert(join.clone());
                }
            }
        }
        let mut join_guards = BTreeMap::new();
        for join in &join_names {
            join_guards.insert(join.clone(), self.write_join(join)?);
        }

        if !guards_table(&guards, entity)?.contains(id) {
            return Err(StoreError::NotFound {
                entity: entity.to_string(),
                id,
            });
        }

        let mut planned = Vec::new();
        let mut on_path = Vec::new();
        let mut visited = BTreeSet::new();
        self.plan_delete(entity, id, &guards, &mut on_path, &mut visited, &mut planned)?;

        let mut events = Vec::new();
        for op in &planned {
            match op {
                PlannedOp::Delete { entity, id } => {
                    if guards_table_mut(&mut guards, entity)?.remove(*id).is_some() {
                        for relation in self.relations.joins_of(entity) {
                            if let RelationKind::ManyToMany { join } = relation.kind() {
                                if let Some(pairs) = join_guards.get_mut(join) {
                                    purge_join_pairs(pairs, relation, entity, *id);
                                }
                            }
                        }
                        events.push(ChangeEvent {
                            entity: entity.clone(),
                            id: *id,
                            op: ChangeOp::Delete,
                        });
                    }
                }
                PlannedOp::ClearReference { entity, id, field } => {
                    let table = guards_table_mut(&mut guards, entity)?;
                    // The row may already be gone when another branch of the
                    // same cascade deleted it.
                    if let Some(existing) = table.get(*id).cloned() {
                        let mut fields = existing.fields;
                        fields.insert(field.clone(), FieldValue::Null);
                        table.replace(*id, fields, now_ms);
                        events.push(ChangeEvent {
                            entity: entity.clone(),
                            id: *id,
                            op: ChangeOp::Update,
                        });
                    }
                }
            }
        }

        drop(join_guards);
        drop(guards);
        for event in &events {
            self.observers.notify(event);
        }
        Ok(())
    }

    /// Fetches one record by id.
    pub fn get(&self, entity: &str, id: RecordId) -> StoreResult<Record> {
        let guard = self.read_table(entity)?;
        guard.get(id).cloned().ok_or_else(|| StoreError::NotFound {
            entity: entity.to_string(),
            id,
        })
    }

    /// Equality lookup over one field.
    ///
    /// Uses the field's secondary index when it is declared unique or
    /// indexed, and falls back to a full scan otherwise. The probe value is
    /// normalized with the field's declared transforms first.
    pub fn find_by(
        &self,
        entity: &str,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> StoreResult<Vec<Record>> {
        let schema = self.schema(entity)?.clone();
        let Some(spec) = schema.field(field) else {
            return Err(StoreError::UnknownField {
                entity: entity.to_string(),
                field: field.to_string(),
            });
        };
        let probe = spec.normalize_value(value.into());

        let guard = self.read_table(entity)?;
        let records = guard
            .find_ids(field, &probe)
            .into_iter()
            .filter_map(|id| guard.get(id).cloned())
            .collect();
        Ok(records)
    }

    /// Every record of one entity kind, in ascending id order.
    pub fn list(&self, entity: &str) -> StoreResult<Vec<Record>> {
        let guard = self.read_table(entity)?;
        Ok(guard.rows().cloned().collect())
    }

    /// Number of records of one entity kind.
    pub fn count(&self, entity: &str) -> StoreResult<usize> {
        Ok(self.read_table(entity)?.len())
    }

    /// Adds a many-to-many membership pair. Idempotent: re-adding an
    /// existing pair is a no-op reported as `Ok(false)`.
    pub fn link(&self, join: &str, source_id: RecordId, target_id: RecordId) -> StoreResult<bool> {
        let relation = self.join_relation(join)?.clone();

        let mut plan: BTreeMap<String, bool> = BTreeMap::new();
        plan.insert(relation.source().to_string(), false);
        plan.insert(relation.target().to_string(), false);
        let guards = self.acquire(&plan)?;

        if !guards_table(&guards, relation.source())?.contains(source_id) {
            return Err(StoreError::DanglingReference {
                field: join.to_string(),
                target: relation.source().to_string(),
                id: source_id,
            });
        }
        if !guards_table(&guards, relation.target())?.contains(target_id) {
            return Err(StoreError::DanglingReference {
                field: join.to_string(),
                target: relation.target().to_string(),
                id: target_id,
            });
        }

        let mut pairs = self.write_join(join)?;
        Ok(pairs.insert((source_id, target_id)))
    }

    /// Removes a membership pair. Returns whether the pair existed.
    pub fn unlink(
        &self,
        join: &str,
        source_id: RecordId,
        target_id: RecordId,
    ) -> StoreResult<bool> {
        let _ = self.join_relation(join)?;
        let mut pairs = self.write_join(join)?;
        Ok(pairs.remove(&(source_id, target_id)))
    }

    /// Target ids linked from one source record, ascending.
    pub fn links_of(&self, join: &str, source_id: RecordId) -> StoreResult<Vec<RecordId>> {
        let _ = self.join_relation(join)?;
        let pairs = self.read_join(join)?;
        Ok(pairs
            .iter()
            .filter(|pair| pair.0 == source_id)
            .map(|pair| pair.1)
            .collect())
    }

    /// Source ids linking to one target record, ascending.
    pub fn backlinks_of(&self, join: &str, target_id: RecordId) -> StoreResult<Vec<RecordId>> {
        let _ = self.join_relation(join)?;
        let pairs = self.read_join(join)?;
        Ok(pairs
            .iter()
            .filter(|pair| pair.1 == target_id)
            .map(|pair| pair.0)
            .collect())
    }

    fn join_relation(&self, join: &str) -> StoreResult<&Relation> {
        self.relations.join(join).ok_or_else(|| StoreError::UnknownJoin {
            join: join.to_string(),
        })
    }

    /// Entity tables a delete on `entity` may touch: the entity itself,
    /// every direct child (restrict counts, set-null writes), and the
    /// transitive closure through cascade edges.
    fn delete_closure(&self, entity: &str) -> BTreeSet<String> {
        let mut affected = BTreeSet::from([entity.to_string()]);
        let mut expanded = BTreeSet::new();
        let mut frontier = vec![entity.to_string()];

        while let Some(current) = frontier.pop() {
            if !expanded.insert(current.clone()) {
                continue;
            }
            for relation in self.relations.children_of(&current) {
                affected.insert(relation.target().to_string());
                if let RelationKind::OneToMany {
                    on_delete: OnDelete::Cascade,
                    ..
                } = relation.kind()
                {
                    frontier.push(relation.target().to_string());
                }
            }
        }
        affected
    }

    fn plan_delete(
        &self,
        entity: &str,
        id: RecordId,
        guards: &BTreeMap<String, TableGuard<'_>>,
        on_path: &mut Vec<(String, RecordId)>,
        visited: &mut BTreeSet<(String, RecordId)>,
        planned: &mut Vec<PlannedOp>,
    ) -> StoreResult<()> {
        if on_path.iter().any(|(e, i)| e == entity && *i == id) {
            let mut path: Vec<String> = on_path
                .iter()
                .map(|(e, i)| format!("{e}#{i}"))
                .collect();
            path.push(format!("{entity}#{id}"));
            return Err(StoreError::CascadeCycle { path });
        }
        if !visited.insert((entity.to_string(), id)) {
            return Ok(());
        }

        on_path.push((entity.to_string(), id));
        for relation in self.relations.children_of(entity) {
            let RelationKind::OneToMany {
                foreign_key,
                on_delete,
            } = relation.kind()
            else {
                continue;
            };
            let child = relation.target();
            let child_ids = match guards_table(guards, child) {
                Ok(table) => table.find_ids(foreign_key, &FieldValue::Int(id)),
                Err(error) => {
                    on_path.pop();
                    return Err(error);
                }
            };

            match on_delete {
                OnDelete::Restrict => {
                    if !child_ids.is_empty() {
                        on_path.pop();
                        return Err(StoreError::ReferencedByChildren {
                            entity: entity.to_string(),
                            id,
                            child_entity: child.to_string(),
                            count: child_ids.len(),
                        });
                    }
                }
                OnDelete::SetNull => {
                    for child_id in child_ids {
                        planned.push(PlannedOp::ClearReference {
                            entity: child.to_string(),
                            id: child_id,
                            field: foreign_key.clone(),
                        });
                    }
                }
                OnDelete::Cascade => {
                    for child_id in child_ids {
                        if let Err(error) =
                            self.plan_delete(child, child_id, guards, on_path, visited, planned)
                        {
                            on_path.pop();
                            return Err(error);
                        }
                    }
                }
            }
        }
        on_path.pop();

        planned.push(PlannedOp::Delete {
            entity: entity.to_string(),
            id,
        });
        Ok(())
    }

    /// Acquires table locks in alphabetical order with a bounded wait.
    /// `true` in the plan requests a write guard.
    fn acquire<'a>(
        &'a self,
        plan: &BTreeMap<String, bool>,
    ) -> StoreResult<BTreeMap<String, TableGuard<'a>>> {
        let mut guards = BTreeMap::new();
        for (entity, write) in plan {
            let lock = self.tables.get(entity).ok_or_else(|| StoreError::UnknownEntity {
                entity: entity.clone(),
            })?;
            let guard = if *write {
                TableGuard::Write(lock.try_write_for(self.lock_timeout).ok_or_else(|| {
                    StoreError::LockTimeout {
                        table: entity.clone(),
                    }
                })?)
            } else {
                TableGuard::Read(lock.try_read_for(self.lock_timeout).ok_or_else(|| {
                    StoreError::LockTimeout {
                        table: entity.clone(),
                    }
                })?)
            };
            guards.insert(entity.clone(), guard);
        }
        Ok(guards)
    }

    fn read_table(&self, entity: &str) -> StoreResult<RwLockReadGuard<'_, EntityTable>> {
        let lock = self.tables.get(entity).ok_or_else(|| StoreError::UnknownEntity {
            entity: entity.to_string(),
        })?;
        lock.try_read_for(self.lock_timeout)
            .ok_or_else(|| StoreError::LockTimeout {
                table: entity.to_string(),
            })
    }

    fn read_join(
        &self,
        join: &str,
    ) -> StoreResult<RwLockReadGuard<'_, BTreeSet<(RecordId, RecordId)>>> {
        let lock = self.joins.get(join).ok_or_else(|| StoreError::UnknownJoin {
            join: join.to_string(),
        })?;
        lock.try_read_for(self.lock_timeout)
            .ok_or_else(|| StoreError::LockTimeout {
                table: join.to_string(),
            })
    }

    fn write_join(
        &self,
        join: &str,
    ) -> StoreResult<RwLockWriteGuard<'_, BTreeSet<(RecordId, RecordId)>>> {
        let lock = self.joins.get(join).ok_or_else(|| StoreError::UnknownJoin {
            join: join.to_string(),
        })?;
        lock.try_write_for(self.lock_timeout)
            .ok_or_else(|| StoreError::LockTimeout {
                table: join.to_string(),
            })
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn guards_table<'g>(
    guards: &'g BTreeMap<String, TableGuard<'_>>,
    entity: &str,
) -> StoreResult<&'g EntityTable> {
    guards
        .get(entity)
        .map(TableGuard::table)
        .ok_or_else(|| StoreError::UnknownEntity {
            entity: entity.to_string(),
        })
}

fn guards_table_mut<'g, 'a>(
    guards: &'g mut BTreeMap<String, TableGuard<'a>>,
    entity: &str,
) -> StoreResult<&'g mut EntityTable> {
    guards
        .get_mut(entity)
        .and_then(TableGuard::table_mut)
        .ok_or_else(|| StoreError::UnknownEntity {
            entity: entity.to_string(),
        })
}

fn check_foreign_keys(
    validated: &FieldMap,
    foreign_keys: &[&Relation],
    guards: &BTreeMap<String, TableGuard<'_>>,
) -> StoreResult<()> {
    for relation in foreign_keys {
        let RelationKind::OneToMany { foreign_key, .. } = relation.kind() else {
            continue;
        };
        let Some(value) = validated.get(foreign_key) else {
            continue;
        };
        let Some(parent_id) = value.as_int() else {
            continue;
        };
        if !guards_table(guards, relation.source())?.contains(parent_id) {
            return Err(StoreError::DanglingReference {
                field: foreign_key.clone(),
                target: relation.source().to_string(),
                id: parent_id,
            });
        }
    }
    Ok(())
}

fn check_unique(
    schema: &EntitySchema,
    table: &EntityTable,
    validated: &FieldMap,
    exclude: Option<RecordId>,
) -> StoreResult<()> {
    for spec in schema.fields() {
        if !spec.is_unique() {
            continue;
        }
        if let Some(value) = validated.get(spec.name()) {
            if table.conflict(spec.name(), value, exclude).is_some() {
                return Err(StoreError::DuplicateValue {
                    entity: schema.entity().to_string(),
                    field: spec.name().to_string(),
                });
            }
        }
    }
    Ok(())
}

fn purge_join_pairs(
    pairs: &mut BTreeSet<(RecordId, RecordId)>,
    relation: &Relation,
    entity: &str,
    id: RecordId,
) {
    pairs.retain(|(source, target)| {
        let matches_source = relation.source() == entity && *source == id;
        let matches_target = relation.target() == entity && *target == id;
        !(matches_source || matches_target)
    });
}
