//! Storage adapter: CRUD and pagination passthrough.
//!
//! The admin layer is generic over any registered model, so objects cross
//! this boundary as `serde_json::Value` maps keyed by field name. The
//! [`ModelStore`] trait is the contract a storage engine implements;
//! [`ModelAdapter`] pairs one [`ModelInfo`] with a store and exposes the
//! operation set the admin layer consumes, including the paginated list
//! shape `(page_count, objects)`.
//!
//! [`InMemoryModelStore`] is the default implementation, suitable for
//! testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use overseer_core::{StoreError, StoreErrorKind};

use crate::reflection::ModelInfo;

/// An ordering directive for list queries.
///
/// Mirrors the sort/sort-reverse pair the admin UI sends; when the UI sends
/// nothing, ordering falls back to the primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// The field to order by.
    pub field: String,
    /// Whether to reverse into descending order.
    pub descending: bool,
}

impl SortSpec {
    /// Creates a sort spec.
    pub fn new(field: impl Into<String>, descending: bool) -> Self {
        Self {
            field: field.into(),
            descending,
        }
    }

    /// The default ordering: ascending primary key.
    pub fn by_id() -> Self {
        Self::new("id", false)
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::by_id()
    }
}

/// The storage engine contract for model objects.
///
/// Implementations report failures as structured [`StoreError`]s; reads
/// against a table that does not exist use
/// [`StoreErrorKind::SchemaMissing`](overseer_core::StoreErrorKind::SchemaMissing).
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Fetches one object by primary key.
    async fn get(&self, model: &ModelInfo, id: i64) -> Result<Option<Value>, StoreError>;

    /// Fetches the objects whose primary keys appear in `ids`.
    async fn get_bulk(&self, model: &ModelInfo, ids: &[i64]) -> Result<Vec<Value>, StoreError>;

    /// Counts the objects in the model's table.
    async fn count(&self, model: &ModelInfo) -> Result<usize, StoreError>;

    /// Lists objects in sort order, skipping `offset` and returning at most
    /// `limit` when given.
    async fn all(
        &self,
        model: &ModelInfo,
        sort: &SortSpec,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Value>, StoreError>;

    /// Creates an object from field values, returning it with its generated
    /// primary key.
    async fn create(
        &self,
        model: &ModelInfo,
        data: &HashMap<String, Value>,
    ) -> Result<Value, StoreError>;

    /// Merges field values into an existing object, returning the result.
    async fn update(
        &self,
        model: &ModelInfo,
        id: i64,
        data: &HashMap<String, Value>,
    ) -> Result<Value, StoreError>;

    /// Deletes the objects whose primary keys appear in `ids`, returning how
    /// many were removed.
    async fn destroy(&self, model: &ModelInfo, ids: &[i64]) -> Result<usize, StoreError>;
}

/// One model bound to a store: the operation surface the admin layer uses.
pub struct ModelAdapter<'a> {
    info: &'a ModelInfo,
    store: &'a dyn ModelStore,
}

impl<'a> ModelAdapter<'a> {
    /// Binds a model's reflection data to a storage engine.
    pub const fn new(info: &'a ModelInfo, store: &'a dyn ModelStore) -> Self {
        Self { info, store }
    }

    /// The model's reflection data.
    pub const fn info(&self) -> &ModelInfo {
        self.info
    }

    /// The model's display name.
    pub fn pretty_name(&self) -> String {
        self.info.pretty_name()
    }

    /// Fetches one object by primary key.
    pub async fn get(&self, id: i64) -> Result<Option<Value>, StoreError> {
        self.store.get(self.info, id).await
    }

    /// Fetches the objects whose primary keys appear in `ids`.
    pub async fn get_bulk(&self, ids: &[i64]) -> Result<Vec<Value>, StoreError> {
        self.store.get_bulk(self.info, ids).await
    }

    /// Counts the objects in the model's table.
    pub async fn count(&self) -> Result<usize, StoreError> {
        self.store.count(self.info).await
    }

    /// The first object in sort order, if any.
    pub async fn first(&self, sort: &SortSpec) -> Result<Option<Value>, StoreError> {
        let mut objects = self.store.all(self.info, sort, 0, Some(1)).await?;
        Ok(objects.pop())
    }

    /// All objects in sort order.
    pub async fn all(&self, sort: &SortSpec) -> Result<Vec<Value>, StoreError> {
        self.store.all(self.info, sort, 0, None).await
    }

    /// One page of objects plus the total page count.
    ///
    /// `page` is 1-indexed; `page_count = ceil(count / per_page)`.
    pub async fn paginated(
        &self,
        page: usize,
        per_page: usize,
        sort: &SortSpec,
    ) -> Result<(usize, Vec<Value>), StoreError> {
        let per_page = per_page.max(1);
        let page = page.max(1);
        let count = self.count().await?;
        let page_count = count.div_ceil(per_page);
        let objects = self
            .store
            .all(self.info, sort, (page - 1) * per_page, Some(per_page))
            .await?;
        Ok((page_count, objects))
    }

    /// Creates an object from field values.
    pub async fn create(&self, data: &HashMap<String, Value>) -> Result<Value, StoreError> {
        self.store.create(self.info, data).await
    }

    /// Merges field values into an existing object.
    pub async fn update(
        &self,
        id: i64,
        data: &HashMap<String, Value>,
    ) -> Result<Value, StoreError> {
        self.store.update(self.info, id, data).await
    }

    /// Deletes objects by primary key, returning how many were removed.
    pub async fn destroy(&self, ids: &[i64]) -> Result<usize, StoreError> {
        self.store.destroy(self.info, ids).await
    }
}

/// Storage for one model's table in the in-memory store.
#[derive(Debug, Default)]
struct Table {
    objects: Vec<Value>,
    next_id: i64,
}

impl Table {
    const fn new() -> Self {
        Self {
            objects: Vec::new(),
            next_id: 1,
        }
    }
}

/// In-memory implementation of [`ModelStore`].
///
/// Each model's table is a `Vec` of JSON objects with auto-incrementing
/// integer primary keys, behind `Arc<RwLock>`. Reads against a table that
/// was never created report `SchemaMissing`; `create` installs the table
/// on first use, and [`create_table`](Self::create_table) installs an
/// empty one up front.
#[derive(Debug, Clone, Default)]
pub struct InMemoryModelStore {
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl InMemoryModelStore {
    /// Creates an empty store with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs an empty table.
    pub fn create_table(&self, table_name: &str) {
        let mut tables = self.tables.write().unwrap();
        tables.entry(table_name.to_string()).or_insert_with(Table::new);
    }

    /// Returns `true` when the table exists.
    pub fn has_table(&self, table_name: &str) -> bool {
        let tables = self.tables.read().unwrap();
        tables.contains_key(table_name)
    }

    fn missing(table_name: &str) -> StoreError {
        StoreError::schema_missing(format!("no such table: {table_name}"))
    }

    /// Runs `f` over a model's objects, erroring when the table is absent.
    fn with_table<T>(
        &self,
        model: &ModelInfo,
        f: impl FnOnce(&[Value]) -> T,
    ) -> Result<T, StoreError> {
        let tables = self.tables.read().unwrap();
        tables
            .get(&model.table_name)
            .map(|t| f(&t.objects))
            .ok_or_else(|| Self::missing(&model.table_name))
    }
}

/// Extracts an object's integer primary key.
fn object_id(object: &Value) -> Option<i64> {
    object.get("id").and_then(Value::as_i64)
}

/// Compares two field values for ordering purposes.
fn json_cmp(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(x), Value::Number(y)) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => a.to_string().cmp(&b.to_string()),
        },
    }
}

/// Sorts objects by a field, reversing for descending order.
fn sort_objects(objects: &mut [Value], sort: &SortSpec) {
    objects.sort_by(|a, b| {
        let cmp = json_cmp(a.get(&sort.field), b.get(&sort.field));
        if sort.descending {
            cmp.reverse()
        } else {
            cmp
        }
    });
}

#[async_trait]
impl ModelStore for InMemoryModelStore {
    async fn get(&self, model: &ModelInfo, id: i64) -> Result<Option<Value>, StoreError> {
        self.with_table(model, |objects| {
            objects
                .iter()
                .find(|obj| object_id(obj) == Some(id))
                .cloned()
        })
    }

    async fn get_bulk(&self, model: &ModelInfo, ids: &[i64]) -> Result<Vec<Value>, StoreError> {
        self.with_table(model, |objects| {
            objects
                .iter()
                .filter(|obj| object_id(obj).is_some_and(|id| ids.contains(&id)))
                .cloned()
                .collect()
        })
    }

    async fn count(&self, model: &ModelInfo) -> Result<usize, StoreError> {
        self.with_table(model, <[Value]>::len)
    }

    async fn all(
        &self,
        model: &ModelInfo,
        sort: &SortSpec,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Value>, StoreError> {
        let mut objects = self.with_table(model, <[Value]>::to_vec)?;
        sort_objects(&mut objects, sort);
        let sliced: Vec<Value> = objects
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .collect();
        Ok(sliced)
    }

    #[allow(clippy::significant_drop_tightening)]
    async fn create(
        &self,
        model: &ModelInfo,
        data: &HashMap<String, Value>,
    ) -> Result<Value, StoreError> {
        let mut tables = self.tables.write().unwrap();
        let table = tables
            .entry(model.table_name.clone())
            .or_insert_with(Table::new);

        let mut object = serde_json::Map::new();
        object.insert("id".to_string(), serde_json::json!(table.next_id));
        table.next_id += 1;
        for (key, value) in data {
            object.insert(key.clone(), value.clone());
        }

        let object = Value::Object(object);
        table.objects.push(object.clone());
        Ok(object)
    }

    #[allow(clippy::significant_drop_tightening)]
    async fn update(
        &self,
        model: &ModelInfo,
        id: i64,
        data: &HashMap<String, Value>,
    ) -> Result<Value, StoreError> {
        let mut tables = self.tables.write().unwrap();
        let table = tables
            .get_mut(&model.table_name)
            .ok_or_else(|| Self::missing(&model.table_name))?;
        let object = table
            .objects
            .iter_mut()
            .find(|obj| object_id(obj) == Some(id))
            .ok_or_else(|| {
                StoreError::new(
                    StoreErrorKind::Constraint,
                    format!("no {} row with id {id}", model.table_name),
                )
            })?;
        if let Value::Object(map) = object {
            for (key, value) in data {
                map.insert(key.clone(), value.clone());
            }
        }
        Ok(object.clone())
    }

    #[allow(clippy::significant_drop_tightening)]
    async fn destroy(&self, model: &ModelInfo, ids: &[i64]) -> Result<usize, StoreError> {
        let mut tables = self.tables.write().unwrap();
        let table = tables
            .get_mut(&model.table_name)
            .ok_or_else(|| Self::missing(&model.table_name))?;
        let before = table.objects.len();
        table
            .objects
            .retain(|obj| !object_id(obj).is_some_and(|id| ids.contains(&id)));
        Ok(before - table.objects.len())
    }
}
