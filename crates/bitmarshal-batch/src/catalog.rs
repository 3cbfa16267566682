use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use bitmarshal::value::ValueKind;

use crate::error::{CatalogError, CatalogResult};

/// Declared metadata of one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMeta {
    pub name: String,
    pub kind: ValueKind,
    /// Store-assigned; never supplied by writers.
    pub identity: bool,
}

/// Attributes of one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMeta {
    pub name: String,
    attributes: HashMap<String, AttributeMeta>,
}

impl EntityMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.insert(name.into(), kind, false);
        self
    }

    pub fn with_identity(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.insert(name.into(), kind, true);
        self
    }

    fn insert(&mut self, name: String, kind: ValueKind, identity: bool) {
        self.attributes.insert(
            name.clone(),
            AttributeMeta {
                name,
                kind,
                identity,
            },
        );
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeMeta> {
        self.attributes.get(name)
    }

    pub fn identity_attribute(&self) -> Option<&AttributeMeta> {
        self.attributes.values().find(|a| a.identity)
    }
}

/// Literal/code pairs of one store-defined enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMeta {
    pub name: String,
    codes: HashMap<String, i32>,
    literals: BTreeMap<i32, String>,
}

impl EnumMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            codes: HashMap::new(),
            literals: BTreeMap::new(),
        }
    }

    pub fn with_item(mut self, literal: impl Into<String>, code: i32) -> Self {
        let literal = literal.into();
        self.codes.insert(literal.clone(), code);
        self.literals.insert(code, literal);
        self
    }

    pub fn code(&self, literal: &str) -> Option<i32> {
        self.codes.get(literal).copied()
    }

    pub fn literal(&self, code: i32) -> Option<&str> {
        self.literals.get(&code).map(String::as_str)
    }
}

/// Read-only attribute and enumeration lookups consumed by the batch writer.
///
/// Implementations are shared across import pipelines and must be safe to call
/// concurrently.
pub trait SchemaCatalog: Send + Sync {
    /// Declared kind of `attribute`. Fails if the entity or attribute is unknown.
    fn resolve_kind(&self, entity: &str, attribute: &str) -> CatalogResult<ValueKind>;

    /// Whether `attribute` is the store-assigned identity of `entity`.
    fn is_identity_attribute(&self, entity: &str, attribute: &str) -> CatalogResult<bool>;

    fn resolve_enum_code(&self, enumeration: &str, literal: &str) -> CatalogResult<i32>;

    fn resolve_enum_literal(&self, enumeration: &str, code: i32) -> CatalogResult<String>;
}

/// Fetches catalog metadata from its source.
///
/// Loads must be idempotent and free of side effects: a [CachedCatalog] may
/// call the loader twice for one key when two pipelines miss at once.
pub trait CatalogLoader: Send + Sync {
    fn load_entity(&self, entity: &str) -> CatalogResult<EntityMeta>;

    fn load_enumeration(&self, name: &str) -> CatalogResult<EnumMeta>;
}

/// Memoizing [SchemaCatalog] over a [CatalogLoader].
///
/// Entries are loaded on first use and kept for the life of the catalog, which
/// is meant to span one import session. Failed loads are not cached.
pub struct CachedCatalog<L> {
    loader: L,
    entities: RwLock<HashMap<String, Arc<EntityMeta>>>,
    enumerations: RwLock<HashMap<String, Arc<EnumMeta>>>,
}

impl<L: CatalogLoader> CachedCatalog<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            entities: RwLock::new(HashMap::new()),
            enumerations: RwLock::new(HashMap::new()),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn entity(&self, name: &str) -> CatalogResult<Arc<EntityMeta>> {
        memoize(&self.entities, name, || self.loader.load_entity(name))
    }

    pub fn enumeration(&self, name: &str) -> CatalogResult<Arc<EnumMeta>> {
        memoize(&self.enumerations, name, || self.loader.load_enumeration(name))
    }

    /// Number of entities currently cached.
    pub fn cached_entities(&self) -> usize {
        self.entities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn attribute(&self, entity: &str, attribute: &str) -> CatalogResult<AttributeMeta> {
        self.entity(entity)?
            .attribute(attribute)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownAttribute {
                entity: entity.to_string(),
                attribute: attribute.to_string(),
            })
    }
}

/// Returns the cached entry for `key`, loading it on a miss. When two callers
/// miss together both load, and the first insert wins.
fn memoize<T>(
    cache: &RwLock<HashMap<String, Arc<T>>>,
    key: &str,
    load: impl FnOnce() -> CatalogResult<T>,
) -> CatalogResult<Arc<T>> {
    if let Some(hit) = cache
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(key)
    {
        return Ok(Arc::clone(hit));
    }

    tracing::debug!(key, "catalog cache miss, loading");
    let loaded = Arc::new(load()?);

    let mut cache = cache.write().unwrap_or_else(PoisonError::into_inner);
    Ok(Arc::clone(cache.entry(key.to_string()).or_insert(loaded)))
}

impl<L: CatalogLoader> SchemaCatalog for CachedCatalog<L> {
    fn resolve_kind(&self, entity: &str, attribute: &str) -> CatalogResult<ValueKind> {
        Ok(self.attribute(entity, attribute)?.kind)
    }

    fn is_identity_attribute(&self, entity: &str, attribute: &str) -> CatalogResult<bool> {
        Ok(self.attribute(entity, attribute)?.identity)
    }

    fn resolve_enum_code(&self, enumeration: &str, literal: &str) -> CatalogResult<i32> {
        self.enumeration(enumeration)?
            .code(literal)
            .ok_or_else(|| CatalogError::UnknownEnumLiteral {
                enumeration: enumeration.to_string(),
                literal: literal.to_string(),
            })
    }

    fn resolve_enum_literal(&self, enumeration: &str, code: i32) -> CatalogResult<String> {
        self.enumeration(enumeration)?
            .literal(code)
            .map(str::to_string)
            .ok_or_else(|| CatalogError::UnknownEnumCode {
                enumeration: enumeration.to_string(),
                code,
            })
    }
}

/// In-memory [CatalogLoader] for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    entities: HashMap<String, EntityMeta>,
    enumerations: HashMap<String, EnumMeta>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity: EntityMeta) -> Self {
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    pub fn with_enumeration(mut self, enumeration: EnumMeta) -> Self {
        self.enumerations
            .insert(enumeration.name.clone(), enumeration);
        self
    }
}

impl CatalogLoader for StaticLoader {
    fn load_entity(&self, entity: &str) -> CatalogResult<EntityMeta> {
        self.entities
            .get(entity)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownEntity(entity.to_string()))
    }

    fn load_enumeration(&self, name: &str) -> CatalogResult<EnumMeta> {
        self.enumerations
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownEnumeration(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingLoader {
        inner: StaticLoader,
        entity_loads: AtomicUsize,
        enum_loads: AtomicUsize,
    }

    impl CatalogLoader for CountingLoader {
        fn load_entity(&self, entity: &str) -> CatalogResult<EntityMeta> {
            self.entity_loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load_entity(entity)
        }

        fn load_enumeration(&self, name: &str) -> CatalogResult<EnumMeta> {
            self.enum_loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load_enumeration(name)
        }
    }

    fn catalog() -> CachedCatalog<CountingLoader> {
        let inner = StaticLoader::new()
            .with_entity(
                EntityMeta::new("channel")
                    .with_identity("id", ValueKind::Long)
                    .with_attribute("name", ValueKind::String)
                    .with_attribute("values", ValueKind::DoubleSeq),
            )
            .with_enumeration(
                EnumMeta::new("datatype")
                    .with_item("DT_FLOAT", 3)
                    .with_item("DT_DOUBLE", 7),
            );

        CachedCatalog::new(CountingLoader {
            inner,
            entity_loads: AtomicUsize::new(0),
            enum_loads: AtomicUsize::new(0),
        })
    }

    #[test]
    fn test_resolve_kind_and_identity() {
        let catalog = catalog();
        assert_eq!(
            catalog.resolve_kind("channel", "values"),
            Ok(ValueKind::DoubleSeq)
        );
        assert_eq!(catalog.is_identity_attribute("channel", "id"), Ok(true));
        assert_eq!(catalog.is_identity_attribute("channel", "name"), Ok(false));
        assert_eq!(
            catalog.entity("channel").unwrap().identity_attribute().map(|a| a.name.as_str()),
            Some("id")
        );
    }

    #[test]
    fn test_entity_loaded_once() {
        let catalog = catalog();
        for _ in 0..5 {
            catalog.resolve_kind("channel", "name").unwrap();
            catalog.is_identity_attribute("channel", "id").unwrap();
        }
        assert_eq!(catalog.loader().entity_loads.load(Ordering::SeqCst), 1);
        assert_eq!(catalog.cached_entities(), 1);
    }

    #[test]
    fn test_unknown_attribute() {
        let catalog = catalog();
        assert_eq!(
            catalog.resolve_kind("channel", "missing"),
            Err(CatalogError::UnknownAttribute {
                entity: "channel".to_string(),
                attribute: "missing".to_string()
            })
        );
    }

    #[test]
    fn test_failed_load_not_cached() {
        let catalog = catalog();
        assert_eq!(
            catalog.resolve_kind("unit", "name"),
            Err(CatalogError::UnknownEntity("unit".to_string()))
        );
        assert!(catalog.resolve_kind("unit", "name").is_err());
        assert_eq!(catalog.loader().entity_loads.load(Ordering::SeqCst), 2);
        assert_eq!(catalog.cached_entities(), 0);
    }

    #[test]
    fn test_enum_lookups() {
        let catalog = catalog();
        assert_eq!(catalog.resolve_enum_code("datatype", "DT_DOUBLE"), Ok(7));
        assert_eq!(
            catalog.resolve_enum_literal("datatype", 3),
            Ok("DT_FLOAT".to_string())
        );
        assert_eq!(
            catalog.resolve_enum_code("datatype", "DT_STRING"),
            Err(CatalogError::UnknownEnumLiteral {
                enumeration: "datatype".to_string(),
                literal: "DT_STRING".to_string()
            })
        );
        assert_eq!(
            catalog.resolve_enum_literal("datatype", 99),
            Err(CatalogError::UnknownEnumCode {
                enumeration: "datatype".to_string(),
                code: 99
            })
        );
        assert_eq!(
            catalog.resolve_enum_code("seq_rep", "explicit"),
            Err(CatalogError::UnknownEnumeration("seq_rep".to_string()))
        );
        assert_eq!(catalog.loader().enum_loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrent_lookups_agree() {
        let catalog = catalog();
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..100 {
                        assert_eq!(
                            catalog.resolve_kind("channel", "name"),
                            Ok(ValueKind::String)
                        );
                    }
                });
            }
        });

        let loads = catalog.loader().entity_loads.load(Ordering::SeqCst);
        assert!((1..=8).contains(&loads));
        assert_eq!(catalog.cached_entities(), 1);
    }
}
