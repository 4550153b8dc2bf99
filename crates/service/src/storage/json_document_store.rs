use std::{collections::HashMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::debug;

use super::{
    apply_set, assign_id, canonical_filter, upsert_seed, DeleteOutcome, Document, DocumentStore, FindOptions,
    InsertOutcome, StoreError, UpdateOptions, UpdateOutcome,
};
use crate::filter::Filter;

type Collections = HashMap<String, Vec<Document>>;

/// JSON file-backed document store.
///
/// Keeps every collection as an insertion-ordered `Vec` behind one lock.
/// A write is applied to a copy, the copy is written to disk under the lock,
/// and memory only changes once the file is saved. Without a file path it is
/// purely in-memory.
#[derive(Clone)]
pub struct JsonDocumentStore {
    inner: Arc<RwLock<Collections>>,
    file_path: Option<PathBuf>,
}

impl JsonDocumentStore {
    /// Initialize the store from a path. Creates the file with no collections if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let collections: Collections = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Backend(format!("corrupt store file {}: {e}", file_path.display())))?,
            Err(_) => {
                let empty = Collections::new();
                fs::write(&file_path, serde_json::to_vec(&empty).map_err(|e| StoreError::Backend(e.to_string()))?)
                    .await
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
                empty
            }
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(collections)), file_path: Some(file_path) }))
    }

    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self { inner: Arc::new(RwLock::new(Collections::new())), file_path: None })
    }

    /// Write `collections` to the backing file through a temp file and rename.
    /// Callers hold the write guard, so snapshots land on disk in commit order.
    async fn persist(&self, collections: &Collections) -> Result<(), StoreError> {
        let Some(path) = &self.file_path else { return Ok(()) };
        let data = serde_json::to_vec(collections).map_err(|e| StoreError::Backend(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data).await.map_err(|e| StoreError::Backend(e.to_string()))?;
        fs::rename(&tmp, path).await.map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}

fn position(docs: &[Document], filter: &Filter) -> Option<usize> {
    docs.iter().position(|d| filter.matches(d))
}

#[async_trait]
impl DocumentStore for JsonDocumentStore {
    async fn find(&self, collection: &str, filter: &Filter, options: FindOptions) -> Result<Vec<Document>, StoreError> {
        let filter = canonical_filter(filter)?;
        let map = self.inner.read().await;
        let limit = options.limit.map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX));
        Ok(map
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, StoreError> {
        let filter = canonical_filter(filter)?;
        let map = self.inner.read().await;
        Ok(map.get(collection).and_then(|docs| docs.iter().find(|d| filter.matches(d)).cloned()))
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<InsertOutcome, StoreError> {
        let id = assign_id(&mut document)?.to_string();
        let mut map = self.inner.write().await;
        let existing = map.get(collection).map(Vec::as_slice).unwrap_or_default();
        if existing.iter().any(|d| d.get(crate::filter::ID_FIELD).and_then(|v| v.as_str()) == Some(id.as_str())) {
            return Err(StoreError::InvalidDocument(format!("duplicate _id {id}")));
        }
        let mut next = map.clone();
        next.entry(collection.to_string()).or_default().push(document);
        self.persist(&next).await?;
        *map = next;
        debug!(%collection, %id, "document inserted");
        Ok(InsertOutcome { acknowledged: true, inserted_id: id })
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
        options: UpdateOptions,
    ) -> Result<UpdateOutcome, StoreError> {
        let filter = canonical_filter(filter)?;
        let mut map = self.inner.write().await;
        let mut next = map.clone();
        let docs = next.entry(collection.to_string()).or_default();
        let outcome = match position(docs, &filter) {
            Some(idx) => UpdateOutcome::matched(apply_set(&mut docs[idx], set)),
            None if options.upsert => {
                let mut document = upsert_seed(&filter, set);
                let id = assign_id(&mut document)?.to_string();
                docs.push(document);
                UpdateOutcome::upserted(id)
            }
            None => UpdateOutcome::unmatched(),
        };
        if outcome.modified_count > 0 || outcome.upserted_count > 0 {
            self.persist(&next).await?;
            *map = next;
        }
        Ok(outcome)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<DeleteOutcome, StoreError> {
        let filter = canonical_filter(filter)?;
        let mut map = self.inner.write().await;
        let Some(idx) = map.get(collection).and_then(|docs| position(docs, &filter)) else {
            return Ok(DeleteOutcome::deleted(0));
        };
        let mut next = map.clone();
        if let Some(docs) = next.get_mut(collection) {
            docs.remove(idx);
        }
        self.persist(&next).await?;
        *map = next;
        Ok(DeleteOutcome::deleted(1))
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        let map = self.inner.read().await;
        Ok(map.get(collection).map_or(0, |docs| docs.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(v: Value) -> Document {
        v.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn json_document_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_document_store_{}.json", uuid::Uuid::new_v4()));
        let store = JsonDocumentStore::new(&tmp).await?;

        // initially empty
        assert_eq!(store.count("reviews").await?, 0);

        let a = store.insert_one("reviews", doc(json!({"user_email": "a@x.com", "product_id": "1"}))).await?;
        store.insert_one("reviews", doc(json!({"user_email": "b@x.com", "product_id": "1"}))).await?;
        assert_eq!(store.count("reviews").await?, 2);

        let by_product = store.find("reviews", &Filter::eq("product_id", "1"), FindOptions::default()).await?;
        assert_eq!(by_product.len(), 2);
        assert_eq!(by_product[0]["user_email"], json!("a@x.com"));

        let one = store.find_one("reviews", &Filter::by_id(a.inserted_id.clone())).await?;
        assert_eq!(one.map(|d| d["user_email"].clone()), Some(json!("a@x.com")));

        let deleted = store.delete_one("reviews", &Filter::by_id(a.inserted_id.clone())).await?;
        assert_eq!(deleted.deleted_count, 1);

        // reload from disk
        let reloaded = JsonDocumentStore::new(&tmp).await?;
        assert_eq!(reloaded.count("reviews").await?, 1);
        assert!(reloaded.find_one("reviews", &Filter::by_id(a.inserted_id)).await?.is_none());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn find_respects_limit_and_order() -> Result<(), StoreError> {
        let store = JsonDocumentStore::in_memory();
        for i in 0..10 {
            store.insert_one("services", doc(json!({"name": format!("s{i}")}))).await?;
        }
        let preview = store.find("services", &Filter::empty(), FindOptions::limit(3)).await?;
        let names: Vec<_> = preview.iter().map(|d| d["name"].clone()).collect();
        assert_eq!(names, vec![json!("s0"), json!("s1"), json!("s2")]);
        assert_eq!(store.find("services", &Filter::empty(), FindOptions::default()).await?.len(), 10);
        Ok(())
    }

    #[tokio::test]
    async fn upsert_inserts_then_updates_in_place() -> Result<(), StoreError> {
        let store = JsonDocumentStore::in_memory();
        let filter = Filter::eq("user_email", "a@x.com").and("product_id", "42");
        let opts = UpdateOptions { upsert: true };

        let first = store.update_one("myServices", &filter, doc(json!({"product_id": 42, "rating": 5, "name": "Wash"})), opts).await?;
        assert_eq!(first.matched_count, 0);
        let id = first.upserted_id.clone().expect("upserted id");

        let second = store.update_one("myServices", &filter, doc(json!({"product_id": 42, "rating": 4})), opts).await?;
        assert_eq!(second.matched_count, 1);
        assert_eq!(second.modified_count, 1);
        assert!(second.upserted_id.is_none());

        let stored = store.find_one("myServices", &Filter::by_id(id)).await?.expect("stored");
        assert_eq!(stored["rating"], json!(4));
        assert_eq!(stored["name"], json!("Wash"));
        assert_eq!(stored["user_email"], json!("a@x.com"));
        assert_eq!(store.count("myServices").await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn update_without_upsert_leaves_store_untouched() -> Result<(), StoreError> {
        let store = JsonDocumentStore::in_memory();
        let out = store.update_one("reviews", &Filter::eq("user_email", "x"), doc(json!({"a": 1})), UpdateOptions::default()).await?;
        assert_eq!(out, UpdateOutcome::unmatched());
        assert_eq!(store.count("reviews").await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn identifier_filters_are_validated_and_canonical() -> Result<(), StoreError> {
        let store = JsonDocumentStore::in_memory();
        let inserted = store.insert_one("services", doc(json!({"name": "Wash"}))).await?;

        let upper = inserted.inserted_id.to_uppercase();
        assert!(store.find_one("services", &Filter::by_id(upper)).await?.is_some());

        let err = store.find_one("services", &Filter::by_id("not-an-id")).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
        Ok(())
    }

    #[tokio::test]
    async fn upsert_by_identifier_uses_that_identifier() -> Result<(), StoreError> {
        let store = JsonDocumentStore::in_memory();
        let id = uuid::Uuid::new_v4().to_string();
        let out = store
            .update_one("reviews", &Filter::by_id(id.clone()), doc(json!({"review_message": "hi"})), UpdateOptions { upsert: true })
            .await?;
        assert_eq!(out.upserted_id.as_deref(), Some(id.as_str()));
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_insert_id_rejected() -> Result<(), StoreError> {
        let store = JsonDocumentStore::in_memory();
        let id = uuid::Uuid::new_v4().to_string();
        store.insert_one("reviews", doc(json!({"_id": id}))).await?;
        assert!(store.insert_one("reviews", doc(json!({"_id": id}))).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn failed_save_leaves_store_unchanged() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("json_document_store_{}", uuid::Uuid::new_v4()));
        let path = dir.join("documents.json");
        let store = JsonDocumentStore::new(&path).await?;
        let filter = Filter::eq("user_email", "a@x.com").and("product_id", "42");
        let opts = UpdateOptions { upsert: true };
        let kept = store.insert_one("myServices", doc(json!({"user_email": "b@x.com", "rating": 1}))).await?;

        // A directory where the file should be makes every save fail.
        tokio::fs::remove_file(&path).await?;
        tokio::fs::create_dir(&path).await?;

        assert!(store.update_one("myServices", &filter, doc(json!({"rating": 5})), opts).await.is_err());
        assert_eq!(store.count("myServices").await?, 1);
        assert!(store.insert_one("myServices", doc(json!({"rating": 2}))).await.is_err());
        assert!(store.delete_one("myServices", &Filter::by_id(kept.inserted_id.clone())).await.is_err());
        let unchanged = store
            .update_one("myServices", &Filter::by_id(kept.inserted_id.clone()), doc(json!({"rating": 9})), opts)
            .await;
        assert!(unchanged.is_err());

        let all = store.find("myServices", &Filter::empty(), FindOptions::default()).await?;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["rating"], json!(1));

        // Once the path is writable again the retried upsert still creates a record.
        tokio::fs::remove_dir(&path).await?;
        let retry = store.update_one("myServices", &filter, doc(json!({"rating": 5})), opts).await?;
        assert_eq!(retry.matched_count, 0);
        assert!(retry.upserted_id.is_some());
        assert_eq!(store.count("myServices").await?, 2);

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
