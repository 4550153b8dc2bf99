//! Startup seeding of the read-only service catalog.

use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::resources::SERVICES;
use crate::storage::DocumentStore;

/// Insert every object of the JSON array at `path` into `services`, but only
/// while that collection is empty. Returns the number of documents inserted.
pub async fn seed_services(store: &dyn DocumentStore, path: impl AsRef<Path>) -> Result<usize, ServiceError> {
    let path = path.as_ref();
    let existing = store.count(SERVICES).await?;
    if existing > 0 {
        info!(existing, "services already seeded");
        return Ok(0);
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ServiceError::Seed(format!("{}: {e}", path.display())))?;
    let Value::Array(items) = serde_json::from_slice::<Value>(&bytes)
        .map_err(|e| ServiceError::Seed(format!("{}: {e}", path.display())))?
    else {
        return Err(ServiceError::Seed(format!("{}: expected a JSON array", path.display())));
    };

    let mut inserted = 0;
    for item in items {
        match item {
            Value::Object(document) => {
                store.insert_one(SERVICES, document).await?;
                inserted += 1;
            }
            other => warn!(kind = json_kind(&other), "skipping non-object seed entry"),
        }
    }
    info!(inserted, file = %path.display(), "services seeded");
    Ok(inserted)
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonDocumentStore;
    use serde_json::json;

    async fn write_seed(contents: &Value) -> anyhow::Result<std::path::PathBuf> {
        let path = std::env::temp_dir().join(format!("seed_services_{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, serde_json::to_vec(contents)?).await?;
        Ok(path)
    }

    #[tokio::test]
    async fn seeds_once_into_empty_collection() -> anyhow::Result<()> {
        let items: Vec<Value> = (0..10).map(|i| json!({"name": format!("s{i}"), "price": i})).collect();
        let path = write_seed(&Value::Array(items)).await?;
        let store = JsonDocumentStore::in_memory();

        assert_eq!(seed_services(store.as_ref(), &path).await?, 10);
        assert_eq!(seed_services(store.as_ref(), &path).await?, 0);
        assert_eq!(store.count(SERVICES).await?, 10);

        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn skips_non_objects_and_rejects_non_arrays() -> anyhow::Result<()> {
        let store = JsonDocumentStore::in_memory();
        let mixed = write_seed(&json!([{"name": "Wash"}, 3, "x"])).await?;
        assert_eq!(seed_services(store.as_ref(), &mixed).await?, 1);

        let empty = JsonDocumentStore::in_memory();
        let object = write_seed(&json!({"name": "Wash"})).await?;
        assert!(matches!(seed_services(empty.as_ref(), &object).await, Err(ServiceError::Seed(_))));
        assert!(matches!(
            seed_services(empty.as_ref(), "/nonexistent/services.json").await,
            Err(ServiceError::Seed(_))
        ));

        let _ = tokio::fs::remove_file(&mixed).await;
        let _ = tokio::fs::remove_file(&object).await;
        Ok(())
    }
}
