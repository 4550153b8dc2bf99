use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde_json::json;
use uuid::Uuid;

use crate::db::{connect_with_config, DatabaseConfig};
use crate::document;

/// Postgres-backed tests run only when a database is explicitly provided.
async fn test_db() -> Result<Option<DatabaseConnection>> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(None);
    }
    let Ok(url) = std::env::var("DATABASE_URL") else { return Ok(None) };
    let cfg = DatabaseConfig { url, max_connections: 5, min_connections: 1, ..DatabaseConfig::default() };
    let db = connect_with_config(&cfg).await?;
    Migrator::up(&db, None).await?;
    Ok(Some(db))
}

#[test]
fn collection_name_validation() {
    assert!(document::validate_collection("reviews").is_ok());
    assert!(document::validate_collection("  ").is_err());
    assert!(document::validate_collection(&"x".repeat(65)).is_err());
}

#[tokio::test]
async fn test_create_and_replace_document() -> Result<()> {
    let Some(db) = test_db().await? else { return Ok(()) };
    let collection = format!("test_{}", Uuid::new_v4().simple());

    let id = Uuid::new_v4();
    let created = document::create(&db, id, &collection, json!({"_id": id.to_string(), "name": "Wash"})).await?;
    assert_eq!(created.collection, collection);
    assert_eq!(document::count_in(&db, &collection).await?, 1);

    let replaced = document::replace_body(&db, created, json!({"_id": id.to_string(), "name": "Dry"})).await?;
    assert_eq!(replaced.body["name"], "Dry");

    let found = document::Entity::find_by_id(id).one(&db).await?;
    assert_eq!(found.map(|m| m.body["name"].clone()), Some(json!("Dry")));

    document::Entity::delete_by_id(id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_non_object_body_rejected() -> Result<()> {
    let Some(db) = test_db().await? else { return Ok(()) };
    let res = document::create(&db, Uuid::new_v4(), "reviews", json!([1, 2])).await;
    assert!(matches!(res, Err(crate::errors::ModelError::Validation(_))));
    Ok(())
}
