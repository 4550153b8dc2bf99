use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, DatabaseConnection, PaginatorTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use chrono::Utc;
use uuid::Uuid;

use crate::errors::ModelError;

/// One JSON document of a named collection.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub collection: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub body: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_collection(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() || name.len() > 64 {
        return Err(ModelError::Validation("collection name must be 1..=64 chars".into()));
    }
    Ok(())
}

/// Insert a document row; `body` must be a JSON object.
pub async fn create<C>(db: &C, id: Uuid, collection: &str, body: Json) -> Result<Model, ModelError>
where
    C: ConnectionTrait,
{
    validate_collection(collection)?;
    if !body.is_object() {
        return Err(ModelError::Validation("document body must be a JSON object".into()));
    }
    let am = ActiveModel {
        id: Set(id),
        collection: Set(collection.to_string()),
        body: Set(body),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(ModelError::from)
}

/// Replace the body of an existing row.
pub async fn replace_body<C>(db: &C, existing: Model, body: Json) -> Result<Model, ModelError>
where
    C: ConnectionTrait,
{
    let mut am: ActiveModel = existing.into();
    am.body = Set(body);
    am.update(db).await.map_err(ModelError::from)
}

pub async fn count_in(db: &DatabaseConnection, collection: &str) -> Result<u64, ModelError> {
    Entity::find()
        .filter(Column::Collection.eq(collection))
        .count(db)
        .await
        .map_err(ModelError::from)
}
