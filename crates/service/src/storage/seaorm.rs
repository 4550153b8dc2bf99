use async_trait::async_trait;
use models::document;
use sea_orm::{
    sea_query::Expr, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Select, TransactionTrait,
};
use serde_json::Value;
use tracing::debug;

use super::{
    apply_set, assign_id, parse_id, upsert_seed, DeleteOutcome, Document, DocumentStore, FindOptions, InsertOutcome,
    StoreError, UpdateOptions, UpdateOutcome,
};
use crate::filter::{Filter, ID_FIELD};

/// SeaORM-backed store: every collection shares the `document` table.
pub struct SeaOrmDocumentStore {
    pub db: DatabaseConnection,
}

impl SeaOrmDocumentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_err(e: DbErr) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn into_document(body: Value) -> Document {
    match body {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

/// Rows of `collection` matching `filter`, oldest first.
/// `_id` clauses hit the primary key; other clauses compare `body ->> field` as text.
fn scoped(collection: &str, filter: &Filter) -> Result<Select<document::Entity>, StoreError> {
    let mut query = document::Entity::find().filter(document::Column::Collection.eq(collection));
    for (field, value) in filter.clauses() {
        if field == ID_FIELD {
            query = query.filter(document::Column::Id.eq(parse_id(value)?));
        } else {
            query = query.filter(Expr::cust_with_values("body ->> ? = ?", [field.clone(), value.clone()]));
        }
    }
    Ok(query
        .order_by_asc(document::Column::CreatedAt)
        .order_by_asc(document::Column::Id))
}

#[async_trait]
impl DocumentStore for SeaOrmDocumentStore {
    async fn find(&self, collection: &str, filter: &Filter, options: FindOptions) -> Result<Vec<Document>, StoreError> {
        let mut query = scoped(collection, filter)?;
        if let Some(limit) = options.limit {
            query = query.limit(limit);
        }
        let rows = query.all(&self.db).await.map_err(db_err)?;
        Ok(rows.into_iter().map(|m| into_document(m.body)).collect())
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, StoreError> {
        let row = scoped(collection, filter)?.one(&self.db).await.map_err(db_err)?;
        Ok(row.map(|m| into_document(m.body)))
    }

    async fn insert_one(&self, collection: &str, mut doc: Document) -> Result<InsertOutcome, StoreError> {
        let id = assign_id(&mut doc)?;
        document::create(&self.db, id, collection, Value::Object(doc)).await?;
        debug!(%collection, %id, "document inserted");
        Ok(InsertOutcome { acknowledged: true, inserted_id: id.to_string() })
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
        options: UpdateOptions,
    ) -> Result<UpdateOutcome, StoreError> {
        let query = scoped(collection, filter)?;
        let txn = self.db.begin().await.map_err(db_err)?;
        let existing = query.lock_exclusive().one(&txn).await.map_err(db_err)?;

        let outcome = match existing {
            Some(model) => {
                let mut body = into_document(model.body.clone());
                let changed = apply_set(&mut body, set);
                if changed {
                    document::replace_body(&txn, model, Value::Object(body)).await?;
                }
                UpdateOutcome::matched(changed)
            }
            None if options.upsert => {
                let mut doc = upsert_seed(filter, set);
                let id = assign_id(&mut doc)?;
                document::create(&txn, id, collection, Value::Object(doc)).await?;
                UpdateOutcome::upserted(id.to_string())
            }
            None => UpdateOutcome::unmatched(),
        };

        txn.commit().await.map_err(db_err)?;
        Ok(outcome)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<DeleteOutcome, StoreError> {
        let Some(row) = scoped(collection, filter)?.one(&self.db).await.map_err(db_err)? else {
            return Ok(DeleteOutcome::deleted(0));
        };
        let res = document::Entity::delete_by_id(row.id).exec(&self.db).await.map_err(db_err)?;
        Ok(DeleteOutcome::deleted(res.rows_affected))
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        Ok(document::count_in(&self.db, collection).await?)
    }
}
