//! Field selection for resource writes.
//!
//! The projected document always holds exactly the declared field set: unknown
//! payload keys are dropped and missing ones are written as `null`.

use serde_json::Value;

use crate::filter::{ID_FIELD, PRODUCT_ID_FIELD};
use crate::storage::Document;

pub const REVIEW_FIELDS: [&str; 9] = [
    "product_id",
    "product_name",
    "product_img",
    "product_price",
    "product_description",
    "user_name",
    "user_photoURL",
    "user_email",
    "review_message",
];

pub const MY_SERVICE_FIELDS: [&str; 6] = ["rating", "name", "img", "price", "description", "user_email"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Review,
    /// User-owned offering; its `product_id` comes from the payload's own `_id`.
    MyService,
}

impl ResourceKind {
    /// Keys present in every projection of this kind.
    pub fn declared_fields(self) -> Vec<&'static str> {
        match self {
            ResourceKind::Review => REVIEW_FIELDS.to_vec(),
            ResourceKind::MyService => {
                let mut fields = MY_SERVICE_FIELDS.to_vec();
                fields.push(PRODUCT_ID_FIELD);
                fields
            }
        }
    }
}

pub fn project(kind: ResourceKind, payload: &Value) -> Document {
    let source = payload.as_object();
    let pick = |key: &str| source.and_then(|m| m.get(key)).cloned().unwrap_or(Value::Null);

    let mut out = Document::new();
    match kind {
        ResourceKind::Review => {
            for key in REVIEW_FIELDS {
                out.insert(key.to_string(), pick(key));
            }
        }
        ResourceKind::MyService => {
            out.insert(PRODUCT_ID_FIELD.to_string(), pick(ID_FIELD));
            for key in MY_SERVICE_FIELDS {
                out.insert(key.to_string(), pick(key));
            }
        }
    }
    out
}
