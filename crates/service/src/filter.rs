//! Filter construction for read/update/delete lookups.
//!
//! A [`Filter`] is a conjunction of `field == text` clauses. Endpoints describe
//! which parameters they expect through [`Lookup`]; [`build_filter`] turns the
//! parameters actually supplied into the predicate, with a path identifier
//! always taking precedence. Missing parameters yield the empty filter, which
//! matches every document of a collection.

use std::borrow::Cow;

use serde::Deserialize;
use serde_json::Value;

use crate::storage::Document;

pub const ID_FIELD: &str = "_id";
pub const USER_EMAIL_FIELD: &str = "user_email";
pub const PRODUCT_ID_FIELD: &str = "product_id";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    clauses: Vec<(String, String)>,
}

impl Filter {
    /// Match-all filter.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self::eq(ID_FIELD, id)
    }

    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self { clauses: vec![(field.into(), value.into())] }
    }

    pub fn and(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    /// Set `field` to `value`, replacing an existing clause on the same field.
    pub fn with_clause(mut self, field: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.clauses.iter_mut().find(|(f, _)| f == field) {
            Some(clause) => clause.1 = value,
            None => self.clauses.push((field.to_string(), value)),
        }
        self
    }

    pub fn clauses(&self) -> &[(String, String)] {
        &self.clauses
    }

    pub fn id(&self) -> Option<&str> {
        self.value_of(ID_FIELD)
    }

    pub fn value_of(&self, field: &str) -> Option<&str> {
        self.clauses.iter().find(|(f, _)| f == field).map(|(_, v)| v.as_str())
    }

    /// True when the filter matches every document.
    pub fn is_unscoped(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The clauses as a document of string fields.
    pub fn to_document(&self) -> Document {
        self.clauses
            .iter()
            .map(|(f, v)| (f.clone(), Value::String(v.clone())))
            .collect()
    }

    /// Every clause must equal the text form of the document's scalar field.
    pub fn matches(&self, document: &Document) -> bool {
        self.clauses.iter().all(|(field, expected)| {
            document
                .get(field)
                .and_then(scalar_text)
                .is_some_and(|actual| actual == expected.as_str())
        })
    }
}

/// Text form used for comparisons; objects, arrays and null never match.
pub fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Optional lookup parameters: the path identifier plus the query string.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct LookupParams {
    #[serde(skip_deserializing)]
    pub id: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
}

impl LookupParams {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        present(&self.id)
    }

    pub fn user_email(&self) -> Option<&str> {
        present(&self.user_email)
    }

    pub fn product_id(&self) -> Option<&str> {
        present(&self.product_id)
    }
}

// Blank query values count as absent.
fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.trim().is_empty())
}

/// The parameters an endpoint keys its lookup on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    UserEmail,
    ProductId,
    /// Both `user_email` and `product_id`; either alone scopes nothing.
    UserAndProduct,
    /// Identifier, then the pair, then whichever single field is present.
    Any,
}

/// Build the predicate for `lookup` from the supplied parameters.
pub fn build_filter(lookup: Lookup, params: &LookupParams) -> Filter {
    if let Some(id) = params.id() {
        return Filter::by_id(id);
    }
    let email = params.user_email();
    let product = params.product_id();
    match (lookup, email, product) {
        (Lookup::UserEmail, Some(e), _) => Filter::eq(USER_EMAIL_FIELD, e),
        (Lookup::ProductId, _, Some(p)) => Filter::eq(PRODUCT_ID_FIELD, p),
        (Lookup::UserAndProduct | Lookup::Any, Some(e), Some(p)) => {
            Filter::eq(USER_EMAIL_FIELD, e).and(PRODUCT_ID_FIELD, p)
        }
        (Lookup::Any, Some(e), None) => Filter::eq(USER_EMAIL_FIELD, e),
        (Lookup::Any, None, Some(p)) => Filter::eq(PRODUCT_ID_FIELD, p),
        _ => Filter::empty(),
    }
}
