//! SQLite-backed document store.
//!
//! Documents live in one `documents` table keyed by `(collection, id)`; their
//! fields are a JSON object queried through `json_extract`.

use crate::collab::{
    CollabResult, CollaboratorError, Collection, Document, DocumentId, DocumentQuery,
    DocumentStore, Fields, SortOrder,
};
use log::debug;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde_json::Value;
use uuid::Uuid;

const DOCUMENT_SELECT_SQL: &str = "SELECT id, fields FROM documents";

pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn get(&self, collection: Collection, id: &DocumentId) -> CollabResult<Option<Document>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DOCUMENT_SELECT_SQL} WHERE collection = ?1 AND id = ?2;"
        ))?;
        let row = stmt
            .query_row(params![collection.name(), id.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .optional()?;
        row.map(|(id, fields)| decode_document(id, &fields))
            .transpose()
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn list(&self, collection: Collection, query: &DocumentQuery) -> CollabResult<Vec<Document>> {
        let mut sql = format!("{DOCUMENT_SELECT_SQL} WHERE collection = ?");
        let mut bind_values = vec![SqlValue::Text(collection.name().to_string())];

        for (field, value) in &query.filters {
            let path = json_path(field)?;
            match value {
                Value::Null => {
                    sql.push_str(" AND json_extract(fields, ?) IS NULL");
                    bind_values.push(SqlValue::Text(path));
                }
                other => {
                    sql.push_str(" AND json_extract(fields, ?) = ?");
                    bind_values.push(SqlValue::Text(path));
                    bind_values.push(filter_value(field, other)?);
                }
            }
        }

        sql.push_str(" ORDER BY");
        if let Some((field, order)) = &query.order_by {
            sql.push_str(" json_extract(fields, ?)");
            sql.push_str(match order {
                SortOrder::Ascending => " ASC,",
                SortOrder::Descending => " DESC,",
            });
            bind_values.push(SqlValue::Text(json_path(field)?));
        }
        sql.push_str(" created_at ASC, rowid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(SqlValue::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            documents.push(parse_document_row(row)?);
        }

        debug!(
            "event=document_list module=repo status=ok collection={} count={}",
            collection.name(),
            documents.len()
        );
        Ok(documents)
    }

    fn create(&self, collection: Collection, fields: Fields) -> CollabResult<Document> {
        let id = DocumentId::new(Uuid::new_v4().to_string());
        let encoded = serde_json::to_string(&fields)?;
        self.conn.execute(
            "INSERT INTO documents (collection, id, fields) VALUES (?1, ?2, ?3);",
            params![collection.name(), id.as_str(), encoded],
        )?;

        debug!(
            "event=document_create module=repo status=ok collection={} id={}",
            collection.name(),
            id
        );
        Ok(Document { id, fields })
    }

    fn update(
        &self,
        collection: Collection,
        id: &DocumentId,
        fields: Fields,
    ) -> CollabResult<Document> {
        let tx = self.conn.unchecked_transaction()?;
        let Some(mut document) = self.get(collection, id)? else {
            return Err(CollaboratorError::NotFound {
                collection,
                id: id.clone(),
            });
        };
        document.fields.extend(fields);
        let encoded = serde_json::to_string(&document.fields)?;
        tx.execute(
            "UPDATE documents
             SET
                fields = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE collection = ?2 AND id = ?3;",
            params![encoded, collection.name(), id.as_str()],
        )?;
        tx.commit()?;

        debug!(
            "event=document_update module=repo status=ok collection={} id={}",
            collection.name(),
            id
        );
        Ok(document)
    }

    fn delete(&self, collection: Collection, id: &DocumentId) -> CollabResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2;",
            params![collection.name(), id.as_str()],
        )?;
        debug!(
            "event=document_delete module=repo status=ok collection={} id={} existed={}",
            collection.name(),
            id,
            changed > 0
        );
        Ok(())
    }
}

fn parse_document_row(row: &Row<'_>) -> CollabResult<Document> {
    let id: String = row.get("id")?;
    let fields: String = row.get("fields")?;
    decode_document(id, &fields)
}

fn decode_document(id: String, raw: &str) -> CollabResult<Document> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(fields) => Ok(Document {
            id: DocumentId::new(id),
            fields,
        }),
        _ => Err(CollaboratorError::Rejected(format!(
            "document `{id}` is not a JSON object"
        ))),
    }
}

/// `$."field"` for a top-level field name.
fn json_path(field: &str) -> CollabResult<String> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if !valid {
        return Err(CollaboratorError::Rejected(format!(
            "unsupported query field `{field}`"
        )));
    }
    Ok(format!("$.\"{field}\""))
}

fn filter_value(field: &str, value: &Value) -> CollabResult<SqlValue> {
    match value {
        Value::Bool(flag) => Ok(SqlValue::Integer(i64::from(*flag))),
        Value::String(text) => Ok(SqlValue::Text(text.clone())),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Ok(SqlValue::Integer(int))
            } else if let Some(real) = number.as_f64() {
                Ok(SqlValue::Real(real))
            } else {
                Err(CollaboratorError::Rejected(format!(
                    "unsupported number in filter on `{field}`"
                )))
            }
        }
        Value::Null => Ok(SqlValue::Null),
        Value::Array(_) | Value::Object(_) => Err(CollaboratorError::Rejected(format!(
            "filter on `{field}` must be a scalar"
        ))),
    }
}
