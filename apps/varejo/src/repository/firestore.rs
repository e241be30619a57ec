//! Firestore mirror over the REST API.
//!
//! Each store is one document `stores/{id}` with two fields:
//! `payload` (the store as JSON text) and `position` (its list index).

use super::StoreRepository;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use varejo_core::Store;

const COLLECTION: &str = "stores";

#[derive(Debug, Clone)]
pub struct FirestoreRepository {
    /// `{base}/projects/{project}/databases/(default)/documents`
    documents_url: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl FirestoreRepository {
    pub fn new(
        base_url: impl Into<String>,
        project_id: &str,
        api_key: impl Into<String>,
    ) -> AppResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            documents_url: format!("{base_url}/projects/{project_id}/databases/(default)/documents"),
            base_url,
            api_key: api_key.into(),
            client,
        })
    }

    async fn list_documents(&self) -> AppResult<Vec<Document>> {
        let url = format!("{}/{COLLECTION}", self.documents_url);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .query(&[("key", self.api_key.as_str()), ("pageSize", "300")]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let page: ListResponse = request.send().await?.error_for_status()?.json().await?;
            documents.extend(page.documents);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(documents)
    }

    async fn delete_document(&self, doc: &Document) -> AppResult<()> {
        let url = format!("{}/{}", self.base_url, doc.name);
        self.client
            .delete(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl StoreRepository for FirestoreRepository {
    fn backend(&self) -> &'static str {
        "firebase"
    }

    async fn fetch_stores(&self) -> AppResult<Vec<Store>> {
        let mut ranked = Vec::new();
        for doc in self.list_documents().await? {
            let payload = doc
                .fields
                .payload
                .ok_or_else(|| AppError::Remote(format!("document {} has no payload", doc.name)))?;
            let position = doc
                .fields
                .position
                .and_then(|p| p.integer_value.parse::<i64>().ok())
                .unwrap_or(i64::MAX);
            let store: Store = serde_json::from_str(&payload.string_value)?;
            ranked.push((position, store));
        }
        ranked.sort_by_key(|(position, _)| *position);
        Ok(ranked.into_iter().map(|(_, store)| store).collect())
    }

    /// Writes every store, then deletes documents whose id left the list.
    async fn save_stores(&self, stores: &[Store]) -> AppResult<()> {
        for (position, store) in stores.iter().enumerate() {
            let url = format!("{}/{COLLECTION}/{}", self.documents_url, store.id);
            let body = DocumentBody {
                fields: Fields {
                    payload: Some(StringValue {
                        string_value: serde_json::to_string(store)?,
                    }),
                    position: Some(IntegerValue {
                        integer_value: position.to_string(),
                    }),
                },
            };
            self.client
                .patch(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&body)
                .send()
                .await?
                .error_for_status()?;
        }

        let keep: HashSet<&str> = stores.iter().map(|store| store.id.as_str()).collect();
        for doc in self.list_documents().await? {
            if !keep.contains(doc.id()) {
                self.delete_document(&doc).await?;
            }
        }
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        for doc in self.list_documents().await? {
            self.delete_document(&doc).await?;
        }
        Ok(())
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document {
    /// Full resource name, relative to the API root.
    name: String,
    #[serde(default)]
    fields: Fields,
}

impl Document {
    /// Last path segment of the resource name.
    fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Serialize)]
struct DocumentBody {
    fields: Fields,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Fields {
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<StringValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<IntegerValue>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StringValue {
    string_value: String,
}

/// Firestore encodes 64-bit integers as strings.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntegerValue {
    integer_value: String,
}
