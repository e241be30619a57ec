//! Supabase mirror over PostgREST.
//!
//! Expects a table `stores(id text primary key, position int, data jsonb)`.

use super::StoreRepository;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use varejo_core::Store;

#[derive(Debug, Clone)]
pub struct SupabaseRepository {
    table_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize, Deserialize)]
struct Row {
    id: String,
    position: i64,
    data: Store,
}

impl SupabaseRepository {
    /// Every request carries the anon key as both `apikey` and bearer token.
    pub fn new(url: &str, anon_key: &str) -> AppResult<Self> {
        let header = |value: String| {
            HeaderValue::from_str(&value)
                .map_err(|e| AppError::Config(format!("invalid SUPABASE_ANON_KEY: {e}")))
        };
        let mut headers = HeaderMap::new();
        headers.insert("apikey", header(anon_key.to_owned())?);
        headers.insert(AUTHORIZATION, header(format!("Bearer {anon_key}"))?);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            table_url: format!("{}/rest/v1/stores", url.trim_end_matches('/')),
            client,
        })
    }
}

#[async_trait]
impl StoreRepository for SupabaseRepository {
    fn backend(&self) -> &'static str {
        "supabase"
    }

    async fn fetch_stores(&self) -> AppResult<Vec<Store>> {
        let rows: Vec<Row> = self
            .client
            .get(&self.table_url)
            .query(&[("select", "id,position,data"), ("order", "position.asc")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(rows.into_iter().map(|row| row.data).collect())
    }

    /// Upserts the list, then deletes every row whose id is not in it.
    async fn save_stores(&self, stores: &[Store]) -> AppResult<()> {
        if stores.is_empty() {
            return self.clear().await;
        }
        let rows: Vec<Row> = stores
            .iter()
            .enumerate()
            .map(|(position, store)| Row {
                id: store.id.clone(),
                position: position as i64,
                data: store.clone(),
            })
            .collect();

        self.client
            .post(&self.table_url)
            .header("Prefer", "resolution=merge-duplicates")
            .json(&rows)
            .send()
            .await?
            .error_for_status()?;

        self.client
            .delete(&self.table_url)
            .query(&[("id", not_in_filter(stores))])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        // PostgREST refuses an unfiltered DELETE.
        self.client
            .delete(&self.table_url)
            .query(&[("id", "not.is.null")])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// PostgREST `not.in.(...)` filter over the store ids. Values are quoted so
/// commas and parentheses inside an id stay literal.
fn not_in_filter(stores: &[Store]) -> String {
    let ids: Vec<String> = stores
        .iter()
        .map(|store| {
            let escaped = store.id.replace('\\', "\\\\").replace('"', "\\\"");
            format!("\"{escaped}\"")
        })
        .collect();
    format!("not.in.({})", ids.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use varejo_core::seed;

    #[test]
    fn not_in_filter_quotes_ids() {
        let stores = vec![
            seed::new_store("1", "1001", "A", "A", "Ana", "2024-01-01"),
            seed::new_store("a,(b)", "1002", "B", "B", "Bia", "2024-01-01"),
            seed::new_store("say \"hi\"", "1003", "C", "C", "Caio", "2024-01-01"),
        ];
        assert_eq!(
            not_in_filter(&stores),
            r#"not.in.("1","a,(b)","say \"hi\"")"#
        );
    }
}
