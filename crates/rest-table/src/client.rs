//! PostgREST-style table client

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use taskpad_core::table::TaskTables;
use taskpad_core::task::{CommentRecord, NewComment, NewTask, TaskPatch, TaskRecord};
use taskpad_core::{Error, Result};

use super::config::RestConfig;

const TASKS_TABLE: &str = "tasks";
const COMMENTS_TABLE: &str = "comments";

/// Insert body for the tasks table; `completed` is always stored false
#[derive(Serialize)]
struct InsertTask<'a> {
    title: &'a str,
    description: &'a str,
    completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
}

/// HTTP implementation of the remote tables
pub struct RestTables {
    client: Client,
    config: RestConfig,
}

impl RestTables {
    pub fn new(config: RestConfig) -> Self {
        Self {
            // Table traffic goes straight to the backend.
            client: Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_else(|_| Client::new()),
            config,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let mut req = self.client.request(method, self.table_url(table));
        if let Some(key) = &self.config.api_key {
            req = req.header("apikey", key).bearer_auth(key);
        }
        req
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let res = req
            .send()
            .await
            .map_err(|e| Error::Backend(format!("Request failed: {}", e)))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(Error::Backend(format!(
                "Backend returned {}: {}",
                status, body
            )));
        }
        Ok(res)
    }

    /// Insert a single row and return its stored representation
    async fn insert_returning<T, B>(&self, table: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let req = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            // Single-element array, the bulk-insert shape the endpoint expects.
            .json(&[body]);

        let rows: Vec<T> = self
            .send(req)
            .await?
            .json()
            .await
            .map_err(|e| Error::Backend(format!("Invalid response from {}: {}", table, e)))?;

        rows.into_iter()
            .next()
            .ok_or_else(|| Error::Backend(format!("{} insert returned no row", table)))
    }
}

#[async_trait]
impl TaskTables for RestTables {
    async fn list_tasks(&self) -> Result<Vec<TaskRecord>> {
        debug!("Listing tasks from {}", self.table_url(TASKS_TABLE));
        let req = self
            .request(Method::GET, TASKS_TABLE)
            .query(&[("select", "*"), ("order", "created_at.desc")]);

        self.send(req)
            .await?
            .json()
            .await
            .map_err(|e| Error::Backend(format!("Invalid task rows: {}", e)))
    }

    async fn list_comments(&self) -> Result<Vec<CommentRecord>> {
        let req = self
            .request(Method::GET, COMMENTS_TABLE)
            .query(&[("select", "*"), ("order", "created_at.asc")]);

        self.send(req)
            .await?
            .json()
            .await
            .map_err(|e| Error::Backend(format!("Invalid comment rows: {}", e)))
    }

    async fn insert_task(&self, new: &NewTask) -> Result<TaskRecord> {
        let body = InsertTask {
            title: &new.title,
            description: &new.description,
            completed: false,
            image: new.image.as_deref(),
        };
        self.insert_returning(TASKS_TABLE, &body).await
    }

    async fn update_task(&self, id: Uuid, patch: &TaskPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let req = self
            .request(Method::PATCH, TASKS_TABLE)
            .query(&[("id", format!("eq.{}", id))])
            .json(patch);
        self.send(req).await?;
        Ok(())
    }

    async fn delete_task(&self, id: Uuid) -> Result<()> {
        let req = self
            .request(Method::DELETE, TASKS_TABLE)
            .query(&[("id", format!("eq.{}", id))]);
        self.send(req).await?;
        Ok(())
    }

    async fn insert_comment(&self, new: &NewComment) -> Result<CommentRecord> {
        self.insert_returning(COMMENTS_TABLE, new).await
    }
}
