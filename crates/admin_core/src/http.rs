use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use shared::{
    domain::{CategoryId, UserId},
    protocol::{
        CategoryRecord, CreateCategoryRequest, CreateUserRequest, ListResponse,
        UpdateCategoryRequest, UpdateUserRequest, UserRecord,
    },
};
use tracing::{debug, info};
use url::Url;

use crate::{
    error::AdminError,
    source::{CategoryCatalog, ListQuery, PageResult, RecordSource, UserDirectory},
};

/// Supplies the session credential attached to outgoing requests.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Mutation endpoints answer either with the bare record or wrapped in `data`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

struct ApiTransport {
    http: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl ApiTransport {
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AdminError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AdminError::validation(format!("api url '{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn list_url(&self, collection: &str, query: &ListQuery) -> Result<Url, AdminError> {
        let mut url = self.endpoint(&[collection])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("page", &query.page.to_string())
                .append_pair("limit", &query.page_size.to_string());
            if let Some(search) = query.search_term() {
                pairs.append_pair("search", search);
            }
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<reqwest::Response, AdminError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AdminError::rejected(status.as_u16(), &body))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AdminError> {
        let bytes = self.execute(request).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn fetch_record<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, AdminError> {
        Ok(self.fetch::<Envelope<T>>(request).await?.into_inner())
    }

    async fn list<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> Result<PageResult<T>, AdminError> {
        let url = self.list_url(collection, query)?;
        debug!(%url, "fetching {collection}");
        let response: ListResponse<T> = self.fetch(self.http.get(url)).await?;
        Ok(PageResult::from_response(response, query))
    }

    /// Deleting something already gone counts as success.
    async fn delete(&self, collection: &str, id: i64) -> Result<(), AdminError> {
        let url = self.endpoint(&[collection, &id.to_string()])?;
        match self.execute(self.http.delete(url)).await {
            Ok(_) => Ok(()),
            Err(err) if err.is_not_found() => {
                info!(collection, id, "delete target already absent");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

/// REST client for the admin API. Hand out [`UsersEndpoint`] and
/// [`CategoriesEndpoint`] to the page controllers.
#[derive(Clone)]
pub struct HttpAdminApi {
    transport: Arc<ApiTransport>,
}

impl HttpAdminApi {
    pub fn new(
        base_url: &str,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, AdminError> {
        Self::with_client(Client::new(), base_url, credentials)
    }

    pub fn with_client(
        http: Client,
        base_url: &str,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, AdminError> {
        let base_url = Url::parse(base_url.trim())?;
        Ok(Self {
            transport: Arc::new(ApiTransport {
                http,
                base_url,
                credentials,
            }),
        })
    }

    pub fn users(&self) -> UsersEndpoint {
        UsersEndpoint {
            transport: self.transport.clone(),
        }
    }

    pub fn categories(&self) -> CategoriesEndpoint {
        CategoriesEndpoint {
            transport: self.transport.clone(),
        }
    }
}

pub struct UsersEndpoint {
    transport: Arc<ApiTransport>,
}

#[async_trait]
impl RecordSource for UsersEndpoint {
    type Record = UserRecord;

    async fn list(&self, query: &ListQuery) -> Result<PageResult<UserRecord>, AdminError> {
        self.transport.list("users", query).await
    }
}

#[async_trait]
impl UserDirectory for UsersEndpoint {
    async fn create_user(&self, request: &CreateUserRequest) -> Result<UserRecord, AdminError> {
        let url = self.transport.endpoint(&["users"])?;
        self.transport
            .fetch_record(self.transport.http.post(url).json(request))
            .await
    }

    async fn update_user(
        &self,
        id: UserId,
        patch: &UpdateUserRequest,
    ) -> Result<UserRecord, AdminError> {
        let url = self.transport.endpoint(&["users", &id.to_string()])?;
        self.transport
            .fetch_record(self.transport.http.put(url).json(patch))
            .await
    }

    async fn delete_user(&self, id: UserId) -> Result<(), AdminError> {
        self.transport.delete("users", id.0).await
    }
}

pub struct CategoriesEndpoint {
    transport: Arc<ApiTransport>,
}

#[async_trait]
impl RecordSource for CategoriesEndpoint {
    type Record = CategoryRecord;

    async fn list(&self, query: &ListQuery) -> Result<PageResult<CategoryRecord>, AdminError> {
        self.transport.list("categories", query).await
    }
}

#[async_trait]
impl CategoryCatalog for CategoriesEndpoint {
    async fn create_category(
        &self,
        request: &CreateCategoryRequest,
    ) -> Result<CategoryRecord, AdminError> {
        let url = self.transport.endpoint(&["categories"])?;
        self.transport
            .fetch_record(self.transport.http.post(url).json(request))
            .await
    }

    async fn update_category(
        &self,
        id: CategoryId,
        patch: &UpdateCategoryRequest,
    ) -> Result<CategoryRecord, AdminError> {
        let url = self.transport.endpoint(&["categories", &id.to_string()])?;
        self.transport
            .fetch_record(self.transport.http.put(url).json(patch))
            .await
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), AdminError> {
        self.transport.delete("categories", id.0).await
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
