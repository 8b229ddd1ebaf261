//! In-memory collaborators shared by the loader and page tests.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use shared::{
    domain::{CategoryId, CategoryType, Role, UserId},
    protocol::{
        CategoryRecord, CreateCategoryRequest, CreateUserRequest, UpdateCategoryRequest,
        UpdateUserRequest, UserRecord,
    },
};
use tokio::sync::Mutex;

use crate::{
    error::{AdminError, ErrorKind},
    interaction::{Confirmer, Notifier},
    source::{CategoryCatalog, ListQuery, PageResult, RecordSource, UserDirectory},
};

pub fn user(id: i64, first_name: &str) -> UserRecord {
    UserRecord {
        id: UserId(id),
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        email: format!("{}@example.com", first_name.to_ascii_lowercase()),
        role: Role::User,
        words_used: 0,
        total_words: 1000,
        created_at: None,
        updated_at: None,
    }
}

pub fn category(id: i64, title: &str, children: Option<Vec<CategoryRecord>>) -> CategoryRecord {
    CategoryRecord {
        id: CategoryId(id),
        title: title.to_string(),
        alias: title.to_ascii_lowercase(),
        kind: CategoryType::Blueprint,
        level: 0,
        parent_id: None,
        children,
    }
}

pub fn page_of<T>(items: Vec<T>, page: u32, total_pages: u32, page_size: u32) -> PageResult<T> {
    let total_items = u64::from(total_pages.saturating_sub(1)) * u64::from(page_size)
        + items.len() as u64;
    PageResult {
        items,
        page,
        total_pages,
        total_items,
        page_size,
    }
}

pub fn transport_error() -> AdminError {
    AdminError::new(ErrorKind::Transport, "connection refused")
}

/// Records every call; list answers come from a queue, falling back to a
/// fixed page once the queue is drained.
pub struct FakeStore<T> {
    pub list_calls: Mutex<Vec<ListQuery>>,
    pub scripted: Mutex<VecDeque<Result<PageResult<T>, AdminError>>>,
    pub fallback: Mutex<PageResult<T>>,
    pub mutation_error: Mutex<Option<AdminError>>,
    pub mutation_calls: AtomicUsize,
    pub latency: Mutex<Option<Duration>>,
}

impl<T> FakeStore<T> {
    pub fn new(fallback: PageResult<T>) -> Arc<Self> {
        Arc::new(Self {
            list_calls: Mutex::new(Vec::new()),
            scripted: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(fallback),
            mutation_error: Mutex::new(None),
            mutation_calls: AtomicUsize::new(0),
            latency: Mutex::new(None),
        })
    }

    pub async fn script(&self, result: Result<PageResult<T>, AdminError>) {
        self.scripted.lock().await.push_back(result);
    }

    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.lock().await = Some(latency);
    }

    pub async fn fail_mutations_with(&self, err: AdminError) {
        *self.mutation_error.lock().await = Some(err);
    }

    pub async fn list_calls(&self) -> Vec<ListQuery> {
        self.list_calls.lock().await.clone()
    }

    async fn mutation_outcome(&self) -> Result<(), AdminError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        match self.mutation_error.lock().await.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<T: Clone> FakeStore<T> {
    async fn answer(&self, query: &ListQuery) -> Result<PageResult<T>, AdminError> {
        self.list_calls.lock().await.push(query.clone());
        let latency = *self.latency.lock().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(next) = self.scripted.lock().await.pop_front() {
            return next;
        }
        Ok(self.fallback.lock().await.clone())
    }
}

pub struct FakeUsers {
    pub store: Arc<FakeStore<UserRecord>>,
    pub created: Mutex<Vec<CreateUserRequest>>,
    pub updated: Mutex<Vec<(UserId, UpdateUserRequest)>>,
    pub deleted: Mutex<Vec<UserId>>,
}

impl FakeUsers {
    pub fn new(fallback: PageResult<UserRecord>) -> Arc<Self> {
        Arc::new(Self {
            store: FakeStore::new(fallback),
            created: Mutex::new(Vec::new()),
            updated: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl RecordSource for FakeUsers {
    type Record = UserRecord;

    async fn list(&self, query: &ListQuery) -> Result<PageResult<UserRecord>, AdminError> {
        self.store.answer(query).await
    }
}

#[async_trait]
impl UserDirectory for FakeUsers {
    async fn create_user(&self, request: &CreateUserRequest) -> Result<UserRecord, AdminError> {
        self.store.mutation_outcome().await?;
        self.created.lock().await.push(request.clone());
        let mut created = user(1000, &request.first_name);
        created.last_name = request.last_name.clone();
        created.email = request.email.clone();
        created.role = request.role;
        Ok(created)
    }

    async fn update_user(
        &self,
        id: UserId,
        patch: &UpdateUserRequest,
    ) -> Result<UserRecord, AdminError> {
        self.store.mutation_outcome().await?;
        self.updated.lock().await.push((id, patch.clone()));
        let mut updated = user(id.0, patch.first_name.as_deref().unwrap_or("Updated"));
        if let Some(role) = patch.role {
            updated.role = role;
        }
        Ok(updated)
    }

    async fn delete_user(&self, id: UserId) -> Result<(), AdminError> {
        self.store.mutation_outcome().await?;
        self.deleted.lock().await.push(id);
        Ok(())
    }
}

pub struct FakeCategories {
    pub store: Arc<FakeStore<CategoryRecord>>,
    pub created: Mutex<Vec<CreateCategoryRequest>>,
    pub updated: Mutex<Vec<(CategoryId, UpdateCategoryRequest)>>,
    pub deleted: Mutex<Vec<CategoryId>>,
}

impl FakeCategories {
    pub fn new(fallback: PageResult<CategoryRecord>) -> Arc<Self> {
        Arc::new(Self {
            store: FakeStore::new(fallback),
            created: Mutex::new(Vec::new()),
            updated: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl RecordSource for FakeCategories {
    type Record = CategoryRecord;

    async fn list(&self, query: &ListQuery) -> Result<PageResult<CategoryRecord>, AdminError> {
        self.store.answer(query).await
    }
}

#[async_trait]
impl CategoryCatalog for FakeCategories {
    async fn create_category(
        &self,
        request: &CreateCategoryRequest,
    ) -> Result<CategoryRecord, AdminError> {
        self.store.mutation_outcome().await?;
        self.created.lock().await.push(request.clone());
        let mut created = category(500, &request.title, None);
        created.parent_id = request.parent_id;
        created.level = request.level;
        Ok(created)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        patch: &UpdateCategoryRequest,
    ) -> Result<CategoryRecord, AdminError> {
        self.store.mutation_outcome().await?;
        self.updated.lock().await.push((id, patch.clone()));
        Ok(category(id.0, patch.title.as_deref().unwrap_or("Updated"), None))
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), AdminError> {
        self.store.mutation_outcome().await?;
        self.deleted.lock().await.push(id);
        Ok(())
    }
}

pub struct ScriptedConfirmer {
    answer: AtomicBool,
    pub prompts: std::sync::Mutex<Vec<String>>,
}

impl ScriptedConfirmer {
    pub fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer: AtomicBool::new(answer),
            prompts: std::sync::Mutex::new(Vec::new()),
        })
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().expect("prompts lock").len()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(prompt.to_string());
        self.answer.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub alerts: std::sync::Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().expect("alerts lock").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts
            .lock()
            .expect("alerts lock")
            .push(message.to_string());
    }
}
