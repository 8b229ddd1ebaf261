use std::sync::Arc;

use shared::domain::UserId;
use tokio::sync::mpsc;
use tracing::info;

use crate::{
    config::Settings,
    debounce::SearchDebouncer,
    error::AdminError,
    form::{FormMode, UserDraft, UserForm},
    interaction::{Confirmer, Notifier},
    loader::{DataLoader, LoadingHandle},
    pagination::PaginationController,
    query::QueryState,
    source::UserDirectory,
    view::{UserRow, UsersView},
};

/// Controller of the user management page: a searchable, paginated table
/// with create/edit forms and confirmed deletion.
pub struct UsersPage<D: UserDirectory> {
    loader: DataLoader<D>,
    query: QueryState,
    pagination: PaginationController,
    debouncer: SearchDebouncer,
    settled: mpsc::UnboundedReceiver<String>,
    modal: Option<UserForm>,
    confirmer: Arc<dyn Confirmer>,
    notifier: Arc<dyn Notifier>,
}

impl<D: UserDirectory> UsersPage<D> {
    pub fn new(
        directory: Arc<D>,
        settings: &Settings,
        confirmer: Arc<dyn Confirmer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (debouncer, settled) = SearchDebouncer::new(settings.user_search_debounce());
        Self {
            loader: DataLoader::new(directory).with_timeout(settings.request_timeout()),
            query: QueryState::new(settings.users_per_page),
            pagination: PaginationController::new(settings.users_per_page),
            debouncer,
            settled,
            modal: None,
            confirmer,
            notifier,
        }
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn pagination(&self) -> &PaginationController {
        &self.pagination
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    /// Stays readable while an operation on the page is awaiting its load.
    pub fn loading_handle(&self) -> LoadingHandle {
        self.loader.loading_handle()
    }

    pub fn modal(&self) -> Option<&UserForm> {
        self.modal.as_ref()
    }

    /// Sets the search and page the first [`mount`](Self::mount) requests,
    /// skipping the debounce.
    pub fn preset(&mut self, search: &str, page: u32) {
        self.query.set_raw_input(search);
        self.query.settle(search);
        self.query.set_page(page);
        self.pagination.set_page(page);
    }

    /// Initial fetch with the starting query.
    pub async fn mount(&mut self) -> Result<(), AdminError> {
        self.loader.load(&self.query.list_query()).await?;
        self.sync_pagination().await;
        Ok(())
    }

    /// Loads the current query. If that fails, paging goes back to `shown`,
    /// the state the rows on screen were fetched with.
    async fn reload(&mut self, shown: PaginationController) {
        match self.loader.load(&self.query.list_query()).await {
            Ok(()) => self.sync_pagination().await,
            Err(_) => {
                self.pagination = shown;
                self.query
                    .restore_paging(shown.current_page(), shown.items_per_page());
            }
        }
    }

    async fn sync_pagination(&mut self) {
        let snapshot = self.loader.snapshot().await;
        self.pagination.sync(&snapshot);
        self.query
            .restore_paging(snapshot.page, self.pagination.items_per_page());
    }

    pub fn on_search_input(&mut self, raw: &str) {
        self.query.set_raw_input(raw);
        self.debouncer.push(raw);
    }

    /// Waits for the next settled search value and reloads if the query no
    /// longer matches the rows shown. Editing the input already moved the
    /// query to page 1, so this also covers input that was typed and erased.
    /// Returns `false` once the debouncer is gone.
    pub async fn apply_next_search(&mut self) -> bool {
        let Some(settled) = self.settled.recv().await else {
            return false;
        };
        let shown = self.pagination;
        let query_changed = self.query.settle(settled);
        if query_changed || self.query.page() != shown.current_page() {
            self.pagination.set_page(self.query.page());
            self.reload(shown).await;
        }
        true
    }

    /// Reloads unless `page` is already the one shown. Compared against the
    /// shown page, not the query, since a keystroke moves the query to page 1
    /// before anything is reloaded.
    pub async fn set_page(&mut self, page: u32) {
        let shown = self.pagination;
        self.pagination.set_page(page);
        self.query.set_page(page);
        if page != shown.current_page() {
            self.reload(shown).await;
        }
    }

    pub async fn set_items_per_page(&mut self, items_per_page: u32) {
        let shown = self.pagination;
        self.pagination.set_items_per_page(items_per_page);
        let query_changed = self.query.set_page_size(items_per_page);
        if query_changed || self.pagination != shown {
            self.reload(shown).await;
        }
    }

    pub async fn view(&self) -> UsersView {
        let snapshot = self.loader.snapshot().await;
        let loading = self.loader.is_loading();
        UsersView {
            rows: snapshot.items.iter().map(UserRow::from).collect(),
            loading,
            pagination: self.pagination,
            show_pagination: self.pagination.is_visible(loading),
        }
    }

    pub fn open_create(&mut self) {
        self.modal = Some(UserForm::create(UserDraft::default()));
    }

    /// Opens the edit form pre-filled from the loaded row with `id`.
    pub async fn open_edit(&mut self, id: UserId) -> Result<(), AdminError> {
        let snapshot = self.loader.snapshot().await;
        let record = snapshot
            .items
            .iter()
            .find(|user| user.id == id)
            .ok_or_else(|| AdminError::validation(format!("user {id} is not on this page")))?;
        self.modal = Some(UserForm::edit(id, UserDraft::from_record(record)));
        Ok(())
    }

    pub fn update_field(&mut self, field: &str, value: &str) -> Result<(), AdminError> {
        self.modal
            .as_mut()
            .ok_or_else(|| AdminError::validation("no user form is open"))?
            .set_field(field, value)
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// Sends the open form. On success the form closes and the list
    /// reloads; on failure the form stays open with the error attached.
    pub async fn submit(&mut self) -> Result<(), AdminError> {
        let query = self.query.list_query();
        let Some(form) = self.modal.as_mut() else {
            return Err(AdminError::validation("no user form is open"));
        };
        let directory = self.loader.source();
        let outcome = match form.mode() {
            FormMode::Create => match form.draft().to_create() {
                Ok(request) => self
                    .loader
                    .mutate("create user", directory.create_user(&request), &query)
                    .await
                    .map(|created| info!(id = %created.id, "user created")),
                Err(err) => Err(err),
            },
            FormMode::Edit(id) => match form.draft().to_update() {
                Ok(patch) => self
                    .loader
                    .mutate("update user", directory.update_user(id, &patch), &query)
                    .await
                    .map(|_| info!(%id, "user updated")),
                Err(err) => Err(err),
            },
        };

        match outcome {
            Ok(()) => {
                self.modal = None;
                self.sync_pagination().await;
                Ok(())
            }
            Err(err) => {
                form.fail(err.message());
                self.notifier.alert(err.message());
                Err(err)
            }
        }
    }

    /// Deletes after the operator confirms. Returns whether a delete was
    /// issued.
    pub async fn delete(&mut self, id: UserId) -> Result<bool, AdminError> {
        let label = self
            .loader
            .snapshot()
            .await
            .items
            .iter()
            .find(|user| user.id == id)
            .map(|user| format!("{} <{}>", user.display_name(), user.email))
            .unwrap_or_else(|| format!("#{id}"));
        if !self
            .confirmer
            .confirm(&format!("Delete user {label}? This cannot be undone."))
            .await
        {
            info!(%id, "user deletion cancelled");
            return Ok(false);
        }

        let query = self.query.list_query();
        let directory = self.loader.source();
        match self
            .loader
            .mutate("delete user", directory.delete_user(id), &query)
            .await
        {
            Ok(()) => {
                self.sync_pagination().await;
                Ok(true)
            }
            Err(err) => {
                self.notifier
                    .alert(&format!("Failed to delete user: {}", err.message()));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/users_page_tests.rs"]
mod tests;
