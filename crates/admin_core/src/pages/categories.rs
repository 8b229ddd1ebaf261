use std::sync::Arc;

use shared::domain::CategoryId;
use tokio::sync::mpsc;
use tracing::info;

use crate::{
    config::Settings,
    debounce::SearchDebouncer,
    error::AdminError,
    form::{CategoryDraft, CategoryForm, FormMode},
    interaction::{Confirmer, Notifier},
    loader::{DataLoader, LoadingHandle},
    query::QueryState,
    source::CategoryCatalog,
    tree::{CategoryNode, CategoryTree, ExpansionSet, TreeRow},
};

/// Controller of the category browser: a searchable tree with per-node
/// expand/collapse and create/edit/delete forms. Always shows the first page.
pub struct CategoriesPage<C: CategoryCatalog> {
    loader: DataLoader<C>,
    query: QueryState,
    debouncer: SearchDebouncer,
    settled: mpsc::UnboundedReceiver<String>,
    tree: CategoryTree,
    expansion: ExpansionSet,
    modal: Option<CategoryForm>,
    confirmer: Arc<dyn Confirmer>,
    notifier: Arc<dyn Notifier>,
}

impl<C: CategoryCatalog> CategoriesPage<C> {
    pub fn new(
        catalog: Arc<C>,
        settings: &Settings,
        confirmer: Arc<dyn Confirmer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (debouncer, settled) = SearchDebouncer::new(settings.category_search_debounce());
        Self {
            loader: DataLoader::new(catalog).with_timeout(settings.request_timeout()),
            query: QueryState::new(settings.category_page_size),
            debouncer,
            settled,
            tree: CategoryTree::default(),
            expansion: ExpansionSet::default(),
            modal: None,
            confirmer,
            notifier,
        }
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn tree(&self) -> &CategoryTree {
        &self.tree
    }

    pub fn expansion(&self) -> &ExpansionSet {
        &self.expansion
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    pub fn loading_handle(&self) -> LoadingHandle {
        self.loader.loading_handle()
    }

    pub fn modal(&self) -> Option<&CategoryForm> {
        self.modal.as_ref()
    }

    /// Sets the search the first [`mount`](Self::mount) requests, skipping
    /// the debounce.
    pub fn preset_search(&mut self, search: &str) {
        self.query.set_raw_input(search);
        self.query.settle(search);
    }

    pub async fn mount(&mut self) -> Result<(), AdminError> {
        self.loader.load(&self.query.list_query()).await?;
        self.rebuild_tree().await;
        Ok(())
    }

    async fn reload(&mut self) {
        let query = self.query.list_query();
        if self.loader.load(&query).await.is_ok() {
            self.rebuild_tree().await;
        }
    }

    async fn rebuild_tree(&mut self) {
        let snapshot = self.loader.snapshot().await;
        self.tree = CategoryTree::from_records(&snapshot.items);
    }

    pub fn on_search_input(&mut self, raw: &str) {
        self.query.set_raw_input(raw);
        self.debouncer.push(raw);
    }

    /// Waits for the next settled search value and reloads if it changed the
    /// query. Returns `false` once the debouncer is gone.
    pub async fn apply_next_search(&mut self) -> bool {
        let Some(settled) = self.settled.recv().await else {
            return false;
        };
        if self.query.settle(settled) {
            self.reload().await;
        }
        true
    }

    pub fn rows(&self) -> Vec<TreeRow> {
        self.tree.visible_rows(&self.expansion)
    }

    pub fn toggle(&mut self, id: CategoryId) -> bool {
        self.expansion.toggle(&self.tree, id)
    }

    pub fn expand_all(&mut self) {
        self.expansion.expand_all(&self.tree);
    }

    pub fn collapse_all(&mut self) {
        self.expansion.collapse_all();
    }

    pub fn open_create(&mut self) {
        self.modal = Some(CategoryForm::create(CategoryDraft::default()));
    }

    pub fn open_create_child(&mut self, parent: CategoryId) -> Result<(), AdminError> {
        let node = self.known(parent)?;
        self.modal = Some(CategoryForm::create(CategoryDraft::child_of(node)));
        Ok(())
    }

    pub fn open_edit(&mut self, id: CategoryId) -> Result<(), AdminError> {
        let node = self.known(id)?;
        self.modal = Some(CategoryForm::edit(id, CategoryDraft::from_node(node)));
        Ok(())
    }

    fn known(&self, id: CategoryId) -> Result<&CategoryNode, AdminError> {
        self.tree
            .node(id)
            .ok_or_else(|| AdminError::validation(format!("category {id} is not loaded")))
    }

    pub fn update_field(&mut self, field: &str, value: &str) -> Result<(), AdminError> {
        self.modal
            .as_mut()
            .ok_or_else(|| AdminError::validation("no category form is open"))?
            .set_field(field, value)
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    pub async fn submit(&mut self) -> Result<(), AdminError> {
        let query = self.query.list_query();
        let Some(form) = self.modal.as_mut() else {
            return Err(AdminError::validation("no category form is open"));
        };
        let catalog = self.loader.source();
        let outcome = match form.mode() {
            FormMode::Create => match form.draft().to_create() {
                Ok(request) => self
                    .loader
                    .mutate("create category", catalog.create_category(&request), &query)
                    .await
                    .map(|created| info!(id = %created.id, "category created")),
                Err(err) => Err(err),
            },
            FormMode::Edit(id) => match form.draft().to_update() {
                Ok(patch) => self
                    .loader
                    .mutate("update category", catalog.update_category(id, &patch), &query)
                    .await
                    .map(|_| info!(%id, "category updated")),
                Err(err) => Err(err),
            },
        };

        match outcome {
            Ok(()) => {
                self.modal = None;
                self.rebuild_tree().await;
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
    pub async fn delete(&mut self, id: CategoryId) -> Result<bool, AdminError> {
        let prompt = match self.tree.node(id) {
            Some(node) if node.has_children() => format!(
                "Delete category '{}' with {} direct subcategories? This cannot be undone.",
                node.title,
                node.children.len()
            ),
            Some(node) => format!("Delete category '{}'? This cannot be undone.", node.title),
            None => format!("Delete category #{id}? This cannot be undone."),
        };
        if !self.confirmer.confirm(&prompt).await {
            info!(%id, "category deletion cancelled");
            return Ok(false);
        }

        let query = self.query.list_query();
        let catalog = self.loader.source();
        match self
            .loader
            .mutate("delete category", catalog.delete_category(id), &query)
            .await
        {
            Ok(()) => {
                self.rebuild_tree().await;
                Ok(true)
            }
            Err(err) => {
                self.notifier
                    .alert(&format!("Failed to delete category: {}", err.message()));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/categories_page_tests.rs"]
mod tests;
