mod cli;
mod console;
mod render;

use std::sync::Arc;

use admin_core::{
    http::{CategoriesEndpoint, UsersEndpoint},
    interaction::{AssumeYes, Confirmer, Notifier},
    load_settings, CategoriesPage, CredentialProvider, HttpAdminApi, NoCredentials, Settings,
    StaticToken, UsersPage,
};
use anyhow::{Context, Result};
use clap::Parser;
use shared::domain::{CategoryId, UserId};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{CategoriesCommand, Cli, Command, UserSelection, UsersCommand},
    console::{ConsoleNotifier, StdinConfirmer},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings()?;
    if let Some(url) = cli.api_url {
        settings.api_base_url = url;
    }
    if let Some(token) = cli.token {
        settings.api_token = Some(token);
    }
    let credentials: Arc<dyn CredentialProvider> = match settings.api_token.clone() {
        Some(token) => Arc::new(StaticToken::new(token)),
        None => Arc::new(NoCredentials),
    };
    let api = HttpAdminApi::new(&settings.api_base_url, credentials)
        .with_context(|| format!("invalid api url '{}'", settings.api_base_url))?;
    debug!(api = %settings.api_base_url, "admin client ready");

    match cli.command {
        Command::Users(command) => run_users(command, api.users(), settings).await,
        Command::Categories(command) => run_categories(command, api.categories(), &settings).await,
    }
}

fn confirmer(skip_prompt: bool) -> Arc<dyn Confirmer> {
    if skip_prompt {
        Arc::new(AssumeYes)
    } else {
        Arc::new(StdinConfirmer)
    }
}

fn notifier() -> Arc<dyn Notifier> {
    Arc::new(ConsoleNotifier)
}

/// Mounts the users page directly on the selected search and page.
async fn open_users_page(
    users: UsersEndpoint,
    mut settings: Settings,
    selection: &UserSelection,
    confirmer: Arc<dyn Confirmer>,
) -> Result<UsersPage<UsersEndpoint>> {
    if let Some(per_page) = selection.per_page {
        settings.users_per_page = per_page;
    }
    let mut page = UsersPage::new(Arc::new(users), &settings, confirmer, notifier());
    page.preset(
        selection.search.as_deref().unwrap_or_default(),
        selection.page.unwrap_or(1),
    );
    page.mount().await.context("failed to load users")?;
    Ok(page)
}

async fn run_users(command: UsersCommand, users: UsersEndpoint, settings: Settings) -> Result<()> {
    match command {
        UsersCommand::List { selection } => {
            let page = open_users_page(users, settings, &selection, confirmer(true)).await?;
            println!("{}", render::users_table(&page.view().await));
        }
        UsersCommand::Create { fields } => {
            let mut page =
                open_users_page(users, settings, &UserSelection::default(), confirmer(true))
                    .await?;
            page.open_create();
            for (field, value) in fields.assignments() {
                page.update_field(field, value)?;
            }
            page.submit().await?;
            println!("User created.");
        }
        UsersCommand::Update {
            id,
            selection,
            fields,
        } => {
            let mut page = open_users_page(users, settings, &selection, confirmer(true)).await?;
            page.open_edit(UserId(id)).await?;
            for (field, value) in fields.assignments() {
                page.update_field(field, value)?;
            }
            page.submit().await?;
            println!("User {id} updated.");
        }
        UsersCommand::Delete { id, selection, yes } => {
            let mut page = open_users_page(users, settings, &selection, confirmer(yes)).await?;
            if page.delete(UserId(id)).await? {
                println!("User {id} deleted.");
            } else {
                println!("Cancelled.");
            }
        }
    }
    Ok(())
}

async fn open_categories_page(
    categories: CategoriesEndpoint,
    settings: &Settings,
    search: &str,
    confirmer: Arc<dyn Confirmer>,
) -> Result<CategoriesPage<CategoriesEndpoint>> {
    let mut page = CategoriesPage::new(Arc::new(categories), settings, confirmer, notifier());
    page.preset_search(search);
    page.mount().await.context("failed to load categories")?;
    Ok(page)
}

async fn run_categories(
    command: CategoriesCommand,
    categories: CategoriesEndpoint,
    settings: &Settings,
) -> Result<()> {
    match command {
        CategoriesCommand::Tree {
            search,
            expand_all,
            expand,
        } => {
            let mut page = open_categories_page(
                categories,
                settings,
                search.as_deref().unwrap_or_default(),
                confirmer(true),
            )
            .await?;
            if expand_all {
                page.expand_all();
            }
            for id in expand {
                page.toggle(CategoryId(id));
            }
            println!("{}", render::category_tree(&page.rows()));
        }
        CategoriesCommand::Create { parent, fields } => {
            let mut page = open_categories_page(categories, settings, "", confirmer(true)).await?;
            match parent {
                Some(parent) => page.open_create_child(CategoryId(parent))?,
                None => page.open_create(),
            }
            for (field, value) in fields.assignments() {
                page.update_field(field, value)?;
            }
            page.submit().await?;
            println!("Category created.");
        }
        CategoriesCommand::Update { id, fields } => {
            let mut page = open_categories_page(categories, settings, "", confirmer(true)).await?;
            page.open_edit(CategoryId(id))?;
            for (field, value) in fields.assignments() {
                page.update_field(field, value)?;
            }
            page.submit().await?;
            println!("Category {id} updated.");
        }
        CategoriesCommand::Delete { id, yes } => {
            let mut page = open_categories_page(categories, settings, "", confirmer(yes)).await?;
            if page.delete(CategoryId(id)).await? {
                println!("Category {id} deleted.");
            } else {
                println!("Cancelled.");
            }
        }
    }
    Ok(())
}
