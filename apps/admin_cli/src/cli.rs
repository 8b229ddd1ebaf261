use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "admin", about = "Back-office administration for users and categories")]
pub struct Cli {
    /// Overrides `api_base_url` from admin.toml / ADMIN_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    /// Bearer token for the session; overrides ADMIN_API_TOKEN.
    #[arg(long, global = true)]
    pub token: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(subcommand)]
    Users(UsersCommand),
    #[command(subcommand)]
    Categories(CategoriesCommand),
}

/// Which page of the user table to act on.
#[derive(Args, Debug, Default)]
pub struct UserSelection {
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub per_page: Option<u32>,
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct UserFields {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// `admin` or `user`.
    #[arg(long)]
    pub role: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
}

impl UserFields {
    /// Form field names paired with the values that were given.
    pub fn assignments(&self) -> Vec<(&'static str, &str)> {
        [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("role", &self.role),
            ("password", &self.password),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|value| (field, value)))
        .collect()
    }
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    List {
        #[command(flatten)]
        selection: UserSelection,
    },
    Create {
        #[command(flatten)]
        fields: UserFields,
    },
    /// Edits a user shown on the selected page.
    Update {
        id: i64,
        #[command(flatten)]
        selection: UserSelection,
        #[command(flatten)]
        fields: UserFields,
    },
    Delete {
        id: i64,
        #[command(flatten)]
        selection: UserSelection,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct CategoryFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub alias: Option<String>,
    /// `blueprint` or `project`.
    #[arg(long = "type")]
    pub kind: Option<String>,
    #[arg(long)]
    pub level: Option<String>,
}

impl CategoryFields {
    pub fn assignments(&self) -> Vec<(&'static str, &str)> {
        [
            ("title", &self.title),
            ("alias", &self.alias),
            ("type", &self.kind),
            ("level", &self.level),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|value| (field, value)))
        .collect()
    }
}

#[derive(Subcommand, Debug)]
pub enum CategoriesCommand {
    Tree {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        expand_all: bool,
        /// Expand only these categories.
        #[arg(long = "expand", value_name = "ID")]
        expand: Vec<i64>,
    },
    Create {
        /// Create as a subcategory of this one.
        #[arg(long)]
        parent: Option<i64>,
        #[command(flatten)]
        fields: CategoryFields,
    },
    Update {
        id: i64,
        #[command(flatten)]
        fields: CategoryFields,
    },
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
}
