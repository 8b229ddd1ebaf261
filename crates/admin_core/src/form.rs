use shared::{
    domain::{CategoryId, CategoryType, Role, UserId},
    protocol::{
        CreateCategoryRequest, CreateUserRequest, UpdateCategoryRequest, UpdateUserRequest,
        UserRecord,
    },
};

use crate::{error::AdminError, tree::CategoryNode};

/// Editable copy of a record, changed one named field at a time.
pub trait FormDraft {
    /// Shallow merge of a single field by its wire name.
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), AdminError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode<Id> {
    Create,
    Edit(Id),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalForm<D, Id> {
    mode: FormMode<Id>,
    draft: D,
    error: Option<String>,
}

impl<D: FormDraft, Id: Copy> ModalForm<D, Id> {
    pub fn create(draft: D) -> Self {
        Self {
            mode: FormMode::Create,
            draft,
            error: None,
        }
    }

    pub fn edit(id: Id, draft: D) -> Self {
        Self {
            mode: FormMode::Edit(id),
            draft,
            error: None,
        }
    }

    pub fn mode(&self) -> FormMode<Id> {
        self.mode
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), AdminError> {
        self.draft.set_field(field, value)
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }
}

fn unknown_field(form: &str, field: &str) -> AdminError {
    AdminError::validation(format!("{form} form has no field '{field}'"))
}

fn required(label: &str, value: &str) -> Result<String, AdminError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AdminError::validation(format!("{label} is required")));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
}

impl UserDraft {
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            role: record.role,
            password: String::new(),
        }
    }

    pub fn to_create(&self) -> Result<CreateUserRequest, AdminError> {
        Ok(CreateUserRequest {
            first_name: required("first name", &self.first_name)?,
            last_name: required("last name", &self.last_name)?,
            email: required("email", &self.email)?,
            role: self.role,
            password: required("password", &self.password)?,
        })
    }

    /// Full patch of the editable fields. The password is only sent when the
    /// operator typed a new one.
    pub fn to_update(&self) -> Result<UpdateUserRequest, AdminError> {
        Ok(UpdateUserRequest {
            first_name: Some(required("first name", &self.first_name)?),
            last_name: Some(required("last name", &self.last_name)?),
            email: Some(required("email", &self.email)?),
            role: Some(self.role),
            password: Some(self.password.clone()).filter(|p| !p.is_empty()),
        })
    }
}

impl FormDraft for UserDraft {
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), AdminError> {
        match field {
            "firstName" => self.first_name = value.to_string(),
            "lastName" => self.last_name = value.to_string(),
            "email" => self.email = value.to_string(),
            "password" => self.password = value.to_string(),
            "role" => {
                self.role = value
                    .parse()
                    .map_err(|err| AdminError::validation(format!("{err}")))?
            }
            other => return Err(unknown_field("user", other)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDraft {
    pub title: String,
    pub alias: String,
    pub kind: CategoryType,
    pub level: u32,
    pub parent_id: Option<CategoryId>,
}

impl CategoryDraft {
    pub fn from_node(node: &CategoryNode) -> Self {
        Self {
            title: node.title.clone(),
            alias: node.alias.clone(),
            kind: node.kind,
            level: node.level,
            parent_id: node.parent_id,
        }
    }

    /// Blank draft for a child of `parent`, one level below it.
    pub fn child_of(parent: &CategoryNode) -> Self {
        Self {
            kind: parent.kind,
            level: parent.level + 1,
            parent_id: Some(parent.id),
            ..Self::default()
        }
    }

    pub fn to_create(&self) -> Result<CreateCategoryRequest, AdminError> {
        Ok(CreateCategoryRequest {
            title: required("title", &self.title)?,
            alias: required("alias", &self.alias)?,
            kind: self.kind,
            level: self.level,
            parent_id: self.parent_id,
        })
    }

    pub fn to_update(&self) -> Result<UpdateCategoryRequest, AdminError> {
        Ok(UpdateCategoryRequest {
            title: Some(required("title", &self.title)?),
            alias: Some(required("alias", &self.alias)?),
            kind: Some(self.kind),
            level: Some(self.level),
            parent_id: self.parent_id,
        })
    }
}

impl FormDraft for CategoryDraft {
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), AdminError> {
        match field {
            "title" => self.title = value.to_string(),
            "alias" => self.alias = value.to_string(),
            "type" => {
                self.kind = value
                    .parse()
                    .map_err(|err| AdminError::validation(format!("{err}")))?
            }
            "level" => {
                self.level = value.trim().parse().map_err(|_| {
                    AdminError::validation(format!("level must be a whole number, got '{value}'"))
                })?
            }
            "parentId" => {
                let trimmed = value.trim();
                self.parent_id = if trimmed.is_empty() {
                    None
                } else {
                    Some(CategoryId(trimmed.parse().map_err(|_| {
                        AdminError::validation(format!("parent id must be numeric, got '{value}'"))
                    })?))
                };
            }
            other => return Err(unknown_field("category", other)),
        }
        Ok(())
    }
}

pub type UserForm = ModalForm<UserDraft, UserId>;
pub type CategoryForm = ModalForm<CategoryDraft, CategoryId>;
