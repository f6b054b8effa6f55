use crate::errors::AppError;
use crate::models::permission::DEFAULT_MODEL;
use crate::models::role::RoleCheckbox;
use crate::requests::PermissionInput;

use super::RolesHelpers;

/// Values and choices for the create/edit permission form.
#[derive(Debug, Clone)]
pub struct PermissionFormData {
    /// `None` in create mode.
    pub id: Option<i64>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub model: String,
    pub roles: Vec<RoleCheckbox>,
    /// Known model names, offered as suggestions.
    pub models: Vec<String>,
}

impl PermissionFormData {
    /// Put submitted values back into the form after a failed validation.
    pub fn refill(&mut self, input: &PermissionInput) {
        self.name = input.name.clone();
        self.slug = input.slug.clone();
        self.description = input.description.clone();
        self.model = input.model.clone();
        for role in &mut self.roles {
            role.checked = input.roles.iter().any(|r| r.trim() == role.id.to_string());
        }
    }
}

/// Builds [`PermissionFormData`]; `new(None)` for a blank form,
/// `new(Some(id))` for a form prefilled from an existing permission.
pub struct PermissionFormFields {
    id: Option<i64>,
}

impl PermissionFormFields {
    pub fn new(id: Option<i64>) -> Self {
        Self { id }
    }

    pub async fn handle(&self, helpers: &dyn RolesHelpers) -> Result<PermissionFormData, AppError> {
        let permission = match self.id {
            Some(id) => Some(helpers.find(id).await?.ok_or(AppError::NotFound)?),
            None => None,
        };

        let roles = helpers.role_checkboxes(self.id).await?;
        let mut models = helpers.permission_models().await?;
        if !models.iter().any(|m| m == DEFAULT_MODEL) {
            models.insert(0, DEFAULT_MODEL.to_string());
        }

        let data = match permission {
            Some(p) => PermissionFormData {
                id: Some(p.id),
                name: p.name,
                slug: p.slug,
                description: p.description,
                model: p.model,
                roles,
                models,
            },
            None => PermissionFormData {
                id: None,
                name: String::new(),
                slug: String::new(),
                description: String::new(),
                model: DEFAULT_MODEL.to_string(),
                roles,
                models,
            },
        };
        Ok(data)
    }
}
