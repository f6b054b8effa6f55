use std::collections::BTreeSet;

use crate::errors::AppError;
use crate::models::permission::PermissionFillData;
use crate::services::RolesHelpers;

use super::validate::{validate_optional, validate_required, validate_slug};
use super::{get_all, get_field};

const NAME_MAX: usize = 60;
const SLUG_MAX: usize = 60;
const MODEL_MAX: usize = 60;
const DESCRIPTION_MAX: usize = 255;

/// Permission form fields as submitted, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionInput {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub model: String,
    pub roles: Vec<String>,
}

impl PermissionInput {
    pub fn from_params(params: &[(String, String)]) -> Self {
        let roles = get_all(params, "roles")
            .into_iter()
            .chain(get_all(params, "roles[]"))
            .filter(|r| !r.trim().is_empty())
            .map(String::from)
            .collect();
        Self {
            name: get_field(params, "name").to_string(),
            slug: get_field(params, "slug").to_string(),
            description: get_field(params, "description").to_string(),
            model: get_field(params, "model").to_string(),
            roles,
        }
    }
}

/// Field-level rules that need no storage access.
pub fn check_fields(input: &PermissionInput) -> Vec<String> {
    let mut errors = vec![];
    errors.extend(validate_required(&input.name, "Name", NAME_MAX));
    errors.extend(validate_required(&input.slug, "Slug", SLUG_MAX));
    if !input.slug.trim().is_empty() {
        errors.extend(validate_slug(&input.slug));
    }
    errors.extend(validate_optional(&input.description, "Description", DESCRIPTION_MAX));
    errors.extend(validate_required(&input.model, "Model", MODEL_MAX));
    errors
}

/// Full validation: field rules, role existence, and name/slug uniqueness
/// (ignoring `except_id`, the record being edited).
async fn validate(
    input: &PermissionInput,
    except_id: Option<i64>,
    helpers: &dyn RolesHelpers,
) -> Result<PermissionFillData, AppError> {
    let mut errors = check_fields(input);

    let known: BTreeSet<i64> = helpers
        .role_checkboxes(None)
        .await?
        .into_iter()
        .map(|r| r.id)
        .collect();
    let mut roles = BTreeSet::new();
    for raw in &input.roles {
        match raw.trim().parse::<i64>() {
            Ok(id) if known.contains(&id) => {
                roles.insert(id);
            }
            _ => {
                errors.push("The selected roles are invalid".to_string());
                break;
            }
        }
    }

    let name = input.name.trim();
    if !name.is_empty() && helpers.name_taken(name, except_id).await? {
        errors.push("The name has already been taken".to_string());
    }
    let slug = input.slug.trim();
    if !slug.is_empty() && helpers.slug_taken(slug, except_id).await? {
        errors.push("The slug has already been taken".to_string());
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(PermissionFillData {
        name: name.to_string(),
        slug: slug.to_string(),
        description: input.description.trim().to_string(),
        model: input.model.trim().to_string(),
        roles: roles.into_iter().collect(),
    })
}

pub struct StorePermissionRequest {
    input: PermissionInput,
}

impl StorePermissionRequest {
    pub fn new(input: PermissionInput) -> Self {
        Self { input }
    }

    pub fn input(&self) -> &PermissionInput {
        &self.input
    }

    /// Validated attributes for a new permission, or `AppError::Validation`.
    pub async fn permission_fill_data(&self, helpers: &dyn RolesHelpers) -> Result<PermissionFillData, AppError> {
        validate(&self.input, None, helpers).await
    }
}

pub struct UpdatePermissionRequest {
    input: PermissionInput,
}

impl UpdatePermissionRequest {
    pub fn new(input: PermissionInput) -> Self {
        Self { input }
    }

    pub fn input(&self) -> &PermissionInput {
        &self.input
    }

    /// Like the store variant, but the permission `id` does not collide with itself.
    pub async fn permission_fill_data(&self, id: i64, helpers: &dyn RolesHelpers) -> Result<PermissionFillData, AppError> {
        validate(&self.input, Some(id), helpers).await
    }
}
