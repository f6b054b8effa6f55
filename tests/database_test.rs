//! `PgRolesHelpers` against a live Postgres. Every test returns early when
//! `DATABASE_URL` is unset.

mod common;

use common::*;
use roles_gui::errors::AppError;
use roles_gui::models::permission::PermissionFillData;
use roles_gui::services::RolesHelpers;
use roles_gui::services::database::PgRolesHelpers;

fn fill(slug: &str, roles: Vec<i64>) -> PermissionFillData {
    PermissionFillData {
        name: slug.to_string(),
        slug: slug.to_string(),
        description: String::new(),
        model: "Permission".to_string(),
        roles,
    }
}

fn sorted(mut ids: Vec<i64>) -> Vec<i64> {
    ids.sort();
    ids
}

#[tokio::test]
async fn test_pg_create_grants_roles() {
    let Some(pool) = setup_test_pool().await else { return };
    let helpers = PgRolesHelpers::new(pool.clone());
    let admin = pg_insert_role(&pool, &unique("admin"), 5).await;
    let editor = pg_insert_role(&pool, &unique("editor"), 2).await;
    let slug = unique("edit");

    let created = helpers.create(&fill(&slug, vec![admin, editor])).await.unwrap();
    assert_eq!(created.slug, slug);
    assert_eq!(created.model, "Permission");
    assert!(!created.created_at.is_empty());

    let item = helpers.item_data(created.id).await.unwrap();
    let role_ids = item.roles.iter().map(|r| r.id).collect();
    assert_eq!(sorted(role_ids), sorted(vec![admin, editor]));
    assert_eq!(pg_association_count(&pool, created.id).await, 2);
}

#[tokio::test]
async fn test_pg_create_without_roles() {
    let Some(pool) = setup_test_pool().await else { return };
    let helpers = PgRolesHelpers::new(pool.clone());

    let created = helpers.create(&fill(&unique("view"), vec![])).await.unwrap();
    assert_eq!(pg_association_count(&pool, created.id).await, 0);
    assert!(helpers.find(created.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_pg_update_replaces_attributes_and_roles() {
    let Some(pool) = setup_test_pool().await else { return };
    let helpers = PgRolesHelpers::new(pool.clone());
    let admin = pg_insert_role(&pool, &unique("admin"), 5).await;
    let editor = pg_insert_role(&pool, &unique("editor"), 2).await;
    let created = helpers.create(&fill(&unique("edit"), vec![admin])).await.unwrap();

    let new_slug = unique("publish");
    let mut data = fill(&new_slug, vec![editor]);
    data.description = "Can publish".to_string();
    data.model = "Article".to_string();
    let updated = helpers.update(created.id, &data).await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.slug, new_slug);
    assert_eq!(updated.description, "Can publish");
    assert_eq!(updated.model, "Article");

    let checked: Vec<i64> = helpers
        .role_checkboxes(Some(created.id))
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.checked)
        .map(|r| r.id)
        .collect();
    assert_eq!(checked, vec![editor]);
    assert!(helpers.permission_models().await.unwrap().contains(&"Article".to_string()));
}

#[tokio::test]
async fn test_pg_update_unknown_id() {
    let Some(pool) = setup_test_pool().await else { return };
    let helpers = PgRolesHelpers::new(pool);

    let result = helpers.update(-1, &fill(&unique("ghost"), vec![])).await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_pg_uniqueness_excludes_own_id() {
    let Some(pool) = setup_test_pool().await else { return };
    let helpers = PgRolesHelpers::new(pool);
    let slug = unique("edit");
    let created = helpers.create(&fill(&slug, vec![])).await.unwrap();

    assert!(helpers.slug_taken(&slug, None).await.unwrap());
    assert!(!helpers.slug_taken(&slug, Some(created.id)).await.unwrap());
    assert!(helpers.name_taken(&slug, None).await.unwrap());
    assert!(!helpers.name_taken(&slug, Some(created.id)).await.unwrap());
    assert!(!helpers.slug_taken(&unique("free"), None).await.unwrap());
}

#[tokio::test]
async fn test_pg_destroy_removes_row_and_associations() {
    let Some(pool) = setup_test_pool().await else { return };
    let helpers = PgRolesHelpers::new(pool.clone());
    let role = pg_insert_role(&pool, &unique("editor"), 2).await;
    let user = pg_insert_user(&pool, &unique("ann")).await;
    let created = helpers.create(&fill(&unique("edit"), vec![role])).await.unwrap();
    pg_grant_to_user(&pool, created.id, user).await;
    assert_eq!(pg_association_count(&pool, created.id).await, 2);

    helpers.destroy(created.id).await.unwrap();

    assert!(helpers.find(created.id).await.unwrap().is_none());
    assert_eq!(pg_association_count(&pool, created.id).await, 0);
    assert!(matches!(helpers.item_data(created.id).await, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_pg_destroy_unknown_id_changes_nothing() {
    let Some(pool) = setup_test_pool().await else { return };
    let helpers = PgRolesHelpers::new(pool.clone());
    let role = pg_insert_role(&pool, &unique("editor"), 2).await;
    let created = helpers.create(&fill(&unique("edit"), vec![role])).await.unwrap();

    assert!(matches!(helpers.destroy(-1).await, Err(AppError::NotFound)));
    assert_eq!(pg_association_count(&pool, created.id).await, 1);
}

#[tokio::test]
async fn test_pg_gate_lookups() {
    let Some(pool) = setup_test_pool().await else { return };
    let helpers = PgRolesHelpers::new(pool.clone());
    let role_slug = unique("editor");
    let role = pg_insert_role(&pool, &role_slug, 4).await;
    let user = pg_insert_user(&pool, &unique("bob")).await;
    pg_assign_role(&pool, user, role).await;

    let via_role = helpers.create(&fill(&unique("edit"), vec![role])).await.unwrap();
    let direct = helpers.create(&fill(&unique("publish"), vec![])).await.unwrap();
    pg_grant_to_user(&pool, direct.id, user).await;

    let mut expected = vec![via_role.slug.clone(), direct.slug.clone()];
    expected.sort();
    assert_eq!(helpers.user_permission_slugs(user).await.unwrap(), expected);
    assert_eq!(helpers.user_role_slugs(user).await.unwrap(), vec![role_slug]);
    assert_eq!(helpers.user_level(user).await.unwrap(), 4);

    let stranger = pg_insert_user(&pool, &unique("eve")).await;
    assert_eq!(helpers.user_level(stranger).await.unwrap(), 0);
    assert!(helpers.user_permission_slugs(stranger).await.unwrap().is_empty());
}
