//! Persistence tests against `SQLite` with the migrated schema.

use chrono::{Duration, Utc};
use closet::db::{ConstraintKind, Store, constraint_violation};
use closet::entities::catalog::{Category, Color, DEFAULT_IMG_NAME, DEFAULT_PRIORITY};
use closet::entities::{actions, users};
use closet::models::action::{ActionFilter, ActionType, NewAction, Target};
use closet::models::catalog::{CatalogUpdate, NewCatalogItem};
use closet::models::user::{NewUser, UserUpdate};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, Iterable, PaginatorTrait, Set, Statement,
};

async fn test_store() -> Store {
    Store::new("sqlite::memory:")
        .await
        .expect("failed to open test store")
}

/// Removes the database file when dropped, even if the test panics.
struct TempDb(std::path::PathBuf);

impl TempDb {
    fn new() -> Self {
        Self(std::env::temp_dir().join(format!("closet-store-test-{}.db", uuid::Uuid::new_v4())))
    }

    fn url(&self) -> String {
        format!("sqlite:{}", self.0.display())
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn new_user(username: &str) -> NewUser {
    NewUser {
        first_name: "Test".to_string(),
        last_name: None,
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: "correct horse".to_string(),
        role: None,
    }
}

async fn raw_exec(store: &Store, sql: &str) -> anyhow::Result<()> {
    let backend = store.conn.get_database_backend();
    store
        .conn
        .execute(Statement::from_string(backend, sql.to_string()))
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_ada_blue_shirt_closet() {
    let store = test_store().await;

    let ada = store
        .create_user(NewUser {
            first_name: "Ada".to_string(),
            last_name: Some("Lovelace".to_string()),
            username: "ada99".to_string(),
            email: "ada@example.com".to_string(),
            password: "analytical engine".to_string(),
            role: None,
        })
        .await
        .unwrap();

    assert_eq!(ada.role, users::Role::Basic);

    let shirt = store
        .add_catalog_item(
            NewCatalogItem::new("Blue Shirt", Category::Shirt, Color::Blue, "M").owned_by(ada.id),
        )
        .await
        .unwrap();

    let closet = store.find_catalog_items_for_user(ada.id).await.unwrap();
    assert_eq!(closet, vec![shirt.clone()]);
    assert_eq!(closet[0].name, "Blue Shirt");
    assert_eq!(closet[0].user_id, Some(ada.id));
    assert_eq!(store.count_catalog_items_for_user(ada.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_catalog_defaults() {
    let store = test_store().await;
    let user = store.create_user(new_user("defaults")).await.unwrap();

    let item = store
        .add_catalog_item(
            NewCatalogItem::new("Gray Socks", Category::Socks, Color::Gray, "S").owned_by(user.id),
        )
        .await
        .unwrap();

    assert_eq!(item.times_worn, 0);
    assert_eq!(item.priority, DEFAULT_PRIORITY);
    assert_eq!(item.img_name, DEFAULT_IMG_NAME);
    assert!(item.last_worn.is_none());
}

#[tokio::test]
async fn test_every_category_and_color_pair_inserts() {
    let store = test_store().await;
    let user = store.create_user(new_user("wardrobe")).await.unwrap();

    let categories: Vec<Category> = Category::iter().collect();
    let colors: Vec<Color> = Color::iter().collect();

    for category in &categories {
        for color in &colors {
            store
                .add_catalog_item(
                    NewCatalogItem::new(format!("{color} {category}"), *category, *color, "M")
                        .owned_by(user.id),
                )
                .await
                .unwrap_or_else(|e| panic!("{category}/{color} rejected: {e:#}"));
        }
    }

    let expected = u64::try_from(categories.len() * colors.len()).unwrap();
    assert_eq!(
        store.count_catalog_items_for_user(user.id).await.unwrap(),
        expected
    );
}

#[tokio::test]
async fn test_unknown_category_rejected_by_storage() {
    let store = test_store().await;
    let user = store.create_user(new_user("jacketfan")).await.unwrap();

    let err = raw_exec(
        &store,
        &format!(
            "INSERT INTO catalog (name, category, color, size, user_id) \
             VALUES ('Denim', 'Jacket', 'Blue', 'M', {})",
            user.id
        ),
    )
    .await
    .unwrap_err();

    assert_eq!(constraint_violation(&err), Some(ConstraintKind::Check));
    assert_eq!(
        store.count_catalog_items_for_user(user.id).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_unknown_color_and_role_rejected_by_storage() {
    let store = test_store().await;
    let user = store.create_user(new_user("teal")).await.unwrap();

    let err = raw_exec(
        &store,
        &format!(
            "INSERT INTO catalog (name, category, color, size, user_id) \
             VALUES ('Tee', 'Shirt', 'Teal', 'M', {})",
            user.id
        ),
    )
    .await
    .unwrap_err();
    assert_eq!(constraint_violation(&err), Some(ConstraintKind::Check));

    let err = raw_exec(
        &store,
        "INSERT INTO users (first_name, username, email, role) \
         VALUES ('Root', 'root', 'root@example.com', 'superuser')",
    )
    .await
    .unwrap_err();
    assert_eq!(constraint_violation(&err), Some(ConstraintKind::Check));
}

#[tokio::test]
async fn test_priority_and_times_worn_ranges() {
    let store = test_store().await;
    let user = store.create_user(new_user("ranges")).await.unwrap();

    let err = store
        .add_catalog_item(
            NewCatalogItem::new("Red Hat", Category::Hat, Color::Red, "L")
                .owned_by(user.id)
                .with_priority(6),
        )
        .await
        .unwrap_err();
    assert_eq!(constraint_violation(&err), Some(ConstraintKind::Check));

    let item = store
        .add_catalog_item(
            NewCatalogItem::new("Red Hat", Category::Hat, Color::Red, "L")
                .owned_by(user.id)
                .with_priority(1),
        )
        .await
        .unwrap();

    let err = raw_exec(
        &store,
        &format!("UPDATE catalog SET times_worn = -1 WHERE id = {}", item.id),
    )
    .await
    .unwrap_err();
    assert_eq!(constraint_violation(&err), Some(ConstraintKind::Check));

    let unchanged = store.get_catalog_item(item.id).await.unwrap().unwrap();
    assert_eq!(unchanged.times_worn, 0);
}

#[tokio::test]
async fn test_missing_required_column_is_not_null_violation() {
    let store = test_store().await;

    let err = raw_exec(
        &store,
        "INSERT INTO catalog (category, color, size) VALUES ('Shirt', 'Blue', 'M')",
    )
    .await
    .unwrap_err();

    assert_eq!(constraint_violation(&err), Some(ConstraintKind::NotNull));
}

#[tokio::test]
async fn test_duplicate_username_and_email() {
    let store = test_store().await;
    store.create_user(new_user("ada99")).await.unwrap();

    let err = store
        .create_user(NewUser {
            email: "someone-else@example.com".to_string(),
            ..new_user("ada99")
        })
        .await
        .unwrap_err();
    assert_eq!(constraint_violation(&err), Some(ConstraintKind::Unique));

    let err = store
        .create_user(NewUser {
            email: "ada99@example.com".to_string(),
            ..new_user("grace")
        })
        .await
        .unwrap_err();
    assert_eq!(constraint_violation(&err), Some(ConstraintKind::Unique));

    assert_eq!(store.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_username_lookup_is_case_sensitive() {
    let store = test_store().await;
    store.create_user(new_user("Ada")).await.unwrap();

    assert!(store.get_user_by_username("Ada").await.unwrap().is_some());
    assert!(store.get_user_by_username("ada").await.unwrap().is_none());
}

#[tokio::test]
async fn test_foreign_keys_enforced() {
    let store = test_store().await;

    let err = store
        .add_catalog_item(
            NewCatalogItem::new("Orphan", Category::Shoes, Color::Black, "9").owned_by(999),
        )
        .await
        .unwrap_err();
    assert_eq!(constraint_violation(&err), Some(ConstraintKind::ForeignKey));

    let user = store.create_user(new_user("owner")).await.unwrap();
    store
        .add_catalog_item(
            NewCatalogItem::new("Boots", Category::Shoes, Color::Brown, "9").owned_by(user.id),
        )
        .await
        .unwrap();

    let err = store.delete_user(user.id).await.unwrap_err();
    assert_eq!(constraint_violation(&err), Some(ConstraintKind::ForeignKey));
    assert!(store.get_user(user.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_user_without_rows_can_be_deleted() {
    let store = test_store().await;
    let user = store.create_user(new_user("shortlived")).await.unwrap();

    assert!(store.delete_user(user.id).await.unwrap());
    assert!(!store.delete_user(user.id).await.unwrap());
    assert!(store.get_user(user.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_credentials_and_password_change() {
    let store = test_store().await;
    let user = store.create_user(new_user("secretive")).await.unwrap();

    assert!(
        store
            .verify_user_credentials("secretive", "correct horse")
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        store
            .verify_user_credentials("secretive", "wrong")
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        store
            .verify_user_credentials("nobody", "correct horse")
            .await
            .unwrap()
            .is_none()
    );

    store
        .set_user_password(user.id, "battery staple")
        .await
        .unwrap();
    assert!(
        store
            .verify_user_credentials("secretive", "correct horse")
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        store
            .verify_user_credentials("secretive", "battery staple")
            .await
            .unwrap()
            .is_some()
    );

    let model = users::Entity::find_by_id(user.id)
        .one(&store.conn)
        .await
        .unwrap()
        .unwrap();
    let hash = model.password_hash.clone().unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(!hash.contains("battery staple"));
    assert!(model.check_password("battery staple"));
}

#[tokio::test]
async fn test_update_user_and_item() {
    let store = test_store().await;
    let user = store.create_user(new_user("editable")).await.unwrap();

    let updated = store
        .update_user(
            user.id,
            UserUpdate {
                last_name: Some(Some("Hopper".to_string())),
                role: Some(users::Role::Admin),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.last_name.as_deref(), Some("Hopper"));
    assert!(updated.is_admin());

    assert!(
        store
            .update_user(999, UserUpdate::default())
            .await
            .unwrap()
            .is_none()
    );

    let item = store
        .add_catalog_item(
            NewCatalogItem::new("Parka", Category::Outerwear, Color::Green, "XL")
                .owned_by(user.id),
        )
        .await
        .unwrap();

    let item = store
        .update_catalog_item(
            item.id,
            CatalogUpdate {
                color: Some(Color::Yellow),
                priority: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.color, Color::Yellow);
    assert_eq!(item.priority, 2);
    assert_eq!(item.name, "Parka");
}

#[tokio::test]
async fn test_closet_is_ordered_by_priority() {
    let store = test_store().await;
    let user = store.create_user(new_user("ordered")).await.unwrap();

    for (name, priority) in [("Later", 5), ("First", 1), ("Middle", 3)] {
        store
            .add_catalog_item(
                NewCatalogItem::new(name, Category::Shirt, Color::White, "M")
                    .owned_by(user.id)
                    .with_priority(priority),
            )
            .await
            .unwrap();
    }

    let names: Vec<_> = store
        .find_catalog_items_for_user(user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.name)
        .collect();
    assert_eq!(names, ["First", "Middle", "Later"]);
}

#[tokio::test]
async fn test_record_wear() {
    let store = test_store().await;
    let user = store.create_user(new_user("wearer")).await.unwrap();
    let item = store
        .add_catalog_item(
            NewCatalogItem::new("Shorts", Category::Shorts, Color::Tan, "M").owned_by(user.id),
        )
        .await
        .unwrap();

    let worn_at = Utc::now();
    store.record_wear(item.id, worn_at).await.unwrap();
    let item = store
        .record_wear(item.id, worn_at)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(item.times_worn, 2);
    assert_eq!(
        item.last_worn.map(|t| t.timestamp()),
        Some(worn_at.timestamp())
    );

    assert!(store.record_wear(999, worn_at).await.unwrap().is_none());
}

#[tokio::test]
async fn test_action_timestamps_are_per_row() {
    let store = test_store().await;
    let user = store.create_user(new_user("clock")).await.unwrap();

    let before = Utc::now();
    let first = store
        .record_action(NewAction::new(ActionType::Login, user.id).target(Target::User(user.id)))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let second = store
        .record_action(NewAction::new(ActionType::Login, user.id).target(Target::User(user.id)))
        .await
        .unwrap();
    let after = Utc::now();

    assert!(first.timestamp >= before);
    assert!(second.timestamp > first.timestamp);
    assert!(second.timestamp <= after);

    let stored = store.get_action(first.id).await.unwrap().unwrap();
    assert_eq!(stored.kind(), ActionType::Login);
    assert_eq!(stored.target(), Some(Target::User(user.id)));
}

#[tokio::test]
async fn test_raw_insert_timestamp_matches_orm_format() {
    let store = test_store().await;
    let user = store.create_user(new_user("raw")).await.unwrap();

    raw_exec(
        &store,
        &format!("INSERT INTO actions (action_type, user_id) VALUES ('User Login', {})", user.id),
    )
    .await
    .unwrap();

    let recent = ActionFilter {
        since: Some(Utc::now() - Duration::hours(1)),
        ..Default::default()
    };
    let rows = store.list_all_actions(&recent).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind(), ActionType::Login);
    assert!((Utc::now() - rows[0].timestamp).num_minutes().abs() < 5);

    // A row the ORM writes afterwards still sorts first.
    store
        .record_action(NewAction::new(ActionType::AddItem, user.id))
        .await
        .unwrap();
    let newest = store.list_all_actions(&ActionFilter::default()).await.unwrap();
    assert_eq!(newest[0].kind(), ActionType::AddItem);

    assert_eq!(
        store
            .prune_actions(Utc::now() - Duration::hours(1))
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() {
    let store = test_store().await;
    let user = store.create_user(new_user("pager")).await.unwrap();
    for _ in 0..3 {
        store
            .record_action(NewAction::new(ActionType::Login, user.id))
            .await
            .unwrap();
    }

    for page in [4, 1000, u64::MAX] {
        let (items, total_pages) = store
            .list_actions(page, 1, &ActionFilter::default())
            .await
            .unwrap();
        assert!(items.is_empty());
        assert_eq!(total_pages, 3);
    }

    let (items, total_pages) = store
        .list_actions(u64::MAX, u64::MAX, &ActionFilter::default())
        .await
        .unwrap();
    assert!(items.is_empty());
    assert_eq!(total_pages, 1);

    let (items, _) = store
        .list_actions(0, 1, &ActionFilter::default())
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_file_database_is_created_and_persists() {
    let db = TempDb::new();

    let store = Store::new(&db.url()).await.unwrap();
    store.create_user(new_user("durable")).await.unwrap();
    drop(store);
    assert!(db.0.exists());

    let reopened = Store::new(&db.url()).await.unwrap();
    let user = reopened.get_user_by_username("durable").await.unwrap();
    assert!(user.is_some());
}

#[tokio::test]
async fn test_action_details_are_clamped() {
    let store = test_store().await;
    let user = store.create_user(new_user("verbose")).await.unwrap();

    let action = store
        .record_action(NewAction::new(ActionType::EditItem, user.id).details(Some("x".repeat(1000))))
        .await
        .unwrap();

    assert_eq!(action.details.map(|d| d.chars().count()), Some(256));
}

#[tokio::test]
async fn test_list_prune_and_export_actions() {
    let store = test_store().await;
    let user = store.create_user(new_user("auditor")).await.unwrap();

    // Old rows are written directly so their timestamps can be backdated.
    for days in [40, 35] {
        actions::ActiveModel {
            timestamp: Set(Utc::now() - Duration::days(days)),
            action_type: Set(ActionType::AddItem.label().to_string()),
            user_id: Set(Some(user.id)),
            ..Default::default()
        }
        .insert(&store.conn)
        .await
        .unwrap();
    }

    for _ in 0..3 {
        store
            .record_action(NewAction::new(ActionType::Login, user.id))
            .await
            .unwrap();
    }

    let (page, total_pages) = store
        .list_actions(1, 2, &ActionFilter::default())
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(total_pages, 3);
    assert!(page[0].timestamp >= page[1].timestamp);

    let logins = ActionFilter {
        action_type: Some(ActionType::Login.label().to_string()),
        ..Default::default()
    };
    assert_eq!(store.list_all_actions(&logins).await.unwrap().len(), 3);

    let csv = store.export_actions_csv(&logins).await.unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.starts_with("id,timestamp,action_type,user_id,target_type,target_id,details\n"));

    let removed = store
        .prune_actions(Utc::now() - Duration::days(30))
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(actions::Entity::find().count(&store.conn).await.unwrap(), 3);
}

#[tokio::test]
async fn test_migration_lifecycle() {
    let store = test_store().await;

    let states = store.migration_states().await.unwrap();
    assert_eq!(states.len(), 3);
    assert!(states.iter().all(|s| s.applied));

    store.migrate_down(Some(1)).await.unwrap();
    let states = store.migration_states().await.unwrap();
    assert_eq!(states.iter().filter(|s| s.applied).count(), 2);
    assert!(!states.last().unwrap().applied);

    store.migrate_up().await.unwrap();
    store.create_user(new_user("survivor")).await.unwrap();

    store.migrate_fresh().await.unwrap();
    assert!(store.list_users().await.unwrap().is_empty());
    assert!(store.ping().await.is_ok());
}
