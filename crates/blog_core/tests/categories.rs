use blog_core::db::open_db_in_memory;
use blog_core::{
    BlogService, BlogServiceError, Category, InvalidEntity, SqliteBlogRepository, Status,
};
use rusqlite::Connection;

fn service(conn: &Connection) -> BlogService<SqliteBlogRepository<'_>> {
    BlogService::new(SqliteBlogRepository::try_new(conn).unwrap())
}

#[test]
fn create_category_derives_slug_and_defaults_to_published() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service
        .create_category(Category::new("  Rust Tips & Tricks "))
        .unwrap();

    assert!(created.id.is_some());
    assert_eq!(created.name, "Rust Tips & Tricks");
    assert_eq!(created.slug, "rust-tips-tricks");
    assert_eq!(created.status, Status::Published);
    assert!(created.created_at > 0);
    assert_eq!(created.updated_at, None);
}

#[test]
fn only_ascii_whitespace_is_trimmed_from_names() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service
        .create_category(Category::new("\t\u{a0}News\x0B\n"))
        .unwrap();

    assert_eq!(created.name, "\u{a0}News");
    assert_eq!(created.slug, "-news");
    assert!(service.get_category_by_slug("news").unwrap().is_none());
}

#[test]
fn create_category_ignores_caller_supplied_id() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut category = Category::new("News");
    category.id = Some(77);
    let created = service.create_category(category).unwrap();

    assert_ne!(created.id, Some(77));
    assert!(service.get_category_by_id(77).unwrap().is_none());
}

#[test]
fn duplicate_category_slug_is_a_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    service.create_category(Category::new("Release Notes")).unwrap();
    let err = service
        .create_category(Category::new("release-notes"))
        .unwrap_err();

    let validation = err.as_validation().expect("validation error");
    assert_eq!(
        validation.message,
        "Category already exists with name: release-notes"
    );
    assert!(matches!(&validation.entity, InvalidEntity::Category(c) if c.slug == "release-notes"));
    assert_eq!(service.get_all_categories(None, false).unwrap().len(), 1);
}

#[test]
fn blank_category_name_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.create_category(Category::new("   ")).unwrap_err();
    assert!(matches!(err, BlogServiceError::Validation(_)));
}

#[test]
fn resaving_unchanged_name_does_not_conflict_with_itself() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service.create_category(Category::new("Guides")).unwrap();
    let id = created.id.unwrap();

    let mut edited = created.clone();
    edited.metadata.insert("color", "blue");
    let updated = service.update_category(edited, id).unwrap().unwrap();

    assert_eq!(updated.id, Some(id));
    assert_eq!(updated.slug, "guides");
    assert_eq!(updated.metadata.get_str("color"), Some("blue"));
    assert!(updated.updated_at.is_some());
}

#[test]
fn renaming_onto_another_category_slug_fails() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    service.create_category(Category::new("Alpha")).unwrap();
    let beta = service.create_category(Category::new("Beta")).unwrap();

    let err = service
        .update_category(Category::new("ALPHA"), beta.id.unwrap())
        .unwrap_err();
    assert!(err.as_validation().is_some());

    let renamed = service
        .update_category(Category::new("Gamma"), beta.id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(renamed.slug, "gamma");
}

#[test]
fn update_missing_category_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    assert!(service
        .update_category(Category::new("Ghost"), 9999)
        .unwrap()
        .is_none());
}

#[test]
fn delete_and_status_changes_report_missing_ids_as_false() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    assert!(!service.delete_category_by_id(9999).unwrap());
    assert!(!service.disable_category_by_id(9999).unwrap());
    assert!(!service.publish_category_by_id(9999).unwrap());
}

#[test]
fn delete_category_removes_row() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service.create_category(Category::new("Temp")).unwrap();
    let id = created.id.unwrap();

    assert!(service.delete_category_by_id(id).unwrap());
    assert!(service.get_category_by_id(id).unwrap().is_none());
}

#[test]
fn disable_and_publish_toggle_status() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let id = service
        .create_category(Category::new("Toggle"))
        .unwrap()
        .id
        .unwrap();

    assert!(service.disable_category_by_id(id).unwrap());
    let disabled = service.get_category_by_id(id).unwrap().unwrap();
    assert_eq!(disabled.status, Status::Disabled);

    assert!(service.publish_category_by_id(id).unwrap());
    assert!(service.get_category_by_id(id).unwrap().unwrap().is_published());
}

#[test]
fn get_all_categories_filters_status_and_honours_limit() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    service.create_category(Category::new("One")).unwrap();
    service.create_category(Category::new("Two")).unwrap();
    let hidden = service.create_category(Category::new("Three")).unwrap();
    service.disable_category_by_id(hidden.id.unwrap()).unwrap();

    assert_eq!(service.get_all_categories(None, true).unwrap().len(), 2);
    assert_eq!(service.get_all_categories(None, false).unwrap().len(), 3);
    assert_eq!(service.get_all_categories(Some(1), true).unwrap().len(), 1);
    assert_eq!(service.get_all_categories(Some(0), false).unwrap().len(), 3);
}

#[test]
fn get_category_by_slug_finds_exact_slug() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service.create_category(Category::new("Deep Dives")).unwrap();

    let found = service.get_category_by_slug("deep-dives").unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert!(service.get_category_by_slug("not-found").unwrap().is_none());
}

#[test]
fn root_categories_exclude_children() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let parent = service.create_category(Category::new("Parent")).unwrap();
    service
        .create_category(Category::new("Child").with_parent(parent.id.unwrap()))
        .unwrap();

    let roots = service.get_all_root_categories(true).unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].id, parent.id);
}

#[test]
fn child_categories_are_returned_in_pre_order() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let root = service.create_category(Category::new("Root")).unwrap();
    let root_id = root.id.unwrap();
    let a = service
        .create_category(Category::new("A").with_parent(root_id))
        .unwrap();
    let c = service
        .create_category(Category::new("C").with_parent(root_id))
        .unwrap();
    let b = service
        .create_category(Category::new("B").with_parent(a.id.unwrap()))
        .unwrap();

    let ids: Vec<_> = service
        .get_all_child_categories(root_id, true)
        .unwrap()
        .into_iter()
        .map(|category| category.id)
        .collect();
    assert_eq!(ids, vec![a.id, b.id, c.id]);
}

#[test]
fn disabled_category_hides_its_subtree_when_only_active() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let root_id = service.create_category(Category::new("Root")).unwrap().id.unwrap();
    let a_id = service
        .create_category(Category::new("A").with_parent(root_id))
        .unwrap()
        .id
        .unwrap();
    service
        .create_category(Category::new("B").with_parent(a_id))
        .unwrap();
    service.disable_category_by_id(a_id).unwrap();

    assert!(service.get_all_child_categories(root_id, true).unwrap().is_empty());
    assert_eq!(service.get_all_child_categories(root_id, false).unwrap().len(), 2);
}

#[test]
fn child_walk_terminates_on_stored_cycle() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let a_id = service.create_category(Category::new("A")).unwrap().id.unwrap();
    let b_id = service
        .create_category(Category::new("B").with_parent(a_id))
        .unwrap()
        .id
        .unwrap();
    conn.execute(
        "UPDATE categories SET parent_id = ?1 WHERE id = ?2;",
        [b_id, a_id],
    )
    .unwrap();

    let descendants = service.get_all_child_categories(a_id, false).unwrap();
    assert_eq!(descendants.len(), 1);
    assert_eq!(descendants[0].id, Some(b_id));
}

#[test]
fn parent_must_exist_and_must_not_be_a_descendant() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let missing_parent = service
        .create_category(Category::new("Orphan").with_parent(9999))
        .unwrap_err();
    assert!(missing_parent.as_validation().is_some());

    let a = service.create_category(Category::new("A")).unwrap();
    let a_id = a.id.unwrap();
    let b_id = service
        .create_category(Category::new("B").with_parent(a_id))
        .unwrap()
        .id
        .unwrap();

    let self_parent = service
        .update_category(a.clone().with_parent(a_id), a_id)
        .unwrap_err();
    assert!(self_parent.as_validation().is_some());

    let loop_err = service
        .update_category(a.with_parent(b_id), a_id)
        .unwrap_err();
    let validation = loop_err.as_validation().expect("validation error");
    assert!(validation.message.contains("descendant"));
}
