use blog_core::db::open_db_in_memory;
use blog_core::{BlogService, Post, SqliteBlogRepository, Tag};
use rusqlite::Connection;

fn service(conn: &Connection) -> BlogService<SqliteBlogRepository<'_>> {
    BlogService::new(SqliteBlogRepository::try_new(conn).unwrap())
}

fn tag_names(tags: &[Tag]) -> Vec<&str> {
    tags.iter().map(|tag| tag.name.as_str()).collect()
}

#[test]
fn create_tag_is_idempotent_by_normalized_name() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let first = service.create_tag(Tag::new("Foo")).unwrap();
    let second = service.create_tag(Tag::new("foo")).unwrap();
    let third = service.create_tag(Tag::new("  FOO ")).unwrap();

    assert_eq!(first.name, "foo");
    assert_eq!(first.id, second.id);
    assert_eq!(first.id, third.id);
    assert_eq!(service.get_all_tags().unwrap().len(), 1);
}

#[test]
fn create_tag_returns_existing_row_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut original = Tag::new("Rust Lang");
    original.metadata.insert("color", "orange");
    let created = service.create_tag(original).unwrap();
    assert_eq!(created.name, "rust-lang");

    let mut again = Tag::new("rust lang");
    again.metadata.insert("color", "green");
    let reused = service.create_tag(again).unwrap();

    assert_eq!(reused, created);
    assert_eq!(reused.metadata.get_str("color"), Some("orange"));
}

#[test]
fn blank_tag_name_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.create_tag(Tag::new("   ")).unwrap_err();
    assert!(err.as_validation().is_some());
}

#[test]
fn tag_lookups_normalize_their_input() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service.create_tag(Tag::new("Web Dev")).unwrap();
    service.create_tag(Tag::new("Databases")).unwrap();

    assert_eq!(service.get_tag_by_name("WEB DEV").unwrap(), Some(created));
    assert!(service.get_tag_by_name("missing").unwrap().is_none());

    let found = service
        .get_tags_by_names(&["databases", "Web-Dev", "missing"])
        .unwrap();
    assert_eq!(tag_names(&found), vec!["databases", "web-dev"]);
}

#[test]
fn get_all_tags_is_ordered_by_name() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    for name in ["zeta", "alpha", "mu"] {
        service.create_tag(Tag::new(name)).unwrap();
    }

    assert_eq!(
        tag_names(&service.get_all_tags().unwrap()),
        vec!["alpha", "mu", "zeta"]
    );
}

#[test]
fn add_tags_to_missing_post_is_a_noop() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    assert!(service.add_tags_to_post_id(9999, &["ghost"]).unwrap());
    assert!(service.get_all_tags().unwrap().is_empty());
}

#[test]
fn add_tags_links_each_normalized_name_once() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let post_id = service
        .create_post(Post::new("Post", "body", 1))
        .unwrap()
        .id
        .unwrap();

    assert!(service
        .add_tags_to_post_id(post_id, &["Rust", "rust", "SQL"])
        .unwrap());

    assert_eq!(
        tag_names(&service.get_all_tags_for_post_id(post_id).unwrap()),
        vec!["rust", "sql"]
    );
}

#[test]
fn linking_an_existing_pair_again_is_a_storage_error() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let post_id = service
        .create_post_with_tags(Post::new("Post", "body", 1), &["rust"])
        .unwrap()
        .id
        .unwrap();

    let err = service.add_tags_to_post_id(post_id, &["rust"]).unwrap_err();
    assert!(err.as_validation().is_none());
}

#[test]
fn remove_tags_by_id_and_by_name() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let post_id = service
        .create_post_with_tags(Post::new("Post", "body", 1), &["a", "b", "c", "d"])
        .unwrap()
        .id
        .unwrap();
    let a_id = service.get_tag_by_name("a").unwrap().unwrap().id.unwrap();

    assert!(service
        .remove_tags_from_post_id(post_id, &[a_id, 9999])
        .unwrap());
    assert_eq!(
        tag_names(&service.get_all_tags_for_post_id(post_id).unwrap()),
        vec!["b", "c", "d"]
    );

    assert!(service
        .remove_tag_names_from_post_id(post_id, &["B", "missing"])
        .unwrap());
    assert_eq!(
        tag_names(&service.get_all_tags_for_post_id(post_id).unwrap()),
        vec!["c", "d"]
    );

    assert_eq!(service.get_all_tags().unwrap().len(), 4);
    assert!(service.remove_tags_from_post_id(9999, &[a_id]).unwrap());
    assert!(service
        .remove_tag_names_from_post_id(9999, &["c"])
        .unwrap());
}

#[test]
fn tags_for_post_without_links_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let post_id = service
        .create_post(Post::new("Bare", "body", 1))
        .unwrap()
        .id
        .unwrap();

    assert!(service.get_all_tags_for_post_id(post_id).unwrap().is_empty());
    assert!(service.get_all_tags_for_post_id(9999).unwrap().is_empty());
}
