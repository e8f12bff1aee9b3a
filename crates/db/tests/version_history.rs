//! Integration tests for the append-only version history and saved-search
//! ownership scoping.

use booru_db::models::post::CreatePost;
use booru_db::models::saved_search::{CreateSavedSearch, UpdateSavedSearch};
use booru_db::repositories::{PostRepo, PostVersionRepo, SavedSearchRepo};
use sqlx::PgPool;

fn new_post(md5: &str, tag_string: &str) -> CreatePost {
    CreatePost {
        md5: md5.to_string(),
        width: 800,
        height: 600,
        tag_string: tag_string.to_string(),
        uploader_id: None,
    }
}

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn versions_append_and_list_in_order(pool: PgPool) {
    let post = PostRepo::create(&pool, &new_post("v1", "aaaa")).await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    PostVersionRepo::create(&mut conn, post.id, 1, "aaaa", Some(1))
        .await
        .unwrap();
    PostVersionRepo::create(&mut conn, post.id, 2, "zzz", Some(1))
        .await
        .unwrap();

    assert_eq!(PostVersionRepo::latest_sequence(&mut conn, post.id).await.unwrap(), 2);
    assert_eq!(PostVersionRepo::sequences(&mut conn, post.id).await.unwrap(), vec![1, 2]);
    drop(conn);

    let versions = PostVersionRepo::list_by_post(&pool, post.id).await.unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].tag_string, "aaaa");
    assert_eq!(versions[1].tag_string, "zzz");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_sequence_violates_unique_constraint(pool: PgPool) {
    let post = PostRepo::create(&pool, &new_post("v2", "aaaa")).await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    PostVersionRepo::create(&mut conn, post.id, 1, "aaaa", None)
        .await
        .unwrap();
    let duplicate = PostVersionRepo::create(&mut conn, post.id, 1, "bbbb", None).await;
    assert!(duplicate.is_err());
}

// ---------------------------------------------------------------------------
// Saved searches
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn saved_search_writes_are_owner_scoped(pool: PgPool) {
    let created = SavedSearchRepo::create(
        &pool,
        1,
        &CreateSavedSearch {
            label: "cats".to_string(),
            query: "cat".to_string(),
        },
    )
    .await
    .unwrap();

    // Another principal cannot update or delete it.
    let foreign_update = SavedSearchRepo::update(
        &pool,
        2,
        created.id,
        &UpdateSavedSearch {
            label: None,
            query: Some("dog".to_string()),
        },
    )
    .await
    .unwrap();
    assert!(foreign_update.is_none());
    assert!(!SavedSearchRepo::delete(&pool, 2, created.id).await.unwrap());

    // The owner can.
    let updated = SavedSearchRepo::update(
        &pool,
        1,
        created.id,
        &UpdateSavedSearch {
            label: None,
            query: Some("dog".to_string()),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.query, "dog");
    assert!(SavedSearchRepo::delete(&pool, 1, created.id).await.unwrap());
    assert!(SavedSearchRepo::list_by_owner(&pool, 1).await.unwrap().is_empty());
}
