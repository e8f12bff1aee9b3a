//! Integration tests for post and tag repositories against a real database.

use booru_core::tags::TagCategory;
use booru_db::models::post::CreatePost;
use booru_db::repositories::{NoteRepo, PostRepo, TagRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

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
// Posts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_normalizes_the_tag_string(pool: PgPool) {
    let post = PostRepo::create(&pool, &new_post("a1", "Solo  1GIRL solo"))
        .await
        .unwrap();
    assert_eq!(post.tags, vec!["1girl", "solo"]);
    assert_eq!(post.tag_string(), "1girl solo");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_by_md5_hits_and_misses(pool: PgPool) {
    let created = PostRepo::create(&pool, &new_post("feedface", "aaaa"))
        .await
        .unwrap();

    let found = PostRepo::find_by_md5(&pool, "feedface").await.unwrap();
    assert_eq!(found.unwrap().id, created.id);

    let missing = PostRepo::find_by_md5(&pool, "0000").await.unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn fetch_candidates_pushes_down_tags_and_deletion(pool: PgPool) {
    let matching = PostRepo::create(&pool, &new_post("m1", "cat solo"))
        .await
        .unwrap();
    PostRepo::create(&pool, &new_post("m2", "dog")).await.unwrap();
    let deleted = PostRepo::create(&pool, &new_post("m3", "cat"))
        .await
        .unwrap();
    PostRepo::set_deleted(&pool, deleted.id, true).await.unwrap();

    let required = vec!["cat".to_string()];
    let live = PostRepo::fetch_candidates(&pool, &required, Some(false))
        .await
        .unwrap();
    assert_eq!(live.iter().map(|p| p.id).collect::<Vec<_>>(), vec![matching.id]);

    let deleted_only = PostRepo::fetch_candidates(&pool, &required, Some(true))
        .await
        .unwrap();
    assert_eq!(
        deleted_only.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![deleted.id]
    );

    let everything = PostRepo::fetch_candidates(&pool, &[], None).await.unwrap();
    assert_eq!(everything.len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn adjacent_walks_by_id(pool: PgPool) {
    let a = PostRepo::create(&pool, &new_post("s1", "x")).await.unwrap();
    let b = PostRepo::create(&pool, &new_post("s2", "x")).await.unwrap();
    let c = PostRepo::create(&pool, &new_post("s3", "x")).await.unwrap();

    let newer = PostRepo::adjacent(&pool, b.id, true, 1).await.unwrap();
    assert_eq!(newer[0].id, c.id);

    let older = PostRepo::adjacent(&pool, b.id, false, 1).await.unwrap();
    assert_eq!(older[0].id, a.id);
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_or_get_is_idempotent(pool: PgPool) {
    let first = TagRepo::create_or_get(&pool, "solo", TagCategory::General).await.unwrap();
    let second = TagRepo::create_or_get(&pool, "solo", TagCategory::General).await.unwrap();
    assert_eq!(first.id, second.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_matching_orders_by_usage(pool: PgPool) {
    TagRepo::create_or_get(&pool, "1girl", TagCategory::General).await.unwrap();
    TagRepo::create_or_get(&pool, "girl_band", TagCategory::General).await.unwrap();
    TagRepo::create_or_get(&pool, "dog", TagCategory::General).await.unwrap();

    PostRepo::create(&pool, &new_post("t1", "1girl")).await.unwrap();
    TagRepo::recount_post_counts(&pool).await.unwrap();

    let names = TagRepo::find_matching(&pool, "%girl%", 10).await.unwrap();
    assert_eq!(names, vec!["1girl".to_string(), "girl_band".to_string()]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn recount_counts_only_non_deleted_posts(pool: PgPool) {
    TagRepo::create_or_get(&pool, "cat", TagCategory::General).await.unwrap();
    PostRepo::create(&pool, &new_post("r1", "cat")).await.unwrap();
    let gone = PostRepo::create(&pool, &new_post("r2", "cat")).await.unwrap();
    PostRepo::set_deleted(&pool, gone.id, true).await.unwrap();

    TagRepo::recount_post_counts(&pool).await.unwrap();

    let tag = TagRepo::find_by_name(&pool, "cat").await.unwrap().unwrap();
    assert_eq!(tag.post_count, 1);
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivated_notes_leave_the_active_list(pool: PgPool) {
    let post = PostRepo::create(&pool, &new_post("n1", "x")).await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let note = NoteRepo::create(
        &mut conn,
        &booru_db::models::note::CreateNote {
            post_id: post.id,
            x: 10,
            y: 10,
            width: 10,
            height: 10,
            body: "test".to_string(),
        },
    )
    .await
    .unwrap();
    drop(conn);

    assert_eq!(NoteRepo::list_active_by_post(&pool, post.id).await.unwrap().len(), 1);

    assert!(NoteRepo::deactivate(&pool, note.id).await.unwrap());
    assert!(NoteRepo::list_active_by_post(&pool, post.id).await.unwrap().is_empty());
}
