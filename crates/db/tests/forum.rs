//! Integration tests for the forum repositories: ordering, counts and
//! partial updates.

use emerald_db::models::forum::{
    CreateCategory, CreatePost, CreateThread, UpdatePost, UpdateThread,
};
use emerald_db::models::user::CreateUser;
use emerald_db::repositories::{CategoryRepo, PostRepo, ThreadRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, username: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_category(pool: &PgPool, name: &str, order_position: i32) -> i64 {
    CategoryRepo::create(
        pool,
        &CreateCategory {
            name: name.to_string(),
            description: String::new(),
            order_position,
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_thread(pool: &PgPool, category_id: i64, user_id: i64, title: &str) -> i64 {
    ThreadRepo::create(
        pool,
        &CreateThread {
            category_id,
            user_id,
            title: title.to_string(),
            content: "body".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_post(pool: &PgPool, thread_id: i64, user_id: i64, content: &str) -> i64 {
    PostRepo::create(
        pool,
        &CreatePost {
            thread_id,
            user_id,
            content: content.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_categories_ordered_with_counts(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let second = seed_category(&pool, "Second", 2).await;
    let first = seed_category(&pool, "First", 1).await;

    let t1 = seed_thread(&pool, first, user, "one").await;
    let t2 = seed_thread(&pool, first, user, "two").await;
    seed_post(&pool, t1, user, "a").await;
    seed_post(&pool, t1, user, "b").await;
    seed_post(&pool, t2, user, "c").await;

    let categories = CategoryRepo::list_with_counts(&pool).await.unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].id, first);
    assert_eq!(categories[0].thread_count, 2);
    assert_eq!(categories[0].post_count, 3);
    assert_eq!(categories[1].id, second);
    assert_eq!(categories[1].thread_count, 0);
    assert_eq!(categories[1].post_count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_threads_pinned_first_then_newest(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let category = seed_category(&pool, "General", 0).await;

    let oldest = seed_thread(&pool, category, user, "oldest").await;
    let middle = seed_thread(&pool, category, user, "middle").await;
    let newest = seed_thread(&pool, category, user, "newest").await;

    let pin = UpdateThread {
        is_pinned: Some(true),
        ..UpdateThread::default()
    };
    ThreadRepo::update(&pool, oldest, &pin).await.unwrap();

    let ids: Vec<i64> = ThreadRepo::list_by_category(&pool, category)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![oldest, newest, middle]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_thread_listing_carries_author(pool: PgPool) {
    let user = seed_user(&pool, "bob").await;
    let category = seed_category(&pool, "General", 0).await;
    let thread = seed_thread(&pool, category, user, "hello").await;

    let found = ThreadRepo::find_with_author(&pool, thread).await.unwrap().unwrap();
    assert_eq!(found.username, "bob");
    assert!(ThreadRepo::find_with_author(&pool, 999_999).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_thread_partial_update(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let category = seed_category(&pool, "General", 0).await;
    let thread = seed_thread(&pool, category, user, "original").await;

    let update = UpdateThread {
        is_locked: Some(true),
        ..UpdateThread::default()
    };
    let updated = ThreadRepo::update(&pool, thread, &update).await.unwrap().unwrap();

    assert!(updated.is_locked);
    assert!(!updated.is_pinned);
    assert_eq!(updated.title, "original");
    assert_eq!(updated.content, "body");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_posts_oldest_first_and_edit_flag(pool: PgPool) {
    let user = seed_user(&pool, "alice").await;
    let category = seed_category(&pool, "General", 0).await;
    let thread = seed_thread(&pool, category, user, "t").await;

    let first = seed_post(&pool, thread, user, "first").await;
    let second = seed_post(&pool, thread, user, "second").await;

    let posts = PostRepo::list_by_thread(&pool, thread).await.unwrap();
    let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![first, second]);
    assert!(posts.iter().all(|p| !p.is_edited && p.username == "alice"));

    let edit = UpdatePost {
        content: Some("first, revised".to_string()),
    };
    let edited = PostRepo::update(&pool, first, &edit).await.unwrap().unwrap();
    assert!(edited.is_edited);
    assert_eq!(edited.content, "first, revised");

    let untouched = PostRepo::update(&pool, second, &UpdatePost::default())
        .await
        .unwrap()
        .unwrap();
    assert!(!untouched.is_edited);
}
