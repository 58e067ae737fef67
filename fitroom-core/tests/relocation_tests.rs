// tests/relocation_tests.rs
//
// AssetRelocator contract: best-effort, point updates only, failures
// swallowed at the spawn boundary.

mod common;

use std::sync::Arc;
use std::time::Duration;

use mockall::predicate::eq;
use mockall::Sequence;
use uuid::Uuid;

use common::*;
use fitroom_common::Error;
use fitroom_core::platforms::doubao::ImageRef;
use fitroom_core::storage::StoredObject;
use fitroom_core::tasks::relocate_result::{
    relocate_result, spawn_relocation, RelocationDeps, RelocationJob,
};

fn deps(
    task_repo: MockTaskRepo,
    profile_repo: MockProfileRepo,
    store: MockStore,
    fetcher: MockFetcher,
) -> RelocationDeps {
    RelocationDeps {
        task_repo: Arc::new(task_repo),
        profile_repo: Arc::new(profile_repo),
        object_store: Arc::new(store),
        fetcher: Arc::new(fetcher),
        download_timeout: Duration::from_secs(5),
    }
}

fn job(user_id: Uuid, image: ImageRef) -> RelocationJob {
    RelocationJob {
        task_id: "tryon-1700000000000-ab12".to_string(),
        user_id,
        image,
    }
}

fn stored(url: &str) -> StoredObject {
    StoredObject {
        file_id: url.to_string(),
        cloud_path: "tryon-results/2026/08/30/x.png".to_string(),
        file_url: url.to_string(),
    }
}

#[tokio::test]
async fn successful_relocation_updates_task_then_profile() {
    let user_id = Uuid::new_v4();
    let mut seq = Sequence::new();

    let mut fetcher = MockFetcher::new();
    fetcher
        .expect_fetch_bytes()
        .with(eq("https://ephemeral/result.png"), eq(Duration::from_secs(5)))
        .times(1)
        .returning(|_, _| Ok(b"png bytes".to_vec()));

    let mut store = MockStore::new();
    store
        .expect_put()
        .times(1)
        .withf(|bytes, path| bytes == b"png bytes" && path.starts_with("tryon-results/"))
        .returning(|_, _| Ok(stored("cloud://env.durable/result.png")));

    let mut task_repo = MockTaskRepo::new();
    task_repo
        .expect_update_output_url()
        .with(
            eq(user_id),
            eq("tryon-1700000000000-ab12"),
            eq("cloud://env.durable/result.png"),
        )
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(true));

    let mut profile_repo = MockProfileRepo::new();
    profile_repo
        .expect_set_current_tryon_image()
        .with(eq(user_id), eq("cloud://env.durable/result.png"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));

    let durable = relocate_result(
        &job(user_id, ImageRef::Url("https://ephemeral/result.png".into())),
        &deps(task_repo, profile_repo, store, fetcher),
    )
    .await
    .unwrap();
    assert_eq!(durable, "cloud://env.durable/result.png");
}

#[tokio::test]
async fn download_failure_leaves_records_on_ephemeral_url() {
    let user_id = Uuid::new_v4();

    let mut fetcher = MockFetcher::new();
    fetcher
        .expect_fetch_bytes()
        .times(1)
        .returning(|_, _| Err(Error::Storage("download timed out".into())));

    let mut store = MockStore::new();
    store.expect_put().times(0);
    let mut task_repo = MockTaskRepo::new();
    task_repo.expect_update_output_url().times(0);
    let mut profile_repo = MockProfileRepo::new();
    profile_repo.expect_set_current_tryon_image().times(0);

    let result = relocate_result(
        &job(user_id, ImageRef::Url("https://ephemeral/result.png".into())),
        &deps(task_repo, profile_repo, store, fetcher),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn spawned_relocation_swallows_failures() {
    let user_id = Uuid::new_v4();

    let mut fetcher = MockFetcher::new();
    fetcher
        .expect_fetch_bytes()
        .returning(|_, _| Err(Error::Storage("download timed out".into())));

    let handle = spawn_relocation(
        job(user_id, ImageRef::Url("https://ephemeral/result.png".into())),
        deps(
            MockTaskRepo::new(),
            MockProfileRepo::new(),
            MockStore::new(),
            fetcher,
        ),
    );

    // The background task finishes cleanly; the error never escapes it.
    assert!(handle.await.is_ok());
}

#[tokio::test]
async fn inline_payload_is_decoded_instead_of_downloaded() {
    let user_id = Uuid::new_v4();

    let mut fetcher = MockFetcher::new();
    fetcher.expect_fetch_bytes().times(0);

    let mut store = MockStore::new();
    store
        .expect_put()
        .times(1)
        .withf(|bytes, _| bytes == b"hello")
        .returning(|_, _| Ok(stored("cloud://env.durable/result.png")));

    let mut task_repo = MockTaskRepo::new();
    task_repo
        .expect_update_output_url()
        .times(1)
        .returning(|_, _, _| Ok(true));
    let mut profile_repo = MockProfileRepo::new();
    profile_repo
        .expect_set_current_tryon_image()
        .times(1)
        .returning(|_, _| Ok(()));

    // "aGVsbG8=" is base64 for "hello".
    relocate_result(
        &job(user_id, ImageRef::Inline("aGVsbG8=".into())),
        &deps(task_repo, profile_repo, store, fetcher),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn undecodable_inline_payload_touches_nothing() {
    let user_id = Uuid::new_v4();

    let mut store = MockStore::new();
    store.expect_put().times(0);
    let mut task_repo = MockTaskRepo::new();
    task_repo.expect_update_output_url().times(0);

    let result = relocate_result(
        &job(user_id, ImageRef::Inline("!!! not base64 !!!".into())),
        &deps(
            task_repo,
            MockProfileRepo::new(),
            store,
            MockFetcher::new(),
        ),
    )
    .await;
    assert!(matches!(result, Err(Error::Base64(_))));
}

#[tokio::test]
async fn vanished_task_row_skips_the_profile_update() {
    let user_id = Uuid::new_v4();

    let mut fetcher = MockFetcher::new();
    fetcher
        .expect_fetch_bytes()
        .returning(|_, _| Ok(b"png bytes".to_vec()));
    let mut store = MockStore::new();
    store
        .expect_put()
        .returning(|_, _| Ok(stored("cloud://env.durable/result.png")));

    let mut task_repo = MockTaskRepo::new();
    task_repo
        .expect_update_output_url()
        .times(1)
        .returning(|_, _, _| Ok(false));
    let mut profile_repo = MockProfileRepo::new();
    profile_repo.expect_set_current_tryon_image().times(0);

    let durable = relocate_result(
        &job(user_id, ImageRef::Url("https://ephemeral/result.png".into())),
        &deps(task_repo, profile_repo, store, fetcher),
    )
    .await
    .unwrap();
    assert_eq!(durable, "cloud://env.durable/result.png");
}

#[tokio::test]
async fn rerunning_relocation_repairs_again_without_corruption() {
    let user_id = Uuid::new_v4();

    let mut fetcher = MockFetcher::new();
    fetcher
        .expect_fetch_bytes()
        .times(2)
        .returning(|_, _| Ok(b"png bytes".to_vec()));
    let mut store = MockStore::new();
    store
        .expect_put()
        .times(2)
        .returning(|_, _| Ok(stored("cloud://env.durable/result.png")));
    let mut task_repo = MockTaskRepo::new();
    task_repo
        .expect_update_output_url()
        .times(2)
        .returning(|_, _, _| Ok(true));
    let mut profile_repo = MockProfileRepo::new();
    profile_repo
        .expect_set_current_tryon_image()
        .times(2)
        .returning(|_, _| Ok(()));

    let deps = deps(task_repo, profile_repo, store, fetcher);
    let job = job(user_id, ImageRef::Url("https://ephemeral/result.png".into()));

    let first = relocate_result(&job, &deps).await.unwrap();
    let second = relocate_result(&job, &deps).await.unwrap();
    assert_eq!(first, second);
}
