// tests/tryon_service_tests.rs
//
// Orchestrator behavior against mocked repositories and provider, in the
// style of the platform mock tests: expectations first, then the call.

mod common;

use std::sync::Arc;

use chrono::Utc;
use mockall::predicate::eq;
use mockall::Sequence;
use uuid::Uuid;

use common::*;
use fitroom_common::models::profile::GarmentSlot;
use fitroom_common::models::tryon::TaskStatus;
use fitroom_common::Error;
use fitroom_core::platforms::doubao::{GenerationResult, ImageRef};
use fitroom_core::services::tryon_service::TryOnService;

fn url_result(url: &str) -> GenerationResult {
    GenerationResult {
        image: ImageRef::Url(url.to_string()),
        model_id: Some("doubao-seedream-4-0-250828".to_string()),
        created_at: Utc::now(),
        request_id: Some("req-1".to_string()),
    }
}

struct Mocks {
    profile_repo: MockProfileRepo,
    task_repo: MockTaskRepo,
    garment_repo: MockGarmentRepo,
    provider: MockProvider,
    store: MockStore,
    fetcher: MockFetcher,
}

impl Mocks {
    fn new() -> Self {
        Self {
            profile_repo: MockProfileRepo::new(),
            task_repo: MockTaskRepo::new(),
            garment_repo: MockGarmentRepo::new(),
            provider: MockProvider::new(),
            store: MockStore::new(),
            fetcher: MockFetcher::new(),
        }
    }

    fn into_service(self) -> TryOnService {
        TryOnService::new(
            Arc::new(self.profile_repo),
            Arc::new(self.task_repo),
            Arc::new(self.garment_repo),
            Arc::new(self.provider),
            Arc::new(self.store),
            Arc::new(self.fetcher),
            test_template(),
            test_settings(),
        )
    }
}

#[tokio::test]
async fn successful_submission_consumes_staged_slots() -> Result<(), Error> {
    let user_id = Uuid::new_v4();
    let mut profile = base_profile(user_id);
    profile.slots.top.url = Some("https://x/top.png".into());
    profile.slots.bottom.url = Some("https://x/bottom.png".into());

    let mut mocks = Mocks::new();
    let mut seq = Sequence::new();

    mocks
        .profile_repo
        .expect_get_by_user()
        .with(eq(user_id))
        .times(1)
        .returning(move |_| Ok(Some(profile.clone())));

    mocks
        .provider
        .expect_generate()
        .times(1)
        .withf(|req| {
            // Person image first, then garments in declared slot order.
            req.image
                == vec![
                    "https://x/avatar.png".to_string(),
                    "https://x/top.png".to_string(),
                    "https://x/bottom.png".to_string(),
                ]
        })
        .returning(|_| Ok(url_result("https://ephemeral/result.png")));

    // Task write strictly before the profile mutation, pointer before clear.
    mocks
        .task_repo
        .expect_insert()
        .times(1)
        .in_sequence(&mut seq)
        .withf(move |task| {
            task.user_id == user_id
                && task.status == TaskStatus::Succeeded
                && task.output_image_url.as_deref() == Some("https://ephemeral/result.png")
                && task.garments.len() == 2
                && task.garments[0].slot == GarmentSlot::Top
                && task.garments[1].slot == GarmentSlot::Bottom
        })
        .returning(|_| Ok(()));
    mocks
        .profile_repo
        .expect_set_current_tryon_image()
        .with(eq(user_id), eq("https://ephemeral/result.png"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    mocks
        .profile_repo
        .expect_clear_garment_slots()
        .with(eq(user_id))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    // The detached relocation may or may not run before the test ends;
    // give its download a failure so it stays inert either way.
    mocks
        .fetcher
        .expect_fetch_bytes()
        .returning(|_, _| Err(Error::Storage("download refused in test".into())));

    let outcome = mocks.into_service().submit_try_on(user_id).await?;

    assert_eq!(outcome.status, TaskStatus::Succeeded);
    assert_eq!(outcome.image_url, "https://ephemeral/result.png");
    assert!(outcome.task_id.starts_with("tryon-"));

    let consumed: Vec<GarmentSlot> = outcome
        .consumed_garments
        .iter()
        .map(|g| g.slot)
        .collect();
    assert_eq!(consumed, vec![GarmentSlot::Top, GarmentSlot::Bottom]);
    Ok(())
}

#[tokio::test]
async fn missing_avatar_fails_before_any_provider_call() {
    let user_id = Uuid::new_v4();
    let mut profile = base_profile(user_id);
    profile.current_avatar_url = None;
    profile.slots.top.url = Some("https://x/top.png".into());

    let mut mocks = Mocks::new();
    mocks
        .profile_repo
        .expect_get_by_user()
        .returning(move |_| Ok(Some(profile.clone())));
    mocks.provider.expect_generate().times(0);
    mocks.task_repo.expect_insert().times(0);

    let err = mocks.into_service().submit_try_on(user_id).await.unwrap_err();
    match err {
        Error::Validation(msg) => assert!(msg.contains("avatar"), "got: {}", msg),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_avatar_url_is_fatal() {
    let user_id = Uuid::new_v4();
    let mut profile = base_profile(user_id);
    profile.current_avatar_url = Some("not a url".into());
    profile.slots.top.url = Some("https://x/top.png".into());

    let mut mocks = Mocks::new();
    mocks
        .profile_repo
        .expect_get_by_user()
        .returning(move |_| Ok(Some(profile.clone())));
    mocks.provider.expect_generate().times(0);

    let err = mocks.into_service().submit_try_on(user_id).await.unwrap_err();
    assert!(err.is_validation(), "got {:?}", err);
}

#[tokio::test]
async fn zero_populated_slots_is_a_validation_error() {
    let user_id = Uuid::new_v4();
    let profile = base_profile(user_id);

    let mut mocks = Mocks::new();
    mocks
        .profile_repo
        .expect_get_by_user()
        .returning(move |_| Ok(Some(profile.clone())));
    mocks.provider.expect_generate().times(0);
    mocks.task_repo.expect_insert().times(0);

    let err = mocks.into_service().submit_try_on(user_id).await.unwrap_err();
    assert!(err.is_validation(), "got {:?}", err);
}

#[tokio::test]
async fn provider_empty_result_persists_nothing() {
    let user_id = Uuid::new_v4();
    let mut profile = base_profile(user_id);
    profile.slots.shoes.url = Some("https://x/shoes.png".into());

    let mut mocks = Mocks::new();
    mocks
        .profile_repo
        .expect_get_by_user()
        .returning(move |_| Ok(Some(profile.clone())));
    mocks.provider.expect_generate().times(1).returning(|_| {
        Err(Error::provider(
            fitroom_common::error::ProviderErrorKind::EmptyResult,
            "provider returned no images",
        ))
    });
    mocks.task_repo.expect_insert().times(0);
    mocks.profile_repo.expect_set_current_tryon_image().times(0);
    mocks.profile_repo.expect_clear_garment_slots().times(0);

    let err = mocks.into_service().submit_try_on(user_id).await.unwrap_err();
    assert!(matches!(err, Error::Provider { .. }), "got {:?}", err);
}

#[tokio::test]
async fn missing_profile_is_auto_provisioned_from_template() {
    let user_id = Uuid::new_v4();

    let mut mocks = Mocks::new();
    mocks
        .profile_repo
        .expect_get_by_user()
        .with(eq(user_id))
        .times(1)
        .returning(|_| Ok(None));
    mocks
        .profile_repo
        .expect_create()
        .times(1)
        .withf(move |p| {
            p.user_id == user_id
                && p.current_avatar_url.as_deref()
                    == Some("https://assets.test/model/default-avatar.png")
                && p.enabled
        })
        .returning(|_| Ok(()));
    // A fresh template profile stages no garments, so the submission still
    // fails validation after provisioning succeeds.
    mocks.provider.expect_generate().times(0);

    let err = mocks.into_service().submit_try_on(user_id).await.unwrap_err();
    assert!(err.is_validation(), "got {:?}", err);
}

#[tokio::test]
async fn provisioning_failure_is_fatal() {
    let user_id = Uuid::new_v4();

    let mut mocks = Mocks::new();
    mocks
        .profile_repo
        .expect_get_by_user()
        .returning(|_| Ok(None));
    mocks
        .profile_repo
        .expect_create()
        .returning(|_| Err(Error::Database(sqlx::Error::RowNotFound)));

    let err = mocks.into_service().submit_try_on(user_id).await.unwrap_err();
    match err {
        Error::Provisioning(msg) => assert!(msg.contains("auto-provision"), "got: {}", msg),
        other => panic!("expected provisioning error, got {:?}", other),
    }
}

#[tokio::test]
async fn disabled_profile_is_rejected() {
    let user_id = Uuid::new_v4();
    let mut profile = base_profile(user_id);
    profile.enabled = false;
    profile.slots.top.url = Some("https://x/top.png".into());

    let mut mocks = Mocks::new();
    mocks
        .profile_repo
        .expect_get_by_user()
        .returning(move |_| Ok(Some(profile.clone())));
    mocks.provider.expect_generate().times(0);

    let err = mocks.into_service().submit_try_on(user_id).await.unwrap_err();
    assert!(err.is_validation(), "got {:?}", err);
}

#[tokio::test]
async fn catalog_lookup_failure_means_no_qr_code() -> Result<(), Error> {
    let user_id = Uuid::new_v4();
    let mut profile = base_profile(user_id);
    profile.slots.top.url = Some("https://x/top.png".into());
    profile.slots.top.garment_id = Some("g-404".into());

    let mut mocks = Mocks::new();
    mocks
        .profile_repo
        .expect_get_by_user()
        .returning(move |_| Ok(Some(profile.clone())));
    mocks
        .garment_repo
        .expect_find_by_id()
        .with(eq("g-404"))
        .times(1)
        .returning(|_| Err(Error::Database(sqlx::Error::PoolClosed)));
    mocks
        .provider
        .expect_generate()
        .times(1)
        .returning(|_| Ok(url_result("https://ephemeral/result.png")));
    mocks
        .task_repo
        .expect_insert()
        .times(1)
        .withf(|task| {
            task.garments.len() == 1
                && task.garments[0].garment_id.as_deref() == Some("g-404")
                && task.garments[0].shop_contact_qr_url.is_none()
        })
        .returning(|_| Ok(()));
    mocks
        .profile_repo
        .expect_set_current_tryon_image()
        .returning(|_, _| Ok(()));
    mocks
        .profile_repo
        .expect_clear_garment_slots()
        .returning(|_| Ok(()));
    mocks
        .fetcher
        .expect_fetch_bytes()
        .returning(|_, _| Err(Error::Storage("download refused in test".into())));

    let outcome = mocks.into_service().submit_try_on(user_id).await?;
    assert_eq!(outcome.status, TaskStatus::Succeeded);
    Ok(())
}

#[tokio::test]
async fn invalid_slot_url_is_dropped_while_valid_ones_proceed() -> Result<(), Error> {
    let user_id = Uuid::new_v4();
    let mut profile = base_profile(user_id);
    profile.slots.top.url = Some("https://x/top.png".into());
    profile.slots.bag.url = Some("definitely-not-a-url".into());

    let mut mocks = Mocks::new();
    mocks
        .profile_repo
        .expect_get_by_user()
        .returning(move |_| Ok(Some(profile.clone())));
    mocks
        .provider
        .expect_generate()
        .times(1)
        .withf(|req| req.image.len() == 2) // person + the one valid garment
        .returning(|_| Ok(url_result("https://ephemeral/result.png")));
    mocks
        .task_repo
        .expect_insert()
        .times(1)
        .withf(|task| task.garments.len() == 1 && task.garments[0].slot == GarmentSlot::Top)
        .returning(|_| Ok(()));
    mocks
        .profile_repo
        .expect_set_current_tryon_image()
        .returning(|_, _| Ok(()));
    mocks
        .profile_repo
        .expect_clear_garment_slots()
        .returning(|_| Ok(()));
    mocks
        .fetcher
        .expect_fetch_bytes()
        .returning(|_, _| Err(Error::Storage("download refused in test".into())));

    let outcome = mocks.into_service().submit_try_on(user_id).await?;
    assert_eq!(outcome.consumed_garments.len(), 1);
    Ok(())
}

#[tokio::test]
async fn inline_result_is_accepted_and_returned_as_data_url() -> Result<(), Error> {
    let user_id = Uuid::new_v4();
    let mut profile = base_profile(user_id);
    profile.slots.top.url = Some("https://x/top.png".into());

    let mut mocks = Mocks::new();
    mocks
        .profile_repo
        .expect_get_by_user()
        .returning(move |_| Ok(Some(profile.clone())));
    mocks.provider.expect_generate().times(1).returning(|_| {
        Ok(GenerationResult {
            image: ImageRef::Inline("aGVsbG8=".to_string()),
            model_id: None,
            created_at: Utc::now(),
            request_id: None,
        })
    });
    mocks.task_repo.expect_insert().returning(|_| Ok(()));
    mocks
        .profile_repo
        .expect_set_current_tryon_image()
        .returning(|_, _| Ok(()));
    mocks
        .profile_repo
        .expect_clear_garment_slots()
        .returning(|_| Ok(()));
    // Inline payloads skip the download; keep the upload inert instead.
    mocks
        .store
        .expect_put()
        .returning(|_, _| Err(Error::Storage("upload refused in test".into())));

    let outcome = mocks.into_service().submit_try_on(user_id).await?;
    assert!(outcome.image_url.starts_with("data:image/png;base64,"));
    Ok(())
}
