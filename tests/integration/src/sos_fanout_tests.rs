//! End-to-end SOS fanout scenarios
//!
//! Each test drives the coordinator's public operation the way the
//! change-detection trigger would: with before/after device snapshots over
//! a seeded store.

use crate::test_utils::{seed_device, seed_user, ScriptedPush};
use std::sync::Arc;
use vigil_alert::{DocumentStore, FanoutCoordinator, FanoutResult, MemoryStore};
use vigil_domain::{DeviceStatus, SosCategory};

const OWNER: &str = "owner-0001-abcdef";
const DEVICE: &str = "dev-0001-abcdef";

fn coordinator(
    store: &Arc<MemoryStore>,
    push: &Arc<ScriptedPush>,
) -> FanoutCoordinator<MemoryStore, ScriptedPush> {
    FanoutCoordinator::new(Arc::clone(store), Arc::clone(push))
}

#[tokio::test]
async fn test_online_to_sos_medica_with_mixed_contacts() {
    let _ = tracing_subscriber::fmt::try_init();
    let store = Arc::new(MemoryStore::new());
    let push = Arc::new(ScriptedPush::new());

    seed_user(&store, OWNER, "Ana", &[]).await;
    seed_user(&store, "contact-a", "Luis", &["tok-a1", "tok-a2"]).await;
    seed_user(&store, "contact-b", "Marta", &[]).await;

    let before = seed_device(
        &store,
        OWNER,
        DEVICE,
        DeviceStatus::Online,
        &[("contact-a", "Luis"), ("contact-b", "Marta")],
    )
    .await;
    let mut after = before.clone();
    after.status = DeviceStatus::Sos(SosCategory::Medica);
    store.put_device(after.clone()).await.unwrap();

    coordinator(&store, &push)
        .on_device_updated(OWNER, DEVICE, &before, &after)
        .await;

    // Contact A delivered on both tokens, contact B had no channel
    let history = store.device_alerts(OWNER, DEVICE).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].notified_count, 1);
    assert_eq!(history[0].failed_count, 1);
    assert_eq!(history[0].sos_type, SosCategory::Medica);
    assert_eq!(history[0].source_owner_name, "Ana");
    assert_eq!(history[0].notified_contacts.len(), 2);

    // Inbox written for A only; B had no delivery attempt
    assert_eq!(store.inbox("contact-a").await.len(), 1);
    assert!(store.inbox("contact-b").await.is_empty());
    assert!(!store.inbox("contact-a").await[0].acknowledged);

    // Only one multicast went out (A's two tokens in one send)
    assert_eq!(push.call_count(), 1);
}

#[tokio::test]
async fn test_same_sos_rewrite_is_a_noop() {
    let store = Arc::new(MemoryStore::new());
    let push = Arc::new(ScriptedPush::new());

    seed_user(&store, "contact-a", "Luis", &["tok-a1"]).await;
    let before = seed_device(
        &store,
        OWNER,
        DEVICE,
        DeviceStatus::Sos(SosCategory::General),
        &[("contact-a", "Luis")],
    )
    .await;
    let after = before.clone();

    coordinator(&store, &push)
        .on_device_updated(OWNER, DEVICE, &before, &after)
        .await;

    assert_eq!(push.call_count(), 0);
    assert!(store.device_alerts(OWNER, DEVICE).await.is_empty());
    assert!(store.inbox("contact-a").await.is_empty());
}

#[tokio::test]
async fn test_sos_with_no_contacts_writes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let push = Arc::new(ScriptedPush::new());

    let before = seed_device(&store, OWNER, DEVICE, DeviceStatus::Offline, &[]).await;
    let mut after = before.clone();
    after.status = DeviceStatus::Sos(SosCategory::Seguridad);
    store.put_device(after.clone()).await.unwrap();

    let coord = coordinator(&store, &push);
    let result = coord
        .fanout(&after, SosCategory::Seguridad, vigil_alert::now_ms())
        .await;

    assert_eq!(result, FanoutResult { notified: 0, failed: 0 });
    assert_eq!(push.call_count(), 0);
    assert!(store.device_alerts(OWNER, DEVICE).await.is_empty());

    // Short-circuit leaves no processed stamp
    let device = store.get_device(OWNER, DEVICE).await.unwrap().unwrap();
    assert_eq!(device.last_processed_transition_at, 0);
}

#[tokio::test]
async fn test_invalid_token_pruned_contact_still_notified() {
    let store = Arc::new(MemoryStore::new());
    let push = Arc::new(ScriptedPush::new());

    seed_user(&store, "contact-a", "Luis", &["bad-stale", "tok-live"]).await;
    let before = seed_device(
        &store,
        OWNER,
        DEVICE,
        DeviceStatus::Online,
        &[("contact-a", "Luis")],
    )
    .await;
    let mut after = before.clone();
    after.status = DeviceStatus::Sos(SosCategory::General);
    store.put_device(after.clone()).await.unwrap();

    coordinator(&store, &push)
        .on_device_updated(OWNER, DEVICE, &before, &after)
        .await;

    let history = store.device_alerts(OWNER, DEVICE).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].notified_count, 1);
    assert_eq!(history[0].failed_count, 0);

    // Exactly the invalid token was removed
    let user = store.get_user("contact-a").await.unwrap().unwrap();
    assert_eq!(user.delivery_tokens, vec!["tok-live".to_string()]);
}

#[tokio::test]
async fn test_cooldown_absorbs_rapid_duplicate_transitions() {
    let store = Arc::new(MemoryStore::new());
    let push = Arc::new(ScriptedPush::new());

    seed_user(&store, "contact-a", "Luis", &["tok-a1"]).await;
    let before = seed_device(
        &store,
        OWNER,
        DEVICE,
        DeviceStatus::Online,
        &[("contact-a", "Luis")],
    )
    .await;
    let mut after = before.clone();
    after.status = DeviceStatus::Sos(SosCategory::General);
    store.put_device(after.clone()).await.unwrap();

    let coord = coordinator(&store, &push);
    coord.on_device_updated(OWNER, DEVICE, &before, &after).await;
    assert_eq!(push.call_count(), 1);

    // Flaky link re-delivers a qualifying transition right away; the
    // processed stamp from the first fanout is now on the record
    let stamped = store.get_device(OWNER, DEVICE).await.unwrap().unwrap();
    let mut before2 = stamped.clone();
    before2.status = DeviceStatus::Online;
    let mut after2 = stamped;
    after2.status = DeviceStatus::Sos(SosCategory::Medica);
    store.put_device(after2.clone()).await.unwrap();

    coord.on_device_updated(OWNER, DEVICE, &before2, &after2).await;

    assert_eq!(push.call_count(), 1);
    assert_eq!(store.device_alerts(OWNER, DEVICE).await.len(), 1);
    assert_eq!(store.inbox("contact-a").await.len(), 1);
}

#[tokio::test]
async fn test_count_conservation_across_contact_mix() {
    let store = Arc::new(MemoryStore::new());
    let push = Arc::new(ScriptedPush::new());

    seed_user(&store, "c-delivered", "Luis", &["tok-1"]).await;
    seed_user(&store, "c-dead-tokens", "Marta", &["bad-1", "gone-1"]).await;
    seed_user(&store, "c-no-tokens", "Pepe", &[]).await;
    // c-missing has no user record at all

    let before = seed_device(
        &store,
        OWNER,
        DEVICE,
        DeviceStatus::Online,
        &[
            ("c-delivered", "Luis"),
            ("c-dead-tokens", "Marta"),
            ("c-no-tokens", "Pepe"),
            ("c-missing", "Nadie"),
        ],
    )
    .await;
    let mut after = before.clone();
    after.status = DeviceStatus::Sos(SosCategory::General);
    store.put_device(after.clone()).await.unwrap();

    let coord = coordinator(&store, &push);
    let result = coord
        .fanout(&after, SosCategory::General, vigil_alert::now_ms())
        .await;

    assert_eq!(result.notified, 1);
    assert_eq!(result.failed, 3);
    assert_eq!(result.notified + result.failed, 4);

    // Attempted contacts (delivered + dead-token) get inbox writes, the
    // channel-less and missing ones do not
    assert_eq!(store.inbox("c-delivered").await.len(), 1);
    assert_eq!(store.inbox("c-dead-tokens").await.len(), 1);
    assert!(store.inbox("c-no-tokens").await.is_empty());
    assert!(store.inbox("c-missing").await.is_empty());

    // Both of Marta's tokens were terminal failures and got pruned
    let marta = store.get_user("c-dead-tokens").await.unwrap().unwrap();
    assert!(marta.delivery_tokens.is_empty());
}

#[tokio::test]
async fn test_dual_write_completeness() {
    let store = Arc::new(MemoryStore::new());
    let push = Arc::new(ScriptedPush::new());

    for i in 0..3 {
        seed_user(
            &store,
            &format!("c-{}", i),
            &format!("Contact {}", i),
            &[&format!("tok-{}", i)],
        )
        .await;
    }
    let contacts: Vec<(String, String)> = (0..3)
        .map(|i| (format!("c-{}", i), format!("Contact {}", i)))
        .collect();
    let contact_refs: Vec<(&str, &str)> = contacts
        .iter()
        .map(|(uid, name)| (uid.as_str(), name.as_str()))
        .collect();

    let before = seed_device(&store, OWNER, DEVICE, DeviceStatus::Online, &contact_refs).await;
    let mut after = before.clone();
    after.status = DeviceStatus::Sos(SosCategory::Seguridad);
    store.put_device(after.clone()).await.unwrap();

    coordinator(&store, &push)
        .on_device_updated(OWNER, DEVICE, &before, &after)
        .await;

    // Exactly one source-side event and one inbox event per contact
    assert_eq!(store.device_alerts(OWNER, DEVICE).await.len(), 1);
    for i in 0..3 {
        assert_eq!(store.inbox(&format!("c-{}", i)).await.len(), 1);
    }
    assert_eq!(push.call_count(), 3);
}

#[tokio::test]
async fn test_custom_message_and_location_carried_into_records() {
    let store = Arc::new(MemoryStore::new());
    let push = Arc::new(ScriptedPush::new());

    seed_user(&store, OWNER, "Ana", &[]).await;
    seed_user(&store, "contact-a", "Luis", &["tok-a1"]).await;

    let mut before = seed_device(
        &store,
        OWNER,
        DEVICE,
        DeviceStatus::Online,
        &[("contact-a", "Luis")],
    )
    .await;
    before
        .sos_messages
        .insert("medica".to_string(), "Necesito insulina".to_string());
    before.last_location = Some(vigil_domain::GeoPoint {
        latitude: -34.603722,
        longitude: -58.381592,
        accuracy: Some(8.0),
        captured_at: Some(1_700_000_000_000),
    });
    let mut after = before.clone();
    after.status = DeviceStatus::Sos(SosCategory::Medica);
    store.put_device(after.clone()).await.unwrap();

    coordinator(&store, &push)
        .on_device_updated(OWNER, DEVICE, &before, &after)
        .await;

    let inbox = store.inbox("contact-a").await;
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].message, "Necesito insulina");
    let location = inbox[0].location.as_ref().unwrap();
    assert!((location.latitude - -34.603722).abs() < 1e-9);
}

#[tokio::test]
async fn test_transport_outage_records_failure_without_pruning() {
    let store = Arc::new(MemoryStore::new());
    let push = Arc::new(ScriptedPush::unreachable());

    seed_user(&store, "contact-a", "Luis", &["tok-a1", "tok-a2"]).await;
    let before = seed_device(
        &store,
        OWNER,
        DEVICE,
        DeviceStatus::Online,
        &[("contact-a", "Luis")],
    )
    .await;
    let mut after = before.clone();
    after.status = DeviceStatus::Sos(SosCategory::General);
    store.put_device(after.clone()).await.unwrap();

    coordinator(&store, &push)
        .on_device_updated(OWNER, DEVICE, &before, &after)
        .await;

    let history = store.device_alerts(OWNER, DEVICE).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].notified_count, 0);
    assert_eq!(history[0].failed_count, 1);

    // Transient outage: a delivery was attempted, so the inbox write
    // still happens and no token is pruned
    assert_eq!(store.inbox("contact-a").await.len(), 1);
    let user = store.get_user("contact-a").await.unwrap().unwrap();
    assert_eq!(user.delivery_tokens.len(), 2);
}
