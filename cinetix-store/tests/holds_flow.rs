mod common;

use chrono::Duration;
use uuid::Uuid;

use cinetix_core::settings::keys;
use cinetix_core::{Clock, CoreError};
use cinetix_store::seed;

use common::{default_now, stack_at};

async fn seeded_screening(
    stack: &common::Stack,
    hours_ahead: i64,
) -> (cinetix_catalog::Screening, cinetix_catalog::SeatLayout) {
    let layout = seed::grid_layout(5, 8);
    let screening = seed::screening_in(&layout, stack.clock.now() + Duration::hours(hours_ahead));
    stack.store.insert_layout(layout.clone()).await;
    stack.store.insert_screening(screening.clone()).await;
    (screening, layout)
}

#[tokio::test]
async fn create_holds_for_free_seats() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, 6).await;
    let seats = [layout.seats[0].id, layout.seats[1].id];

    let holds = stack
        .holds
        .create_holds(screening.id, &seats, "tok-a", None, None)
        .await
        .unwrap();

    assert_eq!(holds.len(), 2);
    // Default TTL is 120 seconds.
    assert_eq!(holds[0].expires_at, default_now() + Duration::seconds(120));
    assert_eq!(stack.store.active_hold_count(screening.id).await, 2);
}

#[tokio::test]
async fn overlapping_hold_conflicts_and_names_seats() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, 6).await;
    let contested = layout.seats[3].id;

    stack
        .holds
        .create_holds(screening.id, &[contested], "tok-a", None, None)
        .await
        .unwrap();

    let err = stack
        .holds
        .create_holds(screening.id, &[layout.seats[4].id, contested], "tok-b", None, None)
        .await
        .unwrap_err();

    match err {
        CoreError::Conflict(msg) => {
            assert!(msg.contains(&contested.to_string()));
            assert!(msg.contains("expires"));
        }
        other => panic!("expected conflict, got {other:?}"),
    }
    // The losing batch inserted nothing.
    assert_eq!(stack.store.active_hold_count(screening.id).await, 1);
}

#[tokio::test]
async fn same_owner_may_rehold_own_seats() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, 6).await;
    let seat = layout.seats[0].id;

    stack
        .holds
        .create_holds(screening.id, &[seat], "tok-a", None, None)
        .await
        .unwrap();
    stack
        .holds
        .create_holds(screening.id, &[seat], "tok-a", None, None)
        .await
        .unwrap();

    assert_eq!(stack.store.active_hold_count(screening.id).await, 1);
}

#[tokio::test]
async fn ttl_is_clamped_to_t_minus_thirty() {
    let stack = stack_at(default_now());
    let layout = seed::grid_layout(2, 2);
    let screening = seed::screening_in(&layout, default_now() + Duration::minutes(40));
    stack.store.insert_layout(layout.clone()).await;
    stack.store.insert_screening(screening.clone()).await;

    let holds = stack
        .holds
        .create_holds(screening.id, &[layout.seats[0].id], "tok-a", None, Some(3600))
        .await
        .unwrap();

    assert_eq!(holds[0].expires_at, screening.starts_at - Duration::minutes(30));
}

#[tokio::test]
async fn holds_rejected_once_booking_window_closed() {
    let stack = stack_at(default_now());
    let layout = seed::grid_layout(2, 2);
    let screening = seed::screening_in(&layout, default_now() + Duration::minutes(20));
    stack.store.insert_layout(layout.clone()).await;
    stack.store.insert_screening(screening.clone()).await;

    let err = stack
        .holds
        .create_holds(screening.id, &[layout.seats[0].id], "tok-a", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
}

#[tokio::test]
async fn unknown_seat_is_a_validation_error() {
    let stack = stack_at(default_now());
    let (screening, _) = seeded_screening(&stack, 6).await;

    let err = stack
        .holds
        .create_holds(screening.id, &[Uuid::new_v4()], "tok-a", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
async fn held_seat_on_reserved_seat_conflicts() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, 6).await;
    let seat = layout.seats[0].id;

    stack
        .holds
        .create_holds(screening.id, &[seat], "tok-a", None, None)
        .await
        .unwrap();
    stack
        .reservations
        .create_reservation(screening.id, &[seat], "tok-a", None)
        .await
        .unwrap();

    let err = stack
        .holds
        .create_holds(screening.id, &[seat], "tok-b", None, None)
        .await
        .unwrap_err();
    match err {
        CoreError::Conflict(msg) => assert!(msg.contains("reserved")),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn heartbeat_extends_hold_expiry() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, 6).await;

    let holds = stack
        .holds
        .create_holds(screening.id, &[layout.seats[0].id], "tok-a", None, None)
        .await
        .unwrap();

    stack.clock.advance(Duration::seconds(60));
    let extended = stack
        .holds
        .extend_hold(holds[0].id, "tok-a", None)
        .await
        .unwrap();
    assert_eq!(
        extended.expires_at,
        default_now() + Duration::seconds(60) + Duration::seconds(120)
    );
}

#[tokio::test]
async fn extend_respects_total_lifetime_ceiling() {
    let stack = stack_at(default_now());
    // A 20-minute heartbeat would push past the 10-minute lifetime cap.
    stack.settings.set(keys::HOLD_HEARTBEAT_EXTEND_SECONDS, "1200");
    let (screening, layout) = seeded_screening(&stack, 6).await;

    let holds = stack
        .holds
        .create_holds(screening.id, &[layout.seats[0].id], "tok-a", None, None)
        .await
        .unwrap();
    let hold = &holds[0];

    stack.clock.advance(Duration::seconds(60));
    let extended = stack
        .holds
        .extend_hold(hold.id, "tok-a", None)
        .await
        .unwrap();
    assert_eq!(extended.expires_at, hold.created_at + Duration::minutes(10));
}

#[tokio::test]
async fn expired_hold_cannot_be_extended() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, 6).await;

    let holds = stack
        .holds
        .create_holds(screening.id, &[layout.seats[0].id], "tok-a", None, None)
        .await
        .unwrap();

    stack.clock.advance(Duration::seconds(121));
    let err = stack
        .holds
        .extend_hold(holds[0].id, "tok-a", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
}

#[tokio::test]
async fn extend_and_release_check_ownership() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, 6).await;
    let user = Uuid::new_v4();

    let holds = stack
        .holds
        .create_holds(screening.id, &[layout.seats[0].id], "tok-a", Some(user), None)
        .await
        .unwrap();
    let hold_id = holds[0].id;

    let err = stack.holds.extend_hold(hold_id, "tok-b", None).await.unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized(_)));

    // A different token with the matching user id owns the hold.
    stack
        .holds
        .extend_hold(hold_id, "tok-b", Some(user))
        .await
        .unwrap();

    let err = stack
        .holds
        .release_hold(hold_id, "tok-b", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized(_)));

    stack.holds.release_hold(hold_id, "tok-a", None).await.unwrap();
    let err = stack
        .holds
        .release_hold(hold_id, "tok-a", None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn validate_holds_requires_every_seat() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, 6).await;
    let (a, b) = (layout.seats[0].id, layout.seats[1].id);

    stack
        .holds
        .create_holds(screening.id, &[a], "tok-a", None, None)
        .await
        .unwrap();

    assert!(stack
        .holds
        .validate_holds_for_reservation(screening.id, &[a], "tok-a", None)
        .await
        .unwrap());
    assert!(!stack
        .holds
        .validate_holds_for_reservation(screening.id, &[a, b], "tok-a", None)
        .await
        .unwrap());
    assert!(!stack
        .holds
        .validate_holds_for_reservation(screening.id, &[a], "tok-b", None)
        .await
        .unwrap());
}

#[tokio::test]
async fn cleanup_drains_in_batches() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, 6).await;
    let seats: Vec<Uuid> = layout.seats.iter().take(3).map(|s| s.id).collect();

    stack
        .holds
        .create_holds(screening.id, &seats, "tok-a", None, None)
        .await
        .unwrap();

    stack.clock.advance(Duration::seconds(300));
    assert_eq!(stack.holds.cleanup_expired_holds(2).await.unwrap(), 2);
    assert_eq!(stack.holds.cleanup_expired_holds(2).await.unwrap(), 1);
    assert_eq!(stack.holds.cleanup_expired_holds(2).await.unwrap(), 0);
}

#[tokio::test]
async fn custom_ttl_overrides_setting() {
    let stack = stack_at(default_now());
    stack.settings.set(keys::HOLD_DEFAULT_TTL_SECONDS, "60");
    let (screening, layout) = seeded_screening(&stack, 6).await;

    let defaulted = stack
        .holds
        .create_holds(screening.id, &[layout.seats[0].id], "tok-a", None, None)
        .await
        .unwrap();
    assert_eq!(defaulted[0].expires_at, default_now() + Duration::seconds(60));

    let explicit = stack
        .holds
        .create_holds(screening.id, &[layout.seats[1].id], "tok-a", None, Some(300))
        .await
        .unwrap();
    assert_eq!(explicit[0].expires_at, default_now() + Duration::seconds(300));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn simultaneous_holds_on_one_seat_admit_exactly_one() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, 6).await;
    let contested = layout.seats[0].id;

    let seats = [contested];
    let (a, b) = tokio::join!(
        stack.holds.create_holds(screening.id, &seats, "tok-a", None, None),
        stack.holds.create_holds(screening.id, &seats, "tok-b", None, None),
    );

    assert_eq!(
        a.is_ok() as u8 + b.is_ok() as u8,
        1,
        "exactly one client should win the seat: {a:?} / {b:?}"
    );
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(CoreError::Conflict(_))));
    assert_eq!(stack.store.active_hold_count(screening.id).await, 1);
}
