mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use cinetix_booking::{ReservationRepository, ReservationStatus};
use cinetix_core::settings::keys;
use cinetix_core::{Clock, CoreError, TicketCodeGenerator};
use cinetix_catalog::{SaleChannel, TicketType};
use cinetix_pricing::rules;
use cinetix_sale::{PaymentStatus, SaleItem, SellTicketsRequest};
use cinetix_store::seed;

use common::{default_now, sales_with_gateway, stack_at, with_codes, Stack};

async fn seeded_screening(
    stack: &Stack,
    ahead: Duration,
) -> (cinetix_catalog::Screening, cinetix_catalog::SeatLayout) {
    let layout = seed::grid_layout(4, 6);
    let screening = seed::screening_in(&layout, stack.clock.now() + ahead);
    stack.store.insert_layout(layout.clone()).await;
    stack.store.insert_screening(screening.clone()).await;
    (screening, layout)
}

fn direct_request(screening_id: Uuid, seats: &[Uuid], channel: SaleChannel) -> SellTicketsRequest {
    SellTicketsRequest {
        screening_id,
        reservation_id: None,
        client_token: None,
        member_id: None,
        channel,
        payment_method: "cash".to_string(),
        idempotency_key: None,
        items: seats
            .iter()
            .map(|&seat_id| SaleItem {
                seat_id,
                ticket_type: TicketType::Full,
                is_vip_guest: false,
            })
            .collect(),
    }
}

#[tokio::test]
async fn box_office_sale_persists_payment_and_tickets() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, Duration::hours(4)).await;
    let seats = [layout.seats[0].id, layout.seats[1].id];

    let response = stack
        .sales
        .sell_tickets(&direct_request(screening.id, &seats, SaleChannel::BoxOffice))
        .await
        .unwrap();

    assert_eq!(response.payment_status, PaymentStatus::Succeeded);
    assert_eq!(response.total_before_cents, 20_000);
    assert_eq!(response.total_after_cents, 20_000);
    assert_eq!(response.tickets.len(), 2);
    for ticket in &response.tickets {
        assert_eq!(ticket.price_cents, 10_000);
        assert_eq!(ticket.applied_rule_code, rules::BASE_PRICE);
        assert_eq!(ticket.ticket_code.len(), 9);
    }

    let persisted = stack.store.tickets_for_screening(screening.id).await;
    assert_eq!(persisted.len(), 2);
    let payments = stack.store.payments().await;
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount_cents, 20_000);
    assert!(payments[0]
        .external_reference
        .as_deref()
        .is_some_and(|r| r.starts_with("mock_txn_")));
}

#[tokio::test]
async fn sold_seats_cannot_be_sold_twice() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, Duration::hours(4)).await;
    let seat = layout.seats[0].id;

    stack
        .sales
        .sell_tickets(&direct_request(screening.id, &[seat], SaleChannel::BoxOffice))
        .await
        .unwrap();

    let err = stack
        .sales
        .sell_tickets(&direct_request(screening.id, &[seat], SaleChannel::Online))
        .await
        .unwrap_err();
    match err {
        CoreError::Conflict(msg) => assert!(msg.contains("already sold")),
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(stack.store.tickets_for_screening(screening.id).await.len(), 1);
}

#[tokio::test]
async fn online_sales_respect_foreign_holds_but_box_office_overrides() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, Duration::hours(4)).await;
    let seat = layout.seats[0].id;
    stack
        .holds
        .create_holds(screening.id, &[seat], "tok-holder", None, None)
        .await
        .unwrap();

    let mut online = direct_request(screening.id, &[seat], SaleChannel::Online);
    online.client_token = Some("tok-other".to_string());
    let err = stack.sales.sell_tickets(&online).await.unwrap_err();
    match err {
        CoreError::Conflict(msg) => assert!(msg.contains("held by another user")),
        other => panic!("expected conflict, got {other:?}"),
    }

    stack
        .sales
        .sell_tickets(&direct_request(screening.id, &[seat], SaleChannel::BoxOffice))
        .await
        .unwrap();
}

#[tokio::test]
async fn online_sale_with_own_hold_releases_it() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, Duration::hours(4)).await;
    let seat = layout.seats[0].id;
    stack
        .holds
        .create_holds(screening.id, &[seat], "tok-a", None, None)
        .await
        .unwrap();

    let mut request = direct_request(screening.id, &[seat], SaleChannel::Online);
    request.client_token = Some("tok-a".to_string());
    stack.sales.sell_tickets(&request).await.unwrap();

    assert_eq!(stack.store.active_hold_count(screening.id).await, 0);
}

async fn reserve(
    stack: &Stack,
    screening_id: Uuid,
    seats: &[Uuid],
    token: &str,
    member_id: Option<Uuid>,
) -> Uuid {
    stack
        .holds
        .create_holds(screening_id, seats, token, member_id, None)
        .await
        .unwrap();
    let views = stack
        .reservations
        .create_reservation(screening_id, seats, token, member_id)
        .await
        .unwrap();
    views[0].group_id
}

#[tokio::test]
async fn reservation_sale_completes_the_group() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, Duration::hours(4)).await;
    let member = seed::regular_member("Deniz");
    stack.store.insert_member(member.clone()).await;
    let seats = [layout.seats[0].id, layout.seats[1].id];
    let group = reserve(&stack, screening.id, &seats, "tok-a", Some(member.id)).await;

    let mut request = direct_request(screening.id, &[], SaleChannel::Online);
    request.reservation_id = Some(group);
    request.member_id = Some(member.id);
    request.client_token = Some("tok-a".to_string());
    // One seat sells as Student, the other defaults to Full.
    request.items = vec![SaleItem {
        seat_id: seats[0],
        ticket_type: TicketType::Student,
        is_vip_guest: false,
    }];

    let response = stack.sales.sell_tickets(&request).await.unwrap();
    assert_eq!(response.tickets.len(), 2);
    assert_eq!(response.total_after_cents, 6_000 + 10_000);

    let rows = stack.store.reservations_by_group(group).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.status == ReservationStatus::Completed));
    // Completed rows are past the sweep's reach.
    assert_eq!(stack.reservations.expire_reservations().await.unwrap(), 0);
}

#[tokio::test]
async fn reservation_sale_rejects_wrong_member_and_foreign_items() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, Duration::hours(4)).await;
    let owner = seed::regular_member("Deniz");
    let other = seed::regular_member("Ece");
    stack.store.insert_member(owner.clone()).await;
    stack.store.insert_member(other.clone()).await;
    let seats = [layout.seats[0].id];
    let group = reserve(&stack, screening.id, &seats, "tok-a", Some(owner.id)).await;

    let mut request = direct_request(screening.id, &[], SaleChannel::Online);
    request.reservation_id = Some(group);
    request.member_id = Some(other.id);
    let err = stack.sales.sell_tickets(&request).await.unwrap_err();
    assert!(matches!(err, CoreError::Unauthorized(_)));

    request.member_id = Some(owner.id);
    request.items = vec![SaleItem {
        seat_id: layout.seats[5].id,
        ticket_type: TicketType::Full,
        is_vip_guest: false,
    }];
    let err = stack.sales.sell_tickets(&request).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
async fn declined_payment_persists_nothing_and_is_retryable() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, Duration::hours(4)).await;
    let seat = layout.seats[0].id;

    let mut request = direct_request(screening.id, &[seat], SaleChannel::Online);
    request.payment_method = "declined-card".to_string();
    request.idempotency_key = Some("sale-1".to_string());

    let response = stack.sales.sell_tickets(&request).await.unwrap();
    assert_eq!(response.payment_status, PaymentStatus::Failed);
    assert_eq!(response.payment_error.as_deref(), Some("card declined"));
    assert!(response.tickets.is_empty());
    assert!(stack.store.tickets_for_screening(screening.id).await.is_empty());
    assert!(stack.store.payments().await.is_empty());

    // Declines are not cached; a retry with a working card goes through
    // under the same idempotency key.
    request.payment_method = "cash".to_string();
    let response = stack.sales.sell_tickets(&request).await.unwrap();
    assert_eq!(response.payment_status, PaymentStatus::Succeeded);
    assert_eq!(stack.gateway.call_count(), 2);
}

#[tokio::test]
async fn idempotency_key_replays_without_a_second_charge() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, Duration::hours(4)).await;

    let mut request = direct_request(screening.id, &[layout.seats[0].id], SaleChannel::BoxOffice);
    request.idempotency_key = Some("sale-42".to_string());

    let first = stack.sales.sell_tickets(&request).await.unwrap();
    let replay = stack.sales.sell_tickets(&request).await.unwrap();

    assert_eq!(stack.gateway.call_count(), 1);
    assert_eq!(replay.payment_id, first.payment_id);
    assert_eq!(replay.tickets[0].ticket_code, first.tickets[0].ticket_code);
    assert_eq!(stack.store.tickets_for_screening(screening.id).await.len(), 1);
}

struct ConstantCodes;

impl TicketCodeGenerator for ConstantCodes {
    fn generate(&self) -> String {
        "AA11-11AA".to_string()
    }
}

#[tokio::test]
async fn exhausted_code_generation_aborts_the_sale() {
    let stack = stack_at(default_now());
    let stack = with_codes(&stack, Arc::new(ConstantCodes));
    let (screening, layout) = seeded_screening(&stack, Duration::hours(4)).await;

    // First sale takes the only code the generator ever produces.
    stack
        .sales
        .sell_tickets(&direct_request(
            screening.id,
            &[layout.seats[0].id],
            SaleChannel::BoxOffice,
        ))
        .await
        .unwrap();

    let err = stack
        .sales
        .sell_tickets(&direct_request(
            screening.id,
            &[layout.seats[1].id],
            SaleChannel::BoxOffice,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::TicketCodeExhausted { attempts: 10 }));
    assert_eq!(stack.store.tickets_for_screening(screening.id).await.len(), 1);
}

#[tokio::test]
async fn started_screenings_are_not_sellable() {
    let stack = stack_at(default_now());
    let layout = seed::grid_layout(2, 2);
    let screening = seed::screening_in(&layout, default_now() - Duration::minutes(1));
    stack.store.insert_layout(layout.clone()).await;
    stack.store.insert_screening(screening.clone()).await;

    let err = stack
        .sales
        .sell_tickets(&direct_request(
            screening.id,
            &[layout.seats[0].id],
            SaleChannel::BoxOffice,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
}

#[tokio::test]
async fn unknown_member_reference_fails_before_payment() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, Duration::hours(4)).await;

    let mut request = direct_request(screening.id, &[layout.seats[0].id], SaleChannel::BoxOffice);
    request.member_id = Some(Uuid::new_v4());

    let err = stack.sales.sell_tickets(&request).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
    assert_eq!(stack.gateway.call_count(), 0);
}

#[tokio::test]
async fn configured_discount_day_flows_through_to_tickets() {
    let stack = stack_at(default_now());
    // The pinned test clock is a Tuesday.
    stack.settings.set(keys::HALK_GUNU, "Tuesday");
    let (screening, layout) = seeded_screening(&stack, Duration::hours(4)).await;

    let response = stack
        .sales
        .sell_tickets(&direct_request(
            screening.id,
            &[layout.seats[0].id],
            SaleChannel::BoxOffice,
        ))
        .await
        .unwrap();

    assert_eq!(response.total_after_cents, 5_000);
    assert_eq!(response.tickets[0].applied_rule_code, rules::HALK_GUNU_50);

    let persisted = stack.store.tickets_for_screening(screening.id).await;
    assert!(persisted[0].applied_pricing_json.contains(rules::HALK_GUNU_50));
}

/// Gateway that yields mid-call so a racing request can interleave.
struct SlowGateway {
    calls: AtomicU32,
}

#[async_trait]
impl cinetix_core::PaymentGateway for SlowGateway {
    async fn authorize_and_capture(
        &self,
        _amount_cents: i64,
        _method: &str,
        _member_id: Option<Uuid>,
        _metadata: serde_json::Value,
    ) -> cinetix_core::CoreResult<cinetix_core::GatewayResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        Ok(cinetix_core::GatewayResult::succeeded(format!(
            "slow_txn_{}",
            uuid::Uuid::new_v4().simple()
        )))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn simultaneous_sales_with_one_key_charge_once() {
    let stack = stack_at(default_now());
    let (screening, layout) = seeded_screening(&stack, Duration::hours(4)).await;
    let gateway = Arc::new(SlowGateway { calls: AtomicU32::new(0) });
    let sales = sales_with_gateway(&stack, gateway.clone());

    let mut request = direct_request(screening.id, &[layout.seats[0].id], SaleChannel::BoxOffice);
    request.idempotency_key = Some("pos-7-sale-42".to_string());

    let (a, b) = tokio::join!(sales.sell_tickets(&request), sales.sell_tickets(&request));

    // One request carries the sale through the gateway; the other sees
    // the in-flight key and backs off instead of charging again.
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    let (winner, loser) = if a.is_ok() { (a, b) } else { (b, a) };
    let winner = winner.unwrap();
    assert_eq!(winner.payment_status, PaymentStatus::Succeeded);
    assert_eq!(winner.tickets.len(), 1);
    assert!(matches!(loser, Err(CoreError::Conflict(_))));

    assert_eq!(stack.store.tickets_for_screening(screening.id).await.len(), 1);
    assert_eq!(stack.store.payments().await.len(), 1);

    // Once the winner finishes, the same key replays its response.
    let replay = sales.sell_tickets(&request).await.unwrap();
    assert_eq!(replay.payment_id, winner.payment_id);
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
}
