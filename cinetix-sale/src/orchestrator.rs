use std::sync::Arc;

use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use cinetix_booking::{ReservationRepository, SeatHoldRepository};
use cinetix_catalog::{SaleChannel, TicketType};
use cinetix_core::{
    Clock, CoreError, CoreResult, IdempotencyClaim, IdempotencyStore, MemberRepository,
    PaymentGateway, ScreeningRepository, SeatLayoutRepository, TicketCodeGenerator,
};
use cinetix_pricing::{PriceQuoteRequest, PriceQuoteResponse, PricingEngine, QuoteItem};

use crate::models::{
    Payment, PaymentStatus, SellTicketsRequest, SellTicketsResponse, SoldTicket, Ticket,
};
use crate::repository::{HoldRelease, SaleCommit, SaleUnitOfWork, TicketRepository};

const TICKET_CODE_ATTEMPTS: u32 = 10;
const MAX_ITEMS_PER_SALE: usize = 10;

/// Top-level sale transaction: validates seat state, prices the order,
/// captures payment, and persists the result atomically. Payment declines
/// are a normal response, never an error.
pub struct SaleOrchestrator {
    screenings: Arc<dyn ScreeningRepository>,
    layouts: Arc<dyn SeatLayoutRepository>,
    members: Arc<dyn MemberRepository>,
    tickets: Arc<dyn TicketRepository>,
    reservations: Arc<dyn ReservationRepository>,
    holds: Arc<dyn SeatHoldRepository>,
    pricing: Arc<PricingEngine>,
    gateway: Arc<dyn PaymentGateway>,
    idempotency: Arc<dyn IdempotencyStore>,
    codes: Arc<dyn TicketCodeGenerator>,
    uow: Arc<dyn SaleUnitOfWork>,
    clock: Arc<dyn Clock>,
}

/// Seats resolved for the sale, aligned index-for-index with the quote
/// items for the whole request lifecycle.
struct ResolvedSeats {
    seats: Vec<(Uuid, TicketType, bool)>,
    reservation_group: Option<Uuid>,
}

impl SaleOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        screenings: Arc<dyn ScreeningRepository>,
        layouts: Arc<dyn SeatLayoutRepository>,
        members: Arc<dyn MemberRepository>,
        tickets: Arc<dyn TicketRepository>,
        reservations: Arc<dyn ReservationRepository>,
        holds: Arc<dyn SeatHoldRepository>,
        pricing: Arc<PricingEngine>,
        gateway: Arc<dyn PaymentGateway>,
        idempotency: Arc<dyn IdempotencyStore>,
        codes: Arc<dyn TicketCodeGenerator>,
        uow: Arc<dyn SaleUnitOfWork>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            screenings,
            layouts,
            members,
            tickets,
            reservations,
            holds,
            pricing,
            gateway,
            idempotency,
            codes,
            uow,
            clock,
        }
    }

    pub async fn sell_tickets(
        &self,
        request: &SellTicketsRequest,
    ) -> CoreResult<SellTicketsResponse> {
        // The key is claimed atomically before any other work, payment
        // included: a concurrent duplicate either replays the finished
        // response or conflicts, it never reaches the gateway.
        let key = request.idempotency_key.as_deref().filter(|k| !k.is_empty());
        if let Some(key) = key {
            match self.idempotency.claim(key).await? {
                IdempotencyClaim::Completed(cached) => {
                    info!(key, "sale replayed from idempotency cache");
                    return serde_json::from_value(cached).map_err(|e| {
                        CoreError::internal(format!("corrupt idempotency entry: {e}"))
                    });
                }
                IdempotencyClaim::InFlight => {
                    return Err(CoreError::conflict(
                        "a sale with this idempotency key is already in progress",
                    ));
                }
                IdempotencyClaim::Acquired => {}
            }
        }

        let result = self.process_sale(request).await;
        if let Some(key) = key {
            match &result {
                Ok(response) if response.payment_status == PaymentStatus::Succeeded => {
                    self.idempotency
                        .complete(key, serde_json::to_value(response).map_err(internal)?)
                        .await?;
                }
                // Declines and failed requests free the key for a retry.
                _ => self.idempotency.release(key).await?,
            }
        }
        result
    }

    async fn process_sale(&self, request: &SellTicketsRequest) -> CoreResult<SellTicketsResponse> {
        let now = self.clock.now();
        let screening = self
            .screenings
            .get_screening(request.screening_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("screening {}", request.screening_id)))?;
        if screening.has_started(now) {
            return Err(CoreError::conflict(
                "cannot sell tickets for a started or past screening",
            ));
        }

        let resolved = match request.reservation_id {
            Some(group_id) => self.resolve_reservation_sale(request, group_id).await?,
            None => self.resolve_direct_sale(request, &screening, now).await?,
        };

        // Unlike the pricing engine's tolerant lookup, an explicit member
        // reference must resolve.
        if let Some(member_id) = request.member_id {
            self.members
                .get_member(member_id)
                .await?
                .ok_or_else(|| CoreError::not_found(format!("member {member_id}")))?;
        }

        let quote = self
            .pricing
            .calculate_quote(&PriceQuoteRequest {
                screening_id: request.screening_id,
                member_id: request.member_id,
                items: resolved
                    .seats
                    .iter()
                    .map(|&(_, ticket_type, is_vip_guest)| QuoteItem {
                        ticket_type,
                        is_vip_guest,
                        quantity: 1,
                    })
                    .collect(),
            })
            .await?;

        let metadata = json!({
            "screening_id": request.screening_id,
            "seat_count": resolved.seats.len(),
            "channel": request.channel.as_str(),
            "reservation_id": resolved.reservation_group,
        });
        let gateway_result = self
            .gateway
            .authorize_and_capture(
                quote.total_after_cents,
                &request.payment_method,
                request.member_id,
                metadata,
            )
            .await?;

        if !gateway_result.is_success {
            warn!(
                screening = %request.screening_id,
                reason = gateway_result.error_message.as_deref().unwrap_or("unknown"),
                "payment declined"
            );
            return Ok(SellTicketsResponse {
                payment_status: PaymentStatus::Failed,
                payment_id: None,
                total_before_cents: quote.total_before_cents,
                total_after_cents: quote.total_after_cents,
                payment_error: gateway_result.error_message,
                tickets: Vec::new(),
            });
        }

        self.persist_sale(request, &resolved, &quote, gateway_result.transaction_id)
            .await
    }

    async fn resolve_reservation_sale(
        &self,
        request: &SellTicketsRequest,
        group_id: Uuid,
    ) -> CoreResult<ResolvedSeats> {
        let rows = self.reservations.reservations_by_group(group_id).await?;
        if rows.is_empty() {
            return Err(CoreError::not_found(format!("reservation {group_id}")));
        }
        if let Some(member_id) = request.member_id {
            if rows.iter().any(|r| r.member_id != Some(member_id)) {
                return Err(CoreError::unauthorized(
                    "reservation belongs to another member",
                ));
            }
        }
        if rows.iter().any(|r| r.screening_id != request.screening_id) {
            return Err(CoreError::conflict(
                "reservation is for a different screening",
            ));
        }
        if let Some(bad) = rows.iter().find(|r| !r.status.is_sellable()) {
            return Err(CoreError::conflict(format!(
                "reservation is {:?}, not sellable",
                bad.status
            )));
        }
        for row in &rows {
            if self
                .tickets
                .ticket_exists(row.screening_id, row.seat_id)
                .await?
            {
                return Err(CoreError::conflict(format!(
                    "seat {} already sold",
                    row.seat_id
                )));
            }
        }

        // Request items may assign per-seat ticket types; unmatched seats
        // sell as Full. Items naming foreign seats are rejected.
        for item in &request.items {
            if !rows.iter().any(|r| r.seat_id == item.seat_id) {
                return Err(CoreError::validation(format!(
                    "seat {} is not part of this reservation",
                    item.seat_id
                )));
            }
        }
        let seats = rows
            .iter()
            .map(|r| {
                let item = request.items.iter().find(|i| i.seat_id == r.seat_id);
                (
                    r.seat_id,
                    item.map(|i| i.ticket_type).unwrap_or_default(),
                    item.map(|i| i.is_vip_guest).unwrap_or(false),
                )
            })
            .collect();

        Ok(ResolvedSeats {
            seats,
            reservation_group: Some(group_id),
        })
    }

    async fn resolve_direct_sale(
        &self,
        request: &SellTicketsRequest,
        screening: &cinetix_catalog::Screening,
        now: chrono::DateTime<chrono::Utc>,
    ) -> CoreResult<ResolvedSeats> {
        if request.items.is_empty() {
            return Err(CoreError::validation(
                "direct sale requires at least one item",
            ));
        }
        if request.items.len() > MAX_ITEMS_PER_SALE {
            return Err(CoreError::validation(format!(
                "at most {MAX_ITEMS_PER_SALE} seats per sale"
            )));
        }
        let mut seat_ids: Vec<Uuid> = request.items.iter().map(|i| i.seat_id).collect();
        seat_ids.sort();
        seat_ids.dedup();
        if seat_ids.len() != request.items.len() {
            return Err(CoreError::validation("duplicate seats in request"));
        }

        let layout = self
            .layouts
            .get_layout(screening.layout_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("seat layout {}", screening.layout_id)))?;

        for item in &request.items {
            if !layout.contains_seat(item.seat_id) {
                return Err(CoreError::not_found(format!("seat {}", item.seat_id)));
            }
            if self
                .tickets
                .ticket_exists(request.screening_id, item.seat_id)
                .await?
            {
                return Err(CoreError::conflict(format!(
                    "seat {} already sold",
                    item.seat_id
                )));
            }
        }

        // Staff at the box office may override holds; everyone else must
        // own whatever hold sits on the seat.
        if request.channel != SaleChannel::BoxOffice {
            let all_seats: Vec<Uuid> = request.items.iter().map(|i| i.seat_id).collect();
            let active = self
                .holds
                .active_holds_for_seats(request.screening_id, &all_seats, now)
                .await?;
            let token = request.client_token.as_deref().unwrap_or("");
            if let Some(foreign) = active
                .iter()
                .find(|h| !h.is_owned_by(token, request.member_id))
            {
                return Err(CoreError::conflict(format!(
                    "seat {} is held by another user",
                    foreign.seat_id
                )));
            }
        }

        Ok(ResolvedSeats {
            seats: request
                .items
                .iter()
                .map(|i| (i.seat_id, i.ticket_type, i.is_vip_guest))
                .collect(),
            reservation_group: None,
        })
    }

    async fn persist_sale(
        &self,
        request: &SellTicketsRequest,
        resolved: &ResolvedSeats,
        quote: &PriceQuoteResponse,
        transaction_id: Option<String>,
    ) -> CoreResult<SellTicketsResponse> {
        let now = self.clock.now();
        let payment = Payment {
            id: Uuid::new_v4(),
            amount_cents: quote.total_after_cents,
            method: request.payment_method.clone(),
            status: PaymentStatus::Succeeded,
            external_reference: transaction_id,
            created_at: now,
        };

        // Seats and quote lines stay aligned by index.
        let mut tickets = Vec::with_capacity(resolved.seats.len());
        let mut batch_codes: Vec<String> = Vec::new();
        for (&(seat_id, ticket_type, _), line) in resolved.seats.iter().zip(quote.lines.iter()) {
            let ticket_code = self.unique_ticket_code(&batch_codes).await?;
            batch_codes.push(ticket_code.clone());
            tickets.push(Ticket {
                id: Uuid::new_v4(),
                screening_id: request.screening_id,
                seat_id,
                ticket_type,
                channel: request.channel,
                price_cents: line.final_price_cents,
                payment_id: payment.id,
                sold_at: now,
                ticket_code,
                applied_pricing_json: serde_json::to_string(line).map_err(internal)?,
            });
        }

        let release_holds_for = match (&request.client_token, resolved.reservation_group) {
            // Reservation sales always clear leftover holds on the seats.
            (token, Some(_)) => Some(HoldRelease {
                screening_id: request.screening_id,
                seat_ids: resolved.seats.iter().map(|s| s.0).collect(),
                client_token: token.clone().unwrap_or_default(),
                user_id: request.member_id,
            }),
            (Some(token), None) => Some(HoldRelease {
                screening_id: request.screening_id,
                seat_ids: resolved.seats.iter().map(|s| s.0).collect(),
                client_token: token.clone(),
                user_id: request.member_id,
            }),
            (None, None) => None,
        };

        let sold: Vec<SoldTicket> = tickets
            .iter()
            .zip(quote.lines.iter())
            .map(|(t, line)| SoldTicket {
                ticket_id: t.id,
                seat_id: t.seat_id,
                ticket_code: t.ticket_code.clone(),
                price_cents: t.price_cents,
                applied_rule_code: line.applied_rule.code.clone(),
            })
            .collect();
        let payment_id = payment.id;

        let commit = SaleCommit {
            payment,
            tickets,
            complete_reservation_group: resolved.reservation_group,
            release_holds_for,
        };
        if let Err(err) = self.uow.commit_sale(commit).await {
            // The charge is already captured; surface loudly for
            // reconciliation and propagate.
            error!(%payment_id, %err, "sale persistence failed after payment capture");
            return Err(err);
        }

        info!(
            screening = %request.screening_id,
            seats = resolved.seats.len(),
            total_cents = quote.total_after_cents,
            "tickets sold"
        );
        Ok(SellTicketsResponse {
            payment_status: PaymentStatus::Succeeded,
            payment_id: Some(payment_id),
            total_before_cents: quote.total_before_cents,
            total_after_cents: quote.total_after_cents,
            payment_error: None,
            tickets: sold,
        })
    }

    /// Retry loop against persisted codes and the in-flight batch.
    async fn unique_ticket_code(&self, batch: &[String]) -> CoreResult<String> {
        for _ in 0..TICKET_CODE_ATTEMPTS {
            let code = self.codes.generate();
            if batch.contains(&code) {
                continue;
            }
            if !self.tickets.code_exists(&code).await? {
                return Ok(code);
            }
        }
        Err(CoreError::TicketCodeExhausted {
            attempts: TICKET_CODE_ATTEMPTS,
        })
    }
}

fn internal(err: serde_json::Error) -> CoreError {
    CoreError::internal(err.to_string())
}
