use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use cinetix_catalog::{Member, Screening, Seat, SeatLayout, VipApproval};

/// Builders for demo data and test fixtures.

pub fn grid_layout(rows: i32, cols: i32) -> SeatLayout {
    let mut seats = Vec::with_capacity((rows * cols) as usize);
    for row in 1..=rows {
        for col in 1..=cols {
            let row_letter = (b'A' + (row - 1) as u8) as char;
            seats.push(Seat {
                id: Uuid::new_v4(),
                label: format!("{row_letter}{col}"),
                row,
                col,
            });
        }
    }
    SeatLayout {
        id: Uuid::new_v4(),
        hall_id: Uuid::new_v4(),
        is_active: true,
        seats,
    }
}

pub fn screening_in(layout: &SeatLayout, starts_at: DateTime<Utc>) -> Screening {
    Screening {
        id: Uuid::new_v4(),
        movie_id: Uuid::new_v4(),
        hall_id: layout.hall_id,
        layout_id: layout.id,
        starts_at,
        duration_minutes: 120,
        is_first_weekday_show: false,
        is_special_day: false,
        base_price_cents: None,
    }
}

pub fn screening_hours_ahead(layout: &SeatLayout, hours: i64) -> Screening {
    screening_in(layout, Utc::now() + Duration::hours(hours))
}

pub fn active_vip(name: &str) -> Member {
    Member {
        id: Uuid::new_v4(),
        display_name: name.to_string(),
        vip_status: true,
        approvals: vec![VipApproval {
            approved: true,
            decided_at: Utc::now(),
        }],
    }
}

pub fn regular_member(name: &str) -> Member {
    Member {
        id: Uuid::new_v4(),
        display_name: name.to_string(),
        vip_status: false,
        approvals: Vec::new(),
    }
}
