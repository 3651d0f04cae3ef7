use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::database::models::{Booking, Provider};
use crate::scheduling::time::Interval;

/// How much of a roster is free for a given day or time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityReport {
    pub total_units: u32,
    pub committed_units: u32,
    pub free_units: u32,
}

/// Ids of units committed to a confirmed or in-progress booking. With
/// `window = None` the check is date-level: any holding booking that day
/// commits its units. With `window = Some(..)` only bookings whose interval
/// overlaps the window count (the assignment guard's granularity).
pub fn committed_unit_ids<'a, F>(
    unit_ids: &[Uuid],
    bookings: &'a [Booking],
    window: Option<Interval>,
    assigned: F,
) -> HashSet<Uuid>
where
    F: Fn(&'a Booking) -> &'a [Uuid],
{
    let mut committed = HashSet::new();

    for booking in bookings {
        if !booking.status.holds_resources() {
            continue;
        }
        if let Some(window) = window
            && !booking.interval().overlaps(&window)
        {
            continue;
        }
        for id in assigned(booking) {
            if unit_ids.contains(id) {
                committed.insert(*id);
            }
        }
    }

    committed
}

pub fn resolve<'a, F>(
    unit_ids: &[Uuid],
    bookings: &'a [Booking],
    window: Option<Interval>,
    assigned: F,
) -> CapacityReport
where
    F: Fn(&'a Booking) -> &'a [Uuid],
{
    let committed = committed_unit_ids(unit_ids, bookings, window, assigned);
    let total = unit_ids.len() as u32;
    let committed_count = committed.len() as u32;

    CapacityReport {
        total_units: total,
        committed_units: committed_count,
        free_units: total - committed_count,
    }
}

/// Capacity over the provider's active team members.
pub fn team_capacity(
    provider: &Provider,
    bookings: &[Booking],
    window: Option<Interval>,
) -> CapacityReport {
    resolve(&provider.active_team_ids(), bookings, window, |b| {
        &b.assignment.team_member_ids
    })
}

/// Capacity over the provider's non-withdrawn equipment units.
pub fn equipment_capacity(
    provider: &Provider,
    bookings: &[Booking],
    window: Option<Interval>,
) -> CapacityReport {
    resolve(&provider.available_equipment_ids(), bookings, window, |b| {
        &b.assignment.equipment_ids
    })
}
