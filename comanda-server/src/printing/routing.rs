//! Order routing plan
//!
//! Decides which items of an order print at which zone. Pure function of the
//! zones and the items, no I/O.
//!
//! Rules, in order:
//!
//! 1. [`RouteRule::CategoryMatch`] - categorized zones take the items of their
//!    categories. One item may match several zones.
//! 2. [`RouteRule::DefaultZone`] - items nobody matched go to the first zone
//!    without categories.
//! 3. [`RouteRule::FirstActive`] - failing that, to the first active zone.
//!
//! Each zone appears at most once in a plan, so an order gets at most one
//! ticket per zone.

use serde::Serialize;
use shared::models::{OrderItem, PrinterZone};

/// Zone name receiving the companion notice
pub const KITCHEN_ZONE: &str = "cocina";
/// Zone whose presence triggers the companion notice
pub const BAR_ZONE: &str = "barra";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteRule {
    CategoryMatch,
    DefaultZone,
    FirstActive,
}

/// Items routed to one zone
#[derive(Debug, Clone)]
pub struct ZoneAssignment<'a> {
    pub zone: &'a PrinterZone,
    /// In order position
    pub items: Vec<&'a OrderItem>,
    /// Rule that first put the zone in the plan
    pub rule: RouteRule,
    /// Kitchen ticket of an order that also prints at the bar
    pub companion_notice: bool,
}

struct Draft {
    zone_idx: usize,
    item_idx: Vec<usize>,
    rule: RouteRule,
}

/// Build the routing plan for an order
///
/// Inactive zones are ignored. With no active zone the plan is empty.
pub fn plan_routes<'a>(zones: &'a [PrinterZone], items: &'a [OrderItem]) -> Vec<ZoneAssignment<'a>> {
    let active: Vec<&PrinterZone> = zones.iter().filter(|z| z.active).collect();
    if active.is_empty() || items.is_empty() {
        return Vec::new();
    }

    let mut drafts: Vec<Draft> = Vec::new();
    let mut matches = vec![0usize; items.len()];

    // CategoryMatch
    for (zone_idx, zone) in active.iter().enumerate() {
        if zone.is_catch_all() {
            continue;
        }
        let item_idx: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| zone.matches_category(item.category_id))
            .map(|(i, _)| i)
            .collect();
        if item_idx.is_empty() {
            continue;
        }
        for i in &item_idx {
            matches[*i] += 1;
        }
        drafts.push(Draft {
            zone_idx,
            item_idx,
            rule: RouteRule::CategoryMatch,
        });
    }

    for (i, count) in matches.iter().enumerate() {
        if *count > 1 {
            tracing::debug!(item = %items[i].id, zones = count, "Item matched several zones");
        }
    }

    let unassigned: Vec<usize> = (0..items.len()).filter(|i| matches[*i] == 0).collect();

    if !unassigned.is_empty() {
        // DefaultZone, then FirstActive
        let (zone_idx, rule) = active
            .iter()
            .position(|z| z.is_catch_all())
            .map(|i| (i, RouteRule::DefaultZone))
            .unwrap_or((0, RouteRule::FirstActive));

        tracing::debug!(
            zone = %active[zone_idx].name,
            rule = ?rule,
            count = unassigned.len(),
            "Routing unassigned items to fallback zone"
        );

        match drafts.iter_mut().find(|d| d.zone_idx == zone_idx) {
            Some(existing) => {
                existing.item_idx.extend(unassigned);
                existing.item_idx.sort_unstable();
            }
            None => drafts.push(Draft {
                zone_idx,
                item_idx: unassigned,
                rule,
            }),
        }
    }

    drafts.sort_by_key(|d| d.zone_idx);

    let has_bar = drafts
        .iter()
        .any(|d| active[d.zone_idx].name.trim().eq_ignore_ascii_case(BAR_ZONE));

    drafts
        .into_iter()
        .map(|d| {
            let zone = active[d.zone_idx];
            ZoneAssignment {
                zone,
                items: d.item_idx.iter().map(|i| &items[*i]).collect(),
                rule: d.rule,
                companion_notice: has_bar && zone.name.trim().eq_ignore_ascii_case(KITCHEN_ZONE),
            }
        })
        .collect()
}
