//! Routing and hand-off tools: traffic, re-routing, lockers, flights.

use serde_json::json;
use synapse_core::action::Arguments;
use synapse_core::observation::Observation;

use crate::simulated::{SimulatedTool, arg, display};

pub const CHECK_TRAFFIC: SimulatedTool = SimulatedTool::new(
    "check_traffic",
    "Check traffic conditions between an origin and a destination. Returns severity, expected delay and alternative routes.",
    &["origin", "destination"],
    check_traffic,
);

pub const RE_ROUTE_DRIVER: SimulatedTool = SimulatedTool::new(
    "re_route_driver",
    "Assign a new route to a driver.",
    &["driver_id", "new_route"],
    re_route_driver,
);

pub const FIND_NEARBY_LOCKER: SimulatedTool = SimulatedTool::new(
    "find_nearby_locker",
    "Find an available parcel locker near a location.",
    &["location"],
    find_nearby_locker,
);

pub const CHECK_FLIGHT_STATUS: SimulatedTool = SimulatedTool::new(
    "check_flight_status",
    "Look up the status and delay of a flight.",
    &["flight_number"],
    check_flight_status,
);

pub const SUGGEST_SAFE_DROP_OFF: SimulatedTool = SimulatedTool::new(
    "suggest_safe_drop_off",
    "Suggest a safe drop-off option near a location (concierge, neighbour). May require recipient permission.",
    &["location"],
    suggest_safe_drop_off,
);

pub const CALCULATE_ALTERNATIVE_ROUTE: SimulatedTool = SimulatedTool::new(
    "calculate_alternative_route",
    "Compute an alternative route between two points and the resulting ETA change.",
    &["origin", "destination"],
    calculate_alternative_route,
);

fn check_traffic(_args: &Arguments) -> Observation {
    Observation::new()
        .with("severity", "major")
        .with("delay_minutes", 18)
        .with("alternatives", json!([{"route": "A->C->D", "extra_mins": 6}]))
}

fn re_route_driver(args: &Arguments) -> Observation {
    Observation::new()
        .with("driver_id", arg(args, "driver_id"))
        .with("new_route", arg(args, "new_route"))
        .with("status", "assigned")
}

fn find_nearby_locker(_args: &Arguments) -> Observation {
    Observation::new()
        .with("locker_id", "locker_77")
        .with("distance_m", 300)
        .with("available", true)
}

fn check_flight_status(args: &Arguments) -> Observation {
    Observation::new()
        .with("flight_number", arg(args, "flight_number"))
        .with("status", "on_time")
        .with("delay_minutes", 0)
}

fn suggest_safe_drop_off(args: &Arguments) -> Observation {
    Observation::new()
        .with("suggestion", "leave_with_concierge")
        .with("details", format!("concierge at {}", display(&arg(args, "location"))))
        .with("requires_permission", true)
}

fn calculate_alternative_route(args: &Arguments) -> Observation {
    let route = format!(
        "{}->{} via alt",
        display(&arg(args, "origin")),
        display(&arg(args, "destination"))
    );
    Observation::new()
        .with("route", route)
        .with("eta_change_minutes", 5)
        .with("reason", "accident_avoidance")
}
