//! Merchant-side tools.

use serde_json::json;
use synapse_core::action::Arguments;
use synapse_core::observation::Observation;

use crate::simulated::{SimulatedTool, arg, is_truthy};

pub const GET_MERCHANT_STATUS: SimulatedTool = SimulatedTool::new(
    "get_merchant_status",
    "Get a merchant's current preparation time, open status and order backlog.",
    &["merchant_id"],
    get_merchant_status,
);

pub const GET_NEARBY_MERCHANTS: SimulatedTool = SimulatedTool::new(
    "get_nearby_merchants",
    "List merchants of a given type near a location, with their preparation times. radius_km defaults to 3.",
    &["merchant_type", "location", "radius_km"],
    get_nearby_merchants,
);

pub const LOG_MERCHANT_PACKAGING_FEEDBACK: SimulatedTool = SimulatedTool::new(
    "log_merchant_packaging_feedback",
    "Record packaging feedback against a merchant.",
    &["merchant_id", "feedback"],
    log_merchant_packaging_feedback,
);

fn get_merchant_status(args: &Arguments) -> Observation {
    Observation::new()
        .with("merchant_id", arg(args, "merchant_id"))
        .with("prep_time_min", 40)
        .with("open_status", "open")
        .with("backlog", 12)
}

fn get_nearby_merchants(_args: &Arguments) -> Observation {
    Observation::new().with(
        "nearby",
        json!([{"merchant_id": "m_102", "name": "QuickBites", "prep_time_min": 12}]),
    )
}

fn log_merchant_packaging_feedback(args: &Arguments) -> Observation {
    let feedback = arg(args, "feedback");
    let feedback = if is_truthy(&feedback) {
        feedback
    } else {
        json!("no_feedback")
    };
    Observation::new()
        .with("merchant_id", arg(args, "merchant_id"))
        .with("logged", true)
        .with("feedback", feedback)
}
