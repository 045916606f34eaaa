//! Dispute resolution tools: evidence, refunds, driver exoneration, mediation.

use serde_json::json;
use synapse_core::action::Arguments;
use synapse_core::observation::Observation;

use crate::simulated::{SimulatedTool, arg, arg_or, display};

pub const COLLECT_EVIDENCE: SimulatedTool = SimulatedTool::new(
    "collect_evidence",
    "Collect photo evidence from driver and customer for an order.",
    &["order_id"],
    collect_evidence,
);

pub const ANALYZE_EVIDENCE: SimulatedTool = SimulatedTool::new(
    "analyze_evidence",
    "Analyze collected evidence and report the likely cause with a confidence score.",
    &["evidence"],
    analyze_evidence,
);

pub const ISSUE_INSTANT_REFUND: SimulatedTool = SimulatedTool::new(
    "issue_instant_refund",
    "Issue an immediate refund for an order. amount defaults to 0.",
    &["order_id", "amount"],
    issue_instant_refund,
);

pub const EXONERATE_DRIVER: SimulatedTool = SimulatedTool::new(
    "exonerate_driver",
    "Clear a driver of fault for an incident.",
    &["driver_id"],
    exonerate_driver,
);

pub const INITIATE_MEDIATION_FLOW: SimulatedTool = SimulatedTool::new(
    "initiate_mediation_flow",
    "Open a mediation session between the parties of an order dispute.",
    &["order_id"],
    initiate_mediation_flow,
);

fn collect_evidence(args: &Arguments) -> Observation {
    Observation::new()
        .with("order_id", arg(args, "order_id"))
        .with("evidence", json!(["photo_driver.jpg", "photo_customer.jpg"]))
        .with("notes", "images_collected")
}

fn analyze_evidence(_args: &Arguments) -> Observation {
    Observation::new()
        .with("likely_cause", "merchant")
        .with("confidence", 0.85)
}

fn issue_instant_refund(args: &Arguments) -> Observation {
    Observation::new()
        .with("order_id", arg(args, "order_id"))
        .with("refund_issued", true)
        .with("amount", arg_or(args, "amount", json!(0)))
}

fn exonerate_driver(args: &Arguments) -> Observation {
    Observation::new()
        .with("driver_id", arg(args, "driver_id"))
        .with("exonerated", true)
}

fn initiate_mediation_flow(args: &Arguments) -> Observation {
    let order_id = arg(args, "order_id");
    let session = format!("med_{}", display(&order_id));
    Observation::new()
        .with("order_id", order_id)
        .with("mediation_session", session)
        .with("status", "started")
}
