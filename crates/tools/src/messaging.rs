//! Stakeholder messaging tools.

use synapse_core::action::Arguments;
use synapse_core::observation::Observation;

use crate::simulated::{SimulatedTool, arg};

pub const NOTIFY_CUSTOMER: SimulatedTool = SimulatedTool::new(
    "notify_customer",
    "Send a message to a customer.",
    &["customer_id", "message"],
    notify_customer,
);

pub const NOTIFY_RESOLUTION: SimulatedTool = SimulatedTool::new(
    "notify_resolution",
    "Notify both customer and driver of the resolution of an order dispute.",
    &["order_id", "resolution"],
    notify_resolution,
);

pub const CONTACT_RECIPIENT_VIA_CHAT: SimulatedTool = SimulatedTool::new(
    "contact_recipient_via_chat",
    "Message a delivery recipient over chat and report whether they answered.",
    &["recipient_id", "message"],
    contact_recipient_via_chat,
);

pub const NOTIFY_PASSENGER_AND_DRIVER: SimulatedTool = SimulatedTool::new(
    "notify_passenger_and_driver",
    "Send the same message to a passenger and their driver.",
    &["passenger_id", "driver_id", "message"],
    notify_passenger_and_driver,
);

fn notify_customer(args: &Arguments) -> Observation {
    Observation::new()
        .with("customer_id", arg(args, "customer_id"))
        .with("notified", true)
        .with("message", arg(args, "message"))
}

fn notify_resolution(args: &Arguments) -> Observation {
    Observation::new()
        .with("order_id", arg(args, "order_id"))
        .with("notified", true)
        .with("resolution", arg(args, "resolution"))
}

// The simulated recipient never answers.
fn contact_recipient_via_chat(args: &Arguments) -> Observation {
    Observation::new()
        .with("recipient_id", arg(args, "recipient_id"))
        .with("message_sent", true)
        .with("recipient_response", "no_response")
}

fn notify_passenger_and_driver(args: &Arguments) -> Observation {
    Observation::new()
        .with("passenger_id", arg(args, "passenger_id"))
        .with("driver_id", arg(args, "driver_id"))
        .with("passenger_notified", true)
        .with("driver_notified", true)
        .with("message", arg(args, "message"))
}
