//! Simulated tool catalog for Synapse.
//!
//! Tools give the agent the ability to act on a delivery scenario:
//! check traffic, talk to merchants, message customers and recipients,
//! settle disputes. Every tool here is simulated and deterministic, so
//! scenarios can be exercised end-to-end without real backends.

pub mod disputes;
pub mod logistics;
pub mod merchant;
pub mod messaging;
pub mod simulated;

use synapse_core::tool::ToolRegistry;

pub use simulated::SimulatedTool;

/// Every catalog entry, in the order it is advertised to the model.
pub const CATALOG: [SimulatedTool; 18] = [
    logistics::CHECK_TRAFFIC,
    merchant::GET_MERCHANT_STATUS,
    merchant::GET_NEARBY_MERCHANTS,
    messaging::NOTIFY_CUSTOMER,
    logistics::RE_ROUTE_DRIVER,
    disputes::COLLECT_EVIDENCE,
    disputes::ANALYZE_EVIDENCE,
    disputes::ISSUE_INSTANT_REFUND,
    disputes::EXONERATE_DRIVER,
    logistics::FIND_NEARBY_LOCKER,
    logistics::CHECK_FLIGHT_STATUS,
    disputes::INITIATE_MEDIATION_FLOW,
    merchant::LOG_MERCHANT_PACKAGING_FEEDBACK,
    messaging::NOTIFY_RESOLUTION,
    messaging::CONTACT_RECIPIENT_VIA_CHAT,
    logistics::SUGGEST_SAFE_DROP_OFF,
    logistics::CALCULATE_ALTERNATIVE_ROUTE,
    messaging::NOTIFY_PASSENGER_AND_DRIVER,
];

/// Create a registry holding the full simulated catalog.
pub fn catalog_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for tool in CATALOG {
        // Catalog names are distinct; a clash is a programming error caught by tests.
        if let Err(e) = registry.register(Box::new(tool)) {
            tracing::error!(error = %e, "Skipping catalog entry");
        }
    }
    registry
}
