//! `synapse tools` — List the tool catalog.

use synapse_core::tool::ToolRegistry;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let registry = synapse_tools::catalog_registry();

    println!("🧰 Synapse Tool Catalog ({} tools)", registry.len());
    println!("==================================");
    println!();
    print!("{}", render_catalog(&registry));
    println!();
    println!("  All tools are simulated and side-effect free.");

    Ok(())
}

/// One line per tool: signature, then description.
pub fn render_catalog(registry: &ToolRegistry) -> String {
    let definitions = registry.definitions();
    let signatures = registry.signatures();
    let width = signatures.iter().map(String::len).max().unwrap_or(0);

    let mut out = String::new();
    for (signature, definition) in signatures.iter().zip(&definitions) {
        out.push_str(&format!("  {signature:<width$}  {}\n", definition.description));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_every_tool_in_order() {
        let registry = synapse_tools::catalog_registry();
        let text = render_catalog(&registry);
        assert_eq!(text.lines().count(), 18);
        assert!(text.lines().next().unwrap().trim_start().starts_with("check_traffic(origin, destination)"));
        assert!(text.contains("issue_instant_refund(order_id, amount)"));
    }

    #[test]
    fn empty_registry_renders_nothing() {
        assert_eq!(render_catalog(&ToolRegistry::new()), "");
    }
}
