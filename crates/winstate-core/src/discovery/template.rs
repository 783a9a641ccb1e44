//! Manual-include template for unmanaged discoveries

use std::collections::HashSet;

use super::DiscoveryEntry;

/// Render non-owned discoveries as commented JSONC app suggestions.
///
/// Only entries with a suggested id are listed, once per name, in input
/// order. Every suggestion stays commented out so the document parses as a
/// manifest fragment with no apps until an operator promotes entries.
pub fn render_template(entries: &[DiscoveryEntry], platform: &str) -> String {
    let mut out = String::new();
    out.push_str("// Software found on this machine that no package driver manages.\n");
    out.push_str("// Uncomment the entries to keep, then move them into a profile's \"apps\".\n");
    out.push_str("{\n  \"apps\": [\n");

    let mut seen = HashSet::new();
    let mut count = 0;
    for entry in entries {
        if entry.owned_by_driver {
            continue;
        }
        let Some(id) = entry.suggested_driver_id.as_deref() else {
            continue;
        };
        if !seen.insert(entry.name.as_str()) {
            continue;
        }

        if count > 0 {
            out.push('\n');
        }
        out.push_str(&format!("    // {} ({})\n", entry.name, provenance(entry)));
        out.push_str(&format!(
            "    // {{ \"id\": \"{}\", \"refs\": {{ \"{}\": \"{}\" }} }},\n",
            entry.name, platform, id
        ));
        count += 1;
    }

    if count == 0 {
        out.push_str("    // nothing to suggest\n");
    }
    out.push_str("  ]\n}\n");
    out
}

fn provenance(entry: &DiscoveryEntry) -> String {
    let mut parts = vec![format!("via {}", entry.method)];

    let version = entry
        .version
        .as_deref()
        .or(entry.display_version.as_deref())
        .filter(|v| !v.is_empty());
    if let Some(version) = version {
        parts.push(format!("version {}", version));
    }
    if let Some(location) = entry.path.as_deref().or(entry.install_location.as_deref()) {
        parts.push(format!("at {}", location));
    }
    if let Some(display_name) = entry.display_name.as_deref() {
        parts.push(format!("registered as \"{}\"", display_name));
    }
    parts.join(", ")
}
