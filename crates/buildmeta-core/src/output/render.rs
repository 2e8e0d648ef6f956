use crate::output::summary::Summary;

pub fn render_text(summary: &Summary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", summary.tool.name, summary.tool.version));
    for section in &summary.sections {
        out.push_str(&format!("{}:\n", section.title));
        for entry in &section.entries {
            if entry.items.is_empty() {
                out.push_str(&format!("  {}: {}\n", entry.display_name(), entry.value));
                continue;
            }
            out.push_str(&format!("  {}:\n", entry.display_name()));
            for (i, item) in entry.items.iter().enumerate() {
                out.push_str(&format!("    {}. {}\n", i + 1, item));
            }
        }
    }
    out
}

pub fn render_json(summary: &Summary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}
