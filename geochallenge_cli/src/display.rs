use comfy_table::{presets::NOTHING, *};
use geochallenge::CategorySummary;
use serde::Serialize;

/// How a single label was resolved, for display.
#[derive(Debug, Serialize)]
pub struct Resolution {
    pub label: String,
    pub code: Option<String>,
    pub name: Option<String>,
    pub flag: Option<String>,
}

fn bare_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            header
                .into_iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        )
        .set_style(comfy_table::TableComponent::BottomBorder, '─')
        .set_style(comfy_table::TableComponent::MiddleHeaderIntersections, '─')
        .set_style(comfy_table::TableComponent::HeaderLines, '─')
        .set_style(comfy_table::TableComponent::BottomBorderIntersections, '─')
        .set_style(comfy_table::TableComponent::TopBorder, '─')
        .set_style(comfy_table::TableComponent::TopBorderIntersections, '─');
    table
}

pub fn display_summary(summaries: &[CategorySummary]) {
    let mut table = bare_table(vec!["Category", "Description", "Countries", "Source"]);
    for summary in summaries {
        table.add_row(vec![
            summary.category.to_string(),
            summary.category.label().to_string(),
            summary.entries.to_string(),
            summary.provenance.to_string(),
        ]);
    }
    println!("\n{}", table);
}

pub fn display_resolutions(resolutions: &[Resolution]) {
    let mut table = bare_table(vec!["Label", "Code", "Name", "Flag"]);
    for resolution in resolutions {
        table.add_row(vec![
            resolution.label.as_str(),
            resolution.code.as_deref().unwrap_or("unresolved"),
            resolution.name.as_deref().unwrap_or_default(),
            resolution.flag.as_deref().unwrap_or_default(),
        ]);
    }
    println!("\n{}", table);
}
