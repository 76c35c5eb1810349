//! `safegen catalog` and `safegen domain` commands.

use std::io::Write;

use anyhow::Result;

use safegen_core::catalog::Catalog;
use safegen_core::constraint::TemplateKind;

/// Print the catalog in use.
pub fn run_catalog(catalog: &Catalog) -> Result<()> {
    let mut writer = std::io::stdout().lock();
    write_catalog(&mut writer, catalog)
}

/// Print the domain text handed to the planner.
pub fn run_domain(domain: &str) {
    print!("{domain}");
    if !domain.ends_with('\n') {
        println!();
    }
}

fn write_catalog(writer: &mut dyn Write, catalog: &Catalog) -> Result<()> {
    writeln!(writer, "Locations ({}):", catalog.all_locations().len())?;
    writeln!(writer, "  {:<24} {}", "NAME", "SIDE")?;
    for loc in catalog.all_locations() {
        let side = if loc.is_inside { "inside" } else { "outside" };
        writeln!(writer, "  {:<24} {side}", loc.name)?;
    }
    writeln!(writer)?;

    writeln!(writer, "Items ({}):", catalog.all_items().len())?;
    writeln!(writer, "  {:<24} {:<28} {}", "NAME", "PROPERTIES", "TEMPLATES")?;
    for item in catalog.all_items() {
        let props: Vec<String> = item.properties.iter().map(ToString::to_string).collect();
        let kinds: Vec<String> = TemplateKind::ALL
            .iter()
            .filter(|k| item.has_property(k.subject()))
            .map(ToString::to_string)
            .collect();
        writeln!(
            writer,
            "  {:<24} {:<28} {}",
            item.name,
            or_dash(&props),
            or_dash(&kinds)
        )?;
    }

    Ok(())
}

fn or_dash(parts: &[String]) -> String {
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(",")
    }
}
