//! Output formatting helpers for human-readable and JSON output.

use userd::Role;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Render rows as aligned columns.
///
/// `headers` and each row in `rows` must have the same length.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut lines = vec![render_row(headers.iter().copied(), &widths)];
    lines.extend(
        rows.iter()
            .map(|row| render_row(row.iter().map(String::as_str), &widths)),
    );
    lines.join("\n")
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    padded.join("  ").trim_end().to_string()
}

/// Print roles sorted as given.
pub fn print_roles(roles: &[Role], format: OutputFormat) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Human => {
            if roles.is_empty() {
                println!("No roles");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = roles
                .iter()
                .map(|role| vec![role.name.clone(), role.role_id.clone()])
                .collect();
            println!("{}", format_table(&["NAME", "ROLE ID"], &rows));
        }
        OutputFormat::Json => {
            let value: Vec<serde_json::Value> = roles
                .iter()
                .map(|role| serde_json::json!({ "name": role.name, "role_id": role.role_id }))
                .collect();
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}
