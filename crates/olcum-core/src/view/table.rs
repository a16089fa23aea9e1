use super::MatrixView;

const NAME_HEADER: &str = "Chimney";

/// Plain-text rendering of the matrix with per-parameter counters in the
/// header row.
pub fn render_table(view: &MatrixView) -> String {
    let headers: Vec<String> = view
        .headers
        .iter()
        .map(|header| format!("{} ({})", header.parameter, header.count))
        .collect();
    let name_width = view
        .rows
        .iter()
        .map(|row| width(&row.name))
        .chain(std::iter::once(width(NAME_HEADER)))
        .max()
        .unwrap_or_default();

    let mut lines = Vec::with_capacity(view.rows.len() + 2);
    let mut header_line = pad(NAME_HEADER, name_width);
    for header in &headers {
        header_line.push_str(" | ");
        header_line.push_str(header);
    }
    lines.push(header_line.trim_end().to_string());
    lines.push(
        std::iter::once("-".repeat(name_width))
            .chain(headers.iter().map(|header| "-".repeat(width(header))))
            .collect::<Vec<_>>()
            .join("-+-"),
    );

    for row in &view.rows {
        let mut line = pad(&row.name, name_width);
        for (cell, header) in row.cells.iter().zip(&headers) {
            line.push_str(" | ");
            line.push_str(&pad(if cell.checked { "[x]" } else { "[ ]" }, width(header)));
        }
        if !row.extras.is_empty() {
            line.push_str(" | +");
            line.push_str(&row.extras.join(", +"));
        }
        lines.push(line.trim_end().to_string());
    }

    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

fn width(text: &str) -> usize {
    text.chars().count()
}

fn pad(text: &str, target: usize) -> String {
    let mut padded = text.to_string();
    padded.extend(std::iter::repeat_n(' ', target.saturating_sub(width(text))));
    padded
}
