//! Report tables

use prettytable::{Cell, Row, Table};

/// Empty table with bold titles
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(
        headers
            .iter()
            .map(|h| Cell::new(h).style_spec("b"))
            .collect(),
    ));
    table
}

/// Two-column property/value table
pub fn create_property_table(rows: &[(&str, String)]) -> Table {
    let mut table = create_table(&["Property", "Value"]);
    for (name, value) in rows {
        table.add_row(Row::new(vec![Cell::new(name), Cell::new(value)]));
    }
    table
}

/// Row-major 3x3 matrix with right-aligned fixed-precision cells
pub fn create_matrix_table(rows: &[[f32; 3]; 3]) -> Table {
    let mut table = create_table(&["Row", "X", "Y", "Z"]);
    for (i, row) in rows.iter().enumerate() {
        let mut cells = vec![Cell::new(&i.to_string())];
        cells.extend(row.iter().map(|v| Cell::new(&format!("{v:.6}")).style_spec("r")));
        table.add_row(Row::new(cells));
    }
    table
}
