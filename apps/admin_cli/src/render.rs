use admin_core::{tree::TreeRow, view::UsersView};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

pub fn users_table(view: &UsersView) -> String {
    if view.is_empty() {
        return "No users found.".to_string();
    }
    let mut table = styled_table(["ID", "Name", "Email", "Role", "Words", "Joined"]);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for row in &view.rows {
        table.add_row(vec![
            Cell::new(row.id),
            Cell::new(&row.name),
            Cell::new(&row.email),
            role_cell(row.role),
            Cell::new(&row.usage),
            match &row.joined {
                Some(joined) => Cell::new(joined),
                None => dim_cell("-"),
            },
        ]);
    }

    let mut out = table.to_string();
    if view.show_pagination {
        let pagination = &view.pagination;
        out.push_str(&format!(
            "\n{}  (page {} of {})",
            pagination.range_label(),
            pagination.current_page(),
            pagination.total_pages()
        ));
    }
    out
}

pub fn category_tree(rows: &[TreeRow]) -> String {
    if rows.is_empty() {
        return "No categories found.".to_string();
    }
    let mut table = styled_table(["ID", "Category", "Alias", "Type"]);
    align_column(&mut table, 0, CellAlignment::Right);
    for row in rows {
        table.add_row(vec![
            Cell::new(row.id),
            Cell::new(tree_label(row)),
            Cell::new(&row.alias),
            dim_cell(row.kind.as_str()),
        ]);
    }
    table.to_string()
}

fn tree_label(row: &TreeRow) -> String {
    let marker = match (row.has_children, row.expanded) {
        (false, _) => ' ',
        (true, false) => '+',
        (true, true) => '-',
    };
    format!("{}{marker} {}", "  ".repeat(row.depth), row.title)
}

fn styled_table<const N: usize>(headers: [&str; N]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.into_iter().map(header_cell));
    table
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn role_cell(role: &str) -> Cell {
    match role {
        "admin" => Cell::new(role).fg(Color::Yellow),
        _ => Cell::new(role),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::{CategoryId, CategoryType};

    fn row(id: i64, title: &str, depth: usize, has_children: bool, expanded: bool) -> TreeRow {
        TreeRow {
            id: CategoryId(id),
            title: title.to_string(),
            alias: title.to_ascii_lowercase(),
            kind: CategoryType::Blueprint,
            depth,
            has_children,
            expanded,
        }
    }

    #[test]
    fn tree_labels_indent_by_depth_and_mark_expansion() {
        assert_eq!(tree_label(&row(1, "Web", 0, true, true)), "- Web");
        assert_eq!(tree_label(&row(2, "Landing", 1, false, false)), "    Landing");
        assert_eq!(tree_label(&row(3, "Mobile", 0, true, false)), "+ Mobile");
    }

    #[test]
    fn empty_tree_has_a_message() {
        assert_eq!(category_tree(&[]), "No categories found.");
    }
}
