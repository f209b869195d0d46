use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("tr selector is valid"));

static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td, th").expect("cell selector is valid"));

pub(crate) struct TableCellText {
    /// Rendered text with whitespace collapsed, the way a browser displays it.
    pub text: String,
    /// Raw inner markup, uncollapsed.
    pub inner_html: String,
    /// True for `<th>` cells.
    pub header: bool,
}

/// Immutable snapshot of the rows and cells of a table element's markup.
/// Markup without any `<tr>` parses to an empty snapshot rather than failing.
pub(crate) struct TableSnapshot {
    pub rows: Vec<Vec<TableCellText>>,
}

impl TableSnapshot {
    pub fn parse(source: &str) -> Self {
        let fragment = Html::parse_fragment(source);
        let rows = fragment
            .select(&ROW_SELECTOR)
            .map(|row| {
                row.select(&CELL_SELECTOR)
                    .map(|cell| TableCellText {
                        text: visible_text(&cell),
                        inner_html: cell.inner_html(),
                        header: cell.value().name() == "th",
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Widest row; zero for a snapshot with no rows.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

fn visible_text(cell: &ElementRef) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
