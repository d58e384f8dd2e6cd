// Fixed-width table cells for the selector.

/// Columns narrower than this are centered; wider ones are left-aligned.
pub const CENTER_BELOW: usize = 4;

/// Separator between cells.
pub const CELL_SEP: &str = " | ";

/// One table column: header text, width in characters and a projection from
/// the item to its cell text. `None` renders as an empty cell.
pub struct Column<'a, T> {
    pub header: String,
    pub width: usize,
    project: Box<dyn Fn(&T) -> Option<String> + 'a>,
}

impl<'a, T> Column<'a, T> {
    pub fn new(header: impl Into<String>, width: usize, project: impl Fn(&T) -> Option<String> + 'a) -> Self {
        Self {
            header: header.into(),
            width,
            project: Box::new(project),
        }
    }

    pub fn cell(&self, item: &T) -> String {
        let raw = (self.project)(item).unwrap_or_default();
        fit(&raw, self.width)
    }

    fn header_cell(&self) -> String {
        fit(&self.header, self.width)
    }
}

/// Truncate or pad `text` to exactly `width` characters.
pub fn fit(text: &str, width: usize) -> String {
    let cut: String = text.chars().take(width).collect();
    let len = cut.chars().count();
    let pad = width - len;
    if width < CENTER_BELOW {
        let left = pad / 2;
        format!("{}{}{}", " ".repeat(left), cut, " ".repeat(pad - left))
    } else {
        format!("{}{}", cut, " ".repeat(pad))
    }
}

pub fn header_line<T>(columns: &[Column<'_, T>]) -> String {
    columns
        .iter()
        .map(Column::header_cell)
        .collect::<Vec<_>>()
        .join(CELL_SEP)
}

pub fn row_line<T>(columns: &[Column<'_, T>], item: &T) -> String {
    columns
        .iter()
        .map(|c| c.cell(item))
        .collect::<Vec<_>>()
        .join(CELL_SEP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_columns_pad_left_aligned() {
        assert_eq!(fit("abc", 6), "abc   ");
        assert_eq!(fit("abcdefgh", 6), "abcdef");
    }

    #[test]
    fn narrow_columns_are_centered() {
        assert_eq!(fit("*", 3), " * ");
        assert_eq!(fit("", 3), "   ");
        assert_eq!(fit("ab", 3), "ab ");
    }

    #[test]
    fn missing_values_render_empty() {
        let columns = vec![
            Column::new("Name", 5, |s: &(&str, Option<u32>)| Some(s.0.to_string())),
            Column::new("ID", 4, |s: &(&str, Option<u32>)| s.1.map(|v| v.to_string())),
        ];
        assert_eq!(header_line(&columns), "Name  | ID  ");
        assert_eq!(row_line(&columns, &("Rust", None)), "Rust  |     ");
        assert_eq!(row_line(&columns, &("Compilers", Some(42))), "Compi | 42  ");
    }
}
