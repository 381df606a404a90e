//! Sorted, paginated views over a dataset that is replaced on every poll.
//!
//! Sort and page settings are owned by the caller and survive replacements of
//! the rows; [`view`] is simply re-applied to each new dataset.

use std::cmp::Ordering;
use std::net::IpAddr;

use routerwatch_types::SessionUser;

use super::duration::parse_uptime;

/// Sort direction of the active column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// How a column's cells are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Numeric,
    /// Connected-like values always come first; direction orders the rest.
    Status,
}

/// An enumerated, sortable column of some row type.
pub trait TableColumn: Copy + PartialEq {
    fn kind(&self) -> ColumnKind;
    fn title(&self) -> &'static str;
}

/// A single comparable cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Text(&'a str),
    Number(f64),
    /// Compared numerically, so `10.0.0.2` sorts before `10.0.0.10`.
    Address(IpAddr),
}

impl CellValue<'_> {
    fn rank(&self) -> u8 {
        match self {
            CellValue::Number(_) => 0,
            CellValue::Address(_) => 1,
            CellValue::Text(_) => 2,
        }
    }
}

/// A row exposing its cells for an enumerated set of columns.
pub trait TableRow {
    type Column: TableColumn;

    /// `None` when the row has no value for this column.
    fn cell(&self, column: Self::Column) -> Option<CellValue<'_>>;
}

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<C> {
    pub column: C,
    pub direction: SortDirection,
}

impl<C: TableColumn> SortSpec<C> {
    pub fn new(column: C) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }

    /// Select a column: the active one flips direction, a new one becomes
    /// active ascending.
    pub fn toggle(&mut self, column: C) {
        if self.column == column {
            self.direction = self.direction.flip();
        } else {
            self.column = column;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Page size and 1-based page index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    page_size: usize,
    page_index: usize,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PageSpec {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            page_index: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Change the page size; always goes back to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page_index = 1;
    }

    /// Jump to a page, clamped into `[1, total_pages(total_count)]`.
    pub fn set_page(&mut self, page_index: usize, total_count: usize) {
        self.page_index = page_index;
        self.clamp(total_count);
    }

    pub fn next(&mut self, total_count: usize) {
        self.set_page(self.page_index + 1, total_count);
    }

    pub fn prev(&mut self) {
        self.page_index = self.page_index.saturating_sub(1).max(1);
    }

    /// Pull the index back into range after the dataset size changed.
    ///
    /// Returns true if the index moved.
    pub fn clamp(&mut self, total_count: usize) -> bool {
        let clamped = self
            .page_index
            .clamp(1, total_pages(total_count, self.page_size));
        let moved = clamped != self.page_index;
        self.page_index = clamped;
        moved
    }
}

/// Number of pages, at least one even for an empty dataset.
pub fn total_pages(total_count: usize, page_size: usize) -> usize {
    total_count.div_ceil(page_size.max(1)).max(1)
}

/// One page of sorted rows.
#[derive(Debug)]
pub struct TableView<'a, R> {
    pub page_rows: Vec<&'a R>,
    pub total_count: usize,
    pub total_pages: usize,
    pub page_index: usize,
}

/// Sort `rows` and cut out the current page.
///
/// Clamps `page` first if the dataset shrank below the current page.
pub fn view<'a, R: TableRow>(
    rows: &'a [R],
    sort: &SortSpec<R::Column>,
    page: &mut PageSpec,
) -> TableView<'a, R> {
    let sorted = sort_rows(rows, sort);
    let total_count = sorted.len();
    page.clamp(total_count);

    let start = (page.page_index - 1) * page.page_size;
    let page_rows = sorted
        .into_iter()
        .skip(start)
        .take(page.page_size)
        .collect();

    TableView {
        page_rows,
        total_count,
        total_pages: total_pages(total_count, page.page_size),
        page_index: page.page_index,
    }
}

/// Stable sort of borrowed rows by the active column.
pub fn sort_rows<'a, R: TableRow>(rows: &'a [R], sort: &SortSpec<R::Column>) -> Vec<&'a R> {
    let mut sorted: Vec<&R> = rows.iter().collect();
    let column = sort.column;

    sorted.sort_by(|a, b| {
        let (left, right) = (a.cell(column), b.cell(column));

        if column.kind() == ColumnKind::Status {
            let group = is_connected(right).cmp(&is_connected(left));
            if group != Ordering::Equal {
                return group;
            }
        }

        let ordering = compare_cells(left, right);
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });

    sorted
}

fn is_connected(cell: Option<CellValue<'_>>) -> bool {
    matches!(cell, Some(CellValue::Text(s)) if s.trim().eq_ignore_ascii_case("connected"))
}

/// Missing cells are the lowest value; numbers sort before addresses, and
/// addresses before text.
fn compare_cells(left: Option<CellValue<'_>>, right: Option<CellValue<'_>>) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(CellValue::Number(a)), Some(CellValue::Number(b))) => a.total_cmp(&b),
        (Some(CellValue::Address(a)), Some(CellValue::Address(b))) => a.cmp(&b),
        (Some(CellValue::Text(a)), Some(CellValue::Text(b))) => a
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(b.chars().flat_map(char::to_lowercase)),
        (Some(a), Some(b)) => a.rank().cmp(&b.rank()),
    }
}

/// Sortable columns of the session table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionColumn {
    Username,
    Address,
    Status,
    Uptime,
    Profile,
}

impl SessionColumn {
    pub const ALL: [SessionColumn; 5] = [
        SessionColumn::Username,
        SessionColumn::Address,
        SessionColumn::Status,
        SessionColumn::Uptime,
        SessionColumn::Profile,
    ];

    /// The column after this one, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl TableColumn for SessionColumn {
    fn kind(&self) -> ColumnKind {
        match self {
            SessionColumn::Status => ColumnKind::Status,
            SessionColumn::Uptime => ColumnKind::Numeric,
            _ => ColumnKind::Text,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            SessionColumn::Username => "User",
            SessionColumn::Address => "IP Address",
            SessionColumn::Status => "Status",
            SessionColumn::Uptime => "Uptime",
            SessionColumn::Profile => "Profile",
        }
    }
}

impl TableRow for SessionUser {
    type Column = SessionColumn;

    fn cell(&self, column: SessionColumn) -> Option<CellValue<'_>> {
        fn text(s: &str) -> Option<&str> {
            let s = s.trim();
            (!s.is_empty()).then_some(s)
        }

        match column {
            SessionColumn::Username => text(&self.username).map(CellValue::Text),
            SessionColumn::Address => self.ip.as_deref().and_then(text).map(|ip| {
                // Unparsable addresses fall back to text and sort after real ones
                ip.parse::<IpAddr>()
                    .map_or(CellValue::Text(ip), CellValue::Address)
            }),
            SessionColumn::Status => text(&self.status).map(CellValue::Text),
            SessionColumn::Uptime => self
                .uptime
                .as_deref()
                .and_then(parse_uptime)
                .map(|d| CellValue::Number(d.as_secs_f64())),
            SessionColumn::Profile => self.profile.as_deref().and_then(text).map(CellValue::Text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, status: &str) -> SessionUser {
        SessionUser {
            username: name.to_string(),
            status: status.to_string(),
            ..Default::default()
        }
    }

    fn numbered(count: usize) -> Vec<SessionUser> {
        (0..count).map(|i| user(&format!("user{i:02}"), "offline")).collect()
    }

    fn names<'a>(rows: &[&'a SessionUser]) -> Vec<&'a str> {
        rows.iter().map(|u| u.username.as_str()).collect()
    }

    #[test]
    fn pages_over_23_rows() {
        let rows = numbered(23);
        let sort = SortSpec::new(SessionColumn::Username);
        let mut page = PageSpec::new(10);

        let first = view(&rows, &sort, &mut page);
        assert_eq!(first.total_count, 23);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.page_rows.len(), 10);

        page.set_page(3, rows.len());
        let last = view(&rows, &sort, &mut page);
        assert_eq!(last.page_rows.len(), 3);
        assert_eq!(names(&last.page_rows), vec!["user20", "user21", "user22"]);
    }

    #[test]
    fn shrinking_dataset_clamps_page() {
        let rows = numbered(23);
        let sort = SortSpec::new(SessionColumn::Username);
        let mut page = PageSpec::new(10);
        page.set_page(3, rows.len());

        let fewer = numbered(5);
        let shrunk = view(&fewer, &sort, &mut page);
        assert_eq!(page.page_index(), 1);
        assert_eq!(shrunk.page_index, 1);
        assert_eq!(shrunk.total_pages, 1);
        assert_eq!(shrunk.page_rows.len(), 5);
    }

    #[test]
    fn empty_dataset_has_one_page() {
        let rows: Vec<SessionUser> = Vec::new();
        let mut page = PageSpec::new(10);
        let empty = view(&rows, &SortSpec::new(SessionColumn::Username), &mut page);

        assert_eq!(empty.total_pages, 1);
        assert_eq!(empty.page_index, 1);
        assert!(empty.page_rows.is_empty());
    }

    #[test]
    fn page_size_change_resets_index() {
        let mut page = PageSpec::new(10);
        page.set_page(2, 30);
        page.set_page_size(5);
        assert_eq!(page.page_index(), 1);
        assert_eq!(page.page_size(), 5);

        page.set_page_size(0);
        assert_eq!(page.page_size(), 1);
    }

    #[test]
    fn next_and_prev_stay_in_bounds() {
        let mut page = PageSpec::new(10);
        page.prev();
        assert_eq!(page.page_index(), 1);

        page.next(15);
        page.next(15);
        assert_eq!(page.page_index(), 2);
    }

    #[test]
    fn toggle_flips_active_and_resets_new_column() {
        let mut sort = SortSpec::new(SessionColumn::Username);
        sort.toggle(SessionColumn::Username);
        assert_eq!(sort.direction, SortDirection::Descending);

        sort.toggle(SessionColumn::Address);
        assert_eq!(sort.column, SessionColumn::Address);
        assert_eq!(sort.direction, SortDirection::Ascending);
    }

    #[test]
    fn connected_sorts_first_in_both_directions() {
        let rows = vec![
            user("a", "offline"),
            user("b", "Connected"),
            user("c", "isolated"),
            user("d", "connected"),
        ];
        let mut sort = SortSpec::new(SessionColumn::Status);

        let asc = sort_rows(&rows, &sort);
        assert_eq!(names(&asc), vec!["b", "d", "c", "a"]);

        sort.toggle(SessionColumn::Status);
        let desc = sort_rows(&rows, &sort);
        assert_eq!(&names(&desc)[..2], &["b", "d"]);
        assert_eq!(&names(&desc)[2..], &["a", "c"]);
    }

    #[test]
    fn sort_is_stable_and_missing_values_are_lowest() {
        let mut rows = vec![user("x", "offline"), user("y", "offline"), user("z", "offline")];
        rows[0].ip = Some("10.0.0.2".to_string());
        rows[2].ip = Some("10.0.0.1".to_string());

        let sorted = sort_rows(&rows, &SortSpec::new(SessionColumn::Address));
        assert_eq!(names(&sorted), vec!["y", "z", "x"]);

        // Equal keys keep their input order.
        let by_profile = sort_rows(&rows, &SortSpec::new(SessionColumn::Profile));
        assert_eq!(names(&by_profile), vec!["x", "y", "z"]);
    }

    #[test]
    fn addresses_sort_numerically_with_text_fallback() {
        let mut rows = vec![
            user("ten", "connected"),
            user("junk", "connected"),
            user("two", "connected"),
            user("v6", "connected"),
        ];
        rows[0].ip = Some("10.0.0.10".to_string());
        rows[1].ip = Some("pending".to_string());
        rows[2].ip = Some(" 10.0.0.2 ".to_string());
        rows[3].ip = Some("fd00::1".to_string());

        let sorted = sort_rows(&rows, &SortSpec::new(SessionColumn::Address));
        assert_eq!(names(&sorted), vec!["two", "ten", "v6", "junk"]);
    }

    #[test]
    fn cell_trims_and_skips_blank_text() {
        let mut row = user("  alice ", " ");
        row.profile = Some(String::new());

        assert_eq!(row.cell(SessionColumn::Username), Some(CellValue::Text("alice")));
        assert_eq!(row.cell(SessionColumn::Status), None);
        assert_eq!(row.cell(SessionColumn::Profile), None);
    }

    #[test]
    fn uptime_sorts_numerically() {
        let mut rows = vec![user("short", "connected"), user("long", "connected")];
        rows[0].uptime = Some("9m".to_string());
        rows[1].uptime = Some("1d2h".to_string());

        let sorted = sort_rows(&rows, &SortSpec::new(SessionColumn::Uptime));
        assert_eq!(names(&sorted), vec!["short", "long"]);
    }

    #[test]
    fn text_comparison_ignores_case() {
        let rows = vec![user("bob", "offline"), user("Alice", "offline")];
        let sorted = sort_rows(&rows, &SortSpec::new(SessionColumn::Username));
        assert_eq!(names(&sorted), vec!["Alice", "bob"]);
    }
}
