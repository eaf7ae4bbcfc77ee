//! Pagination, search and sort parameters shared by list endpoints.
//!
//! Sort columns come from a per-resource whitelist and are the only values
//! ever spliced into SQL text; search terms are always bound.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

/// Raw query string parameters. Numbers are parsed leniently.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Columns a resource may be sorted by.
#[derive(Debug, Clone, Copy)]
pub struct Sortable {
    pub columns: &'static [&'static str],
    pub default: &'static str,
}

impl Sortable {
    fn resolve(&self, requested: Option<&str>) -> &'static str {
        requested
            .map(str::trim)
            .and_then(|col| self.columns.iter().copied().find(|c| *c == col))
            .unwrap_or(self.default)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: usize,
    pub limit: usize,
    pub search: String,
    pub sort_by: &'static str,
    pub order: SortOrder,
}

impl ListParams {
    pub fn from_query(query: &ListQuery, sortable: &Sortable) -> Self {
        let page = query
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<usize>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        let limit = query
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<usize>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);

        let order = match query.order.as_deref().map(str::trim) {
            Some(o) if o.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        };

        Self {
            page,
            limit,
            search: query.search.as_deref().unwrap_or("").trim().to_string(),
            sort_by: sortable.resolve(query.sort_by.as_deref()),
            order,
        }
    }

    /// Rows to skip. Saturates on absurd page numbers.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `LIMIT ?a OFFSET ?b` with placeholders numbered from `first`
    pub fn window_sql(&self, first: usize) -> String {
        format!("LIMIT ?{} OFFSET ?{}", first, first + 1)
    }

    /// Values bound to [`window_sql`](Self::window_sql), clamped to SQLite's integer range
    pub fn window_values(&self) -> [i64; 2] {
        let clamp = |v: usize| i64::try_from(v).unwrap_or(i64::MAX);
        [clamp(self.limit), clamp(self.offset())]
    }

    /// `ORDER BY` body, e.g. `name DESC`. The id tiebreak keeps pages stable.
    pub fn order_by_sql(&self) -> String {
        if self.sort_by == "id" {
            format!("id {}", self.order.as_sql())
        } else {
            format!("{} {}, id ASC", self.sort_by, self.order.as_sql())
        }
    }

    /// Bound value for `LIKE ? ESCAPE '\'`, `None` when not searching.
    pub fn search_pattern(&self) -> Option<String> {
        if self.search.is_empty() {
            return None;
        }
        let escaped = self
            .search
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        Some(format!("%{}%", escaped))
    }

    /// Case-insensitive substring match used by the in-memory store.
    pub fn matches(&self, fields: &[&str]) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        fields.iter().any(|f| f.to_lowercase().contains(&needle))
    }
}

/// `(a LIKE ?n ESCAPE '\' OR b LIKE ?n ESCAPE '\')` over the given columns.
pub fn like_any(columns: &[&str], placeholder: usize) -> String {
    let parts: Vec<String> = columns
        .iter()
        .map(|c| format!("{} LIKE ?{} ESCAPE '\\'", c, placeholder))
        .collect();
    format!("({})", parts.join(" OR "))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMeta {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
    pub sort_by: String,
    pub order: String,
    pub search: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: usize, params: &ListParams) -> Self {
        Self {
            data,
            meta: PageMeta {
                page: params.page,
                limit: params.limit,
                total,
                pages: total.div_ceil(params.limit),
                sort_by: params.sort_by.to_string(),
                order: params.order.as_sql().to_lowercase(),
                search: params.search.clone(),
            },
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SORTABLE: Sortable = Sortable {
        columns: &["id", "name", "cohort_year"],
        default: "id",
    };

    fn query(pairs: &[(&str, &str)]) -> ListQuery {
        let mut q = ListQuery::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "page" => q.page = v,
                "limit" => q.limit = v,
                "search" => q.search = v,
                "sort_by" => q.sort_by = v,
                "order" => q.order = v,
                _ => unreachable!(),
            }
        }
        q
    }

    #[test]
    fn test_defaults() {
        let params = ListParams::from_query(&ListQuery::default(), &SORTABLE);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, DEFAULT_LIMIT);
        assert_eq!(params.offset(), 0);
        assert_eq!(params.sort_by, "id");
        assert_eq!(params.order, SortOrder::Asc);
        assert_eq!(params.search_pattern(), None);
    }

    #[test]
    fn test_unknown_sort_column_falls_back() {
        let params = ListParams::from_query(
            &query(&[("sort_by", "name; DROP TABLE alumni"), ("order", "DESC")]),
            &SORTABLE,
        );
        assert_eq!(params.sort_by, "id");
        assert_eq!(params.order_by_sql(), "id DESC");

        let params = ListParams::from_query(&query(&[("sort_by", "name")]), &SORTABLE);
        assert_eq!(params.order_by_sql(), "name ASC, id ASC");
    }

    #[test]
    fn test_page_and_limit_clamped() {
        let params = ListParams::from_query(
            &query(&[("page", "0"), ("limit", "5000")]),
            &SORTABLE,
        );
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, MAX_LIMIT);

        let params =
            ListParams::from_query(&query(&[("page", "3"), ("limit", "20")]), &SORTABLE);
        assert_eq!(params.offset(), 40);

        let params = ListParams::from_query(&query(&[("page", "abc")]), &SORTABLE);
        assert_eq!(params.page, 1);
    }

    #[test]
    fn test_huge_page_saturates() {
        let page = usize::MAX.to_string();
        let params = ListParams::from_query(
            &query(&[("page", page.as_str()), ("limit", "100")]),
            &SORTABLE,
        );
        assert_eq!(params.page, usize::MAX);
        assert_eq!(params.offset(), usize::MAX);
        assert_eq!(params.window_values(), [100, i64::MAX]);

        let params = ListParams::from_query(
            &query(&[("page", "1000000000000000000"), ("limit", "100")]),
            &SORTABLE,
        );
        assert_eq!(params.window_values(), [100, i64::MAX]);
    }

    #[test]
    fn test_window_sql_placeholders() {
        let params = ListParams::from_query(&query(&[("page", "3"), ("limit", "5")]), &SORTABLE);
        assert_eq!(params.window_sql(1), "LIMIT ?1 OFFSET ?2");
        assert_eq!(params.window_sql(2), "LIMIT ?2 OFFSET ?3");
        assert_eq!(params.window_values(), [5, 10]);
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        let params = ListParams::from_query(&query(&[("search", "  50%_off ")]), &SORTABLE);
        assert_eq!(params.search, "50%_off");
        assert_eq!(params.search_pattern().unwrap(), "%50\\%\\_off%");
        assert!(params.matches(&["Get 50%_OFF today"]));
        assert!(!params.matches(&["nothing here"]));
    }

    #[test]
    fn test_like_any() {
        assert_eq!(
            like_any(&["nim", "name"], 1),
            "(nim LIKE ?1 ESCAPE '\\' OR name LIKE ?1 ESCAPE '\\')"
        );
    }

    #[test]
    fn test_page_count() {
        let params = ListParams::from_query(&query(&[("limit", "10")]), &SORTABLE);
        let page = Paginated::new(vec![1, 2, 3], 21, &params);
        assert_eq!(page.meta.pages, 3);
        assert_eq!(page.meta.order, "asc");

        let empty: Paginated<i32> = Paginated::new(vec![], 0, &params);
        assert_eq!(empty.meta.pages, 0);
    }
}
