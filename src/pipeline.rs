use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::company::{Company, Field};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Everything the user can change about the listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryState {
    pub search_text: String,
    pub debounced_search_text: String,
    pub location_filter: Option<String>,
    pub industry_filter: Option<String>,
    pub sort_key: Field,
    pub sort_direction: SortDirection,
    pub current_page: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            debounced_search_text: String::new(),
            location_filter: None,
            industry_filter: None,
            sort_key: Field::Name,
            sort_direction: SortDirection::Ascending,
            current_page: 1,
        }
    }
}

impl QueryState {
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        self.current_page = 1;
    }

    pub fn set_location_filter(&mut self, location: Option<String>) {
        self.location_filter = location;
        self.current_page = 1;
    }

    pub fn set_industry_filter(&mut self, industry: Option<String>) {
        self.industry_filter = industry;
        self.current_page = 1;
    }

    /// Same column flips the direction, a new column starts ascending.
    pub fn toggle_sort(&mut self, key: Field) {
        if self.sort_key == key {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_key = key;
            self.sort_direction = SortDirection::Ascending;
        }
        trace!("Sort by {:?} {:?}", self.sort_key, self.sort_direction);
    }
}

pub struct PipelineOutput<'a> {
    pub rows: Vec<&'a Company>,
    pub matched: usize,
    pub total_pages: usize,
}

pub fn text_filter<'a>(records: &[&'a Company], term: &str) -> Vec<&'a Company> {
    if term.is_empty() {
        return records.to_vec();
    }
    let needle = term.to_lowercase();
    records
        .iter()
        .copied()
        .filter(|c| c.search_haystack().contains(&needle))
        .collect()
}

pub fn location_filter<'a>(records: Vec<&'a Company>, location: Option<&str>) -> Vec<&'a Company> {
    match location {
        Some(loc) => records.into_iter().filter(|c| c.location == loc).collect(),
        None => records,
    }
}

pub fn industry_filter<'a>(records: Vec<&'a Company>, industry: Option<&str>) -> Vec<&'a Company> {
    match industry {
        Some(ind) => records.into_iter().filter(|c| c.industry == ind).collect(),
        None => records,
    }
}

/// Stable sort. Descending reverses the comparator, so equal values keep
/// their filtered order in both directions.
pub fn sort_records(records: &mut [&Company], key: Field, direction: SortDirection) {
    records.sort_by(|a, b| {
        let ordering = a.get(key).compare(&b.get(key));
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size)
}

/// Slice of the 1-based `page`. Pages outside the result are empty.
pub fn paginate<'a, T>(items: &'a [T], page: usize, page_size: usize) -> &'a [T] {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if page == 0 || start >= items.len() {
        return &[];
    }
    let end = std::cmp::min(start + page_size, items.len());
    &items[start..end]
}

/// Distinct values of a field over all records, in order of first appearance.
pub fn distinct_values(records: &[Company], field: Field) -> Vec<String> {
    let values: IndexSet<String> = records
        .iter()
        .map(|c| c.get(field).to_string())
        .collect();
    values.into_iter().collect()
}

pub fn matching<'a>(records: &'a [Company], query: &QueryState) -> Vec<&'a Company> {
    let all: Vec<&Company> = records.iter().collect();
    let by_text = text_filter(&all, &query.debounced_search_text);
    let by_location = location_filter(by_text, query.location_filter.as_deref());
    let mut filtered = industry_filter(by_location, query.industry_filter.as_deref());
    sort_records(&mut filtered, query.sort_key, query.sort_direction);
    filtered
}

pub fn run<'a>(records: &'a [Company], query: &QueryState, page_size: usize) -> PipelineOutput<'a> {
    let sorted = matching(records, query);
    let rows = paginate(&sorted, query.current_page, page_size).to_vec();
    trace!(
        "Pipeline: {} of {} records match, page {} shows {}",
        sorted.len(),
        records.len(),
        query.current_page,
        rows.len()
    );
    PipelineOutput {
        matched: sorted.len(),
        total_pages: total_pages(sorted.len(), page_size),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::company::tests::company;
    use crate::domain::PAGE_SIZE;

    fn acme_beta() -> Vec<Company> {
        vec![
            company(1, "Acme", "Tech", "NY", 50),
            company(2, "Beta", "Finance", "NY", 10),
        ]
    }

    fn numbered(n: usize) -> Vec<Company> {
        (1..=n)
            .map(|i| company(i as u64, &format!("Company {i:02}"), "Tech", "Berlin", i as u64))
            .collect()
    }

    fn names(rows: &[&Company]) -> Vec<String> {
        rows.iter().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn default_state_sorts_by_name() {
        let records = vec![
            company(2, "Beta", "Finance", "NY", 10),
            company(1, "Acme", "Tech", "NY", 50),
        ];
        let out = run(&records, &QueryState::default(), PAGE_SIZE);
        assert_eq!(names(&out.rows), vec!["Acme", "Beta"]);
        assert_eq!(out.total_pages, 1);
    }

    #[test]
    fn location_then_industry_filter() {
        let records = acme_beta();
        let mut query = QueryState::default();
        query.set_location_filter(Some("NY".into()));
        assert_eq!(run(&records, &query, PAGE_SIZE).matched, 2);

        query.set_industry_filter(Some("Finance".into()));
        let out = run(&records, &query, PAGE_SIZE);
        assert_eq!(names(&out.rows), vec!["Beta"]);
        assert_eq!(out.total_pages, 1);
    }

    #[test]
    fn categorical_filters_are_case_sensitive() {
        let records = acme_beta();
        let mut query = QueryState::default();
        query.set_location_filter(Some("ny".into()));
        assert_eq!(run(&records, &query, PAGE_SIZE).matched, 0);
    }

    #[test]
    fn text_filter_matches_any_searchable_field() {
        let records = acme_beta();
        let all: Vec<&Company> = records.iter().collect();
        assert_eq!(names(&text_filter(&all, "FIN")), vec!["Beta"]);
        assert_eq!(names(&text_filter(&all, "ny")).len(), 2);
        assert_eq!(names(&text_filter(&all, "tech ny")), vec!["Acme"]);
        assert!(text_filter(&all, "b.com").is_empty());
    }

    #[test]
    fn text_filter_is_a_subset_and_empty_term_is_identity() {
        let records = numbered(25);
        let all: Vec<&Company> = records.iter().collect();
        assert_eq!(text_filter(&all, ""), all);
        for term in ["company 1", "2", "ber", "zzz"] {
            let found = text_filter(&all, term);
            assert!(found.iter().all(|c| all.contains(c)));
            assert!(found.iter().all(|c| c.search_haystack().contains(term)));
        }
    }

    #[test]
    fn sort_is_permutation_and_idempotent() {
        let records = vec![
            company(1, "delta", "B", "X", 3),
            company(2, "Alpha", "A", "Y", 3),
            company(3, "charlie", "B", "X", 1),
            company(4, "Bravo", "A", "Z", 2),
        ];
        for key in [Field::Name, Field::Industry, Field::Location, Field::Employees] {
            for dir in [SortDirection::Ascending, SortDirection::Descending] {
                let mut once: Vec<&Company> = records.iter().collect();
                sort_records(&mut once, key, dir);
                let mut twice = once.clone();
                sort_records(&mut twice, key, dir);
                assert_eq!(once, twice);

                let mut ids: Vec<_> = once.iter().map(|c| c.id.clone()).collect();
                ids.sort();
                let mut expected: Vec<_> = records.iter().map(|c| c.id.clone()).collect();
                expected.sort();
                assert_eq!(ids, expected);
            }
        }
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let records = vec![
            company(1, "First", "Tech", "X", 5),
            company(2, "Second", "Tech", "X", 5),
            company(3, "Third", "Tech", "X", 1),
        ];
        let mut rows: Vec<&Company> = records.iter().collect();
        sort_records(&mut rows, Field::Employees, SortDirection::Ascending);
        assert_eq!(names(&rows), vec!["Third", "First", "Second"]);
        sort_records(&mut rows, Field::Employees, SortDirection::Descending);
        assert_eq!(names(&rows), vec!["First", "Second", "Third"]);
    }

    #[test]
    fn employees_sort_is_numeric() {
        let records = vec![
            company(1, "A", "T", "X", 100),
            company(2, "B", "T", "X", 9),
            company(3, "C", "T", "X", 20),
        ];
        let mut rows: Vec<&Company> = records.iter().collect();
        sort_records(&mut rows, Field::Employees, SortDirection::Ascending);
        assert_eq!(names(&rows), vec!["B", "C", "A"]);
    }

    #[test]
    fn twenty_five_records_make_three_pages() {
        let records = numbered(25);
        let mut query = QueryState::default();
        let out = run(&records, &query, PAGE_SIZE);
        assert_eq!(out.total_pages, 3);
        assert_eq!(out.rows.len(), 10);
        assert_eq!(out.rows[0].name, "Company 01");
        assert_eq!(out.rows[9].name, "Company 10");

        query.current_page = 3;
        let out = run(&records, &query, PAGE_SIZE);
        assert_eq!(names(&out.rows), (21..=25).map(|i| format!("Company {i}")).collect::<Vec<_>>());
    }

    #[test]
    fn pages_have_expected_length_and_do_not_overlap() {
        for n in [0usize, 1, 9, 10, 11, 25, 30] {
            let items: Vec<usize> = (0..n).collect();
            let pages = total_pages(n, PAGE_SIZE);
            assert_eq!(pages, n.div_ceil(10));
            let mut seen = Vec::new();
            for page in 1..=pages {
                let slice = paginate(&items, page, PAGE_SIZE);
                assert_eq!(slice.len(), std::cmp::min(10, n - (page - 1) * 10));
                assert!(slice.iter().all(|i| !seen.contains(i)));
                seen.extend_from_slice(slice);
            }
            assert_eq!(seen, items);
        }
    }

    #[test]
    fn out_of_range_page_is_empty_not_corrected() {
        let items: Vec<usize> = (0..5).collect();
        assert!(paginate(&items, 2, PAGE_SIZE).is_empty());
        assert!(paginate(&items, 0, PAGE_SIZE).is_empty());
    }

    #[test]
    fn no_matches_gives_zero_pages() {
        let records = acme_beta();
        let query = QueryState {
            debounced_search_text: "nothing like this".into(),
            ..QueryState::default()
        };
        let out = run(&records, &query, PAGE_SIZE);
        assert_eq!(out.total_pages, 0);
        assert!(out.rows.is_empty());
    }

    #[test]
    fn options_come_from_all_records_in_first_seen_order() {
        let records = vec![
            company(1, "A", "Tech", "NY", 1),
            company(2, "B", "Finance", "Berlin", 1),
            company(3, "C", "Tech", "NY", 1),
        ];
        assert_eq!(distinct_values(&records, Field::Location), vec!["NY", "Berlin"]);
        assert_eq!(distinct_values(&records, Field::Industry), vec!["Tech", "Finance"]);
    }

    #[test]
    fn filter_changes_reset_page_but_sort_does_not() {
        let mut query = QueryState {
            current_page: 3,
            ..QueryState::default()
        };
        query.toggle_sort(Field::Employees);
        assert_eq!(query.current_page, 3);

        query.set_search_text("a");
        assert_eq!(query.current_page, 1);

        query.current_page = 2;
        query.set_location_filter(Some("NY".into()));
        assert_eq!(query.current_page, 1);

        query.current_page = 2;
        query.set_industry_filter(None);
        assert_eq!(query.current_page, 1);
    }

    #[test]
    fn sort_toggle_state_machine() {
        let mut query = QueryState::default();
        assert_eq!((query.sort_key, query.sort_direction), (Field::Name, SortDirection::Ascending));

        query.toggle_sort(Field::Name);
        assert_eq!(query.sort_direction, SortDirection::Descending);

        query.toggle_sort(Field::Employees);
        assert_eq!((query.sort_key, query.sort_direction), (Field::Employees, SortDirection::Ascending));

        query.toggle_sort(Field::Employees);
        assert_eq!(query.sort_direction, SortDirection::Descending);
    }

    #[test]
    fn query_state_serializes() {
        let query = QueryState::default();
        let json = serde_json::to_string(&query).unwrap();
        assert!(json.contains("\"sort_key\":\"name\""));
        let back: QueryState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, query);
    }
}
