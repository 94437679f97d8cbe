// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Sorting and pagination over the current result set.
//!
//! Projections are pure functions of `(results, sort, page)`; nothing here
//! caches, so a new result set or a new sort is reflected on the next call.

use std::cmp::Ordering;

use crate::{Lead, SortDirection};

pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Name,
    Platform,
    Role,
    Popularity,
    Region,
    Company,
}

impl SortField {
    pub const ALL: [Self; 6] = [
        Self::Name,
        Self::Platform,
        Self::Role,
        Self::Popularity,
        Self::Region,
        Self::Company,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Platform => "Platform",
            Self::Role => "Role",
            Self::Popularity => "Followers",
            Self::Region => "Location",
            Self::Company => "Company",
        }
    }

    fn key<'a>(self, lead: &'a Lead) -> SortKey<'a> {
        let text = |value: Option<&'a str>| SortKey::Text(value.unwrap_or_default());
        match self {
            Self::Name => text(lead.name.as_deref()),
            Self::Platform => SortKey::Text(lead.platform.as_str()),
            Self::Role => text(lead.role.as_deref()),
            Self::Popularity => match lead.popularity_count() {
                Some(count) if count > 0 => SortKey::Number(count),
                _ => SortKey::Text(""),
            },
            Self::Region => text(lead.region.as_deref()),
            Self::Company => text(lead.company.as_deref()),
        }
    }
}

enum SortKey<'a> {
    Number(u64),
    Text(&'a str),
}

impl SortKey<'_> {
    fn cmp_value(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(left), Self::Number(right)) => left.cmp(right),
            _ => {
                let left = self.display();
                let right = other.display();
                left.to_lowercase()
                    .cmp(&right.to_lowercase())
                    .then_with(|| right.cmp(&left))
            }
        }
    }

    fn display(&self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(value) => (*value).to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: Option<SortField>,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: None,
            direction: SortDirection::Asc,
        }
    }
}

impl SortState {
    /// Same field flips the direction; a different field starts ascending.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == Some(field) {
            self.direction = self.direction.flipped();
        } else {
            self.field = Some(field);
            self.direction = SortDirection::Asc;
        }
    }

    pub fn direction_for(&self, field: SortField) -> Option<SortDirection> {
        (self.field == Some(field)).then_some(self.direction)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage<'a> {
    pub rows: Vec<&'a Lead>,
    pub page: usize,
    pub total_pages: usize,
    /// 1-based index of the first visible row, 0 when there are no rows.
    pub first_row: usize,
    pub last_row: usize,
    pub total: usize,
}

pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

pub fn project<'a>(
    results: &'a [Lead],
    sort: SortState,
    page: usize,
    page_size: usize,
) -> ResultPage<'a> {
    let page_size = page_size.max(1);
    let mut rows = results.iter().collect::<Vec<_>>();
    if let Some(field) = sort.field {
        rows.sort_by(|left, right| {
            let order = field.key(left).cmp_value(&field.key(right));
            match sort.direction {
                SortDirection::Asc => order,
                SortDirection::Desc => order.reverse(),
            }
        });
    }

    let total = rows.len();
    let total_pages = total_pages(total, page_size);
    let page = clamp_page(page, total_pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total);
    let rows = rows
        .get(start..end)
        .map(|slice| slice.to_vec())
        .unwrap_or_default();

    ResultPage {
        first_row: if rows.is_empty() { 0 } else { start + 1 },
        last_row: end,
        rows,
        page,
        total_pages,
        total,
    }
}

/// Sort and page cursor for the results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultView {
    pub sort: SortState,
    pub page: usize,
}

impl Default for ResultView {
    fn default() -> Self {
        Self {
            sort: SortState::default(),
            page: 1,
        }
    }
}

impl ResultView {
    pub fn toggle_sort(&mut self, field: SortField) {
        self.sort.toggle(field);
    }

    pub fn set_page(&mut self, page: usize, total: usize) {
        self.page = clamp_page(page, total_pages(total, PAGE_SIZE));
    }

    pub fn next_page(&mut self, total: usize) {
        self.set_page(self.page.saturating_add(1), total);
    }

    pub fn prev_page(&mut self, total: usize) {
        self.set_page(self.page.saturating_sub(1), total);
    }

    /// Back to page one, keeping the sort.
    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn project<'a>(&self, results: &'a [Lead]) -> ResultPage<'a> {
        project(results, self.sort, self.page, PAGE_SIZE)
    }
}
