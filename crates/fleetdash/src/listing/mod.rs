//! Filtering and paging of record lists.
//!
//! List endpoints load a whole table, narrow it with a [`ListQuery`] and
//! return either the plain array or, when a page is asked for, a [`Page`]
//! envelope.

mod page;
mod stats;

use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;
use crate::model::{Device, Organization, Report, Sim, User};

pub use page::{paginate, Page};
pub use stats::{DeviceStats, OrganizationStats, SimStats, UserStats};

/// Status filter value that matches everything.
const ANY_STATUS: &str = "all";

/// Query-string parameters accepted by every list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListQuery {
    /// Case-insensitive substring matched against the record's text fields.
    pub search: Option<String>,
    /// Exact status name; `all` disables the filter.
    pub status: Option<String>,
    /// Owning organization.
    pub organization_id: Option<i64>,
    /// 1-based page number. Absent means "no paging".
    pub page: Option<usize>,
    /// Page size, clamped to the configured maximum.
    pub per_page: Option<usize>,
}

/// A list response: the plain array, or a page of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    /// Every matching record.
    All(Vec<T>),
    /// One page of the matching records.
    Page(Page<T>),
}

impl<T> Listing<T> {
    /// The records in this response.
    #[must_use]
    pub fn items(&self) -> &[T] {
        match self {
            Self::All(items) => items,
            Self::Page(page) => &page.items,
        }
    }
}

/// A record that list endpoints can filter.
pub trait Listable {
    /// Whether the record belongs to an organization. Unscoped records
    /// ignore the `organizationId` filter.
    const SCOPED: bool = true;

    /// Text fields searched by `?search=`.
    fn search_fields(&self) -> Vec<&str>;

    /// Wire name of the record's status.
    fn status_name(&self) -> &'static str;

    /// Owning organization, if any.
    fn organization(&self) -> Option<i64> {
        None
    }
}

impl ListQuery {
    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    fn status_filter(&self) -> Option<&str> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != ANY_STATUS)
    }

    /// True if the record passes every filter in the query.
    #[must_use]
    pub fn matches<T: Listable>(&self, item: &T) -> bool {
        if let Some(term) = self.search_term() {
            let hit = item
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        if let Some(status) = self.status_filter() {
            if item.status_name() != status {
                return false;
            }
        }
        if T::SCOPED {
            if let Some(org) = self.organization_id {
                if item.organization() != Some(org) {
                    return false;
                }
            }
        }
        true
    }

    /// Filter `items` and page them if a page was requested.
    #[must_use]
    pub fn apply<T: Listable>(&self, items: Vec<T>, pagination: &PaginationConfig) -> Listing<T> {
        let matching: Vec<T> = items.into_iter().filter(|item| self.matches(item)).collect();

        match self.page {
            None => Listing::All(matching),
            Some(page) => {
                let per_page = self
                    .per_page
                    .unwrap_or(pagination.default_per_page)
                    .clamp(1, pagination.max_per_page.max(1));
                Listing::Page(paginate(matching, page, per_page))
            }
        }
    }
}

fn push_opt<'a>(fields: &mut Vec<&'a str>, value: Option<&'a String>) {
    if let Some(value) = value {
        fields.push(value);
    }
}

impl Listable for Organization {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }

    fn status_name(&self) -> &'static str {
        self.status.as_str()
    }

    fn organization(&self) -> Option<i64> {
        Some(self.id)
    }
}

impl Listable for Device {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.label.as_str(), self.imei.as_str()];
        push_opt(&mut fields, self.model.as_ref());
        push_opt(&mut fields, self.manufacturer.as_ref());
        fields
    }

    fn status_name(&self) -> &'static str {
        self.status.as_str()
    }

    fn organization(&self) -> Option<i64> {
        self.organization_id
    }
}

impl Listable for Sim {
    const SCOPED: bool = false;

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.sim_id.as_str(),
            self.iccid.as_str(),
            self.msisdn.as_str(),
            self.network_provider.as_str(),
        ]
    }

    fn status_name(&self) -> &'static str {
        self.status.as_str()
    }
}

impl Listable for User {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.username.as_str(), self.email.as_str()];
        push_opt(&mut fields, self.full_name.as_ref());
        fields
    }

    fn status_name(&self) -> &'static str {
        self.status.as_str()
    }

    fn organization(&self) -> Option<i64> {
        self.organization_id
    }
}

impl Listable for Report {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.date_range.as_str()]
    }

    fn status_name(&self) -> &'static str {
        self.status.as_str()
    }

    fn organization(&self) -> Option<i64> {
        self.organization_id
    }
}
