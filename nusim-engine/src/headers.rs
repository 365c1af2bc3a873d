//! `X-Nuage-*` request and response metadata.

use std::collections::BTreeMap;

use crate::{ApiResult, FilterExpr};

/// Recognized header names.
pub mod names {
    pub const ORGANIZATION: &str = "X-Nuage-Organization";
    pub const PAGE: &str = "X-Nuage-Page";
    pub const PAGE_SIZE: &str = "X-Nuage-PageSize";
    pub const ORDER_BY: &str = "X-Nuage-OrderBy";
    pub const FILTER_TYPE: &str = "X-Nuage-FilterType";
    pub const FILTER: &str = "X-Nuage-Filter";
    pub const COUNT: &str = "X-Nuage-Count";
    pub const CUSTOM: &str = "X-Nuage-Custom";
    pub const CLIENT_TYPE: &str = "X-Nuage-ClientType";
    pub const EXPOSE_HEADERS: &str = "Access-Control-Expose-Headers";

    /// Value of `Access-Control-Expose-Headers` on every response.
    pub const EXPOSED: &str = "X-Nuage-Organization, X-Nuage-ProxyUser, X-Nuage-OrderBy, \
        X-Nuage-FilterType, X-Nuage-Filter, X-Nuage-Page, X-Nuage-PageSize, X-Nuage-Count, \
        X-Nuage-Custom, X-Nuage-ClientType";
}

/// Request metadata, kept as the raw strings the client sent so they can be
/// echoed back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    pub organization: String,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub order_by: Option<String>,
    pub filter_type: Option<String>,
    pub filter: Option<String>,
    pub custom: Option<String>,
    pub client_type: Option<String>,
}

impl RequestHeaders {
    /// Picks the recognized headers out of a request, matching names
    /// case-insensitively. Unrecognized headers are ignored; a missing
    /// organization falls back to `default_organization`.
    pub fn parse<'a, I>(headers: I, default_organization: &str) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut parsed = Self {
            organization: default_organization.to_string(),
            ..Self::default()
        };
        for (name, value) in headers {
            let value = value.to_string();
            let slot = match name {
                n if n.eq_ignore_ascii_case(names::ORGANIZATION) => {
                    parsed.organization = value;
                    continue;
                }
                n if n.eq_ignore_ascii_case(names::PAGE) => &mut parsed.page,
                n if n.eq_ignore_ascii_case(names::PAGE_SIZE) => &mut parsed.page_size,
                n if n.eq_ignore_ascii_case(names::ORDER_BY) => &mut parsed.order_by,
                n if n.eq_ignore_ascii_case(names::FILTER_TYPE) => &mut parsed.filter_type,
                n if n.eq_ignore_ascii_case(names::FILTER) => &mut parsed.filter,
                n if n.eq_ignore_ascii_case(names::CUSTOM) => &mut parsed.custom,
                n if n.eq_ignore_ascii_case(names::CLIENT_TYPE) => &mut parsed.client_type,
                _ => continue,
            };
            *slot = Some(value);
        }
        parsed
    }

    /// Page number, when present and numeric.
    pub fn page_number(&self) -> Option<usize> {
        self.page.as_deref().and_then(|p| p.trim().parse().ok())
    }

    /// Page size, when present and numeric.
    pub fn page_size_number(&self) -> Option<usize> {
        self.page_size.as_deref().and_then(|p| p.trim().parse().ok())
    }

    /// `page=0, pageSize=1`: the caller only wants the first match.
    pub fn single_item(&self) -> bool {
        self.page_number() == Some(0) && self.page_size_number() == Some(1)
    }

    /// Parses the filter header, if any. Blank filters are ignored.
    pub fn filter_expr(&self) -> ApiResult<Option<FilterExpr>> {
        match self.filter.as_deref().map(str::trim) {
            Some(expr) if !expr.is_empty() => FilterExpr::parse(expr).map(Some),
            _ => Ok(None),
        }
    }

    /// Response metadata: every header the request set, the computed count
    /// and the CORS expose list.
    pub fn response_headers(&self, count: usize) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        out.insert(names::ORGANIZATION.to_string(), self.organization.clone());
        let optional = [
            (names::PAGE, &self.page),
            (names::PAGE_SIZE, &self.page_size),
            (names::ORDER_BY, &self.order_by),
            (names::FILTER_TYPE, &self.filter_type),
            (names::FILTER, &self.filter),
            (names::CUSTOM, &self.custom),
            (names::CLIENT_TYPE, &self.client_type),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                out.insert(name.to_string(), value.clone());
            }
        }
        out.insert(names::COUNT.to_string(), count.to_string());
        out.insert(names::EXPOSE_HEADERS.to_string(), names::EXPOSED.to_string());
        out
    }
}
