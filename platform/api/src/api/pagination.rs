//! Page number pagination for list endpoints.
//!
//! `?page=N` selects a 1-based page, `?page=last` the final one. Page 1 always
//! exists, even for an empty listing. Responses are wrapped in
//! `{count, next, previous, results}` where the links are absolute urls.

use common::http::RouteError;
use common::make_response;
use hyper::StatusCode;
use serde_json::json;
use url::Url;

use super::error::ApiError;

pub const PAGE_QUERY_PARAM: &str = "page";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid page")]
pub struct InvalidPage;

impl From<InvalidPage> for RouteError<ApiError> {
	#[track_caller]
	fn from(_: InvalidPage) -> Self {
		RouteError::from(make_response!(StatusCode::NOT_FOUND, json!({ "detail": "Invalid page." })))
	}
}

#[derive(Debug, serde::Serialize)]
pub struct Page<T> {
	pub count: i64,
	pub next: Option<String>,
	pub previous: Option<String>,
	pub results: Vec<T>,
}

/// A validated page within a listing of `count` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
	pub number: i64,
	pub num_pages: i64,
	pub page_size: i64,
	pub count: i64,
}

impl PageWindow {
	/// Resolves the raw `page` query value against the listing size.
	pub fn new(raw: Option<&str>, count: i64, page_size: u32) -> Result<Self, InvalidPage> {
		let page_size = i64::from(page_size.max(1));
		let num_pages = match count {
			0 => 1,
			count => (count + page_size - 1) / page_size,
		};

		let number = match raw.map(str::trim) {
			None | Some("") => 1,
			Some("last") => num_pages,
			Some(raw) => raw.parse::<i64>().map_err(|_| InvalidPage)?,
		};

		if number < 1 || number > num_pages {
			return Err(InvalidPage);
		}

		Ok(Self {
			number,
			num_pages,
			page_size,
			count,
		})
	}

	pub fn offset(&self) -> i64 {
		(self.number - 1) * self.page_size
	}

	pub fn limit(&self) -> i64 {
		self.page_size
	}

	pub fn has_next(&self) -> bool {
		self.number < self.num_pages
	}

	pub fn has_previous(&self) -> bool {
		self.number > 1
	}

	/// Wraps `results` with links derived from the absolute `request_url`.
	/// Other query parameters are kept as they are.
	pub fn into_page<T>(self, request_url: &Url, results: Vec<T>) -> Page<T> {
		let next = self.has_next().then(|| page_link(request_url, Some(self.number + 1)));
		let previous = self.has_previous().then(|| match self.number - 1 {
			// The first page is linked without a page parameter
			1 => page_link(request_url, None),
			number => page_link(request_url, Some(number)),
		});

		Page {
			count: self.count,
			next,
			previous,
			results,
		}
	}
}

fn page_link(url: &Url, page: Option<i64>) -> String {
	let mut url = url.clone();

	let pairs = url
		.query_pairs()
		.filter(|(k, _)| k != PAGE_QUERY_PARAM)
		.map(|(k, v)| (k.into_owned(), v.into_owned()))
		.collect::<Vec<_>>();

	url.set_query(None);

	if !pairs.is_empty() || page.is_some() {
		let mut query = url.query_pairs_mut();
		query.extend_pairs(pairs);
		if let Some(page) = page {
			query.append_pair(PAGE_QUERY_PARAM, &page.to_string());
		}
	}

	url.to_string()
}
