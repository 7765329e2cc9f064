//! `Link` header parsing and page-following for list endpoints.
//!
//! GitHub paginates list responses and advertises continuation URLs in a
//! `Link` header of the form `<url>; rel="next", <url>; rel="last"`. Only the
//! `next` relation drives iteration. Pages are fetched strictly in order and
//! the aggregate is returned only once the last page decodes, so a failure on
//! any page yields an error and no items.

use std::collections::HashSet;

use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

pub const LINK_HEADER: &str = "Link";

/// One `<url>; rel="..."` entry from a `Link` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRelation {
    pub url: String,
    /// Relation names; a single entry may carry several (`rel="next last"`).
    pub rels: Vec<String>,
}

impl LinkRelation {
    pub fn has_rel(&self, rel: &str) -> bool {
        self.rels.iter().any(|r| r.eq_ignore_ascii_case(rel))
    }
}

/// Parse a `Link` header value into its relations, in header order.
///
/// Entries without a `<url>` target are skipped. Commas inside the angle
/// brackets belong to the URL, not the entry list.
pub fn parse_link_header(value: &str) -> Vec<LinkRelation> {
    split_entries(value)
        .into_iter()
        .filter_map(parse_entry)
        .collect()
}

fn split_entries(value: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut in_target = false;
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match c {
            '<' if !in_quotes => in_target = true,
            '>' if !in_quotes => in_target = false,
            '"' if !in_target => in_quotes = !in_quotes,
            ',' if !in_target && !in_quotes => {
                entries.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(&value[start..]);
    entries
}

fn parse_entry(entry: &str) -> Option<LinkRelation> {
    let entry = entry.trim();
    let rest = entry.strip_prefix('<')?;
    let close = rest.find('>')?;
    let url = rest[..close].trim().to_string();

    let mut rels = Vec::new();
    for param in rest[close + 1..].split(';') {
        let Some((key, val)) = param.split_once('=') else {
            continue;
        };
        if !key.trim().eq_ignore_ascii_case("rel") {
            continue;
        }
        let val = val.trim().trim_matches('"');
        rels.extend(val.split_whitespace().map(str::to_string));
    }

    Some(LinkRelation { url, rels })
}

/// The `rel="next"` target advertised by `response`, if any.
pub fn next_link(response: &HttpResponse) -> Option<String> {
    response
        .headers
        .iter()
        .filter(|(name, _)| name.eq_ignore_ascii_case(LINK_HEADER))
        .flat_map(|(_, value)| parse_link_header(value))
        .find(|link| link.has_rel("next"))
        .map(|link| link.url)
}

/// Send `first`, then every `rel="next"` continuation, decoding each page
/// with `decode_page` and concatenating the results in page order.
///
/// Continuation requests are GETs to the advertised URL verbatim, carrying
/// the same headers as `first`. `decode_page` is responsible for the status
/// check as well as JSON decoding. A `next` link to a URL already fetched in
/// this call fails with `ApiError::PaginationLoop`.
pub fn fetch_all_pages<T, R, D>(
    transport: &R,
    first: HttpRequest,
    mut decode_page: D,
) -> Result<Vec<T>, ApiError>
where
    R: Transport + ?Sized,
    D: FnMut(HttpResponse) -> Result<Vec<T>, ApiError>,
{
    let headers = first.headers.clone();
    let mut request = first;
    let mut items = Vec::new();
    let mut page = 1usize;
    let mut visited = HashSet::new();

    loop {
        visited.insert(request.url.clone());
        debug!(page, url = %request.url, "fetching page");
        let response = transport.execute(request)?;
        let next = next_link(&response);
        items.extend(decode_page(response)?);

        let Some(url) = next else {
            break;
        };
        if visited.contains(&url) {
            return Err(ApiError::PaginationLoop { url });
        }
        page += 1;
        request = HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: headers.clone(),
            body: None,
        };
    }

    debug!(pages = page, items = items.len(), "pagination complete");
    Ok(items)
}
