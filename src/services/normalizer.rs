// src/services/normalizer.rs

//! Maps raw adapter records onto the canonical `Posting` shape.

use crate::models::{Posting, RawPosting, UNKNOWN_COMPANY};
use crate::utils::{clean_whitespace, resolve_link};

/// Per-source context needed to normalize its records.
#[derive(Debug, Clone, Copy)]
pub struct SourceContext<'a> {
    pub name: &'a str,
    pub base_url: &'a str,
    pub default_location: &'a str,
}

/// Normalize a raw record, or `None` when it has no title or no usable link.
pub fn normalize(raw: &RawPosting, ctx: SourceContext<'_>) -> Option<Posting> {
    let title = clean_whitespace(&raw.title);
    if title.is_empty() {
        return None;
    }

    let link = resolve_link(ctx.base_url, &raw.href)?;

    Some(Posting {
        title,
        company: non_empty(raw.company.as_deref()).unwrap_or_else(|| UNKNOWN_COMPANY.to_string()),
        location: non_empty(raw.location.as_deref())
            .unwrap_or_else(|| ctx.default_location.to_string()),
        source: ctx.name.to_string(),
        link,
        posted_at: non_empty(raw.posted_at.as_deref()).unwrap_or_default(),
        description: non_empty(raw.description.as_deref()).unwrap_or_default(),
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(clean_whitespace).filter(|v| !v.is_empty())
}
