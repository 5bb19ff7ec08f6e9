// src/services/presenter.rs

//! Renders a ranked digest into an HTML payload and a plain-text payload.

use chrono::{DateTime, FixedOffset};
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::models::{ClassifiedPosting, DigestConfig};

/// Both payload forms of one digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    /// HTML body for email
    pub rich: String,
    /// Text body for chat and messaging channels
    pub plain: String,
    /// Postings the digest was rendered from
    pub count: usize,
    pub generated_at: DateTime<FixedOffset>,
}

impl Digest {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Renders digests with a fixed header and timestamp label.
#[derive(Debug, Clone)]
pub struct Presenter {
    app_name: String,
    timezone_label: String,
    plain_max_entries: usize,
    logo_url: Option<String>,
}

impl Presenter {
    pub fn new(
        app_name: impl Into<String>,
        timezone_label: impl Into<String>,
        plain_max_entries: usize,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            timezone_label: timezone_label.into(),
            plain_max_entries,
            logo_url: None,
        }
    }

    /// Show a banner image at the top of the HTML payload.
    pub fn with_logo(mut self, logo_url: impl Into<String>) -> Self {
        self.logo_url = Some(logo_url.into());
        self
    }

    pub fn from_config(config: &DigestConfig) -> Self {
        let presenter = Self::new(
            &config.app_name,
            &config.timezone_label,
            config.plain_max_entries,
        );
        match &config.logo_url {
            Some(url) => presenter.with_logo(url),
            None => presenter,
        }
    }

    pub fn render(
        &self,
        postings: &[ClassifiedPosting],
        generated_at: DateTime<FixedOffset>,
    ) -> Digest {
        let stamp = format!(
            "{} {}",
            generated_at.format("%Y-%m-%d %H:%M"),
            self.timezone_label
        );
        let (rich, plain) = if postings.is_empty() {
            (self.empty_html(&stamp), self.empty_text(&stamp))
        } else {
            (self.html(postings, &stamp), self.text(postings, &stamp))
        };

        Digest {
            rich,
            plain,
            count: postings.len(),
            generated_at,
        }
    }

    fn empty_html(&self, stamp: &str) -> String {
        format!(
            "<div style='font-family:Arial;padding:20px;'>\
             {banner}\
             <h2>{app}</h2>\
             <p>No new roles found today.</p>\
             <p style='color:#888;'>Generated {stamp}</p>\
             </div>",
            banner = self.banner("max-width:600px;"),
            app = encode_text(&self.app_name),
            stamp = encode_text(stamp),
        )
    }

    fn banner(&self, style: &str) -> String {
        self.logo_url
            .as_deref()
            .map(|url| {
                format!(
                    "<img src=\"{}\" alt=\"{}\" style='width:100%;{style}height:auto;display:block;'>",
                    encode_double_quoted_attribute(url),
                    encode_double_quoted_attribute(&self.app_name),
                )
            })
            .unwrap_or_default()
    }

    fn empty_text(&self, stamp: &str) -> String {
        format!("{}: No roles found today ({})", self.app_name, stamp)
    }

    fn html(&self, postings: &[ClassifiedPosting], stamp: &str) -> String {
        let rows: String = postings.iter().map(html_row).collect();
        format!(
            "<div style='font-family:Arial;background:#f9fafb;padding:0;margin:0;'>\
             <div style='max-width:900px;margin:auto;background:white;border-radius:10px;overflow:hidden;'>\
             {banner}\
             <div style='padding:20px;'>\
             <h2>🔥 {app}</h2>\
             <p>Top {count} roles — {stamp}</p>\
             <table style='width:100%;border-collapse:collapse;'>\
             <tr><th>Title</th><th>Company</th><th>Location</th><th>Role</th><th>Type</th>\
             <th>Skills</th><th>Apply</th><th>Source</th></tr>\
             {rows}\
             </table>\
             <p style='color:#aaa;font-size:12px;'>Generated automatically at {stamp} • {app}</p>\
             </div></div></div>",
            banner = self.banner(""),
            app = encode_text(&self.app_name),
            count = postings.len(),
            stamp = encode_text(stamp),
        )
    }

    fn text(&self, postings: &[ClassifiedPosting], stamp: &str) -> String {
        let header = format!("🔥 {} — {}", self.app_name, stamp);
        std::iter::once(header)
            .chain(
                postings
                    .iter()
                    .take(self.plain_max_entries)
                    .enumerate()
                    .map(|(i, p)| text_entry(i + 1, p)),
            )
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn html_row(p: &ClassifiedPosting) -> String {
    let badges: String = p
        .skills
        .iter()
        .map(|s| {
            format!(
                "<span style='background:#eef2ff;border-radius:4px;padding:2px 6px;margin-right:4px;'>{}</span>",
                encode_text(s)
            )
        })
        .collect();
    format!(
        "<tr><td>{title}</td><td>{company}</td><td>{location}</td><td>{role}</td>\
         <td>{mode}</td><td>{badges}</td><td><a href=\"{link}\">Apply</a></td><td>{source}</td></tr>",
        title = encode_text(&p.posting.title),
        company = encode_text(&p.posting.company),
        location = encode_text(&p.posting.location),
        role = p.role_type,
        mode = p.work_mode,
        link = encode_double_quoted_attribute(&p.posting.link),
        source = encode_text(&p.posting.source),
    )
}

fn text_entry(n: usize, p: &ClassifiedPosting) -> String {
    let mut line = format!(
        "{n}. {} • {} • {} • {} ({})",
        p.posting.title, p.posting.company, p.posting.location, p.role_type, p.work_mode
    );
    if !p.skills.is_empty() {
        line.push_str(" • ");
        line.push_str(&p.skills.join(", "));
    }
    format!("{line}\n{}", p.posting.link)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::{Classification, Posting, RoleType, WorkMode};

    fn generated_at() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 10, 7, 0, 0)
            .unwrap()
    }

    fn classified(title: &str, link: &str, skills: &[&str]) -> ClassifiedPosting {
        ClassifiedPosting::new(
            Posting {
                title: title.to_string(),
                company: "Acme & Co".to_string(),
                location: "Remote".to_string(),
                source: "Jobberman".to_string(),
                link: link.to_string(),
                posted_at: String::new(),
                description: String::new(),
            },
            Classification {
                role_type: RoleType::DataAnalyst,
                work_mode: WorkMode::Remote,
                skills: skills.iter().map(|s| s.to_string()).collect(),
            },
        )
    }

    fn presenter(cap: usize) -> Presenter {
        Presenter::new("Job Digest", "WAT", cap)
    }

    #[test]
    fn test_empty_digest_both_forms() {
        let digest = presenter(15).render(&[], generated_at());
        assert!(digest.is_empty());
        assert_eq!(
            digest.plain,
            "Job Digest: No roles found today (2025-03-10 07:00 WAT)"
        );
        assert!(digest.rich.contains("No new roles found today."));
        assert!(digest.rich.contains("2025-03-10 07:00 WAT"));
    }

    #[test]
    fn test_plain_entries_numbered_and_separated() {
        let postings = vec![
            classified("Data Analyst", "https://x/1", &["SQL", "Excel"]),
            classified("BI Analyst", "https://x/2", &[]),
        ];
        let digest = presenter(15).render(&postings, generated_at());
        assert_eq!(
            digest.plain,
            "🔥 Job Digest — 2025-03-10 07:00 WAT\n\n\
             1. Data Analyst • Acme & Co • Remote • Data Analyst (Remote) • SQL, Excel\nhttps://x/1\n\n\
             2. BI Analyst • Acme & Co • Remote • Data Analyst (Remote)\nhttps://x/2"
        );
        assert_eq!(digest.count, 2);
    }

    #[test]
    fn test_plain_payload_capped_independently() {
        let postings: Vec<_> = (0..20)
            .map(|i| classified("Data Analyst", &format!("https://x/{i}"), &[]))
            .collect();
        let digest = presenter(5).render(&postings, generated_at());
        assert!(digest.plain.contains("\n5. Data Analyst"));
        assert!(!digest.plain.contains("\n6. Data Analyst"));
        assert_eq!(digest.rich.matches("<tr><td>").count(), 20);
    }

    #[test]
    fn test_rich_rows_escape_markup() {
        let postings = vec![classified(
            "<b>Data</b> Analyst",
            "https://x/1?a=1&b=\"2\"",
            &["SQL"],
        )];
        let digest = presenter(15).render(&postings, generated_at());
        assert!(digest.rich.contains("&lt;b&gt;Data&lt;/b&gt; Analyst"));
        assert!(digest.rich.contains("Acme &amp; Co"));
        assert!(digest.rich.contains("href=\"https://x/1?a=1&amp;b=&quot;2&quot;\""));
        assert!(digest.rich.contains(">SQL</span>"));
        assert!(digest.rich.contains("<td>Data Analyst</td><td>Remote</td>"));
        assert!(digest.rich.contains("Top 1 roles"));
        assert!(!digest.rich.contains("<img"));
    }

    #[test]
    fn test_logo_banner_and_footer() {
        let postings = vec![classified("Data Analyst", "https://x/1", &[])];
        let presenter = presenter(15).with_logo("https://cdn.example.com/logo.png?v=1&s=2");

        let digest = presenter.render(&postings, generated_at());
        assert!(digest.rich.contains(
            "<img src=\"https://cdn.example.com/logo.png?v=1&amp;s=2\" alt=\"Job Digest\""
        ));
        assert!(digest
            .rich
            .contains("Generated automatically at 2025-03-10 07:00 WAT • Job Digest"));

        let empty = presenter.render(&[], generated_at());
        assert!(empty.rich.contains("<img src=\"https://cdn.example.com/logo.png"));
        assert!(!empty.plain.contains("logo"));
    }

    #[test]
    fn test_from_config_picks_up_logo() {
        let config = DigestConfig {
            logo_url: Some("https://cdn.example.com/logo.png".to_string()),
            ..DigestConfig::default()
        };
        let digest = Presenter::from_config(&config).render(&[], generated_at());
        assert!(digest.rich.contains("https://cdn.example.com/logo.png"));
    }
}
