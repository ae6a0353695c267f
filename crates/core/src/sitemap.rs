//! XML sitemap assembly.
//!
//! The sitemap lists the fixed storefront pages followed by one entry per
//! published blog post. Drafts never appear.

use std::fmt::{self, Write as _};

use chrono::NaiveDate;

use crate::post::PublishedSlug;

/// How often a page is expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl ChangeFreq {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl fmt::Display for ChangeFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fixed storefront page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticRoute {
    pub path: &'static str,
    pub changefreq: ChangeFreq,
    /// Priority as a preformatted decimal (`"1.0"`, `"0.8"`, ...).
    pub priority: &'static str,
}

/// Pages always present in the sitemap, in output order.
pub const STATIC_ROUTES: [StaticRoute; 5] = [
    StaticRoute {
        path: "/",
        changefreq: ChangeFreq::Weekly,
        priority: "1.0",
    },
    StaticRoute {
        path: "/about",
        changefreq: ChangeFreq::Monthly,
        priority: "0.8",
    },
    StaticRoute {
        path: "/blog",
        changefreq: ChangeFreq::Daily,
        priority: "0.9",
    },
    StaticRoute {
        path: "/faq",
        changefreq: ChangeFreq::Monthly,
        priority: "0.7",
    },
    StaticRoute {
        path: "/privacy-policy",
        changefreq: ChangeFreq::Yearly,
        priority: "0.3",
    },
];

const POST_CHANGEFREQ: ChangeFreq = ChangeFreq::Monthly;
const POST_PRIORITY: &str = "0.7";

/// Escape the five XML special characters.
#[must_use]
pub fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn push_url(
    xml: &mut String,
    loc: &str,
    lastmod: NaiveDate,
    changefreq: ChangeFreq,
    priority: &str,
) {
    // Writing to a String cannot fail.
    let _ = write!(
        xml,
        "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    \
         <changefreq>{changefreq}</changefreq>\n    <priority>{priority}</priority>\n  </url>\n",
        escape_xml(loc),
        lastmod.format("%Y-%m-%d"),
    );
}

/// Render the sitemap for `site_url`.
///
/// Static pages carry `today` as their last-modified date; posts carry the
/// date part of their last update, or of their creation if never updated.
#[must_use]
pub fn build_sitemap(site_url: &str, posts: &[PublishedSlug], today: NaiveDate) -> String {
    let base = site_url.trim_end_matches('/');
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );

    for route in &STATIC_ROUTES {
        let loc = format!("{base}{}", route.path);
        push_url(&mut xml, &loc, today, route.changefreq, route.priority);
    }

    for post in posts {
        let loc = format!("{base}/blog/{}", post.slug);
        let lastmod = post.last_modified().date_naive();
        push_url(&mut xml, &loc, lastmod, POST_CHANGEFREQ, POST_PRIORITY);
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Number of `<loc>` entries in a rendered sitemap.
#[must_use]
pub fn count_locs(xml: &str) -> usize {
    xml.matches("<loc>").count()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn published(slug: &str, day: u32, updated: Option<u32>) -> PublishedSlug {
        PublishedSlug {
            slug: slug.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 1, day, 9, 30, 0).unwrap(),
            updated_at: updated.map(|d| Utc.with_ymd_and_hms(2025, 2, d, 23, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_static_routes_only() {
        let xml = build_sitemap("https://jesseaeisenbalm.com", &[], today());

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">"));
        assert_eq!(count_locs(&xml), STATIC_ROUTES.len());
        assert!(xml.contains("<loc>https://jesseaeisenbalm.com/</loc>"));
        assert!(xml.contains("<loc>https://jesseaeisenbalm.com/privacy-policy</loc>"));
        assert!(xml.contains("<lastmod>2025-03-14</lastmod>"));
        assert!(xml.contains("<changefreq>daily</changefreq>\n    <priority>0.9</priority>"));
    }

    #[test]
    fn test_url_count_includes_published_posts() {
        let posts = [published("first", 1, None), published("second", 2, Some(5))];
        let xml = build_sitemap("https://jesseaeisenbalm.com/", &posts, today());

        assert_eq!(count_locs(&xml), STATIC_ROUTES.len() + posts.len());
        assert_eq!(xml.matches("<url>").count(), 7);
        assert!(xml.contains("<loc>https://jesseaeisenbalm.com/blog/first</loc>"));
        assert!(xml.contains("<loc>https://jesseaeisenbalm.com/blog/second</loc>"));
    }

    #[test]
    fn test_post_lastmod_prefers_updated_date() {
        let xml = build_sitemap("https://x.test", &[published("a", 1, Some(5))], today());
        assert!(xml.contains("<loc>https://x.test/blog/a</loc>\n    <lastmod>2025-02-05</lastmod>"));

        let xml = build_sitemap("https://x.test", &[published("b", 7, None)], today());
        assert!(xml.contains("<loc>https://x.test/blog/b</loc>\n    <lastmod>2025-01-07</lastmod>"));
    }

    #[test]
    fn test_locs_are_escaped() {
        let xml = build_sitemap("https://x.test", &[published("a&b", 1, None)], today());
        assert!(xml.contains("<loc>https://x.test/blog/a&amp;b</loc>"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&apos;&amp;&apos;&lt;/a&gt;");
        assert_eq!(escape_xml("plain"), "plain");
    }
}
