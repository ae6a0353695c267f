//! Advisory SEO checklist for draft blog posts.
//!
//! [`analyze`] is a pure function of the draft and a focus keyphrase. The
//! admin editor recomputes it on every keystroke; it never blocks saving.
//!
//! # Checks
//!
//! | check | passes when |
//! |---|---|
//! | keyphrase in title / slug / excerpt | the keyphrase appears (slug: its slugified form) |
//! | keyphrase in first paragraph | the first `<p>` mentions it |
//! | keyphrase in subheading | any `<h2>`..`<h6>` mentions it |
//! | keyphrase density | occurrences are 0.5 %..=3 % of the word count |
//! | content length | at least 300 words (900 is graded "good") |
//! | subheadings | at least one `<h2>`..`<h6>` |
//! | internal link | an `href` that is root-relative or on the site domain |
//! | external link | an absolute `href` to another domain |
//! | image alt text | every `<img>` has a non-empty `alt` |
//! | title length | 50..=60 characters |
//! | excerpt length | 150..=160 characters |

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::post::PostDraft;
use crate::slug::slugify;

/// Minimum word count for the content length check to pass.
pub const MIN_WORDS: usize = 300;
/// Word count graded as "good".
pub const GOOD_WORDS: usize = 900;
/// Keyphrase density bounds, in percent of the word count.
pub const DENSITY_RANGE: (f64, f64) = (0.5, 3.0);
/// Title length bounds, in characters.
pub const TITLE_LENGTH: (usize, usize) = (50, 60);
/// Excerpt length bounds, in characters.
pub const EXCERPT_LENGTH: (usize, usize) = (150, 160);
/// Number of scored checks.
pub const TOTAL_CHECKS: usize = 13;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static FIRST_PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p(?:\s[^>]*)?>(.*?)</p>").expect("valid regex"));
static SUBHEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h[2-6](?:\s[^>]*)?>(.*?)</h[2-6]>").expect("valid regex"));
static HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a\s[^>]*?href\s*=\s*["']([^"']*)["']"#).expect("valid regex")
});
static IMG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").expect("valid regex"));
static ALT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\balt\s*=\s*(?:"\s*[^"\s][^"]*"|'\s*[^'\s][^']*')"#).expect("valid regex")
});

/// How long the content is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthGrade {
    /// Under [`MIN_WORDS`].
    Poor,
    /// At least [`MIN_WORDS`].
    Ok,
    /// At least [`GOOD_WORDS`].
    Good,
}

impl LengthGrade {
    fn for_words(words: usize) -> Self {
        if words >= GOOD_WORDS {
            Self::Good
        } else if words >= MIN_WORDS {
            Self::Ok
        } else {
            Self::Poor
        }
    }
}

/// Result of running the checklist against a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoReport {
    pub keyphrase_in_title: bool,
    pub keyphrase_in_slug: bool,
    pub keyphrase_in_excerpt: bool,
    pub keyphrase_in_first_paragraph: bool,
    pub keyphrase_in_subheading: bool,
    pub keyphrase_density_ok: bool,
    pub word_count_ok: bool,
    pub word_count_good: bool,
    pub has_subheadings: bool,
    pub has_internal_link: bool,
    pub has_external_link: bool,
    pub images_have_alt: bool,
    pub title_length_ok: bool,
    pub excerpt_length_ok: bool,
    pub word_count: usize,
    pub length_grade: LengthGrade,
    /// Keyphrase occurrences as a percentage of the word count.
    pub keyphrase_density: f64,
    pub passed: usize,
    pub total: usize,
    /// `passed / total` as a whole percentage.
    pub score: u8,
}

impl SeoReport {
    /// The scored checks, in display order.
    #[must_use]
    pub const fn checks(&self) -> [(&'static str, bool); TOTAL_CHECKS] {
        [
            ("Keyphrase in title", self.keyphrase_in_title),
            ("Keyphrase in slug", self.keyphrase_in_slug),
            ("Keyphrase in excerpt", self.keyphrase_in_excerpt),
            ("Keyphrase in first paragraph", self.keyphrase_in_first_paragraph),
            ("Keyphrase in a subheading", self.keyphrase_in_subheading),
            ("Keyphrase density", self.keyphrase_density_ok),
            ("Content length", self.word_count_ok),
            ("Uses subheadings", self.has_subheadings),
            ("Internal link", self.has_internal_link),
            ("External link", self.has_external_link),
            ("Image alt text", self.images_have_alt),
            ("Title length", self.title_length_ok),
            ("Excerpt length", self.excerpt_length_ok),
        ]
    }
}

/// Replace tags with spaces, leaving the visible text.
#[must_use]
pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, " ").into_owned()
}

/// Number of whitespace-separated words in the visible text of `html`.
#[must_use]
pub fn word_count(html: &str) -> usize {
    strip_tags(html).split_whitespace().count()
}

fn mentions(text: &str, keyphrase: &str) -> bool {
    !keyphrase.is_empty() && text.to_lowercase().contains(keyphrase)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Occurrences of `keyphrase` as a whole phrase in `text`, case-insensitive.
///
/// Word boundaries are only required at ends of the keyphrase that are word
/// characters, so `c++` and `lip balm.` still match.
fn occurrences(text: &str, keyphrase: &str) -> usize {
    let (Some(first), Some(last)) = (keyphrase.chars().next(), keyphrase.chars().last()) else {
        return 0;
    };
    let pattern = format!(
        r"(?i){}{}{}",
        if is_word_char(first) { r"\b" } else { "" },
        regex::escape(keyphrase),
        if is_word_char(last) { r"\b" } else { "" },
    );
    Regex::new(&pattern).map_or(0, |re| re.find_iter(text).count())
}

fn first_paragraph(html: &str) -> String {
    FIRST_PARAGRAPH.captures(html).map_or_else(
        || {
            strip_tags(html)
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .unwrap_or_default()
                .to_string()
        },
        |caps| caps.get(1).map_or_else(String::new, |m| strip_tags(m.as_str())),
    )
}

fn is_internal_href(href: &str, site_domain: &str) -> bool {
    (href.starts_with('/') && !href.starts_with("//"))
        || (!site_domain.is_empty() && href.to_lowercase().contains(site_domain))
}

fn is_external_href(href: &str, site_domain: &str) -> bool {
    let lower = href.to_lowercase();
    let absolute =
        lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//");
    absolute && (site_domain.is_empty() || !lower.contains(site_domain))
}

#[allow(clippy::cast_precision_loss)] // Word counts never approach 2^52
fn density(occurrences: usize, words: usize) -> f64 {
    if words == 0 {
        return 0.0;
    }
    occurrences as f64 / words as f64 * 100.0
}

fn in_range(value: usize, (min, max): (usize, usize)) -> bool {
    (min..=max).contains(&value)
}

/// Score a draft against a focus keyphrase.
///
/// `site_domain` (e.g. `jesseaeisenbalm.com`) decides which absolute links
/// count as internal. An empty keyphrase fails every keyphrase check.
#[must_use]
pub fn analyze(draft: &PostDraft, keyphrase: &str, site_domain: &str) -> SeoReport {
    let keyphrase = keyphrase.trim().to_lowercase();
    let site_domain = site_domain.trim().to_lowercase();
    let content = draft.content.as_str();
    let text = strip_tags(content);
    let words = text.split_whitespace().count();

    let keyphrase_slug = slugify(&keyphrase);
    let subheadings: Vec<String> = SUBHEADING
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| strip_tags(m.as_str())))
        .collect();
    let hrefs: Vec<&str> = HREF
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim()))
        .collect();

    let keyphrase_density = density(occurrences(&text, &keyphrase), words);
    let length_grade = LengthGrade::for_words(words);

    let mut report = SeoReport {
        keyphrase_in_title: mentions(&draft.title, &keyphrase),
        keyphrase_in_slug: !keyphrase_slug.is_empty()
            && draft.slug.to_lowercase().contains(&keyphrase_slug),
        keyphrase_in_excerpt: mentions(&draft.excerpt, &keyphrase),
        keyphrase_in_first_paragraph: mentions(&first_paragraph(content), &keyphrase),
        keyphrase_in_subheading: subheadings.iter().any(|h| mentions(h, &keyphrase)),
        keyphrase_density_ok: keyphrase_density >= DENSITY_RANGE.0
            && keyphrase_density <= DENSITY_RANGE.1,
        word_count_ok: length_grade != LengthGrade::Poor,
        word_count_good: length_grade == LengthGrade::Good,
        has_subheadings: !subheadings.is_empty(),
        has_internal_link: hrefs.iter().any(|h| is_internal_href(h, &site_domain)),
        has_external_link: hrefs.iter().any(|h| is_external_href(h, &site_domain)),
        images_have_alt: IMG.find_iter(content).all(|img| ALT.is_match(img.as_str())),
        title_length_ok: in_range(draft.title.trim().chars().count(), TITLE_LENGTH),
        excerpt_length_ok: in_range(draft.excerpt.trim().chars().count(), EXCERPT_LENGTH),
        word_count: words,
        length_grade,
        keyphrase_density,
        passed: 0,
        total: TOTAL_CHECKS,
        score: 0,
    };

    let passed = report.checks().iter().filter(|(_, ok)| *ok).count();
    report.passed = passed;
    report.score = u8::try_from((passed * 100 + TOTAL_CHECKS / 2) / TOTAL_CHECKS).unwrap_or(100);
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAIN: &str = "jesseaeisenbalm.com";

    fn words(n: usize, word: &str) -> String {
        vec![word; n].join(" ")
    }

    fn draft(title: &str, content: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            slug: slugify(title),
            excerpt: String::new(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_keyphrase_in_title() {
        let report = analyze(&draft("Why Lip Balm Matters", ""), "lip balm", DOMAIN);
        assert!(report.keyphrase_in_title);
        assert!(report.keyphrase_in_slug);

        let report = analyze(&draft("Why Rituals Matter", ""), "lip balm", DOMAIN);
        assert!(!report.keyphrase_in_title);
        assert!(!report.keyphrase_in_slug);
    }

    #[test]
    fn test_word_count_thresholds() {
        let short = format!("<p>{}</p>", words(250, "balm"));
        let report = analyze(&draft("t", &short), "balm", DOMAIN);
        assert_eq!(report.word_count, 250);
        assert!(!report.word_count_ok);
        assert!(!report.word_count_good);
        assert_eq!(report.length_grade, LengthGrade::Poor);

        let enough = format!("<p>{}</p>", words(300, "balm"));
        let report = analyze(&draft("t", &enough), "balm", DOMAIN);
        assert!(report.word_count_ok);
        assert!(!report.word_count_good);

        let long = format!("<p>{}</p>", words(900, "balm"));
        let report = analyze(&draft("t", &long), "balm", DOMAIN);
        assert!(report.word_count_ok);
        assert!(report.word_count_good);
        assert_eq!(report.length_grade, LengthGrade::Good);
    }

    #[test]
    fn test_word_count_ignores_markup() {
        assert_eq!(word_count("<h2>Two words</h2><p>three <b>more</b> words</p>"), 5);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_keyphrase_density_bounds() {
        // 2 mentions in 200 words = 1%
        let content = format!("<p>balm {} balm</p>", words(198, "human"));
        let report = analyze(&draft("t", &content), "balm", DOMAIN);
        assert!((report.keyphrase_density - 1.0).abs() < 1e-9);
        assert!(report.keyphrase_density_ok);

        // 1 mention in 400 words = 0.25%
        let content = format!("<p>balm {}</p>", words(399, "human"));
        let report = analyze(&draft("t", &content), "balm", DOMAIN);
        assert!(!report.keyphrase_density_ok);

        // every word = 100%
        let content = format!("<p>{}</p>", words(50, "balm"));
        let report = analyze(&draft("t", &content), "balm", DOMAIN);
        assert!(!report.keyphrase_density_ok);
    }

    #[test]
    fn test_keyphrase_with_punctuation_ends() {
        // 2 mentions in 100 words = 2%
        let content = format!("<p>c++ {} c++.</p>", words(98, "code"));
        let report = analyze(&draft("Learning C++", &content), "c++", DOMAIN);
        assert!(report.keyphrase_in_title);
        assert!((report.keyphrase_density - 2.0).abs() < 1e-9);

        assert_eq!(occurrences("Try lip balm. Then more lip balm.", "lip balm."), 2);
        assert_eq!(occurrences("balmy balm", "balm"), 1);
    }

    #[test]
    fn test_first_paragraph_and_subheadings() {
        let content = "<p>Our lip balm is made of beeswax.</p>\
                       <h2>The Lip Balm Ritual</h2><p>Stop. Breathe.</p>";
        let report = analyze(&draft("t", content), "lip balm", DOMAIN);
        assert!(report.keyphrase_in_first_paragraph);
        assert!(report.keyphrase_in_subheading);
        assert!(report.has_subheadings);

        let content = "<p>Beeswax first.</p><h1>Lip balm</h1><p>lip balm later</p>";
        let report = analyze(&draft("t", content), "lip balm", DOMAIN);
        assert!(!report.keyphrase_in_first_paragraph);
        assert!(!report.keyphrase_in_subheading);
        assert!(!report.has_subheadings);
    }

    #[test]
    fn test_links() {
        let content = r#"<p><a href="/about">About</a></p>"#;
        let report = analyze(&draft("t", content), "", DOMAIN);
        assert!(report.has_internal_link);
        assert!(!report.has_external_link);

        let content = r#"<p><a class="x" href="https://jesseaeisenbalm.com/faq">FAQ</a>
                         <a href='https://en.wikipedia.org/wiki/Beeswax'>wax</a></p>"#;
        let report = analyze(&draft("t", content), "", DOMAIN);
        assert!(report.has_internal_link);
        assert!(report.has_external_link);

        let content = r##"<p><a href="#top">top</a><a href="mailto:a@b.c">mail</a></p>"##;
        let report = analyze(&draft("t", content), "", DOMAIN);
        assert!(!report.has_internal_link);
        assert!(!report.has_external_link);
    }

    #[test]
    fn test_images_need_alt_text() {
        let report = analyze(&draft("t", "<p>no images</p>"), "", DOMAIN);
        assert!(report.images_have_alt);

        let content = r#"<img src="/a.png" alt="A tube of balm"><img src="/b.png" alt='b'>"#;
        assert!(analyze(&draft("t", content), "", DOMAIN).images_have_alt);

        let content = r#"<img src="/a.png" alt="A tube"><img src="/b.png">"#;
        assert!(!analyze(&draft("t", content), "", DOMAIN).images_have_alt);

        let content = r#"<img src="/a.png" alt="">"#;
        assert!(!analyze(&draft("t", content), "", DOMAIN).images_have_alt);
    }

    #[test]
    fn test_title_and_excerpt_length() {
        let mut d = draft(&"x".repeat(55), "");
        d.excerpt = "y".repeat(155);
        let report = analyze(&d, "", DOMAIN);
        assert!(report.title_length_ok);
        assert!(report.excerpt_length_ok);

        let mut d = draft(&"x".repeat(61), "");
        d.excerpt = "y".repeat(149);
        let report = analyze(&d, "", DOMAIN);
        assert!(!report.title_length_ok);
        assert!(!report.excerpt_length_ok);
    }

    #[test]
    fn test_empty_keyphrase_fails_keyphrase_checks() {
        let report = analyze(&draft("Lip Balm", "<p>Lip balm</p>"), "  ", DOMAIN);
        assert!(!report.keyphrase_in_title);
        assert!(!report.keyphrase_in_slug);
        assert!(!report.keyphrase_in_first_paragraph);
        assert!(!report.keyphrase_density_ok);
    }

    #[test]
    fn test_score_counts_passed_checks() {
        let report = analyze(&PostDraft::default(), "balm", DOMAIN);
        // Only the vacuous image check passes on an empty draft.
        assert_eq!(report.passed, 1);
        assert_eq!(report.total, TOTAL_CHECKS);
        assert_eq!(report.score, 8);

        let title = "Lip Balm for Humans: Why a Daily Ritual Still Matters";
        let excerpt = format!("Lip balm {}", "z".repeat(146));
        let body = format!(
            "<p>Lip balm is a ritual. {}</p><h2>The lip balm habit</h2>\
             <p><a href=\"/about\">about</a> <a href=\"https://example.org\">src</a> \
             <img src=\"/x.png\" alt=\"tube\"> lip balm {}</p>",
            words(500, "human"),
            words(500, "mortal"),
        );
        let d = PostDraft {
            title: title.to_string(),
            slug: slugify(title),
            excerpt,
            content: body,
        };
        let report = analyze(&d, "lip balm", DOMAIN);
        assert_eq!(report.passed, TOTAL_CHECKS, "{:?}", report.checks());
        assert_eq!(report.score, 100);
    }
}
