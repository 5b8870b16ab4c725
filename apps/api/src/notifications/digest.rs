//! Digest rendering — one email listing a student's newly matched postings.

use askama::Template;

use crate::models::{JobPosting, Profile};

/// Postings enumerated in one digest; the rest are summarized as an overflow count.
pub const MAX_DIGEST_ITEMS: usize = 5;
const EXCERPT_CHARS: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub html: String,
}

/// Askama template for the digest email body. All interpolations are HTML-escaped.
#[derive(Template)]
#[template(source = r#"<div style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 600px; margin: 0 auto;">
  <h1 style="color: #1a1a1a;">New Job Matches for You!</h1>
  <p style="color: #666;">Hi {{ name }},</p>
  <p style="color: #666;">We found {{ count }} new job{{ plural }} matching your interests:</p>
  {% for card in cards %}
  <div style="margin-bottom: 20px; padding: 15px; background: #f8f9fa; border-radius: 8px;">
    <h3 style="margin: 0 0 8px 0;"><a href="{{ card.link }}" style="color: #1a1a1a;">{{ card.title }}</a></h3>
    <p style="margin: 0 0 8px 0; color: #666;">{{ card.employer }}{% if let Some(location) = card.location %} &bull; {{ location }}{% endif %}</p>
    <p style="margin: 0; color: #444; font-size: 14px;">{{ card.excerpt }}</p>
  </div>
  {% endfor %}
  {% if overflow > 0 %}
  <p style="color: #666;">...and {{ overflow }} more!</p>
  {% endif %}
  <a href="{{ base }}/jobs" style="display: inline-block; padding: 12px 24px; background: #6366f1; color: white; text-decoration: none; border-radius: 6px; margin-top: 20px;">View All Jobs</a>
  <p style="color: #999; font-size: 12px; margin-top: 30px;">
    You're receiving this because you have job notifications enabled.
    <a href="{{ base }}/settings" style="color: #6366f1;">Manage preferences</a>
  </p>
</div>"#, ext = "html")]
struct DigestTemplate<'a> {
    name: &'a str,
    count: usize,
    plural: &'a str,
    cards: Vec<DigestCard<'a>>,
    overflow: usize,
    base: &'a str,
}

struct DigestCard<'a> {
    link: String,
    title: &'a str,
    employer: &'a str,
    location: Option<&'a str>,
    excerpt: String,
}

impl<'a> DigestCard<'a> {
    fn new(posting: &'a JobPosting, app_base_url: &str) -> Self {
        Self {
            link: posting_link(posting, app_base_url),
            title: &posting.title,
            employer: &posting.employer_name,
            location: posting.location.as_deref(),
            excerpt: excerpt(&posting.description),
        }
    }
}

/// Renders the digest for `postings`, which must be non-empty and newest first.
pub fn render_digest(
    profile: &Profile,
    postings: &[JobPosting],
    app_base_url: &str,
) -> Result<Digest, askama::Error> {
    let count = postings.len();
    let plural = if count > 1 { "s" } else { "" };

    let template = DigestTemplate {
        name: profile.display_name(),
        count,
        plural,
        cards: postings
            .iter()
            .take(MAX_DIGEST_ITEMS)
            .map(|p| DigestCard::new(p, app_base_url))
            .collect(),
        overflow: count.saturating_sub(MAX_DIGEST_ITEMS),
        base: app_base_url,
    };

    Ok(Digest {
        subject: format!("{count} New Job{plural} Matching Your Profile"),
        html: template.render()?,
    })
}

/// External postings link out only over http(s); anything else gets the in-app page.
fn posting_link(posting: &JobPosting, app_base_url: &str) -> String {
    match posting.external_url.as_deref().map(str::trim) {
        Some(url) if is_web_url(url) => url.to_string(),
        _ => format!("{app_base_url}/jobs/{}", posting.id),
    }
}

fn is_web_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

/// First `EXCERPT_CHARS` characters followed by an ellipsis.
fn excerpt(text: &str) -> String {
    let mut out: String = text.chars().take(EXCERPT_CHARS).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{posting, profile};

    const BASE: &str = "https://jobs.example.com";

    #[test]
    fn test_single_posting_subject_is_singular() {
        let digest = render_digest(
            &profile(Some("Biology"), None, None),
            &[posting("Lab Assistant", "Pipetting", 0)],
            BASE,
        )
        .unwrap();
        assert_eq!(digest.subject, "1 New Job Matching Your Profile");
        assert!(digest.html.contains("We found 1 new job matching"));
        assert!(digest.html.contains("Lab Assistant"));
        assert!(!digest.html.contains("more!"));
    }

    #[test]
    fn test_caps_listed_postings_and_notes_overflow() {
        let postings: Vec<_> = (0..7)
            .map(|i| posting(&format!("Role {i}"), "desc", i))
            .collect();
        let digest = render_digest(&profile(Some("Biology"), None, None), &postings, BASE).unwrap();

        assert_eq!(digest.subject, "7 New Jobs Matching Your Profile");
        assert!(digest.html.contains("Role 4"));
        assert!(!digest.html.contains("Role 5"));
        assert!(digest.html.contains("...and 2 more!"));
    }

    #[test]
    fn test_excerpt_counts_characters_not_bytes() {
        let long = "é".repeat(200);
        let e = excerpt(&long);
        assert_eq!(e.chars().count(), EXCERPT_CHARS + 3);
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut student = profile(Some("Biology"), None, None);
        student.full_name = "<script>alert(1)</script>".to_string();
        let digest = render_digest(
            &student,
            &[posting("R&D <Intern>", "Lab \"work\"", 0)],
            BASE,
        )
        .unwrap();

        assert!(!digest.html.contains("<script>"));
        assert!(digest.html.contains("Hi &lt;script&gt;"));
        assert!(digest.html.contains("R&amp;D &lt;Intern&gt;"));
        assert!(digest.html.contains("Lab &quot;work&quot;"));
    }

    #[test]
    fn test_external_postings_link_out() {
        let mut job = posting("Analyst", "Numbers", 0);
        job.external_url = Some("https://careers.example.org/123".to_string());
        let internal = posting("Clerk", "Filing", 1);

        let digest = render_digest(
            &profile(Some("Finance"), None, None),
            &[job, internal.clone()],
            BASE,
        )
        .unwrap();
        assert!(digest.html.contains("https://careers.example.org/123"));
        assert!(digest.html.contains(&format!("{BASE}/jobs/{}", internal.id)));
        assert!(digest.html.contains(&format!("{BASE}/settings")));
    }

    #[test]
    fn test_non_web_external_url_falls_back_to_app_link() {
        let mut job = posting("Analyst", "Numbers", 0);
        job.external_url = Some("javascript:alert(1)".to_string());
        let mut upper = posting("Clerk", "Filing", 1);
        upper.external_url = Some("HTTPS://careers.example.org/9".to_string());

        let digest = render_digest(
            &profile(Some("Finance"), None, None),
            &[job.clone(), upper],
            BASE,
        )
        .unwrap();

        assert!(!digest.html.contains("javascript:"));
        assert!(digest.html.contains(&format!("{BASE}/jobs/{}", job.id)));
        assert!(digest.html.contains("HTTPS://careers.example.org/9"));
    }

    #[test]
    fn test_location_follows_employer() {
        let mut job = posting("Analyst", "Numbers", 0);
        job.location = Some("Lagos".to_string());
        let digest = render_digest(&profile(Some("Finance"), None, None), &[job], BASE).unwrap();

        assert!(digest.html.contains("Acme &bull; Lagos"));
    }
}
