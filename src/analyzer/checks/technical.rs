//! Technical checks: status codes, transport, mobile and indexing directives

use super::evidence;
use crate::analyzer::{Category, Check, CheckError, Effort, FindingDraft, Severity};
use crate::crawler::StatusClass;
use crate::storage::Page;
use serde_json::json;
use url::Url;

/// Flags pages that did not answer 2xx
pub struct HttpStatusCheck;

impl Check for HttpStatusCheck {
    fn code(&self) -> &'static str {
        "technical.http_status_code"
    }

    fn category(&self) -> Category {
        Category::Technical
    }

    fn severity(&self) -> Severity {
        Severity::Critical
    }

    fn title(&self) -> &'static str {
        "HTTP Status Code Issue"
    }

    fn description(&self) -> &'static str {
        "Page returns a non-200 HTTP status code that may impact SEO"
    }

    fn recommendation(&self) -> &'static str {
        "Ensure important pages return 200 OK. Fix redirects, client errors and server errors as appropriate."
    }

    fn effort(&self) -> Effort {
        Effort::Medium
    }

    fn impact_score(&self) -> f64 {
        10.0
    }

    fn is_applicable(&self, _page: &Page) -> bool {
        true
    }

    fn run(&self, page: &Page) -> Result<Option<FindingDraft>, CheckError> {
        let status = page.status_code;
        let kind = match page.status_class() {
            StatusClass::Success => return Ok(None),
            StatusClass::Redirect => "a redirect",
            StatusClass::ClientError => "a client error",
            StatusClass::ServerError => "a server error",
            StatusClass::Other => "an unexpected",
        };

        let finding = self
            .finding(evidence(json!({ "status_code": status, "url": page.url })))
            .with_description(format!("Page returns {} status code ({})", kind, status));
        Ok(Some(finding))
    }
}

/// Flags pages served over plain http
pub struct HttpsCheck;

impl Check for HttpsCheck {
    fn code(&self) -> &'static str {
        "technical.https"
    }

    fn category(&self) -> Category {
        Category::Technical
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn title(&self) -> &'static str {
        "Page Not Served Over HTTPS"
    }

    fn description(&self) -> &'static str {
        "Page is served without TLS, which browsers flag as insecure and search engines rank lower"
    }

    fn recommendation(&self) -> &'static str {
        "Serve every page over HTTPS and permanently redirect http:// URLs to their https:// equivalents."
    }

    fn effort(&self) -> Effort {
        Effort::Medium
    }

    fn impact_score(&self) -> f64 {
        8.0
    }

    fn is_applicable(&self, _page: &Page) -> bool {
        true
    }

    fn run(&self, page: &Page) -> Result<Option<FindingDraft>, CheckError> {
        let url = Url::parse(&page.url).map_err(|e| CheckError::new(self.code(), e.to_string()))?;
        if url.scheme() == "https" {
            return Ok(None);
        }

        Ok(Some(self.finding(evidence(json!({
            "url": page.url,
            "scheme": url.scheme(),
        })))))
    }
}

/// Flags HTML pages without a responsive viewport
pub struct MobileFriendlyCheck;

impl Check for MobileFriendlyCheck {
    fn code(&self) -> &'static str {
        "technical.mobile_friendly"
    }

    fn category(&self) -> Category {
        Category::Technical
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn title(&self) -> &'static str {
        "Mobile-Friendly Issues"
    }

    fn description(&self) -> &'static str {
        "Page may not be mobile-friendly, which impacts mobile search rankings"
    }

    fn recommendation(&self) -> &'static str {
        "Add a responsive viewport meta tag (width=device-width, initial-scale=1) and make sure the layout adapts to small screens."
    }

    fn effort(&self) -> Effort {
        Effort::Medium
    }

    fn impact_score(&self) -> f64 {
        6.0
    }

    fn run(&self, page: &Page) -> Result<Option<FindingDraft>, CheckError> {
        let viewport = page.facts.viewport.as_deref();
        let responsive = viewport.is_some_and(|content| {
            content
                .to_lowercase()
                .replace(' ', "")
                .contains("width=device-width")
        });
        if responsive {
            return Ok(None);
        }

        let issue = if viewport.is_none() {
            "missing_viewport"
        } else {
            "non_responsive_viewport"
        };
        Ok(Some(self.finding(evidence(json!({
            "url": page.url,
            "viewport": viewport,
            "issue": issue,
        })))))
    }
}

/// Flags pages asking search engines not to index or follow them
pub struct RobotsDirectivesCheck;

impl Check for RobotsDirectivesCheck {
    fn code(&self) -> &'static str {
        "technical.robots_directives"
    }

    fn category(&self) -> Category {
        Category::Technical
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn title(&self) -> &'static str {
        "Robots Directives Blocking Indexing"
    }

    fn description(&self) -> &'static str {
        "Page has robots directives that prevent search engine indexing"
    }

    fn recommendation(&self) -> &'static str {
        "Remove noindex/nofollow from the robots meta tag and X-Robots-Tag header unless the page should stay out of search results."
    }

    fn effort(&self) -> Effort {
        Effort::Small
    }

    fn impact_score(&self) -> f64 {
        8.0
    }

    fn run(&self, page: &Page) -> Result<Option<FindingDraft>, CheckError> {
        let blocking: Vec<&str> = ["noindex", "nofollow"]
            .into_iter()
            .filter(|d| page.has_robots_directive(d))
            .collect();
        if blocking.is_empty() {
            return Ok(None);
        }

        Ok(Some(self.finding(evidence(json!({
            "url": page.url,
            "robots_directives": page.robots_directives,
            "blocking_directives": blocking,
        })))))
    }
}
