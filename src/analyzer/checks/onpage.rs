//! On-page checks: title, meta description, headings, image alt text

use super::evidence;
use crate::analyzer::{Category, Check, CheckError, Effort, FindingDraft, Severity};
use crate::storage::Page;
use serde_json::json;

const TITLE_MIN: usize = 30;
const TITLE_MAX: usize = 60;
const META_DESCRIPTION_MIN: usize = 120;
const META_DESCRIPTION_MAX: usize = 160;

/// Classifies a text length against an inclusive range
fn length_issue(len: usize, min: usize, max: usize) -> Option<&'static str> {
    if len < min {
        Some("too_short")
    } else if len > max {
        Some("too_long")
    } else {
        None
    }
}

pub struct TitleTagCheck;

impl Check for TitleTagCheck {
    fn code(&self) -> &'static str {
        "onpage.title_tag"
    }

    fn category(&self) -> Category {
        Category::OnPage
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn title(&self) -> &'static str {
        "Title Tag Issues"
    }

    fn description(&self) -> &'static str {
        "Page has title tag issues that impact SEO performance"
    }

    fn recommendation(&self) -> &'static str {
        "Add a unique, descriptive title between 30 and 60 characters that names the page topic and target keywords."
    }

    fn effort(&self) -> Effort {
        Effort::Small
    }

    fn impact_score(&self) -> f64 {
        10.0
    }

    fn run(&self, page: &Page) -> Result<Option<FindingDraft>, CheckError> {
        let Some(title) = page.title.as_deref().filter(|t| !t.trim().is_empty()) else {
            return Ok(Some(self.finding(evidence(json!({
                "url": page.url,
                "issue": "missing_title",
            })))));
        };

        let length = title.chars().count();
        Ok(length_issue(length, TITLE_MIN, TITLE_MAX).map(|issue| {
            self.finding(evidence(json!({
                "url": page.url,
                "title": title,
                "title_length": length,
                "issue": issue,
            })))
        }))
    }
}

pub struct MetaDescriptionCheck;

impl Check for MetaDescriptionCheck {
    fn code(&self) -> &'static str {
        "onpage.meta_description"
    }

    fn category(&self) -> Category {
        Category::OnPage
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn title(&self) -> &'static str {
        "Meta Description Issues"
    }

    fn description(&self) -> &'static str {
        "Page has meta description issues that may impact click-through rates"
    }

    fn recommendation(&self) -> &'static str {
        "Write a compelling meta description between 120 and 160 characters that summarizes the page and invites the click."
    }

    fn effort(&self) -> Effort {
        Effort::Small
    }

    fn impact_score(&self) -> f64 {
        6.0
    }

    fn run(&self, page: &Page) -> Result<Option<FindingDraft>, CheckError> {
        let Some(description) = page
            .meta_description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
        else {
            return Ok(Some(self.finding(evidence(json!({
                "url": page.url,
                "issue": "missing_meta_description",
            })))));
        };

        let length = description.chars().count();
        Ok(
            length_issue(length, META_DESCRIPTION_MIN, META_DESCRIPTION_MAX).map(|issue| {
                self.finding(evidence(json!({
                    "url": page.url,
                    "meta_description": description,
                    "description_length": length,
                    "issue": issue,
                })))
            }),
        )
    }
}

pub struct H1TagCheck;

impl Check for H1TagCheck {
    fn code(&self) -> &'static str {
        "onpage.h1_tag"
    }

    fn category(&self) -> Category {
        Category::OnPage
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn title(&self) -> &'static str {
        "H1 Tag Issues"
    }

    fn description(&self) -> &'static str {
        "Page has H1 tag issues that impact SEO structure"
    }

    fn recommendation(&self) -> &'static str {
        "Use exactly one descriptive H1 that states what the page is about."
    }

    fn effort(&self) -> Effort {
        Effort::Small
    }

    fn impact_score(&self) -> f64 {
        6.0
    }

    fn run(&self, page: &Page) -> Result<Option<FindingDraft>, CheckError> {
        let h1 = &page.facts.h1;
        let issue = match h1.len() {
            0 => "missing_h1",
            1 => return Ok(None),
            _ => "multiple_h1",
        };

        Ok(Some(self.finding(evidence(json!({
            "url": page.url,
            "issue": issue,
            "h1_count": h1.len(),
            "h1": h1,
        })))))
    }
}

/// Flags pages where most images have no `alt` attribute
///
/// An empty `alt=""` marks a decorative image and counts as present.
pub struct ImageAltTextCheck;

impl Check for ImageAltTextCheck {
    fn code(&self) -> &'static str {
        "onpage.image_alt_text"
    }

    fn category(&self) -> Category {
        Category::OnPage
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn title(&self) -> &'static str {
        "Image Alt Text Issues"
    }

    fn description(&self) -> &'static str {
        "Images are missing alt text, which impacts accessibility and SEO"
    }

    fn recommendation(&self) -> &'static str {
        "Add descriptive alt text to content images and alt=\"\" to purely decorative ones."
    }

    fn effort(&self) -> Effort {
        Effort::Medium
    }

    fn impact_score(&self) -> f64 {
        5.0
    }

    fn is_applicable(&self, page: &Page) -> bool {
        page.is_html() && page.facts.image_count > 0
    }

    fn run(&self, page: &Page) -> Result<Option<FindingDraft>, CheckError> {
        let total = page.facts.image_count;
        let missing = page.facts.images_missing_alt;
        if total == 0 {
            return Ok(None);
        }
        if missing > total {
            return Err(CheckError::new(
                self.code(),
                format!("{} images missing alt out of {}", missing, total),
            ));
        }

        let percentage = f64::from(missing) / f64::from(total) * 100.0;
        if percentage <= 50.0 {
            return Ok(None);
        }

        Ok(Some(self.finding(evidence(json!({
            "url": page.url,
            "total_images": total,
            "missing_alt_count": missing,
            "missing_alt_percentage": (percentage * 100.0).round() / 100.0,
        })))))
    }
}
