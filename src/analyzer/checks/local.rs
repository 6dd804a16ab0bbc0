//! Local SEO checks

use super::evidence;
use crate::analyzer::{Category, Check, CheckError, Effort, FindingDraft, Severity};
use crate::storage::Page;
use serde_json::json;

/// `LocalBusiness` and the subtypes accepted in its place
const LOCAL_BUSINESS_TYPES: [&str; 4] = [
    "LocalBusiness",
    "LegalService",
    "Attorney",
    "ProfessionalService",
];

/// Flags pages without LocalBusiness structured data
pub struct LocalBusinessSchemaCheck;

impl Check for LocalBusinessSchemaCheck {
    fn code(&self) -> &'static str {
        "local.business_schema"
    }

    fn category(&self) -> Category {
        Category::Local
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn title(&self) -> &'static str {
        "Local Business Schema Missing"
    }

    fn description(&self) -> &'static str {
        "Page is missing LocalBusiness schema markup for local SEO"
    }

    fn recommendation(&self) -> &'static str {
        "Add LocalBusiness JSON-LD with the business name, address, phone number and opening hours."
    }

    fn effort(&self) -> Effort {
        Effort::Medium
    }

    fn impact_score(&self) -> f64 {
        8.0
    }

    fn run(&self, page: &Page) -> Result<Option<FindingDraft>, CheckError> {
        let types = &page.facts.structured_data_types;
        let found = types.iter().any(|t| {
            let name = t.rsplit('/').next().unwrap_or(t);
            LOCAL_BUSINESS_TYPES.contains(&name)
        });
        if found {
            return Ok(None);
        }

        Ok(Some(self.finding(evidence(json!({
            "url": page.url,
            "schema_types_found": types,
        })))))
    }
}
