//! Statistics derived from the pages of a crawl

use crate::crawler::resource::StatusClass;
use crate::storage::Page;
use serde::Serialize;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrawlStats {
    pub total_pages: u64,

    /// Pages by status family
    pub status_2xx: u64,
    pub status_3xx: u64,
    pub status_4xx: u64,
    pub status_5xx: u64,
    pub status_other: u64,

    pub indexable: u64,
    pub non_indexable: u64,

    /// Sum of response times (seconds)
    pub total_response_time: f64,
    /// Mean response time (seconds); 0 when there are no pages
    pub avg_response_time: f64,

    /// Sum of body lengths (bytes)
    pub total_content_length: u64,
    /// Mean body length (bytes); 0 when there are no pages
    pub avg_content_length: f64,
}

/// Computes statistics over a set of pages
pub fn get_crawl_stats(pages: &[Page]) -> CrawlStats {
    let mut stats = CrawlStats {
        total_pages: pages.len() as u64,
        ..Default::default()
    };

    for page in pages {
        match page.status_class() {
            StatusClass::Success => stats.status_2xx += 1,
            StatusClass::Redirect => stats.status_3xx += 1,
            StatusClass::ClientError => stats.status_4xx += 1,
            StatusClass::ServerError => stats.status_5xx += 1,
            StatusClass::Other => stats.status_other += 1,
        }

        if page.is_indexable {
            stats.indexable += 1;
        } else {
            stats.non_indexable += 1;
        }

        stats.total_response_time += page.response_time;
        stats.total_content_length += page.content_length;
    }

    if !pages.is_empty() {
        let count = pages.len() as f64;
        stats.avg_response_time = stats.total_response_time / count;
        stats.avg_content_length = stats.total_content_length as f64 / count;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::NewPage;
    use chrono::Utc;

    fn page(status_code: u16, indexable: bool, response_time: f64, length: u64) -> Page {
        let new_page = NewPage {
            run_id: 1,
            url: format!("https://ex.com/{}", status_code),
            status_code,
            content_type: "text/html".to_string(),
            content_length: length,
            response_time,
            is_indexable: indexable,
            ..Default::default()
        };
        Page::from_new(1, new_page, Utc::now())
    }

    #[test]
    fn test_empty_page_set() {
        let stats = get_crawl_stats(&[]);
        assert_eq!(stats.total_pages, 0);
        assert_eq!(stats.avg_response_time, 0.0);
        assert_eq!(stats.avg_content_length, 0.0);
    }

    #[test]
    fn test_counts_and_averages() {
        let pages = vec![
            page(200, true, 0.5, 1000),
            page(200, false, 1.5, 3000),
            page(301, false, 0.1, 0),
            page(404, false, 0.2, 200),
            page(503, false, 0.2, 0),
        ];
        let stats = get_crawl_stats(&pages);

        assert_eq!(stats.total_pages, 5);
        assert_eq!(stats.status_2xx, 2);
        assert_eq!(stats.status_3xx, 1);
        assert_eq!(stats.status_4xx, 1);
        assert_eq!(stats.status_5xx, 1);
        assert_eq!(stats.status_other, 0);
        assert_eq!(stats.indexable, 1);
        assert_eq!(stats.non_indexable, 4);
        assert_eq!(stats.total_content_length, 4200);
        assert!((stats.avg_response_time - 0.5).abs() < 1e-9);
        assert!((stats.avg_content_length - 840.0).abs() < 1e-9);
    }
}
