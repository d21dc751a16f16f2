//! Browsing stored call records.

use console_core::{CallRecord, Mode, UserProfile};
use serde::Deserialize;

/// Filter for [`list_calls`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CallFilter {
    /// Sentiment label to keep, or `all`. Case-insensitive.
    pub sentiment: Option<String>,
    /// Text the transcript must contain. Case-insensitive.
    #[serde(alias = "q")]
    pub query: Option<String>,
}

impl CallFilter {
    fn matches(&self, record: &CallRecord) -> bool {
        let sentiment_ok = match self.sentiment.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(wanted) if wanted.eq_ignore_ascii_case("all") => true,
            Some(wanted) => record
                .sentiment()
                .is_some_and(|s| s.eq_ignore_ascii_case(wanted)),
        };

        let query_ok = match self.query.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => record
                .transcript
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(&query.to_lowercase())),
        };

        sentiment_ok && query_ok
    }
}

/// A mode's stored calls matching `filter`, newest first.
pub fn list_calls<'a>(profile: &'a UserProfile, mode: Mode, filter: &CallFilter) -> Vec<&'a CallRecord> {
    let mut calls: Vec<&CallRecord> = profile
        .calls(mode)
        .values()
        .filter(|record| filter.matches(record))
        .collect();
    calls.sort_by(|a, b| b.start_timestamp.cmp(&a.start_timestamp));
    calls
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_core::CallAnalysis;

    fn record(id: &str, start: Option<i64>, sentiment: &str, transcript: &str) -> CallRecord {
        CallRecord {
            call_id: id.to_string(),
            start_timestamp: start,
            transcript: Some(transcript.to_string()),
            call_analysis: Some(CallAnalysis {
                user_sentiment: Some(sentiment.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn profile() -> UserProfile {
        let mut profile = UserProfile::new("owner-1");
        let calls = &mut profile.analytics.customer;
        for r in [
            record("a", Some(100), "Positive", "Booked a table for four"),
            record("b", Some(300), "Negative", "Asked about GLUTEN free pasta"),
            record("c", None, "Neutral", "Hung up"),
            record("d", Some(200), "positive", "Gluten question"),
        ] {
            calls.insert(r.call_id.clone(), r);
        }
        profile
    }

    fn ids(records: Vec<&CallRecord>) -> Vec<&str> {
        records.into_iter().map(|r| r.call_id.as_str()).collect()
    }

    #[test]
    fn test_newest_first() {
        let profile = profile();
        let all = list_calls(&profile, Mode::Customer, &CallFilter::default());
        assert_eq!(ids(all), vec!["b", "d", "a", "c"]);
        assert!(list_calls(&profile, Mode::Sales, &CallFilter::default()).is_empty());
    }

    #[test]
    fn test_filters_are_case_insensitive() {
        let profile = profile();

        let positive = CallFilter {
            sentiment: Some("POSITIVE".to_string()),
            query: None,
        };
        assert_eq!(ids(list_calls(&profile, Mode::Customer, &positive)), vec!["d", "a"]);

        let gluten = CallFilter {
            sentiment: Some("all".to_string()),
            query: Some("gluten".to_string()),
        };
        assert_eq!(ids(list_calls(&profile, Mode::Customer, &gluten)), vec!["b", "d"]);
    }
}
