//! Element summaries for HTML documents, as produced by the command-line tool.

use crate::base::{HandlerContext, OutputSettings};
use crate::dom::{DomElement, HtmlScope};
use crate::errors::Result;
use crate::types::{Selector, Strategy};
use crate::walker::{self, WalkConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkReport {
    pub strategy: Strategy,
    pub generated_at: DateTime<Utc>,
    pub selectors: Vec<String>,
    pub results: Vec<Value>,
}

impl WalkReport {
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

pub fn summarize(element: &DomElement, selector: &Selector, output: &OutputSettings) -> Value {
    let mut summary = json!({
        "selector": selector.as_str(),
        "index": element.index,
        "tag": element.tag_name,
        "css_selector": element.css_selector,
        "description": element.describe(),
    });
    if let Some(id) = &element.element_id {
        summary["id"] = json!(id);
    }
    if output.include_text {
        if let Some(text) = element.text_truncated(output.max_text_length) {
            summary["text"] = json!(text);
        }
    }
    summary
}

/// Configuration that summarizes every match of each selector.
pub fn summary_config<I, T>(
    scope: HtmlScope,
    selectors: I,
    output: &OutputSettings,
) -> WalkConfig<HtmlScope, Value>
where
    I: IntoIterator<Item = T>,
    T: Into<Selector>,
{
    selectors
        .into_iter()
        .fold(WalkConfig::new().with_scope(scope), |config, selector| {
            let output = output.clone();
            config.on(selector, move |ctx: &HandlerContext<HtmlScope, Value>| {
                Ok(summarize(&ctx.element, &ctx.selector, &output))
            })
        })
}

pub async fn build_report(
    strategy: Strategy,
    scope: HtmlScope,
    selectors: &[String],
    output: &OutputSettings,
) -> Result<WalkReport> {
    let config = summary_config(scope, selectors.iter().map(String::as_str), output);
    let results = walker::run(strategy, config).await?;

    Ok(WalkReport {
        strategy,
        generated_at: Utc::now(),
        selectors: selectors.to_vec(),
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<body>
        <h1 id="title">Release notes</h1>
        <p class="note">First note with a fairly long body</p>
        <p class="note">Second</p>
    </body>"#;

    #[tokio::test]
    async fn report_lists_matches_per_selector() {
        let output = OutputSettings {
            max_text_length: 5,
            ..OutputSettings::default()
        };
        let selectors = vec!["p.note".to_string(), "h1".to_string()];

        let scope = HtmlScope::new(PAGE);

        let report = build_report(Strategy::Concurrent, scope, &selectors, &output)
            .await
            .unwrap();

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.results[0]["selector"], "p.note");
        assert_eq!(report.results[0]["text"], "First");
        assert_eq!(report.results[1]["index"], 1);
        assert_eq!(report.results[2]["id"], "title");
        assert_eq!(report.results[2]["css_selector"], "h1#title");
    }

    #[tokio::test]
    async fn text_can_be_left_out() {
        let output = OutputSettings {
            include_text: false,
            ..OutputSettings::default()
        };
        let selectors = vec!["h1".to_string()];

        let scope = HtmlScope::new(PAGE);

        let report = build_report(Strategy::Sequential, scope, &selectors, &output)
            .await
            .unwrap();

        assert!(report.results[0].get("text").is_none());
        let json = report.to_json(false).unwrap();
        assert!(json.contains("\"strategy\":\"sequential\""));
    }

    #[tokio::test]
    async fn invalid_selector_fails_the_report() {
        let selectors = vec!["p[".to_string()];
        let result = build_report(
            Strategy::Sequential,
            HtmlScope::new(PAGE),
            &selectors,
            &OutputSettings::default(),
        )
        .await;

        assert!(result.is_err());
    }
}
