//! Terminal rendering of capability results

use crate::envelope::{
    Analysis, Envelope, Failure, NewsDigest, NewsReport, PriceChange, PriceMovement, Quote,
    TickerMatch,
};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

/// Longest summary shown in a news table cell
const SUMMARY_WIDTH: usize = 160;

/// Human-readable form of a payload
pub trait Render {
    fn render(&self) -> String;
}

/// Render either side of an envelope
pub fn render_envelope<T: Render>(envelope: &Envelope<T>) -> String {
    match envelope {
        Envelope::Success(payload) => payload.render(),
        Envelope::Error(failure) => render_failure(failure),
    }
}

pub fn render_failure(failure: &Failure) -> String {
    let mut out = format!("Error: {}", failure.error_message);
    if let Some(detail) = &failure.detail {
        out.push_str(&format!("\n  detail: {detail}"));
    }
    for cause in &failure.causes {
        out.push_str(&format!("\n  caused by: {}", cause.error_message));
    }
    out
}

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

fn movement_rows(table: &mut Table, m: &PriceMovement) {
    table
        .add_row(vec![m.latest_date.to_string(), format!("{:.4}", m.latest_price)])
        .add_row(vec![m.previous_date.to_string(), format!("{:.4}", m.previous_price)])
        .add_row(vec!["change".to_string(), format!("{:+.4}", m.price_change)]);
}

fn news_table(digest: &NewsDigest) -> Table {
    let mut t = table(&["published", "source", "sentiment", "title", "summary"]);
    for item in &digest.feed {
        let sentiment = match item.overall_sentiment_score {
            Some(score) => format!("{} ({score:.3})", item.overall_sentiment_label),
            None => item.overall_sentiment_label.clone(),
        };
        let summary: String = item.summary.chars().take(SUMMARY_WIDTH).collect();
        t.add_row(vec![
            item.time_published.clone(),
            item.source.clone(),
            sentiment,
            item.title.clone(),
            summary,
        ]);
    }
    t
}

impl Render for TickerMatch {
    fn render(&self) -> String {
        let mut t = table(&["ticker", "name", "currency"]);
        t.add_row(vec![&self.ticker, &self.name, &self.currency]);
        t.to_string()
    }
}

impl Render for Quote {
    fn render(&self) -> String {
        let mut t = table(&["ticker", "price"]);
        t.add_row(vec![&self.ticker, &self.price]);
        t.to_string()
    }
}

impl Render for PriceChange {
    fn render(&self) -> String {
        let close = format!("{} close", self.ticker);
        let mut t = table(&["date", close.as_str()]);
        movement_rows(&mut t, &self.movement);
        t.to_string()
    }
}

impl Render for NewsReport {
    fn render(&self) -> String {
        format!(
            "{} ({} items)\n{}\n{}",
            self.news.ticker,
            self.news.digest.feed.len(),
            news_table(&self.news.digest),
            self.news.digest.sentiment_score_definition
        )
    }
}

impl Render for Analysis {
    fn render(&self) -> String {
        let close = format!("{} close", self.ticker);
        let mut price = table(&["date", close.as_str()]);
        movement_rows(&mut price, &self.price_change);
        format!("{price}\n{}", news_table(&self.news))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{NOT_AVAILABLE, NewsItem, TickerNews};
    use chrono::NaiveDate;

    #[test]
    fn test_render_quote() {
        let out = render_envelope(&Envelope::Success(Quote {
            ticker: "TSLA".to_string(),
            price: "177.2900".to_string(),
        }));
        assert!(out.contains("TSLA"));
        assert!(out.contains("177.2900"));
    }

    #[test]
    fn test_render_failure_lists_causes() {
        let failure = Failure::transport("Failed to retrieve complete analysis for 'MSFT'.")
            .with_causes(vec![Failure::data_absent("No news found for ticker 'MSFT'.")]);
        let out = render_envelope::<Analysis>(&failure.into());
        assert!(out.starts_with("Error: Failed to retrieve complete analysis for 'MSFT'."));
        assert!(out.contains("caused by: No news found for ticker 'MSFT'."));
    }

    #[test]
    fn test_render_price_change_sign() {
        let out = PriceChange {
            ticker: "AAPL".to_string(),
            movement: PriceMovement {
                price_change: -1.5,
                latest_date: NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
                latest_price: 10.0,
                previous_date: NaiveDate::from_ymd_opt(2024, 6, 7).unwrap(),
                previous_price: 11.5,
            },
        }
        .render();
        assert!(out.contains("-1.5000"));
        assert!(out.contains("2024-06-07"));
    }

    #[test]
    fn test_render_news_without_score() {
        let out = NewsReport {
            news: TickerNews {
                ticker: "NVDA".to_string(),
                digest: NewsDigest {
                    sentiment_score_definition: NOT_AVAILABLE.to_string(),
                    feed: vec![NewsItem {
                        title: "Chips".to_string(),
                        time_published: "20240614T120000".to_string(),
                        source: "Wire".to_string(),
                        summary: "Short".to_string(),
                        overall_sentiment_score: None,
                        overall_sentiment_label: "Neutral".to_string(),
                    }],
                },
            },
        }
        .render();
        assert!(out.starts_with("NVDA (1 items)"));
        assert!(out.contains("Chips"));
    }
}
