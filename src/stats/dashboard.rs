//! Server-rendered admin dashboard

use std::fmt::Write;

use chrono::{TimeZone, Utc};
use serde_json::Value;

use super::aggregate::StatsReport;

pub fn render_dashboard(report: &StatsReport) -> String {
    let mut html = String::with_capacity(16 * 1024);

    html.push_str(
        r#"<!DOCTYPE html>
<html lang="en"><head><meta charset="utf-8">
<title>Proposal Cards - Admin Dashboard</title>
<style>
body { font-family: sans-serif; margin: 2rem; color: #222; }
h1 { margin-bottom: 0.2rem; }
.cards { display: flex; gap: 1rem; margin: 1rem 0; }
.card { border: 1px solid #ccc; border-radius: 6px; padding: 0.8rem 1.2rem; min-width: 8rem; }
.card .value { font-size: 1.8rem; font-weight: bold; }
table { border-collapse: collapse; margin-bottom: 1.5rem; }
th, td { border: 1px solid #ddd; padding: 0.3rem 0.6rem; text-align: left; }
th { background: #f4f4f4; }
.bar { background: #4a90d9; height: 0.8rem; }
.muted { color: #777; }
</style></head><body>
<h1>Admin Dashboard</h1>
"#,
    );
    let _ = writeln!(
        html,
        "<p class=\"muted\">Generated {}</p>",
        escape(&format_millis(report.timestamp))
    );

    let s = &report.summary;
    html.push_str("<div class=\"cards\">\n");
    for (label, value) in [("Total", s.total), ("Today", s.today), ("Last 7 days", s.week), ("Last 30 days", s.month)] {
        let _ = writeln!(
            html,
            "<div class=\"card\"><div>{}</div><div class=\"value\">{}</div></div>",
            label, value
        );
    }
    html.push_str("</div>\n");

    html.push_str("<h2>Games (30 days)</h2>\n<table><tr><th>Game</th><th>ID</th><th>Plays</th></tr>\n");
    for game in &report.game_stats {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&game.game_name),
            escape(&game.game_id),
            game.count
        );
    }
    html.push_str("</table>\n");

    let peak = report.time_series.iter().map(|p| p.count).max().unwrap_or(0).max(1);
    html.push_str("<h2>Daily usage</h2>\n<table><tr><th>Date</th><th>Count</th><th></th></tr>\n");
    for point in &report.time_series {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td><div class=\"bar\" style=\"width:{}px\"></div></td></tr>",
            escape(&point.date),
            point.count,
            point.count * 200 / peak
        );
    }
    html.push_str("</table>\n");

    html.push_str("<h2>Event types (30 days)</h2>\n<table><tr><th>Event</th><th>Count</th></tr>\n");
    for stat in &report.event_type_stats {
        let _ = writeln!(html, "<tr><td>{}</td><td>{}</td></tr>", escape(&stat.event_type), stat.count);
    }
    html.push_str("</table>\n");

    html.push_str("<h2>Access keys</h2>\n<table><tr><th>Key</th><th>Uses</th><th>Last used</th></tr>\n");
    for key in &report.access_key_stats {
        let last_used = key.last_used.map(format_millis).unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&key.access_key),
            key.count,
            escape(&last_used)
        );
    }
    html.push_str("</table>\n");

    html.push_str("<h2>Recent errors</h2>\n");
    if report.error_logs.is_empty() {
        html.push_str("<p class=\"muted\">No errors in the last 7 days.</p>\n");
    } else {
        html.push_str("<table><tr><th>Time</th><th>Event</th><th>Game</th><th>Location</th><th>Message</th></tr>\n");
        for entry in &report.error_logs {
            let message = entry
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("");
            write_entry_row(&mut html, entry, &[field(entry, "location"), message.to_string()]);
        }
        html.push_str("</table>\n");
    }

    html.push_str("<h2>History</h2>\n");
    html.push_str("<table><tr><th>Time</th><th>Event</th><th>Game</th><th>Key</th><th>Result</th></tr>\n");
    for entry in &report.history {
        let outcome = match entry.get("success").and_then(Value::as_bool) {
            Some(true) => "ok".to_string(),
            Some(false) => format!("failed {}", field(entry, "error")),
            None => String::new(),
        };
        write_entry_row(&mut html, entry, &[field(entry, "accessKey"), outcome]);
    }
    html.push_str("</table>\n</body></html>\n");

    html
}

fn write_entry_row(html: &mut String, entry: &Value, extra: &[String]) {
    let timestamp = entry
        .get("timestamp")
        .and_then(Value::as_i64)
        .map(format_millis)
        .unwrap_or_default();
    let _ = write!(
        html,
        "<tr><td>{}</td><td>{}</td><td>{}</td>",
        escape(&timestamp),
        escape(&field(entry, "eventType")),
        escape(&field(entry, "gameId"))
    );
    for cell in extra {
        let _ = write!(html, "<td>{}</td>", escape(cell));
    }
    html.push_str("</tr>\n");
}

fn field(entry: &Value, name: &str) -> String {
    match entry.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn format_millis(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Minimal HTML text escaping
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::aggregate::{build_report, GameStat};
    use crate::stats::memory_store::MemoryStore;
    use crate::stats::store::KeyValueStore;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
    }

    #[test]
    fn test_render_contains_sections() {
        let store = MemoryStore::new();
        store
            .lpush(
                "stats:history",
                r#"{"timestamp":1736933400000,"eventType":"evaluation","gameId":"<script>","success":true}"#,
            )
            .unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let mut report = build_report(&store, &[("city-dx".to_string(), "Municipal DX".to_string())], now);
        report.game_stats.push(GameStat {
            game_id: "x".to_string(),
            game_name: "A & B".to_string(),
            count: 1,
        });

        let html = render_dashboard(&report);
        assert!(html.contains("Admin Dashboard"));
        assert!(html.contains("Municipal DX"));
        assert!(html.contains("A &amp; B"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("2025-01-15 09:30:00 UTC"));
        assert!(html.contains("No errors in the last 7 days."));
    }
}
