use std::fmt::Write;

use serde_json::Value;
use unicode_truncate::UnicodeTruncateStr;

use crate::catalog::CatalogEntry;
use crate::http_probe::prelude::*;

const DESCRIPTION_WIDTH: usize = 100;
const SAMPLE_WIDTH: usize = 120;

/// Terminal columns taken by `input`.
pub fn display_width(input: &str) -> usize {
    let (_, width) = input.unicode_truncate(usize::MAX);
    width
}

fn to_fixed_width(input: &str, width: usize) -> String {
    let (truncated, _) = input.unicode_truncate(width);
    format!("{:<width$}", truncated, width = width)
}

fn marker(outcome: ProbeOutcome) -> &'static str {
    match outcome {
        ProbeOutcome::Success => "✅",
        ProbeOutcome::EmptySuccess => "⚠️ ",
        ProbeOutcome::HttpError => "❌",
        ProbeOutcome::TransportError => "💥",
    }
}

/// Strings without their quotes, everything else as compact JSON.
fn compact(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn status(result: &ProbeResult) -> String {
    result
        .http_status
        .map(|code| code.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Render one line per candidate followed by a summary of working endpoints.
pub fn render_report(report: &ProbeReport, name_width: usize) -> String {
    let mut out = String::new();

    for result in report.iter() {
        let name = to_fixed_width(&result.name, name_width);
        let _ = writeln!(
            out,
            "[{name}] {} Status: {}, Elapsed: {:.2}ms, URL: {}",
            marker(result.outcome),
            status(result),
            result.elapsed.as_secs_f64() * 1000.0,
            result.url
        );

        match result.outcome {
            ProbeOutcome::Success => {
                let _ = writeln!(
                    out,
                    "    {} records, sample keys: {:?}",
                    result.record_count, result.sample_field_names
                );
                let _ = writeln!(out, "    columns: {:?}", result.columns);
                if let Some(record) = &result.sample_record {
                    let date = record.get("date").map(compact).unwrap_or_else(|| "N/A".to_string());
                    let sample = compact(&Value::Object(record.clone()));
                    let (sample, _) = sample.unicode_truncate(SAMPLE_WIDTH);
                    let _ = writeln!(out, "    latest record date: {}", date);
                    let _ = writeln!(out, "    sample: {}", sample);
                }
            }
            ProbeOutcome::EmptySuccess => {
                let _ = writeln!(out, "    no records returned");
            }
            ProbeOutcome::HttpError | ProbeOutcome::TransportError => {
                let _ = writeln!(
                    out,
                    "    {}: {}",
                    result.outcome.label(),
                    result.error_message.as_deref().unwrap_or_default()
                );
            }
        }
    }

    let working = report.working();
    let _ = writeln!(out);
    if working.is_empty() {
        let _ = writeln!(out, "No working endpoints found");
    } else {
        let _ = writeln!(out, "Found {} working endpoints:", working.len());
        for result in working {
            let _ = writeln!(out, "    {}: {}", result.name, result.url);
        }
    }
    let _ = writeln!(
        out,
        "({} empty, {} http errors, {} transport errors)",
        report.count(ProbeOutcome::EmptySuccess),
        report.count(ProbeOutcome::HttpError),
        report.count(ProbeOutcome::TransportError)
    );

    out
}

pub fn render_catalog(entries: &[CatalogEntry]) -> String {
    let mut out = String::new();

    if entries.is_empty() {
        let _ = writeln!(out, "Catalog search returned no datasets");
        return out;
    }

    let _ = writeln!(out, "Found datasets:");
    for entry in entries {
        let (description, _) = entry.description.unicode_truncate(DESCRIPTION_WIDTH);
        let _ = writeln!(out, "\n🏷️  {}", entry.name);
        let _ = writeln!(out, "    ID: {}", entry.id);
        let _ = writeln!(out, "    Endpoint: {}", entry.endpoint);
        let _ = writeln!(out, "    Description: {}", description);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use std::time::Duration;

    fn result(name: &str, outcome: ProbeOutcome, http_status: Option<u16>) -> ProbeResult {
        ProbeResult {
            name: name.to_string(),
            url: format!("https://data.cityofchicago.org/resource/{name}.json"),
            outcome,
            http_status,
            sample_field_names: vec!["crash_date".to_string()],
            columns: vec!["crash_date".to_string(), "weather".to_string()],
            sample_record: match outcome {
                ProbeOutcome::Success => json!({"crash_date": "2024-05-01", "weather": "CLEAR"})
                    .as_object()
                    .cloned(),
                _ => None,
            },
            record_count: 2,
            error_message: match outcome {
                ProbeOutcome::HttpError => Some("dataset not found".to_string()),
                ProbeOutcome::TransportError => Some("dns error".to_string()),
                _ => None,
            },
            elapsed: Duration::from_millis(12),
        }
    }

    #[test]
    fn test_to_fixed_width() {
        assert_eq!(to_fixed_width("abc", 5), "abc  ");
        assert_eq!(to_fixed_width("abcdefgh", 5), "abcde");
    }

    #[test]
    fn test_render_report_lists_working_endpoints() {
        let mut report = ProbeReport::new(Utc::now());
        report.insert(result("crashes", ProbeOutcome::Success, Some(200)));
        report.insert(result("volume", ProbeOutcome::HttpError, Some(404)));
        report.insert(result("speed", ProbeOutcome::TransportError, None));

        let text = render_report(&report, 8);
        assert!(text.contains("[crashes ] ✅ Status: 200"));
        assert!(text.contains("sample keys: [\"crash_date\"]"));
        assert!(text.contains("latest record date: N/A"));
        assert!(text.contains(r#"sample: {"crash_date":"2024-05-01","weather":"CLEAR"}"#));
        assert!(text.contains("http error: dataset not found"));
        assert!(text.contains("[speed   ] 💥 Status: N/A"));
        assert!(text.contains("Found 1 working endpoints:"));
        assert!(text.contains("crashes: https://data.cityofchicago.org/resource/crashes.json"));
        assert!(text.contains("(0 empty, 1 http errors, 1 transport errors)"));
    }

    #[test]
    fn test_render_report_shows_record_date() {
        let mut success = result("speed", ProbeOutcome::Success, Some(200));
        success.sample_record = json!({"date": "2024-06-30T00:00:00.000", "violations": "12"})
            .as_object()
            .cloned();
        let mut report = ProbeReport::new(Utc::now());
        report.insert(success);

        let text = render_report(&report, 5);
        assert!(text.contains("latest record date: 2024-06-30T00:00:00.000"));
    }

    #[test]
    fn test_display_width() {
        assert_eq!(display_width("speed"), 5);
        assert_eq!(display_width("交通量"), 6);
        assert_eq!(to_fixed_width("交通量", display_width("交通量")), "交通量");
    }

    #[test]
    fn test_render_report_without_working_endpoints() {
        let mut report = ProbeReport::new(Utc::now());
        report.insert(result("volume", ProbeOutcome::EmptySuccess, Some(200)));

        let text = render_report(&report, 6);
        assert!(text.contains("no records returned"));
        assert!(text.contains("No working endpoints found"));
    }

    #[test]
    fn test_render_catalog() {
        let entries = vec![CatalogEntry {
            name: "Traffic Crashes".to_string(),
            id: "85ca-t3if".to_string(),
            description: "d".repeat(150),
            endpoint: "https://data.cityofchicago.org/resource/85ca-t3if.json".to_string(),
        }];

        let text = render_catalog(&entries);
        assert!(text.contains("ID: 85ca-t3if"));
        assert!(text.contains("Endpoint: https://data.cityofchicago.org/resource/85ca-t3if.json"));
        assert!(text.contains(&format!("Description: {}\n", "d".repeat(100))));
        assert_eq!(render_catalog(&[]), "Catalog search returned no datasets\n");
    }
}
