// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Rendering a processed log for people and tools

use std::fmt::Write as _;

use suitelog_parser::{ProcessedLog, SuiteSummary};

/// Lines of each failure's error log shown in the text summary
const ERROR_PREVIEW_LINES: usize = 3;

/// Render as pretty-printed JSON
///
/// # Errors
///
/// Returns the serializer error if the result cannot be encoded.
pub fn render_json(log: &ProcessedLog) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(log)
}

/// Render a chat-style summary
#[must_use]
pub fn render_text(log: &ProcessedLog) -> String {
    let mut out = String::new();
    let verdict = if log.all_passed() { "PASSED" } else { "FAILED" };

    let started = log
        .run_timestamp
        .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "start time unknown".to_string());
    let _ = writeln!(out, "*{} test run {}* ({})", log.product, verdict, started);
    let _ = writeln!(
        out,
        "Total: {} | Passed: {} | Failed: {} | Skipped: {} | Time: {:.2} min",
        log.totals.total,
        log.totals.passed,
        log.totals.failed,
        log.totals.skipped,
        log.total_elapsed_minutes
    );
    if log.truncated {
        out.push_str("Warning: log ends inside an unfinished record\n");
    }

    if !log.summaries.is_empty() {
        out.push('\n');
        for summary in &log.summaries {
            let _ = writeln!(out, "{}", suite_line(summary));
        }
    }

    let failing = log.failing_tests();
    if !failing.is_empty() {
        out.push_str("\nFailures:\n");
        for test in failing {
            let _ = writeln!(out, "- {} / {}", test.suite, test.name);
            for line in test
                .error_log
                .lines()
                .filter(|l| !l.trim().is_empty())
                .take(ERROR_PREVIEW_LINES)
            {
                let _ = writeln!(out, "    {}", line.trim());
            }
        }
    }

    out
}

fn suite_line(summary: &SuiteSummary) -> String {
    let marker = if summary.failed > 0 { "[x]" } else { "[ok]" };
    let case = summary
        .case_id
        .map(|id| format!(" (case {id})"))
        .unwrap_or_default();
    format!(
        "{marker} {}{case}: {} - passed {} / failed {} / skipped {} in {:.2} min",
        summary.name, summary.status, summary.passed, summary.failed, summary.skipped,
        summary.elapsed_minutes
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;
    use suitelog_parser::{Product, parse_log};

    const LOG: &str = concat!(
        r#"{"state":"passed","name":"nodes ready","type":"k3s test","time":60000000000,"timestamp":"2026-03-01T10:00:00Z"}"#,
        "\n",
        r#"{"state":"failed","name":"pods ready","type":"k3s test","time":60000000000}"#,
        "\nExpected coredns to be Running\n  got CrashLoopBackOff\n  at pods_test.go:10\n  more\n",
        r#"{"state":"failed","name":"validatecluster","type":"k3s suite","time":0,"timestamp":"2026-03-01T10:02:00Z"}"#,
        "\n",
    );

    #[test]
    fn test_render_text() {
        let log = parse_log(LOG, Product::K3s).expect("parses");
        let text = render_text(&log);
        assert_eq!(
            text,
            "*k3s test run FAILED* (2026-03-01 10:00 UTC)\n\
             Total: 2 | Passed: 1 | Failed: 1 | Skipped: 0 | Time: 2.00 min\n\
             \n\
             [x] validatecluster (case 215): failed - passed 1 / failed 1 / skipped 0 in 2.00 min\n\
             \n\
             Failures:\n\
             - validatecluster / pods ready\n    \
             Expected coredns to be Running\n    \
             got CrashLoopBackOff\n    \
             at pods_test.go:10\n"
        );
    }

    #[test]
    fn test_render_text_without_timestamps_and_truncated() {
        let log = parse_log(
            concat!(
                r#"{"state":"passed","name":"nodes ready","type":"k3s test","time":60000000000}"#,
                "\n",
                r#"{"state":"passed","name":"createcluster","type":"k3s suite","time":0}"#,
                "\n{\"state\":",
            ),
            Product::K3s,
        )
        .expect("parses");
        let text = render_text(&log);
        assert_eq!(
            text,
            "*k3s test run PASSED* (start time unknown)\n\
             Total: 1 | Passed: 1 | Failed: 0 | Skipped: 0 | Time: 1.00 min\n\
             Warning: log ends inside an unfinished record\n\
             \n\
             [ok] createcluster (case 214): passed - passed 1 / failed 0 / skipped 0 in 1.00 min\n"
        );
    }

    #[test]
    fn test_render_json_round_trips() {
        let log = parse_log(LOG, Product::K3s).expect("parses");
        let json = render_json(&log).expect("renders");
        let back: ProcessedLog = serde_json::from_str(&json).expect("parses back");
        assert_eq!(back, log);
    }

    #[test]
    fn test_suite_line_without_case_id() {
        let summary = SuiteSummary {
            name: "mystery".to_string(),
            elapsed_minutes: 0.5,
            status: "passed".to_string(),
            passed: 3,
            failed: 0,
            skipped: 0,
            case_id: None,
        };
        assert_eq!(
            suite_line(&summary),
            "[ok] mystery: passed - passed 3 / failed 0 / skipped 0 in 0.50 min"
        );
    }
}
