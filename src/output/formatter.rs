//! Output formatters for match results

use crate::config::{OutputConfig, OutputFormat};
use crate::engine::aggregate::SectionStatus;
use crate::engine::attribution::Sign;
use crate::engine::matcher::MatchResult;
use crate::error::Result;
use colored::{Color, Colorize};

/// Trait for rendering a match result to one output format
pub trait OutputFormatter {
    fn format_result(&self, result: &MatchResult) -> Result<String>;
}

/// Console formatter with colors and a compact layout
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter for downstream consumers
pub struct JsonFormatter {
    pretty: bool,
}

/// Markdown formatter for saved reports
pub struct MarkdownFormatter;

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn score_badge(&self, score: f32) -> String {
        let (badge, color) = match score as u32 {
            80..=100 => ("STRONG MATCH", Color::Green),
            60..=79 => ("GOOD MATCH", Color::BrightGreen),
            40..=59 => ("PARTIAL MATCH", Color::Yellow),
            20..=39 => ("WEAK MATCH", Color::BrightRed),
            _ => ("POOR MATCH", Color::Red),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn status_marker(status: SectionStatus) -> &'static str {
        match status {
            SectionStatus::Scored => "",
            SectionStatus::MissingContent => " (no content)",
            SectionStatus::Unavailable => " (semantic unavailable)",
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_result(&self, result: &MatchResult) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.colorize("\n█ PROFILE MATCH\n", Color::Blue));

        match result.overall {
            Some(overall) => {
                output.push_str(&format!(
                    "\nOverall compatibility: {:.1}/100 {}\n",
                    overall,
                    self.score_badge(overall)
                ));
            }
            None => {
                output.push_str(&format!(
                    "\nOverall compatibility: {}\n",
                    self.colorize("not computed (degraded)", Color::Red)
                ));
            }
        }

        for reason in &result.degraded {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("!", Color::Red),
                reason
            ));
        }

        output.push_str(&self.colorize("\n▓ Sections\n", Color::Green));
        for (kind, score) in &result.sections {
            output.push_str(&format!(
                "  {:<12} semantic {:.3}  lexical {:.3}  weight {:.2}{}\n",
                kind.to_string(),
                score.semantic,
                score.lexical,
                score.weight,
                Self::status_marker(score.status)
            ));
        }

        if !result.attributions.is_empty() {
            output.push_str(&self.colorize("\n▓ Top contributing phrases\n", Color::Green));
            for attribution in &result.attributions {
                let (marker, color) = match attribution.sign {
                    Sign::Positive => ("+", Color::Green),
                    Sign::Negative => ("-", Color::Red),
                };
                output.push_str(&format!(
                    "  {} {:.4}  {} ({})\n",
                    self.colorize(marker, color),
                    attribution.contribution.abs(),
                    attribution.phrase,
                    attribution.section
                ));
            }
        }

        if !result.gaps.is_empty() {
            output.push_str(&self.colorize("\n▓ Missing keywords\n", Color::Yellow));
            for gap in &result.gaps {
                output.push_str(&format!(
                    "  {:.2}  {}\n",
                    gap.importance,
                    self.colorize(&gap.keyword, Color::Yellow)
                ));
            }
        }

        if !result.checks.is_empty() {
            output.push_str(&self.colorize("\n▓ Requirement checks\n", Color::Green));
            for check in &result.checks {
                let marker = match check.satisfied {
                    Some(true) => self.colorize("ok", Color::Green),
                    Some(false) => self.colorize("miss", Color::Red),
                    None => self.colorize("n/a", Color::Yellow),
                };
                output.push_str(&format!("  [{}] {}\n", marker, check.detail));
            }
        }

        if self.detailed {
            if let Some(model) = &result.model {
                output.push_str(&format!("\nEmbedding model: {}\n", model));
            }
            output.push_str(&format!(
                "Processing time: {}ms\n",
                result.processing_time_ms
            ));
        }

        Ok(output)
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_result(&self, result: &MatchResult) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(result)?
        } else {
            serde_json::to_string(result)?
        };
        Ok(json)
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_result(&self, result: &MatchResult) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Profile Match Report\n\n");
        output.push_str(&format!(
            "Generated: {}\n\n",
            chrono::Utc::now().format("%Y-%m-%d %H:%M UTC")
        ));

        match result.overall {
            Some(overall) => {
                output.push_str(&format!("**Overall compatibility: {:.1}/100**\n\n", overall))
            }
            None => output.push_str("**Overall compatibility: not computed (degraded)**\n\n"),
        }

        for reason in &result.degraded {
            output.push_str(&format!("> Degraded: {}\n\n", reason));
        }

        output.push_str("## Sections\n\n");
        output.push_str("| Section | Semantic | Lexical | Weight | Status |\n");
        output.push_str("|---------|----------|---------|--------|--------|\n");
        for (kind, score) in &result.sections {
            output.push_str(&format!(
                "| {} | {:.3} | {:.3} | {:.2} | {:?} |\n",
                kind, score.semantic, score.lexical, score.weight, score.status
            ));
        }
        output.push('\n');

        if !result.attributions.is_empty() {
            output.push_str("## Top contributing phrases\n\n");
            for attribution in &result.attributions {
                let sign = match attribution.sign {
                    Sign::Positive => "+",
                    Sign::Negative => "-",
                };
                output.push_str(&format!(
                    "- `{}` ({}) {}{:.4}\n",
                    attribution.phrase, attribution.section, sign,
                    attribution.contribution.abs()
                ));
            }
            output.push('\n');
        }

        if !result.gaps.is_empty() {
            output.push_str("## Missing keywords\n\n");
            for gap in &result.gaps {
                output.push_str(&format!("- {} (importance {:.2})\n", gap.keyword, gap.importance));
            }
            output.push('\n');
        }

        if !result.checks.is_empty() {
            output.push_str("## Requirement checks\n\n");
            for check in &result.checks {
                let marker = match check.satisfied {
                    Some(true) => "satisfied",
                    Some(false) => "not satisfied",
                    None => "inconclusive",
                };
                output.push_str(&format!("- {}: {}\n", check.detail, marker));
            }
            output.push('\n');
        }

        if let Some(model) = &result.model {
            output.push_str(&format!("---\nEmbedding model: {}\n", model));
        }

        Ok(output)
    }
}

/// Dispatches a result to the formatter matching the requested format
pub struct ReportGenerator;

impl ReportGenerator {
    pub fn format(
        format: &OutputFormat,
        output_config: &OutputConfig,
        result: &MatchResult,
    ) -> Result<String> {
        match format {
            OutputFormat::Console => {
                ConsoleFormatter::new(output_config.color_output, output_config.detailed)
                    .format_result(result)
            }
            OutputFormat::Json => JsonFormatter::new(true).format_result(result),
            OutputFormat::Markdown => MarkdownFormatter.format_result(result),
        }
    }
}
