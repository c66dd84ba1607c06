use crate::metrics::{AggregateMetrics, ClassMetrics, HidingScope, MetricsReport};
use crate::provider::ProviderWarning;
use colored::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Markdown,
    #[default]
    Terminal,
}

/// Everything one `analyze` run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Input the universe was read from
    pub source: String,
    #[serde(flatten)]
    pub metrics: MetricsReport,
    pub warnings: Vec<ProviderWarning>,
}

pub trait OutputWriter {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, report)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

pub struct MarkdownWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for MarkdownWriter<W> {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        self.write_header(report)?;
        self.write_class_table(report)?;
        self.write_overall(report.metrics.aggregate.as_ref())?;
        self.write_problems(report)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> MarkdownWriter<W> {
    fn write_header(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        writeln!(self.writer, "# OO Metrics Report")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "Source: `{}`", report.source)?;
        writeln!(self.writer, "Hiding scope: {}", report.metrics.scope)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_class_table(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        writeln!(self.writer, "## Classes")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "| Class | DIT | NOC | MHF | MIF | AHF | AIF | POF |"
        )?;
        writeln!(
            self.writer,
            "|-------|-----|-----|-----|-----|-----|-----|-----|"
        )?;
        for metrics in report.metrics.evaluated() {
            writeln!(
                self.writer,
                "| `{}` | {} | {} | {:.4} | {:.4} | {:.4} | {:.4} | {:.4} |",
                metrics.class,
                metrics.dit,
                metrics.noc,
                metrics.mhf,
                metrics.mif,
                metrics.ahf,
                metrics.aif,
                metrics.pof
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_overall(&mut self, aggregate: Option<&AggregateMetrics>) -> anyhow::Result<()> {
        let Some(aggregate) = aggregate else {
            return Ok(());
        };
        writeln!(self.writer, "## Overall Metrics")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Metric | Value |")?;
        writeln!(self.writer, "|--------|-------|")?;
        for (label, value) in overall_rows(aggregate) {
            writeln!(self.writer, "| {label} | {value} |")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_problems(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        let failures: Vec<_> = report.metrics.failures().collect();
        if !failures.is_empty() {
            writeln!(self.writer, "## Failed Classes")?;
            writeln!(self.writer)?;
            for (class, error) in failures {
                writeln!(self.writer, "- `{class}`: {error}")?;
            }
            writeln!(self.writer)?;
        }

        let notes: Vec<String> = report
            .metrics
            .diagnostics
            .iter()
            .cloned()
            .chain(report.warnings.iter().map(ToString::to_string))
            .collect();
        if !notes.is_empty() {
            writeln!(self.writer, "## Warnings")?;
            writeln!(self.writer)?;
            for note in notes {
                writeln!(self.writer, "- {note}")?;
            }
            writeln!(self.writer)?;
        }
        Ok(())
    }
}

/// Key/value listing, one block per class, then the overall block.
pub struct TerminalWriter<W: Write> {
    writer: W,
    plain: bool,
}

impl TerminalWriter<std::io::Stdout> {
    pub fn stdout(plain: bool) -> Self {
        Self::new(std::io::stdout(), plain)
    }
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W, plain: bool) -> Self {
        Self { writer, plain }
    }

    fn heading(&self, text: &str) -> String {
        if self.plain {
            text.to_string()
        } else {
            text.bold().to_string()
        }
    }

    fn alert(&self, text: &str) -> String {
        if self.plain {
            text.to_string()
        } else {
            text.yellow().to_string()
        }
    }

    fn write_class(&mut self, metrics: &ClassMetrics) -> anyhow::Result<()> {
        let class = self.heading(&metrics.class);
        writeln!(self.writer, "Class: {class}")?;
        writeln!(self.writer, "  DIT: {}", metrics.dit)?;
        writeln!(self.writer, "  NOC: {}", metrics.noc)?;
        writeln!(self.writer, "  MHF: {:.4}", metrics.mhf)?;
        writeln!(self.writer, "  MIF: {:.4}", metrics.mif)?;
        writeln!(self.writer, "  AHF: {:.4}", metrics.ahf)?;
        writeln!(self.writer, "  AIF: {:.4}", metrics.aif)?;
        writeln!(self.writer, "  POF: {:.4}", metrics.pof)?;
        writeln!(self.writer)?;
        Ok(())
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        for metrics in report.metrics.evaluated() {
            self.write_class(metrics)?;
        }

        if let Some(aggregate) = &report.metrics.aggregate {
            let heading = self.heading("Overall Metrics:");
            writeln!(self.writer, "{heading}")?;
            for (label, value) in overall_rows(aggregate) {
                writeln!(self.writer, "  {label}: {value}")?;
            }
            if report.metrics.scope == HidingScope::Universe {
                writeln!(self.writer, "  (hiding factors computed over the whole universe)")?;
            }
            writeln!(self.writer)?;
        }

        let failures: Vec<_> = report.metrics.failures().collect();
        if !failures.is_empty() {
            let heading = self.alert(&format!("Failed classes ({}):", failures.len()));
            writeln!(self.writer, "{heading}")?;
            for (class, error) in failures {
                writeln!(self.writer, "  - {class}: {error}")?;
            }
            writeln!(self.writer)?;
        }

        let warning_count = report.metrics.diagnostics.len() + report.warnings.len();
        if warning_count > 0 {
            let heading = self.alert(&format!("Warnings ({warning_count}):"));
            writeln!(self.writer, "{heading}")?;
            for diagnostic in &report.metrics.diagnostics {
                writeln!(self.writer, "  - {diagnostic}")?;
            }
            for warning in &report.warnings {
                writeln!(self.writer, "  - {warning}")?;
            }
        }

        self.writer.flush()?;
        Ok(())
    }
}

fn overall_rows(aggregate: &AggregateMetrics) -> Vec<(&'static str, String)> {
    vec![
        ("Classes", aggregate.classes.to_string()),
        ("Failed", aggregate.failed.to_string()),
        ("Average DIT", format!("{:.4}", aggregate.average_dit)),
        ("Total NOC", aggregate.total_noc.to_string()),
        ("MHF", format!("{:.4}", aggregate.mhf)),
        ("MIF", format!("{:.4}", aggregate.mif)),
        ("AHF", format!("{:.4}", aggregate.ahf)),
        ("AIF", format!("{:.4}", aggregate.aif)),
        ("POF", format!("{:.4}", aggregate.pof)),
    ]
}

/// Writer for `format`, targeting `output` when given and stdout otherwise.
pub fn create_writer(
    format: OutputFormat,
    output: Option<&Path>,
    plain: bool,
) -> anyhow::Result<Box<dyn OutputWriter>> {
    let Some(path) = output else {
        return Ok(match format {
            OutputFormat::Json => Box::new(JsonWriter::new(std::io::stdout())),
            OutputFormat::Markdown => Box::new(MarkdownWriter::new(std::io::stdout())),
            OutputFormat::Terminal => Box::new(TerminalWriter::stdout(plain)),
        });
    };

    let file = BufWriter::new(File::create(path)?);
    Ok(match format {
        OutputFormat::Json => Box::new(JsonWriter::new(file)),
        OutputFormat::Markdown => Box::new(MarkdownWriter::new(file)),
        // Files never get escape codes
        OutputFormat::Terminal => Box::new(TerminalWriter::new(file, true)),
    })
}
