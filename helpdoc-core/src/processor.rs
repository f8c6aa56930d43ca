use crate::builder::ModelBuilder;
use crate::config::ParsingConfig;
use crate::preprocessors::{Preprocessor, T24HelpPreprocessor};
use crate::rules::{ModelValidator, ValidationReport};
use crate::types::*;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};

/// Captured intermediate outputs from each pipeline stage
/// Used for testing and diagnostics, lets you inspect/compare each boundary
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStages {
    pub extracted: ExtractedDocument,
    pub merged_fragments: Vec<MergedEntry>,
    pub model: DocumentModel,
}

/// One entry's fragments after the continuation merge, before classification.
#[derive(Debug, Clone, Serialize)]
pub struct MergedEntry {
    pub label: String,
    pub fragments: Vec<RawFragment>,
}

/// A successfully parsed document together with where and when it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedDocument {
    pub model: DocumentModel,
    pub source: SourceInfo,
    pub validation: ValidationReport,
    pub loaded_at: DateTime<Utc>,
}

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings.push((step_name.to_string(), elapsed));
        log::info!("{}: {}µs", step_name, elapsed.as_micros());

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn print_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        println!("\n📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();

        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            println!(
                "   {:.<35} {:.3}ms ({:.1}%)",
                step,
                duration.as_secs_f64() * 1000.0,
                percentage
            );
        }
        println!("   {:.<35} {:.3}ms", "Total", total.as_secs_f64() * 1000.0);
    }
}

pub struct DocumentProcessor {
    preprocessor: Box<dyn Preprocessor>,
    builder: ModelBuilder,
    config: ParsingConfig,
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new(ParsingConfig::default())
    }
}

impl DocumentProcessor {
    pub fn new(config: ParsingConfig) -> Self {
        Self::with_preprocessor(Box::new(T24HelpPreprocessor::new()), config)
    }

    /// Create DocumentProcessor with an explicit markup preprocessor
    pub fn with_preprocessor(preprocessor: Box<dyn Preprocessor>, config: ParsingConfig) -> Self {
        Self {
            preprocessor,
            builder: ModelBuilder::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    pub fn preprocessor_name(&self) -> &str {
        self.preprocessor.name()
    }

    /// Markup text → model. Fails only on malformed markup.
    pub fn process_markup(&self, markup: &str) -> Result<DocumentModel> {
        let extracted = self.preprocessor.parse_markup(markup)?;
        if self.config.minimal_parse {
            log::info!("Minimal parse mode - skipping block classification");
        }
        let model = self.builder.build(extracted);
        log::info!(
            "Parsed '{}': {} entries, {} blocks, {} obsolete",
            model.title(),
            model.entries.len(),
            model.block_count(),
            model.obsolete_count()
        );
        Ok(model)
    }

    /// Same as `process_markup`, timing each stage.
    pub fn process_markup_with_profiling(
        &self,
        markup: &str,
        profiler: &mut StepProfiler,
    ) -> Result<DocumentModel> {
        let extracted = profiler.time_step("1. Markup → Extracted entries", || {
            self.preprocessor.parse_markup(markup)
        })?;

        let model = profiler.time_step("2. Structuring → Model", || {
            self.builder.build(extracted)
        });

        let report = profiler.time_step("3. Model validation", || ModelValidator::validate(&model));
        if self.config.report_anchor_collisions {
            report.log_issues();
        }

        Ok(model)
    }

    /// Text plus its source info → loaded document with validation report.
    pub fn load_text(&self, markup: &str, source: SourceInfo) -> Result<LoadedDocument> {
        let model = self
            .process_markup(markup)
            .with_context(|| format!("Failed to parse {}", source.name))?;
        Ok(self.finish(model, source))
    }

    /// Read a file from disk and run the full pipeline over it.
    pub fn process_file(&self, path: &Path) -> Result<LoadedDocument> {
        log::info!("Processing document: {}", path.display());
        let (markup, source) = self
            .preprocessor
            .read_source(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        self.load_text(&markup, source)
    }

    fn finish(&self, model: DocumentModel, source: SourceInfo) -> LoadedDocument {
        let validation = ModelValidator::validate(&model);
        if self.config.report_anchor_collisions {
            validation.log_issues();
        }
        LoadedDocument {
            model,
            source,
            validation,
            loaded_at: Utc::now(),
        }
    }

    /// Process markup and capture all intermediate stage outputs
    /// Used for pipeline diagnostics and testing stage boundaries
    pub fn capture_stages(&self, markup: &str) -> Result<PipelineStages> {
        let extracted = self.preprocessor.parse_markup(markup)?;
        log::debug!("Stage 1: {} extracted entries captured", extracted.entries.len());

        let merged_fragments: Vec<MergedEntry> = extracted
            .entries
            .iter()
            .map(|entry| MergedEntry {
                label: entry.label.clone(),
                fragments: self.builder.engine().merge(&entry.fragments),
            })
            .collect();
        log::debug!(
            "Stage 2: {} merged fragments captured",
            merged_fragments.iter().map(|m| m.fragments.len()).sum::<usize>()
        );

        let model = self.builder.build(extracted.clone());
        log::debug!("Stage 3: model captured ({} blocks)", model.block_count());

        Ok(PipelineStages {
            extracted,
            merged_fragments,
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use std::io::Write;

    const SMALL: &str = "<t24help><header><product>LD</product><table>T</table></header>\
        <menu><t><field>A.B</field><desc><p>One</p></desc></t>\
        <t><field>A-B</field><desc><p>Two</p></desc></t></menu></t24help>";

    #[test]
    fn test_process_markup() {
        let model = DocumentProcessor::default().process_markup(SMALL).unwrap();
        assert_eq!(model.product, "LD");
        assert_eq!(model.entries.len(), 2);
    }

    #[test]
    fn test_default_preprocessor_name() {
        assert_eq!(DocumentProcessor::default().preprocessor_name(), "t24help-xml");
    }

    #[test]
    fn test_malformed_markup_surfaces_parse_error() {
        let err = DocumentProcessor::default()
            .process_markup("<t24help>")
            .unwrap_err();
        let parse_err = err.downcast_ref::<ParseError>().unwrap();
        assert!(parse_err.is_malformed_input());
    }

    #[test]
    fn test_process_file_records_source_and_validation() {
        let mut file = tempfile::Builder::new().suffix(".xml").tempfile().unwrap();
        file.write_all(SMALL.as_bytes()).unwrap();

        let loaded = DocumentProcessor::default().process_file(file.path()).unwrap();
        assert_eq!(loaded.source.size_bytes, SMALL.len() as u64);
        assert!(loaded.source.name.ends_with(".xml"));
        assert_eq!(loaded.validation.anchor_collisions().count(), 1);
        assert_eq!(loaded.model.entries[1].anchor, "a-b");
    }

    #[test]
    fn test_missing_file_is_io_not_malformed() {
        let err = DocumentProcessor::default()
            .process_file(Path::new("/no/such/help.xml"))
            .unwrap_err();
        let parse_err = err.downcast_ref::<ParseError>().unwrap();
        assert!(matches!(parse_err, ParseError::Io(_)));
    }

    #[test]
    fn test_profiling_records_every_stage() {
        let mut profiler = StepProfiler::new(true);
        let model = DocumentProcessor::default()
            .process_markup_with_profiling(SMALL, &mut profiler)
            .unwrap();
        assert_eq!(model.entries.len(), 2);
        assert_eq!(profiler.timings().len(), 3);
    }

    #[test]
    fn test_disabled_profiler_records_nothing() {
        let mut profiler = StepProfiler::new(false);
        DocumentProcessor::default()
            .process_markup_with_profiling(SMALL, &mut profiler)
            .unwrap();
        assert!(profiler.timings().is_empty());
    }

    #[test]
    fn test_capture_stages() {
        let markup = "<t24help><menu><t><field>F</field><desc>\
            <p>Interest is</p><p>calculated daily.</p></desc></t></menu></t24help>";
        let stages = DocumentProcessor::default().capture_stages(markup).unwrap();
        assert_eq!(stages.extracted.entries[0].fragments.len(), 2);
        assert_eq!(
            stages.merged_fragments[0].fragments,
            vec![RawFragment::Paragraph("Interest is calculated daily.".to_string())]
        );
        assert_eq!(stages.model.entries[0].paragraphs.len(), 2);
        assert_eq!(stages.model.entries[0].blocks.len(), 1);
    }
}
