//! End-to-end run: table → normalized texts → topics → report data.
//!
//! Every fatal error surfaces from [`Pipeline::run`]; nothing touches the
//! filesystem until [`RunOutput::write_artifacts`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::aggregate::{aggregate, TopicGroups};
use crate::assign::{assign_checked, Assignment, TopicAssigner, TopicId};
use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::forbidden::ForbiddenWordSet;
use crate::naming::clean_topic_name;
use crate::preprocess::TextPreprocessor;
use crate::render;
use crate::report::{ReportData, ReportDataBuilder};
use crate::resources::LanguageResources;
use crate::sentiment::{score_checked, SentimentDistribution, SentimentScorer, HISTOGRAM_BINS};
use crate::table::Table;
use crate::wordcloud::{word_frequencies, WordFrequency, MAX_WORDS};

pub struct Pipeline<'a> {
    resources: &'a LanguageResources,
    forbidden: &'a ForbiddenWordSet,
    sentiment: Option<&'a dyn SentimentScorer>,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub record_ids: Vec<String>,
    /// Normalized text per record, aligned with `record_ids`.
    pub preprocessed: Vec<String>,
    pub assignment: Assignment,
    pub groups: TopicGroups,
    pub names: HashMap<TopicId, String>,
    pub report: ReportData,
    pub word_frequencies: Vec<WordFrequency>,
    /// Present when the pipeline was given a sentiment scorer.
    pub sentiment: Option<SentimentDistribution>,
}

impl<'a> Pipeline<'a> {
    pub fn new(resources: &'a LanguageResources, forbidden: &'a ForbiddenWordSet) -> Self {
        Self {
            resources,
            forbidden,
            sentiment: None,
        }
    }

    /// Also score every normalized text for sentiment.
    pub fn with_sentiment(mut self, scorer: &'a dyn SentimentScorer) -> Self {
        self.sentiment = Some(scorer);
        self
    }

    pub fn run(
        &self,
        table: &Table,
        config: &RunConfig,
        assigner: &dyn TopicAssigner,
    ) -> Result<RunOutput> {
        let records = table.records(config)?;
        info!(
            records = records.len(),
            text_columns = ?config.text_columns,
            "extracted records"
        );

        let combined: Vec<String> = records.iter().map(|r| r.combined_text()).collect();
        let preprocessor = TextPreprocessor::new(self.resources, self.forbidden);
        let preprocessed = preprocessor.normalize_all(&combined);
        info!(texts = preprocessed.len(), "preprocessing finished");

        let assignment = assign_checked(assigner, &preprocessed)?;

        let record_ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        let groups = aggregate(&record_ids, &assignment.topic_ids)?;

        let sentiment = match self.sentiment {
            Some(scorer) => {
                let scores = score_checked(scorer, &preprocessed)?;
                Some(SentimentDistribution::new(&record_ids, &scores, HISTOGRAM_BINS))
            }
            None => None,
        };

        let names: HashMap<TopicId, String> = assignment
            .topics
            .values()
            .map(|meta| (meta.id, clean_topic_name(&meta.label)))
            .collect();

        let report = ReportDataBuilder::from_records(config.metadata_columns.clone(), &records)
            .build(&groups, &names, &assignment.topics);

        let word_frequencies = word_frequencies(
            records.iter().filter_map(|r| r.texts.first()),
            self.resources,
            self.forbidden,
            MAX_WORDS,
        );

        info!(
            topics = groups.len(),
            words = word_frequencies.len(),
            "run finished"
        );
        Ok(RunOutput {
            record_ids,
            preprocessed,
            assignment,
            groups,
            names,
            report,
            word_frequencies,
            sentiment,
        })
    }
}

impl RunOutput {
    /// Write every artifact into `dir`, creating it if needed. Returns the written paths.
    pub fn write_artifacts(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| Error::Output {
            path: dir.to_path_buf(),
            source,
        })?;

        let mapping = dir.join(render::MAPPING_FILE);
        render::write_mapping(&self.report, &mapping)?;
        let json = dir.join(render::JSON_FILE);
        render::write_json(&self.report, &json)?;
        let html = dir.join(render::HTML_FILE);
        render::write_html(&self.report, &html)?;
        let summary = dir.join(render::SUMMARY_FILE);
        render::write_summary_csv(&self.report, &summary)?;
        let words = dir.join(render::WORD_FREQUENCIES_FILE);
        render::write_word_frequencies(&self.word_frequencies, &words)?;
        let mut written = vec![mapping, json, html, summary, words];

        if let Some(distribution) = &self.sentiment {
            let path = dir.join(render::SENTIMENT_FILE);
            render::write_sentiment(distribution, &path)?;
            written.push(path);
        }

        info!(dir = %dir.display(), files = written.len(), "artifacts written");
        Ok(written)
    }
}
