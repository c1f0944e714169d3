//! Summarize extracted slide text and generate quiz questions from it.

use crate::normalize::{chunk_text, is_blank};
use crate::services::{QuestionGenerator, Summarizer, SummaryLength};
use crate::{QuizReport, Result};

/// What to do with slides whose text is empty or whitespace only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptySlidePolicy {
    /// Send the text to the summarizer anyway; backend errors propagate.
    #[default]
    Summarize,
    /// Emit an empty summary without calling the summarizer.
    Skip,
}

/// Pipeline settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Summary length bounds passed to the summarizer.
    pub summary_length: SummaryLength,

    /// Handling of blank slides.
    pub empty_slides: EmptySlidePolicy,

    /// When set, longer slide text is summarized in word-wrapped chunks of
    /// at most this many characters and the chunk summaries joined.
    pub chunk_size: Option<usize>,
}

/// Runs the summarize and question-generation stages over extracted text.
pub struct QuizPipeline<'a> {
    summarizer: &'a dyn Summarizer,
    generator: &'a dyn QuestionGenerator,
    options: PipelineOptions,
}

impl<'a> QuizPipeline<'a> {
    /// Create a pipeline over the given backends with default options.
    pub fn new(summarizer: &'a dyn Summarizer, generator: &'a dyn QuestionGenerator) -> Self {
        Self {
            summarizer,
            generator,
            options: PipelineOptions::default(),
        }
    }

    /// Replace the pipeline options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Summarize every slide, in order. The first failure aborts.
    pub fn summarize_slides(&self, slides: &[String]) -> Result<Vec<String>> {
        slides
            .iter()
            .enumerate()
            .map(|(idx, text)| {
                log::debug!("Summarizing slide {} ({} chars)", idx + 1, text.len());
                self.summarize_slide(text)
            })
            .collect()
    }

    /// Summarize a single slide's text according to the options.
    pub fn summarize_slide(&self, text: &str) -> Result<String> {
        if self.options.empty_slides == EmptySlidePolicy::Skip && is_blank(text) {
            return Ok(String::new());
        }

        let length = self.options.summary_length;
        match self.options.chunk_size {
            Some(size) if text.chars().count() > size => {
                let chunks = chunk_text(text, size);
                if chunks.is_empty() {
                    return self.summarizer.summarize(text, length);
                }
                let summaries = chunks
                    .iter()
                    .map(|chunk| self.summarizer.summarize(chunk, length))
                    .collect::<Result<Vec<_>>>()?;
                Ok(summaries.join(" "))
            }
            _ => self.summarizer.summarize(text, length),
        }
    }

    /// Ask the question generator for quiz questions.
    pub fn generate_questions(&self, summaries: &[String]) -> Result<Vec<String>> {
        let questions = self.generator.generate_questions(summaries)?;
        log::debug!("Generated {} question lines", questions.len());
        Ok(questions)
    }

    /// Run both stages over already extracted slide text.
    pub fn run(&self, slides: Vec<String>) -> Result<QuizReport> {
        let summaries = self.summarize_slides(&slides)?;
        let questions = self.generate_questions(&summaries)?;

        Ok(QuizReport {
            slides,
            summaries,
            questions,
        })
    }
}
