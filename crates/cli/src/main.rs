//! CLI tool for generating quiz questions from PowerPoint slides.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use quiz_core::{
    BlankLinePolicy, EmptySlidePolicy, ExtractorOptions, ImageNaming, PipelineOptions, QuizPipeline, QuizReport,
    ShapeErrorPolicy, SlideExtractor, SummaryLength,
};
use quiz_llm::{ChatClient, ChatQuestionGenerator, HuggingFaceSummarizer};
use quiz_ocr::TesseractEngine;
use std::path::PathBuf;
use std::time::Duration;

/// Extract slide text and picture OCR from a presentation, summarize each
/// slide, and generate quiz questions.
#[derive(Parser, Debug)]
#[command(name = "slide-quiz")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PowerPoint file (.pptx)
    input: PathBuf,

    /// Directory for pictures saved during OCR (created if missing)
    #[arg(short = 'o', long, env = "SLIDE_QUIZ_IMAGE_DIR", default_value = "images")]
    image_dir: PathBuf,

    /// Tesseract binary
    #[arg(long, env = "TESSERACT_CMD", default_value = quiz_ocr::tesseract::DEFAULT_COMMAND)]
    tesseract: PathBuf,

    /// OCR language(s), e.g. "eng" or "eng+deu"
    #[arg(long, default_value = quiz_ocr::tesseract::DEFAULT_LANGUAGE)]
    ocr_lang: String,

    /// Save each picture as slide_N_image_M.png instead of overwriting slide_N_image.png
    #[arg(long)]
    unique_image_names: bool,

    /// Skip pictures that cannot be decoded or recognized instead of aborting
    #[arg(long)]
    skip_bad_shapes: bool,

    /// API key for the chat-completion service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Base URL of the chat-completion service
    #[arg(long, env = "OPENAI_BASE_URL", default_value = quiz_llm::chat::DEFAULT_BASE_URL)]
    openai_base_url: String,

    /// Chat model used to write the questions
    #[arg(long, default_value = quiz_llm::chat::DEFAULT_MODEL)]
    model: String,

    /// Sampling temperature for question generation
    #[arg(long)]
    temperature: Option<f32>,

    /// Token limit for the generated questions
    #[arg(long)]
    max_tokens: Option<u32>,

    /// API token for the summarization service
    #[arg(long, env = "HF_API_TOKEN", hide_env_values = true)]
    hf_token: Option<String>,

    /// Base URL of the summarization service
    #[arg(long, env = "HF_BASE_URL", default_value = quiz_llm::summarize::DEFAULT_BASE_URL)]
    hf_base_url: String,

    /// Summarization model
    #[arg(long, default_value = quiz_llm::summarize::DEFAULT_MODEL)]
    summary_model: String,

    /// Minimum summary length (tokens)
    #[arg(long, default_value = "30")]
    min_length: u32,

    /// Maximum summary length (tokens)
    #[arg(long, default_value = "40")]
    max_length: u32,

    /// Summarize long slides in chunks of at most this many characters
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Give blank slides an empty summary instead of sending them to the summarizer
    #[arg(long)]
    skip_empty_slides: bool,

    /// Drop blank lines from the generated questions
    #[arg(long)]
    drop_blank_questions: bool,

    /// Timeout for each remote request, in seconds
    #[arg(long, default_value = "120")]
    timeout_secs: u64,

    /// Stop after extraction; no remote services are called
    #[arg(long)]
    extract_only: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Slide texts, summaries, then one question per line
    Text,
    /// A single JSON object
    Json,
}

impl Args {
    fn extractor_options(&self) -> ExtractorOptions {
        ExtractorOptions {
            image_naming: if self.unique_image_names {
                ImageNaming::PerPicture
            } else {
                ImageNaming::PerSlide
            },
            shape_errors: if self.skip_bad_shapes {
                ShapeErrorPolicy::Skip
            } else {
                ShapeErrorPolicy::Abort
            },
        }
    }

    fn pipeline_options(&self) -> Result<PipelineOptions> {
        if self.min_length > self.max_length {
            anyhow::bail!(
                "--min-length ({}) must not exceed --max-length ({})",
                self.min_length,
                self.max_length
            );
        }

        Ok(PipelineOptions {
            summary_length: SummaryLength {
                min: self.min_length,
                max: self.max_length,
            },
            empty_slides: if self.skip_empty_slides {
                EmptySlidePolicy::Skip
            } else {
                EmptySlidePolicy::Summarize
            },
            chunk_size: self.chunk_size,
        })
    }

    fn blank_line_policy(&self) -> BlankLinePolicy {
        if self.drop_blank_questions {
            BlankLinePolicy::Drop
        } else {
            BlankLinePolicy::Keep
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    run(&args)
}

/// Run the whole pipeline and print the results.
fn run(args: &Args) -> Result<()> {
    let ocr = TesseractEngine::new()
        .with_command(&args.tesseract)
        .with_language(&args.ocr_lang);
    if !ocr.is_available() {
        log::warn!(
            "OCR engine {} could not be started; slides with pictures will fail",
            ocr.command().display()
        );
    }

    let extractor = SlideExtractor::new(&ocr).with_options(args.extractor_options());

    if args.verbose {
        eprintln!("Processing: {}", args.input.display());
    }

    let slides = quiz_pptx::extract_slides(&args.input, &args.image_dir, &extractor)
        .with_context(|| format!("Failed to extract slides from {}", args.input.display()))?;

    if args.verbose {
        eprintln!("  Extracted {} slides", slides.len());
    }

    if args.extract_only {
        let report = QuizReport {
            slides,
            ..Default::default()
        };
        return match args.format {
            OutputFormat::Text => {
                println!("{:?}", report.slides);
                Ok(())
            }
            OutputFormat::Json => print_json(&report),
        };
    }

    let pipeline_options = args.pipeline_options()?;
    let summarizer = build_summarizer(args)?;
    let generator = build_generator(args)?;
    let pipeline = QuizPipeline::new(&summarizer, &generator).with_options(pipeline_options);

    match args.format {
        OutputFormat::Text => {
            println!("{:?}", slides);

            let summaries = pipeline
                .summarize_slides(&slides)
                .context("Failed to summarize slides")?;
            println!("{:?}", summaries);

            let questions = pipeline
                .generate_questions(&summaries)
                .context("Failed to generate quiz questions")?;
            for question in &questions {
                println!("{}", question);
            }
        }
        OutputFormat::Json => {
            let report = pipeline.run(slides).context("Failed to generate quiz")?;
            print_json(&report)?;
        }
    }

    Ok(())
}

/// Construct the summarization backend from the arguments.
fn build_summarizer(args: &Args) -> Result<HuggingFaceSummarizer> {
    let token = args
        .hf_token
        .as_deref()
        .ok_or_else(|| quiz_core::Error::Config("HF_API_TOKEN (or --hf-token) is required".to_string()))?;

    let summarizer = HuggingFaceSummarizer::with_timeout(token, args.timeout())
        .context("Failed to set up the summarizer")?
        .with_base_url(&args.hf_base_url)
        .with_model(&args.summary_model);

    Ok(summarizer)
}

/// Construct the question generator from the arguments.
fn build_generator(args: &Args) -> Result<ChatQuestionGenerator> {
    let api_key = args
        .openai_api_key
        .as_deref()
        .ok_or_else(|| quiz_core::Error::Config("OPENAI_API_KEY (or --openai-api-key) is required".to_string()))?;

    let client = ChatClient::with_timeout(api_key, args.timeout())
        .context("Failed to set up the chat client")?
        .with_base_url(&args.openai_base_url);

    let mut generator = ChatQuestionGenerator::new(client)
        .with_model(&args.model)
        .with_blank_lines(args.blank_line_policy());
    if let Some(temperature) = args.temperature {
        generator = generator.with_temperature(temperature);
    }
    if let Some(max_tokens) = args.max_tokens {
        generator = generator.with_max_tokens(max_tokens);
    }

    Ok(generator)
}

/// Print a report as pretty JSON.
fn print_json(report: &QuizReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}
