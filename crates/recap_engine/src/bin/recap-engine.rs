use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand, ValueEnum};
use recap_engine::{
    server::{start_server, AppState},
    tracing::init_tracing_subscriber,
    yt::{audio_fetcher::YtDlpFetcher, resolver::YtDlpResolver, MetadataResolver},
    DispatcherConfig, JobDispatcher, OllamaClient, OpenAiClient, OverflowPolicy, PipelineInput,
    Summarizer, SummaryPipeline, SummaryPipelineBuilder, Transcriber,
};
use recap_jobs::JobStore;

#[derive(Parser)]
#[command(name = "recap-engine", about = "YouTube video summarization service")]
struct Cli {
    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY")]
    openai_key: String,

    /// Summarization backend
    #[arg(long, env = "SUMMARIZER_BACKEND", value_enum, default_value = "openai")]
    summarizer: SummarizerBackend,

    /// Ollama server URL (ollama backend only)
    #[arg(long, env = "OLLAMA_BASE_URL", default_value = "http://localhost:11434")]
    ollama_base_url: String,

    /// Ollama model name (ollama backend only)
    #[arg(long, env = "OLLAMA_MODEL", default_value = "llama3.2:1b")]
    ollama_model: String,

    /// yt-dlp executable
    #[arg(long, env = "YTDLP_BIN", default_value = "yt-dlp")]
    ytdlp_bin: String,

    /// Working directory for downloaded audio
    #[arg(long, default_value = "/var/tmp/recap-engine")]
    workdir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve {
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: String,

        #[arg(long, env = "PORT", default_value = "5000")]
        port: u16,

        /// Pipeline worker count
        #[arg(long, env = "PIPELINE_WORKERS", default_value = "4")]
        workers: usize,

        /// How many submissions may wait for a worker
        #[arg(long, env = "QUEUE_CAPACITY", default_value = "32")]
        queue_capacity: usize,

        /// What to do with submissions when the queue is full
        #[arg(long, env = "QUEUE_ON_FULL", value_enum, default_value = "reject")]
        on_full: OnFull,
    },
    /// Summarize one video and print the result
    Run {
        /// Video URL
        url: String,

        /// Title override
        #[arg(long)]
        title: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SummarizerBackend {
    #[value(name = "openai")]
    OpenAi,
    Ollama,
}

#[derive(Clone, Copy, ValueEnum)]
enum OnFull {
    Reject,
    Wait,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    let resolver = YtDlpResolver::new(&cli.ytdlp_bin);
    let fetcher = YtDlpFetcher::new(&cli.ytdlp_bin);
    let openai = OpenAiClient::new(&cli.openai_key, fetcher, &cli.workdir);

    match cli.summarizer {
        SummarizerBackend::OpenAi => {
            let pipeline = SummaryPipelineBuilder::new()
                .resolver(resolver)
                .transcriber(openai.clone())
                .summarizer(openai)
                .build();
            run_command(cli.command, pipeline).await
        }
        SummarizerBackend::Ollama => {
            let ollama = OllamaClient::new(&cli.ollama_base_url, &cli.ollama_model);
            let pipeline = SummaryPipelineBuilder::new()
                .resolver(resolver)
                .transcriber(openai)
                .summarizer(ollama)
                .build();
            run_command(cli.command, pipeline).await
        }
    }
}

async fn run_command<R, T, S>(command: Command, pipeline: SummaryPipeline<R, T, S>) -> anyhow::Result<()>
where
    R: MetadataResolver + Send + Sync + 'static,
    T: Transcriber + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
{
    match command {
        Command::Serve {
            host,
            port,
            workers,
            queue_capacity,
            on_full,
        } => {
            let store = Arc::new(JobStore::new());
            let pipeline = Arc::new(pipeline);
            let config = DispatcherConfig {
                workers,
                queue_capacity,
                on_full: match on_full {
                    OnFull::Reject => OverflowPolicy::Reject,
                    OnFull::Wait => OverflowPolicy::Wait,
                },
            };
            let dispatcher = Arc::new(JobDispatcher::start(
                Arc::clone(&store),
                Arc::clone(&pipeline),
                config,
            ));

            let state = AppState {
                store,
                pipeline,
                dispatcher,
            };
            start_server(&host, port, state).await
        }
        Command::Run { url, title } => {
            let output = pipeline
                .run(PipelineInput {
                    video_url: url,
                    title_hint: title,
                })
                .await?;

            println!("Video ID: {}", output.video_id);
            println!("Video Title: {}", output.video_title);
            println!("\n{}", output.summary);
            Ok(())
        }
    }
}
