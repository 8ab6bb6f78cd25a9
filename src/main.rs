mod api;
mod completion;
mod research;
mod server;
mod video_api;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use trendscope::config::AppConfig;
use trendscope::keywords::{KeywordOpportunity, OpportunityScorer};
use trendscope::{
    analyze_videos_at, format_float, format_number, now_epoch_secs, AnalysisResult, SortBy,
};

#[derive(Parser)]
#[command(name = "trendscope", about = "Short-video trend and keyword opportunity scoring")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score a batch of raw video records from a JSON file or stdin
    Analyze(AnalyzeArgs),
    /// Score a single search keyword against live search data
    Keyword(KeywordArgs),
    /// Extract keyword candidates for a piece of content and score them all
    Research(ResearchArgs),
    /// Run the HTTP API server
    Serve(ServeArgs),
    /// Write a default config file to edit
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug, Clone)]
struct AnalyzeArgs {
    /// Path to a JSON array of raw items; reads stdin when omitted
    #[arg(long)]
    file: Option<PathBuf>,
    #[arg(long, default_value = "views")]
    sort_by: String,
    #[arg(long)]
    top_hashtags: Option<usize>,
    /// Print one line per analyzed video
    #[arg(long)]
    details: bool,
}

#[derive(Args, Debug, Clone)]
struct KeywordArgs {
    keyword: String,
}

#[derive(Args, Debug, Clone)]
struct ResearchArgs {
    /// Content description; reads stdin when omitted
    #[arg(long)]
    content: Option<String>,
    #[arg(long)]
    max_keywords: Option<usize>,
    #[arg(long)]
    ai_model: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct InitConfigArgs {
    /// Destination path for the generated file
    #[arg(long, default_value = "config/trendscope.toml")]
    path: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8788)]
    port: u16,
    #[arg(long, default_value = "./webapp/dist")]
    web_root: String,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Keyword(args) => run_keyword(args).await,
        Command::Research(args) => run_research_command(args).await,
        Command::Serve(args) => server::serve(args).await,
        Command::InitConfig(args) => run_init_config(args),
    }
}

fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    if args.path.exists() {
        return Err(format!("{} already exists", args.path.display()));
    }
    AppConfig::default().write(&args.path)?;
    println!("Wrote {}", args.path.display());
    Ok(())
}

fn run_analyze(args: AnalyzeArgs) -> Result<(), String> {
    let payload = match args.file.as_ref() {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|err| format!("failed to read {}: {}", path.display(), err))?,
        None => read_stdin()?,
    };
    let items = parse_items(&payload)?;

    let sort_by = SortBy::from_str(&args.sort_by)
        .ok_or_else(|| format!("invalid sort_by: {}", args.sort_by))?;

    let mut config = load_config().analyzer;
    if let Some(top_hashtags) = args.top_hashtags {
        config.top_hashtags = top_hashtags;
    }

    let result = analyze_videos_at(&items, sort_by, now_epoch_secs(), &config);
    print_analysis(&result, args.details);
    Ok(())
}

async fn run_keyword(args: KeywordArgs) -> Result<(), String> {
    let keyword = args.keyword.trim();
    if keyword.is_empty() {
        return Err("keyword must not be empty".to_string());
    }

    let client = video_api::VideoApiClient::from_env()
        .ok_or_else(|| "RAPIDAPI_KEY is not set".to_string())?;
    let observation = client.observe_keyword(keyword).await?;

    let scorer = OpportunityScorer::new(load_config().keywords);
    print_opportunity(&scorer.score(&observation));
    Ok(())
}

async fn run_research_command(args: ResearchArgs) -> Result<(), String> {
    let content = match args.content {
        Some(content) if !content.trim().is_empty() => content,
        _ => read_stdin()?,
    };

    let completion = completion::CompletionClient::from_env(args.ai_model)
        .ok_or_else(|| "AI_API_KEY is not set".to_string())?;
    let video_api = video_api::VideoApiClient::from_env()
        .ok_or_else(|| "RAPIDAPI_KEY is not set".to_string())?;

    let config = load_config().keywords;
    let max_keywords = args.max_keywords.unwrap_or(config.max_keywords);

    let report = research::run_research(
        &completion,
        &video_api,
        &config,
        &content,
        max_keywords,
        |event, message| println!("[{}] {}", event, message),
    )
    .await?;

    println!();
    if report.keywords.is_empty() {
        println!("No keywords could be scored.");
    }
    for opportunity in &report.keywords {
        println!(
            "{:>3}  {} (competition {} | interest {} | quality {})",
            opportunity.opportunity_score,
            opportunity.keyword,
            opportunity.competition.label(),
            opportunity.interest_level.label(),
            opportunity.keyword_quality.label()
        );
    }
    if !report.errors.is_empty() {
        println!("\nFailed keywords:");
        for error in &report.errors {
            println!("- {}", error);
        }
    }
    Ok(())
}

fn print_analysis(result: &AnalysisResult, details: bool) {
    println!(
        "Analyzed {} videos (sorted by {}; skipped {} duplicate, {} zero-view, {} invalid)",
        result.total_videos,
        result.sort_by,
        result.duplicates_skipped,
        result.zero_view_skipped,
        result.invalid_skipped
    );
    println!("Trend summary: {}", result.trend_summary);
    println!(
        "Scores: hot {} | engagement {} | total {}",
        result.hot_score, result.engagement_score, result.total_score
    );
    println!(
        "Viral potential: avg {} | median {}",
        format_float(result.avg_viral_potential, 1),
        format_float(result.median_viral_potential, 1)
    );
    println!(
        "Status: {} viral | {} trending | {} emerging | {} mature",
        result.status_counts.viral,
        result.status_counts.trending,
        result.status_counts.emerging,
        result.status_counts.mature
    );

    if !result.top_hashtags.is_empty() {
        let tags: Vec<String> = result
            .top_hashtags
            .iter()
            .map(|hashtag| format!("#{} ({})", hashtag.tag, hashtag.count))
            .collect();
        println!("Top hashtags: {}", tags.join(" | "));
    }

    if details {
        println!("\nVideos:");
        for video in &result.videos {
            println!(
                "  [{:>3}] {} | {} views | {}/h | {}h old | {} | {}",
                video.viral_potential,
                video.id,
                format_number(video.play_count as f64),
                format_number(video.views_per_hour as f64),
                format_float(video.age_hours, 1),
                video.trend_status.label(),
                video.title
            );
        }
    }
}

fn print_opportunity(opportunity: &KeywordOpportunity) {
    println!("Keyword: {}", opportunity.keyword);
    println!(
        "Opportunity score: {} (quality {}, penalty -{})",
        opportunity.opportunity_score,
        opportunity.keyword_quality.label(),
        opportunity.quality_penalty
    );
    println!(
        "Competition: {} ({} results) | Interest: {}",
        opportunity.competition.label(),
        format_number(opportunity.total_videos as f64),
        opportunity.interest_level.label()
    );
    println!(
        "Median recent views: {} | High performers: {} | Outlier: {}",
        format_number(opportunity.median_recent_views as f64),
        opportunity.high_performers,
        if opportunity.outlier_detected { "yes" } else { "no" }
    );
    println!(
        "Title relevance: {}% | Autocomplete suggestions: {}",
        opportunity.relevance_percentage, opportunity.suggestion_count
    );
}

/// Accepts either a bare JSON array or an object wrapping the list under a
/// conventional key.
fn parse_items(payload: &str) -> Result<Vec<Value>, String> {
    let value: Value =
        serde_json::from_str(payload).map_err(|err| format!("invalid JSON input: {}", err))?;
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(ref object) => ["data", "items", "videos"]
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_array).cloned())
            .ok_or_else(|| "expected a JSON array of items".to_string()),
        _ => Err("expected a JSON array of items".to_string()),
    }
}

fn read_stdin() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| format!("failed reading stdin: {}", err))?;
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Err("missing input: pass an argument or pipe stdin".to_string());
    }
    Ok(trimmed.to_string())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}

fn load_config() -> AppConfig {
    AppConfig::load(None)
        .map(|(config, _)| config)
        .unwrap_or_default()
}
