use futures::stream::{self, StreamExt};
use std::time::Duration;

use trendscope::config::KeywordConfig;
use trendscope::keywords::{KeywordOpportunity, KeywordReport, OpportunityScorer};

use crate::completion::CompletionClient;
use crate::video_api::VideoApiClient;

/// Extracts keyword candidates for a piece of content and fans the analyses
/// out over a bounded worker pool. Failures are collected per keyword, not
/// raised: only the candidate-extraction step can fail the whole call.
pub async fn run_research<F>(
    completion: &CompletionClient,
    video_api: &VideoApiClient,
    config: &KeywordConfig,
    content: &str,
    max_keywords: usize,
    progress: F,
) -> Result<KeywordReport, String>
where
    F: Fn(&str, &str),
{
    progress("keywords", "Requesting keyword candidates");
    let candidates = completion.propose_keywords(content, max_keywords).await?;
    progress(
        "analyzing",
        &format!("Scoring {} keyword candidates", candidates.len()),
    );

    let scorer = OpportunityScorer::new(config.clone());
    let timeout = Duration::from_millis(config.task_timeout_ms);

    let outcomes: Vec<Result<KeywordOpportunity, String>> = stream::iter(candidates)
        .map(|keyword| {
            let video_api = video_api.clone();
            let scorer = scorer.clone();
            async move {
                match tokio::time::timeout(timeout, video_api.observe_keyword(&keyword)).await {
                    Err(_) => Err(format!("{}: timed out", keyword)),
                    Ok(Err(err)) => Err(format!("{}: {}", keyword, err)),
                    Ok(Ok(observation)) => Ok(scorer.score(&observation)),
                }
            }
        })
        .buffer_unordered(config.workers.max(1))
        .collect()
        .await;

    let mut report = KeywordReport::default();
    for outcome in outcomes {
        match outcome {
            Ok(opportunity) => {
                progress("scored", &opportunity.keyword);
                report.keywords.push(opportunity);
            }
            Err(err) => report.errors.push(err),
        }
    }

    progress("done", "Research complete");
    Ok(report.ranked())
}
