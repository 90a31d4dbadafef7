use anyhow::Context;
use reelsmith_core::ProjectId;
use reelsmith_pipeline::{
    render_assets, save_scenario, OpenAiChat, OpenAiImages, OpenAiSpeech, PipelineConfig, S3Store,
    ScenarioGenerator, ScenarioRequest,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Read a job parameter from the environment.
fn job_var(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("{name} must be set"))
}

fn job_request() -> anyhow::Result<(ScenarioRequest, ProjectId)> {
    let duration_secs: u32 = job_var("DURATION_SECS")?
        .parse()
        .context("DURATION_SECS must be a whole number of seconds")?;
    let project: u32 = std::env::var("PROJECT_INDEX")
        .unwrap_or_else(|_| "0".into())
        .parse()
        .context("PROJECT_INDEX must be a non-negative integer")?;

    Ok((
        ScenarioRequest::new(job_var("THEME")?, job_var("STYLE")?, duration_secs),
        ProjectId::new(project),
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelsmith_worker=debug,reelsmith_pipeline=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    let config = PipelineConfig::from_env().context("invalid pipeline configuration")?;
    let (request, root) = job_request()?;
    let request = request.with_language(config.narration_language.clone());

    let store = S3Store::connect(&config.s3).await;
    store.ensure_bucket().await?;

    let scenarist = ScenarioGenerator::new(OpenAiChat::new(&config.openai)?);
    let project = scenarist.generate(&request, root).await?;
    let scenario_key = save_scenario(&store, &project).await?;
    tracing::info!(%scenario_key, title = project.title(), "Scenario stored");

    let images = OpenAiImages::new(&config.openai)?;
    let speech = OpenAiSpeech::new(&config.openai)?;
    let manifest =
        render_assets(&project, &images, &speech, &store, config.asset_concurrency).await?;

    println!("{}", serde_json::to_string_pretty(&manifest)?);
    tracing::info!(assets = manifest.len(), "Worker finished");
    Ok(())
}
