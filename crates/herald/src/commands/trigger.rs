use std::collections::BTreeMap;

use tracing::info;

use crate::{config::Config, integrations::github::GitHub, state::RunType};

#[derive(Clone, Debug, clap::Args)]
pub(crate) struct Args {
    /// The workflow to run: a file name under `.github/workflows` (like `deploy.yml`) or its ID.
    pub(crate) workflow: String,
    /// The branch or tag to run the workflow on.
    #[arg(long = "ref", default_value = "main")]
    pub(crate) git_ref: String,
    /// A workflow input, as `key=value`. May be repeated.
    #[arg(long = "input", value_name = "KEY=VALUE", value_parser = parse_input)]
    pub(crate) inputs: Vec<(String, String)>,
}

fn parse_input(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

pub(crate) async fn run(args: RunType<Args>, config: &Config) -> Result<(), super::Error> {
    let (run_type, args) = args.take();
    let repository = config.repository()?;
    let inputs: BTreeMap<String, String> = args.inputs.into_iter().collect();

    if let RunType::DryRun(()) = run_type {
        info!(
            "Would trigger {} on {} in {repository}",
            args.workflow, args.git_ref
        );
        for (key, value) in &inputs {
            info!("\twith {key}={value}");
        }
        return Ok(());
    }

    let github = GitHub::new(config.github_token()?, &config.github.api_url, repository)?;
    github
        .dispatch_workflow(&args.workflow, &args.git_ref, &inputs)
        .await?;
    println!(
        "✅ Triggered {} on {} in {}",
        args.workflow,
        args.git_ref,
        github.repository()
    );
    Ok(())
}
