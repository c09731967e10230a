use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::json;

use super::{Error, GitHub, parse, send};

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct WorkflowRun {
    pub(crate) id: u64,
    /// `queued`, `in_progress`, `completed`, …
    pub(crate) status: String,
    /// Only set once `status` is `completed`.
    pub(crate) conclusion: Option<String>,
    pub(crate) html_url: String,
}

impl WorkflowRun {
    pub(crate) fn is_completed(&self) -> bool {
        self.status == "completed"
    }

    pub(crate) fn succeeded(&self) -> bool {
        self.conclusion.as_deref() == Some("success")
    }
}

#[derive(Debug, Deserialize)]
struct WorkflowRuns {
    workflow_runs: Vec<WorkflowRun>,
}

impl GitHub {
    /// Fire a `workflow_dispatch` event. `workflow` is a file name like `deploy.yml` or an ID.
    pub(crate) async fn dispatch_workflow(
        &self,
        workflow: &str,
        git_ref: &str,
        inputs: &BTreeMap<String, String>,
    ) -> Result<(), Error> {
        send(
            self.post(&format!("actions/workflows/{workflow}/dispatches"))
                .json(&json!({ "ref": git_ref, "inputs": inputs })),
            "triggering the workflow",
        )
        .await?;
        Ok(())
    }

    /// The newest manually dispatched run of `workflow` on `branch`, if there is one.
    pub(crate) async fn latest_run(
        &self,
        workflow: &str,
        branch: &str,
    ) -> Result<Option<WorkflowRun>, Error> {
        let activity = "listing workflow runs";
        let response = send(
            self.get(&format!("actions/workflows/{workflow}/runs"))
                .query(&[
                    ("branch", branch),
                    ("event", "workflow_dispatch"),
                    ("per_page", "1"),
                ]),
            activity,
        )
        .await?;
        let runs: WorkflowRuns = parse(response, activity).await?;
        Ok(runs.workflow_runs.into_iter().next())
    }

    pub(crate) async fn get_run(&self, id: u64) -> Result<WorkflowRun, Error> {
        let activity = "checking the workflow run";
        let response = send(self.get(&format!("actions/runs/{id}")), activity).await?;
        parse(response, activity).await
    }
}
