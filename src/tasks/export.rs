//! Export of finished analysis results

use super::TaskController;
use crate::error::Result;
use crate::response::classify;
use crate::types::{DownloadedFile, TaskId};
use tracing::{info, warn};

impl TaskController {
    /// Download the exported document for a task
    ///
    /// Works for any task id, active or not. The filename comes from the
    /// response's Content-Disposition header, falling back to
    /// `{export_basename}_{task_id}.{output_extension}`.
    pub async fn export(&self, task_id: &TaskId) -> Result<DownloadedFile> {
        let url = self
            .config
            .endpoint_url_with_segment(&self.config.endpoints.export_path, task_id.as_str());
        let response = self.http.get(&url).send().await?;

        let output = &self.config.output;
        let result = classify(response).await?.into_document(|| {
            format!(
                "{}_{}.{}",
                output.export_basename,
                task_id,
                output.output_extension.trim_start_matches('.')
            )
        });

        match &result {
            Ok(file) => info!(task_id = %task_id, filename = %file.filename, bytes = file.len(), "export downloaded"),
            Err(e) => warn!(task_id = %task_id, error = %e, "export failed"),
        }
        result
    }
}
