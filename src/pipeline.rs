//! End-to-end pipeline orchestration
//!
//! One run is strictly sequential: fetch every configured region,
//! consolidate, score with the selected strategy, rank, export, and
//! optionally upload. A failed region contributes zero trends; a
//! scoring failure fails the run; an upload failure only costs the
//! public URL. No cancellation and no timeout wrap a run, and runs are
//! not mutually excluded: the artifact path is overwritten wholesale,
//! last writer wins.

use chrono::Utc;
use std::sync::Arc;

use crate::config::Config;
use crate::embedding::ScoreStrategy;
use crate::error::{Error, Result};
use crate::export::{ArtifactUploader, JsonExporter};
use crate::filter;
use crate::models::{RawTrend, RunReport, ScoredTrend};
use crate::ranking;
use crate::trends::TrendsClient;

/// The pipeline runner, shared between CLI one-shot runs and the server
pub struct Pipeline {
    config: Arc<Config>,
    client: Arc<TrendsClient>,
    strategy: Arc<dyn ScoreStrategy>,
    uploader: Option<Arc<dyn ArtifactUploader>>,
}

impl Pipeline {
    pub fn new(
        config: Arc<Config>,
        client: Arc<TrendsClient>,
        strategy: Arc<dyn ScoreStrategy>,
        uploader: Option<Arc<dyn ArtifactUploader>>,
    ) -> Self {
        Self {
            config,
            client,
            strategy,
            uploader,
        }
    }

    /// Execute one full run and return its report
    pub async fn run(&self) -> Result<RunReport> {
        let started_at = Utc::now();
        let regions = self.config.trends.geo_list.clone();

        tracing::info!(
            regions = ?regions,
            window_hours = self.config.trends.window_hours,
            mode = self.strategy.name(),
            "Pipeline run starting"
        );

        let mut all_raw: Vec<RawTrend> = Vec::new();
        for geo in &regions {
            all_raw.extend(self.client.fetch_trending(geo).await);
        }
        let raw_count = all_raw.len();

        let unique = filter::consolidate(all_raw, &self.config.scoring.blacklist);
        let unique_count = unique.len();
        tracing::info!(raw = raw_count, unique = unique_count, "Trends consolidated");

        let scores = self.strategy.score_batch(&unique).await?;
        if scores.len() != unique.len() {
            return Err(Error::Score(format!(
                "strategy returned {} scores for {} trends",
                scores.len(),
                unique.len()
            )));
        }

        let candidates: Vec<ScoredTrend> = unique
            .into_iter()
            .zip(scores)
            .map(|(raw, semantic)| ScoredTrend::from_raw(raw, semantic))
            .collect();

        let top_list = ranking::rank(
            candidates,
            self.config.ranking.min_volume,
            self.config.ranking.top_n,
        );

        for (position, trend) in top_list.iter().enumerate() {
            tracing::info!(
                rank = position + 1,
                query = %trend.query,
                region = %trend.geo,
                volume = trend.search_volume,
                semantic = %format!("{:.2}", trend.semantic_score),
                score = %format!("{:.2}", trend.final_score),
                "Ranked trend"
            );
        }

        let exporter = JsonExporter::new(&self.config.export.output_path);
        exporter
            .write(&top_list)
            .map_err(|e| Error::Export(format!("{e:#}")))?;

        let public_url = self.upload_artifact().await;

        Ok(RunReport {
            started_at,
            regions,
            raw_count,
            unique_count,
            ranked_count: top_list.len(),
            artifact_path: self.config.export.output_path.clone(),
            public_url,
        })
    }

    /// Hand the artifact to the upload collaborator, if configured
    ///
    /// An upload failure is a warning: the local artifact stands and
    /// the run completes without a public URL.
    async fn upload_artifact(&self) -> Option<String> {
        let uploader = self.uploader.as_ref()?;

        let object_key = self
            .config
            .export
            .output_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("ai_trends.json"));

        match uploader
            .upload(&self.config.export.output_path, &object_key)
            .await
        {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "Upload failed, artifact kept locally");
                None
            }
        }
    }
}
