//! 照合パイプライン
//!
//! 1行ごとに: 会社フォルダを一覧 → ファイル名で照合 → 取得・本文抽出
//! → 推奨事項抽出（通常モード）→ 結果レコードと診断レコード。
//! 行単位の失敗はステータスと RowOutcome に落とし込み、バッチは止めない。

use crate::extractor::{ExtractedDocument, TextExtractor};
use crate::recommender::RecommendationExtractor;
use crate::storage::ObjectStore;
use imani_common::{
    build_diagnostic, estimate_remaining, find_match, storage_prefix, DiagnosticRecord,
    ProjectRow, ResultRecord, RowStatus, RunMode,
};
use std::time::{Duration, Instant};

/// 行ごとの処理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Success,
    /// 一部の処理に失敗したが行は完了した
    Degraded { reason: String },
    /// 見つかった文書を取得できなかった
    Failed { reason: String },
}

impl RowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RowOutcome::Success)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            RowOutcome::Success => None,
            RowOutcome::Degraded { reason } | RowOutcome::Failed { reason } => Some(reason),
        }
    }
}

/// 1行分のレポート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowReport {
    pub result: ResultRecord,
    pub diagnostic: Option<DiagnosticRecord>,
    pub outcome: RowOutcome,
}

/// 進捗通知
#[derive(Debug)]
pub struct RowProgress<'a> {
    /// 完了した行数（1始まり）
    pub completed: usize,
    pub total: usize,
    pub row: &'a ProjectRow,
    pub status: RowStatus,
    pub elapsed: Duration,
    pub eta: Duration,
}

/// 実行全体のレポート
#[derive(Debug, Clone)]
pub struct RunReport {
    pub mode: RunMode,
    pub results: Vec<ResultRecord>,
    pub diagnostics: Vec<DiagnosticRecord>,
    pub outcomes: Vec<RowOutcome>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn found_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_found()).count()
    }

    pub fn degraded_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RowOutcome::Degraded { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RowOutcome::Failed { .. }))
            .count()
    }
}

pub struct Pipeline<'a, S: ?Sized, T: ?Sized, R: ?Sized> {
    store: &'a S,
    extractor: &'a T,
    recommender: &'a R,
    mode: RunMode,
}

impl<'a, S, T, R> Pipeline<'a, S, T, R>
where
    S: ObjectStore + ?Sized,
    T: TextExtractor + ?Sized,
    R: RecommendationExtractor + ?Sized,
{
    pub fn new(store: &'a S, extractor: &'a T, recommender: &'a R, mode: RunMode) -> Self {
        Self {
            store,
            extractor,
            recommender,
            mode,
        }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// 全行を順番に処理する
    pub async fn run<F>(&self, rows: &[ProjectRow], mut on_progress: F) -> RunReport
    where
        F: FnMut(&RowProgress<'_>),
    {
        let start = Instant::now();
        let total = rows.len();
        let mut results = Vec::with_capacity(total);
        let mut diagnostics = Vec::new();
        let mut outcomes = Vec::with_capacity(total);

        for (i, row) in rows.iter().enumerate() {
            let report = self.process_row(row).await;
            let completed = i + 1;
            let elapsed = start.elapsed();

            on_progress(&RowProgress {
                completed,
                total,
                row,
                status: report.result.status,
                elapsed,
                eta: estimate_remaining(elapsed, completed, total),
            });

            results.push(report.result);
            diagnostics.extend(report.diagnostic);
            outcomes.push(report.outcome);
        }

        RunReport {
            mode: self.mode,
            results,
            diagnostics,
            outcomes,
            elapsed: start.elapsed(),
        }
    }

    /// 1行を処理する
    pub async fn process_row(&self, row: &ProjectRow) -> RowReport {
        let prefix = storage_prefix(&row.company);

        let (listing, listing_error) = match self.store.list_objects(&prefix).await {
            Ok(listing) => (listing, None),
            Err(e) => {
                tracing::warn!(company = %row.company, "一覧取得に失敗: {}", e);
                (Vec::new(), Some(format!("listing failed: {}", e)))
            }
        };

        match find_match(&row.expected_filename, &listing) {
            Some(key) => self.process_found(row, key).await,
            None => {
                tracing::debug!(company = %row.company, file = %row.expected_filename, "未検出");
                let outcome = match listing_error {
                    Some(reason) => RowOutcome::Degraded { reason },
                    None => RowOutcome::Success,
                };
                self.not_found(row, None, self.store.object_url(&prefix), outcome)
            }
        }
    }

    async fn process_found(&self, row: &ProjectRow, key: &str) -> RowReport {
        tracing::debug!(company = %row.company, key, "照合");

        let bytes = match self.store.fetch_object(key).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(key, "取得に失敗: {}", e);
                let outcome = RowOutcome::Failed {
                    reason: format!("fetch failed: {}", e),
                };
                let link = self.store.object_url(&storage_prefix(&row.company));
                return self.not_found(row, Some(key), link, outcome);
            }
        };

        let document = self.extractor.extract(&bytes);
        let link = self.store.object_url(key);

        let (status, recommendations, outcome) = match self.mode {
            RunMode::DiagnosticsOnly => (
                RowStatus::FoundDiagnosticOnly,
                Vec::new(),
                extraction_outcome(&document),
            ),
            RunMode::Normal { .. } => self.recommend(&document).await,
        };

        let diagnostic = self.mode.wants_diagnostics().then(|| {
            build_diagnostic(&row.expected_filename, Some(key), &document.text, document.page_count)
        });

        RowReport {
            result: ResultRecord {
                company: row.company.clone(),
                expected_filename: row.expected_filename.clone(),
                status,
                recommendations,
                link,
            },
            diagnostic,
            outcome,
        }
    }

    /// 本文から推奨事項を取る。本文が読めなければAIは呼ばない
    async fn recommend(&self, document: &ExtractedDocument) -> (RowStatus, Vec<String>, RowOutcome) {
        if !document.is_ok() {
            return (
                RowStatus::FoundNoRecommendations,
                Vec::new(),
                extraction_outcome(document),
            );
        }

        match self.recommender.extract(&document.text).await {
            Ok(items) if items.is_empty() => {
                (RowStatus::FoundNoRecommendations, items, RowOutcome::Success)
            }
            Ok(items) => (RowStatus::Found, items, RowOutcome::Success),
            Err(e) => {
                tracing::warn!("推奨事項の抽出に失敗: {}", e);
                (
                    RowStatus::FoundNoRecommendations,
                    Vec::new(),
                    RowOutcome::Degraded {
                        reason: format!("recommendation failed: {}", e),
                    },
                )
            }
        }
    }

    /// 未検出（または取得失敗）の行
    fn not_found(
        &self,
        row: &ProjectRow,
        matched_key: Option<&str>,
        link: Option<String>,
        outcome: RowOutcome,
    ) -> RowReport {
        let status = match self.mode {
            RunMode::DiagnosticsOnly => RowStatus::NotFoundDiagnosticOnly,
            RunMode::Normal { .. } => RowStatus::NotFound,
        };
        let diagnostic = self
            .mode
            .wants_diagnostics()
            .then(|| build_diagnostic(&row.expected_filename, matched_key, "", None));

        RowReport {
            result: ResultRecord {
                company: row.company.clone(),
                expected_filename: row.expected_filename.clone(),
                status,
                recommendations: Vec::new(),
                link,
            },
            diagnostic,
            outcome,
        }
    }
}

fn extraction_outcome(document: &ExtractedDocument) -> RowOutcome {
    match &document.error {
        None => RowOutcome::Success,
        Some(e) => RowOutcome::Degraded {
            reason: format!("text extraction failed: {}", e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_reason() {
        assert!(RowOutcome::Success.is_success());
        assert_eq!(RowOutcome::Success.reason(), None);
        let failed = RowOutcome::Failed {
            reason: "fetch failed".into(),
        };
        assert_eq!(failed.reason(), Some("fetch failed"));
    }

    #[test]
    fn test_extraction_outcome() {
        assert!(extraction_outcome(&ExtractedDocument::ok("x".into(), 1)).is_success());
        let degraded = extraction_outcome(&ExtractedDocument::failed("bad xref"));
        assert!(matches!(degraded, RowOutcome::Degraded { reason } if reason.contains("bad xref")));
    }

    #[test]
    fn test_run_report_counts() {
        let record = |status| ResultRecord {
            company: "Acme".into(),
            expected_filename: "rel".into(),
            status,
            recommendations: vec![],
            link: None,
        };
        let report = RunReport {
            mode: RunMode::Normal { diagnostics: false },
            results: vec![record(RowStatus::Found), record(RowStatus::NotFound)],
            diagnostics: vec![],
            outcomes: vec![
                RowOutcome::Success,
                RowOutcome::Failed {
                    reason: "x".into(),
                },
            ],
            elapsed: Duration::ZERO,
        };
        assert_eq!(report.found_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.degraded_count(), 0);
    }
}
