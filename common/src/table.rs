//! 出力表の列定義
//!
//! レコードを文字列セルに変換する。`None` はここで初めて "-" になる。
//! Excel出力とコンソール表示の両方で使う。

use crate::types::{DiagnosticRecord, ResultRecord, SENTINEL};

/// 結果表のヘッダー
pub const RESULT_HEADERS: &[&str] = &["Empresa", "Arquivo", "Status", "Recomendações", "Link"];

/// 診断表の列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticColumn {
    ExpectedName,
    FoundName,
    ExactMatch,
    Title,
    ReceivedDate,
    Issuer,
    Pages,
}

impl DiagnosticColumn {
    pub const ALL: [DiagnosticColumn; 7] = [
        DiagnosticColumn::ExpectedName,
        DiagnosticColumn::FoundName,
        DiagnosticColumn::ExactMatch,
        DiagnosticColumn::Title,
        DiagnosticColumn::ReceivedDate,
        DiagnosticColumn::Issuer,
        DiagnosticColumn::Pages,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            DiagnosticColumn::ExpectedName => "Nome no Excel",
            DiagnosticColumn::FoundName => "Nome Encontrado",
            DiagnosticColumn::ExactMatch => "Match Exato",
            DiagnosticColumn::Title => "Título",
            DiagnosticColumn::ReceivedDate => "Data de Recebimento",
            DiagnosticColumn::Issuer => "Empresa Elaboradora",
            DiagnosticColumn::Pages => "Páginas",
        }
    }

    pub fn cell(&self, record: &DiagnosticRecord) -> String {
        match self {
            DiagnosticColumn::ExpectedName => record.expected_filename.clone(),
            DiagnosticColumn::FoundName => or_sentinel(record.matched_name()),
            DiagnosticColumn::ExactMatch => {
                if record.exact_match { "Sim" } else { "Não" }.to_string()
            }
            DiagnosticColumn::Title => or_sentinel(record.title.as_deref()),
            DiagnosticColumn::ReceivedDate => or_sentinel(record.date.as_deref()),
            DiagnosticColumn::Issuer => or_sentinel(record.issuer.as_deref()),
            DiagnosticColumn::Pages => record
                .pages
                .map(|p| p.to_string())
                .unwrap_or_else(|| SENTINEL.to_string()),
        }
    }
}

/// 診断表の表示形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagnosticView {
    /// 全列
    Full,
    /// 詳細診断（タイトル・受領日・作成会社を除く）
    #[default]
    Detailed,
}

impl DiagnosticView {
    pub fn columns(&self) -> Vec<DiagnosticColumn> {
        match self {
            DiagnosticView::Full => DiagnosticColumn::ALL.to_vec(),
            DiagnosticView::Detailed => DiagnosticColumn::ALL
                .iter()
                .copied()
                .filter(|c| {
                    !matches!(
                        c,
                        DiagnosticColumn::Title | DiagnosticColumn::ReceivedDate | DiagnosticColumn::Issuer
                    )
                })
                .collect(),
        }
    }
}

/// None を "-" に
pub fn or_sentinel(value: Option<&str>) -> String {
    value.unwrap_or(SENTINEL).to_string()
}

/// 結果表の1行
pub fn result_cells(record: &ResultRecord) -> Vec<String> {
    vec![
        record.company.clone(),
        record.expected_filename.clone(),
        record.status.label().to_string(),
        record.recommendations_cell(),
        or_sentinel(record.link.as_deref()),
    ]
}

/// 診断表の1行
pub fn diagnostic_cells(record: &DiagnosticRecord, view: DiagnosticView) -> Vec<String> {
    view.columns().iter().map(|c| c.cell(record)).collect()
}

/// 診断表のヘッダー
pub fn diagnostic_headers(view: DiagnosticView) -> Vec<&'static str> {
    view.columns().iter().map(|c| c.header()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::build_diagnostic;
    use crate::types::RowStatus;

    #[test]
    fn test_not_found_diagnostic_renders_sentinels() {
        let diag = build_diagnostic("rel1", None, "", None);
        let cells = diagnostic_cells(&diag, DiagnosticView::Full);
        assert_eq!(cells, vec!["rel1", "-", "Não", "-", "-", "-", "-"]);
    }

    #[test]
    fn test_detailed_view_drops_columns() {
        let headers = diagnostic_headers(DiagnosticView::Detailed);
        assert_eq!(headers, vec!["Nome no Excel", "Nome Encontrado", "Match Exato", "Páginas"]);

        let diag = build_diagnostic("rel1", Some("a/b/rel1.pdf"), "Título\n01/01/2024", Some(3));
        let cells = diagnostic_cells(&diag, DiagnosticView::Detailed);
        assert_eq!(cells, vec!["rel1", "rel1.pdf", "Sim", "3"]);
    }

    #[test]
    fn test_result_cells() {
        let record = ResultRecord {
            company: "Acme".to_string(),
            expected_filename: "rel1".to_string(),
            status: RowStatus::Found,
            recommendations: vec!["A".to_string(), "B".to_string()],
            link: None,
        };
        assert_eq!(
            result_cells(&record),
            vec!["Acme", "rel1", "✔️ Encontrado", "A\nB", "-"]
        );
        assert_eq!(RESULT_HEADERS.len(), result_cells(&record).len());
    }
}
