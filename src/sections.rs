use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Storage key for the persisted section on/off map.
pub const OUTPUT_CONFIG_STORAGE_KEY: &str = "fin-snap:output-config";

/// Identifiers of the togglable report sections. Closed set; the prompt
/// builder switches exhaustively over these.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OutputSectionId {
    BasicInfo,
    KeyMetrics,
    Summary,
    InvestmentPoints,
    RiskFactors,
    DividendDetail,
    Financials,
    Technical,
}

impl OutputSectionId {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSectionId::BasicInfo => "basic_info",
            OutputSectionId::KeyMetrics => "key_metrics",
            OutputSectionId::Summary => "summary",
            OutputSectionId::InvestmentPoints => "investment_points",
            OutputSectionId::RiskFactors => "risk_factors",
            OutputSectionId::DividendDetail => "dividend_detail",
            OutputSectionId::Financials => "financials",
            OutputSectionId::Technical => "technical",
        }
    }
}

/// One togglable block of the generated report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSection {
    pub id: OutputSectionId,
    pub label: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
    pub enabled: bool,
}

/// Ordered set of all eight sections; order is display and prompt order.
pub type OutputConfig = Vec<OutputSection>;

/// The fixed catalog with canonical default flags (first five enabled).
pub fn defaults() -> OutputConfig {
    vec![
        OutputSection {
            id: OutputSectionId::BasicInfo,
            label: "기본 정보",
            emoji: "📋",
            description: "종목 유형, 상장 거래소, 섹터",
            enabled: true,
        },
        OutputSection {
            id: OutputSectionId::KeyMetrics,
            label: "핵심 지표",
            emoji: "📊",
            description: "현재가, PER, 배당수익률, 시가총액",
            enabled: true,
        },
        OutputSection {
            id: OutputSectionId::Summary,
            label: "한줄 요약",
            emoji: "💡",
            description: "이 종목을 한 문장으로",
            enabled: true,
        },
        OutputSection {
            id: OutputSectionId::InvestmentPoints,
            label: "투자 포인트",
            emoji: "📌",
            description: "핵심 투자 이유",
            enabled: true,
        },
        OutputSection {
            id: OutputSectionId::RiskFactors,
            label: "리스크 요인",
            emoji: "⚠️",
            description: "주요 투자 위험",
            enabled: true,
        },
        OutputSection {
            id: OutputSectionId::DividendDetail,
            label: "배당 상세",
            emoji: "💰",
            description: "배당 이력, 성장률, 지급 빈도",
            enabled: false,
        },
        OutputSection {
            id: OutputSectionId::Financials,
            label: "재무 요약",
            emoji: "🏦",
            description: "매출, 영업이익, 부채비율",
            enabled: false,
        },
        OutputSection {
            id: OutputSectionId::Technical,
            label: "기술적 지표",
            emoji: "📈",
            description: "52주 고저가, 이동평균",
            enabled: false,
        },
    ]
}

/// Restore a configuration from a persisted `{id: bool}` map.
///
/// Unknown ids are ignored; missing ids keep the catalog default. The
/// result always carries all eight sections in catalog order.
pub fn merge_with_defaults(saved: &HashMap<String, bool>) -> OutputConfig {
    defaults()
        .into_iter()
        .map(|mut section| {
            if let Some(&enabled) = saved.get(section.id.as_str()) {
                section.enabled = enabled;
            }
            section
        })
        .collect()
}

/// Fixed markdown sub-template for one section.
fn section_block(id: OutputSectionId) -> &'static str {
    match id {
        OutputSectionId::BasicInfo => {
            "### 기본 정보\n\
             - **종목 유형**: 주식 / ETF / 기타\n\
             - **상장 거래소**: NASDAQ / NYSE / KRX / 기타\n\
             - **섹터/카테고리**: 예) 반도체, 성장 ETF, 배당 ETF"
        }
        OutputSectionId::KeyMetrics => {
            "### 📊 핵심 지표 (실시간 검색 기반)\n\
             | 지표 | 값 |\n\
             |------|-----|\n\
             | 현재가 | $ / ₩ |\n\
             | PER (TTM) | |\n\
             | 배당수익률 | |\n\
             | 시가총액 | |"
        }
        OutputSectionId::Summary => {
            "### 💡 한줄 요약\n\
             > 이 종목을 한 문장으로 설명하면?"
        }
        OutputSectionId::InvestmentPoints => {
            "### 📌 투자 포인트\n\
             - 포인트 1\n\
             - 포인트 2\n\
             - 포인트 3"
        }
        OutputSectionId::RiskFactors => {
            "### ⚠️ 리스크 요인\n\
             - 리스크 1\n\
             - 리스크 2"
        }
        OutputSectionId::DividendDetail => {
            "### 💰 배당 상세\n\
             | 항목 | 값 |\n\
             |------|-----|\n\
             | 연간 배당금 | |\n\
             | 배당 성장률 (5년) | |\n\
             | 지급 빈도 | 분기 / 월 / 반기 / 연 |\n\
             | 최근 배당락일 | |\n\
             | 배당 지속 연수 | |"
        }
        OutputSectionId::Financials => {
            "### 🏦 재무 요약 (최근 연간)\n\
             | 항목 | 값 |\n\
             |------|-----|\n\
             | 매출액 | |\n\
             | 영업이익 | |\n\
             | 순이익 | |\n\
             | 부채비율 | |\n\
             | ROE | |"
        }
        OutputSectionId::Technical => {
            "### 📈 기술적 지표\n\
             | 항목 | 값 |\n\
             |------|-----|\n\
             | 52주 최고가 | |\n\
             | 52주 최저가 | |\n\
             | 50일 이동평균 | |\n\
             | 200일 이동평균 | |"
        }
    }
}

/// Build the provider-neutral system prompt from the enabled sections.
///
/// Preamble and disclaimer footer are always emitted, even when no section
/// is enabled (degenerate but valid prompt).
pub fn build_system_prompt(config: &[OutputSection]) -> String {
    let blocks: Vec<&'static str> = config
        .iter()
        .filter(|s| s.enabled)
        .map(|s| section_block(s.id))
        .collect();

    format!(
        "당신은 금융 정보 전문가입니다. 사용자가 주식 또는 ETF 종목명/티커를 입력하면,\n\
         Google 검색을 통해 수집한 최신 정보를 바탕으로 아래 형식으로 핵심 투자 정보를 마크다운으로 요약해주세요.\n\
         \n\
         ## 📊 [종목명] ([티커]) 스냅샷\n\
         \n\
         {}\n\
         \n\
         ---\n\
         *이 정보는 Google 검색을 통해 수집한 최신 데이터를 기반으로 AI가 요약한 것입니다. 투자 전 반드시 공식 정보를 확인하세요.*",
        blocks.join("\n\n")
    )
}

/// Persists the section on/off map through a [`KeyValueStore`].
#[derive(Clone)]
pub struct SectionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SectionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the persisted configuration merged over defaults. Absent or
    /// unreadable data yields the plain defaults.
    pub fn load(&self) -> OutputConfig {
        let Some(raw) = self.store.get(OUTPUT_CONFIG_STORAGE_KEY) else {
            return defaults();
        };
        match serde_json::from_str::<HashMap<String, bool>>(&raw) {
            Ok(saved) => merge_with_defaults(&saved),
            Err(e) => {
                tracing::debug!(error = %e, "stored output config unreadable, using defaults");
                defaults()
            }
        }
    }

    /// Persist the full `{id: bool}` map for `config`.
    pub fn save(&self, config: &[OutputSection]) {
        let map: HashMap<&str, bool> = config
            .iter()
            .map(|s| (s.id.as_str(), s.enabled))
            .collect();
        match serde_json::to_string(&map) {
            Ok(raw) => self.store.set(OUTPUT_CONFIG_STORAGE_KEY, &raw),
            Err(e) => tracing::debug!(error = %e, "failed to serialize output config"),
        }
    }

    /// Flip one section's flag in `config` and persist the result.
    pub fn toggle(&self, config: &mut OutputConfig, id: OutputSectionId) {
        if let Some(section) = config.iter_mut().find(|s| s.id == id) {
            section.enabled = !section.enabled;
        }
        self.save(config);
    }
}

/// Number of enabled sections, shown in the sections panel.
pub fn enabled_count(config: &[OutputSection]) -> usize {
    config.iter().filter(|s| s.enabled).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_eight_sections_five_enabled() {
        let config = defaults();
        assert_eq!(config.len(), 8);
        assert_eq!(enabled_count(&config), 5);
        assert_eq!(config[0].id, OutputSectionId::BasicInfo);
        assert_eq!(config[7].id, OutputSectionId::Technical);
    }

    #[test]
    fn section_ids_serialize_as_snake_case() {
        let raw = serde_json::to_string(&OutputSectionId::InvestmentPoints).unwrap();
        assert_eq!(raw, r#""investment_points""#);
    }

    #[test]
    fn prompt_footer_survives_empty_config() {
        let mut config = defaults();
        for section in &mut config {
            section.enabled = false;
        }
        let prompt = build_system_prompt(&config);
        assert!(prompt.contains("## 📊 [종목명] ([티커]) 스냅샷"));
        assert!(prompt.contains("투자 전 반드시 공식 정보를 확인하세요."));
        assert!(!prompt.contains("### "));
    }
}
