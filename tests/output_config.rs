//! Tests for the output-section registry: defaults, merging, toggling and
//! prompt construction.

mod common;

use common::TestFixture;
use fin_snap::sections::{
    self, build_system_prompt, defaults, merge_with_defaults, OutputSectionId,
    OUTPUT_CONFIG_STORAGE_KEY,
};
use std::collections::HashMap;

#[test]
fn merge_with_empty_map_returns_exact_defaults() {
    let merged = merge_with_defaults(&HashMap::new());
    assert_eq!(merged, defaults());
}

#[test]
fn merge_applies_known_ids_and_ignores_unknown_ones() {
    let mut saved = HashMap::new();
    saved.insert("technical".to_string(), true);
    saved.insert("bogus_id".to_string(), true);

    let merged = merge_with_defaults(&saved);

    for (section, default) in merged.iter().zip(defaults()) {
        if section.id == OutputSectionId::Technical {
            assert!(section.enabled, "technical should be enabled by the map");
        } else {
            assert_eq!(
                section.enabled, default.enabled,
                "{} should keep its default flag",
                section.id.as_str()
            );
        }
    }
}

#[test]
fn merge_preserves_catalog_order() {
    let mut saved = HashMap::new();
    saved.insert("risk_factors".to_string(), false);
    saved.insert("financials".to_string(), true);

    let merged = merge_with_defaults(&saved);
    let ids: Vec<&str> = merged.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "basic_info",
            "key_metrics",
            "summary",
            "investment_points",
            "risk_factors",
            "dividend_detail",
            "financials",
            "technical",
        ]
    );
}

#[test]
fn prompt_contains_header_and_enabled_blocks_in_order() {
    let config = defaults();
    let prompt = build_system_prompt(&config);

    assert!(prompt.contains("## 📊 [종목명] ([티커]) 스냅샷"));

    // Enabled blocks in catalog order.
    let basic = prompt.find("### 기본 정보").expect("basic info block");
    let metrics = prompt.find("### 📊 핵심 지표").expect("key metrics block");
    let summary = prompt.find("### 💡 한줄 요약").expect("summary block");
    let points = prompt.find("### 📌 투자 포인트").expect("points block");
    let risks = prompt.find("### ⚠️ 리스크 요인").expect("risks block");
    assert!(basic < metrics && metrics < summary && summary < points && points < risks);

    // Disabled blocks never appear.
    assert!(!prompt.contains("### 💰 배당 상세"));
    assert!(!prompt.contains("### 🏦 재무 요약"));
    assert!(!prompt.contains("### 📈 기술적 지표"));
}

#[test]
fn prompt_includes_block_for_each_enabled_section() {
    let mut saved = HashMap::new();
    saved.insert("dividend_detail".to_string(), true);
    saved.insert("summary".to_string(), false);

    let config = merge_with_defaults(&saved);
    let prompt = build_system_prompt(&config);

    assert!(prompt.contains("### 💰 배당 상세"));
    assert!(!prompt.contains("### 💡 한줄 요약"));
}

#[test]
fn toggling_twice_round_trips() {
    let fixture = TestFixture::new();
    let mut config = fixture.section_store.load();
    let original = config.clone();

    fixture
        .section_store
        .toggle(&mut config, OutputSectionId::Technical);
    assert_ne!(config, original);

    fixture
        .section_store
        .toggle(&mut config, OutputSectionId::Technical);
    assert_eq!(config, original);
}

#[test]
fn toggle_persists_immediately() {
    let fixture = TestFixture::new();
    let mut config = fixture.section_store.load();

    fixture
        .section_store
        .toggle(&mut config, OutputSectionId::Financials);

    // A second store over the same backing sees the change.
    let reloaded = fixture.section_store.load();
    let financials = reloaded
        .iter()
        .find(|s| s.id == OutputSectionId::Financials)
        .unwrap();
    assert!(financials.enabled);
}

#[test]
fn corrupt_persisted_config_falls_back_to_defaults() {
    let fixture = TestFixture::new();
    fixture.seed(OUTPUT_CONFIG_STORAGE_KEY, "][ not json");
    assert_eq!(fixture.section_store.load(), defaults());
}

#[test]
fn persisted_subset_only_overrides_named_ids() {
    let fixture = TestFixture::new();
    fixture.seed(OUTPUT_CONFIG_STORAGE_KEY, r#"{"basic_info": false}"#);

    let config = fixture.section_store.load();
    assert!(!config[0].enabled, "basic_info overridden off");
    assert_eq!(sections::enabled_count(&config), 4);
}
