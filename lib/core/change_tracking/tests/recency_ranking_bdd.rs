//! 最近活动排名 BDD 测试

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use asset_diff::{ChangeVector, Iri, Literal, MultilingualString};
use change_log_repo::{ChangeLogRepo, MemCommentRepo, RepoError};
use change_tracking::adaptor::inbound::InMemoryUserLookup;
use change_tracking::{
    AssetLookup, AssetSummary, ChangeKind, RankingError, RecencyRanker, TrackingConfig, User,
};
use chrono::{DateTime, Utc};
use common::*;

const E1: &str = "http://example.org/terms/e1";
const E2: &str = "http://example.org/terms/e2";
const E3: &str = "http://example.org/terms/e3";

/// 降序变更流 (E1,t5,bob) (E2,t4,bob) (E1,t3,alice) (E3,t2,alice)
fn edited_fixture() -> Fixture {
    let fixture = Fixture::new();
    fixture.edit(TERM, E3, &alice(), 2);
    fixture.edit(TERM, E1, &alice(), 3);
    fixture.edit(TERM, E2, &bob(), 4);
    fixture.edit(TERM, E1, &bob(), 5);
    fixture.register_term(E1, "Building");
    fixture.register_term(E2, "House");
    fixture.register_term(E3, "Roof");
    fixture
}

// ============================================================================
// 场景 1: 最近编辑去重并截断
// ============================================================================

#[test]
fn scenario_last_edited_keeps_latest_change_per_asset() {
    // ========== Given（给定）==========
    let fixture = edited_fixture();

    // ========== When（当）==========
    let top_two = fixture.service.find_last_edited(TERM, 2).unwrap();
    let all = fixture.service.find_last_edited(TERM, 10).unwrap();

    // ========== Then（那么）==========
    assert_eq!(ids(&top_two, |a| &a.id), vec![E1, E2]);
    assert_eq!(top_two[0].modified, at(5));
    assert_eq!(top_two[0].modified_by, bob().id);
    assert_eq!(top_two[0].editor, Some(bob()));
    assert_eq!(top_two[0].label, "Building");
    assert_eq!(top_two[0].asset_type, TERM);
    assert_eq!(top_two[0].change_kinds, BTreeSet::from([ChangeKind::Update]));
    assert_eq!(top_two[1].modified, at(4));

    assert_eq!(ids(&all, |a| &a.id), vec![E1, E2, E3]);
    assert!(fixture.service.find_last_edited(TERM, 0).unwrap().is_empty());
}

#[test]
fn scenario_last_edited_by_author_filters_before_dedup() {
    // ========== Given（给定）==========
    let fixture = edited_fixture();

    // ========== When（当）==========
    let by_alice = fixture.service.find_last_edited_by(TERM, &alice().id, 10).unwrap();
    let by_bob = fixture.service.find_last_edited_by(TERM, &bob().id, 1).unwrap();

    // ========== Then（那么）==========
    // bob 之后的编辑不影响 alice 自己最近一次编辑 E1 的时间
    assert_eq!(ids(&by_alice, |a| &a.id), vec![E1, E3]);
    assert_eq!(by_alice[0].modified, at(3));
    assert!(by_alice.iter().all(|a| a.modified_by == alice().id));

    assert_eq!(ids(&by_bob, |a| &a.id), vec![E1]);
    assert_eq!(by_bob[0].modified, at(5));
}

#[test]
fn scenario_last_edited_reports_creation_and_ignores_other_types() {
    // ========== Given（给定）==========
    let fixture = edited_fixture();
    fixture.create(TERM, "http://example.org/terms/new", &alice(), 10);
    fixture.edit(VOCABULARY, "http://example.org/vocabularies/v1", &alice(), 20);
    fixture.edit(TERM, "http://example.org/terms/orphan", &User::new("urn:ghost", "G", "H", "ghost"), 8);

    // ========== When（当）==========
    let recent = fixture.service.find_last_edited(TERM, 2).unwrap();

    // ========== Then（那么）==========
    assert_eq!(
        ids(&recent, |a| &a.id),
        vec!["http://example.org/terms/new", "http://example.org/terms/orphan"]
    );
    assert_eq!(recent[0].change_kinds, BTreeSet::from([ChangeKind::Creation]));
    // 未知用户与缺少摘要的资产仍然返回
    assert_eq!(recent[1].editor, None);
    assert_eq!(recent[1].label, "http://example.org/terms/orphan");
}

// ============================================================================
// 场景 2: 最近评论
// ============================================================================

#[test]
fn scenario_last_comment_is_latest_regardless_of_insertion_order() {
    // ========== Given（给定）==========
    let fixture = Fixture::new();
    fixture.comment("urn:c1", E1, &alice(), 1);
    fixture.comment("urn:c3", E1, &bob(), 3);
    fixture.comment("urn:c2", E1, &alice(), 2);

    // ========== When（当）==========
    let commented = fixture.service.find_last_commented(TERM, 10).unwrap();

    // ========== Then（那么）==========
    assert_eq!(commented.len(), 1);
    assert_eq!(commented[0].last_comment.id(), &Iri::from("urn:c3"));
    assert_eq!(commented[0].last_commented, at(3));
    assert_eq!(commented[0].my_last_comment, None);
    assert_eq!(commented[0].change_kinds, BTreeSet::from([ChangeKind::Comment]));
}

#[test]
fn scenario_last_commented_orders_assets_and_breaks_ties_by_id() {
    // ========== Given（给定）==========
    let fixture = Fixture::new();
    fixture.comment("urn:c1", E1, &alice(), 3);
    fixture.comment("urn:c2", E2, &alice(), 5);
    fixture.comment("urn:c3", E3, &alice(), 4);
    fixture.comment("urn:c4", "http://example.org/terms/e0", &bob(), 4);

    // ========== When（当）==========
    let top_two = fixture.service.find_last_commented(TERM, 2).unwrap();
    let top_three = fixture.service.find_last_commented(TERM, 3).unwrap();

    // ========== Then（那么）==========
    assert_eq!(ids(&top_two, |a| &a.id), vec![E2, "http://example.org/terms/e0"]);
    assert_eq!(ids(&top_three, |a| &a.id), vec![E2, "http://example.org/terms/e0", E3]);
}

// ============================================================================
// 场景 3: 回应我的评论
// ============================================================================

#[test]
fn scenario_in_reaction_lists_assets_where_others_replied() {
    // ========== Given（给定）==========
    let fixture = Fixture::new();
    // E1: alice 先评论，bob 回应
    fixture.comment("urn:c1", E1, &alice(), 1);
    fixture.comment("urn:c2", E1, &bob(), 2);
    // E2: alice 的评论是最新的
    fixture.comment("urn:c3", E2, &bob(), 1);
    fixture.comment("urn:c4", E2, &alice(), 2);
    // E3: alice 没有评论
    fixture.comment("urn:c5", E3, &bob(), 3);
    // E0: alice 先评论，bob 回应
    fixture.comment("urn:c6", "http://example.org/terms/e0", &alice(), 4);
    fixture.comment("urn:c7", "http://example.org/terms/e0", &bob(), 6);

    // ========== When（当）==========
    let reactions = fixture.service.find_last_commented_in_reaction(TERM, &alice().id, 10).unwrap();

    // ========== Then（那么）==========
    assert_eq!(ids(&reactions, |a| &a.id), vec!["http://example.org/terms/e0", E1]);

    let e1 = &reactions[1];
    assert_eq!(e1.last_commented, at(1));
    assert_eq!(e1.last_comment.id(), &Iri::from("urn:c2"));
    assert_eq!(
        e1.my_last_comment.as_ref().map(|c| c.id().clone()),
        Some(Iri::from("urn:c1"))
    );
}

// ============================================================================
// 场景 4: 我编辑过的资产上的评论
// ============================================================================

#[test]
fn scenario_my_last_commented_is_restricted_to_my_edits() {
    // ========== Given（给定）==========
    let fixture = Fixture::new();
    fixture.edit(TERM, E1, &alice(), 1);
    fixture.edit(TERM, E2, &bob(), 1);
    fixture.comment("urn:c1", E1, &bob(), 2);
    fixture.comment("urn:c2", E2, &alice(), 5);

    // ========== When（当）==========
    let mine = fixture.service.find_my_last_commented(TERM, &alice().id, 10).unwrap();

    // ========== Then（那么）==========
    assert_eq!(ids(&mine, |a| &a.id), vec![E1]);
    assert_eq!(mine[0].last_comment.id(), &Iri::from("urn:c1"));
    assert_eq!(mine[0].last_commented, at(2));
}

// ============================================================================
// 场景 5: 标签解析与词表
// ============================================================================

#[test]
fn scenario_labels_follow_default_language() {
    // ========== Given（给定）==========
    let fixture = Fixture::with_config(TrackingConfig::new().with_default_language("cs"));
    let vocabulary = Iri::from("http://example.org/vocabularies/v1");
    fixture.assets.save(
        AssetSummary {
            id: Iri::from(E1),
            asset_type: TERM.to_string(),
            label: Some(Literal::Multilingual(
                MultilingualString::create("Building", "en").with("cs", "Budova"),
            )),
            vocabulary: None,
        }
        .with_vocabulary(vocabulary.clone()),
    );
    fixture.assets.save(AssetSummary {
        id: Iri::from(E2),
        asset_type: TERM.to_string(),
        label: Some(Literal::Multilingual(MultilingualString::create("House", "en"))),
        vocabulary: None,
    });
    fixture.edit(TERM, E1, &alice(), 2);
    fixture.edit(TERM, E2, &alice(), 1);

    // ========== When（当）==========
    let recent = fixture.service.find_last_edited(TERM, 10).unwrap();

    // ========== Then（那么）==========
    assert_eq!(recent[0].label, "Budova");
    assert_eq!(recent[0].vocabulary, Some(vocabulary));
    // 缺少默认语言时返回原始渲染
    assert_eq!(recent[1].label, "[House@en]");
    assert_eq!(recent[1].vocabulary, None);
}

#[test]
fn scenario_summary_of_derived_asset_carries_its_label() {
    // ========== Given（给定）==========
    let fixture = Fixture::new();
    let term = Term::new(E1, "Building");
    fixture.assets.save_asset(&term);
    fixture.service.record_add(&principal(&alice()), &term).unwrap();

    // ========== When（当）==========
    let recent = fixture.service.find_last_edited(TERM, 1).unwrap();

    // ========== Then（那么）==========
    assert_eq!(recent[0].label, "Building");
    assert_eq!(recent[0].change_kinds, BTreeSet::from([ChangeKind::Creation]));
}

// ============================================================================
// 场景 6: 查询失败
// ============================================================================

/// 总是查询失败的资产查询
struct FailingAssetLookup;

impl AssetLookup for FailingAssetLookup {
    fn find_asset(&self, _asset_type: &str, _id: &Iri) -> Result<Option<AssetSummary>, RepoError> {
        Err(RepoError::Backend("index unavailable".to_string()))
    }
}

#[test]
fn scenario_asset_lookup_failure_names_the_asset() {
    // ========== Given（给定）==========
    let fixture = Fixture::new();
    fixture.edit(TERM, E1, &alice(), 1);
    let ranker = RecencyRanker::new(
        fixture.change_log.clone(),
        Arc::new(MemCommentRepo::new()),
        Arc::new(FailingAssetLookup),
        Arc::new(InMemoryUserLookup::new()),
        &TrackingConfig::default(),
    );

    // ========== When（当）==========
    let result = ranker.find_last_edited(TERM, 10);

    // ========== Then（那么）==========
    match result {
        Err(RankingError::Lookup { id, source: RepoError::Backend(_) }) => {
            assert_eq!(id, Iri::from(E1));
        }
        other => panic!("expected a lookup failure, got {other:?}"),
    }
}

/// 读取总是失败的变更日志
struct UnreadableChangeLog;

impl ChangeLogRepo for UnreadableChangeLog {
    fn append(&self, _batch: &[ChangeVector]) -> Result<(), RepoError> {
        Ok(())
    }

    fn find_all_for_entity(
        &self,
        _entity_type: &str,
        _entity_id: &Iri,
    ) -> Result<Vec<ChangeVector>, RepoError> {
        Err(RepoError::Backend("change log offline".to_string()))
    }

    fn find_changes_of_type_since(
        &self,
        _since: DateTime<Utc>,
        _entity_type: &str,
    ) -> Result<Vec<ChangeVector>, RepoError> {
        Err(RepoError::Backend("change log offline".to_string()))
    }

    fn count(&self) -> Result<u64, RepoError> {
        Err(RepoError::Backend("change log offline".to_string()))
    }
}

#[test]
fn scenario_change_log_failure_is_not_an_empty_ranking() {
    // ========== Given（给定）==========
    let fixture = Fixture::new();
    fixture.register_term(E1, "Building");
    fixture.comment("c1", E1, &bob(), 1);
    let ranker = RecencyRanker::new(
        Arc::new(UnreadableChangeLog),
        fixture.comments.clone(),
        fixture.assets.clone(),
        fixture.users.clone(),
        &TrackingConfig::default(),
    );
    let me = alice().id;

    // ========== When（当）==========
    let last_edited = ranker.find_last_edited(TERM, 10);
    let last_edited_by = ranker.find_last_edited_by(TERM, &me, 10);
    let my_commented = ranker.find_my_last_commented(TERM, &me, 10);

    // ========== Then（那么）==========
    assert!(matches!(last_edited, Err(RankingError::Repo(RepoError::Backend(_)))));
    assert!(matches!(last_edited_by, Err(RankingError::Repo(RepoError::Backend(_)))));
    assert!(matches!(my_commented, Err(RankingError::Repo(RepoError::Backend(_)))));
    // 评论排名不读变更日志
    assert_eq!(ranker.find_last_commented(TERM, 10).unwrap().len(), 1);
}
