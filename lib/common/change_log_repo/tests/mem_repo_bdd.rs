//! MemChangeLogRepo BDD 测试
//!
//! 场景：变更向量以批次写入，查询按时间戳降序返回

use asset_diff::{AttributeChange, AttributeName, ChangeVector, Iri, Literal, PreviousValue};
use change_log_repo::{ChangeLogRepo, Comment, CommentRepo, MemChangeLogRepo, MemCommentRepo};
use chrono::{DateTime, TimeZone, Utc};

const TERM: &str = "http://example.org/Term";
const VOCABULARY: &str = "http://example.org/Vocabulary";

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).single().unwrap()
}

fn update(entity_type: &str, entity: &str, attribute: &str, secs: i64) -> ChangeVector {
    AttributeChange::new(
        entity_type,
        Iri::from(entity),
        AttributeName::Attribute(Iri::from(attribute)),
        Some(PreviousValue::Literal(Literal::text("old"))),
    )
    .stamp(at(secs), &Iri::from("http://example.org/users/alice"))
}

// ============================================================================
// BDD 场景 1：查询单个资产的历史
// ============================================================================

#[test]
fn scenario_entity_history_is_newest_first() {
    // ========== Given（给定）==========
    let repo = MemChangeLogRepo::new();
    repo.append(&[update(TERM, "t1", "http://x/label", 10)]).unwrap();
    repo.append(&[update(TERM, "t2", "http://x/label", 20)]).unwrap();
    repo.append(&[
        update(TERM, "t1", "http://x/definition", 30),
        update(TERM, "t1", "http://x/source", 30),
    ])
    .unwrap();

    // ========== When（当）==========
    let history = repo.find_all_for_entity(TERM, &Iri::from("t1")).unwrap();

    // ========== Then（那么）==========
    assert_eq!(history.len(), 3);
    assert!(history.iter().all(|v| v.entity_id().as_str() == "t1"));
    assert_eq!(*history[2].timestamp(), at(10));
    // 同一批次内后写入的排在前面
    assert_eq!(history[0].attribute_name().as_str(), "http://x/source");
    assert_eq!(history[1].attribute_name().as_str(), "http://x/definition");
}

// ============================================================================
// BDD 场景 2：按类型和起始时间过滤
// ============================================================================

#[test]
fn scenario_changes_of_type_since_filters_type_and_time() {
    // ========== Given（给定）==========
    let repo = MemChangeLogRepo::with_records(vec![
        update(TERM, "t1", "http://x/label", 10),
        update(VOCABULARY, "v1", "http://x/title", 15),
        update(TERM, "t2", "http://x/label", 20),
        update(TERM, "t3", "http://x/label", 30),
    ]);

    // ========== When（当）==========
    let recent = repo.find_changes_of_type_since(at(20), TERM).unwrap();
    let all_terms = repo.find_changes_of_type(TERM).unwrap();

    // ========== Then（那么）==========
    let ids: Vec<_> = recent.iter().map(|v| v.entity_id().as_str()).collect();
    assert_eq!(ids, vec!["t3", "t2"]);
    assert_eq!(all_terms.len(), 3);
    assert_eq!(repo.count().unwrap(), 4);
}

// ============================================================================
// BDD 场景 3：评论按资产类型查询
// ============================================================================

#[test]
fn scenario_comments_are_scoped_by_asset_type() {
    // ========== Given（给定）==========
    let comments = MemCommentRepo::new();
    comments.add_comment(
        TERM,
        Comment::new(Iri::from("c1"), Iri::from("t1"), Iri::from("u1"), "hi".into(), at(0), None),
    );
    comments.add_comment(
        VOCABULARY,
        Comment::new(Iri::from("c2"), Iri::from("v1"), Iri::from("u1"), "yo".into(), at(5), None),
    );

    // ========== When（当）==========
    let on_terms = comments.find_comments_on_type(TERM).unwrap();

    // ========== Then（那么）==========
    assert_eq!(on_terms.len(), 1);
    assert_eq!(on_terms[0].id(), &Iri::from("c1"));
}
