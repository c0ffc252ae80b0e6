//! 测试夹具：派生的测试资产、固定时钟和内存仓储

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use asset_diff::{
    AssetClass, AttributeClassifier, AttributeChange, AttributeName, ChangeVector,
    FixedTimestampProvider, Iri, MultilingualString,
};
use change_log_repo::{ChangeLogRepo, Comment, MemChangeLogRepo, MemCommentRepo};
use change_tracking::adaptor::inbound::{InMemoryAssetLookup, InMemoryUserLookup};
use change_tracking::{
    AssetSummary, ChangeTracker, ChangeTrackingService, Principal, RecencyRanker, TrackingConfig,
    User,
};
use chrono::{DateTime, TimeZone, Utc};

// ============================================================================
// 测试资产定义
// ============================================================================

pub const SKOS: &str = "http://www.w3.org/2004/02/skos/core#";
pub const PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";
pub const DEFINITION: &str = "http://www.w3.org/2004/02/skos/core#definition";
pub const SOURCE: &str = "http://purl.org/dc/terms/source";
pub const IN_VOCABULARY: &str = "http://example.org/ontology/vocabulary";

/// 术语
#[derive(Debug, Clone, asset_derive::Asset)]
#[asset(type_iri = "http://example.org/ontology/Term", label = "label")]
pub struct Term {
    pub id: Iri,
    #[attr(iri = "http://www.w3.org/2004/02/skos/core#prefLabel", shape = "singular_literal")]
    pub label: MultilingualString,
    #[attr(iri = "http://www.w3.org/2004/02/skos/core#definition", shape = "singular_literal")]
    pub definition: Option<MultilingualString>,
    #[attr(iri = "http://purl.org/dc/terms/source", shape = "plural_literal")]
    pub sources: BTreeSet<String>,
    #[attr(iri = "http://www.w3.org/2004/02/skos/core#broader", shape = "plural_reference")]
    pub parents: BTreeSet<Iri>,
    #[attr(iri = "http://example.org/ontology/vocabulary", shape = "identifier")]
    pub vocabulary: Option<Iri>,
    #[attr(iri = "http://example.org/ontology/subTerms", inferred)]
    pub sub_terms: Vec<Iri>,
}

impl Term {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: Iri::from(id),
            label: MultilingualString::create(label, "en"),
            definition: None,
            sources: BTreeSet::new(),
            parents: BTreeSet::new(),
            vocabulary: None,
            sub_terms: Vec::new(),
        }
    }
}

/// 词表
#[derive(Debug, Clone, asset_derive::Asset)]
#[asset(type_iri = "http://example.org/ontology/Vocabulary", label = "title")]
pub struct Vocabulary {
    pub id: Iri,
    #[attr(iri = "http://purl.org/dc/terms/title", shape = "singular_literal")]
    pub title: String,
}

/// 文件（不记录创建事件）
#[derive(Debug, Clone, asset_derive::Asset)]
#[asset(type_iri = "http://example.org/ontology/File", label = "name", skip_creation)]
pub struct File {
    pub id: Iri,
    #[attr(iri = "http://purl.org/dc/terms/title", shape = "singular_literal")]
    pub name: String,
}

/// 未注册到分类器的资产
#[derive(Debug, Clone, asset_derive::Asset)]
#[asset(type_iri = "http://example.org/ontology/Note")]
pub struct Note {
    pub id: Iri,
}

pub const TERM: &str = <Term as AssetClass>::TYPE_IRI;
pub const VOCABULARY: &str = <Vocabulary as AssetClass>::TYPE_IRI;
pub const FILE: &str = <File as AssetClass>::TYPE_IRI;

// ============================================================================
// 用户与时间
// ============================================================================

pub fn alice() -> User {
    User::new("http://example.org/users/alice", "Alice", "Novak", "alice")
}

pub fn bob() -> User {
    User::new("http://example.org/users/bob", "Bob", "Svoboda", "bob")
}

pub fn principal(user: &User) -> Principal {
    Principal::new(user.id.clone())
}

/// 基准时间之后 `secs` 秒
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(secs)
}

pub fn classifier() -> AttributeClassifier {
    AttributeClassifier::builder()
        .register::<Term>()
        .and_then(|b| b.register::<Vocabulary>())
        .and_then(|b| b.register::<File>())
        .expect("test assets must register")
        .build()
}

// ============================================================================
// 夹具
// ============================================================================

pub struct Fixture {
    pub clock: Arc<FixedTimestampProvider>,
    pub change_log: Arc<MemChangeLogRepo>,
    pub comments: Arc<MemCommentRepo>,
    pub assets: Arc<InMemoryAssetLookup>,
    pub users: Arc<InMemoryUserLookup>,
    pub service: ChangeTrackingService,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(TrackingConfig::default())
    }

    pub fn with_config(config: TrackingConfig) -> Self {
        let clock = Arc::new(FixedTimestampProvider::new(at(0)));
        let change_log = Arc::new(MemChangeLogRepo::new());
        let comments = Arc::new(MemCommentRepo::new());
        let assets = Arc::new(InMemoryAssetLookup::new());
        let users = Arc::new(InMemoryUserLookup::new());
        users.save(alice());
        users.save(bob());

        let tracker =
            ChangeTracker::new(Arc::new(classifier()), change_log.clone(), clock.clone(), &config);
        let ranker = RecencyRanker::new(
            change_log.clone(),
            comments.clone(),
            assets.clone(),
            users.clone(),
            &config,
        );
        let service = ChangeTrackingService::from_parts(tracker, ranker, change_log.clone());

        Self { clock, change_log, comments, assets, users, service }
    }

    /// 直接向变更日志写入一条更新记录
    pub fn edit(&self, asset_type: &str, entity: &str, author: &User, secs: i64) {
        self.append(
            AttributeChange::new(
                asset_type,
                Iri::from(entity),
                AttributeName::Attribute(Iri::from(PREF_LABEL)),
                None,
            )
            .stamp(at(secs), &author.id),
        );
    }

    /// 直接向变更日志写入一条创建记录
    pub fn create(&self, asset_type: &str, entity: &str, author: &User, secs: i64) {
        self.append(
            AttributeChange::creation(asset_type, Iri::from(entity)).stamp(at(secs), &author.id),
        );
    }

    fn append(&self, vector: ChangeVector) {
        self.change_log.append(&[vector]).expect("in-memory append cannot fail");
    }

    /// 添加一条术语评论
    pub fn comment(&self, id: &str, asset: &str, author: &User, secs: i64) {
        self.comments.add_comment(
            TERM,
            Comment::new(
                Iri::from(id),
                Iri::from(asset),
                author.id.clone(),
                format!("comment {id}"),
                at(secs),
                None,
            ),
        );
    }

    /// 登记术语的展示信息
    pub fn register_term(&self, id: &str, label: &str) {
        self.assets.save(AssetSummary {
            id: Iri::from(id),
            asset_type: TERM.to_string(),
            label: Some(asset_diff::Literal::Multilingual(MultilingualString::create(label, "en"))),
            vocabulary: None,
        });
    }
}

pub fn ids<T>(items: &[T], id: impl Fn(&T) -> &Iri) -> Vec<String> {
    items.iter().map(|item| id(item).to_string()).collect()
}
