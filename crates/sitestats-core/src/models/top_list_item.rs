use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::metric::{MetricType, SiteMetric};
use super::metrics_set::{MetricsSet, SiteMetricsSet};
use crate::error::StatsError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TopListItemType {
    PostsAndPages,
    Authors,
    Referrers,
    Locations,
    Videos,
    ExternalLinks,
    SearchTerms,
    FileDownloads,
    Archive,
}

impl TopListItemType {
    pub const ALL: [TopListItemType; 9] = [
        Self::PostsAndPages,
        Self::Authors,
        Self::Referrers,
        Self::Locations,
        Self::Videos,
        Self::ExternalLinks,
        Self::SearchTerms,
        Self::FileDownloads,
        Self::Archive,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::PostsAndPages => "postsAndPages",
            Self::Authors => "authors",
            Self::Referrers => "referrers",
            Self::Locations => "locations",
            Self::Videos => "videos",
            Self::ExternalLinks => "externalLinks",
            Self::SearchTerms => "searchTerms",
            Self::FileDownloads => "fileDownloads",
            Self::Archive => "archive",
        }
    }
}

impl fmt::Display for TopListItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TopListItemType {
    type Err = StatsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.key() == value)
            .ok_or_else(|| StatsError::UnknownItemType {
                value: value.to_string(),
            })
    }
}

/// Identity of a ranked item.
///
/// The item type is part of the key: a post and an author may both use the
/// raw id "1", and they must not collide when mixed in one list.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopListItemId {
    pub item_type: TopListItemType,
    pub id: String,
}

impl TopListItemId {
    pub fn new(item_type: TopListItemType, id: impl Into<String>) -> Self {
        Self {
            item_type,
            id: id.into(),
        }
    }
}

impl fmt::Display for TopListItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.item_type, self.id)
    }
}

/// Anything that can be ranked in a top list: an identity plus a metric row.
pub trait RankedItem: Clone {
    type Metric: MetricType;

    fn id(&self) -> TopListItemId;
    fn metrics(&self) -> &MetricsSet<Self::Metric>;
    fn metrics_mut(&mut self) -> &mut MetricsSet<Self::Metric>;
    fn display_name(&self) -> String;

    fn value(&self, metric: Self::Metric) -> Option<i64> {
        self.metrics().get(metric)
    }
}

// =============================================================================
// Item kinds
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub title: String,
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(default)]
    pub post_url: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, rename = "type")]
    pub post_type: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub metrics: SiteMetricsSet,
}

/// Referrer with optional sub-referrers (e.g. search engine -> search terms).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Referrer {
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub children: Vec<Referrer>,
    #[serde(default)]
    pub metrics: SiteMetricsSet,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub metrics: SiteMetricsSet,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    pub user_id: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub posts: Option<Vec<Post>>,
    #[serde(default)]
    pub metrics: SiteMetricsSet,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalLink {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub children: Vec<ExternalLink>,
    #[serde(default)]
    pub metrics: SiteMetricsSet,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDownload {
    pub file_name: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub metrics: SiteMetricsSet,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTerm {
    pub term: String,
    #[serde(default)]
    pub metrics: SiteMetricsSet,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub title: String,
    pub post_id: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub metrics: SiteMetricsSet,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveItem {
    pub href: String,
    pub value: String,
    #[serde(default)]
    pub metrics: SiteMetricsSet,
}

/// Group of archive entries (pages, categories, tags...). The section's own
/// metrics already include its entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveSection {
    pub section_name: String,
    #[serde(default)]
    pub items: Vec<ArchiveItem>,
    #[serde(default)]
    pub metrics: SiteMetricsSet,
}

/// One entry of a top list. Child lists (sub-referrers, archive entries,
/// author posts) are display-only and never ranked on their own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TopListItem {
    Post(Post),
    Referrer(Referrer),
    Location(Location),
    Author(Author),
    ExternalLink(ExternalLink),
    FileDownload(FileDownload),
    SearchTerm(SearchTerm),
    Video(Video),
    ArchiveItem(ArchiveItem),
    ArchiveSection(ArchiveSection),
}

impl TopListItem {
    pub fn item_type(&self) -> TopListItemType {
        match self {
            Self::Post(_) => TopListItemType::PostsAndPages,
            Self::Referrer(_) => TopListItemType::Referrers,
            Self::Location(_) => TopListItemType::Locations,
            Self::Author(_) => TopListItemType::Authors,
            Self::ExternalLink(_) => TopListItemType::ExternalLinks,
            Self::FileDownload(_) => TopListItemType::FileDownloads,
            Self::SearchTerm(_) => TopListItemType::SearchTerms,
            Self::Video(_) => TopListItemType::Videos,
            Self::ArchiveItem(_) | Self::ArchiveSection(_) => TopListItemType::Archive,
        }
    }

    fn raw_id(&self) -> String {
        match self {
            Self::Post(post) => post.post_id.clone().unwrap_or_else(|| post.title.clone()),
            Self::Referrer(referrer) => format!(
                "{}{}",
                referrer.domain.as_deref().unwrap_or("-"),
                referrer.name
            ),
            Self::Location(location) => location.name.clone(),
            Self::Author(author) => author.user_id.clone(),
            Self::ExternalLink(link) => {
                format!("{}{}", link.url, link.title.as_deref().unwrap_or(""))
            }
            Self::FileDownload(file) => file
                .file_path
                .clone()
                .unwrap_or_else(|| file.file_name.clone()),
            Self::SearchTerm(term) => term.term.clone(),
            Self::Video(video) => video.post_id.clone(),
            Self::ArchiveItem(item) => item.href.clone(),
            Self::ArchiveSection(section) => section.section_name.clone(),
        }
    }
}

impl RankedItem for TopListItem {
    type Metric = SiteMetric;

    fn id(&self) -> TopListItemId {
        TopListItemId::new(self.item_type(), self.raw_id())
    }

    fn display_name(&self) -> String {
        match self {
            Self::Post(post) => post.title.clone(),
            Self::Referrer(referrer) => referrer.name.clone(),
            Self::Location(location) => location.name.clone(),
            Self::Author(author) => author.name.clone(),
            Self::ExternalLink(link) => link.title.clone().unwrap_or_else(|| link.url.clone()),
            Self::FileDownload(file) => file.file_name.clone(),
            Self::SearchTerm(term) => term.term.clone(),
            Self::Video(video) => video.title.clone(),
            Self::ArchiveItem(item) => item.value.clone(),
            Self::ArchiveSection(section) => capitalize(&section.section_name),
        }
    }

    fn metrics(&self) -> &SiteMetricsSet {
        match self {
            Self::Post(item) => &item.metrics,
            Self::Referrer(item) => &item.metrics,
            Self::Location(item) => &item.metrics,
            Self::Author(item) => &item.metrics,
            Self::ExternalLink(item) => &item.metrics,
            Self::FileDownload(item) => &item.metrics,
            Self::SearchTerm(item) => &item.metrics,
            Self::Video(item) => &item.metrics,
            Self::ArchiveItem(item) => &item.metrics,
            Self::ArchiveSection(item) => &item.metrics,
        }
    }

    fn metrics_mut(&mut self) -> &mut SiteMetricsSet {
        match self {
            Self::Post(item) => &mut item.metrics,
            Self::Referrer(item) => &mut item.metrics,
            Self::Location(item) => &mut item.metrics,
            Self::Author(item) => &mut item.metrics,
            Self::ExternalLink(item) => &mut item.metrics,
            Self::FileDownload(item) => &mut item.metrics,
            Self::SearchTerm(item) => &mut item.metrics,
            Self::Video(item) => &mut item.metrics,
            Self::ArchiveItem(item) => &mut item.metrics,
            Self::ArchiveSection(item) => &mut item.metrics,
        }
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_term(term: &str, views: i64) -> TopListItem {
        TopListItem::SearchTerm(SearchTerm {
            term: term.to_string(),
            metrics: SiteMetricsSet::new().with(SiteMetric::Views, views),
        })
    }

    #[test]
    fn test_ids_are_scoped_by_item_type() {
        let post = TopListItem::Post(Post {
            title: "Hello".to_string(),
            post_id: Some("1".to_string()),
            post_url: None,
            date: None,
            post_type: None,
            author: None,
            metrics: SiteMetricsSet::new(),
        });
        let author = TopListItem::Author(Author {
            name: "Alex".to_string(),
            user_id: "1".to_string(),
            role: None,
            avatar_url: None,
            posts: None,
            metrics: SiteMetricsSet::new(),
        });

        assert_eq!(post.id().id, author.id().id);
        assert_ne!(post.id(), author.id());
    }

    #[test]
    fn test_identity_fallbacks() {
        let referrer = TopListItem::Referrer(Referrer {
            name: "Google".to_string(),
            domain: None,
            icon_url: None,
            children: vec![],
            metrics: SiteMetricsSet::new(),
        });
        assert_eq!(referrer.id().id, "-Google");

        let file = TopListItem::FileDownload(FileDownload {
            file_name: "report.pdf".to_string(),
            file_path: None,
            metrics: SiteMetricsSet::new(),
        });
        assert_eq!(file.id().id, "report.pdf");
    }

    #[test]
    fn test_archive_section_display_name() {
        let section = TopListItem::ArchiveSection(ArchiveSection {
            section_name: "categories".to_string(),
            items: vec![],
            metrics: SiteMetricsSet::new(),
        });
        assert_eq!(section.display_name(), "Categories");
        assert_eq!(section.item_type(), TopListItemType::Archive);
    }

    #[test]
    fn test_metrics_mut_writes_through() {
        let mut item = search_term("tokio", 10);
        item.metrics_mut().set(SiteMetric::Views, Some(25));
        assert_eq!(item.value(SiteMetric::Views), Some(25));
    }

    #[test]
    fn test_deserialize_tagged_item() {
        let json = r#"{
            "kind": "referrer",
            "name": "Google",
            "domain": "google.com",
            "children": [
                {"name": "rust tutorial", "metrics": {"views": 40}}
            ],
            "metrics": {"views": 120}
        }"#;
        let item: TopListItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id(), TopListItemId::new(TopListItemType::Referrers, "google.comGoogle"));
        assert_eq!(item.value(SiteMetric::Views), Some(120));
        match item {
            TopListItem::Referrer(referrer) => assert_eq!(referrer.children.len(), 1),
            other => panic!("unexpected item: {:?}", other),
        }
    }
}
