//! Query-type keyword dispatch
//!
//! A search request is turned into a [`SearchPlan`] first: effective type,
//! pager and exactly one [`Strategy`] with its parameters already parsed and
//! defaulted. Executing the plan makes a single call to the search port.
//! Planning is pure and never touches the request parameters it reads.

use anyhow::Result;
use indexmap::IndexMap;
use serde::Serialize;

use crate::config::ApiConfig;
use crate::core::app::App;
use crate::core::error::ApiResult;
use crate::core::object::DomainObject;
use crate::core::pager::Pager;
use crate::core::params::QueryMap;
use crate::core::service::{GeoQuery, SearchService};
use crate::server::state::ApiState;

/// Path-level type override meaning "take the type from the `type` parameter"
pub const SEARCH_MARKER: &str = "search";

const DEFAULT_RADIUS_KM: u32 = 10;

/// One search strategy with its parsed arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Id {
        id: Option<String>,
    },
    Ids {
        ids: Vec<String>,
    },
    Nearby {
        query: String,
        geo: GeoQuery,
    },
    Prefix {
        field: String,
        prefix: String,
    },
    Similar {
        filter_id: Option<String>,
        fields: Vec<String>,
        like: String,
    },
    Tagged {
        tags: Vec<String>,
    },
    In {
        field: String,
        terms: Vec<String>,
    },
    Terms {
        terms: IndexMap<String, String>,
        match_all: bool,
        count_only: bool,
    },
    Wildcard {
        field: String,
        query: String,
    },
    Count,
    Query {
        query: String,
    },
    /// Required parameters were missing or malformed; yields no results
    Empty,
}

impl Strategy {
    /// Select and parameterise the strategy for a query-type keyword
    ///
    /// Unknown keywords fall back to a full-text query.
    pub fn from_keyword(keyword: &str, params: &QueryMap, separator: &str) -> Self {
        let query = if params.contains("q") {
            params.first("q").unwrap_or_default().to_string()
        } else {
            "*".to_string()
        };
        let text = |key: &str| params.first(key).unwrap_or_default().to_string();
        let list = |key: &str| params.all(key).map(<[String]>::to_vec);

        match keyword {
            "id" => Strategy::Id {
                id: params.first("id").map(str::to_string),
            },
            "ids" => Strategy::Ids {
                ids: list("ids").unwrap_or_default(),
            },
            "nearby" => match params.first("latlng").and_then(|v| v.split_once(',')) {
                Some((lat, lng)) => Strategy::Nearby {
                    query,
                    geo: GeoQuery {
                        lat: lat.trim().parse().unwrap_or(0.0),
                        lng: lng.trim().parse().unwrap_or(0.0),
                        radius_km: params.parse_or("radius", DEFAULT_RADIUS_KM),
                    },
                },
                None => Strategy::Empty,
            },
            "prefix" => Strategy::Prefix {
                field: text("field"),
                prefix: text("prefix"),
            },
            "similar" => match list("fields") {
                Some(fields) => Strategy::Similar {
                    filter_id: params.first("filterid").map(str::to_string),
                    fields,
                    like: text("like"),
                },
                None => Strategy::Empty,
            },
            "tagged" => match list("tags") {
                Some(tags) => Strategy::Tagged { tags },
                None => Strategy::Empty,
            },
            "in" => Strategy::In {
                field: text("field"),
                terms: list("terms").unwrap_or_default(),
            },
            "terms" => match params.all("terms") {
                Some(tuples) => Strategy::Terms {
                    terms: parse_term_tuples(tuples, separator),
                    match_all: params.flag("matchall").unwrap_or(true),
                    count_only: params.contains("count"),
                },
                None => Strategy::Empty,
            },
            "wildcard" => Strategy::Wildcard {
                field: text("field"),
                query,
            },
            "count" => Strategy::Count,
            _ => Strategy::Query { query },
        }
    }
}

/// Split `field<sep>value` tuples, dropping blank or separator-less ones
pub fn parse_term_tuples(tuples: &[String], separator: &str) -> IndexMap<String, String> {
    tuples
        .iter()
        .filter(|t| !t.trim().is_empty())
        .filter_map(|t| t.split_once(separator))
        .map(|(field, value)| (field.to_string(), value.to_string()))
        .collect()
}

/// Everything needed to run one search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    /// Requested type, not yet resolved to its canonical name
    pub object_type: Option<String>,
    pub querytype: String,
    pub pager: Pager,
    pub strategy: Strategy,
}

/// Search response envelope
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub items: Vec<DomainObject>,
    pub page: u64,
    pub total_hits: u64,
}

/// Maps query-type keywords onto the search port
pub struct QueryDispatcher;

impl QueryDispatcher {
    /// Build a plan from the path segments and query parameters
    ///
    /// `type_override` comes from the path and wins over the `type` parameter
    /// unless it is blank or the [`SEARCH_MARKER`]. `querytype` comes from the
    /// path and falls back to the `querytype` parameter.
    pub fn plan(
        type_override: Option<&str>,
        querytype: Option<&str>,
        params: &QueryMap,
        config: &ApiConfig,
    ) -> SearchPlan {
        let object_type = match type_override.map(str::trim) {
            Some(t) if !t.is_empty() && t != SEARCH_MARKER => Some(t.to_string()),
            _ => params.non_blank("type").map(str::to_string),
        };
        let querytype = querytype
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .or_else(|| params.non_blank("querytype"))
            .unwrap_or_default()
            .to_string();

        SearchPlan {
            strategy: Strategy::from_keyword(&querytype, params, &config.separator),
            pager: Pager::from_params(params, config.default_limit, config.max_limit),
            object_type,
            querytype,
        }
    }

    /// Run a plan against the search port for a canonical type
    pub async fn execute(
        search: &dyn SearchService,
        appid: &str,
        object_type: Option<&str>,
        strategy: Strategy,
        mut pager: Pager,
    ) -> Result<SearchResult> {
        let items = match strategy {
            Strategy::Id { id } => match id {
                Some(id) => match search.find_by_id(appid, &id).await? {
                    Some(found) => {
                        pager.count = 1;
                        vec![found]
                    }
                    None => Vec::new(),
                },
                None => Vec::new(),
            },
            Strategy::Ids { ids } => {
                let found = search.find_by_ids(appid, &ids).await?;
                pager.count = found.len() as u64;
                found
            }
            Strategy::Nearby { query, geo } => {
                search
                    .find_nearby(appid, object_type, &query, geo, &mut pager)
                    .await?
            }
            Strategy::Prefix { field, prefix } => {
                search
                    .find_prefix(appid, object_type, &field, &prefix, &mut pager)
                    .await?
            }
            Strategy::Similar {
                filter_id,
                fields,
                like,
            } => {
                search
                    .find_similar(
                        appid,
                        object_type,
                        filter_id.as_deref(),
                        &fields,
                        &like,
                        &mut pager,
                    )
                    .await?
            }
            Strategy::Tagged { tags } => {
                search
                    .find_tagged(appid, object_type, &tags, &mut pager)
                    .await?
            }
            Strategy::In { field, terms } => {
                search
                    .find_term_in_list(appid, object_type, &field, &terms, &mut pager)
                    .await?
            }
            Strategy::Terms {
                terms,
                match_all,
                count_only,
            } => {
                if count_only {
                    pager.count = search.count_terms(appid, object_type, &terms).await?;
                    Vec::new()
                } else {
                    search
                        .find_terms(appid, object_type, &terms, match_all, &mut pager)
                        .await?
                }
            }
            Strategy::Wildcard { field, query } => {
                search
                    .find_wildcard(appid, object_type, &field, &query, &mut pager)
                    .await?
            }
            Strategy::Count => {
                pager.count = search.count(appid, object_type).await?;
                Vec::new()
            }
            Strategy::Query { query } => {
                search
                    .find_query(appid, object_type, &query, &mut pager)
                    .await?
            }
            Strategy::Empty => Vec::new(),
        };

        Ok(SearchResult {
            items,
            page: pager.page,
            total_hits: pager.count,
        })
    }

    /// Plan, resolve the type for the tenant and execute
    pub async fn dispatch(
        state: &ApiState,
        app: &App,
        type_override: Option<&str>,
        querytype: Option<&str>,
        params: &QueryMap,
    ) -> ApiResult<SearchResult> {
        let plan = Self::plan(type_override, querytype, params, &state.config);
        let object_type = plan
            .object_type
            .as_deref()
            .map(|t| state.types.resolve(app, t));

        tracing::debug!(
            appid = %app.appid,
            querytype = %plan.querytype,
            object_type = object_type.as_deref().unwrap_or("*"),
            "dispatching search"
        );

        let result = Self::execute(
            state.search.as_ref(),
            &app.appid,
            object_type.as_deref(),
            plan.strategy,
            plan.pager,
        )
        .await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use serde_json::json;

    fn plan(querytype: &str, query: &str) -> SearchPlan {
        QueryDispatcher::plan(
            Some("user"),
            Some(querytype),
            &QueryMap::parse(query),
            &ApiConfig::default(),
        )
    }

    #[test]
    fn test_terms_drop_malformed_tuples() {
        let plan = plan("terms", "terms=a:1&terms=b&terms=");
        let mut expected = IndexMap::new();
        expected.insert("a".to_string(), "1".to_string());
        assert_eq!(
            plan.strategy,
            Strategy::Terms {
                terms: expected,
                match_all: true,
                count_only: false,
            }
        );
    }

    #[test]
    fn test_terms_split_on_first_separator() {
        let parsed = parse_term_tuples(&["url:http://x".to_string()], ":");
        assert_eq!(parsed["url"], "http://x");
    }

    #[test]
    fn test_terms_flags() {
        let plan = plan("terms", "terms=a:1&matchall=false&count");
        assert!(matches!(
            plan.strategy,
            Strategy::Terms {
                match_all: false,
                count_only: true,
                ..
            }
        ));
    }

    #[test]
    fn test_terms_absent_is_empty() {
        assert_eq!(plan("terms", "").strategy, Strategy::Empty);
    }

    #[test]
    fn test_nearby_malformed_is_empty() {
        assert_eq!(plan("nearby", "").strategy, Strategy::Empty);
        assert_eq!(plan("nearby", "latlng=40.7").strategy, Strategy::Empty);
    }

    #[test]
    fn test_nearby_defaults() {
        let plan = plan("nearby", "latlng=40.7,abc");
        assert_eq!(
            plan.strategy,
            Strategy::Nearby {
                query: "*".to_string(),
                geo: GeoQuery {
                    lat: 40.7,
                    lng: 0.0,
                    radius_km: 10,
                },
            }
        );
    }

    #[test]
    fn test_similar_and_tagged_need_their_lists() {
        assert_eq!(plan("similar", "like=x").strategy, Strategy::Empty);
        assert_eq!(plan("tagged", "").strategy, Strategy::Empty);
        assert!(matches!(
            plan("tagged", "tags=a&tags=b").strategy,
            Strategy::Tagged { ref tags } if tags.len() == 2
        ));
    }

    #[test]
    fn test_unknown_keyword_is_full_text() {
        assert_eq!(
            plan("bogus", "").strategy,
            Strategy::Query {
                query: "*".to_string()
            }
        );
        assert_eq!(
            plan("", "q=").strategy,
            Strategy::Query {
                query: String::new()
            }
        );
    }

    #[test]
    fn test_type_override_and_marker() {
        let params = QueryMap::parse("type=cats");
        let config = ApiConfig::default();
        let plan = QueryDispatcher::plan(Some("dogs"), None, &params, &config);
        assert_eq!(plan.object_type.as_deref(), Some("dogs"));

        let plan = QueryDispatcher::plan(Some(SEARCH_MARKER), None, &params, &config);
        assert_eq!(plan.object_type.as_deref(), Some("cats"));

        let plan = QueryDispatcher::plan(None, None, &QueryMap::default(), &config);
        assert_eq!(plan.object_type, None);
    }

    #[test]
    fn test_querytype_param_fallback() {
        let params = QueryMap::parse("querytype=count");
        let plan = QueryDispatcher::plan(Some("user"), Some(" "), &params, &ApiConfig::default());
        assert_eq!(plan.querytype, "count");
        assert_eq!(plan.strategy, Strategy::Count);
    }

    #[test]
    fn test_plan_does_not_mutate_params() {
        let params = QueryMap::parse("terms=a:1&terms=b&page=2");
        let before = params.clone();
        QueryDispatcher::plan(Some("user"), Some("terms"), &params, &ApiConfig::default());
        assert_eq!(params, before);
    }

    async fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        for (id, name) in [("1", "Ann"), ("2", "Bo")] {
            let obj = DomainObject::from_payload("app", "user", json!({"id": id, "name": name}))
                .unwrap();
            store.index("app", &obj).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_execute_id_sets_count() {
        let store = seeded().await;
        let found = plan("id", "id=2");
        let result =
            QueryDispatcher::execute(&store, "app", Some("user"), found.strategy, found.pager)
                .await
                .unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.total_hits, 1);

        let missing = plan("id", "id=zzz");
        let result =
            QueryDispatcher::execute(&store, "app", Some("user"), missing.strategy, missing.pager)
                .await
                .unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.total_hits, 0);
    }

    #[tokio::test]
    async fn test_execute_count_returns_no_items() {
        let store = seeded().await;
        let counted = plan("count", "");
        let result =
            QueryDispatcher::execute(&store, "app", Some("user"), counted.strategy, counted.pager)
                .await
                .unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.total_hits, 2);
    }

    #[tokio::test]
    async fn test_execute_empty_strategy() {
        let store = seeded().await;
        let result = QueryDispatcher::execute(
            &store,
            "app",
            Some("user"),
            Strategy::Empty,
            Pager::new(30),
        )
        .await
        .unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.page, 0);
    }

    #[test]
    fn test_result_envelope_shape() {
        let result = SearchResult {
            items: Vec::new(),
            page: 0,
            total_hits: 5,
        };
        let value = serde_json::to_value(result).unwrap();
        assert_eq!(value, json!({"items": [], "page": 0, "totalHits": 5}));
    }
}
