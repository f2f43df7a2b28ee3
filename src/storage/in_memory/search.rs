//! Search index over the in-memory store

use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;

use super::InMemoryStore;
use crate::core::object::DomainObject;
use crate::core::pager::Pager;
use crate::core::service::{GeoQuery, SearchService};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Sort, count and slice a result set according to the pager
pub(crate) fn paginate(mut items: Vec<DomainObject>, pager: &mut Pager) -> Vec<DomainObject> {
    pager.count = items.len() as u64;

    let sortby = pager.sortby.as_deref().unwrap_or("timestamp");
    items.sort_by(|a, b| {
        compare_values(a.field(sortby).as_ref(), b.field(sortby).as_ref())
            .then_with(|| a.id.cmp(&b.id))
    });
    if pager.desc {
        items.reverse();
    }

    items
        .into_iter()
        .skip(pager.offset())
        .take(pager.limit)
        .collect()
}

/// Missing values sort first; numbers compare numerically, the rest as text
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

/// Case-insensitive glob supporting `*` and `?`
fn glob(pattern: &str) -> Option<Regex> {
    let mut expr = String::from("(?i)^");
    for c in pattern.chars() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    Regex::new(&expr).ok()
}

/// Every searchable string of an object, lowercased
fn searchable_text(object: &DomainObject) -> Vec<String> {
    let mut text = vec![object.id.to_lowercase()];
    for value in object.properties.values() {
        match value {
            Value::String(s) => text.push(s.to_lowercase()),
            Value::Number(n) => text.push(n.to_string()),
            Value::Array(items) => text.extend(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_lowercase),
            ),
            _ => {}
        }
    }
    text
}

/// Full-text match: `*` or blank matches all, globs match whole values,
/// anything else is a case-insensitive substring
fn matches_query(object: &DomainObject, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() || query == "*" {
        return true;
    }
    let text = searchable_text(object);
    if query.contains(['*', '?']) {
        return glob(query).is_some_and(|re| text.iter().any(|t| re.is_match(t)));
    }
    let needle = query.to_lowercase();
    text.iter().any(|t| t.contains(&needle))
}

fn matches_terms(object: &DomainObject, terms: &IndexMap<String, String>, match_all: bool) -> bool {
    if terms.is_empty() {
        return false;
    }
    let mut hits = terms
        .iter()
        .map(|(field, value)| object.field_text(field).as_deref() == Some(value.as_str()));
    if match_all {
        hits.all(|hit| hit)
    } else {
        hits.any(|hit| hit)
    }
}

fn parse_lat_lng(value: &str) -> Option<(f64, f64)> {
    let (lat, lng) = value.split_once(',')?;
    Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?))
}

/// Great-circle distance in kilometres
fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lng1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lng2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

impl InMemoryStore {
    /// Indexed objects of a tenant passing the type filter and predicate
    fn select<F>(&self, appid: &str, object_type: Option<&str>, predicate: F) -> Result<Vec<DomainObject>>
    where
        F: Fn(&DomainObject) -> bool,
    {
        let index = self.index_read()?;
        Ok(index
            .get(appid)
            .map(|tenant| {
                tenant
                    .values()
                    .filter(|o| object_type.is_none_or(|t| o.object_type == t))
                    .filter(|o| predicate(o))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl SearchService for InMemoryStore {
    async fn index(&self, appid: &str, object: &DomainObject) -> Result<()> {
        let mut index = self.index_write()?;
        index
            .entry(appid.to_string())
            .or_default()
            .insert(object.id.clone(), object.clone());
        Ok(())
    }

    async fn unindex(&self, appid: &str, object: &DomainObject) -> Result<()> {
        let mut index = self.index_write()?;
        if let Some(tenant) = index.get_mut(appid) {
            tenant.remove(&object.id);
        }
        Ok(())
    }

    async fn find_by_id(&self, appid: &str, id: &str) -> Result<Option<DomainObject>> {
        let index = self.index_read()?;
        Ok(index.get(appid).and_then(|t| t.get(id)).cloned())
    }

    async fn find_by_ids(&self, appid: &str, ids: &[String]) -> Result<Vec<DomainObject>> {
        let index = self.index_read()?;
        let Some(tenant) = index.get(appid) else {
            return Ok(Vec::new());
        };
        Ok(ids.iter().filter_map(|id| tenant.get(id).cloned()).collect())
    }

    async fn find_nearby(
        &self,
        appid: &str,
        object_type: Option<&str>,
        query: &str,
        geo: GeoQuery,
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>> {
        let center = (geo.lat, geo.lng);
        let radius = f64::from(geo.radius_km);
        let found = self.select(appid, object_type, |o| {
            o.field_text("latlng")
                .as_deref()
                .and_then(parse_lat_lng)
                .is_some_and(|point| haversine_km(center, point) <= radius)
                && matches_query(o, query)
        })?;
        Ok(paginate(found, pager))
    }

    async fn find_prefix(
        &self,
        appid: &str,
        object_type: Option<&str>,
        field: &str,
        prefix: &str,
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>> {
        let found = self.select(appid, object_type, |o| {
            o.field_text(field).is_some_and(|v| v.starts_with(prefix))
        })?;
        Ok(paginate(found, pager))
    }

    async fn find_similar(
        &self,
        appid: &str,
        object_type: Option<&str>,
        filter_id: Option<&str>,
        fields: &[String],
        like: &str,
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>> {
        let words: Vec<String> = like.split_whitespace().map(str::to_lowercase).collect();
        if words.is_empty() {
            pager.count = 0;
            return Ok(Vec::new());
        }
        let found = self.select(appid, object_type, |o| {
            Some(o.id.as_str()) != filter_id
                && fields.iter().any(|field| {
                    o.field_text(field).is_some_and(|text| {
                        let text = text.to_lowercase();
                        words.iter().any(|w| text.contains(w.as_str()))
                    })
                })
        })?;
        Ok(paginate(found, pager))
    }

    async fn find_tagged(
        &self,
        appid: &str,
        object_type: Option<&str>,
        tags: &[String],
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>> {
        let found = self.select(appid, object_type, |o| {
            let own = o.tags();
            tags.iter().all(|tag| own.contains(&tag.as_str()))
        })?;
        Ok(paginate(found, pager))
    }

    async fn find_term_in_list(
        &self,
        appid: &str,
        object_type: Option<&str>,
        field: &str,
        terms: &[String],
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>> {
        let found = self.select(appid, object_type, |o| {
            o.field_text(field).is_some_and(|v| terms.contains(&v))
        })?;
        Ok(paginate(found, pager))
    }

    async fn find_terms(
        &self,
        appid: &str,
        object_type: Option<&str>,
        terms: &IndexMap<String, String>,
        match_all: bool,
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>> {
        let found = self.select(appid, object_type, |o| matches_terms(o, terms, match_all))?;
        Ok(paginate(found, pager))
    }

    async fn find_wildcard(
        &self,
        appid: &str,
        object_type: Option<&str>,
        field: &str,
        wildcard: &str,
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>> {
        let Some(pattern) = glob(wildcard) else {
            pager.count = 0;
            return Ok(Vec::new());
        };
        let found = self.select(appid, object_type, |o| {
            o.field_text(field).is_some_and(|v| pattern.is_match(&v))
        })?;
        Ok(paginate(found, pager))
    }

    async fn find_query(
        &self,
        appid: &str,
        object_type: Option<&str>,
        query: &str,
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>> {
        let found = self.select(appid, object_type, |o| matches_query(o, query))?;
        Ok(paginate(found, pager))
    }

    async fn count(&self, appid: &str, object_type: Option<&str>) -> Result<u64> {
        Ok(self.select(appid, object_type, |_| true)?.len() as u64)
    }

    async fn count_terms(
        &self,
        appid: &str,
        object_type: Option<&str>,
        terms: &IndexMap<String, String>,
    ) -> Result<u64> {
        Ok(self
            .select(appid, object_type, |o| matches_terms(o, terms, true))?
            .len() as u64)
    }
}
