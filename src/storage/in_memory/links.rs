//! Link graph over the in-memory store

use anyhow::Result;
use async_trait::async_trait;

use super::InMemoryStore;
use super::search::paginate;
use crate::core::object::DomainObject;
use crate::core::pager::Pager;
use crate::core::service::LinkService;

/// A symmetric edge between two typed objects
///
/// Endpoints are stored in canonical order, so (a, b) and (b, a) describe
/// the same record and share one id.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LinkRecord {
    pub id: String,
    pub type1: String,
    pub id1: String,
    pub type2: String,
    pub id2: String,
}

impl LinkRecord {
    pub fn new(a: (&str, &str), b: (&str, &str), separator: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            id: [first.0, first.1, second.0, second.1].join(separator),
            type1: first.0.to_string(),
            id1: first.1.to_string(),
            type2: second.0.to_string(),
            id2: second.1.to_string(),
        }
    }

    pub fn touches(&self, object_type: &str, id: &str) -> bool {
        (self.type1 == object_type && self.id1 == id) || (self.type2 == object_type && self.id2 == id)
    }

    /// The far endpoint as seen from `(object_type, id)`
    pub fn other_end(&self, object_type: &str, id: &str) -> Option<(&str, &str)> {
        if self.type1 == object_type && self.id1 == id {
            Some((self.type2.as_str(), self.id2.as_str()))
        } else if self.type2 == object_type && self.id2 == id {
            Some((self.type1.as_str(), self.id1.as_str()))
        } else {
            None
        }
    }
}

impl InMemoryStore {
    fn link_id(&self, source: &DomainObject, target_type: &str, target_id: &str) -> String {
        LinkRecord::new(
            (source.object_type.as_str(), source.id.as_str()),
            (target_type, target_id),
            &self.separator,
        )
        .id
    }

    /// Ids of the objects of `target_type` linked to `source`
    fn linked_ids(&self, appid: &str, source: &DomainObject, target_type: &str) -> Result<Vec<String>> {
        let links = self.links_read()?;
        Ok(links
            .get(appid)
            .map(|edges| {
                edges
                    .values()
                    .filter_map(|edge| edge.other_end(&source.object_type, &source.id))
                    .filter(|(t, _)| *t == target_type)
                    .map(|(_, id)| id.to_string())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn child_objects(
        &self,
        appid: &str,
        source: &DomainObject,
        child_type: &str,
        filter: Option<(&str, &str)>,
    ) -> Result<Vec<DomainObject>> {
        let objects = self.objects_read()?;
        Ok(objects
            .get(appid)
            .map(|tenant| {
                tenant
                    .values()
                    .filter(|o| o.object_type == child_type)
                    .filter(|o| o.parentid.as_deref() == Some(source.id.as_str()))
                    .filter(|o| {
                        filter.is_none_or(|(field, term)| o.field_text(field).as_deref() == Some(term))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl LinkService for InMemoryStore {
    async fn link(
        &self,
        appid: &str,
        source: &DomainObject,
        target_id: &str,
    ) -> Result<Option<String>> {
        if target_id == source.id {
            return Ok(None);
        }
        let target_type = {
            let objects = self.objects_read()?;
            match objects.get(appid).and_then(|t| t.get(target_id)) {
                Some(target) => target.object_type.clone(),
                None => return Ok(None),
            }
        };

        let record = LinkRecord::new(
            (source.object_type.as_str(), source.id.as_str()),
            (target_type.as_str(), target_id),
            &self.separator,
        );
        let id = record.id.clone();
        let mut links = self.links_write()?;
        links
            .entry(appid.to_string())
            .or_default()
            .insert(id.clone(), record);
        Ok(Some(id))
    }

    async fn unlink(
        &self,
        appid: &str,
        source: &DomainObject,
        target_type: &str,
        target_id: &str,
    ) -> Result<()> {
        let id = self.link_id(source, target_type, target_id);
        let mut links = self.links_write()?;
        if let Some(edges) = links.get_mut(appid) {
            edges.remove(&id);
        }
        Ok(())
    }

    async fn unlink_all(&self, appid: &str, source: &DomainObject) -> Result<()> {
        self.remove_edges_of(appid, &source.object_type, &source.id)?;
        Ok(())
    }

    async fn is_linked(
        &self,
        appid: &str,
        source: &DomainObject,
        target_type: &str,
        target_id: &str,
    ) -> Result<bool> {
        let id = self.link_id(source, target_type, target_id);
        let links = self.links_read()?;
        Ok(links.get(appid).is_some_and(|edges| edges.contains_key(&id)))
    }

    async fn linked_objects(
        &self,
        appid: &str,
        source: &DomainObject,
        target_type: &str,
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>> {
        let ids = self.linked_ids(appid, source, target_type)?;
        let objects = self.objects_read()?;
        let found: Vec<DomainObject> = objects
            .get(appid)
            .map(|tenant| ids.iter().filter_map(|id| tenant.get(id).cloned()).collect())
            .unwrap_or_default();
        Ok(paginate(found, pager))
    }

    async fn count_links(
        &self,
        appid: &str,
        source: &DomainObject,
        target_type: &str,
    ) -> Result<u64> {
        Ok(self.linked_ids(appid, source, target_type)?.len() as u64)
    }

    async fn children(
        &self,
        appid: &str,
        source: &DomainObject,
        child_type: &str,
        filter: Option<(&str, &str)>,
        pager: &mut Pager,
    ) -> Result<Vec<DomainObject>> {
        let found = self.child_objects(appid, source, child_type, filter)?;
        Ok(paginate(found, pager))
    }

    async fn count_children(
        &self,
        appid: &str,
        source: &DomainObject,
        child_type: &str,
    ) -> Result<u64> {
        Ok(self.child_objects(appid, source, child_type, None)?.len() as u64)
    }

    async fn delete_children(
        &self,
        appid: &str,
        source: &DomainObject,
        child_type: &str,
    ) -> Result<()> {
        let children = self.child_objects(appid, source, child_type, None)?;
        {
            let mut objects = self.objects_write()?;
            let mut index = self.index_write()?;
            for child in &children {
                if let Some(tenant) = objects.get_mut(appid) {
                    tenant.remove(&child.id);
                }
                if let Some(tenant) = index.get_mut(appid) {
                    tenant.remove(&child.id);
                }
            }
        }
        for child in &children {
            self.remove_edges_of(appid, &child.object_type, &child.id)?;
        }
        tracing::debug!(appid, parent = %source.id, child_type, deleted = children.len(), "deleted children");
        Ok(())
    }
}
