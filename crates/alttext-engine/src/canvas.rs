//! In-process canvas host.
//!
//! Backs tests and hosts that hand over a document snapshot instead of a
//! live canvas. Mutations are applied to the stored nodes and recorded.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::Deserialize;

use alttext_core::canvas::{CanvasGateway, CanvasNode, NodeAttributes};
use alttext_core::errors::CanvasError;
use alttext_core::ids::NodeId;

/// Serialized canvas document accepted by [`MemoryCanvas::from_json`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CanvasDocument {
    #[serde(default)]
    nodes: Vec<CanvasNode>,
    #[serde(default)]
    selection: Option<NodeId>,
}

#[derive(Default)]
struct Faults {
    listing: Option<CanvasError>,
    listing_delay: Option<Duration>,
    mutation: Option<CanvasError>,
    mutation_delay: Option<Duration>,
}

pub struct MemoryCanvas {
    nodes: RwLock<Vec<CanvasNode>>,
    selection: RwLock<Option<NodeId>>,
    enumerable: RwLock<bool>,
    faults: Mutex<Faults>,
    mutations: Mutex<Vec<(NodeId, NodeAttributes)>>,
}

impl MemoryCanvas {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(Vec::new()),
            selection: RwLock::new(None),
            enumerable: RwLock::new(true),
            faults: Mutex::new(Faults::default()),
            mutations: Mutex::new(Vec::new()),
        }
    }

    pub fn with_nodes(nodes: impl IntoIterator<Item = CanvasNode>) -> Self {
        let canvas = Self::new();
        *canvas.nodes.write() = nodes.into_iter().collect();
        canvas
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let doc: CanvasDocument = serde_json::from_str(json)?;
        let canvas = Self::with_nodes(doc.nodes);
        *canvas.selection.write() = doc.selection;
        Ok(canvas)
    }

    /// Insert or replace a node (matched by id).
    pub fn upsert(&self, node: CanvasNode) {
        let mut nodes = self.nodes.write();
        match nodes.iter_mut().find(|n| n.id == node.id) {
            Some(existing) => *existing = node,
            None => nodes.push(node),
        }
    }

    pub fn remove(&self, id: &NodeId) -> bool {
        let mut nodes = self.nodes.write();
        let before = nodes.len();
        nodes.retain(|n| &n.id != id);
        nodes.len() != before
    }

    pub fn select(&self, id: Option<NodeId>) {
        *self.selection.write() = id;
    }

    /// Hide nodes from enumeration while keeping them selectable, like
    /// hosts that expose only the active selection.
    pub fn set_enumerable(&self, enumerable: bool) {
        *self.enumerable.write() = enumerable;
    }

    pub fn fail_listing(&self, error: Option<CanvasError>) {
        self.faults.lock().listing = error;
    }

    pub fn delay_listing(&self, delay: Option<Duration>) {
        self.faults.lock().listing_delay = delay;
    }

    pub fn fail_mutations(&self, error: Option<CanvasError>) {
        self.faults.lock().mutation = error;
    }

    pub fn delay_mutations(&self, delay: Option<Duration>) {
        self.faults.lock().mutation_delay = delay;
    }

    pub fn node_snapshot(&self, id: &NodeId) -> Option<CanvasNode> {
        self.nodes.read().iter().find(|n| &n.id == id).cloned()
    }

    /// Every accepted `set_attributes` call, in order.
    pub fn mutations(&self) -> Vec<(NodeId, NodeAttributes)> {
        self.mutations.lock().clone()
    }
}

impl Default for MemoryCanvas {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CanvasGateway for MemoryCanvas {
    /// Reads the document first, then waits out any listing delay, like a
    /// host that is slow to return a snapshot it already took.
    async fn list_image_nodes(&self) -> Result<Vec<CanvasNode>, CanvasError> {
        let (listed, delay) = {
            let faults = self.faults.lock();
            let listed = match &faults.listing {
                Some(err) => Err(err.clone()),
                None if !*self.enumerable.read() => Ok(Vec::new()),
                None => Ok(self
                    .nodes
                    .read()
                    .iter()
                    .filter(|n| n.image.is_some())
                    .cloned()
                    .collect()),
            };
            (listed, faults.listing_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        listed
    }

    async fn selected_image(&self) -> Result<Option<CanvasNode>, CanvasError> {
        let selection = self.selection.read().clone();
        Ok(selection.and_then(|id| self.node_snapshot(&id)))
    }

    async fn node(&self, id: &NodeId) -> Result<Option<CanvasNode>, CanvasError> {
        Ok(self.node_snapshot(id))
    }

    async fn set_attributes(
        &self,
        id: &NodeId,
        attributes: NodeAttributes,
    ) -> Result<(), CanvasError> {
        let delay = self.faults.lock().mutation_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.faults.lock().mutation.clone() {
            return Err(err);
        }

        {
            let mut nodes = self.nodes.write();
            let node = nodes
                .iter_mut()
                .find(|n| &n.id == id)
                .ok_or_else(|| CanvasError::NodeNotFound(id.clone()))?;
            if !node.editable {
                return Err(CanvasError::NotMutable(id.clone()));
            }
            if let Some(attachment) = &attributes.image_attachment {
                node.image = Some(attachment.clone());
            }
        }

        self.mutations.lock().push((id.clone(), attributes));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alttext_core::canvas::ImageAttachment;

    fn image_node(id: &str) -> CanvasNode {
        CanvasNode::new(id).with_image(ImageAttachment::new(format!("https://img/{id}.png")))
    }

    #[tokio::test]
    async fn lists_only_image_nodes_in_order() {
        let canvas = MemoryCanvas::with_nodes([image_node("b"), CanvasNode::new("text"), image_node("a")]);
        let ids: Vec<_> = canvas
            .list_image_nodes()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.id.to_string())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn selection_survives_disabled_enumeration() {
        let canvas = MemoryCanvas::with_nodes([image_node("a")]);
        canvas.set_enumerable(false);
        canvas.select(Some(NodeId::from_raw("a")));

        assert!(canvas.list_image_nodes().await.unwrap().is_empty());
        let selected = canvas.selected_image().await.unwrap().unwrap();
        assert_eq!(selected.id.as_str(), "a");
    }

    #[tokio::test]
    async fn set_attributes_updates_node_and_records_call() {
        let canvas = MemoryCanvas::with_nodes([image_node("a")]);
        let id = NodeId::from_raw("a");
        let patch = NodeAttributes::image_attachment(
            ImageAttachment::new("https://img/a.png").with_alt_text("alt"),
        );

        canvas.set_attributes(&id, patch.clone()).await.unwrap();

        let stored = canvas.node_snapshot(&id).unwrap();
        assert_eq!(stored.image.unwrap().alt_text.as_deref(), Some("alt"));
        assert_eq!(canvas.mutations(), vec![(id, patch)]);
    }

    #[tokio::test]
    async fn read_only_node_rejects_mutation() {
        let canvas = MemoryCanvas::with_nodes([image_node("a").read_only()]);
        let err = canvas
            .set_attributes(&NodeId::from_raw("a"), NodeAttributes::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CanvasError::NotMutable(_)));
        assert!(canvas.mutations().is_empty());
    }

    #[tokio::test]
    async fn scripted_faults() {
        let canvas = MemoryCanvas::with_nodes([image_node("a")]);
        canvas.fail_listing(Some(CanvasError::Unavailable("offline".into())));
        assert!(canvas.list_image_nodes().await.is_err());

        canvas.fail_mutations(Some(CanvasError::Rejected("locked layer".into())));
        assert!(canvas
            .set_attributes(&NodeId::from_raw("a"), NodeAttributes::default())
            .await
            .is_err());
    }

    #[test]
    fn loads_json_document() {
        let canvas = MemoryCanvas::from_json(
            r#"{
                "nodes": [
                    {"id": "n1", "name": "Logo", "backgroundImage": {"url": "u1", "altText": "logo"}},
                    {"id": "n2"}
                ],
                "selection": "n1"
            }"#,
        )
        .unwrap();

        let n1 = canvas.node_snapshot(&NodeId::from_raw("n1")).unwrap();
        assert_eq!(n1.name.as_deref(), Some("Logo"));
        assert!(canvas.node_snapshot(&NodeId::from_raw("n2")).unwrap().image.is_none());
        assert_eq!(*canvas.selection.read(), Some(NodeId::from_raw("n1")));
    }
}
