//! Canvas host boundary.
//!
//! The engine reads canvas objects through [`CanvasGateway`] and writes back
//! only through [`CanvasGateway::set_attributes`]. A [`CanvasNode`] is a
//! point-in-time read; mutation always addresses the host's live object by
//! [`NodeId`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::CanvasError;
use crate::ids::NodeId;

/// Image attachment descriptor of a canvas object (its background image).
///
/// Everything besides `url` and `altText` (crop, fit, resolution, ...) is
/// carried opaquely in `properties` and survives [`Self::clone_with_alt_text`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttachment {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl ImageAttachment {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt_text: None,
            properties: Map::new(),
        }
    }

    pub fn with_alt_text(mut self, alt_text: impl Into<String>) -> Self {
        self.alt_text = Some(alt_text.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Copy of this descriptor with only the alt text replaced.
    pub fn clone_with_alt_text(&self, alt_text: impl Into<String>) -> Self {
        Self {
            alt_text: Some(alt_text.into()),
            ..self.clone()
        }
    }

    /// The image location, if it is usable for generation.
    pub fn resolvable_url(&self) -> Option<&str> {
        let url = self.url.trim();
        (!url.is_empty()).then_some(url)
    }
}

/// A canvas object as read from the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasNode {
    pub id: NodeId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "backgroundImage")]
    pub image: Option<ImageAttachment>,
    /// Whether the host accepts attribute mutations for this node.
    #[serde(default = "default_editable")]
    pub editable: bool,
}

fn default_editable() -> bool {
    true
}

impl CanvasNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: NodeId::from_raw(id),
            name: None,
            image: None,
            editable: true,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    /// True when the node has an image attachment the host will let us rewrite.
    pub fn supports_attribute_mutation(&self) -> bool {
        self.editable && self.image.is_some()
    }
}

/// Attribute patch sent to the host. Only populated fields are changed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAttributes {
    #[serde(
        default,
        rename = "backgroundImage",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_attachment: Option<ImageAttachment>,
}

impl NodeAttributes {
    pub fn image_attachment(attachment: ImageAttachment) -> Self {
        Self {
            image_attachment: Some(attachment),
        }
    }
}

/// Canvas host API consumed by the engine.
#[async_trait]
pub trait CanvasGateway: Send + Sync {
    /// All objects exposing a background-image attachment.
    async fn list_image_nodes(&self) -> Result<Vec<CanvasNode>, CanvasError>;

    /// The image the operator currently has selected, if any.
    async fn selected_image(&self) -> Result<Option<CanvasNode>, CanvasError>;

    /// Current state of one object. `None` if the host no longer has it.
    async fn node(&self, id: &NodeId) -> Result<Option<CanvasNode>, CanvasError>;

    async fn set_attributes(
        &self,
        id: &NodeId,
        attributes: NodeAttributes,
    ) -> Result<(), CanvasError>;
}
