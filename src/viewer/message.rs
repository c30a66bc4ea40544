//! JSON messages exchanged with the renderer inside the surface

use serde::{Deserialize, Serialize};

use crate::synctex::RenderPosition;

/// Session to renderer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// Render this document from scratch
    LoadDocument {
        #[serde(rename = "documentUrl")]
        document_url: String,
    },
    /// Scroll to a page and flash a highlight at (x, y), scaled by the current zoom
    ScrollToPosition { page: u32, x: f64, y: f64 },
}

impl From<RenderPosition> for OutboundMessage {
    fn from(pos: RenderPosition) -> Self {
        Self::ScrollToPosition {
            page: pos.page,
            x: pos.x,
            y: pos.y,
        }
    }
}

impl OutboundMessage {
    #[must_use]
    pub fn to_json(&self) -> String {
        // Plain data with string keys; serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Renderer to session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum InboundMessage {
    /// Modifier-click on a page; coordinates already descaled
    SyncPdfToTex { page: u32, x: f64, y: f64 },
    /// Initial load finished
    Ready,
    /// Renderer-side failure, e.g. a malformed document
    Error { text: String },
}

impl InboundMessage {
    pub fn parse(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn load_document_wire_format() {
        let msg = OutboundMessage::LoadDocument {
            document_url: "surface://proj/doc.pdf".to_string(),
        };
        let value: serde_json::Value = serde_json::from_str(&msg.to_json()).unwrap();
        assert_eq!(
            value,
            json!({"command": "loadDocument", "documentUrl": "surface://proj/doc.pdf"})
        );
    }

    #[test]
    fn scroll_to_position_wire_format() {
        let msg = OutboundMessage::from(RenderPosition::new(2, 100.0, 200.0));
        let value: serde_json::Value = serde_json::from_str(&msg.to_json()).unwrap();
        assert_eq!(
            value,
            json!({"command": "scrollToPosition", "page": 2, "x": 100.0, "y": 200.0})
        );
    }

    #[test]
    fn parses_inbound_commands() {
        assert_eq!(
            InboundMessage::parse(r#"{"command":"syncPdfToTex","page":3,"x":10.5,"y":20}"#)
                .unwrap(),
            InboundMessage::SyncPdfToTex {
                page: 3,
                x: 10.5,
                y: 20.0
            }
        );
        assert_eq!(
            InboundMessage::parse(r#"{"command":"ready"}"#).unwrap(),
            InboundMessage::Ready
        );
        assert_eq!(
            InboundMessage::parse(r#"{"command":"error","text":"Invalid PDF structure"}"#)
                .unwrap(),
            InboundMessage::Error {
                text: "Invalid PDF structure".to_string()
            }
        );
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(InboundMessage::parse(r#"{"command":"zoomChanged","scale":2}"#).is_err());
    }
}
