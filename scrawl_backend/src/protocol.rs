use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which synchronization variant a hub instance speaks.
///
/// The two variants are incompatible on the wire and have different
/// bandwidth/consistency trade-offs, so the choice is a deployment option
/// rather than something negotiated per connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// Per-stroke events: `start` / `draw` / `finish`.
    #[default]
    Incremental,
    /// One self-contained `send` event per completed stroke, carrying the
    /// whole encoded canvas.
    Snapshot,
}

impl FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incremental" => Ok(SyncMode::Incremental),
            "snapshot" => Ok(SyncMode::Snapshot),
            other => Err(format!("unknown sync mode: {other}")),
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Incremental => write!(f, "incremental"),
            SyncMode::Snapshot => write!(f, "snapshot"),
        }
    }
}

/// Canvas line-cap style, serialized with the canvas 2d context values.
#[derive(Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    #[default]
    Round,
    Butt,
    Square,
}

/// Style attached to a stroke at its start. Immutable for the stroke's
/// lifetime; receivers must apply it before rendering any of the stroke's
/// points.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct StyleSettings {
    // Older clients omit lineCap; it defaults to the initial canvas state.
    #[serde(rename = "lineCap", default)]
    pub line_cap: LineCap,
    #[serde(rename = "strokeStyle")]
    pub stroke_style: String,
    #[serde(rename = "lineWidth")]
    pub line_width: f64,
}

/// Events a peer sends to the hub.
///
/// Wire framing is `{"event": <name>, "data": {...}}`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Pointer down: begin a stroke at `(x, y)` with the given style.
    Start {
        x: f64,
        y: f64,
        settings: StyleSettings,
    },
    /// Pointer move while drawing: extend the current stroke to `(x, y)`.
    Draw { x: f64, y: f64 },
    /// Pointer up: close the current stroke at `(x, y)`.
    Finish { x: f64, y: f64 },
    /// Snapshot variant: the sender's entire canvas, encoded.
    Send { image: String },
}

/// Events the hub relays to every peer except the sender.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    OnStart {
        x: f64,
        y: f64,
        settings: StyleSettings,
    },
    OnDraw { x: f64, y: f64 },
    OnFinish { x: f64, y: f64 },
    OnSend { image: String },
}

impl ClientEvent {
    /// Parse and validate one inbound frame.
    ///
    /// A frame that does not decode, or decodes with invalid field values,
    /// is rejected; the caller drops the event and keeps the connection.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let event: ClientEvent = serde_json::from_str(text)?;
        event.validate()?;
        Ok(event)
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap()
    }

    fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            ClientEvent::Start { settings, .. } => {
                if !settings.line_width.is_finite() || settings.line_width <= 0.0 {
                    return Err(ProtocolError::InvalidField(
                        "settings.lineWidth must be a positive number",
                    ));
                }
                Ok(())
            }
            ClientEvent::Send { image } => {
                if image.is_empty() {
                    return Err(ProtocolError::InvalidField("image must not be empty"));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// The sync variant this event belongs to.
    pub fn mode(&self) -> SyncMode {
        match self {
            ClientEvent::Send { .. } => SyncMode::Snapshot,
            _ => SyncMode::Incremental,
        }
    }

    /// Wire name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Start { .. } => "start",
            ClientEvent::Draw { .. } => "draw",
            ClientEvent::Finish { .. } => "finish",
            ClientEvent::Send { .. } => "send",
        }
    }

    /// Map to the `on-*` event relayed to the other peers. The payload is
    /// carried through unchanged.
    pub fn into_broadcast(self) -> ServerEvent {
        match self {
            ClientEvent::Start { x, y, settings } => ServerEvent::OnStart { x, y, settings },
            ClientEvent::Draw { x, y } => ServerEvent::OnDraw { x, y },
            ClientEvent::Finish { x, y } => ServerEvent::OnFinish { x, y },
            ClientEvent::Send { image } => ServerEvent::OnSend { image },
        }
    }
}

impl ServerEvent {
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap()
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug)]
pub enum ProtocolError {
    Malformed(serde_json::Error),
    InvalidField(&'static str),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Malformed(e) => write!(f, "malformed event: {e}"),
            ProtocolError::InvalidField(msg) => write!(f, "invalid event field: {msg}"),
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProtocolError::Malformed(e) => Some(e),
            ProtocolError::InvalidField(_) => None,
        }
    }
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        ProtocolError::Malformed(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_start_with_client_field_names() {
        let text = r##"{"event":"start","data":{"x":10,"y":10,"settings":{"lineWidth":5,"strokeStyle":"#FF0000"}}}"##;
        let event = ClientEvent::decode(text).unwrap();
        match event {
            ClientEvent::Start { x, y, settings } => {
                assert_eq!(x, 10.0);
                assert_eq!(y, 10.0);
                assert_eq!(settings.stroke_style, "#FF0000");
                assert_eq!(settings.line_width, 5.0);
                // lineCap was omitted, falls back to the initial canvas state
                assert_eq!(settings.line_cap, LineCap::Round);
            }
            other => panic!("expected start, got {other:?}"),
        }
    }

    #[test]
    fn broadcast_events_use_on_prefixed_names() {
        let event = ClientEvent::Draw { x: 1.5, y: 2.5 };
        let frame = event.into_broadcast().encode();
        assert_eq!(frame, r#"{"event":"on-draw","data":{"x":1.5,"y":2.5}}"#);

        let event = ClientEvent::Send {
            image: "data:image/png;base64,AAAA".into(),
        };
        let frame = event.into_broadcast().encode();
        assert!(frame.starts_with(r#"{"event":"on-send""#));
    }

    #[test]
    fn start_roundtrips_through_broadcast_unchanged() {
        let settings = StyleSettings {
            line_cap: LineCap::Round,
            stroke_style: "#FF0000".into(),
            line_width: 5.0,
        };
        let event = ClientEvent::Start {
            x: 10.0,
            y: 10.0,
            settings: settings.clone(),
        };
        let relayed = ServerEvent::decode(&event.into_broadcast().encode()).unwrap();
        assert_eq!(
            relayed,
            ServerEvent::OnStart {
                x: 10.0,
                y: 10.0,
                settings,
            }
        );
    }

    #[test]
    fn rejects_malformed_frames() {
        assert!(matches!(
            ClientEvent::decode("not json"),
            Err(ProtocolError::Malformed(_))
        ));
        // wrong event name
        assert!(ClientEvent::decode(r#"{"event":"scribble","data":{}}"#).is_err());
        // draw missing a coordinate
        assert!(ClientEvent::decode(r#"{"event":"draw","data":{"x":1}}"#).is_err());
        // start must carry its settings
        assert!(ClientEvent::decode(r#"{"event":"start","data":{"x":1,"y":2}}"#).is_err());
    }

    #[test]
    fn rejects_invalid_field_values() {
        let zero_width = r##"{"event":"start","data":{"x":0,"y":0,"settings":{"lineWidth":0,"strokeStyle":"#000000"}}}"##;
        assert!(matches!(
            ClientEvent::decode(zero_width),
            Err(ProtocolError::InvalidField(_))
        ));

        let empty_image = r#"{"event":"send","data":{"image":""}}"#;
        assert!(matches!(
            ClientEvent::decode(empty_image),
            Err(ProtocolError::InvalidField(_))
        ));
    }

    #[test]
    fn events_know_their_variant() {
        assert_eq!(
            ClientEvent::Draw { x: 0.0, y: 0.0 }.mode(),
            SyncMode::Incremental
        );
        assert_eq!(
            ClientEvent::Send { image: "i".into() }.mode(),
            SyncMode::Snapshot
        );
    }

    #[test]
    fn sync_mode_parses_from_config_values() {
        assert_eq!("incremental".parse(), Ok(SyncMode::Incremental));
        assert_eq!("snapshot".parse(), Ok(SyncMode::Snapshot));
        assert!("diff".parse::<SyncMode>().is_err());
    }
}
