//! Frame encoding: one JSON object per message.

use crate::{Error, Result, protocol::Message};

pub fn encode(message: &Message) -> Result<String> {
    Ok(serde_json::to_string(message)?)
}

pub fn decode(frame: &str) -> Result<Message> {
    serde_json::from_str(frame).map_err(|e| Error::Protocol {
        message: format!("{e} in frame '{frame}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        identifiers::{ActionId, StateId},
        protocol::{OpinionRecord, OpinionRequest, OpinionResponse},
    };

    #[test]
    fn test_request_frame_is_tagged() {
        let frame = encode(&Message::Request(OpinionRequest {
            agent_id: 2,
            request_number: 9,
            state: StateId::new(4),
            confidence: 3.0,
        }))
        .unwrap();
        assert!(frame.contains(r#""type":"request""#));
        assert!(frame.contains(r#""request_number":9"#));
    }

    #[test]
    fn test_response_frame_decodes_by_tag() {
        let response = OpinionResponse {
            agent_id: 1,
            requester_id: 2,
            request_number: 9,
            opinions: vec![OpinionRecord::new(
                StateId::new(4),
                ActionId::new(8),
                0.75,
                2.0,
            )],
        };
        let frame = encode(&Message::Response(response.clone())).unwrap();
        match decode(&frame).unwrap() {
            Message::Response(decoded) => assert_eq!(decoded, response),
            Message::Request(_) => panic!("expected a response"),
        }
    }

    #[test]
    fn test_unknown_tag_is_protocol_error() {
        let err = decode(r#"{"type":"gossip","agent_id":1}"#).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }
}
