//! Mentor oracle: extended-shape responder for goals, plans, and coaching.

use async_trait::async_trait;
use oracle_core::{Element, MemoryRecord, OracleError, Query, Responder, ResponderReply};

pub struct MentorOracle;

#[async_trait]
impl Responder for MentorOracle {
    fn name(&self) -> &str {
        "mentor_oracle"
    }

    fn accepts_extended(&self) -> bool {
        true
    }

    async fn respond(&self, text: &str) -> Result<ResponderReply, OracleError> {
        self.respond_extended(&Query::new(text, "anonymous"), &[]).await
    }

    async fn respond_extended(
        &self,
        query: &Query,
        memories: &[MemoryRecord],
    ) -> Result<ResponderReply, OracleError> {
        // A stated focus in personalization sharpens the coaching voice.
        let focus = query
            .personalization
            .as_ref()
            .and_then(|p| p.get("focus"))
            .and_then(|v| v.as_str());

        let content = match focus {
            Some(focus) => format!(
                "You named {focus} as the work. A goal that large only moves \
                 through its smallest next step; name the one you can finish \
                 before the week turns."
            ),
            None => "A plan is a promise made in small denominations. Pick the \
                     one commitment you would defend to a friend, and drop the \
                     rest for now."
                .to_string(),
        };

        let mut reply = ResponderReply::minimal(content, 0.7)
            .with_element(Element::Earth)
            .with_archetype("Mentor")
            .with_reflection("What would done look like, one week from now?");
        reply.provider = Some(self.name().to_string());
        reply.metadata.insert(
            "history_considered".to_string(),
            serde_json::json!(memories.len()),
        );
        Ok(reply)
    }
}
