// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversations with a counselor or peer supporter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use haven_core::{CommitOutcome, HavenError, ResourceKey};
use haven_resolver::{PrimaryCall, Resolution, Resolver, SecondaryCall};

use crate::{address, pending, rest_path};

const RESOURCE: &str = "messages";
const MAX_BODY_CHARS: usize = 4000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "conversationId")]
    pub conversation_id: String,
    #[serde(alias = "senderId", alias = "sender")]
    pub sender_id: String,
    #[serde(alias = "content", alias = "text")]
    pub body: String,
    #[serde(
        alias = "sentAt",
        alias = "createdAt",
        alias = "_creationTime",
        deserialize_with = "crate::timestamp::deserialize"
    )]
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub conversation_id: String,
    pub body: String,
}

impl NewMessage {
    pub fn new(conversation_id: impl Into<String>, body: impl Into<String>) -> Result<Self, HavenError> {
        let conversation_id = conversation_id.into();
        let body = body.into();
        if conversation_id.trim().is_empty() {
            return Err(HavenError::Validation("conversation id is empty".into()));
        }
        if body.trim().is_empty() {
            return Err(HavenError::Validation("message body is empty".into()));
        }
        if body.chars().count() > MAX_BODY_CHARS {
            return Err(HavenError::Validation(format!(
                "message body exceeds {MAX_BODY_CHARS} characters"
            )));
        }
        Ok(Self {
            conversation_id,
            body,
        })
    }
}

#[derive(Clone)]
pub struct Messages {
    resolver: Resolver,
}

impl Messages {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    /// The last `limit` messages of a conversation, oldest first.
    pub async fn conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
        limit: u32,
    ) -> Resolution<Vec<Message>> {
        let target = address(
            user_id,
            RESOURCE,
            [
                ("conversation", conversation_id.to_string()),
                ("limit", limit.to_string()),
            ],
        );
        let mut resolution = target
            .resolve(
                &self.resolver,
                &PrimaryCall::new(
                    "messages:getConversation",
                    json!({"userId": user_id, "conversationId": conversation_id, "limit": limit}),
                ),
                rest_path(&[RESOURCE, user_id, conversation_id])
                    .map(|path| SecondaryCall::get(format!("{path}?limit={limit}"))),
                Vec::new(),
            )
            .await;
        resolution.value.sort_by_key(|m: &Message| m.sent_at);
        resolution
    }

    pub async fn send(
        &self,
        user_id: &str,
        message: &NewMessage,
    ) -> Result<CommitOutcome<Value>, HavenError> {
        let key = ResourceKey::new(user_id, RESOURCE)?;
        let mut body = serde_json::to_value(message)?;
        body["senderId"] = json!(user_id);

        self.resolver
            .commit(
                &key,
                &PrimaryCall::new("messages:send", body.clone()),
                &SecondaryCall::post("/messages", body.clone()),
                pending(user_id, RESOURCE, "messages:send", body),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use haven_core::Tier;
    use haven_test_utils::{MemoryCache, MockPrimary, MockSecondary};

    #[test]
    fn rejects_blank_or_oversized_bodies() {
        assert!(NewMessage::new("c1", "   ").is_err());
        assert!(NewMessage::new("", "hi").is_err());
        assert!(NewMessage::new("c1", "x".repeat(MAX_BODY_CHARS + 1)).is_err());
        assert!(NewMessage::new("c1", "hello").is_ok());
    }

    #[tokio::test]
    async fn conversation_is_sorted_oldest_first() {
        let messages = Messages::new(
            Resolver::new(Arc::new(MemoryCache::new())).with_primary(Arc::new(
                MockPrimary::succeeding(json!([
                    {"_id": "2", "conversationId": "c1", "senderId": "coach", "content": "How are you?", "_creationTime": 1_767_225_660_000u64},
                    {"_id": "1", "conversationId": "c1", "senderId": "u1", "content": "Hi", "_creationTime": 1_767_225_600_000u64}
                ])),
            )),
        );

        let r = messages.conversation("u1", "c1", 50).await;
        assert_eq!(r.tier(), Tier::Primary);
        let ids: Vec<&str> = r.value.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(r.value[1].body, "How are you?");
    }

    #[tokio::test]
    async fn conversation_id_stays_inside_its_path_segment() {
        let secondary = MockSecondary::succeeding(json!([]));
        let messages = Messages::new(
            Resolver::new(Arc::new(MemoryCache::new())).with_secondary(Arc::new(secondary.clone())),
        );

        messages.conversation("u1", "../../settings/u2", 10).await;
        messages.conversation("u1", "c#frag", 10).await;

        let paths: Vec<String> = secondary.requests().await.into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec![
                "/messages/u1/%2E%2E%2F%2E%2E%2Fsettings%2Fu2?limit=10".to_string(),
                "/messages/u1/c%23frag?limit=10".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn dot_conversation_id_never_reaches_the_network() {
        let secondary = MockSecondary::succeeding(json!([]));
        let messages = Messages::new(
            Resolver::new(Arc::new(MemoryCache::new())).with_secondary(Arc::new(secondary.clone())),
        );

        let r = messages.conversation("u1", "..", 10).await;
        assert_eq!(r.tier(), Tier::Default);
        assert_eq!(secondary.request_count().await, 0);
    }

    #[tokio::test]
    async fn send_falls_back_to_rest() {
        let secondary = MockSecondary::succeeding(json!([]));
        let messages = Messages::new(
            Resolver::new(Arc::new(MemoryCache::new()))
                .with_primary(Arc::new(MockPrimary::failing()))
                .with_secondary(Arc::new(secondary.clone())),
        );
        let outcome = messages
            .send("u1", &NewMessage::new("c1", "thanks").unwrap())
            .await
            .unwrap();
        assert_eq!(outcome.tier(), Some(Tier::Secondary));

        let sent = &secondary.requests().await[0];
        assert_eq!(sent.path, "/messages");
        assert_eq!(
            sent.body,
            Some(json!({"conversationId": "c1", "body": "thanks", "senderId": "u1"}))
        );
    }
}
