//! Queue access policy for topic deliveries
//!
//! SQS rejects deliveries from a topic unless the queue's policy grants
//! `sqs:SendMessage` to calls originating from that topic's ARN. The policy
//! built here is applied as a full replacement of the queue's policy
//! attribute.

use serde::{Deserialize, Serialize};

const POLICY_VERSION: &str = "2012-10-17";
const POLICY_SID: &str = "TestTopicQueuePolicy";
const SEND_MESSAGE_ACTION: &str = "sqs:SendMessage";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuePolicy {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Statement")]
    pub statement: Vec<PolicyStatement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyStatement {
    #[serde(rename = "Sid")]
    pub sid: String,
    #[serde(rename = "Effect")]
    pub effect: String,
    #[serde(rename = "Principal")]
    pub principal: String,
    #[serde(rename = "Action")]
    pub action: String,
    #[serde(rename = "Resource")]
    pub resource: String,
    #[serde(rename = "Condition")]
    pub condition: PolicyCondition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyCondition {
    #[serde(rename = "ArnEquals")]
    pub arn_equals: ArnEquals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArnEquals {
    #[serde(rename = "aws:SourceArn")]
    pub source_arn: String,
}

impl QueuePolicy {
    /// Allow any principal to deliver to `queue_arn`, provided the call
    /// originates from `topic_arn`.
    pub fn allow_topic_to_queue(topic_arn: &str, queue_arn: &str) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement: vec![PolicyStatement {
                sid: POLICY_SID.to_string(),
                effect: "Allow".to_string(),
                principal: "*".to_string(),
                action: SEND_MESSAGE_ACTION.to_string(),
                resource: queue_arn.to_string(),
                condition: PolicyCondition {
                    arn_equals: ArnEquals {
                        source_arn: topic_arn.to_string(),
                    },
                },
            }],
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether this policy lets `topic_arn` deliver to `queue_arn`.
    pub fn permits(&self, topic_arn: &str, queue_arn: &str) -> bool {
        self.statement.iter().any(|statement| {
            statement.effect == "Allow"
                && statement.action == SEND_MESSAGE_ACTION
                && statement.resource == queue_arn
                && statement.condition.arn_equals.source_arn == topic_arn
        })
    }
}
