//! Application Services
//!
//! Business logic orchestration layer that coordinates domain operations,
//! repository access, and cross-cutting concerns.

mod assembly;
mod completeness;
mod results;

pub use assembly::*;
pub use completeness::*;
pub use results::*;
pub use user_tests::*;

use async_trait::async_trait;
use ielts_domain::{AppResult, ResultId, Skill, UserTestId};

/// Service context for request handling
#[derive(Debug, Clone)]
pub struct ServiceContext {
    /// Request correlation ID for tracing
    pub correlation_id: String,
}

impl ServiceContext {
    pub fn new(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
        }
    }

    /// Context with a freshly generated correlation ID
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Service event for event-driven architecture
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceEvent {
    // User test events
    UserTestCreated { user_test_id: UserTestId },
    UserTestRenamed { user_test_id: UserTestId },
    UserTestAssembled {
        user_test_id: UserTestId,
        skill: Skill,
        section_count: usize,
    },
    UserTestDeleted { user_test_id: UserTestId },

    // Result events
    ResultRecorded { result_id: ResultId },
    ResultScored { result_id: ResultId, score: u32 },
}

/// Event publisher trait for service events
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: ServiceEvent) -> AppResult<()>;
}

/// No-op event publisher
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _event: ServiceEvent) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_context() {
        let ctx = ServiceContext::new("corr-123");
        assert_eq!(ctx.correlation_id, "corr-123");

        let generated = ServiceContext::generate();
        assert_ne!(generated.correlation_id, ServiceContext::generate().correlation_id);
    }

    #[tokio::test]
    async fn test_noop_publisher_accepts_everything() {
        let publisher = NoOpEventPublisher;
        let event = ServiceEvent::ResultRecorded {
            result_id: ResultId::new(),
        };
        assert!(publisher.publish(event).await.is_ok());
    }
}
