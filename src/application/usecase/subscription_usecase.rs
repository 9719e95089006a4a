// Subscription lifecycle and gating use case

use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::SubscriptionConfig;
use crate::domain::errors::{CoreError, CoreResult, StorageError};
use crate::domain::models::{
    Plan, PlanStatus, Subscription, SubscriptionEvent, SubscriptionSummary,
};
use crate::domain::repository::SubscriptionRepository;
use crate::domain::service::Clock;

#[async_trait]
pub trait SubscriptionUseCase: Send + Sync {
    /// Start the signup trial for a user. One subscription per user.
    async fn create_trial(&self, user_id: Uuid) -> CoreResult<Subscription>;

    /// Active status and the clock inside `[start_date, end_date)`.
    fn is_active(&self, subscription: &Subscription) -> bool;

    /// Whole days left, rounded down; zero when not active.
    fn days_remaining(&self, subscription: &Subscription) -> i64;

    fn summary(&self, subscription: &Subscription) -> SubscriptionSummary;

    async fn subscription_for(&self, user_id: Uuid) -> CoreResult<Subscription>;

    /// Re-evaluate a user's subscription against the clock, persisting an
    /// expiry and reporting any notice the user should see.
    async fn refresh(
        &self,
        user_id: Uuid,
    ) -> CoreResult<(Subscription, Option<SubscriptionEvent>)>;

    /// The user's subscription if it currently grants access.
    async fn require_active(&self, user_id: Uuid) -> CoreResult<Subscription>;
}

pub struct SubscriptionGate {
    repo: Arc<dyn SubscriptionRepository>,
    clock: Arc<dyn Clock>,
    policy: SubscriptionConfig,
}

impl SubscriptionGate {
    pub fn new(
        repo: Arc<dyn SubscriptionRepository>,
        clock: Arc<dyn Clock>,
        policy: SubscriptionConfig,
    ) -> Self {
        Self {
            repo,
            clock,
            policy,
        }
    }
}

#[async_trait]
impl SubscriptionUseCase for SubscriptionGate {
    fn is_active(&self, subscription: &Subscription) -> bool {
        subscription.is_active_at(self.clock.now())
    }

    fn days_remaining(&self, subscription: &Subscription) -> i64 {
        subscription.days_remaining_at(self.clock.now())
    }

    fn summary(&self, subscription: &Subscription) -> SubscriptionSummary {
        SubscriptionSummary {
            plan: subscription.plan,
            status: subscription.status,
            days_remaining: self.days_remaining(subscription),
            end_date: subscription.end_date,
        }
    }

    async fn create_trial(&self, user_id: Uuid) -> CoreResult<Subscription> {
        if self.repo.find_by_user(user_id).await?.is_some() {
            return Err(CoreError::Validation(
                "Subscription already exists".to_string(),
            ));
        }

        let now = self.clock.now();
        let end_date = Duration::try_days(self.policy.trial_days)
            .and_then(|length| now.checked_add_signed(length))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "trial length of {} days is out of range",
                    self.policy.trial_days
                ))
            })?;
        let trial = Subscription {
            id: Uuid::new_v4(),
            user_id,
            plan: Plan::Trial,
            status: PlanStatus::Active,
            start_date: now,
            end_date,
            created_at: now,
            updated_at: now,
        };

        // a concurrent signup may have won the race since the lookup
        self.repo.create(&trial).await.map_err(|e| match e {
            StorageError::Conflict(_) => {
                CoreError::Validation("Subscription already exists".to_string())
            }
            other => other.into(),
        })?;

        log::info!(
            "Started {}-day trial for user {} (ends {})",
            self.policy.trial_days,
            user_id,
            trial.end_date
        );
        Ok(trial)
    }

    async fn subscription_for(&self, user_id: Uuid) -> CoreResult<Subscription> {
        self.repo
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("no subscription for user {}", user_id)))
    }

    async fn refresh(
        &self,
        user_id: Uuid,
    ) -> CoreResult<(Subscription, Option<SubscriptionEvent>)> {
        let mut subscription = self.subscription_for(user_id).await?;
        let now = self.clock.now();

        if subscription.status == PlanStatus::Active && subscription.window_ended_at(now) {
            subscription.status = PlanStatus::Expired;
            subscription.updated_at = now;
            self.repo.save(&subscription).await?;

            let event = match subscription.plan {
                Plan::Trial => SubscriptionEvent::TrialExpired,
                _ => SubscriptionEvent::SubscriptionExpired,
            };
            log::info!("Subscription {} of user {} expired", subscription.id, user_id);
            return Ok((subscription, Some(event)));
        }

        let event = if subscription.plan == Plan::Trial
            && subscription.is_active_at(now)
            && subscription.days_remaining_at(now) <= self.policy.expiry_notice_days
        {
            Some(SubscriptionEvent::TrialExpiring)
        } else {
            None
        };

        Ok((subscription, event))
    }

    async fn require_active(&self, user_id: Uuid) -> CoreResult<Subscription> {
        let subscription = match self.subscription_for(user_id).await {
            Ok(subscription) => subscription,
            Err(CoreError::NotFound(_)) => {
                return Err(CoreError::SubscriptionRequired(
                    "no subscription".to_string(),
                ))
            }
            Err(e) => return Err(e),
        };

        if !self.is_active(&subscription) {
            log::debug!("User {} denied: {} {}", user_id, subscription.plan, subscription.status);
            let state = match subscription.status {
                PlanStatus::Active => PlanStatus::Expired,
                other => other,
            };
            return Err(CoreError::SubscriptionRequired(format!(
                "{} subscription is {}",
                subscription.plan, state
            )));
        }

        Ok(subscription)
    }
}
