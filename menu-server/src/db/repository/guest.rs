//! Guest / Coupon Repository
//!
//! 优惠券一次性核销：条件更新保证同一张券最多被用一次。

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Coupon, CouponIssue, Guest, GuestUpsert};
use shared::util::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const GUEST_TABLE: &str = "guest";

#[derive(Clone)]
pub struct GuestRepository {
    base: BaseRepository,
}

impl GuestRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find guest by phone number
    pub async fn find_by_phone(&self, phone: &str) -> RepoResult<Option<Guest>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM guest WHERE phone = $phone LIMIT 1")
            .bind(("phone", phone.to_string()))
            .await?;
        let guests: Vec<Guest> = result.take(0)?;
        Ok(guests.into_iter().next())
    }

    /// Create the guest if the phone is new, otherwise refresh the name
    pub async fn upsert(&self, data: GuestUpsert) -> RepoResult<Guest> {
        if let Some(existing) = self.find_by_phone(&data.phone).await? {
            if data.name.is_none() || data.name == existing.name {
                return Ok(existing);
            }
            let mut result = self
                .base
                .db()
                .query("UPDATE guest SET name = $name WHERE phone = $phone RETURN AFTER")
                .bind(("name", data.name))
                .bind(("phone", data.phone))
                .await?;
            let guests: Vec<Guest> = result.take(0)?;
            return guests
                .into_iter()
                .next()
                .ok_or_else(|| RepoError::Database("Failed to update guest".to_string()));
        }

        let guest = Guest {
            id: None,
            phone: data.phone,
            name: data.name,
            coupon: None,
            coupon_history: Vec::new(),
            created_at: now_millis(),
        };
        let created: Option<Guest> = self.base.db().create(GUEST_TABLE).content(guest).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create guest".to_string()))
    }

    /// Attach a fresh one-time coupon to the guest
    ///
    /// Replaces any unredeemed coupon still in the slot.
    pub async fn issue_coupon(&self, phone: &str, data: CouponIssue) -> RepoResult<Guest> {
        self.find_by_phone(phone)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Guest {} not found", phone)))?;

        let coupon = Coupon {
            code: data.code,
            amount: data.amount,
            active: true,
            issued_at: now_millis(),
        };
        let mut result = self
            .base
            .db()
            .query("UPDATE guest SET coupon = $coupon WHERE phone = $phone RETURN AFTER")
            .bind(("coupon", coupon))
            .bind(("phone", phone.to_string()))
            .await?;
        let guests: Vec<Guest> = result.take(0)?;
        guests
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Guest {} not found", phone)))
    }

    /// Consume the guest's coupon, at most once
    ///
    /// The update is conditional on the coupon still being active with the
    /// given code; a concurrent or repeated consume fails with Conflict.
    /// Returns the discount amount.
    pub async fn consume_coupon(&self, phone: &str, code: &str) -> RepoResult<i64> {
        let guest = self
            .find_by_phone(phone)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Guest {} not found", phone)))?;

        let Some(coupon) = guest.coupon.clone().filter(|c| c.code == code && c.active) else {
            return Err(RepoError::Conflict(format!(
                "Coupon {} is not redeemable for guest {}",
                code, phone
            )));
        };

        let mut history = guest.coupon_history.clone();
        history.push(Coupon {
            active: false,
            ..coupon.clone()
        });

        // Conditional on the slot still holding this active coupon: a racing
        // consume empties the slot first and this update matches nothing.
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE guest SET coupon = NONE, coupon_history = $history \
                 WHERE phone = $phone AND coupon.code = $code AND coupon.active = true \
                 RETURN AFTER",
            )
            .bind(("history", history))
            .bind(("phone", phone.to_string()))
            .bind(("code", code.to_string()))
            .await?;
        let updated: Vec<Guest> = result.take(0)?;
        if updated.is_empty() {
            return Err(RepoError::Conflict(format!(
                "Coupon {} was already consumed",
                code
            )));
        }
        Ok(coupon.amount)
    }
}
