//! Post-use rating prompt backed by a REST table.

pub mod store;
pub mod system;

pub use store::RatingStore;
pub use system::SystemInfo;

use crate::error::AppError;
use serde::Serialize;
use uuid::Uuid;

pub const MAX_STARS: u8 = 5;

/// One row of the ratings table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingRecord {
    pub rating: u8,
    pub review: String,
    pub platform: String,
    pub ip_address: String,
    pub user_id: String,
    pub os: String,
    pub device_type: String,
}

impl RatingRecord {
    /// Build a record with a fresh anonymous user id
    pub fn new(rating: u8, review: &str, system: &SystemInfo) -> Result<Self, AppError> {
        if !(1..=MAX_STARS).contains(&rating) {
            return Err(AppError::Rating(format!(
                "Rating must be between 1 and {}, got {}",
                MAX_STARS, rating
            )));
        }

        Ok(Self {
            rating,
            review: review.trim().to_string(),
            platform: system.platform.clone(),
            ip_address: system.ip_address.clone(),
            user_id: Uuid::new_v4().to_string(),
            os: system.os_label(),
            device_type: system.device_type.clone(),
        })
    }
}

/// State of the rating dialog while it is open
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingDraft {
    /// 0 until the user picks a star
    pub stars: u8,
    pub review: String,
}

impl RatingDraft {
    pub fn set_stars(&mut self, stars: u8) {
        self.stars = stars.min(MAX_STARS);
    }

    pub fn increase(&mut self) {
        self.set_stars(self.stars.saturating_add(1));
    }

    /// Never drops below one star, and does nothing before a star is picked
    pub fn decrease(&mut self) {
        if self.stars > 0 {
            self.stars = (self.stars - 1).max(1);
        }
    }

    /// Sending is only possible once a star is chosen
    pub fn can_send(&self) -> bool {
        self.stars > 0
    }
}
