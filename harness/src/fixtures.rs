use chrono::{Duration, Local, Utc};
use mockstore::{doc, field_value, Document};
use uuid::Uuid;

/// Daily chat allowance for free users, in milliseconds (20 minutes).
pub const DAILY_TIME_LIMIT_MS: i64 = 20 * 60 * 1000;

pub const FREE_USER_ID: &str = "test_user_1";
pub const PREMIUM_USER_ID: &str = "test_user_2";
pub const FREE_USER_EMAIL: &str = "user1@safetalk.com";
pub const PREMIUM_USER_EMAIL: &str = "user2@safetalk.com";

/// Today's date as the `YYYY-MM-DD` day stamp the reset logic compares.
pub fn today_stamp() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

pub fn yesterday_stamp() -> String {
    (Local::now() - Duration::days(1)).format("%Y-%m-%d").to_string()
}

/// Referral codes are `ST` plus the first six uuid characters, uppercased.
pub fn referral_code() -> String {
    let uuid = Uuid::new_v4().to_string();
    format!("ST{}", uuid[..6].to_uppercase())
}

fn zeroed_stats() -> Document {
    doc! {
        totalChats: 0,
        totalMessagesReceived: 0,
        totalMessagesSent: 0,
        averageRating: 0,
        totalRatings: 0
    }
}

/// The free test user: no premium, fresh timer, empty block list.
pub fn free_user() -> Document {
    doc! {
        uid: FREE_USER_ID,
        email: FREE_USER_EMAIL,
        displayName: "TestUser1",
        isPremium: false,
        dailyTimeUsed: 0,
        dailyTimeLimit: DAILY_TIME_LIMIT_MS,
        lastResetDate: (today_stamp()),
        blockedUsers: [],
        stats: (zeroed_stats())
    }
}

/// The premium test user, seeded with an existing rating history.
pub fn premium_user() -> Document {
    doc! {
        uid: PREMIUM_USER_ID,
        email: PREMIUM_USER_EMAIL,
        displayName: "TestUser2",
        isPremium: true,
        dailyTimeUsed: 0,
        dailyTimeLimit: DAILY_TIME_LIMIT_MS,
        lastResetDate: (today_stamp()),
        blockedUsers: [],
        stats: {
            totalChats: 0,
            totalMessagesReceived: 0,
            totalMessagesSent: 0,
            averageRating: 4.5,
            totalRatings: 10
        }
    }
}

/// The seeded credit ledger: 10 purchased, 2 already spent.
pub fn seeded_credits(user_id: &str) -> Document {
    doc! {
        userId: user_id,
        totalCredits: 10,
        usedCredits: 2,
        purchaseHistory: []
    }
}

/// A zeroed credit ledger for a freshly created user.
pub fn fresh_credits(user_id: &str) -> Document {
    doc! {
        userId: user_id,
        totalCredits: 0,
        usedCredits: 0,
        purchaseHistory: [],
        createdAt: (field_value::server_timestamp())
    }
}

/// The full default profile written when a new account is created.
pub fn new_user_profile(uid: &str, email: &str, display_name: &str) -> Document {
    doc! {
        uid: uid,
        email: email,
        displayName: display_name,
        phoneNumber: (mockstore::Value::Null),
        photoURL: (mockstore::Value::Null),
        createdAt: (Utc::now()),
        lastLogin: (Utc::now()),
        isPremium: false,
        subscriptionType: (mockstore::Value::Null),
        dailyTimeUsed: 0,
        dailyTimeLimit: DAILY_TIME_LIMIT_MS,
        lastResetDate: (today_stamp()),
        totalCredits: 0,
        referralCode: (referral_code()),
        isBlocked: false,
        settings: {
            notifications: true,
            soundEnabled: true,
            theme: "light"
        },
        stats: (zeroed_stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockstore::Value;

    #[test]
    fn test_day_stamps_differ() {
        assert_ne!(today_stamp(), yesterday_stamp());
        assert_eq!(today_stamp().len(), 10);
    }

    #[test]
    fn test_referral_code_shape() {
        let code = referral_code();
        assert!(code.starts_with("ST"));
        assert_eq!(code.len(), 8);
        assert_eq!(code, code.to_uppercase());
    }

    #[test]
    fn test_free_user_defaults() {
        let user = free_user();
        assert_eq!(user.get("isPremium"), Value::Bool(false));
        assert_eq!(user.get("dailyTimeUsed"), Value::I64(0));
        assert_eq!(user.get("dailyTimeLimit"), Value::I64(DAILY_TIME_LIMIT_MS));
        assert_eq!(user.get("stats.totalChats"), Value::I64(0));
        assert!(user.get("blockedUsers").as_array().unwrap().is_empty());
    }

    #[test]
    fn test_premium_user_rating_history() {
        let user = premium_user();
        assert_eq!(user.get("isPremium"), Value::Bool(true));
        assert_eq!(user.get("stats.averageRating"), Value::F64(4.5));
        assert_eq!(user.get("stats.totalRatings"), Value::I64(10));
    }

    #[test]
    fn test_new_user_profile_complete() {
        let profile = new_user_profile("u_9", "nine@safetalk.com", "Nine");
        assert_eq!(profile.get("settings.theme"), Value::from("light"));
        assert_eq!(profile.get("phoneNumber"), Value::Null);
        assert!(profile
            .get("referralCode")
            .as_str()
            .unwrap()
            .starts_with("ST"));
    }
}
