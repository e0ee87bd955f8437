//! Standard reward catalog and challenge set shipped with the program.

use crate::loyalty::{Badge, Challenge, RewardCatalogItem, Tier};

/// The standard reward catalog, in display order.
pub fn default_catalog() -> Vec<RewardCatalogItem> {
    vec![
        RewardCatalogItem::new(1, "$10 Store Gift Card", "Gift Cards", 500, 10.00, 100),
        RewardCatalogItem::new(2, "$25 Store Gift Card", "Gift Cards", 1200, 25.00, 75),
        RewardCatalogItem::new(3, "$50 Store Gift Card", "Gift Cards", 2300, 50.00, 50),
        RewardCatalogItem::new(4, "Premium Headphones", "Merchandise", 5000, 149.99, 25),
        RewardCatalogItem::new(5, "Wireless Charger", "Merchandise", 1500, 39.99, 60),
        RewardCatalogItem::new(6, "Smart Watch Band", "Merchandise", 800, 24.99, 80),
        RewardCatalogItem::new(7, "VIP Shopping Experience", "Experiences", 3500, 150.00, 10)
            .exclusive_to(Tier::Platinum),
        RewardCatalogItem::new(8, "Personal Styling Session", "Experiences", 2000, 75.00, 20)
            .exclusive_to(Tier::Silver),
        RewardCatalogItem::new(9, "Streaming Subscription (1 month)", "Digital", 600, 15.99, 200),
        RewardCatalogItem::new(10, "E-Book Bundle", "Digital", 400, 12.99, 150),
        RewardCatalogItem::new(11, "20% Off Coupon", "Discounts", 300, 20.00, 500),
        RewardCatalogItem::new(12, "Free Express Shipping (3 uses)", "Discounts", 450, 29.97, 300),
        RewardCatalogItem::new(13, "Charity Donation - $10", "Charitable", 500, 10.00, 999),
        RewardCatalogItem::new(14, "Limited Edition Tote Bag", "Merchandise", 1800, 45.00, 30)
            .limited(),
        RewardCatalogItem::new(15, "Exclusive Member Event Access", "Experiences", 4000, 200.00, 15)
            .exclusive_to(Tier::Platinum),
    ]
}

/// Reward categories offered by the catalog.
pub const REWARD_CATEGORIES: [&str; 6] = [
    "Gift Cards",
    "Merchandise",
    "Experiences",
    "Digital",
    "Discounts",
    "Charitable",
];

pub fn default_challenges() -> Vec<Challenge> {
    [
        (1, "Weekend Warrior", "Make a purchase this weekend", 100, 0, 1, "Sunday"),
        (2, "Category Explorer", "Shop from 3 different categories", 250, 2, 3, "5 days"),
        (3, "Social Butterfly", "Share 2 products on social media", 150, 1, 2, "3 days"),
        (4, "Review Champion", "Write 5 product reviews", 300, 3, 5, "7 days"),
    ]
    .into_iter()
    .map(|(id, name, description, bonus_points, progress, target, ends)| Challenge {
        id,
        name: name.to_string(),
        description: description.to_string(),
        bonus_points,
        progress,
        target,
        ends: ends.to_string(),
    })
    .collect()
}

/// Every badge a member can earn, in display order.
pub fn default_badges() -> Vec<Badge> {
    [
        ("First Purchase", "🛒", "Made your first purchase"),
        ("Review Writer", "✍️", "Wrote your first review"),
        ("Social Sharer", "📱", "Shared a product on social media"),
        ("Streak Master", "🔥", "Maintained a 7-day streak"),
        ("Big Spender", "💰", "Spent over $500 in a month"),
        ("Eco Warrior", "🌱", "Purchased sustainable products"),
        ("Early Bird", "🌅", "Shopped during early access sale"),
        ("Referral King", "👑", "Referred 5 friends"),
        ("Category Master", "🏆", "Purchased from all categories"),
        ("Loyal Member", "💎", "1 year membership anniversary"),
    ]
    .into_iter()
    .map(|(name, icon, description)| Badge {
        name: name.to_string(),
        icon: icon.to_string(),
        description: description.to_string(),
    })
    .collect()
}
