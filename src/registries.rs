//! Static API membership sets and the per-method cache TTL table.
//!
//! Membership is exact, grounded on `examples/original_source/cmd/hiveInterpreter/{rpc.go,utils.go}`.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Condenser-API calls cheap enough for the lite node.
pub static CONDENSER_LITE: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "lookup_accounts",
        "get_config",
        "get_block",
        "get_block_header",
        "get_dynamic_global_properties",
        "broadcast_block",
        "broadcast_transaction",
        "broadcast_transaction_synchronous",
        "login",
        "find_rc_accounts",
        "get_active_witnesses",
        "get_transaction_hex",
        "get_version",
        "get_witness_by_account",
        "get_witness_count",
        "get_witness_schedule",
        "get_reward_fund",
        "get_potential_signatures",
        "get_required_signatures",
        "get_accounts",
        "get_vesting_delegations",
        "get_witnesses_by_vote",
        "get_current_median_history_price",
        "get_withdraw_routes",
        "get_feed_history",
        "get_account_reputations",
        "get_key_references",
        "get_owner_history",
        "get_market_history",
        "get_market_history_buckets",
        "get_order_book",
        "get_recent_trades",
        "get_ticker",
        "get_trade_history",
        "get_volume",
        "get_hardfork_version",
        "verify_authority",
        "get_witnesses",
        "get_next_scheduled_hardfork",
    ]
    .into_iter()
    .collect()
});

/// Appbase namespaces served by the lite node.
pub static AB_LITE: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "rc_api",
        "block_api",
        "chain_api",
        "database_api",
        "network_broadcast_api",
        "reputation_api",
        "account_by_key_api",
        "market_history_api",
        "transaction_status_api",
        "wallet_bridge_api",
    ]
    .into_iter()
    .collect()
});

/// Appbase namespaces served by the social indexer (hivemind).
pub static AB_HIVE: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["tags_api", "follow_api"].into_iter().collect());

/// Condenser-style call names served by the social indexer.
pub static HIVE_CALLS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "get_followers",
        "get_following",
        "get_follow_count",
        "get_content",
        "get_content_replies",
        "get_active_votes",
        "get_state",
        "get_discussion",
        "get_trending_tags",
        "get_discussions_by_trending",
        "get_discussions_by_hot",
        "get_discussions_by_promoted",
        "get_discussions_by_created",
        "get_discussions_by_blog",
        "get_discussions_by_feed",
        "get_discussions_by_comments",
        "get_replies_by_last_update",
        "get_blog",
        "get_blog_entries",
        "get_discussions_by_author_before_date",
        "get_post_discussions_by_payout",
        "get_comment_discussions_by_payout",
        "get_account_votes",
        "get_reblogged_by",
    ]
    .into_iter()
    .collect()
});

/// REST query parameters that are always materialized as arrays, even when
/// only one value is present.
pub static ALWAYS_ARRAY: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "accounts",
        "keys",
        "owners",
        "signers",
        "filter_tags",
        "select_authors",
        "select_tags",
        "signatures",
        "required_owner",
        "required_active",
        "required_posting",
        "required_other",
    ]
    .into_iter()
    .collect()
});

/// Per-method cache TTL overrides, in seconds. Methods not listed use the
/// gateway's default TTL.
pub static CACHE_TTL_SECS: LazyLock<HashMap<&'static str, u64>> = LazyLock::new(|| {
    [
        ("get_ranked_posts", 15),
        ("get_discussion", 9),
        ("get_account_posts", 15),
        ("get_profile", 30),
        ("get_state", 9),
        ("get_content", 6),
        ("get_content_replies", 6),
        ("get_active_votes", 6),
        ("unread_notifications", 60),
    ]
    .into_iter()
    .collect()
});

pub const DEFAULT_CACHE_TTL_SECS: u64 = 3;
