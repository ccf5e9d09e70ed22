/*
    core_feed - Change-feed subscription layer

    Consumes the remote change-feed protocol: a bounded most-recent-first
    query to seed the cache, a live delta stream, and a point-write primitive
    for read acknowledgements.

    The subscriber seeds the store, captures the per-user freshness cursor,
    and pumps live deltas into the store, handing fresh `added` records to the
    alert sink. Retry policy lives in the transport layer, not here: a stream
    error leaves the subscription inactive and a fresh subscribe call is
    required to resume.
*/

pub mod errors;
pub mod feed;
pub mod memory;
pub mod subscriber;
pub mod subscription;

pub use errors::{FeedError, FeedResult};
pub use feed::{ChangeFeed, DeltaStream, FeedEvent};
pub use memory::InMemoryChangeFeed;
pub use subscriber::{AlertSink, ChangeFeedSubscriber, ErrorSink};
pub use subscription::Subscription;
