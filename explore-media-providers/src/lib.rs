// Explore Media Providers
//
// One DiscoverSource implementation per upstream catalog. Every adapter
// shares the process-wide Fetcher and ResponseCache from explore-core and
// accepts a base URL override so it can be pointed at a stub server.
//
// - bangumi: Bangumi daily calendar (local pagination)
// - cctv: CCTV video albums (static vocabulary, upstream pagination)
// - tencent: Tencent Video channel pages (bootstrapped filter axes)
// - mangguo: Mango TV channel library (bootstrapped filter axes)
//
// medal is not a discover source: it scrapes NexusPHP medal pages for the
// sites listed in the `medal` config section.

pub mod bangumi;
pub mod cctv;
pub mod mangguo;
pub mod medal;
pub mod tencent;

pub use bangumi::BangumiDaily;
pub use cctv::Cctv;
pub use mangguo::Mangguo;
pub use medal::{Medal, MedalWall};
pub use tencent::TencentVideo;

use std::sync::Arc;

use explore_core::config::ModulesConfig;
use explore_core::{Fetcher, ResponseCache, SourceRegistry};

/// Build a registry holding every adapter switched on in `modules`.
///
/// All adapters share one fetcher and one response cache.
#[must_use]
pub fn build_registry(modules: &ModulesConfig, fetcher: &Fetcher, cache: &ResponseCache) -> SourceRegistry {
    let mut registry = SourceRegistry::new();

    if modules.is_enabled(bangumi::SOURCE_ID) {
        registry.register(Arc::new(BangumiDaily::new(fetcher.clone(), cache.clone())));
    }
    if modules.is_enabled(cctv::SOURCE_ID) {
        registry.register(Arc::new(Cctv::new(fetcher.clone(), cache.clone())));
    }
    if modules.is_enabled(tencent::SOURCE_ID) {
        registry.register(Arc::new(TencentVideo::new(fetcher.clone(), cache.clone())));
    }
    if modules.is_enabled(mangguo::SOURCE_ID) {
        registry.register(Arc::new(Mangguo::new(fetcher.clone(), cache.clone())));
    }

    registry
}
