//! UserIntentAgent: raw request -> normalised `Intent`.
//!
//! ## Precedence
//! A request may name more than one axis. The first non-blank one wins, in
//! this fixed order:
//! 1. `seed_movie`
//! 2. `query`
//! 3. `genre`
//!
//! A request naming none of them is rejected.

use std::num::NonZeroUsize;

use async_trait::async_trait;
use catalog::{Intent, Lookup, RecommendRequest, RegionCode};
use tracing::debug;

use crate::error::{AgentError, Result};
use crate::message::{CONTEXT_REGION, Message, Payload};
use crate::traits::Agent;

pub const USER_INTENT_AGENT: &str = "UserIntentAgent";
pub const INTENT_TAG: &str = "recommend.intent";

/// Count used when the request leaves `num` unset or non-positive
pub const DEFAULT_COUNT: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(n) => n,
    None => unreachable!(),
};

/// Parses inbound recommendation requests into intents
#[derive(Debug, Clone)]
pub struct UserIntentAgent {
    default_count: NonZeroUsize,
    default_region: RegionCode,
}

impl UserIntentAgent {
    pub fn new(default_count: NonZeroUsize, default_region: RegionCode) -> Self {
        Self {
            default_count,
            default_region,
        }
    }

    /// Normalise a raw request.
    ///
    /// Blank strings count as unset. Fails with `InvalidIntent` when no axis
    /// is set or the region is not a two-letter code. Any positive `num` is
    /// accepted; the recommender returns at most what its page limit yields.
    pub fn resolve(&self, request: &RecommendRequest) -> Result<Intent> {
        let seed = non_blank(request.seed_movie.as_deref());
        let query = non_blank(request.query.as_deref());
        let genre = non_blank(request.genre.as_deref());

        let axes_set = [seed, query, genre].iter().filter(|a| a.is_some()).count();
        if axes_set > 1 {
            debug!(
                "Request names {} lookup axes; applying seed > query > genre precedence",
                axes_set
            );
        }

        let lookup = match (seed, query, genre) {
            (Some(seed), _, _) => Lookup::SeedTitle(seed.to_string()),
            (None, Some(query), _) => Lookup::Query(query.to_string()),
            (None, None, Some(genre)) => Lookup::Genre(genre.to_string()),
            (None, None, None) => {
                return Err(AgentError::InvalidIntent(
                    "one of seed_movie, query or genre is required".to_string(),
                ));
            }
        };

        let count = request
            .num
            .filter(|&n| n > 0)
            .and_then(|n| usize::try_from(n).ok())
            .and_then(NonZeroUsize::new)
            .unwrap_or(self.default_count);

        let region = match non_blank(request.region.as_deref()) {
            Some(raw) => raw
                .parse::<RegionCode>()
                .map_err(|e| AgentError::InvalidIntent(e.to_string()))?,
            None => self.default_region.clone(),
        };

        Ok(Intent::new(lookup, count, region))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[async_trait]
impl Agent for UserIntentAgent {
    fn name(&self) -> &str {
        USER_INTENT_AGENT
    }

    async fn handle(&self, message: Message) -> Result<Message> {
        let Payload::Request(request) = &message.payload else {
            return Err(AgentError::UnexpectedPayload {
                agent: USER_INTENT_AGENT.to_string(),
                expected: "request",
                found: message.payload.kind(),
            });
        };

        let intent = self.resolve(request)?;
        debug!(
            "Resolved intent: {} lookup, count {}, region {}",
            intent.lookup.label(),
            intent.count,
            intent.region
        );

        let region = intent.region.to_string();
        Ok(message
            .reply(INTENT_TAG, Payload::Intent(intent))
            .with_context(CONTEXT_REGION, region))
    }
}
