//! AvailabilityAgent: attach region-specific watch offers to each candidate.
//!
//! Lookups are isolated per candidate: a failed or empty lookup leaves that
//! candidate with no offers and never affects the others. The output always
//! has the same length, ids and order as the input.

use std::sync::Arc;

use async_trait::async_trait;
use catalog::{AvailabilityOffer, Candidate, MovieId, RegionCode, parse_watch_providers};
use provider::{Tool, ToolProvider, tool_params};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{AgentError, Result};
use crate::message::{CONTEXT_REGION, Message, Payload};
use crate::traits::Agent;

pub const AVAILABILITY_AGENT: &str = "AvailabilityAgent";
pub const ENRICHED_TAG: &str = "recommend.enriched";

/// Looks up where each candidate can be watched
#[derive(Clone)]
pub struct AvailabilityAgent {
    provider: Arc<dyn ToolProvider>,
    default_region: RegionCode,
}

impl AvailabilityAgent {
    pub fn new(provider: Arc<dyn ToolProvider>, default_region: RegionCode) -> Self {
        Self {
            provider,
            default_region,
        }
    }

    /// Offers for one movie in `region`
    pub async fn lookup_offers(
        &self,
        movie_id: MovieId,
        region: &RegionCode,
    ) -> Result<Vec<AvailabilityOffer>> {
        let body = self
            .provider
            .call(
                Tool::GetWatchProviders.name(),
                tool_params(json!({ "movie_id": movie_id })),
            )
            .await?;
        Ok(parse_watch_providers(&body, region)?)
    }

    /// Enrich every candidate in order, one lookup at a time
    pub async fn enrich(&self, candidates: Vec<Candidate>, region: &RegionCode) -> Vec<Candidate> {
        let mut enriched = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let offers = match self.lookup_offers(candidate.id, region).await {
                Ok(offers) => offers,
                Err(e) => {
                    warn!(
                        "Availability lookup failed for {} ({}) in {}: {}",
                        candidate.title, candidate.id, region, e
                    );
                    Vec::new()
                }
            };
            debug!(
                "{} ({}) has {} offers in {}",
                candidate.title,
                candidate.id,
                offers.len(),
                region
            );
            enriched.push(candidate.with_offers(offers));
        }
        enriched
    }

    /// Region from the message context, falling back to the default
    fn region_for(&self, message: &Message) -> RegionCode {
        match message.context_value(CONTEXT_REGION).map(str::parse::<RegionCode>) {
            Some(Ok(region)) => region,
            Some(Err(e)) => {
                warn!("Ignoring bad region in message context: {}", e);
                self.default_region.clone()
            }
            None => self.default_region.clone(),
        }
    }
}

#[async_trait]
impl Agent for AvailabilityAgent {
    fn name(&self) -> &str {
        AVAILABILITY_AGENT
    }

    async fn handle(&self, message: Message) -> Result<Message> {
        let region = self.region_for(&message);
        let Message {
            intent_tag,
            payload,
            context,
        } = message;

        let candidates = match payload {
            Payload::Candidates(candidates) => candidates,
            other => {
                return Err(AgentError::UnexpectedPayload {
                    agent: AVAILABILITY_AGENT.to_string(),
                    expected: "candidates",
                    found: other.kind(),
                });
            }
        };
        debug!("{}: enriching {} candidates", intent_tag, candidates.len());

        let enriched = self.enrich(candidates, &region).await;
        Ok(Message {
            intent_tag: ENRICHED_TAG.to_string(),
            payload: Payload::Candidates(enriched),
            context,
        })
    }
}
