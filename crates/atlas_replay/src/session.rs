use std::collections::HashMap;

use serde::Serialize;
use shadow_atlas::{AtlasError, Reservation, TileAtlas, TileRegion, UvRect};
use tracing::{debug, warn};

use crate::script::ReplayRequest;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ReplayOutcome {
    Reserved {
        light: String,
        region: TileRegion,
        uv: UvRect,
        coverage: f32,
    },
    Released {
        light: String,
        region: TileRegion,
        coverage: f32,
    },
    Cleared {
        released_tiles: usize,
    },
    Rejected {
        light: Option<String>,
        reason: String,
    },
}

/// Plays the render pipeline's side of the atlas contract: each light keeps
/// the handle it was given and hands it back when it stops casting shadows.
pub struct ReplaySession {
    atlas: TileAtlas,
    lights: HashMap<String, Reservation>,
}

impl ReplaySession {
    pub fn new(atlas: TileAtlas) -> Self {
        Self {
            atlas,
            lights: HashMap::new(),
        }
    }

    pub fn atlas(&self) -> &TileAtlas {
        &self.atlas
    }

    pub fn held_lights(&self) -> usize {
        self.lights.len()
    }

    pub fn apply(&mut self, request: ReplayRequest) -> ReplayOutcome {
        match request {
            ReplayRequest::Reserve { light, resolution } => {
                self.reserve_with(light, |atlas| atlas.reserve_for_resolution(resolution))
            }
            ReplayRequest::ReserveTiles {
                light,
                width,
                height,
            } => self.reserve_with(light, |atlas| atlas.reserve(width, height)),
            ReplayRequest::Release { light } => self.release(light),
            ReplayRequest::Clear => {
                let released_tiles = self.atlas.clear();
                self.lights.clear();
                ReplayOutcome::Cleared { released_tiles }
            }
        }
    }

    fn reserve_with(
        &mut self,
        light: String,
        reserve: impl FnOnce(&mut TileAtlas) -> Result<Reservation, AtlasError>,
    ) -> ReplayOutcome {
        if self.lights.contains_key(&light) {
            return ReplayOutcome::Rejected {
                light: Some(light),
                reason: "light already holds a reservation".to_owned(),
            };
        }
        match reserve(&mut self.atlas) {
            Ok(reservation) => {
                let region = reservation.region();
                let uv = self.atlas.uv_for(&reservation);
                debug!(%light, ?region, "light reserved shadow tiles");
                self.lights.insert(light.clone(), reservation);
                ReplayOutcome::Reserved {
                    light,
                    region,
                    uv,
                    coverage: self.atlas.coverage(),
                }
            }
            Err(err) => {
                warn!(%light, "shadow reservation rejected: {err}");
                ReplayOutcome::Rejected {
                    light: Some(light),
                    reason: err.to_string(),
                }
            }
        }
    }

    fn release(&mut self, light: String) -> ReplayOutcome {
        let Some(reservation) = self.lights.remove(&light) else {
            return ReplayOutcome::Rejected {
                light: Some(light),
                reason: "light holds no reservation".to_owned(),
            };
        };
        match self.atlas.release(reservation) {
            Ok(region) => ReplayOutcome::Released {
                light,
                region,
                coverage: self.atlas.coverage(),
            },
            Err(err) => {
                let reason = err.to_string();
                warn!(%light, "shadow release rejected: {reason}");
                // A stale handle's tiles already went back to the atlas on clear.
                if let AtlasError::ForeignReservation(reservation) = err {
                    self.lights.insert(light.clone(), reservation);
                }
                ReplayOutcome::Rejected {
                    light: Some(light),
                    reason,
                }
            }
        }
    }
}
