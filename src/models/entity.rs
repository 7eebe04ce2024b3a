// src/models/entity.rs

//! Entity kind tags and the entity sum type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Beer, Brewery};

/// Entity type tag passed by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Beer,
    Brewery,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Beer => "beer",
            EntityKind::Brewery => "brewery",
        }
    }

    /// Cache key for an entity of this kind, e.g. `beer_1569404`.
    pub fn cache_key(&self, id: u64) -> String {
        format!("{}_{}", self.as_str(), id)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beer" => Ok(EntityKind::Beer),
            "brewery" => Ok(EntityKind::Brewery),
            other => Err(AppError::UnknownKind(other.to_string())),
        }
    }
}

/// A fully resolved beer or brewery.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity {
    Beer(Beer),
    Brewery(Brewery),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Beer(_) => EntityKind::Beer,
            Entity::Brewery(_) => EntityKind::Brewery,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            Entity::Beer(beer) => beer.id,
            Entity::Brewery(brewery) => brewery.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entity::Beer(beer) => &beer.name,
            Entity::Brewery(brewery) => &brewery.name,
        }
    }

    pub fn cache_key(&self) -> String {
        self.kind().cache_key(self.id())
    }

    pub fn into_beer(self) -> Option<Beer> {
        match self {
            Entity::Beer(beer) => Some(beer),
            Entity::Brewery(_) => None,
        }
    }

    pub fn into_brewery(self) -> Option<Brewery> {
        match self {
            Entity::Brewery(brewery) => Some(brewery),
            Entity::Beer(_) => None,
        }
    }
}

impl From<Beer> for Entity {
    fn from(beer: Beer) -> Self {
        Entity::Beer(beer)
    }
}

impl From<Brewery> for Entity {
    fn from(brewery: Brewery) -> Self {
        Entity::Brewery(brewery)
    }
}
