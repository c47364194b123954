use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// A stored row of the `pokemon` table.
///
/// `id` is assigned by the store. `types` keeps the order the catalog listed
/// them in and is never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: i32,
    pub name: String,
    pub image_url: Option<String>,
    pub types: Vec<String>,
}

/// A creature assembled during a pass, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPokemon {
    pub name: String,
    pub image_url: Option<String>,
    pub types: Vec<String>,
}

impl NewPokemon {
    /// Assembles a creature from its listing entry and resolved detail.
    pub fn from_parts(entry: CatalogEntry, detail: PokemonDetail) -> Self {
        Self {
            name: entry.name,
            image_url: detail.image_url,
            types: detail.types,
        }
    }

    /// Attaches a store-assigned identifier.
    pub fn into_stored(self, id: i32) -> Pokemon {
        Pokemon {
            id,
            name: self.name,
            image_url: self.image_url,
            types: self.types,
        }
    }
}

/// One `(name, url)` pair from the catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    /// Reference to the detail resource for this entry.
    pub url: String,
}

/// The parts of a detail record kept by Pokedex.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PokemonDetail {
    pub image_url: Option<String>,
    pub types: Vec<String>,
}
