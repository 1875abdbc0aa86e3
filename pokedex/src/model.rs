use serde::{Deserialize, Serialize};

/// Minimal catalog entry from the listing endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub name: String,
    pub url: String,
}

impl EntitySummary {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Numeric id encoded in the locator, e.g. `.../pokemon/4/`.
    pub fn id_from_url(&self) -> Option<u32> {
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .and_then(|segment| segment.parse().ok())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
}

/// Ordered type slot; index 0 is the primary type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub kind: TypeRef,
}

impl TypeSlot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            kind: TypeRef { name: name.into() },
        }
    }

    pub fn name(&self) -> &str {
        &self.kind.name
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteSet {
    pub front_default: Option<String>,
    pub front_shiny: Option<String>,
    pub back_default: Option<String>,
    pub back_shiny: Option<String>,
}

impl SpriteSet {
    pub fn url(&self, variant: SpriteVariant) -> Option<&str> {
        let url = match (variant.back, variant.shiny) {
            (false, false) => &self.front_default,
            (false, true) => &self.front_shiny,
            (true, false) => &self.back_default,
            (true, true) => &self.back_shiny,
        };
        url.as_deref()
    }
}

/// Which of the four sprites a card currently shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteVariant {
    pub back: bool,
    pub shiny: bool,
}

impl SpriteVariant {
    pub fn label(&self) -> &'static str {
        match (self.back, self.shiny) {
            (false, false) => "front_default",
            (false, true) => "front_shiny",
            (true, false) => "back_default",
            (true, true) => "back_shiny",
        }
    }
}

/// Fully resolved entity. Height is in decimetres, weight in hectograms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDetail {
    pub id: u32,
    pub name: String,
    pub types: Vec<TypeSlot>,
    pub height: u32,
    pub weight: u32,
    pub base_experience: Option<u32>,
    pub sprites: SpriteSet,
}

impl EntityDetail {
    pub fn primary_type(&self) -> Option<&str> {
        self.types.first().map(TypeSlot::name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(TypeSlot::name)
    }

    pub fn height_m(&self) -> f32 {
        self.height as f32 / 10.0
    }

    pub fn weight_kg(&self) -> f32 {
        self.weight as f32 / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_parsed_from_trailing_url_segment() {
        let summary = EntitySummary::new("charmander", "https://pokeapi.co/api/v2/pokemon/4/");
        assert_eq!(summary.id_from_url(), Some(4));

        let no_slash = EntitySummary::new("charmander", "https://pokeapi.co/api/v2/pokemon/4");
        assert_eq!(no_slash.id_from_url(), Some(4));

        let by_name = EntitySummary::new("charmander", "https://pokeapi.co/api/v2/pokemon/charmander");
        assert_eq!(by_name.id_from_url(), None);
    }

    #[test]
    fn sprite_variant_selects_matching_url() {
        let sprites = SpriteSet {
            front_default: Some("fd".into()),
            front_shiny: Some("fs".into()),
            back_default: Some("bd".into()),
            back_shiny: None,
        };
        let front = SpriteVariant::default();
        assert_eq!(sprites.url(front), Some("fd"));
        assert_eq!(front.label(), "front_default");
        assert_eq!(sprites.url(SpriteVariant { back: false, shiny: true }), Some("fs"));
        assert_eq!(sprites.url(SpriteVariant { back: true, shiny: false }), Some("bd"));
        assert_eq!(sprites.url(SpriteVariant { back: true, shiny: true }), None);
    }

    #[test]
    fn units_convert_to_metric() {
        let detail = EntityDetail {
            id: 25,
            name: "pikachu".into(),
            types: vec![TypeSlot::new("electric")],
            height: 4,
            weight: 60,
            base_experience: Some(112),
            sprites: SpriteSet::default(),
        };
        assert_eq!(detail.primary_type(), Some("electric"));
        assert!((detail.height_m() - 0.4).abs() < f32::EPSILON);
        assert!((detail.weight_kg() - 6.0).abs() < f32::EPSILON);
    }
}
