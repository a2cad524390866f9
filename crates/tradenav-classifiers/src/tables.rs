//! Reference tables: expected chapters, terminology, and curated mappings
//!
//! The three tables are read-only for the lifetime of a classifier. They are
//! built once (from the built-in data or a YAML file) and shared behind an
//! `Arc`.
//!
//! YAML layout, one block per category key:
//!
//! ```yaml
//! categories:
//!   Electronics:
//!     chapters:
//!       - { start: 84, end: 85 }
//!     terms: [battery, laptop]
//!     mappings:
//!       - code: "8471.30.00"
//!         description: Portable automatic data processing machines
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tradenav_core::{Error, Result};
use tracing::info;

/// Lowest and highest HS chapter numbers
pub const MIN_CHAPTER: u8 = 1;
pub const MAX_CHAPTER: u8 = 97;

/// Inclusive range of HS chapters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRange {
    pub start: u8,
    pub end: u8,
}

impl ChapterRange {
    pub const fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, chapter: u8) -> bool {
        (self.start..=self.end).contains(&chapter)
    }

    fn is_valid(&self) -> bool {
        MIN_CHAPTER <= self.start && self.start <= self.end && self.end <= MAX_CHAPTER
    }
}

/// A curated HS code candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub code: String,
    pub description: String,
}

impl MappingEntry {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

/// Everything known about one category key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    /// Expected chapter ranges, used only to score confidence
    #[serde(default)]
    pub chapters: Vec<ChapterRange>,

    /// Lowercase keywords diagnostic of the category, in match-report order
    #[serde(default)]
    pub terms: Vec<String>,

    /// Candidates ordered by preference
    #[serde(default)]
    pub mappings: Vec<MappingEntry>,
}

/// The category chapter, terminology, and static mapping tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTables {
    #[serde(default)]
    categories: BTreeMap<String, CategorySpec>,
}

impl ReferenceTables {
    /// Create tables from per-category specs, validating them
    pub fn new(categories: BTreeMap<String, CategorySpec>) -> Result<Self> {
        let tables = Self { categories };
        tables.validate()?;
        Ok(tables)
    }

    /// Tables with no categories; every category is unrecognized
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in tables shipped with the classifier
    pub fn builtin() -> Self {
        let categories = BUILTIN
            .iter()
            .map(|b| {
                let spec = CategorySpec {
                    chapters: b.chapters.to_vec(),
                    terms: b.terms.iter().map(|t| (*t).to_string()).collect(),
                    mappings: b
                        .mappings
                        .iter()
                        .map(|(code, desc)| MappingEntry::new(*code, *desc))
                        .collect(),
                };
                (b.key.to_string(), spec)
            })
            .collect();

        Self { categories }
    }

    /// Parse tables from a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let tables: Self = serde_yaml::from_str(yaml)?;
        tables.validate()?;
        Ok(tables)
    }

    /// Load tables from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let tables = Self::from_yaml_str(&content)?;
        info!(
            "Loaded reference tables for {} categories from {}",
            tables.len(),
            path.display()
        );
        Ok(tables)
    }

    fn validate(&self) -> Result<()> {
        for (key, spec) in &self.categories {
            if key.trim().is_empty() {
                return Err(Error::config("category key must not be empty"));
            }
            if let Some(range) = spec.chapters.iter().find(|r| !r.is_valid()) {
                return Err(Error::config(format!(
                    "category '{}': invalid chapter range {}-{} (expected {}..={})",
                    key, range.start, range.end, MIN_CHAPTER, MAX_CHAPTER
                )));
            }
            if spec.mappings.iter().any(|m| m.code.trim().is_empty()) {
                return Err(Error::config(format!(
                    "category '{}': mapping entry with empty code",
                    key
                )));
            }
        }
        Ok(())
    }

    /// Whether the category is one of the enumerated keys
    pub fn is_recognized(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    pub fn get(&self, category: &str) -> Option<&CategorySpec> {
        self.categories.get(category)
    }

    /// Expected chapter ranges; `None` when the category has no chapter table
    pub fn chapter_ranges(&self, category: &str) -> Option<&[ChapterRange]> {
        self.get(category)
            .map(|s| s.chapters.as_slice())
            .filter(|r| !r.is_empty())
    }

    pub fn terminology(&self, category: &str) -> Option<&[String]> {
        self.get(category).map(|s| s.terms.as_slice())
    }

    /// Curated candidates; `None` when the category has no entries
    pub fn mappings(&self, category: &str) -> Option<&[MappingEntry]> {
        self.get(category)
            .map(|s| s.mappings.as_slice())
            .filter(|m| !m.is_empty())
    }

    /// Iterate categories in key order
    pub fn categories(&self) -> impl Iterator<Item = (&str, &CategorySpec)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

struct BuiltinCategory {
    key: &'static str,
    chapters: &'static [ChapterRange],
    terms: &'static [&'static str],
    mappings: &'static [(&'static str, &'static str)],
}

const fn r(start: u8, end: u8) -> ChapterRange {
    ChapterRange::new(start, end)
}

const BUILTIN: &[BuiltinCategory] = &[
    BuiltinCategory {
        key: "Automotive",
        chapters: &[r(40, 40), r(84, 85), r(87, 87)],
        terms: &[
            "automotive", "brake", "bumper", "car", "engine", "exhaust", "headlight", "tire",
            "tyre", "vehicle", "wheel",
        ],
        mappings: &[
            ("8708.99.00", "Other parts and accessories of motor vehicles"),
            ("8708.30.00", "Brakes and servo-brakes and parts thereof"),
            ("4011.10.00", "New pneumatic tyres of rubber, for motor cars"),
            ("8512.20.00", "Other lighting or visual signalling equipment for vehicles"),
            ("8708.40.00", "Gear boxes and parts thereof"),
        ],
    },
    BuiltinCategory {
        key: "Chemicals",
        chapters: &[r(28, 38)],
        terms: &[
            "acid", "adhesive", "chemical", "compound", "fertilizer", "oxide", "paint",
            "reagent", "resin", "solvent",
        ],
        mappings: &[
            ("3824.99.00", "Other chemical products and preparations"),
            ("3208.20.00", "Paints and varnishes based on acrylic or vinyl polymers"),
            ("3506.91.00", "Adhesives based on polymers or rubber"),
            ("2915.21.00", "Acetic acid"),
            ("3102.10.00", "Urea, whether or not in aqueous solution"),
        ],
    },
    BuiltinCategory {
        key: "Cosmetics & Personal Care",
        chapters: &[r(33, 34)],
        terms: &[
            "cosmetic", "cream", "deodorant", "fragrance", "lipstick", "lotion", "makeup",
            "perfume", "shampoo", "skincare", "soap",
        ],
        mappings: &[
            ("3304.99.00", "Other beauty or make-up preparations and skin-care preparations"),
            ("3305.10.00", "Shampoos"),
            ("3303.00.00", "Perfumes and toilet waters"),
            ("3307.20.00", "Personal deodorants and antiperspirants"),
            ("3401.11.00", "Soap for toilet use"),
        ],
    },
    BuiltinCategory {
        key: "Electronics",
        chapters: &[r(84, 85), r(90, 90)],
        terms: &[
            "battery", "cable", "charger", "circuit", "computer", "electronic", "headphone",
            "laptop", "monitor", "phone", "processor", "semiconductor", "speaker", "tablet",
        ],
        mappings: &[
            ("8471.30.00", "Portable automatic data processing machines, weighing not more than 10 kg"),
            ("8517.13.00", "Smartphones"),
            ("8518.30.00", "Headphones and earphones"),
            ("8504.40.00", "Static converters (power supplies and chargers)"),
            ("8528.52.00", "Monitors capable of connecting to a data processing machine"),
        ],
    },
    BuiltinCategory {
        key: "Food & Beverages",
        chapters: &[r(1, 24)],
        terms: &[
            "beverage", "coffee", "dairy", "drink", "food", "fruit", "juice", "meat", "snack",
            "spice", "sugar", "tea", "vegetable",
        ],
        mappings: &[
            ("2106.90.00", "Food preparations not elsewhere specified"),
            ("0901.21.00", "Coffee, roasted, not decaffeinated"),
            ("1905.90.00", "Bread, pastry, cakes, biscuits and other bakers' wares"),
            ("2009.89.00", "Other fruit or vegetable juices"),
            ("1704.90.00", "Sugar confectionery not containing cocoa"),
        ],
    },
    BuiltinCategory {
        key: "Furniture",
        chapters: &[r(94, 94)],
        terms: &[
            "bed", "cabinet", "chair", "desk", "furniture", "mattress", "shelf", "sofa",
            "table", "wardrobe",
        ],
        mappings: &[
            ("9403.60.00", "Other wooden furniture"),
            ("9401.61.00", "Upholstered seats with wooden frames"),
            ("9403.20.00", "Other metal furniture"),
            ("9404.21.00", "Mattresses of cellular rubber or plastics"),
            ("9403.70.00", "Furniture of plastics"),
        ],
    },
    BuiltinCategory {
        key: "Machinery & Equipment",
        chapters: &[r(84, 85)],
        terms: &[
            "compressor", "conveyor", "drill", "equipment", "hydraulic", "industrial",
            "machine", "motor", "pump", "turbine", "valve",
        ],
        mappings: &[
            ("8479.89.00", "Other machines and mechanical appliances having individual functions"),
            ("8413.70.00", "Other centrifugal pumps"),
            ("8481.80.00", "Other taps, cocks and valves"),
            ("8467.21.00", "Drills of all kinds, with self-contained electric motor"),
            ("8428.90.00", "Other lifting, handling, loading or unloading machinery"),
        ],
    },
    BuiltinCategory {
        key: "Medical Devices",
        chapters: &[r(30, 30), r(90, 90)],
        terms: &[
            "bandage", "catheter", "diagnostic", "medical", "orthopedic", "stethoscope",
            "surgical", "syringe", "thermometer",
        ],
        mappings: &[
            ("9018.90.00", "Other medical, surgical or veterinary instruments and appliances"),
            ("9018.31.00", "Syringes, with or without needles"),
            ("9021.10.00", "Orthopaedic or fracture appliances"),
            ("3005.90.00", "Wadding, gauze, bandages and similar articles"),
            ("9025.19.00", "Other thermometers, not combined with other instruments"),
        ],
    },
    BuiltinCategory {
        key: "Metals & Metal Products",
        chapters: &[r(72, 83)],
        terms: &[
            "alloy", "aluminum", "brass", "bronze", "copper", "forged", "galvanized", "iron",
            "metal", "stainless", "steel", "zinc",
        ],
        mappings: &[
            ("7326.90.00", "Other articles of iron or steel"),
            ("7318.15.00", "Other screws and bolts of iron or steel"),
            ("7308.90.00", "Structures and parts of structures of iron or steel"),
            ("7616.99.00", "Other articles of aluminium"),
            ("7412.20.00", "Copper alloy tube or pipe fittings"),
        ],
    },
    BuiltinCategory {
        key: "Plastics & Rubber",
        chapters: &[r(39, 40)],
        terms: &[
            "acrylic", "latex", "nylon", "plastic", "polyethylene", "polymer", "polypropylene",
            "pvc", "rubber", "silicone", "vinyl",
        ],
        mappings: &[
            ("3926.90.00", "Other articles of plastics"),
            ("3923.21.00", "Sacks and bags of polymers of ethylene"),
            ("3924.10.00", "Tableware and kitchenware of plastics"),
            ("4016.99.00", "Other articles of vulcanised rubber"),
            ("3920.10.00", "Plates, sheets and film of polymers of ethylene"),
        ],
    },
    BuiltinCategory {
        key: "Textiles & Apparel",
        chapters: &[r(50, 63)],
        terms: &[
            "apparel", "clothing", "cotton", "dress", "fabric", "garment", "jacket", "knit",
            "polyester", "shirt", "silk", "textile", "wool", "yarn",
        ],
        mappings: &[
            ("6109.10.00", "T-shirts, singlets and other vests, of cotton, knitted"),
            ("6203.42.00", "Men's or boys' trousers and shorts, of cotton"),
            ("6204.62.00", "Women's or girls' trousers and shorts, of cotton"),
            ("6110.20.00", "Jerseys, pullovers and cardigans, of cotton, knitted"),
            ("5208.52.00", "Printed plain weave cotton fabrics"),
        ],
    },
    BuiltinCategory {
        key: "Toys & Games",
        chapters: &[r(95, 95)],
        terms: &[
            "board game", "doll", "game", "plush", "puzzle", "toy", "video game",
        ],
        mappings: &[
            ("9503.00.00", "Tricycles, scooters, dolls, other toys, puzzles and models"),
            ("9504.50.00", "Video game consoles and machines"),
            ("9504.90.00", "Other table or parlour games"),
            ("9505.10.00", "Articles for Christmas festivities"),
            ("9506.91.00", "Articles and equipment for general physical exercise"),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_are_valid() {
        let tables = ReferenceTables::builtin();
        assert!(tables.validate().is_ok());
        assert_eq!(tables.len(), BUILTIN.len());

        for (key, spec) in tables.categories() {
            assert!(!spec.chapters.is_empty(), "{} has no chapters", key);
            assert!(!spec.mappings.is_empty(), "{} has no mappings", key);
            assert!(spec.terms.iter().all(|t| *t == t.to_lowercase()), "{} has uppercase terms", key);
        }
    }

    #[test]
    fn test_builtin_mappings_fall_in_expected_chapters() {
        let tables = ReferenceTables::builtin();
        for (key, spec) in tables.categories() {
            for entry in &spec.mappings {
                let chapter = tradenav_core::hs_chapter(&entry.code).unwrap();
                assert!(
                    spec.chapters.iter().any(|r| r.contains(chapter)),
                    "{} mapping {} outside expected chapters",
                    key,
                    entry.code
                );
            }
        }
    }

    #[test]
    fn test_lookup() {
        let tables = ReferenceTables::builtin();
        assert!(tables.is_recognized("Electronics"));
        assert!(!tables.is_recognized("Unobtainium"));
        assert!(!tables.is_recognized("electronics"));

        let mappings = tables.mappings("Electronics").unwrap();
        assert_eq!(mappings[0].code, "8471.30.00");
        assert!(tables.mappings("Unobtainium").is_none());
        assert!(tables.chapter_ranges("Unobtainium").is_none());
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
categories:
  Ceramics:
    chapters:
      - { start: 69, end: 69 }
    terms: [porcelain, stoneware]
    mappings:
      - code: "6912.00.00"
        description: Ceramic tableware other than porcelain
"#;
        let tables = ReferenceTables::from_yaml_str(yaml).unwrap();
        assert!(tables.is_recognized("Ceramics"));
        assert_eq!(tables.chapter_ranges("Ceramics").unwrap(), &[ChapterRange::new(69, 69)]);
        assert_eq!(tables.terminology("Ceramics").unwrap().len(), 2);
    }

    #[test]
    fn test_from_yaml_rejects_bad_range() {
        let yaml = r#"
categories:
  Broken:
    chapters:
      - { start: 90, end: 98 }
"#;
        let err = ReferenceTables::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let yaml = r#"
categories:
  Reversed:
    chapters:
      - { start: 50, end: 40 }
"#;
        assert!(ReferenceTables::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_from_yaml_rejects_empty_code() {
        let yaml = r#"
categories:
  Empty:
    mappings:
      - code: "  "
        description: nothing
"#;
        assert!(ReferenceTables::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_from_yaml_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "categories:\n  Glass:\n    chapters:\n      - {{ start: 70, end: 70 }}").unwrap();

        let tables = ReferenceTables::from_yaml_file(file.path()).unwrap();
        assert!(tables.is_recognized("Glass"));
        assert!(tables.mappings("Glass").is_none());
    }
}
