//! Immutable gazetteer store and JSON directory loader
//!
//! A store is built once at startup, either from a directory of JSON table
//! files or programmatically through [`GazetteerBuilder`], and then shared
//! by reference across scan workers. Three tables are required (country
//! names, country codes, town names); everything else degrades to empty
//! with a log line when absent.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::normalize;
use crate::GazetteerError;

/// Auxiliary per-country evidence used during post-processing.
#[derive(Debug, Clone, Default)]
pub struct CountryFeatures {
    /// International dialing prefixes, e.g. `+33`.
    pub phone_prefixes: Vec<String>,
    /// Internet domain extensions, e.g. `.fr`.
    pub domain_extensions: Vec<String>,
    /// Pattern a postal code of this country must match.
    pub postal_code_regex: Option<Regex>,
}

/// One postcode pattern: the full form with the table's structure suffix
/// appended, plus the bare form used to pull the lookup key out of a hit.
#[derive(Debug, Clone)]
pub struct PostcodePattern {
    pub full: Regex,
    pub base: Regex,
}

/// A postcode lookup table covering one country family.
#[derive(Debug, Clone)]
pub struct PostcodeTable {
    pub label: String,
    pub patterns: Vec<PostcodePattern>,
    /// Postcode key -> (town, origin) pairs it resolves to.
    pub entries: HashMap<String, Vec<(String, String)>>,
}

impl PostcodeTable {
    /// Compile a table from bare pattern strings. `structure_suffix` is
    /// appended to each pattern to form the full match expression.
    pub fn new<L, P>(
        label: L,
        structure_suffix: &str,
        patterns: &[P],
        entries: HashMap<String, Vec<(String, String)>>,
    ) -> Result<Self, GazetteerError>
    where
        L: Into<String>,
        P: AsRef<str>,
    {
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            compiled.push(compile_pattern(pattern.as_ref(), structure_suffix)?);
        }
        Ok(PostcodeTable {
            label: label.into(),
            patterns: compiled,
            entries,
        })
    }
}

fn compile_pattern(base: &str, suffix: &str) -> Result<PostcodePattern, GazetteerError> {
    let full_src = format!("{base}{suffix}");
    let full = Regex::new(&full_src).map_err(|e| GazetteerError::InvalidPattern {
        pattern: full_src.clone(),
        message: e.to_string(),
    })?;
    let base = Regex::new(base).map_err(|e| GazetteerError::InvalidPattern {
        pattern: base.to_string(),
        message: e.to_string(),
    })?;
    Ok(PostcodePattern { full, base })
}

/// All lookup tables used by the extraction pipeline.
#[derive(Debug, Default)]
pub struct GazetteerStore {
    /// Country alias -> ISO codes it can stand for.
    pub country_names: HashMap<String, Vec<String>>,
    /// ISO code -> itself; scanned exactly, with zero tolerance.
    pub country_codes: HashMap<String, Vec<String>>,
    /// Town alias -> ISO codes of every country with a town of that name.
    pub town_names: HashMap<String, Vec<String>>,
    /// ISO code -> extra town aliases scanned only when that country is in play.
    pub extended_town_names: HashMap<String, HashMap<String, Vec<String>>>,
    /// Lookup-key town name -> population of the largest town with that name.
    pub town_populations: HashMap<String, u64>,
    /// Lookup-key town name -> ISO code of its most populous bearer.
    pub dominant_origins: HashMap<String, String>,
    /// Town spelling -> ISO code of the country sharing that exact name.
    pub country_town_same_name: HashMap<String, String>,
    /// ISO code -> province and state aliases.
    pub provinces: HashMap<String, Vec<String>>,
    /// ISO code -> auxiliary evidence features.
    pub features: HashMap<String, CountryFeatures>,
    /// ISO codes whose extended towns are scanned for every sample.
    pub country_overrides: Vec<String>,
    /// Postcode tables, in filename order.
    pub postcode_tables: Vec<PostcodeTable>,
}

impl GazetteerStore {
    /// Load a store from a directory of JSON tables.
    ///
    /// Expects `countries.json`, `country_codes.json` and `towns.json`;
    /// the remaining tables and the `postcodes/` subdirectory are optional.
    /// Postcode tables load in filename order.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, GazetteerError> {
        let dir = dir.as_ref();

        let country_names = read_required_aliases(dir, "countries.json")?;
        let codes: Vec<String> = read_required(dir, "country_codes.json")?;
        let country_codes = codes
            .into_iter()
            .map(|code| (code.clone(), vec![code]))
            .collect::<HashMap<_, _>>();
        let town_names = read_required_aliases(dir, "towns.json")?;

        let raw_extended: HashMap<String, HashMap<String, OneOrMany>> =
            read_optional(&dir.join("extended_towns.json"))?;
        let extended_town_names = raw_extended
            .into_iter()
            .map(|(origin, table)| (origin, into_alias_table(table)))
            .collect();

        let town_populations: HashMap<String, u64> =
            read_optional(&dir.join("populations.json"))?;
        let dominant_origins: HashMap<String, String> =
            read_optional(&dir.join("dominant_origins.json"))?;
        let country_town_same_name: HashMap<String, String> =
            read_optional(&dir.join("country_town_same_name.json"))?;
        let provinces: HashMap<String, Vec<String>> = read_optional(&dir.join("provinces.json"))?;
        let country_overrides: Vec<String> = read_optional(&dir.join("country_overrides.json"))?;

        let raw_features: HashMap<String, RawCountryFeatures> =
            read_optional(&dir.join("country_features.json"))?;
        let features = raw_features
            .into_iter()
            .map(|(origin, raw)| {
                let compiled = raw.compile(&origin);
                (origin, compiled)
            })
            .collect();

        let postcode_tables = load_postcode_tables(&dir.join("postcodes"))?;

        let store = GazetteerStore {
            country_names,
            country_codes,
            town_names,
            extended_town_names,
            town_populations,
            dominant_origins,
            country_town_same_name,
            provinces,
            features,
            country_overrides,
            postcode_tables,
        };
        info!(
            countries = store.country_names.len(),
            codes = store.country_codes.len(),
            towns = store.town_names.len(),
            extended_origins = store.extended_town_names.len(),
            postcode_tables = store.postcode_tables.len(),
            "gazetteer loaded"
        );
        Ok(store)
    }

    /// Population of the largest town with this name, if known.
    pub fn population(&self, name: &str) -> Option<u64> {
        self.town_populations.get(&normalize::lookup_key(name)).copied()
    }

    /// ISO code of the most populous town with this name, if known.
    pub fn dominant_origin(&self, name: &str) -> Option<&str> {
        self.dominant_origins
            .get(&normalize::lookup_key(name))
            .map(String::as_str)
    }

    /// ISO code of the country sharing this town's exact spelling.
    pub fn same_name_country(&self, town: &str) -> Option<&str> {
        self.country_town_same_name.get(town).map(String::as_str)
    }

    /// Evidence features for one origin code.
    pub fn features(&self, origin: &str) -> Option<&CountryFeatures> {
        self.features.get(origin)
    }

    /// Province aliases for one origin code.
    pub fn province_aliases(&self, origin: &str) -> Option<&[String]> {
        self.provinces.get(origin).map(Vec::as_slice)
    }

    /// Merge the extended town tables of the given origins into one
    /// alias table. Unknown origins contribute nothing.
    pub fn extended_towns_for<'a, I>(&self, origins: I) -> HashMap<String, Vec<String>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut merged: HashMap<String, Vec<String>> = HashMap::new();
        for origin in origins {
            if let Some(table) = self.extended_town_names.get(origin) {
                for (alias, codes) in table {
                    merged
                        .entry(alias.clone())
                        .or_default()
                        .extend(codes.iter().cloned());
                }
            }
        }
        for codes in merged.values_mut() {
            codes.sort();
            codes.dedup();
        }
        merged
    }
}

/// Builder for in-memory stores, used by tests and tooling.
#[derive(Debug, Default)]
pub struct GazetteerBuilder {
    store: GazetteerStore,
}

impl GazetteerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a country alias resolving to one origin code.
    pub fn country(mut self, alias: &str, origin: &str) -> Self {
        self.store
            .country_names
            .entry(alias.to_string())
            .or_default()
            .push(origin.to_string());
        self
    }

    /// Register an ISO code for exact scanning.
    pub fn country_code(mut self, code: &str) -> Self {
        self.store
            .country_codes
            .insert(code.to_string(), vec![code.to_string()]);
        self
    }

    /// Register a town alias resolving to the given origin codes.
    pub fn town(mut self, alias: &str, origins: &[&str]) -> Self {
        self.store
            .town_names
            .entry(alias.to_string())
            .or_default()
            .extend(origins.iter().map(|o| o.to_string()));
        self
    }

    /// Register an extended town alias under one country's table.
    pub fn extended_town(mut self, table_origin: &str, alias: &str, origins: &[&str]) -> Self {
        self.store
            .extended_town_names
            .entry(table_origin.to_string())
            .or_default()
            .entry(alias.to_string())
            .or_default()
            .extend(origins.iter().map(|o| o.to_string()));
        self
    }

    /// Record a town population; `name` is normalized to its lookup key.
    pub fn population(mut self, name: &str, population: u64) -> Self {
        self.store
            .town_populations
            .insert(normalize::lookup_key(name), population);
        self
    }

    /// Record the dominant origin of a town name; normalized like populations.
    pub fn dominant_origin(mut self, name: &str, origin: &str) -> Self {
        self.store
            .dominant_origins
            .insert(normalize::lookup_key(name), origin.to_string());
        self
    }

    /// Record a town that shares its spelling with a country.
    pub fn same_name(mut self, town: &str, origin: &str) -> Self {
        self.store
            .country_town_same_name
            .insert(town.to_string(), origin.to_string());
        self
    }

    /// Register province aliases for one origin code.
    pub fn provinces(mut self, origin: &str, aliases: &[&str]) -> Self {
        self.store
            .provinces
            .entry(origin.to_string())
            .or_default()
            .extend(aliases.iter().map(|a| a.to_string()));
        self
    }

    /// Attach evidence features to one origin code.
    pub fn features(mut self, origin: &str, features: CountryFeatures) -> Self {
        self.store.features.insert(origin.to_string(), features);
        self
    }

    /// Always scan this country's extended towns.
    pub fn country_override(mut self, origin: &str) -> Self {
        self.store.country_overrides.push(origin.to_string());
        self
    }

    pub fn postcode_table(mut self, table: PostcodeTable) -> Self {
        self.store.postcode_tables.push(table);
        self
    }

    pub fn build(self) -> GazetteerStore {
        self.store
    }
}

/// A table value that is either one origin code or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(origin) => vec![origin],
            OneOrMany::Many(origins) => origins,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCountryFeatures {
    #[serde(default)]
    phone_prefixes: Vec<String>,
    #[serde(default)]
    domain_extensions: Vec<String>,
    #[serde(default)]
    postal_code_regex: Option<String>,
}

impl RawCountryFeatures {
    fn compile(self, origin: &str) -> CountryFeatures {
        let postal_code_regex = self.postal_code_regex.and_then(|src| match Regex::new(&src) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(%origin, error = %e, "skipping unparseable postal code pattern");
                None
            }
        });
        CountryFeatures {
            phone_prefixes: self.phone_prefixes,
            domain_extensions: self.domain_extensions,
            postal_code_regex,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPostcodeTable {
    #[serde(default)]
    structure_suffix: String,
    patterns: Vec<String>,
    entries: HashMap<String, Vec<(String, String)>>,
}

fn into_alias_table(raw: HashMap<String, OneOrMany>) -> HashMap<String, Vec<String>> {
    raw.into_iter()
        .map(|(alias, origins)| (alias, origins.into_vec()))
        .collect()
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, GazetteerError> {
    let raw = fs::read_to_string(path).map_err(|source| GazetteerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|e| GazetteerError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn read_required<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<T, GazetteerError> {
    let path = dir.join(name);
    if !path.exists() {
        return Err(GazetteerError::MissingTable(name.to_string()));
    }
    read_json(&path)
}

fn read_required_aliases(
    dir: &Path,
    name: &str,
) -> Result<HashMap<String, Vec<String>>, GazetteerError> {
    let raw: HashMap<String, OneOrMany> = read_required(dir, name)?;
    Ok(into_alias_table(raw))
}

fn read_optional<T: DeserializeOwned + Default>(path: &Path) -> Result<T, GazetteerError> {
    if !path.exists() {
        debug!(path = %path.display(), "optional gazetteer table not present");
        return Ok(T::default());
    }
    read_json(path)
}

fn load_postcode_tables(dir: &Path) -> Result<Vec<PostcodeTable>, GazetteerError> {
    if !dir.is_dir() {
        debug!(path = %dir.display(), "no postcode tables directory");
        return Ok(Vec::new());
    }
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|source| GazetteerError::Io {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let raw: RawPostcodeTable = read_json(&path)?;
        match PostcodeTable::new(label.clone(), &raw.structure_suffix, &raw.patterns, raw.entries)
        {
            Ok(table) => tables.push(table),
            Err(e) => warn!(%label, error = %e, "skipping postcode table"),
        }
    }
    Ok(tables)
}
