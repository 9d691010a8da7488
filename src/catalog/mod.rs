// Catalog - the static song list everything else derives from
// Loaded once per session, validated up front, never mutated afterwards

pub mod song;

pub use song::{decade_label, decade_of, Dimension, DimensionValue, ParseDimensionError, Song, SongId};

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate song id {0}")]
    DuplicateId(SongId),

    #[error("song {id} has invalid year {year} (expected four digits)")]
    InvalidYear { id: SongId, year: u16 },

    #[error("song {id} has an empty {field} field")]
    EmptyField { id: SongId, field: &'static str },
}

/// Immutable, validated set of songs
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    songs: Vec<Song>,
    index: HashMap<SongId, usize>,
}

impl Catalog {
    /// Validate and wrap a list of songs. Order is preserved.
    pub fn new(songs: Vec<Song>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(songs.len());

        for (position, song) in songs.iter().enumerate() {
            validate_song(song)?;
            if index.insert(song.id, position).is_some() {
                return Err(CatalogError::DuplicateId(song.id));
            }
        }

        debug!("Validated catalog of {} songs", songs.len());
        Ok(Self { songs, index })
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let songs: Vec<Song> = serde_json::from_str(json)?;
        Self::new(songs)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&content)?;
        info!("Loaded {} songs from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn get(&self, id: SongId) -> Option<&Song> {
        self.index.get(&id).and_then(|&position| self.songs.get(position))
    }

    /// Sorted distinct values of one dimension - the option list of a multi-select filter
    pub fn distinct_values(&self, dimension: Dimension) -> Vec<DimensionValue> {
        self.songs
            .iter()
            .map(|song| song.value_of(dimension))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Decade -> ascending distinct years, for the decade-grouped year picker
    pub fn years_by_decade(&self) -> BTreeMap<u16, Vec<u16>> {
        let mut decades: BTreeMap<u16, BTreeSet<u16>> = BTreeMap::new();
        for song in &self.songs {
            decades.entry(song.decade()).or_default().insert(song.year);
        }
        decades
            .into_iter()
            .map(|(decade, years)| (decade, years.into_iter().collect()))
            .collect()
    }
}

fn validate_song(song: &Song) -> Result<(), CatalogError> {
    if !(1000..=9999).contains(&song.year) {
        return Err(CatalogError::InvalidYear {
            id: song.id,
            year: song.year,
        });
    }

    let fields = [
        ("song", &song.song),
        ("movie", &song.movie),
        ("composer", &song.composer),
        ("singer", &song.singer),
        ("lyricist", &song.lyricist),
    ];
    for (field, value) in fields {
        if value.trim().is_empty() {
            return Err(CatalogError::EmptyField { id: song.id, field });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::song::fixtures::{five_songs, song};
    use super::*;
    use std::io::Write;

    #[test]
    fn test_new_keeps_order_and_indexes() {
        let catalog = Catalog::new(five_songs()).unwrap();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.songs()[2].song, "Malare");
        assert_eq!(catalog.get(SongId(4)).map(|s| s.composer.as_str()), Some("C"));
        assert!(catalog.get(SongId(99)).is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut songs = five_songs();
        songs.push(song(3, "Again", 1980, "D", "W", "L9"));
        match Catalog::new(songs) {
            Err(CatalogError::DuplicateId(id)) => assert_eq!(id, SongId(3)),
            other => panic!("expected duplicate id error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_year_and_empty_field_rejected() {
        let bad_year = vec![song(1, "Old", 999, "A", "X", "L")];
        assert!(matches!(
            Catalog::new(bad_year),
            Err(CatalogError::InvalidYear { year: 999, .. })
        ));

        let blank_singer = vec![song(1, "Blank", 1970, "A", "  ", "L")];
        assert!(matches!(
            Catalog::new(blank_singer),
            Err(CatalogError::EmptyField { field: "singer", .. })
        ));
    }

    #[test]
    fn test_empty_catalog_is_valid() {
        let catalog = Catalog::from_json_str("[]").unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.years_by_decade().is_empty());
    }

    #[test]
    fn test_distinct_values_sorted() {
        let catalog = Catalog::new(five_songs()).unwrap();
        assert_eq!(
            catalog.distinct_values(Dimension::Year),
            vec![
                DimensionValue::Year(1965),
                DimensionValue::Year(1978),
                DimensionValue::Year(1999)
            ]
        );
        let singers: Vec<String> = catalog
            .distinct_values(Dimension::Singer)
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(singers, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_years_by_decade() {
        let catalog = Catalog::new(five_songs()).unwrap();
        let decades = catalog.years_by_decade();
        assert_eq!(decades.get(&1960), Some(&vec![1965]));
        assert_eq!(decades.get(&1970), Some(&vec![1978]));
        assert_eq!(decades.get(&1990), Some(&vec![1999]));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&five_songs()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 5);
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = Catalog::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn test_bundled_catalog_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/songs.json");
        let catalog = Catalog::load(path).unwrap();
        assert!(catalog.len() >= 20);
        assert!(catalog.years_by_decade().len() >= 5);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            Catalog::from_json_str("{not json"),
            Err(CatalogError::Parse(_))
        ));
    }
}
