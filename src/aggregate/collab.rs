use crate::catalog::{Dimension, Song, SongId};
use crate::filter::YearRange;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// One (composer, singer, lyricist) triple and everything it produced together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collaboration {
    pub composer: String,
    pub singer: String,
    pub lyricist: String,
    pub songs: Vec<SongId>,
    pub years: BTreeSet<u16>,
    pub movies: BTreeSet<String>,
}

impl Collaboration {
    fn start(song: &Song) -> Self {
        Self {
            composer: song.composer.clone(),
            singer: song.singer.clone(),
            lyricist: song.lyricist.clone(),
            songs: Vec::new(),
            years: BTreeSet::new(),
            movies: BTreeSet::new(),
        }
    }

    /// `composer|singer|lyricist`
    pub fn key(&self) -> String {
        format!("{}|{}|{}", self.composer, self.singer, self.lyricist)
    }

    pub fn song_count(&self) -> usize {
        self.songs.len()
    }

    pub fn active_in(&self, range: YearRange) -> bool {
        self.years.iter().any(|&year| range.contains(year))
    }
}

/// Group songs by their (composer, singer, lyricist) triple, first-encountered order
pub fn group_collaborations(songs: &[Song]) -> Vec<Collaboration> {
    let mut positions: HashMap<(&str, &str, &str), usize> = HashMap::new();
    let mut groups: Vec<Collaboration> = Vec::new();

    for song in songs {
        let key = (
            song.composer.as_str(),
            song.singer.as_str(),
            song.lyricist.as_str(),
        );
        let position = *positions.entry(key).or_insert_with(|| {
            groups.push(Collaboration::start(song));
            groups.len() - 1
        });
        let group = &mut groups[position];
        group.songs.push(song.id);
        group.years.insert(song.year);
        group.movies.insert(song.movie.clone());
    }

    groups
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Collaborators {
    pub composers: BTreeSet<String>,
    pub singers: BTreeSet<String>,
    pub lyricists: BTreeSet<String>,
}

/// A single artist's footprint in one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistProfile {
    pub role: Dimension,
    pub name: String,
    pub songs: Vec<SongId>,
    pub active_years: BTreeSet<u16>,
    /// Includes the artist itself under its own role
    pub collaborators: Collaborators,
}

impl ArtistProfile {
    fn new(role: Dimension, name: &str) -> Self {
        Self {
            role,
            name: name.to_string(),
            songs: Vec::new(),
            active_years: BTreeSet::new(),
            collaborators: Collaborators::default(),
        }
    }

    fn record(&mut self, song: &Song) {
        self.songs.push(song.id);
        self.active_years.insert(song.year);
        self.collaborators.composers.insert(song.composer.clone());
        self.collaborators.singers.insert(song.singer.clone());
        self.collaborators.lyricists.insert(song.lyricist.clone());
    }

    pub fn total_songs(&self) -> usize {
        self.songs.len()
    }

    /// Distinct collaborators across all three roles, not counting the artist
    pub fn collaborator_count(&self) -> usize {
        let c = &self.collaborators;
        (c.composers.len() + c.singers.len() + c.lyricists.len()).saturating_sub(1)
    }

    pub fn active_in(&self, range: YearRange) -> bool {
        self.active_years.iter().any(|&year| range.contains(year))
    }

    pub fn first_year(&self) -> Option<u16> {
        self.active_years.first().copied()
    }

    pub fn last_year(&self) -> Option<u16> {
        self.active_years.last().copied()
    }
}

/// Collaborations plus per-role artist profiles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtistNetworks {
    pub collaborations: Vec<Collaboration>,
    pub composers: Vec<ArtistProfile>,
    pub singers: Vec<ArtistProfile>,
    pub lyricists: Vec<ArtistProfile>,
}

impl ArtistNetworks {
    pub fn build(songs: &[Song]) -> Self {
        Self {
            collaborations: group_collaborations(songs),
            composers: profiles(songs, Dimension::Composer),
            singers: profiles(songs, Dimension::Singer),
            lyricists: profiles(songs, Dimension::Lyricist),
        }
    }

    /// Keep only entries with at least one active year inside `range`
    pub fn within(&self, range: YearRange) -> Self {
        let keep = |artists: &[ArtistProfile]| -> Vec<ArtistProfile> {
            artists
                .iter()
                .filter(|artist| artist.active_in(range))
                .cloned()
                .collect()
        };
        Self {
            collaborations: self
                .collaborations
                .iter()
                .filter(|collab| collab.active_in(range))
                .cloned()
                .collect(),
            composers: keep(&self.composers),
            singers: keep(&self.singers),
            lyricists: keep(&self.lyricists),
        }
    }

    /// Profiles for one role; `Year` has none
    pub fn artists(&self, role: Dimension) -> &[ArtistProfile] {
        match role {
            Dimension::Composer => &self.composers,
            Dimension::Singer => &self.singers,
            Dimension::Lyricist => &self.lyricists,
            Dimension::Year => &[],
        }
    }

    pub fn find_artist(&self, role: Dimension, name: &str) -> Option<&ArtistProfile> {
        self.artists(role).iter().find(|artist| artist.name == name)
    }
}

fn profiles(songs: &[Song], role: Dimension) -> Vec<ArtistProfile> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut artists: Vec<ArtistProfile> = Vec::new();

    for song in songs {
        let Some(name) = song.name_of(role) else {
            continue;
        };
        let position = *positions.entry(name).or_insert_with(|| {
            artists.push(ArtistProfile::new(role, name));
            artists.len() - 1
        });
        artists[position].record(song);
    }

    artists
}
